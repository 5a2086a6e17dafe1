use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

use crate::collection::Collectable;

/// Behaviour to apply matched option/parameter tokens to a target variable.
///
/// This is the seam between the matching engine and the caller's typed fields:
/// the engine never inspects a field's type, it only drives the handle it was
/// given.  One `matched` call per match, then one `capture` call per consumed
/// token (so a zero-argument option sees `matched` alone).
pub trait Capturable {
    /// Declare that the bound option/parameter has been matched.
    fn matched(&mut self);

    /// Apply a single token to the target variable.
    fn capture(&mut self, token: &str) -> Result<(), InvalidCapture>;

    /// Whether this capture consumes tokens via
    /// [`capture`](Capturable::capture).  Token-free captures (such as
    /// [`Switch`]) fire on `matched` alone; sealing rejects binding one to a
    /// field that would feed it tokens.
    fn accepts_tokens(&self) -> bool {
        true
    }
}

/// A token could not be converted into the target type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidCapture {
    #[error("cannot convert '{token}' to {type_name}.")]
    InvalidConversion {
        token: String,
        type_name: &'static str,
    },

    #[error("'{token}' cannot be converted to a boolean.")]
    InvalidBoolean { token: String },
}

/// A capture for a zero-argument option: assigns a fixed target value when the
/// option is seen.  Bind it with an argument multiplicity of `0`.
pub struct Switch<'a, T> {
    variable: Rc<RefCell<&'a mut T>>,
    target: T,
}

impl<'a, T: Clone> Switch<'a, T> {
    pub fn new(variable: &'a mut T, target: T) -> Self {
        Self {
            variable: Rc::new(RefCell::new(variable)),
            target,
        }
    }
}

impl<'a, T: Clone> Capturable for Switch<'a, T> {
    fn matched(&mut self) {
        **self.variable.borrow_mut() = self.target.clone();
    }

    fn capture(&mut self, _token: &str) -> Result<(), InvalidCapture> {
        // Sealing rejects a switch on any token-consuming field.
        unreachable!("internal error - a switch must be bound with multiplicity 0");
    }

    fn accepts_tokens(&self) -> bool {
        false
    }
}

/// A capture for an option/parameter that takes a single value.
pub struct Scalar<'a, T> {
    variable: Rc<RefCell<&'a mut T>>,
}

impl<'a, T: FromStr> Scalar<'a, T> {
    pub fn new(variable: &'a mut T) -> Self {
        Self {
            variable: Rc::new(RefCell::new(variable)),
        }
    }
}

impl<'a, T: FromStr> Capturable for Scalar<'a, T> {
    fn matched(&mut self) {
        // Do nothing.
    }

    fn capture(&mut self, token: &str) -> Result<(), InvalidCapture> {
        let value = T::from_str(token).map_err(|_| InvalidCapture::InvalidConversion {
            token: token.to_string(),
            type_name: std::any::type_name::<T>(),
        })?;
        **self.variable.borrow_mut() = value;
        Ok(())
    }
}

/// A capture that accumulates each consumed token into a collection
/// (`Vec`, `HashSet`, or `Option`).
pub struct Collection<'a, C, T>
where
    C: 'a + Collectable<T>,
{
    variable: Rc<RefCell<&'a mut C>>,
    _phantom: PhantomData<T>,
}

impl<'a, C, T> Collection<'a, C, T>
where
    C: 'a + Collectable<T>,
{
    pub fn new(variable: &'a mut C) -> Self {
        Self {
            variable: Rc::new(RefCell::new(variable)),
            _phantom: PhantomData,
        }
    }
}

impl<'a, C, T> Capturable for Collection<'a, C, T>
where
    T: FromStr,
    C: 'a + Collectable<T>,
{
    fn matched(&mut self) {
        // Do nothing.
    }

    fn capture(&mut self, token: &str) -> Result<(), InvalidCapture> {
        let value = T::from_str(token).map_err(|_| InvalidCapture::InvalidConversion {
            token: token.to_string(),
            type_name: std::any::type_name::<T>(),
        })?;
        (**self.variable.borrow_mut()).add(value);
        Ok(())
    }
}

/// The string literal sets recognized as boolean constants by [`BoolArg`].
///
/// Replaces the process-wide mutable configuration of the reflection era: the
/// sets travel with the capture that uses them, so parses cannot interfere
/// with one another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolLiterals {
    truthy: Vec<String>,
    falsy: Vec<String>,
}

/// The boolean literal configuration violates its contract.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("boolean literal sets must be non-empty, contain no empty strings, and be disjoint (got {truthy:?} and {falsy:?}).")]
pub struct InvalidLiterals {
    truthy: Vec<String>,
    falsy: Vec<String>,
}

impl BoolLiterals {
    pub fn new(
        truthy: Vec<String>,
        falsy: Vec<String>,
    ) -> Result<Self, InvalidLiterals> {
        let valid = !truthy.is_empty()
            && !falsy.is_empty()
            && truthy.iter().all(|s| !s.is_empty())
            && falsy.iter().all(|s| !s.is_empty())
            && truthy.iter().all(|s| !falsy.contains(s));
        if !valid {
            return Err(InvalidLiterals { truthy, falsy });
        }
        Ok(Self { truthy, falsy })
    }

    fn classify(&self, token: &str) -> Option<bool> {
        if self.falsy.iter().any(|s| s == token) {
            Some(false)
        } else if self.truthy.iter().any(|s| s == token) {
            Some(true)
        } else {
            None
        }
    }
}

impl Default for BoolLiterals {
    fn default() -> Self {
        Self {
            truthy: vec!["true".to_string()],
            falsy: vec!["false".to_string()],
        }
    }
}

/// A capture for a boolean option that takes its value as a single token,
/// interpreted against a [`BoolLiterals`] configuration.
pub struct BoolArg<'a> {
    variable: Rc<RefCell<&'a mut bool>>,
    literals: BoolLiterals,
}

impl<'a> BoolArg<'a> {
    pub fn new(variable: &'a mut bool, literals: BoolLiterals) -> Self {
        Self {
            variable: Rc::new(RefCell::new(variable)),
            literals,
        }
    }
}

impl<'a> Capturable for BoolArg<'a> {
    fn matched(&mut self) {
        // Do nothing.
    }

    fn capture(&mut self, token: &str) -> Result<(), InvalidCapture> {
        let value = self
            .literals
            .classify(token)
            .ok_or_else(|| InvalidCapture::InvalidBoolean {
                token: token.to_string(),
            })?;
        **self.variable.borrow_mut() = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn switch_matched() {
        let mut variable = false;
        let mut switch = Switch::new(&mut variable, true);
        switch.matched();
        drop(switch);
        assert!(variable);
    }

    #[test]
    fn switch_repeat_match() {
        let mut variable = 0u32;
        let mut switch = Switch::new(&mut variable, 7);
        switch.matched();
        switch.matched();
        drop(switch);
        assert_eq!(variable, 7);
    }

    #[test]
    fn switch_accepts_no_tokens() {
        let mut variable = false;
        let switch = Switch::new(&mut variable, true);
        assert!(!switch.accepts_tokens());
    }

    #[test]
    fn value_captures_accept_tokens() {
        let mut scalar_target: u32 = 0;
        assert!(Scalar::new(&mut scalar_target).accepts_tokens());
        let mut collection_target: Vec<u32> = Vec::default();
        assert!(Collection::new(&mut collection_target).accepts_tokens());
        let mut bool_target = false;
        assert!(BoolArg::new(&mut bool_target, BoolLiterals::default()).accepts_tokens());
    }

    #[test]
    fn scalar_capture() {
        let mut variable: u32 = 0;
        let mut scalar = Scalar::new(&mut variable);
        scalar.matched();
        scalar.capture("5").unwrap();
        drop(scalar);
        assert_eq!(variable, 5);
    }

    #[test]
    fn scalar_invalid() {
        let mut variable: u32 = 0;
        let mut scalar = Scalar::new(&mut variable);
        assert_eq!(
            scalar.capture("x").unwrap_err(),
            InvalidCapture::InvalidConversion {
                token: "x".to_string(),
                type_name: "u32",
            },
        );
    }

    #[test]
    fn collection_capture() {
        let mut variable: Vec<u32> = Vec::default();
        let mut collection = Collection::new(&mut variable);
        collection.matched();
        collection.capture("1").unwrap();
        collection.capture("0").unwrap();
        drop(collection);
        assert_eq!(variable, vec![1, 0]);
    }

    #[test]
    fn collection_option() {
        let mut variable: Option<u32> = None;
        let mut collection = Collection::new(&mut variable);
        collection.capture("1").unwrap();
        drop(collection);
        assert_eq!(variable, Some(1));
    }

    #[rstest]
    #[case("true", true)]
    #[case("false", false)]
    fn bool_arg_defaults(#[case] token: &str, #[case] expected: bool) {
        let mut variable = !expected;
        let mut capture = BoolArg::new(&mut variable, BoolLiterals::default());
        capture.capture(token).unwrap();
        drop(capture);
        assert_eq!(variable, expected);
    }

    #[test]
    fn bool_arg_unknown_literal() {
        let mut variable = false;
        let mut capture = BoolArg::new(&mut variable, BoolLiterals::default());
        assert_eq!(
            capture.capture("yes").unwrap_err(),
            InvalidCapture::InvalidBoolean {
                token: "yes".to_string(),
            },
        );
    }

    #[rstest]
    #[case("yes", true)]
    #[case("on", true)]
    #[case("no", false)]
    fn bool_arg_custom_literals(#[case] token: &str, #[case] expected: bool) {
        let literals = BoolLiterals::new(
            vec!["yes".to_string(), "on".to_string()],
            vec!["no".to_string(), "off".to_string()],
        )
        .unwrap();
        let mut variable = !expected;
        let mut capture = BoolArg::new(&mut variable, literals);
        capture.capture(token).unwrap();
        drop(capture);
        assert_eq!(variable, expected);
    }

    #[rstest]
    #[case(vec![], vec!["false"])]
    #[case(vec!["true"], vec![])]
    #[case(vec![""], vec!["false"])]
    #[case(vec!["true"], vec![""])]
    #[case(vec!["yes"], vec!["yes"])]
    #[case(vec!["true", "no"], vec!["no", "false"])]
    fn bool_literals_invalid(#[case] truthy: Vec<&str>, #[case] falsy: Vec<&str>) {
        let truthy: Vec<String> = truthy.into_iter().map(String::from).collect();
        let falsy: Vec<String> = falsy.into_iter().map(String::from).collect();
        assert_matches!(
            BoolLiterals::new(truthy, falsy),
            Err(InvalidLiterals { .. })
        );
    }
}

use std::io::{self, Write};

use crate::capture::Capturable;
use crate::declaration::{FieldDeclaration, StructDeclaration};
use crate::errors::{DefinitionError, UsageError};
use crate::matcher::{ArgMatcher, CaptureTable};
use crate::printer::UsagePrinter;
use crate::registry::{FieldId, OptionRegistry};

/// Collects field bindings and declarations into an option registry.
///
/// Each [`bind`](Binder::bind) call pairs a capture handle with the
/// declarations of one field.  Declaration mistakes surface either
/// immediately (duplicate names, for instance) or when the binder is
/// [`seal`](Binder::seal)ed, which runs the cross-field checks and produces
/// the reusable [`CliParser`].
///
/// ```
/// use argbind::{Binder, FieldDeclaration, Scalar, Switch};
///
/// let mut verbose = false;
/// let mut count: usize = 1;
/// let mut binder = Binder::default();
/// binder
///     .bind(
///         Switch::new(&mut verbose, true),
///         vec![
///             FieldDeclaration::ShortName("v".to_string()),
///             FieldDeclaration::LongName("verbose".to_string()),
///         ],
///     )
///     .unwrap();
/// binder
///     .bind(
///         Scalar::new(&mut count),
///         vec![
///             FieldDeclaration::LongName("count".to_string()),
///             FieldDeclaration::ArgCount(1),
///         ],
///     )
///     .unwrap();
/// let mut parser = binder.seal().unwrap();
/// parser.parse(["--count", "3", "-v"]).unwrap();
/// drop(parser);
/// assert!(verbose);
/// assert_eq!(count, 3);
/// ```
pub struct Binder<'a> {
    registry: OptionRegistry,
    captures: CaptureTable<'a>,
    next_field: usize,
}

impl Default for Binder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Binder<'a> {
    pub fn new() -> Self {
        Self {
            registry: OptionRegistry::new(),
            captures: CaptureTable::default(),
            next_field: 0,
        }
    }

    /// Bind a capture handle to a fresh field and apply its declarations.
    pub fn bind(
        &mut self,
        capture: impl Capturable + 'a,
        declarations: Vec<FieldDeclaration>,
    ) -> Result<FieldId, DefinitionError> {
        let field = FieldId::new(self.next_field);
        self.next_field += 1;
        for declaration in declarations {
            declaration.apply(field, &mut self.registry)?;
        }
        self.captures.insert(field, Box::new(capture));
        Ok(field)
    }

    /// Bind a capture handle to the positional parameter at `index`.
    ///
    /// Shorthand for [`bind`](Binder::bind) with a single
    /// [`FieldDeclaration::Param`].
    pub fn bind_param(
        &mut self,
        capture: impl Capturable + 'a,
        index: usize,
    ) -> Result<FieldId, DefinitionError> {
        self.bind(capture, vec![FieldDeclaration::Param(index)])
    }

    /// Declare the multiplicity of the whole positional-parameter list, as an
    /// `x..y` pattern (`y` may be `*`).
    pub fn params(&mut self, pattern: &str) -> Result<(), DefinitionError> {
        StructDeclaration::ParamMultiplicity(pattern.to_string()).apply(&mut self.registry)
    }

    /// Toggle the interpretation of `-xyz` as the merge of `-x -y -z`
    /// (enabled by default).
    pub fn allow_short_names_merging(&mut self, allow: bool) {
        self.registry.allow_short_names_merging(allow);
    }

    /// Run the cross-field consistency checks and turn the binder into a
    /// parser.
    pub fn seal(self) -> Result<CliParser<'a>, DefinitionError> {
        self.registry.sanity_checks()?;
        self.check_capture_arity()?;
        Ok(CliParser {
            registry: self.registry,
            captures: self.captures,
            positionals: Vec::default(),
        })
    }

    /// A token-free capture (a [`Switch`](crate::Switch), typically) must not
    /// sit on a field the matcher would feed tokens to: one with an argument
    /// multiplicity, or a positional parameter slot.
    fn check_capture_arity(&self) -> Result<(), DefinitionError> {
        let mut tokenless: Vec<FieldId> = self
            .captures
            .iter()
            .filter(|(field, capture)| {
                !capture.accepts_tokens()
                    && (self.registry.arg_multiplicity(**field) > 0
                        || self.registry.is_param(**field))
            })
            .map(|(field, _)| *field)
            .collect();
        tokenless.sort();
        match tokenless.first() {
            Some(field) => Err(DefinitionError::TokenlessCapture { field: *field }),
            None => Ok(()),
        }
    }
}

/// A sealed option schema, ready to match argument vectors.
///
/// The parser is reusable: each [`parse`](CliParser::parse) call starts from
/// a clean positional state and re-drives the capture handles.  Matching is
/// best-effort, not transactional: a failed parse may have applied some
/// captures before the failing token.
pub struct CliParser<'a> {
    registry: OptionRegistry,
    captures: CaptureTable<'a>,
    positionals: Vec<String>,
}

impl<'a> CliParser<'a> {
    /// Match an argument vector against the schema, driving the bound
    /// captures.
    pub fn parse(
        &mut self,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<(), UsageError> {
        self.positionals.clear();
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut matcher = ArgMatcher::new(&self.registry);
        let result = matcher.run(args, &mut self.captures);
        // Positional tokens stay retrievable after a failed parse.
        self.positionals = matcher.into_positionals();
        result
    }

    /// The positional tokens seen by the last [`parse`](CliParser::parse)
    /// call, in order, including any beyond the declared parameter slots.
    pub fn positional_parameters(&self) -> &[String] {
        &self.positionals
    }

    /// Write the usage listing of the declared options, capped at the
    /// terminal width.
    pub fn print_usage(&self, out: &mut impl Write) -> io::Result<()> {
        UsagePrinter::new(&self.registry).print(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Scalar, Switch};

    #[test]
    fn seal_runs_sanity_checks() {
        let mut flag = false;
        let mut binder = Binder::default();
        binder
            .bind(
                Switch::new(&mut flag, true),
                vec![FieldDeclaration::Required(true)],
            )
            .unwrap();
        assert_matches!(
            binder.seal().map(|_| ()),
            Err(DefinitionError::UnnamedFields { .. })
        );
    }

    #[test]
    fn bind_reports_declaration_errors() {
        let mut first = false;
        let mut second = false;
        let mut binder = Binder::default();
        binder
            .bind(
                Switch::new(&mut first, true),
                vec![FieldDeclaration::ShortName("a".to_string())],
            )
            .unwrap();
        assert_matches!(
            binder.bind(
                Switch::new(&mut second, true),
                vec![FieldDeclaration::ShortName("a".to_string())],
            ),
            Err(DefinitionError::DuplicateShortName { .. })
        );
    }

    #[test]
    fn switch_with_argument_count_rejected_at_seal() {
        let mut flag = false;
        let mut binder = Binder::default();
        let field = binder
            .bind(
                Switch::new(&mut flag, true),
                vec![
                    FieldDeclaration::ShortName("f".to_string()),
                    FieldDeclaration::ArgCount(1),
                ],
            )
            .unwrap();
        assert_matches!(
            binder.seal().map(|_| ()),
            Err(DefinitionError::TokenlessCapture { field: f }) if f == field
        );
    }

    #[test]
    fn switch_as_param_rejected_at_seal() {
        let mut flag = false;
        let mut binder = Binder::default();
        binder.params("0..1").unwrap();
        let field = binder.bind_param(Switch::new(&mut flag, true), 0).unwrap();
        assert_matches!(
            binder.seal().map(|_| ()),
            Err(DefinitionError::TokenlessCapture { field: f }) if f == field
        );
    }

    #[test]
    fn parse_is_repeatable() {
        let mut flag = false;
        let mut value = String::new();
        let mut binder = Binder::default();
        binder
            .bind(
                Switch::new(&mut flag, true),
                vec![FieldDeclaration::ShortName("f".to_string())],
            )
            .unwrap();
        binder
            .bind(
                Scalar::new(&mut value),
                vec![
                    FieldDeclaration::ShortName("v".to_string()),
                    FieldDeclaration::ArgCount(1),
                ],
            )
            .unwrap();
        let mut parser = binder.seal().unwrap();

        parser.parse(["-f", "-v", "first"]).unwrap();
        parser.parse(["-v", "second"]).unwrap();
        drop(parser);

        assert!(flag);
        assert_eq!(value, "second");
    }

    #[test]
    fn positionals_reset_between_parses() {
        let mut value = String::new();
        let mut binder = Binder::default();
        binder.params("0..*").unwrap();
        binder.bind_param(Scalar::new(&mut value), 0).unwrap();
        let mut parser = binder.seal().unwrap();

        parser.parse(["a", "b"]).unwrap();
        assert_eq!(parser.positional_parameters(), ["a", "b"]);
        parser.parse(["c"]).unwrap();
        assert_eq!(parser.positional_parameters(), ["c"]);
        drop(parser);

        assert_eq!(value, "c");
    }
}

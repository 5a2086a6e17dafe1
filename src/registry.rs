use std::collections::HashMap;

use crate::errors::{DefinitionError, UsageError};
use crate::model::Multiplicity;

/// Opaque identifier of a target binding slot.
///
/// The registry and matcher never inspect the slot itself; they only track its
/// identity.  Identifiers are handed out by the binding layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(usize);

impl FieldId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "field #{}", self.0)
    }
}

const DEFAULT_ARG_MULTIPLICITY: usize = 0;

/// The authoritative catalog of declared options and positional parameters.
///
/// Most declaration mistakes are reported immediately by the mutator that
/// detects them.  Checks that need the complete picture (such as a
/// multiplicity declared before any name exists) are deferred to the single
/// sealing pass, [`OptionRegistry::sanity_checks`].
#[derive(Debug, Default)]
pub struct OptionRegistry {
    short_names: HashMap<String, FieldId>,
    long_names: HashMap<String, FieldId>,
    multiplicities: HashMap<FieldId, usize>,
    required: HashMap<FieldId, bool>,
    descriptions: HashMap<FieldId, String>,
    parameters: Vec<Option<FieldId>>,
    param_multiplicity: Option<Multiplicity>,
    merge_short_names: bool,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self {
            merge_short_names: true,
            ..Self::default()
        }
    }

    /// Associate a short name (`-name`) to a field.
    ///
    /// The name must be globally unique and a field may carry at most one
    /// short name.
    pub fn set_short_name(
        &mut self,
        field: FieldId,
        name: impl Into<String>,
    ) -> Result<(), DefinitionError> {
        let name = name.into();
        check_name(field, &name)?;
        if self.short_names.contains_key(&name) {
            return Err(DefinitionError::DuplicateShortName { field, name });
        }
        if self.short_names.values().any(|f| *f == field) {
            return Err(DefinitionError::ShortNameAlreadySet { field, name });
        }
        self.short_names.insert(name, field);
        Ok(())
    }

    /// Associate a long name (`--name`) to a field.
    ///
    /// The name must be globally unique and a field may carry at most one
    /// long name.
    pub fn set_long_name(
        &mut self,
        field: FieldId,
        name: impl Into<String>,
    ) -> Result<(), DefinitionError> {
        let name = name.into();
        check_name(field, &name)?;
        if self.long_names.contains_key(&name) {
            return Err(DefinitionError::DuplicateLongName { field, name });
        }
        if self.long_names.values().any(|f| *f == field) {
            return Err(DefinitionError::LongNameAlreadySet { field, name });
        }
        self.long_names.insert(name, field);
        Ok(())
    }

    /// Look up the field bound to a short name.
    ///
    /// An absent name is a usage error: the end user typed an option that was
    /// never declared.
    pub fn field_by_short_name(&self, name: &str) -> Result<FieldId, UsageError> {
        self.short_names
            .get(name)
            .copied()
            .ok_or_else(|| UsageError::UnknownShortName(name.to_string()))
    }

    /// Look up the field bound to a long name.
    pub fn field_by_long_name(&self, name: &str) -> Result<FieldId, UsageError> {
        self.long_names
            .get(name)
            .copied()
            .ok_or_else(|| UsageError::UnknownLongName(name.to_string()))
    }

    pub fn has_short_name(&self, name: &str) -> bool {
        self.short_names.contains_key(name)
    }

    /// Declare how many argument tokens the option bound to `field` consumes.
    ///
    /// At most one declaration per field.  The field does not need a name yet;
    /// that cross-check runs at sealing.
    pub fn set_multiplicity(&mut self, field: FieldId, n: usize) -> Result<(), DefinitionError> {
        if self.multiplicities.contains_key(&field) {
            return Err(DefinitionError::MultiplicityAlreadySet { field });
        }
        self.multiplicities.insert(field, n);
        Ok(())
    }

    pub fn arg_multiplicity(&self, field: FieldId) -> usize {
        self.multiplicities
            .get(&field)
            .copied()
            .unwrap_or(DEFAULT_ARG_MULTIPLICITY)
    }

    /// Flag the option bound to `field` as required (or explicitly optional).
    /// At most one declaration per field.
    pub fn set_required(&mut self, field: FieldId, flag: bool) -> Result<(), DefinitionError> {
        if self.required.contains_key(&field) {
            return Err(DefinitionError::RequiredAlreadySet { field });
        }
        self.required.insert(field, flag);
        Ok(())
    }

    pub fn is_required(&self, field: FieldId) -> bool {
        self.required.get(&field).copied().unwrap_or(false)
    }

    /// The fields flagged `required = true`, in identifier order.
    pub fn required_fields(&self) -> Vec<FieldId> {
        let mut fields: Vec<FieldId> = self
            .required
            .iter()
            .filter(|(_, flag)| **flag)
            .map(|(field, _)| *field)
            .collect();
        fields.sort();
        fields
    }

    /// Attach a human-readable description to the option bound to `field`.
    /// The description must be non-empty and declared at most once.
    pub fn set_description(
        &mut self,
        field: FieldId,
        text: impl Into<String>,
    ) -> Result<(), DefinitionError> {
        let text = text.into();
        if text.is_empty() {
            return Err(DefinitionError::EmptyDescription { field });
        }
        if self.descriptions.contains_key(&field) {
            return Err(DefinitionError::DescriptionAlreadySet { field });
        }
        self.descriptions.insert(field, text);
        Ok(())
    }

    pub fn description(&self, field: FieldId) -> &str {
        self.descriptions.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Register `field` as the positional parameter at `index`.
    ///
    /// Indices need not be declared in order; intermediate slots stay empty
    /// until (and unless) something claims them.
    pub fn set_param(&mut self, field: FieldId, index: usize) -> Result<(), DefinitionError> {
        if self.parameters.len() < index + 1 {
            self.parameters.resize(index + 1, None);
        }
        if let Some(occupant) = self.parameters[index] {
            return Err(DefinitionError::ParamIndexInUse {
                field,
                index,
                occupant,
            });
        }
        self.parameters[index] = Some(field);
        Ok(())
    }

    pub fn n_params(&self) -> usize {
        self.parameters.len()
    }

    pub fn param_field(&self, index: usize) -> Option<FieldId> {
        self.parameters.get(index).copied().flatten()
    }

    pub fn is_param(&self, field: FieldId) -> bool {
        self.parameters.iter().flatten().any(|f| *f == field)
    }

    /// Declare the multiplicity of the whole positional-parameter list, as an
    /// `x..y` pattern.  At most one declaration.
    pub fn set_param_multiplicity(&mut self, pattern: &str) -> Result<(), DefinitionError> {
        if self.param_multiplicity.is_some() {
            return Err(DefinitionError::ParamMultiplicityAlreadySet);
        }
        self.param_multiplicity = Some(Multiplicity::parse(pattern)?);
        Ok(())
    }

    /// The declared parameter multiplicity, defaulting to `[0..0]` (no
    /// positional parameters are accepted unless declared).
    pub fn param_multiplicity(&self) -> Multiplicity {
        self.param_multiplicity.unwrap_or_else(|| Multiplicity::exactly(0))
    }

    /// Toggle the interpretation of `-xyz` as the merge of `-x -y -z`.
    ///
    /// Enabled by default.  Enabling it makes the sealing pass reject a
    /// declared multi-character short name that spells out registered
    /// single-character short names, since such a token would be ambiguous.
    pub fn allow_short_names_merging(&mut self, allow: bool) {
        self.merge_short_names = allow;
    }

    pub fn merges_short_names(&self) -> bool {
        self.merge_short_names
    }

    /// The one-time consistency pass sealing the registry.
    ///
    /// Runs the cross-field checks that cannot be performed incrementally:
    /// annotations on unnamed fields, named parameters, parameter slots
    /// exceeding the parameter multiplicity, and (with merging enabled) the
    /// short-name merge ambiguity.
    pub fn sanity_checks(&self) -> Result<(), DefinitionError> {
        if let Some(fields) = self.unnamed_in(self.multiplicities.keys()) {
            return Err(DefinitionError::UnnamedFields {
                what: "multiplicities",
                fields,
            });
        }
        if let Some(fields) = self.unnamed_in(self.required.keys()) {
            return Err(DefinitionError::UnnamedFields {
                what: "a 'required' flag",
                fields,
            });
        }
        if let Some(fields) = self.unnamed_in(self.descriptions.keys()) {
            return Err(DefinitionError::UnnamedFields {
                what: "a description",
                fields,
            });
        }
        if let Some(fields) = self.named_in(self.parameters.iter().flatten()) {
            return Err(DefinitionError::NamedParams { fields });
        }
        let multiplicity = self.param_multiplicity();
        if self.parameters.len() > multiplicity.max() {
            return Err(DefinitionError::TooManyParams {
                declared: self.parameters.len(),
                multiplicity,
            });
        }
        if self.merge_short_names {
            self.check_merge_ambiguity()?;
        }
        Ok(())
    }

    fn check_merge_ambiguity(&self) -> Result<(), DefinitionError> {
        let mut names: Vec<&String> = self.short_names.keys().collect();
        names.sort();
        for name in names {
            let mut chars = name.chars();
            // Single-character names cannot merge-collide with themselves.
            if chars.next().is_some() && chars.next().is_none() {
                continue;
            }
            if name
                .chars()
                .all(|c| self.short_names.contains_key(c.to_string().as_str()))
            {
                return Err(DefinitionError::MergeAmbiguity { name: name.clone() });
            }
        }
        Ok(())
    }

    fn is_named(&self, field: FieldId) -> bool {
        self.short_names.values().any(|f| *f == field)
            || self.long_names.values().any(|f| *f == field)
    }

    fn unnamed_in<'a>(&self, fields: impl Iterator<Item = &'a FieldId>) -> Option<String> {
        let mut unnamed: Vec<FieldId> = fields.filter(|f| !self.is_named(**f)).copied().collect();
        if unnamed.is_empty() {
            return None;
        }
        unnamed.sort();
        Some(join_fields(&unnamed))
    }

    fn named_in<'a>(&self, fields: impl Iterator<Item = &'a FieldId>) -> Option<String> {
        let mut named: Vec<FieldId> = fields.filter(|f| self.is_named(**f)).copied().collect();
        if named.is_empty() {
            return None;
        }
        named.sort();
        Some(join_fields(&named))
    }

    pub fn short_name_of(&self, field: FieldId) -> Option<&str> {
        self.short_names
            .iter()
            .find(|(_, f)| **f == field)
            .map(|(name, _)| name.as_str())
    }

    pub fn long_name_of(&self, field: FieldId) -> Option<&str> {
        self.long_names
            .iter()
            .find(|(_, f)| **f == field)
            .map(|(name, _)| name.as_str())
    }

    /// Every field carrying a short or long name, in identifier order.
    pub fn named_fields(&self) -> Vec<FieldId> {
        let mut fields: Vec<FieldId> = self
            .short_names
            .values()
            .chain(self.long_names.values())
            .copied()
            .collect();
        fields.sort();
        fields.dedup();
        fields
    }

    /// Render an option by its names: `--long (-short)`, `--long`, or
    /// `-short`.  A field with neither name is an authoring error.
    pub fn field_to_string(&self, field: FieldId) -> Result<String, DefinitionError> {
        let short = self.short_name_of(field);
        let long = self.long_name_of(field);
        match (short, long) {
            (Some(short), Some(long)) => Ok(format!("--{long} (-{short})")),
            (Some(short), None) => Ok(format!("-{short}")),
            (None, Some(long)) => Ok(format!("--{long}")),
            (None, None) => Err(DefinitionError::UnnamedField { field }),
        }
    }

    /// Placeholder names for the argument tokens of an option, used by the
    /// usage printer: `arg0`, `arg1`, ...
    pub fn arg_names(&self, field: FieldId) -> Vec<String> {
        (0..self.arg_multiplicity(field))
            .map(|i| format!("arg{i}"))
            .collect()
    }
}

fn check_name(field: FieldId, name: &str) -> Result<(), DefinitionError> {
    let mut chars = name.chars();
    let first = chars.next().ok_or(DefinitionError::EmptyName { field })?;
    if !first.is_alphanumeric() || !chars.all(|c| c.is_alphanumeric() || c == '-') {
        return Err(DefinitionError::InvalidName {
            field,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn join_fields(fields: &[FieldId]) -> String {
    fields
        .iter()
        .map(FieldId::to_string)
        .collect::<Vec<String>>()
        .join(", ")
}

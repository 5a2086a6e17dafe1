use crate::errors::DefinitionError;
use crate::registry::{FieldId, OptionRegistry};

/// One declaration attached to a bound field.
///
/// The closed set of per-field declaration kinds, each carrying its payload
/// and applying itself to the registry.  This replaces the annotation
/// scanning of the reflection era: the binding layer collects declarations
/// explicitly and visits them once per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDeclaration {
    /// `-name`; single- or multi-character.
    ShortName(String),
    /// `--name`.
    LongName(String),
    /// How many argument tokens the option consumes.
    ArgCount(usize),
    /// Whether the end user must supply the option.
    Required(bool),
    /// Human-readable description for the usage printer.
    Description(String),
    /// Positional parameter slot (zero-based).
    Param(usize),
}

impl FieldDeclaration {
    pub fn apply(
        self,
        field: FieldId,
        registry: &mut OptionRegistry,
    ) -> Result<(), DefinitionError> {
        match self {
            FieldDeclaration::ShortName(name) => registry.set_short_name(field, name),
            FieldDeclaration::LongName(name) => registry.set_long_name(field, name),
            FieldDeclaration::ArgCount(n) => registry.set_multiplicity(field, n),
            FieldDeclaration::Required(flag) => registry.set_required(field, flag),
            FieldDeclaration::Description(text) => registry.set_description(field, text),
            FieldDeclaration::Param(index) => registry.set_param(field, index),
        }
    }
}

/// A declaration scoped to the whole argument vector rather than one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructDeclaration {
    /// Bounds on the overall positional-parameter count, as an `x..y` pattern.
    ParamMultiplicity(String),
}

impl StructDeclaration {
    pub fn apply(self, registry: &mut OptionRegistry) -> Result<(), DefinitionError> {
        match self {
            StructDeclaration::ParamMultiplicity(pattern) => {
                registry.set_param_multiplicity(&pattern)
            }
        }
    }
}

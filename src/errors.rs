use thiserror::Error;

use crate::model::Multiplicity;
use crate::registry::FieldId;

/// An error in the declaration of the option schema itself.
///
/// Definition errors are always the fault of the program author, never of the
/// end user.  They are detected while the registry is populated, or at the
/// latest when it is sealed; a program hitting one of these should fail fast.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("invalid multiplicity bounds: min={min} max={max}.")]
    InvalidMultiplicity { min: usize, max: usize },

    #[error("invalid multiplicity pattern '{0}'.")]
    InvalidMultiplicityPattern(String),

    #[error("{field}: option name is empty.")]
    EmptyName { field: FieldId },

    #[error("{field}: option name '{name}' must start with a letter or digit and contain only letters, digits, and hyphens.")]
    InvalidName { field: FieldId, name: String },

    #[error("{field}: short name '{name}' is already in use.")]
    DuplicateShortName { field: FieldId, name: String },

    #[error("{field}: long name '{name}' is already in use.")]
    DuplicateLongName { field: FieldId, name: String },

    #[error("{field}: cannot add short name '{name}', a short name is already set.")]
    ShortNameAlreadySet { field: FieldId, name: String },

    #[error("{field}: cannot add long name '{name}', a long name is already set.")]
    LongNameAlreadySet { field: FieldId, name: String },

    #[error("{field}: multiple definitions of the argument multiplicity.")]
    MultiplicityAlreadySet { field: FieldId },

    #[error("{field}: multiple occurrences of the required flag.")]
    RequiredAlreadySet { field: FieldId },

    #[error("{field}: option description is empty.")]
    EmptyDescription { field: FieldId },

    #[error("{field}: multiple definitions of the description.")]
    DescriptionAlreadySet { field: FieldId },

    #[error("{field}: parameter index {index} is already in use by {occupant}.")]
    ParamIndexInUse {
        field: FieldId,
        index: usize,
        occupant: FieldId,
    },

    #[error("multiple definitions of the parameter multiplicity.")]
    ParamMultiplicityAlreadySet,

    #[error("the following fields have {what} but no name: {fields}.")]
    UnnamedFields { what: &'static str, fields: String },

    #[error("the following fields are both set as parameters and named: {fields}.")]
    NamedParams { fields: String },

    #[error("number of declared parameters exceeds the max parameter multiplicity ({declared} parameters for a multiplicity of {multiplicity}).")]
    TooManyParams {
        declared: usize,
        multiplicity: Multiplicity,
    },

    #[error("short name '{name}' is ambiguous with the merged single-character short names it spells out.")]
    MergeAmbiguity { name: String },

    #[error("{field}: one of short or long name must be defined.")]
    UnnamedField { field: FieldId },

    #[error("{field}: the bound capture takes no tokens, yet the field is declared to consume some.")]
    TokenlessCapture { field: FieldId },
}

/// An error in the argument vector supplied by the end user.
///
/// Usage errors are meant to be caught by the caller and rendered as a usage
/// message rather than a crash.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("no option linked to short name '{0}'.")]
    UnknownShortName(String),

    #[error("no option linked to long name '{0}'.")]
    UnknownLongName(String),

    #[error("empty option: '-'.")]
    EmptyOption,

    #[error("no '-{0}' option.")]
    UnknownOption(String),

    #[error("{source} No '-{group}' short option exists either.")]
    UnknownShortGroup {
        source: Box<UsageError>,
        group: String,
    },

    #[error("not enough parameters for option '{option}' (expected {expected}).")]
    NotEnoughTokens { option: String, expected: usize },

    #[error("the following options have no value (although they have to): {rendered}.")]
    MissingRequired { rendered: String },

    #[error("wrong parameter count (got {provided}, expected {expected}).")]
    WrongParameterCount { provided: usize, expected: String },

    #[error(transparent)]
    Capture(#[from] crate::capture::InvalidCapture),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::InvalidCapture;

    #[test]
    fn definition_messages() {
        let field = FieldId::new(2);
        assert_eq!(
            DefinitionError::EmptyName { field }.to_string(),
            "field #2: option name is empty.",
        );
        assert_eq!(
            DefinitionError::TooManyParams {
                declared: 3,
                multiplicity: Multiplicity::exactly(1),
            }
            .to_string(),
            "number of declared parameters exceeds the max parameter multiplicity \
             (3 parameters for a multiplicity of [1..1]).",
        );
    }

    #[test]
    fn usage_messages() {
        assert_eq!(
            UsageError::NotEnoughTokens {
                option: "m".to_string(),
                expected: 1,
            }
            .to_string(),
            "not enough parameters for option 'm' (expected 1).",
        );
        assert_eq!(
            UsageError::UnknownShortGroup {
                source: Box::new(UsageError::UnknownShortName("x".to_string())),
                group: "xyz".to_string(),
            }
            .to_string(),
            "no option linked to short name 'x'. No '-xyz' short option exists either.",
        );
    }

    #[test]
    fn capture_wrapping() {
        let error = UsageError::from(InvalidCapture::InvalidConversion {
            token: "x".to_string(),
            type_name: "usize",
        });
        assert_eq!(error.to_string(), "cannot convert 'x' to usize.");
    }
}

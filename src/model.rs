use crate::errors::DefinitionError;

/// An inclusive integer interval bounding how many tokens an option, or the
/// whole positional-parameter list, may consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Multiplicity {
    min: usize,
    max: usize,
}

impl Multiplicity {
    /// Build a multiplicity from its inclusive bounds.
    pub fn of(min: usize, max: usize) -> Result<Self, DefinitionError> {
        if max < min {
            return Err(DefinitionError::InvalidMultiplicity { min, max });
        }
        Ok(Self { min, max })
    }

    /// Build a multiplicity containing exactly one value.
    pub fn exactly(n: usize) -> Self {
        Self { min: n, max: n }
    }

    /// Parse a multiplicity from its `x..y` string form.
    ///
    /// `x` and `y` are unsigned decimal integers; `y` may be the literal `*`,
    /// denoting an effectively unbounded maximum.  No whitespace, signs, or
    /// surrounding text are tolerated.
    pub fn parse(pattern: &str) -> Result<Self, DefinitionError> {
        let invalid = || DefinitionError::InvalidMultiplicityPattern(pattern.to_string());
        let (lower, upper) = pattern.split_once("..").ok_or_else(invalid)?;
        let min = parse_bound(lower).ok_or_else(invalid)?;
        let max = if upper == "*" {
            usize::MAX
        } else {
            parse_bound(upper).ok_or_else(invalid)?
        };
        Self::of(min, max)
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn is_unbounded(&self) -> bool {
        self.max == usize::MAX
    }

    pub fn contains(&self, n: usize) -> bool {
        self.min <= n && n <= self.max
    }

    /// Render the interval for an end user, such as in a usage message.
    pub fn to_human_readable(&self) -> String {
        match (self.min, self.max) {
            (min, max) if min == max => format!("exactly {min}"),
            (0, usize::MAX) => "any".to_string(),
            (min, usize::MAX) => format!("at least {min}"),
            (0, max) => format!("at most {max}"),
            (min, max) => format!("between {min} and {max}"),
        }
    }
}

fn parse_bound(text: &str) -> Option<usize> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl std::fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unbounded() {
            write!(f, "[{}..*]", self.min)
        } else {
            write!(f, "[{}..{}]", self.min, self.max)
        }
    }
}

use thiserror::Error;

/// No recognizable version pattern was found in the input
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("No recognizable version in {input:?}")]
pub struct ParseError {
    pub input: String,
}

impl ParseError {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

/// Malformed version range specification
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("Empty range specification")]
    Empty,

    #[error("Unbounded range: {spec}")]
    Unbounded { spec: String },

    #[error("Ranges overlap: {spec}")]
    Overlap { spec: String },

    #[error("Range defies version ordering: {spec}")]
    Inverted { spec: String },

    #[error("Range cannot have identical boundaries: {spec}")]
    IdenticalBounds { spec: String },

    #[error("Single version must be surrounded by []: {spec}")]
    SingleVersionNotInclusive { spec: String },

    #[error("Only fully-qualified sets allowed in multiple set scenario: {spec}")]
    MixedSet { spec: String },

    #[error("Invalid version in range: {0}")]
    Version(#[from] ParseError),
}

use thiserror::Error;

/// Errors produced while encoding, decoding, or reassembling MOT objects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MotError {
    /// A parameter's PLI/length framing was inconsistent, or its payload
    /// could not be interpreted for the variant its id selects. Fatal to
    /// the parameter list currently being decoded, not to the cache.
    #[error("malformed parameter: {0}")]
    MalformedParameter(String),

    /// The parameter id is not in the decoder registry. Carries the id and
    /// the full raw span (preamble + payload) so a caller can skip over it.
    #[error("unknown header parameter id {id}")]
    UnknownHeaderParameter {
        /// The 6-bit parameter id that was not recognized.
        id: u8,
        /// The raw encoded span (preamble and payload) of the parameter.
        raw: Vec<u8>,
    },

    /// A compiled object has no ContentName parameter.
    #[error("compiled object is missing a ContentName parameter")]
    MissingName,

    /// An encode-side value (duration, priority, content type width, ...)
    /// is outside its representable range.
    #[error("value out of representable range: {0}")]
    OutOfRange(String),

    /// The caller supplied a data source the reassembler does not
    /// understand (e.g. a raw byte blob instead of a parsed Datagroup).
    #[error("unsupported data source: {0}")]
    UnsupportedDataSource(String),
}

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, MotError>;

//! Error types for the decoder

use thiserror::Error;

/// Fatal wiring problems reported by the framing layer
///
/// The message is shown to the user verbatim by the host.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// Chip-select is not connected, so transactions cannot be delimited
    #[error("CS# pin required.")]
    MissingChipSelect,

    /// Neither data line is connected
    #[error("MISO and MOSI pins required.")]
    MissingDataLines,
}

/// Problems with option values supplied by the host
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// Option id not recognized
    #[error("unknown option: {0}")]
    UnknownOption(String),

    /// Value outside the option's allowed set
    #[error("invalid value {value:?} for option {option} (expected {expected})")]
    InvalidValue {
        /// Option id
        option: String,
        /// Rejected value
        value: String,
        /// Allowed values
        expected: &'static str,
    },
}

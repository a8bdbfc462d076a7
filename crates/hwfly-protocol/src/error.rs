//! Error types for hwfly-nx transaction dissection
//!
//! A [`DecodeError`] is never fatal: it becomes a Garbage annotation and the
//! decoder moves on to the next transaction.

use thiserror::Error;

/// Reasons a transaction could not be decoded into a [`Command`](crate::Command)
///
/// The `Display` output is the long annotation label.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecodeError {
    /// Transaction ends before the bytes its opcode family needs
    #[error("Unrecognized (too short?)")]
    TooShort { opcode: u8, len: usize },

    /// Set-glitch-offset without both offset bytes
    #[error("Invalid set_glitch_offset (too short?)")]
    InvalidGlitchOffset,

    /// Leading byte not in the opcode table
    #[error("Unrecognized command")]
    UnknownOpcode(u8),

    /// 0x24 with an unknown second byte
    #[error("Unrecognized 0x24 command")]
    UnknownConfigCommand(u8),

    /// 0x24 0x06 with an unknown selector byte
    #[error("Unrecognized 0x24 0x6 command")]
    UnknownControlAction(u8),

    /// 0x26 with an unknown second byte
    #[error("Unrecognized 0x26 command")]
    UnknownStatusRead(u8),
}

/// A transaction with nothing captured on one of its data lines
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("transaction has an empty data line")]
pub struct EmptyTransaction;

impl DecodeError {
    /// Abbreviated annotation label
    pub fn short_label(&self) -> &'static str {
        match self {
            Self::TooShort { .. } | Self::UnknownOpcode(_) => "???",
            Self::InvalidGlitchOffset => "GO:?",
            Self::UnknownConfigCommand(_) => "??? 24",
            Self::UnknownControlAction(_) => "??? 24 06",
            Self::UnknownStatusRead(_) => "??? 26",
        }
    }
}

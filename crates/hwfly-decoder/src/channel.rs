//! Input from the host's SPI framing layer

use hwfly_protocol::SpiByte;

use crate::error::ChannelError;

/// Which logic channels the host has wired up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Chip-select (CS#)
    pub chip_select: bool,
    /// Controller → peripheral data
    pub mosi: bool,
    /// Peripheral → controller data
    pub miso: bool,
}

impl ChannelConfig {
    /// All four SPI lines connected
    pub fn full() -> Self {
        Self {
            chip_select: true,
            mosi: true,
            miso: true,
        }
    }

    /// Check that every line the dissector needs is present
    ///
    /// One data line is enough; the other side's transactions are then
    /// empty and get skipped.
    pub fn validate(&self) -> Result<(), ChannelError> {
        if !self.chip_select {
            return Err(ChannelError::MissingChipSelect);
        }
        if !self.mosi && !self.miso {
            return Err(ChannelError::MissingDataLines);
        }
        Ok(())
    }
}

/// One packet from the framing layer
///
/// `None` in a chip-select or data event means the corresponding channel is
/// not connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramingEvent {
    /// A complete chip-select framed transaction
    Transfer {
        /// Bytes on MOSI
        mosi: Vec<SpiByte>,
        /// Bytes on MISO
        miso: Vec<SpiByte>,
    },
    /// Chip-select changed level
    ChipSelectChange {
        /// Level before the change
        old: Option<bool>,
        /// Level after the change
        new: Option<bool>,
    },
    /// A single byte pair
    Data {
        /// Byte on MOSI
        mosi: Option<SpiByte>,
        /// Byte on MISO
        miso: Option<SpiByte>,
    },
}

impl FramingEvent {
    /// Wiring problem revealed by this event, if any
    pub fn channel_error(&self) -> Option<ChannelError> {
        match self {
            Self::ChipSelectChange {
                old: None,
                new: None,
            } => Some(ChannelError::MissingChipSelect),
            Self::Data {
                mosi: None,
                miso: None,
            } => Some(ChannelError::MissingDataLines),
            _ => None,
        }
    }
}

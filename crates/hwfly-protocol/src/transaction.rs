//! Captured SPI bytes and transactions
//!
//! The framing layer hands over one transaction per chip-select assertion:
//! the bytes clocked out on MOSI and the bytes clocked in on MISO, each with
//! the sample interval during which it was on the wire.

use std::ops::RangeInclusive;

#[cfg(feature = "serde")]
use crate::error::EmptyTransaction;

/// Half-open sample interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// First sample
    pub start: u64,
    /// One past the last sample
    pub end: u64,
}

impl Span {
    /// Create a span from its bounds
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`
    pub fn union(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Number of samples covered
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span covers no samples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single byte as captured on one data line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpiByte {
    /// Byte value
    pub value: u8,
    /// Sample at which the byte started
    pub start: u64,
    /// Sample at which the byte ended
    pub end: u64,
}

impl SpiByte {
    /// Create a captured byte
    pub fn new(value: u8, start: u64, end: u64) -> Self {
        Self { value, start, end }
    }

    /// Sample span of this byte
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// One chip-select framed exchange
///
/// Both sides are guaranteed non-empty. Their lengths may differ when one
/// side clocked don't-care bytes that the framing layer did not report.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawTransaction"))]
pub struct Transaction {
    mosi: Vec<SpiByte>,
    miso: Vec<SpiByte>,
}

/// Unchecked serialized form of a [`Transaction`]
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawTransaction {
    mosi: Vec<SpiByte>,
    miso: Vec<SpiByte>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTransaction> for Transaction {
    type Error = EmptyTransaction;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        Self::new(raw.mosi, raw.miso).ok_or(EmptyTransaction)
    }
}

impl Transaction {
    /// Build a transaction, or `None` if either side is empty
    pub fn new(mosi: Vec<SpiByte>, miso: Vec<SpiByte>) -> Option<Self> {
        if mosi.is_empty() || miso.is_empty() {
            return None;
        }
        Some(Self { mosi, miso })
    }

    /// Bytes sent by the MCU
    pub fn mosi(&self) -> &[SpiByte] {
        &self.mosi
    }

    /// Bytes returned by the FPGA
    pub fn miso(&self) -> &[SpiByte] {
        &self.miso
    }

    /// The leading MOSI byte
    pub fn opcode(&self) -> u8 {
        self.mosi[0].value
    }

    /// Byte count of the longer side
    pub fn byte_count(&self) -> usize {
        self.mosi.len().max(self.miso.len())
    }

    /// MOSI byte value at `index`
    pub fn mosi_value(&self, index: usize) -> Option<u8> {
        self.mosi.get(index).map(|b| b.value)
    }

    /// MISO byte value at `index`
    pub fn miso_value(&self, index: usize) -> Option<u8> {
        self.miso.get(index).map(|b| b.value)
    }

    /// Span covering every byte on both lines
    pub fn span(&self) -> Span {
        let first = self.mosi[0].span().union(self.miso[0].span());
        let last = self.mosi[self.mosi.len() - 1]
            .span()
            .union(self.miso[self.miso.len() - 1].span());
        Span::new(first.start, last.end)
    }

    /// Span of the MOSI bytes in `range`
    ///
    /// The range end is clamped to the final captured byte.
    pub fn mosi_span(&self, range: RangeInclusive<usize>) -> Option<Span> {
        span_of(&self.mosi, range)
    }

    /// Span of the MISO bytes in `range`
    ///
    /// The range end is clamped to the final captured byte.
    pub fn miso_span(&self, range: RangeInclusive<usize>) -> Option<Span> {
        span_of(&self.miso, range)
    }
}

fn span_of(bytes: &[SpiByte], range: RangeInclusive<usize>) -> Option<Span> {
    let first = bytes.get(*range.start())?;
    let last = bytes.get((*range.end()).min(bytes.len() - 1))?;
    if last.end < first.start {
        return None;
    }
    Some(Span::new(first.start, last.end))
}

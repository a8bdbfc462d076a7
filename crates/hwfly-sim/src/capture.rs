//! Synthetic SPI captures
//!
//! Lays bytes out on a sample timeline the way a logic analyzer's SPI
//! decoder would report them, one [`Transaction`] per chip-select assertion.

use hwfly_protocol::{Command, EncodeCommand, SpiByte, Transaction};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::fpga::SimulatedFpga;

/// Sample spacing used when laying out a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureTiming {
    /// Samples one byte occupies on the wire
    pub samples_per_byte: u64,
    /// Idle samples between bytes of one transaction
    pub byte_gap: u64,
    /// Idle samples between transactions
    pub transaction_gap: u64,
}

impl Default for CaptureTiming {
    fn default() -> Self {
        Self {
            samples_per_byte: 16,
            byte_gap: 2,
            transaction_gap: 64,
        }
    }
}

/// Builds a capture transaction by transaction
#[derive(Debug, Clone, Default)]
pub struct CaptureBuilder {
    timing: CaptureTiming,
    cursor: u64,
    transactions: Vec<Transaction>,
}

impl CaptureBuilder {
    /// Create an empty capture starting at sample 0
    pub fn new(timing: CaptureTiming) -> Self {
        Self {
            timing,
            cursor: 0,
            transactions: Vec::new(),
        }
    }

    /// Sample where the next transaction starts
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Transactions captured so far
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Consume the builder, returning the captured transactions
    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }

    /// Append a transaction with the given raw bytes
    ///
    /// The two lines may differ in length; byte `i` on either line occupies
    /// the same sample window. A transaction with an empty line still takes
    /// up time on the timeline but is not recorded.
    pub fn push_raw(&mut self, mosi: &[u8], miso: &[u8]) -> Option<&Transaction> {
        let first = self.cursor;
        let stride = self.timing.samples_per_byte + self.timing.byte_gap;
        let place = |values: &[u8]| -> Vec<SpiByte> {
            values
                .iter()
                .enumerate()
                .map(|(i, &value)| {
                    let start = first + i as u64 * stride;
                    SpiByte::new(value, start, start + self.timing.samples_per_byte)
                })
                .collect()
        };
        let mosi_bytes = place(mosi);
        let miso_bytes = place(miso);

        let bytes = mosi.len().max(miso.len()) as u64;
        self.cursor = first + bytes * stride + self.timing.transaction_gap;

        let txn = Transaction::new(mosi_bytes, miso_bytes)?;
        trace!(
            "captured 0x{:02X} with {} bytes at sample {}",
            txn.opcode(),
            txn.byte_count(),
            first
        );
        self.transactions.push(txn);
        self.transactions.last()
    }

    /// Encode `cmd`, clock it through `fpga` and record the exchange
    pub fn exchange(&mut self, fpga: &mut SimulatedFpga, cmd: &Command) -> Option<&Transaction> {
        let mosi = cmd.encode();
        let miso = fpga.respond(&mosi);
        self.push_raw(&mosi, &miso)
    }

    /// Record `count` identical status polls against `fpga`
    pub fn poll(&mut self, fpga: &mut SimulatedFpga, cmd: &Command, count: usize) {
        for _ in 0..count {
            self.exchange(fpga, cmd);
        }
    }
}

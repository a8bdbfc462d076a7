//! hwfly-nx SPI Protocol Library
//!
//! This crate dissects the command protocol spoken between the hwfly-nx
//! modchip's microcontroller (SPI master) and its FPGA. It starts from
//! framed transactions, as produced by a logic analyzer's SPI decoder, and
//! ends at labelled sample spans.
//!
//! # Architecture
//!
//! - [`transaction`]: captured bytes with sample spans, grouped per chip-select
//! - [`command`]: the opcode table and the decoded [`Command`] type
//! - [`parse`]: classification of a [`Transaction`] into a [`Command`]
//! - [`display`]: rendering of commands and decode errors as [`Annotation`]s
//!
//! Everything here is stateless. Merging repeated status polls and
//! validating channel wiring live in the `hwfly-decoder` crate.
//!
//! # Example
//!
//! ```rust
//! use hwfly_protocol::{
//!     parse_transaction, AnnotationClass, RenderOptions, SpiByte, Transaction,
//!     TransactionAnnotation,
//! };
//!
//! let line = |values: &[u8]| -> Vec<SpiByte> {
//!     values
//!         .iter()
//!         .enumerate()
//!         .map(|(i, &v)| SpiByte::new(v, i as u64 * 8, i as u64 * 8 + 8))
//!         .collect()
//! };
//! let txn = Transaction::new(line(&[0x24, 0x02, 0x0C]), line(&[0x00; 3])).unwrap();
//!
//! let cmd = parse_transaction(&txn).unwrap();
//! let annotations = cmd.annotate(&txn, &RenderOptions::default());
//! assert_eq!(annotations[0].class, AnnotationClass::Write);
//! assert_eq!(annotations[0].label(), "Set glitch width: 12");
//! ```

pub mod command;
pub mod display;
pub mod error;
pub mod flags;
pub mod parse;
pub mod transaction;

pub use command::{
    ActiveBuffer, Command, ConfigCommand, ControlAction, FpgaId, PollKind, StatusRead,
};
pub use display::{
    poll_annotation, Annotation, AnnotationClass, Layout, PollReading, RenderOptions,
    TransactionAnnotation, ANNOTATION_ROW,
};
pub use error::{DecodeError, EmptyTransaction};
pub use flags::StatusFlags;
pub use parse::parse_transaction;
pub use transaction::{Span, SpiByte, Transaction};

/// Trait for commands that can be encoded to bytes
pub trait EncodeCommand {
    /// Encode this command to the bytes the MCU clocks out on MOSI
    fn encode(&self) -> Vec<u8>;
}

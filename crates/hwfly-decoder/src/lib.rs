//! hwfly-nx SPI Dissector
//!
//! This crate wraps the stateless command dissection of `hwfly-protocol`
//! into a per-capture decoder session that a signal-analysis host can drive.
//!
//! # Architecture
//!
//! The host's SPI framing layer delivers [`FramingEvent`]s in capture order.
//! For each transaction the [`Decoder`]:
//!
//! 1. classifies it by opcode and extracts its fields
//! 2. holds back glitch-timer and status-flag polls, merging identical
//!    consecutive readings into one annotation
//! 3. flushes held-back polls whenever another command interrupts the run
//! 4. renders the result and hands it to an [`AnnotationSink`]
//!
//! A missing chip-select, or both data lines missing, is fatal: the first
//! such event returns a [`ChannelError`] and the decoder ignores everything
//! after it.
//!
//! # Example
//!
//! ```rust
//! use hwfly_decoder::{Decoder, DecoderOptions};
//! use hwfly_protocol::SpiByte;
//!
//! let line = |first: u64, values: &[u8]| -> Vec<SpiByte> {
//!     values
//!         .iter()
//!         .enumerate()
//!         .map(|(i, &v)| SpiByte::new(v, first + i as u64 * 8, first + i as u64 * 8 + 8))
//!         .collect()
//! };
//!
//! let mut decoder = Decoder::with_options(DecoderOptions::default());
//! // Three identical status polls...
//! for n in 0..3 {
//!     decoder.transfer(line(n * 100, &[0x26, 0x0B, 0x00]), line(n * 100, &[0x00, 0x00, 0x02]));
//! }
//! // ...then the capture ends
//! decoder.finish();
//!
//! let annotations = decoder.into_sink();
//! assert_eq!(annotations.len(), 1);
//! assert_eq!(annotations[0].label(), "Flags: GLITCH_SUCCESS");
//! ```

pub mod channel;
pub mod coalesce;
pub mod engine;
pub mod error;
pub mod options;
pub mod sink;

pub use channel::{ChannelConfig, FramingEvent};
pub use coalesce::PollCoalescer;
pub use engine::Decoder;
pub use error::{ChannelError, OptionsError};
pub use options::{DecoderOptions, OptionInfo, OPTIONS};
pub use sink::AnnotationSink;

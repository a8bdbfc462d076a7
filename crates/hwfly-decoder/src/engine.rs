//! Decoder session
//!
//! One [`Decoder`] handles one capture: framing events go in, annotations
//! come out through an [`AnnotationSink`]. The only state carried between
//! transactions is the pending poll runs and the halt flag set by a fatal
//! wiring error.

use hwfly_protocol::{
    parse_transaction, Annotation, Command, PollReading, SpiByte, Transaction,
    TransactionAnnotation,
};
use tracing::{debug, error, trace, warn};

use crate::channel::{ChannelConfig, FramingEvent};
use crate::coalesce::PollCoalescer;
use crate::error::ChannelError;
use crate::options::DecoderOptions;
use crate::sink::AnnotationSink;

/// Stateful hwfly-nx dissector for a single capture
#[derive(Debug)]
pub struct Decoder<S: AnnotationSink = Vec<Annotation>> {
    options: DecoderOptions,
    polls: PollCoalescer,
    sink: S,
    halted: bool,
}

impl Decoder<Vec<Annotation>> {
    /// Create a decoder that collects annotations into a `Vec`
    pub fn new() -> Self {
        Self::with_sink(DecoderOptions::default(), Vec::new())
    }

    /// Create a collecting decoder with the given options
    pub fn with_options(options: DecoderOptions) -> Self {
        Self::with_sink(options, Vec::new())
    }
}

impl Default for Decoder<Vec<Annotation>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AnnotationSink> Decoder<S> {
    /// Create a decoder writing to `sink`
    pub fn with_sink(options: DecoderOptions, sink: S) -> Self {
        Self {
            options,
            polls: PollCoalescer::new(options.merge_polls),
            sink,
            halted: false,
        }
    }

    /// Current options
    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// The output sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the output sink
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the decoder, returning the sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Returns true once a fatal wiring error has stopped decoding
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Returns true if a poll run is being held back
    pub fn has_pending_polls(&self) -> bool {
        !self.polls.is_idle()
    }

    /// Validate the channel wiring reported by the host
    ///
    /// A missing line halts the decoder; the error is reported only once.
    pub fn check_channels(&mut self, config: &ChannelConfig) -> Result<(), ChannelError> {
        if self.halted {
            return Ok(());
        }
        config.validate().map_err(|e| self.halt(e))
    }

    /// Handle one packet from the framing layer
    pub fn decode(&mut self, event: FramingEvent) -> Result<(), ChannelError> {
        if self.halted {
            return Ok(());
        }
        if let Some(e) = event.channel_error() {
            return Err(self.halt(e));
        }
        if let FramingEvent::Transfer { mosi, miso } = event {
            self.transfer(mosi, miso);
        }
        Ok(())
    }

    /// Dissect one chip-select framed transaction
    ///
    /// Transactions with nothing captured on either line are skipped.
    pub fn transfer(&mut self, mosi: Vec<SpiByte>, miso: Vec<SpiByte>) {
        if self.halted {
            return;
        }
        match Transaction::new(mosi, miso) {
            Some(txn) => self.process(&txn),
            None => trace!("skipping transaction with an empty data line"),
        }
    }

    /// Dissect an already assembled transaction
    pub fn process(&mut self, txn: &Transaction) {
        if self.halted {
            return;
        }

        match parse_transaction(txn) {
            Ok(Command::Status(read)) => {
                let reading = PollReading::new(&read, txn);
                if let Some(annotation) = self.polls.observe(read.kind(), reading) {
                    self.emit(annotation);
                }
            }
            Ok(cmd) => {
                debug!(
                    "decoded {:?} at samples {}..{}",
                    cmd,
                    txn.span().start,
                    txn.span().end
                );
                self.flush_polls();
                for annotation in cmd.annotate(txn, &self.options.render()) {
                    self.emit(annotation);
                }
            }
            Err(e) => {
                warn!(
                    "undecodable transaction at sample {}: {:?}",
                    txn.span().start,
                    e
                );
                self.flush_polls();
                for annotation in e.annotate(txn, &self.options.render()) {
                    self.emit(annotation);
                }
            }
        }
    }

    /// End of capture: emit any poll run still being held back
    pub fn finish(&mut self) {
        if self.halted {
            return;
        }
        self.flush_polls();
    }

    /// Forget all per-capture state so the decoder can run again
    pub fn reset(&mut self) {
        self.polls.clear();
        self.halted = false;
    }

    fn flush_polls(&mut self) {
        if let Some(annotation) = self.polls.flush() {
            debug!("poll run ended: {}", annotation.label());
            self.emit(annotation);
        }
    }

    fn emit(&mut self, annotation: Annotation) {
        self.sink.put(annotation);
    }

    fn halt(&mut self, e: ChannelError) -> ChannelError {
        error!("{}", e);
        self.halted = true;
        self.polls.clear();
        e
    }
}

//! Merging of repeated status polls
//!
//! The MCU polls the glitch timer and the status flags in a tight loop while
//! waiting for the FPGA. Annotating every poll would bury the interesting
//! commands, so a run of identical readings is held back and emitted as one
//! wider annotation once something else happens.

use hwfly_protocol::{poll_annotation, Annotation, PollKind, PollReading};
use tracing::trace;

/// Pending poll runs, one per register
#[derive(Debug, Clone, Default)]
pub struct PollCoalescer {
    merge: bool,
    flags: Option<PollReading>,
    timer: Option<PollReading>,
}

impl PollCoalescer {
    /// Create an empty coalescer; with `merge == false` every poll is emitted
    pub fn new(merge: bool) -> Self {
        Self {
            merge,
            flags: None,
            timer: None,
        }
    }

    /// Returns true if no run is pending
    pub fn is_idle(&self) -> bool {
        self.flags.is_none() && self.timer.is_none()
    }

    /// Feed one poll result
    ///
    /// Returns the annotation for the pending runs if this reading ended
    /// them.
    pub fn observe(&mut self, kind: PollKind, reading: PollReading) -> Option<Annotation> {
        if !self.merge {
            *self.slot(kind) = Some(reading);
            return self.flush();
        }

        if let Some(pending) = self.slot(kind) {
            if pending.value == reading.value {
                trace!(?kind, value = %reading.value, "extending poll run");
                pending.span.end = reading.span.end;
                return None;
            }
        }

        let flushed = if self.slot(kind).is_some() {
            self.flush()
        } else {
            None
        };
        *self.slot(kind) = Some(reading);
        flushed
    }

    /// Emit and clear both pending runs
    pub fn flush(&mut self) -> Option<Annotation> {
        let annotation = poll_annotation(self.flags.as_ref(), self.timer.as_ref());
        self.flags = None;
        self.timer = None;
        annotation
    }

    /// Drop pending runs without emitting them
    pub fn clear(&mut self) {
        self.flags = None;
        self.timer = None;
    }

    fn slot(&mut self, kind: PollKind) -> &mut Option<PollReading> {
        match kind {
            PollKind::Flags => &mut self.flags,
            PollKind::GlitchTimer => &mut self.timer,
        }
    }
}

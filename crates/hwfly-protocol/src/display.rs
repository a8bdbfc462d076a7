//! Annotation rendering for decoded transactions
//!
//! An [`Annotation`] is a labelled sample span. Labels go from most to least
//! descriptive; the host picks the longest one that fits the space it has.
//! All categories share a single display row.
//!
//! Two layouts are supported:
//!
//! - [`Layout::Compact`]: one composite annotation per transaction
//! - [`Layout::Split`]: the command bytes and the payload/response bytes get
//!   separate annotations; reads can optionally keep command and response
//!   together

use crate::command::{ActiveBuffer, Command, ConfigCommand, ControlAction, FpgaId, StatusRead};
use crate::error::DecodeError;
use crate::transaction::{Span, Transaction};

/// Name of the row all annotations are drawn on
pub const ANNOTATION_ROW: &str = "Commands";

/// Annotation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnnotationClass {
    /// Read request
    Read,
    /// Write request
    Write,
    /// Value carried by a write
    Payload,
    /// Data returned by the FPGA
    Response,
    /// Anything that could not be decoded
    Garbage,
}

impl AnnotationClass {
    /// Every category, in registration order
    pub const ALL: [AnnotationClass; 5] = [
        Self::Read,
        Self::Write,
        Self::Payload,
        Self::Response,
        Self::Garbage,
    ];

    /// Short name used when registering the category with a host
    pub fn name(&self) -> &'static str {
        match self {
            Self::Read => "Read",
            Self::Write => "Write",
            Self::Payload => "Payload",
            Self::Response => "Response",
            Self::Garbage => "Garbage",
        }
    }

    /// Longer description shown in the host's legend
    pub fn description(&self) -> &'static str {
        match self {
            Self::Read => "Read request",
            Self::Write => "Write request",
            Self::Payload => "Command payload",
            Self::Response => "Response data",
            Self::Garbage => "Garbage (unknown)",
        }
    }
}

/// A labelled sample span ready for the host
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Annotation {
    /// Samples covered
    pub span: Span,
    /// Category
    pub class: AnnotationClass,
    /// Label variants, longest first
    pub labels: Vec<String>,
}

impl Annotation {
    /// Create an annotation
    pub fn new<I, L>(span: Span, class: AnnotationClass, labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            span,
            class,
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Most descriptive label
    pub fn label(&self) -> &str {
        self.labels.first().map(String::as_str).unwrap_or("")
    }
}

/// Output granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Layout {
    /// One annotation per transaction
    #[default]
    Compact,
    /// Command and payload/response annotated separately
    Split,
}

/// Options affecting how a decoded transaction is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Output granularity
    pub layout: Layout,
    /// In the split layout, keep a read command and its response together
    pub merge_read_response: bool,
}

impl RenderOptions {
    fn split_reads(&self) -> bool {
        self.layout == Layout::Split && !self.merge_read_response
    }
}

/// Trait for decode results that can describe themselves as annotations
pub trait TransactionAnnotation {
    /// Create annotations for this result over the transaction it came from
    fn annotate(&self, txn: &Transaction, options: &RenderOptions) -> Vec<Annotation>;
}

// ============================================================================
// Format Helpers
// ============================================================================

/// Space-separated two-digit uppercase hex
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// FPGA identifier as text, or hex if the exchange was malformed
pub fn format_fpga_id(id: &FpgaId) -> String {
    match id {
        FpgaId::Ascii(chars) => chars.iter().map(|&c| char::from(c)).collect(),
        FpgaId::Raw(data) => format_hex(data),
    }
}

/// Active buffer selector, long and short
pub fn format_active_buffer(buffer: ActiveBuffer) -> (String, String) {
    match buffer {
        ActiveBuffer::Cmd => ("CMD (traffic on cmd line)".into(), "cmd".into()),
        ActiveBuffer::Data => ("DATA (data host->device)".into(), "dta".into()),
        ActiveBuffer::Resp => ("RESP (data device->host)".into(), "rsp".into()),
        ActiveBuffer::Unknown(n) => (format!("unknown {}", n), "???".into()),
    }
}

/// Control action labels, longest first
pub fn control_action_labels(action: ControlAction) -> &'static [&'static str] {
    match action {
        ControlAction::StopGlitching => &["Stop glitching", "G:Stop", "G[]"],
        ControlAction::EnterCmdModeStep2 => &["Enter cmd mode 2/2", "CmdMode 2/2", "CM:2/2"],
        ControlAction::PostSend => &["Post send", "Send|"],
        ControlAction::EnterCmdModeStep1 => &["Enter cmd mode 1/2", "CmdMode 1/2", "CM:1/2"],
        ControlAction::PostRecv => &["Post recv", "Rcv|"],
        ControlAction::StartGlitching => &["Start glitching", "G:Start", "G|>"],
        ControlAction::ResetCmdStuck => &["Reset device (cmd stuck)", "Reset+CmdStuck", "Rst+CS"],
        ControlAction::Reset => &["Reset device (normal)", "Reset", "Rst"],
    }
}

// ============================================================================
// Status polls
// ============================================================================

/// One decoded status poll, ready to be merged with identical neighbours
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReading {
    /// From the opcode byte to the register byte
    pub span: Span,
    /// Display value, compared when merging
    pub value: String,
    /// Abbreviated display value
    pub short: String,
}

impl PollReading {
    /// Build the reading for a status read captured in `txn`
    pub fn new(read: &StatusRead, txn: &Transaction) -> Self {
        let start = txn.mosi()[0].start;
        let end = txn
            .miso()
            .get(2)
            .map(|b| b.end)
            .unwrap_or_else(|| txn.span().end);
        let (value, short) = match read {
            StatusRead::GlitchTimer(ticks) => (ticks.to_string(), ticks.to_string()),
            StatusRead::Flags(flags) => (flags.describe(), flags.describe_short()),
        };
        Self {
            span: Span::new(start, end),
            value,
            short,
        }
    }
}

/// Render pending flag and timer readings as one Read annotation
pub fn poll_annotation(
    flags: Option<&PollReading>,
    timer: Option<&PollReading>,
) -> Option<Annotation> {
    let span = match (flags, timer) {
        (Some(f), Some(t)) => f.span.union(t.span),
        (Some(f), None) => f.span,
        (None, Some(t)) => t.span,
        (None, None) => return None,
    };

    let mut long = Vec::with_capacity(2);
    let mut short = Vec::with_capacity(2);
    if let Some(f) = flags {
        long.push(format!("Flags: {}", f.value));
        short.push(format!("F:{}", f.short));
    }
    if let Some(t) = timer {
        long.push(format!("Glitch timer: {}", t.value));
        short.push(format!("T:{}", t.short));
    }

    Some(Annotation::new(
        span,
        AnnotationClass::Read,
        [long.join(", "), short.join(",")],
    ))
}

// ============================================================================
// TransactionAnnotation for Command
// ============================================================================

/// Span of MOSI bytes in `range`, or the whole transaction if they are missing
fn mosi_span(txn: &Transaction, range: std::ops::RangeInclusive<usize>) -> Span {
    txn.mosi_span(range).unwrap_or_else(|| txn.span())
}

fn miso_span(txn: &Transaction, range: std::ops::RangeInclusive<usize>) -> Span {
    txn.miso_span(range).unwrap_or_else(|| txn.span())
}

/// Name, abbreviation and formatted value of a valued configuration command
struct ConfigValue {
    name: &'static str,
    abbrev: &'static str,
    value: String,
    short: String,
    last_byte: usize,
}

fn config_value(cmd: &ConfigCommand) -> Option<ConfigValue> {
    let plain = |name, abbrev, value: u8| ConfigValue {
        name,
        abbrev,
        value: value.to_string(),
        short: value.to_string(),
        last_byte: 2,
    };
    match *cmd {
        ConfigCommand::SetGlitchOffset(offset) => Some(ConfigValue {
            name: "Set glitch offset",
            abbrev: "GO",
            value: offset.to_string(),
            short: offset.to_string(),
            last_byte: 3,
        }),
        ConfigCommand::SetGlitchWidth(v) => Some(plain("Set glitch width", "GW", v)),
        ConfigCommand::SetGlitchTimeout(v) => Some(plain("Set glitch timeout", "GT", v)),
        ConfigCommand::SetSubcycleDelay(v) => Some(plain("Set subcycle delay", "SD", v)),
        ConfigCommand::SelectBuffer(buffer) => {
            let (value, short) = format_active_buffer(buffer);
            Some(ConfigValue {
                name: "Select active buffer",
                abbrev: "SB",
                value,
                short,
                last_byte: 2,
            })
        }
        ConfigCommand::Control(_) => None,
    }
}

fn annotate_config(cmd: &ConfigCommand, txn: &Transaction, layout: Layout) -> Vec<Annotation> {
    // Control actions carry no payload; the selector is part of the opcode
    if let ConfigCommand::Control(action) = cmd {
        return vec![Annotation::new(
            mosi_span(txn, 0..=2),
            AnnotationClass::Write,
            control_action_labels(*action).iter().copied(),
        )];
    }
    let Some(v) = config_value(cmd) else {
        return Vec::new();
    };

    match layout {
        Layout::Compact => vec![Annotation::new(
            mosi_span(txn, 0..=v.last_byte),
            AnnotationClass::Write,
            [
                format!("{}: {}", v.name, v.value),
                format!("{}:{}", v.abbrev, v.short),
            ],
        )],
        Layout::Split => vec![
            Annotation::new(
                mosi_span(txn, 0..=1),
                AnnotationClass::Write,
                [v.name, v.abbrev],
            ),
            Annotation::new(
                mosi_span(txn, 2..=v.last_byte),
                AnnotationClass::Payload,
                [v.value, v.short],
            ),
        ],
    }
}

/// Read whose response may be split off: labels for the command alone and
/// for the combined form
fn annotate_read(
    txn: &Transaction,
    options: &RenderOptions,
    command_labels: &[&str],
    response: String,
    combined: Vec<String>,
) -> Vec<Annotation> {
    if !options.split_reads() {
        return vec![Annotation::new(
            miso_span(txn, 0..=usize::MAX),
            AnnotationClass::Read,
            combined,
        )];
    }

    let mut out = vec![Annotation::new(
        mosi_span(txn, 0..=0),
        AnnotationClass::Read,
        command_labels.iter().copied(),
    )];
    if let Some(span) = txn.miso_span(1..=usize::MAX) {
        out.push(Annotation::new(span, AnnotationClass::Response, [response]));
    }
    out
}

impl TransactionAnnotation for Command {
    fn annotate(&self, txn: &Transaction, options: &RenderOptions) -> Vec<Annotation> {
        match self {
            Command::Config(cmd) => annotate_config(cmd, txn, options.layout),
            Command::Status(read) => {
                let reading = PollReading::new(read, txn);
                let (flags, timer) = match read {
                    StatusRead::Flags(_) => (Some(&reading), None),
                    StatusRead::GlitchTimer(_) => (None, Some(&reading)),
                };
                poll_annotation(flags, timer).into_iter().collect()
            }
            Command::DoEmmc => vec![Annotation::new(
                miso_span(txn, 0..=0),
                AnnotationClass::Write,
                ["Do eMMC command", "MMC|>"],
            )],
            Command::ReadBuffer { data } => {
                let hex = format_hex(data);
                let combined = vec![format!("Read buffer: {}", hex), "RdBuf".to_string()];
                annotate_read(txn, options, &["Read buffer", "RdBuf"], hex, combined)
            }
            Command::WriteBuffer { data } => {
                let hex = format_hex(data);
                if options.layout == Layout::Compact {
                    return vec![Annotation::new(
                        mosi_span(txn, 0..=usize::MAX),
                        AnnotationClass::Write,
                        [format!("Write buffer: {}", hex), "WrBuf".to_string()],
                    )];
                }
                let mut out = vec![Annotation::new(
                    mosi_span(txn, 0..=0),
                    AnnotationClass::Write,
                    ["Write buffer", "WrBuf"],
                )];
                if let Some(span) = txn.mosi_span(1..=usize::MAX) {
                    out.push(Annotation::new(span, AnnotationClass::Payload, [hex]));
                }
                out
            }
            Command::ReadFpgaId(id) => {
                let text = format_fpga_id(id);
                let combined = vec![
                    format!("FPGA Id: {}", text),
                    format!("ID:{}", text),
                    "Id".to_string(),
                ];
                annotate_read(txn, options, &["Read FPGA Id", "RdId", "Id"], text, combined)
            }
        }
    }
}

impl TransactionAnnotation for DecodeError {
    fn annotate(&self, txn: &Transaction, _options: &RenderOptions) -> Vec<Annotation> {
        vec![Annotation::new(
            txn.span(),
            AnnotationClass::Garbage,
            [self.to_string(), self.short_label().to_string()],
        )]
    }
}

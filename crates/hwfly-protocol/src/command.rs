//! hwfly-nx command model
//!
//! Every transaction starts with an opcode byte clocked out by the MCU. Some
//! families select a sub-command with the second (and for 0x24 0x06, third)
//! byte:
//!
//! ```text
//! 24 01 lo hi        set glitch offset (u16, little-endian)
//! 24 02 nn           set glitch width
//! 24 03 nn           set glitch timeout
//! 24 05 nn           select active buffer
//! 24 06 aa           control action (start/stop glitching, resets, ...)
//! 24 08 nn           set subcycle delay
//! 26 0A xx           read glitch timer  (value on MISO byte 2)
//! 26 0B xx           read status flags  (value on MISO byte 2)
//! 54                 do eMMC command
//! BA xx xx ...       read active buffer (data on MISO)
//! BC dd dd ...       write active buffer (data on MOSI)
//! EE xx xx xx xx     read FPGA identifier (four ASCII characters on MISO)
//! ```

use crate::error::DecodeError;
use crate::flags::StatusFlags;
use crate::EncodeCommand;

/// Configuration commands
pub const OP_CONFIG: u8 = 0x24;
/// Status/telemetry reads
pub const OP_STATUS: u8 = 0x26;
/// Kick off the queued eMMC command
pub const OP_DO_EMMC: u8 = 0x54;
/// Read the active buffer
pub const OP_READ_BUFFER: u8 = 0xBA;
/// Write the active buffer
pub const OP_WRITE_BUFFER: u8 = 0xBC;
/// Read the FPGA identifier
pub const OP_READ_FPGA_ID: u8 = 0xEE;

/// 0x24 sub-command: set glitch offset
pub const CFG_GLITCH_OFFSET: u8 = 0x01;
/// 0x24 sub-command: set glitch width
pub const CFG_GLITCH_WIDTH: u8 = 0x02;
/// 0x24 sub-command: set glitch timeout
pub const CFG_GLITCH_TIMEOUT: u8 = 0x03;
/// 0x24 sub-command: select active buffer
pub const CFG_SELECT_BUFFER: u8 = 0x05;
/// 0x24 sub-command: control action selected by the third byte
pub const CFG_CONTROL: u8 = 0x06;
/// 0x24 sub-command: set subcycle delay
pub const CFG_SUBCYCLE_DELAY: u8 = 0x08;

/// 0x26 sub-command: read glitch timer
pub const STATUS_GLITCH_TIMER: u8 = 0x0A;
/// 0x26 sub-command: read status flags
pub const STATUS_FLAGS: u8 = 0x0B;

/// Decoded hwfly-nx command
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// 0x24 family
    Config(ConfigCommand),
    /// 0x26 family
    Status(StatusRead),
    /// Start the eMMC command loaded into the CMD buffer
    DoEmmc,
    /// Active buffer contents returned by the FPGA
    ReadBuffer { data: Vec<u8> },
    /// Bytes written into the active buffer
    WriteBuffer { data: Vec<u8> },
    /// FPGA identifier
    ReadFpgaId(FpgaId),
}

impl Command {
    /// Leading byte of this command on the wire
    pub fn opcode(&self) -> u8 {
        match self {
            Self::Config(_) => OP_CONFIG,
            Self::Status(_) => OP_STATUS,
            Self::DoEmmc => OP_DO_EMMC,
            Self::ReadBuffer { .. } => OP_READ_BUFFER,
            Self::WriteBuffer { .. } => OP_WRITE_BUFFER,
            Self::ReadFpgaId(_) => OP_READ_FPGA_ID,
        }
    }
}

/// 0x24 configuration commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConfigCommand {
    /// Delay before the glitch pulse
    SetGlitchOffset(u16),
    /// Glitch pulse width
    SetGlitchWidth(u8),
    /// How long to wait for a glitch result
    SetGlitchTimeout(u8),
    /// Buffer addressed by subsequent 0xBA/0xBC transfers
    SelectBuffer(ActiveBuffer),
    /// 0x24 0x06 control action
    Control(ControlAction),
    /// Fine-grained delay in FPGA subcycles
    SetSubcycleDelay(u8),
}

impl ConfigCommand {
    /// Second byte on the wire
    pub fn sub_opcode(&self) -> u8 {
        match self {
            Self::SetGlitchOffset(_) => CFG_GLITCH_OFFSET,
            Self::SetGlitchWidth(_) => CFG_GLITCH_WIDTH,
            Self::SetGlitchTimeout(_) => CFG_GLITCH_TIMEOUT,
            Self::SelectBuffer(_) => CFG_SELECT_BUFFER,
            Self::Control(_) => CFG_CONTROL,
            Self::SetSubcycleDelay(_) => CFG_SUBCYCLE_DELAY,
        }
    }
}

/// FPGA buffer selected with 0x24 0x05
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActiveBuffer {
    /// Traffic on the eMMC CMD line
    Cmd,
    /// Data host → device
    Data,
    /// Data device → host
    Resp,
    /// Any other selector value
    Unknown(u8),
}

impl From<u8> for ActiveBuffer {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Cmd,
            1 => Self::Data,
            2 => Self::Resp,
            other => Self::Unknown(other),
        }
    }
}

impl From<ActiveBuffer> for u8 {
    fn from(buffer: ActiveBuffer) -> Self {
        match buffer {
            ActiveBuffer::Cmd => 0,
            ActiveBuffer::Data => 1,
            ActiveBuffer::Resp => 2,
            ActiveBuffer::Unknown(other) => other,
        }
    }
}

/// 0x24 0x06 control actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlAction {
    StopGlitching = 0x00,
    /// Second half of the command-mode handshake
    EnterCmdModeStep2 = 0x01,
    /// Marker written after the MCU finished sending
    PostSend = 0x03,
    /// First half of the command-mode handshake
    EnterCmdModeStep1 = 0x04,
    /// Marker written after the MCU finished receiving
    PostRecv = 0x05,
    StartGlitching = 0x10,
    /// Reset the target while holding CMD
    ResetCmdStuck = 0x40,
    Reset = 0x80,
}

impl TryFrom<u8> for ControlAction {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::StopGlitching),
            0x01 => Ok(Self::EnterCmdModeStep2),
            0x03 => Ok(Self::PostSend),
            0x04 => Ok(Self::EnterCmdModeStep1),
            0x05 => Ok(Self::PostRecv),
            0x10 => Ok(Self::StartGlitching),
            0x40 => Ok(Self::ResetCmdStuck),
            0x80 => Ok(Self::Reset),
            other => Err(DecodeError::UnknownControlAction(other)),
        }
    }
}

/// 0x26 status reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusRead {
    /// Glitch timer value
    GlitchTimer(u8),
    /// Status register
    Flags(StatusFlags),
}

/// Which of the two polled registers a status read targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PollKind {
    GlitchTimer,
    Flags,
}

impl StatusRead {
    /// Register this read targets
    pub fn kind(&self) -> PollKind {
        match self {
            Self::GlitchTimer(_) => PollKind::GlitchTimer,
            Self::Flags(_) => PollKind::Flags,
        }
    }

    /// Second byte on the wire
    pub fn sub_opcode(&self) -> u8 {
        match self.kind() {
            PollKind::GlitchTimer => STATUS_GLITCH_TIMER,
            PollKind::Flags => STATUS_FLAGS,
        }
    }
}

/// FPGA identifier as returned by 0xEE
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FpgaId {
    /// Well-formed 5-byte exchange: four characters
    Ascii([u8; 4]),
    /// Any other length: raw response bytes
    Raw(Vec<u8>),
}

impl FpgaId {
    /// Response bytes following the opcode
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Ascii(id) => id,
            Self::Raw(data) => data,
        }
    }
}

impl EncodeCommand for Command {
    fn encode(&self) -> Vec<u8> {
        match self {
            Self::Config(cmd) => {
                let mut bytes = vec![OP_CONFIG, cmd.sub_opcode()];
                match cmd {
                    ConfigCommand::SetGlitchOffset(offset) => {
                        bytes.extend_from_slice(&offset.to_le_bytes())
                    }
                    ConfigCommand::SetGlitchWidth(value)
                    | ConfigCommand::SetGlitchTimeout(value)
                    | ConfigCommand::SetSubcycleDelay(value) => bytes.push(*value),
                    ConfigCommand::SelectBuffer(buffer) => bytes.push((*buffer).into()),
                    ConfigCommand::Control(action) => bytes.push(*action as u8),
                }
                bytes
            }
            // Third byte only clocks the register value out of the FPGA
            Self::Status(read) => vec![OP_STATUS, read.sub_opcode(), 0x00],
            Self::DoEmmc => vec![OP_DO_EMMC],
            Self::ReadBuffer { data } => {
                let mut bytes = vec![0x00; data.len() + 1];
                bytes[0] = OP_READ_BUFFER;
                bytes
            }
            Self::WriteBuffer { data } => {
                let mut bytes = Vec::with_capacity(data.len() + 1);
                bytes.push(OP_WRITE_BUFFER);
                bytes.extend_from_slice(data);
                bytes
            }
            Self::ReadFpgaId(id) => {
                let mut bytes = vec![0x00; id.bytes().len() + 1];
                bytes[0] = OP_READ_FPGA_ID;
                bytes
            }
        }
    }
}

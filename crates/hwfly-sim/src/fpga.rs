//! Simulated hwfly-nx FPGA
//!
//! A test model for producing captures without a modchip on the bench. Only
//! the wire format is authoritative: opcodes, field positions and where the
//! answer bytes sit on MISO. How the status flags react to control actions
//! and glitch outcomes (for example `PostSend` clearing `BUSY_SENDING`, or a
//! hit setting `GLITCH_DT_CAPTURED`) is invented for the tests and is not
//! documented gateware behaviour.

use hwfly_protocol::command::{
    CFG_CONTROL, CFG_GLITCH_OFFSET, CFG_GLITCH_TIMEOUT, CFG_GLITCH_WIDTH, CFG_SELECT_BUFFER,
    CFG_SUBCYCLE_DELAY, OP_CONFIG, OP_DO_EMMC, OP_READ_BUFFER, OP_READ_FPGA_ID, OP_STATUS,
    OP_WRITE_BUFFER, STATUS_FLAGS, STATUS_GLITCH_TIMER,
};
use hwfly_protocol::{ActiveBuffer, ControlAction, StatusFlags};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Configuration for creating a simulated FPGA
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FpgaConfig {
    /// Identifier returned by 0xEE
    pub id: [u8; 4],
    /// Byte returned on MISO while the FPGA has nothing to say
    pub idle_byte: u8,
}

impl Default for FpgaConfig {
    fn default() -> Self {
        Self {
            id: *b"NXF2",
            idle_byte: 0x00,
        }
    }
}

/// A simulated FPGA answering MCU transactions
#[derive(Debug, Clone)]
pub struct SimulatedFpga {
    config: FpgaConfig,
    glitch_offset: u16,
    glitch_width: u8,
    glitch_timeout: u8,
    subcycle_delay: u8,
    active: ActiveBuffer,
    /// CMD, DATA and RESP buffers
    buffers: [Vec<u8>; 3],
    flags: StatusFlags,
    glitch_timer: u8,
    glitching: bool,
}

impl Default for SimulatedFpga {
    fn default() -> Self {
        Self::new(FpgaConfig::default())
    }
}

impl SimulatedFpga {
    /// Create a simulated FPGA in its power-on state
    pub fn new(config: FpgaConfig) -> Self {
        Self {
            config,
            glitch_offset: 0,
            glitch_width: 0,
            glitch_timeout: 0,
            subcycle_delay: 0,
            active: ActiveBuffer::Cmd,
            buffers: Default::default(),
            flags: StatusFlags::empty(),
            glitch_timer: 0,
            glitching: false,
        }
    }

    /// Clock one transaction through the FPGA
    ///
    /// Returns the MISO bytes, one per MOSI byte.
    pub fn respond(&mut self, mosi: &[u8]) -> Vec<u8> {
        let mut miso = vec![self.config.idle_byte; mosi.len()];
        let Some(&opcode) = mosi.first() else {
            return miso;
        };
        let arg = |i: usize| mosi.get(i).copied();

        match opcode {
            OP_CONFIG => self.configure(arg(1), arg(2), arg(3)),
            OP_STATUS => {
                let register = match arg(1) {
                    Some(STATUS_GLITCH_TIMER) => Some(self.glitch_timer),
                    Some(STATUS_FLAGS) => Some(self.flags.bits()),
                    _ => None,
                };
                if let (Some(value), Some(slot)) = (register, miso.get_mut(2)) {
                    *slot = value;
                }
            }
            OP_DO_EMMC => {
                debug!("sending CMD buffer ({} bytes)", self.buffer().len());
                self.flags.insert(StatusFlags::BUSY_SENDING);
            }
            OP_READ_BUFFER => {
                for (slot, &byte) in miso.iter_mut().skip(1).zip(self.buffer().iter()) {
                    *slot = byte;
                }
            }
            OP_WRITE_BUFFER => {
                let data = mosi[1..].to_vec();
                trace!("buffer {:?} <- {} bytes", self.active, data.len());
                if let Some(buffer) = self.buffer_mut() {
                    *buffer = data;
                }
            }
            OP_READ_FPGA_ID => {
                for (slot, &c) in miso.iter_mut().skip(1).zip(self.config.id.iter()) {
                    *slot = c;
                }
            }
            other => trace!("ignoring opcode 0x{:02X}", other),
        }
        miso
    }

    fn configure(&mut self, sub: Option<u8>, a: Option<u8>, b: Option<u8>) {
        match (sub, a) {
            (Some(CFG_GLITCH_OFFSET), Some(lo)) => {
                self.glitch_offset = u16::from_le_bytes([lo, b.unwrap_or(0)]);
            }
            (Some(CFG_GLITCH_WIDTH), Some(v)) => self.glitch_width = v,
            (Some(CFG_GLITCH_TIMEOUT), Some(v)) => self.glitch_timeout = v,
            (Some(CFG_SELECT_BUFFER), Some(v)) => self.active = ActiveBuffer::from(v),
            (Some(CFG_SUBCYCLE_DELAY), Some(v)) => self.subcycle_delay = v,
            (Some(CFG_CONTROL), Some(v)) => {
                if let Ok(action) = ControlAction::try_from(v) {
                    self.control(action);
                }
            }
            _ => trace!("ignoring configuration write {:?} {:?}", sub, a),
        }
    }

    fn control(&mut self, action: ControlAction) {
        debug!("control action {:?}", action);
        match action {
            ControlAction::StartGlitching => {
                self.glitching = true;
                self.glitch_timer = 0;
                self.flags.remove(
                    StatusFlags::GLITCH_SUCCESS
                        | StatusFlags::GLITCH_TIMEOUT
                        | StatusFlags::GLITCH_DT_CAPTURED,
                );
            }
            ControlAction::StopGlitching => self.glitching = false,
            ControlAction::PostSend => self.flags.remove(StatusFlags::BUSY_SENDING),
            ControlAction::Reset | ControlAction::ResetCmdStuck => {
                self.glitching = false;
                self.flags = StatusFlags::empty();
                self.glitch_timer = 0;
            }
            ControlAction::EnterCmdModeStep1
            | ControlAction::EnterCmdModeStep2
            | ControlAction::PostRecv => {}
        }
    }

    /// Let the glitch attempt in progress succeed after `ticks`
    pub fn glitch_succeeded(&mut self, ticks: u8) {
        self.glitching = false;
        self.glitch_timer = ticks;
        self.flags
            .insert(StatusFlags::GLITCH_SUCCESS | StatusFlags::GLITCH_DT_CAPTURED);
    }

    /// Let the glitch attempt in progress time out
    pub fn glitch_timed_out(&mut self) {
        self.glitching = false;
        self.glitch_timer = self.glitch_timeout;
        self.flags.insert(StatusFlags::GLITCH_TIMEOUT);
    }

    /// Advance the glitch timer while glitching
    pub fn tick(&mut self) {
        if self.glitching {
            self.glitch_timer = self.glitch_timer.wrapping_add(1);
        }
    }

    /// Pretend the loader payload arrived
    pub fn loader_data_received(&mut self) {
        self.flags.insert(StatusFlags::LOADER_DATA_RCVD);
    }

    /// Fill a buffer as the eMMC side would
    pub fn load_buffer(&mut self, buffer: ActiveBuffer, data: &[u8]) {
        if let Some(index) = buffer_index(buffer) {
            self.buffers[index] = data.to_vec();
        }
    }

    /// Current status register
    pub fn flags(&self) -> StatusFlags {
        self.flags
    }

    /// Current glitch timer
    pub fn glitch_timer(&self) -> u8 {
        self.glitch_timer
    }

    /// Returns true while a glitch attempt is armed
    pub fn is_glitching(&self) -> bool {
        self.glitching
    }

    /// Last glitch offset written
    pub fn glitch_offset(&self) -> u16 {
        self.glitch_offset
    }

    /// Last glitch width written
    pub fn glitch_width(&self) -> u8 {
        self.glitch_width
    }

    /// Last subcycle delay written
    pub fn subcycle_delay(&self) -> u8 {
        self.subcycle_delay
    }

    /// Currently selected buffer
    pub fn active_buffer(&self) -> ActiveBuffer {
        self.active
    }

    /// Contents of the currently selected buffer
    pub fn buffer(&self) -> &[u8] {
        buffer_index(self.active)
            .map(|i| self.buffers[i].as_slice())
            .unwrap_or(&[])
    }

    fn buffer_mut(&mut self) -> Option<&mut Vec<u8>> {
        buffer_index(self.active).map(|i| &mut self.buffers[i])
    }
}

fn buffer_index(buffer: ActiveBuffer) -> Option<usize> {
    match buffer {
        ActiveBuffer::Cmd => Some(0),
        ActiveBuffer::Data => Some(1),
        ActiveBuffer::Resp => Some(2),
        ActiveBuffer::Unknown(_) => None,
    }
}

//! Transaction classification
//!
//! Turns one captured [`Transaction`] into a [`Command`]. Length checks use
//! the longer of the two lines, matching how the FPGA clocks both sides
//! together; a field byte that is missing on the line it is read from is
//! reported as a short transaction instead of being guessed.

use crate::command::{
    ActiveBuffer, Command, ConfigCommand, ControlAction, FpgaId, StatusRead, CFG_CONTROL,
    CFG_GLITCH_OFFSET, CFG_GLITCH_TIMEOUT, CFG_GLITCH_WIDTH, CFG_SELECT_BUFFER,
    CFG_SUBCYCLE_DELAY, OP_CONFIG, OP_DO_EMMC, OP_READ_BUFFER, OP_READ_FPGA_ID, OP_STATUS,
    OP_WRITE_BUFFER, STATUS_FLAGS, STATUS_GLITCH_TIMER,
};
use crate::error::DecodeError;
use crate::flags::StatusFlags;
use crate::transaction::Transaction;

/// Minimum transaction length of the 0x24 and 0x26 families
const MIN_FAMILY_LEN: usize = 3;

/// Exact transaction length of a well-formed FPGA identifier read
const FPGA_ID_LEN: usize = 5;

/// Classify a transaction and extract its fields
pub fn parse_transaction(txn: &Transaction) -> Result<Command, DecodeError> {
    match txn.opcode() {
        OP_CONFIG => parse_config(txn).map(Command::Config),
        OP_STATUS => parse_status(txn).map(Command::Status),
        OP_DO_EMMC => Ok(Command::DoEmmc),
        OP_READ_BUFFER => Ok(Command::ReadBuffer {
            data: values(&txn.miso()[1..]),
        }),
        OP_WRITE_BUFFER => Ok(Command::WriteBuffer {
            data: values(&txn.mosi()[1..]),
        }),
        OP_READ_FPGA_ID => Ok(Command::ReadFpgaId(parse_fpga_id(txn))),
        other => Err(DecodeError::UnknownOpcode(other)),
    }
}

fn values(bytes: &[crate::SpiByte]) -> Vec<u8> {
    bytes.iter().map(|b| b.value).collect()
}

fn too_short(txn: &Transaction) -> DecodeError {
    DecodeError::TooShort {
        opcode: txn.opcode(),
        len: txn.byte_count(),
    }
}

fn parse_config(txn: &Transaction) -> Result<ConfigCommand, DecodeError> {
    if txn.byte_count() < MIN_FAMILY_LEN {
        return Err(too_short(txn));
    }
    let sub = txn.mosi_value(1).ok_or_else(|| too_short(txn))?;
    let payload = || txn.mosi_value(2).ok_or_else(|| too_short(txn));

    match sub {
        CFG_GLITCH_OFFSET => match (txn.mosi_value(2), txn.mosi_value(3)) {
            (Some(lo), Some(hi)) => Ok(ConfigCommand::SetGlitchOffset(u16::from_le_bytes([
                lo, hi,
            ]))),
            _ => Err(DecodeError::InvalidGlitchOffset),
        },
        CFG_GLITCH_WIDTH => Ok(ConfigCommand::SetGlitchWidth(payload()?)),
        CFG_GLITCH_TIMEOUT => Ok(ConfigCommand::SetGlitchTimeout(payload()?)),
        CFG_SELECT_BUFFER => Ok(ConfigCommand::SelectBuffer(ActiveBuffer::from(payload()?))),
        CFG_CONTROL => ControlAction::try_from(payload()?).map(ConfigCommand::Control),
        CFG_SUBCYCLE_DELAY => Ok(ConfigCommand::SetSubcycleDelay(payload()?)),
        other => Err(DecodeError::UnknownConfigCommand(other)),
    }
}

fn parse_status(txn: &Transaction) -> Result<StatusRead, DecodeError> {
    if txn.byte_count() < MIN_FAMILY_LEN {
        return Err(too_short(txn));
    }
    let sub = txn.mosi_value(1).ok_or_else(|| too_short(txn))?;
    let register = || txn.miso_value(2).ok_or_else(|| too_short(txn));

    match sub {
        STATUS_GLITCH_TIMER => Ok(StatusRead::GlitchTimer(register()?)),
        STATUS_FLAGS => Ok(StatusRead::Flags(StatusFlags::from_bits_retain(register()?))),
        other => Err(DecodeError::UnknownStatusRead(other)),
    }
}

fn parse_fpga_id(txn: &Transaction) -> FpgaId {
    let response = values(&txn.miso()[1..]);
    match <[u8; 4]>::try_from(response.as_slice()) {
        Ok(id) if txn.byte_count() == FPGA_ID_LEN => FpgaId::Ascii(id),
        _ => {
            tracing::trace!("FPGA id read with {} bytes, keeping raw", txn.byte_count());
            FpgaId::Raw(response)
        }
    }
}

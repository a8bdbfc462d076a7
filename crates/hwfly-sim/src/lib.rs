//! hwfly-nx Simulation Library
//!
//! This crate produces realistic captures for testing the dissector without
//! a modchip or a logic analyzer. It includes:
//!
//! - **SimulatedFpga**: answers MCU commands and tracks glitch state
//! - **CaptureBuilder**: lays transactions out on a sample timeline
//!
//! # Example
//!
//! ```rust
//! use hwfly_sim::{CaptureBuilder, SimulatedFpga};
//! use hwfly_protocol::{Command, ConfigCommand, ControlAction, StatusFlags, StatusRead};
//!
//! let mut fpga = SimulatedFpga::default();
//! let mut capture = CaptureBuilder::default();
//!
//! // Arm a glitch attempt, let it hit, then poll the status register
//! let start = Command::Config(ConfigCommand::Control(ControlAction::StartGlitching));
//! capture.exchange(&mut fpga, &start);
//! fpga.glitch_succeeded(42);
//! capture.poll(&mut fpga, &Command::Status(StatusRead::Flags(StatusFlags::empty())), 3);
//!
//! assert_eq!(capture.transactions().len(), 4);
//! ```

pub mod capture;
pub mod fpga;

pub use capture::{CaptureBuilder, CaptureTiming};
pub use fpga::{FpgaConfig, SimulatedFpga};

//! Centaur embedded Ethernet MAC driver.
//!
//! DMA descriptor ring management and the interrupt-driven receive/transmit
//! pipeline for the Centaur SoC Ethernet ports (WAN, LAN switch, HPNA).
//!
//! The driver is split the same way the hardware is:
//!
//! - [`dma`] - descriptor rings, frame buffers and their ownership tracking
//! - [`driver`] - the per-port device context: submission, interrupt top
//!   halves, the budgeted receive processor and lifecycle control
//! - [`hal`] - the register-access seam ([`hal::MacHal`]); real hardware uses
//!   the MMIO implementation, tests script their own
//! - [`stack`] - smoltcp `phy::Device` bridge
//!
//! Interrupt top halves are short and lock-light; all receive consumption
//! happens in the budgeted [`driver::CentaurMac::poll`] path.

#![no_std]
#![allow(dead_code)]

pub mod dma;
pub mod driver;
pub mod hal;
pub mod logger;
pub mod regs;
pub mod stack;
pub mod stats;
pub mod traits;
pub mod types;

pub use driver::{CentaurMac, MacConfig, PortType, ProbeError, RunState};
pub use traits::{FrameSink, NetworkDriver, RxError, TxError};
pub use types::MacAddress;

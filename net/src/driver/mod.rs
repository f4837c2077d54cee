//! The per-port device context.
//!
//! One [`CentaurMac`] per Ethernet port, holding the two descriptor rings,
//! their buffer trackers and pools, and the lifecycle state. All state that
//! interrupt handlers touch sits behind spinlocks or atomics, so the whole
//! driver surface takes `&self` and the top halves can share the context
//! with the synchronous paths.
//!
//! Split by concern:
//!
//! - [`device`] - reset / init / shutdown / suspend / resume / watchdog
//! - [`tx`] - frame submission and completion reclaim
//! - [`rx`] - the budgeted receive processor and ring refill
//! - [`irq`] - interrupt top halves and RX interrupt masking
//! - [`filter`] - station address and multicast/promiscuous filtering
//! - [`phy`] - media (speed/duplex/autoneg/pause) operations

mod device;
mod filter;
mod irq;
mod phy;
mod rx;
mod tx;

#[cfg(test)]
mod tests;

pub use device::OpenError;
pub use filter::{AddressError, RxMode};
pub use phy::{Advertise, Duplex, LinkSettings, MediaError, PauseParams, Speed};

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use dma_pool::{DmaArena, DmaError};
use spin::Mutex;

use crate::dma::{
    FramePool, RxRing, TxRing, MAX_RXBUF_SIZE, RX_RING_BYTES, RX_RING_SIZE, TX_RING_BYTES,
    TX_RING_SIZE,
};
use crate::dma::desc::{RxDesc, TxDesc};
use crate::hal::MacHal;
use crate::log_warn;
use crate::regs;
use crate::stats::{MacStats, StatsSnapshot};
use crate::traits::{FrameSink, NetworkDriver, RxError, TxError};
use crate::types::MacAddress;

/// Driver name reported by [`CentaurMac::driver_info`].
pub const DRIVER_NAME: &str = "centaur-eth";
/// Driver version.
pub const DRIVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default receive budget per poll invocation. Larger than the RX ring so a
/// full ring can drain in one pass.
pub const RX_POLL_BUDGET: usize = 64;

/// Default transmit watchdog in milliseconds.
pub const DEFAULT_WATCHDOG_MS: u32 = 5000;

/// Which of the three Ethernet ports this context drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortType {
    /// WAN port with its own PHY.
    Wan,
    /// LAN port backed by the direct-attached switch.
    Lan,
    /// HPNA port, no PHY at all.
    Hpna,
}

impl PortType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortType::Wan => "WAN",
            PortType::Lan => "LAN",
            PortType::Hpna => "HPNA",
        }
    }
}

/// Static per-port configuration.
#[derive(Debug, Clone, Copy)]
pub struct MacConfig {
    pub port: PortType,
    /// RX interrupt line (bit number in the global enable register).
    pub rx_irq: u8,
    /// TX interrupt line.
    pub tx_irq: u8,
    /// Link-state interrupt line, if the port has one.
    pub link_irq: Option<u8>,
    /// Transmit watchdog / reset-poll bound in milliseconds.
    pub watchdog_ms: u32,
}

impl MacConfig {
    pub fn new(port: PortType, rx_irq: u8, tx_irq: u8, link_irq: Option<u8>) -> Self {
        Self {
            port,
            rx_irq,
            tx_irq,
            link_irq,
            watchdog_ms: DEFAULT_WATCHDOG_MS,
        }
    }
}

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    Down = 0,
    Resetting = 1,
    Running = 2,
    Suspended = 3,
}

/// Attach-time failures. Nothing here is recoverable at runtime; the caller
/// gives up on the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    /// DMA arena could not back the rings or buffer pools.
    Dma(DmaError),
}

impl From<DmaError> for ProbeError {
    fn from(err: DmaError) -> Self {
        ProbeError::Dma(err)
    }
}

/// One ring slot's software-side view: which pool buffer is in flight there
/// and how long its frame is. Index-aligned 1:1 with the descriptor ring.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BufferSlot {
    pub(crate) buf: Option<u16>,
    pub(crate) len: usize,
}

impl BufferSlot {
    pub(crate) const EMPTY: BufferSlot = BufferSlot { buf: None, len: 0 };
}

/// TX side state, guarded by the transmit-queue lock.
pub(crate) struct TxState {
    pub(crate) ring: TxRing,
    pub(crate) slots: [BufferSlot; TX_RING_SIZE],
    pub(crate) pool: FramePool,
    /// Slots currently owned by hardware (or awaiting reclaim).
    pub(crate) used: usize,
    /// Next slot to submit into.
    pub(crate) next_slot: usize,
}

/// RX side state, guarded by the receive lock.
pub(crate) struct RxState {
    pub(crate) ring: RxRing,
    pub(crate) slots: [BufferSlot; RX_RING_SIZE],
    pub(crate) pool: FramePool,
    /// Next descriptor to check for a completed frame.
    pub(crate) next_to_read: usize,
}

/// Centaur Ethernet MAC driver context.
pub struct CentaurMac<H: MacHal> {
    pub(crate) hal: H,
    pub(crate) config: MacConfig,
    pub(crate) mac: Mutex<MacAddress>,
    pub(crate) tx: Mutex<TxState>,
    pub(crate) rx: Mutex<RxState>,
    pub(crate) filter: Mutex<RxMode>,
    pub(crate) stats: MacStats,
    state: AtomicU8,
    /// Intended enable state of this port's interrupt lines. The hardware
    /// register is rewritten from this after every masked critical section.
    pub(crate) irq_shadow: AtomicU32,
    pub(crate) poll_scheduled: AtomicBool,
    pub(crate) queue_stopped: AtomicBool,
    pub(crate) carrier: AtomicBool,
    /// Restart on resume only if the port was running when suspended.
    pub(crate) resume_running: AtomicBool,
    msg_enable: AtomicU32,
}

impl<H: MacHal> CentaurMac<H> {
    /// Attach to one Ethernet port.
    ///
    /// Carves both descriptor rings and both frame pools out of `arena`,
    /// chains the rings, reads the bootloader-programmed station address
    /// back from the chip and brings the PHY or switch to its defaults.
    /// The engines stay disabled until [`open`](Self::open).
    pub fn new(hal: H, config: MacConfig, arena: &mut DmaArena) -> Result<Self, ProbeError> {
        // Both rings in one allocation, TX first
        let rings = arena.alloc(TX_RING_BYTES + RX_RING_BYTES, 16)?;
        let tx_ring = unsafe {
            TxRing::new(rings.cpu_ptr() as *mut TxDesc, rings.bus_addr(), TX_RING_SIZE)
        };
        let rx_ring = unsafe {
            RxRing::new(
                rings.cpu_ptr().add(TX_RING_BYTES) as *mut RxDesc,
                rings.bus_addr() + TX_RING_BYTES as u64,
                RX_RING_SIZE,
            )
        };

        let tx_bufs = arena.alloc(TX_RING_SIZE * MAX_RXBUF_SIZE, 16)?;
        let rx_bufs = arena.alloc(RX_RING_SIZE * MAX_RXBUF_SIZE, 16)?;
        let tx_pool = unsafe {
            FramePool::new(tx_bufs.cpu_ptr(), tx_bufs.bus_addr(), MAX_RXBUF_SIZE, TX_RING_SIZE)
        };
        let rx_pool = unsafe {
            FramePool::new(rx_bufs.cpu_ptr(), rx_bufs.bus_addr(), MAX_RXBUF_SIZE, RX_RING_SIZE)
        };

        // The bootloader should have left the station address in the chip
        let mac = MacAddress::from_reg_pair(hal.mac_read(regs::MAH), hal.mac_read(regs::MAL));
        if !mac.is_valid() {
            log_warn!("invalid station address in chip, set one before open");
        }

        match config.port {
            PortType::Lan => phy::init_switch(&hal),
            PortType::Wan => phy::init_wan_phy(&hal),
            // HPNA has no PHY to initialise
            PortType::Hpna => {}
        }

        Ok(Self {
            hal,
            config,
            mac: Mutex::new(mac),
            tx: Mutex::new(TxState {
                ring: tx_ring,
                slots: [BufferSlot::EMPTY; TX_RING_SIZE],
                pool: tx_pool,
                used: 0,
                next_slot: 0,
            }),
            rx: Mutex::new(RxState {
                ring: rx_ring,
                slots: [BufferSlot::EMPTY; RX_RING_SIZE],
                pool: rx_pool,
                next_to_read: 0,
            }),
            filter: Mutex::new(RxMode::new()),
            stats: MacStats::new(),
            state: AtomicU8::new(RunState::Down as u8),
            irq_shadow: AtomicU32::new(0),
            poll_scheduled: AtomicBool::new(false),
            queue_stopped: AtomicBool::new(true),
            carrier: AtomicBool::new(false),
            resume_running: AtomicBool::new(false),
            msg_enable: AtomicU32::new(0),
        })
    }

    /// Current lifecycle state.
    pub fn run_state(&self) -> RunState {
        match self.state.load(Ordering::Acquire) {
            1 => RunState::Resetting,
            2 => RunState::Running,
            3 => RunState::Suspended,
            _ => RunState::Down,
        }
    }

    pub(crate) fn set_state(&self, state: RunState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.run_state() == RunState::Running
    }

    /// Port type string for diagnostics.
    pub fn port_type(&self) -> &'static str {
        self.config.port.as_str()
    }

    /// (driver name, version, port) triple, ethtool-style.
    pub fn driver_info(&self) -> (&'static str, &'static str, &'static str) {
        (DRIVER_NAME, DRIVER_VERSION, self.port_type())
    }

    /// Traffic counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn message_level(&self) -> u32 {
        self.msg_enable.load(Ordering::Relaxed)
    }

    pub fn set_message_level(&self, value: u32) {
        self.msg_enable.store(value, Ordering::Relaxed);
    }

    /// Back-pressure state of the submission queue.
    pub fn queue_stopped(&self) -> bool {
        self.queue_stopped.load(Ordering::Acquire)
    }

    pub(crate) fn stop_queue(&self) {
        self.queue_stopped.store(true, Ordering::Release);
    }

    pub(crate) fn wake_queue(&self) {
        self.queue_stopped.store(false, Ordering::Release);
    }

    /// Link carrier as last reported by the link interrupt.
    pub fn carrier_ok(&self) -> bool {
        self.carrier.load(Ordering::Acquire)
    }
}

/// One-shot sink used by the trait-level `receive` to pull a single frame
/// into a caller buffer.
struct CopySink<'a> {
    buf: &'a mut [u8],
    result: Option<Result<usize, usize>>,
}

impl FrameSink for CopySink<'_> {
    fn frame_received(&mut self, frame: &[u8]) {
        if frame.len() > self.buf.len() {
            self.result = Some(Err(frame.len()));
        } else {
            self.buf[..frame.len()].copy_from_slice(frame);
            self.result = Some(Ok(frame.len()));
        }
    }
}

impl<H: MacHal> NetworkDriver for CentaurMac<H> {
    fn mac_address(&self) -> MacAddress {
        *self.mac.lock()
    }

    fn can_transmit(&self) -> bool {
        self.is_running()
            && self.with_port_irqs_masked(|| self.tx.lock().used < TX_RING_SIZE)
    }

    fn can_receive(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.with_port_irqs_masked(|| {
            let rx = self.rx.lock();
            let n = rx.next_to_read;
            rx.slots[n].buf.is_some() && !rx.ring.hw_owns(n)
        })
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), TxError> {
        CentaurMac::transmit(self, frame)
    }

    fn receive(&mut self, buffer: &mut [u8]) -> Result<Option<usize>, RxError> {
        if !self.is_running() {
            return Err(RxError::DeviceNotReady);
        }
        let mut sink = CopySink {
            buf: buffer,
            result: None,
        };
        self.process_rx(1, &mut sink);
        match sink.result {
            None => Ok(None),
            Some(Ok(len)) => Ok(Some(len)),
            Some(Err(needed)) => Err(RxError::BufferTooSmall { needed }),
        }
    }

    fn refill_rx_queue(&mut self) {
        self.refill_rx_buffers();
    }

    fn collect_tx_completions(&mut self) {
        CentaurMac::collect_tx_completions(self);
    }

    fn link_up(&self) -> bool {
        match self.config.port {
            PortType::Wan => self.hal.misc_read(regs::WMC) & regs::WMC_WLS != 0,
            // LAN is a direct-attached switch, HPNA always has link
            PortType::Lan | PortType::Hpna => true,
        }
    }
}

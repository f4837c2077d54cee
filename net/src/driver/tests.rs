//! Driver scenario tests against a scripted register-level mock.
//!
//! The mock plays the chip: registers are plain arrays, the DMA engines are
//! driven by hand through helpers that flip descriptor ownership and write
//! frame bytes the way the hardware would.

use core::cell::RefCell;

use dma_pool::{DmaArena, MemoryRegion};

use super::{CentaurMac, MacConfig, PortType, RunState};
use crate::dma::desc::{RDES_CE, RDES_ES, RDES_FS, RDES_LS, RDES_RE, RDES_TL};
use crate::dma::{RX_RING_MASK, RX_RING_SIZE, TX_RING_SIZE};
use crate::hal::MacHal;
use crate::regs;
use crate::traits::{FrameSink, TxError};
use crate::types::MacAddress;

const CHIP_MAC: MacAddress = MacAddress::new([0x00, 0x10, 0xa1, 0x01, 0x02, 0x03]);

struct MockRegs {
    mac: [u32; 64],
    misc: [u32; 8],
    irq_enable: u32,
    delay_total: u32,
    tx_kicks: u32,
    rx_kicks: u32,
    /// Interrupt-enable register as seen at the last engine kick.
    irq_at_tx_kick: u32,
    irq_at_rx_kick: u32,
    /// When set, the reset bit never self-clears.
    sticky_reset: bool,
}

struct MockHal(RefCell<MockRegs>);

impl MockHal {
    fn new() -> Self {
        let mut mac = [0u32; 64];
        let (high, low) = CHIP_MAC.to_reg_pair();
        mac[(regs::MAH / 4) as usize] = high;
        mac[(regs::MAL / 4) as usize] = low;
        Self(RefCell::new(MockRegs {
            mac,
            misc: [0; 8],
            irq_enable: 0,
            delay_total: 0,
            tx_kicks: 0,
            rx_kicks: 0,
            irq_at_tx_kick: 0,
            irq_at_rx_kick: 0,
            sticky_reset: false,
        }))
    }

    fn sticky_reset(self) -> Self {
        self.0.borrow_mut().sticky_reset = true;
        self
    }

    fn mac_reg(&self, reg: u16) -> u32 {
        self.0.borrow().mac[(reg / 4) as usize]
    }

    fn misc_reg(&self, reg: u16) -> u32 {
        self.0.borrow().misc[(reg / 4) as usize]
    }

    fn set_misc_reg(&self, reg: u16, value: u32) {
        self.0.borrow_mut().misc[(reg / 4) as usize] = value;
    }

    fn irq_mask(&self) -> u32 {
        self.0.borrow().irq_enable
    }

    fn delay_total(&self) -> u32 {
        self.0.borrow().delay_total
    }

    fn tx_kicks(&self) -> u32 {
        self.0.borrow().tx_kicks
    }

    fn irq_at_tx_kick(&self) -> u32 {
        self.0.borrow().irq_at_tx_kick
    }

    fn irq_at_rx_kick(&self) -> u32 {
        self.0.borrow().irq_at_rx_kick
    }
}

impl MacHal for MockHal {
    fn mac_read(&self, reg: u16) -> u32 {
        self.0.borrow().mac[(reg / 4) as usize]
    }

    fn mac_write(&self, reg: u16, value: u32) {
        let mut regs_ = self.0.borrow_mut();
        match reg {
            regs::DTSC => {
                regs_.tx_kicks += 1;
                regs_.irq_at_tx_kick = regs_.irq_enable;
            }
            regs::DRSC => {
                regs_.rx_kicks += 1;
                regs_.irq_at_rx_kick = regs_.irq_enable;
            }
            regs::DTXC => {
                // A real chip clears the reset bit once the engines settle
                let value = if regs_.sticky_reset {
                    value
                } else {
                    value & !regs::DTXC_TRST
                };
                regs_.mac[(reg / 4) as usize] = value;
            }
            _ => regs_.mac[(reg / 4) as usize] = value,
        }
    }

    fn misc_read(&self, reg: u16) -> u32 {
        self.0.borrow().misc[(reg / 4) as usize]
    }

    fn misc_write(&self, reg: u16, value: u32) {
        self.0.borrow_mut().misc[(reg / 4) as usize] = value;
    }

    fn irq_enable_read(&self) -> u32 {
        self.0.borrow().irq_enable
    }

    fn irq_enable_write(&self, value: u32) {
        self.0.borrow_mut().irq_enable = value;
    }

    fn delay_ms(&self, ms: u32) {
        self.0.borrow_mut().delay_total += ms;
    }
}

#[repr(C, align(4096))]
struct ArenaBacking([u8; 64 * 1024]);

const ARENA_BYTES: usize = 64 * 1024;

fn wan_config() -> MacConfig {
    MacConfig::new(PortType::Wan, 4, 5, Some(6))
}

fn setup(backing: &mut ArenaBacking, hal: MockHal, config: MacConfig) -> CentaurMac<MockHal> {
    let region = MemoryRegion::new(backing.0.as_mut_ptr() as usize, backing.0.len());
    let mut arena = unsafe { DmaArena::new(region) }.unwrap();
    CentaurMac::new(hal, config, &mut arena).unwrap()
}

/// Play the TX engine: complete the frame in ring slot `n`.
fn hw_complete_tx(mac: &CentaurMac<MockHal>, n: usize) {
    let mut tx = mac.tx.lock();
    assert!(tx.slots[n].buf.is_some(), "no frame in flight in slot");
    tx.ring.clear(n);
}

/// Play the RX engine: find the next armed slot in ring order.
fn find_armed_slot(mac: &CentaurMac<MockHal>) -> usize {
    let rx = mac.rx.lock();
    for i in 0..RX_RING_SIZE {
        let n = (rx.next_to_read + i) & RX_RING_MASK;
        if rx.slots[n].buf.is_some() && rx.ring.hw_owns(n) {
            return n;
        }
    }
    panic!("no armed RX slot");
}

/// Play the RX engine: deliver a good frame into the next armed slot. The
/// length written to the descriptor includes the 4-byte CRC the chip leaves
/// on the frame.
fn hw_rx_frame(mac: &CentaurMac<MockHal>, frame: &[u8]) -> usize {
    let n = find_armed_slot(mac);
    let mut rx = mac.rx.lock();
    let index = rx.slots[n].buf.unwrap();
    let dst = rx.pool.get(index).unwrap().cpu_ptr();
    unsafe { core::ptr::copy_nonoverlapping(frame.as_ptr(), dst, frame.len()) };
    rx.ring
        .set_status(n, RDES_FS | RDES_LS | (frame.len() + 4) as u32);
    n
}

/// Play the RX engine: complete the next armed slot with a raw status word
/// (error and spanning-frame cases).
fn hw_rx_status(mac: &CentaurMac<MockHal>, status: u32) -> usize {
    let n = find_armed_slot(mac);
    mac.rx.lock().ring.set_status(n, status);
    n
}

/// Frame sink recording what the receive path delivers.
#[derive(Default)]
struct CaptureSink {
    count: usize,
    last_len: usize,
    last_first: u8,
}

impl FrameSink for CaptureSink {
    fn frame_received(&mut self, frame: &[u8]) {
        self.count += 1;
        self.last_len = frame.len();
        self.last_first = *frame.first().unwrap_or(&0);
    }
}

#[test]
fn test_probe_reads_chip_mac() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());

    assert_eq!(*mac.mac.lock(), CHIP_MAC);
    assert_eq!(mac.run_state(), RunState::Down);
    // WAN probe brings the PHY up advertising everything and restarts
    // negotiation so the new advertisement takes effect
    assert_ne!(mac.hal.misc_reg(regs::WMC) & regs::WMC_WANA100F, 0);
    assert_ne!(mac.hal.misc_reg(regs::WMC) & regs::WMC_WANR, 0);
}

#[test]
fn test_open_programs_engines() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());

    mac.open().unwrap();

    assert_eq!(mac.run_state(), RunState::Running);
    assert!(!mac.queue_stopped());
    assert_ne!(mac.hal.mac_reg(regs::DTXC) & regs::DTXC_TE, 0);
    assert_ne!(mac.hal.mac_reg(regs::DRXC) & regs::DRXC_RE, 0);
    assert_ne!(mac.hal.mac_reg(regs::TDLB), 0);
    assert_ne!(mac.hal.mac_reg(regs::RDLB), 0);
    // RX, TX and link interrupt lines enabled
    assert_eq!(mac.hal.irq_mask() & 0x70, 0x70);
    // Station address programmed back
    let (high, low) = CHIP_MAC.to_reg_pair();
    assert_eq!(mac.hal.mac_reg(regs::MAH), high);
    assert_eq!(mac.hal.mac_reg(regs::MAL), low);
    // All sixteen RX slots armed
    let rx = mac.rx.lock();
    assert!(rx.pool.is_exhausted());
    for n in 0..RX_RING_SIZE {
        assert!(rx.ring.hw_owns(n));
    }
}

#[test]
fn test_open_rejects_invalid_mac() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let hal = MockHal::new();
    hal.0.borrow_mut().mac[(regs::MAH / 4) as usize] = 0;
    hal.0.borrow_mut().mac[(regs::MAL / 4) as usize] = 0;
    let mac = setup(&mut backing, hal, wan_config());

    assert!(mac.open().is_err());
    assert_eq!(mac.run_state(), RunState::Down);
}

#[test]
fn test_reset_timeout_still_comes_up() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mut config = wan_config();
    config.watchdog_ms = 5;
    let mac = setup(&mut backing, MockHal::new().sticky_reset(), config);

    mac.open().unwrap();

    // The wait was bounded and the port still reached Running
    assert!(mac.hal.delay_total() >= 5);
    assert_eq!(mac.run_state(), RunState::Running);
}

#[test]
fn test_transmit_requires_open() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());

    assert_eq!(mac.transmit(&[0u8; 64]), Err(TxError::DeviceNotReady));
}

#[test]
fn test_transmit_rejects_oversized_frame() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    assert_eq!(mac.transmit(&[0u8; 1515]), Err(TxError::FrameTooLarge));
}

#[test]
fn test_tx_backpressure_at_ring_capacity() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    for _ in 0..TX_RING_SIZE {
        mac.transmit(&[0u8; 64]).unwrap();
    }
    assert!(mac.queue_stopped());
    assert_eq!(mac.transmit(&[0u8; 64]), Err(TxError::QueueFull));
    // Each accepted frame kicked the engine
    assert_eq!(mac.hal.tx_kicks(), TX_RING_SIZE as u32);
}

#[test]
fn test_tx_completion_reclaims_and_wakes_queue() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    for _ in 0..TX_RING_SIZE {
        mac.transmit(&[0xau8; 100]).unwrap();
    }
    assert!(mac.queue_stopped());

    hw_complete_tx(&mac, 0);
    hw_complete_tx(&mac, 1);
    mac.tx_irq();

    assert!(!mac.queue_stopped());
    assert_eq!(mac.tx.lock().used, TX_RING_SIZE - 2);
    let stats = mac.stats();
    assert_eq!(stats.tx_packets, 2);
    assert_eq!(stats.tx_bytes, 200);
    // Reclaimed buffers are allocatable again
    mac.transmit(&[0u8; 64]).unwrap();
    mac.transmit(&[0u8; 64]).unwrap();
    assert_eq!(mac.transmit(&[0u8; 64]), Err(TxError::QueueFull));
}

#[test]
fn test_rx_good_frame_is_delivered_without_crc() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    let n = hw_rx_frame(&mac, &[0x42u8; 96]);
    let mut sink = CaptureSink::default();
    assert_eq!(mac.process_rx(RX_RING_SIZE, &mut sink), 1);

    assert_eq!(sink.count, 1);
    assert_eq!(sink.last_len, 96);
    assert_eq!(sink.last_first, 0x42);
    let stats = mac.stats();
    assert_eq!(stats.rx_packets, 1);
    assert_eq!(stats.rx_bytes, 96);
    // Slot was refilled and re-armed
    let rx = mac.rx.lock();
    assert!(rx.slots[n].buf.is_some());
    assert!(rx.ring.hw_owns(n));
    assert_eq!(rx.next_to_read, (n + 1) & RX_RING_MASK);
}

#[test]
fn test_rx_spanning_frame_is_dropped() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    // First segment only, no last-segment flag
    let n = hw_rx_status(&mac, RDES_FS | 0x700);
    let mut sink = CaptureSink::default();
    // The drop still consumes one descriptor of budget
    assert_eq!(mac.process_rx(RX_RING_SIZE, &mut sink), 1);

    assert_eq!(sink.count, 0);
    let stats = mac.stats();
    assert_eq!(stats.rx_errors, 1);
    assert_eq!(stats.rx_length_errors, 1);
    // Slot recycled in place with its original buffer
    let rx = mac.rx.lock();
    assert!(rx.slots[n].buf.is_some());
    assert!(rx.ring.hw_owns(n));
}

#[test]
fn test_rx_error_counters() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    hw_rx_status(&mac, RDES_FS | RDES_LS | RDES_ES | RDES_CE | 64);
    hw_rx_status(&mac, RDES_FS | RDES_LS | RDES_ES | RDES_TL | 64);
    hw_rx_status(&mac, RDES_FS | RDES_LS | RDES_RE | 64);
    let mut sink = CaptureSink::default();
    assert_eq!(mac.process_rx(RX_RING_SIZE, &mut sink), 3);
    assert_eq!(sink.count, 0);

    let stats = mac.stats();
    assert_eq!(stats.rx_errors, 3);
    assert_eq!(stats.rx_crc_errors, 1);
    assert_eq!(stats.rx_length_errors, 1);
    assert_eq!(stats.rx_missed_errors, 1);
    assert_eq!(stats.rx_packets, 0);
}

#[test]
fn test_rx_poll_budget_bounds_one_pass() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    for _ in 0..12 {
        hw_rx_frame(&mac, &[0x55u8; 64]);
    }
    assert!(mac.rx_irq());
    assert_eq!(mac.hal.irq_mask() & (1 << 4), 0);

    let mut sink = CaptureSink::default();
    // Full budget consumed, so the interrupt stays masked and another pass
    // is owed
    assert_eq!(mac.poll(8, &mut sink), 8);
    assert!(mac.poll_pending());
    assert_eq!(mac.hal.irq_mask() & (1 << 4), 0);

    // Under budget: drained, interrupt unmasked again
    assert_eq!(mac.poll(8, &mut sink), 4);
    assert!(!mac.poll_pending());
    assert_ne!(mac.hal.irq_mask() & (1 << 4), 0);
    assert_eq!(mac.stats().rx_packets, 12);
}

#[test]
fn test_rx_budget_counts_dropped_frames() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    for _ in 0..3 {
        hw_rx_status(&mac, RDES_FS | RDES_LS | RDES_ES | RDES_CE | 64);
    }

    // A budget of one bounds the pass to one descriptor even though the
    // frame is dropped rather than delivered
    let mut sink = CaptureSink::default();
    assert_eq!(mac.process_rx(1, &mut sink), 1);
    assert_eq!(sink.count, 0);
    assert_eq!(mac.stats().rx_errors, 1);

    // The backlog persists to the following passes
    assert_eq!(mac.process_rx(1, &mut sink), 1);
    assert_eq!(mac.process_rx(1, &mut sink), 1);
    assert_eq!(mac.process_rx(1, &mut sink), 0);
    assert_eq!(mac.stats().rx_crc_errors, 3);
}

#[test]
fn test_rx_irq_schedules_once() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    assert!(mac.rx_irq());
    // Second interrupt folds into the pending poll pass
    assert!(!mac.rx_irq());
    assert_eq!(mac.hal.irq_mask() & (1 << 4), 0);
}

#[test]
fn test_refill_retries_after_pool_exhaustion() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    // Simulate a buffer the hardware holds hostage: pull it out of its slot
    // without returning it to the pool
    let stolen = {
        let mut rx = mac.rx.lock();
        let index = rx.slots[0].buf.take().unwrap();
        rx.ring.clear(0);
        index
    };

    // Nothing free, so the slot stays empty
    mac.refill_rx_buffers();
    assert!(mac.rx.lock().slots[0].buf.is_none());

    // Buffer comes back; the next refill re-arms the slot
    {
        let mut rx = mac.rx.lock();
        if let Some(buf) = rx.pool.get_mut(stolen) {
            unsafe { buf.mark_driver_owned() };
        }
        rx.pool.free(stolen);
    }
    mac.refill_rx_buffers();
    let rx = mac.rx.lock();
    assert!(rx.slots[0].buf.is_some());
    assert!(rx.ring.hw_owns(0));
}

#[test]
fn test_shutdown_releases_every_buffer_exactly_once() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    mac.transmit(&[0u8; 64]).unwrap();
    mac.transmit(&[0u8; 64]).unwrap();
    mac.transmit(&[0u8; 64]).unwrap();

    mac.stop();

    assert_eq!(mac.run_state(), RunState::Down);
    let tx = mac.tx.lock();
    let (alloc, released) = tx.pool.lifetime_counts();
    assert_eq!(alloc, 3);
    assert_eq!(released, 3);
    assert_eq!(tx.pool.in_use(), 0);
    drop(tx);

    let rx = mac.rx.lock();
    let (alloc, released) = rx.pool.lifetime_counts();
    assert_eq!(alloc, RX_RING_SIZE as u64);
    assert_eq!(released, RX_RING_SIZE as u64);
    assert_eq!(rx.pool.in_use(), 0);
    drop(rx);

    // Engines stopped and interrupts off
    assert_eq!(mac.hal.mac_reg(regs::DTXC) & regs::DTXC_TE, 0);
    assert_eq!(mac.hal.mac_reg(regs::DRXC) & regs::DRXC_RE, 0);
    assert_eq!(mac.hal.irq_mask() & 0x70, 0);
}

#[test]
fn test_watchdog_rebuilds_the_engines() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    for _ in 0..TX_RING_SIZE {
        mac.transmit(&[0u8; 64]).unwrap();
    }
    assert!(mac.queue_stopped());

    mac.tx_timeout();

    assert_eq!(mac.run_state(), RunState::Running);
    assert!(!mac.queue_stopped());
    assert_eq!(mac.tx.lock().used, 0);
    // The port is immediately usable again
    mac.transmit(&[0u8; 64]).unwrap();
    let (alloc, released) = {
        let tx = mac.tx.lock();
        tx.pool.lifetime_counts()
    };
    assert_eq!(alloc, TX_RING_SIZE as u64 + 1);
    assert_eq!(released, TX_RING_SIZE as u64);
}

#[test]
fn test_set_mac_address_validates_and_programs() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    assert!(mac.set_mac_address(MacAddress::ZERO).is_err());
    // Group bit set
    assert!(mac
        .set_mac_address(MacAddress::new([0x01, 0, 0, 0, 0, 1]))
        .is_err());

    let new_mac = MacAddress::new([0x00, 0x10, 0xa1, 0xaa, 0xbb, 0xcc]);
    mac.set_mac_address(new_mac).unwrap();
    let (high, low) = new_mac.to_reg_pair();
    assert_eq!(mac.hal.mac_reg(regs::MAH), high);
    assert_eq!(mac.hal.mac_reg(regs::MAL), low);
}

#[test]
fn test_multicast_exact_match_slots() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    let a = MacAddress::new([0x01, 0x00, 0x5e, 0x00, 0x00, 0x01]);
    let b = MacAddress::new([0x01, 0x00, 0x5e, 0x00, 0x00, 0x02]);
    mac.set_multicast_list(&[a, b]);

    assert_eq!(mac.hal.mac_reg(regs::DRXC) & regs::DRXC_RM, 0);
    let (high, low) = a.to_reg_pair();
    assert_eq!(mac.hal.mac_reg(regs::aal(0)), low);
    assert_eq!(mac.hal.mac_reg(regs::aah(0)), regs::AAH_E | high);
    let (high, low) = b.to_reg_pair();
    assert_eq!(mac.hal.mac_reg(regs::aal(1)), low);
    assert_eq!(mac.hal.mac_reg(regs::aah(1)), regs::AAH_E | high);
    // Unused slots are disabled
    assert_eq!(mac.hal.mac_reg(regs::aah(2)), 0);
}

#[test]
fn test_multicast_overflow_falls_back_to_all_multicast() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    let list = [MacAddress::new([0x01, 0x00, 0x5e, 0, 0, 9]); 17];
    mac.set_multicast_list(&list);
    assert_ne!(mac.hal.mac_reg(regs::DRXC) & regs::DRXC_RM, 0);
    assert!(mac.rx_mode().overflowed());
}

#[test]
fn test_promiscuous_mode() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    let mut mode = mac.rx_mode();
    mode.promiscuous = true;
    mac.set_rx_mode(mode);
    assert_ne!(mac.hal.mac_reg(regs::DRXC) & regs::DRXC_RA, 0);

    mode.promiscuous = false;
    mac.set_rx_mode(mode);
    assert_eq!(mac.hal.mac_reg(regs::DRXC) & regs::DRXC_RA, 0);
}

#[test]
fn test_suspend_resume_restores_traffic() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();
    mac.transmit(&[0u8; 64]).unwrap();

    mac.suspend();
    assert_eq!(mac.run_state(), RunState::Suspended);
    assert_eq!(mac.hal.mac_reg(regs::DTXC) & regs::DTXC_TE, 0);

    mac.resume();
    assert_eq!(mac.run_state(), RunState::Running);
    assert!(!mac.queue_stopped());
    mac.transmit(&[0u8; 64]).unwrap();
}

#[test]
fn test_suspend_when_down_stays_down_after_resume() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());

    mac.suspend();
    mac.resume();
    assert_eq!(mac.run_state(), RunState::Down);
}

#[test]
fn test_link_irq_tracks_carrier() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    assert!(!mac.carrier_ok());
    let wmc = mac.hal.misc_reg(regs::WMC);
    mac.hal.set_misc_reg(regs::WMC, wmc | regs::WMC_WLS);
    mac.link_irq();
    assert!(mac.carrier_ok());

    mac.hal.set_misc_reg(regs::WMC, wmc);
    mac.link_irq();
    assert!(!mac.carrier_ok());
}

#[test]
fn test_media_ops_rejected_on_ports_without_phy() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(
        &mut backing,
        MockHal::new(),
        MacConfig::new(PortType::Hpna, 8, 9, None),
    );

    assert!(mac.link_settings().is_err());
    assert!(mac.restart_autoneg().is_err());
}

#[test]
fn test_forced_media_settings() {
    use super::{Advertise, Duplex, LinkSettings, Speed};

    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());

    mac.set_link_settings(LinkSettings {
        autoneg: false,
        advertise: Advertise::default(),
        speed: Speed::Mb100,
        duplex: Duplex::Full,
        link: false,
    })
    .unwrap();

    let wmc = mac.hal.misc_reg(regs::WMC);
    assert_ne!(wmc & regs::WMC_WAND, 0);
    assert_ne!(wmc & regs::WMC_WANF100, 0);
    assert_ne!(wmc & regs::WMC_WANFF, 0);

    // Restarting negotiation while it is disabled is refused
    assert!(mac.restart_autoneg().is_err());

    let settings = mac.link_settings().unwrap();
    assert!(!settings.autoneg);
}

#[test]
fn test_critical_sections_run_with_port_irqs_masked() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    // The engine kick happens inside the locked section; the port's lines
    // must be masked at that point and restored afterwards
    mac.transmit(&[0u8; 64]).unwrap();
    assert_eq!(mac.hal.irq_at_tx_kick() & 0x70, 0);
    assert_eq!(mac.hal.irq_mask() & 0x70, 0x70);

    hw_rx_frame(&mac, &[0x11u8; 64]);
    let mut sink = CaptureSink::default();
    mac.process_rx(RX_RING_SIZE, &mut sink);
    assert_eq!(mac.hal.irq_at_rx_kick() & 0x70, 0);
    assert_eq!(mac.hal.irq_mask() & 0x70, 0x70);
}

#[test]
fn test_rx_self_mask_survives_tx_reclaim() {
    let mut backing = ArenaBacking([0; ARENA_BYTES]);
    let mac = setup(&mut backing, MockHal::new(), wan_config());
    mac.open().unwrap();

    assert!(mac.rx_irq());
    assert_eq!(mac.hal.irq_mask() & (1 << 4), 0);

    // A TX reclaim in between masks and restores the port's lines; the RX
    // self-mask must not be undone by the restore
    mac.transmit(&[0u8; 64]).unwrap();
    hw_complete_tx(&mac, 0);
    mac.tx_irq();
    assert_eq!(mac.hal.irq_mask() & (1 << 4), 0);
    assert_ne!(mac.hal.irq_mask() & (1 << 5), 0);

    // Draining the backlog re-enables the RX line
    let mut sink = CaptureSink::default();
    mac.poll(8, &mut sink);
    assert_ne!(mac.hal.irq_mask() & (1 << 4), 0);
}

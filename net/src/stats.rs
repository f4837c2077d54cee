//! Per-port traffic counters.
//!
//! Bumped from interrupt context and the poll path, so everything is atomic
//! with relaxed ordering; exactness across a concurrent snapshot is not a
//! requirement.

use core::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct MacStats {
    rx_packets: AtomicU64,
    rx_bytes: AtomicU64,
    rx_errors: AtomicU64,
    rx_length_errors: AtomicU64,
    rx_crc_errors: AtomicU64,
    rx_missed_errors: AtomicU64,
    tx_packets: AtomicU64,
    tx_bytes: AtomicU64,
}

/// Plain copy of the counters at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub rx_packets: u64,
    pub rx_bytes: u64,
    pub rx_errors: u64,
    pub rx_length_errors: u64,
    pub rx_crc_errors: u64,
    pub rx_missed_errors: u64,
    pub tx_packets: u64,
    pub tx_bytes: u64,
}

impl MacStats {
    pub const fn new() -> Self {
        Self {
            rx_packets: AtomicU64::new(0),
            rx_bytes: AtomicU64::new(0),
            rx_errors: AtomicU64::new(0),
            rx_length_errors: AtomicU64::new(0),
            rx_crc_errors: AtomicU64::new(0),
            rx_missed_errors: AtomicU64::new(0),
            tx_packets: AtomicU64::new(0),
            tx_bytes: AtomicU64::new(0),
        }
    }

    pub fn rx_packet(&self, bytes: usize) {
        self.rx_packets.fetch_add(1, Ordering::Relaxed);
        self.rx_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn tx_packet(&self, bytes: usize) {
        self.tx_packets.fetch_add(1, Ordering::Relaxed);
        self.tx_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn rx_error(&self) {
        self.rx_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rx_length_error(&self) {
        self.rx_length_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rx_crc_error(&self) {
        self.rx_crc_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rx_missed_error(&self) {
        self.rx_missed_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            rx_packets: self.rx_packets.load(Ordering::Relaxed),
            rx_bytes: self.rx_bytes.load(Ordering::Relaxed),
            rx_errors: self.rx_errors.load(Ordering::Relaxed),
            rx_length_errors: self.rx_length_errors.load(Ordering::Relaxed),
            rx_crc_errors: self.rx_crc_errors.load(Ordering::Relaxed),
            rx_missed_errors: self.rx_missed_errors.load(Ordering::Relaxed),
            tx_packets: self.tx_packets.load(Ordering::Relaxed),
            tx_bytes: self.tx_bytes.load(Ordering::Relaxed),
        }
    }
}

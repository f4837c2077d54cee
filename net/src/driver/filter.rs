//! Station address and receive filtering.
//!
//! The chip filters unicast against MAH/MAL, always has a broadcast bit, and
//! offers either a receive-all-multicast bit or sixteen exact-match extra
//! address slots. Requested multicast sets beyond sixteen fall back to
//! receive-all-multicast, same as an explicit all-multicast request.

use super::CentaurMac;
use crate::hal::MacHal;
use crate::regs;
use crate::types::MacAddress;

/// Station address update failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    /// All-zero or group address.
    Invalid,
}

/// Requested receive filtering mode.
#[derive(Debug, Clone, Copy)]
pub struct RxMode {
    pub promiscuous: bool,
    pub all_multicast: bool,
    addrs: [MacAddress; regs::NR_ADDRESSES],
    count: usize,
    /// More addresses were requested than the hardware holds.
    overflowed: bool,
}

impl RxMode {
    pub fn new() -> Self {
        Self {
            promiscuous: false,
            all_multicast: false,
            addrs: [MacAddress::ZERO; regs::NR_ADDRESSES],
            count: 0,
            overflowed: false,
        }
    }

    /// Replace the multicast list. Overflow is recorded, not an error.
    pub fn set_multicast_list(&mut self, list: &[MacAddress]) {
        self.overflowed = list.len() > regs::NR_ADDRESSES;
        self.count = list.len().min(regs::NR_ADDRESSES);
        self.addrs[..self.count].copy_from_slice(&list[..self.count]);
    }

    pub fn multicast_count(&self) -> usize {
        self.count
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed
    }
}

impl Default for RxMode {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: MacHal> CentaurMac<H> {
    /// Set the station address. Takes effect in hardware immediately when
    /// the port is up, and on the next open otherwise.
    pub fn set_mac_address(&self, mac: MacAddress) -> Result<(), AddressError> {
        if !mac.is_valid() {
            return Err(AddressError::Invalid);
        }
        *self.mac.lock() = mac;
        if self.is_running() {
            self.update_mac();
        }
        Ok(())
    }

    /// Push the stored station address into MAH/MAL.
    pub(crate) fn update_mac(&self) {
        let (high, low) = self.mac.lock().to_reg_pair();
        self.hal.mac_write(regs::MAL, low);
        self.hal.mac_write(regs::MAH, high);
    }

    /// Apply a new receive filtering mode.
    pub fn set_rx_mode(&self, mode: RxMode) {
        *self.filter.lock() = mode;
        self.reapply_filter();
    }

    /// Replace the multicast list keeping the other mode flags.
    pub fn set_multicast_list(&self, list: &[MacAddress]) {
        let mut filter = self.filter.lock();
        filter.set_multicast_list(list);
        self.apply_rx_mode(&filter);
    }

    /// Re-program the filter hardware from the stored mode (after any engine
    /// reset, which wipes DRXC).
    pub(crate) fn reapply_filter(&self) {
        let filter = self.filter.lock();
        self.apply_rx_mode(&filter);
    }

    fn apply_rx_mode(&self, mode: &RxMode) {
        let mut drxc = self.hal.mac_read(regs::DRXC);

        if mode.promiscuous {
            drxc |= regs::DRXC_RA;
        } else {
            drxc &= !regs::DRXC_RA;
        }

        if mode.all_multicast || mode.overflowed {
            drxc |= regs::DRXC_RM;
        } else {
            drxc &= !regs::DRXC_RM;
            self.program_partial_multicast(mode);
        }

        self.hal.mac_write(regs::DRXC, drxc);
    }

    /// Load the exact-match extra address slots, disabling the unused ones.
    fn program_partial_multicast(&self, mode: &RxMode) {
        for n in 0..regs::NR_ADDRESSES {
            if n < mode.count {
                let (high, low) = mode.addrs[n].to_reg_pair();
                self.hal.mac_write(regs::aal(n), low);
                self.hal.mac_write(regs::aah(n), regs::AAH_E | high);
            } else {
                self.hal.mac_write(regs::aal(n), 0);
                self.hal.mac_write(regs::aah(n), 0);
            }
        }
    }

    /// Current filtering mode.
    pub fn rx_mode(&self) -> RxMode {
        *self.filter.lock()
    }
}

//! Descriptor ring accessors.
//!
//! The rings live in DMA memory the hardware walks on its own, so every
//! descriptor access is volatile and the ownership handover is fenced: a
//! release fence before giving a slot to hardware, an acquire fence after
//! observing that hardware gave it back.

use core::ptr::{addr_of, addr_of_mut, read_volatile, write_volatile};
use core::sync::atomic::{fence, Ordering};

use super::desc::{
    RxDesc, TxDesc, RDES_FLEN, RDES_OWN, TDES_FS, TDES_IC, TDES_LS, TDES_OWN, TDES_TBS,
};

/// Device addresses are 32 bits wide on this SoC.
#[inline]
fn bus32(addr: u64) -> u32 {
    addr as u32
}

/// The transmit descriptor ring.
pub struct TxRing {
    base: *mut TxDesc,
    bus: u64,
    len: usize,
}

impl TxRing {
    /// Build a ring over zeroed DMA memory and chain the descriptors into a
    /// circle. `len` must be a power of two.
    ///
    /// # Safety
    ///
    /// `base`/`bus` must describe `len * size_of::<TxDesc>()` bytes of valid,
    /// zeroed, identity-mapped DMA memory owned by this ring.
    pub unsafe fn new(base: *mut TxDesc, bus: u64, len: usize) -> Self {
        debug_assert!(len.is_power_of_two());
        let ring = Self { base, bus, len };
        for n in 0..len {
            let next = bus + (core::mem::size_of::<TxDesc>() * ((n + 1) & (len - 1))) as u64;
            write_volatile(addr_of_mut!((*ring.desc(n)).next_desc), bus32(next));
        }
        ring
    }

    /// Bus address of the first descriptor (for the ring base register).
    pub fn bus_addr(&self) -> u64 {
        self.bus
    }

    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn desc(&self, n: usize) -> *mut TxDesc {
        debug_assert!(n < self.len);
        unsafe { self.base.add(n) }
    }

    /// True while the hardware still owns slot `n`.
    pub fn hw_owns(&self, n: usize) -> bool {
        let owner = unsafe { read_volatile(addr_of!((*self.desc(n)).owner)) };
        if owner & TDES_OWN == 0 {
            fence(Ordering::Acquire);
            false
        } else {
            true
        }
    }

    /// Fill slot `n` and hand it to the hardware.
    pub fn publish(&mut self, n: usize, buf_bus: u64, len: usize) {
        let d = self.desc(n);
        unsafe {
            write_volatile(addr_of_mut!((*d).data_ptr), bus32(buf_bus));
            write_volatile(
                addr_of_mut!((*d).status),
                TDES_IC | TDES_FS | TDES_LS | (len as u32 & TDES_TBS),
            );
            // Descriptor must be fully visible before the ownership flip
            fence(Ordering::Release);
            write_volatile(addr_of_mut!((*d).owner), TDES_OWN);
        }
    }

    /// Drop the buffer reference of a completed slot.
    pub fn clear_data(&mut self, n: usize) {
        unsafe { write_volatile(addr_of_mut!((*self.desc(n)).data_ptr), 0) };
    }

    /// Wipe slot `n` entirely (shutdown drain).
    pub fn clear(&mut self, n: usize) {
        let d = self.desc(n);
        unsafe {
            write_volatile(addr_of_mut!((*d).owner), 0);
            write_volatile(addr_of_mut!((*d).status), 0);
            write_volatile(addr_of_mut!((*d).data_ptr), 0);
        }
    }

    /// Buffer address field of slot `n`.
    pub fn data_ptr(&self, n: usize) -> u32 {
        unsafe { read_volatile(addr_of!((*self.desc(n)).data_ptr)) }
    }
}

// Safety: the ring owns its DMA memory exclusively; concurrent use is
// serialized by the driver's TX lock.
unsafe impl Send for TxRing {}

/// The receive descriptor ring.
pub struct RxRing {
    base: *mut RxDesc,
    bus: u64,
    len: usize,
}

impl RxRing {
    /// Build a ring over zeroed DMA memory, chaining the descriptors.
    ///
    /// # Safety
    ///
    /// Same contract as [`TxRing::new`].
    pub unsafe fn new(base: *mut RxDesc, bus: u64, len: usize) -> Self {
        debug_assert!(len.is_power_of_two());
        let ring = Self { base, bus, len };
        for n in 0..len {
            let next = bus + (core::mem::size_of::<RxDesc>() * ((n + 1) & (len - 1))) as u64;
            write_volatile(addr_of_mut!((*ring.desc(n)).next_desc), bus32(next));
        }
        ring
    }

    pub fn bus_addr(&self) -> u64 {
        self.bus
    }

    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn desc(&self, n: usize) -> *mut RxDesc {
        debug_assert!(n < self.len);
        unsafe { self.base.add(n) }
    }

    /// True while the hardware still owns slot `n`.
    pub fn hw_owns(&self, n: usize) -> bool {
        let status = unsafe { read_volatile(addr_of!((*self.desc(n)).status)) };
        status & RDES_OWN != 0
    }

    /// Status word of slot `n`, fenced against the preceding ownership check.
    pub fn load_status(&self, n: usize) -> u32 {
        fence(Ordering::Acquire);
        unsafe { read_volatile(addr_of!((*self.desc(n)).status)) }
    }

    /// Frame length encoded in `status`, FCS included.
    pub fn frame_len(status: u32) -> usize {
        (status & RDES_FLEN) as usize
    }

    /// Attach a fresh buffer to slot `n` and hand it to the hardware.
    pub fn arm(&mut self, n: usize, buf_bus: u64, buf_len: usize) {
        let d = self.desc(n);
        unsafe {
            write_volatile(addr_of_mut!((*d).data_ptr), bus32(buf_bus));
            write_volatile(addr_of_mut!((*d).length), buf_len as u32);
            fence(Ordering::Release);
            write_volatile(addr_of_mut!((*d).status), RDES_OWN);
        }
    }

    /// Return slot `n` to the hardware keeping its current buffer (error
    /// and spanning-frame recycling).
    pub fn rearm(&mut self, n: usize) {
        fence(Ordering::Release);
        unsafe { write_volatile(addr_of_mut!((*self.desc(n)).status), RDES_OWN) };
    }

    /// Drop the buffer reference of slot `n` after detaching its frame.
    pub fn detach(&mut self, n: usize) {
        unsafe { write_volatile(addr_of_mut!((*self.desc(n)).data_ptr), 0) };
    }

    /// Wipe slot `n` entirely (shutdown drain).
    pub fn clear(&mut self, n: usize) {
        let d = self.desc(n);
        unsafe {
            write_volatile(addr_of_mut!((*d).status), 0);
            write_volatile(addr_of_mut!((*d).data_ptr), 0);
        }
    }

    /// Buffer address field of slot `n`.
    pub fn data_ptr(&self, n: usize) -> u32 {
        unsafe { read_volatile(addr_of!((*self.desc(n)).data_ptr)) }
    }

    /// Overwrite the status word of slot `n`. Only the hardware does this in
    /// operation; exists for the shutdown path and scripted tests.
    pub fn set_status(&mut self, n: usize, status: u32) {
        unsafe { write_volatile(addr_of_mut!((*self.desc(n)).status), status) };
    }
}

// Safety: serialized by the driver's RX lock.
unsafe impl Send for RxRing {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dma::desc::{RDES_FS, RDES_LS};

    #[repr(C, align(16))]
    struct RingBacking([u8; 4 * 16 * 4]);

    #[test]
    fn test_tx_ring_chains_descriptors() {
        let mut backing = RingBacking([0; 256]);
        let base = backing.0.as_mut_ptr() as *mut TxDesc;
        let bus = base as u64;
        let ring = unsafe { TxRing::new(base, bus, 8) };

        for n in 0..8usize {
            let next = unsafe { read_volatile(addr_of!((*ring.desc(n)).next_desc)) };
            let expect = bus as u32 + 16 * (((n + 1) & 7) as u32);
            assert_eq!(next, expect);
        }
    }

    #[test]
    fn test_tx_publish_and_clear() {
        let mut backing = RingBacking([0; 256]);
        let base = backing.0.as_mut_ptr() as *mut TxDesc;
        let mut ring = unsafe { TxRing::new(base, base as u64, 8) };

        assert!(!ring.hw_owns(3));
        ring.publish(3, 0x1000, 64);
        assert!(ring.hw_owns(3));
        assert_eq!(ring.data_ptr(3), 0x1000);

        ring.clear(3);
        assert!(!ring.hw_owns(3));
        assert_eq!(ring.data_ptr(3), 0);
    }

    #[test]
    fn test_rx_arm_detach() {
        let mut backing = RingBacking([0; 256]);
        let base = backing.0.as_mut_ptr() as *mut RxDesc;
        let mut ring = unsafe { RxRing::new(base, base as u64, 16) };

        ring.arm(5, 0x2000, 0x700);
        assert!(ring.hw_owns(5));

        // Hardware completes the frame: clears OWN, reports flags + length
        ring.set_status(5, RDES_FS | RDES_LS | 100);
        assert!(!ring.hw_owns(5));
        assert_eq!(RxRing::frame_len(ring.load_status(5)), 100);

        ring.detach(5);
        assert_eq!(ring.data_ptr(5), 0);
    }
}

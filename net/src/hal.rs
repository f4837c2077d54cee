//! Hardware access seam for the MAC driver.
//!
//! Everything the driver does to the chip goes through [`MacHal`]: the MAC
//! DMA block, the misc (PHY/switch) block, the platform interrupt-enable
//! register and a millisecond delay. Real hardware gets the volatile MMIO
//! implementation; tests script register behavior behind the same trait.

/// Register-level access to one Ethernet port and its surroundings.
pub trait MacHal {
    /// Read a MAC/DMA block register.
    fn mac_read(&self, reg: u16) -> u32;
    /// Write a MAC/DMA block register.
    fn mac_write(&self, reg: u16, value: u32);

    /// Read a misc (PHY/switch) block register.
    fn misc_read(&self, reg: u16) -> u32;
    /// Write a misc block register.
    fn misc_write(&self, reg: u16, value: u32);

    /// Read the global interrupt-enable register.
    fn irq_enable_read(&self) -> u32;
    /// Write the global interrupt-enable register.
    fn irq_enable_write(&self, value: u32);

    /// Busy-wait for `ms` milliseconds.
    fn delay_ms(&self, ms: u32);
}

/// Volatile MMIO implementation for real hardware.
pub struct MmioHal {
    mac_base: usize,
    misc_base: usize,
    irq_enable: usize,
    spins_per_ms: u32,
}

impl MmioHal {
    /// Create an MMIO HAL over mapped register windows.
    ///
    /// # Safety
    ///
    /// - `mac_base` and `misc_base` must point at the port's mapped register
    ///   blocks, `irq_enable` at the interrupt controller's enable register.
    /// - The mappings must stay valid for the lifetime of the HAL.
    pub unsafe fn new(mac_base: usize, misc_base: usize, irq_enable: usize, spins_per_ms: u32) -> Self {
        Self {
            mac_base,
            misc_base,
            irq_enable,
            spins_per_ms,
        }
    }

    #[inline]
    fn read32(addr: usize) -> u32 {
        unsafe { core::ptr::read_volatile(addr as *const u32) }
    }

    #[inline]
    fn write32(addr: usize, value: u32) {
        unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
    }
}

impl MacHal for MmioHal {
    fn mac_read(&self, reg: u16) -> u32 {
        Self::read32(self.mac_base + reg as usize)
    }

    fn mac_write(&self, reg: u16, value: u32) {
        Self::write32(self.mac_base + reg as usize, value)
    }

    fn misc_read(&self, reg: u16) -> u32 {
        Self::read32(self.misc_base + reg as usize)
    }

    fn misc_write(&self, reg: u16, value: u32) {
        Self::write32(self.misc_base + reg as usize, value)
    }

    fn irq_enable_read(&self) -> u32 {
        Self::read32(self.irq_enable)
    }

    fn irq_enable_write(&self, value: u32) {
        Self::write32(self.irq_enable, value)
    }

    fn delay_ms(&self, ms: u32) {
        for _ in 0..ms.saturating_mul(self.spins_per_ms) {
            core::hint::spin_loop();
        }
    }
}

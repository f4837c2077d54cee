//! Frame buffer with ownership tracking.
//!
//! Every buffer moves through a small state machine:
//!
//! ```text
//!     FREE ──alloc()──> DRIVER_OWNED ──submit──> DEVICE_OWNED
//!       ▲                     │                        │
//!       └──────free()─────────┴───────complete─────────┘
//! ```
//!
//! Accessing a DEVICE_OWNED buffer from the CPU is a bug: the DMA engine may
//! be writing it concurrently.

/// Ownership state of one frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferOwnership {
    /// In the pool, not attached to anything.
    Free,
    /// Held by the driver; CPU access allowed.
    DriverOwned,
    /// Handed to the DMA engine; CPU access forbidden.
    DeviceOwned,
}

/// A single frame buffer carved out of the DMA arena.
pub struct FrameBuffer {
    /// CPU-accessible pointer to buffer data.
    cpu_ptr: *mut u8,
    /// Device-visible bus address.
    bus_addr: u64,
    /// Buffer capacity in bytes.
    capacity: usize,
    /// Current ownership state.
    ownership: BufferOwnership,
    /// Buffer index within the pool.
    index: u16,
}

impl FrameBuffer {
    /// Create a new frame buffer.
    ///
    /// # Safety
    ///
    /// - `cpu_ptr` must point to `capacity` bytes of valid DMA memory
    /// - `bus_addr` must be the corresponding device-visible address
    pub unsafe fn new(cpu_ptr: *mut u8, bus_addr: u64, capacity: usize, index: u16) -> Self {
        Self {
            cpu_ptr,
            bus_addr,
            capacity,
            ownership: BufferOwnership::Free,
            index,
        }
    }

    /// Get buffer data as a slice.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is not driver-owned.
    pub fn as_slice(&self) -> &[u8] {
        assert!(
            self.ownership == BufferOwnership::DriverOwned,
            "BUG: CPU access to buffer not owned by driver (state: {:?})",
            self.ownership
        );
        unsafe { core::slice::from_raw_parts(self.cpu_ptr, self.capacity) }
    }

    /// Get buffer data as a mutable slice.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is not driver-owned.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        assert!(
            self.ownership == BufferOwnership::DriverOwned,
            "BUG: CPU access to buffer not owned by driver (state: {:?})",
            self.ownership
        );
        unsafe { core::slice::from_raw_parts_mut(self.cpu_ptr, self.capacity) }
    }

    /// Get the device-visible bus address.
    pub fn bus_addr(&self) -> u64 {
        self.bus_addr
    }

    /// Get the CPU pointer.
    pub fn cpu_ptr(&self) -> *mut u8 {
        self.cpu_ptr
    }

    /// Get buffer index.
    pub fn index(&self) -> u16 {
        self.index
    }

    /// Get buffer capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get current ownership state.
    pub fn ownership(&self) -> BufferOwnership {
        self.ownership
    }

    pub fn is_free(&self) -> bool {
        self.ownership == BufferOwnership::Free
    }

    pub fn is_driver_owned(&self) -> bool {
        self.ownership == BufferOwnership::DriverOwned
    }

    pub fn is_device_owned(&self) -> bool {
        self.ownership == BufferOwnership::DeviceOwned
    }

    /// Free -> DriverOwned.
    ///
    /// # Safety
    ///
    /// Only call during allocation from the pool.
    pub(crate) unsafe fn mark_allocated(&mut self) {
        debug_assert!(self.is_free(), "buffer must be free to allocate");
        self.ownership = BufferOwnership::DriverOwned;
    }

    /// DriverOwned -> DeviceOwned.
    ///
    /// # Safety
    ///
    /// Only call immediately before handing the buffer to the DMA engine.
    pub unsafe fn mark_device_owned(&mut self) {
        debug_assert!(
            self.ownership == BufferOwnership::DriverOwned,
            "buffer must be driver-owned before device transfer"
        );
        self.ownership = BufferOwnership::DeviceOwned;
    }

    /// DeviceOwned -> DriverOwned.
    ///
    /// # Safety
    ///
    /// Only call once the hardware has released the paired descriptor.
    pub unsafe fn mark_driver_owned(&mut self) {
        debug_assert!(
            self.ownership == BufferOwnership::DeviceOwned,
            "buffer must be device-owned before reclaim"
        );
        self.ownership = BufferOwnership::DriverOwned;
    }

    /// DriverOwned -> Free.
    ///
    /// # Safety
    ///
    /// Only call during return to the pool.
    pub(crate) unsafe fn mark_free(&mut self) {
        debug_assert!(
            self.ownership == BufferOwnership::DriverOwned,
            "buffer must be driver-owned before freeing"
        );
        self.ownership = BufferOwnership::Free;
    }
}

// Safety: buffers hold raw pointers into the DMA arena, valid for the
// driver's lifetime; access is serialized by the owning pool's lock.
unsafe impl Send for FrameBuffer {}

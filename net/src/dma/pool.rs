//! Frame buffer pool.
//!
//! Fixed set of equally sized DMA buffers with free-list tracking. The pool
//! also counts every allocate and every release: a buffer must be released
//! exactly once per occupancy cycle, and the counters make that checkable
//! from the outside.

use super::buffer::FrameBuffer;

/// Maximum number of buffers per pool.
pub const MAX_POOL_SIZE: usize = 32;

pub struct FramePool {
    /// Array of frame buffers.
    buffers: [Option<FrameBuffer>; MAX_POOL_SIZE],
    /// Free list (indices of free buffers).
    free_list: [u16; MAX_POOL_SIZE],
    /// Number of free buffers.
    free_count: usize,
    /// Total number of buffers in the pool.
    total_count: usize,
    /// Size of each buffer.
    buffer_size: usize,
    /// Lifetime allocation count.
    allocated_total: u64,
    /// Lifetime release count.
    released_total: u64,
}

impl FramePool {
    /// Create a pool over a contiguous DMA region.
    ///
    /// # Safety
    ///
    /// - `cpu_base`/`bus_base` must describe at least `buffer_size * count`
    ///   bytes of valid, identity-mapped DMA memory owned by this pool.
    pub unsafe fn new(cpu_base: *mut u8, bus_base: u64, buffer_size: usize, count: usize) -> Self {
        assert!(count <= MAX_POOL_SIZE, "pool size exceeds maximum");
        assert!(buffer_size > 0, "buffer size must be positive");

        let mut buffers: [Option<FrameBuffer>; MAX_POOL_SIZE] = Default::default();
        let mut free_list = [0u16; MAX_POOL_SIZE];

        for i in 0..count {
            let cpu_ptr = cpu_base.add(i * buffer_size);
            let bus_addr = bus_base + (i * buffer_size) as u64;
            buffers[i] = Some(FrameBuffer::new(cpu_ptr, bus_addr, buffer_size, i as u16));
            free_list[i] = i as u16;
        }

        Self {
            buffers,
            free_list,
            free_count: count,
            total_count: count,
            buffer_size,
            allocated_total: 0,
            released_total: 0,
        }
    }

    /// Allocate a buffer. `None` when the pool is exhausted.
    pub fn alloc(&mut self) -> Option<&mut FrameBuffer> {
        if self.free_count == 0 {
            return None;
        }

        self.free_count -= 1;
        let idx = self.free_list[self.free_count] as usize;
        self.allocated_total += 1;

        let buf = self.buffers[idx].as_mut()?;
        debug_assert!(buf.is_free(), "allocated buffer must be free");
        unsafe { buf.mark_allocated() };
        Some(buf)
    }

    /// Return a driver-owned buffer to the pool.
    pub fn free(&mut self, index: u16) {
        let idx = index as usize;
        assert!(idx < self.total_count, "invalid buffer index");

        if let Some(buf) = self.buffers[idx].as_mut() {
            debug_assert!(buf.is_driver_owned(), "can only free driver-owned buffers");
            unsafe { buf.mark_free() };

            self.free_list[self.free_count] = index;
            self.free_count += 1;
            self.released_total += 1;
        }
    }

    /// Get a mutable reference to a buffer by index.
    pub fn get_mut(&mut self, index: u16) -> Option<&mut FrameBuffer> {
        self.buffers.get_mut(index as usize)?.as_mut()
    }

    /// Get a reference to a buffer by index.
    pub fn get(&self, index: u16) -> Option<&FrameBuffer> {
        self.buffers.get(index as usize)?.as_ref()
    }

    /// Number of free buffers.
    pub fn available(&self) -> usize {
        self.free_count
    }

    /// Total buffers in the pool.
    pub fn total(&self) -> usize {
        self.total_count
    }

    /// Buffers currently allocated.
    pub fn in_use(&self) -> usize {
        self.total_count - self.free_count
    }

    pub fn is_exhausted(&self) -> bool {
        self.free_count == 0
    }

    /// Buffer size.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Lifetime (allocated, released) counts.
    pub fn lifetime_counts(&self) -> (u64, u64) {
        (self.allocated_total, self.released_total)
    }
}

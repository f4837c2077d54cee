//! DMA memory arena for bare-metal device drivers.
//!
//! Descriptor rings and frame buffers have to live in memory the device can
//! see, with a known bus address, for the whole lifetime of the driver. This
//! crate provides a small bump arena over a caller-supplied, identity-mapped
//! region: carve the ring and buffer areas out once at attach time, keep the
//! chunks forever.
//!
//! # Design
//!
//! - **Zero firmware dependencies**: works on any platform
//! - **Caller-supplied memory**: the arena never discovers or maps anything
//! - **Identity mapping assumed**: bus address == CPU address
//! - **No deallocation**: driver DMA memory is never returned piecemeal;
//!   `reset` discards everything at once
//!
//! # Usage
//!
//! ```ignore
//! use dma_pool::{DmaArena, MemoryRegion};
//!
//! let mut arena = unsafe { DmaArena::new(MemoryRegion::new(base, size))? };
//! let rings = arena.alloc(RING_BYTES, 16)?;
//! let buffers = arena.alloc(BUF_BYTES, 4)?;
//! ```

#![no_std]

use core::ptr::NonNull;

/// Page size (4KB).
pub const PAGE_SIZE: usize = 4096;

/// Minimum alignment handed out by the arena.
pub const MIN_ALIGN: usize = 16;

/// Align a value up to the given alignment.
#[inline]
pub const fn align_up(val: usize, align: usize) -> usize {
    (val + align - 1) & !(align - 1)
}

/// Align a value down to the given alignment.
#[inline]
pub const fn align_down(val: usize, align: usize) -> usize {
    val & !(align - 1)
}

/// A memory region suitable for DMA.
#[derive(Debug, Clone, Copy)]
pub struct MemoryRegion {
    /// Base address (physical = virtual in identity mapping).
    pub base: usize,
    /// Size in bytes.
    pub size: usize,
}

impl MemoryRegion {
    /// Create a new memory region.
    pub const fn new(base: usize, size: usize) -> Self {
        Self { base, size }
    }

    /// Check if the region can back an arena (aligned, non-empty).
    pub fn is_usable(&self) -> bool {
        self.base != 0 && self.base % MIN_ALIGN == 0 && self.size >= MIN_ALIGN
    }
}

/// DMA arena errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaError {
    /// Requested zero bytes.
    ZeroSize,
    /// Alignment is not a power of two.
    BadAlign,
    /// Not enough memory left in the arena.
    OutOfMemory,
    /// Backing region is unusable.
    InvalidRegion,
}

/// Result type for DMA operations.
pub type Result<T> = core::result::Result<T, DmaError>;

/// A chunk of DMA memory handed out by the arena.
///
/// Holds both views of the same memory: the CPU pointer for driver access
/// and the bus address to program into device registers and descriptors.
#[derive(Debug, Clone, Copy)]
pub struct DmaChunk {
    cpu: NonNull<u8>,
    bus: u64,
    len: usize,
}

impl DmaChunk {
    /// Get the CPU pointer.
    pub fn cpu_ptr(&self) -> *mut u8 {
        self.cpu.as_ptr()
    }

    /// Get the device-visible bus address.
    pub fn bus_addr(&self) -> u64 {
        self.bus
    }

    /// Chunk length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the chunk is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Bump arena over one DMA-capable memory region.
///
/// Allocations are never freed individually. A driver carves out its rings
/// and buffer pools at attach time and keeps them until the device goes away.
pub struct DmaArena {
    base: usize,
    size: usize,
    offset: usize,
}

impl DmaArena {
    /// Create an arena over `region`. The region is zeroed.
    ///
    /// # Safety
    ///
    /// - `region` must be valid, writable, identity-mapped memory.
    /// - Nothing else may use the region while the arena (or any chunk
    ///   allocated from it) is alive.
    pub unsafe fn new(region: MemoryRegion) -> Result<Self> {
        if !region.is_usable() {
            return Err(DmaError::InvalidRegion);
        }
        core::ptr::write_bytes(region.base as *mut u8, 0, region.size);
        Ok(Self {
            base: region.base,
            size: region.size,
            offset: 0,
        })
    }

    /// Allocate `len` bytes aligned to `align`.
    ///
    /// The memory was zeroed at arena construction and has not been handed
    /// out before, so it is returned as-is.
    pub fn alloc(&mut self, len: usize, align: usize) -> Result<DmaChunk> {
        if len == 0 {
            return Err(DmaError::ZeroSize);
        }
        if !align.is_power_of_two() {
            return Err(DmaError::BadAlign);
        }

        let align = align.max(MIN_ALIGN);
        let start = align_up(self.offset, align);
        let end = start.checked_add(len).ok_or(DmaError::OutOfMemory)?;
        if end > self.size {
            return Err(DmaError::OutOfMemory);
        }
        self.offset = end;

        let addr = self.base + start;
        // base is non-zero and checked at construction
        let cpu = NonNull::new(addr as *mut u8).ok_or(DmaError::InvalidRegion)?;
        Ok(DmaChunk {
            cpu,
            bus: addr as u64,
            len,
        })
    }

    /// Remaining free space in bytes (before alignment padding).
    pub fn remaining(&self) -> usize {
        self.size - self.offset
    }

    /// Total arena size in bytes.
    pub fn total_size(&self) -> usize {
        self.size
    }

    /// Discard all allocations and zero the region again.
    ///
    /// # Safety
    ///
    /// Every chunk previously handed out must be dead: no descriptor ring or
    /// buffer built on top of this arena may be used afterwards.
    pub unsafe fn reset(&mut self) {
        core::ptr::write_bytes(self.base as *mut u8, 0, self.size);
        self.offset = 0;
    }
}

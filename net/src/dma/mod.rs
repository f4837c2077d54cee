//! DMA structures shared between the driver and the hardware.
//!
//! Two fixed-size descriptor rings (transmit and receive) plus the frame
//! buffer pools they point into. Ring capacity matches the hardware FIFO
//! depth and never changes.

pub mod buffer;
pub mod desc;
pub mod pool;
pub mod ring;

pub use buffer::{BufferOwnership, FrameBuffer};
pub use pool::FramePool;
pub use ring::{RxRing, TxRing};

use desc::{RxDesc, TxDesc};

/// TX ring capacity (hardware FIFO depth).
pub const TX_RING_SIZE: usize = 8;
pub const TX_RING_MASK: usize = TX_RING_SIZE - 1;

/// RX ring capacity.
pub const RX_RING_SIZE: usize = 16;
pub const RX_RING_MASK: usize = RX_RING_SIZE - 1;

/// Size of one ring frame buffer. Large enough for a maximum frame plus FCS.
pub const MAX_RXBUF_SIZE: usize = 0x700;

/// TX ring footprint in DMA memory.
pub const TX_RING_BYTES: usize = core::mem::size_of::<TxDesc>() * TX_RING_SIZE;

/// RX ring footprint in DMA memory.
pub const RX_RING_BYTES: usize = core::mem::size_of::<RxDesc>() * RX_RING_SIZE;

//! Driver trait definitions.

use crate::types::MacAddress;

/// TX error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxError {
    /// TX ring is full (or no buffer could be mapped); back-pressure, not a
    /// failure. Try again after completions are collected.
    QueueFull,
    /// Device not running.
    DeviceNotReady,
    /// Frame exceeds the ring buffer size.
    FrameTooLarge,
}

/// RX error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxError {
    /// Provided buffer too small for frame.
    BufferTooSmall {
        /// Required buffer size.
        needed: usize,
    },
    /// Device not running.
    DeviceNotReady,
}

/// Upstream consumer of received frames.
///
/// Invoked from the budgeted receive processor with the CRC already trimmed.
/// The slice is only valid for the duration of the call; the sink copies what
/// it wants to keep.
pub trait FrameSink {
    fn frame_received(&mut self, frame: &[u8]);
}

/// Core network device interface.
///
/// Higher layers (the smoltcp adapter, platform glue) use this instead of
/// the concrete driver type.
pub trait NetworkDriver {
    /// Get station address.
    fn mac_address(&self) -> MacAddress;

    /// Check if device can accept a TX frame.
    fn can_transmit(&self) -> bool;

    /// Check if device has a received frame ready.
    fn can_receive(&self) -> bool;

    /// Queue an Ethernet frame for transmission.
    ///
    /// Returns immediately; completion is collected by the TX interrupt (or
    /// [`collect_tx_completions`](Self::collect_tx_completions) when polling).
    fn transmit(&mut self, frame: &[u8]) -> Result<(), TxError>;

    /// Receive one Ethernet frame into `buffer`, non-blocking.
    ///
    /// - `Ok(Some(len))`: frame received, `len` bytes copied
    /// - `Ok(None)`: nothing pending (normal)
    fn receive(&mut self, buffer: &mut [u8]) -> Result<Option<usize>, RxError>;

    /// Refill the RX ring with available buffers.
    fn refill_rx_queue(&mut self);

    /// Reclaim completed TX slots.
    fn collect_tx_completions(&mut self);

    /// Get link status.
    fn link_up(&self) -> bool {
        true
    }
}

//! Hardware descriptor layout.
//!
//! Descriptors are four little-endian 32-bit words in DMA memory. The
//! ownership bit in the first status/owner word is the handover point: set
//! means the hardware owns the slot, clear means software does. All field
//! access goes through the rings' volatile accessors; the structs here only
//! fix the layout.

/// TX descriptor as the DMA engine sees it.
#[repr(C)]
pub struct TxDesc {
    /// Ownership word ([`TDES_OWN`]).
    pub owner: u32,
    /// Control/status word (interrupt-on-complete, segment flags, length).
    pub status: u32,
    /// Frame buffer bus address.
    pub data_ptr: u32,
    /// Bus address of the next descriptor; chained into a circle at init.
    pub next_desc: u32,
}

/// RX descriptor.
#[repr(C)]
pub struct RxDesc {
    /// Status word: ownership, segment flags, error flags, frame length.
    pub status: u32,
    /// Buffer length word.
    pub length: u32,
    /// Frame buffer bus address.
    pub data_ptr: u32,
    /// Bus address of the next descriptor.
    pub next_desc: u32,
}

// TX owner word
/// Descriptor owned by hardware.
pub const TDES_OWN: u32 = 1 << 31;

// TX status word
/// Raise the TX interrupt when this frame completes.
pub const TDES_IC: u32 = 1 << 31;
/// First segment of the frame.
pub const TDES_FS: u32 = 1 << 30;
/// Last segment of the frame.
pub const TDES_LS: u32 = 1 << 29;
/// Transmit buffer size mask.
pub const TDES_TBS: u32 = 0x7ff;

// RX status word
/// Descriptor owned by hardware.
pub const RDES_OWN: u32 = 1 << 31;
/// First segment of the frame.
pub const RDES_FS: u32 = 1 << 30;
/// Last segment of the frame.
pub const RDES_LS: u32 = 1 << 29;
/// Error summary.
pub const RDES_ES: u32 = 1 << 25;
/// Multicast frame.
pub const RDES_MF: u32 = 1 << 24;
/// Report-on-MII / receive error.
pub const RDES_RE: u32 = 1 << 19;
/// Frame too long.
pub const RDES_TL: u32 = 1 << 18;
/// Runt frame.
pub const RDES_RF: u32 = 1 << 17;
/// CRC error.
pub const RDES_CE: u32 = 1 << 16;
/// Frame length mask (includes the FCS).
pub const RDES_FLEN: u32 = 0x7ff;

//! Centaur Ethernet register map.
//!
//! Two register blocks per port: the MAC/DMA engine block and the misc
//! (PHY / switch) block. The global interrupt-enable register sits outside
//! both and is reached through its own HAL accessor.

// ═══════════════════════════════════════════════════════════════════════════
// MAC / DMA ENGINE BLOCK
// ═══════════════════════════════════════════════════════════════════════════

/// TX DMA control.
pub const DTXC: u16 = 0x00;
/// RX DMA control.
pub const DRXC: u16 = 0x04;
/// TX DMA start command (write to kick the engine out of idle).
pub const DTSC: u16 = 0x08;
/// RX DMA start command.
pub const DRSC: u16 = 0x0c;
/// TX descriptor list base address.
pub const TDLB: u16 = 0x10;
/// RX descriptor list base address.
pub const RDLB: u16 = 0x14;
/// Station address low (octets 2-5).
pub const MAL: u16 = 0x18;
/// Station address high (octets 0-1).
pub const MAH: u16 = 0x1c;

/// Number of additional station address slots in hardware.
pub const NR_ADDRESSES: usize = 16;

/// Additional station address `n`, low half.
pub const fn aal(n: usize) -> u16 {
    0x80 + (n as u16) * 8
}

/// Additional station address `n`, high half.
pub const fn aah(n: usize) -> u16 {
    0x84 + (n as u16) * 8
}

// DTXC bits
/// Soft reset of both DMA engines; hardware clears it when done.
pub const DTXC_TRST: u32 = 1 << 31;
/// TX flow control enable.
pub const DTXC_TFCE: u32 = 1 << 9;
/// Pad short frames.
pub const DTXC_TEP: u32 = 1 << 2;
/// Append CRC.
pub const DTXC_TAC: u32 = 1 << 1;
/// TX engine enable.
pub const DTXC_TE: u32 = 1 << 0;

// DRXC bits
/// Receive all (promiscuous).
pub const DRXC_RA: u32 = 1 << 16;
/// RX flow control enable.
pub const DRXC_RFCE: u32 = 1 << 9;
/// Receive broadcast.
pub const DRXC_RB: u32 = 1 << 6;
/// Receive all multicast.
pub const DRXC_RM: u32 = 1 << 5;
/// Receive unicast.
pub const DRXC_RU: u32 = 1 << 4;
/// RX engine enable.
pub const DRXC_RE: u32 = 1 << 0;

// AAH bits
/// Additional address slot enable.
pub const AAH_E: u32 = 1 << 31;

// ═══════════════════════════════════════════════════════════════════════════
// MISC (PHY / SWITCH) BLOCK
// ═══════════════════════════════════════════════════════════════════════════

/// Switch engine control 0.
pub const SEC0: u16 = 0x00;
/// Switch engine control 1.
pub const SEC1: u16 = 0x04;
/// WAN MII control.
pub const WMC: u16 = 0x08;
/// WAN PHY power management.
pub const WPPM: u16 = 0x0c;
/// PHY PowerSave.
pub const PPS: u16 = 0x10;

// WMC bits
/// Link status (read-only).
pub const WMC_WLS: u32 = 1 << 31;
/// Duplex status: full when set (read-only).
pub const WMC_WDS: u32 = 1 << 30;
/// Speed status: 100Mbit when set (read-only).
pub const WMC_WSS: u32 = 1 << 29;
/// Restart auto-negotiation.
pub const WMC_WANR: u32 = 1 << 26;
/// Auto-negotiation disable.
pub const WMC_WAND: u32 = 1 << 25;
/// Advertise 100Mbit full duplex.
pub const WMC_WANA100F: u32 = 1 << 24;
/// Advertise 100Mbit half duplex.
pub const WMC_WANA100H: u32 = 1 << 23;
/// Advertise 10Mbit full duplex.
pub const WMC_WANA10F: u32 = 1 << 22;
/// Advertise 10Mbit half duplex.
pub const WMC_WANA10H: u32 = 1 << 21;
/// Advertise pause.
pub const WMC_WANAP: u32 = 1 << 20;
/// Forced speed 100Mbit (auto-negotiation disabled).
pub const WMC_WANF100: u32 = 1 << 19;
/// Forced full duplex (auto-negotiation disabled).
pub const WMC_WANFF: u32 = 1 << 18;

// SEC0 bits
/// Switch enable.
pub const SEC0_ENABLE: u32 = 1 << 31;
/// LED1 select field.
pub const SEC0_LLED1S: u32 = 0x7 << 25;
/// LED0 select field.
pub const SEC0_LLED0S: u32 = 0x7 << 22;
/// LED0 mode: link.
pub const LLED0S_LINK: u32 = 0x1 << 22;
/// LED1 mode: link/activity.
pub const LLED1S_LINK_ACTIVITY: u32 = 0x4 << 25;

/// Datasheet default for SEC0 before LED/enable adjustment.
pub const SEC0_DEFAULT: u32 = 0x4081_9e00;
/// Datasheet default for SEC1.
pub const SEC1_DEFAULT: u32 = 0x0940_0100;

// WAN LED select (in WMC low bits)
/// WAN LED0 mode: activity.
pub const WLED0S_ACTIVITY: u32 = 0x1 << 0;
/// WAN LED1 mode: link.
pub const WLED1S_LINK: u32 = 0x2 << 2;

//! Ethernet frame types and helpers.

use core::fmt;

/// Octets in one Ethernet address.
pub const ETH_ALEN: usize = 6;

/// Maximum frame payload (MTU).
pub const ETH_MTU: usize = 1500;

/// Maximum frame size on the wire, without FCS.
pub const ETH_FRAME_MAX: usize = 1514;

/// Frame check sequence length appended by hardware.
pub const ETH_FCS_LEN: usize = 4;

/// An Ethernet station address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MacAddress(pub [u8; ETH_ALEN]);

impl MacAddress {
    pub const ZERO: MacAddress = MacAddress([0; ETH_ALEN]);

    pub const fn new(octets: [u8; ETH_ALEN]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; ETH_ALEN] {
        self.0
    }

    /// True for the group (multicast/broadcast) address class.
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; ETH_ALEN]
    }

    /// A valid station address is neither all-zero nor a group address.
    pub fn is_valid(&self) -> bool {
        !self.is_zero() && !self.is_multicast()
    }

    /// Split into the (high, low) register halves the MAC block uses:
    /// high carries octets 0-1, low carries octets 2-5.
    pub fn to_reg_pair(&self) -> (u32, u32) {
        let high = ((self.0[0] as u32) << 8) | (self.0[1] as u32);
        let low = ((self.0[2] as u32) << 24)
            | ((self.0[3] as u32) << 16)
            | ((self.0[4] as u32) << 8)
            | (self.0[5] as u32);
        (high, low)
    }

    /// Inverse of [`to_reg_pair`](Self::to_reg_pair).
    pub fn from_reg_pair(high: u32, low: u32) -> Self {
        Self([
            (high >> 8) as u8,
            high as u8,
            (low >> 24) as u8,
            (low >> 16) as u8,
            (low >> 8) as u8,
            low as u8,
        ])
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

//! Media management.
//!
//! Only the WAN port has a real PHY, controlled through the WMC register in
//! the misc block: auto-negotiation advertisement bits, forced speed/duplex
//! bits and read-only link/speed/duplex status. The LAN port sits behind the
//! integrated switch and the HPNA port has no PHY, so media operations on
//! those ports are rejected.

use super::{CentaurMac, PortType};
use crate::hal::MacHal;
use crate::regs;

/// Link speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Mb10,
    Mb100,
}

/// Link duplex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duplex {
    Half,
    Full,
}

/// Auto-negotiation advertisement set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Advertise {
    pub full_100: bool,
    pub half_100: bool,
    pub full_10: bool,
    pub half_10: bool,
}

impl Advertise {
    pub const ALL: Advertise = Advertise {
        full_100: true,
        half_100: true,
        full_10: true,
        half_10: true,
    };

    pub fn is_empty(&self) -> bool {
        !(self.full_100 || self.half_100 || self.full_10 || self.half_10)
    }

    fn to_wmc(self) -> u32 {
        let mut bits = 0;
        if self.full_100 {
            bits |= regs::WMC_WANA100F;
        }
        if self.half_100 {
            bits |= regs::WMC_WANA100H;
        }
        if self.full_10 {
            bits |= regs::WMC_WANA10F;
        }
        if self.half_10 {
            bits |= regs::WMC_WANA10H;
        }
        bits
    }

    fn from_wmc(wmc: u32) -> Self {
        Self {
            full_100: wmc & regs::WMC_WANA100F != 0,
            half_100: wmc & regs::WMC_WANA100H != 0,
            full_10: wmc & regs::WMC_WANA10F != 0,
            half_10: wmc & regs::WMC_WANA10H != 0,
        }
    }
}

/// Media settings, ethtool-style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSettings {
    pub autoneg: bool,
    /// Advertisement when negotiating, ignored when forced.
    pub advertise: Advertise,
    /// Forced (or negotiated, on read) speed.
    pub speed: Speed,
    /// Forced (or negotiated, on read) duplex.
    pub duplex: Duplex,
    /// Link status (read only).
    pub link: bool,
}

/// Flow control settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseParams {
    pub autoneg_pause: bool,
    pub rx_pause: bool,
    pub tx_pause: bool,
}

/// Media operation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaError {
    /// The port has no controllable PHY.
    Unsupported,
    /// Settings combination the hardware cannot express.
    InvalidParameter,
}

impl<H: MacHal> CentaurMac<H> {
    fn require_wan(&self) -> Result<(), MediaError> {
        if self.config.port == PortType::Wan {
            Ok(())
        } else {
            Err(MediaError::Unsupported)
        }
    }

    /// Current media settings of the WAN PHY.
    pub fn link_settings(&self) -> Result<LinkSettings, MediaError> {
        self.require_wan()?;
        let wmc = self.hal.misc_read(regs::WMC);
        Ok(LinkSettings {
            autoneg: wmc & regs::WMC_WAND == 0,
            advertise: Advertise::from_wmc(wmc),
            speed: if wmc & regs::WMC_WSS != 0 {
                Speed::Mb100
            } else {
                Speed::Mb10
            },
            duplex: if wmc & regs::WMC_WDS != 0 {
                Duplex::Full
            } else {
                Duplex::Half
            },
            link: wmc & regs::WMC_WLS != 0,
        })
    }

    /// Reconfigure the WAN PHY.
    ///
    /// With auto-negotiation the advertisement set must be non-empty; without
    /// it the speed/duplex pair is forced.
    pub fn set_link_settings(&self, settings: LinkSettings) -> Result<(), MediaError> {
        self.require_wan()?;

        let mut wmc = self.hal.misc_read(regs::WMC);
        wmc &= !(regs::WMC_WAND
            | regs::WMC_WANA100F
            | regs::WMC_WANA100H
            | regs::WMC_WANA10F
            | regs::WMC_WANA10H
            | regs::WMC_WANF100
            | regs::WMC_WANFF);

        if settings.autoneg {
            if settings.advertise.is_empty() {
                return Err(MediaError::InvalidParameter);
            }
            wmc |= settings.advertise.to_wmc() | regs::WMC_WANR;
        } else {
            wmc |= regs::WMC_WAND;
            if settings.speed == Speed::Mb100 {
                wmc |= regs::WMC_WANF100;
            }
            if settings.duplex == Duplex::Full {
                wmc |= regs::WMC_WANFF;
            }
        }

        self.hal.misc_write(regs::WMC, wmc);
        Ok(())
    }

    /// Kick off a new auto-negotiation round.
    pub fn restart_autoneg(&self) -> Result<(), MediaError> {
        self.require_wan()?;
        let wmc = self.hal.misc_read(regs::WMC);
        if wmc & regs::WMC_WAND != 0 {
            // Negotiation is disabled, nothing to restart
            return Err(MediaError::InvalidParameter);
        }
        self.hal.misc_write(regs::WMC, wmc | regs::WMC_WANR);
        Ok(())
    }

    /// Current flow control settings.
    pub fn pause_params(&self) -> Result<PauseParams, MediaError> {
        self.require_wan()?;
        let wmc = self.hal.misc_read(regs::WMC);
        Ok(PauseParams {
            autoneg_pause: wmc & regs::WMC_WANAP != 0,
            rx_pause: self.hal.mac_read(regs::DRXC) & regs::DRXC_RFCE != 0,
            tx_pause: self.hal.mac_read(regs::DTXC) & regs::DTXC_TFCE != 0,
        })
    }
}

/// Bring the integrated switch behind the LAN port to its working defaults
/// and pick the LED modes.
pub(crate) fn init_switch<H: MacHal>(hal: &H) {
    let mut sec0 = regs::SEC0_DEFAULT;
    sec0 &= !(regs::SEC0_LLED1S | regs::SEC0_LLED0S);
    sec0 |= regs::LLED1S_LINK_ACTIVITY | regs::LLED0S_LINK;
    sec0 |= regs::SEC0_ENABLE;
    hal.misc_write(regs::SEC0, sec0);
    hal.misc_write(regs::SEC1, regs::SEC1_DEFAULT);
}

/// Bring the WAN PHY up advertising everything, with the usual LED modes.
/// Negotiation is restarted so the fresh advertisement replaces whatever
/// the PHY settled on before.
pub(crate) fn init_wan_phy<H: MacHal>(hal: &H) {
    let wmc = regs::WMC_WANR
        | regs::WMC_WANAP
        | Advertise::ALL.to_wmc()
        | regs::WLED1S_LINK
        | regs::WLED0S_ACTIVITY;
    hal.misc_write(regs::WMC, wmc);
    hal.misc_write(regs::WPPM, 0);
    hal.misc_write(regs::PPS, 0);
}

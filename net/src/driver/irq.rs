//! Interrupt top halves and masking helpers.
//!
//! The platform dispatches each port's RX, TX and (for the WAN port) link
//! interrupts here. Top halves stay short: TX reclaims completions inline,
//! RX only schedules the poll routine and masks itself until the poll pass
//! drains the ring.
//!
//! The target is a single core, so a top half preempting a thread that holds
//! the TX or RX spinlock would spin forever. Every critical section shared
//! with a top half therefore runs under [`with_port_irqs_masked`]
//! (CentaurMac::with_port_irqs_masked): the port's lines are masked at the
//! controller for the duration and rewritten from `irq_shadow` on exit.
//! `irq_shadow` holds the intended enable state, so an RX self-mask made
//! inside a guarded section sticks after the guard restores.

use core::sync::atomic::Ordering;

use super::{CentaurMac, PortType};
use crate::hal::MacHal;
use crate::log_info;
use crate::regs;

impl<H: MacHal> CentaurMac<H> {
    #[inline]
    fn rx_irq_bit(&self) -> u32 {
        1 << self.config.rx_irq
    }

    #[inline]
    fn tx_irq_bit(&self) -> u32 {
        1 << self.config.tx_irq
    }

    fn irq_bits(&self) -> u32 {
        let mut bits = self.rx_irq_bit() | self.tx_irq_bit();
        if let Some(link) = self.config.link_irq {
            bits |= 1 << link;
        }
        bits
    }

    /// Rewrite this port's lines in the controller from the shadow state,
    /// leaving other ports' bits alone.
    fn apply_irq_shadow(&self) {
        let cur = self.hal.irq_enable_read();
        self.hal
            .irq_enable_write((cur & !self.irq_bits()) | self.irq_shadow.load(Ordering::Acquire));
    }

    /// Run `f` with all of this port's interrupt lines masked.
    ///
    /// Required around any acquisition of the TX or RX lock outside
    /// interrupt context.
    pub(crate) fn with_port_irqs_masked<R>(&self, f: impl FnOnce() -> R) -> R {
        let cur = self.hal.irq_enable_read();
        self.hal.irq_enable_write(cur & !self.irq_bits());
        let result = f();
        self.apply_irq_shadow();
        result
    }

    /// Enable all of this port's interrupt lines at the controller.
    pub(crate) fn enable_irqs(&self) {
        self.irq_shadow.store(self.irq_bits(), Ordering::Release);
        self.apply_irq_shadow();
    }

    /// Disable all of this port's interrupt lines.
    pub(crate) fn disable_irqs(&self) {
        self.irq_shadow.store(0, Ordering::Release);
        self.apply_irq_shadow();
    }

    /// Record the RX line as masked. The controller is rewritten when the
    /// enclosing guard exits.
    pub(crate) fn mask_rx_irq(&self) {
        self.irq_shadow
            .fetch_and(!self.rx_irq_bit(), Ordering::AcqRel);
    }

    /// Record the RX line as enabled again.
    pub(crate) fn unmask_rx_irq(&self) {
        self.irq_shadow.fetch_or(self.rx_irq_bit(), Ordering::AcqRel);
    }

    /// TX completion interrupt: reclaim finished slots and release
    /// back-pressure.
    pub fn tx_irq(&self) {
        self.collect_tx_completions();
        if self.queue_stopped() {
            self.with_port_irqs_masked(|| {
                let tx = self.tx.lock();
                if tx.used < tx.ring.len() {
                    self.wake_queue();
                }
            });
        }
    }

    /// RX interrupt: schedule the poll routine once and self-mask.
    ///
    /// Returns true when a poll pass was scheduled; false means one is
    /// already pending and this interrupt folds into it.
    pub fn rx_irq(&self) -> bool {
        self.with_port_irqs_masked(|| {
            // The RX lock orders this against a concurrent poll pass
            // finishing and unmasking.
            let _rx = self.rx.lock();
            if self
                .poll_scheduled
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                self.mask_rx_irq();
                true
            } else {
                false
            }
        })
    }

    /// True while a poll pass is owed to the scheduler.
    pub fn poll_pending(&self) -> bool {
        self.poll_scheduled.load(Ordering::Acquire)
    }

    /// Link state change interrupt (WAN port only).
    pub fn link_irq(&self) {
        if self.config.port != PortType::Wan {
            return;
        }
        let up = self.hal.misc_read(regs::WMC) & regs::WMC_WLS != 0;
        let was = self.carrier.swap(up, Ordering::AcqRel);
        if up != was {
            if up {
                log_info!("link up");
            } else {
                log_info!("link down");
            }
        }
    }
}

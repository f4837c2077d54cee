//! Device lifecycle: reset, bring-up, shutdown, suspend/resume and the
//! transmit watchdog.
//!
//! The shutdown drain is the one place buffers leave the rings without the
//! hardware releasing them first: the engines are stopped, interrupts are
//! off, so the driver force-reclaims every in-flight buffer exactly once.

use core::sync::atomic::Ordering;

use super::{BufferSlot, CentaurMac, RunState};
use crate::hal::MacHal;
use crate::log_warn;
use crate::regs;
use crate::traits::TxError;

/// Bring-up failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenError {
    /// Station address is all-zero or a group address.
    InvalidMacAddress,
    /// Port is not in a state it can be opened from.
    BadState(RunState),
}

impl<H: MacHal> CentaurMac<H> {
    /// Soft-reset both DMA engines.
    ///
    /// The reset bit self-clears when the engines are quiescent. A chip that
    /// never clears it within the watchdog bound gets a warning and the
    /// bring-up continues anyway; the engines are re-programmed from scratch
    /// right after, which in practice recovers even a wedged engine.
    pub(crate) fn reset(&self) {
        self.set_state(RunState::Resetting);
        self.hal.mac_write(regs::DTXC, regs::DTXC_TRST);

        let mut remaining = self.config.watchdog_ms;
        while self.hal.mac_read(regs::DTXC) & regs::DTXC_TRST != 0 {
            if remaining == 0 {
                log_warn!("timeout waiting for DMA engine reset");
                break;
            }
            self.hal.delay_ms(1);
            remaining -= 1;
        }
        self.hal.delay_ms(10);

        // Defaults: unicast and broadcast receive, pad and CRC on transmit
        self.hal.mac_write(regs::DRXC, regs::DRXC_RU | regs::DRXC_RB);
        self.hal.mac_write(regs::DTXC, regs::DTXC_TEP | regs::DTXC_TAC);
    }

    /// Program the rings and enable both engines. Expects a prior
    /// [`reset`](Self::reset).
    pub(crate) fn init_net(&self) {
        {
            let mut tx = self.tx.lock();
            tx.used = 0;
            tx.next_slot = 0;
            self.hal.mac_write(regs::TDLB, tx.ring.bus_addr() as u32);
        }
        {
            let mut rx = self.rx.lock();
            rx.next_to_read = 0;
            let super::RxState {
                ring, slots, pool, ..
            } = &mut *rx;
            self.refill_locked(ring, slots, pool);
            self.hal.mac_write(regs::RDLB, ring.bus_addr() as u32);
        }

        self.enable_irqs();

        let dtxc = self.hal.mac_read(regs::DTXC);
        self.hal.mac_write(regs::DTXC, dtxc | regs::DTXC_TE);
        let drxc = self.hal.mac_read(regs::DRXC);
        self.hal.mac_write(regs::DRXC, drxc | regs::DRXC_RE);

        self.set_state(RunState::Running);
        self.hal.mac_write(regs::DRSC, 0);
    }

    /// Stop both engines and force-drain every in-flight buffer.
    pub(crate) fn shutdown(&self) {
        self.set_state(RunState::Down);

        let dtxc = self.hal.mac_read(regs::DTXC);
        self.hal.mac_write(regs::DTXC, dtxc & !regs::DTXC_TE);
        let drxc = self.hal.mac_read(regs::DRXC);
        self.hal.mac_write(regs::DRXC, drxc & !regs::DRXC_RE);
        self.disable_irqs();

        {
            let mut tx = self.tx.lock();
            let super::TxState {
                ring, slots, pool, used, next_slot,
            } = &mut *tx;
            for n in 0..ring.len() {
                if let Some(index) = slots[n].buf.take() {
                    ring.clear(n);
                    if let Some(buf) = pool.get_mut(index) {
                        unsafe { buf.mark_driver_owned() };
                    }
                    pool.free(index);
                }
                slots[n] = BufferSlot::EMPTY;
            }
            *used = 0;
            *next_slot = 0;
        }
        {
            let mut rx = self.rx.lock();
            let super::RxState {
                ring, slots, pool, next_to_read,
            } = &mut *rx;
            for n in 0..ring.len() {
                if let Some(index) = slots[n].buf.take() {
                    ring.clear(n);
                    if let Some(buf) = pool.get_mut(index) {
                        unsafe { buf.mark_driver_owned() };
                    }
                    pool.free(index);
                }
                slots[n] = BufferSlot::EMPTY;
            }
            *next_to_read = 0;
            self.poll_scheduled.store(false, Ordering::Release);
        }
    }

    /// Bring the port up: validate the station address, reset the engines,
    /// program the address and the rings, start traffic.
    pub fn open(&self) -> Result<(), OpenError> {
        match self.run_state() {
            RunState::Down => {}
            other => return Err(OpenError::BadState(other)),
        }
        if !self.mac.lock().is_valid() {
            return Err(OpenError::InvalidMacAddress);
        }

        self.reset();
        self.update_mac();
        self.init_net();
        self.reapply_filter();
        self.wake_queue();
        Ok(())
    }

    /// Take the port down.
    pub fn stop(&self) {
        self.stop_queue();
        self.shutdown();
    }

    /// Power-management suspend. Remembers whether traffic was flowing so
    /// [`resume`](Self::resume) can restore it.
    pub fn suspend(&self) {
        let running = self.is_running();
        self.resume_running.store(running, Ordering::Release);
        if running {
            self.stop_queue();
            self.shutdown();
        }
        self.set_state(RunState::Suspended);
    }

    /// Power-management resume. Rebuilds the engine state from scratch; the
    /// chip may have lost it entirely.
    pub fn resume(&self) {
        self.set_state(RunState::Down);
        if self.resume_running.swap(false, Ordering::AcqRel) {
            self.reset();
            self.update_mac();
            self.init_net();
            self.reapply_filter();
            self.wake_queue();
        }
    }

    /// Transmit watchdog: the queue has been stopped too long without a
    /// completion interrupt. Tear the engines down and rebuild them.
    pub fn tx_timeout(&self) {
        log_warn!("transmit watchdog fired, resetting engines");
        self.stop_queue();
        self.shutdown();
        self.reset();
        self.update_mac();
        self.init_net();
        self.reapply_filter();
        self.wake_queue();
    }

    /// Convenience retry wrapper around [`transmit`](Self::transmit) for
    /// synchronous callers: collects completions once on back-pressure.
    pub fn transmit_or_reclaim(&self, frame: &[u8]) -> Result<(), TxError> {
        match self.transmit(frame) {
            Err(TxError::QueueFull) => {
                self.collect_tx_completions();
                if self.queue_stopped() {
                    self.with_port_irqs_masked(|| {
                        let tx = self.tx.lock();
                        if tx.used < tx.ring.len() {
                            drop(tx);
                            self.wake_queue();
                        }
                    });
                }
                self.transmit(frame)
            }
            other => other,
        }
    }
}

//! Receive path.
//!
//! The poll routine walks completed descriptors under a budget, hands good
//! frames to the sink with the trailing CRC stripped, recycles errored slots
//! in place and refills consumed slots from the pool before kicking the
//! engine. Every consumed descriptor counts against the budget, delivered or
//! dropped, so one pass never walks more than `budget` slots. When a pass
//! finishes under budget the RX interrupt is unmasked again; a full-budget
//! pass leaves it masked so the scheduler polls once more.

use core::sync::atomic::Ordering;

use super::{BufferSlot, CentaurMac};
use crate::dma::desc::{RDES_ES, RDES_FS, RDES_LS, RDES_RE, RDES_RF, RDES_TL, RDES_CE};
use crate::dma::{RxRing, RX_RING_MASK};
use crate::hal::MacHal;
use crate::regs;
use crate::traits::FrameSink;
use crate::types::ETH_FCS_LEN;

impl<H: MacHal> CentaurMac<H> {
    /// Process up to `budget` completed RX descriptors.
    ///
    /// Returns the number of descriptors consumed. Dropped frames (error
    /// bits, spanning frames) count toward the budget like delivered ones;
    /// the backlog persists to the next invocation.
    pub fn process_rx(&self, budget: usize, sink: &mut dyn FrameSink) -> usize {
        self.with_port_irqs_masked(|| {
            let mut consumed = 0;

            let mut rx = self.rx.lock();
            let super::RxState {
                ring,
                slots,
                pool,
                next_to_read,
            } = &mut *rx;

            while consumed < budget {
                let n = *next_to_read;
                let Some(index) = slots[n].buf else { break };
                if ring.hw_owns(n) {
                    break;
                }
                let status = ring.load_status(n);

                // A frame that does not both start and end in this
                // descriptor spans buffers; the engine is configured for
                // single-buffer frames so treat it as a length error and
                // recycle the slot.
                if status & (RDES_FS | RDES_LS) != (RDES_FS | RDES_LS) {
                    self.stats.rx_error();
                    self.stats.rx_length_error();
                    ring.rearm(n);
                    *next_to_read = (n + 1) & RX_RING_MASK;
                    consumed += 1;
                    continue;
                }

                if status & (RDES_ES | RDES_RE) != 0 {
                    self.stats.rx_error();
                    if status & (RDES_TL | RDES_RF) != 0 {
                        self.stats.rx_length_error();
                    }
                    if status & RDES_CE != 0 {
                        self.stats.rx_crc_error();
                    }
                    if status & RDES_RE != 0 {
                        self.stats.rx_missed_error();
                    }
                    ring.rearm(n);
                    *next_to_read = (n + 1) & RX_RING_MASK;
                    consumed += 1;
                    continue;
                }

                let wire_len = RxRing::frame_len(status);
                let pkt_len = wire_len.saturating_sub(ETH_FCS_LEN);

                ring.detach(n);
                slots[n] = BufferSlot::EMPTY;
                *next_to_read = (n + 1) & RX_RING_MASK;

                if let Some(buf) = pool.get_mut(index) {
                    unsafe { buf.mark_driver_owned() };
                    sink.frame_received(&buf.as_slice()[..pkt_len]);
                }
                pool.free(index);

                self.stats.rx_packet(pkt_len);
                consumed += 1;
            }

            self.refill_locked(ring, slots, pool);

            // Kick the engine in case it idled on an unowned descriptor
            self.hal.mac_write(regs::DRSC, 0);

            consumed
        })
    }

    /// One scheduler poll pass. Re-enables the RX interrupt when the pass
    /// came in under budget, meaning the ring is drained.
    pub fn poll(&self, budget: usize, sink: &mut dyn FrameSink) -> usize {
        let done = self.process_rx(budget, sink);
        if done < budget {
            self.with_port_irqs_masked(|| {
                // Hold the RX lock over the unmask so a racing interrupt
                // cannot observe the stale scheduled flag.
                let _rx = self.rx.lock();
                self.poll_scheduled.store(false, Ordering::Release);
                self.unmask_rx_irq();
            });
        }
        done
    }

    /// Attach pool buffers to every empty ring slot.
    ///
    /// Stops quietly when the pool runs dry; the next poll pass retries.
    pub(crate) fn refill_locked(
        &self,
        ring: &mut RxRing,
        slots: &mut [BufferSlot],
        pool: &mut crate::dma::FramePool,
    ) {
        for n in 0..ring.len() {
            if slots[n].buf.is_some() {
                continue;
            }
            let Some(buf) = pool.alloc() else { break };
            let index = buf.index();
            let bus = buf.bus_addr();
            let capacity = buf.capacity();
            unsafe { buf.mark_device_owned() };
            slots[n] = BufferSlot {
                buf: Some(index),
                len: 0,
            };
            ring.arm(n, bus, capacity);
        }
    }

    /// Refill the RX ring and restart the engine.
    pub fn refill_rx_buffers(&self) {
        self.with_port_irqs_masked(|| {
            let mut rx = self.rx.lock();
            let super::RxState {
                ring, slots, pool, ..
            } = &mut *rx;
            self.refill_locked(ring, slots, pool);
            self.hal.mac_write(regs::DRSC, 0);
        });
    }
}

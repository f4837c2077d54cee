//! Transmit path.
//!
//! Submission copies the frame into a pool buffer, publishes the next ring
//! slot and kicks the engine. Completion reclaim walks the ring under the
//! same lock, so the two sides never race over a slot. Both take the lock
//! with the port's interrupt lines masked.

use super::{BufferSlot, CentaurMac};
use crate::dma::TX_RING_MASK;
use crate::hal::MacHal;
use crate::regs;
use crate::traits::TxError;
use crate::types::ETH_FRAME_MAX;

impl<H: MacHal> CentaurMac<H> {
    /// Queue one frame for transmission.
    ///
    /// Copies `frame` into a DMA buffer and hands the next ring slot to the
    /// hardware. When the ring fills up the queue is stopped and the caller
    /// gets [`TxError::QueueFull`]; the TX interrupt wakes the queue again.
    pub fn transmit(&self, frame: &[u8]) -> Result<(), TxError> {
        if !self.is_running() {
            return Err(TxError::DeviceNotReady);
        }
        if frame.len() > ETH_FRAME_MAX {
            return Err(TxError::FrameTooLarge);
        }

        self.with_port_irqs_masked(|| {
            let mut tx = self.tx.lock();
            let super::TxState {
                ring,
                slots,
                pool,
                used,
                next_slot,
            } = &mut *tx;

            if *used == ring.len() {
                self.stop_queue();
                return Err(TxError::QueueFull);
            }

            let buf = match pool.alloc() {
                Some(buf) => buf,
                None => {
                    // Pool and ring have the same depth, so this means a
                    // completion went missing. Treat it as back-pressure.
                    self.stop_queue();
                    return Err(TxError::QueueFull);
                }
            };

            buf.as_mut_slice()[..frame.len()].copy_from_slice(frame);
            let index = buf.index();
            let bus = buf.bus_addr();
            unsafe { buf.mark_device_owned() };

            let n = *next_slot;
            slots[n] = BufferSlot {
                buf: Some(index),
                len: frame.len(),
            };
            ring.publish(n, bus, frame.len());

            *next_slot = (n + 1) & TX_RING_MASK;
            *used += 1;
            if *used == ring.len() {
                self.stop_queue();
            }

            // Kick the engine out of idle
            self.hal.mac_write(regs::DTSC, 0);
            Ok(())
        })
    }

    /// Reclaim every ring slot the hardware has finished with.
    ///
    /// Counts the frame, detaches and frees its buffer and makes the slot
    /// available for the next submission.
    pub fn collect_tx_completions(&self) {
        self.with_port_irqs_masked(|| {
            let mut tx = self.tx.lock();
            let super::TxState {
                ring, slots, pool, used, ..
            } = &mut *tx;

            for n in 0..ring.len() {
                let Some(index) = slots[n].buf else { continue };
                if ring.hw_owns(n) {
                    continue;
                }

                self.stats.tx_packet(slots[n].len);
                ring.clear_data(n);
                if let Some(buf) = pool.get_mut(index) {
                    unsafe { buf.mark_driver_owned() };
                }
                pool.free(index);
                slots[n] = BufferSlot::EMPTY;
                *used -= 1;
            }
        });
    }
}

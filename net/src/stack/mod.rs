//! smoltcp integration layer.
//!
//! [`DeviceAdapter`] exposes any [`NetworkDriver`] to smoltcp's `phy::Device`
//! trait. Frames are staged through a stack buffer on both sides: receive
//! pulls one frame out of the driver before handing tokens to the stack, and
//! the TX token copies the assembled frame into the driver on consume.

use core::marker::PhantomData;

use smoltcp::phy::{Device, DeviceCapabilities, Medium, RxToken, TxToken};
use smoltcp::time::Instant;

use crate::traits::NetworkDriver;

const MTU: usize = 1536;

/// Thin adapter that exposes a [`NetworkDriver`] to smoltcp.
pub struct DeviceAdapter<D: NetworkDriver> {
    pub inner: D,
}

impl<D: NetworkDriver> DeviceAdapter<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

impl<D: NetworkDriver> Device for DeviceAdapter<D> {
    type RxToken<'a> = AdapterRxToken<'a, D> where D: 'a;
    type TxToken<'a> = AdapterTxToken<'a, D> where D: 'a;

    fn capabilities(&self) -> DeviceCapabilities {
        let mut caps = DeviceCapabilities::default();
        caps.max_transmission_unit = MTU;
        caps.medium = Medium::Ethernet;
        caps
    }

    fn receive(&mut self, _timestamp: Instant) -> Option<(Self::RxToken<'_>, Self::TxToken<'_>)> {
        let mut staged = [0u8; MTU];
        match self.inner.receive(&mut staged) {
            Ok(Some(len)) if len > 0 => {
                let device_ptr: *mut D = &mut self.inner;
                let mut token = AdapterRxToken {
                    buffer: [0u8; MTU],
                    len,
                    _p: PhantomData,
                };
                token.buffer[..len].copy_from_slice(&staged[..len]);
                Some((
                    token,
                    AdapterTxToken {
                        device: device_ptr,
                        _p: PhantomData,
                    },
                ))
            }
            _ => None,
        }
    }

    fn transmit(&mut self, _timestamp: Instant) -> Option<Self::TxToken<'_>> {
        if self.inner.can_transmit() {
            let device_ptr: *mut D = &mut self.inner;
            Some(AdapterTxToken {
                device: device_ptr,
                _p: PhantomData,
            })
        } else {
            None
        }
    }
}

pub struct AdapterRxToken<'a, D: NetworkDriver> {
    buffer: [u8; MTU],
    len: usize,
    _p: PhantomData<&'a mut D>,
}

impl<'a, D: NetworkDriver> RxToken for AdapterRxToken<'a, D> {
    fn consume<R, F>(self, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        let mut buf = self.buffer;
        f(&mut buf[..self.len])
    }
}

pub struct AdapterTxToken<'a, D: NetworkDriver> {
    device: *mut D,
    _p: PhantomData<&'a mut D>,
}

impl<'a, D: NetworkDriver> TxToken for AdapterTxToken<'a, D> {
    fn consume<R, F>(self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        let mut buffer = [0u8; MTU];
        let result = f(&mut buffer[..len]);
        // smoltcp expects `result` back whether or not the wire send worked;
        // a failed send surfaces as a lost frame, which the stack handles.
        let _ = unsafe { (*self.device).transmit(&buffer[..len]) };
        result
    }
}

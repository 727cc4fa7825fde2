//! Bounded datagram queue between the network and the render tick.
//!
//! The receive context pushes datagrams, the render loop drains them one per
//! tick through [`PacketSource`]. Built on `critical-section` and
//! `heapless::Deque`, so it is safe to feed from an interrupt handler.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::{Deque, Vec};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::packet::{MAX_PACKET_LEN, PacketSource};

/// Owned copy of one datagram
pub type Datagram = Vec<u8, MAX_PACKET_LEN>;

/// Returned when the queue has no free slot; the datagram is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull;

/// A bounded, interrupt-safe datagram queue holding up to `DEPTH` datagrams.
pub struct PacketChannel<const DEPTH: usize> {
    inner: Mutex<RefCell<Deque<Datagram, DEPTH>>>,
}

impl<const DEPTH: usize> PacketChannel<DEPTH> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Handle for the network receive side
    pub const fn sender(&self) -> PacketSender<'_, DEPTH> {
        PacketSender { channel: self }
    }

    /// Handle for the render loop
    pub const fn receiver(&self) -> PacketReceiver<'_, DEPTH> {
        PacketReceiver { channel: self }
    }

    /// Queue a copy of `datagram`, truncated to [`MAX_PACKET_LEN`]
    pub fn try_send(&self, datagram: &[u8]) -> Result<(), QueueFull> {
        // `take` bounds the copy to the capacity, collecting cannot overflow
        let copy: Datagram = datagram.iter().take(MAX_PACKET_LEN).copied().collect();
        let _len = copy.len();

        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.push_back(copy).map_err(|_| QueueFull)
        })
        .inspect_err(|_| {
            #[cfg(feature = "esp32-log")]
            println!("[PacketChannel.try_send] queue full, dropping {:?} bytes", _len);
        })
    }

    /// Take the oldest queued datagram
    pub fn try_receive(&self) -> Option<Datagram> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().pop_front())
    }

    /// Number of datagrams waiting
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const DEPTH: usize> Default for PacketChannel<DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sending handle for a [`PacketChannel`]
#[derive(Clone, Copy)]
pub struct PacketSender<'a, const DEPTH: usize> {
    channel: &'a PacketChannel<DEPTH>,
}

impl<const DEPTH: usize> PacketSender<'_, DEPTH> {
    pub fn try_send(&self, datagram: &[u8]) -> Result<(), QueueFull> {
        self.channel.try_send(datagram)
    }
}

/// Receiving handle for a [`PacketChannel`]
#[derive(Clone, Copy)]
pub struct PacketReceiver<'a, const DEPTH: usize> {
    channel: &'a PacketChannel<DEPTH>,
}

impl<const DEPTH: usize> PacketReceiver<'_, DEPTH> {
    pub fn try_receive(&self) -> Option<Datagram> {
        self.channel.try_receive()
    }
}

impl<const DEPTH: usize> PacketSource for PacketReceiver<'_, DEPTH> {
    fn poll_packet(&mut self, buf: &mut [u8]) -> Option<usize> {
        let datagram = self.channel.try_receive()?;
        let len = datagram.len().min(buf.len());
        buf[..len].copy_from_slice(&datagram[..len]);
        Some(len)
    }
}

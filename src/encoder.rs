//! WS2812 one-wire signal encoder
//!
//! Bit-bangs the pixel buffer onto a single GPIO line. Every bit starts with a
//! high pulse whose width encodes the value (short = 0, long = 1) inside a
//! fixed bit period. Bytes go out MSB first in green-red-blue order and the
//! frame ends with a low hold long enough for the chain to latch.
//!
//! Pulse widths are counted in CPU cycles because the protocol tolerance is
//! well below one microsecond. The whole frame is sent inside a critical
//! section; there is no error channel, a missed deadline only shows up as
//! wrong colors on the strip.

use embedded_hal::digital::OutputPin;

use crate::gamma::GammaTable;
use crate::{LedPixel, OutputDriver};

/// High time of a `0` bit, 0.5 us
const T0H_HZ: u32 = 2_000_000;
/// High time of a `1` bit, 1.2 us
const T1H_HZ: u32 = 833_333;
/// Full bit period, 2.5 us
const BIT_HZ: u32 = 400_000;

/// Low hold after the last bit, above the 50 us minimum of older parts
pub const DEFAULT_LATCH_US: u32 = 80;

/// Free-running hardware cycle counter
///
/// The counter may wrap; callers only ever look at differences.
pub trait CycleClock {
    /// Current cycle count
    fn cycles(&self) -> u32;
}

impl<C: CycleClock + ?Sized> CycleClock for &C {
    fn cycles(&self) -> u32 {
        (**self).cycles()
    }
}

/// Pulse thresholds in CPU cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitTiming {
    /// High time of a `0` bit
    pub t0h: u32,
    /// High time of a `1` bit
    pub t1h: u32,
    /// Total bit period
    pub period: u32,
    /// Low hold after the frame
    pub latch: u32,
}

impl BitTiming {
    /// Derive thresholds from the CPU clock frequency
    pub const fn from_cpu_hz(cpu_hz: u32) -> Self {
        Self::with_latch_us(cpu_hz, DEFAULT_LATCH_US)
    }

    /// Derive thresholds with a custom latch duration
    pub const fn with_latch_us(cpu_hz: u32, latch_us: u32) -> Self {
        Self {
            t0h: cpu_hz / T0H_HZ,
            t1h: cpu_hz / T1H_HZ,
            period: cpu_hz / BIT_HZ,
            latch: (cpu_hz / 1_000_000).saturating_mul(latch_us),
        }
    }
}

/// Serialize pixels into wire order, GRB per pixel
pub fn grb_bytes(pixels: &[LedPixel], gamma: GammaTable) -> impl Iterator<Item = u8> + '_ {
    pixels
        .iter()
        .flat_map(|pixel| [pixel.g, pixel.r, pixel.b])
        .map(move |value| gamma.apply(value))
}

/// Cycle-counted GPIO encoder
pub struct SignalEncoder<P, C> {
    pin: P,
    clock: C,
    timing: BitTiming,
}

impl<P: OutputPin, C: CycleClock> SignalEncoder<P, C> {
    /// Create an encoder, driving the data line low
    pub fn new(mut pin: P, clock: C, timing: BitTiming) -> Self {
        let _ = pin.set_low();
        Self { pin, clock, timing }
    }

    pub const fn timing(&self) -> BitTiming {
        self.timing
    }

    /// Send one full frame and latch it
    ///
    /// Runs to completion with interrupts masked.
    pub fn transmit(&mut self, pixels: &[LedPixel], gamma: GammaTable) {
        critical_section::with(|_| self.send_bytes(grb_bytes(pixels, gamma)));
    }

    /// Give back the pin and the clock
    pub fn release(self) -> (P, C) {
        (self.pin, self.clock)
    }

    fn send_bytes(&mut self, bytes: impl Iterator<Item = u8>) {
        let BitTiming {
            t0h,
            t1h,
            period,
            latch,
        } = self.timing;

        // Pretend a bit period just ended so the first pulse starts right away.
        let mut start = self.clock.cycles().wrapping_sub(period);
        for byte in bytes {
            for bit in (0..8).rev() {
                let high = if (byte >> bit) & 1 == 1 { t1h } else { t0h };
                let rise = self.wait(start, period);
                let _ = self.pin.set_high();
                start = rise;
                self.wait(start, high);
                let _ = self.pin.set_low();
            }
        }

        let end = self.wait(start, period);
        self.wait(end, latch);
    }

    /// Spin until `cycles` have passed since `start`, returning the counter value
    #[inline(always)]
    fn wait(&self, start: u32, cycles: u32) -> u32 {
        loop {
            let now = self.clock.cycles();
            if now.wrapping_sub(start) >= cycles {
                return now;
            }
        }
    }
}

impl<P: OutputPin, C: CycleClock> OutputDriver for SignalEncoder<P, C> {
    fn write(&mut self, colors: &[LedPixel], gamma: bool) {
        self.transmit(colors, GammaTable::from_enabled(gamma));
    }
}

//! Pixel storage shared by every producer and read by the encoder.

use smart_leds::RGB8;

/// One strip pixel, no alpha channel.
pub type LedPixel = RGB8;

/// Strip length of the reference board.
pub const DEFAULT_LED_COUNT: usize = 30;

/// Fixed-length pixel store
///
/// Index order is the physical position on the strip. `N` is fixed for the
/// lifetime of the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer<const N: usize> {
    pixels: [LedPixel; N],
}

impl<const N: usize> PixelBuffer<N> {
    /// Create a buffer with every pixel off
    pub const fn new() -> Self {
        Self {
            pixels: [LedPixel { r: 0, g: 0, b: 0 }; N],
        }
    }

    /// Number of pixels in the strip
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Set every pixel to the same color
    pub fn fill(&mut self, color: LedPixel) {
        self.pixels.fill(color);
    }

    /// Write a single pixel
    ///
    /// Returns `false` without touching the buffer when `index` is past the end.
    pub fn set(&mut self, index: usize, color: LedPixel) -> bool {
        match self.pixels.get_mut(index) {
            Some(pixel) => {
                *pixel = color;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<LedPixel> {
        self.pixels.get(index).copied()
    }

    pub const fn as_slice(&self) -> &[LedPixel] {
        &self.pixels
    }
}

impl<const N: usize> Default for PixelBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

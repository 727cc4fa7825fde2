//! Color and brightness blending
//!
//! Smooths semantic commands into a continuously varying display state.
//! Every mutator re-arms a single blend between the current and the target
//! values; [`BlendEngine::update`] derives alpha from the wall time elapsed
//! since the blend started, so the transition speed does not depend on tick
//! rate.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::LedPixel;

/// Fixed-point value of a finished blend
pub const BLEND_ONE: u16 = 1024;

/// Brightness is expressed on a 0..=100 scale
pub const MAX_BRIGHTNESS: u8 = 100;

/// Full transition window; with 1024 ms alpha advances by one per millisecond
pub const DEFAULT_BLEND_WINDOW: Duration = Duration::from_millis(BLEND_ONE as u64);

const WHITE: LedPixel = LedPixel {
    r: 255,
    g: 255,
    b: 255,
};

/// Configuration for blend transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendTimings {
    /// Time for alpha to go from 0 to [`BLEND_ONE`]
    pub window: Duration,
}

impl Default for BlendTimings {
    fn default() -> Self {
        Self {
            window: DEFAULT_BLEND_WINDOW,
        }
    }
}

/// Blend two bytes with a 0..=1024 fixed-point weight of `to`
#[inline]
#[allow(clippy::cast_lossless, clippy::cast_possible_truncation)]
pub const fn blend1024(from: u8, to: u8, alpha: u16) -> u8 {
    let alpha = (if alpha > BLEND_ONE { BLEND_ONE } else { alpha }) as u32;
    let one = BLEND_ONE as u32;
    ((from as u32 * (one - alpha) + to as u32 * alpha) / one) as u8
}

/// Blend progress after `elapsed` of `window`, clamped to [`BLEND_ONE`]
#[allow(clippy::cast_possible_truncation)]
fn alpha_at(elapsed: Duration, window: Duration) -> u16 {
    let window_ms = window.as_millis();
    if window_ms == 0 {
        return BLEND_ONE;
    }
    let alpha = elapsed.as_millis().saturating_mul(u64::from(BLEND_ONE)) / window_ms;
    alpha.min(u64::from(BLEND_ONE)) as u16
}

/// Single-target color and brightness blender
#[derive(Debug, Clone)]
pub struct BlendEngine {
    enabled: bool,
    current_rgb: LedPixel,
    target_rgb: LedPixel,
    current_brightness: u8,
    target_brightness: u8,
    /// Brightness restored by the next power on
    brightness_on_disabled: u8,
    alpha: u16,
    started: Instant,
    timings: BlendTimings,
}

impl BlendEngine {
    /// Create a settled, disabled engine showing white at 0% brightness
    pub const fn new(timings: BlendTimings) -> Self {
        Self {
            enabled: false,
            current_rgb: WHITE,
            target_rgb: WHITE,
            current_brightness: 0,
            target_brightness: 0,
            brightness_on_disabled: MAX_BRIGHTNESS,
            alpha: BLEND_ONE,
            started: Instant::from_millis(0),
            timings,
        }
    }

    /// Set the target color
    pub fn set_color(&mut self, color: LedPixel, now: Instant) {
        self.target_rgb = color;
        self.start_blend(now);
    }

    /// Set the target brightness (0..=100, larger values are clamped)
    ///
    /// The value also becomes the brightness restored by the next power on.
    pub fn set_brightness(&mut self, brightness: u8, now: Instant) {
        let brightness = brightness.min(MAX_BRIGHTNESS);
        self.brightness_on_disabled = brightness;
        self.retarget_brightness(brightness, now);
    }

    /// Switch the output on or off
    ///
    /// Edge-triggered: requesting the current state does nothing.
    pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;

        #[cfg(feature = "esp32-log")]
        println!(
            "[BlendEngine.set_enabled] enabled={:?} restore_brightness={:?}",
            enabled, self.brightness_on_disabled
        );

        if enabled {
            self.retarget_brightness(self.brightness_on_disabled, now);
        } else {
            self.brightness_on_disabled = self.target_brightness;
            self.retarget_brightness(0, now);
        }
    }

    /// Advance the blend
    ///
    /// Returns `true` when the current values were recomputed.
    pub fn update(&mut self, now: Instant) -> bool {
        if self.is_settled() {
            return false;
        }

        let elapsed = now.saturating_duration_since(self.started);
        self.alpha = alpha_at(elapsed, self.timings.window).max(self.alpha);

        let alpha = self.alpha;
        self.current_rgb = LedPixel {
            r: blend1024(self.current_rgb.r, self.target_rgb.r, alpha),
            g: blend1024(self.current_rgb.g, self.target_rgb.g, alpha),
            b: blend1024(self.current_rgb.b, self.target_rgb.b, alpha),
        };
        self.current_brightness =
            blend1024(self.current_brightness, self.target_brightness, alpha);
        true
    }

    /// Current color scaled by the current brightness
    #[allow(clippy::cast_possible_truncation)]
    pub fn color(&self) -> LedPixel {
        let scale = |channel: u8| {
            (u16::from(channel) * u16::from(self.current_brightness) / u16::from(MAX_BRIGHTNESS))
                as u8
        };
        LedPixel {
            r: scale(self.current_rgb.r),
            g: scale(self.current_rgb.g),
            b: scale(self.current_rgb.b),
        }
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// No interpolation is pending
    pub const fn is_settled(&self) -> bool {
        self.alpha >= BLEND_ONE
    }

    pub const fn alpha(&self) -> u16 {
        self.alpha
    }

    pub const fn current_color(&self) -> LedPixel {
        self.current_rgb
    }

    pub const fn target_color(&self) -> LedPixel {
        self.target_rgb
    }

    pub const fn current_brightness(&self) -> u8 {
        self.current_brightness
    }

    pub const fn target_brightness(&self) -> u8 {
        self.target_brightness
    }

    pub const fn brightness_on_disabled(&self) -> u8 {
        self.brightness_on_disabled
    }

    fn retarget_brightness(&mut self, brightness: u8, now: Instant) {
        self.target_brightness = brightness;
        self.start_blend(now);
    }

    fn start_blend(&mut self, now: Instant) {
        self.alpha = 0;
        self.started = now;
    }
}

impl Default for BlendEngine {
    fn default() -> Self {
        Self::new(BlendTimings::default())
    }
}

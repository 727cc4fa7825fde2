//! Tick pacing for the render loop.
//!
//! Provides portable pacing without async/await or platform-specific timers.
//! The caller is responsible for sleeping/waiting between ticks.

use embassy_time::{Duration, Instant};

use crate::OutputDriver;
use crate::packet::PacketSource;
use crate::renderer::{RenderLoop, TickOutcome};

/// Default tick rate
pub const DEFAULT_TICKS_PER_SECOND: u64 = 200;

/// Default tick duration based on the tick rate.
pub const DEFAULT_TICK_DURATION: Duration = Duration::from_millis(1000 / DEFAULT_TICKS_PER_SECOND);

/// Result of a scheduled tick.
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    /// What the render loop did
    pub outcome: TickOutcome,
    /// The deadline for the next tick.
    pub next_deadline: Instant,
    /// How long to wait until the next tick (zero if behind schedule).
    pub sleep_duration: Duration,
}

/// Cooperative tick scheduler
///
/// Drives [`RenderLoop::tick`] with the datagram source it owns, tracks the
/// next deadline and resets it after long stalls (such as a long encoder
/// pass with interrupts masked) instead of bursting to catch up.
///
/// ```ignore
/// let mut scheduler = TickScheduler::new(render_loop, channel.receiver());
///
/// loop {
///     let result = scheduler.tick(Instant::now());
///     sleep_ms(result.sleep_duration.as_millis());
/// }
/// ```
pub struct TickScheduler<O: OutputDriver, S: PacketSource, const N: usize> {
    render_loop: RenderLoop<O, N>,
    packets: S,
    next_tick: Instant,
    tick_duration: Duration,
}

impl<O: OutputDriver, S: PacketSource, const N: usize> TickScheduler<O, S, N> {
    /// Create a scheduler running at [`DEFAULT_TICKS_PER_SECOND`]
    pub fn new(render_loop: RenderLoop<O, N>, packets: S) -> Self {
        Self::with_tick_duration(render_loop, packets, DEFAULT_TICK_DURATION)
    }

    pub fn with_tick_duration(
        render_loop: RenderLoop<O, N>,
        packets: S,
        tick_duration: Duration,
    ) -> Self {
        Self {
            render_loop,
            packets,
            next_tick: Instant::from_millis(0),
            tick_duration,
        }
    }

    /// Run one tick and return timing information.
    pub fn tick(&mut self, now: Instant) -> TickResult {
        let max_drift = self.tick_duration.as_millis() * 2;
        if now.as_millis() > self.next_tick.as_millis() + max_drift {
            self.next_tick = now;
        }

        let outcome = self.render_loop.tick(now, &mut self.packets);

        self.next_tick += self.tick_duration;

        let sleep_duration = if self.next_tick > now {
            self.next_tick - now
        } else {
            Duration::from_millis(0)
        };

        TickResult {
            outcome,
            next_deadline: self.next_tick,
            sleep_duration,
        }
    }

    pub const fn render_loop(&self) -> &RenderLoop<O, N> {
        &self.render_loop
    }

    /// Access the render loop, e.g. to deliver control messages
    pub fn render_loop_mut(&mut self) -> &mut RenderLoop<O, N> {
        &mut self.render_loop
    }
}

use embassy_time::Instant;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::OutputDriver;
use crate::blend::{BlendEngine, BlendTimings};
use crate::command::{CommandError, ControlCommand, ControlPlaneHandler};
use crate::packet::{DataPlaneHandler, PacketError, PacketFormat, PacketSource};
use crate::pixel::PixelBuffer;

/// Configuration for the render loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Initial gamma correction flag
    pub gamma: bool,
    /// Blend transition timings
    pub blend: BlendTimings,
    /// Layout of inbound pixel datagrams
    pub packet_format: PacketFormat,
    /// Only poll datagrams while the output is enabled
    pub stream_requires_enabled: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            gamma: false,
            blend: BlendTimings::default(),
            packet_format: PacketFormat::default(),
            stream_requires_enabled: false,
        }
    }
}

/// State mutated by the control plane
#[derive(Debug, Clone)]
pub struct LightState {
    pub(crate) blend: BlendEngine,
    pub(crate) gamma: bool,
}

impl LightState {
    pub const fn new(blend: BlendEngine, gamma: bool) -> Self {
        Self { blend, gamma }
    }

    pub const fn blend(&self) -> &BlendEngine {
        &self.blend
    }

    pub const fn gamma(&self) -> bool {
        self.gamma
    }
}

/// What produced the frame on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSource {
    /// Nothing changed
    Idle,
    /// A blend step filled the strip
    Blend,
    /// A datagram was applied
    Stream,
    /// A datagram was taken and discarded
    Rejected(PacketError),
}

/// Result of one render tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub source: FrameSource,
    /// The encoder ran this tick
    pub rendered: bool,
}

/// Render loop - the per-tick orchestrator
///
/// Owns the pixel buffer and the light state. Inputs reach it through
/// [`RenderLoop::on_message`], [`RenderLoop::on_control_command`],
/// [`RenderLoop::on_pixel_packet`] and the packet source polled by
/// [`RenderLoop::tick`].
pub struct RenderLoop<O: OutputDriver, const N: usize> {
    output: O,
    state: LightState,
    pixels: PixelBuffer<N>,
    data_plane: DataPlaneHandler,
    stream_requires_enabled: bool,
    dirty: bool,
}

impl<O: OutputDriver, const N: usize> RenderLoop<O, N> {
    pub fn new(output: O, config: &RenderConfig) -> Self {
        Self {
            output,
            state: LightState::new(BlendEngine::new(config.blend), config.gamma),
            pixels: PixelBuffer::new(),
            data_plane: DataPlaneHandler::new(config.packet_format),
            stream_requires_enabled: config.stream_requires_enabled,
            dirty: false,
        }
    }

    /// Handle a message delivered by the pub/sub transport
    pub fn on_message(
        &mut self,
        topic: &str,
        payload: &[u8],
        now: Instant,
    ) -> Result<ControlCommand, CommandError> {
        let gamma = self.state.gamma;
        let command = ControlPlaneHandler::handle(topic, payload, &mut self.state, now)?;
        self.mark_gamma_change(gamma);
        Ok(command)
    }

    /// Apply an already parsed command
    pub fn on_control_command(&mut self, command: ControlCommand, now: Instant) {
        let gamma = self.state.gamma;
        ControlPlaneHandler::apply(command, &mut self.state, now);
        self.mark_gamma_change(gamma);
    }

    /// A gamma toggle changes the output without touching the pixels
    fn mark_gamma_change(&mut self, previous: bool) {
        if self.state.gamma != previous {
            self.dirty = true;
        }
    }

    /// Apply a datagram delivered outside the tick
    ///
    /// The pixels are sent on the next tick unless a blend step overwrites them.
    pub fn on_pixel_packet(&mut self, datagram: &[u8]) -> Result<usize, PacketError> {
        let written = self.data_plane.apply(datagram, &mut self.pixels)?;
        self.dirty = true;
        Ok(written)
    }

    /// Run one tick
    ///
    /// A running blend always wins; only when it reports no change is a single
    /// pending datagram taken from `packets`. The encoder runs if anything
    /// changed the buffer.
    pub fn tick<S: PacketSource + ?Sized>(
        &mut self,
        now: Instant,
        packets: &mut S,
    ) -> TickOutcome {
        let source = if self.state.blend.update(now) {
            self.pixels.fill(self.state.blend.color());
            FrameSource::Blend
        } else if self.streaming_allowed() {
            match self.data_plane.poll(packets, &mut self.pixels) {
                Some(Ok(_written)) => {
                    #[cfg(feature = "esp32-log")]
                    println!("[RenderLoop.tick] streamed {:?} pixels", _written);
                    FrameSource::Stream
                }
                Some(Err(err)) => FrameSource::Rejected(err),
                None => FrameSource::Idle,
            }
        } else {
            FrameSource::Idle
        };

        if matches!(source, FrameSource::Blend | FrameSource::Stream) {
            self.dirty = true;
        }

        let rendered = self.dirty;
        if rendered {
            self.output.write(self.pixels.as_slice(), self.state.gamma);
            self.dirty = false;
        }

        TickOutcome { source, rendered }
    }

    fn streaming_allowed(&self) -> bool {
        !self.stream_requires_enabled || self.state.blend.is_enabled()
    }

    pub const fn state(&self) -> &LightState {
        &self.state
    }

    pub const fn pixels(&self) -> &PixelBuffer<N> {
        &self.pixels
    }

    pub const fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }
}

#![no_std]

pub mod blend;
pub mod channel;
pub mod command;
pub mod encoder;
pub mod frame_scheduler;
pub mod gamma;
pub mod link;
pub mod packet;
pub mod pixel;
pub mod renderer;

pub use blend::{BlendEngine, BlendTimings};
pub use channel::{PacketChannel, PacketReceiver, PacketSender};
pub use command::{CommandError, ControlCommand, ControlPlaneHandler};
pub use encoder::{BitTiming, CycleClock, SignalEncoder};
pub use frame_scheduler::TickScheduler;
pub use gamma::{GAMMA8, GammaTable, gamma8};
pub use link::{ConnectivityEvents, ControlLink, IndicatorLed, MessageBus};
pub use packet::{DataPlaneHandler, PacketError, PacketFormat, PacketSource, PixelUpdatePacket};
pub use pixel::{LedPixel, PixelBuffer};
pub use renderer::{FrameSource, LightState, RenderConfig, RenderLoop, TickOutcome};

pub use embassy_time::{Duration, Instant};

/// Abstract LED strip output
///
/// Implement this trait to support different hardware platforms.
/// The render loop is generic over this trait.
pub trait OutputDriver {
    /// Write colors to the LED strip, optionally gamma-correcting each channel
    fn write(&mut self, colors: &[LedPixel], gamma: bool);
}

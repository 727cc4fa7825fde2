//! Capabilities consumed from the network collaborators
//!
//! The driver never owns a concrete transport. The pub/sub client, the
//! status LED and the connectivity notifications are reached through the
//! narrow traits below.

use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::command::{DEFAULT_ANNOUNCEMENTS, SUBSCRIBED_TOPICS};

/// Status LED blink interval while the bus is down
pub const STATUS_BLINK_INTERVAL: Duration = Duration::from_millis(500);

/// Outbound half of the publish/subscribe transport
pub trait MessageBus {
    type Error: core::fmt::Debug;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Self::Error>;

    fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error>;
}

/// Indicator LED driven by the connection state
pub trait IndicatorLed {
    fn set_blinking(&mut self, interval: Duration);

    fn set_steady(&mut self);
}

/// Connection state notifications
pub trait ConnectivityEvents {
    fn on_connected(&mut self);

    fn on_disconnected(&mut self);
}

/// Glue between the bus connection and the control plane
///
/// On connect the current defaults are announced and the control topics
/// are (re)subscribed. Both are safe to repeat on every reconnect.
pub struct ControlLink<B, L> {
    bus: B,
    status_led: L,
}

impl<B: MessageBus, L: IndicatorLed> ControlLink<B, L> {
    /// Create a link in the disconnected state
    pub fn new(bus: B, mut status_led: L) -> Self {
        status_led.set_blinking(STATUS_BLINK_INTERVAL);
        Self { bus, status_led }
    }

    /// Publish the defaults and subscribe to every control topic
    pub fn announce(&mut self) -> Result<(), B::Error> {
        for (topic, payload) in DEFAULT_ANNOUNCEMENTS {
            self.bus.publish(topic, payload.as_bytes())?;
        }
        for topic in SUBSCRIBED_TOPICS {
            self.bus.subscribe(topic)?;
        }
        Ok(())
    }

    pub const fn bus(&self) -> &B {
        &self.bus
    }

    pub const fn status_led(&self) -> &L {
        &self.status_led
    }

    pub fn into_parts(self) -> (B, L) {
        (self.bus, self.status_led)
    }
}

impl<B: MessageBus, L: IndicatorLed> ConnectivityEvents for ControlLink<B, L> {
    fn on_connected(&mut self) {
        self.status_led.set_steady();
        if let Err(_err) = self.announce() {
            #[cfg(feature = "esp32-log")]
            println!("[ControlLink.on_connected] announce failed: {:?}", _err);
        }
    }

    fn on_disconnected(&mut self) {
        self.status_led.set_blinking(STATUS_BLINK_INTERVAL);
    }
}

//! Control plane: semantic topic commands
//!
//! Payloads are plain ASCII. The grammar per topic:
//!
//! | topic            | payload            | command                    |
//! |------------------|--------------------|----------------------------|
//! | `set`            | first char         | `'1'` enables, else off    |
//! | `set_rgb`        | `R,G,B`            | target color               |
//! | `set_brightness` | decimal            | target brightness (0..100) |
//! | `set_cgamma`     | first char         | `'1'` enables gamma        |

use embassy_time::Instant;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::LedPixel;
use crate::renderer::LightState;

pub const TOPIC_SET: &str = "set";
pub const TOPIC_SET_RGB: &str = "set_rgb";
pub const TOPIC_SET_BRIGHTNESS: &str = "set_brightness";
pub const TOPIC_SET_GAMMA: &str = "set_cgamma";

/// Topics the driver listens on
pub const SUBSCRIBED_TOPICS: [&str; 4] = [
    TOPIC_SET,
    TOPIC_SET_RGB,
    TOPIC_SET_BRIGHTNESS,
    TOPIC_SET_GAMMA,
];

/// Defaults published when the bus connects, in publish order
pub const DEFAULT_ANNOUNCEMENTS: [(&str, &str); 3] = [
    (TOPIC_SET_RGB, "255,255,255"),
    (TOPIC_SET_BRIGHTNESS, "100"),
    (TOPIC_SET, "0"),
];

/// Parsed control command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    SetEnabled(bool),
    SetColor(LedPixel),
    SetBrightness(u8),
    SetGamma(bool),
}

/// Reason a message was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    EmptyPayload,
    UnknownTopic,
    /// `set_rgb` payload without two comma separators
    MissingSeparator,
    /// Field without leading digits or above 255
    InvalidNumber,
}

impl ControlCommand {
    /// Parse a `(topic, payload)` pair
    pub fn parse(topic: &str, payload: &[u8]) -> Result<Self, CommandError> {
        let Some(&first) = payload.first() else {
            return Err(CommandError::EmptyPayload);
        };

        match topic {
            TOPIC_SET => Ok(Self::SetEnabled(first == b'1')),
            TOPIC_SET_RGB => parse_rgb(payload).map(Self::SetColor),
            TOPIC_SET_BRIGHTNESS => parse_decimal_u8(payload).map(Self::SetBrightness),
            TOPIC_SET_GAMMA => Ok(Self::SetGamma(first == b'1')),
            _ => Err(CommandError::UnknownTopic),
        }
    }
}

/// Parse the leading decimal digits of `field` as a byte
///
/// Parsing stops at the first non-digit, so `"42%"` reads as 42.
pub fn parse_decimal_u8(field: &[u8]) -> Result<u8, CommandError> {
    let mut value: u16 = 0;
    let mut digits = 0;
    for &byte in field.iter().take_while(|byte| byte.is_ascii_digit()) {
        value = value * 10 + u16::from(byte - b'0');
        if value > u16::from(u8::MAX) {
            return Err(CommandError::InvalidNumber);
        }
        digits += 1;
    }

    if digits == 0 {
        return Err(CommandError::InvalidNumber);
    }
    u8::try_from(value).map_err(|_| CommandError::InvalidNumber)
}

fn parse_rgb(payload: &[u8]) -> Result<LedPixel, CommandError> {
    let mut fields = payload.splitn(3, |&byte| byte == b',');
    let (Some(red), Some(green), Some(blue)) = (fields.next(), fields.next(), fields.next()) else {
        return Err(CommandError::MissingSeparator);
    };

    Ok(LedPixel {
        r: parse_decimal_u8(red)?,
        g: parse_decimal_u8(green)?,
        b: parse_decimal_u8(blue)?,
    })
}

/// Applies control commands to the light state
pub struct ControlPlaneHandler;

impl ControlPlaneHandler {
    /// Parse and apply one message
    ///
    /// A malformed message leaves the state untouched.
    pub fn handle(
        topic: &str,
        payload: &[u8],
        state: &mut LightState,
        now: Instant,
    ) -> Result<ControlCommand, CommandError> {
        let command = ControlCommand::parse(topic, payload).inspect_err(|_err| {
            #[cfg(feature = "esp32-log")]
            println!("[ControlPlaneHandler.handle] dropped {:?}: {:?}", topic, _err);
        })?;
        Self::apply(command, state, now);
        Ok(command)
    }

    pub fn apply(command: ControlCommand, state: &mut LightState, now: Instant) {
        match command {
            ControlCommand::SetEnabled(enabled) => state.blend.set_enabled(enabled, now),
            ControlCommand::SetColor(color) => state.blend.set_color(color, now),
            ControlCommand::SetBrightness(brightness) => {
                state.blend.set_brightness(brightness, now);
            }
            ControlCommand::SetGamma(gamma) => state.gamma = gamma,
        }
    }
}

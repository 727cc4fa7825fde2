//! Data plane: raw per-pixel datagrams
//!
//! A datagram is a version byte followed by `(index, green, red, blue)`
//! groups. Each group overwrites one pixel; there is no sequencing between
//! datagrams, the last one processed wins.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::LedPixel;
use crate::pixel::PixelBuffer;

/// Only supported format version
pub const PACKET_VERSION: u8 = 1;

/// Receive buffer bound, longer datagrams are truncated
pub const MAX_PACKET_LEN: usize = 1024;

/// Port the datagram socket listens on
pub const DEFAULT_UDP_PORT: u16 = 21324;

const MIN_PACKET_LEN: usize = 2;
const GROUP_LEN: usize = 4;

/// Byte layout of the pixel groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PacketFormat {
    /// Groups start right after the version byte
    #[default]
    Compact,
    /// WLED "WARLS" layout, byte 1 is a timeout and groups start at offset 2
    Warls,
}

impl PacketFormat {
    const fn groups_offset(self) -> usize {
        match self {
            Self::Compact => 1,
            Self::Warls => 2,
        }
    }
}

/// Reason a datagram was discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    /// Fewer than two bytes
    TooShort(usize),
    UnsupportedVersion(u8),
}

/// One pixel write carried by a datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelUpdate {
    pub index: u8,
    pub color: LedPixel,
}

/// Validated view over a datagram
#[derive(Debug, Clone, Copy)]
pub struct PixelUpdatePacket<'a> {
    groups: &'a [u8],
}

impl<'a> PixelUpdatePacket<'a> {
    pub fn parse(datagram: &'a [u8], format: PacketFormat) -> Result<Self, PacketError> {
        if datagram.len() < MIN_PACKET_LEN {
            return Err(PacketError::TooShort(datagram.len()));
        }
        if datagram[0] != PACKET_VERSION {
            return Err(PacketError::UnsupportedVersion(datagram[0]));
        }

        let groups = datagram.get(format.groups_offset()..).unwrap_or_default();
        Ok(Self { groups })
    }

    /// Complete groups in wire order, a truncated trailing group is ignored
    pub fn updates(self) -> impl Iterator<Item = PixelUpdate> + 'a {
        self.groups
            .chunks_exact(GROUP_LEN)
            .map(|group| PixelUpdate {
                index: group[0],
                color: LedPixel {
                    r: group[2],
                    g: group[1],
                    b: group[3],
                },
            })
    }
}

/// Non-blocking source of inbound datagrams
pub trait PacketSource {
    /// Copy the next pending datagram into `buf`
    ///
    /// Returns the number of bytes written, or `None` if nothing is pending.
    fn poll_packet(&mut self, buf: &mut [u8]) -> Option<usize>;
}

/// Applies datagrams straight to the pixel buffer
#[derive(Debug)]
pub struct DataPlaneHandler {
    format: PacketFormat,
    buffer: [u8; MAX_PACKET_LEN],
}

impl DataPlaneHandler {
    pub const fn new(format: PacketFormat) -> Self {
        Self {
            format,
            buffer: [0; MAX_PACKET_LEN],
        }
    }

    pub const fn format(&self) -> PacketFormat {
        self.format
    }

    /// Apply one datagram
    ///
    /// Groups addressing a pixel past the end of the strip are skipped, the
    /// rest of the datagram still applies. Returns the number of pixels written.
    pub fn apply<const N: usize>(
        &self,
        datagram: &[u8],
        pixels: &mut PixelBuffer<N>,
    ) -> Result<usize, PacketError> {
        let packet = PixelUpdatePacket::parse(datagram, self.format)?;

        let mut written = 0;
        for update in packet.updates() {
            if pixels.set(usize::from(update.index), update.color) {
                written += 1;
            } else {
                #[cfg(feature = "esp32-log")]
                println!(
                    "[DataPlaneHandler.apply] skipped pixel {:?} of {:?}",
                    update.index, N
                );
            }
        }
        Ok(written)
    }

    /// Take at most one datagram from `source` and apply it
    ///
    /// Returns `None` when nothing was pending.
    pub fn poll<S: PacketSource + ?Sized, const N: usize>(
        &mut self,
        source: &mut S,
        pixels: &mut PixelBuffer<N>,
    ) -> Option<Result<usize, PacketError>> {
        let len = source.poll_packet(&mut self.buffer)?.min(MAX_PACKET_LEN);
        let result = self.apply(&self.buffer[..len], pixels);

        #[cfg(feature = "esp32-log")]
        if let Err(err) = result {
            println!("[DataPlaneHandler.poll] dropped datagram: {:?}", err);
        }

        Some(result)
    }
}

impl Default for DataPlaneHandler {
    fn default() -> Self {
        Self::new(PacketFormat::default())
    }
}

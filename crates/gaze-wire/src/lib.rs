//! Wire framing for gaze-tagged image payloads.
//!
//! Each frame is a fixed 24-byte big-endian header followed by tightly packed
//! RGB24 pixel data:
//!
//! | offset | size | field            |
//! |--------|------|------------------|
//! | 0      | 4    | magic `GZF1`     |
//! | 4      | 4    | width (u32)      |
//! | 8      | 4    | height (u32)     |
//! | 12     | 4    | gaze x (f32)     |
//! | 16     | 4    | gaze y (f32)     |
//! | 20     | 4    | payload len (u32)|

use std::io::{Read, Write};

use thiserror::Error;

pub const FRAME_MAGIC: [u8; 4] = *b"GZF1";
pub const FRAME_HEADER_LENGTH: usize = 4 + 4 + 4 + 4 + 4 + 4;

/// Wire framing errors.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("buffer too small: {len} bytes, need {required}")]
    BufferTooSmall { len: usize, required: usize },

    #[error("bad frame magic: {0:02x?}")]
    BadMagic([u8; 4]),

    #[error("payload length {declared} does not match {width}x{height} RGB24")]
    LengthMismatch {
        declared: u32,
        width: u32,
        height: u32,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, WireError>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameHeader {
    pub width: u32,
    pub height: u32,
    pub gaze_x: f32,
    pub gaze_y: f32,
    pub payload_len: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GazeFrame {
    pub header: FrameHeader,
    pub rgb: Vec<u8>,
}

impl FrameHeader {
    /// Build a header for an RGB24 image of the given size.
    pub fn for_rgb(width: u32, height: u32, gaze_x: f32, gaze_y: f32) -> Self {
        Self {
            width,
            height,
            gaze_x,
            gaze_y,
            payload_len: width.saturating_mul(height).saturating_mul(3),
        }
    }

    pub fn encode(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < FRAME_HEADER_LENGTH {
            return Err(WireError::BufferTooSmall {
                len: buffer.len(),
                required: FRAME_HEADER_LENGTH,
            });
        }

        buffer[0..4].copy_from_slice(&FRAME_MAGIC);
        buffer[4..8].copy_from_slice(&self.width.to_be_bytes());
        buffer[8..12].copy_from_slice(&self.height.to_be_bytes());
        buffer[12..16].copy_from_slice(&self.gaze_x.to_be_bytes());
        buffer[16..20].copy_from_slice(&self.gaze_y.to_be_bytes());
        buffer[20..24].copy_from_slice(&self.payload_len.to_be_bytes());

        Ok(())
    }

    pub fn decode(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < FRAME_HEADER_LENGTH {
            return Err(WireError::BufferTooSmall {
                len: buffer.len(),
                required: FRAME_HEADER_LENGTH,
            });
        }

        let magic = read_array(buffer, 0);
        if magic != FRAME_MAGIC {
            return Err(WireError::BadMagic(magic));
        }

        let header = Self {
            width: u32::from_be_bytes(read_array(buffer, 4)),
            height: u32::from_be_bytes(read_array(buffer, 8)),
            gaze_x: f32::from_be_bytes(read_array(buffer, 12)),
            gaze_y: f32::from_be_bytes(read_array(buffer, 16)),
            payload_len: u32::from_be_bytes(read_array(buffer, 20)),
        };

        let expected = u64::from(header.width) * u64::from(header.height) * 3;
        if u64::from(header.payload_len) != expected {
            return Err(WireError::LengthMismatch {
                declared: header.payload_len,
                width: header.width,
                height: header.height,
            });
        }

        Ok(header)
    }
}

/// Caller guarantees `offset + 4 <= buffer.len()`.
fn read_array(buffer: &[u8], offset: usize) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&buffer[offset..offset + 4]);
    out
}

/// Encode a header and its pixel payload into one contiguous buffer.
pub fn encode_frame(header: &FrameHeader, rgb: &[u8]) -> Result<Vec<u8>> {
    if rgb.len() != header.payload_len as usize {
        return Err(WireError::LengthMismatch {
            declared: header.payload_len,
            width: header.width,
            height: header.height,
        });
    }
    let mut buffer = vec![0u8; FRAME_HEADER_LENGTH + rgb.len()];
    header.encode(&mut buffer[..FRAME_HEADER_LENGTH])?;
    buffer[FRAME_HEADER_LENGTH..].copy_from_slice(rgb);
    Ok(buffer)
}

pub fn decode_frame(buffer: &[u8]) -> Result<GazeFrame> {
    let header = FrameHeader::decode(buffer)?;
    let required = FRAME_HEADER_LENGTH + header.payload_len as usize;
    if buffer.len() < required {
        return Err(WireError::BufferTooSmall {
            len: buffer.len(),
            required,
        });
    }
    Ok(GazeFrame {
        header,
        rgb: buffer[FRAME_HEADER_LENGTH..required].to_vec(),
    })
}

/// Write one frame to a stream. The header and payload are written
/// separately so large images are not copied into a staging buffer.
pub fn write_frame<W: Write>(writer: &mut W, header: &FrameHeader, rgb: &[u8]) -> Result<()> {
    if rgb.len() != header.payload_len as usize {
        return Err(WireError::LengthMismatch {
            declared: header.payload_len,
            width: header.width,
            height: header.height,
        });
    }
    let mut head = [0u8; FRAME_HEADER_LENGTH];
    header.encode(&mut head)?;
    writer.write_all(&head)?;
    writer.write_all(rgb)?;
    writer.flush()?;
    Ok(())
}

pub fn read_frame<R: Read>(reader: &mut R) -> Result<GazeFrame> {
    let mut head = [0u8; FRAME_HEADER_LENGTH];
    reader.read_exact(&mut head)?;
    let header = FrameHeader::decode(&head)?;
    let mut rgb = vec![0u8; header.payload_len as usize];
    reader.read_exact(&mut rgb)?;
    Ok(GazeFrame { header, rgb })
}

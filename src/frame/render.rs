use std::sync::Arc;

use glam::Vec2;
use image::{Rgb, RgbImage};

use crate::frame::composite::{ChannelSurface, CHANNEL_COUNT};
use crate::frame::error::{FrameError, Result};

/// Rendering collaborator that combines per-channel surfaces into one image.
///
/// Bindings made with `set_channel` are consumed by `execute`, so the
/// compositor can reuse its surfaces for the next frame without copying.
pub trait ChannelRenderer: Send {
    /// Whether the combine program is loaded and usable.
    fn is_available(&self) -> bool {
        true
    }

    /// Bind a surface to channel `index` (0 = Y, 1 = U, 2 = V).
    fn set_channel(&mut self, index: usize, surface: Arc<ChannelSurface>);

    /// Scale applied to output coordinates before sampling the channels.
    fn set_sample_scale(&mut self, scale: Vec2);

    /// Run the combine step over the bound channels.
    fn execute(&mut self) -> Result<RgbImage>;
}

/// CPU combine program: nearest-neighbour chroma upsampling followed by a
/// BT.601 YUV to RGB conversion.
///
/// Output takes the size of the luma surface. Each channel is sampled at the
/// same normalized coordinate, so subsampled chroma is stretched over the
/// frame without being pre-upscaled.
pub struct Bt601Renderer {
    channels: [Option<Arc<ChannelSurface>>; CHANNEL_COUNT],
    scale: Vec2,
}

impl Bt601Renderer {
    pub fn new() -> Self {
        Self {
            channels: Default::default(),
            scale: Vec2::ONE,
        }
    }
}

impl Default for Bt601Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelRenderer for Bt601Renderer {
    fn set_channel(&mut self, index: usize, surface: Arc<ChannelSurface>) {
        if let Some(slot) = self.channels.get_mut(index) {
            *slot = Some(surface);
        }
    }

    fn set_sample_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    fn execute(&mut self) -> Result<RgbImage> {
        let [y, u, v] = std::mem::take(&mut self.channels);
        let (y, u, v) = match (y, u, v) {
            (Some(y), Some(u), Some(v)) => (y, u, v),
            _ => {
                return Err(FrameError::RendererUnavailable(
                    "not all channels bound".to_string(),
                ))
            }
        };

        let (width, height) = (y.width, y.height);
        let mut out = RgbImage::new(width, height);
        if y.is_empty() {
            return Ok(out);
        }
        for (index, surface) in [&u, &v].into_iter().enumerate() {
            if surface.is_empty() {
                return Err(FrameError::MissingChannel(index + 1));
            }
        }

        let columns = |surface: &ChannelSurface| -> Vec<u32> {
            (0..width)
                .map(|x| sample_index(x, width, self.scale.x, surface.width))
                .collect()
        };
        let (y_cols, u_cols, v_cols) = (columns(&y), columns(&u), columns(&v));

        for row in 0..height {
            let y_row = sample_index(row, height, self.scale.y, y.height);
            let u_row = sample_index(row, height, self.scale.y, u.height);
            let v_row = sample_index(row, height, self.scale.y, v.height);
            for col in 0..width {
                let luma = y.texel(y_cols[col as usize], y_row)[0];
                let cb = u.texel(u_cols[col as usize], u_row)[0];
                let cr = v.texel(v_cols[col as usize], v_row)[0];
                out.put_pixel(col, row, Rgb(yuv_to_rgb(luma, cb, cr)));
            }
        }

        Ok(out)
    }
}

/// Map an output coordinate to a texel index in a surface of `size` texels.
fn sample_index(out: u32, out_size: u32, scale: f32, size: u32) -> u32 {
    let normalized = (out as f32 + 0.5) / out_size as f32 * scale;
    ((normalized * size as f32) as u32).min(size - 1)
}

/// BT.601 conversion with fixed-point integer arithmetic (<<8).
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let y = i32::from(y);
    let u = i32::from(u) - 128;
    let v = i32::from(v) - 128;
    [
        ((y * 256 + 359 * v) >> 8).clamp(0, 255) as u8,
        ((y * 256 - 88 * u - 183 * v) >> 8).clamp(0, 255) as u8,
        ((y * 256 + 454 * u) >> 8).clamp(0, 255) as u8,
    ]
}

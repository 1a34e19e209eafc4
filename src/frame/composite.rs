//! Channel compositor: uploads the three normalized YUV planes into
//! per-channel surfaces and hands them to a combine program.

use std::sync::Arc;

use glam::Vec2;
use image::RgbImage;

use crate::camera::types::Plane;
use crate::frame::decode::PlaneDecoder;
use crate::frame::error::{FrameError, Result};
use crate::frame::render::ChannelRenderer;

/// Number of planes in a YUV capture.
pub const CHANNEL_COUNT: usize = 3;

/// Texel layout of a channel surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceFormat {
    /// One byte per texel.
    Alpha8,
    /// Two interleaved bytes per texel (semi-planar chroma).
    Rg16,
}

impl SurfaceFormat {
    pub fn for_pixel_stride(pixel_stride: u32) -> Result<Self> {
        match pixel_stride {
            1 => Ok(Self::Alpha8),
            2 => Ok(Self::Rg16),
            other => Err(FrameError::UnsupportedPixelStride(other)),
        }
    }

    pub fn bytes_per_texel(self) -> usize {
        match self {
            Self::Alpha8 => 1,
            Self::Rg16 => 2,
        }
    }
}

/// A single-channel image sized to its own plane, not to the full frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSurface {
    pub width: u32,
    pub height: u32,
    pub format: SurfaceFormat,
    data: Vec<u8>,
}

impl ChannelSurface {
    pub fn new(width: u32, height: u32, format: SurfaceFormat) -> Self {
        let len = width as usize * height as usize * format.bytes_per_texel();
        Self {
            width,
            height,
            format,
            data: vec![0; len],
        }
    }

    /// Wrap already packed texels.
    pub fn from_packed(
        width: u32,
        height: u32,
        format: SurfaceFormat,
        data: Vec<u8>,
    ) -> Result<Self> {
        let mut surface = Self::new(width, height, format);
        if data.len() != surface.data.len() {
            return Err(FrameError::MalformedPlane {
                len: data.len(),
                required: surface.data.len(),
            });
        }
        surface.data = data;
        Ok(surface)
    }

    pub fn matches(&self, width: u32, height: u32, format: SurfaceFormat) -> bool {
        self.width == width && self.height == height && self.format == format
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bytes of the texel at `(x, y)`. Caller keeps coordinates in bounds.
    pub fn texel(&self, x: u32, y: u32) -> &[u8] {
        let bpt = self.format.bytes_per_texel();
        let start = (y as usize * self.width as usize + x as usize) * bpt;
        &self.data[start..start + bpt]
    }

    fn upload(&mut self, packed: &[u8]) -> Result<()> {
        if packed.len() != self.data.len() {
            return Err(FrameError::MalformedPlane {
                len: packed.len(),
                required: self.data.len(),
            });
        }
        self.data.copy_from_slice(packed);
        Ok(())
    }
}

/// Turns a three-plane capture into one RGB image.
///
/// Owns one decoder and one surface per channel. Surfaces are recreated only
/// when a channel's size or format changes between frames.
pub struct ChannelCompositor {
    decoders: [PlaneDecoder; CHANNEL_COUNT],
    surfaces: [Option<Arc<ChannelSurface>>; CHANNEL_COUNT],
    renderer: Option<Box<dyn ChannelRenderer>>,
}

impl ChannelCompositor {
    /// Create a compositor. `None` means no combine program could be loaded;
    /// every `compose` call then reports `RendererUnavailable`.
    pub fn new(renderer: Option<Box<dyn ChannelRenderer>>) -> Self {
        Self {
            decoders: Default::default(),
            surfaces: Default::default(),
            renderer,
        }
    }

    /// Sampling scale handed to the combine program. Fixed per frame by the
    /// luma pixel stride so it does not depend on resolution.
    pub fn sample_scale(luma: &Plane) -> Vec2 {
        Vec2::new(1.0 / luma.pixel_stride.max(1) as f32, 1.0)
    }

    pub fn compose(&mut self, planes: &[Plane]) -> Result<RgbImage> {
        let renderer = match self.renderer.as_mut() {
            Some(renderer) if renderer.is_available() => renderer,
            _ => {
                return Err(FrameError::RendererUnavailable(
                    "YUV combine program not loaded".to_string(),
                ))
            }
        };

        for index in 0..CHANNEL_COUNT {
            let plane = planes
                .get(index)
                .ok_or(FrameError::MissingChannel(index))?;
            let format = SurfaceFormat::for_pixel_stride(plane.pixel_stride)?;
            let packed = self.decoders[index].normalize(plane)?;

            let slot = &mut self.surfaces[index];
            if !slot
                .as_ref()
                .is_some_and(|s| s.matches(plane.width, plane.height, format))
            {
                tracing::debug!(
                    "channel {index} surface -> {}x{} {format:?}",
                    plane.width,
                    plane.height
                );
                *slot = None;
            }
            let surface = slot.get_or_insert_with(|| {
                Arc::new(ChannelSurface::new(plane.width, plane.height, format))
            });
            Arc::make_mut(surface).upload(packed)?;
        }

        // Bind only once every upload succeeded, so a failed frame leaves the
        // renderer holding no surface that a later upload would have to clone.
        for (index, slot) in self.surfaces.iter().enumerate() {
            if let Some(surface) = slot {
                renderer.set_channel(index, Arc::clone(surface));
            }
        }

        renderer.set_sample_scale(Self::sample_scale(&planes[0]));
        renderer.execute()
    }
}

use crate::camera::types::Plane;
use crate::frame::error::{FrameError, Result};

/// Strips hardware row padding from camera planes.
///
/// Owns one scratch buffer that is reused across frames and only resized when
/// the plane dimensions change, so steady-state capture does not allocate.
#[derive(Debug, Default)]
pub struct PlaneDecoder {
    scratch: Vec<u8>,
    dims: Option<(u32, u32)>,
    reallocations: u64,
}

impl PlaneDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the plane's pixels as a contiguous `width * height * pixel_stride`
    /// buffer.
    ///
    /// Contiguous planes are returned as-is without copying. Padded planes are
    /// repacked row by row into the scratch buffer.
    pub fn normalize<'a>(&'a mut self, plane: &'a Plane) -> Result<&'a [u8]> {
        let row_len = plane.packed_row_len();
        let row_stride = plane.row_stride as usize;
        if row_stride < row_len {
            return Err(FrameError::StrideTooShort {
                row_stride: plane.row_stride,
                row_len,
            });
        }

        let required = plane.height as usize * row_stride;
        if plane.data.len() < required {
            return Err(FrameError::MalformedPlane {
                len: plane.data.len(),
                required,
            });
        }

        let packed_len = plane.packed_len();
        if plane.is_contiguous() || packed_len == 0 {
            return Ok(&plane.data[..packed_len]);
        }

        self.ensure_capacity(plane.width, plane.height, packed_len);
        for (row, dst) in self.scratch.chunks_exact_mut(row_len).enumerate() {
            let src = row * row_stride;
            dst.copy_from_slice(&plane.data[src..src + row_len]);
        }
        Ok(&self.scratch)
    }

    /// Number of times the scratch buffer has been resized.
    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }

    fn ensure_capacity(&mut self, width: u32, height: u32, len: usize) {
        // Pixel stride can change without the dimensions changing.
        if self.dims == Some((width, height)) && self.scratch.len() == len {
            return;
        }
        tracing::debug!("resizing plane scratch to {width}x{height} ({len} bytes)");
        self.scratch.resize(len, 0);
        self.dims = Some((width, height));
        self.reallocations += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(width: u32, height: u32, pixel_stride: u32, row_stride: u32, data: Vec<u8>) -> Plane {
        Plane {
            width,
            height,
            pixel_stride,
            row_stride,
            data,
        }
    }

    /// Fill a padded plane where every real byte is its packed index and
    /// every padding byte is 0xEE.
    fn padded(width: u32, height: u32, pixel_stride: u32, row_stride: u32) -> (Plane, Vec<u8>) {
        let row_len = (width * pixel_stride) as usize;
        let mut data = vec![0xEEu8; row_stride as usize * height as usize];
        let mut expected = Vec::with_capacity(row_len * height as usize);
        for row in 0..height as usize {
            for i in 0..row_len {
                let value = ((row * row_len + i) % 251) as u8;
                data[row * row_stride as usize + i] = value;
                expected.push(value);
            }
        }
        (plane(width, height, pixel_stride, row_stride, data), expected)
    }

    #[test]
    fn contiguous_plane_is_returned_without_copy() {
        let p = plane(4, 2, 1, 4, (0..8).collect());
        let mut decoder = PlaneDecoder::new();
        let out = decoder.normalize(&p).unwrap();
        assert_eq!(out.as_ptr(), p.data.as_ptr());
        assert_eq!(out, &p.data[..]);
        assert_eq!(decoder.reallocations(), 0);
    }

    #[test]
    fn strips_padding_from_four_by_two_plane() {
        // a0 a1 a2 a3 x x b0 b1 b2 b3 x x
        let data = vec![0xA0, 0xA1, 0xA2, 0xA3, 0xFF, 0xFF, 0xB0, 0xB1, 0xB2, 0xB3, 0xFF, 0xFF];
        let p = plane(4, 2, 1, 6, data);
        let mut decoder = PlaneDecoder::new();
        let out = decoder.normalize(&p).unwrap();
        assert_eq!(out, &[0xA0, 0xA1, 0xA2, 0xA3, 0xB0, 0xB1, 0xB2, 0xB3]);
    }

    #[test]
    fn strips_padding_for_various_strides() {
        let cases = [
            (1, 1, 1, 2),
            (3, 5, 1, 4),
            (7, 3, 1, 8),
            (16, 9, 1, 64),
            (5, 4, 2, 11),
            (8, 8, 2, 32),
            (640, 3, 1, 768),
        ];
        let mut decoder = PlaneDecoder::new();
        for (width, height, pixel_stride, row_stride) in cases {
            let (p, expected) = padded(width, height, pixel_stride, row_stride);
            let out = decoder.normalize(&p).unwrap();
            assert_eq!(
                out,
                &expected[..],
                "{width}x{height} ps={pixel_stride} stride={row_stride}"
            );
        }
    }

    #[test]
    fn short_buffer_is_malformed() {
        let p = plane(4, 2, 1, 6, vec![0; 11]);
        let mut decoder = PlaneDecoder::new();
        let err = decoder.normalize(&p).unwrap_err();
        assert!(matches!(
            err,
            FrameError::MalformedPlane {
                len: 11,
                required: 12
            }
        ));
    }

    #[test]
    fn stride_shorter_than_row_is_malformed() {
        let p = plane(4, 2, 2, 6, vec![0; 12]);
        let mut decoder = PlaneDecoder::new();
        let err = decoder.normalize(&p).unwrap_err();
        assert!(matches!(err, FrameError::StrideTooShort { .. }));
        assert!(err.is_malformed());
    }

    #[test]
    fn scratch_is_reused_while_dimensions_hold() {
        let mut decoder = PlaneDecoder::new();
        for _ in 0..5 {
            let (p, expected) = padded(10, 4, 1, 16);
            assert_eq!(decoder.normalize(&p).unwrap(), &expected[..]);
        }
        assert_eq!(decoder.reallocations(), 1);

        let (p, expected) = padded(12, 4, 1, 16);
        assert_eq!(decoder.normalize(&p).unwrap(), &expected[..]);
        assert_eq!(decoder.reallocations(), 2);
    }

    #[test]
    fn decoder_recovers_after_malformed_plane() {
        let mut decoder = PlaneDecoder::new();
        let bad = plane(4, 2, 1, 6, vec![0; 3]);
        assert!(decoder.normalize(&bad).is_err());

        let (good, expected) = padded(4, 2, 1, 6);
        assert_eq!(decoder.normalize(&good).unwrap(), &expected[..]);
    }

    #[test]
    fn empty_plane_normalizes_to_empty_slice() {
        let p = plane(0, 0, 1, 0, vec![]);
        let mut decoder = PlaneDecoder::new();
        assert!(decoder.normalize(&p).unwrap().is_empty());
    }
}

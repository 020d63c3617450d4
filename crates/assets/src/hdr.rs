//! Radiance `.hdr` decoding

use std::io::BufReader;

use image::codecs::hdr::HdrDecoder;
use scene::HdrImage;

use crate::error::AssetError;

/// Decode an RGBE-encoded Radiance file into linear RGB floats.
///
/// # Errors
///
/// Returns [`AssetError::Hdr`] when the bytes are not a Radiance file.
pub fn decode_hdr(bytes: &[u8]) -> Result<HdrImage, AssetError> {
    let decoder = HdrDecoder::new(BufReader::new(bytes))?;
    let meta = decoder.metadata();
    let pixels = decoder.read_image_hdr()?;
    let data: Vec<f32> = pixels.into_iter().flat_map(|p| p.0).collect();
    tracing::debug!("Decoded HDR panorama {}x{}", meta.width, meta.height);
    Ok(HdrImage::new(meta.width, meta.height, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flat (non run-length) RGBE file with the given scanlines
    fn radiance_file(width: u32, height: u32, rgbe: [u8; 4]) -> Vec<u8> {
        let mut bytes = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n".to_vec();
        bytes.extend_from_slice(format!("-Y {height} +X {width}\n").as_bytes());
        for _ in 0..width * height {
            bytes.extend_from_slice(&rgbe);
        }
        bytes
    }

    #[test]
    fn decodes_flat_scanlines() {
        // mantissa 128 with exponent 129 is 1.0
        let image = decode_hdr(&radiance_file(4, 2, [128, 64, 0, 129])).unwrap();
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.data.len(), 4 * 2 * 3);
        assert!((image.data[0] - 1.0).abs() < 0.01, "r {}", image.data[0]);
        assert!((image.data[1] - 0.5).abs() < 0.01, "g {}", image.data[1]);
        assert!(image.data[2] < 0.01, "b {}", image.data[2]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(decode_hdr(b"not an hdr file"), Err(AssetError::Hdr(_))));
    }
}

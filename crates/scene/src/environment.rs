//! Environment map baking
//!
//! Turns an equirectangular HDR panorama into the two maps the scene shader
//! samples: a reflection chain (box-filtered radiance with halving mips,
//! selected by roughness) and a small cosine-convolved irradiance map
//! (selected by surface normal).
//!
//! Both maps keep the equirectangular layout, see [`direction_to_uv`].

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("expected {expected} floats for a {width}x{height} RGB image, got {actual}")]
pub struct ImageSizeError {
    pub width: u32,
    pub height: u32,
    pub expected: usize,
    pub actual: usize,
}

/// Linear RGB float image, rows top to bottom
#[derive(Debug, Clone)]
pub struct HdrImage {
    pub width: u32,
    pub height: u32,
    /// Three floats per pixel, row-major
    pub data: Vec<f32>,
}

impl HdrImage {
    /// Wrap decoded pixels, checking they fill `width` x `height`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageSizeError`] when `data` is not exactly three floats per
    /// pixel, or when the image has no pixels.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self, ImageSizeError> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected || expected == 0 {
            return Err(ImageSizeError {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    fn texel(&self, x: u32, y: u32) -> Vec3 {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Vec3::new(self.data[i], self.data[i + 1], self.data[i + 2])
    }
}

/// One equirectangular level, RGBA float texels with alpha fixed at 1
#[derive(Debug, Clone)]
pub struct EquirectLevel {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<[f32; 4]>,
}

impl EquirectLevel {
    fn texel(&self, x: u32, y: u32) -> Vec3 {
        let t = self.texels[y as usize * self.width as usize + x as usize];
        Vec3::new(t[0], t[1], t[2])
    }

    /// Mean radiance over the sphere, weighted by texel solid angle
    pub fn mean_radiance(&self) -> Vec3 {
        let mut sum = Vec3::ZERO;
        let mut weight = 0.0;
        for y in 0..self.height {
            let theta = (y as f32 + 0.5) / self.height as f32 * PI;
            let w = theta.sin();
            for x in 0..self.width {
                sum += self.texel(x, y) * w;
                weight += w;
            }
        }
        sum / weight
    }

    pub fn byte_len(&self) -> usize {
        self.texels.len() * std::mem::size_of::<[f32; 4]>()
    }
}

/// Baked image-based lighting for the scene
#[derive(Debug, Clone)]
pub struct EnvironmentMap {
    /// Mip chain, level 0 sharpest
    pub reflection: Vec<EquirectLevel>,
    pub irradiance: EquirectLevel,
}

impl EnvironmentMap {
    pub fn reflection_mip_count(&self) -> u32 {
        self.reflection.len() as u32
    }
}

/// Sizes of the baked maps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BakeSettings {
    /// Width of reflection level 0; height is half of it
    pub reflection_width: u32,
    /// Width of the irradiance map; height is half of it
    pub irradiance_width: u32,
}

impl Default for BakeSettings {
    fn default() -> Self {
        Self {
            reflection_width: 256,
            irradiance_width: 32,
        }
    }
}

/// Equirectangular texture coordinates of a unit direction.
///
/// `u` wraps around +Y starting at -X, `v` is 0 straight up and 1 straight down.
pub fn direction_to_uv(dir: Vec3) -> Vec2 {
    let u = dir.z.atan2(dir.x) / TAU + 0.5;
    let v = dir.y.clamp(-1.0, 1.0).acos() / PI;
    Vec2::new(u, v)
}

/// Inverse of [`direction_to_uv`]
pub fn uv_to_direction(uv: Vec2) -> Vec3 {
    let phi = (uv.x - 0.5) * TAU;
    let theta = uv.y * PI;
    Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin())
}

/// One-shot converter from an HDR panorama to an [`EnvironmentMap`].
///
/// [`EnvironmentBaker::bake`] consumes the baker and the source image; the
/// scratch buffers and the full-resolution panorama are freed when it returns.
pub struct EnvironmentBaker {
    settings: BakeSettings,
    directions: Vec<Vec3>,
    solid_angles: Vec<f32>,
}

impl EnvironmentBaker {
    pub fn new(settings: BakeSettings) -> Self {
        Self {
            settings,
            directions: Vec::new(),
            solid_angles: Vec::new(),
        }
    }

    pub fn bake(mut self, source: HdrImage) -> EnvironmentMap {
        let base = downsample(&source, self.settings.reflection_width);
        drop(source);

        let irradiance = self.convolve_irradiance(&base);

        let mut reflection = vec![base];
        while let Some(next) = reflection.last().and_then(halve) {
            reflection.push(next);
        }

        tracing::debug!(
            "Baked environment: {} reflection mips, irradiance {}x{}",
            reflection.len(),
            irradiance.width,
            irradiance.height
        );

        EnvironmentMap {
            reflection,
            irradiance,
        }
    }

    /// Cosine-weighted integral of `radiance` around each output normal,
    /// divided by pi so a constant environment maps to itself.
    fn convolve_irradiance(&mut self, radiance: &EquirectLevel) -> EquirectLevel {
        self.directions.clear();
        self.solid_angles.clear();
        let texel_area = (TAU / radiance.width as f32) * (PI / radiance.height as f32);
        for y in 0..radiance.height {
            let v = (y as f32 + 0.5) / radiance.height as f32;
            for x in 0..radiance.width {
                let u = (x as f32 + 0.5) / radiance.width as f32;
                self.directions.push(uv_to_direction(Vec2::new(u, v)));
                self.solid_angles.push(texel_area * (v * PI).sin());
            }
        }

        let width = self.settings.irradiance_width.max(2);
        let height = (width / 2).max(1);
        let mut texels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            let v = (y as f32 + 0.5) / height as f32;
            for x in 0..width {
                let u = (x as f32 + 0.5) / width as f32;
                let normal = uv_to_direction(Vec2::new(u, v));

                let mut sum = Vec3::ZERO;
                for (i, dir) in self.directions.iter().enumerate() {
                    let cos = normal.dot(*dir);
                    if cos > 0.0 {
                        let t = radiance.texels[i];
                        sum += Vec3::new(t[0], t[1], t[2]) * (cos * self.solid_angles[i]);
                    }
                }
                let e = sum / PI;
                texels.push([e.x, e.y, e.z, 1.0]);
            }
        }

        EquirectLevel {
            width,
            height,
            texels,
        }
    }
}

/// Box filter `source` down to `target_width` x `target_width / 2`
fn downsample(source: &HdrImage, target_width: u32) -> EquirectLevel {
    let width = target_width.clamp(2, source.width.max(2));
    let height = (width / 2).max(1);
    let mut texels = Vec::with_capacity((width * height) as usize);

    for y in 0..height {
        let y0 = (u64::from(y) * u64::from(source.height) / u64::from(height)) as u32;
        let y1 = ((u64::from(y + 1) * u64::from(source.height) / u64::from(height)) as u32)
            .max(y0 + 1)
            .min(source.height);
        for x in 0..width {
            let x0 = (u64::from(x) * u64::from(source.width) / u64::from(width)) as u32;
            let x1 = ((u64::from(x + 1) * u64::from(source.width) / u64::from(width)) as u32)
                .max(x0 + 1)
                .min(source.width);

            let mut sum = Vec3::ZERO;
            let mut count = 0u32;
            for sy in y0.min(source.height - 1)..y1 {
                for sx in x0.min(source.width - 1)..x1 {
                    sum += source.texel(sx, sy);
                    count += 1;
                }
            }
            let avg = sum / count.max(1) as f32;
            texels.push([avg.x, avg.y, avg.z, 1.0]);
        }
    }

    EquirectLevel {
        width,
        height,
        texels,
    }
}

/// Next mip level, or `None` once the level is one texel high
fn halve(level: &EquirectLevel) -> Option<EquirectLevel> {
    if level.height <= 1 || level.width <= 1 {
        return None;
    }
    let width = level.width / 2;
    let height = level.height / 2;
    let mut texels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let sum = level.texel(2 * x, 2 * y)
                + level.texel((2 * x + 1).min(level.width - 1), 2 * y)
                + level.texel(2 * x, (2 * y + 1).min(level.height - 1))
                + level.texel((2 * x + 1).min(level.width - 1), (2 * y + 1).min(level.height - 1));
            let avg = sum / 4.0;
            texels.push([avg.x, avg.y, avg.z, 1.0]);
        }
    }
    Some(EquirectLevel {
        width,
        height,
        texels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_image(width: u32, height: u32, rgb: [f32; 3]) -> HdrImage {
        let data = (0..width * height).flat_map(|_| rgb).collect();
        HdrImage::new(width, height, data).unwrap()
    }

    fn small_settings() -> BakeSettings {
        BakeSettings {
            reflection_width: 32,
            irradiance_width: 8,
        }
    }

    #[test]
    fn rejects_wrong_buffer_length() {
        let err = HdrImage::new(4, 2, vec![0.0; 5]).unwrap_err();
        assert_eq!(err.expected, 24);
        assert_eq!(err.actual, 5);
    }

    #[test]
    fn uv_round_trip_for_axes() {
        for dir in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z, Vec3::new(0.6, 0.0, 0.8)] {
            let back = uv_to_direction(direction_to_uv(dir));
            assert!((back - dir).length() < 1e-5, "{dir:?} came back as {back:?}");
        }
        assert!(direction_to_uv(Vec3::Y).y.abs() < 1e-6);
        assert!((direction_to_uv(Vec3::NEG_Y).y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mips_halve_down_to_one_row() {
        let map = EnvironmentBaker::new(small_settings()).bake(constant_image(128, 64, [1.0; 3]));
        let sizes: Vec<(u32, u32)> = map.reflection.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(sizes, vec![(32, 16), (16, 8), (8, 4), (4, 2), (2, 1)]);
        assert_eq!(map.reflection_mip_count(), 5);
        assert_eq!((map.irradiance.width, map.irradiance.height), (8, 4));
    }

    #[test]
    fn constant_environment_stays_constant() {
        let map = EnvironmentBaker::new(small_settings()).bake(constant_image(64, 32, [0.5, 1.0, 2.0]));
        let mean = map.reflection[0].mean_radiance();
        assert!((mean - Vec3::new(0.5, 1.0, 2.0)).length() < 1e-4);

        for t in &map.irradiance.texels {
            assert!((t[0] - 0.5).abs() < 0.03, "irradiance r {}", t[0]);
            assert!((t[1] - 1.0).abs() < 0.06, "irradiance g {}", t[1]);
            assert!((t[3] - 1.0).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn bright_sky_lights_upward_normals() {
        // top half bright, bottom half dark
        let (w, h) = (64, 32);
        let data = (0..h)
            .flat_map(|y| (0..w).flat_map(move |_| if y < h / 2 { [4.0; 3] } else { [0.0; 3] }))
            .collect();
        let map = EnvironmentBaker::new(small_settings()).bake(HdrImage::new(w, h, data).unwrap());

        let irr = &map.irradiance;
        let top = irr.texel(0, 0).x;
        let bottom = irr.texel(0, irr.height - 1).x;
        assert!(top > bottom * 4.0, "top {top} bottom {bottom}");
    }

    #[test]
    fn upscale_request_is_clamped_to_source() {
        let map = EnvironmentBaker::new(BakeSettings {
            reflection_width: 512,
            irradiance_width: 4,
        })
        .bake(constant_image(16, 8, [1.0; 3]));
        assert_eq!(map.reflection[0].width, 16);
    }
}

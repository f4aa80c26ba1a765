//! Procedural motion: 1D Perlin gradient noise and the per-element offset.
//!
//! Everything here is pure, so the offset of each element can be evaluated
//! on any thread in any order.

use glam::Vec3;

/// Ken Perlin's reference permutation table.
const PERM: [u8; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209, 76,
    132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173,
    186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212, 207, 206,
    59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44, 154, 163,
    70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232,
    178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162,
    241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157, 184, 84, 204,
    176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29, 24, 72, 243, 141,
    128, 195, 78, 66, 215, 61, 156, 180,
];

/// Quintic smoothstep `6t⁵ - 15t⁴ + 10t³`.
#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn grad(hash: u8, x: f32) -> f32 {
    if hash & 1 == 0 { x } else { -x }
}

/// One-dimensional Perlin noise in `[-1, 1]`.
///
/// Continuous, periodic with period 256, and zero at every integer.
pub fn perlin(x: f32) -> f32 {
    let floor = x.floor();
    let xi = (floor as i32 & 0xff) as usize;
    let f = x - floor;
    let u = fade(f);

    let a = grad(PERM[xi], f);
    let b = grad(PERM[(xi + 1) & 0xff], f - 1.0);
    (a + u * (b - a)) * 2.0
}

/// Noise-driven displacement applied on top of each element's origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseMotion {
    pub amplitude: f32,
    /// Per-axis spatial frequency of the noise sample.
    pub frequencies: Vec3,
}

impl Default for NoiseMotion {
    fn default() -> Self {
        Self {
            amplitude: 2.0,
            frequencies: Vec3::new(0.3, 0.5, 0.7),
        }
    }
}

impl NoiseMotion {
    pub fn new(amplitude: f32, frequencies: Vec3) -> Self {
        Self {
            amplitude,
            frequencies,
        }
    }

    /// Displacement of an element with origin `p` at `elapsed` seconds.
    ///
    /// Each axis stays within `[-amplitude, amplitude]`.
    #[inline]
    pub fn offset(&self, p: Vec3, elapsed: f32) -> Vec3 {
        let t = elapsed;
        let f = self.frequencies;
        let x = (t + perlin(f.x * p.x + t)).sin();
        let y = (t + perlin(f.y * p.y + t)).cos();
        let z = (t + perlin(f.z * p.z - t)).sin();
        Vec3::new(x, y, z) * self.amplitude
    }
}

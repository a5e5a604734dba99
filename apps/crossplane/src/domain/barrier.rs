//! Procedural barrier ("black square") placement.
//!
//! Barriers are never stored or synchronized: every client derives them from
//! the coordinates alone, so the function below must give bit-identical
//! answers on every platform. It therefore sticks to wrapping integer
//! arithmetic; the only float operation is an exact 53-bit to f64 conversion.

use crate::domain::coords::Coord;

/// Cells with |x| < SAFE_RADIUS and |y| < SAFE_RADIUS are always open.
pub const SAFE_RADIUS: i32 = 6;

/// Fraction of the unit interval above which a cell becomes a barrier.
/// Tuned for roughly 12% walls, in line with printed crosswords.
pub const DENSITY_THRESHOLD: f64 = 0.88;

/// Whether `(x, y)` is a barrier. Pure and total.
pub fn is_barrier(x: i32, y: i32) -> bool {
    if in_safe_zone(x, y) {
        return false;
    }
    unit_noise(x, y) > DENSITY_THRESHOLD
}

/// Coordinate form of [`is_barrier`].
#[inline]
pub fn is_barrier_at(c: Coord) -> bool {
    is_barrier(c.x, c.y)
}

/// A letter may go here.
#[inline]
pub fn is_occupiable(x: i32, y: i32) -> bool {
    !is_barrier(x, y)
}

#[inline]
fn in_safe_zone(x: i32, y: i32) -> bool {
    x.unsigned_abs() < SAFE_RADIUS as u32 && y.unsigned_abs() < SAFE_RADIUS as u32
}

/// Deterministic noise in [0, 1).
fn unit_noise(x: i32, y: i32) -> f64 {
    let bits = mix(pack(x, y)) >> 11;
    bits as f64 / (1u64 << 53) as f64
}

fn pack(x: i32, y: i32) -> u64 {
    ((x as u32 as u64) << 32) | (y as u32 as u64)
}

// SplitMix64 finalizer
fn mix(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

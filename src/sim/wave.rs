//! Oscillator field
//!
//! Stateless periodic motion: everything here is a pure function of
//! position and elapsed time, so any frame can be reproduced exactly.

/// Sea surface height at (x, z) and time t (seconds)
#[inline]
pub fn wave_height(x: f32, z: f32, t: f32) -> f32 {
    (0.05 * x + t).sin() * 0.5 + (0.07 * z + 1.3 * t).sin() * 0.3
}

/// Hull pitch (radians)
#[inline]
pub fn boat_pitch(t: f32) -> f32 {
    (2.0 * t).sin() * 0.05
}

/// Hull roll (radians)
#[inline]
pub fn boat_roll(t: f32) -> f32 {
    (1.5 * t).cos() * 0.03
}

/// Height of a floating hull's origin
#[inline]
pub fn float_height(buoyancy: f32, x: f32, z: f32, t: f32) -> f32 {
    buoyancy + wave_height(x, z, t)
}

/// Sway of grass blade `index` about its base (radians)
#[inline]
pub fn grass_sway(t: f32, index: usize) -> f32 {
    (t * 2.0 + index as f32).sin() * 0.3
}

/// Limb swing for a walker at the given walk phase (radians)
#[inline]
pub fn limb_swing(phase: f32) -> f32 {
    (phase * 8.0).sin() * 0.6
}

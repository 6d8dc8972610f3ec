//! Island Storm - a storm-lit island boat game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, boats, picking, game state)
//! - `audio`: Procedural Web Audio (noise synthesis, ambient track, effects)
//! - `camera`: Orbit/follow camera and screen-to-world rays
//! - `renderer`: WebGPU instanced renderer
//! - `platform`: Browser input mapping
//! - `settings`: User preferences

pub mod audio;
pub mod camera;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use camera::{Camera, CameraMode};
pub use error::{AudioError, SettingsError, WorldError};
pub use settings::{QualityPreset, Settings};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Fixed simulation timestep (one display frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Player boat forward speed (units/s); reverse runs at half
    pub const BOAT_SPEED: f32 = 30.0;
    /// Player boat turn rate (radians/s)
    pub const BOAT_TURN_RATE: f32 = 1.8;
    /// Resting height of a hull above the wave surface
    pub const BOAT_BUOYANCY: f32 = 0.6;

    /// Player spawn point and heading
    pub const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, BOAT_BUOYANCY, 140.0);
    pub const PLAYER_SPAWN_HEADING: f32 = 0.0;

    /// Where the coin floats, far out at sea
    pub const COIN_SPAWN: Vec3 = Vec3::new(-160.0, 2.0, -120.0);
    /// Half-width of the square pickup window around the coin (x and z)
    pub const COIN_PICKUP_HALF_WIDTH: f32 = 5.0;

    /// Island goal region radius, measured horizontally from the origin
    pub const GOAL_RADIUS: f32 = 45.0;
    /// Island shape (cylinder, top radius / bottom radius / height / center y)
    pub const ISLAND_TOP_RADIUS: f32 = 35.0;
    pub const ISLAND_BOTTOM_RADIUS: f32 = 40.0;
    pub const ISLAND_HEIGHT: f32 = 15.0;
    pub const ISLAND_CENTER_Y: f32 = 5.0;
    /// Ground level on top of the island
    pub const ISLAND_SURFACE_Y: f32 = ISLAND_CENTER_Y + ISLAND_HEIGHT / 2.0;

    /// Fire particles rise from the campfire and reset at the ceiling
    pub const FIRE_SPAWN_Y: f32 = 13.0;
    pub const FIRE_CEILING_Y: f32 = 18.0;
    pub const FIRE_RISE_SPEED: f32 = 6.0;
    pub const FIRE_PARTICLE_COUNT: usize = 50;

    /// Rain volume and fall speed
    pub const RAIN_CEILING: f32 = 800.0;
    pub const RAIN_SPREAD: f32 = 500.0;
    pub const RAIN_FALL_SPEED: f32 = 300.0;

    /// Thunder: per-tick strike chance, flash peak, per-tick decay
    pub const THUNDER_CHANCE: f32 = 0.01;
    pub const THUNDER_PEAK: f32 = 2000.0;
    pub const THUNDER_DECAY: f32 = 0.95;

    /// Fire light flicker range
    pub const FIRE_LIGHT_BASE: f32 = 40.0;
    pub const FIRE_LIGHT_FLICKER: f32 = 20.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit facing vector for a yaw angle (local +Z rotated about Y)
#[inline]
pub fn facing(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Yaw whose *forward* (opposite of facing) points along `dir`
#[inline]
pub fn yaw_facing_away(dir: Vec3) -> f32 {
    (-dir.x).atan2(-dir.z)
}

/// Distance from the world origin in the XZ plane
#[inline]
pub fn horizontal_distance(pos: Vec3) -> f32 {
    (pos.x * pos.x + pos.z * pos.z).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_angle() {
        use std::f32::consts::{FRAC_PI_2, PI, TAU};
        assert!((normalize_angle(2.0 * TAU + FRAC_PI_2) - FRAC_PI_2).abs() < 1e-4);
        assert!((normalize_angle(-PI - FRAC_PI_2) - FRAC_PI_2).abs() < 1e-4);
        assert!((normalize_angle(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(normalize_angle(PI), -PI);
    }

    proptest! {
        #[test]
        fn test_normalize_angle_range_and_direction(angle in -100.0f32..100.0) {
            use std::f32::consts::PI;
            let n = normalize_angle(angle);
            prop_assert!((-PI..PI).contains(&n));
            prop_assert!((n.sin() - angle.sin()).abs() < 1e-3);
            prop_assert!((n.cos() - angle.cos()).abs() < 1e-3);
        }
    }

    #[test]
    fn test_yaw_facing_away_inverts_facing() {
        let dir = Vec3::new(1.0, 0.0, 1.0).normalize();
        let yaw = yaw_facing_away(dir);
        assert!((-facing(yaw) - dir).length() < 1e-5);
    }

    #[test]
    fn test_horizontal_distance_ignores_height() {
        assert!((horizontal_distance(Vec3::new(3.0, 100.0, 4.0)) - 5.0).abs() < 1e-6);
    }
}

//! Scene to instance list
//!
//! Pure conversion from the game state to box instances and lighting, so the
//! GPU side only uploads and draws.

use glam::{Mat4, Quat, Vec3};

use super::vertex::InstanceRaw;
use crate::consts::*;
use crate::sim::entity::{Entity, EntityKind, Part, Swing};
use crate::sim::scene::colors;
use crate::sim::wave::{grass_sway, wave_height};
use crate::sim::GameState;

/// Water tile grid (tiles per side, tile size)
const WATER_TILES: i32 = 40;
const WATER_TILE: f32 = 50.0;
const WATER_DAY: [f32; 4] = [0.0, 0.35, 0.45, 1.0];
const GRASS_HEIGHT: f32 = 1.2;
const RAIN_LENGTH: f32 = 4.0;
const SELECTION_TINT: f32 = 0.35;

/// Per-frame lighting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    /// Clear color
    pub sky: [f32; 4],
    /// Direction toward the key light
    pub light_dir: Vec3,
    pub light_strength: f32,
    pub ambient: f32,
    /// Campfire point light (normalized intensity)
    pub fire: f32,
    /// Lightning flash (0..1)
    pub flash: f32,
}

/// Sky and light levels for the current day/night mode and storm
pub fn lighting(state: &GameState, reduced_motion: bool) -> Lighting {
    let flash = if reduced_motion {
        0.0
    } else {
        (state.weather.thunder_flash / THUNDER_PEAK).clamp(0.0, 1.0)
    };
    let fire = state.weather.fire_light / FIRE_LIGHT_BASE;

    let (sky, light_dir, light_strength, ambient) = if state.daylight {
        ([0.53, 0.81, 0.92], Vec3::new(0.4, 1.0, 0.3), 1.0, 0.55)
    } else {
        ([0.02, 0.03, 0.06], Vec3::new(-0.3, 1.0, -0.5), 0.15, 0.12)
    };
    let sky = [
        sky[0] + (1.0 - sky[0]) * flash * 0.6,
        sky[1] + (1.0 - sky[1]) * flash * 0.6,
        sky[2] + (1.0 - sky[2]) * flash * 0.7,
        1.0,
    ];

    Lighting {
        sky,
        light_dir: light_dir.normalize(),
        light_strength,
        ambient: ambient + flash * 0.8,
        fire,
        flash,
    }
}

/// Model matrix for a part, including limb swing about its top edge
fn part_matrix(entity: &Entity, part: &Part) -> Mat4 {
    let swing = match (&entity.kind, part.swing) {
        (_, Swing::Rigid) => 0.0,
        (EntityKind::Person(w) | EntityKind::Animal(w), Swing::Forward) => w.limb_swing,
        (EntityKind::Person(w) | EntityKind::Animal(w), Swing::Backward) => -w.limb_swing,
        _ => 0.0,
    };
    let pivot = Vec3::new(0.0, part.half_extents.y, 0.0);
    let local = Mat4::from_translation(part.center + pivot)
        * Mat4::from_rotation_x(swing)
        * Mat4::from_translation(-pivot)
        * Mat4::from_scale(part.half_extents * 2.0);
    entity.transform.matrix() * local
}

fn tint(color: [f32; 4], amount: f32) -> [f32; 4] {
    [
        color[0] + (1.0 - color[0]) * amount,
        color[1] + (1.0 - color[1]) * amount,
        color[2] + (1.0 - color[2]) * amount,
        color[3],
    ]
}

/// Every box to draw this frame
pub fn build_instances(state: &GameState) -> Vec<InstanceRaw> {
    let t = state.elapsed();
    let selected = state.registry.selected();
    let mut out = Vec::with_capacity(
        state.registry.parts().count() + state.weather.rain.len() + state.weather.grass.len(),
    );

    for (id, entity) in state.registry.all() {
        if !entity.transform.is_finite() {
            continue;
        }
        if matches!(entity.kind, EntityKind::Water) {
            push_water(&mut out, t, state.daylight);
            continue;
        }
        let highlight = selected == Some(id);
        for part in state.registry.parts_of(id) {
            let color = if highlight {
                tint(part.color, SELECTION_TINT)
            } else {
                part.color
            };
            out.push(InstanceRaw::new(part_matrix(entity, part), color));
        }
    }

    for (i, root) in state.weather.grass.iter().enumerate() {
        let model = Mat4::from_translation(*root)
            * Mat4::from_rotation_z(grass_sway(t, i))
            * Mat4::from_translation(Vec3::new(0.0, GRASS_HEIGHT / 2.0, 0.0))
            * Mat4::from_scale(Vec3::new(0.1, GRASS_HEIGHT, 0.1));
        out.push(InstanceRaw::new(model, colors::GRASS));
    }

    let rain_scale = Vec3::new(0.08, RAIN_LENGTH, 0.08);
    for drop in &state.weather.rain {
        out.push(InstanceRaw::new(
            Mat4::from_scale_rotation_translation(rain_scale, Quat::IDENTITY, *drop),
            colors::RAIN,
        ));
    }

    out
}

/// Wave tiles standing in for the sea slab
fn push_water(out: &mut Vec<InstanceRaw>, t: f32, daylight: bool) {
    let color = if daylight { WATER_DAY } else { colors::WATER };
    let half = WATER_TILES as f32 * WATER_TILE / 2.0;
    for ix in 0..WATER_TILES {
        for iz in 0..WATER_TILES {
            let x = ix as f32 * WATER_TILE - half + WATER_TILE / 2.0;
            let z = iz as f32 * WATER_TILE - half + WATER_TILE / 2.0;
            let y = wave_height(x, z, t) - 0.5;
            out.push(InstanceRaw::new(
                Mat4::from_scale_rotation_translation(
                    Vec3::new(WATER_TILE, 1.0, WATER_TILE),
                    Quat::IDENTITY,
                    Vec3::new(x, y, z),
                ),
                color,
            ));
        }
    }
}

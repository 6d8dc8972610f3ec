//! Scene builder
//!
//! Lays out the island world once per session: static scenery, decorative
//! particle groups, walkers and the boats. Layout is seeded so a given seed
//! always produces the same island.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::ambient::Weather;
use super::entity::{
    Aabb, BoatState, Drift, Entity, EntityId, EntityKind, Part, Patrol, Rising, Swing, Transform,
    Walker,
};
use super::registry::EntityRegistry;
use super::state::GameState;
use crate::consts::*;
use crate::error::WorldError;
use crate::settings::Settings;

/// Colors for world elements
pub mod colors {
    pub const WATER: [f32; 4] = [0.0, 0.12, 0.06, 1.0];
    pub const ISLAND: [f32; 4] = [0.0, 0.39, 0.0, 1.0];
    pub const SAND: [f32; 4] = [0.76, 0.7, 0.5, 1.0];
    pub const GRASS: [f32; 4] = [0.2, 0.8, 0.2, 1.0];
    pub const TRUNK: [f32; 4] = [0.4, 0.26, 0.13, 1.0];
    pub const CANOPY: [f32; 4] = [0.05, 0.55, 0.15, 1.0];
    pub const ROCK: [f32; 4] = [0.45, 0.45, 0.48, 1.0];
    pub const WALL: [f32; 4] = [0.8, 0.7, 0.55, 1.0];
    pub const ROOF: [f32; 4] = [0.55, 0.2, 0.1, 1.0];
    pub const FIRE: [f32; 4] = [1.0, 0.27, 0.0, 1.0];
    pub const SMOKE: [f32; 4] = [0.3, 0.3, 0.3, 0.6];
    pub const CLOUD: [f32; 4] = [0.15, 0.15, 0.18, 0.9];
    pub const SKIN: [f32; 4] = [0.87, 0.68, 0.5, 1.0];
    pub const CLOTH: [f32; 4] = [0.2, 0.3, 0.7, 1.0];
    pub const FUR: [f32; 4] = [0.6, 0.45, 0.3, 1.0];
    pub const PLAYER_HULL: [f32; 4] = [0.8, 0.1, 0.1, 1.0];
    pub const NPC_HULL: [f32; 4] = [0.35, 0.25, 0.15, 1.0];
    pub const DECK: [f32; 4] = [0.6, 0.45, 0.25, 1.0];
    pub const MAST: [f32; 4] = [0.3, 0.2, 0.1, 1.0];
    pub const SAIL: [f32; 4] = [0.95, 0.95, 0.9, 1.0];
    pub const RAIN: [f32; 4] = [0.0, 1.0, 1.0, 0.6];
}

/// How much of each thing to build
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub rain_drops: usize,
    pub grass_blades: usize,
    pub trees: usize,
    pub rocks: usize,
    pub houses: usize,
    pub people: usize,
    pub animals: usize,
    pub fire_particles: usize,
    pub smoke_puffs: usize,
    pub clouds: usize,
    /// (radius, angular speed) for each NPC patrol
    pub patrols: Vec<(f32, f32)>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            rain_drops: 8_000,
            grass_blades: 800,
            trees: 12,
            rocks: 8,
            houses: 3,
            people: 3,
            animals: 2,
            fire_particles: FIRE_PARTICLE_COUNT,
            smoke_puffs: 12,
            clouds: 10,
            patrols: vec![(90.0, 0.25), (130.0, -0.18), (180.0, 0.12)],
        }
    }
}

impl SceneConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            rain_drops: settings.quality.rain_drops(),
            grass_blades: settings.quality.grass_blades(),
            ..Self::default()
        }
    }

    /// A light world for tests and the headless demo
    pub fn small() -> Self {
        Self {
            rain_drops: 64,
            grass_blades: 16,
            trees: 3,
            rocks: 2,
            houses: 1,
            people: 1,
            animals: 1,
            fire_particles: 8,
            smoke_puffs: 3,
            clouds: 2,
            patrols: vec![(90.0, 0.25), (130.0, -0.18)],
        }
    }
}

/// One box of a composite entity
struct Piece {
    center: Vec3,
    half: Vec3,
    color: [f32; 4],
    swing: Swing,
}

fn piece(center: Vec3, half: Vec3, color: [f32; 4]) -> Piece {
    Piece {
        center,
        half,
        color,
        swing: Swing::Rigid,
    }
}

/// Register an entity with its parts; optionally snapshot its bounds as the
/// collision volume
fn spawn(
    registry: &mut EntityRegistry,
    entity: Entity,
    pieces: &[Piece],
    with_collision: bool,
) -> EntityId {
    let transform = entity.transform;
    let parts: Vec<Part> = pieces
        .iter()
        .map(|p| Part::new(EntityId(0), p.center, p.half, p.color).swinging(p.swing))
        .collect();

    let entity = if with_collision {
        let bounds = parts
            .iter()
            .map(|p| p.world_bounds(&transform))
            .reduce(|a, b| Aabb::new(a.min.min(b.min), a.max.max(b.max)));
        match bounds {
            Some(b) => entity.with_collision(b),
            None => entity,
        }
    } else {
        entity
    };

    let id = registry.register(entity);
    for part in parts {
        registry.add_part(Part { owner: id, ..part });
    }
    id
}

/// Random point on the island top, away from the campfire
fn island_spot(rng: &mut Pcg32, min_r: f32, max_r: f32) -> Vec3 {
    let angle = rng.random_range(0.0..TAU);
    let radius = rng.random_range(min_r..max_r);
    Vec3::new(angle.cos() * radius, ISLAND_SURFACE_Y, angle.sin() * radius)
}

/// Build the world and wrap it in a fresh session
pub fn build_world(config: &SceneConfig, rng: &mut Pcg32, seed: u64) -> Result<GameState, WorldError> {
    let mut registry = EntityRegistry::new();

    // Sea: one huge flat slab, never picked
    spawn(
        &mut registry,
        Entity::new(EntityKind::Water, Transform::at(Vec3::ZERO)),
        &[piece(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(2_000.0, 0.5, 2_000.0),
            colors::WATER,
        )],
        false,
    );

    // Island: stepped boxes standing in for the tapered cylinder
    spawn(
        &mut registry,
        Entity::new(
            EntityKind::Island,
            Transform::at(Vec3::new(0.0, ISLAND_CENTER_Y, 0.0)),
        )
        .pickable(),
        &[
            piece(
                Vec3::new(0.0, -ISLAND_HEIGHT / 4.0, 0.0),
                Vec3::new(ISLAND_BOTTOM_RADIUS * 0.8, ISLAND_HEIGHT / 4.0, ISLAND_BOTTOM_RADIUS * 0.8),
                colors::SAND,
            ),
            piece(
                Vec3::new(0.0, ISLAND_HEIGHT / 4.0, 0.0),
                Vec3::new(ISLAND_TOP_RADIUS * 0.8, ISLAND_HEIGHT / 4.0, ISLAND_TOP_RADIUS * 0.8),
                colors::ISLAND,
            ),
        ],
        true,
    );

    for _ in 0..config.trees {
        let at = island_spot(rng, 10.0, ISLAND_TOP_RADIUS * 0.75);
        let height = rng.random_range(6.0..10.0);
        spawn(
            &mut registry,
            Entity::new(EntityKind::Tree, Transform::at(at)).pickable(),
            &[
                piece(
                    Vec3::new(0.0, height / 2.0, 0.0),
                    Vec3::new(0.4, height / 2.0, 0.4),
                    colors::TRUNK,
                ),
                piece(Vec3::new(0.0, height, 0.0), Vec3::new(2.5, 1.0, 2.5), colors::CANOPY),
            ],
            true,
        );
    }

    for _ in 0..config.rocks {
        let at = island_spot(rng, 8.0, ISLAND_TOP_RADIUS * 0.8);
        let size = rng.random_range(0.6..1.6);
        let yaw = rng.random_range(0.0..TAU);
        spawn(
            &mut registry,
            Entity::new(EntityKind::Rock, Transform::at(at).with_yaw(yaw)).pickable(),
            &[piece(Vec3::new(0.0, size / 2.0, 0.0), Vec3::splat(size / 2.0), colors::ROCK)],
            false,
        );
    }

    for i in 0..config.houses {
        let angle = i as f32 / config.houses.max(1) as f32 * TAU + 0.4;
        let at = Vec3::new(angle.cos() * 18.0, ISLAND_SURFACE_Y, angle.sin() * 18.0);
        // Door faces the campfire
        let yaw = crate::yaw_facing_away(-at.normalize_or_zero());
        spawn(
            &mut registry,
            Entity::new(EntityKind::House, Transform::at(at).with_yaw(yaw)).pickable(),
            &[
                piece(Vec3::new(0.0, 1.5, 0.0), Vec3::new(2.5, 1.5, 2.0), colors::WALL),
                piece(Vec3::new(0.0, 3.5, 0.0), Vec3::new(3.0, 0.5, 2.5), colors::ROOF),
            ],
            true,
        );
    }

    for _ in 0..config.fire_particles {
        let at = Vec3::new(
            rng.random::<f32>() - 0.5,
            rng.random_range(FIRE_SPAWN_Y..FIRE_CEILING_Y),
            rng.random::<f32>() - 0.5,
        );
        spawn(
            &mut registry,
            Entity::new(
                EntityKind::Fire(Rising {
                    velocity_y: FIRE_RISE_SPEED,
                    spawn_y: FIRE_SPAWN_Y,
                    ceiling: FIRE_CEILING_Y,
                }),
                Transform::at(at),
            )
            .pickable(),
            &[piece(Vec3::ZERO, Vec3::splat(0.5), colors::FIRE)],
            false,
        );
    }

    for _ in 0..config.smoke_puffs {
        let at = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(FIRE_CEILING_Y..40.0),
            rng.random_range(-1.0..1.0),
        );
        spawn(
            &mut registry,
            Entity::new(
                EntityKind::Smoke(Rising {
                    velocity_y: rng.random_range(1.5..3.0),
                    spawn_y: FIRE_CEILING_Y,
                    ceiling: 40.0,
                }),
                Transform::at(at),
            ),
            &[piece(Vec3::ZERO, Vec3::splat(0.8), colors::SMOKE)],
            false,
        );
    }

    for _ in 0..config.clouds {
        let at = Vec3::new(
            rng.random_range(-600.0..600.0),
            rng.random_range(120.0..170.0),
            rng.random_range(-600.0..600.0),
        );
        let size = Vec3::new(
            rng.random_range(30.0..70.0),
            rng.random_range(5.0..10.0),
            rng.random_range(20.0..40.0),
        );
        spawn(
            &mut registry,
            Entity::new(
                EntityKind::Cloud(Drift {
                    speed: rng.random_range(2.0..6.0),
                    span: 600.0,
                }),
                Transform::at(at),
            ),
            &[piece(Vec3::ZERO, size, colors::CLOUD)],
            false,
        );
    }

    for _ in 0..config.people {
        let center = island_spot(rng, 6.0, 20.0);
        spawn(
            &mut registry,
            Entity::new(
                EntityKind::Person(Walker {
                    center,
                    radius: rng.random_range(2.0..5.0),
                    phase: rng.random_range(0.0..TAU),
                    speed: rng.random_range(0.4..0.8),
                    limb_swing: 0.0,
                }),
                Transform::at(center),
            )
            .pickable(),
            &[
                piece(Vec3::new(0.0, 1.5, 0.0), Vec3::new(0.4, 0.5, 0.25), colors::CLOTH),
                piece(Vec3::new(0.0, 2.3, 0.0), Vec3::splat(0.25), colors::SKIN),
                Piece {
                    swing: Swing::Forward,
                    ..piece(Vec3::new(-0.55, 1.5, 0.0), Vec3::new(0.12, 0.45, 0.12), colors::SKIN)
                },
                Piece {
                    swing: Swing::Backward,
                    ..piece(Vec3::new(0.55, 1.5, 0.0), Vec3::new(0.12, 0.45, 0.12), colors::SKIN)
                },
                Piece {
                    swing: Swing::Backward,
                    ..piece(Vec3::new(-0.2, 0.5, 0.0), Vec3::new(0.15, 0.5, 0.15), colors::CLOTH)
                },
                Piece {
                    swing: Swing::Forward,
                    ..piece(Vec3::new(0.2, 0.5, 0.0), Vec3::new(0.15, 0.5, 0.15), colors::CLOTH)
                },
            ],
            false,
        );
    }

    for _ in 0..config.animals {
        let center = island_spot(rng, 8.0, 24.0);
        spawn(
            &mut registry,
            Entity::new(
                EntityKind::Animal(Walker {
                    center,
                    radius: rng.random_range(3.0..6.0),
                    phase: rng.random_range(0.0..TAU),
                    speed: rng.random_range(0.8..1.4),
                    limb_swing: 0.0,
                }),
                Transform::at(center),
            )
            .pickable(),
            &[
                piece(Vec3::new(0.0, 0.9, 0.0), Vec3::new(0.3, 0.3, 0.7), colors::FUR),
                piece(Vec3::new(0.0, 1.2, -0.85), Vec3::splat(0.22), colors::FUR),
                Piece {
                    swing: Swing::Forward,
                    ..piece(Vec3::new(-0.2, 0.3, -0.5), Vec3::new(0.08, 0.3, 0.08), colors::FUR)
                },
                Piece {
                    swing: Swing::Backward,
                    ..piece(Vec3::new(0.2, 0.3, -0.5), Vec3::new(0.08, 0.3, 0.08), colors::FUR)
                },
                Piece {
                    swing: Swing::Backward,
                    ..piece(Vec3::new(-0.2, 0.3, 0.5), Vec3::new(0.08, 0.3, 0.08), colors::FUR)
                },
                Piece {
                    swing: Swing::Forward,
                    ..piece(Vec3::new(0.2, 0.3, 0.5), Vec3::new(0.08, 0.3, 0.08), colors::FUR)
                },
            ],
            false,
        );
    }

    spawn(
        &mut registry,
        Entity::new(
            EntityKind::Boat(BoatState::player()),
            Transform::at(PLAYER_SPAWN).with_yaw(PLAYER_SPAWN_HEADING),
        )
        .pickable(),
        &boat_pieces(colors::PLAYER_HULL),
        false,
    );

    for (index, &(radius, speed)) in config.patrols.iter().enumerate() {
        let angle = index as f32 * 2.1;
        let center = Vec3::ZERO;
        let at = center + Vec3::new(angle.cos(), 0.0, angle.sin()) * radius;
        spawn(
            &mut registry,
            Entity::new(
                EntityKind::Boat(BoatState::patrol(Patrol {
                    center,
                    radius,
                    angle,
                    speed,
                    index: index as u32,
                })),
                Transform::at(at),
            )
            .pickable(),
            &boat_pieces(colors::NPC_HULL),
            false,
        );
    }

    let weather = Weather::new(rng, config.rain_drops, config.grass_blades);
    log::info!(
        "Built island world: {} entities, {} parts, {} rain drops",
        registry.len(),
        registry.parts().count(),
        weather.rain.len()
    );
    GameState::new(registry, weather, seed)
}

/// Hull, deck, mast and sail
fn boat_pieces(hull: [f32; 4]) -> [Piece; 4] {
    [
        piece(Vec3::ZERO, Vec3::new(1.5, 0.6, 4.0), hull),
        piece(Vec3::new(0.0, 0.7, 0.0), Vec3::new(1.3, 0.1, 3.6), colors::DECK),
        piece(Vec3::new(0.0, 3.5, 0.0), Vec3::new(0.12, 2.8, 0.12), colors::MAST),
        piece(Vec3::new(0.0, 4.0, 0.8), Vec3::new(0.05, 2.0, 0.8), colors::SAIL),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Category;
    use crate::sim::picking::{Ray, pick};
    use rand::SeedableRng;

    fn world(seed: u64) -> GameState {
        let mut rng = Pcg32::seed_from_u64(seed);
        build_world(&SceneConfig::small(), &mut rng, seed).unwrap()
    }

    #[test]
    fn test_world_has_one_player_and_no_coin_before_start() {
        let state = world(9);
        assert_eq!(state.registry.players().count(), 1);
        assert!(state.registry.coin().is_none());
        let config = SceneConfig::small();
        assert_eq!(
            state.registry.of_category(Category::Boat).count(),
            1 + config.patrols.len()
        );
        assert_eq!(state.registry.of_category(Category::Tree).count(), config.trees);
    }

    #[test]
    fn test_same_seed_same_island() {
        let a: Vec<_> = world(5).registry.all().map(|(_, e)| e.clone()).collect();
        let b: Vec<_> = world(5).registry.all().map(|(_, e)| e.clone()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_collision_volumes_on_scenery() {
        let state = world(11);
        for category in [Category::Island, Category::Tree, Category::House] {
            for (_, e) in state.registry.of_category(category) {
                assert!(e.collision.is_some(), "{category:?} missing collision");
            }
        }
    }

    #[test]
    fn test_every_part_has_registered_owner() {
        let state = world(13);
        for (part_id, part) in state.registry.parts() {
            assert_eq!(state.registry.owner_of(part_id), Some(part.owner));
        }
    }

    #[test]
    fn test_click_on_player_boat_mast_resolves_boat() {
        let state = world(17);
        let boat = state.player().unwrap().position();
        let ray = Ray::new(boat + Vec3::new(-30.0, 4.0, 0.0), Vec3::X);
        let hit = pick(&state.registry, &ray).unwrap();
        assert_eq!(hit.entity, state.player_id());
    }

    #[test]
    fn test_water_is_not_pickable() {
        let state = world(19);
        // Straight down into open sea far from everything
        let ray = Ray::new(Vec3::new(900.0, 50.0, 900.0), Vec3::NEG_Y);
        assert_eq!(pick(&state.registry, &ray), None);
    }
}

//! Ambient animation
//!
//! Decorative motion that has no gameplay effect: walkers, campfire and smoke
//! particles, drifting clouds, the spinning coin, rain and lightning.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{Entity, EntityKind};
use super::registry::EntityRegistry;
use super::wave::limb_swing;
use crate::consts::*;
use crate::yaw_facing_away;

/// Coin spin rate (radians/s)
const COIN_SPIN: f32 = 2.0;
/// Smoke puffs grow this much per second before resetting
const SMOKE_GROWTH: f32 = 0.4;

/// Storm state that is not an entity (the rain volume and the lights)
#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
    /// Rain drop positions
    pub rain: Vec<Vec3>,
    /// Lightning flash intensity
    pub thunder_flash: f32,
    /// Campfire light intensity
    pub fire_light: f32,
    /// Grass blade roots on the island top (sway is derived from time)
    pub grass: Vec<Vec3>,
}

impl Weather {
    /// Scatter rain and grass
    pub fn new(rng: &mut Pcg32, rain_drops: usize, grass_blades: usize) -> Self {
        let rain = (0..rain_drops)
            .map(|_| {
                Vec3::new(
                    rng.random_range(-RAIN_SPREAD..RAIN_SPREAD),
                    rng.random_range(0.0..RAIN_CEILING),
                    rng.random_range(-RAIN_SPREAD..RAIN_SPREAD),
                )
            })
            .collect();
        let grass = (0..grass_blades)
            .map(|_| {
                let angle = rng.random_range(0.0..std::f32::consts::TAU);
                let radius = rng.random_range(0.0..ISLAND_TOP_RADIUS - 3.0);
                Vec3::new(angle.cos() * radius, ISLAND_SURFACE_Y, angle.sin() * radius)
            })
            .collect();
        Self {
            rain,
            thunder_flash: 0.0,
            fire_light: FIRE_LIGHT_BASE,
            grass,
        }
    }

    /// Advance rain, lightning and firelight. Returns true on a lightning strike.
    pub fn update(&mut self, rng: &mut Pcg32, dt: f32) -> bool {
        for drop in &mut self.rain {
            drop.y -= RAIN_FALL_SPEED * dt;
            if drop.y < 0.0 {
                drop.y = RAIN_CEILING;
            }
        }

        self.fire_light = FIRE_LIGHT_BASE + rng.random::<f32>() * FIRE_LIGHT_FLICKER;

        if rng.random::<f32>() < THUNDER_CHANCE {
            self.thunder_flash = THUNDER_PEAK;
            true
        } else {
            self.thunder_flash *= THUNDER_DECAY;
            false
        }
    }
}

/// Advance every decorative entity by one tick. An entity with a corrupt
/// transform is skipped so it cannot stall the rest of the world.
pub fn animate(registry: &mut EntityRegistry, rng: &mut Pcg32, dt: f32) {
    for (id, entity) in registry.all_mut() {
        if !entity.transform.is_finite() {
            log::warn!("Skipping {:?}: non-finite transform", id);
            continue;
        }
        animate_entity(entity, rng, dt);
    }
}

fn animate_entity(entity: &mut Entity, rng: &mut Pcg32, dt: f32) {
    let transform = &mut entity.transform;
    match &mut entity.kind {
        EntityKind::Person(walker) | EntityKind::Animal(walker) => {
            walker.phase += walker.speed * dt;
            let (sin, cos) = walker.phase.sin_cos();
            let ground_y = transform.position.y;
            transform.position = walker.center + Vec3::new(cos, 0.0, sin) * walker.radius;
            transform.position.y = ground_y;
            let tangent = Vec3::new(-sin, 0.0, cos) * walker.speed.signum();
            transform.yaw = yaw_facing_away(tangent);
            walker.limb_swing = limb_swing(walker.phase);
        }
        EntityKind::Fire(particle) => {
            transform.position.y += particle.velocity_y * dt;
            if transform.position.y > particle.ceiling {
                transform.position.y = particle.spawn_y;
            }
            transform.scale = rng.random::<f32>();
        }
        EntityKind::Smoke(particle) => {
            transform.position.y += particle.velocity_y * dt;
            transform.scale += SMOKE_GROWTH * dt;
            if transform.position.y > particle.ceiling {
                transform.position.y = particle.spawn_y;
                transform.scale = 1.0;
            }
        }
        EntityKind::Cloud(drift) => {
            transform.position.x += drift.speed * dt;
            if transform.position.x > drift.span {
                transform.position.x = -drift.span;
            }
        }
        EntityKind::Coin => {
            transform.yaw = crate::normalize_angle(transform.yaw + COIN_SPIN * dt);
        }
        EntityKind::Island
        | EntityKind::Tree
        | EntityKind::Rock
        | EntityKind::House
        | EntityKind::Boat(_)
        | EntityKind::Water => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Rising, Transform, Walker};
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_rain_stays_in_volume() {
        let mut rng = rng();
        let mut weather = Weather::new(&mut rng, 200, 0);
        for _ in 0..600 {
            weather.update(&mut rng, SIM_DT);
            assert!(weather.rain.iter().all(|d| (0.0..=RAIN_CEILING).contains(&d.y)));
        }
    }

    #[test]
    fn test_thunder_decays_between_strikes() {
        let mut rng = rng();
        let mut weather = Weather::new(&mut rng, 0, 0);
        weather.thunder_flash = 100.0;
        let struck = weather.update(&mut rng, SIM_DT);
        if struck {
            assert_eq!(weather.thunder_flash, THUNDER_PEAK);
        } else {
            assert!((weather.thunder_flash - 95.0).abs() < 1e-3);
        }
        assert!(weather.fire_light >= FIRE_LIGHT_BASE);
        assert!(weather.fire_light < FIRE_LIGHT_BASE + FIRE_LIGHT_FLICKER);
    }

    #[test]
    fn test_thunder_eventually_strikes() {
        let mut rng = rng();
        let mut weather = Weather::new(&mut rng, 0, 0);
        let strikes = (0..5_000).filter(|_| weather.update(&mut rng, SIM_DT)).count();
        assert!(strikes > 0);
    }

    #[test]
    fn test_grass_roots_on_island_top() {
        let mut rng = rng();
        let weather = Weather::new(&mut rng, 0, 100);
        for blade in &weather.grass {
            assert_eq!(blade.y, ISLAND_SURFACE_Y);
            assert!(crate::horizontal_distance(*blade) < ISLAND_TOP_RADIUS);
        }
    }

    #[test]
    fn test_fire_particles_stay_in_column() {
        let mut rng = rng();
        let mut registry = EntityRegistry::new();
        for i in 0..10 {
            registry.register(Entity::new(
                EntityKind::Fire(Rising {
                    velocity_y: FIRE_RISE_SPEED,
                    spawn_y: FIRE_SPAWN_Y,
                    ceiling: FIRE_CEILING_Y,
                }),
                Transform::at(Vec3::new(0.0, FIRE_SPAWN_Y + i as f32 * 0.5, 0.0)),
            ));
        }
        for _ in 0..300 {
            animate(&mut registry, &mut rng, SIM_DT);
            for (_, e) in registry.all() {
                let y = e.transform.position.y;
                assert!((FIRE_SPAWN_Y..=FIRE_CEILING_Y).contains(&y), "y = {y}");
                assert!((0.0..1.0).contains(&e.transform.scale));
            }
        }
    }

    #[test]
    fn test_walker_circles_center() {
        let mut rng = rng();
        let mut registry = EntityRegistry::new();
        let center = Vec3::new(5.0, ISLAND_SURFACE_Y, -3.0);
        let id = registry.register(Entity::new(
            EntityKind::Person(Walker {
                center,
                radius: 4.0,
                phase: 0.0,
                speed: 1.0,
                limb_swing: 0.0,
            }),
            Transform::at(center),
        ));
        for _ in 0..120 {
            animate(&mut registry, &mut rng, SIM_DT);
        }
        let person = registry.get(id).unwrap();
        let offset = person.position() - center;
        assert!((offset.length() - 4.0).abs() < 1e-3);
        assert_eq!(person.position().y, ISLAND_SURFACE_Y);
        let EntityKind::Person(walker) = person.kind else {
            panic!("kind changed");
        };
        assert!((walker.phase - 120.0 * SIM_DT).abs() < 1e-4);
        assert_eq!(walker.limb_swing, limb_swing(walker.phase));
    }

    #[test]
    fn test_corrupt_entity_does_not_block_others() {
        let mut rng = rng();
        let mut registry = EntityRegistry::new();
        let mut broken = Transform::at(Vec3::ZERO);
        broken.position.y = f32::NAN;
        let rising = Rising {
            velocity_y: FIRE_RISE_SPEED,
            spawn_y: FIRE_SPAWN_Y,
            ceiling: FIRE_CEILING_Y,
        };
        registry.register(Entity::new(EntityKind::Fire(rising), broken));
        let healthy = registry.register(Entity::new(
            EntityKind::Fire(rising),
            Transform::at(Vec3::new(0.0, FIRE_SPAWN_Y, 0.0)),
        ));

        animate(&mut registry, &mut rng, SIM_DT);
        let y = registry.get(healthy).unwrap().position().y;
        assert!(y > FIRE_SPAWN_Y);
    }
}

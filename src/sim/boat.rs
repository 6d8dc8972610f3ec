//! Boat controller
//!
//! Player steering from held inputs, NPC circular patrols, and the floating
//! motion both share from the oscillator field.

use glam::Vec3;

use super::entity::{BoatRole, Entity, EntityKind, Transform};
use super::wave::{boat_pitch, boat_roll, float_height};
use crate::consts::*;
use crate::{facing, normalize_angle, yaw_facing_away};

/// Directional inputs held this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Helm {
    pub forward: bool,
    pub reverse: bool,
    pub left: bool,
    pub right: bool,
}

impl Helm {
    pub fn any(&self) -> bool {
        self.forward || self.reverse || self.left || self.right
    }
}

/// Place a hull on the wave surface at time `t` (height, pitch, roll)
pub fn float_on_waves(transform: &mut Transform, t: f32) {
    let p = transform.position;
    transform.position.y = float_height(BOAT_BUOYANCY, p.x, p.z, t);
    transform.pitch = boat_pitch(t);
    transform.roll = boat_roll(t);
}

/// Integrate the player boat for one tick. Turning is independent of
/// translation, and all four inputs compose.
pub fn steer_player(boat: &mut Entity, helm: Helm, t: f32, dt: f32) {
    let transform = &mut boat.transform;
    let before = transform.position;

    if helm.left {
        transform.yaw += BOAT_TURN_RATE * dt;
    }
    if helm.right {
        transform.yaw -= BOAT_TURN_RATE * dt;
    }
    transform.yaw = normalize_angle(transform.yaw);

    let facing = facing(transform.yaw);
    if helm.forward {
        transform.position -= facing * BOAT_SPEED * dt;
    }
    if helm.reverse {
        transform.position += facing * BOAT_SPEED * 0.5 * dt;
    }

    float_on_waves(transform, t);

    if let EntityKind::Boat(state) = &mut boat.kind {
        let moved = boat.transform.position - before;
        state.velocity = Vec3::new(moved.x, 0.0, moved.z) / dt;
    }
}

/// Put the player back on the spawn point
pub fn respawn_player(boat: &mut Entity, t: f32) {
    boat.transform.position = PLAYER_SPAWN;
    boat.transform.yaw = PLAYER_SPAWN_HEADING;
    float_on_waves(&mut boat.transform, t);
    if let EntityKind::Boat(state) = &mut boat.kind {
        state.velocity = Vec3::ZERO;
    }
}

/// Advance one NPC patrol boat. Returns false for non-patrol entities.
pub fn patrol(boat: &mut Entity, t: f32) -> bool {
    let EntityKind::Boat(state) = &mut boat.kind else {
        return false;
    };
    let BoatRole::Patrol(route) = &mut state.role else {
        return false;
    };

    route.angle = normalize_angle(route.angle + route.speed * SIM_DT);
    let (sin, cos) = route.angle.sin_cos();
    let before = boat.transform.position;
    let mut position = route.center + Vec3::new(cos, 0.0, sin) * route.radius;

    // Tangent in the direction of travel
    let tangent = Vec3::new(-sin, 0.0, cos) * route.speed.signum();
    let phase_t = t + route.index as f32;
    position.y = float_height(BOAT_BUOYANCY, position.x, position.z, phase_t);

    boat.transform.position = position;
    boat.transform.yaw = yaw_facing_away(tangent);
    boat.transform.pitch = boat_pitch(phase_t);
    boat.transform.roll = boat_roll(phase_t);
    state.velocity = (position - before) / SIM_DT;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::horizontal_distance;
    use crate::sim::entity::{BoatState, Patrol};
    use crate::sim::wave::wave_height;

    fn player() -> Entity {
        Entity::new(
            EntityKind::Boat(BoatState::player()),
            Transform::at(PLAYER_SPAWN).with_yaw(0.0),
        )
    }

    #[test]
    fn test_forward_moves_opposite_to_facing() {
        let mut boat = player();
        let helm = Helm {
            forward: true,
            ..Default::default()
        };
        steer_player(&mut boat, helm, 0.0, SIM_DT);
        // Facing +Z at yaw 0, so forward heads toward -Z
        let dz = boat.transform.position.z - PLAYER_SPAWN.z;
        assert!((dz + BOAT_SPEED * SIM_DT).abs() < 1e-4);
        assert!((boat.transform.position.x - PLAYER_SPAWN.x).abs() < 1e-6);
    }

    #[test]
    fn test_reverse_is_half_speed_along_facing() {
        let mut boat = player();
        let helm = Helm {
            reverse: true,
            ..Default::default()
        };
        steer_player(&mut boat, helm, 0.0, SIM_DT);
        let dz = boat.transform.position.z - PLAYER_SPAWN.z;
        assert!((dz - BOAT_SPEED * 0.5 * SIM_DT).abs() < 1e-4);
    }

    #[test]
    fn test_turning_does_not_translate() {
        let mut boat = player();
        let helm = Helm {
            left: true,
            ..Default::default()
        };
        steer_player(&mut boat, helm, 0.0, SIM_DT);
        assert!((boat.transform.yaw - BOAT_TURN_RATE * SIM_DT).abs() < 1e-6);
        assert_eq!(boat.transform.position.x, PLAYER_SPAWN.x);
        assert_eq!(boat.transform.position.z, PLAYER_SPAWN.z);
    }

    #[test]
    fn test_all_inputs_compose() {
        let mut boat = player();
        let helm = Helm {
            forward: true,
            reverse: true,
            left: true,
            right: true,
        };
        steer_player(&mut boat, helm, 0.0, SIM_DT);
        // Turns cancel; net motion is half speed forward
        assert!(boat.transform.yaw.abs() < 1e-6);
        let dz = boat.transform.position.z - PLAYER_SPAWN.z;
        assert!((dz + BOAT_SPEED * 0.5 * SIM_DT).abs() < 1e-4);
        assert!(matches!(boat.kind, EntityKind::Boat(s) if s.velocity.length() > 0.0));
    }

    #[test]
    fn test_player_height_matches_wave() {
        let mut boat = player();
        let t = 3.7;
        steer_player(&mut boat, Helm::default(), t, SIM_DT);
        let p = boat.transform.position;
        assert_eq!(p.y, BOAT_BUOYANCY + wave_height(p.x, p.z, t));
        assert_eq!(boat.transform.pitch, (2.0 * t).sin() * 0.05);
        assert_eq!(boat.transform.roll, (1.5 * t).cos() * 0.03);
    }

    #[test]
    fn test_patrol_stays_on_circle_and_faces_tangent() {
        let center = Vec3::new(50.0, 0.0, -30.0);
        let mut boat = Entity::new(
            EntityKind::Boat(BoatState::patrol(Patrol {
                center,
                radius: 80.0,
                angle: 0.0,
                speed: 0.3,
                index: 2,
            })),
            Transform::default(),
        );

        for tick in 0..500 {
            assert!(patrol(&mut boat, tick as f32 * SIM_DT));
            let offset = boat.transform.position - center;
            assert!((horizontal_distance(offset) - 80.0).abs() < 1e-2);
            // Forward direction is perpendicular to the radius
            let forward = -facing(boat.transform.yaw);
            assert!(forward.dot(offset.normalize()).abs() < 1e-3);
        }
    }

    #[test]
    fn test_patrol_bob_is_phase_offset_by_index() {
        let make = |index| {
            Entity::new(
                EntityKind::Boat(BoatState::patrol(Patrol {
                    center: Vec3::ZERO,
                    radius: 0.0,
                    angle: 0.0,
                    speed: 0.0,
                    index,
                })),
                Transform::default(),
            )
        };
        let (mut a, mut b) = (make(0), make(1));
        patrol(&mut a, 1.0);
        patrol(&mut b, 1.0);
        assert_eq!(a.transform.pitch, boat_pitch(1.0));
        assert_eq!(b.transform.pitch, boat_pitch(2.0));
    }

    #[test]
    fn test_patrol_ignores_player() {
        let mut boat = player();
        let before = boat.clone();
        assert!(!patrol(&mut boat, 1.0));
        assert_eq!(boat, before);
    }
}

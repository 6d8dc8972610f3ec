//! Ray picking
//!
//! Linear scan over pick candidates. A hit on any part resolves to the part's
//! recorded owner, so composite entities (hull, mast, sail) pick as a whole.

use std::collections::BTreeSet;

use glam::Vec3;

use super::entity::{Aabb, EntityId};
use super::registry::EntityRegistry;

/// A 3D ray with origin and direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Normalized
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray, normalizing the direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Get point at distance t along ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Slab test. Returns the smallest non-negative distance at which the ray
/// touches the box; a ray starting inside hits at its exit point. A ray
/// without a direction hits nothing.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    if ray.direction == Vec3::ZERO {
        return None;
    }
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let dir = ray.direction[axis];
        let (min, max) = (aabb.min[axis], aabb.max[axis]);

        if dir.abs() < 1e-8 {
            // Parallel to this slab: must already be inside it
            if origin < min || origin > max {
                return None;
            }
            continue;
        }

        let inv = 1.0 / dir;
        let mut t0 = (min - origin) * inv;
        let mut t1 = (max - origin) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    if t_far < 0.0 {
        None
    } else if t_near >= 0.0 {
        Some(t_near)
    } else {
        Some(t_far)
    }
}

/// A pick result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub entity: EntityId,
    pub distance: f32,
    pub point: Vec3,
}

/// Nearest pick candidate along the ray
pub fn pick(registry: &EntityRegistry, ray: &Ray) -> Option<PickHit> {
    let mut best: Option<PickHit> = None;
    let mut consider = |entity: EntityId, distance: f32| {
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(PickHit {
                entity,
                distance,
                point: ray.at(distance),
            });
        }
    };

    let mut with_parts = BTreeSet::new();
    for (_, part) in registry.parts() {
        let owner = part.owner;
        // Orphaned or non-candidate parts resolve to nothing
        if !registry.is_candidate(owner) {
            continue;
        }
        let Some(entity) = registry.get(owner) else {
            continue;
        };
        with_parts.insert(owner);
        if let Some(t) = ray_aabb(ray, &part.world_bounds(&entity.transform)) {
            consider(owner, t);
        }
    }

    // Candidates drawn without parts pick against their collision volume
    for id in registry.candidates() {
        if with_parts.contains(&id) {
            continue;
        }
        let Some(bounds) = registry.get(id).and_then(|e| e.collision) else {
            continue;
        };
        if let Some(t) = ray_aabb(ray, &bounds) {
            consider(id, t);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Entity, EntityKind, Part, Transform};

    fn boat_at(registry: &mut EntityRegistry, pos: Vec3) -> EntityId {
        let id = registry.register(
            Entity::new(
                EntityKind::Boat(crate::sim::entity::BoatState::player()),
                Transform::at(pos),
            )
            .pickable(),
        );
        // Hull and mast
        registry.add_part(Part::new(id, Vec3::ZERO, Vec3::new(2.0, 0.5, 4.0), [1.0; 4]));
        registry.add_part(Part::new(id, Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.1, 2.5, 0.1), [1.0; 4]));
        id
    }

    #[test]
    fn test_ray_aabb_hit_and_miss() {
        let aabb = Aabb::from_center(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!((ray_aabb(&ray, &aabb).unwrap() - 9.0).abs() < 1e-5);

        let away = Ray::new(Vec3::ZERO, Vec3::Z);
        assert_eq!(ray_aabb(&away, &aabb), None);

        let beside = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_Z);
        assert_eq!(ray_aabb(&beside, &aabb), None);
    }

    #[test]
    fn test_ray_from_inside_hits_exit() {
        let aabb = Aabb::from_center(Vec3::ZERO, Vec3::splat(2.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!((ray_aabb(&ray, &aabb).unwrap() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_ray_hits_nothing() {
        let aabb = Aabb::from_center(Vec3::ZERO, Vec3::splat(2.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::ZERO);
        assert_eq!(ray.direction, Vec3::ZERO);
        assert_eq!(ray_aabb(&ray, &aabb), None);

        let mut registry = EntityRegistry::new();
        boat_at(&mut registry, Vec3::ZERO);
        assert_eq!(pick(&registry, &ray), None);
    }

    #[test]
    fn test_pick_many_parts_resolves_each_owner() {
        let mut registry = EntityRegistry::new();
        let boats: Vec<_> = (0..20)
            .map(|i| boat_at(&mut registry, Vec3::new(i as f32 * 10.0, 0.0, 0.0)))
            .collect();
        for (i, boat) in boats.iter().enumerate() {
            let ray = Ray::new(Vec3::new(i as f32 * 10.0, 0.0, 30.0), Vec3::NEG_Z);
            assert_eq!(pick(&registry, &ray).map(|h| h.entity), Some(*boat));
        }
    }

    #[test]
    fn test_pick_nearest_of_two() {
        let mut registry = EntityRegistry::new();
        let far = boat_at(&mut registry, Vec3::new(0.0, 0.0, -50.0));
        let near = boat_at(&mut registry, Vec3::new(0.0, 0.0, -20.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);

        let hit = pick(&registry, &ray).unwrap();
        assert_eq!(hit.entity, near);
        assert_ne!(hit.entity, far);
        assert!((hit.distance - 26.0).abs() < 1e-4);
    }

    #[test]
    fn test_pick_sub_part_resolves_to_owner() {
        let mut registry = EntityRegistry::new();
        let boat = boat_at(&mut registry, Vec3::ZERO);
        // Horizontal ray through the mast only
        let ray = Ray::new(Vec3::new(-20.0, 4.0, 0.0), Vec3::X);
        assert_eq!(pick(&registry, &ray).map(|h| h.entity), Some(boat));
    }

    #[test]
    fn test_removed_entity_never_picked() {
        let mut registry = EntityRegistry::new();
        let boat = boat_at(&mut registry, Vec3::ZERO);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 30.0), Vec3::NEG_Z);
        assert!(pick(&registry, &ray).is_some());

        registry.select(boat);
        registry.remove(boat);
        assert_eq!(pick(&registry, &ray), None);
        assert_eq!(registry.selected(), None);
    }

    #[test]
    fn test_orphan_part_is_no_selection() {
        let mut registry = EntityRegistry::new();
        registry.add_part(Part::new(EntityId(7), Vec3::ZERO, Vec3::ONE, [1.0; 4]));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        assert_eq!(pick(&registry, &ray), None);
    }

    #[test]
    fn test_pick_on_empty_registry() {
        let registry = EntityRegistry::new();
        assert_eq!(pick(&registry, &Ray::new(Vec3::ZERO, Vec3::X)), None);
    }

    #[test]
    fn test_non_candidate_is_transparent() {
        let mut registry = EntityRegistry::new();
        let water = registry.register(Entity::new(EntityKind::Water, Transform::default()));
        registry.add_part(Part::new(water, Vec3::ZERO, Vec3::new(100.0, 0.1, 100.0), [0.0; 4]));
        let behind = boat_at(&mut registry, Vec3::new(0.0, -5.0, 0.0));
        let ray = Ray::new(Vec3::new(0.0, 20.0, 0.0), Vec3::NEG_Y);
        assert_eq!(pick(&registry, &ray).map(|h| h.entity), Some(behind));
    }

    #[test]
    fn test_collision_volume_used_without_parts() {
        let mut registry = EntityRegistry::new();
        let house = registry.register(
            Entity::new(EntityKind::House, Transform::at(Vec3::new(0.0, 0.0, -10.0)))
                .pickable()
                .with_collision(Aabb::from_center(Vec3::new(0.0, 0.0, -10.0), Vec3::splat(2.0))),
        );
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert_eq!(pick(&registry, &ray).map(|h| h.entity), Some(house));
    }
}

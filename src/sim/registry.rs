//! Entity registry
//!
//! Flat, insertion-ordered store of world entities plus the part arena and
//! the pick-candidate set. Removal here is the single authority on whether
//! an entity still exists: it drops the entity's parts and candidacy and
//! clears any selection pointing at it.

use std::collections::BTreeSet;

use super::entity::{Category, Entity, EntityId, EntityKind, Part, PartId};

#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    /// Sorted by id; ids are allocated monotonically so this is insertion order
    entities: Vec<(EntityId, Entity)>,
    parts: Vec<(PartId, Part)>,
    candidates: BTreeSet<EntityId>,
    selected: Option<EntityId>,
    next_entity: u32,
    next_part: u32,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            next_entity: 1,
            next_part: 1,
            ..Default::default()
        }
    }

    /// Append an entity; pickable entities join the candidate set
    pub fn register(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.next_entity.max(1));
        self.next_entity = id.0 + 1;
        if entity.pickable {
            self.candidates.insert(id);
        }
        self.entities.push((id, entity));
        id
    }

    /// Record a sub-part and its owner back-reference. The owner does not
    /// have to be registered; such a part simply never resolves.
    pub fn add_part(&mut self, part: Part) -> PartId {
        let id = PartId(self.next_part.max(1));
        self.next_part = id.0 + 1;
        self.parts.push((id, part));
        id
    }

    /// Remove an entity with its parts, candidacy and selection. Removing an
    /// absent entity is a no-op.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.index_of(id)?;
        let (_, entity) = self.entities.remove(index);
        self.parts.retain(|(_, part)| part.owner != id);
        self.candidates.remove(&id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::debug!("Removed {:?} ({})", id, entity.category().label());
        Some(entity)
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |(eid, _)| *eid).ok()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.entities[i].1)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index_of(id).map(move |i| &mut self.entities[i].1)
    }

    /// All entities in insertion order
    pub fn all(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().map(|(id, e)| (*id, e))
    }

    /// Mutable iteration in insertion order
    pub fn all_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut Entity)> {
        self.entities.iter_mut().map(|(id, e)| (*id, e))
    }

    /// Entities of one category in insertion order
    pub fn of_category(&self, category: Category) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.all().filter(move |(_, e)| e.category() == category)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Every player boat (the game requires exactly one)
    pub fn players(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.all().filter(|(_, e)| e.is_player())
    }

    /// The coin, while it has not been collected
    pub fn coin(&self) -> Option<(EntityId, &Entity)> {
        self.all().find(|(_, e)| matches!(e.kind, EntityKind::Coin))
    }

    pub fn is_candidate(&self, id: EntityId) -> bool {
        self.candidates.contains(&id)
    }

    pub fn candidates(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.candidates.iter().copied()
    }

    pub fn parts(&self) -> impl Iterator<Item = (PartId, &Part)> {
        self.parts.iter().map(|(id, p)| (*id, p))
    }

    /// Parts belonging to one entity
    pub fn parts_of(&self, owner: EntityId) -> impl Iterator<Item = &Part> {
        self.parts
            .iter()
            .filter(move |(_, p)| p.owner == owner)
            .map(|(_, p)| p)
    }

    /// Resolve a part to its registered owner (None for orphans)
    pub fn owner_of(&self, part: PartId) -> Option<EntityId> {
        let (_, p) = self.parts.iter().find(|(id, _)| *id == part)?;
        self.contains(p.owner).then_some(p.owner)
    }

    /// Select a registered entity; unknown ids are ignored
    pub fn select(&mut self, id: EntityId) -> bool {
        if self.contains(id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Transform;
    use glam::Vec3;

    fn rock(pickable: bool) -> Entity {
        let e = Entity::new(EntityKind::Rock, Transform::at(Vec3::ZERO));
        if pickable { e.pickable() } else { e }
    }

    #[test]
    fn test_register_preserves_insertion_order() {
        let mut registry = EntityRegistry::new();
        let a = registry.register(rock(false));
        let b = registry.register(Entity::new(EntityKind::Tree, Transform::default()));
        let c = registry.register(rock(true));

        let ids: Vec<_> = registry.all().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b, c]);
        let rocks: Vec<_> = registry.of_category(Category::Rock).map(|(id, _)| id).collect();
        assert_eq!(rocks, vec![a, c]);
        assert!(!registry.is_candidate(a));
        assert!(registry.is_candidate(c));
    }

    #[test]
    fn test_remove_clears_parts_candidacy_and_selection() {
        let mut registry = EntityRegistry::new();
        let id = registry.register(rock(true));
        let part = registry.add_part(Part::new(id, Vec3::ZERO, Vec3::ONE, [1.0; 4]));
        assert!(registry.select(id));
        assert_eq!(registry.owner_of(part), Some(id));

        assert!(registry.remove(id).is_some());
        assert!(!registry.contains(id));
        assert!(!registry.is_candidate(id));
        assert_eq!(registry.selected(), None);
        assert_eq!(registry.parts_of(id).count(), 0);
        assert_eq!(registry.owner_of(part), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = EntityRegistry::new();
        let id = registry.register(rock(true));
        let other = registry.register(rock(true));
        registry.select(other);

        assert!(registry.remove(id).is_some());
        assert!(registry.remove(id).is_none());
        assert_eq!(registry.len(), 1);
        // Unrelated selection survives
        assert_eq!(registry.selected(), Some(other));
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut registry = EntityRegistry::new();
        let a = registry.register(rock(false));
        registry.remove(a);
        let b = registry.register(rock(false));
        assert_ne!(a, b);
    }

    #[test]
    fn test_select_unknown_is_ignored() {
        let mut registry = EntityRegistry::new();
        assert!(!registry.select(EntityId(42)));
        assert_eq!(registry.selected(), None);
    }

    #[test]
    fn test_orphan_part_does_not_resolve() {
        let mut registry = EntityRegistry::new();
        let orphan = registry.add_part(Part::new(EntityId(99), Vec3::ZERO, Vec3::ONE, [1.0; 4]));
        assert_eq!(registry.owner_of(orphan), None);
    }
}

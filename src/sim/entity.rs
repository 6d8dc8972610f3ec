//! World entities
//!
//! Every interactive object is an `Entity` tagged with a closed `EntityKind`;
//! the category payload carries whatever mutable state that category needs.
//! Composite entities are drawn and picked through `Part`s, each of which
//! records its owner's id when it is created.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Stable entity handle (never reused within a session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Handle to a sub-part in the registry's part arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(pub u32);

/// Entity category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Island,
    Coin,
    Tree,
    Rock,
    House,
    Boat,
    Person,
    Animal,
    Fire,
    Smoke,
    Cloud,
    Water,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::Island,
        Category::Coin,
        Category::Tree,
        Category::Rock,
        Category::House,
        Category::Boat,
        Category::Person,
        Category::Animal,
        Category::Fire,
        Category::Smoke,
        Category::Cloud,
        Category::Water,
    ];

    /// Human-readable label shown when the entity is selected
    pub fn label(&self) -> &'static str {
        match self {
            Category::Island => "Emerald Island",
            Category::Coin => "Gold Coin",
            Category::Tree => "Palm Tree",
            Category::Rock => "Rock",
            Category::House => "Hut",
            Category::Boat => "Boat",
            Category::Person => "Islander",
            Category::Animal => "Animal",
            Category::Fire => "Campfire",
            Category::Smoke => "Smoke",
            Category::Cloud => "Storm Cloud",
            Category::Water => "Stormy Sea",
        }
    }
}

/// Position, orientation and uniform scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Rotation about Y (heading)
    pub yaw: f32,
    /// Rotation about X
    pub pitch: f32,
    /// Rotation about Z
    pub roll: f32,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, self.roll)
    }

    /// Local-to-world matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation(),
            self.position,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.yaw.is_finite()
            && self.pitch.is_finite()
            && self.roll.is_finite()
            && self.scale.is_finite()
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Containment test on the horizontal plane only
    pub fn contains_xz(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.z >= self.min.z && p.z <= self.max.z
    }
}

/// Patrol circle for an NPC boat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patrol {
    pub center: Vec3,
    pub radius: f32,
    /// Current angle on the circle (radians)
    pub angle: f32,
    /// Angular speed (radians/s, sign gives direction)
    pub speed: f32,
    /// Patrol index, used to desynchronize the bob
    pub index: u32,
}

/// Who steers a boat
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoatRole {
    Player,
    Patrol(Patrol),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoatState {
    pub role: BoatRole,
    /// Velocity over the last tick (units/s)
    pub velocity: Vec3,
}

impl BoatState {
    pub fn player() -> Self {
        Self {
            role: BoatRole::Player,
            velocity: Vec3::ZERO,
        }
    }

    pub fn patrol(patrol: Patrol) -> Self {
        Self {
            role: BoatRole::Patrol(patrol),
            velocity: Vec3::ZERO,
        }
    }
}

/// Circular walk for people and animals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Walker {
    pub center: Vec3,
    pub radius: f32,
    /// Walk phase (radians around the circle)
    pub phase: f32,
    /// Phase speed (radians/s)
    pub speed: f32,
    /// Current limb swing (radians), mirrored on alternate limbs
    pub limb_swing: f32,
}

/// A particle that rises and resets (fire, smoke)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rising {
    /// Vertical velocity (units/s)
    pub velocity_y: f32,
    pub spawn_y: f32,
    pub ceiling: f32,
}

/// Horizontal drift with wraparound (clouds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drift {
    /// Units/s along +X
    pub speed: f32,
    /// Wraps from +span back to -span
    pub span: f32,
}

/// Category tag plus per-category state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityKind {
    Island,
    Coin,
    Tree,
    Rock,
    House,
    Boat(BoatState),
    Person(Walker),
    Animal(Walker),
    Fire(Rising),
    Smoke(Rising),
    Cloud(Drift),
    Water,
}

impl EntityKind {
    pub fn category(&self) -> Category {
        match self {
            EntityKind::Island => Category::Island,
            EntityKind::Coin => Category::Coin,
            EntityKind::Tree => Category::Tree,
            EntityKind::Rock => Category::Rock,
            EntityKind::House => Category::House,
            EntityKind::Boat(_) => Category::Boat,
            EntityKind::Person(_) => Category::Person,
            EntityKind::Animal(_) => Category::Animal,
            EntityKind::Fire(_) => Category::Fire,
            EntityKind::Smoke(_) => Category::Smoke,
            EntityKind::Cloud(_) => Category::Cloud,
            EntityKind::Water => Category::Water,
        }
    }
}

/// A world object
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub transform: Transform,
    /// Eligible to be returned by picking
    pub pickable: bool,
    /// World bounds snapshot taken at creation (island, trees, houses, coin)
    pub collision: Option<Aabb>,
}

impl Entity {
    pub fn new(kind: EntityKind, transform: Transform) -> Self {
        Self {
            kind,
            transform,
            pickable: false,
            collision: None,
        }
    }

    pub fn pickable(mut self) -> Self {
        self.pickable = true;
        self
    }

    pub fn with_collision(mut self, bounds: Aabb) -> Self {
        self.collision = Some(bounds);
        self
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn is_player(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::Boat(BoatState {
                role: BoatRole::Player,
                ..
            })
        )
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }
}

/// Which way a jointed part swings with its walker's limb phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Swing {
    #[default]
    Rigid,
    Forward,
    Backward,
}

/// A rendered sub-part of a composite entity (hull, mast, sail, limb, ...)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Part {
    /// Owning entity, recorded at construction
    pub owner: EntityId,
    /// Box center in the owner's local space
    pub center: Vec3,
    pub half_extents: Vec3,
    pub color: [f32; 4],
    pub swing: Swing,
}

impl Part {
    pub fn new(owner: EntityId, center: Vec3, half_extents: Vec3, color: [f32; 4]) -> Self {
        Self {
            owner,
            center,
            half_extents,
            color,
            swing: Swing::Rigid,
        }
    }

    pub fn swinging(mut self, swing: Swing) -> Self {
        self.swing = swing;
        self
    }

    /// Conservative world bounds under the owner's transform (yaw and scale;
    /// the small wave pitch/roll is ignored)
    pub fn world_bounds(&self, transform: &Transform) -> Aabb {
        let (s, c) = transform.yaw.sin_cos();
        let local = self.center * transform.scale;
        let center = transform.position + Quat::from_rotation_y(transform.yaw) * local;
        let h = self.half_extents * transform.scale;
        let half = Vec3::new(
            c.abs() * h.x + s.abs() * h.z,
            h.y,
            s.abs() * h.x + c.abs() * h.z,
        );
        Aabb::from_center(center, half)
    }
}

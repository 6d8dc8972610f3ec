//! Game state and session transitions
//!
//! A single `GameState` owns the world, the session phase and the view
//! toggles. Input handlers and the tick both receive it explicitly.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::ambient::Weather;
use super::boat::{float_on_waves, respawn_player};
use super::entity::{Aabb, Entity, EntityId, EntityKind, Part, Transform};
use super::picking::{Ray, pick};
use super::registry::EntityRegistry;
use crate::consts::*;
use crate::error::WorldError;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Title screen, world animates behind it
    NotStarted,
    /// Active gameplay
    Playing,
    /// Frozen; the world is still drawn
    Paused,
    /// Made it home with the coin, waiting for restart
    Won,
}

/// What the player should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    Start,
    FindCoin,
    ReturnHome,
    Paused,
    Complete,
}

impl Objective {
    pub fn text(&self) -> &'static str {
        match self {
            Objective::Start => "Press Start to set sail",
            Objective::FindCoin => "Find the gold coin out at sea",
            Objective::ReturnHome => "Bring the coin back to the island",
            Objective::Paused => "Paused",
            Objective::Complete => "You made it home with the treasure!",
        }
    }
}

/// Things that happened during a tick or an input handler, drained by the
/// frame loop for audio and HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Started,
    Paused,
    Resumed,
    CoinCollected,
    Won,
    /// Reached the island without the coin; the run was reset
    RunFailed,
    Restarted,
    Selected(EntityId),
    Deselected,
    Thunder,
}

/// Coin colors
const COIN_GOLD: [f32; 4] = [1.0, 0.84, 0.0, 1.0];

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// World seed
    pub seed: u64,
    /// Ambient randomness (flicker, lightning)
    pub rng: Pcg32,
    pub registry: EntityRegistry,
    pub weather: Weather,
    pub phase: GamePhase,
    /// Carrying the coin
    pub has_item: bool,
    /// Simulation tick counter (frozen while paused)
    pub time_ticks: u64,
    /// The unique player boat
    player: EntityId,
    /// Water splash should be audible this tick
    pub splash_active: bool,
    /// Camera follows the player boat instead of orbiting the island
    pub camera_follow: bool,
    /// Daylight instead of the night storm
    pub daylight: bool,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Wrap a built world. The registry must hold exactly one player boat.
    pub fn new(registry: EntityRegistry, weather: Weather, seed: u64) -> Result<Self, WorldError> {
        let mut players = registry.players().map(|(id, _)| id);
        let player = players.next().ok_or(WorldError::MissingPlayer)?;
        let extra = players.count();
        if extra > 0 {
            return Err(WorldError::MultiplePlayers(extra + 1));
        }

        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed_57a7),
            registry,
            weather,
            phase: GamePhase::NotStarted,
            has_item: false,
            time_ticks: 0,
            player,
            splash_active: false,
            camera_follow: false,
            daylight: false,
            events: Vec::new(),
        })
    }

    /// Elapsed simulated time (seconds)
    pub fn elapsed(&self) -> f32 {
        self.time_ticks as f32 * SIM_DT
    }

    pub fn player_id(&self) -> EntityId {
        self.player
    }

    pub fn player(&self) -> Option<&Entity> {
        self.registry.get(self.player)
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.registry.get_mut(self.player)
    }

    pub fn objective(&self) -> Objective {
        match self.phase {
            GamePhase::NotStarted => Objective::Start,
            GamePhase::Paused => Objective::Paused,
            GamePhase::Won => Objective::Complete,
            GamePhase::Playing if self.has_item => Objective::ReturnHome,
            GamePhase::Playing => Objective::FindCoin,
        }
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// NotStarted -> Playing. Spawns the coin.
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::NotStarted {
            return false;
        }
        self.spawn_coin();
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::Started);
        log::info!("Session started (seed {})", self.seed);
        true
    }

    /// Playing -> Paused
    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.phase = GamePhase::Paused;
        self.splash_active = false;
        self.events.push(GameEvent::Paused);
        log::info!("Paused");
        true
    }

    /// Paused -> Playing
    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::Resumed);
        log::info!("Resumed");
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            GamePhase::Playing => self.pause(),
            GamePhase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Playing -> Won, only when home with the coin
    pub(crate) fn win(&mut self) -> bool {
        if self.phase != GamePhase::Playing || !self.has_item {
            return false;
        }
        self.phase = GamePhase::Won;
        self.splash_active = false;
        self.events.push(GameEvent::Won);
        log::info!("Won after {:.1}s", self.elapsed());
        true
    }

    /// Won -> Playing with a fresh run
    pub fn restart(&mut self) -> bool {
        if self.phase != GamePhase::Won {
            return false;
        }
        self.reset_run();
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::Restarted);
        log::info!("Restarted");
        true
    }

    /// Reset the run in place: spawn transform, no coin carried, coin back at
    /// sea. Shared by restart and the failure path.
    pub(crate) fn reset_run(&mut self) {
        let t = self.elapsed();
        if let Some(boat) = self.player_mut() {
            respawn_player(boat, t);
        }
        self.has_item = false;
        self.splash_active = false;
        if self.registry.coin().is_none() {
            self.spawn_coin();
        }
    }

    /// Register the coin with its pickup window as collision volume
    fn spawn_coin(&mut self) -> EntityId {
        if let Some((id, _)) = self.registry.coin() {
            return id;
        }
        let window = Aabb::from_center(
            COIN_SPAWN,
            glam::Vec3::new(COIN_PICKUP_HALF_WIDTH, 2.0, COIN_PICKUP_HALF_WIDTH),
        );
        let id = self.registry.register(
            Entity::new(EntityKind::Coin, Transform::at(COIN_SPAWN))
                .pickable()
                .with_collision(window),
        );
        self.registry.add_part(Part::new(
            id,
            glam::Vec3::ZERO,
            glam::Vec3::new(1.2, 1.2, 0.2),
            COIN_GOLD,
        ));
        log::debug!("Coin spawned as {:?}", id);
        id
    }

    /// If the player is inside the coin's window, collect it
    pub(crate) fn try_pickup(&mut self) -> bool {
        if self.has_item {
            return false;
        }
        let Some(boat) = self.player().map(|p| p.position()) else {
            return false;
        };
        let Some((coin_id, coin)) = self.registry.coin() else {
            return false;
        };
        let window = coin.collision.unwrap_or_else(|| {
            Aabb::from_center(
                coin.position(),
                glam::Vec3::new(COIN_PICKUP_HALF_WIDTH, 0.0, COIN_PICKUP_HALF_WIDTH),
            )
        });
        if !window.contains_xz(boat) {
            return false;
        }

        self.registry.remove(coin_id);
        self.has_item = true;
        self.events.push(GameEvent::CoinCollected);
        log::info!("Coin collected");
        true
    }

    /// Pointer click: select whatever is under the ray. Ignored unless playing.
    pub fn click(&mut self, ray: &Ray) -> Option<EntityId> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        match pick(&self.registry, ray) {
            Some(hit) => {
                self.registry.select(hit.entity);
                self.events.push(GameEvent::Selected(hit.entity));
                Some(hit.entity)
            }
            None => {
                if self.registry.selected().is_some() {
                    self.registry.deselect();
                    self.events.push(GameEvent::Deselected);
                }
                None
            }
        }
    }

    /// Label of the current selection
    pub fn selection_label(&self) -> Option<&'static str> {
        let id = self.registry.selected()?;
        self.registry.get(id).map(|e| e.category().label())
    }

    pub fn toggle_camera_follow(&mut self) {
        self.camera_follow = !self.camera_follow;
        log::info!("Camera follow: {}", self.camera_follow);
    }

    pub fn toggle_daylight(&mut self) {
        self.daylight = !self.daylight;
        log::info!("Daylight: {}", self.daylight);
    }

    /// Keep the player bobbing while the session is not being steered
    pub(crate) fn float_player(&mut self) {
        let t = self.elapsed();
        if let Some(boat) = self.player_mut() {
            float_on_waves(&mut boat.transform, t);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sim::entity::BoatState;

    /// Minimal world: the player boat at spawn
    pub(crate) fn small_world() -> GameState {
        let mut registry = EntityRegistry::new();
        registry.register(
            Entity::new(
                EntityKind::Boat(BoatState::player()),
                Transform::at(PLAYER_SPAWN),
            )
            .pickable(),
        );
        let mut rng = Pcg32::seed_from_u64(1);
        GameState::new(registry, Weather::new(&mut rng, 0, 0), 1).unwrap()
    }

    #[test]
    fn test_requires_exactly_one_player() {
        let mut rng = Pcg32::seed_from_u64(1);
        let empty = GameState::new(EntityRegistry::new(), Weather::new(&mut rng, 0, 0), 1);
        assert_eq!(empty.unwrap_err(), WorldError::MissingPlayer);

        let mut registry = EntityRegistry::new();
        for _ in 0..2 {
            registry.register(Entity::new(
                EntityKind::Boat(BoatState::player()),
                Transform::default(),
            ));
        }
        let twice = GameState::new(registry, Weather::new(&mut rng, 0, 0), 1);
        assert_eq!(twice.unwrap_err(), WorldError::MultiplePlayers(2));
    }

    #[test]
    fn test_start_only_from_not_started() {
        let mut state = small_world();
        assert_eq!(state.objective(), Objective::Start);
        assert!(state.registry.coin().is_none());

        assert!(state.start());
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.registry.coin().is_some());
        assert_eq!(state.objective(), Objective::FindCoin);
        assert!(!state.start());
        assert_eq!(state.drain_events(), vec![GameEvent::Started]);
    }

    #[test]
    fn test_invalid_transitions_are_ignored() {
        let mut state = small_world();
        assert!(!state.pause());
        assert!(!state.resume());
        assert!(!state.toggle_pause());
        assert!(!state.restart());
        assert!(!state.win());
        assert_eq!(state.phase, GamePhase::NotStarted);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_pause_resume_round_trip() {
        let mut state = small_world();
        state.start();
        assert!(state.toggle_pause());
        assert_eq!(state.phase, GamePhase::Paused);
        assert_eq!(state.objective(), Objective::Paused);
        assert!(state.toggle_pause());
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_win_requires_item() {
        let mut state = small_world();
        state.start();
        assert!(!state.win());
        state.has_item = true;
        assert!(state.win());
        assert_eq!(state.phase, GamePhase::Won);
        assert_eq!(state.objective(), Objective::Complete);
    }

    #[test]
    fn test_restart_resets_run_and_respawns_coin() {
        let mut state = small_world();
        state.start();
        let coin = state.registry.coin().unwrap().0;
        state.registry.remove(coin);
        state.has_item = true;
        state.player_mut().unwrap().transform.position = glam::Vec3::new(10.0, 0.0, 10.0);
        state.win();

        assert!(state.restart());
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.has_item);
        let respawned = state.registry.coin().unwrap().0;
        assert_ne!(respawned, coin);
        let boat = state.player().unwrap().transform;
        assert_eq!(boat.position.x, PLAYER_SPAWN.x);
        assert_eq!(boat.position.z, PLAYER_SPAWN.z);
        assert_eq!(boat.yaw, PLAYER_SPAWN_HEADING);
    }

    #[test]
    fn test_pickup_window_edges() {
        let mut state = small_world();
        state.start();
        let coin = state.registry.coin().unwrap().1.position();

        state.player_mut().unwrap().transform.position = coin + glam::Vec3::new(5.5, 0.0, 0.0);
        assert!(!state.try_pickup());

        state.player_mut().unwrap().transform.position = coin + glam::Vec3::new(4.9, 0.0, -4.9);
        assert!(state.try_pickup());
        assert!(state.has_item);
        assert!(state.registry.coin().is_none());
        assert!(!state.try_pickup());
    }

    #[test]
    fn test_click_ignored_unless_playing() {
        let mut state = small_world();
        let ray = Ray::new(glam::Vec3::new(0.0, 50.0, PLAYER_SPAWN.z), glam::Vec3::NEG_Y);
        assert_eq!(state.click(&ray), None);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_click_selects_and_miss_deselects() {
        let mut state = small_world();
        state.start();
        state.drain_events();
        let coin = state.registry.coin().unwrap().0;
        let down = Ray::new(COIN_SPAWN + glam::Vec3::new(0.0, 50.0, 0.0), glam::Vec3::NEG_Y);
        assert_eq!(state.click(&down), Some(coin));
        assert_eq!(state.selection_label(), Some("Gold Coin"));

        let sky = Ray::new(glam::Vec3::new(0.0, 50.0, 0.0), glam::Vec3::Y);
        assert_eq!(state.click(&sky), None);
        assert_eq!(state.selection_label(), None);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::Selected(coin), GameEvent::Deselected]
        );
    }

    #[test]
    fn test_view_toggles_work_in_any_phase() {
        let mut state = small_world();
        state.toggle_camera_follow();
        state.toggle_daylight();
        assert!(state.camera_follow);
        assert!(state.daylight);
    }
}

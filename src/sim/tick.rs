//! Fixed timestep simulation tick
//!
//! Core game loop that advances the session deterministically.

use super::ambient;
use super::boat::{Helm, patrol, steer_player};
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;
use crate::horizontal_distance;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held movement keys
    pub helm: Helm,
    /// Start the session (or restart after a win)
    pub start: bool,
    /// Pause toggle
    pub pause: bool,
    /// Camera follow toggle
    pub toggle_camera: bool,
    /// Day/night toggle
    pub toggle_daylight: bool,
}

impl TickInput {
    /// Forget one-shot commands once a substep has consumed them
    pub fn clear_one_shots(&mut self) {
        self.start = false;
        self.pause = false;
        self.toggle_camera = false;
        self.toggle_daylight = false;
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // View toggles apply in every phase
    if input.toggle_camera {
        state.toggle_camera_follow();
    }
    if input.toggle_daylight {
        state.toggle_daylight();
    }

    if input.start {
        match state.phase {
            GamePhase::NotStarted => {
                state.start();
            }
            GamePhase::Won => {
                state.restart();
            }
            _ => {}
        }
    }

    if input.pause {
        state.toggle_pause();
    }

    // Paused: nothing moves, not even the clock
    if state.phase == GamePhase::Paused {
        state.splash_active = false;
        return;
    }

    state.time_ticks += 1;
    let t = state.elapsed();

    match state.phase {
        GamePhase::Playing => update_player(state, input.helm, t, dt),
        GamePhase::NotStarted | GamePhase::Won => {
            state.splash_active = false;
            state.float_player();
        }
        GamePhase::Paused => {}
    }

    for (_, entity) in state.registry.all_mut() {
        patrol(entity, t);
    }

    ambient::animate(&mut state.registry, &mut state.rng, dt);
    if state.weather.update(&mut state.rng, dt) {
        state.events.push(GameEvent::Thunder);
    }
}

/// Steer, then check the coin and the island
fn update_player(state: &mut GameState, helm: Helm, t: f32, dt: f32) {
    state.splash_active = helm.any();

    let Some(boat) = state.player_mut() else {
        log::warn!("Player boat missing from registry");
        return;
    };
    steer_player(boat, helm, t, dt);
    let position = boat.position();

    state.try_pickup();

    if horizontal_distance(position) < GOAL_RADIUS {
        if state.has_item {
            state.win();
        } else {
            log::info!("Reached the island without the coin, resetting run");
            state.reset_run();
            state.events.push(GameEvent::RunFailed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Entity;
    use crate::sim::state::tests::small_world;
    use crate::sim::scene::{SceneConfig, build_world};
    use glam::Vec3;
    use proptest::prelude::*;

    fn forward() -> TickInput {
        TickInput {
            helm: Helm {
                forward: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn started() -> GameState {
        let mut state = small_world();
        tick(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(state.phase, GamePhase::Playing);
        state.drain_events();
        state
    }

    fn place_player(state: &mut GameState, pos: Vec3) {
        state.player_mut().unwrap().transform.position = pos;
    }

    /// Drained events without the random lightning strikes
    fn gameplay_events(state: &mut GameState) -> Vec<GameEvent> {
        state
            .drain_events()
            .into_iter()
            .filter(|e| *e != GameEvent::Thunder)
            .collect()
    }

    fn snapshot(state: &GameState) -> Vec<Entity> {
        state.registry.all().map(|(_, e)| e.clone()).collect()
    }

    #[test]
    fn test_tick_start_to_playing() {
        let mut state = small_world();
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::NotStarted);

        // Movement keys do nothing before the start
        let before = state.player().unwrap().position();
        tick(&mut state, &forward(), SIM_DT);
        assert_eq!(state.player().unwrap().position().z, before.z);

        tick(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_coin_pickup_once() {
        let mut state = started();
        let coin = state.registry.coin().unwrap().1.position();
        place_player(&mut state, coin + Vec3::new(3.0, 0.0, -4.0));

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.has_item);
        assert!(state.registry.coin().is_none());
        assert_eq!(gameplay_events(&mut state), vec![GameEvent::CoinCollected]);

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(gameplay_events(&mut state).is_empty());
    }

    #[test]
    fn test_win_at_island_with_coin() {
        let mut state = started();
        state.has_item = true;
        let coin = state.registry.coin().unwrap().0;
        state.registry.remove(coin);
        place_player(&mut state, Vec3::new(0.0, 0.0, 40.0));

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Won);

        // Player input is inert until restart
        let frozen = state.player().unwrap().position();
        for _ in 0..30 {
            tick(&mut state, &forward(), SIM_DT);
        }
        let now = state.player().unwrap().position();
        assert_eq!((now.x, now.z), (frozen.x, frozen.z));
        assert_eq!(state.phase, GamePhase::Won);
        assert!(!state.splash_active);

        tick(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.has_item);
        assert!(state.registry.coin().is_some());
    }

    #[test]
    fn test_island_without_coin_resets_run() {
        let mut state = started();
        place_player(&mut state, Vec3::new(40.0 * 0.6, 0.0, 40.0 * 0.8));
        state.player_mut().unwrap().transform.yaw = 1.0;

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.has_item);
        let boat = state.player().unwrap().transform;
        assert_eq!((boat.position.x, boat.position.z), (PLAYER_SPAWN.x, PLAYER_SPAWN.z));
        assert_eq!(boat.yaw, PLAYER_SPAWN_HEADING);
        assert!(state.registry.coin().is_some());
        assert_eq!(gameplay_events(&mut state), vec![GameEvent::RunFailed]);
    }

    #[test]
    fn test_splash_follows_helm() {
        let mut state = started();
        tick(&mut state, &forward(), SIM_DT);
        assert!(state.splash_active);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(!state.splash_active);
    }

    #[test]
    fn test_toggles_apply_while_paused() {
        let mut state = started();
        state.pause();
        tick(
            &mut state,
            &TickInput {
                toggle_camera: true,
                toggle_daylight: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert!(state.camera_follow);
        assert!(state.daylight);
        assert_eq!(state.phase, GamePhase::Paused);
    }

    #[test]
    fn test_pause_freezes_full_world() {
        let mut rng = <rand_pcg::Pcg32 as rand::SeedableRng>::seed_from_u64(3);
        let mut state = build_world(&SceneConfig::small(), &mut rng, 3).unwrap();
        state.start();
        for _ in 0..10 {
            tick(&mut state, &forward(), SIM_DT);
        }
        tick(
            &mut state,
            &TickInput {
                pause: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(state.phase, GamePhase::Paused);

        let entities = snapshot(&state);
        let weather = state.weather.clone();
        let ticks = state.time_ticks;
        for _ in 0..120 {
            tick(&mut state, &forward(), SIM_DT);
        }
        assert_eq!(snapshot(&state), entities);
        assert_eq!(state.weather, weather);
        assert_eq!(state.time_ticks, ticks);
    }

    proptest! {
        #[test]
        fn test_paused_ticks_never_move_entities(
            warmup in 0usize..40,
            paused_ticks in 1usize..60,
            forward_held in any::<bool>(),
            left_held in any::<bool>(),
        ) {
            let mut state = started();
            for _ in 0..warmup {
                tick(&mut state, &forward(), SIM_DT);
            }
            state.pause();
            let entities = snapshot(&state);
            let input = TickInput {
                helm: Helm { forward: forward_held, left: left_held, ..Default::default() },
                ..Default::default()
            };
            for _ in 0..paused_ticks {
                tick(&mut state, &input, SIM_DT);
            }
            prop_assert_eq!(snapshot(&state), entities);
        }
    }

    #[test]
    fn test_full_voyage() {
        // Sail from spawn to the coin and home again using only the helm
        let mut state = started();
        let steer_to = |state: &mut GameState, target: Vec3| {
            let boat = state.player().unwrap().position();
            let dir = Vec3::new(target.x - boat.x, 0.0, target.z - boat.z).normalize();
            state.player_mut().unwrap().transform.yaw = crate::yaw_facing_away(dir);
        };

        for _ in 0..2_000 {
            if state.has_item {
                break;
            }
            steer_to(&mut state, COIN_SPAWN);
            tick(&mut state, &forward(), SIM_DT);
        }
        assert!(state.has_item);

        for _ in 0..2_000 {
            if state.phase == GamePhase::Won {
                break;
            }
            steer_to(&mut state, Vec3::ZERO);
            tick(&mut state, &forward(), SIM_DT);
        }
        assert_eq!(state.phase, GamePhase::Won);
    }
}

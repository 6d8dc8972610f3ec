//! Island Storm entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent};

    use island_storm::audio::web::WebAudio;
    use island_storm::audio::{AudioSystem, SoundEffect, TrackStatus};
    use island_storm::consts::*;
    use island_storm::platform::{KeyState, PointerDrag};
    use island_storm::renderer::RenderState;
    use island_storm::sim::{
        GameEvent, GamePhase, GameState, SceneConfig, build_world, tick,
    };
    use island_storm::{Camera, Settings};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Game instance holding all state
    struct Game {
        state: GameState,
        camera: Camera,
        render_state: Option<RenderState>,
        /// Created on the first user gesture
        audio: Option<AudioSystem<WebAudio>>,
        settings: Settings,
        keys: KeyState,
        /// Left-button drag orbiting the camera
        drag: PointerDrag,
        accumulator: f32,
        last_time: f64,
        canvas: HtmlCanvasElement,
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    impl Game {
        /// Create the audio context; must run inside a gesture handler
        fn ensure_audio(&mut self) {
            if self.audio.is_none() {
                match WebAudio::new() {
                    Ok(backend) => self.audio = Some(AudioSystem::new(backend, &self.settings)),
                    Err(e) => log::warn!("Audio disabled: {}", e),
                }
            }
            let Some(audio) = &mut self.audio else {
                return;
            };
            audio.resume();
            // Started has already been handled; finish or retry setup here
            if self.state.phase != GamePhase::NotStarted {
                if let Err(e) = audio.initialize() {
                    log::warn!("Audio initialization failed: {}", e);
                }
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.keys.tick_input();
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.keys.clear_one_shots();
            }

            if self.keys.take_mute_toggle() {
                self.settings.muted = !self.settings.muted;
                self.settings.save();
                if let Some(audio) = &mut self.audio {
                    audio.apply_settings(&self.settings);
                }
                log::info!("Muted: {}", self.settings.muted);
            }

            for event in self.state.drain_events() {
                self.handle_event(event);
            }

            if let Some(audio) = &mut self.audio {
                audio.set_splash_active(
                    self.state.splash_active && self.state.phase == GamePhase::Playing,
                );
                audio.poll();
            }

            self.camera.update(&self.state);
        }

        fn handle_event(&mut self, event: GameEvent) {
            log::debug!("Event: {:?}", event);
            let effect = match event {
                GameEvent::Started => {
                    if let Some(audio) = &mut self.audio {
                        if let Err(e) = audio.initialize() {
                            log::warn!("Audio initialization failed: {}", e);
                        }
                    }
                    Some(SoundEffect::Start)
                }
                GameEvent::Restarted => Some(SoundEffect::Start),
                GameEvent::CoinCollected => Some(SoundEffect::CoinChime),
                GameEvent::Won => Some(SoundEffect::WinFanfare),
                GameEvent::RunFailed => Some(SoundEffect::Failure),
                GameEvent::Selected(_) => Some(SoundEffect::SelectTick),
                GameEvent::Thunder => Some(SoundEffect::ThunderRumble),
                GameEvent::Paused | GameEvent::Resumed | GameEvent::Deselected => None,
            };
            if let (Some(effect), Some(audio)) = (effect, &mut self.audio) {
                audio.play(effect);
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.state, &self.camera, self.settings.reduced_motion) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = document() else {
                return;
            };

            set_text(&document, "objective", self.state.objective().text());
            let selection = self
                .state
                .selection_label()
                .map(|label| format!("Selected: {label}"))
                .unwrap_or_default();
            set_text(&document, "selection", &selection);

            let status = self
                .audio
                .as_ref()
                .map(|a| a.track_status())
                .unwrap_or(TrackStatus::Idle);
            let status = if self.settings.muted {
                "Audio: muted (M)"
            } else {
                status.label()
            };
            set_text(&document, "audio-status", status);

            let phase = self.state.phase;
            set_hidden(&document, "start-screen", phase != GamePhase::NotStarted);
            set_hidden(&document, "pause-overlay", phase != GamePhase::Paused);
            set_hidden(&document, "win-screen", phase != GamePhase::Won);
        }

        fn fit_canvas(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let width = (self.canvas.client_width() as f64 * dpr) as u32;
            let height = (self.canvas.client_height() as f64 * dpr) as u32;
            if width == 0 || height == 0 {
                return;
            }
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.camera.resize(width, height);
            if let Some(render_state) = &mut self.render_state {
                render_state.resize(width, height);
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Island Storm starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element");
            return;
        };

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        let seed = settings.seed.unwrap_or(js_sys::Date::now() as u64);
        let mut rng = Pcg32::seed_from_u64(seed);
        let state = match build_world(&SceneConfig::from_settings(&settings), &mut rng, seed) {
            Ok(state) => state,
            Err(e) => {
                log::error!("World construction failed: {}", e);
                return;
            }
        };
        log::info!("World built with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            state,
            camera: Camera::new(width, height),
            render_state: None,
            audio: None,
            settings,
            keys: KeyState::default(),
            drag: PointerDrag::default(),
            accumulator: 0.0,
            last_time: 0.0,
            canvas: canvas.clone(),
        }));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => {
                let adapter = instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::HighPerformance,
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await;
                match adapter {
                    Ok(adapter) => {
                        log::info!("Using adapter: {:?}", adapter.get_info().name);
                        match RenderState::new(surface, &adapter, width, height).await {
                            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
                            Err(e) => log::error!("Failed to create device: {}", e),
                        }
                    }
                    Err(e) => log::error!("Failed to get adapter: {}", e),
                }
            }
            Err(e) => log::error!("Failed to create surface: {}", e),
        }

        // Set up input handlers
        setup_input_handlers(&canvas, game.clone());

        // Set up start/restart buttons
        setup_buttons(&document, game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Island Storm running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                if g.keys.key_down(&key, event.repeat()) {
                    event.prevent_default();
                    if matches!(key.as_str(), "Enter" | " ") {
                        g.ensure_audio();
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().keys.key_up(&event.key()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur: key-ups will never arrive
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.keys.release_all();
                g.drag.release();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().fit_canvas();
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse drag - orbit the overview camera
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if event.button() == 0 {
                    game.borrow_mut()
                        .drag
                        .press(event.client_x() as f32, event.client_y() as f32);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if let Some((dx, dy)) = g.drag.moved(event.client_x() as f32, event.client_y() as f32) {
                    g.camera.drag(dx, dy);
                }
            });
            let _ = window
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().drag.release();
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse wheel - zoom the overview camera
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: WheelEvent| {
                event.prevent_default();
                game.borrow_mut().camera.zoom(event.delta_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse click - pick whatever is under the pointer
        {
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if !g.drag.was_click() {
                    return;
                }
                let w = canvas_clone.client_width() as f32;
                let h = canvas_clone.client_height() as f32;
                let ray = g
                    .camera
                    .screen_to_ray(event.offset_x() as f32, event.offset_y() as f32, w, h);
                if let Some(id) = g.state.click(&ray) {
                    log::debug!("Clicked {:?}", id);
                }
            });
            let _ = canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        for id in ["start-btn", "restart-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    let mut g = game.borrow_mut();
                    g.ensure_audio();
                    g.keys.press_start();
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Island Storm (native) starting...");
    log::info!("The browser build renders the game; running a headless voyage instead");

    match native::voyage(7, 6_000) {
        Ok(outcome) => println!("{outcome}"),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use island_storm::audio::{AudioSystem, SilentAudio, SoundEffect};
    use island_storm::consts::*;
    use island_storm::sim::{
        GameEvent, GamePhase, Helm, SceneConfig, TickInput, build_world, tick,
    };
    use island_storm::{Settings, WorldError, normalize_angle, yaw_facing_away};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Heading error tolerated before the autopilot turns (radians)
    const HEADING_SLACK: f32 = 0.05;

    /// Sail to the coin and back with only helm inputs
    pub fn voyage(seed: u64, max_ticks: u32) -> Result<String, WorldError> {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut state = build_world(&SceneConfig::small(), &mut rng, seed)?;
        let mut audio = AudioSystem::new(SilentAudio, &settings);

        let mut input = TickInput {
            start: true,
            ..Default::default()
        };
        let mut thunder = 0;
        for _ in 0..max_ticks {
            tick(&mut state, &input, SIM_DT);
            input.clear_one_shots();

            for event in state.drain_events() {
                match event {
                    GameEvent::Started => {
                        if let Err(e) = audio.initialize() {
                            log::warn!("Audio initialization failed: {}", e);
                        }
                    }
                    GameEvent::CoinCollected => {
                        log::info!("Coin collected at t={:.1}s", state.elapsed());
                        audio.play(SoundEffect::CoinChime);
                    }
                    GameEvent::Won => audio.play(SoundEffect::WinFanfare),
                    GameEvent::Thunder => thunder += 1,
                    _ => {}
                }
            }
            audio.set_splash_active(state.splash_active);
            audio.poll();

            if state.phase == GamePhase::Won {
                break;
            }

            let (Some(boat), target) = (
                state.player(),
                if state.has_item { glam::Vec3::ZERO } else { COIN_SPAWN },
            ) else {
                return Err(WorldError::MissingPlayer);
            };
            let to_target = target - boat.position();
            let desired = yaw_facing_away(glam::Vec3::new(to_target.x, 0.0, to_target.z));
            let error = normalize_angle(desired - boat.transform.yaw);
            input.helm = Helm {
                forward: true,
                reverse: false,
                left: error > HEADING_SLACK,
                right: error < -HEADING_SLACK,
            };
        }

        Ok(format!(
            "{} after {:.1}s of sailing ({} lightning strikes, ambient: {})",
            state.objective().text(),
            state.elapsed(),
            thunder,
            audio.track_status().label()
        ))
    }
}

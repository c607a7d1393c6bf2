//! Pocket Platformer entry point
//!
//! Handles platform-specific initialization and runs the game loop. The
//! browser build renders with WebGPU; the native build runs the demo autopilot
//! headless and logs what happens.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use pocket_platformer::consts::*;
    use pocket_platformer::renderer::{RenderState, build_scene};
    use pocket_platformer::sim::{GamePhase, GameState, TickInput, tick};
    use pocket_platformer::{HighScores, Settings, Tuning, ui};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        settings: Settings,
        high_scores: HighScores,
        render_state: Option<RenderState>,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        // Track phase to record high scores once per finished session
        last_phase: GamePhase,
        /// Cleared by the quit key; the frame loop stops
        running: bool,
    }

    impl Game {
        fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
            let mut state = GameState::new(seed, tuning);
            if settings.skip_intro {
                state.load_level(1, 1);
            }
            Self {
                last_phase: state.phase,
                state,
                settings,
                high_scores: HighScores::load(),
                render_state: None,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                running: true,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.jump = false;
                self.input.spin_jump = false;
                self.input.fire = false;
                self.input.restart = false;
                self.input.start = false;

                self.record_finished_session();
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Calculate FPS from oldest to newest frame
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Enter the leaderboard when a session ends
        fn record_finished_session(&mut self) {
            let phase = self.state.phase;
            if phase.is_terminal() && !self.last_phase.is_terminal() {
                let player = &self.state.player;
                if let Some(rank) = self.high_scores.add_score(
                    player.score,
                    self.state.world_number,
                    self.state.level_number,
                    js_sys::Date::now(),
                ) {
                    log::info!("New high score #{}: {}", rank, player.score);
                    self.high_scores.save();
                }
            }
            self.last_phase = phase;
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                let vertices = build_scene(&self.state, &self.settings);
                match render_state.render(&vertices) {
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
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            let items = ui::hud_items(&self.state);
            for item in &items {
                let selector = format!("#hud-{} .hud-value", item.id);
                if let Some(el) = document.query_selector(&selector).ok().flatten() {
                    el.set_text_content(Some(&item.value));
                }
            }

            // Boss readout only exists in the arena
            if let Some(el) = document.get_element_by_id("hud-boss") {
                let shown = items.iter().any(|i| i.id == "boss");
                let _ = el.set_attribute("class", if shown { "hud-item" } else { "hud-item hidden" });
            }

            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.settings.show_fps {
                    let _ = el.set_attribute("class", "hud-item");
                    if let Some(val) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                        val.set_text_content(Some(&self.fps.to_string()));
                    }
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }

            // Full-screen overlay (intro cards, level clear, game over, victory)
            if let Some(el) = document.get_element_by_id("overlay") {
                match ui::overlay(&self.state) {
                    Some(overlay) => {
                        let _ = el.set_attribute("class", "");
                        if let Some(t) = document.get_element_by_id("overlay-title") {
                            t.set_text_content(Some(&overlay.title));
                        }
                        if let Some(t) = document.get_element_by_id("overlay-subtitle") {
                            t.set_text_content(Some(&overlay.subtitle));
                        }
                        if let Some(t) = document.get_element_by_id("overlay-prompt") {
                            t.set_text_content(Some(overlay.prompt.as_deref().unwrap_or("")));
                        }
                    }
                    None => {
                        let _ = el.set_attribute("class", "hidden");
                    }
                }
            }

            if let Some(el) = document.get_element_by_id("best-score") {
                let best = self.high_scores.top_score().unwrap_or(0);
                el.set_text_content(Some(&best.to_string()));
            }
        }

        /// Release held keys (focus lost, tab hidden)
        fn release_held_keys(&mut self) {
            self.input.left = false;
            self.input.right = false;
            self.input.crouch = false;
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Pocket Platformer starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(
            seed,
            Tuning::load(),
            Settings::load(),
        )));

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .expect("Failed to create device");
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(game.clone());
        setup_focus_handlers(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Pocket Platformer running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        // Key down: held directions plus one-shot actions
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                let repeat = event.repeat();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.input.left = true,
                    "ArrowRight" | "d" | "D" => g.input.right = true,
                    "ArrowDown" | "s" | "S" => g.input.crouch = true,
                    " " | "ArrowUp" | "w" | "W" if !repeat => g.input.jump = true,
                    "Shift" if !repeat => g.input.spin_jump = true,
                    "z" | "Z" if !repeat => g.input.fire = true,
                    "r" | "R" if !repeat => g.input.restart = true,
                    "Enter" if !repeat => g.input.start = true,
                    "Escape" => {
                        g.running = false;
                        log::info!("Quit requested, stopping game loop");
                    }
                    "p" | "P" if !repeat => {
                        g.settings.show_fps = !g.settings.show_fps;
                        g.settings.save();
                    }
                    "m" | "M" if !repeat => {
                        g.settings.reduced_motion = !g.settings.reduced_motion;
                        g.settings.save();
                        log::info!("Reduced motion: {}", g.settings.reduced_motion);
                    }
                    "i" | "I" if !repeat => {
                        g.input.idle_mode = !g.input.idle_mode;
                        log::info!("Demo mode: {}", g.input.idle_mode);
                    }
                    _ => return,
                }
                event.prevent_default();
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up: release held directions
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.input.left = false,
                    "ArrowRight" | "d" | "D" => g.input.right = false,
                    "ArrowDown" | "s" | "S" => g.input.crouch = false,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Keys released while unfocused never deliver keyup; drop held state
    fn setup_focus_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().release_held_keys();
                    log::info!("Tab hidden, released held keys");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().release_held_keys();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
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
            if !g.running {
                return;
            }

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

/// Length of the native demo run
#[cfg(not(target_arch = "wasm32"))]
const DEMO_SECONDS: u32 = 180;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use pocket_platformer::consts::SIM_HZ;
    use pocket_platformer::sim::{GameEvent, GameState, TickInput, tick};
    use pocket_platformer::{HighScores, Tuning, ui};

    env_logger::init();
    log::info!("Pocket Platformer (native) starting...");
    log::info!("Native mode runs the demo autopilot headless - build for wasm32 to play");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(42);
    let mut state = GameState::new(seed, Tuning::load());
    // Demo sessions are ranked for this run only
    let mut high_scores = HighScores::new();
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    log::info!("Demo seed {}, {} seconds", seed, DEMO_SECONDS);

    for _ in 0..DEMO_SECONDS * SIM_HZ {
        tick(&mut state, &input);

        for event in &state.events {
            match event {
                GameEvent::GameOver | GameEvent::Victory => {
                    if let Some(rank) = high_scores.add_score(
                        state.player.score,
                        state.world_number,
                        state.level_number,
                        state.time_ticks as f64,
                    ) {
                        log::info!("Session ended at rank #{}", rank);
                    }
                }
                GameEvent::LevelStarted { .. }
                | GameEvent::BossFightStarted(_)
                | GameEvent::LifeLost { .. }
                | GameEvent::PowerUp(_)
                | GameEvent::BossDefeated(_) => {
                    log::info!("[{:>6}] {:?}", state.time_ticks, event);
                }
                _ => {}
            }
        }
    }

    let summary = ui::hud_items(&state)
        .iter()
        .map(|item| format!("{}: {}", item.label, item.value))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", summary);
    for (i, entry) in high_scores.entries.iter().enumerate() {
        println!("#{:<2} {:>7}  reached {}", i + 1, entry.score, entry.stage());
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

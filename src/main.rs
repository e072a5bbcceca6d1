//! Anamorph entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent};

    use anamorph::Settings;
    use anamorph::assets::Assets;
    use anamorph::consts::*;
    use anamorph::renderer::RenderState;
    use anamorph::sim::{GameState, Phase, TickInput, tick};

    const SAVE_KEY: &str = "anamorph_save";

    // JS binding for pointer lock
    #[wasm_bindgen(inline_js = "
        export function request_pointer_lock() {
            const canvas = document.getElementById('canvas');
            if (canvas) {
                const result = canvas.requestPointerLock();
                if (result && result.then) {
                    result.catch(e => console.error('Pointer lock failed:', e));
                }
            }
        }
    ")]
    extern "C" {
        fn request_pointer_lock();
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<RenderState>,
        settings: Settings,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        /// Mouse delta accumulated between frames
        pending_look: glam::Vec2,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        // Track clears and phase for auto-save
        last_level_clear: bool,
        last_puzzle_clear: bool,
        pointer_locked: bool,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            Self {
                state: GameState::new(seed),
                render_state: None,
                settings: Settings::load(),
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                pending_look: glam::Vec2::ZERO,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                last_level_clear: false,
                last_puzzle_clear: false,
                pointer_locked: false,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let mut input = self.input;
                input.look_delta = self.pending_look;
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.pending_look = glam::Vec2::ZERO;
                self.input.click = false;
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }

            // Auto-save when a puzzle milestone is reached
            if self.state.level_clear != self.last_level_clear
                || self.state.puzzle_clear != self.last_puzzle_clear
            {
                self.save_game();
                self.last_level_clear = self.state.level_clear;
                self.last_puzzle_clear = self.state.puzzle_clear;
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.state, &self.settings) {
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
            let window = web_sys::window().unwrap();
            let document = window.document().unwrap();

            if let Some(el) = document.query_selector("#hud-room .hud-value").ok().flatten() {
                let room = if self.state.camera.position.z < -20.0 { "2" } else { "1" };
                el.set_text_content(Some(room));
            }

            if let Some(el) = document.query_selector("#hud-objective .hud-value").ok().flatten() {
                let objective = if self.state.cutscene.phase != Phase::Normal {
                    "..."
                } else if !self.state.level_clear {
                    "Weigh down both buttons"
                } else if !self.state.puzzle_clear {
                    "Find the picture's viewpoint"
                } else {
                    "Place the box on the button"
                };
                el.set_text_content(Some(objective));
            }

            if self.settings.show_fps {
                if let Some(el) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                    el.set_text_content(Some(&self.fps.to_string()));
                }
            }

            // Click-to-look prompt while the pointer is free
            if let Some(el) = document.get_element_by_id("lock-prompt") {
                let class = if self.pointer_locked { "hidden" } else { "" };
                let _ = el.set_attribute("class", class);
            }
        }

        /// Save game state to LocalStorage
        fn save_game(&self) {
            if let Ok(json) = serde_json::to_string(&self.state) {
                if let Some(storage) = web_sys::window()
                    .and_then(|w| w.local_storage().ok())
                    .flatten()
                {
                    let _ = storage.set_item(SAVE_KEY, &json);
                    log::info!("Game saved");
                }
            }
        }

        /// Reset game state for restart
        fn restart(&mut self, seed: u64) {
            self.state = GameState::new(seed);
            self.accumulator = 0.0;
            self.input = TickInput::default();
            self.pending_look = glam::Vec2::ZERO;
            self.last_level_clear = false;
            self.last_puzzle_clear = false;
        }

        /// Load game state from saved data
        fn load_state(&mut self, state: GameState) {
            self.last_level_clear = state.level_clear;
            self.last_puzzle_clear = state.puzzle_clear;
            self.state = state;
            self.accumulator = 0.0;
            self.input = TickInput::default();
        }
    }

    /// Load saved game from LocalStorage
    fn load_saved_game() -> Option<GameState> {
        let storage = web_sys::window()?.local_storage().ok()??;
        let json = storage.get_item(SAVE_KEY).ok()??;
        serde_json::from_str(&json).ok()
    }

    /// Clear saved game from LocalStorage
    fn clear_saved_game() {
        if let Some(storage) = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
        {
            let _ = storage.remove_item(SAVE_KEY);
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Anamorph starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));

        log::info!("Game initialized with seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
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

        // No filesystem on wasm; the renderer falls back to vertex colors
        let assets = Assets::empty();
        let render_state = RenderState::new(surface, &adapter, width, height, &assets).await;
        game.borrow_mut().render_state = Some(render_state);

        // Offer to continue a saved game
        let saved_game = load_saved_game();
        if saved_game.is_some() {
            if let Some(el) = document.get_element_by_id("continue-prompt") {
                let _ = el.set_attribute("class", "");
            }
        }

        setup_input_handlers(&canvas, game.clone());
        setup_restart_button(game.clone());
        setup_continue_prompt(game.clone(), saved_game);

        request_animation_frame(game);

        log::info!("Anamorph running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Pointer lock change handler
        {
            let game = game.clone();
            let document = web_sys::window().unwrap().document().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let document = web_sys::window().unwrap().document().unwrap();
                let locked = document.pointer_lock_element().is_some();
                game.borrow_mut().pointer_locked = locked;
            });
            let _ = document.add_event_listener_with_callback(
                "pointerlockchange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Mouse move: accumulate relative deltas while locked
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.pointer_locked {
                    g.pending_look.x += event.movement_x() as f32;
                    g.pending_look.y += event.movement_y() as f32;
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse click: grab/release, and acquire pointer lock first
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.pointer_locked {
                    g.input.click = true;
                } else {
                    drop(g); // Release borrow before the JS call
                    request_pointer_lock();
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // WASD: level-triggered movement keys
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                set_movement_key(&mut game.borrow_mut().input, &event.key(), true);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                set_movement_key(&mut game.borrow_mut().input, &event.key(), false);
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn set_movement_key(input: &mut TickInput, key: &str, down: bool) {
        match key {
            "w" | "W" | "ArrowUp" => input.move_forward = down,
            "s" | "S" | "ArrowDown" => input.move_back = down,
            "a" | "A" | "ArrowLeft" => input.move_left = down,
            "d" | "D" | "ArrowRight" => input.move_right = down,
            _ => {}
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

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

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let seed = js_sys::Date::now() as u64;
                game.borrow_mut().restart(seed);
                clear_saved_game();
                log::info!("Game restarted with seed: {}", seed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_continue_prompt(game: Rc<RefCell<Game>>, saved_game: Option<GameState>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        if let Some(btn) = document.get_element_by_id("continue-btn") {
            let game = game.clone();
            let saved = saved_game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                if let Some(ref state) = saved {
                    game.borrow_mut().load_state(state.clone());
                    log::info!("Loaded saved game");
                }
                let document = web_sys::window().unwrap().document().unwrap();
                if let Some(el) = document.get_element_by_id("continue-prompt") {
                    let _ = el.set_attribute("class", "hidden");
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("new-game-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                clear_saved_game();
                let seed = js_sys::Date::now() as u64;
                game.borrow_mut().restart(seed);
                let document = web_sys::window().unwrap().document().unwrap();
                if let Some(el) = document.get_element_by_id("continue-prompt") {
                    let _ = el.set_attribute("class", "hidden");
                }
                log::info!("Started new game with seed: {}", seed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Anamorph (native) starting...");
    log::info!("Native mode is a headless demo - run with `trunk serve` for the web version");

    // Exercise the BMP loader against the data/ directory
    let _assets = anamorph::assets::Assets::load_default();

    run_headless_demo();
}

/// Scripted playthrough: weigh both Room 1 plates (teleport stands in for
/// mouse aiming), walk through the opened doorway, solve the anamorphic
/// puzzle from the projector, and trigger the ending.
#[cfg(not(target_arch = "wasm32"))]
fn run_headless_demo() {
    use anamorph::consts::SIM_DT;
    use anamorph::sim::{GameState, TickInput, tick};
    use glam::Vec3;

    let mut state = GameState::new(0xA11A);

    // Let the scene settle
    let idle = TickInput::default();
    for _ in 0..300 {
        tick(&mut state, &idle, SIM_DT);
    }

    // Weigh both Room 1 plates down
    let sphere_id = state.sphere_id;
    let cube_id = state.cube_id;
    state.object_mut(sphere_id).unwrap().position = Vec3::new(-20.0, 6.5, 0.0);
    state.object_mut(cube_id).unwrap().position = Vec3::new(20.0, 6.5, 0.0);
    for _ in 0..10 {
        tick(&mut state, &idle, SIM_DT);
    }
    log::info!(
        "buttons: left={} right={} level_clear={}",
        state.buttons[0].pressed,
        state.buttons[1].pressed,
        state.level_clear
    );
    assert!(state.level_clear, "Room 1 should clear with both plates weighed");

    // Walk through the now-open doorway into Room 2
    let forward = TickInput {
        move_forward: true,
        ..Default::default()
    };
    state.camera.position = Vec3::new(0.0, 4.0, -15.0);
    for _ in 0..400 {
        tick(&mut state, &forward, SIM_DT);
    }
    log::info!("camera reached z={:.1}", state.camera.position.z);
    assert!(state.camera.position.z < -21.0, "doorway should be open");

    // Solve the anamorphic puzzle from the projector viewpoint
    state.camera.position = state.puzzle.projector_pos;
    let click = TickInput {
        click: true,
        ..Default::default()
    };
    tick(&mut state, &click, SIM_DT);
    assert!(state.puzzle_clear, "clicking at the projector should solve");

    // Drop the reward box on the Room 2 plate and run the cut-scene
    let box_id = state.box_id;
    {
        let reward = state.object_mut(box_id).unwrap();
        reward.position = Vec3::new(20.0, 6.5, -40.0);
        reward.scale = Vec3::splat(2.0);
    }
    for _ in 0..500 {
        tick(&mut state, &idle, SIM_DT);
    }
    log::info!("cutscene phase: {:?}", state.cutscene.phase);

    println!("\n✓ Headless demo completed: both puzzles solved, ending triggered");
}

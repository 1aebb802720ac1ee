//! Cave Flap entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use cave_flap::Game;
    use cave_flap::audio::{AudioManager, SoundEffect};
    use cave_flap::consts::FRAME_MS;
    use cave_flap::persistence::LocalStorage;
    use cave_flap::platform::{InputAction, action_for_key, pointer_action, settings_for_key};
    use cave_flap::renderer::canvas::CanvasSurface;
    use cave_flap::renderer::scene::render_frame;
    use cave_flap::sim::{GamePhase, Playfield};

    /// Everything the browser callbacks share
    struct App {
        game: Game<LocalStorage>,
        surface: CanvasSurface,
        canvas: HtmlCanvasElement,
        audio: AudioManager,
        last_time: f64,
        /// `shown_at_ms` of the last toast we played a chime for
        last_toast: Option<f64>,
    }

    impl App {
        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time) as f32
            } else {
                FRAME_MS
            };
            self.last_time = time;

            let events = self.game.frame(dt, js_sys::Date::now());
            self.audio.set_muted(!self.game.settings.sound_enabled);
            for event in &events {
                log::debug!("{:?}", event);
                if let Some(effect) = SoundEffect::for_event(event) {
                    self.audio.play(effect);
                }
            }

            let toast = self.game.notification().map(|n| n.shown_at_ms);
            if toast.is_some() && toast != self.last_toast {
                self.audio.play(SoundEffect::Achievement);
            }
            self.last_toast = toast;

            self.surface.clear();
            render_frame(&mut self.surface, &self.game);
        }

        /// Match the canvas to its CSS size; the playfield follows
        fn fit_canvas(&mut self) {
            let width = self.canvas.client_width().max(1) as u32;
            let height = self.canvas.client_height().max(1) as u32;
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.surface.resize(width as f32, height as f32);
            self.game.resize(Playfield {
                width: width as f32,
                height: height as f32,
            });
            log::info!("Playfield resized to {}x{}", width, height);
        }

        fn key(&mut self, event: &KeyboardEvent) {
            self.audio.resume();
            let code = event.code();

            if code == "KeyI" {
                self.game.autopilot = !self.game.autopilot;
                log::info!("Autopilot: {}", self.game.autopilot);
                return;
            }

            if self.game.phase() == GamePhase::Menu {
                if let Some(settings) = settings_for_key(&code, &self.game.settings) {
                    log::info!("Settings changed: {:?}", settings);
                    self.game.apply_settings(settings);
                    return;
                }
            }

            let action = action_for_key(&code).or_else(|| action_for_key(&event.key()));
            if let Some(action) = action {
                if action == InputAction::Flap {
                    // Keep Space/ArrowUp from scrolling the page
                    event.prevent_default();
                }
                self.game.handle(action);
            }
        }

        fn pointer(&mut self) {
            self.audio.resume();
            if let Some(action) = pointer_action(self.game.phase()) {
                self.game.handle(action);
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        log::info!("Cave Flap starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let seed = js_sys::Date::now() as u64;
        let surface = CanvasSurface::new(&canvas)?;
        let app = Rc::new(RefCell::new(App {
            game: Game::new(LocalStorage::new(), seed, Playfield::default()),
            surface,
            canvas: canvas.clone(),
            audio: AudioManager::new(),
            last_time: 0.0,
            last_toast: None,
        }));
        app.borrow_mut().fit_canvas();
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, app.clone())?;
        setup_auto_pause(app.clone())?;

        request_animation_frame(app);

        log::info!("Cave Flap running!");
        Ok(())
    }

    fn setup_input_handlers(
        canvas: &HtmlCanvasElement,
        app: Rc<RefCell<App>>,
    ) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Keyboard
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                app.borrow_mut().key(&event);
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Mouse
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().pointer();
            });
            canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch (no synthetic mouse event afterwards)
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                app.borrow_mut().pointer();
            });
            canvas.add_event_listener_with_callback(
                "touchstart",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Resize
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().fit_canvas();
            });
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_auto_pause(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Visibility change (tab switch, minimize)
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.hidden() {
                    app.borrow_mut().game.blur();
                    log::info!("Auto-paused (tab hidden)");
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                app.borrow_mut().game.blur();
                log::info!("Auto-paused (window blur)");
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
    }
    if let Err(e) = wasm_game::run() {
        log::error!("Cave Flap failed to start: {:?}", e);
    }
}

/// Simulated time the headless demo gives one run
#[cfg(not(target_arch = "wasm32"))]
const DEMO_RUN_MS: f64 = 120_000.0;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cave_flap::consts::FRAME_MS;
    use cave_flap::persistence::MemoryStore;
    use cave_flap::platform::{InputAction, now_ms};
    use cave_flap::renderer::RecordingSurface;
    use cave_flap::renderer::scene::render_frame;
    use cave_flap::sim::{GameEvent, Playfield};

    env_logger::init();
    log::info!("Cave Flap (native) starting...");
    log::info!("Native mode runs a headless autopilot demo - serve the wasm build to play");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(now_ms() as u64);
    let field = Playfield::default();
    let mut game = cave_flap::Game::new(MemoryStore::new(), seed, field);
    game.autopilot = true;
    game.handle(InputAction::Start);

    let start = now_ms();
    let mut elapsed = 0.0;
    let mut themes = 0;
    while elapsed < DEMO_RUN_MS {
        let events = game.frame(FRAME_MS, start + elapsed);
        for event in &events {
            match event {
                GameEvent::ThemeChanged(theme) => {
                    themes += 1;
                    log::info!("Entered the {}", theme.name());
                }
                GameEvent::PowerUpCollected(kind) => log::info!("Collected {}", kind.as_str()),
                GameEvent::ShieldAbsorbed => log::info!("Shield absorbed a hit"),
                _ => log::debug!("{:?}", event),
            }
        }
        elapsed += FRAME_MS as f64;
        if !game.state.is_running() {
            break;
        }
    }

    let mut surface = RecordingSurface::new(field.width, field.height);
    render_frame(&mut surface, &game);
    log::debug!("Final frame: {} draw calls", surface.calls.len());

    println!("\nSeed {} - {:.1}s simulated", seed, elapsed / 1000.0);
    println!(
        "Score: {} ({} obstacles, {} themes)",
        game.state.score, game.state.run.obstacles_passed, themes
    );
    if let Some(result) = game.last_result() {
        for achievement in &result.unlocked {
            println!("Unlocked: {} ({})", achievement.title, achievement.rarity.label());
        }
    } else {
        println!("Still flying when the demo ended");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

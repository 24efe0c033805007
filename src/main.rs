//! Galactic Fighter entry point
//!
//! The browser build wires the DOM to a `Session` and drives it from
//! requestAnimationFrame. The native build runs a headless autopilot game.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlInputElement};

    use galactic_fighter::audio::WebAudioSink;
    use galactic_fighter::consts::LEADERBOARD_LIMIT;
    use galactic_fighter::highscores::{LocalScoreStore, format_date};
    use galactic_fighter::platform::web::{DomUi, KeyboardInput, preload_images};
    use galactic_fighter::platform::{Collaborators, Screen, UiSink};
    use galactic_fighter::renderer::Canvas2dRenderer;
    use galactic_fighter::{Session, Settings, Tuning};

    /// Page-level state shared by every listener
    struct Shell {
        session: Session,
        input: Rc<KeyboardInput>,
        settings: Settings,
        /// A frame callback is queued
        looping: bool,
    }

    impl Shell {
        fn begin(&mut self, seed: Option<u64>) {
            match seed {
                Some(seed) => self.session.restart(seed),
                None => self.session.start(),
            }
            self.input.release_all();
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Galactic Fighter starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");
        let settings = Settings::load();
        let tuning = Tuning::default();

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        canvas.set_width(tuning.playfield.width as u32);
        canvas.set_height(tuning.playfield.height as u32);

        let input = KeyboardInput::attach(&document);

        let mut assets = match preload_images().await {
            Ok(assets) => assets,
            Err(e) => {
                log::error!("{e}");
                set_text(&document, "loading-screen", "Failed to load game assets.");
                return;
            }
        };

        let mut renderer = match Canvas2dRenderer::new(&canvas, assets.images.clone()) {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("{e}");
                return;
            }
        };
        renderer.show_hitboxes = settings.show_hitboxes;

        let mut ui = DomUi::new(document.clone());
        ui.show_screen(Screen::Start);

        let collab = Collaborators {
            sound: Box::new(WebAudioSink::new(&settings)),
            ui: Box::new(ui),
            scores: Box::new(LocalScoreStore::load()),
            renderer: Box::new(renderer),
        };

        let seed = js_sys::Date::now() as u64;
        let session = match Session::init(tuning, &mut assets, collab, seed) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Could not start: {e}");
                set_text(&document, "loading-screen", "Failed to start the game.");
                return;
            }
        };

        let shell = Rc::new(RefCell::new(Shell {
            session,
            input,
            settings,
            looping: false,
        }));

        setup_buttons(&document, shell.clone());
        setup_auto_pause(&document, shell.clone());
        show_leaderboard(&document, &shell.borrow().session);

        log::info!("Galactic Fighter ready (seed {seed})");
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("Missing button #{id}");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| handler());
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, shell: Rc<RefCell<Shell>>) {
        {
            let shell = shell.clone();
            on_click(document, "startButton", move || {
                shell.borrow_mut().begin(None);
                request_animation_frame(shell.clone());
            });
        }

        {
            let shell = shell.clone();
            on_click(document, "restartButton", move || {
                let seed = js_sys::Date::now() as u64;
                shell.borrow_mut().begin(Some(seed));
                log::info!("Game restarted with seed: {seed}");
                request_animation_frame(shell.clone());
            });
        }

        {
            let shell = shell.clone();
            let doc = document.clone();
            on_click(document, "muteButton", move || {
                let mut s = shell.borrow_mut();
                let muted = s.session.toggle_mute();
                s.settings.muted = muted;
                s.settings.save();
                set_text(&doc, "muteButton", if muted { "Unmute" } else { "Mute" });
            });
        }

        {
            let doc = document.clone();
            on_click(document, "submitScore", move || {
                let name = doc
                    .get_element_by_id("playerName")
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                    .map(|el| el.value())
                    .unwrap_or_default();

                let mut s = shell.borrow_mut();
                if s.session.record_score(&name).is_some() {
                    s.settings.remember_name(&name);
                    s.settings.save();
                }
                show_leaderboard(&doc, &s.session);
            });
        }
    }

    fn show_leaderboard(document: &Document, session: &Session) {
        let rows: Vec<String> = session
            .leaderboard(LEADERBOARD_LIMIT)
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{}. {} {} ({})", i + 1, r.name, r.score, format_date(r.date)))
            .collect();
        let text = if rows.is_empty() {
            "No scores yet".to_string()
        } else {
            rows.join("\n")
        };
        set_text(document, "highscoresList", &text);
    }

    /// Runs after the loop stops on game over
    fn on_game_over(shell: &Shell) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(input) = document
            .get_element_by_id("playerName")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(&shell.settings.player_name);
        }
        show_leaderboard(&document, &shell.session);
    }

    fn setup_auto_pause(document: &Document, shell: Rc<RefCell<Shell>>) {
        {
            let shell = shell.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() != web_sys::VisibilityState::Hidden {
                    return;
                }
                let mut s = shell.borrow_mut();
                s.input.release_all();
                if s.settings.pause_on_blur {
                    s.session.pause();
                    log::info!("Auto-paused (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Keys held while focus leaves never see their keyup
        {
            let window = web_sys::window().expect("no window");
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                shell.borrow().input.release_all();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(shell: Rc<RefCell<Shell>>) {
        {
            let mut s = shell.borrow_mut();
            if s.looping {
                return;
            }
            s.looping = true;
        }
        queue_frame(shell);
    }

    fn queue_frame(shell: Rc<RefCell<Shell>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(shell, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(shell: Rc<RefCell<Shell>>, time: f64) {
        let keep_going = {
            let mut s = shell.borrow_mut();
            let input = s.input.snapshot();
            let keep_going = s.session.frame(time, &input);
            if !keep_going {
                s.looping = false;
                if s.session.state().is_over() {
                    on_game_over(&s);
                }
            }
            keep_going
        };

        if keep_going {
            queue_frame(shell);
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
    if let Err(e) = headless::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Autopilot game with recording collaborators
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use galactic_fighter::consts::{BASELINE_FRAME_MS, LEADERBOARD_LIMIT};
    use galactic_fighter::platform::headless::{
        MemoryScoreStore, NullRenderer, RecordingSound, RecordingUi, StaticAssets,
    };
    use galactic_fighter::platform::{Collaborators, InputSnapshot, ScoreStore};
    use galactic_fighter::sim::GameState;
    use galactic_fighter::{GameError, Session, Tuning};

    /// Ten simulated minutes at 60 fps
    const DEFAULT_FRAMES: u64 = 36_000;

    pub fn run() -> Result<(), GameError> {
        let mut args = std::env::args().skip(1);
        let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
        let max_frames = args
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_FRAMES);

        let tuning = match std::env::var("GALACTIC_TUNING") {
            Ok(path) => match std::fs::read_to_string(&path) {
                Ok(json) => Tuning::from_json(&json)?,
                Err(e) => {
                    log::error!("Could not read tuning from {path}: {e}");
                    std::process::exit(1);
                }
            },
            Err(_) => Tuning::default(),
        };

        let sound = RecordingSound::default();
        let ui = RecordingUi::default();
        let scores = MemoryScoreStore::default();
        let renderer = NullRenderer::default();
        let collab = Collaborators {
            sound: Box::new(sound.clone()),
            ui: Box::new(ui.clone()),
            scores: Box::new(scores.clone()),
            renderer: Box::new(renderer.clone()),
        };

        let mut session = Session::init(tuning, &mut StaticAssets::default(), collab, seed)?;

        log::info!("Galactic Fighter (native) autopilot, seed {seed}");
        session.start();

        let mut timestamp = 0.0;
        for _ in 0..max_frames {
            let input = autopilot(session.state());
            if !session.frame(timestamp, &input) {
                break;
            }
            timestamp += BASELINE_FRAME_MS as f64;
        }

        let state = session.state();
        let hud = ui.snapshot();
        println!(
            "score {} | level {} | lives {} | {:.1}s simulated | {} frames rendered | {} sounds",
            hud.score,
            hud.level,
            hud.lives,
            state.clock_ms / 1000.0,
            renderer.frames(),
            sound.played().len()
        );

        if let Some(fault) = session.fault() {
            return Err(fault.clone().into());
        }

        if state.is_over() {
            session.record_score("autopilot");
            for (i, record) in scores.top_scores(LEADERBOARD_LIMIT)?.iter().enumerate() {
                println!("{:>2}. {:<16} {}", i + 1, record.name, record.score);
            }
        }
        Ok(())
    }

    /// Line up under the lowest hostile still above the ship and keep firing
    fn autopilot(state: &GameState) -> InputSnapshot {
        let ship = state.player.body;
        let target = state
            .hostiles
            .iter()
            .filter(|h| h.body.bottom() < ship.pos.y)
            .max_by(|a, b| a.body.pos.y.total_cmp(&b.body.pos.y));

        let mut input = InputSnapshot {
            shoot: true,
            ..Default::default()
        };
        if let Some(hostile) = target {
            let dx = hostile.body.center().x - ship.center().x;
            input.left = dx < -4.0;
            input.right = dx > 4.0;
        }
        input
    }
}

//! Ledge Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlAudioElement, HtmlCanvasElement, KeyboardEvent};

    use ledge_runner::assets::{AssetHandle, AssetRegistry, SoundCue};
    use ledge_runner::consts::{VIEW_HEIGHT, VIEW_WIDTH};
    use ledge_runner::persistence::{KeyValueStore, LocalStore, MemoryStore, Progress};
    use ledge_runner::platform::{
        Action, FrameClock, InputState, menu_command, seed_from_query, settings_change,
    };
    use ledge_runner::renderer::{FrameSnapshot, RenderState};
    use ledge_runner::sim::{Command, GameEvent, GameState, Phase, StageSummary, Upgrade, tick};
    use ledge_runner::{Settings, SettingsChange, Tuning};

    /// How long a notice stays on screen
    const TOAST_SECS: f32 = 2.5;

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<RenderState>,
        input: InputState,
        /// Commands queued by key handlers, drained by the next tick
        commands: Vec<Command>,
        clock: FrameClock,
        store: Box<dyn KeyValueStore>,
        settings: Settings,
        assets: AssetRegistry,
        /// Audio elements by manifest index
        sounds: Vec<Option<HtmlAudioElement>>,
        toast_timer: f32,
        muted: bool,
    }

    impl Game {
        fn new(seed: Option<u32>) -> Self {
            let store: Box<dyn KeyValueStore> = match LocalStore::open() {
                Ok(store) => Box::new(store),
                Err(e) => {
                    log::warn!("{}; progress will not be saved", e);
                    Box::new(MemoryStore::new())
                }
            };
            let progress = Progress::load(store.as_ref());
            let settings = Settings::load(store.as_ref());
            let assets = AssetRegistry::default();
            let sounds = vec![None; assets.specs().len()];
            Self {
                state: GameState::new(Tuning::default(), progress).with_seed(seed),
                render_state: None,
                input: InputState::new(),
                commands: Vec::new(),
                clock: FrameClock::default(),
                store,
                settings,
                assets,
                sounds,
                toast_timer: 0.0,
                muted: false,
            }
        }

        /// Record one asset's load outcome
        fn settle_asset(&mut self, index: usize, outcome: Result<(), String>) {
            if self.assets.settle(index, outcome) {
                let failed = self.assets.failed().count();
                log::info!("Assets settled ({} placeholders)", failed);
                self.state.on_assets_settled();
            }
            set_loading_progress(self.assets.progress());
        }

        /// Tick the simulation once and react to what it reported
        fn update(&mut self, time: f64) {
            let dt = self.clock.advance(time);
            let commands = std::mem::take(&mut self.commands);
            let events = tick(&mut self.state, &self.input, &commands, dt);
            self.input.end_frame();

            for event in &events {
                self.handle_event(event);
            }
            self.toast_timer = (self.toast_timer - dt).max(0.0);
            if self.toast_timer <= 0.0 {
                set_visible("toast", false);
            }
        }

        fn handle_event(&mut self, event: &GameEvent) {
            if let Some(cue) = SoundCue::for_event(event) {
                self.play_sound(cue);
            }
            match event {
                GameEvent::ProgressUpdated => {
                    if let Err(e) = self.state.progress.save(self.store.as_mut()) {
                        log::warn!("Failed to save progress: {}", e);
                    }
                }
                GameEvent::Notice(message) => self.show_toast(message),
                GameEvent::StageComplete(summary) => show_summary(summary),
                _ => {}
            }
        }

        fn play_sound(&self, cue: SoundCue) {
            if self.muted {
                return;
            }
            // Placeholder sounds are silent
            let AssetHandle::Ready(index) = self.assets.sound(cue) else {
                return;
            };
            if let Some(Some(audio)) = self.sounds.get(index) {
                audio.set_volume(self.settings.sfx_gain() as f64);
                audio.set_current_time(0.0);
                let _ = audio.play();
            }
        }

        /// Apply a pause-menu preference edit and persist it
        fn change_setting(&mut self, change: SettingsChange) {
            let message = self.settings.apply(change);
            if let Err(e) = self.settings.save(self.store.as_mut()) {
                log::warn!("Failed to save settings: {}", e);
            }
            self.show_toast(&message);
        }

        fn show_toast(&mut self, message: &str) {
            set_text("toast", message);
            set_visible("toast", true);
            self.toast_timer = TOAST_SECS;
        }

        /// Render the current frame
        fn render(&mut self, snapshot: &FrameSnapshot) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.draw(snapshot) {
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
        fn update_hud(&self, snapshot: &FrameSnapshot) {
            let hud = &snapshot.hud;
            let phase = snapshot.phase;

            set_hud_value("hud-level", &hud.level.to_string());
            set_hud_value("hud-best", &hud.best_level.to_string());
            set_hud_value("hud-hp", &format!("{}/{}", hud.hp, hud.max_hp));
            set_hud_value("hud-coins", &hud.coins.to_string());
            match hud.fps {
                Some(fps) => {
                    set_visible("hud-fps", true);
                    set_hud_value("hud-fps", &fps.to_string());
                }
                None => set_visible("hud-fps", false),
            }
            match hud.dash_ready {
                Some(ready) => {
                    set_visible("hud-dash", true);
                    set_hud_value("hud-dash", if ready { "ready" } else { "..." });
                }
                None => set_visible("hud-dash", false),
            }
            match snapshot.hint {
                Some(hint) => {
                    set_text("hint", hint);
                    set_visible("hint", true);
                }
                None => set_visible("hint", false),
            }

            set_visible("hud", phase.shows_stage());
            set_visible("start-screen", phase == Phase::Start);
            set_visible("select-screen", phase == Phase::Select);
            set_visible("loading", phase == Phase::Boot || phase.is_loading());
            set_visible("pause-menu", phase == Phase::Paused);
            set_visible("shop", phase == Phase::Shop);
            set_visible("stage-complete", phase == Phase::StageComplete);
            set_visible("game-over", phase == Phase::Dead);

            if phase == Phase::Shop {
                self.update_shop();
            }
        }

        fn update_shop(&self) {
            let Some(session) = &self.state.session else {
                return;
            };
            set_text("shop-coins", &session.coins.to_string());
            let shop = &self.state.tuning.shop;
            for (i, upgrade) in Upgrade::ALL.iter().enumerate() {
                let label = if session.upgrades.is_maxed(*upgrade, shop) {
                    format!("{}. {} (max)", i + 1, upgrade)
                } else {
                    format!("{}. {} - {}", i + 1, upgrade, session.upgrades.price(*upgrade, shop))
                };
                set_text(&format!("shop-item-{}", i + 1), &label);
            }
        }
    }

    fn document() -> Option<web_sys::Document> {
        web_sys::window()?.document()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hud_value(id: &str, text: &str) {
        let selector = format!("#{} .hud-value", id);
        if let Some(el) = document().and_then(|d| d.query_selector(&selector).ok().flatten()) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(id: &str, visible: bool) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn set_loading_progress(fraction: f32) {
        set_text("loading-progress", &format!("{:.0}%", fraction * 100.0));
    }

    fn show_summary(summary: &StageSummary) {
        set_text("summary-level", &summary.level.to_string());
        set_text("summary-coins", &summary.coins.to_string());
        set_text("summary-damage", &summary.damage_taken.to_string());
        set_text("summary-enemies", &summary.enemies_defeated.to_string());
        set_text("summary-time", &format!("{:.1}s", summary.time_secs));
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Ledge Runner starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // The renderer draws in view pixels; the backing store follows DPR
        let dpr = window.device_pixel_ratio();
        let width = (VIEW_WIDTH as f64 * dpr) as u32;
        let height = (VIEW_HEIGHT as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = window
            .location()
            .search()
            .ok()
            .and_then(|query| seed_from_query(&query));
        if let Some(seed) = seed {
            log::info!("Seed override: {}", seed);
        }
        let game = Rc::new(RefCell::new(Game::new(seed)));

        // Initialize WebGPU, falling back to WebGL
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => {
                log::info!("Using adapter: {:?}", adapter.get_info().name);
                match RenderState::new(surface, &adapter, width, height).await {
                    Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
                    Err(e) => log::error!("No render device: {}", e),
                }
            }
            Err(e) => log::error!("No graphics adapter: {}", e),
        }

        load_assets(game.clone());
        setup_input_handlers(game.clone());
        setup_auto_pause(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Ledge Runner running!");
    }

    /// Kick off every manifest load; each settles the registry when it resolves
    fn load_assets(game: Rc<RefCell<Game>>) {
        let specs = game.borrow().assets.specs();
        for (index, spec) in specs.iter().enumerate() {
            let on_load = {
                let game = game.clone();
                Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    game.borrow_mut().settle_asset(index, Ok(()));
                })
            };
            let on_error = {
                let game = game.clone();
                let path = spec.path;
                Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    game.borrow_mut()
                        .settle_asset(index, Err(format!("could not load {}", path)));
                })
            };

            let started = HtmlAudioElement::new_with_src(spec.path).map(|audio| {
                let _ = audio.add_event_listener_with_callback(
                    "canplaythrough",
                    on_load.as_ref().unchecked_ref(),
                );
                let _ =
                    audio.add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref());
                audio.set_preload("auto");
                game.borrow_mut().sounds[index] = Some(audio);
            });
            if started.is_err() {
                game.borrow_mut()
                    .settle_asset(index, Err("element creation failed".to_string()));
            }
            on_load.forget();
            on_error.forget();
        }
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        // Key down: actions for play, commands for menus
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let mut g = game.borrow_mut();
                if let Some(action) = Action::from_key(&key) {
                    g.input.press(action);
                    // Keep arrows and space from scrolling the page
                    event.prevent_default();
                }
                if event.repeat() {
                    return;
                }
                let phase = g.state.phase;
                if let Some(command) = menu_command(phase, &key) {
                    g.commands.push(command);
                }
                if let Some(change) = settings_change(phase, &key) {
                    g.change_setting(change);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(action) = Action::from_key(&event.key()) {
                    game.borrow_mut().input.release(action);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
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
            g.update(time);
            let snapshot = FrameSnapshot::capture(&g.state, &g.settings, g.clock.fps());
            g.render(&snapshot);
            g.update_hud(&snapshot);
        }

        request_animation_frame(game);
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    g.input.clear();
                    if g.state.phase == Phase::Play {
                        g.commands.push(Command::TogglePause);
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
                // The hidden gap must not arrive as one huge frame
                g.clock.reset();
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.input.clear();
                g.muted = g.settings.mute_on_blur;
                if g.state.phase == Phase::Play {
                    g.commands.push(Command::TogglePause);
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().muted = false;
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use ledge_runner::platform::{Action, InputState};
    use ledge_runner::sim::{Character, Command, DeathCause, GameEvent, GameState, Phase};

    /// Scripted player: run right, hop on a fixed rhythm, throw at anything
    #[derive(Debug, Default)]
    pub struct Autopilot {
        frame: u32,
        pub stages_cleared: u32,
        pub deaths: u32,
    }

    impl Autopilot {
        const JUMP_PERIOD: u32 = 42;
        /// Frames the jump key stays down; long enough for a full-height jump
        const JUMP_HOLD: u32 = 14;
        const THROW_PERIOD: u32 = 24;
        /// Retries of one stage before starting over
        const MAX_RETRIES: u32 = 5;

        /// Set this frame's keys and return any menu commands
        pub fn drive(&mut self, state: &GameState, input: &mut InputState) -> Vec<Command> {
            self.frame += 1;
            match state.phase {
                Phase::Start => vec![Command::Confirm],
                Phase::Select => vec![Command::SelectCharacter(Character::Sprinter)],
                Phase::Paused => vec![Command::TogglePause],
                Phase::Shop => vec![Command::CloseShop],
                Phase::StageComplete => vec![Command::Continue],
                Phase::Dead if self.deaths > Self::MAX_RETRIES => {
                    self.deaths = 0;
                    vec![Command::NewRun]
                }
                Phase::Dead => vec![Command::RetryStage],
                Phase::Play => {
                    self.steer(input);
                    Vec::new()
                }
                _ => {
                    input.clear();
                    Vec::new()
                }
            }
        }

        fn steer(&self, input: &mut InputState) {
            input.press(Action::Right);
            match self.frame % Self::JUMP_PERIOD {
                0 => input.press(Action::Jump),
                Self::JUMP_HOLD => input.release(Action::Jump),
                _ => {}
            }
            match self.frame % Self::THROW_PERIOD {
                0 => input.press(Action::Throw),
                1 => input.release(Action::Throw),
                _ => {}
            }
        }

        pub fn observe(&mut self, event: &GameEvent) {
            match event {
                GameEvent::StageComplete(summary) => {
                    self.stages_cleared += 1;
                    self.deaths = 0;
                    log::info!(
                        "Cleared level {} in {:.1}s: {} coins, {} damage, {} defeated",
                        summary.level,
                        summary.time_secs,
                        summary.coins,
                        summary.damage_taken,
                        summary.enemies_defeated
                    );
                }
                GameEvent::PlayerDied(cause) => {
                    self.deaths += 1;
                    let how = match cause {
                        DeathCause::Slain => "slain",
                        DeathCause::Fell => "fell",
                    };
                    log::info!("Died ({})", how);
                }
                GameEvent::PhaseChanged { .. } => {}
                other => log::debug!("{:?}", other),
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use ledge_runner::Tuning;
    use ledge_runner::persistence::{JsonFileStore, KeyValueStore, MemoryStore, Progress};
    use ledge_runner::platform::{InputState, parse_seed};
    use ledge_runner::sim::{GameEvent, GameState, tick};

    /// Three simulated minutes at 60 Hz
    const FRAMES: u32 = 60 * 180;
    const DT: f32 = 1.0 / 60.0;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Ledge Runner (native, headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|arg| {
        let seed = parse_seed(&arg);
        if seed.is_none() {
            log::warn!("Ignoring seed argument '{}'", arg);
        }
        seed
    });
    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(e) => {
                log::warn!("Using default tuning ({}: {})", path, e);
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    let mut store: Box<dyn KeyValueStore> = match JsonFileStore::open("ledge-runner-save.json") {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("{}; progress will not be saved", e);
            Box::new(MemoryStore::new())
        }
    };

    let progress = Progress::load(store.as_ref());
    let mut state = GameState::new(tuning, progress).with_seed(seed);
    // No assets to wait for without a browser
    state.on_assets_settled();

    let mut input = InputState::new();
    let mut pilot = headless::Autopilot::default();
    for _ in 0..FRAMES {
        let commands = pilot.drive(&state, &mut input);
        let events = tick(&mut state, &input, &commands, DT);
        input.end_frame();
        for event in &events {
            pilot.observe(event);
            if *event == GameEvent::ProgressUpdated {
                if let Err(e) = state.progress.save(store.as_mut()) {
                    log::warn!("Failed to save progress: {}", e);
                }
            }
        }
    }

    log::info!(
        "Finished {} frames: {} stages cleared, best level {}",
        FRAMES,
        pilot.stages_cleared,
        state.progress.best_level
    );
}

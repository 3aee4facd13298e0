#[cfg(target_arch = "wasm32")]
use rand::rngs::StdRng;
#[cfg(target_arch = "wasm32")]
use rand::SeedableRng;
#[cfg(target_arch = "wasm32")]
use three_d::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
use crate::config::GameConfig;
#[cfg(target_arch = "wasm32")]
use crate::game::GameEvent;
#[cfg(target_arch = "wasm32")]
use crate::input::CommandQueue;
#[cfg(target_arch = "wasm32")]
use crate::renderer::GameRenderer;
#[cfg(target_arch = "wasm32")]
use crate::simulation::Simulation;
#[cfg(target_arch = "wasm32")]
use crate::storage::{HighScoreStore, LocalStorageStore, MemoryStore};

pub mod config;
pub mod game;
pub mod hud;
pub mod input;
pub mod renderer;
pub mod scheduler;
pub mod simulation;
pub mod storage;

#[cfg(target_arch = "wasm32")]
fn js_error(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

#[cfg(target_arch = "wasm32")]
/// Reads overrides from `<canvas data-config='{"cols": 30}'>`.
fn read_config(canvas: &web_sys::HtmlCanvasElement) -> GameConfig {
    match canvas.get_attribute("data-config") {
        Some(raw) => GameConfig::from_json(&raw).unwrap_or_else(|err| {
            log::warn!("Ignoring invalid data-config ({}), using defaults", err);
            GameConfig::default()
        }),
        None => GameConfig::default(),
    }
}

#[cfg(target_arch = "wasm32")]
fn open_store(key: &str) -> Box<dyn HighScoreStore> {
    match LocalStorageStore::open(key) {
        Ok(store) => Box::new(store),
        Err(err) => {
            log::warn!("{}; best score will not survive a reload", err);
            Box::new(MemoryStore::default())
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn init() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).map_err(js_error)?;

    let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
    let document = window.document().ok_or_else(|| js_error("no document"))?;
    let canvas = document
        .get_element_by_id("canvas")
        .ok_or_else(|| js_error("missing #canvas element"))?
        .dyn_into::<web_sys::HtmlCanvasElement>()?;

    let config = read_config(&canvas);
    log::info!("Starting snake on a {}x{} grid", config.cols, config.rows);

    let store = open_store(&config.storage_key);
    let grid = config.grid();
    let mut sim = Simulation::new(config, store, StdRng::from_entropy());

    hud::update_ui(&document, sim.state());
    let hud_document = document.clone();
    sim.subscribe(move |state, event| {
        hud::update_ui(&hud_document, state);
        if let GameEvent::Ate { new_best: true, .. } = event {
            log::debug!("New best score {}", state.high_score);
        }
    });

    let queue = CommandQueue::default();
    input::attach_touch_controls(&canvas, &queue)?;
    input::attach_buttons(&document, &queue)?;
    input::attach_visibility(&document, &queue)?;

    let window = Window::new(WindowSettings {
        title: "Snake".to_string(),
        canvas: Some(canvas.clone()),
        ..Default::default()
    })
    .map_err(js_error)?;

    let mut renderer = GameRenderer::new(window.gl(), grid);

    if let Some(loading_el) = document.get_element_by_id("loading") {
        loading_el.set_attribute("style", "display: none")?;
    }

    // Focus canvas to ensure it receives keys
    canvas.focus().unwrap_or(());

    window.render_loop(move |frame_input| {
        for event in &frame_input.events {
            if let Event::KeyPress { kind, .. } = event {
                if let Some(command) = input::command_for_key(*kind) {
                    queue.push(command);
                }
            }
        }

        // Input lands before any tick due this frame.
        for command in queue.drain() {
            sim.handle(command);
        }
        sim.advance(frame_input.elapsed_time);

        renderer.resize(frame_input.viewport.width, frame_input.viewport.height);
        renderer.render(sim.state(), &frame_input.screen());

        FrameOutput::default()
    });

    Ok(())
}

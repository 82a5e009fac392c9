//! Browser bridge
//!
//! Exposes a [`WebGame`] to JavaScript. The page owns the canvas, the audio
//! elements and the network; it calls `update` from its animation frame and
//! acts on the returned JSON events.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::game::Session;
use crate::house::ItemKind;
use crate::persistence::LocalStore;
use crate::sim::GameEvent;
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&JsValue::from_str(&format!("Logger init failed: {e}")));
    }
    log::info!("Town Courier (web) starting...");
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// What one `update` call hands back to the page
#[derive(Serialize)]
struct FrameUpdate {
    events: Vec<GameEvent>,
    /// Asset names to play, in event order
    sounds: Vec<String>,
}

/// Game instance held by the page
#[wasm_bindgen]
pub struct WebGame {
    session: Session<LocalStore>,
}

#[wasm_bindgen]
impl WebGame {
    /// `tuning_json` may override any subset of the defaults
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, tuning_json: Option<String>) -> Result<WebGame, JsValue> {
        let tuning = match tuning_json {
            Some(json) => Tuning::from_json(&json).map_err(js_err)?,
            None => Tuning::default(),
        };
        let store = LocalStore::open().map_err(js_err)?;
        let mut session = Session::new(tuning, seed, store).map_err(js_err)?;
        // Date::now doubles as the monotonic clock, so no epoch offset
        session.start(js_sys::Date::now());
        Ok(WebGame { session })
    }

    /// Advance time; returns `{ events, sounds }` as JSON
    pub fn update(&mut self) -> Result<String, JsValue> {
        let events = self.session.update(js_sys::Date::now()).map_err(js_err)?;
        let sounds = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Sound(effect) => Some(effect.asset()),
                _ => None,
            })
            .collect();
        serde_json::to_string(&FrameUpdate { events, sounds }).map_err(js_err)
    }

    /// Milliseconds the page may sleep before the next tick; negative while paused
    pub fn time_until_tick(&self) -> f64 {
        self.session
            .time_until_tick(js_sys::Date::now())
            .unwrap_or(-1.0)
    }

    /// Current render state as JSON
    pub fn snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.snapshot()).map_err(js_err)
    }

    pub fn key_down(&mut self, key: &str) {
        self.session.key_down(key, js_sys::Date::now());
    }

    pub fn key_up(&mut self, key: &str) {
        self.session.key_up(key);
    }

    pub fn touch(&mut self, id: i32, x: f32, y: f32, width: f32, height: f32) {
        self.session.input_mut().touch(id, x, y, width, height);
    }

    pub fn touch_end(&mut self, id: i32) {
        self.session.input_mut().touch_end(id);
    }

    /// Window blurred or tab hidden
    pub fn blur(&mut self) {
        self.session.blur(js_sys::Date::now());
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.session.toggle_pause(js_sys::Date::now())
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.session.toggle_mute()
    }

    /// Queued scores as a JSON object, timestamp -> score
    pub fn pending_scores(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.profile().unsubmitted).map_err(js_err)
    }

    /// The page's request for one queued score succeeded
    pub fn confirm_submitted(&mut self, timestamp_ms: u64) -> bool {
        self.session.confirm_submitted(timestamp_ms)
    }

    /// `kind` is the snake_case item name, e.g. `"bookshelf"`
    pub fn buy(&mut self, kind: &str) -> Result<(), JsValue> {
        let kind = parse_item(kind)?;
        self.session.buy(kind).map_err(js_err)
    }

    pub fn place(&mut self, kind: &str, x: f32, y: f32) -> Result<(), JsValue> {
        let kind = parse_item(kind)?;
        self.session.place(kind, x, y).map_err(js_err)
    }

    pub fn pick_up(&mut self, x: f32, y: f32) -> Result<String, JsValue> {
        let kind = self.session.pick_up(x, y).map_err(js_err)?;
        serde_json::to_string(&kind).map_err(js_err)
    }
}

fn parse_item(kind: &str) -> Result<ItemKind, JsValue> {
    serde_json::from_value(serde_json::Value::String(kind.to_string())).map_err(js_err)
}

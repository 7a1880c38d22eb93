//! Platform abstraction layer
//!
//! In the browser the page script owns rendering, DOM and raw input. It
//! calls into [`WasmMatch`] once per animation frame and draws from the
//! JSON snapshot it gets back.

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::prelude::*;

    use crate::sim::{Direction, Match, MatchSnapshot, TickInput, start_new_game, tick};

    #[wasm_bindgen(start)]
    pub fn init() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }
    }

    /// One match, driven by the page's frame loop
    #[wasm_bindgen]
    pub struct WasmMatch {
        state: Match,
        input: TickInput,
    }

    #[wasm_bindgen]
    impl WasmMatch {
        #[wasm_bindgen(constructor)]
        pub fn new(seed: Option<f64>) -> WasmMatch {
            let seed = seed.unwrap_or_else(|| js_sys::Math::random() * u32::MAX as f64) as u64;
            log::info!("Match created with seed: {}", seed);
            WasmMatch {
                state: Match::new(seed),
                input: TickInput::default(),
            }
        }

        /// Space / tap on the title or result screen
        pub fn start_new_game(&mut self) -> bool {
            start_new_game(&mut self.state)
        }

        /// Held direction: 0 up, 1 right, 2 down, 3 left, anything else none
        pub fn set_movement(&mut self, dir: i32) {
            self.input.movement = usize::try_from(dir)
                .ok()
                .and_then(|d| Direction::ALL.get(d).copied());
        }

        /// Attack pressed; consumed by the next tick
        pub fn press_attack(&mut self) {
            self.input.attack = true;
        }

        pub fn set_autopilot(&mut self, on: bool) {
            self.input.autopilot = on;
        }

        /// Advance by the frame delta in milliseconds
        pub fn tick(&mut self, dt: f64) {
            tick(&mut self.state, &self.input, dt);
            self.input.attack = false;
        }

        pub fn snapshot_json(&self) -> Result<String, JsValue> {
            serde_json::to_string(&MatchSnapshot::capture(&self.state))
                .map_err(|e| JsValue::from_str(&e.to_string()))
        }

        /// Events since the last call, for sound effects and UI flashes
        pub fn events_json(&mut self) -> Result<String, JsValue> {
            serde_json::to_string(&self.state.drain_events())
                .map_err(|e| JsValue::from_str(&e.to_string()))
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WasmMatch;

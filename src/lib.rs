/// KB Search Launcher - Chrome Extension for knowledge-base deep links
/// Built with Rust + WASM + Yew

pub mod compose;
pub mod error;
pub mod labels;
pub mod preview;
pub mod rules;
pub mod settings;
pub mod ui;

use settings::{LastToggleState, RuntimeMode, Settings};
use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export URL composition for JavaScript access (omnibox, context menus)
#[wasm_bindgen]
pub fn compose_search_url(
    term: &str,
    settings: JsValue,
    unfiltered: bool,
    custom_default: bool,
) -> Result<String, JsValue> {
    let settings: Settings = if settings.is_null() || settings.is_undefined() {
        Settings::new()
    } else {
        serde_wasm_bindgen::from_value::<Settings>(settings)?.sanitize()
    };

    let mode = RuntimeMode::from(LastToggleState {
        unfiltered,
        custom_default,
    });
    Ok(compose::compose_search_url(term, &settings, mode))
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

// Start the Yew app for the options page
#[wasm_bindgen]
pub fn start_options() {
    yew::Renderer::<ui::options::OptionsPage>::new().render();
}

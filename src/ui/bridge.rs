/// Async wrappers over the extension APIs exposed by `extension.js`

use crate::error::BridgeError;
use crate::settings::{SearchResultBehavior, Settings, SettingsPatch, Theme};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/extension.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getSettings(defaults: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSettings(partial: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn createTab(url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateCurrentTab(url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn openOptionsPage() -> Result<(), JsValue>;
}

/// Plain JS object for storage; maps must not become `Map` instances
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, BridgeError> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

/// Read the settings record, with defaults for every missing key
pub async fn load_settings() -> Result<Settings, BridgeError> {
    let defaults = to_js(&Settings::new())?;
    let stored = getSettings(defaults)
        .await
        .map_err(|e| BridgeError::Storage(format!("{:?}", e)))?;

    if stored.is_null() || stored.is_undefined() {
        return Ok(Settings::new());
    }

    let settings: Settings = serde_wasm_bindgen::from_value(stored)?;
    Ok(settings.sanitize())
}

/// Write only the fields present in `patch`
pub async fn save_settings(patch: &SettingsPatch) -> Result<(), BridgeError> {
    let partial = to_js(patch)?;
    setSettings(partial)
        .await
        .map_err(|e| BridgeError::Storage(format!("{:?}", e)))?;
    log::debug!("Saved settings patch {:?}", patch);
    Ok(())
}

pub async fn open_search_result(url: &str, behavior: SearchResultBehavior) -> Result<(), BridgeError> {
    log::info!("Opening {} ({})", url, behavior.as_str());
    let result = match behavior {
        SearchResultBehavior::NewTab => createTab(url).await,
        SearchResultBehavior::CurrentTab => updateCurrentTab(url).await,
    };
    result.map_err(|e| BridgeError::Tabs(format!("{:?}", e)))
}

pub async fn open_options() -> Result<(), BridgeError> {
    openOptionsPage()
        .await
        .map_err(|e| BridgeError::Tabs(format!("{:?}", e)))
}

/// Set `data-theme` on the document element
pub fn apply_theme(theme: Theme) -> Result<(), BridgeError> {
    let root = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
        .ok_or_else(|| BridgeError::Dom("no document element".to_string()))?;

    root.set_attribute("data-theme", theme.as_str())
        .map_err(|e| BridgeError::Dom(format!("{:?}", e)))
}

/// Run `f` once after `ms` milliseconds
pub fn after_delay(ms: i32, f: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };

    let callback: js_sys::Function = Closure::once_into_js(f).unchecked_into();
    if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(&callback, ms) {
        log::warn!("Failed to schedule timer: {:?}", e);
    }
}

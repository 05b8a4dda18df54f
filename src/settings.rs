/// Persisted preferences for chrome.storage.sync
use crate::compose::locale_filter;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Query key that is never persisted in base params; the popup sets it per search
pub const SEARCH_KEY: &str = "search";

/// Color scheme applied through the `data-theme` attribute
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::System => "system",
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parse a `<select>` value, falling back to `System`
    pub fn from_value(value: &str) -> Theme {
        match value {
            "light" => Theme::Light,
            "dark" => Theme::Dark,
            _ => Theme::System,
        }
    }
}

/// Where the composed search URL is opened
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SearchResultBehavior {
    #[default]
    NewTab,
    CurrentTab,
}

impl SearchResultBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchResultBehavior::NewTab => "newTab",
            SearchResultBehavior::CurrentTab => "currentTab",
        }
    }

    pub fn from_value(value: &str) -> SearchResultBehavior {
        match value {
            "currentTab" => SearchResultBehavior::CurrentTab,
            _ => SearchResultBehavior::NewTab,
        }
    }
}

/// Behavior selector for a single search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    /// Empty filters and sort, base params ignored
    Unfiltered,
    /// Replay the captured base params
    CustomDefault,
    /// Neither switch on
    Default,
}

impl RuntimeMode {
    pub fn is_unfiltered(&self) -> bool {
        *self == RuntimeMode::Unfiltered
    }

    pub fn is_custom_default(&self) -> bool {
        *self == RuntimeMode::CustomDefault
    }

    /// Flip the "unfiltered" switch. Turning it on turns "custom default" off.
    pub fn with_unfiltered(self, on: bool) -> RuntimeMode {
        match (on, self) {
            (true, _) => RuntimeMode::Unfiltered,
            (false, RuntimeMode::Unfiltered) => RuntimeMode::Default,
            (false, other) => other,
        }
    }

    /// Flip the "custom default" switch. Turning it on turns "unfiltered" off.
    pub fn with_custom_default(self, on: bool) -> RuntimeMode {
        match (on, self) {
            (true, _) => RuntimeMode::CustomDefault,
            (false, RuntimeMode::CustomDefault) => RuntimeMode::Default,
            (false, other) => other,
        }
    }
}

/// Persisted shape of the popup switches
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LastToggleState {
    pub unfiltered: bool,
    pub custom_default: bool,
}

impl From<LastToggleState> for RuntimeMode {
    fn from(state: LastToggleState) -> Self {
        // unfiltered is checked first
        if state.unfiltered {
            RuntimeMode::Unfiltered
        } else if state.custom_default {
            RuntimeMode::CustomDefault
        } else {
            RuntimeMode::Default
        }
    }
}

impl From<RuntimeMode> for LastToggleState {
    fn from(mode: RuntimeMode) -> Self {
        LastToggleState {
            unfiltered: mode.is_unfiltered(),
            custom_default: mode.is_custom_default(),
        }
    }
}

/// Root settings record.
///
/// Reading is per field: a missing, null or unrecognised value keeps that
/// field's default and never fails the whole record.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub base_params: BTreeMap<String, String>,
    pub keep_filters: bool,
    pub keep_sort: bool,
    pub force_share_view: bool,
    pub theme: Theme,
    pub search_result_behavior: SearchResultBehavior,
    pub remember_toggle_state: bool,
    pub last_toggle_state: LastToggleState,
    pub has_seen_save_preference_intro: bool,
}

impl Settings {
    pub fn new() -> Self {
        Settings {
            base_params: default_base_params(),
            keep_filters: true,
            keep_sort: false,
            force_share_view: true,
            theme: Theme::System,
            search_result_behavior: SearchResultBehavior::NewTab,
            remember_toggle_state: false,
            last_toggle_state: LastToggleState::default(),
            has_seen_save_preference_intro: false,
        }
    }

    /// Replace base params, dropping any `search` key
    pub fn set_base_params(&mut self, params: BTreeMap<String, String>) {
        self.base_params = params;
        strip_search(&mut self.base_params);
    }

    /// Enforce invariants on a record read back from storage
    pub fn sanitize(mut self) -> Self {
        strip_search(&mut self.base_params);
        self
    }

    fn read_field(&mut self, key: &str, value: Value) {
        match key {
            "baseParams" => self.set_base_params(string_entries(value)),
            "keepFilters" => read_or_keep(&mut self.keep_filters, key, value),
            "keepSort" => read_or_keep(&mut self.keep_sort, key, value),
            "forceShareView" => read_or_keep(&mut self.force_share_view, key, value),
            "theme" => read_or_keep(&mut self.theme, key, value),
            "searchResultBehavior" => read_or_keep(&mut self.search_result_behavior, key, value),
            "rememberToggleState" => read_or_keep(&mut self.remember_toggle_state, key, value),
            "lastToggleState" => read_or_keep(&mut self.last_toggle_state, key, value),
            "hasSeenSavePreferenceIntro" => read_or_keep(&mut self.has_seen_save_preference_intro, key, value),
            _ => {}
        }
    }

    /// Toggle state to start the popup with
    pub fn initial_mode(&self) -> RuntimeMode {
        if self.remember_toggle_state {
            self.last_toggle_state.into()
        } else {
            RuntimeMode::Default
        }
    }

    /// Apply a partial update, mirroring what storage does with `set`
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(params) = &patch.base_params {
            self.set_base_params(params.clone());
        }
        if let Some(v) = patch.keep_filters {
            self.keep_filters = v;
        }
        if let Some(v) = patch.keep_sort {
            self.keep_sort = v;
        }
        if let Some(v) = patch.force_share_view {
            self.force_share_view = v;
        }
        if let Some(v) = patch.theme {
            self.theme = v;
        }
        if let Some(v) = patch.search_result_behavior {
            self.search_result_behavior = v;
        }
        if let Some(v) = patch.remember_toggle_state {
            self.remember_toggle_state = v;
        }
        if let Some(v) = patch.last_toggle_state {
            self.last_toggle_state = v;
        }
        if let Some(v) = patch.has_seen_save_preference_intro {
            self.has_seen_save_preference_intro = v;
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Partial settings record; only present fields are written
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_params: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_filters: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_sort: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_share_view: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_result_behavior: Option<SearchResultBehavior>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remember_toggle_state: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_toggle_state: Option<LastToggleState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_seen_save_preference_intro: Option<bool>,
}

impl SettingsPatch {
    pub fn theme(theme: Theme) -> Self {
        SettingsPatch {
            theme: Some(theme),
            ..Default::default()
        }
    }

    pub fn toggle_state(mode: RuntimeMode) -> Self {
        SettingsPatch {
            last_toggle_state: Some(mode.into()),
            ..Default::default()
        }
    }

    /// What "Reset defaults" on the options page writes
    pub fn reset_defaults() -> Self {
        let defaults = Settings::new();
        SettingsPatch {
            base_params: Some(defaults.base_params),
            keep_filters: Some(defaults.keep_filters),
            keep_sort: Some(defaults.keep_sort),
            force_share_view: Some(defaults.force_share_view),
            ..Default::default()
        }
    }
}

fn default_base_params() -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("filters".to_string(), locale_filter(&["en_US"]));
    params
}

fn strip_search(params: &mut BTreeMap<String, String>) {
    params.retain(|k, _| !k.eq_ignore_ascii_case(SEARCH_KEY));
}

impl<'de> Deserialize<'de> for Settings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut settings = Settings::new();
        let record = match Value::deserialize(deserializer)? {
            Value::Object(record) => record,
            Value::Null => Map::new(),
            other => {
                log::warn!("Stored settings are not an object, using defaults: {}", other);
                Map::new()
            }
        };

        for (key, value) in record {
            settings.read_field(&key, value);
        }
        Ok(settings)
    }
}

/// Overwrite `slot` when `value` decodes; otherwise keep what is there
fn read_or_keep<T: DeserializeOwned>(slot: &mut T, key: &str, value: Value) {
    if value.is_null() {
        return;
    }
    match serde_json::from_value(value) {
        Ok(parsed) => *slot = parsed,
        Err(e) => log::warn!("Ignoring stored {}: {}", key, e),
    }
}

/// String-valued entries of an object; null or anything else is empty
fn string_entries(value: Value) -> BTreeMap<String, String> {
    match value {
        Value::Object(entries) => entries
            .into_iter()
            .filter_map(|(k, v)| match v {
                Value::String(s) => Some((k, s)),
                _ => None,
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::decode_rule_list;
    use crate::rules::{FilterRule, FilterType};

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::new();

        assert!(settings.keep_filters);
        assert!(!settings.keep_sort);
        assert!(settings.force_share_view);
        assert_eq!(settings.theme, Theme::System);
        assert_eq!(settings.search_result_behavior, SearchResultBehavior::NewTab);
        assert!(!settings.remember_toggle_state);
        assert!(!settings.has_seen_save_preference_intro);

        let filters: Vec<FilterRule> = decode_rule_list(&settings.base_params["filters"]).unwrap();
        assert_eq!(
            filters,
            vec![FilterRule::new("KB_LOCALE", FilterType::In, vec!["en_US".to_string()])]
        );
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let stored: Settings = serde_json::from_str(r#"{"keepSort":true,"theme":"dark"}"#).unwrap();

        assert!(stored.keep_sort);
        assert_eq!(stored.theme, Theme::Dark);
        assert!(stored.keep_filters);
        assert!(stored.base_params.contains_key("filters"));
    }

    #[test]
    fn test_null_base_params_become_empty() {
        let stored: Settings = serde_json::from_str(r#"{"baseParams":null}"#).unwrap();
        assert!(stored.base_params.is_empty());
    }

    #[test]
    fn test_unrecognised_values_keep_defaults() {
        let stored: Settings = serde_json::from_str(
            r#"{"theme":"auto","searchResultBehavior":"new_tab","keepFilters":"yes","keepSort":true}"#,
        )
        .unwrap();

        assert_eq!(stored.theme, Theme::System);
        assert_eq!(stored.search_result_behavior, SearchResultBehavior::NewTab);
        assert!(stored.keep_filters);
        assert!(stored.keep_sort);
    }

    #[test]
    fn test_null_fields_keep_defaults() {
        let stored: Settings = serde_json::from_str(
            r#"{"lastToggleState":null,"theme":null,"forceShareView":null,"rememberToggleState":true}"#,
        )
        .unwrap();

        assert_eq!(stored.last_toggle_state, LastToggleState::default());
        assert_eq!(stored.theme, Theme::System);
        assert!(stored.force_share_view);
        assert!(stored.remember_toggle_state);
    }

    #[test]
    fn test_malformed_toggle_state_and_params() {
        let stored: Settings = serde_json::from_str(
            r#"{"lastToggleState":{"unfiltered":"on"},"baseParams":{"view":"grid","page":2},"theme":"light"}"#,
        )
        .unwrap();

        assert_eq!(stored.last_toggle_state, LastToggleState::default());
        assert_eq!(stored.base_params.len(), 1);
        assert_eq!(stored.base_params["view"], "grid");
        assert_eq!(stored.theme, Theme::Light);
    }

    #[test]
    fn test_non_object_record_gives_defaults() {
        assert_eq!(serde_json::from_str::<Settings>("null").unwrap(), Settings::new());
        assert_eq!(serde_json::from_str::<Settings>("[1,2]").unwrap(), Settings::new());
    }

    #[test]
    fn test_sanitize_strips_search() {
        let stored: Settings =
            serde_json::from_str(r#"{"baseParams":{"search":"x","Search":"y","shareView":"1"}}"#).unwrap();

        let settings = stored.sanitize();

        assert_eq!(settings.base_params.len(), 1);
        assert_eq!(settings.base_params.get("shareView"), Some(&"1".to_string()));
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let json = serde_json::to_value(Settings::new()).unwrap();

        assert_eq!(json["searchResultBehavior"], "newTab");
        assert_eq!(json["lastToggleState"]["customDefault"], false);
        assert_eq!(json["hasSeenSavePreferenceIntro"], false);
        assert_eq!(json["theme"], "system");
    }

    #[test]
    fn test_patch_only_serializes_present_fields() {
        let json = serde_json::to_string(&SettingsPatch::theme(Theme::Light)).unwrap();
        assert_eq!(json, r#"{"theme":"light"}"#);
    }

    #[test]
    fn test_apply_patch() {
        let mut settings = Settings::new();
        let mut params = BTreeMap::new();
        params.insert("search".to_string(), "stale".to_string());
        params.insert("sort".to_string(), "%255B%255D".to_string());

        settings.apply(&SettingsPatch {
            base_params: Some(params),
            keep_sort: Some(true),
            search_result_behavior: Some(SearchResultBehavior::CurrentTab),
            ..Default::default()
        });

        assert!(!settings.base_params.contains_key("search"));
        assert!(settings.base_params.contains_key("sort"));
        assert!(settings.keep_sort);
        assert!(settings.keep_filters);
        assert_eq!(settings.search_result_behavior, SearchResultBehavior::CurrentTab);
    }

    #[test]
    fn test_reset_defaults_patch() {
        let mut settings = Settings::new();
        settings.keep_filters = false;
        settings.base_params.clear();
        settings.theme = Theme::Dark;

        settings.apply(&SettingsPatch::reset_defaults());

        assert!(settings.keep_filters);
        assert_eq!(settings.base_params, Settings::new().base_params);
        // theme is not part of the reset
        assert_eq!(settings.theme, Theme::Dark);
    }

    #[test]
    fn test_toggle_switches_are_exclusive() {
        let mode = RuntimeMode::Default.with_unfiltered(true);
        assert_eq!(mode, RuntimeMode::Unfiltered);

        let mode = mode.with_custom_default(true);
        assert_eq!(mode, RuntimeMode::CustomDefault);

        let mode = mode.with_unfiltered(false);
        assert_eq!(mode, RuntimeMode::CustomDefault);

        let mode = mode.with_custom_default(false);
        assert_eq!(mode, RuntimeMode::Default);
    }

    #[test]
    fn test_toggle_state_unfiltered_wins() {
        let both = LastToggleState {
            unfiltered: true,
            custom_default: true,
        };

        assert_eq!(RuntimeMode::from(both), RuntimeMode::Unfiltered);
        assert_eq!(
            LastToggleState::from(RuntimeMode::CustomDefault),
            LastToggleState {
                unfiltered: false,
                custom_default: true
            }
        );
    }

    #[test]
    fn test_initial_mode_respects_remember_flag() {
        let mut settings = Settings::new();
        settings.last_toggle_state = RuntimeMode::CustomDefault.into();

        assert_eq!(settings.initial_mode(), RuntimeMode::Default);

        settings.remember_toggle_state = true;
        assert_eq!(settings.initial_mode(), RuntimeMode::CustomDefault);
    }

    #[test]
    fn test_select_values() {
        assert_eq!(Theme::from_value("dark"), Theme::Dark);
        assert_eq!(Theme::from_value("bogus"), Theme::System);
        assert_eq!(SearchResultBehavior::from_value("currentTab"), SearchResultBehavior::CurrentTab);
        assert_eq!(SearchResultBehavior::from_value(""), SearchResultBehavior::NewTab);
    }
}

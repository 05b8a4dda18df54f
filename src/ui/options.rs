/// Options page: base URL capture, behavior flags, URL preview

use crate::compose::{build_url_from_params, parse_params};
use crate::preview::parse_url_preview;
use crate::settings::{SearchResultBehavior, Settings, SettingsPatch, Theme};
use crate::ui::bridge::{after_delay, apply_theme, load_settings, save_settings};
use crate::ui::components::{PreviewList, ThemeSelect};
use patternfly_yew::prelude::*;
use std::collections::BTreeMap;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

const STATUS_CLEAR_MS: i32 = 1200;

#[derive(Clone, PartialEq)]
enum OptionsState {
    Loading,
    Idle,
    Saving,
    Error(String),
}

/// Which boolean preference a checkbox edits
#[derive(Clone, Copy, PartialEq)]
enum Flag {
    KeepFilters,
    KeepSort,
    ForceShareView,
    RememberToggleState,
}

impl Flag {
    fn get(self, settings: &Settings) -> bool {
        match self {
            Flag::KeepFilters => settings.keep_filters,
            Flag::KeepSort => settings.keep_sort,
            Flag::ForceShareView => settings.force_share_view,
            Flag::RememberToggleState => settings.remember_toggle_state,
        }
    }

    fn set(self, settings: &mut Settings, value: bool) {
        match self {
            Flag::KeepFilters => settings.keep_filters = value,
            Flag::KeepSort => settings.keep_sort = value,
            Flag::ForceShareView => settings.force_share_view = value,
            Flag::RememberToggleState => settings.remember_toggle_state = value,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Flag::KeepFilters => "Keep filters from the base URL",
            Flag::KeepSort => "Keep sort from the base URL",
            Flag::ForceShareView => "Always open the shareable view",
            Flag::RememberToggleState => "Remember popup switches",
        }
    }
}

/// Saving writes every field, so it needs settings that were actually read
fn can_save(loaded: bool, state: &OptionsState) -> bool {
    loaded && *state == OptionsState::Idle
}

/// Base URL field contents for stored params
fn base_url_text(settings: &Settings) -> String {
    if settings.base_params.is_empty() {
        String::new()
    } else {
        build_url_from_params(&settings.base_params)
    }
}

/// Base params captured from the field; blank means none
fn captured_params(base_url: &str) -> BTreeMap<String, String> {
    let base_url = base_url.trim();
    if base_url.is_empty() {
        BTreeMap::new()
    } else {
        parse_params(base_url)
    }
}

#[function_component(OptionsPage)]
pub fn options_page() -> Html {
    let state = use_state(|| OptionsState::Loading);
    let form = use_state(Settings::new);
    let base_url = use_state(String::new);
    let status = use_state(|| None::<String>);
    let show_intro = use_state(|| false);
    let loaded = use_state(|| false);

    // Restore on mount
    {
        let state = state.clone();
        let form = form.clone();
        let base_url = base_url.clone();
        let loaded = loaded.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                restore(state, form, base_url, loaded).await;
            });
            || ()
        });
    }

    let on_base_url = {
        let base_url = base_url.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlTextAreaElement>() {
                base_url.set(input.value());
            }
        })
    };

    let on_flag = {
        let form = form.clone();
        move |flag: Flag| {
            let form = form.clone();
            Callback::from(move |e: Event| {
                if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                    let mut updated = (*form).clone();
                    flag.set(&mut updated, input.checked());
                    form.set(updated);
                }
            })
        }
    };

    let on_behavior = {
        let form = form.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                let mut updated = (*form).clone();
                updated.search_result_behavior = SearchResultBehavior::from_value(&select.value());
                form.set(updated);
            }
        })
    };

    let on_theme = {
        let state = state.clone();
        let form = form.clone();

        Callback::from(move |theme: Theme| {
            let mut updated = (*form).clone();
            updated.theme = theme;
            form.set(updated);

            let state = state.clone();
            spawn_local(async move {
                if let Err(e) = save_settings(&SettingsPatch::theme(theme)).await {
                    state.set(OptionsState::Error(format!("Failed to save theme: {}", e)));
                    return;
                }
                if let Err(e) = apply_theme(theme) {
                    log::warn!("Failed to apply theme: {}", e);
                }
            });
        })
    };

    let on_save = {
        let state = state.clone();
        let form = form.clone();
        let base_url = base_url.clone();
        let status = status.clone();
        let show_intro = show_intro.clone();

        Callback::from(move |_: MouseEvent| {
            let draft = (*form).clone();
            let first_remember = draft.remember_toggle_state && !draft.has_seen_save_preference_intro;

            let patch = SettingsPatch {
                base_params: Some(captured_params(&base_url)),
                keep_filters: Some(draft.keep_filters),
                keep_sort: Some(draft.keep_sort),
                force_share_view: Some(draft.force_share_view),
                search_result_behavior: Some(draft.search_result_behavior),
                remember_toggle_state: Some(draft.remember_toggle_state),
                has_seen_save_preference_intro: first_remember.then_some(true),
                ..Default::default()
            };

            let state = state.clone();
            let form = form.clone();
            let status = status.clone();
            let show_intro = show_intro.clone();

            state.set(OptionsState::Saving);

            spawn_local(async move {
                match save_settings(&patch).await {
                    Ok(_) => {
                        let mut saved = draft;
                        saved.apply(&patch);
                        form.set(saved);
                        show_intro.set(first_remember);
                        state.set(OptionsState::Idle);
                        flash(status, "Saved");
                    }
                    Err(e) => {
                        log::error!("Failed to save options: {}", e);
                        state.set(OptionsState::Error(format!("Failed to save: {}", e)));
                    }
                }
            });
        })
    };

    let on_reset = {
        let state = state.clone();
        let form = form.clone();
        let base_url = base_url.clone();
        let status = status.clone();
        let loaded = loaded.clone();

        Callback::from(move |_: MouseEvent| {
            let state = state.clone();
            let form = form.clone();
            let base_url = base_url.clone();
            let status = status.clone();
            let loaded = loaded.clone();

            state.set(OptionsState::Saving);

            spawn_local(async move {
                if let Err(e) = save_settings(&SettingsPatch::reset_defaults()).await {
                    state.set(OptionsState::Error(format!("Failed to reset: {}", e)));
                    return;
                }
                restore(state, form, base_url, loaded).await;
                flash(status, "Defaults restored");
            });
        })
    };

    let on_dismiss_intro = {
        let show_intro = show_intro.clone();
        Callback::from(move |_: MouseEvent| show_intro.set(false))
    };

    let preview_entries = parse_url_preview(&base_url).entries();
    let is_busy = matches!(*state, OptionsState::Loading | OptionsState::Saving);
    let save_disabled = !can_save(*loaded, &state);

    html! {
        <div class="container">
            <div class="header">
                <h1 class="main-title">{"Knowledge Base Search Options"}</h1>
                <ThemeSelect value={form.theme} onchange={on_theme} />
            </div>

            // Status display
            {match &*state {
                OptionsState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{"Loading settings..."}</p>
                    </div>
                },
                OptionsState::Error(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
                OptionsState::Idle | OptionsState::Saving => html! {}
            }}

            if *show_intro {
                <Alert r#type={AlertType::Info} title={"Popup switches will be remembered"} inline={true}>
                    {"The Unfiltered and Custom default switches now keep their last position between searches."}
                    <Button onclick={on_dismiss_intro} variant={ButtonVariant::Link}>{"Got it"}</Button>
                </Alert>
            }

            <section class="section">
                <h2 class="section-title">{"Base URL"}</h2>
                <p class="section-hint">
                    {"Paste a knowledge-base URL with the filters and sort you want. Its search term is ignored."}
                </p>
                <textarea
                    id="baseUrl"
                    class="base-url-input"
                    rows="3"
                    value={(*base_url).clone()}
                    oninput={on_base_url}
                />
            </section>

            <section class="section">
                <h2 class="section-title">{"Preview"}</h2>
                <PreviewList entries={preview_entries} />
            </section>

            <section class="section">
                <h2 class="section-title">{"Behavior"}</h2>
                {for [Flag::KeepFilters, Flag::KeepSort, Flag::ForceShareView, Flag::RememberToggleState]
                    .into_iter()
                    .map(|flag| html! {
                        <label class="checkbox-row">
                            <input
                                type="checkbox"
                                checked={flag.get(&form)}
                                onchange={on_flag(flag)}
                            />
                            {format!(" {}", flag.label())}
                        </label>
                    })}
                <label class="select-row">
                    {"Open results in "}
                    <select onchange={on_behavior}>
                        <option
                            value={SearchResultBehavior::NewTab.as_str()}
                            selected={form.search_result_behavior == SearchResultBehavior::NewTab}
                        >
                            {"a new tab"}
                        </option>
                        <option
                            value={SearchResultBehavior::CurrentTab.as_str()}
                            selected={form.search_result_behavior == SearchResultBehavior::CurrentTab}
                        >
                            {"the current tab"}
                        </option>
                    </select>
                </label>
            </section>

            <div class="actions">
                <Button onclick={on_save} disabled={save_disabled} variant={ButtonVariant::Primary}>
                    {"Save"}
                </Button>
                <Button onclick={on_reset} disabled={is_busy} variant={ButtonVariant::Secondary}>
                    {"Reset defaults"}
                </Button>
                if let Some(message) = &*status {
                    <span id="status" class="status-text">{message.clone()}</span>
                }
            </div>
        </div>
    }
}

// Helper functions

async fn restore(
    state: UseStateHandle<OptionsState>,
    form: UseStateHandle<Settings>,
    base_url: UseStateHandle<String>,
    loaded: UseStateHandle<bool>,
) {
    match load_settings().await {
        Ok(settings) => {
            if let Err(e) = apply_theme(settings.theme) {
                log::warn!("Failed to apply theme: {}", e);
            }
            base_url.set(base_url_text(&settings));
            form.set(settings);
            loaded.set(true);
            state.set(OptionsState::Idle);
        }
        Err(e) => {
            log::error!("Failed to load settings: {}", e);
            loaded.set(false);
            state.set(OptionsState::Error(format!("Failed to load: {}", e)));
        }
    }
}

/// Show a status message, then clear it
fn flash(status: UseStateHandle<Option<String>>, message: &str) {
    status.set(Some(message.to_string()));
    after_delay(STATUS_CLEAR_MS, move || status.set(None));
}

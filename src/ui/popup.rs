/// Popup UI: search box, mode switches, theme

use crate::compose::compose_search_url;
use crate::settings::{RuntimeMode, Settings, SettingsPatch, Theme};
use crate::ui::bridge::{apply_theme, load_settings, open_options, open_search_result, save_settings};
use crate::ui::components::{ThemeSelect, ToggleSwitch};
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
enum PopupState {
    Loading,
    Idle,
    Searching,
    Error(String),
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| PopupState::Loading);
    let settings = use_state(Settings::new);
    let mode = use_state(|| RuntimeMode::Default);
    let term = use_state(String::new);

    // Load settings on mount
    {
        let state = state.clone();
        let settings = settings.clone();
        let mode = mode.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_settings().await {
                    Ok(loaded) => {
                        if let Err(e) = apply_theme(loaded.theme) {
                            log::warn!("Failed to apply theme: {}", e);
                        }
                        mode.set(loaded.initial_mode());
                        settings.set(loaded);
                        state.set(PopupState::Idle);
                    }
                    Err(e) => {
                        log::error!("Failed to load settings: {}", e);
                        state.set(PopupState::Error(format!("Failed to load settings: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    let on_input = {
        let term = term.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                term.set(input.value());
            }
        })
    };

    // Search handler
    let do_search = {
        let state = state.clone();
        let settings = settings.clone();
        let mode = mode.clone();
        let term = term.clone();

        Callback::from(move |_: ()| {
            let input = term.trim().to_string();
            if input.is_empty() {
                return;
            }

            let state = state.clone();
            let fallback = (*settings).clone();
            let mode = *mode;

            state.set(PopupState::Searching);

            spawn_local(async move {
                // Options may have changed since the popup opened
                let current = match load_settings().await {
                    Ok(current) => current,
                    Err(e) => {
                        log::warn!("Using cached settings: {}", e);
                        fallback
                    }
                };

                let url = compose_search_url(&input, &current, mode);
                match open_search_result(&url, current.search_result_behavior).await {
                    Ok(_) => state.set(PopupState::Idle),
                    Err(e) => state.set(PopupState::Error(format!("Search failed: {}", e))),
                }
            });
        })
    };

    let on_search_click = do_search.reform(|_: MouseEvent| ());

    let on_keydown = {
        let do_search = do_search.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                do_search.emit(());
            }
        })
    };

    // Mode switches; at most one is on
    let set_mode = {
        let state = state.clone();
        let settings = settings.clone();
        let mode = mode.clone();

        Callback::from(move |next: RuntimeMode| {
            mode.set(next);

            if settings.remember_toggle_state {
                let state = state.clone();
                spawn_local(async move {
                    if let Err(e) = save_settings(&SettingsPatch::toggle_state(next)).await {
                        state.set(PopupState::Error(format!("Failed to save: {}", e)));
                    }
                });
            }
        })
    };

    let on_unfiltered = {
        let set_mode = set_mode.clone();
        let current = *mode;
        Callback::from(move |on: bool| set_mode.emit(current.with_unfiltered(on)))
    };

    let on_custom_default = {
        let set_mode = set_mode.clone();
        let current = *mode;
        Callback::from(move |on: bool| set_mode.emit(current.with_custom_default(on)))
    };

    let on_theme = {
        let state = state.clone();
        let settings = settings.clone();

        Callback::from(move |theme: Theme| {
            let mut updated = (*settings).clone();
            updated.theme = theme;
            settings.set(updated);

            let state = state.clone();
            spawn_local(async move {
                // Persist before applying so the next read sees it
                if let Err(e) = save_settings(&SettingsPatch::theme(theme)).await {
                    state.set(PopupState::Error(format!("Failed to save: {}", e)));
                    return;
                }
                if let Err(e) = apply_theme(theme) {
                    log::warn!("Failed to apply theme: {}", e);
                }
            });
        })
    };

    let on_open_options = Callback::from(move |e: MouseEvent| {
        e.prevent_default();
        spawn_local(async move {
            if let Err(e) = open_options().await {
                log::warn!("Failed to open options: {}", e);
            }
        });
    });

    let is_busy = matches!(*state, PopupState::Loading | PopupState::Searching);

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Knowledge Base Search"}</h1>

            <div class="search-row">
                <input
                    id="searchInput"
                    type="text"
                    placeholder="Search the knowledge base..."
                    value={(*term).clone()}
                    oninput={on_input}
                    onkeydown={on_keydown}
                    class="search-input"
                />
                <Button onclick={on_search_click} disabled={is_busy} variant={ButtonVariant::Primary}>
                    {"Search"}
                </Button>
            </div>

            <div class="flex-column-gap">
                <ToggleSwitch
                    label="Unfiltered"
                    checked={mode.is_unfiltered()}
                    onchange={on_unfiltered}
                    disabled={is_busy}
                />
                <ToggleSwitch
                    label="Custom default"
                    checked={mode.is_custom_default()}
                    onchange={on_custom_default}
                    disabled={is_busy}
                />
            </div>

            // Status display
            {match &*state {
                PopupState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                PopupState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                PopupState::Idle | PopupState::Searching => html! {}
            }}

            <div class="footer-popup">
                <ThemeSelect value={settings.theme} onchange={on_theme} />
                <a href="#" id="openOptions" onclick={on_open_options}>{"Options"}</a>
            </div>
        </div>
    }
}

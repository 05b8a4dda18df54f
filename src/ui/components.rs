/// Reusable UI components

use crate::preview::PreviewEntry;
use crate::settings::Theme;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ToggleSwitchProps {
    pub label: AttrValue,
    pub checked: bool,
    pub onchange: Callback<bool>,
    #[prop_or(false)]
    pub disabled: bool,
}

/// Accessible on/off switch; space or enter flips it like a click
#[function_component(ToggleSwitch)]
pub fn toggle_switch(props: &ToggleSwitchProps) -> Html {
    let checked = props.checked;

    let onclick = {
        let onchange = props.onchange.clone();
        Callback::from(move |_: MouseEvent| onchange.emit(!checked))
    };

    let onkeydown = {
        let onchange = props.onchange.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == " " || e.key() == "Enter" {
                e.prevent_default();
                onchange.emit(!checked);
            }
        })
    };

    html! {
        <div class="switch-row">
            <span class="switch-label">{props.label.clone()}</span>
            <button
                class="switch"
                role="switch"
                aria-checked={checked.to_string()}
                data-on={checked.to_string()}
                disabled={props.disabled}
                {onclick}
                {onkeydown}
            >
                <span class="switch-knob"></span>
            </button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ThemeSelectProps {
    pub value: Theme,
    pub onchange: Callback<Theme>,
}

#[function_component(ThemeSelect)]
pub fn theme_select(props: &ThemeSelectProps) -> Html {
    let onchange = {
        let onchange = props.onchange.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                onchange.emit(Theme::from_value(&select.value()));
            }
        })
    };

    html! {
        <label class="theme-select">
            {"Theme "}
            <select {onchange}>
                {for [Theme::System, Theme::Light, Theme::Dark].into_iter().map(|theme| html! {
                    <option value={theme.as_str()} selected={theme == props.value}>
                        {theme_name(theme)}
                    </option>
                })}
            </select>
        </label>
    }
}

fn theme_name(theme: Theme) -> &'static str {
    match theme {
        Theme::System => "System",
        Theme::Light => "Light",
        Theme::Dark => "Dark",
    }
}

#[derive(Properties, PartialEq)]
pub struct PreviewListProps {
    pub entries: Vec<PreviewEntry>,
}

/// Decoded rows of a pasted URL
#[function_component(PreviewList)]
pub fn preview_list(props: &PreviewListProps) -> Html {
    if props.entries.is_empty() {
        return html! {
            <p class="preview-empty">{"Nothing to preview."}</p>
        };
    }

    html! {
        <ul class="preview-list">
            {for props.entries.iter().map(|entry| html! {
                <li class="preview-item">
                    <span class="preview-label">{&entry.label}</span>
                    if let Some(op) = &entry.operator {
                        <span class="preview-operator">{format!(" {} ", op)}</span>
                    } else {
                        <span class="preview-operator">{": "}</span>
                    }
                    <span class="preview-value">{&entry.value}</span>
                </li>
            })}
        </ul>
    }
}

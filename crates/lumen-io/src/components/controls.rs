//! The control panel: one widget per registered control.
//!
//! Widgets keep their draft in the shared [`ControlBank`] signal and only
//! report a [`Commit`] upward on the commit event: slider release
//! (`change`), checkbox click, or parameter slider release. Intermediate
//! slider movement (`input`) updates the draft alone.

use dioxus::prelude::*;
use lumen_edits::control::Param;
use lumen_edits::{Commit, ControlBank, ControlGroup, ControlUnit, ValueRange};

/// Props for the [`ControlPanel`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ControlPanelProps {
    /// Draft state of every control.
    bank: Signal<ControlBank>,
    /// Disable every widget (no image loaded yet).
    disabled: bool,
    /// Called with each committed control state.
    on_commit: EventHandler<Commit>,
}

/// Renders every control of the bank, grouped by panel section.
#[component]
pub fn ControlPanel(props: ControlPanelProps) -> Element {
    let bank = props.bank;
    let units: Vec<(&'static str, ControlGroup, ControlUnit)> = bank
        .read()
        .iter()
        .map(|unit| (unit.name(), unit.spec().group, unit.clone()))
        .collect();

    rsx! {
        div { class: "control-panel",
            for group in ControlGroup::ALL {
                section { key: "{group}", class: "control-group",
                    h3 { "{group}" }
                    for (name, _, unit) in units.iter().filter(|(_, g, _)| *g == group) {
                        div { key: "{name}",
                            {render_unit(unit, props.disabled, bank, props.on_commit)}
                        }
                    }
                }
            }
        }
    }
}

fn render_unit(
    unit: &ControlUnit,
    disabled: bool,
    mut bank: Signal<ControlBank>,
    on_commit: EventHandler<Commit>,
) -> Element {
    let name = unit.name();
    match unit {
        ControlUnit::Slider(slider) => render_slider(
            name,
            slider.spec().label,
            slider.value(),
            ValueRange::CONTINUOUS,
            disabled,
            move |value| {
                if let Some(slider) = bank.write().slider_mut(name) {
                    slider.set_draft(value);
                }
            },
            move || {
                let commit = bank.write().slider_mut(name).map(|s| s.release());
                if let Some(commit) = commit {
                    on_commit.call(commit);
                }
            },
        ),

        ControlUnit::Toggle(toggle) => render_toggle(
            name,
            toggle.spec().label,
            toggle.enabled(),
            disabled,
            move |checked| {
                let commit = bank.write().toggle_mut(name).map(|t| t.set(checked));
                if let Some(commit) = commit {
                    on_commit.call(commit);
                }
            },
        ),

        ControlUnit::ToggleParams(control) => {
            let enabled = control.enabled();
            let params: Vec<(&'static str, Param)> = control
                .params()
                .iter()
                .map(|p| (p.spec().name, p.clone()))
                .collect();
            rsx! {
                div { class: "toggle-params",
                    {render_toggle(
                        name,
                        control.spec().label,
                        enabled,
                        disabled,
                        move |checked| {
                            let commit =
                                bank.write().toggle_params_mut(name).map(|c| c.set(checked));
                            if let Some(commit) = commit {
                                on_commit.call(commit);
                            }
                        },
                    )}
                    if enabled {
                        for (param_name, param) in params {
                            div { key: "{param_name}", class: "param",
                                {render_param(name, &param, disabled, bank, on_commit)}
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_param(
    control: &'static str,
    param: &Param,
    disabled: bool,
    mut bank: Signal<ControlBank>,
    on_commit: EventHandler<Commit>,
) -> Element {
    let spec = param.spec();
    render_slider(
        &format!("{control}-{}", spec.name),
        spec.label,
        param.value(),
        ValueRange::PARAMETER,
        disabled,
        move |value| {
            if let Some(control) = bank.write().toggle_params_mut(control) {
                control.set_param_draft(spec.name, value);
            }
        },
        move || {
            let commit = bank
                .write()
                .toggle_params_mut(control)
                .and_then(|c| c.release_param(spec.name));
            if let Some(commit) = commit {
                on_commit.call(commit);
            }
        },
    )
}

/// Render a labeled range slider. `on_draft` fires while dragging,
/// `on_release` once when the thumb is let go.
fn render_slider(
    id: &str,
    label: &str,
    value: u8,
    range: ValueRange,
    disabled: bool,
    mut on_draft: impl FnMut(f64) + 'static,
    mut on_release: impl FnMut() + 'static,
) -> Element {
    let id = id.to_string();
    let label = label.to_string();
    let (min, max) = (range.min, range.max);

    rsx! {
        div { class: "slider",
            div { class: "slider-header",
                label { r#for: "{id}", "{label}" }
                span { class: "slider-value", "{value}" }
            }
            input {
                r#type: "range",
                id: "{id}",
                min: "{min}",
                max: "{max}",
                step: "1",
                value: "{value}",
                disabled,
                oninput: move |e| match e.value().parse::<f64>() {
                    Ok(v) => on_draft(v),
                    Err(err) => tracing::warn!(?err, value = %e.value(), "slider parse failure"),
                },
                onchange: move |_| on_release(),
            }
        }
    }
}

/// Render a labeled checkbox that commits on click.
fn render_toggle(
    id: &str,
    label: &str,
    checked: bool,
    disabled: bool,
    mut on_change: impl FnMut(bool) + 'static,
) -> Element {
    let id = id.to_string();
    let label = label.to_string();

    rsx! {
        div { class: "toggle",
            input {
                r#type: "checkbox",
                id: "{id}",
                checked,
                disabled,
                onchange: move |e| on_change(e.checked()),
            }
            label { r#for: "{id}", "{label}" }
        }
    }
}

//! Turning command-line assignments into an edit document.
//!
//! Every assignment goes through the same control units and store as the
//! web app, so clamping and parameter carry-over behave identically.

use lumen_edits::{CATALOG, Commit, ControlBank, ControlState, EditDocument, EditStore};

/// `--set NAME=VALUE`: move a slider and release it.
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    pub name: String,
    pub value: f64,
}

/// `--param NAME.PARAM=VALUE`: move one filter parameter and release it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSetting {
    pub control: String,
    pub param: String,
    pub value: f64,
}

/// Errors building the document.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// No control is registered under this name.
    #[error("unknown control {name:?} (available: {available})")]
    UnknownControl { name: String, available: String },

    /// The control exists but cannot take this kind of assignment.
    #[error("control {name:?} is not {expected}")]
    WrongKind {
        name: String,
        expected: &'static str,
    },

    /// The filter has no parameter with this name.
    #[error("control {control:?} has no parameter {param:?}")]
    UnknownParam { control: String, param: String },
}

/// Parse `NAME=VALUE`.
///
/// # Errors
///
/// Returns a message for clap when the `=` is missing or the value is
/// not a finite number.
pub fn parse_setting(raw: &str) -> Result<Setting, String> {
    let (name, value) = split_assignment(raw)?;
    Ok(Setting {
        name: name.to_owned(),
        value,
    })
}

/// Parse `NAME.PARAM=VALUE`.
///
/// # Errors
///
/// Returns a message for clap when the assignment is malformed.
pub fn parse_param(raw: &str) -> Result<ParamSetting, String> {
    let (target, value) = split_assignment(raw)?;
    let (control, param) = target
        .split_once('.')
        .filter(|(c, p)| !c.is_empty() && !p.is_empty())
        .ok_or_else(|| format!("expected NAME.PARAM=VALUE, got {raw:?}"))?;
    Ok(ParamSetting {
        control: control.to_owned(),
        param: param.to_owned(),
        value,
    })
}

fn split_assignment(raw: &str) -> Result<(&str, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .map(|(n, v)| (n.trim(), v.trim()))
        .filter(|(n, _)| !n.is_empty())
        .ok_or_else(|| format!("expected NAME=VALUE, got {raw:?}"))?;
    let value: f64 = value
        .parse()
        .map_err(|_| format!("{value:?} is not a number"))?;
    if !value.is_finite() {
        return Err(format!("{value} is not a finite number"));
    }
    Ok((name, value))
}

/// All edits requested on one command line.
///
/// Applied in a fixed order: the seed document, sliders, filter
/// parameters, then switches. Parameter commits carry the gate state and
/// switch commits carry the committed parameters, so the result does not
/// depend on that order.
#[derive(Debug, Clone, Default)]
pub struct EditPlan {
    pub seed: Option<EditDocument>,
    pub sets: Vec<Setting>,
    pub params: Vec<ParamSetting>,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
}

impl EditPlan {
    /// Run every assignment through the control units.
    ///
    /// # Errors
    ///
    /// Returns [`EditError`] for an unknown control or parameter, or an
    /// assignment that does not fit the control's kind.
    pub fn build(&self) -> Result<EditDocument, EditError> {
        let mut bank = ControlBank::from_catalog();
        let mut store = EditStore::new();

        if let Some(seed) = &self.seed {
            for (name, state) in seed.iter() {
                if !bank.restore(name, state) {
                    return Err(rejection(&bank, name, shape_of(state)));
                }
                let Some(unit) = bank.get(name) else {
                    return Err(rejection(&bank, name, shape_of(state)));
                };
                store.apply(Commit::new(name, unit.state()));
            }
        }

        for setting in &self.sets {
            let Some(slider) = bank.slider_mut(&setting.name) else {
                return Err(rejection(&bank, &setting.name, "a slider"));
            };
            slider.set_draft(setting.value);
            store.apply(slider.release());
        }

        for setting in &self.params {
            let Some(unit) = bank.toggle_params_mut(&setting.control) else {
                return Err(rejection(
                    &bank,
                    &setting.control,
                    "a filter with parameters",
                ));
            };
            unit.set_param_draft(&setting.param, setting.value);
            let commit = unit
                .release_param(&setting.param)
                .ok_or_else(|| EditError::UnknownParam {
                    control: setting.control.clone(),
                    param: setting.param.clone(),
                })?;
            store.apply(commit);
        }

        let switches = self
            .enable
            .iter()
            .map(|name| (name, true))
            .chain(self.disable.iter().map(|name| (name, false)));
        for (name, enabled) in switches {
            let commit = switch(&mut bank, name, enabled)?;
            store.apply(commit);
        }

        tracing::debug!(
            controls = store.document().len(),
            revision = store.revision(),
            "edit document built"
        );
        Ok(store.document().clone())
    }
}

fn switch(bank: &mut ControlBank, name: &str, enabled: bool) -> Result<Commit, EditError> {
    if let Some(toggle) = bank.toggle_mut(name) {
        return Ok(toggle.set(enabled));
    }
    if let Some(unit) = bank.toggle_params_mut(name) {
        return Ok(unit.set(enabled));
    }
    Err(rejection(bank, name, "a filter"))
}

const fn shape_of(state: &ControlState) -> &'static str {
    match state {
        ControlState::Continuous { .. } => "a slider",
        ControlState::Toggle { .. } => "a toggle",
        ControlState::ToggleParams { .. } => "a filter with parameters",
    }
}

/// Unknown names list the catalog; known names get a kind mismatch.
fn rejection(bank: &ControlBank, name: &str, expected: &'static str) -> EditError {
    if bank.get(name).is_some() {
        EditError::WrongKind {
            name: name.to_owned(),
            expected,
        }
    } else {
        EditError::UnknownControl {
            name: name.to_owned(),
            available: CATALOG
                .iter()
                .map(|spec| spec.name)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

//! Control units: local draft state plus an explicit commit.
//!
//! A unit's draft changes freely during interaction (dragging a slider)
//! without touching the shared document. Only the commit event (slider
//! release, toggle click) produces a [`Commit`] for the
//! [`EditStore`](crate::EditStore) to merge.

use std::collections::BTreeMap;

use crate::catalog::{CATALOG, ControlKind, ControlSpec, ParamSpec};
use crate::document::{Commit, ControlState, ValueRange};

/// A slider-only control writing a continuous value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slider {
    spec: &'static ControlSpec,
    draft: u8,
}

impl Slider {
    fn new(spec: &'static ControlSpec, default: u8) -> Self {
        Self {
            spec,
            draft: ValueRange::CONTINUOUS.clamp_u8(default),
        }
    }

    /// The declaration this unit was created from.
    #[must_use]
    pub const fn spec(&self) -> &'static ControlSpec {
        self.spec
    }

    /// Current draft position.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.draft
    }

    /// Move the draft without committing. NaN input is ignored.
    ///
    /// Returns `true` if the draft changed.
    pub fn set_draft(&mut self, value: f64) -> bool {
        match ValueRange::CONTINUOUS.clamp(value) {
            Some(v) if v != self.draft => {
                self.draft = v;
                true
            }
            _ => false,
        }
    }

    /// Commit the draft (pointer released).
    #[must_use]
    pub fn release(&self) -> Commit {
        Commit::new(self.spec.name, self.state())
    }

    /// The state a commit would carry right now.
    #[must_use]
    pub const fn state(&self) -> ControlState {
        ControlState::Continuous {
            enabled: true,
            value: self.draft,
        }
    }
}

/// A pure on/off control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggle {
    spec: &'static ControlSpec,
    enabled: bool,
}

impl Toggle {
    const fn new(spec: &'static ControlSpec) -> Self {
        Self {
            spec,
            enabled: false,
        }
    }

    /// The declaration this unit was created from.
    #[must_use]
    pub const fn spec(&self) -> &'static ControlSpec {
        self.spec
    }

    /// Whether the control is on.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Flip the control and commit immediately.
    #[must_use]
    pub fn click(&mut self) -> Commit {
        self.set(!self.enabled)
    }

    /// Set the control to `enabled` and commit immediately.
    #[must_use]
    pub fn set(&mut self, enabled: bool) -> Commit {
        self.enabled = enabled;
        Commit::new(self.spec.name, self.state())
    }

    /// The state a commit would carry right now.
    #[must_use]
    pub const fn state(&self) -> ControlState {
        ControlState::Toggle {
            enabled: self.enabled,
        }
    }
}

/// One parameter's draft and last committed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    spec: &'static ParamSpec,
    draft: u8,
    committed: u8,
}

impl Param {
    fn new(spec: &'static ParamSpec) -> Self {
        Self {
            spec,
            draft: spec.default,
            committed: spec.default,
        }
    }

    /// The declaration of this parameter.
    #[must_use]
    pub const fn spec(&self) -> &'static ParamSpec {
        self.spec
    }

    /// Draft value currently shown on the slider.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.draft
    }
}

/// An on/off gate with named numeric parameters.
///
/// Parameter values survive while the gate is off: every commit, including
/// the one that disables the control, carries the last committed value of
/// each parameter, so switching it back on restores them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleParams {
    spec: &'static ControlSpec,
    enabled: bool,
    params: Vec<Param>,
}

impl ToggleParams {
    fn new(spec: &'static ControlSpec, params: &'static [ParamSpec]) -> Self {
        Self {
            spec,
            enabled: false,
            params: params.iter().map(Param::new).collect(),
        }
    }

    /// The declaration this unit was created from.
    #[must_use]
    pub const fn spec(&self) -> &'static ControlSpec {
        self.spec
    }

    /// Whether the gate is on.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Parameters in display order.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Flip the gate and commit immediately.
    #[must_use]
    pub fn click(&mut self) -> Commit {
        self.set(!self.enabled)
    }

    /// Set the gate to `enabled` and commit immediately.
    #[must_use]
    pub fn set(&mut self, enabled: bool) -> Commit {
        self.enabled = enabled;
        Commit::new(self.spec.name, self.state())
    }

    /// Move one parameter's draft without committing.
    ///
    /// Returns `false` for an unknown parameter, NaN input, or no change.
    pub fn set_param_draft(&mut self, name: &str, value: f64) -> bool {
        let Some(v) = ValueRange::PARAMETER.clamp(value) else {
            return false;
        };
        match self.params.iter_mut().find(|p| p.spec.name == name) {
            Some(param) if param.draft != v => {
                param.draft = v;
                true
            }
            _ => false,
        }
    }

    /// Commit one parameter's draft (pointer released).
    ///
    /// Returns `None` if this control has no parameter called `name`.
    pub fn release_param(&mut self, name: &str) -> Option<Commit> {
        let param = self.params.iter_mut().find(|p| p.spec.name == name)?;
        param.committed = param.draft;
        Some(Commit::new(self.spec.name, self.state()))
    }

    /// The state a commit would carry right now.
    #[must_use]
    pub fn state(&self) -> ControlState {
        let params: BTreeMap<String, u8> = self
            .params
            .iter()
            .map(|p| (p.spec.name.to_owned(), p.committed))
            .collect();
        ControlState::ToggleParams {
            enabled: self.enabled,
            params,
        }
    }
}

/// Any control unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlUnit {
    /// Continuous slider.
    Slider(Slider),
    /// On/off toggle.
    Toggle(Toggle),
    /// Toggle with parameters.
    ToggleParams(ToggleParams),
}

impl ControlUnit {
    /// Create a unit in its default state from a catalog entry.
    #[must_use]
    pub fn from_spec(spec: &'static ControlSpec) -> Self {
        match spec.kind {
            ControlKind::Slider { default } => Self::Slider(Slider::new(spec, default)),
            ControlKind::Toggle => Self::Toggle(Toggle::new(spec)),
            ControlKind::ToggleParams { params } => {
                Self::ToggleParams(ToggleParams::new(spec, params))
            }
        }
    }

    /// The declaration this unit was created from.
    #[must_use]
    pub const fn spec(&self) -> &'static ControlSpec {
        match self {
            Self::Slider(s) => s.spec,
            Self::Toggle(t) => t.spec,
            Self::ToggleParams(t) => t.spec,
        }
    }

    /// Document key this unit writes.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.spec().name
    }

    /// The state a commit from this unit would carry right now.
    #[must_use]
    pub fn state(&self) -> ControlState {
        match self {
            Self::Slider(s) => s.state(),
            Self::Toggle(t) => t.state(),
            Self::ToggleParams(t) => t.state(),
        }
    }
}

/// Draft state of every control in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlBank {
    units: Vec<ControlUnit>,
}

impl Default for ControlBank {
    fn default() -> Self {
        Self::from_catalog()
    }
}

impl ControlBank {
    /// One unit per catalog entry, all at their defaults.
    #[must_use]
    pub fn from_catalog() -> Self {
        Self {
            units: CATALOG.iter().map(ControlUnit::from_spec).collect(),
        }
    }

    /// Return every unit to its default draft state.
    pub fn reset(&mut self) {
        for unit in &mut self.units {
            *unit = ControlUnit::from_spec(unit.spec());
        }
    }

    /// All units in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ControlUnit> {
        self.units.iter()
    }

    /// The unit writing `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ControlUnit> {
        self.units.iter().find(|u| u.name() == name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut ControlUnit> {
        self.units.iter_mut().find(|u| u.name() == name)
    }

    /// The slider writing `name`, if that control is a slider.
    pub fn slider_mut(&mut self, name: &str) -> Option<&mut Slider> {
        match self.get_mut(name)? {
            ControlUnit::Slider(s) => Some(s),
            _ => None,
        }
    }

    /// The toggle writing `name`, if that control is a toggle.
    pub fn toggle_mut(&mut self, name: &str) -> Option<&mut Toggle> {
        match self.get_mut(name)? {
            ControlUnit::Toggle(t) => Some(t),
            _ => None,
        }
    }

    /// The toggle+parameters unit writing `name`, if it is one.
    pub fn toggle_params_mut(&mut self, name: &str) -> Option<&mut ToggleParams> {
        match self.get_mut(name)? {
            ControlUnit::ToggleParams(t) => Some(t),
            _ => None,
        }
    }

    /// Move the unit writing `name` to an already committed `state`.
    ///
    /// Used when a document is loaded from elsewhere, so later commits
    /// from the same unit carry on from the loaded values. Parameters the
    /// unit does not declare are ignored.
    ///
    /// Returns `false` if no unit writes `name` or its kind does not
    /// match the shape of `state`.
    pub fn restore(&mut self, name: &str, state: &ControlState) -> bool {
        match (self.get_mut(name), state) {
            (Some(ControlUnit::Slider(s)), ControlState::Continuous { value, .. }) => {
                s.draft = ValueRange::CONTINUOUS.clamp_u8(*value);
                true
            }
            (Some(ControlUnit::Toggle(t)), ControlState::Toggle { enabled }) => {
                t.enabled = *enabled;
                true
            }
            (
                Some(ControlUnit::ToggleParams(t)),
                ControlState::ToggleParams { enabled, params },
            ) => {
                t.enabled = *enabled;
                for param in &mut t.params {
                    if let Some(&v) = params.get(param.spec.name) {
                        let v = ValueRange::PARAMETER.clamp_u8(v);
                        param.draft = v;
                        param.committed = v;
                    }
                }
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::EditStore;

    #[test]
    fn slider_drafts_do_not_commit_until_release() {
        let mut bank = ControlBank::from_catalog();
        let mut store = EditStore::new();

        let slider = bank.slider_mut("contrast").unwrap();
        slider.set_draft(60.0);
        slider.set_draft(70.0);
        slider.set_draft(80.0);
        assert!(store.document().is_empty());

        store.apply(slider.release());
        assert_eq!(
            store.document().get("contrast"),
            Some(&ControlState::Continuous {
                enabled: true,
                value: 80
            })
        );
    }

    #[test]
    fn slider_clamps_and_ignores_nan() {
        let mut bank = ControlBank::from_catalog();
        let slider = bank.slider_mut("gamma").unwrap();
        slider.set_draft(250.0);
        assert_eq!(slider.value(), 100);
        assert!(!slider.set_draft(f64::NAN));
        assert_eq!(slider.value(), 100);
        slider.set_draft(-3.0);
        assert_eq!(slider.value(), 0);
    }

    #[test]
    fn toggle_commits_on_click() {
        let mut bank = ControlBank::from_catalog();
        let toggle = bank.toggle_mut("grayscale").unwrap();
        assert_eq!(
            toggle.click(),
            Commit::new("grayscale", ControlState::Toggle { enabled: true })
        );
        assert_eq!(
            toggle.click(),
            Commit::new("grayscale", ControlState::Toggle { enabled: false })
        );
    }

    #[test]
    fn params_survive_disable_and_reenable() {
        let mut bank = ControlBank::from_catalog();
        let mut store = EditStore::new();
        let edges = bank.toggle_params_mut("edges").unwrap();

        store.apply(edges.click());
        edges.set_param_draft("threshold1", 42.0);
        store.apply(edges.release_param("threshold1").unwrap());
        edges.set_param_draft("threshold2", 300.0);
        store.apply(edges.release_param("threshold2").unwrap());

        // Disabling still carries the tuned values.
        store.apply(edges.click());
        let expected_params: BTreeMap<String, u8> =
            [("threshold1".to_owned(), 42), ("threshold2".to_owned(), 255)]
                .into_iter()
                .collect();
        assert_eq!(
            store.document().get("edges"),
            Some(&ControlState::ToggleParams {
                enabled: false,
                params: expected_params.clone(),
            })
        );

        // Re-enabling without touching the params restores them.
        store.apply(edges.click());
        assert_eq!(
            store.document().get("edges"),
            Some(&ControlState::ToggleParams {
                enabled: true,
                params: expected_params,
            })
        );
    }

    #[test]
    fn unreleased_param_draft_is_not_sent() {
        let mut bank = ControlBank::from_catalog();
        let mean = bank.toggle_params_mut("mean").unwrap();
        mean.set_param_draft("kernel_size", 9.0);
        let commit = mean.click();
        let ControlState::ToggleParams { params, .. } = commit.state else {
            unreachable!("mean is a toggle+params control");
        };
        assert_eq!(params.get("kernel_size"), Some(&3));
    }

    #[test]
    fn unknown_param_is_rejected() {
        let mut bank = ControlBank::from_catalog();
        let median = bank.toggle_params_mut("median").unwrap();
        assert!(!median.set_param_draft("sigma", 4.0));
        assert!(median.release_param("sigma").is_none());
    }

    #[test]
    fn accessors_reject_mismatched_kinds() {
        let mut bank = ControlBank::from_catalog();
        assert!(bank.slider_mut("grayscale").is_none());
        assert!(bank.toggle_mut("contrast").is_none());
        assert!(bank.toggle_params_mut("grayscale").is_none());
        assert!(bank.get("sharpen").is_none());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut bank = ControlBank::from_catalog();
        bank.slider_mut("hue").unwrap().set_draft(5.0);
        let _ = bank.toggle_mut("minimum").unwrap().click();
        bank.reset();
        assert_eq!(bank, ControlBank::from_catalog());
    }

    #[test]
    fn restored_params_carry_into_later_commits() {
        let mut bank = ControlBank::from_catalog();
        let loaded = ControlState::ToggleParams {
            enabled: true,
            params: [("threshold1".to_owned(), 12), ("bogus".to_owned(), 7)]
                .into_iter()
                .collect(),
        };
        assert!(bank.restore("edges", &loaded));

        let edges = bank.toggle_params_mut("edges").unwrap();
        edges.set_param_draft("threshold2", 90.0);
        let commit = edges.release_param("threshold2").unwrap();
        let expected: BTreeMap<String, u8> =
            [("threshold1".to_owned(), 12), ("threshold2".to_owned(), 90)]
                .into_iter()
                .collect();
        assert_eq!(
            commit.state,
            ControlState::ToggleParams {
                enabled: true,
                params: expected,
            }
        );
    }

    #[test]
    fn restored_unit_state_fills_defaults_and_drops_undeclared() {
        let mut bank = ControlBank::from_catalog();
        let loaded = ControlState::ToggleParams {
            enabled: true,
            params: [("threshold1".to_owned(), 12), ("bogus".to_owned(), 7)]
                .into_iter()
                .collect(),
        };
        assert!(bank.restore("edges", &loaded));
        let expected: BTreeMap<String, u8> =
            [("threshold1".to_owned(), 12), ("threshold2".to_owned(), 100)]
                .into_iter()
                .collect();
        assert_eq!(
            bank.get("edges").unwrap().state(),
            ControlState::ToggleParams {
                enabled: true,
                params: expected,
            }
        );
    }

    #[test]
    fn restore_rejects_unknown_names_and_shapes() {
        let mut bank = ControlBank::from_catalog();
        assert!(!bank.restore("sharpen", &ControlState::Toggle { enabled: true }));
        assert!(!bank.restore("contrast", &ControlState::Toggle { enabled: true }));
        assert!(bank.restore(
            "contrast",
            &ControlState::Continuous {
                enabled: true,
                value: 70
            }
        ));
        assert_eq!(bank.slider_mut("contrast").unwrap().value(), 70);
    }

    #[test]
    fn every_unit_writes_its_catalog_name() {
        let bank = ControlBank::from_catalog();
        for (unit, spec) in bank.iter().zip(CATALOG) {
            assert_eq!(unit.name(), spec.name);
        }
    }
}

//! Static registry of the editor's controls.
//!
//! Every control unit is created from one [`ControlSpec`], so the key it
//! writes into the edit document is fixed for its whole lifetime.

use std::fmt;

/// Section of the control panel a control is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlGroup {
    /// Continuous photo adjustments (contrast, brightness, ...).
    Adjustments,
    /// On/off filters, some with numeric parameters.
    Filters,
}

impl ControlGroup {
    /// All groups in panel order.
    pub const ALL: [Self; 2] = [Self::Adjustments, Self::Filters];

    /// Heading shown above the group.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Adjustments => "Photo Adjustments",
            Self::Filters => "Filters",
        }
    }
}

impl fmt::Display for ControlGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named numeric parameter of a toggle+parameters control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Key inside the control's `params` mapping.
    pub name: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Initial value, within [`ValueRange::PARAMETER`](crate::ValueRange::PARAMETER).
    pub default: u8,
}

/// What kind of state a control produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Slider-only control producing a continuous value in `[0, 100]`.
    Slider {
        /// Initial slider position.
        default: u8,
    },
    /// Pure on/off control.
    Toggle,
    /// On/off gate plus named numeric parameters in `[0, 255]`.
    ToggleParams {
        /// Parameters in display order.
        params: &'static [ParamSpec],
    },
}

/// Declaration of one control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSpec {
    /// Edit document key written by this control.
    pub name: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Panel section.
    pub group: ControlGroup,
    /// State shape and defaults.
    pub kind: ControlKind,
}

const KERNEL_PARAMS: &[ParamSpec] = &[ParamSpec {
    name: "kernel_size",
    label: "Kernel Size",
    default: 3,
}];

const EDGE_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "threshold1",
        label: "Threshold 1",
        default: 30,
    },
    ParamSpec {
        name: "threshold2",
        label: "Threshold 2",
        default: 100,
    },
];

const fn slider(name: &'static str, label: &'static str) -> ControlSpec {
    ControlSpec {
        name,
        label,
        group: ControlGroup::Adjustments,
        kind: ControlKind::Slider { default: 50 },
    }
}

const fn toggle(name: &'static str, label: &'static str) -> ControlSpec {
    ControlSpec {
        name,
        label,
        group: ControlGroup::Filters,
        kind: ControlKind::Toggle,
    }
}

const fn toggle_params(
    name: &'static str,
    label: &'static str,
    params: &'static [ParamSpec],
) -> ControlSpec {
    ControlSpec {
        name,
        label,
        group: ControlGroup::Filters,
        kind: ControlKind::ToggleParams { params },
    }
}

/// Every control the editor offers, in panel order.
pub const CATALOG: &[ControlSpec] = &[
    slider("contrast", "Contrast"),
    slider("brightness", "Brightness"),
    slider("saturation", "Saturation"),
    slider("hue", "Hue"),
    slider("gamma", "Gamma Correction"),
    toggle("grayscale", "Grayscale"),
    toggle("minimum", "Minimum"),
    toggle("maximum", "Maximum"),
    toggle_params("mean", "Averaging", KERNEL_PARAMS),
    toggle_params("median", "Median", KERNEL_PARAMS),
    toggle_params("edges", "Edge Detection", EDGE_PARAMS),
];

/// Look up a control by its document key.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static ControlSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}

/// Controls belonging to `group`, in panel order.
pub fn in_group(group: ControlGroup) -> impl Iterator<Item = &'static ControlSpec> {
    CATALOG.iter().filter(move |spec| spec.group == group)
}

//! The shared edit document and its single writer.
//!
//! Control units never write the document themselves. They emit a
//! [`Commit`], and the [`EditStore`] merges it onto the latest document
//! with [`next_edit_document`]. A commit fully replaces the state for its
//! key and leaves every other key untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Inclusive integer range a control value is clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRange {
    /// Smallest allowed value.
    pub min: u8,
    /// Largest allowed value.
    pub max: u8,
}

impl ValueRange {
    /// Range of continuous slider values.
    pub const CONTINUOUS: Self = Self { min: 0, max: 100 };

    /// Range of toggle+parameters parameter values.
    pub const PARAMETER: Self = Self { min: 0, max: 255 };

    /// Round `value` to the nearest integer and clamp it into the range.
    ///
    /// Returns `None` for NaN, which has no meaningful position.
    #[must_use]
    pub fn clamp(self, value: f64) -> Option<u8> {
        if value.is_nan() {
            return None;
        }
        let clamped = value
            .round()
            .clamp(f64::from(self.min), f64::from(self.max));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = clamped as u8;
        Some(value)
    }

    /// Clamp an already-integral value into the range.
    #[must_use]
    pub fn clamp_u8(self, value: u8) -> u8 {
        value.clamp(self.min, self.max)
    }
}

/// The committed state of one control.
///
/// Serializes untagged, so the backend sees plain objects:
/// `{"enabled":true,"value":80}`, `{"enabled":false}` or
/// `{"enabled":true,"params":{"threshold1":30}}`. Deserializing clamps
/// every number into its range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, from = "RawControlState")]
pub enum ControlState {
    /// Produced by a slider-only control.
    Continuous {
        /// Whether the adjustment is applied.
        enabled: bool,
        /// Slider value in [`ValueRange::CONTINUOUS`].
        value: u8,
    },
    /// Produced by a toggle with named parameters.
    ToggleParams {
        /// Whether the filter is applied.
        enabled: bool,
        /// Parameter values in [`ValueRange::PARAMETER`].
        params: BTreeMap<String, u8>,
    },
    /// Produced by a pure on/off control.
    Toggle {
        /// Whether the filter is applied.
        enabled: bool,
    },
}

impl ControlState {
    /// Whether the control is switched on.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        match self {
            Self::Continuous { enabled, .. }
            | Self::ToggleParams { enabled, .. }
            | Self::Toggle { enabled } => *enabled,
        }
    }
}

/// Wire shape accepted when reading documents back in.
///
/// Numbers arrive as arbitrary JSON numbers and are clamped on
/// conversion. Variant order matters for untagged matching: the
/// field-carrying shapes must be tried before the bare toggle.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawControlState {
    Continuous {
        enabled: bool,
        value: f64,
    },
    ToggleParams {
        enabled: bool,
        params: BTreeMap<String, f64>,
    },
    Toggle {
        enabled: bool,
    },
}

impl From<RawControlState> for ControlState {
    fn from(raw: RawControlState) -> Self {
        match raw {
            RawControlState::Continuous { enabled, value } => Self::Continuous {
                enabled,
                value: ValueRange::CONTINUOUS
                    .clamp(value)
                    .unwrap_or(ValueRange::CONTINUOUS.min),
            },
            RawControlState::ToggleParams { enabled, params } => Self::ToggleParams {
                enabled,
                params: params
                    .into_iter()
                    .map(|(name, v)| {
                        let v = ValueRange::PARAMETER
                            .clamp(v)
                            .unwrap_or(ValueRange::PARAMETER.min);
                        (name, v)
                    })
                    .collect(),
            },
            RawControlState::Toggle { enabled } => Self::Toggle { enabled },
        }
    }
}

/// A control's request to replace its slice of the edit document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Document key owned by the emitting control.
    pub name: String,
    /// Full replacement state for that key.
    pub state: ControlState,
}

impl Commit {
    /// Create a commit for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, state: ControlState) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }
}

/// Mapping from control name to its committed state.
///
/// An absent key means the control was never touched; a present key with
/// `enabled: false` means it was explicitly switched off. Keys serialize
/// in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditDocument(BTreeMap<String, ControlState>);

impl EditDocument {
    /// An empty document (no control touched yet).
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// State committed for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ControlState> {
        self.0.get(name)
    }

    /// Number of touched controls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no control has committed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ControlState)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, ControlState)> for EditDocument {
    fn from_iter<I: IntoIterator<Item = (String, ControlState)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Merge one control's state onto `current`, producing the next document.
///
/// The entry for `name` is replaced wholesale; all other entries are
/// carried over unchanged.
#[must_use]
pub fn next_edit_document(current: &EditDocument, name: &str, state: ControlState) -> EditDocument {
    let mut next = current.0.clone();
    next.insert(name.to_owned(), state);
    EditDocument(next)
}

/// Owner of the one shared edit document.
///
/// Every write reads the latest document at apply time, so back-to-back
/// commits from different controls can never drop each other's keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditStore {
    document: EditDocument,
    revision: u64,
}

impl EditStore {
    /// An empty store for a fresh session.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            document: EditDocument::new(),
            revision: 0,
        }
    }

    /// The current document.
    #[must_use]
    pub const fn document(&self) -> &EditDocument {
        &self.document
    }

    /// Number of changes applied since the last reset.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Merge `commit` onto the latest document.
    ///
    /// Returns `true` if the document changed. Re-committing the state a
    /// key already holds is a no-op and does not bump the revision.
    pub fn apply(&mut self, commit: Commit) -> bool {
        if self.document.get(&commit.name) == Some(&commit.state) {
            tracing::debug!(control = %commit.name, "commit unchanged, skipping");
            return false;
        }
        tracing::debug!(control = %commit.name, state = ?commit.state, "commit applied");
        self.document = next_edit_document(&self.document, &commit.name, commit.state);
        self.revision += 1;
        true
    }

    /// Drop every committed entry. Only a fresh upload does this.
    pub fn reset(&mut self) {
        self.document = EditDocument::new();
        self.revision = 0;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn continuous(value: u8) -> ControlState {
        ControlState::Continuous {
            enabled: true,
            value,
        }
    }

    #[test]
    fn clamp_rounds_and_bounds() {
        assert_eq!(ValueRange::CONTINUOUS.clamp(-5.0), Some(0));
        assert_eq!(ValueRange::CONTINUOUS.clamp(140.0), Some(100));
        assert_eq!(ValueRange::CONTINUOUS.clamp(49.6), Some(50));
        assert_eq!(ValueRange::PARAMETER.clamp(300.0), Some(255));
        assert_eq!(ValueRange::PARAMETER.clamp(f64::INFINITY), Some(255));
        assert_eq!(ValueRange::PARAMETER.clamp(f64::NAN), None);
    }

    #[test]
    fn next_document_replaces_only_its_key() {
        let doc = next_edit_document(&EditDocument::new(), "contrast", continuous(80));
        let doc = next_edit_document(&doc, "grayscale", ControlState::Toggle { enabled: true });
        let doc = next_edit_document(&doc, "contrast", continuous(20));

        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get("contrast"), Some(&continuous(20)));
        assert_eq!(
            doc.get("grayscale"),
            Some(&ControlState::Toggle { enabled: true })
        );
    }

    #[test]
    fn back_to_back_commits_keep_every_key() {
        let mut store = EditStore::new();
        let names = ["contrast", "brightness", "grayscale", "edges", "contrast"];
        for (i, name) in names.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            store.apply(Commit::new(*name, continuous(i as u8 * 10)));
        }
        assert_eq!(store.document().len(), 4);
        assert_eq!(store.document().get("contrast"), Some(&continuous(40)));
        assert_eq!(store.document().get("brightness"), Some(&continuous(10)));
    }

    #[test]
    fn repeated_commit_is_idempotent() {
        let mut once = EditStore::new();
        once.apply(Commit::new("contrast", continuous(80)));

        let mut twice = EditStore::new();
        assert!(twice.apply(Commit::new("contrast", continuous(80))));
        assert!(!twice.apply(Commit::new("contrast", continuous(80))));

        assert_eq!(once.document(), twice.document());
        assert_eq!(twice.revision(), 1);
    }

    #[test]
    fn disabled_is_distinct_from_absent() {
        let mut store = EditStore::new();
        store.apply(Commit::new("grayscale", ControlState::Toggle { enabled: false }));
        let json = serde_json::to_string(store.document()).unwrap();
        assert_eq!(json, r#"{"grayscale":{"enabled":false}}"#);
        assert!(store.document().get("minimum").is_none());
    }

    #[test]
    fn reset_empties_the_document() {
        let mut store = EditStore::new();
        store.apply(Commit::new("contrast", continuous(80)));
        store.reset();
        assert!(store.document().is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn serializes_each_state_shape() {
        let doc: EditDocument = [
            ("contrast".to_owned(), continuous(80)),
            (
                "edges".to_owned(),
                ControlState::ToggleParams {
                    enabled: true,
                    params: [("threshold1".to_owned(), 30), ("threshold2".to_owned(), 100)]
                        .into_iter()
                        .collect(),
                },
            ),
            ("grayscale".to_owned(), ControlState::Toggle { enabled: true }),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contrast": {"enabled": true, "value": 80},
                "edges": {"enabled": true, "params": {"threshold1": 30, "threshold2": 100}},
                "grayscale": {"enabled": true},
            })
        );
    }

    #[test]
    fn deserializing_clamps_out_of_range_numbers() {
        let doc: EditDocument = serde_json::from_str(
            r#"{
                "contrast": {"enabled": true, "value": 250},
                "edges": {"enabled": false, "params": {"threshold1": -4, "threshold2": 999.7}},
                "grayscale": {"enabled": true}
            }"#,
        )
        .unwrap();

        assert_eq!(doc.get("contrast"), Some(&continuous(100)));
        let Some(ControlState::ToggleParams { enabled, params }) = doc.get("edges") else {
            unreachable!("edges should parse as toggle+params");
        };
        assert!(!enabled);
        assert_eq!(params.get("threshold1"), Some(&0));
        assert_eq!(params.get("threshold2"), Some(&255));
        assert_eq!(
            doc.get("grayscale"),
            Some(&ControlState::Toggle { enabled: true })
        );
    }
}

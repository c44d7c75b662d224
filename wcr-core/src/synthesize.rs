//! Derived field synthesis: per-line sequence markers.
//!
//! Line `n` owns a group of member fields. Its marker `item_sr_no_{n}` is
//! `n` when any member is non-empty in the normalized context and `""`
//! otherwise. Groups are independent of each other.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Placeholder replaced by the line number in member templates.
pub const LINE_PLACEHOLDER: &str = "{n}";

/// Member fields of every line group, as `{n}` templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineGroupLayout {
    #[serde(default = "default_count")]
    pub count: u8,
    #[serde(default = "default_members")]
    pub members: Vec<String>,
}

fn default_count() -> u8 {
    3
}

fn default_members() -> Vec<String> {
    [
        "Line_{n}_Workstatus",
        "Line_{n}_WO_Qty",
        "Line_{n}_UOM",
        "Line_{n}_PB_Qty",
        "Line_{n}_TBB_Qty",
        "Line_{n}_Cum_Qty",
        "Line_{n}_Bal_Qty",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for LineGroupLayout {
    fn default() -> Self {
        LineGroupLayout {
            count: default_count(),
            members: default_members(),
        }
    }
}

impl LineGroupLayout {
    /// Reject layouts whose members would not differ between lines.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::LineGroups("count must be at least 1".into()));
        }
        if let Some(bad) = self.members.iter().find(|m| !m.contains(LINE_PLACEHOLDER)) {
            return Err(ConfigError::LineGroups(format!(
                "member '{bad}' has no {LINE_PLACEHOLDER} placeholder"
            )));
        }
        Ok(())
    }

    /// Line numbers, 1-based.
    pub fn lines(&self) -> impl Iterator<Item = u8> {
        1..=self.count
    }

    /// Concrete member field names for line `n`.
    pub fn members_of(&self, n: u8) -> Vec<String> {
        let num = n.to_string();
        self.members
            .iter()
            .map(|m| m.replace(LINE_PLACEHOLDER, &num))
            .collect()
    }
}

/// Marker field name for line `n`.
pub fn marker_field(n: u8) -> String {
    format!("item_sr_no_{n}")
}

/// Compute the marker for line `n` from already-normalized values.
pub fn synthesize_marker(
    values: &BTreeMap<String, String>,
    layout: &LineGroupLayout,
    n: u8,
) -> (String, String) {
    let present = layout
        .members_of(n)
        .iter()
        .any(|field| values.get(field).is_some_and(|v| !v.is_empty()));
    let value = if present { n.to_string() } else { String::new() };
    (marker_field(n), value)
}

/// Markers for every line in the layout.
pub fn synthesize_markers(
    values: &BTreeMap<String, String>,
    layout: &LineGroupLayout,
) -> Vec<(String, String)> {
    layout
        .lines()
        .map(|n| synthesize_marker(values, layout, n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn blank_group_yields_blank_marker() {
        let layout = LineGroupLayout::default();
        let v = values(&[("Line_1_Workstatus", ""), ("Line_1_WO_Qty", "")]);
        assert_eq!(synthesize_marker(&v, &layout, 1), ("item_sr_no_1".into(), "".into()));
    }

    #[test]
    fn absent_fields_count_as_blank() {
        let layout = LineGroupLayout::default();
        let v = values(&[]);
        assert_eq!(synthesize_marker(&v, &layout, 3).1, "");
    }

    #[test]
    fn any_member_populates_marker() {
        let layout = LineGroupLayout::default();
        for member in layout.members_of(2) {
            let v = values(&[(member.as_str(), "10.00")]);
            assert_eq!(synthesize_marker(&v, &layout, 2).1, "2", "{member}");
        }
    }

    #[test]
    fn groups_do_not_leak_into_each_other() {
        let layout = LineGroupLayout::default();
        let v = values(&[("Line_2_Bal_Qty", "4.00")]);
        let markers = synthesize_markers(&v, &layout);
        assert_eq!(
            markers,
            vec![
                ("item_sr_no_1".to_string(), "".to_string()),
                ("item_sr_no_2".to_string(), "2".to_string()),
                ("item_sr_no_3".to_string(), "".to_string()),
            ]
        );
    }

    #[test]
    fn layout_without_placeholder_is_rejected() {
        let layout = LineGroupLayout {
            count: 3,
            members: vec!["Qty".to_string()],
        };
        assert!(layout.validate().is_err());
    }
}

#![forbid(unsafe_code)]

//! Drag vocabulary shared by the layout solver and the session state machine.

use core::fmt;

use serde::{Deserialize, Serialize};

/// What kind of entity a drag moves.
///
/// The kind selects both the collision strategy and which element counts as
/// the visual unit that detaches from the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragKind {
    /// A whole group, reordered within the flat list of groups.
    Group,
    /// A single site card, moved within or across group grids.
    Site,
}

impl DragKind {
    /// Wire name used in drop payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Site => "site",
        }
    }
}

impl fmt::Display for DragKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Live best-guess drop destination.
///
/// `group_id` is always `None` for group drags. `index` is an insertion index
/// into the post-removal list, so `index == len` means "append".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverTarget {
    pub group_id: Option<String>,
    pub index: usize,
}

impl HoverTarget {
    /// Insertion point in the top-level group list.
    #[must_use]
    pub const fn in_group_list(index: usize) -> Self {
        Self {
            group_id: None,
            index,
        }
    }

    /// Insertion point inside one group's site grid.
    #[must_use]
    pub fn in_group(group_id: impl Into<String>, index: usize) -> Self {
        Self {
            group_id: Some(group_id.into()),
            index,
        }
    }
}

/// Reorder instruction emitted once per completed drag.
///
/// Serializes to the wire shape consumed by the data layer:
/// `{"type": "site", "srcId": "...", "targetGroupId": "...", "targetIndex": 0}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropPayload {
    #[serde(rename = "type")]
    pub kind: DragKind,
    pub src_id: String,
    pub target_group_id: Option<String>,
    pub target_index: usize,
}

impl DropPayload {
    /// Build the payload for a group reorder.
    #[must_use]
    pub fn group(src_id: impl Into<String>, target_index: usize) -> Self {
        Self {
            kind: DragKind::Group,
            src_id: src_id.into(),
            target_group_id: None,
            target_index,
        }
    }

    /// Build the payload for a site move.
    #[must_use]
    pub fn site(
        src_id: impl Into<String>,
        target_group_id: impl Into<String>,
        target_index: usize,
    ) -> Self {
        Self {
            kind: DragKind::Site,
            src_id: src_id.into(),
            target_group_id: Some(target_group_id.into()),
            target_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn payload_uses_wire_field_names() {
        let payload = DropPayload::site("s1", "g2", 3);
        let json = serde_json::to_value(&payload).expect("serialize payload");
        assert_eq!(
            json,
            serde_json::json!({
                "type": "site",
                "srcId": "s1",
                "targetGroupId": "g2",
                "targetIndex": 3
            })
        );
    }

    #[test]
    fn group_payload_has_null_target_group() {
        let json = serde_json::to_string(&DropPayload::group("g3", 0)).expect("serialize");
        assert!(json.contains("\"targetGroupId\":null"));
        assert!(json.contains("\"type\":\"group\""));
        let back: DropPayload = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, DropPayload::group("g3", 0));
    }

    #[test]
    fn kind_display_matches_wire_name() {
        assert_eq!(DragKind::Group.to_string(), "group");
        assert_eq!(DragKind::Site.as_str(), "site");
    }
}

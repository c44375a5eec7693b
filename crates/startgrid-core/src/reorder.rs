#![forbid(unsafe_code)]

//! Host-side consumer for [`DropPayload`]s.
//!
//! The drag engine only reports *where* something should go. This module does
//! the actual splice against any ordered list of groups, provided the host
//! model implements [`GroupEntry`]. Validation happens before any mutation, so
//! a rejected payload leaves the list exactly as it was.

use core::fmt;

use crate::drag::{DragKind, DropPayload};

/// Anything addressable by a stable string key.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// A group that owns an ordered list of sites.
pub trait GroupEntry: Keyed {
    type Site: Keyed;

    fn sites(&self) -> &[Self::Site];
    fn sites_mut(&mut self) -> &mut Vec<Self::Site>;
}

/// What a successful [`apply_drop`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// The payload resolved to the position the entry already had.
    Unchanged,
    /// A group moved within the top-level list.
    GroupMoved { from: usize, to: usize },
    /// A site moved, possibly across groups.
    SiteMoved {
        from_group: usize,
        from_index: usize,
        to_group: usize,
        to_index: usize,
    },
}

/// Why a payload could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderError {
    /// No group carries the payload's source id.
    UnknownGroup(String),
    /// No site in any group carries the payload's source id.
    UnknownSite(String),
    /// The payload names a target group that does not exist.
    UnknownTargetGroup(String),
    /// A site payload arrived without a target group.
    MissingTargetGroup,
    /// The target group already holds a different site with the same key.
    DuplicateSite { site_id: String, group_id: String },
}

impl fmt::Display for ReorderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownGroup(id) => write!(f, "unknown group: {id}"),
            Self::UnknownSite(id) => write!(f, "unknown site: {id}"),
            Self::UnknownTargetGroup(id) => write!(f, "unknown target group: {id}"),
            Self::MissingTargetGroup => write!(f, "site drop without a target group"),
            Self::DuplicateSite { site_id, group_id } => {
                write!(f, "group {group_id} already contains site {site_id}")
            }
        }
    }
}

impl std::error::Error for ReorderError {}

/// Apply one drop instruction to `groups`.
///
/// Indices in the payload are insertion points into the list *after* the
/// dragged entry was removed, which is how the collision resolver computes
/// them. Out-of-range indices append.
pub fn apply_drop<G: GroupEntry>(
    groups: &mut Vec<G>,
    payload: &DropPayload,
) -> Result<ReorderOutcome, ReorderError> {
    match payload.kind {
        DragKind::Group => move_group(groups, &payload.src_id, payload.target_index),
        DragKind::Site => {
            let target = payload
                .target_group_id
                .as_deref()
                .ok_or(ReorderError::MissingTargetGroup)?;
            move_site(groups, &payload.src_id, target, payload.target_index)
        }
    }
}

fn move_group<G: GroupEntry>(
    groups: &mut Vec<G>,
    group_id: &str,
    target_index: usize,
) -> Result<ReorderOutcome, ReorderError> {
    let from = groups
        .iter()
        .position(|group| group.key() == group_id)
        .ok_or_else(|| ReorderError::UnknownGroup(group_id.to_owned()))?;

    let to = target_index.min(groups.len() - 1);
    if from == to {
        return Ok(ReorderOutcome::Unchanged);
    }
    let group = groups.remove(from);
    groups.insert(to, group);
    Ok(ReorderOutcome::GroupMoved { from, to })
}

fn move_site<G: GroupEntry>(
    groups: &mut [G],
    site_id: &str,
    target_group_id: &str,
    target_index: usize,
) -> Result<ReorderOutcome, ReorderError> {
    let (from_group, from_index) = groups
        .iter()
        .enumerate()
        .find_map(|(group_idx, group)| {
            group
                .sites()
                .iter()
                .position(|site| site.key() == site_id)
                .map(|site_idx| (group_idx, site_idx))
        })
        .ok_or_else(|| ReorderError::UnknownSite(site_id.to_owned()))?;

    let to_group = groups
        .iter()
        .position(|group| group.key() == target_group_id)
        .ok_or_else(|| ReorderError::UnknownTargetGroup(target_group_id.to_owned()))?;

    if to_group != from_group
        && groups[to_group]
            .sites()
            .iter()
            .any(|site| site.key() == site_id)
    {
        return Err(ReorderError::DuplicateSite {
            site_id: site_id.to_owned(),
            group_id: target_group_id.to_owned(),
        });
    }

    if to_group == from_group {
        let sites = groups[from_group].sites_mut();
        let to_index = target_index.min(sites.len() - 1);
        if to_index == from_index {
            return Ok(ReorderOutcome::Unchanged);
        }
        let site = sites.remove(from_index);
        sites.insert(to_index, site);
        return Ok(ReorderOutcome::SiteMoved {
            from_group,
            from_index,
            to_group,
            to_index,
        });
    }

    let site = groups[from_group].sites_mut().remove(from_index);
    let sites = groups[to_group].sites_mut();
    let to_index = target_index.min(sites.len());
    sites.insert(to_index, site);
    Ok(ReorderOutcome::SiteMoved {
        from_group,
        from_index,
        to_group,
        to_index,
    })
}

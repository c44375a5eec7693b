#![forbid(unsafe_code)]

//! Property-based invariant tests for `apply_drop`.
//!
//! 1. A site move keeps the multiset of site keys: nothing lost, nothing
//!    duplicated.
//! 2. A group move is a permutation of the group list and never touches the
//!    sites inside each group.
//! 3. A rejected payload leaves the model exactly as it was.
//! 4. An accepted site move lands the site in the named target group.

use proptest::prelude::*;
use startgrid_core::DropPayload;
use startgrid_core::reorder::{GroupEntry, Keyed, ReorderError, apply_drop};

#[derive(Debug, Clone, PartialEq)]
struct Site(String);

impl Keyed for Site {
    fn key(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Group {
    id: String,
    sites: Vec<Site>,
}

impl Keyed for Group {
    fn key(&self) -> &str {
        &self.id
    }
}

impl GroupEntry for Group {
    type Site = Site;

    fn sites(&self) -> &[Site] {
        &self.sites
    }

    fn sites_mut(&mut self) -> &mut Vec<Site> {
        &mut self.sites
    }
}

/// Groups `g0..gN` holding uniquely keyed sites `s0..sM` in order.
fn build(counts: &[usize]) -> Vec<Group> {
    let mut next = 0;
    counts
        .iter()
        .enumerate()
        .map(|(g, &count)| Group {
            id: format!("g{g}"),
            sites: (0..count)
                .map(|_| {
                    next += 1;
                    Site(format!("s{}", next - 1))
                })
                .collect(),
        })
        .collect()
}

fn site_keys(groups: &[Group]) -> Vec<String> {
    let mut keys: Vec<String> = groups
        .iter()
        .flat_map(|g| g.sites.iter().map(|s| s.0.clone()))
        .collect();
    keys.sort();
    keys
}

fn layout() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..5, 1..5)
}

proptest! {
    #[test]
    fn site_move_preserves_key_multiset(
        counts in layout(),
        site_pick in any::<prop::sample::Index>(),
        group_pick in any::<prop::sample::Index>(),
        target_index in 0usize..8,
    ) {
        let mut groups = build(&counts);
        let total: usize = counts.iter().sum();
        prop_assume!(total > 0);

        let src = format!("s{}", site_pick.index(total));
        let target = format!("g{}", group_pick.index(counts.len()));
        let before = site_keys(&groups);

        let payload = DropPayload::site(src.clone(), target.clone(), target_index);
        prop_assert!(apply_drop(&mut groups, &payload).is_ok());
        prop_assert_eq!(site_keys(&groups), before);

        let landed = groups.iter().find(|g| g.id == target).map(|g| &g.sites);
        prop_assert!(landed.is_some_and(|sites| sites.iter().any(|s| s.0 == src)));
    }

    #[test]
    fn group_move_is_a_permutation(
        counts in layout(),
        group_pick in any::<prop::sample::Index>(),
        target_index in 0usize..8,
    ) {
        let mut groups = build(&counts);
        let original = groups.clone();
        let src = format!("g{}", group_pick.index(counts.len()));

        prop_assert!(apply_drop(&mut groups, &DropPayload::group(src, target_index)).is_ok());
        prop_assert_eq!(groups.len(), original.len());
        for group in &original {
            prop_assert!(groups.contains(group), "group {} changed or vanished", group.id);
        }
    }

    #[test]
    fn rejected_payload_leaves_model_untouched(
        counts in layout(),
        group_pick in any::<prop::sample::Index>(),
        target_index in 0usize..8,
        which in 0u8..4,
    ) {
        let mut groups = build(&counts);
        let original = groups.clone();
        let total: usize = counts.iter().sum();
        let existing_group = format!("g{}", group_pick.index(counts.len()));

        let (payload, expected) = match which {
            0 => (
                DropPayload::group("missing", target_index),
                ReorderError::UnknownGroup("missing".into()),
            ),
            1 => (
                DropPayload::site("missing", existing_group, target_index),
                ReorderError::UnknownSite("missing".into()),
            ),
            2 => {
                prop_assume!(total > 0);
                (
                    DropPayload::site("s0", "missing", target_index),
                    ReorderError::UnknownTargetGroup("missing".into()),
                )
            }
            _ => {
                prop_assume!(total > 0);
                let mut payload = DropPayload::site("s0", existing_group, target_index);
                payload.target_group_id = None;
                (payload, ReorderError::MissingTargetGroup)
            }
        };

        prop_assert_eq!(apply_drop(&mut groups, &payload), Err(expected));
        prop_assert_eq!(groups, original);
    }
}

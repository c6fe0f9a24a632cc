//! Pure collection-tree computation for post-import finalization.
//!
//! After a run lands new entries in a structured collection, the stored
//! parent/child ordering must be recomputed so the new entries appear in
//! the tree. The computation here is deterministic and total: every entry
//! receives exactly one placement, orphans and cycle members degrade to
//! roots instead of being dropped.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An entry as seen by the tree builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRef {
    pub id: DbId,
    /// Unique slug within the collection.
    pub slug: String,
    /// Slug of the parent entry, if any.
    pub parent: Option<String>,
    /// Current position, used as the primary ordering input.
    pub sort_order: i32,
}

/// The computed position of one entry in the rebuilt tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreePlacement {
    pub id: DbId,
    /// Depth-first sequential position across the whole collection.
    pub sort_order: i32,
    /// 0 for roots.
    pub depth: i32,
}

// ---------------------------------------------------------------------------
// Tree building
// ---------------------------------------------------------------------------

/// Compute a depth-first placement for every entry.
///
/// Rules:
/// - Siblings are ordered by (current sort_order, slug).
/// - An entry whose parent slug does not exist, or that names itself as
///   parent, becomes a root.
/// - Entries unreachable from any root (parent cycles) are appended as
///   roots in sibling order; traversal never revisits an entry.
/// - Re-running over entries that already carry the computed ordering
///   yields the same placements.
pub fn build_tree(entries: &[EntryRef]) -> Vec<TreePlacement> {
    let by_slug: HashMap<&str, usize> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (e.slug.as_str(), i))
        .collect();

    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut roots: Vec<usize> = Vec::new();

    for (i, entry) in entries.iter().enumerate() {
        match entry.parent.as_deref().and_then(|p| by_slug.get(p)) {
            Some(&parent_idx) if parent_idx != i => {
                children.entry(parent_idx).or_default().push(i);
            }
            _ => roots.push(i),
        }
    }

    let sibling_order = |a: &usize, b: &usize| {
        let (ea, eb) = (&entries[*a], &entries[*b]);
        ea.sort_order.cmp(&eb.sort_order).then_with(|| ea.slug.cmp(&eb.slug))
    };

    roots.sort_by(sibling_order);
    for siblings in children.values_mut() {
        siblings.sort_by(sibling_order);
    }

    let mut placements = Vec::with_capacity(entries.len());
    let mut visited: HashSet<usize> = HashSet::with_capacity(entries.len());

    let visit_from = |start: usize, placements: &mut Vec<TreePlacement>, visited: &mut HashSet<usize>| {
        // Iterative DFS; stack entries carry their depth.
        let mut stack = vec![(start, 0)];
        while let Some((idx, depth)) = stack.pop() {
            if !visited.insert(idx) {
                continue;
            }
            placements.push(TreePlacement {
                id: entries[idx].id,
                sort_order: placements.len() as i32,
                depth,
            });
            if let Some(siblings) = children.get(&idx) {
                for &child in siblings.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }
    };

    for &root in &roots {
        visit_from(root, &mut placements, &mut visited);
    }

    // Cycle members are unreachable from any root; surface them instead of
    // dropping them.
    let mut leftover: Vec<usize> = (0..entries.len()).filter(|i| !visited.contains(i)).collect();
    leftover.sort_by(sibling_order);
    for idx in leftover {
        if !visited.contains(&idx) {
            visit_from(idx, &mut placements, &mut visited);
        }
    }

    placements
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: DbId, slug: &str, parent: Option<&str>, sort_order: i32) -> EntryRef {
        EntryRef {
            id,
            slug: slug.to_string(),
            parent: parent.map(String::from),
            sort_order,
        }
    }

    fn ids(placements: &[TreePlacement]) -> Vec<DbId> {
        placements.iter().map(|p| p.id).collect()
    }

    #[test]
    fn flat_entries_order_by_sort_then_slug() {
        let entries = vec![
            entry(1, "banana", None, 5),
            entry(2, "apple", None, 5),
            entry(3, "first", None, 0),
        ];
        let placements = build_tree(&entries);
        assert_eq!(ids(&placements), vec![3, 2, 1]);
        assert!(placements.iter().all(|p| p.depth == 0));
        let orders: Vec<i32> = placements.iter().map(|p| p.sort_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn children_follow_parents_depth_first() {
        let entries = vec![
            entry(1, "root-a", None, 0),
            entry(2, "root-b", None, 1),
            entry(3, "a-child", Some("root-a"), 0),
            entry(4, "a-grandchild", Some("a-child"), 0),
        ];
        let placements = build_tree(&entries);
        assert_eq!(ids(&placements), vec![1, 3, 4, 2]);
        let depths: Vec<i32> = placements.iter().map(|p| p.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 0]);
    }

    #[test]
    fn unknown_parent_becomes_root() {
        let entries = vec![
            entry(1, "page", Some("deleted-parent"), 0),
            entry(2, "other", None, 1),
        ];
        let placements = build_tree(&entries);
        assert_eq!(placements.len(), 2);
        assert!(placements.iter().all(|p| p.depth == 0));
    }

    #[test]
    fn self_parent_becomes_root() {
        let entries = vec![entry(1, "loop", Some("loop"), 0)];
        let placements = build_tree(&entries);
        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].depth, 0);
    }

    #[test]
    fn parent_cycle_does_not_hang_or_drop_entries() {
        let entries = vec![
            entry(1, "a", Some("b"), 0),
            entry(2, "b", Some("a"), 1),
            entry(3, "normal", None, 0),
        ];
        let placements = build_tree(&entries);
        assert_eq!(placements.len(), 3);
        // The cycle entry pulled in first brings the other as its child.
        let a = placements.iter().find(|p| p.id == 1).unwrap();
        let b = placements.iter().find(|p| p.id == 2).unwrap();
        assert_eq!(a.depth, 0);
        assert_eq!(b.depth, 1);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let entries = vec![
            entry(1, "root-b", None, 7),
            entry(2, "root-a", None, 3),
            entry(3, "child", Some("root-b"), 9),
        ];
        let first = build_tree(&entries);

        // Apply the computed ordering, then rebuild.
        let updated: Vec<EntryRef> = entries
            .iter()
            .map(|e| {
                let placement = first.iter().find(|p| p.id == e.id).unwrap();
                EntryRef {
                    sort_order: placement.sort_order,
                    ..e.clone()
                }
            })
            .collect();
        let second = build_tree(&updated);

        assert_eq!(first, second);
    }

    #[test]
    fn empty_collection_produces_no_placements() {
        assert!(build_tree(&[]).is_empty());
    }
}

//! Array alignment.
//!
//! Elements of the old array are matched to elements of the new array by
//! [`similarity`](crate::similarity::similarity). Matching is greedy: each old
//! element, in order, claims the most similar unclaimed new element, provided
//! the score exceeds [`MATCH_THRESHOLD`]. Ties go to the lowest new index.
//! This is not a minimal edit script, and it is not meant to be one.

use crate::diff::{child_path, compare, DiffConfig, DiffNode};
use crate::similarity::similarity;
use crate::value::Value;
use std::borrow::Cow;
use std::collections::HashSet;

/// Minimum similarity (exclusive) for two elements to be treated as the same item.
pub const MATCH_THRESHOLD: f64 = 0.7;

/// Aligns two arrays and diffs the matched pairs.
///
/// Old-derived nodes (matched or removed) come first in old order, then every
/// unclaimed new element as an addition in ascending index order. Matched and
/// added nodes carry their new index in the path, removed nodes their old index.
///
/// Keys in `config.ignore_keys` take no part in matching.
///
/// # Arguments
///
/// * `old` - Elements of the original array
/// * `new` - Elements of the updated array
/// * `config` - Diff configuration, passed down to matched pairs
/// * `path` - Path of the array itself
///
/// # Returns
///
/// One node per old element plus one per unmatched new element. When the
/// arrays are equal this is a list of unchanged leaves.
///
/// # Examples
///
/// ```
/// use jdiff::{align_arrays, ChangeKind, DiffConfig, Value};
///
/// let old = vec![Value::from("apple"), Value::from("cherry")];
/// let new = vec![Value::from("banana"), Value::from("apple"), Value::from("cherry")];
///
/// let nodes = align_arrays(&old, &new, &DiffConfig::default(), &[]);
/// let kinds: Vec<_> = nodes.iter().map(|n| n.kind).collect();
/// assert_eq!(kinds, vec![ChangeKind::Unchanged, ChangeKind::Unchanged, ChangeKind::Added]);
/// assert_eq!(nodes[2].path, vec!["0"]);
/// ```
pub fn align_arrays(
    old: &[Value],
    new: &[Value],
    config: &DiffConfig,
    path: &[String],
) -> Vec<DiffNode> {
    let (old_view, new_view) = stripped_views(old, new, &config.ignore_keys);

    if old.len() == new.len() && old_view.iter().zip(new_view.iter()).all(|(a, b)| a.deep_equals(b)) {
        return old_view
            .iter()
            .zip(new_view.iter())
            .enumerate()
            .map(|(i, (a, b))| DiffNode::unchanged(child_path(path, i.to_string()), a.clone(), b.clone()))
            .collect();
    }
    if old.is_empty() {
        return added_from(&new_view, 0, path);
    }
    if new.is_empty() {
        return removed_from(&old_view, 0, path);
    }

    let mut claimed = vec![false; new.len()];
    let mut nodes = Vec::with_capacity(old.len().max(new.len()));

    for (i, item) in old.iter().enumerate() {
        match best_match(&old_view[i], &new_view, &claimed) {
            Some((j, score)) if score > MATCH_THRESHOLD => {
                tracing::trace!(old_index = i, new_index = j, score, "matched array element");
                claimed[j] = true;
                nodes.push(compare(
                    Some(item),
                    Some(&new[j]),
                    config,
                    child_path(path, j.to_string()),
                ));
            }
            best => {
                tracing::trace!(old_index = i, best = ?best, "no match for array element");
                nodes.push(DiffNode::removed(child_path(path, i.to_string()), old_view[i].clone()));
            }
        }
    }

    for (j, item) in new_view.iter().enumerate() {
        if !claimed[j] {
            nodes.push(DiffNode::added(child_path(path, j.to_string()), item.clone()));
        }
    }

    nodes
}

/// Pairs elements by index, for presence-only comparison.
///
/// Slots present on both sides are compared recursively; surplus slots on
/// either side are reported as removed or added.
///
/// # Examples
///
/// ```
/// use jdiff::align::pair_positionally;
/// use jdiff::{ChangeKind, DiffConfig, Value};
///
/// let config = DiffConfig { structure_only: true, ..Default::default() };
/// let nodes = pair_positionally(&[Value::from(1.0)], &[Value::from(2.0), Value::from(3.0)], &config, &[]);
/// assert_eq!(nodes[0].kind, ChangeKind::Unchanged);
/// assert_eq!(nodes[1].kind, ChangeKind::Added);
/// ```
pub fn pair_positionally(
    old: &[Value],
    new: &[Value],
    config: &DiffConfig,
    path: &[String],
) -> Vec<DiffNode> {
    let (old_view, new_view) = stripped_views(old, new, &config.ignore_keys);
    let shared = old.len().min(new.len());
    let mut nodes: Vec<DiffNode> = old
        .iter()
        .zip(new)
        .enumerate()
        .map(|(i, (a, b))| compare(Some(a), Some(b), config, child_path(path, i.to_string())))
        .collect();
    nodes.extend(removed_from(&old_view[shared..], shared, path));
    nodes.extend(added_from(&new_view[shared..], shared, path));
    nodes
}

/// The arrays as seen by matching and output: ignored keys stripped.
fn stripped_views<'a>(
    old: &'a [Value],
    new: &'a [Value],
    ignore_keys: &HashSet<String>,
) -> (Cow<'a, [Value]>, Cow<'a, [Value]>) {
    if ignore_keys.is_empty() {
        return (Cow::Borrowed(old), Cow::Borrowed(new));
    }
    let strip = |items: &[Value]| -> Vec<Value> {
        items.iter().map(|item| item.without_keys(ignore_keys)).collect()
    };
    (Cow::Owned(strip(old)), Cow::Owned(strip(new)))
}

/// Returns true when aligned children are not in new-index order.
///
/// Only meaningful when every child is unchanged: then each child sits at its
/// new index, and any mismatch with its position means elements were moved.
pub fn is_reordered(children: &[DiffNode]) -> bool {
    children
        .iter()
        .enumerate()
        .any(|(i, child)| child.key().and_then(|k| k.parse::<usize>().ok()) != Some(i))
}

/// Finds the most similar unclaimed candidate. The first of equal scores wins.
fn best_match(item: &Value, candidates: &[Value], claimed: &[bool]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (j, candidate) in candidates.iter().enumerate() {
        if claimed[j] {
            continue;
        }
        let score = similarity(item, candidate);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((j, score));
            if score >= 1.0 {
                break;
            }
        }
    }
    best
}

fn added_from(items: &[Value], offset: usize, path: &[String]) -> Vec<DiffNode> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| DiffNode::added(child_path(path, (offset + i).to_string()), item.clone()))
        .collect()
}

fn removed_from(items: &[Value], offset: usize, path: &[String]) -> Vec<DiffNode> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| DiffNode::removed(child_path(path, (offset + i).to_string()), item.clone()))
        .collect()
}

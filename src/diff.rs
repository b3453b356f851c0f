//! Core structural diff algorithm.
//!
//! Two values are walked together and every position is classified as added,
//! removed, changed or unchanged. The result is a tree of [`DiffNode`]s that
//! mirrors the shape of the inputs: objects recurse per key, arrays are aligned
//! by similarity (see [`crate::align`]), and primitives become leaves.
//!
//! # Examples
//!
//! ```
//! use jdiff::{compare_raw, ChangeKind, DiffConfig, Value};
//! use serde_json::json;
//!
//! let old = Value::from(json!({"foo": "bar"}));
//! let new = Value::from(json!({"foo": "baz"}));
//!
//! let root = compare_raw(&old, &new, &DiffConfig::default());
//! assert_eq!(root.kind, ChangeKind::Changed);
//! assert_eq!(root.children().len(), 1);
//! assert_eq!(root.children()[0].path, vec!["foo"]);
//! ```

use crate::align;
use crate::similarity::{edit_distance, string_similarity};
use crate::value::Value;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

/// Classification of a single position in the diff tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Present in new but not in old
    Added,
    /// Present in old but not in new
    Removed,
    /// Present in both with different content
    Changed,
    /// Present in both with equal content (or content excluded from comparison)
    Unchanged,
}

/// Auxiliary data attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Meta {
    /// Levenshtein distance, set for changed string pairs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_distance: Option<usize>,
    /// Similarity in `[0, 1]`, set for changed string pairs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    /// The values were not compared because of the configuration
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ignored: bool,
}

impl Meta {
    pub fn is_empty(&self) -> bool {
        self.edit_distance.is_none() && self.similarity.is_none() && !self.ignored
    }
}

/// One node of the diff tree.
///
/// Field presence follows `kind`: added nodes carry only `new_value`, removed
/// nodes only `old_value`, changed and unchanged nodes carry both. `children`
/// is `Some` only for array-vs-array and object-vs-object comparisons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffNode {
    pub kind: ChangeKind,
    /// Keys and array indices from the root to this node
    pub path: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DiffNode>>,
    #[serde(skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,
}

impl DiffNode {
    pub fn added(path: Vec<String>, value: Value) -> Self {
        Self::leaf(ChangeKind::Added, path, None, Some(value))
    }

    pub fn removed(path: Vec<String>, value: Value) -> Self {
        Self::leaf(ChangeKind::Removed, path, Some(value), None)
    }

    pub fn changed(path: Vec<String>, old: Value, new: Value) -> Self {
        Self::leaf(ChangeKind::Changed, path, Some(old), Some(new))
    }

    pub fn unchanged(path: Vec<String>, old: Value, new: Value) -> Self {
        Self::leaf(ChangeKind::Unchanged, path, Some(old), Some(new))
    }

    /// A pair whose values were deliberately not compared.
    pub fn ignored(path: Vec<String>, old: Value, new: Value) -> Self {
        let mut node = Self::unchanged(path, old, new);
        node.meta.ignored = true;
        node
    }

    /// An array or object comparison. The kind is derived from the children.
    pub fn container(path: Vec<String>, old: Value, new: Value, children: Vec<DiffNode>) -> Self {
        let kind = if children.iter().any(DiffNode::is_changed) {
            ChangeKind::Changed
        } else {
            ChangeKind::Unchanged
        };
        Self {
            kind,
            path,
            old_value: Some(old),
            new_value: Some(new),
            children: Some(children),
            meta: Meta::default(),
        }
    }

    fn leaf(kind: ChangeKind, path: Vec<String>, old: Option<Value>, new: Option<Value>) -> Self {
        Self {
            kind,
            path,
            old_value: old,
            new_value: new,
            children: None,
            meta: Meta::default(),
        }
    }

    /// Returns true unless the node is unchanged.
    pub fn is_changed(&self) -> bool {
        self.kind != ChangeKind::Unchanged
    }

    /// Returns true for a changed array whose elements all matched unchanged,
    /// i.e. the only difference is their order.
    pub fn is_reorder(&self) -> bool {
        self.kind == ChangeKind::Changed
            && matches!(&self.children, Some(children) if !children.iter().any(DiffNode::is_changed))
    }

    /// Retained children, empty for leaves.
    pub fn children(&self) -> &[DiffNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// The last path segment, or `None` at the root.
    pub fn key(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    /// The value to show for this node: the new side when present.
    pub fn display_value(&self) -> Option<&Value> {
        self.new_value.as_ref().or(self.old_value.as_ref())
    }
}

/// Leaf counts over a diff tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
    pub unchanged: usize,
}

impl DiffStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the leaves of `root`. Added and removed subtrees count once, and
    /// so does a reordered array.
    ///
    /// # Examples
    ///
    /// ```
    /// use jdiff::{compare_raw, DiffConfig, DiffStats, Value};
    /// use serde_json::json;
    ///
    /// let old = Value::from(json!({"a": 1, "list": [1, 2]}));
    /// let new = Value::from(json!({"a": 2, "list": [2, 1], "b": true}));
    /// let stats = DiffStats::from_node(&compare_raw(&old, &new, &DiffConfig::default()));
    ///
    /// assert_eq!(stats.changed, 2);
    /// assert_eq!(stats.added, 1);
    /// ```
    pub fn from_node(root: &DiffNode) -> Self {
        let mut stats = Self::new();
        stats.collect(root);
        stats
    }

    fn collect(&mut self, node: &DiffNode) {
        if node.is_reorder() {
            self.changed += 1;
            return;
        }
        if let Some(children) = &node.children {
            for child in children {
                self.collect(child);
            }
            return;
        }
        match node.kind {
            ChangeKind::Added => self.added += 1,
            ChangeKind::Removed => self.removed += 1,
            ChangeKind::Changed => self.changed += 1,
            ChangeKind::Unchanged => self.unchanged += 1,
        }
    }

    /// Returns the total number of changes (excluding unchanged).
    pub fn total_changes(&self) -> usize {
        self.added + self.removed + self.changed
    }

    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }
}

/// Configuration for the comparison.
///
/// `structure_only` and `ignore_values` have the same effect and may be combined:
/// pairs present on both sides are not compared by value, while added and
/// removed keys (and array slots) are still reported. `full_output` and
/// `output_keys` only decide which unchanged object children stay in the tree.
#[derive(Debug, Clone, Default)]
pub struct DiffConfig {
    /// Compare only which keys exist, never their values
    pub structure_only: bool,
    /// Report presence changes only
    pub ignore_values: bool,
    /// Keep unchanged object children in the tree
    pub full_output: bool,
    /// Object keys kept in the tree even when unchanged
    pub output_keys: HashSet<String>,
    /// Object keys skipped at every level
    pub ignore_keys: HashSet<String>,
}

impl DiffConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key to skip at every level. The key is neither compared nor
    /// shown, and it takes no part in array matching.
    ///
    /// # Examples
    ///
    /// ```
    /// use jdiff::DiffConfig;
    ///
    /// let config = DiffConfig::new().ignore_key("timestamp").ignore_key("etag");
    /// assert_eq!(config.ignore_keys.len(), 2);
    /// ```
    pub fn ignore_key(mut self, key: &str) -> Self {
        self.ignore_keys.insert(key.to_string());
        self
    }

    /// Adds a key that stays in the tree even when unchanged, as context
    /// next to its changed siblings.
    pub fn output_key(mut self, key: &str) -> Self {
        self.output_keys.insert(key.to_string());
        self
    }

    pub fn presence_only(&self) -> bool {
        self.structure_only || self.ignore_values
    }

    /// The copy of `value` stored in the tree: ignored keys never reach output.
    pub(crate) fn visible(&self, value: &Value) -> Value {
        if self.ignore_keys.is_empty() {
            value.clone()
        } else {
            value.without_keys(&self.ignore_keys)
        }
    }

    fn retains(&self, key: &str) -> bool {
        self.full_output || self.output_keys.contains(key)
    }
}

/// Compares two values and returns the root of the diff tree.
///
/// This is the main entry point. Both values are present, so the root is
/// always `Changed` or `Unchanged`.
///
/// # Arguments
///
/// * `old` - The original value
/// * `new` - The updated value
/// * `config` - Which keys to skip, whether to compare values at all, and
///   which unchanged object children to keep
///
/// # Returns
///
/// The root [`DiffNode`]. Its `path` is empty.
///
/// # Examples
///
/// ```
/// use jdiff::{compare_raw, ChangeKind, DiffConfig, Value};
/// use serde_json::json;
///
/// let old = Value::from(json!({"id": 1, "tags": ["a"]}));
/// let new = Value::from(json!({"id": 1, "tags": ["a", "b"]}));
///
/// let root = compare_raw(&old, &new, &DiffConfig::default());
/// let tags = &root.children()[0];
/// assert_eq!(tags.path, vec!["tags"]);
/// assert_eq!(tags.children()[1].kind, ChangeKind::Added);
/// ```
pub fn compare_raw(old: &Value, new: &Value, config: &DiffConfig) -> DiffNode {
    tracing::debug!(
        old_type = old.type_name(),
        new_type = new.type_name(),
        presence_only = config.presence_only(),
        "computing diff"
    );
    compare(Some(old), Some(new), config, Vec::new())
}

/// Returns true when the two values differ under `config`.
///
/// Only `ignore_keys`, `structure_only` and `ignore_values` can change the
/// answer; retention options never do.
///
/// # Examples
///
/// ```
/// use jdiff::{has_difference, DiffConfig, Value};
/// use serde_json::json;
///
/// let old = Value::from(json!({"name": "a", "updated": 1}));
/// let new = Value::from(json!({"name": "a", "updated": 2}));
///
/// assert!(has_difference(&old, &new, &DiffConfig::default()));
/// assert!(!has_difference(&old, &new, &DiffConfig::new().ignore_key("updated")));
/// ```
pub fn has_difference(old: &Value, new: &Value, config: &DiffConfig) -> bool {
    compare_raw(old, new, config).is_changed()
}

/// Compares two possibly-absent values located at `path`.
///
/// Absence is distinct from null: `None` vs `Some(Null)` is an addition.
/// Objects recurse per key, arrays are aligned (or paired by position in
/// presence-only mode), and any other pair becomes a leaf.
///
/// # Arguments
///
/// * `old` - The original value, `None` when absent
/// * `new` - The updated value, `None` when absent
/// * `config` - Diff configuration
/// * `path` - Keys and indices leading to this position; children extend it
///
/// # Returns
///
/// A node whose `kind` is `Added` or `Removed` when one side is absent.
/// Values stored in the node exclude `config.ignore_keys` at every depth.
///
/// # Examples
///
/// ```
/// use jdiff::{compare, ChangeKind, DiffConfig, Value};
///
/// let config = DiffConfig::default();
/// let node = compare(None, Some(&Value::Null), &config, vec!["key".to_string()]);
/// assert_eq!(node.kind, ChangeKind::Added);
/// assert_eq!(node.path, vec!["key"]);
/// ```
pub fn compare(
    old: Option<&Value>,
    new: Option<&Value>,
    config: &DiffConfig,
    path: Vec<String>,
) -> DiffNode {
    let (old, new) = match (old, new) {
        (None, None) => return DiffNode::leaf(ChangeKind::Unchanged, path, None, None),
        (None, Some(new)) => return DiffNode::added(path, config.visible(new)),
        (Some(old), None) => return DiffNode::removed(path, config.visible(old)),
        (Some(old), Some(new)) => (old, new),
    };

    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            let children = compare_objects(old_map, new_map, config, &path);
            DiffNode::container(path, config.visible(old), config.visible(new), children)
        }
        (Value::Array(old_arr), Value::Array(new_arr)) => {
            let children = if config.presence_only() {
                align::pair_positionally(old_arr, new_arr, config, &path)
            } else {
                align::align_arrays(old_arr, new_arr, config, &path)
            };
            let mut node = DiffNode::container(path, config.visible(old), config.visible(new), children);
            // a pure permutation leaves every child unchanged
            if !node.is_changed() && align::is_reordered(node.children()) {
                node.kind = ChangeKind::Changed;
            }
            node
        }
        _ if config.presence_only() => DiffNode::ignored(path, config.visible(old), config.visible(new)),
        _ if old.deep_equals(new) => DiffNode::unchanged(path, old.clone(), new.clone()),
        (Value::String(a), Value::String(b)) => {
            let mut node = DiffNode::changed(path, old.clone(), new.clone());
            node.meta.edit_distance = Some(edit_distance(a, b));
            node.meta.similarity = Some(string_similarity(a, b));
            node
        }
        // differing primitives, null vs container, array vs object
        _ => DiffNode::changed(path, config.visible(old), config.visible(new)),
    }
}

/// Compares two objects key by key.
///
/// Old keys come first in document order, followed by keys only present in
/// the new object. Unchanged children are dropped unless retained.
fn compare_objects(
    old_map: &IndexMap<String, Value>,
    new_map: &IndexMap<String, Value>,
    config: &DiffConfig,
    path: &[String],
) -> Vec<DiffNode> {
    let keys = old_map
        .keys()
        .chain(new_map.keys().filter(|k| !old_map.contains_key(*k)))
        .filter(|k| !config.ignore_keys.contains(*k));

    let mut children = Vec::new();
    for key in keys {
        let child = compare(
            old_map.get(key),
            new_map.get(key),
            config,
            child_path(path, key),
        );
        if child.is_changed() || config.retains(key) {
            children.push(child);
        }
    }
    children
}

pub(crate) fn child_path(path: &[String], segment: impl Into<String>) -> Vec<String> {
    let mut child = Vec::with_capacity(path.len() + 1);
    child.extend_from_slice(path);
    child.push(segment.into());
    child
}

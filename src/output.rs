//! Output formatting for diff trees.
//!
//! The text formats render a [`DiffNode`] tree as an indented, git-style block:
//! every line starts with a sign column (`+`, `-` or a space) followed by two
//! spaces of indentation per nesting level. Changed leaves print the new value
//! first, then the old one. A reordered array is shown the same way, as whole
//! blocks. Keys other than plain identifiers are quoted.
//!
//! # Examples
//!
//! ```
//! use jdiff::{compare_to_string, DiffConfig, OutputOptions, Value};
//! use serde_json::json;
//!
//! let old = Value::from(json!({"foo": "bar"}));
//! let new = Value::from(json!({"foo": "baz"}));
//! let options = OutputOptions { color: false, ..Default::default() };
//!
//! let text = compare_to_string(&old, &new, &DiffConfig::default(), &options);
//! assert_eq!(text, " {\n+  foo: \"baz\"\n-  foo: \"bar\"\n }\n");
//! ```

use crate::diff::{compare_raw, ChangeKind, DiffConfig, DiffNode, DiffStats};
use crate::error::OutputError;
use crate::value::{quote, Value};
use colored::Colorize;
use serde::Serialize;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Git-style text, coloured when [`OutputOptions::color`] is set
    Terminal,
    /// Git-style text without colours (suitable for piping)
    Plain,
    /// Serialized diff tree with statistics
    Json,
}

/// Options for controlling output formatting.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Emit ANSI colours in terminal output
    pub color: bool,
    /// Append the similarity percentage to changed string pairs
    pub with_similarity: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            color: true,
            with_similarity: false,
        }
    }
}

/// Compares two values and renders the result as git-style text.
///
/// Returns an empty string when nothing differs, unless `full_output` asks
/// for the complete structure.
pub fn compare_to_string(
    old: &Value,
    new: &Value,
    config: &DiffConfig,
    options: &OutputOptions,
) -> String {
    let root = compare_raw(old, new, config);
    if !root.is_changed() && !config.full_output {
        return String::new();
    }
    render(&root, options, options.color)
}

/// Formats a diff tree according to the specified format and options.
///
/// The text formats render every node present in the tree; pruning has
/// already happened in the comparator.
pub fn format_diff(
    root: &DiffNode,
    format: &OutputFormat,
    options: &OutputOptions,
) -> Result<String, OutputError> {
    match format {
        OutputFormat::Terminal => Ok(render(root, options, options.color)),
        OutputFormat::Plain => Ok(render(root, options, false)),
        OutputFormat::Json => format_json(root),
    }
}

/// Formats summary statistics.
pub fn format_summary(stats: &DiffStats) -> String {
    if stats.is_empty() {
        return "Summary: No changes".to_string();
    }

    let mut parts = Vec::new();
    if stats.added > 0 {
        parts.push(format!("{} added", stats.added));
    }
    if stats.removed > 0 {
        parts.push(format!("{} removed", stats.removed));
    }
    if stats.changed > 0 {
        parts.push(format!("{} changed", stats.changed));
    }
    if stats.unchanged > 0 {
        parts.push(format!("{} unchanged", stats.unchanged));
    }

    format!("Summary: {}", parts.join(", "))
}

#[derive(Serialize)]
struct JsonReport<'a> {
    diff: &'a DiffNode,
    stats: DiffStats,
}

fn format_json(root: &DiffNode) -> Result<String, OutputError> {
    let report = JsonReport {
        diff: root,
        stats: DiffStats::from_node(root),
    };
    serde_json::to_string_pretty(&report).map_err(|e| OutputError::JsonSerializationError { source: e })
}

fn render(root: &DiffNode, options: &OutputOptions, color: bool) -> String {
    let mut renderer = Renderer {
        with_similarity: options.with_similarity,
        color,
        out: String::new(),
    };
    renderer.node(root, 0, None);
    renderer.out
}

/// Leading column of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Plus,
    Minus,
    /// Structure around changes
    Neutral,
    /// Unchanged content kept for display
    Context,
}

impl Sign {
    fn symbol(self) -> char {
        match self {
            Sign::Plus => '+',
            Sign::Minus => '-',
            Sign::Neutral | Sign::Context => ' ',
        }
    }

    fn paint(self, line: &str) -> String {
        match self {
            Sign::Plus => line.green().to_string(),
            Sign::Minus => line.red().to_string(),
            Sign::Context => line.dimmed().to_string(),
            Sign::Neutral => line.to_string(),
        }
    }
}

struct Renderer {
    with_similarity: bool,
    color: bool,
    out: String,
}

impl Renderer {
    fn push(&mut self, sign: Sign, depth: usize, text: &str) {
        let line = format!("{}{}{}", sign.symbol(), "  ".repeat(depth), text);
        if self.color {
            self.out.push_str(&sign.paint(&line));
        } else {
            self.out.push_str(&line);
        }
        self.out.push('\n');
    }

    fn node(&mut self, node: &DiffNode, depth: usize, label: Option<&str>) {
        match node.kind {
            ChangeKind::Added => self.value(Sign::Plus, depth, label, node.new_value.as_ref(), ""),
            ChangeKind::Removed => self.value(Sign::Minus, depth, label, node.old_value.as_ref(), ""),
            ChangeKind::Changed => match &node.children {
                Some(children) if !node.is_reorder() => self.block(Sign::Neutral, node, children, depth, label),
                _ => {
                    let suffix = self.similarity_suffix(node);
                    self.value(Sign::Plus, depth, label, node.new_value.as_ref(), &suffix);
                    self.value(Sign::Minus, depth, label, node.old_value.as_ref(), "");
                }
            },
            ChangeKind::Unchanged => match &node.children {
                Some(children) if !children.is_empty() => {
                    self.block(Sign::Context, node, children, depth, label)
                }
                _ => self.value(Sign::Context, depth, label, node.display_value(), ""),
            },
        }
    }

    fn similarity_suffix(&self, node: &DiffNode) -> String {
        match node.meta.similarity {
            Some(score) if self.with_similarity => format!(" ({}%)", (score * 100.0).round() as i64),
            _ => String::new(),
        }
    }

    /// Renders a container through its retained children.
    fn block(&mut self, sign: Sign, node: &DiffNode, children: &[DiffNode], depth: usize, label: Option<&str>) {
        let is_array = matches!(node.display_value(), Some(Value::Array(_)));
        let (open, close) = if is_array { ('[', ']') } else { ('{', '}') };
        let prefix = key_prefix(label);

        if children.is_empty() {
            self.push(sign, depth, &format!("{}{}{}", prefix, open, close));
            return;
        }

        self.push(sign, depth, &format!("{}{}", prefix, open));
        for child in children {
            let key = if is_array { None } else { child.key() };
            self.node(child, depth + 1, key);
        }
        self.push(sign, depth, &close.to_string());
    }

    /// Renders a whole value under one sign.
    fn value(&mut self, sign: Sign, depth: usize, label: Option<&str>, value: Option<&Value>, suffix: &str) {
        let mut lines = value_lines(value);
        if let Some(first) = lines.first_mut() {
            first.insert_str(0, &key_prefix(label));
        }
        if let Some(last) = lines.last_mut() {
            last.push_str(suffix);
        }
        for line in &lines {
            self.push(sign, depth, line);
        }
    }
}

fn key_prefix(label: Option<&str>) -> String {
    label.map(|key| format!("{}: ", display_key(key))).unwrap_or_default()
}

fn display_key(key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '$' | '/' | '@'));
    if plain {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Pretty-prints a value as block lines with relative indentation.
fn value_lines(value: Option<&Value>) -> Vec<String> {
    match value {
        None => vec!["undefined".to_string()],
        Some(Value::Array(items)) if !items.is_empty() => {
            let mut lines = vec!["[".to_string()];
            for item in items {
                lines.extend(value_lines(Some(item)).into_iter().map(|l| format!("  {}", l)));
            }
            lines.push("]".to_string());
            lines
        }
        Some(Value::Object(map)) if !map.is_empty() => {
            let mut lines = vec!["{".to_string()];
            for (key, item) in map {
                let mut nested = value_lines(Some(item));
                nested[0].insert_str(0, &key_prefix(Some(key.as_str())));
                lines.extend(nested.into_iter().map(|l| format!("  {}", l)));
            }
            lines.push("}".to_string());
            lines
        }
        Some(other) => vec![other.scalar_text()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(value: serde_json::Value) -> Value {
        Value::from(value)
    }

    fn plain() -> OutputOptions {
        OutputOptions {
            color: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_value_lines_primitives() {
        assert_eq!(value_lines(None), vec!["undefined"]);
        assert_eq!(value_lines(Some(&Value::Null)), vec!["null"]);
        assert_eq!(value_lines(Some(&v(json!(3.5)))), vec!["3.5"]);
        assert_eq!(value_lines(Some(&v(json!("x")))), vec!["\"x\""]);
        assert_eq!(value_lines(Some(&v(json!([])))), vec!["[]"]);
        assert_eq!(value_lines(Some(&v(json!({})))), vec!["{}"]);
    }

    #[test]
    fn test_value_lines_nested() {
        let lines = value_lines(Some(&v(json!({"a": [1, {"b": null}]}))));
        assert_eq!(
            lines,
            vec!["{", "  a: [", "    1", "    {", "      b: null", "    }", "  ]", "}"]
        );
    }

    #[test]
    fn test_display_key() {
        assert_eq!(display_key("name"), "name");
        assert_eq!(display_key("app.kubernetes.io/name"), "app.kubernetes.io/name");
        assert_eq!(display_key(""), "\"\"");
        assert_eq!(display_key("a: b"), "\"a: b\"");
        assert_eq!(display_key("two\nlines"), "\"two\\nlines\"");
    }

    #[test]
    fn test_added_object_value_block() {
        let old = v(json!({}));
        let new = v(json!({"user": {"name": "x"}}));
        let text = compare_to_string(&old, &new, &DiffConfig::default(), &plain());
        assert_eq!(text, " {\n+  user: {\n+    name: \"x\"\n+  }\n }\n");
    }

    #[test]
    fn test_similarity_suffix() {
        let options = OutputOptions {
            color: false,
            with_similarity: true,
        };
        let text = compare_to_string(&v(json!("bar")), &v(json!("baz")), &DiffConfig::default(), &options);
        assert_eq!(text, "+\"baz\" (67%)\n-\"bar\"\n");
    }

    #[test]
    fn test_no_difference_is_empty() {
        let value = v(json!({"a": [1, 2]}));
        assert_eq!(compare_to_string(&value, &value, &DiffConfig::default(), &plain()), "");
    }

    #[test]
    fn test_plain_ignores_color_flag() {
        let root = compare_raw(&v(json!(1)), &v(json!(2)), &DiffConfig::default());
        let text = format_diff(&root, &OutputFormat::Plain, &OutputOptions::default()).unwrap();
        assert_eq!(text, "+2\n-1\n");
    }

    #[test]
    fn test_format_summary() {
        assert_eq!(format_summary(&DiffStats::new()), "Summary: No changes");
        let stats = DiffStats {
            added: 2,
            removed: 1,
            changed: 3,
            unchanged: 0,
        };
        assert_eq!(format_summary(&stats), "Summary: 2 added, 1 removed, 3 changed");
    }

    #[test]
    fn test_format_json() {
        let root = compare_raw(&v(json!({"age": 30})), &v(json!({"age": 31})), &DiffConfig::default());
        let output = format_json(&root).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["diff"]["kind"], "changed");
        assert_eq!(parsed["diff"]["children"][0]["path"], json!(["age"]));
        assert_eq!(parsed["diff"]["children"][0]["old_value"], json!(30.0));
        assert_eq!(parsed["stats"]["changed"], 1);
    }
}

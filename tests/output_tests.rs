use jdiff::output::{compare_to_string, format_diff, format_summary, OutputFormat, OutputOptions};
use jdiff::{compare_raw, DiffConfig, DiffStats, Value};
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

fn render(old: serde_json::Value, new: serde_json::Value, config: &DiffConfig) -> String {
    compare_to_string(&v(old), &v(new), config, &plain())
}

#[test]
fn test_changed_key_new_then_old() {
    let text = render(json!({"foo": "bar"}), json!({"foo": "baz"}), &DiffConfig::default());
    assert_eq!(text, " {\n+  foo: \"baz\"\n-  foo: \"bar\"\n }\n");
}

#[test]
fn test_added_and_removed_keys() {
    let text = render(json!({"a": 1}), json!({"b": true}), &DiffConfig::default());
    assert_eq!(text, " {\n-  a: 1\n+  b: true\n }\n");
}

#[test]
fn test_array_context_lines() {
    let text = render(json!([1, 2, 3]), json!([1, 2, 3, 4]), &DiffConfig::default());
    assert_eq!(text, " [\n   1\n   2\n   3\n+  4\n ]\n");
}

#[test]
fn test_nested_indentation() {
    let text = render(
        json!({"user": {"profile": {"age": 30}}}),
        json!({"user": {"profile": {"age": 31}}}),
        &DiffConfig::default(),
    );
    let expected = concat!(
        " {\n",
        "   user: {\n",
        "     profile: {\n",
        "+      age: 31\n",
        "-      age: 30\n",
        "     }\n",
        "   }\n",
        " }\n",
    );
    assert_eq!(text, expected);
}

#[test]
fn test_null_and_container_swap() {
    let text = render(json!({"a": null}), json!({"a": [1]}), &DiffConfig::default());
    assert_eq!(text, " {\n+  a: [\n+    1\n+  ]\n-  a: null\n }\n");
}

#[test]
fn test_full_output_shows_unchanged() {
    let config = DiffConfig {
        full_output: true,
        ..Default::default()
    };
    let text = render(json!({"a": 1, "b": {"c": 2}}), json!({"a": 1, "b": {"c": 3}}), &config);
    let expected = concat!(
        " {\n",
        "   a: 1\n",
        "   b: {\n",
        "+    c: 3\n",
        "-    c: 2\n",
        "   }\n",
        " }\n",
    );
    assert_eq!(text, expected);
}

#[test]
fn test_full_output_without_difference() {
    let config = DiffConfig {
        full_output: true,
        ..Default::default()
    };
    let text = render(json!({"a": {}}), json!({"a": {}}), &config);
    assert_eq!(text, " {\n   a: {}\n }\n");
}

#[test]
fn test_output_keys_render_as_context() {
    let config = DiffConfig::new().output_key("id");
    let text = render(
        json!([{"id": 7, "name": "widget", "qty": 1}]),
        json!([{"id": 7, "name": "widget", "qty": 2}]),
        &config,
    );
    let expected = concat!(
        " [\n",
        "   {\n",
        "     id: 7\n",
        "+    qty: 2\n",
        "-    qty: 1\n",
        "   }\n",
        " ]\n",
    );
    assert_eq!(text, expected);
}

#[test]
fn test_undefined_and_empty_rendering() {
    let text = render(json!({}), json!({"a": [], "b": {}}), &DiffConfig::default());
    assert_eq!(text, " {\n+  a: []\n+  b: {}\n }\n");
}

#[test]
fn test_with_similarity_percentage() {
    let options = OutputOptions {
        color: false,
        with_similarity: true,
    };
    let text = compare_to_string(
        &v(json!({"name": "hello"})),
        &v(json!({"name": "hallo"})),
        &DiffConfig::default(),
        &options,
    );
    assert_eq!(text, " {\n+  name: \"hallo\" (80%)\n-  name: \"hello\"\n }\n");
}

#[test]
fn test_similarity_only_for_strings() {
    let options = OutputOptions {
        color: false,
        with_similarity: true,
    };
    let text = compare_to_string(&v(json!(1)), &v(json!(2)), &DiffConfig::default(), &options);
    assert!(!text.contains('%'));
}

#[test]
fn test_deterministic_output() {
    let old = v(json!({"z": [1, "two", {"k": null}], "a": {"b": 1, "c": [true]}}));
    let new = v(json!({"a": {"c": [false], "b": 2}, "z": ["two", 1, {"k": 0}], "n": 1}));
    let config = DiffConfig::default();
    let first = compare_to_string(&old, &new, &config, &plain());
    let second = compare_to_string(&old, &new, &config, &plain());
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn test_plain_format_of_tree() {
    let root = compare_raw(&v(json!({"age": 30})), &v(json!({"age": 31})), &DiffConfig::default());
    let output = format_diff(&root, &OutputFormat::Plain, &OutputOptions::default()).unwrap();
    assert!(output.contains("+  age: 31"));
    assert!(output.contains("-  age: 30"));
    assert!(!output.contains('\u{1b}'));
}

#[test]
fn test_json_format_of_tree() {
    let root = compare_raw(&v(json!({"a": "x"})), &v(json!({"a": "y", "b": 1})), &DiffConfig::default());
    let output = format_diff(&root, &OutputFormat::Json, &OutputOptions::default()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

    let children = parsed["diff"]["children"].as_array().unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0]["kind"], "changed");
    assert_eq!(children[0]["meta"]["edit_distance"], 1);
    assert_eq!(children[1]["kind"], "added");
    assert!(children[1].get("old_value").is_none());
    assert_eq!(parsed["stats"]["added"], 1);
    assert_eq!(parsed["stats"]["changed"], 1);
}

#[test]
fn test_reordered_array_is_visible() {
    let old = v(json!({"list": [1, 2]}));
    let new = v(json!({"list": [2, 1]}));
    let config = DiffConfig::default();

    let text = compare_to_string(&old, &new, &config, &plain());
    assert_eq!(
        text,
        " {\n+  list: [\n+    2\n+    1\n+  ]\n-  list: [\n-    1\n-    2\n-  ]\n }\n"
    );

    let stats = DiffStats::from_node(&compare_raw(&old, &new, &config));
    assert_eq!(format_summary(&stats), "Summary: 1 changed");
}

#[test]
fn test_ignored_keys_never_rendered() {
    let config = DiffConfig {
        full_output: true,
        ..DiffConfig::new().ignore_key("secret")
    };
    let text = render(json!({"x": {"secret": "a"}}), json!({"x": {"secret": "b"}}), &config);
    assert_eq!(text, " {\n   x: {}\n }\n");

    let config = DiffConfig::new().ignore_key("secret");
    let text = render(json!({}), json!({"x": {"secret": 1, "a": 2}}), &config);
    assert_eq!(text, " {\n+  x: {\n+    a: 2\n+  }\n }\n");
    assert!(!text.contains("secret"));
}

#[test]
fn test_unusual_keys_are_quoted() {
    let text = render(json!({}), json!({"": 1, "a: b": 2, "plain_key": 3}), &DiffConfig::default());
    assert_eq!(text, " {\n+  \"\": 1\n+  \"a: b\": 2\n+  plain_key: 3\n }\n");
}

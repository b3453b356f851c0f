//! Loading JSON, YAML and TOML documents into [`Value`]s.
//!
//! The format is detected from the file extension when possible. Unknown
//! extensions are tried as JSON, then TOML, then YAML (YAML accepts almost
//! any text, so it goes last).
//!
//! # Examples
//!
//! ```no_run
//! use jdiff::parser::parse_file;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let value = parse_file(Path::new("config.yaml"))?;
//! # Ok(())
//! # }
//! ```

use crate::error::ParseError;
use crate::value::Value;
use indexmap::IndexMap;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Which parser to use for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatHint {
    #[default]
    Auto,
    Json,
    Yaml,
    Toml,
}

impl FormatHint {
    /// Picks a format from the file extension, falling back to `Auto`.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase());

        match extension.as_deref() {
            Some("json") => FormatHint::Json,
            Some("yaml") | Some("yml") => FormatHint::Yaml,
            Some("toml") => FormatHint::Toml,
            _ => FormatHint::Auto,
        }
    }
}

/// Parses a file, detecting its format by extension.
///
/// # Errors
///
/// - `ParseError::FileNotFound` if the path does not exist
/// - `ParseError::ReadError` if it cannot be read
/// - a format-specific error if the content is invalid
/// - `ParseError::UnknownFormat` if no parser accepts an unknown extension
/// - `ParseError::UnsupportedValue` for non-finite numbers
pub fn parse_file(path: &Path) -> Result<Value, ParseError> {
    let label = path.to_string_lossy().to_string();
    if !path.exists() {
        return Err(ParseError::file_not_found(label));
    }

    let content = fs::read_to_string(path).map_err(|e| ParseError::read_error(label.clone(), e))?;
    tracing::debug!(path = %label, bytes = content.len(), "read input");

    parse_content(&content, FormatHint::from_path(path), &label)
}

/// Reads standard input to the end and parses it.
///
/// # Arguments
///
/// * `hint` - Format to use; `FormatHint::Auto` tries each parser in turn
///
/// # Errors
///
/// `ParseError::ReadError` if stdin cannot be read, otherwise the same errors
/// as [`parse_content`]. Errors name the source `<stdin>`.
pub fn parse_stdin(hint: FormatHint) -> Result<Value, ParseError> {
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .map_err(|e| ParseError::read_error("<stdin>", e))?;
    parse_content(&content, hint, "<stdin>")
}

/// Parses `content` with the hinted format.
///
/// With `FormatHint::Auto` the parsers are tried in the order JSON, TOML,
/// YAML and the first success wins. An unsupported value stops the search,
/// since a later parser would only misread the same document.
///
/// # Arguments
///
/// * `content` - The document text
/// * `hint` - Which parser to use
/// * `label` - Names the source (usually a path) in error messages
///
/// # Returns
///
/// The parsed [`Value`]. Every number in it is finite and, for integers,
/// exact.
///
/// # Errors
///
/// - `ParseError::JsonError`, `YamlError` or `TomlError` for invalid content
///   under an explicit hint
/// - `ParseError::UnknownFormat` if no parser accepts the content under `Auto`
/// - `ParseError::UnsupportedValue` for non-finite numbers and for integers
///   an `f64` cannot hold exactly
///
/// # Examples
///
/// ```
/// use jdiff::parser::{parse_content, FormatHint};
/// use jdiff::Value;
///
/// let value = parse_content("port = 8080", FormatHint::Auto, "inline").unwrap();
/// match value {
///     Value::Object(map) => assert_eq!(map.get("port"), Some(&Value::Number(8080.0))),
///     _ => panic!("expected a table"),
/// }
///
/// assert!(parse_content("{\"a\": 1e999}", FormatHint::Json, "inline").is_err());
/// ```
pub fn parse_content(content: &str, hint: FormatHint, label: &str) -> Result<Value, ParseError> {
    match hint {
        FormatHint::Json => {
            let value: serde_json::Value =
                serde_json::from_str(content).map_err(|e| ParseError::json_error(label, e))?;
            json_to_value(value, "").map_err(|message| ParseError::unsupported_value(label, message))
        }
        FormatHint::Yaml => {
            let value: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| ParseError::yaml_error(label, e))?;
            yaml_to_value(value, "").map_err(|message| ParseError::unsupported_value(label, message))
        }
        FormatHint::Toml => {
            let table: toml::Table =
                toml::from_str(content).map_err(|e| ParseError::toml_error(label, e))?;
            toml_to_value(toml::Value::Table(table), "")
                .map_err(|message| ParseError::unsupported_value(label, message))
        }
        FormatHint::Auto => [FormatHint::Json, FormatHint::Toml, FormatHint::Yaml]
            .into_iter()
            .find_map(|format| match parse_content(content, format, label) {
                Ok(value) => Some(Ok(value)),
                Err(err @ ParseError::UnsupportedValue { .. }) => Some(Err(err)),
                Err(_) => None,
            })
            .unwrap_or_else(|| Err(ParseError::unknown_format(label))),
    }
}

/// Parses a JSON string.
///
/// ```
/// use jdiff::parser::parse_json;
///
/// let value = parse_json(r#"{"name": "Alice", "age": 30}"#).unwrap();
/// ```
pub fn parse_json(content: &str) -> Result<Value, ParseError> {
    parse_content(content, FormatHint::Json, "<string>")
}

/// Parses a YAML string. Non-string keys are converted to their text.
///
/// ```
/// use jdiff::parser::parse_yaml;
/// use jdiff::Value;
///
/// let value = parse_yaml("1: one\ntrue: yes").unwrap();
/// match value {
///     Value::Object(map) => assert!(map.contains_key("1") && map.contains_key("true")),
///     _ => panic!("expected a mapping"),
/// }
/// ```
pub fn parse_yaml(content: &str) -> Result<Value, ParseError> {
    parse_content(content, FormatHint::Yaml, "<string>")
}

/// Parses a TOML string. Datetimes become strings.
pub fn parse_toml(content: &str) -> Result<Value, ParseError> {
    parse_content(content, FormatHint::Toml, "<string>")
}

fn number(int: Option<i64>, uint: Option<u64>, float: Option<f64>, at: &str) -> Result<Value, String> {
    match (int, uint) {
        (Some(i), _) => exact_integer(i128::from(i), at),
        (None, Some(u)) => exact_integer(i128::from(u), at),
        (None, None) => finite(float.unwrap_or(f64::NAN), at),
    }
}

/// Numbers are `f64`; integers past 2^53 that would round are refused.
fn exact_integer(i: i128, at: &str) -> Result<Value, String> {
    let n = i as f64;
    if n as i128 == i {
        Ok(Value::Number(n))
    } else {
        Err(format!("integer {} at {} cannot be represented exactly", i, location(at)))
    }
}

fn finite(n: f64, at: &str) -> Result<Value, String> {
    if n.is_finite() {
        Ok(Value::Number(n))
    } else {
        Err(format!("non-finite number {} at {}", n, location(at)))
    }
}

fn location(at: &str) -> &str {
    if at.is_empty() {
        "(root)"
    } else {
        at
    }
}

fn nested(at: &str, segment: &str) -> String {
    if at.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", at, segment)
    }
}

/// Converts YAML into a `Value`.
///
/// Non-string keys are stringified; tags are dropped and the tagged value kept.
fn yaml_to_value(value: serde_yaml::Value, at: &str) -> Result<Value, String> {
    match value {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_yaml::Value::Number(n) => number(n.as_i64(), n.as_u64(), n.as_f64(), at),
        serde_yaml::Value::String(s) => Ok(Value::String(s)),
        serde_yaml::Value::Sequence(seq) => seq
            .into_iter()
            .enumerate()
            .map(|(i, item)| yaml_to_value(item, &nested(at, &i.to_string())))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = IndexMap::with_capacity(map.len());
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::Null => "null".to_string(),
                    other => format!("{:?}", other),
                };
                let item = yaml_to_value(v, &nested(at, &key))?;
                object.insert(key, item);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_value(tagged.value, at),
    }
}

fn json_to_value(value: serde_json::Value, at: &str) -> Result<Value, String> {
    match value {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_json::Value::Number(n) => number(n.as_i64(), n.as_u64(), n.as_f64(), at),
        serde_json::Value::String(s) => Ok(Value::String(s)),
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .enumerate()
            .map(|(i, item)| json_to_value(item, &nested(at, &i.to_string())))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_json::Value::Object(map) => {
            let mut object = IndexMap::with_capacity(map.len());
            for (key, item) in map {
                let converted = json_to_value(item, &nested(at, &key))?;
                object.insert(key, converted);
            }
            Ok(Value::Object(object))
        }
    }
}

/// Converts TOML into a `Value`. Datetimes become their RFC 3339 text.
fn toml_to_value(value: toml::Value, at: &str) -> Result<Value, String> {
    match value {
        toml::Value::String(s) => Ok(Value::String(s)),
        toml::Value::Integer(i) => exact_integer(i128::from(i), at),
        toml::Value::Float(f) => finite(f, at),
        toml::Value::Boolean(b) => Ok(Value::Bool(b)),
        toml::Value::Datetime(dt) => Ok(Value::String(dt.to_string())),
        toml::Value::Array(arr) => arr
            .into_iter()
            .enumerate()
            .map(|(i, item)| toml_to_value(item, &nested(at, &i.to_string())))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        toml::Value::Table(table) => {
            let mut object = IndexMap::with_capacity(table.len());
            for (key, item) in table {
                let converted = toml_to_value(item, &nested(at, &key))?;
                object.insert(key, converted);
            }
            Ok(Value::Object(object))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_json_keeps_key_order() {
        let value = parse_json(r#"{"z": 1, "a": 2}"#).unwrap();
        match value {
            Value::Object(map) => {
                let keys: Vec<_> = map.keys().cloned().collect();
                assert_eq!(keys, vec!["z", "a"]);
            }
            _ => panic!("Expected object"),
        }
    }

    #[test]
    fn test_parse_yaml_rejects_nan() {
        let err = parse_yaml("rate: .nan").unwrap_err();
        match err {
            ParseError::UnsupportedValue { message, .. } => assert!(message.contains("rate")),
            other => panic!("Expected UnsupportedValue, got {:?}", other),
        }
    }

    #[test]
    fn test_large_integers_are_exact_or_refused() {
        assert_eq!(parse_json("9007199254740992").unwrap(), Value::Number(9007199254740992.0));
        assert_eq!(parse_json("-42").unwrap(), Value::Number(-42.0));

        let err = parse_json(r#"{"id": 9007199254740993}"#).unwrap_err();
        match err {
            ParseError::UnsupportedValue { message, .. } => {
                assert!(message.contains("9007199254740993"));
                assert!(message.contains("id"));
            }
            other => panic!("Expected UnsupportedValue, got {:?}", other),
        }
        assert!(parse_yaml("id: 18446744073709551615").is_err());
        assert!(parse_toml("id = 9007199254740993").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let value = parse_toml("name = \"x\"\n[server]\nport = 8080\n").unwrap();
        match value {
            Value::Object(map) => {
                assert_eq!(map.get("name"), Some(&Value::String("x".to_string())));
                match map.get("server") {
                    Some(Value::Object(server)) => {
                        assert_eq!(server.get("port"), Some(&Value::Number(8080.0)))
                    }
                    _ => panic!("Expected server table"),
                }
            }
            _ => panic!("Expected object"),
        }
    }

    #[test]
    fn test_parse_toml_datetime_as_string() {
        let value = parse_toml("at = 1979-05-27T07:32:00Z").unwrap();
        match value {
            Value::Object(map) => assert_eq!(
                map.get("at"),
                Some(&Value::String("1979-05-27T07:32:00Z".to_string()))
            ),
            _ => panic!("Expected object"),
        }
    }

    #[test]
    fn test_auto_detects_toml_before_yaml() {
        let value = parse_content("a = 1", FormatHint::Auto, "x").unwrap();
        match value {
            Value::Object(map) => assert_eq!(map.get("a"), Some(&Value::Number(1.0))),
            _ => panic!("Expected object"),
        }
    }

    #[test]
    fn test_format_hint_from_path() {
        assert_eq!(FormatHint::from_path(Path::new("a.JSON")), FormatHint::Json);
        assert_eq!(FormatHint::from_path(Path::new("a.yml")), FormatHint::Yaml);
        assert_eq!(FormatHint::from_path(Path::new("a.toml")), FormatHint::Toml);
        assert_eq!(FormatHint::from_path(Path::new("a")), FormatHint::Auto);
    }

    #[test]
    fn test_parse_file_unknown_extension() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"key": "value"}}"#).unwrap();
        let path = file.path().with_extension("txt");
        fs::copy(file.path(), &path).unwrap();

        let value = parse_file(&path).unwrap();
        match value {
            Value::Object(map) => {
                assert_eq!(map.get("key"), Some(&Value::String("value".to_string())));
            }
            _ => panic!("Expected object"),
        }

        fs::remove_file(&path).unwrap();
    }
}

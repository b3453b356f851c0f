//! jdiff - structural diff for JSON-like values.
//!
//! Two values (parsed from JSON, YAML or TOML, or built in code) are compared
//! recursively into a [`DiffNode`] tree. Arrays are aligned by element
//! similarity rather than by position, so an insertion does not show up as a
//! cascade of changes. The tree can be rendered as git-style text or JSON.
//!
//! # Example
//!
//! ```no_run
//! use jdiff::{compare_raw, format_diff, parse_file, DiffConfig, OutputFormat, OutputOptions};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let old = parse_file(Path::new("old.json"))?;
//! let new = parse_file(Path::new("new.json"))?;
//!
//! let config = DiffConfig::default().ignore_key("timestamp");
//! let root = compare_raw(&old, &new, &config);
//!
//! let output = format_diff(&root, &OutputFormat::Terminal, &OutputOptions::default())?;
//! print!("{}", output);
//! # Ok(())
//! # }
//! ```

pub mod align;
pub mod diff;
pub mod error;
pub mod output;
pub mod parser;
pub mod similarity;
pub mod value;

// Re-export commonly used types for convenience
pub use align::{align_arrays, MATCH_THRESHOLD};
pub use diff::{
    compare, compare_raw, has_difference, ChangeKind, DiffConfig, DiffNode, DiffStats, Meta,
};
pub use error::{JdiffError, OutputError, ParseError};
pub use output::{compare_to_string, format_diff, format_summary, OutputFormat, OutputOptions};
pub use parser::{
    parse_content, parse_file, parse_json, parse_stdin, parse_toml, parse_yaml, FormatHint,
};
pub use similarity::similarity;
pub use value::{is_equal, Value};

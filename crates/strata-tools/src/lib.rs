//! Strata Tools
//!
//! CLI tools for compiling Strata statements, plus the JSON loaders they share.

use std::fs;
use std::path::{Path, PathBuf};

use strata_ast::StatementTree;
use strata_compiler::{JsonAccessor, Schema};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging with a default filter.
///
/// Use `RUST_LOG` environment variable to override the default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Same as [`init_logging`], with compiler internals at `debug`.
pub fn init_verbose_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,strata_compiler=debug,strata_tools=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {what} in {path}: {source}")]
    Parse {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected NAME=FILE, got `{0}`")]
    Binding(String),
}

fn read_json(path: &Path) -> Result<serde_json::Value, LoadError> {
    debug!(path = %path.display(), "loading");
    let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Parse {
        what: "JSON",
        path: path.to_path_buf(),
        source,
    })
}

fn decode<T: serde::de::DeserializeOwned>(what: &'static str, path: &Path) -> Result<T, LoadError> {
    serde_json::from_value(read_json(path)?).map_err(|source| LoadError::Parse {
        what,
        path: path.to_path_buf(),
        source,
    })
}

/// Statement syntax tree serialized as JSON by a front end.
pub fn load_statement(path: &Path) -> Result<StatementTree, LoadError> {
    decode("statement", path)
}

pub fn load_schema(path: &Path) -> Result<Schema, LoadError> {
    decode("schema", path)
}

/// Subject data document, wrapped as an accessor.
pub fn load_accessor(path: &Path) -> Result<JsonAccessor, LoadError> {
    Ok(JsonAccessor::new(read_json(path)?))
}

/// Splits a `NAME=FILE` command-line binding.
pub fn parse_binding(binding: &str) -> Result<(String, PathBuf), LoadError> {
    match binding.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(LoadError::Binding(binding.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binding() {
        let (name, path) = parse_binding("pass=data/pass.json").unwrap();
        assert_eq!(name, "pass");
        assert_eq!(path, PathBuf::from("data/pass.json"));

        assert!(matches!(parse_binding("pass"), Err(LoadError::Binding(_))));
        assert!(matches!(parse_binding("=file.json"), Err(LoadError::Binding(_))));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = load_accessor(Path::new("/nonexistent/strata/data.json")).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }
}

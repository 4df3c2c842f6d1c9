//! Environment lookups used by generated loaders.
//!
//! Every `get_*_env` helper returns `None` when the variable is unset *or*
//! cannot be parsed as the requested type, so a loader falls through to its
//! existing value and then to its defaults.

use std::collections::HashMap;
use std::str::FromStr;

use tracing::debug;

use crate::error::LoadError;

/// Where environment variables are read from.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<S: EnvSource + ?Sized> EnvSource for &S {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

/// Accepts the same spellings as Go's `strconv.ParseBool`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parses a numeric value, ignoring surrounding whitespace.
pub fn parse_number<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

/// Splits a comma separated list, trimming items and dropping empty ones.
pub fn split_array(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

fn lookup_with<T>(
    source: &dyn EnvSource,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = source.var(key)?;
    let parsed = parse(&raw);
    if parsed.is_none() {
        debug!(var = key, value = %raw, "ignoring unparsable environment value");
    }
    parsed
}

pub fn lookup_string(source: &dyn EnvSource, key: &str) -> Option<String> {
    source.var(key)
}

pub fn lookup_bool(source: &dyn EnvSource, key: &str) -> Option<bool> {
    lookup_with(source, key, parse_bool)
}

pub fn lookup_number<T: FromStr>(source: &dyn EnvSource, key: &str) -> Option<T> {
    lookup_with(source, key, parse_number::<T>)
}

pub fn lookup_array(source: &dyn EnvSource, key: &str) -> Option<Vec<String>> {
    source.var(key).map(|raw| split_array(&raw))
}

pub fn get_string_env(key: &str) -> Option<String> {
    lookup_string(&ProcessEnv, key)
}

pub fn get_bool_env(key: &str) -> Option<bool> {
    lookup_bool(&ProcessEnv, key)
}

pub fn get_i32_env(key: &str) -> Option<i32> {
    lookup_number(&ProcessEnv, key)
}

pub fn get_i64_env(key: &str) -> Option<i64> {
    lookup_number(&ProcessEnv, key)
}

pub fn get_u32_env(key: &str) -> Option<u32> {
    lookup_number(&ProcessEnv, key)
}

pub fn get_u64_env(key: &str) -> Option<u64> {
    lookup_number(&ProcessEnv, key)
}

pub fn get_f32_env(key: &str) -> Option<f32> {
    lookup_number(&ProcessEnv, key)
}

pub fn get_f64_env(key: &str) -> Option<f64> {
    lookup_number(&ProcessEnv, key)
}

pub fn get_array_string_env(key: &str) -> Option<Vec<String>> {
    lookup_array(&ProcessEnv, key)
}

/// Resolves an enum symbol read from `var`. Unknown symbols are an error
/// rather than silently becoming the zero variant.
pub fn resolve_enum<E>(
    var: &str,
    symbol: &str,
    lookup: impl Fn(&str) -> Option<E>,
) -> Result<E, LoadError> {
    lookup(symbol.trim()).ok_or_else(|| LoadError::UnknownEnumSymbol {
        var:    var.to_owned(),
        symbol: symbol.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_spellings() {
        for raw in ["1", "t", "T", "TRUE", "true", "True", " true "] {
            assert_eq!(parse_bool(raw), Some(true), "{raw}");
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(raw), Some(false), "{raw}");
        }
        assert_eq!(parse_bool("yes"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_split_array() {
        assert_eq!(split_array("RED, GREEN,,BLUE "), vec!["RED", "GREEN", "BLUE"]);
        assert!(split_array("").is_empty());
    }

    #[test]
    fn test_lookup_from_map() {
        let env: HashMap<String, String> = HashMap::from([
            ("PORT".to_owned(), "8080".to_owned()),
            ("BAD_PORT".to_owned(), "eighty".to_owned()),
            ("EMPTY".to_owned(), String::new()),
        ]);

        assert_eq!(lookup_number::<u32>(&env, "PORT"), Some(8080));
        assert_eq!(lookup_number::<u32>(&env, "BAD_PORT"), None);
        assert_eq!(lookup_number::<u32>(&env, "MISSING"), None);
        assert_eq!(lookup_string(&env, "EMPTY"), Some(String::new()));
    }

    #[test]
    fn test_get_env_reads_process_env() {
        temp_env::with_vars(
            [
                ("PROTOENV_TEST_ENABLED", Some("true")),
                ("PROTOENV_TEST_RATIO", Some("0.25")),
                ("PROTOENV_TEST_LIST", Some("a,b")),
            ],
            || {
                assert_eq!(get_bool_env("PROTOENV_TEST_ENABLED"), Some(true));
                assert_eq!(get_f64_env("PROTOENV_TEST_RATIO"), Some(0.25));
                assert_eq!(
                    get_array_string_env("PROTOENV_TEST_LIST"),
                    Some(vec!["a".to_owned(), "b".to_owned()])
                );
                assert_eq!(get_i64_env("PROTOENV_TEST_UNSET"), None);
            },
        );
    }

    #[test]
    fn test_resolve_enum() {
        let lookup = |symbol: &str| match symbol {
            "RED" => Some(1),
            _ => None,
        };
        assert_eq!(resolve_enum("COLOR", "RED", lookup).unwrap(), 1);

        let err = resolve_enum("COLOR", "PURPLE", lookup).unwrap_err();
        assert_eq!(
            err,
            LoadError::UnknownEnumSymbol {
                var:    "COLOR".to_owned(),
                symbol: "PURPLE".to_owned(),
            }
        );
    }
}

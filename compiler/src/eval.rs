//! Executes loader procedures over dynamic [`Value`]s.
//!
//! Behaves exactly like the generated loaders, so the population rules can be
//! exercised without compiling generated code. Message fields are keyed by
//! their declared names. After [`populate`] every loadable field is present:
//! scalars and enums hold a value (possibly zero), wrappers and nested
//! messages are set, maps and enum lists exist (possibly empty).

use std::collections::BTreeMap;

use protoenv::{env, EnvSource, LoadError};
use protoenv_schema::{zero_value, ScalarKind, Value};
use thiserror::Error;

use crate::ir::{EnumRef, LoaderUnit, Stmt};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("No loader procedure for message \"{0}\"")]
    UnknownProcedure(String),
}

fn lookup_scalar(source: &dyn EnvSource, key: &str, kind: ScalarKind) -> Option<Value> {
    match kind.storage() {
        ScalarKind::Double => env::lookup_number(source, key).map(Value::Double),
        ScalarKind::Float  => env::lookup_number(source, key).map(Value::Float),
        ScalarKind::Int32  => env::lookup_number(source, key).map(Value::Int32),
        ScalarKind::Int64  => env::lookup_number(source, key).map(Value::Int64),
        ScalarKind::UInt32 => env::lookup_number(source, key).map(Value::UInt32),
        ScalarKind::UInt64 => env::lookup_number(source, key).map(Value::UInt64),
        ScalarKind::Bool   => env::lookup_bool(source, key).map(Value::Bool),
        _                  => env::lookup_string(source, key).map(Value::String),
    }
}

fn resolve_symbol(key: &str, symbol: &str, def: &EnumRef) -> Result<Value, LoadError> {
    env::resolve_enum(key, symbol, |s| def.number_of(s)).map(Value::Int32)
}

/// Keeps a non-zero current value, else takes a non-zero default, else zero.
fn fall_back(target: &mut Value, name: &str, defaults: Option<&Value>, zero: Value) {
    let current = target.get(name).cloned().unwrap_or_else(|| zero.clone());
    if !current.is_zero() {
        return;
    }
    let value = defaults
        .and_then(|d| d.get(name))
        .filter(|d| !d.is_zero())
        .cloned()
        .unwrap_or(zero);
    target.set(name, value);
}

/// Applies the procedure for `message` to `target`. `defaults` is only read.
pub fn populate(
    unit: &LoaderUnit,
    message: &str,
    target: &mut Value,
    prefix: &str,
    defaults: Option<&Value>,
    source: &dyn EnvSource,
) -> Result<(), EvalError> {
    let procedure = unit
        .procedure(message)
        .ok_or_else(|| EvalError::UnknownProcedure(message.to_string()))?;

    for stmt in &procedure.statements {
        let field = stmt.field();
        let name = field.name.as_str();
        let key = format!("{}{}", prefix, field.env);

        match stmt {
            Stmt::Scalar { kind, .. } => match lookup_scalar(source, &key, *kind) {
                Some(value) => target.set(name, value),
                None => fall_back(target, name, defaults, zero_value(*kind)),
            },
            Stmt::Wrapper { shape, .. } => match lookup_scalar(source, &key, shape.scalar()) {
                Some(value) => target.set(name, value),
                None if target.get(name).is_none() => {
                    let value = defaults
                        .and_then(|d| d.get(name))
                        .cloned()
                        .unwrap_or_else(|| zero_value(shape.scalar()));
                    target.set(name, value);
                }
                None => {}
            },
            Stmt::Enum { def, .. } => match env::lookup_string(source, &key) {
                Some(symbol) => target.set(name, resolve_symbol(&key, &symbol, def)?),
                None => fall_back(target, name, defaults, Value::Int32(0)),
            },
            Stmt::EnumList { def, .. } => match env::lookup_array(source, &key) {
                Some(symbols) => {
                    let values = symbols
                        .iter()
                        .map(|symbol| resolve_symbol(&key, symbol, def))
                        .collect::<Result<Vec<_>, _>>()?;
                    target.set(name, Value::List(values));
                }
                None => fall_back(target, name, defaults, Value::List(Vec::new())),
            },
            Stmt::Nested { message, .. } => {
                let mut nested = target
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| Value::message(message));
                let nested_prefix = format!("{}_", key);
                let nested_defaults = defaults.and_then(|d| d.get(name));
                populate(unit, message, &mut nested, &nested_prefix, nested_defaults, source)?;
                target.set(name, nested);
            }
            Stmt::MergeMap { .. } => {
                let mut entries = target
                    .get(name)
                    .and_then(Value::as_map)
                    .cloned()
                    .unwrap_or_default();
                if let Some(defaults) = defaults.and_then(|d| d.get(name)).and_then(Value::as_map) {
                    for (k, v) in defaults {
                        entries.entry(k.clone()).or_insert_with(|| v.clone());
                    }
                }
                target.set(name, Value::Map(entries));
            }
        }
    }
    Ok(())
}

/// Merges `values` into the map field `field` of `target`, allocating the
/// map if needed and overwriting existing keys.
pub fn put_all(target: &mut Value, field: &str, values: BTreeMap<String, String>) {
    let mut entries = target
        .get(field)
        .and_then(Value::as_map)
        .cloned()
        .unwrap_or_default();
    entries.extend(values);
    target.set(field, Value::Map(entries));
}

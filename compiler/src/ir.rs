//! Language-neutral loader procedures.
//!
//! Every message of the root schema file that applies to the generation
//! target becomes one [`Procedure`]: an ordered list of [`Stmt`]s, one per
//! loadable field, plus a [`MapMutator`] per string map field. Renderers turn
//! a [`LoaderUnit`] into source text; the interpreter in `eval` executes it.

use std::collections::HashMap;

use protoenv_schema::{EnumDef, Message, ScalarKind, TargetId};
use tracing::debug;

use crate::{
    classify::{classify_field, FieldClass, WrapperShape},
    error::CompileError,
    naming::env_fragment,
    types::SchemaSet,
};

/// A field as seen by a procedure: its declared name and the fragment it
/// contributes to environment variable names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub name: String,
    pub env:  String,
}

/// Symbol table of an enum, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumRef {
    pub name:    String,
    pub symbols: Vec<(String, i32)>,
}

impl EnumRef {
    fn from_def(def: &EnumDef) -> EnumRef {
        EnumRef {
            name:    def.name.clone(),
            symbols: def.values.iter().map(|v| (v.name.clone(), v.number)).collect(),
        }
    }

    pub fn number_of(&self, symbol: &str) -> Option<i32> {
        self.symbols
            .iter()
            .find(|(name, _)| name == symbol)
            .map(|(_, number)| *number)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// env > non-zero current value > non-zero default > zero.
    Scalar { field: FieldRef, kind: ScalarKind },
    /// env > current value > default > zero; never left unset.
    Wrapper { field: FieldRef, shape: WrapperShape },
    /// Like a scalar, with the env value resolved through the symbol table.
    Enum { field: FieldRef, def: EnumRef },
    /// Comma separated symbols; a non-empty default replaces an empty list.
    EnumList { field: FieldRef, def: EnumRef },
    /// Allocates the message if unset and recurses with `prefix + env + "_"`.
    Nested { field: FieldRef, message: String },
    /// Copies default entries whose keys are absent.
    MergeMap { field: FieldRef },
}

impl Stmt {
    pub fn field(&self) -> &FieldRef {
        match self {
            Stmt::Scalar { field, .. }
            | Stmt::Wrapper { field, .. }
            | Stmt::Enum { field, .. }
            | Stmt::EnumList { field, .. }
            | Stmt::Nested { field, .. }
            | Stmt::MergeMap { field } => field,
        }
    }
}

/// Companion operation merging a caller map into a map field, overwriting
/// on key collision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapMutator {
    pub field: FieldRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    pub message:      String,
    pub statements:   Vec<Stmt>,
    pub map_mutators: Vec<MapMutator>,
}

/// Every procedure generated for one schema file, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderUnit {
    pub source:     String,
    pub procedures: Vec<Procedure>,
}

impl LoaderUnit {
    pub fn procedure(&self, message: &str) -> Option<&Procedure> {
        self.procedures.iter().find(|p| p.message == message)
    }
}

fn emit_procedure(
    set: &SchemaSet,
    message: &Message,
    target: &TargetId,
) -> Result<Procedure, CompileError> {
    let mut statements = Vec::new();
    let mut map_mutators = Vec::new();
    let mut claimed: HashMap<String, &str> = HashMap::new();

    for field in &message.fields {
        let class = classify_field(set, message, field, target)?;
        debug!(message = %message.name, field = %field.name, class = ?class, "classified field");

        let field_ref = FieldRef {
            name: field.name.clone(),
            env:  env_fragment(&field.name),
        };
        let stmt = match class {
            FieldClass::Skipped(_) => continue,
            FieldClass::RepeatedUnsupported => {
                debug!(message = %message.name, field = %field.name, "Unsupported repeated");
                continue;
            }
            FieldClass::Scalar(kind) => Stmt::Scalar { field: field_ref, kind },
            FieldClass::Wrapper(shape) => Stmt::Wrapper { field: field_ref, shape },
            FieldClass::Enum(def) => Stmt::Enum {
                field: field_ref,
                def:   EnumRef::from_def(def),
            },
            FieldClass::RepeatedEnum(def) => Stmt::EnumList {
                field: field_ref,
                def:   EnumRef::from_def(def),
            },
            FieldClass::Nested(nested) => Stmt::Nested {
                field:   field_ref,
                message: nested.name.clone(),
            },
            FieldClass::StringMap => {
                map_mutators.push(MapMutator { field: field_ref.clone() });
                Stmt::MergeMap { field: field_ref }
            }
        };

        let env = stmt.field().env.clone();
        if let Some(first) = claimed.insert(env.clone(), field.name.as_str()) {
            return Err(CompileError::DuplicateEnvVar {
                message: message.name.clone(),
                env,
                first:   first.to_string(),
                second:  field.name.clone(),
            });
        }
        statements.push(stmt);
    }

    Ok(Procedure {
        message: message.name.clone(),
        statements,
        map_mutators,
    })
}

/// Emits a procedure for every message of the root file that applies to
/// `target`. The first unsupported field aborts the whole unit.
pub fn emit_unit(set: &SchemaSet, target: &TargetId) -> Result<LoaderUnit, CompileError> {
    let mut procedures = Vec::new();
    for message in &set.root.messages {
        if !message.targets.includes(target) {
            debug!(message = %message.name, target = %target, "message skipped for target");
            continue;
        }
        procedures.push(emit_procedure(set, message, target)?);
    }
    Ok(LoaderUnit {
        source: set.root.name.clone(),
        procedures,
    })
}

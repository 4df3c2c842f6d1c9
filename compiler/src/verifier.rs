use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use protoenv_schema::{Label, Message, ProtoFile, ScalarKind, WrapperKind};
use regex::Regex;

use crate::{
    error::CompileError,
    types::{SchemaSet, TypeRef},
    utils::quote,
};

lazy_static! {
    pub static ref MAP_TYPE: Regex = Regex::new(r"^map<\s*([A-Za-z0-9_.]+)\s*,\s*([A-Za-z0-9_.]+)\s*>$").unwrap();
}

/// Splits `map<K,V>` into its key and value type names.
pub fn map_types(type_name: &str) -> Option<(&str, &str)> {
    let caps = MAP_TYPE.captures(type_name)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

fn is_known_type(set: &SchemaSet, type_name: &str) -> bool {
    type_name == "bytes"
        || ScalarKind::from_proto_name(type_name).is_some()
        || WrapperKind::from_type_name(type_name).is_some()
        || set.resolve(type_name).is_some()
}

/// Returns `Ok(())` if the root file of `set` is well formed, or
/// `Err(CompileError::VerifierError(_))` otherwise.
pub fn verify_schema(set: &SchemaSet) -> Result<(), CompileError> {
    let file = &set.root;

    // 1) Check duplicate type names
    let mut defined_types: HashSet<&str> = HashSet::new();
    let names = file
        .messages
        .iter()
        .map(|m| m.name.as_str())
        .chain(file.enums.iter().map(|e| e.name.as_str()));
    for name in names {
        if !defined_types.insert(name) {
            return Err(CompileError::VerifierError(format!(
                "The type {} is defined twice",
                quote(name)
            )));
        }
    }

    // 2) Check enum symbols
    for def in &file.enums {
        if def.values.is_empty() {
            return Err(CompileError::VerifierError(format!(
                "The enum {} has no values",
                quote(&def.name)
            )));
        }
        let mut symbols = HashSet::new();
        for value in &def.values {
            if !symbols.insert(value.name.as_str()) {
                return Err(CompileError::VerifierError(format!(
                    "The enum value {} is defined twice in {}",
                    quote(&value.name),
                    quote(&def.name)
                )));
            }
        }
    }

    // 3) Check fields inside each message
    for message in &file.messages {
        let mut field_names = HashSet::new();
        let mut numbers = HashSet::new();
        for field in &message.fields {
            if !field_names.insert(field.name.as_str()) {
                return Err(CompileError::VerifierError(format!(
                    "The field {} is defined twice in {}",
                    quote(&field.name),
                    quote(&message.name)
                )));
            }
            if field.number <= 0 {
                return Err(CompileError::VerifierError(format!(
                    "The id for field {} must be positive",
                    quote(&field.name)
                )));
            }
            if !numbers.insert(field.number) {
                return Err(CompileError::VerifierError(format!(
                    "The id for field {} is used twice",
                    quote(&field.name)
                )));
            }

            let referenced: Vec<&str> = match map_types(&field.type_name) {
                Some((key, value)) => vec![key, value],
                None => vec![field.type_name.as_str()],
            };
            for type_name in referenced {
                if !is_known_type(set, type_name) {
                    return Err(CompileError::VerifierError(format!(
                        "The type {} is not defined for field {}",
                        quote(type_name),
                        quote(&field.name)
                    )));
                }
            }
        }
    }

    // 4) Check that messages do not contain themselves. Only singular
    // message fields recurse during loading; repeated, map and oneof
    // fields never do. Field types resolve against the package of the file
    // declaring the message, so cycles inside imports are found too.
    let mut state: HashMap<String, u8> = HashMap::new();
    fn check_recursion(
        file: &ProtoFile,
        message: &Message,
        set: &SchemaSet,
        state: &mut HashMap<String, u8>,
    ) -> Result<(), CompileError> {
        let key = match &file.package {
            Some(package) => format!("{}.{}", package, message.name),
            None => message.name.clone(),
        };
        if let Some(&s) = state.get(&key) {
            if s == 1 {
                return Err(CompileError::VerifierError(format!(
                    "Recursive nesting of {} is not allowed",
                    quote(&message.name)
                )));
            } else if s == 2 {
                return Ok(());
            }
        }
        state.insert(key.clone(), 1);
        for field in &message.fields {
            if matches!(field.label, Label::Repeated | Label::Oneof(_)) {
                continue;
            }
            if let Some(TypeRef::Message(owner, nested)) = set.resolve_from(file, &field.type_name) {
                check_recursion(owner, nested, set, state)?;
            }
        }
        state.insert(key, 2);
        Ok(())
    }

    for message in &file.messages {
        check_recursion(file, message, set, &mut state)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::{load_schema_text, MemoryImportProvider};

    fn verify(text: &str) -> Result<(), CompileError> {
        let set = load_schema_text("test.proto", text, &MemoryImportProvider::new())?;
        verify_schema(&set)
    }

    fn verifier_message(text: &str) -> String {
        match verify(text) {
            Err(CompileError::VerifierError(msg)) => msg,
            other => panic!("expected a verifier error, got {:?}", other),
        }
    }

    #[test]
    fn accepts_well_formed_schema() {
        verify(
            r#"
            import "google/protobuf/wrappers.proto";
            message A { B b = 1; map<string,string> m = 2; google.protobuf.BoolValue w = 3; Color c = 4; }
            message B { repeated A back = 1; string s = 2; }
            enum Color { RED = 0; }
            "#,
        )
        .unwrap();
    }

    #[test]
    fn rejects_duplicates() {
        assert_eq!(
            verifier_message("message A { string s = 1; } enum A { X = 0; }"),
            "The type \"A\" is defined twice"
        );
        assert_eq!(
            verifier_message("message A { string s = 1; string s = 2; }"),
            "The field \"s\" is defined twice in \"A\""
        );
        assert_eq!(
            verifier_message("message A { string s = 1; string t = 1; }"),
            "The id for field \"t\" is used twice"
        );
    }

    #[test]
    fn rejects_undefined_types() {
        assert_eq!(
            verifier_message("message A { Missing m = 1; }"),
            "The type \"Missing\" is not defined for field \"m\""
        );
        assert_eq!(
            verifier_message("message A { map<string, Nope> m = 1; }"),
            "The type \"Nope\" is not defined for field \"m\""
        );
    }

    #[test]
    fn rejects_recursive_nesting() {
        assert_eq!(
            verifier_message("message A { B b = 1; } message B { A a = 1; }"),
            "Recursive nesting of \"A\" is not allowed"
        );
        assert_eq!(
            verifier_message("message A { A self_ref = 1; }"),
            "Recursive nesting of \"A\" is not allowed"
        );
    }

    #[test]
    fn rejects_recursive_nesting_inside_imports() {
        let provider = MemoryImportProvider::new().with_module(
            "other.proto",
            "package acme.other; message Outer { Inner inner = 1; } message Inner { Outer outer = 1; }",
        );
        let set = load_schema_text(
            "app.proto",
            "package acme.app; import \"other.proto\"; message App { acme.other.Outer outer = 1; }",
            &provider,
        )
        .unwrap();
        match verify_schema(&set) {
            Err(CompileError::VerifierError(msg)) => {
                assert_eq!(msg, "Recursive nesting of \"Outer\" is not allowed")
            }
            other => panic!("expected a verifier error, got {:?}", other),
        }
    }

    #[test]
    fn map_type_parts() {
        assert_eq!(map_types("map<string,int32>"), Some(("string", "int32")));
        assert_eq!(map_types("string"), None);
    }
}

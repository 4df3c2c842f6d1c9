use protoenv_schema::{
    EnumDef, Field, Label, Message, ScalarKind, TargetId, WrapperKind, WRAPPER_PACKAGE,
};

use crate::{error::CompileError, types::SchemaSet, verifier::map_types};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Members of a `oneof` cannot be loaded from the environment.
    Oneof,
    /// The field, or the message it holds, belongs to another runtime.
    Target,
}

/// How an optional scalar is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperShape {
    /// `google.protobuf.*Value`
    WellKnown(WrapperKind),
    /// proto3 `optional` scalar
    Optional(ScalarKind),
}

impl WrapperShape {
    pub fn scalar(self) -> ScalarKind {
        match self {
            WrapperShape::WellKnown(kind) => kind.scalar(),
            WrapperShape::Optional(kind) => kind,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FieldClass<'a> {
    Skipped(SkipReason),
    RepeatedEnum(&'a EnumDef),
    /// Repeated fields of any other element type are left untouched.
    RepeatedUnsupported,
    Wrapper(WrapperShape),
    Enum(&'a EnumDef),
    Nested(&'a Message),
    StringMap,
    Scalar(ScalarKind),
}

fn unsupported(message: &Message, field: &Field) -> CompileError {
    CompileError::UnsupportedType {
        message:   message.name.clone(),
        field:     field.name.clone(),
        type_name: field.type_name.clone(),
    }
}

/// Picks the single category `field` is loaded as. The checks run in a
/// fixed order and the first match wins; skip rules come before any type
/// inspection.
pub fn classify_field<'a>(
    set: &'a SchemaSet,
    message: &Message,
    field: &Field,
    target: &TargetId,
) -> Result<FieldClass<'a>, CompileError> {
    if matches!(field.label, Label::Oneof(_)) {
        return Ok(FieldClass::Skipped(SkipReason::Oneof));
    }
    if !field.targets.includes(target) {
        return Ok(FieldClass::Skipped(SkipReason::Target));
    }
    if let Some(nested) = set.resolve_message(&field.type_name) {
        if !nested.targets.includes(target) {
            return Ok(FieldClass::Skipped(SkipReason::Target));
        }
    }

    if field.label == Label::Repeated {
        return Ok(match set.resolve_enum(&field.type_name) {
            Some(def) => FieldClass::RepeatedEnum(def),
            None => FieldClass::RepeatedUnsupported,
        });
    }

    if let Some(kind) = WrapperKind::from_type_name(&field.type_name) {
        return Ok(FieldClass::Wrapper(WrapperShape::WellKnown(kind)));
    }
    if field.type_name.trim_start_matches('.').starts_with(WRAPPER_PACKAGE) {
        // BytesValue, Duration, Timestamp, ...
        return Err(unsupported(message, field));
    }
    if field.label == Label::Optional {
        if let Some(kind) = ScalarKind::from_proto_name(&field.type_name) {
            return Ok(FieldClass::Wrapper(WrapperShape::Optional(kind)));
        }
    }

    if let Some(def) = set.resolve_enum(&field.type_name) {
        if field.label == Label::Optional {
            return Err(unsupported(message, field));
        }
        return Ok(FieldClass::Enum(def));
    }

    if let Some(nested) = set.resolve_message(&field.type_name) {
        return Ok(FieldClass::Nested(nested));
    }

    if let Some((key, value)) = map_types(&field.type_name) {
        if key != "string" || value != "string" {
            return Err(CompileError::UnsupportedMap {
                message: message.name.clone(),
                field:   field.name.clone(),
                key:     key.to_string(),
                value:   value.to_string(),
            });
        }
        return Ok(FieldClass::StringMap);
    }

    ScalarKind::from_proto_name(&field.type_name)
        .map(FieldClass::Scalar)
        .ok_or_else(|| unsupported(message, field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::{load_schema_text, MemoryImportProvider};

    const SCHEMA: &str = r#"
        import "google/protobuf/wrappers.proto";
        message Config {
          string name = 1;
          google.protobuf.Int32Value timeout = 2;
          repeated Color tags = 3;
          map<string,string> opts = 4;
          Color color = 5;
          Nested nested = 6;
          repeated string hosts = 7;
          optional uint64 limit = 8;
          oneof choice { JavaAgent java = 9; }
          JavaAgent javaagent = 10;
          map<string,int32> counts = 11;
          bytes blob = 12;
          google.protobuf.BytesValue wrapped_blob = 13;
          repeated Nested nesteds = 14;
          GoOnly go_only = 15;
        }
        message Nested { bool on = 1; }
        message JavaAgent { map<string,int32> unsupported = 1; }
        message GoOnly { option (targets) = "go"; string s = 1; }
        enum Color { RED = 0; GREEN = 1; }
    "#;

    fn set() -> SchemaSet {
        load_schema_text("config.proto", SCHEMA, &MemoryImportProvider::new()).unwrap()
    }

    fn classify<'a>(set: &'a SchemaSet, name: &str) -> Result<FieldClass<'a>, CompileError> {
        let message = set.root.message("Config").unwrap();
        let field = message.fields.iter().find(|f| f.name == name).unwrap();
        classify_field(set, message, field, &TargetId::new("rust"))
    }

    #[test]
    fn classifies_each_shape() {
        let set = set();
        assert!(matches!(classify(&set, "name"), Ok(FieldClass::Scalar(ScalarKind::String))));
        assert!(matches!(
            classify(&set, "timeout"),
            Ok(FieldClass::Wrapper(WrapperShape::WellKnown(WrapperKind::Int32)))
        ));
        assert!(matches!(classify(&set, "tags"), Ok(FieldClass::RepeatedEnum(def)) if def.name == "Color"));
        assert!(matches!(classify(&set, "opts"), Ok(FieldClass::StringMap)));
        assert!(matches!(classify(&set, "color"), Ok(FieldClass::Enum(def)) if def.name == "Color"));
        assert!(matches!(classify(&set, "nested"), Ok(FieldClass::Nested(m)) if m.name == "Nested"));
        assert!(matches!(classify(&set, "hosts"), Ok(FieldClass::RepeatedUnsupported)));
        assert!(matches!(classify(&set, "nesteds"), Ok(FieldClass::RepeatedUnsupported)));
        assert!(matches!(
            classify(&set, "limit"),
            Ok(FieldClass::Wrapper(WrapperShape::Optional(ScalarKind::UInt64)))
        ));
    }

    #[test]
    fn skip_rules_come_first() {
        let set = set();
        assert!(matches!(classify(&set, "java"), Ok(FieldClass::Skipped(SkipReason::Oneof))));
        assert!(matches!(classify(&set, "javaagent"), Ok(FieldClass::Skipped(SkipReason::Target))));
        assert!(matches!(classify(&set, "go_only"), Ok(FieldClass::Skipped(SkipReason::Target))));

        let message = set.root.message("Config").unwrap();
        let field = message.fields.iter().find(|f| f.name == "javaagent").unwrap();
        assert!(matches!(
            classify_field(&set, message, field, &TargetId::new("java")),
            Ok(FieldClass::Nested(m)) if m.name == "JavaAgent"
        ));
    }

    #[test]
    fn rejects_unsupported_shapes() {
        let set = set();
        match classify(&set, "counts") {
            Err(CompileError::UnsupportedMap { message, field, key, value }) => {
                assert_eq!((message.as_str(), field.as_str()), ("Config", "counts"));
                assert_eq!((key.as_str(), value.as_str()), ("string", "int32"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(classify(&set, "blob"), Err(CompileError::UnsupportedType { .. })));
        assert!(matches!(classify(&set, "wrapped_blob"), Err(CompileError::UnsupportedType { .. })));
    }
}

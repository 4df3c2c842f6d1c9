use protoenv_schema::{ProtoFile, ScalarKind, WrapperKind};

use crate::{
    classify::WrapperShape,
    ir::{EnumRef, FieldRef, LoaderUnit, MapMutator, Procedure, Stmt},
    naming::{go_field_name, go_type_name},
    traits::Renderer,
};

pub const GO_PACKAGE_OPTION: &str = "go_package";

const WRAPPERS_IMPORT: &str = "wrappers \"github.com/golang/protobuf/ptypes/wrappers\"";

/// Renders loaders as `loadFromEnv` methods on protoc-gen-go structs. The
/// `get<Kind>Env` helpers are expected in the same package.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoRenderer;

/// `getInt32Env`, `getUInt64Env`, `getStringEnv`, ... named after the
/// wrapper of the scalar's storage kind.
fn getter(kind: ScalarKind) -> String {
    let short = WrapperKind::ALL
        .into_iter()
        .find(|wrapper| wrapper.scalar() == kind.storage())
        .map(WrapperKind::short_name)
        .unwrap_or("String");
    format!("get{}Env", short)
}

fn zero_literal(kind: ScalarKind) -> &'static str {
    match kind.storage() {
        ScalarKind::String => "\"\"",
        ScalarKind::Bool => "false",
        _ => "0",
    }
}

fn env_key(field: &FieldRef) -> String {
    format!("prefix + \"{}\"", field.env)
}

fn render_scalar(lines: &mut Vec<String>, field: &FieldRef, kind: ScalarKind) {
    let name = go_field_name(&field.name);
    let zero = zero_literal(kind);
    lines.push(format!("\tif val, ok := {}({}); ok {{", getter(kind), env_key(field)));
    lines.push(format!("\t\tx.{} = val", name));
    lines.push(format!(
        "\t}} else if x.{} == {} && defaultValues != nil && defaultValues.{} != {} {{",
        name, zero, name, zero
    ));
    lines.push(format!("\t\tx.{} = defaultValues.{}", name, name));
    lines.push("\t}".to_string());
}

fn render_wrapper(lines: &mut Vec<String>, field: &FieldRef, shape: WrapperShape) {
    let name = go_field_name(&field.name);
    lines.push(format!("\tif val, ok := {}({}); ok {{", getter(shape.scalar()), env_key(field)));
    match shape {
        WrapperShape::WellKnown(kind) => {
            let wrapper = kind.message_name();
            lines.push(format!("\t\tx.{} = &wrappers.{}{{Value: val}}", name, wrapper));
            lines.push(format!("\t}} else if x.{} == nil {{", name));
            lines.push("\t\t// when there is no value to set we still prefer to initialize the variable to avoid".to_string());
            lines.push("\t\t// `nil` checks in the consumers.".to_string());
            lines.push(format!("\t\tx.{} = new(wrappers.{})", name, wrapper));
            lines.push(format!("\t\tif defaultValues != nil && defaultValues.{} != nil {{", name));
            lines.push(format!(
                "\t\t\tx.{} = &wrappers.{}{{Value: defaultValues.{}.Value}}",
                name, wrapper, name
            ));
            lines.push("\t\t}".to_string());
        }
        WrapperShape::Optional(kind) => {
            lines.push(format!("\t\tx.{} = &val", name));
            lines.push(format!("\t}} else if x.{} == nil {{", name));
            lines.push(format!("\t\tvar v {}", kind.go_type()));
            lines.push(format!("\t\tif defaultValues != nil && defaultValues.{} != nil {{", name));
            lines.push(format!("\t\t\tv = *defaultValues.{}", name));
            lines.push("\t\t}".to_string());
            lines.push(format!("\t\tx.{} = &v", name));
        }
    }
    lines.push("\t}".to_string());
}

fn unknown_symbol(lines: &mut Vec<String>, indent: &str, field: &FieldRef) {
    lines.push(format!("{}if !ok {{", indent));
    lines.push(format!(
        "{}\treturn fmt.Errorf(\"environment variable %s holds unknown enum symbol %q\", {}, val)",
        indent,
        env_key(field)
    ));
    lines.push(format!("{}}}", indent));
}

fn render_enum(lines: &mut Vec<String>, field: &FieldRef, def: &EnumRef) {
    let name = go_field_name(&field.name);
    let type_name = go_type_name(&def.name);
    lines.push(format!("\tif val, ok := getStringEnv({}); ok {{", env_key(field)));
    lines.push(format!("\t\tv, ok := {}_value[strings.TrimSpace(val)]", type_name));
    unknown_symbol(lines, "\t\t", field);
    lines.push(format!("\t\tx.{} = {}(v)", name, type_name));
    lines.push(format!(
        "\t}} else if x.{} == 0 && defaultValues != nil && defaultValues.{} != 0 {{",
        name, name
    ));
    lines.push(format!("\t\tx.{} = defaultValues.{}", name, name));
    lines.push("\t}".to_string());
}

fn render_enum_list(lines: &mut Vec<String>, field: &FieldRef, def: &EnumRef) {
    let name = go_field_name(&field.name);
    let type_name = go_type_name(&def.name);
    lines.push(format!("\tif vals, ok := getArrayStringEnv({}); ok {{", env_key(field)));
    lines.push(format!("\t\titems := make([]{}, 0, len(vals))", type_name));
    lines.push("\t\tfor _, val := range vals {".to_string());
    lines.push(format!("\t\t\tv, ok := {}_value[strings.TrimSpace(val)]", type_name));
    unknown_symbol(lines, "\t\t\t", field);
    lines.push(format!("\t\t\titems = append(items, {}(v))", type_name));
    lines.push("\t\t}".to_string());
    lines.push(format!("\t\tx.{} = items", name));
    lines.push(format!(
        "\t}} else if len(x.{}) == 0 && defaultValues != nil && len(defaultValues.{}) > 0 {{",
        name, name
    ));
    lines.push(format!("\t\tx.{} = append([]{}(nil), defaultValues.{}...)", name, type_name, name));
    lines.push("\t}".to_string());
}

fn render_nested(lines: &mut Vec<String>, field: &FieldRef, message: &str) {
    let name = go_field_name(&field.name);
    let type_name = go_type_name(message);
    lines.push(format!("\tif x.{} == nil {{", name));
    lines.push(format!("\t\tx.{} = new({})", name, type_name));
    lines.push("\t}".to_string());
    lines.push(format!("\tvar default{} *{}", name, type_name));
    lines.push("\tif defaultValues != nil {".to_string());
    lines.push(format!("\t\tdefault{} = defaultValues.{}", name, name));
    lines.push("\t}".to_string());
    lines.push(format!(
        "\tif err := x.{}.loadFromEnv(prefix+\"{}_\", default{}); err != nil {{",
        name, field.env, name
    ));
    lines.push("\t\treturn err".to_string());
    lines.push("\t}".to_string());
}

fn render_merge_map(lines: &mut Vec<String>, field: &FieldRef) {
    let name = go_field_name(&field.name);
    lines.push(format!("\tif defaultValues != nil && len(defaultValues.{}) > 0 {{", name));
    lines.push(format!("\t\tif x.{} == nil {{", name));
    lines.push(format!("\t\t\tx.{} = make(map[string]string, len(defaultValues.{}))", name, name));
    lines.push("\t\t}".to_string());
    lines.push(format!("\t\tfor k, v := range defaultValues.{} {{", name));
    lines.push(format!("\t\t\tif _, ok := x.{}[k]; !ok {{", name));
    lines.push(format!("\t\t\t\tx.{}[k] = v", name));
    lines.push("\t\t\t}".to_string());
    lines.push("\t\t}".to_string());
    lines.push("\t}".to_string());
}

fn render_mutator(lines: &mut Vec<String>, type_name: &str, mutator: &MapMutator) {
    let name = go_field_name(&mutator.field.name);
    lines.push(format!("// PutAll{} merges values into {}, overwriting existing keys.", name, name));
    lines.push(format!("func (x *{}) PutAll{}(values map[string]string) {{", type_name, name));
    lines.push(format!("\tif x.{} == nil {{", name));
    lines.push(format!("\t\tx.{} = make(map[string]string, len(values))", name));
    lines.push("\t}".to_string());
    lines.push("\tfor k, v := range values {".to_string());
    lines.push(format!("\t\tx.{}[k] = v", name));
    lines.push("\t}".to_string());
    lines.push("}".to_string());
}

fn render_procedure(procedure: &Procedure) -> String {
    let type_name = go_type_name(&procedure.message);
    let mut lines = Vec::new();

    lines.push("// loadFromEnv loads the data from env vars, defaults and makes sure all values are initialized.".to_string());
    lines.push(format!(
        "func (x *{}) loadFromEnv(prefix string, defaultValues *{}) error {{",
        type_name, type_name
    ));
    for (i, stmt) in procedure.statements.iter().enumerate() {
        if i > 0 {
            lines.push("".to_string());
        }
        match stmt {
            Stmt::Scalar { field, kind } => render_scalar(&mut lines, field, *kind),
            Stmt::Wrapper { field, shape } => render_wrapper(&mut lines, field, *shape),
            Stmt::Enum { field, def } => render_enum(&mut lines, field, def),
            Stmt::EnumList { field, def } => render_enum_list(&mut lines, field, def),
            Stmt::Nested { field, message } => render_nested(&mut lines, field, message),
            Stmt::MergeMap { field } => render_merge_map(&mut lines, field),
        }
    }
    lines.push("\treturn nil".to_string());
    lines.push("}".to_string());

    for mutator in &procedure.map_mutators {
        lines.push("".to_string());
        render_mutator(&mut lines, &type_name, mutator);
    }

    lines.join("\n")
}

/// Packages the rendered code refers to, sorted as gofmt keeps them.
fn imports(unit: &LoaderUnit) -> Vec<&'static str> {
    let stmts = || unit.procedures.iter().flat_map(|p| p.statements.iter());
    let mut imports = Vec::new();
    if stmts().any(|s| matches!(s, Stmt::Enum { .. } | Stmt::EnumList { .. })) {
        imports.push("\"fmt\"");
        imports.push("\"strings\"");
    }
    if stmts().any(|s| matches!(s, Stmt::Wrapper { shape: WrapperShape::WellKnown(_), .. })) {
        imports.push(WRAPPERS_IMPORT);
    }
    imports
}

impl Renderer for GoRenderer {
    fn file_suffix(&self) -> &'static str {
        ".pbloader.go"
    }

    fn package_option(&self) -> &'static str {
        GO_PACKAGE_OPTION
    }

    /// `go_package = "github.com/acme/config;cfg"` yields `cfg`, and
    /// `go_package = "github.com/acme/config"` yields `config`.
    fn module_name(&self, file: &ProtoFile) -> String {
        if let Some(path) = file.option(self.package_option()) {
            let name = match path.split_once(';') {
                Some((_, alias)) => alias,
                None => path.rsplit('/').next().unwrap_or(path),
            };
            return name.replace(['-', '.'], "_");
        }
        if let Some(package) = &file.package {
            return package.rsplit('.').next().unwrap_or(package).to_string();
        }
        let stem = file.name.rsplit('/').next().unwrap_or(&file.name);
        stem.strip_suffix(".proto").unwrap_or(stem).replace(['-', '.'], "_")
    }

    fn render(&self, unit: &LoaderUnit, module: &str) -> String {
        let mut go_code: Vec<String> = Vec::new();

        go_code.push("// Code generated by protoenv. DO NOT EDIT.".to_string());
        go_code.push(format!("// source: {}", unit.source));
        go_code.push("".to_string());
        go_code.push(format!("package {}", module));

        let imports = imports(unit);
        if !imports.is_empty() {
            go_code.push("".to_string());
            go_code.push("import (".to_string());
            for import in imports {
                go_code.push(format!("\t{}", import));
            }
            go_code.push(")".to_string());
        }

        for procedure in &unit.procedures {
            go_code.push("".to_string());
            go_code.push(render_procedure(procedure));
        }

        go_code.join("\n") + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_schema;

    #[test]
    fn module_names() {
        let renderer = GoRenderer;
        let file = compile_schema("a.proto", "option go_package = \"github.com/acme/agent-config/gen/go/v1\";").unwrap();
        assert_eq!(renderer.module_name(&file), "v1");
        let file = compile_schema("a.proto", "option go_package = \"github.com/acme/config;cfg\";").unwrap();
        assert_eq!(renderer.module_name(&file), "cfg");
        let file = compile_schema("a.proto", "package org.hypertrace.agent.config;").unwrap();
        assert_eq!(renderer.module_name(&file), "config");
        let file = compile_schema("dir/agent.proto", "").unwrap();
        assert_eq!(renderer.module_name(&file), "agent");
    }

    #[test]
    fn getters_follow_wrapper_names() {
        assert_eq!(getter(ScalarKind::UInt64), "getUInt64Env");
        assert_eq!(getter(ScalarKind::SInt32), "getInt32Env");
        assert_eq!(getter(ScalarKind::String), "getStringEnv");
    }
}

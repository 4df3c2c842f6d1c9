use protoenv_schema::{zero_value, ProtoFile, ScalarKind, Value};

use crate::{
    classify::WrapperShape,
    ir::{EnumRef, FieldRef, LoaderUnit, MapMutator, Procedure, Stmt},
    naming::{rust_field_name, rust_type_name, to_snake_case},
    traits::Renderer,
};

pub const RUST_PACKAGE_OPTION: &str = "rust_package";

/// Renders loaders as `impl LoadFromEnv` blocks for prost generated structs:
/// wrappers and nested messages are `Option<T>`, enums are `i32`, repeated
/// enums `Vec<i32>` and string maps `HashMap<String, String>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustRenderer;

/// Replaces anything that cannot appear in a Rust identifier.
fn module_ident(name: &str) -> String {
    let ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    match ident.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{}", ident),
        _ => ident,
    }
}

fn getter(kind: ScalarKind) -> String {
    let name = match kind.storage() {
        ScalarKind::String => "string",
        other => other.rust_type(),
    };
    format!("env::get_{}_env", name)
}

fn zero_literal(kind: ScalarKind) -> String {
    match zero_value(kind) {
        Value::Bool(_) => "false".to_string(),
        Value::Float(_) | Value::Double(_) => "0.0".to_string(),
        Value::String(_) => "\"\"".to_string(),
        _ => "0".to_string(),
    }
}

/// Expression that is true when `expr` holds the zero value of `kind`.
fn is_zero(kind: ScalarKind, expr: &str) -> String {
    match kind.storage() {
        ScalarKind::String => format!("{}.is_empty()", expr),
        ScalarKind::Bool => format!("!{}", expr),
        _ => format!("{} == {}", expr, zero_literal(kind)),
    }
}

fn is_nonzero(kind: ScalarKind, expr: &str) -> String {
    match kind.storage() {
        ScalarKind::String => format!("!{}.is_empty()", expr),
        ScalarKind::Bool => expr.to_string(),
        _ => format!("{} != {}", expr, zero_literal(kind)),
    }
}

fn copy_of(kind: ScalarKind, expr: &str) -> String {
    if kind.is_heap() {
        format!("{}.clone()", expr)
    } else {
        expr.to_string()
    }
}

fn env_key(field: &FieldRef) -> String {
    format!("        let key = format!(\"{{prefix}}{}\");", field.env)
}

/// `else if <field is zero> { copy a non-zero default }` tail shared by
/// scalars and enums.
fn default_fallback(lines: &mut Vec<String>, name: &str, field_zero: String, default_nonzero: String, copy: String) {
    lines.push(format!("        }} else if {} {{", field_zero));
    lines.push("            if let Some(d) = defaults {".to_string());
    lines.push(format!("                if {} {{", default_nonzero));
    lines.push(format!("                    self.{} = {};", name, copy));
    lines.push("                }".to_string());
    lines.push("            }".to_string());
    lines.push("        }".to_string());
}

fn render_scalar(lines: &mut Vec<String>, field: &FieldRef, kind: ScalarKind) {
    let name = rust_field_name(&field.name);
    lines.push(env_key(field));
    lines.push(format!("        if let Some(val) = {}(&key) {{", getter(kind)));
    lines.push(format!("            self.{} = val;", name));
    default_fallback(
        lines,
        &name,
        is_zero(kind, &format!("self.{}", name)),
        is_nonzero(kind, &format!("d.{}", name)),
        copy_of(kind, &format!("d.{}", name)),
    );
}

fn render_wrapper(lines: &mut Vec<String>, field: &FieldRef, shape: WrapperShape) {
    let name = rust_field_name(&field.name);
    let kind = shape.scalar();
    lines.push(env_key(field));
    lines.push(format!("        if let Some(val) = {}(&key) {{", getter(kind)));
    lines.push(format!("            self.{} = Some(val);", name));
    lines.push(format!("        }} else if self.{}.is_none() {{", name));
    lines.push(format!(
        "            self.{} = Some(defaults.and_then(|d| {}).unwrap_or_default());",
        name,
        copy_of(kind, &format!("d.{}", name))
    ));
    lines.push("        }".to_string());
}

fn render_enum(lines: &mut Vec<String>, field: &FieldRef, def: &EnumRef) {
    let name = rust_field_name(&field.name);
    lines.push(env_key(field));
    lines.push("        if let Some(val) = env::get_string_env(&key) {".to_string());
    lines.push(format!(
        "            self.{} = env::resolve_enum(&key, &val, {}::from_str_name)? as i32;",
        name,
        rust_type_name(&def.name)
    ));
    default_fallback(
        lines,
        &name,
        format!("self.{} == 0", name),
        format!("d.{} != 0", name),
        format!("d.{}", name),
    );
}

fn render_enum_list(lines: &mut Vec<String>, field: &FieldRef, def: &EnumRef) {
    let name = rust_field_name(&field.name);
    lines.push(env_key(field));
    lines.push("        if let Some(vals) = env::get_array_string_env(&key) {".to_string());
    lines.push(format!("            self.{} = vals", name));
    lines.push("                .iter()".to_string());
    lines.push(format!(
        "                .map(|val| env::resolve_enum(&key, val, {}::from_str_name).map(|v| v as i32))",
        rust_type_name(&def.name)
    ));
    lines.push("                .collect::<Result<Vec<_>, LoadError>>()?;".to_string());
    default_fallback(
        lines,
        &name,
        format!("self.{}.is_empty()", name),
        format!("!d.{}.is_empty()", name),
        format!("d.{}.clone()", name),
    );
}

fn render_nested(lines: &mut Vec<String>, field: &FieldRef) {
    let name = rust_field_name(&field.name);
    lines.push(format!("        self.{}", name));
    lines.push("            .get_or_insert_with(Default::default)".to_string());
    lines.push(format!(
        "            .load_from_env(&format!(\"{{prefix}}{}_\"), defaults.and_then(|d| d.{}.as_ref()))?;",
        field.env, name
    ));
}

fn render_merge_map(lines: &mut Vec<String>, field: &FieldRef) {
    let name = rust_field_name(&field.name);
    lines.push("        if let Some(d) = defaults {".to_string());
    lines.push(format!("            for (k, v) in &d.{} {{", name));
    lines.push(format!("                self.{}.entry(k.clone()).or_insert_with(|| v.clone());", name));
    lines.push("            }".to_string());
    lines.push("        }".to_string());
}

fn render_procedure(procedure: &Procedure) -> String {
    let type_name = rust_type_name(&procedure.message);
    let mut lines = Vec::new();

    lines.push(format!("impl LoadFromEnv for {} {{", type_name));
    lines.push(
        "    /// Loads the data from env vars and defaults, making sure all values are initialized."
            .to_string(),
    );
    lines.push(format!(
        "    fn load_from_env(&mut self, prefix: &str, defaults: Option<&{}>) -> Result<(), LoadError> {{",
        type_name
    ));
    if procedure.statements.is_empty() {
        lines.push("        let _ = (prefix, defaults);".to_string());
    }
    for (i, stmt) in procedure.statements.iter().enumerate() {
        if i > 0 {
            lines.push("".to_string());
        }
        match stmt {
            Stmt::Scalar { field, kind } => render_scalar(&mut lines, field, *kind),
            Stmt::Wrapper { field, shape } => render_wrapper(&mut lines, field, *shape),
            Stmt::Enum { field, def } => render_enum(&mut lines, field, def),
            Stmt::EnumList { field, def } => render_enum_list(&mut lines, field, def),
            Stmt::Nested { field, .. } => render_nested(&mut lines, field),
            Stmt::MergeMap { field } => render_merge_map(&mut lines, field),
        }
    }
    lines.push("        Ok(())".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());

    if !procedure.map_mutators.is_empty() {
        lines.push("".to_string());
        lines.push(format!("impl {} {{", type_name));
        for (i, mutator) in procedure.map_mutators.iter().enumerate() {
            if i > 0 {
                lines.push("".to_string());
            }
            render_mutator(&mut lines, mutator);
        }
        lines.push("}".to_string());
    }

    lines.join("\n")
}

fn render_mutator(lines: &mut Vec<String>, mutator: &MapMutator) {
    let name = rust_field_name(&mutator.field.name);
    lines.push(format!(
        "    /// Merges `values` into `{}`, overwriting existing keys.",
        name
    ));
    lines.push(format!(
        "    pub fn put_all_{}(&mut self, values: ::std::collections::HashMap<String, String>) {{",
        to_snake_case(&mutator.field.name)
    ));
    lines.push(format!("        self.{}.extend(values);", name));
    lines.push("    }".to_string());
}

/// Indents every non-empty line by one level.
fn indent(text: &str) -> String {
    text.lines()
        .map(|line| if line.is_empty() { String::new() } else { format!("    {}", line) })
        .collect::<Vec<_>>()
        .join("\n")
}

impl Renderer for RustRenderer {
    fn file_suffix(&self) -> &'static str {
        ".pbloader.rs"
    }

    fn package_option(&self) -> &'static str {
        RUST_PACKAGE_OPTION
    }

    fn module_name(&self, file: &ProtoFile) -> String {
        if let Some(name) = file.option(self.package_option()) {
            return module_ident(name);
        }
        if let Some(package) = &file.package {
            return module_ident(&package.replace('.', "_"));
        }
        let stem = file.name.rsplit('/').next().unwrap_or(&file.name);
        module_ident(stem.strip_suffix(".proto").unwrap_or(stem))
    }

    fn render(&self, unit: &LoaderUnit, module: &str) -> String {
        let mut rust_code: Vec<String> = Vec::new();

        rust_code.push("// Code generated by protoenv. DO NOT EDIT.".to_string());
        rust_code.push(format!("// source: {}", unit.source));
        rust_code.push("".to_string());
        rust_code.push(format!("pub mod {} {{", module));
        rust_code.push("    use super::*;".to_string());
        rust_code.push("    #[allow(unused_imports)]".to_string());
        rust_code.push("    use protoenv::{env, LoadError, LoadFromEnv};".to_string());

        for procedure in &unit.procedures {
            rust_code.push("".to_string());
            rust_code.push(indent(&render_procedure(procedure)));
        }

        rust_code.push("}".to_string());
        rust_code.join("\n") + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_schema;

    #[test]
    fn module_names() {
        let renderer = RustRenderer;
        let file = compile_schema("agent/config.proto", "option rust_package = \"agent_config\"; package a.b;").unwrap();
        assert_eq!(renderer.module_name(&file), "agent_config");
        let file = compile_schema("config.proto", "package org.hypertrace.agent.config;").unwrap();
        assert_eq!(renderer.module_name(&file), "org_hypertrace_agent_config");
        let file = compile_schema("dir/my-config.proto", "message A { string s = 1; }").unwrap();
        assert_eq!(renderer.module_name(&file), "my_config");
    }

    #[test]
    fn zero_checks() {
        assert_eq!(is_zero(ScalarKind::String, "self.name"), "self.name.is_empty()");
        assert_eq!(is_zero(ScalarKind::Bool, "self.on"), "!self.on");
        assert_eq!(is_zero(ScalarKind::Double, "self.ratio"), "self.ratio == 0.0");
        assert_eq!(is_nonzero(ScalarKind::SFixed64, "d.n"), "d.n != 0");
        assert_eq!(getter(ScalarKind::Fixed32), "env::get_u32_env");
        assert_eq!(getter(ScalarKind::String), "env::get_string_env");
    }
}

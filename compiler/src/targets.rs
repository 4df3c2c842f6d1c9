//! Resolves which runtimes each field and message applies to.
//!
//! One schema can describe configuration for several agent runtimes. A field
//! or message can name its runtimes explicitly with the `(targets)` option
//! (`[(targets) = "go,java"]`). Without the option, a name ending in `agent`
//! whose prefix is a known runtime (`javaagent`, `go_agent`, `PythonAgent`)
//! applies to that runtime only. Everything else applies to all runtimes.

use std::collections::BTreeSet;

use protoenv_schema::{find_option, ProtoFile, ProtoOption, TargetId, Targets};

pub const TARGETS_OPTION: &str = "(targets)";

const PLATFORM_SUFFIX: &str = "agent";

/// Runtimes recognised as the prefix of a `<runtime>agent` name.
pub const KNOWN_TARGETS: [&str; 10] = [
    "go", "java", "python", "nodejs", "node", "php", "dotnet", "ruby", "rust", "cpp",
];

fn explicit_targets(options: &[ProtoOption]) -> Option<Targets> {
    let value = find_option(options, TARGETS_OPTION)?;
    let ids: BTreeSet<TargetId> = value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(TargetId::new)
        .collect();
    Some(Targets::Only(ids))
}

/// `javaagent`, `java_agent` and `JavaAgent` all yield `java`.
pub fn target_from_name(name: &str) -> Option<TargetId> {
    let normalized: String = name
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect();
    let prefix = normalized.strip_suffix(PLATFORM_SUFFIX)?;
    KNOWN_TARGETS
        .contains(&prefix)
        .then(|| TargetId::new(prefix))
}

fn convention_targets(names: &[&str]) -> Targets {
    names
        .iter()
        .find_map(|name| target_from_name(name))
        .map(|id| Targets::Only(BTreeSet::from([id])))
        .unwrap_or(Targets::All)
}

/// Last segment of a (possibly qualified) type name; `None` for maps.
fn type_base_name(type_name: &str) -> Option<&str> {
    if type_name.starts_with("map<") {
        return None;
    }
    type_name.rsplit('.').next()
}

/// Fills `targets` on every message and field of `file`.
pub fn resolve_targets(file: &mut ProtoFile) {
    for message in &mut file.messages {
        message.targets = explicit_targets(&message.options)
            .unwrap_or_else(|| convention_targets(&[&message.name]));

        for field in &mut message.fields {
            field.targets = explicit_targets(&field.options).unwrap_or_else(|| {
                let mut names = vec![field.name.as_str()];
                names.extend(type_base_name(&field.type_name));
                convention_targets(&names)
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parser::parse_schema, tokenizer::tokenize_schema};

    #[test]
    fn names_map_to_runtimes() {
        assert_eq!(target_from_name("javaagent"), Some(TargetId::new("java")));
        assert_eq!(target_from_name("go_agent"), Some(TargetId::new("go")));
        assert_eq!(target_from_name("NodeJSAgent"), Some(TargetId::new("nodejs")));
        assert_eq!(target_from_name("agent"), None);
        assert_eq!(target_from_name("user_agent"), None);
        assert_eq!(target_from_name("javaagent_enabled"), None);
    }

    #[test]
    fn resolves_fields_and_messages() {
        let text = r#"
            message AgentConfig {
              JavaAgent javaagent = 1;
              GoAgent runtime = 2;
              string user_agent = 3;
              bool tuned = 4 [(targets) = "go, Python"];
            }
            message JavaAgent { string filter_jar_paths = 1; }
            message GoAgent { option (targets) = "go,rust"; bool x = 1; }
        "#;
        let mut file = parse_schema("a.proto", &tokenize_schema(text).unwrap()).unwrap();
        resolve_targets(&mut file);

        let config = &file.messages[0];
        assert_eq!(config.targets, Targets::All);
        assert_eq!(config.fields[0].targets, Targets::only(&["java"]));
        assert_eq!(config.fields[1].targets, Targets::only(&["go"]));
        assert_eq!(config.fields[2].targets, Targets::All);
        assert_eq!(config.fields[3].targets, Targets::only(&["go", "python"]));

        assert_eq!(file.messages[1].targets, Targets::only(&["java"]));
        assert_eq!(file.messages[2].targets, Targets::only(&["go", "rust"]));
        assert!(file.messages[2].targets.includes(&TargetId::new("rust")));
    }
}

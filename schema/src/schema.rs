use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// A parsed `.proto` file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtoFile {
    /// Module path the file was loaded from, e.g. `config.proto`.
    pub name:     String,
    pub syntax:   Option<String>,
    pub package:  Option<String>,
    pub imports:  Vec<Import>,
    pub options:  Vec<ProtoOption>,
    pub messages: Vec<Message>,
    pub enums:    Vec<EnumDef>,
}

impl ProtoFile {
    pub fn new(name: &str) -> ProtoFile {
        ProtoFile {
            name:     name.to_owned(),
            syntax:   None,
            package:  None,
            imports:  Vec::new(),
            options:  Vec::new(),
            messages: Vec::new(),
            enums:    Vec::new(),
        }
    }

    /// Value of the file-level option `name`, if declared.
    pub fn option(&self, name: &str) -> Option<&str> {
        find_option(&self.options, name)
    }

    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name == name)
    }

    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enums.iter().find(|e| e.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ImportKind {
    Default,
    Public,
    Weak,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Import {
    pub path: String,
    pub kind: ImportKind,
}

/// `option name = value;` with the value kept as source text (string
/// literals unquoted).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtoOption {
    pub name:  String,
    pub value: String,
}

pub fn find_option<'a>(options: &'a [ProtoOption], name: &str) -> Option<&'a str> {
    options
        .iter()
        .find(|o| o.name == name)
        .map(|o| o.value.as_str())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub name:    String,
    pub line:    usize,
    pub column:  usize,
    pub fields:  Vec<Field>,
    pub options: Vec<ProtoOption>,
    pub targets: Targets,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Label {
    None,
    /// proto3 `optional`: explicit presence, generated as `Option<T>`.
    Optional,
    Repeated,
    /// Member of the named `oneof` group.
    Oneof(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name:      String,
    pub line:      usize,
    pub column:    usize,
    /// Declared type text: `string`, `google.protobuf.Int32Value`, `Color`,
    /// `map<string,string>` and so on.
    pub type_name: String,
    pub number:    i32,
    pub label:     Label,
    pub options:   Vec<ProtoOption>,
    pub targets:   Targets,
}

impl Field {
    pub fn option(&self, name: &str) -> Option<&str> {
        find_option(&self.options, name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValue {
    pub name:   String,
    pub number: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDef {
    pub name:   String,
    pub line:   usize,
    pub column: usize,
    pub values: Vec<EnumValue>,
}

impl EnumDef {
    /// Resolves a symbol to its number.
    pub fn number_of(&self, symbol: &str) -> Option<i32> {
        self.values
            .iter()
            .find(|v| v.name == symbol)
            .map(|v| v.number)
    }
}

/// Identifies a runtime a loader is generated for (`go`, `java`, `rust`, ...).
/// Always lowercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: &str) -> TargetId {
        TargetId(id.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The runtimes a field or message applies to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Targets {
    All,
    Only(BTreeSet<TargetId>),
}

impl Targets {
    pub fn only(ids: &[&str]) -> Targets {
        Targets::Only(ids.iter().map(|id| TargetId::new(id)).collect())
    }

    pub fn includes(&self, target: &TargetId) -> bool {
        match self {
            Targets::All => true,
            Targets::Only(ids) => ids.contains(target),
        }
    }
}

impl Default for Targets {
    fn default() -> Targets {
        Targets::All
    }
}

use crate::{
    tokenizer::Token,
    utils::{error, quote},
    error::CompileError,
};
use lazy_static::lazy_static;
use protoenv_schema::{
    EnumDef, EnumValue, Field, Import, ImportKind, Label, Message, ProtoFile, ProtoOption, Targets,
};
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER:     Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref TYPE_NAME:      Regex = Regex::new(r"^\.?[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap();
    static ref DOT_SUFFIX:     Regex = Regex::new(r"^\.[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap();
    static ref INTEGER:        Regex = Regex::new(r"^-?(0[xX][0-9A-Fa-f]+|\d+)$").unwrap();
    static ref CONSTANT:       Regex = Regex::new(r#"^(-?[0-9.].*|".*"|'.*'|-?[A-Za-z_][A-Za-z0-9_.]*)$"#).unwrap();
    static ref STRING_LITERAL: Regex = Regex::new(r#"^("(?s).*"|'(?s).*')$"#).unwrap();
    static ref EOF:            Regex = Regex::new(r"^$").unwrap();
}

fn current_token(tokens: &[Token], index: usize) -> &Token {
    // The tokenizer always terminates the stream with an EOF token.
    &tokens[index.min(tokens.len() - 1)]
}

fn peek_is(tokens: &[Token], index: usize, text: &str) -> bool {
    current_token(tokens, index).text == text
}

fn eat(tokens: &[Token], index: &mut usize, test: &Regex) -> bool {
    if *index < tokens.len() && test.is_match(&current_token(tokens, *index).text) {
        *index += 1;
        true
    } else {
        false
    }
}

fn eat_text(tokens: &[Token], index: &mut usize, text: &str) -> bool {
    if *index < tokens.len() && peek_is(tokens, *index, text) {
        *index += 1;
        true
    } else {
        false
    }
}

fn unexpected_token(tokens: &[Token], index: usize) -> CompileError {
    let tok = current_token(tokens, index);
    if tok.text.is_empty() {
        return error("Unexpected end of file", tok.line, tok.column);
    }
    error(
        &format!("Unexpected token {}", quote(&tok.text)),
        tok.line,
        tok.column,
    )
}

fn expected(tokens: &[Token], index: usize, what: &str) -> CompileError {
    let tok = current_token(tokens, index);
    error(
        &format!("Expected {} but found {}", what, quote(&tok.text)),
        tok.line,
        tok.column,
    )
}

/// Consumes a token matching `test` and returns its text.
fn expect<'a>(
    tokens: &'a [Token],
    index: &mut usize,
    test: &Regex,
    what: &str,
) -> Result<&'a Token, CompileError> {
    let tok = current_token(tokens, *index);
    if !eat(tokens, index, test) {
        return Err(expected(tokens, *index, what));
    }
    Ok(tok)
}

fn expect_text(tokens: &[Token], index: &mut usize, text: &str) -> Result<(), CompileError> {
    if !eat_text(tokens, index, text) {
        return Err(expected(tokens, *index, &quote(text)));
    }
    Ok(())
}

/// Removes the quotes of a string literal and resolves simple escapes.
fn unquote(literal: &str) -> String {
    let inner = &literal[1..literal.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn parse_integer(tok: &Token) -> Result<i32, CompileError> {
    let (negative, digits) = match tok.text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, tok.text.as_str()),
    };
    let parsed = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse::<i64>(),
    };
    parsed
        .ok()
        .map(|v| if negative { -v } else { v })
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| {
            error(
                &format!("Invalid integer {}", quote(&tok.text)),
                tok.line,
                tok.column,
            )
        })
}

/// Skips a balanced `{ ... }` block, the opening brace included.
fn skip_block(tokens: &[Token], index: &mut usize) -> Result<(), CompileError> {
    expect_text(tokens, index, "{")?;
    let mut depth = 1;
    while depth > 0 {
        if eat(tokens, index, &EOF) || *index >= tokens.len() {
            return Err(unexpected_token(tokens, tokens.len() - 1));
        }
        match current_token(tokens, *index).text.as_str() {
            "{" => depth += 1,
            "}" => depth -= 1,
            _ => {}
        }
        *index += 1;
    }
    Ok(())
}

/// Skips everything up to and including the next `;`.
fn skip_statement(tokens: &[Token], index: &mut usize) -> Result<(), CompileError> {
    while !eat_text(tokens, index, ";") {
        if peek_is(tokens, *index, "") {
            return Err(unexpected_token(tokens, *index));
        }
        *index += 1;
    }
    Ok(())
}

/// Option name: `name`, `(custom.name)` or `(custom.name).sub`.
fn parse_option_name(tokens: &[Token], index: &mut usize) -> Result<String, CompileError> {
    if eat_text(tokens, index, "(") {
        let inner = expect(tokens, index, &TYPE_NAME, "option name")?;
        expect_text(tokens, index, ")")?;
        let mut name = format!("({})", inner.text);
        let suffix = current_token(tokens, *index);
        if eat(tokens, index, &DOT_SUFFIX) {
            name.push_str(&suffix.text);
        }
        return Ok(name);
    }
    Ok(expect(tokens, index, &TYPE_NAME, "option name")?.text.clone())
}

/// `name = constant`, without the trailing separator.
fn parse_option_body(tokens: &[Token], index: &mut usize) -> Result<ProtoOption, CompileError> {
    let name = parse_option_name(tokens, index)?;
    expect_text(tokens, index, "=")?;
    if peek_is(tokens, *index, "{") {
        // Aggregate values are accepted but not interpreted.
        skip_block(tokens, index)?;
        return Ok(ProtoOption { name, value: String::new() });
    }
    let tok = expect(tokens, index, &CONSTANT, "constant")?;
    let value = if STRING_LITERAL.is_match(&tok.text) {
        unquote(&tok.text)
    } else {
        tok.text.clone()
    };
    Ok(ProtoOption { name, value })
}

/// `[a = 1, (b) = "x"]`, if present.
fn parse_field_options(tokens: &[Token], index: &mut usize) -> Result<Vec<ProtoOption>, CompileError> {
    let mut options = Vec::new();
    if !eat_text(tokens, index, "[") {
        return Ok(options);
    }
    loop {
        options.push(parse_option_body(tokens, index)?);
        if eat_text(tokens, index, "]") {
            break;
        }
        expect_text(tokens, index, ",")?;
    }
    Ok(options)
}

/// `map<K, V>` or a possibly qualified type name.
fn parse_field_type(tokens: &[Token], index: &mut usize) -> Result<String, CompileError> {
    if peek_is(tokens, *index, "map") && peek_is(tokens, *index + 1, "<") {
        *index += 2;
        let key = expect(tokens, index, &TYPE_NAME, "map key type")?;
        expect_text(tokens, index, ",")?;
        let value = expect(tokens, index, &TYPE_NAME, "map value type")?;
        expect_text(tokens, index, ">")?;
        return Ok(format!("map<{},{}>", key.text, value.text));
    }
    Ok(expect(tokens, index, &TYPE_NAME, "type")?.text.clone())
}

fn parse_field(tokens: &[Token], index: &mut usize, mut label: Label) -> Result<Field, CompileError> {
    if label == Label::None {
        if eat_text(tokens, index, "repeated") {
            label = Label::Repeated;
        } else if eat_text(tokens, index, "optional") {
            label = Label::Optional;
        } else {
            // proto2 `required` carries no meaning for loaders.
            eat_text(tokens, index, "required");
        }
    }

    let type_name = parse_field_type(tokens, index)?;
    let name_tok = expect(tokens, index, &IDENTIFIER, "field name")?;
    expect_text(tokens, index, "=")?;
    let number_tok = expect(tokens, index, &INTEGER, "field number")?;
    let number = parse_integer(number_tok)?;
    let options = parse_field_options(tokens, index)?;
    expect_text(tokens, index, ";")?;

    Ok(Field {
        name: name_tok.text.clone(),
        line: name_tok.line,
        column: name_tok.column,
        type_name,
        number,
        label,
        options,
        targets: Targets::All,
    })
}

fn parse_oneof(tokens: &[Token], index: &mut usize, fields: &mut Vec<Field>) -> Result<(), CompileError> {
    let group = expect(tokens, index, &IDENTIFIER, "oneof name")?.text.clone();
    expect_text(tokens, index, "{")?;
    while !eat_text(tokens, index, "}") {
        if eat_text(tokens, index, "option") {
            parse_option_body(tokens, index)?;
            expect_text(tokens, index, ";")?;
        } else if eat_text(tokens, index, ";") {
            continue;
        } else {
            fields.push(parse_field(tokens, index, Label::Oneof(group.clone()))?);
        }
    }
    Ok(())
}

fn parse_message(tokens: &[Token], index: &mut usize) -> Result<Message, CompileError> {
    let name_tok = expect(tokens, index, &IDENTIFIER, "message name")?;
    expect_text(tokens, index, "{")?;

    let mut fields  = Vec::new();
    let mut options = Vec::new();
    while !eat_text(tokens, index, "}") {
        let tok = current_token(tokens, *index);
        match tok.text.as_str() {
            "" => return Err(unexpected_token(tokens, *index)),
            ";" => *index += 1,
            "option" => {
                *index += 1;
                options.push(parse_option_body(tokens, index)?);
                expect_text(tokens, index, ";")?;
            }
            "reserved" | "extensions" => skip_statement(tokens, index)?,
            "extend" => {
                *index += 1;
                expect(tokens, index, &TYPE_NAME, "type")?;
                skip_block(tokens, index)?;
            }
            "oneof" => {
                *index += 1;
                parse_oneof(tokens, index, &mut fields)?;
            }
            "message" | "enum" | "group" if IDENTIFIER.is_match(&current_token(tokens, *index + 1).text) => {
                return Err(error(
                    &format!("Nested {} definitions are not supported", tok.text),
                    tok.line,
                    tok.column,
                ));
            }
            _ => fields.push(parse_field(tokens, index, Label::None)?),
        }
    }

    Ok(Message {
        name: name_tok.text.clone(),
        line: name_tok.line,
        column: name_tok.column,
        fields,
        options,
        targets: Targets::All,
    })
}

fn parse_enum(tokens: &[Token], index: &mut usize) -> Result<EnumDef, CompileError> {
    let name_tok = expect(tokens, index, &IDENTIFIER, "enum name")?;
    expect_text(tokens, index, "{")?;

    let mut values = Vec::new();
    while !eat_text(tokens, index, "}") {
        if eat_text(tokens, index, ";") {
            continue;
        }
        if eat_text(tokens, index, "option") {
            parse_option_body(tokens, index)?;
            expect_text(tokens, index, ";")?;
            continue;
        }
        if peek_is(tokens, *index, "reserved") {
            skip_statement(tokens, index)?;
            continue;
        }
        let value_tok = expect(tokens, index, &IDENTIFIER, "enum value")?;
        expect_text(tokens, index, "=")?;
        let number = parse_integer(expect(tokens, index, &INTEGER, "integer")?)?;
        parse_field_options(tokens, index)?;
        expect_text(tokens, index, ";")?;
        values.push(EnumValue {
            name: value_tok.text.clone(),
            number,
        });
    }

    Ok(EnumDef {
        name: name_tok.text.clone(),
        line: name_tok.line,
        column: name_tok.column,
        values,
    })
}

/// Parses the tokens of one `.proto` file. `name` is the module path the
/// file was loaded as.
pub fn parse_schema(name: &str, tokens: &[Token]) -> Result<ProtoFile, CompileError> {
    let mut file  = ProtoFile::new(name);
    let mut index = 0;

    while !eat(tokens, &mut index, &EOF) {
        let tok = current_token(tokens, index);
        match tok.text.as_str() {
            ";" => index += 1,
            "syntax" | "edition" => {
                index += 1;
                expect_text(tokens, &mut index, "=")?;
                let value = expect(tokens, &mut index, &STRING_LITERAL, "string")?;
                file.syntax = Some(unquote(&value.text));
                expect_text(tokens, &mut index, ";")?;
            }
            "package" => {
                index += 1;
                if file.package.is_some() {
                    return Err(error("Multiple package definitions", tok.line, tok.column));
                }
                let package = expect(tokens, &mut index, &TYPE_NAME, "package name")?;
                file.package = Some(package.text.trim_start_matches('.').to_string());
                expect_text(tokens, &mut index, ";")?;
            }
            "import" => {
                index += 1;
                let kind = if eat_text(tokens, &mut index, "public") {
                    ImportKind::Public
                } else if eat_text(tokens, &mut index, "weak") {
                    ImportKind::Weak
                } else {
                    ImportKind::Default
                };
                let path = expect(tokens, &mut index, &STRING_LITERAL, "import path")?;
                file.imports.push(Import {
                    path: unquote(&path.text),
                    kind,
                });
                expect_text(tokens, &mut index, ";")?;
            }
            "option" => {
                index += 1;
                file.options.push(parse_option_body(tokens, &mut index)?);
                expect_text(tokens, &mut index, ";")?;
            }
            "message" => {
                index += 1;
                file.messages.push(parse_message(tokens, &mut index)?);
            }
            "enum" => {
                index += 1;
                file.enums.push(parse_enum(tokens, &mut index)?);
            }
            "service" | "extend" => {
                index += 1;
                expect(tokens, &mut index, &TYPE_NAME, "identifier")?;
                skip_block(tokens, &mut index)?;
            }
            _ => return Err(unexpected_token(tokens, index)),
        }
    }

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize_schema;

    fn parse(input: &str) -> Result<ProtoFile, CompileError> {
        parse_schema("test.proto", &tokenize_schema(input)?)
    }

    #[test]
    fn test_parse_file_header() {
        let file = parse(
            r#"
            syntax = "proto3";
            package hypertrace.agent.config.v1;
            import "google/protobuf/wrappers.proto";
            import public "other.proto";
            option go_package = "github.com/hypertrace/agent-config/gen/go/v1";
            "#,
        )
        .unwrap();

        assert_eq!(file.syntax.as_deref(), Some("proto3"));
        assert_eq!(file.package.as_deref(), Some("hypertrace.agent.config.v1"));
        assert_eq!(file.imports.len(), 2);
        assert_eq!(file.imports[0].path, "google/protobuf/wrappers.proto");
        assert_eq!(file.imports[1].kind, ImportKind::Public);
        assert_eq!(
            file.option("go_package"),
            Some("github.com/hypertrace/agent-config/gen/go/v1")
        );
    }

    #[test]
    fn test_parse_message_fields() {
        let file = parse(
            r#"
            message Service {
              string name = 1;
              google.protobuf.Int32Value timeout = 2 [deprecated = true];
              repeated Color tags = 3;
              map<string, string> opts = 4;
              optional bool enabled = 5;
              reserved 6, 9 to 11;
              reserved "legacy";
              oneof choice {
                string a = 12;
                int32 b = 13;
              }
            }

            enum Color {
              option allow_alias = true;
              COLOR_UNSPECIFIED = 0;
              RED = 1;
              GREEN = 2 [deprecated = true];
            }
            "#,
        )
        .unwrap();

        let service = file.message("Service").unwrap();
        let summary: Vec<(&str, &str, i32, &Label)> = service
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.type_name.as_str(), f.number, &f.label))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("name", "string", 1, &Label::None),
                ("timeout", "google.protobuf.Int32Value", 2, &Label::None),
                ("tags", "Color", 3, &Label::Repeated),
                ("opts", "map<string,string>", 4, &Label::None),
                ("enabled", "bool", 5, &Label::Optional),
                ("a", "string", 12, &Label::Oneof("choice".into())),
                ("b", "int32", 13, &Label::Oneof("choice".into())),
            ]
        );
        assert_eq!(service.fields[1].option("deprecated"), Some("true"));
        assert_eq!((service.line, service.column), (2, 21));

        let color = file.enum_def("Color").unwrap();
        assert_eq!(color.values.len(), 3);
        assert_eq!(color.number_of("GREEN"), Some(2));
    }

    #[test]
    fn test_parse_custom_options() {
        let file = parse(
            r#"
            option (my.file_opt).sub = 'x';
            message A {
              string javaagent = 1 [(targets) = "java,go", json_name = "j"];
            }
            service Svc { rpc Get(A) returns (A) { option (http) = { get: "/a" }; } }
            "#,
        )
        .unwrap();

        assert_eq!(file.option("(my.file_opt).sub"), Some("x"));
        let field = &file.messages[0].fields[0];
        assert_eq!(field.option("(targets)"), Some("java,go"));
        assert_eq!(field.option("json_name"), Some("j"));
    }

    #[test]
    fn test_parse_rejects_nested_definitions() {
        let err = parse("message A { message B { } }").unwrap_err();
        assert!(
            matches!(&err, CompileError::ParseError { msg, line: 1, column: 13 } if msg.contains("Nested message")),
            "unexpected error {:?}",
            err
        );
    }

    #[test]
    fn test_parse_errors_carry_position() {
        let err = parse("message A {\n  string = 1;\n}").unwrap_err();
        assert!(
            matches!(&err, CompileError::ParseError { line: 2, column: 10, .. }),
            "unexpected error {:?}",
            err
        );

        let err = parse("message A { string a = 1;").unwrap_err();
        assert!(matches!(&err, CompileError::ParseError { msg, .. } if msg == "Unexpected end of file"));
    }
}

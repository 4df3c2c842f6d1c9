//! Field and type names as they appear in generated code and in environment
//! variable names.

const RUST_KEYWORDS: [&str; 51] = [
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "try",
    "type", "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Converts a string to snake_case.
/// This implementation avoids inserting underscores between consecutive uppercase letters,
/// so that acronyms remain intact (e.g. "sessionID" becomes "session_id").
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut snake = String::new();
    for i in 0..chars.len() {
        let c = chars[i];
        if c.is_uppercase() {
            if i > 0 && !snake.ends_with('_') {
                let prev = chars[i - 1];
                // Insert an underscore if the previous character is not uppercase,
                // or if the next character exists and is lowercase.
                if !prev.is_uppercase() || (i + 1 < chars.len() && chars[i + 1].is_lowercase()) {
                    snake.push('_');
                }
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

/// Upper-snake-case fragment of the environment variable a field reads,
/// e.g. `serviceName` becomes `SERVICE_NAME`. Unlike [`to_snake_case`],
/// letters and digits are separate words: `oauth2_config` becomes
/// `OAUTH_2_CONFIG`.
pub fn env_fragment(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut fragment = String::new();
    for i in 0..chars.len() {
        let c = chars[i];
        if !c.is_ascii_alphanumeric() {
            if !fragment.is_empty() && !fragment.ends_with('_') {
                fragment.push('_');
            }
            continue;
        }
        if i > 0 && !fragment.is_empty() && !fragment.ends_with('_') {
            let prev = chars[i - 1];
            let next_lower = i + 1 < chars.len() && chars[i + 1].is_lowercase();
            let boundary = (c.is_ascii_digit() && prev.is_alphabetic())
                || (c.is_alphabetic() && prev.is_ascii_digit())
                || (c.is_uppercase() && prev.is_lowercase())
                || (c.is_uppercase() && prev.is_uppercase() && next_lower);
            if boundary {
                fragment.push('_');
            }
        }
        fragment.extend(c.to_uppercase());
    }
    fragment.trim_end_matches('_').to_string()
}

/// Field identifier prost generates for `name`.
pub fn rust_field_name(name: &str) -> String {
    let snake = to_snake_case(name);
    match snake.as_str() {
        "self" | "super" | "crate" | "Self" => format!("{}_", snake),
        other if RUST_KEYWORDS.contains(&other) => format!("r#{}", other),
        _ => snake,
    }
}

/// Type identifier prost generates for a message or enum named `name`.
pub fn rust_type_name(name: &str) -> String {
    to_snake_case(name)
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().to_string() + chars.as_str(),
            }
        })
        .collect()
}

/// Field identifier protoc-gen-go generates for `name`: underscores
/// followed by a lowercase letter are dropped and every word is
/// capitalized (`foo_bar` becomes `FooBar`).
pub fn go_field_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    if chars.first() == Some(&'_') {
        out.push('X');
        i = 1;
    }
    while i < chars.len() {
        let c = chars[i];
        if c == '_' && i + 1 < chars.len() && chars[i + 1].is_ascii_lowercase() {
            // Dropped; the next word is capitalized below.
        } else if c.is_ascii_digit() || c == '_' {
            out.push(c);
        } else {
            out.push(c.to_ascii_uppercase());
            while i + 1 < chars.len() && chars[i + 1].is_ascii_lowercase() {
                i += 1;
                out.push(chars[i]);
            }
        }
        i += 1;
    }
    out
}

/// Go type name for a message or enum; protoc-gen-go keeps the declared
/// spelling apart from the leading capital.
pub fn go_type_name(name: &str) -> String {
    go_field_name(name)
}

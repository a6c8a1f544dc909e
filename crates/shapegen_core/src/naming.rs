//! Case conversion and identifier escaping for generated Rust items.
//!
//! ## Notes
//!
//! - Word boundaries: any non-alphanumeric character, a lower-case letter or digit followed by an upper-case letter,
//!   and the last capital of an acronym that is followed by a lower-case letter (`XMLHttp` splits as `XML` + `Http`).
//! - Digits stay attached to the word they follow (`Ec2Instance` → `ec2_instance`).
//! - Identifiers that would start with a digit are prefixed with `_`.

use crate::lang::rust_keywords;

/// Split a model name into lower-cased words.
pub fn split_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (idx, &ch) in chars.iter().enumerate() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if ch.is_uppercase() && !current.is_empty() {
            let prev = chars[idx - 1];
            let next_is_lower = chars.get(idx + 1).is_some_and(|c| c.is_lowercase());
            let boundary = prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Convert a model name to `snake_case`.
pub fn to_snake_case(name: &str) -> String {
    guard_leading_digit(split_words(name).join("_"))
}

/// Convert a model name to `PascalCase`.
pub fn to_pascal_case(name: &str) -> String {
    let joined: String = split_words(name)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();
    guard_leading_digit(joined)
}

/// Make an identifier usable in generated code.
///
/// Keywords become raw identifiers (`type` → `r#type`); the path keywords that cannot be raw (`self`, `crate`, ...)
/// get a trailing underscore instead.
pub fn escape_ident(name: &str) -> String {
    if name.is_empty() {
        "_".to_string()
    } else if rust_keywords::needs_rename(name) {
        format!("{name}_")
    } else if rust_keywords::is_keyword(name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

fn guard_leading_digit(ident: String) -> String {
    match ident.chars().next() {
        Some(first) if first.is_ascii_digit() => format!("_{ident}"),
        None => "_".to_string(),
        _ => ident,
    }
}

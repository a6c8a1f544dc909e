//! Rust keyword vocabulary (for codegen identifier escaping).

/// Reserved + strict keywords in Rust 2021.
pub const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in",
    "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super",
    "trait", "true", "type", "unsafe", "use", "where", "while", "async", "await", "dyn", "abstract", "become", "box",
    "do", "final", "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try",
];

/// Keywords that cannot be written as raw identifiers (`r#self` is rejected by rustc).
pub const NON_RAW_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

/// Check whether an identifier is a Rust keyword.
pub fn is_keyword(name: &str) -> bool {
    RUST_KEYWORDS.contains(&name)
}

/// Check whether a keyword must be renamed instead of escaped with `r#`.
pub fn needs_rename(name: &str) -> bool {
    NON_RAW_KEYWORDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_and_reserved_keywords_are_detected() {
        assert!(is_keyword("type"));
        assert!(is_keyword("match"));
        assert!(is_keyword("yield"));
        assert!(!is_keyword("name"));
    }

    #[test]
    fn path_keywords_need_rename() {
        assert!(needs_rename("self"));
        assert!(needs_rename("crate"));
        assert!(!needs_rename("type"));
    }
}

//! Property tests for identifier case conversion.

use proptest::prelude::*;
use shapegen_core::{to_pascal_case, to_snake_case};

fn model_name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_-]{0,24}"
}

proptest! {
    /// Property: snake-casing is idempotent.
    #[test]
    fn snake_case_is_idempotent(name in model_name_strategy()) {
        let once = to_snake_case(&name);
        prop_assert_eq!(to_snake_case(&once), once);
    }

    /// Property: snake-cased names contain only lower-case ASCII, digits and underscores.
    #[test]
    fn snake_case_is_lowercase(name in model_name_strategy()) {
        let snake = to_snake_case(&name);
        prop_assert!(snake.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
    }

    /// Property: PascalCase output never contains separators.
    #[test]
    fn pascal_case_has_no_separators(name in model_name_strategy()) {
        let pascal = to_pascal_case(&name);
        prop_assert!(pascal.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}

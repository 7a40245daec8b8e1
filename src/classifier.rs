use phf::phf_set;

/// Keywords that never name a table or column. Stored uppercase.
static RESERVED_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "SELECT", "FROM", "WHERE", "GROUP", "BY", "HAVING", "AND", "OR", "NOT",
    "INNER", "OUTER", "ON", "JOIN", "ORDER", "LIMIT", "ASC", "DESC", "ALL",
    "LEFT", "RIGHT", "UNION", "LIKE", "MAX", "IN", "IS", "NULL", "NOW",
};

/// Leading characters that mark a token as an operator.
const OPERATOR_CHARS: &[char] = &['+', '-', '\\', '*', '=', '.', '<', '>', ':', '!'];

/// Whether the token starts with an operator character.
pub fn is_operator(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| OPERATOR_CHARS.contains(&c))
}

/// Case-insensitive membership in the reserved keyword set.
pub fn is_reserved_keyword(token: &str) -> bool {
    // Longest keyword is six bytes; anything longer cannot match.
    if token.len() > 6 {
        return false;
    }
    RESERVED_KEYWORDS.contains(token.to_ascii_uppercase().as_str())
}

pub fn is_numeric_literal(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_quoted_literal(token: &str) -> bool {
    token.starts_with('\'') || token.starts_with('"')
}

/// Whether the token could be a table or column identifier.
///
/// Gates every table and column candidate in the extractor.
pub fn is_valid_name(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    if is_operator(token) || is_reserved_keyword(token) || is_numeric_literal(token) {
        return false;
    }
    if token.starts_with(|c: char| c.is_ascii_digit()) {
        return false;
    }
    token != "," && token != ";"
}

/// Case-insensitive keyword comparison against an uppercase literal.
#[inline]
pub(crate) fn keyword_eq(token: &str, keyword: &str) -> bool {
    token.eq_ignore_ascii_case(keyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators() {
        for op in ["+", "-", "\\", "*", "=", ".", "<", ">", ":", "!", "<=", "!="] {
            assert!(is_operator(op), "{op} should be an operator");
        }
        assert!(!is_operator("("));
        assert!(!is_operator(","));
        assert!(!is_operator("name"));
        assert!(!is_operator(""));
    }

    #[test]
    fn test_reserved_keywords_case_insensitive() {
        assert!(is_reserved_keyword("select"));
        assert!(is_reserved_keyword("SeLeCt"));
        assert!(is_reserved_keyword("now"));
        assert!(is_reserved_keyword("Max"));
        assert!(!is_reserved_keyword("concat"));
        assert!(!is_reserved_keyword("as"));
        assert!(!is_reserved_keyword("selects"));
        assert!(!is_reserved_keyword(""));
    }

    #[test]
    fn test_numeric_literal() {
        assert!(is_numeric_literal("0"));
        assert!(is_numeric_literal("12345"));
        assert!(!is_numeric_literal(""));
        assert!(!is_numeric_literal("12a"));
        assert!(!is_numeric_literal("1.5"));
    }

    #[test]
    fn test_quoted_literal() {
        assert!(is_quoted_literal("'abc'"));
        assert!(is_quoted_literal("\"abc\""));
        assert!(!is_quoted_literal("`abc`"));
        assert!(!is_quoted_literal("abc"));
    }

    #[test]
    fn test_valid_name() {
        assert!(is_valid_name("emp"));
        assert!(is_valid_name("t1"));
        assert!(is_valid_name("_hidden"));
        assert!(is_valid_name("as"));
        // Parentheses are not filtered here; the extractor intercepts them first.
        assert!(is_valid_name("("));

        assert!(!is_valid_name(""));
        assert!(!is_valid_name("where"));
        assert!(!is_valid_name("."));
        assert!(!is_valid_name(","));
        assert!(!is_valid_name(";"));
        assert!(!is_valid_name("42"));
        assert!(!is_valid_name("1abc"));
    }
}

use regex::Regex;

use super::term::Relation;

/// A raw (keyword, relation, value) triple split out of a filter string.
/// The value is verbatim, quotes included; `unquote` strips them when the
/// token is wrapped into a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub keyword: Option<String>,
    pub relation: Relation,
    pub value: String,
}

/// Scan a filter string into raw tokens. Total: malformed input degrades
/// to bare search tokens, never an error.
pub fn tokenize(input: &str) -> Vec<RawToken> {
    // Identifier-like keyword: letters, digits, underscore, hyphen
    // (sort-reverse), not starting with a hyphen.
    let keyword_re = Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_-]*$").unwrap();

    split_tokens(input)
        .into_iter()
        .map(|token| split_term(&token, &keyword_re))
        .collect()
}

/// Split on whitespace runs outside quotes. A quoted run preserves its
/// whitespace verbatim; an unterminated quote reads to end of input.
fn split_tokens(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'"') => {
                current.push('\\');
                if let Some(q) = chars.next() {
                    current.push(q);
                }
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push('"');
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Split one token at the first unquoted relation operator. The prefix
/// must be identifier-like to count as a keyword; otherwise the whole
/// token, operator characters included, is a bare search value.
fn split_term(token: &str, keyword_re: &Regex) -> RawToken {
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in token.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            '=' | '~' | '>' | '<' if !in_quotes => {
                let (op_len, relation) = if (c == '>' || c == '<') && token[i + 1..].starts_with('=')
                {
                    let rel = if c == '>' {
                        Relation::GreaterEqual
                    } else {
                        Relation::LessEqual
                    };
                    (2, rel)
                } else {
                    let rel = match c {
                        '=' => Relation::Equal,
                        '~' => Relation::Contains,
                        '>' => Relation::Greater,
                        _ => Relation::Less,
                    };
                    (1, rel)
                };

                let keyword = &token[..i];
                if keyword_re.is_match(keyword) {
                    return RawToken {
                        keyword: Some(keyword.to_string()),
                        relation,
                        value: token[i + op_len..].to_string(),
                    };
                }
                // An operator with no keyword in front of it is ordinary
                // text in a bare search term.
                break;
            }
            _ => {}
        }
    }

    RawToken {
        keyword: None,
        relation: Relation::Contains,
        value: token.to_string(),
    }
}

/// Strip a wrapping quote pair and unescape inner quotes. Values that are
/// not quote-wrapped pass through unchanged.
pub(crate) fn unquote(value: &str) -> String {
    let inner = match value.strip_prefix('"') {
        Some(rest) => rest.strip_suffix('"').unwrap_or(rest),
        None => value,
    };
    inner.replace("\\\"", "\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_separates_terms() {
        let tokens = tokenize("apache  first=1\trows=10");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].keyword, None);
        assert_eq!(tokens[0].value, "apache");
        assert_eq!(tokens[1].keyword.as_deref(), Some("first"));
        assert_eq!(tokens[2].keyword.as_deref(), Some("rows"));
    }

    #[test]
    fn test_keyword_relation_value() {
        let tokens = tokenize("name~test");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].keyword.as_deref(), Some("name"));
        assert_eq!(tokens[0].relation, Relation::Contains);
        assert_eq!(tokens[0].value, "test");
    }

    #[test]
    fn test_two_char_operator_wins_over_one_char() {
        let tokens = tokenize("min_qod>=70 severity<=4");
        assert_eq!(tokens[0].relation, Relation::GreaterEqual);
        assert_eq!(tokens[0].value, "70");
        assert_eq!(tokens[1].relation, Relation::LessEqual);
        assert_eq!(tokens[1].value, "4");
    }

    #[test]
    fn test_quoted_value_keeps_whitespace() {
        let tokens = tokenize("name=\"two words\" tail");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].keyword.as_deref(), Some("name"));
        assert_eq!(tokens[0].value, "\"two words\"");
        assert_eq!(tokens[1].value, "tail");
    }

    #[test]
    fn test_unterminated_quote_reads_to_end() {
        let tokens = tokenize("name=\"never closed rows=10");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].keyword.as_deref(), Some("name"));
        assert_eq!(tokens[0].value, "\"never closed rows=10");
    }

    #[test]
    fn test_operator_without_keyword_is_bare_value() {
        let tokens = tokenize("=orphan");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].keyword, None);
        assert_eq!(tokens[0].relation, Relation::Contains);
        assert_eq!(tokens[0].value, "=orphan");
    }

    #[test]
    fn test_non_identifier_prefix_is_bare_value() {
        let tokens = tokenize("a/b=c");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].keyword, None);
        assert_eq!(tokens[0].value, "a/b=c");
    }

    #[test]
    fn test_operator_inside_quotes_does_not_split() {
        let tokens = tokenize("\"a=b\"");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].keyword, None);
        assert_eq!(tokens[0].value, "\"a=b\"");
    }

    #[test]
    fn test_hyphenated_keyword() {
        let tokens = tokenize("sort-reverse=severity");
        assert_eq!(tokens[0].keyword.as_deref(), Some("sort-reverse"));
        assert_eq!(tokens[0].value, "severity");
    }

    #[test]
    fn test_unquote_strips_and_unescapes() {
        assert_eq!(unquote("\"two words\""), "two words");
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote("\"say \\\"hi\\\"\""), "say \"hi\"");
        assert_eq!(unquote("\"unterminated"), "unterminated");
    }

    #[test]
    fn test_empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t  ").is_empty());
    }
}

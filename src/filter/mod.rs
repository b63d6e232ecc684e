pub mod keyword;
pub mod term;
pub mod tokenizer;

use std::fmt;

use tracing::debug;

pub use keyword::Keyword;
pub use term::{FilterTerm, Relation};

use tokenizer::{tokenize, unquote};

/// Sort direction. The direction is stored in which reserved keyword
/// carries the field: `sort` ascending, `sort-reverse` descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn keyword(self) -> Keyword {
        match self {
            SortOrder::Ascending => Keyword::Sort,
            SortOrder::Descending => Keyword::SortReverse,
        }
    }
}

/// Severity class encoded as one character of a `levels` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    High,
    Medium,
    Low,
    Log,
    FalsePositive,
}

impl Level {
    pub fn from_char(c: char) -> Option<Level> {
        match c {
            'h' => Some(Level::High),
            'm' => Some(Level::Medium),
            'l' => Some(Level::Low),
            'g' => Some(Level::Log),
            'f' => Some(Level::FalsePositive),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Level::High => 'h',
            Level::Medium => 'm',
            Level::Low => 'l',
            Level::Log => 'g',
            Level::FalsePositive => 'f',
        }
    }
}

/// An ordered list of filter terms with replace-or-append mutation.
///
/// Term order is preserved (the string displays as typed) but lookup and
/// mutation treat a keyword as logically unique. Mutators consume the
/// receiver and return the updated filter; clone first when the original
/// must survive an edit.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    terms: Vec<FilterTerm>,
}

impl Filter {
    /// Parse a filter string. Total: empty or malformed input yields a
    /// usable (possibly empty) filter, never an error.
    pub fn parse(input: &str) -> Filter {
        let terms: Vec<FilterTerm> = tokenize(input)
            .into_iter()
            .map(|raw| FilterTerm {
                keyword: raw.keyword.map(Keyword::from),
                relation: raw.relation,
                value: unquote(&raw.value),
            })
            // A quoted-empty bare token carries no criteria.
            .filter(|term| term.keyword.is_some() || !term.value.is_empty())
            .collect();
        debug!("parsed {} term(s) from {input:?}", terms.len());
        Filter { terms }
    }

    pub fn terms(&self) -> &[FilterTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Value of the first term with the given keyword.
    pub fn get(&self, keyword: &str) -> Option<&str> {
        let keyword = Keyword::from(keyword);
        self.terms
            .iter()
            .find(|t| t.keyword.as_ref() == Some(&keyword))
            .map(|t| t.value.as_str())
    }

    fn get_int(&self, keyword: &str) -> Option<i64> {
        self.get(keyword)?.parse().ok()
    }

    /// Set a keyword to a value with relation `=`.
    pub fn set(self, keyword: &str, value: &str) -> Filter {
        self.set_term(keyword, Relation::Equal, value)
    }

    /// Replace the first term with this keyword in place, or append a new
    /// term. Setting `sort` drops `sort-reverse` and vice versa.
    pub fn set_term(mut self, keyword: &str, relation: Relation, value: &str) -> Filter {
        let keyword = Keyword::from(keyword);
        match keyword {
            Keyword::Sort => self = self.delete("sort-reverse"),
            Keyword::SortReverse => self = self.delete("sort"),
            _ => {}
        }

        match self
            .terms
            .iter_mut()
            .find(|t| t.keyword.as_ref() == Some(&keyword))
        {
            Some(term) => {
                term.relation = relation;
                term.value = value.to_string();
            }
            None => self.terms.push(FilterTerm::new(keyword, relation, value)),
        }
        self
    }

    /// Remove every term with the given keyword. Absent keyword is a no-op.
    pub fn delete(mut self, keyword: &str) -> Filter {
        let keyword = Keyword::from(keyword);
        self.terms.retain(|t| t.keyword.as_ref() != Some(&keyword));
        self
    }

    /// Overlay `other` onto this filter: keywords present in `other`
    /// override value and relation at this filter's positions, keywords
    /// only in `other` are appended in its order, and bare search terms
    /// from `other` are appended as-is.
    pub fn merge(mut self, other: &Filter) -> Filter {
        for term in &other.terms {
            match &term.keyword {
                Some(keyword) => {
                    self = self.set_term(keyword.as_str(), term.relation, &term.value);
                }
                None => self.terms.push(term.clone()),
            }
        }
        self
    }

    /// Criteria-only projection: every term except the pagination and sort
    /// control keywords. This is what a filter-editing textbox shows, so
    /// free-text edits cannot clobber paging state.
    pub fn criteria_string(&self) -> String {
        let criteria: Vec<String> = self
            .terms
            .iter()
            .filter(|t| !t.keyword.as_ref().is_some_and(Keyword::is_paging))
            .map(|t| t.to_string())
            .collect();
        criteria.join(" ")
    }

    /// Variant requesting the full unpaginated result set.
    pub fn all(&self) -> Filter {
        self.clone().set("first", "1").set("rows", "-1")
    }

    /// 1-based index of the first requested row.
    pub fn first(&self) -> Option<i64> {
        self.get_int("first")
    }

    /// Requested page size; -1 means everything.
    pub fn rows(&self) -> Option<i64> {
        self.get_int("rows")
    }

    /// Minimum quality-of-detection threshold.
    pub fn min_qod(&self) -> Option<i64> {
        self.get_int("min_qod")
    }

    /// Whether overrides are applied (0|1 on the wire).
    pub fn apply_overrides(&self) -> Option<bool> {
        self.get_int("apply_overrides").map(|v| v != 0)
    }

    /// Severity classes from the `levels` value. Unknown characters are
    /// skipped.
    pub fn levels(&self) -> Vec<Level> {
        self.get("levels")
            .map(|v| v.chars().filter_map(Level::from_char).collect())
            .unwrap_or_default()
    }

    /// Field the result list is ordered by, in either direction.
    pub fn sort_field(&self) -> Option<&str> {
        self.get("sort").or_else(|| self.get("sort-reverse"))
    }

    /// Current sort direction, `None` when unsorted.
    pub fn sort_order(&self) -> Option<SortOrder> {
        if self.get("sort").is_some() {
            Some(SortOrder::Ascending)
        } else if self.get("sort-reverse").is_some() {
            Some(SortOrder::Descending)
        } else {
            None
        }
    }

    /// Order by `field`, keeping the current direction (ascending when
    /// unsorted).
    pub fn set_sort_by(self, field: &str) -> Filter {
        let order = self.sort_order().unwrap_or(SortOrder::Ascending);
        self.set_term(order.keyword().as_str(), Relation::Equal, field)
    }

    /// Switch sort direction, keeping the current field. No-op on an
    /// unsorted filter.
    pub fn set_sort_order(self, order: SortOrder) -> Filter {
        match self.sort_field() {
            Some(field) => {
                let field = field.to_string();
                self.set_term(order.keyword().as_str(), Relation::Equal, &field)
            }
            None => self,
        }
    }

    /// Jump to the first page.
    pub fn first_page(self) -> Filter {
        self.set("first", "1")
    }

    /// Advance one page. No-op without a positive page size.
    pub fn next_page(self) -> Filter {
        let rows = match self.rows() {
            Some(rows) if rows > 0 => rows,
            _ => return self,
        };
        let first = self.first().unwrap_or(1).max(1);
        self.set("first", &(first + rows).to_string())
    }

    /// Go back one page, clamping at the start of the list.
    pub fn previous_page(self) -> Filter {
        let rows = match self.rows() {
            Some(rows) if rows > 0 => rows,
            _ => return self,
        };
        let first = self.first().unwrap_or(1).max(1);
        self.set("first", &(first - rows).max(1).to_string())
    }
}

impl fmt::Display for Filter {
    /// The full wire string: every term, space-joined, in list order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

// Equality is canonical-string equality, so term order matters. Downstream
// "has this filter changed" checks rely on the strict form.
impl PartialEq for Filter {
    fn eq(&self, other: &Filter) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for Filter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_concrete_scenario() {
        let filter = Filter::parse("name~\"test\" first=1 rows=10 sort=name");
        let terms = filter.terms();
        assert_eq!(terms.len(), 4);

        assert_eq!(terms[0].keyword, Some(Keyword::Criteria("name".into())));
        assert_eq!(terms[0].relation, Relation::Contains);
        assert_eq!(terms[0].value, "test");

        assert_eq!(terms[1].keyword, Some(Keyword::First));
        assert_eq!(terms[1].relation, Relation::Equal);
        assert_eq!(terms[1].value, "1");

        assert_eq!(terms[2].keyword, Some(Keyword::Rows));
        assert_eq!(terms[2].value, "10");

        assert_eq!(terms[3].keyword, Some(Keyword::Sort));
        assert_eq!(terms[3].value, "name");

        assert_eq!(filter.criteria_string(), "name~test");
    }

    #[test]
    fn test_round_trip() {
        for input in [
            "name~\"test\" first=1 rows=10 sort=name",
            "apache min_qod>=70 levels=hml",
            "comment=\"a=b\" apply_overrides=1",
            "sort-reverse=severity rows=-1",
        ] {
            let filter = Filter::parse(input);
            let rendered = filter.to_string();
            assert_eq!(Filter::parse(&rendered), filter, "round trip of {input:?}");
        }
    }

    #[test]
    fn test_serialize_is_idempotent() {
        let once = Filter::parse("name~\"x y\"  first=1").to_string();
        let twice = Filter::parse(&once).to_string();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_set_get_inverse() {
        let filter = Filter::default().set("task_id", "267a3405");
        assert_eq!(filter.get("task_id"), Some("267a3405"));
    }

    #[test]
    fn test_set_replaces_first_in_place() {
        let filter = Filter::parse("first=1 name~x").set("first", "21");
        assert_eq!(filter.to_string(), "first=21 name~x");
    }

    #[test]
    fn test_delete_removes_all_matches() {
        let filter = Filter::parse("k=1 name~x k=2").delete("k");
        assert_eq!(filter.get("k"), None);
        assert_eq!(filter.to_string(), "name~x");
    }

    #[test]
    fn test_delete_absent_keyword_is_noop() {
        let filter = Filter::parse("name~x").delete("missing");
        assert_eq!(filter.to_string(), "name~x");
    }

    #[test]
    fn test_sort_exclusivity() {
        let filter = Filter::parse("sort-reverse=severity").set_sort_by("name");
        assert_eq!(filter.get("sort-reverse"), Some("name"));
        assert_eq!(filter.get("sort"), None);

        let filter = filter.set_sort_order(SortOrder::Ascending);
        assert_eq!(filter.get("sort"), Some("name"));
        assert_eq!(filter.get("sort-reverse"), None);
    }

    #[test]
    fn test_set_sort_order_unsorted_is_noop() {
        let filter = Filter::parse("name~x").set_sort_order(SortOrder::Descending);
        assert_eq!(filter.get("sort"), None);
        assert_eq!(filter.get("sort-reverse"), None);
    }

    #[test]
    fn test_criteria_string_excludes_paging() {
        let filter = Filter::parse("first=1 rows=10 name~\"x\"");
        assert_eq!(filter.criteria_string(), "name~x");
    }

    #[test]
    fn test_all_forces_full_fetch() {
        let filter = Filter::parse("first=41 rows=20 name~x");
        let all = filter.all();
        assert_eq!(all.get("first"), Some("1"));
        assert_eq!(all.get("rows"), Some("-1"));
        // The original is untouched.
        assert_eq!(filter.get("first"), Some("41"));
    }

    #[test]
    fn test_merge_other_wins() {
        let merged = Filter::parse("a=1").merge(&Filter::parse("a=2 b=3"));
        assert_eq!(merged.to_string(), "a=2 b=3");
    }

    #[test]
    fn test_merge_keeps_self_positions() {
        let merged = Filter::parse("a=1 b=2").merge(&Filter::parse("b=9 c=3"));
        assert_eq!(merged.to_string(), "a=1 b=9 c=3");
    }

    #[test]
    fn test_merge_appends_bare_terms() {
        let merged = Filter::parse("name~x").merge(&Filter::parse("apache"));
        assert_eq!(merged.to_string(), "name~x apache");
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let a = Filter::parse("a=1 b=2");
        let b = Filter::parse("b=2 a=1");
        assert_ne!(a, b);
        assert_eq!(a, Filter::parse("a=1 b=2"));
    }

    #[test]
    fn test_clone_does_not_share_edits() {
        let original = Filter::parse("name~x rows=10");
        let edited = original.clone().set("rows", "50");
        assert_eq!(original.get("rows"), Some("10"));
        assert_eq!(edited.get("rows"), Some("50"));
    }

    #[test]
    fn test_typed_accessors() {
        let filter = Filter::parse("first=21 rows=10 min_qod=70 apply_overrides=1 levels=hmx");
        assert_eq!(filter.first(), Some(21));
        assert_eq!(filter.rows(), Some(10));
        assert_eq!(filter.min_qod(), Some(70));
        assert_eq!(filter.apply_overrides(), Some(true));
        assert_eq!(filter.levels(), vec![Level::High, Level::Medium]);
    }

    #[test]
    fn test_non_numeric_reserved_value_reads_as_none() {
        let filter = Filter::parse("first=soon");
        assert_eq!(filter.first(), None);
        assert_eq!(filter.get("first"), Some("soon"));
    }

    #[test]
    fn test_page_navigation() {
        let filter = Filter::parse("first=1 rows=10 name~x");
        let next = filter.clone().next_page();
        assert_eq!(next.get("first"), Some("11"));

        let back = next.previous_page();
        assert_eq!(back.get("first"), Some("1"));

        // Clamp at the start of the list.
        let clamped = Filter::parse("first=5 rows=10").previous_page();
        assert_eq!(clamped.get("first"), Some("1"));
    }

    #[test]
    fn test_page_navigation_without_page_size_is_noop() {
        let filter = Filter::parse("name~x rows=-1 first=1");
        let next = filter.clone().next_page();
        assert_eq!(next, filter);
    }

    #[test]
    fn test_empty_quoted_token_is_dropped() {
        assert!(Filter::parse("\"\"").is_empty());
        // An empty keyworded value survives.
        let filter = Filter::parse("name=");
        assert_eq!(filter.get("name"), Some(""));
        assert_eq!(filter.to_string(), "name=");
    }

    #[test]
    fn test_parse_garbage_never_fails() {
        let filter = Filter::parse("=== \"unterminated ~~ <>");
        assert!(!filter.is_empty());
        // Everything degraded to bare search terms.
        assert!(filter.terms().iter().all(|t| t.keyword.is_none()));
    }
}

use std::fmt;

/// A filter keyword: either one of the reserved names with engine-defined
/// pagination/sort/condition semantics, or a free-form criteria name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyword {
    /// 1-based index of the first requested row.
    First,
    /// Page size; -1 requests the full result set.
    Rows,
    /// Ascending sort field.
    Sort,
    /// Descending sort field. Mutually exclusive with `sort`.
    SortReverse,
    /// Minimum quality-of-detection, 0..100.
    MinQod,
    /// Severity classes, characters from {h,m,l,g,f}.
    Levels,
    /// Whether overrides are applied, 0 or 1.
    ApplyOverrides,
    /// Any other keyword. The engine carries these through unchanged;
    /// vocabulary checks belong to the entity-specific caller.
    Criteria(String),
}

impl Keyword {
    pub fn as_str(&self) -> &str {
        match self {
            Keyword::First => "first",
            Keyword::Rows => "rows",
            Keyword::Sort => "sort",
            Keyword::SortReverse => "sort-reverse",
            Keyword::MinQod => "min_qod",
            Keyword::Levels => "levels",
            Keyword::ApplyOverrides => "apply_overrides",
            Keyword::Criteria(name) => name,
        }
    }

    /// True for the keywords excluded from the criteria-only projection:
    /// pagination and sort control.
    pub fn is_paging(&self) -> bool {
        matches!(
            self,
            Keyword::First | Keyword::Rows | Keyword::Sort | Keyword::SortReverse
        )
    }
}

impl From<&str> for Keyword {
    fn from(name: &str) -> Keyword {
        match name {
            "first" => Keyword::First,
            "rows" => Keyword::Rows,
            "sort" => Keyword::Sort,
            "sort-reverse" => Keyword::SortReverse,
            "min_qod" => Keyword::MinQod,
            "levels" => Keyword::Levels,
            "apply_overrides" => Keyword::ApplyOverrides,
            _ => Keyword::Criteria(name.to_string()),
        }
    }
}

impl From<String> for Keyword {
    fn from(name: String) -> Keyword {
        Keyword::from(name.as_str())
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names_round_trip() {
        for name in [
            "first",
            "rows",
            "sort",
            "sort-reverse",
            "min_qod",
            "levels",
            "apply_overrides",
        ] {
            let kw = Keyword::from(name);
            assert!(!matches!(kw, Keyword::Criteria(_)), "{name} should be reserved");
            assert_eq!(kw.as_str(), name);
        }
    }

    #[test]
    fn test_unknown_name_is_criteria() {
        let kw = Keyword::from("severity");
        assert_eq!(kw, Keyword::Criteria("severity".to_string()));
        assert_eq!(kw.as_str(), "severity");
        assert!(!kw.is_paging());
    }

    #[test]
    fn test_paging_set() {
        assert!(Keyword::First.is_paging());
        assert!(Keyword::Rows.is_paging());
        assert!(Keyword::Sort.is_paging());
        assert!(Keyword::SortReverse.is_paging());
        assert!(!Keyword::MinQod.is_paging());
        assert!(!Keyword::Levels.is_paging());
        assert!(!Keyword::ApplyOverrides.is_paging());
    }
}

use std::collections::BTreeMap;

use unicode_width::UnicodeWidthStr;

use crate::counts::CollectionCounts;
use crate::filter::Filter;

/// Truncate a string to fit within max_width (respecting unicode width).
fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + cw + 3 > max_width {
            result.push_str("...");
            break;
        }
        result.push(ch);
        width += cw;
    }
    result
}

/// Print a filter's terms as a table, one row per term. Bare full-text
/// terms show "-" in the keyword column.
pub fn print_terms(filter: &Filter) {
    if filter.is_empty() {
        println!("(empty filter)");
        return;
    }

    println!("  {:<18} {:<8} {:<42}", "KEYWORD", "RELATION", "VALUE");
    println!("  {}", "-".repeat(70));

    for term in filter.terms() {
        let keyword = term.keyword.as_ref().map(|k| k.as_str()).unwrap_or("-");
        println!(
            "  {:<18} {:<8} {:<42}",
            truncate(keyword, 18),
            term.relation.as_str(),
            truncate(&term.value, 42),
        );
    }

    println!("\n  filter: {filter}");
}

/// Print a pagination summary, e.g. "Showing 11-20 of 42 (100 total)".
pub fn print_counts(counts: &CollectionCounts) {
    if counts.length == 0 {
        println!("No rows ({} total)", counts.all);
    } else {
        println!(
            "Showing {}-{} of {} ({} total)",
            counts.first,
            counts.last(),
            counts.filtered,
            counts.all,
        );
    }

    let position = match (counts.has_previous_page(), counts.has_next_page()) {
        (false, false) => "single page",
        (false, true) => "first page, more available",
        (true, false) => "last page",
        (true, true) => "middle page",
    };
    println!("  {position}");
}

/// Print the saved filters from config.
pub fn print_saved(saved: &BTreeMap<String, String>) {
    if saved.is_empty() {
        println!("No saved filters. Add them under [saved] in the config file.");
        return;
    }

    println!("{} saved filter{}:\n", saved.len(), if saved.len() == 1 { "" } else { "s" });
    for (name, filter) in saved {
        println!("  {:<18} {}", truncate(name, 18), truncate(filter, 58));
    }
}

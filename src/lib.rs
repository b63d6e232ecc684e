pub mod collection;
pub mod config;
pub mod counts;
pub mod filter;
pub mod output;

pub use collection::{parse_collection, Collection, CollectionError};
pub use counts::{CollectionCounts, RawCounts};
pub use filter::{Filter, FilterTerm, Keyword, Level, Relation, SortOrder};

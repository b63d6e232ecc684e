use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use vfq::config::{self, VfqConfig};
use vfq::counts::{CollectionCounts, RawCounts};
use vfq::filter::{Filter, FilterTerm, Relation, SortOrder};
use vfq::output::{json as json_out, table};

#[derive(Parser)]
#[command(name = "vfq", version, about = "Vulnerability filter query — parse, mutate, and serialize list-filter strings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to config file (default: ~/.vfq/config.toml)
    #[arg(long, global = true, env = "VFQ_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a filter string and show its terms
    Parse {
        /// Filter string, e.g. 'name~"web server" first=1 rows=10 sort=name'
        filter: String,

        /// Lay configured defaults under the filter first
        #[arg(long)]
        defaults: bool,
    },

    /// Show the criteria-only projection (no paging/sort terms)
    Criteria {
        filter: String,
    },

    /// Set a keyword, replacing the first matching term or appending
    Set {
        filter: String,
        keyword: String,
        value: String,

        /// Relation operator: =, ~, >, <, >=, <=
        #[arg(long, default_value = "=")]
        relation: String,
    },

    /// Delete every term with the given keyword
    Delete {
        filter: String,
        keyword: String,
    },

    /// Overlay another filter; its keywords win on collision
    Merge {
        filter: String,
        other: String,
    },

    /// Sort by a field
    Sort {
        filter: String,
        field: String,

        /// Sort descending (sort-reverse) instead of ascending
        #[arg(long)]
        descending: bool,
    },

    /// Request the full unpaginated result set (first=1 rows=-1)
    All {
        filter: String,
    },

    /// Move between pages: first, next, previous
    Page {
        filter: String,

        /// One of: first, next, previous
        direction: String,
    },

    /// Compute pagination facts from raw response counts
    Counts {
        #[arg(long)]
        first: Option<i64>,

        #[arg(long)]
        rows: Option<i64>,

        #[arg(long)]
        length: Option<i64>,

        #[arg(long)]
        filtered: Option<i64>,

        #[arg(long)]
        all: Option<i64>,
    },

    /// List saved filters, or expand one by name
    Saved {
        name: Option<String>,
    },

    /// Create the default config file
    Init,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let json_output = cli.json;
    let config_file = cli.config;

    match cli.command {
        Commands::Parse { filter, defaults } => {
            let mut parsed = Filter::parse(&filter);
            if defaults {
                let config = load_config(config_file.as_deref())?;
                parsed = config.apply_defaults(parsed);
            }

            if json_output {
                json_out::print_json(&serde_json::json!({
                    "filter": parsed.to_string(),
                    "criteria": parsed.criteria_string(),
                    "terms": parsed.terms().iter().map(term_json).collect::<Vec<_>>(),
                }))?;
            } else {
                table::print_terms(&parsed);
            }
        }

        Commands::Criteria { filter } => {
            let criteria = Filter::parse(&filter).criteria_string();
            if json_output {
                json_out::print_json(&serde_json::json!({ "criteria": criteria }))?;
            } else {
                println!("{criteria}");
            }
        }

        Commands::Set {
            filter,
            keyword,
            value,
            relation,
        } => {
            let relation = Relation::parse(&relation)
                .with_context(|| format!("Unknown relation: {relation}. Use: =, ~, >, <, >=, <="))?;
            let result = Filter::parse(&filter).set_term(&keyword, relation, &value);
            print_filter(&result, json_output)?;
        }

        Commands::Delete { filter, keyword } => {
            let result = Filter::parse(&filter).delete(&keyword);
            print_filter(&result, json_output)?;
        }

        Commands::Merge { filter, other } => {
            let result = Filter::parse(&filter).merge(&Filter::parse(&other));
            print_filter(&result, json_output)?;
        }

        Commands::Sort {
            filter,
            field,
            descending,
        } => {
            let order = if descending {
                SortOrder::Descending
            } else {
                SortOrder::Ascending
            };
            let result = Filter::parse(&filter)
                .set_sort_by(&field)
                .set_sort_order(order);
            print_filter(&result, json_output)?;
        }

        Commands::All { filter } => {
            let result = Filter::parse(&filter).all();
            print_filter(&result, json_output)?;
        }

        Commands::Page { filter, direction } => {
            let parsed = Filter::parse(&filter);
            let result = match direction.as_str() {
                "first" => parsed.first_page(),
                "next" => parsed.next_page(),
                "previous" => parsed.previous_page(),
                other => bail!("Unknown page direction: {other}. Use: first, next, previous"),
            };
            print_filter(&result, json_output)?;
        }

        Commands::Counts {
            first,
            rows,
            length,
            filtered,
            all,
        } => {
            let counts = CollectionCounts::new(RawCounts {
                first,
                rows,
                length,
                filtered,
                all,
            });
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "first": counts.first,
                    "rows": counts.rows,
                    "length": counts.length,
                    "filtered": counts.filtered,
                    "all": counts.all,
                    "last": counts.last(),
                    "has_next_page": counts.has_next_page(),
                    "has_previous_page": counts.has_previous_page(),
                }))?;
            } else {
                table::print_counts(&counts);
            }
        }

        Commands::Saved { name } => {
            let config = load_config(config_file.as_deref())?;
            match name {
                Some(name) => {
                    let saved = config
                        .saved_filter(&name)
                        .with_context(|| format!("No saved filter named: {name}"))?;
                    let parsed = Filter::parse(saved);
                    if json_output {
                        json_out::print_json(&serde_json::json!({
                            "name": name,
                            "filter": parsed.to_string(),
                            "terms": parsed.terms().iter().map(term_json).collect::<Vec<_>>(),
                        }))?;
                    } else {
                        table::print_terms(&parsed);
                    }
                }
                None => {
                    if json_output {
                        json_out::print_json(&config.saved)?;
                    } else {
                        table::print_saved(&config.saved);
                    }
                }
            }
        }

        Commands::Init => {
            let created = config::init_config()?;
            let path = config::config_path()?;
            if created {
                println!("Created: {}", path.display());
            } else {
                println!("Config already exists: {}", path.display());
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<VfqConfig> {
    match path {
        Some(path) => VfqConfig::load_from(path),
        None => VfqConfig::load(),
    }
}

/// Print a mutated filter back out as its wire string.
fn print_filter(filter: &Filter, json_output: bool) -> Result<()> {
    if json_output {
        json_out::print_json(&serde_json::json!({ "filter": filter.to_string() }))?;
    } else {
        println!("{filter}");
    }
    Ok(())
}

fn term_json(term: &FilterTerm) -> serde_json::Value {
    serde_json::json!({
        "keyword": term.keyword.as_ref().map(|k| k.as_str()),
        "relation": term.relation.as_str(),
        "value": term.value,
    })
}

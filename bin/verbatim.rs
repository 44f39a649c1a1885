use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use tracing::debug;
use verbatim::backend::{chunk, dialog, sql};
use verbatim::schema::{ColumnMap, SearchSchema};
use verbatim::{filter, terms};

#[derive(Parser)]
#[command(name = "verbatim")]
#[command(about = "Parse transcript search queries and compile them for each backend", long_about = None)]
struct Args {
    /// Query text, e.g. 'actor = "steve" and series > 2'
    query: String,

    /// Parse natural search terms ('@steve ~xfm "man alive"') instead of the
    /// filter grammar
    #[arg(long)]
    terms: bool,

    /// Backend to compile for; omit to only parse and print the filter
    #[arg(long, env = "VERBATIM_TARGET", value_enum)]
    target: Option<Target>,

    /// Relational column mapping for the sql target, e.g. --column actor=a.actor
    #[arg(long = "column", value_name = "FIELD=COLUMN", value_parser = parse_column)]
    columns: Vec<(String, String)>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Chunk,
    Dialog,
    Sql,
}

fn parse_column(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, column)) if !field.is_empty() && !column.is_empty() => {
            Ok((field.to_string(), column.to_string()))
        }
        _ => Err(format!("expected FIELD=COLUMN, got '{raw}'")),
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let parsed = if args.terms {
        let terms = terms::parse(&args.query)?;
        debug!(count = terms.len(), "parsed search terms");
        terms::terms_to_filter(&terms)
    } else {
        filter::parse(&args.query)?
    };

    match &parsed {
        Some(filter) => println!("filter: {}", filter::print(filter)),
        None => println!("filter: <empty>"),
    }

    let Some(target) = args.target else {
        return Ok(());
    };

    match target {
        Target::Chunk => {
            let query = chunk::filter_to_query(parsed.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&query)?);
        }
        Target::Dialog => {
            let query = dialog::filter_to_query(parsed.as_ref(), &SearchSchema::transcript())?;
            println!("{}", serde_json::to_string_pretty(&query)?);
        }
        Target::Sql => {
            let Some(filter) = &parsed else {
                bail!("the sql target needs a non-empty query");
            };
            if args.columns.is_empty() {
                bail!("the sql target needs at least one --column FIELD=COLUMN mapping");
            }
            let mut columns = ColumnMap::new();
            for (field, column) in args.columns {
                columns = columns.column(field, column);
            }
            let (sql, params) = sql::filter_to_sql(filter, &columns)?;
            println!("sql: {sql}");
            println!("params: {}", serde_json::to_string(&params)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column() {
        assert_eq!(
            parse_column("actor=a.actor"),
            Ok(("actor".to_string(), "a.actor".to_string()))
        );
        assert!(parse_column("actor").is_err());
        assert!(parse_column("=a.actor").is_err());
        assert!(parse_column("actor=").is_err());
    }

    #[test]
    fn test_target_from_flag() {
        let args = Args::try_parse_from(["verbatim", "--target", "sql", "a = 1"]).unwrap();
        assert!(matches!(args.target, Some(Target::Sql)));
    }

    #[test]
    fn test_target_from_environment() {
        std::env::set_var("VERBATIM_TARGET", "dialog");
        let args = Args::try_parse_from(["verbatim", "a = 1"]);
        std::env::remove_var("VERBATIM_TARGET");
        assert!(matches!(args.unwrap().target, Some(Target::Dialog)));
    }
}

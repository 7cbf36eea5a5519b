use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use covid_feeds::config::Config;
use covid_feeds::logging;
use covid_feeds::pipeline::processing::{
    choropleth_values, filter_for_geography, in_state, rank, series,
};
use covid_feeds::{Borough, EntityKey, FeedLayout, TidyTable, TimeSeriesNormalizer};

#[derive(Parser)]
#[command(name = "covid_feeds")]
#[command(about = "Normalized views over public COVID-19 case/death feeds")]
#[command(version)]
struct Cli {
    /// TOML config file (feed URLs, cache TTL, borough geography table)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for rolling JSON log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Feed {
    States,
    Counties,
    Boroughs,
}

impl From<Feed> for FeedLayout {
    fn from(feed: Feed) -> Self {
        match feed {
            Feed::States => FeedLayout::States,
            Feed::Counties => FeedLayout::Counties,
            Feed::Boroughs => FeedLayout::Boroughs,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Top entities for a metric on a date
    Rank {
        #[arg(long, value_enum)]
        feed: Feed,
        /// Defaults to new_cases, or case_count for boroughs
        #[arg(long)]
        metric: Option<String>,
        /// YYYY-MM-DD; defaults to the latest date in the feed
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value_t = 5)]
        top: usize,
        /// Only rank entities in this state
        #[arg(long)]
        state: Option<String>,
    },
    /// Time series of one entity
    Series {
        #[arg(long, value_enum)]
        feed: Feed,
        /// Defaults to new_cases, or case_count for boroughs
        #[arg(long)]
        metric: Option<String>,
        /// State, county or borough name
        #[arg(long)]
        name: String,
        /// State of the county (counties feed only)
        #[arg(long)]
        state: Option<String>,
    },
    /// (geography id, value) pairs for a choropleth map
    Map {
        #[arg(long, value_enum)]
        feed: Feed,
        /// Defaults to new_cases, or case_count for boroughs
        #[arg(long)]
        metric: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        state: Option<String>,
    },
    /// Entities present in a feed, plus its date range
    Entities {
        #[arg(long, value_enum)]
        feed: Feed,
        #[arg(long)]
        state: Option<String>,
    },
}

impl Feed {
    fn default_metric(self) -> &'static str {
        match self {
            Feed::States | Feed::Counties => "new_cases",
            Feed::Boroughs => "case_count",
        }
    }
}

/// The requested metric, or the feed's default. Warns when the feed does not
/// carry it, since every view over it will be empty.
fn resolve_metric(feed: Feed, metric: Option<String>, table: &TidyTable) -> String {
    let metric = metric.unwrap_or_else(|| feed.default_metric().to_string());
    let available = table.metrics();
    if !table.is_empty() && !available.contains(&metric) {
        warn!(%metric, ?available, "Metric not present in feed");
    }
    metric
}

fn parse_date_arg(date: Option<&str>, table: &TidyTable) -> anyhow::Result<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid --date '{}', expected YYYY-MM-DD", s)),
        None => table
            .latest_date()
            .ok_or_else(|| anyhow!("feed has no rows to pick a default date from")),
    }
}

fn scope_to_state(table: TidyTable, state: Option<&str>) -> TidyTable {
    match state {
        Some(state) => filter_for_geography(&table, in_state(state)),
        None => table,
    }
}

fn entity_for(feed: Feed, name: &str, state: Option<&str>) -> anyhow::Result<EntityKey> {
    Ok(match feed {
        Feed::States => EntityKey::state(name),
        Feed::Counties => {
            let state = state.ok_or_else(|| anyhow!("--state is required for the counties feed"))?;
            EntityKey::county(state, name)
        }
        Feed::Boroughs => EntityKey::borough(
            Borough::parse(name).ok_or_else(|| anyhow!("'{}' is not an NYC borough", name))?,
        ),
    })
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct MapOutput<'a> {
    boundaries_url: &'a str,
    metric: &'a str,
    date: NaiveDate,
    values: Vec<covid_feeds::pipeline::processing::ChoroplethValue>,
}

#[derive(Serialize)]
struct EntitiesOutput {
    entities: Vec<EntityKey>,
    first_date: Option<NaiveDate>,
    latest_date: Option<NaiveDate>,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    logging::init_logging(&cli.log_dir);

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    debug!(?config, "Configuration loaded");
    let normalizer = TimeSeriesNormalizer::from_config(&config)?;

    match cli.command {
        Commands::Rank { feed, metric, date, top, state } => {
            let table = scope_to_state(normalizer.load_layout(feed.into())?, state.as_deref());
            let metric = resolve_metric(feed, metric, &table);
            let as_of = parse_date_arg(date.as_deref(), &table)?;
            let view = rank(&table, &metric, as_of, top);
            if view.is_empty() {
                info!(%metric, %as_of, "No entities to rank");
            }
            print_json(&view)?;
        }
        Commands::Series { feed, metric, name, state } => {
            let entity = entity_for(feed, &name, state.as_deref())?;
            let table = normalizer.load_layout(feed.into())?;
            let metric = resolve_metric(feed, metric, &table);
            let points = series(&table, &entity, &metric);
            if points.is_empty() {
                info!(%metric, %entity, "No data points for entity");
            }
            print_json(&points)?;
        }
        Commands::Map { feed, metric, date, state } => {
            let table = scope_to_state(normalizer.load_layout(feed.into())?, state.as_deref());
            let metric = resolve_metric(feed, metric, &table);
            let as_of = parse_date_arg(date.as_deref(), &table)?;
            print_json(&MapOutput {
                boundaries_url: &config.feeds.county_boundaries_url,
                metric: &metric,
                date: as_of,
                values: choropleth_values(&table, &metric, as_of),
            })?;
        }
        Commands::Entities { feed, state } => {
            let table = scope_to_state(normalizer.load_layout(feed.into())?, state.as_deref());
            let dates = table.dates();
            print_json(&EntitiesOutput {
                entities: table.entities(),
                first_date: dates.first().copied(),
                latest_date: dates.last().copied(),
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use covid_feeds::TidyRecord;

    fn table(metric: &str) -> TidyTable {
        TidyTable::new(vec![TidyRecord {
            entity: EntityKey::borough(Borough::Bronx),
            geography_id: None,
            date: NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(),
            metric: metric.to_string(),
            value: Some(3),
        }])
    }

    #[test]
    fn default_metric_follows_feed() {
        let boroughs = table("case_count");
        assert_eq!(resolve_metric(Feed::Boroughs, None, &boroughs), "case_count");
        assert_eq!(resolve_metric(Feed::States, None, &table("new_cases")), "new_cases");
        assert_eq!(resolve_metric(Feed::Counties, None, &table("new_cases")), "new_cases");
    }

    #[test]
    fn explicit_metric_is_kept() {
        let boroughs = table("case_count");
        let metric = resolve_metric(Feed::Boroughs, Some("death_count".to_string()), &boroughs);
        assert_eq!(metric, "death_count");
    }

    #[test]
    fn empty_series_serializes_as_empty_array() {
        let points = series(&table("case_count"), &EntityKey::state("Ohio"), "case_count");
        assert_eq!(serde_json::to_string(&points).unwrap(), "[]");
    }

    #[test]
    fn cli_accepts_feed_without_metric() {
        let cli = Cli::try_parse_from(["covid_feeds", "rank", "--feed", "boroughs"]).unwrap();
        match cli.command {
            Commands::Rank { metric, top, .. } => {
                assert_eq!(metric, None);
                assert_eq!(top, 5);
            }
            _ => panic!("expected rank"),
        }
    }
}

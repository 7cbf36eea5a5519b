/// Feed locations and column names shared across the pipeline.
/// Keeping them here avoids drift between the feed shapes, config defaults and tests.

// Default remote feeds
pub const US_STATES_URL: &str =
    "https://raw.githubusercontent.com/nytimes/covid-19-data/master/us-states.csv";
pub const US_COUNTIES_URL: &str =
    "https://raw.githubusercontent.com/nytimes/covid-19-data/master/us-counties.csv";
pub const NYC_BOROUGHS_URL: &str =
    "https://raw.githubusercontent.com/nychealth/coronavirus-data/master/boro/boroughs-case-hosp-death.csv";

// Boundary polygons used by the rendering layer, keyed by county FIPS
pub const COUNTY_BOUNDARIES_URL: &str =
    "https://raw.githubusercontent.com/plotly/datasets/master/geojson-counties-fips.json";

// Feed names (used in descriptors, logs and errors)
pub const US_STATES_FEED: &str = "us_states";
pub const US_COUNTIES_FEED: &str = "us_counties";
pub const NYC_BOROUGHS_FEED: &str = "nyc_boroughs";

// NYT long-format columns
pub const DATE_COLUMN: &str = "date";
pub const STATE_COLUMN: &str = "state";
pub const COUNTY_COLUMN: &str = "county";
pub const FIPS_COLUMN: &str = "fips";
pub const CASES_COLUMN: &str = "cases";
pub const DEATHS_COLUMN: &str = "deaths";

// NYC Health wide-format date column
pub const NYC_DATE_COLUMN: &str = "DATE_OF_INTEREST";

/// County name the NYT feed uses for cases not attributed to a county.
pub const UNKNOWN_COUNTY: &str = "Unknown";

/// State every NYC borough belongs to.
pub const NEW_YORK_STATE: &str = "New York";

/// Prefix of derived day-over-day metrics (`cases` -> `new_cases`).
pub const DELTA_PREFIX: &str = "new_";

pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Version label of the built-in borough geography table.
pub const DEFAULT_BOROUGH_TABLE_VERSION: &str = "nyc-fips-2020";

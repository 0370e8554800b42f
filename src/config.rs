use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
}

fn default_max_pool_size() -> u32 {
    5
}

/// How an invocation picks its windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Catch up every missed window since the last snapshot, then the current one.
    #[default]
    Backfill,
    /// Only the current (or explicitly started) window.
    Single,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
    /// Offset from UTC used to align windows to local midnight. Keys and stored timestamps stay UTC.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default)]
    pub mode: RunMode,
    #[serde(default = "default_records_collection")]
    pub records_collection: String,
    #[serde(default = "default_snapshots_collection")]
    pub snapshots_collection: String,
}

fn default_interval_minutes() -> u32 {
    15
}

fn default_records_collection() -> String {
    "requests".into()
}

fn default_snapshots_collection() -> String {
    "service_metrics".into()
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            utc_offset_minutes: 0,
            mode: RunMode::default(),
            records_collection: default_records_collection(),
            snapshots_collection: default_snapshots_collection(),
        }
    }
}

const MINUTES_PER_DAY: u32 = 24 * 60;

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        let agg = &self.aggregation;
        anyhow::ensure!(
            agg.interval_minutes > 0 && MINUTES_PER_DAY % agg.interval_minutes == 0,
            "aggregation.interval_minutes must be a positive divisor of 1440, got {}",
            agg.interval_minutes
        );
        anyhow::ensure!(
            agg.utc_offset_minutes.unsigned_abs() < MINUTES_PER_DAY,
            "aggregation.utc_offset_minutes must be within one day, got {}",
            agg.utc_offset_minutes
        );
        anyhow::ensure!(
            !agg.records_collection.is_empty(),
            "aggregation.records_collection must be non-empty"
        );
        anyhow::ensure!(
            !agg.snapshots_collection.is_empty(),
            "aggregation.snapshots_collection must be non-empty"
        );
        Ok(())
    }
}

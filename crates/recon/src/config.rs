use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::table::TableOptions;

const BEHAVIOUR_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vQ97ey7CNpCkFJDPceEKGTT2g0XeIpvWRIGy8wnc2d95cOZSW9XEXfU94_VkR-TQCfgFNEsjHGxp6a6/pub?gid=0&single=true&output=csv";
const RIDING_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vSxuI2nEgXfel-msRbUwezSxfhroiCJ_Ti_sZB9Ezk1c40fYu_TYdADQv_rXb0Zil3yRAdtysACLp_r/pub?gid=0&single=true&output=csv";
const SPECIES_DIR: &str = "../common/src/main/resources/data/cobblemon/species";
const MAX_HEADER_SKIP: usize = 16;

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// Which attribute block a run maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Behaviour,
    Riding,
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Behaviour => write!(f, "behaviour"),
            Self::Riding => write!(f, "riding"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Inclusive range on a numeric sheet column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DexRange {
    #[serde(default = "default_dex_column")]
    pub column: String,
    pub min: i64,
    pub max: i64,
}

impl DexRange {
    pub fn contains(&self, n: i64) -> bool {
        (self.min..=self.max).contains(&n)
    }
}

impl Default for DexRange {
    fn default() -> Self {
        Self {
            column: default_dex_column(),
            min: 0,
            max: 1110,
        }
    }
}

fn default_dex_column() -> String {
    "No.".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    10
}

fn default_initial_delay_ms() -> u64 {
    1000
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncConfig {
    pub domain: Domain,
    pub source_url: String,
    pub data_dir: PathBuf,
    pub header_skip: usize,
    pub name_column: String,
    pub text_columns: Vec<String>,
    /// Rows with no attribute values remove the existing block.
    pub remove_blank: bool,
    pub fetch: FetchConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dex_range: Option<DexRange>,
}

/// On-disk shape: everything but `domain` falls back to the domain defaults.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    domain: Domain,
    source_url: Option<String>,
    data_dir: Option<PathBuf>,
    header_skip: Option<usize>,
    name_column: Option<String>,
    text_columns: Option<Vec<String>>,
    remove_blank: Option<bool>,
    fetch: Option<FetchConfig>,
    dex_range: Option<DexRange>,
}

impl SyncConfig {
    /// Built-in settings matching the published sheets.
    pub fn for_domain(domain: Domain) -> Self {
        let text_columns = ["Species", "Composite", "Water", "Flying", "Special"]
            .into_iter()
            .map(String::from)
            .collect();

        match domain {
            Domain::Behaviour => Self {
                domain,
                source_url: BEHAVIOUR_SHEET_URL.into(),
                data_dir: PathBuf::from(SPECIES_DIR),
                header_skip: 1,
                name_column: "Pokémon".into(),
                text_columns,
                remove_blank: false,
                fetch: FetchConfig::default(),
                dex_range: Some(DexRange::default()),
            },
            Domain::Riding => Self {
                domain,
                source_url: RIDING_SHEET_URL.into(),
                data_dir: PathBuf::from(SPECIES_DIR),
                header_skip: 2,
                name_column: "Species".into(),
                text_columns,
                remove_blank: true,
                fetch: FetchConfig::default(),
                dex_range: Some(DexRange::default()),
            },
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let file: ConfigFile =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;

        let mut config = Self::for_domain(file.domain);
        if let Some(url) = file.source_url {
            config.source_url = url;
        }
        if let Some(dir) = file.data_dir {
            config.data_dir = dir;
        }
        if let Some(skip) = file.header_skip {
            config.header_skip = skip;
        }
        if let Some(column) = file.name_column {
            config.name_column = column;
        }
        if let Some(columns) = file.text_columns {
            config.text_columns = columns;
        }
        if let Some(remove) = file.remove_blank {
            config.remove_blank = remove;
        }
        if let Some(fetch) = file.fetch {
            config.fetch = fetch;
        }
        if file.dex_range.is_some() {
            config.dex_range = file.dex_range;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigSerialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name_column.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "name_column must not be empty".into(),
            ));
        }

        if self.header_skip > MAX_HEADER_SKIP {
            return Err(ReconError::ConfigValidation(format!(
                "header_skip must be at most {MAX_HEADER_SKIP}, got {}",
                self.header_skip
            )));
        }

        if self.fetch.max_attempts == 0 {
            return Err(ReconError::ConfigValidation(
                "fetch.max_attempts must be at least 1".into(),
            ));
        }

        if self.fetch.timeout_secs == 0 {
            return Err(ReconError::ConfigValidation(
                "fetch.timeout_secs must be at least 1".into(),
            ));
        }

        if let Some(ref range) = self.dex_range {
            if range.min > range.max {
                return Err(ReconError::ConfigValidation(format!(
                    "dex_range.min ({}) is greater than dex_range.max ({})",
                    range.min, range.max
                )));
            }
        }

        Ok(())
    }

    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            header_skip: self.header_skip,
            text_columns: self.text_columns.clone(),
            dex_range: self.dex_range.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

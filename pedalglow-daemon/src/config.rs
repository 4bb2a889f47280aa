use std::fs;
use std::path::Path;

use derive_more::{Display, Error, From};
use log::{debug, info, LevelFilter};
use serde::{Deserialize, Serialize};

use pedalglow_zones_lib::{
    default_zone_table, ChaseTuning, ConfigError, PowerSmoother, ZoneColorMap, ZoneEntry,
    DEFAULT_SMOOTHING_WEIGHT,
};

/// Configurable log level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    #[must_use]
    pub const fn as_level_filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::Off,
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
        }
    }
}

/// Anything that can stop the daemon from starting.
#[derive(Debug, Display, Error, From)]
pub enum DaemonError {
    #[display("config file error: {_0}")]
    Io(std::io::Error),
    #[display("config parse error: {_0}")]
    Parse(serde_json::Error),
    #[display("invalid configuration: {_0}")]
    Config(ConfigError),
    #[display("led strip error: {_0}")]
    Strip(crate::strip::StripError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Rider's functional threshold power in watts; normalizes power
    /// into the zone-percent scale.
    #[serde(default = "default_ftp")]
    pub ftp: f64,
    /// Ordered threshold→color table defining the visual zones.
    #[serde(default = "default_zones")]
    pub zones: Vec<ZoneEntry>,
    /// Number of LEDs on the strip.
    #[serde(default = "default_led_count")]
    pub led_count: usize,
    /// Share of each new sample in the power moving average (0, 1].
    #[serde(default = "default_smoothing_weight")]
    pub smoothing_weight: f64,
    #[serde(default)]
    pub chase: ChaseTuning,
    /// LED brightness (0-255)
    #[serde(default = "default_brightness")]
    pub brightness: u8,
    /// How long to wait before re-polling when no sample has arrived.
    #[serde(default = "default_no_data_poll_ms")]
    pub no_data_poll_ms: u64,
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_ftp() -> f64 {
    250.0
}

fn default_zones() -> Vec<ZoneEntry> {
    default_zone_table().into_vec()
}

const fn default_led_count() -> usize {
    120
}

fn default_smoothing_weight() -> f64 {
    DEFAULT_SMOOTHING_WEIGHT
}

const fn default_brightness() -> u8 {
    255
}

const fn default_no_data_poll_ms() -> u64 {
    5000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ftp: default_ftp(),
            zones: default_zones(),
            led_count: default_led_count(),
            smoothing_weight: default_smoothing_weight(),
            chase: ChaseTuning::default(),
            brightness: default_brightness(),
            no_data_poll_ms: default_no_data_poll_ms(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, DaemonError> {
        debug!("Loading config from {}", path.display());
        let bytes = fs::read(path)?;
        let config: Self = serde_json::from_slice(&bytes)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject malformed configuration before the render loop starts.
    ///
    /// The zone lookup and chase scheduling assume a well-formed table
    /// and a positive LED count, so nothing here is clamped or fixed
    /// up silently.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.zone_map()?;
        PowerSmoother::new(self.smoothing_weight)?;
        self.chase.validate()?;
        if self.led_count == 0 {
            return Err(ConfigError::ZeroLedCount);
        }
        Ok(())
    }

    /// Build the zone map from this config's table and FTP.
    pub fn zone_map(&self) -> Result<ZoneColorMap, ConfigError> {
        ZoneColorMap::new(self.zones.iter().copied(), self.ftp)
    }
}

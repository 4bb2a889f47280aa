use derive_more::{Display, Error};

/// Configuration problems that must be rejected before the render loop
/// starts. The lookup and scheduling code assumes a well-formed zone
/// table and positive counts, so none of these are recoverable at
/// runtime.
#[derive(Debug, Clone, PartialEq, Display, Error)]
pub enum ConfigError {
    /// The zone table has no entries.
    #[display("zone table is empty")]
    EmptyZoneTable,
    /// The first zone must start at 0% so every power value maps to a zone.
    #[display("first zone threshold must be 0, got {threshold}")]
    ZoneFloorNotZero { threshold: f64 },
    /// Zone thresholds must be strictly increasing.
    #[display("zone thresholds must be strictly increasing: {previous} followed by {current}")]
    NonMonotonicZones { previous: f64, current: f64 },
    /// The reference threshold (FTP) normalizes power into a percentage
    /// and must be a positive finite number.
    #[display("reference threshold must be positive and finite, got {value}")]
    InvalidReference { value: f64 },
    /// The smoothing weight is the share of each new sample in the
    /// moving average and must be in (0, 1].
    #[display("smoothing weight must be in (0, 1], got {value}")]
    InvalidSmoothingWeight { value: f64 },
    /// An LED array of length zero cannot display anything.
    #[display("led_count must be at least 1")]
    ZeroLedCount,
    /// Chase tuning periods must be non-zero.
    #[display("chase tuning values must be non-zero (cycle_ms={cycle_ms}, frame_budget_ms={frame_budget_ms})")]
    InvalidChaseTuning { cycle_ms: u32, frame_budget_ms: u32 },
}

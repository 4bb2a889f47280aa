//! Power-zone to color mapping.

use rgb::RGB8;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::ConfigError;

/// Zone tables rarely exceed the classic 7 entries, so keep them inline.
const MAX_INLINE_ZONES: usize = 8;

/// One step of the zone table (serialized in the config file).
///
/// `threshold_percent` is the lower bound of the zone as a percentage
/// of the reference threshold (FTP). Entries are ordered ascending and
/// the first entry starts at 0 so every power value lands in a zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneEntry {
    pub threshold_percent: f64,
    pub color: RGB8,
}

impl ZoneEntry {
    #[must_use]
    pub const fn new(threshold_percent: f64, color: RGB8) -> Self {
        Self {
            threshold_percent,
            color,
        }
    }
}

/// The Zwift-style 7-zone color table.
///
/// Black below 1% (coasting), then white, blue, green, yellow, orange,
/// red as intensity climbs past FTP.
#[must_use]
pub fn default_zone_table() -> SmallVec<[ZoneEntry; MAX_INLINE_ZONES]> {
    smallvec::smallvec![
        ZoneEntry::new(0.0, RGB8::new(0, 0, 0)),
        ZoneEntry::new(1.0, RGB8::new(64, 64, 64)),
        ZoneEntry::new(60.0, RGB8::new(0, 0, 127)),
        ZoneEntry::new(76.0, RGB8::new(0, 127, 0)),
        ZoneEntry::new(90.0, RGB8::new(127, 127, 0)),
        ZoneEntry::new(105.0, RGB8::new(127, 63, 0)),
        ZoneEntry::new(119.0, RGB8::new(255, 0, 0)),
    ]
}

/// Stateless lookup from watts to a zone color.
///
/// Built once at configuration time; [`ZoneColorMap::new`] rejects
/// malformed tables so the per-cycle lookup can assume an ordered,
/// non-empty table with a 0% floor.
#[derive(Debug, Clone)]
pub struct ZoneColorMap {
    entries: SmallVec<[ZoneEntry; MAX_INLINE_ZONES]>,
    reference_threshold: f64,
}

impl ZoneColorMap {
    /// Validate and build a zone map.
    ///
    /// `reference_threshold` is the rider's normalizing power value
    /// (FTP) in watts.
    pub fn new(
        entries: impl IntoIterator<Item = ZoneEntry>,
        reference_threshold: f64,
    ) -> Result<Self, ConfigError> {
        if !(reference_threshold.is_finite() && reference_threshold > 0.0) {
            return Err(ConfigError::InvalidReference {
                value: reference_threshold,
            });
        }

        let entries: SmallVec<[ZoneEntry; MAX_INLINE_ZONES]> = entries.into_iter().collect();
        let Some(first) = entries.first() else {
            return Err(ConfigError::EmptyZoneTable);
        };
        if first.threshold_percent != 0.0 {
            return Err(ConfigError::ZoneFloorNotZero {
                threshold: first.threshold_percent,
            });
        }
        for pair in entries.windows(2) {
            if pair[1].threshold_percent <= pair[0].threshold_percent {
                return Err(ConfigError::NonMonotonicZones {
                    previous: pair[0].threshold_percent,
                    current: pair[1].threshold_percent,
                });
            }
        }

        Ok(Self {
            entries,
            reference_threshold,
        })
    }

    /// Build a map with the default Zwift table.
    pub fn with_default_zones(reference_threshold: f64) -> Result<Self, ConfigError> {
        Self::new(default_zone_table(), reference_threshold)
    }

    /// Color of the highest zone whose threshold is at or below
    /// `power` as a percentage of the reference threshold.
    ///
    /// Pure and total: negative power falls into the lowest zone,
    /// arbitrarily large power into the highest.
    #[must_use]
    pub fn lookup(&self, power: f64) -> RGB8 {
        let percent = 100.0 * power / self.reference_threshold;

        let mut color = self.entries[0].color;
        for entry in &self.entries {
            if percent < entry.threshold_percent {
                break;
            }
            color = entry.color;
        }
        color
    }

    #[must_use]
    pub fn reference_threshold(&self) -> f64 {
        self.reference_threshold
    }

    #[must_use]
    pub fn entries(&self) -> &[ZoneEntry] {
        &self.entries
    }
}

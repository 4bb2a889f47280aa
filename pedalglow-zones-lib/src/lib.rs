//! Power zone rendering logic for PedalGlow
//!
//! This library provides the core logic for turning ANT+-style power
//! broadcast samples into LED colors and animation plans. It is
//! hardware-agnostic and can be tested without a sensor or LED strip.
//!
//! The pipeline, leaf to root:
//!
//! - [`wrap_delta`]: forward distance between wrap-around counter readings
//! - [`PowerFusion`]: reconstructs instantaneous power from the event
//!   count and accumulated power counters
//! - [`PowerSmoother`]: exponential moving average over fused power
//! - [`ZoneColorMap`]: percent-of-FTP to RGB color lookup
//! - [`plan_render`]: cadence to [`RenderPlan`] (solid / paused / chase)

pub use rgb::RGB8;

mod error;
mod fusion;
mod plan;
mod smooth;
mod zones;

pub use error::ConfigError;
pub use fusion::{wrap_delta, FusedReading, PowerFusion, RawSample};
pub use plan::{chase_frame, plan_render, solid_frame, ChaseTuning, RenderPlan, CHASE_PHASES};
pub use smooth::{PowerSmoother, DEFAULT_SMOOTHING_WEIGHT};
pub use zones::{default_zone_table, ZoneColorMap, ZoneEntry};

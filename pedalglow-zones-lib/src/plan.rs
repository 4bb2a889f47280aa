//! Cadence-driven render planning.
//!
//! Every scheduling cycle maps the current zone color and cadence to a
//! fresh [`RenderPlan`]; there is no cross-cycle memory, so mode
//! transitions are re-evaluated from scratch each time.

use std::time::Duration;

use rgb::RGB8;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of phases in the theater-chase pattern (every third LED lit).
pub const CHASE_PHASES: usize = 3;

/// Tuning constants for the chase animation (serialized in the config
/// file).
///
/// `cycle_ms` is the full chase-cycle duration scaled by cadence: a
/// rider at 200 RPM gets 50 ms steps with the 10000 default. The
/// ratio is an approximation of "chase tempo tracks leg speed", not a
/// law; both values are tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaseTuning {
    /// Chase step delay numerator: `step_delay_ms = cycle_ms / cadence`.
    #[serde(default = "default_cycle_ms")]
    pub cycle_ms: u32,
    /// Target wall-clock duration of one scheduling cycle, so the loop
    /// re-polls the sensor at a roughly constant rate at any cadence.
    #[serde(default = "default_frame_budget_ms")]
    pub frame_budget_ms: u32,
}

const fn default_cycle_ms() -> u32 {
    10_000
}

const fn default_frame_budget_ms() -> u32 {
    1_000
}

impl Default for ChaseTuning {
    fn default() -> Self {
        Self {
            cycle_ms: default_cycle_ms(),
            frame_budget_ms: default_frame_budget_ms(),
        }
    }
}

impl ChaseTuning {
    /// Reject zero periods before the render loop starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_ms == 0 || self.frame_budget_ms == 0 {
            return Err(ConfigError::InvalidChaseTuning {
                cycle_ms: self.cycle_ms,
                frame_budget_ms: self.frame_budget_ms,
            });
        }
        Ok(())
    }
}

/// What the render loop should do with the strip this cycle.
///
/// Derived fresh every cycle by [`plan_render`]; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPlan {
    /// Fill the whole array with the color once, then hold it for
    /// `hold`. Chosen when the sensor reports no cadence at all.
    Solid { color: RGB8, hold: Duration },
    /// Not pedaling: hold the current output and idle for `hold`.
    Paused { hold: Duration },
    /// Theater chase at a cadence-derived tempo: each of the three
    /// phases is held for `step_delay`, the full rotation repeated
    /// `repeats` times.
    Chase {
        color: RGB8,
        step_delay: Duration,
        repeats: u32,
    },
}

/// Select the render mode for this cycle from cadence alone.
///
/// Priority: absent cadence → [`RenderPlan::Solid`], zero cadence →
/// [`RenderPlan::Paused`], positive cadence → [`RenderPlan::Chase`]
/// with `step_delay = cycle_ms / cadence` and
/// `repeats = floor(frame_budget_ms / step_delay)`. Every mode holds
/// for roughly the frame budget, so the loop re-polls the sensor at a
/// constant rate whether the rider is pedaling or not.
#[must_use]
pub fn plan_render(color: RGB8, cadence: Option<u8>, tuning: &ChaseTuning) -> RenderPlan {
    match cadence {
        None => RenderPlan::Solid {
            color,
            hold: Duration::from_millis(u64::from(tuning.frame_budget_ms)),
        },
        Some(0) => RenderPlan::Paused {
            hold: Duration::from_millis(u64::from(tuning.frame_budget_ms)),
        },
        Some(cadence) => {
            // Tuning is validated at configuration time; the max(1)
            // mirrors that guard so the division is always defined.
            let cycle_ms = tuning.cycle_ms.max(1);
            let step_delay_ms = f64::from(cycle_ms) / f64::from(cadence);
            // floor(frame_budget / (cycle / cadence)) in exact integer
            // arithmetic, widened so extreme tunings cannot overflow.
            let repeats = u64::from(cadence) * u64::from(tuning.frame_budget_ms)
                / u64::from(cycle_ms);
            let repeats = u32::try_from(repeats).unwrap_or(u32::MAX);
            RenderPlan::Chase {
                color,
                step_delay: Duration::from_secs_f64(step_delay_ms / 1000.0),
                repeats,
            }
        }
    }
}

/// Full-array fill frame.
#[must_use]
pub fn solid_frame(total_leds: usize, color: RGB8) -> Vec<RGB8> {
    vec![color; total_leds]
}

/// One phase of the theater-chase pattern: every third LED lit in the
/// color, starting at `phase` (0..3), the rest dark.
#[must_use]
pub fn chase_frame(total_leds: usize, phase: usize, color: RGB8) -> Vec<RGB8> {
    debug_assert!(phase < CHASE_PHASES, "chase phase {phase} out of range");
    (0..total_leds)
        .map(|i| {
            if i % CHASE_PHASES == phase {
                color
            } else {
                RGB8::default()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const AMBER: RGB8 = RGB8::new(127, 63, 0);

    #[test]
    fn test_absent_cadence_renders_solid_held_for_budget() {
        let plan = plan_render(AMBER, None, &ChaseTuning::default());
        assert_eq!(
            plan,
            RenderPlan::Solid {
                color: AMBER,
                hold: Duration::from_millis(1000)
            }
        );
    }

    #[test]
    fn test_zero_cadence_pauses_for_frame_budget() {
        let plan = plan_render(AMBER, Some(0), &ChaseTuning::default());
        assert_eq!(
            plan,
            RenderPlan::Paused {
                hold: Duration::from_millis(1000)
            }
        );
    }

    #[test]
    fn test_chase_tempo_at_reference_cadence() {
        // 200 RPM with the default tuning gives a 50 ms step,
        // repeated 20 times to fill the 1 s budget.
        let plan = plan_render(AMBER, Some(200), &ChaseTuning::default());
        let RenderPlan::Chase {
            color,
            step_delay,
            repeats,
        } = plan
        else {
            panic!("expected chase, got {plan:?}");
        };
        assert_eq!(color, AMBER);
        assert_eq!(step_delay, Duration::from_millis(50));
        assert_eq!(repeats, 20);
    }

    #[test]
    fn test_chase_repeats_match_budget_division() {
        let tuning = ChaseTuning::default();
        let plan = plan_render(AMBER, Some(90), &tuning);
        let RenderPlan::Chase {
            step_delay,
            repeats,
            ..
        } = plan
        else {
            panic!("expected chase, got {plan:?}");
        };

        // repeats == floor(frame_budget / (cycle / cadence)); the tiny
        // epsilon absorbs nanosecond rounding in the Duration.
        let step_delay_ms = step_delay.as_secs_f64() * 1000.0;
        let expected = (f64::from(tuning.frame_budget_ms) / step_delay_ms + 1e-6).floor();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let expected = expected as u32;
        assert_eq!(repeats, expected);
        assert_eq!(repeats, 9);
    }

    #[test]
    fn test_slower_cadence_means_fewer_longer_steps() {
        let tuning = ChaseTuning::default();
        let mut last_repeats = u32::MAX;
        let mut last_delay = Duration::ZERO;
        for cadence in [180u8, 120, 90, 60, 30] {
            let RenderPlan::Chase {
                step_delay,
                repeats,
                ..
            } = plan_render(AMBER, Some(cadence), &tuning)
            else {
                panic!("expected chase for cadence {cadence}");
            };
            assert!(repeats < last_repeats, "repeats must shrink as cadence drops");
            assert!(step_delay > last_delay, "steps must lengthen as cadence drops");
            last_repeats = repeats;
            last_delay = step_delay;
        }
    }

    #[test]
    fn test_very_low_cadence_yields_zero_repeats() {
        // 5 RPM: a single step (2 s) already exceeds the budget.
        let RenderPlan::Chase { repeats, .. } =
            plan_render(AMBER, Some(5), &ChaseTuning::default())
        else {
            panic!("expected chase");
        };
        assert_eq!(repeats, 0);
    }

    #[test]
    fn test_extreme_tuning_does_not_overflow_repeats() {
        // 255 * 20_000_000 exceeds u32; the widened arithmetic must
        // still produce the exact quotient.
        let tuning = ChaseTuning {
            cycle_ms: 10_000,
            frame_budget_ms: 20_000_000,
        };
        let RenderPlan::Chase { repeats, .. } = plan_render(AMBER, Some(255), &tuning) else {
            panic!("expected chase");
        };
        assert_eq!(repeats, 510_000);

        // Past u32::MAX the repeat count saturates instead of wrapping.
        let tuning = ChaseTuning {
            cycle_ms: 1,
            frame_budget_ms: u32::MAX,
        };
        let RenderPlan::Chase { repeats, .. } = plan_render(AMBER, Some(255), &tuning) else {
            panic!("expected chase");
        };
        assert_eq!(repeats, u32::MAX);
    }

    #[test]
    fn test_tuning_validation() {
        assert!(ChaseTuning::default().validate().is_ok());
        assert!(ChaseTuning {
            cycle_ms: 0,
            frame_budget_ms: 1000
        }
        .validate()
        .is_err());
        assert!(ChaseTuning {
            cycle_ms: 10_000,
            frame_budget_ms: 0
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_solid_frame() {
        let frame = solid_frame(4, AMBER);
        assert_eq!(frame, vec![AMBER; 4]);
    }

    #[test]
    fn test_chase_frame_lights_every_third_led() {
        let frame = chase_frame(7, 1, AMBER);
        let dark = RGB8::default();
        assert_eq!(frame, vec![dark, AMBER, dark, dark, AMBER, dark, dark]);
    }

    #[test]
    fn test_chase_phases_cover_every_led_exactly_once() {
        let total = 10;
        let mut lit_count = vec![0u32; total];
        for phase in 0..CHASE_PHASES {
            for (i, led) in chase_frame(total, phase, AMBER).iter().enumerate() {
                if *led == AMBER {
                    lit_count[i] += 1;
                }
            }
        }
        assert!(lit_count.iter().all(|&n| n == 1));
    }
}

//! The sampling-and-render loop.
//!
//! One logical thread alternates between polling the fused reading and
//! driving the strip. A scheduling cycle is: snapshot → smooth → zone
//! color → plan → execute. Plan execution may block for the whole
//! chase (hundreds of milliseconds); shutdown is only honored between
//! cycles, never mid-frame, so the array is always either fully
//! rendered or blanked, never torn.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, info};

use pedalglow_zones_lib::{
    chase_frame, plan_render, ChaseTuning, PowerSmoother, RenderPlan, ZoneColorMap, CHASE_PHASES,
};

use crate::meter::PowerMeter;
use crate::strip::{LedStrip, StripError};

/// Per-loop settings derived from the validated config.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Wait between polls while no sample has arrived yet.
    pub no_data_poll: Duration,
    pub tuning: ChaseTuning,
}

/// Drive the strip according to one render plan.
///
/// Sleeping is injected so tests can record delays instead of waiting
/// them out.
pub fn execute_plan(
    strip: &mut dyn LedStrip,
    plan: &RenderPlan,
    sleep: &mut dyn FnMut(Duration),
) -> Result<(), StripError> {
    match *plan {
        RenderPlan::Solid { color, hold } => {
            strip.fill(color);
            strip.show()?;
            // Hold the frame so solid mode paces the loop like the
            // other modes instead of re-rendering back to back.
            sleep(hold);
            Ok(())
        }
        RenderPlan::Paused { hold } => {
            // Hold whatever is currently displayed.
            sleep(hold);
            Ok(())
        }
        RenderPlan::Chase {
            color,
            step_delay,
            repeats,
        } => {
            // Always rotate through the three phases at least once so
            // the display cannot freeze at very low cadence.
            for _ in 0..repeats.max(1) {
                for phase in 0..CHASE_PHASES {
                    let frame = chase_frame(strip.len(), phase, color);
                    for (i, led) in frame.iter().enumerate() {
                        strip.set_pixel(i, *led);
                    }
                    strip.show()?;
                    sleep(step_delay);
                }
            }
            Ok(())
        }
    }
}

/// Run scheduling cycles until `shutdown` is set, then blank the strip.
///
/// While no sample has ever arrived the loop waits and re-polls
/// instead of rendering a fabricated value; the display holds its
/// last state.
pub fn render_loop(
    meter: &PowerMeter,
    strip: &mut dyn LedStrip,
    zones: &ZoneColorMap,
    smoother: &mut PowerSmoother,
    settings: &RenderSettings,
    shutdown: &AtomicBool,
    sleep: &mut dyn FnMut(Duration),
) -> Result<(), StripError> {
    while !shutdown.load(Ordering::Relaxed) {
        let reading = meter.snapshot();
        let Some(power) = reading.power else {
            debug!("No power sample yet, re-polling");
            sleep(settings.no_data_poll);
            continue;
        };

        let average = smoother.update(power);
        let color = zones.lookup(average);
        info!(
            "Power: {power:.0}W (avg {average:.0}W) cadence {:?}",
            reading.cadence
        );

        let plan = plan_render(color, reading.cadence, &settings.tuning);
        execute_plan(strip, &plan, sleep)?;
    }

    info!("Render loop stopping, blanking strip");
    strip.clear()
}

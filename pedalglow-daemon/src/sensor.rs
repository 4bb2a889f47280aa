//! Simulated ANT+ power sensor.
//!
//! Emits Standard Power-Only pages at broadcast rate with genuinely
//! wrapping counters, so the whole pipeline (page decode, wrap
//! bridging, duplicate absorption) runs exactly as it would against
//! real hardware. The power profile ramps up, holds, ramps down and
//! rests, and the stream periodically retransmits the previous page
//! and omits the cadence byte to exercise the fusion edge cases.

use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::info;

use pedalglow_antplus_lib::{encode_power_page, PowerBroadcast};

const MIN_POWER: f64 = 100.0;
const MAX_POWER: f64 = 300.0;
const RAMP_SECS: f64 = 4.0;
const HOLD_SECS: f64 = 3.0;
const REST_SECS: f64 = 3.0;
const CYCLE_SECS: f64 = 2.0 * (RAMP_SECS + HOLD_SECS) + REST_SECS;

/// Every Nth broadcast is a retransmission of the previous page.
const DUPLICATE_EVERY: u32 = 10;
/// Every Nth broadcast omits the cadence byte.
const OMIT_CADENCE_EVERY: u32 = 16;

/// Rider output at `elapsed` seconds into the simulation.
///
/// Ramp to max, hold, ramp back down, hold at min, then rest with the
/// pedals stopped (zero power, zero cadence) before the next cycle.
fn profile(elapsed: f64) -> (f64, u8) {
    let phase = elapsed % CYCLE_SECS;

    if phase >= CYCLE_SECS - REST_SECS {
        return (0.0, 0);
    }

    let power = if phase < RAMP_SECS {
        MIN_POWER + (MAX_POWER - MIN_POWER) * (phase / RAMP_SECS)
    } else if phase < RAMP_SECS + HOLD_SECS {
        MAX_POWER
    } else if phase < 2.0 * RAMP_SECS + HOLD_SECS {
        let ramp_phase = phase - RAMP_SECS - HOLD_SECS;
        MAX_POWER - (MAX_POWER - MIN_POWER) * (ramp_phase / RAMP_SECS)
    } else {
        MIN_POWER
    };

    // Cadence climbs with effort: 80 RPM at the bottom, 90 at the top.
    let cadence = 80.0 + 10.0 * (power - MIN_POWER) / (MAX_POWER - MIN_POWER);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let cadence = cadence.round() as u8;
    (power, cadence)
}

#[derive(Debug, Clone)]
pub struct SimulatorOptions {
    /// Stop broadcasting (and drop the channel) after this long.
    /// `None` runs until the receiver goes away.
    pub duration: Option<Duration>,
    /// Time between broadcasts; real sensors send at roughly 4 Hz.
    pub broadcast_interval: Duration,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            duration: None,
            broadcast_interval: Duration::from_millis(250),
        }
    }
}

/// Run the simulated sensor on its own thread.
///
/// Dropping the sender on exit is the shutdown signal for the
/// ingestion task downstream.
pub fn start_simulated_sensor(
    payload_tx: Sender<[u8; 8]>,
    options: SimulatorOptions,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        info!("Simulated power sensor started");
        let start = Instant::now();
        let mut event_count: u8 = 0;
        let mut accumulated_power: u16 = 0;
        let mut last_payload: Option<[u8; 8]> = None;
        let mut broadcasts: u32 = 0;

        loop {
            if let Some(duration) = options.duration {
                if start.elapsed() >= duration {
                    break;
                }
            }
            broadcasts += 1;

            // Occasional retransmission of the previous page, exactly
            // as a lossy broadcast transport would deliver it.
            let payload = if broadcasts % DUPLICATE_EVERY == 0 && last_payload.is_some() {
                last_payload.unwrap_or_default()
            } else {
                let (power, cadence) = profile(start.elapsed().as_secs_f64());
                event_count = event_count.wrapping_add(1);
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let watts = power.round() as u16;
                accumulated_power = accumulated_power.wrapping_add(watts);

                let cadence = if broadcasts % OMIT_CADENCE_EVERY == 0 {
                    None
                } else {
                    Some(cadence)
                };
                let payload = encode_power_page(&PowerBroadcast {
                    update_event_count: event_count,
                    pedal_power: None,
                    cadence,
                    accumulated_power,
                    instantaneous_power: Some(watts),
                });
                last_payload = Some(payload);
                payload
            };

            if payload_tx.send(payload).is_err() {
                // Receiver gone, nothing left to broadcast to.
                break;
            }
            std::thread::sleep(options.broadcast_interval);
        }
        info!("Simulated power sensor stopping");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pedalglow_antplus_lib::decode_power_page;
    use std::sync::mpsc;

    #[test]
    fn test_profile_ramp_hold_ramp() {
        assert_eq!(profile(0.0).0, 100.0);
        assert_eq!(profile(2.0).0, 200.0);
        assert_eq!(profile(4.0).0, 300.0);
        assert_eq!(profile(6.0).0, 300.0);
        assert_eq!(profile(9.0).0, 200.0);
        assert_eq!(profile(12.0).0, 100.0);
    }

    #[test]
    fn test_profile_rest_phase_stops_pedaling() {
        let (power, cadence) = profile(CYCLE_SECS - 1.0);
        assert_eq!(power, 0.0);
        assert_eq!(cadence, 0);
    }

    #[test]
    fn test_profile_cadence_tracks_effort() {
        assert_eq!(profile(0.0).1, 80);
        assert_eq!(profile(4.0).1, 90);
    }

    #[test]
    fn test_simulator_streams_decodable_pages_and_disconnects() {
        let (tx, rx) = mpsc::channel();
        let handle = start_simulated_sensor(
            tx,
            SimulatorOptions {
                duration: Some(Duration::from_millis(40)),
                broadcast_interval: Duration::from_millis(1),
            },
        );

        // Channel disconnects once the duration elapses.
        let payloads: Vec<[u8; 8]> = rx.iter().collect();
        handle.join().unwrap();
        assert!(payloads.len() >= 10);

        let pages: Vec<_> = payloads
            .iter()
            .map(|p| decode_power_page(p).expect("simulator must emit power pages"))
            .collect();

        // Event counts move forward by at most one per broadcast, and
        // duplicates repeat the previous count.
        let mut duplicates = 0;
        for pair in pages.windows(2) {
            let delta = pair[1].update_event_count.wrapping_sub(pair[0].update_event_count);
            assert!(delta <= 1, "event count jumped by {delta}");
            if delta == 0 {
                duplicates += 1;
            }
        }
        assert!(duplicates >= 1, "expected retransmitted pages in the stream");
    }
}

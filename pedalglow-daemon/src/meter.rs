//! Shared power meter state and the sensor ingestion task.
//!
//! Broadcast payloads arrive on an mpsc channel from the transport
//! (real driver or the built-in simulator). The ingestion thread
//! decodes them and folds them into a mutex-guarded [`PowerFusion`],
//! so the render loop always observes the (power, cadence) pair
//! consistently: never power from one sample and cadence from
//! another.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use log::{debug, info};

use pedalglow_antplus_lib::decode_power_page;
use pedalglow_zones_lib::{FusedReading, PowerFusion, RawSample};

/// Thread-safe holder of the current fused reading.
#[derive(Debug, Default)]
pub struct PowerMeter {
    fusion: Mutex<PowerFusion>,
}

impl PowerMeter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one sample in. Called from the ingestion thread.
    pub fn ingest(&self, sample: RawSample) {
        self.fusion.lock().unwrap().ingest(sample);
    }

    /// Atomic snapshot of the current reading. Called from the render
    /// loop.
    #[must_use]
    pub fn snapshot(&self) -> FusedReading {
        self.fusion.lock().unwrap().snapshot()
    }
}

/// Run the ingestion task: decode broadcast payloads and feed the
/// meter until the transport drops its end of the channel.
///
/// Channel disconnect is the shutdown signal: `shutdown` is raised for
/// the render loop, and the sensor channel is released by letting the
/// receiver drop when this task returns.
pub fn start_ingest_task(
    meter: Arc<PowerMeter>,
    payload_rx: Receiver<[u8; 8]>,
    shutdown: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for payload in &payload_rx {
            let Some(broadcast) = decode_power_page(&payload) else {
                debug!("Ignoring non-power data page 0x{:02X}", payload[0]);
                continue;
            };
            debug!(
                "Broadcast: event={} acc={} inst={:?} cadence={:?}",
                broadcast.update_event_count,
                broadcast.accumulated_power,
                broadcast.instantaneous_power,
                broadcast.cadence
            );
            meter.ingest(broadcast.to_sample());
        }
        info!("Sensor channel closed, ingestion stopping");
        shutdown.store(true, Ordering::Relaxed);
    })
}

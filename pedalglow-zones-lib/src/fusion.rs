//! Power/cadence fusion from wrap-around broadcast counters.
//!
//! ANT+-style power sensors broadcast a small event counter (mod 256)
//! and an accumulated power counter (mod 65536). Individual broadcasts
//! may be dropped or duplicated, so instantaneous power is reconstructed
//! from counter deltas rather than taken from single messages: the
//! accumulated energy since the last observed sample is spread across
//! the elapsed event count.

/// Forward distance between two modular counter readings.
///
/// Computes `(current - previous) mod modulus`, which is correct even
/// when the counter wrapped (`current < previous`). Both readings must
/// be in `[0, modulus)`.
#[must_use]
pub fn wrap_delta(current: u32, previous: u32, modulus: u32) -> u32 {
    debug_assert!(modulus > 0, "wrap_delta: modulus must be positive");
    debug_assert!(
        current < modulus && previous < modulus,
        "wrap_delta: readings {current}/{previous} outside [0, {modulus})"
    );
    // Widen so `current + modulus` cannot overflow for large moduli.
    let delta = (u64::from(current) + u64::from(modulus) - u64::from(previous))
        % u64::from(modulus);
    // delta < modulus <= u32::MAX, so the narrowing cast is lossless.
    #[allow(clippy::cast_possible_truncation)]
    let delta = delta as u32;
    delta
}

/// One broadcast observation from the power sensor.
///
/// Consumed immediately by [`PowerFusion::ingest`]; never stored.
/// `instantaneous_power` and `cadence` may be absent on any message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    /// Update event count, wraps mod 256.
    pub event_count: u8,
    /// Accumulated power in watts, wraps mod 65536.
    pub accumulated_power: u16,
    /// Instantaneous power in watts, if the sensor reported it.
    pub instantaneous_power: Option<u16>,
    /// Pedaling cadence in RPM, if the sensor reported it.
    pub cadence: Option<u8>,
}

/// Best current estimate of power and cadence.
///
/// `power == None` means no usable sample has arrived yet and the
/// caller should wait rather than render a fabricated value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FusedReading {
    pub power: Option<f64>,
    pub cadence: Option<u8>,
}

/// The counter pair from the last sample that carried new information.
#[derive(Debug, Clone, Copy)]
struct CounterPair {
    event_count: u8,
    accumulated_power: u16,
}

/// Stateful accumulator turning successive [`RawSample`]s into a
/// [`FusedReading`].
///
/// The first sample seeds power directly from `instantaneous_power`
/// (no delta is possible yet). Every later sample with a non-zero
/// event delta yields `accumulated_delta / event_delta`, the average
/// watts per event since the last observed sample, which bridges any
/// missed broadcasts in between.
#[derive(Debug, Default)]
pub struct PowerFusion {
    previous: Option<CounterPair>,
    reading: FusedReading,
}

impl PowerFusion {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one broadcast sample into the current reading.
    pub fn ingest(&mut self, sample: RawSample) {
        // An absent cadence must not clobber the last known value.
        if let Some(cadence) = sample.cadence {
            self.reading.cadence = Some(cadence);
        }

        let Some(previous) = self.previous else {
            self.reading.power = sample.instantaneous_power.map(f64::from);
            self.previous = Some(CounterPair {
                event_count: sample.event_count,
                accumulated_power: sample.accumulated_power,
            });
            return;
        };

        let events = wrap_delta(
            u32::from(sample.event_count),
            u32::from(previous.event_count),
            256,
        );
        if events == 0 {
            // Duplicate or retransmitted message: no new energy
            // information. Stored counters stay put so a later real
            // sample still spans the full gap.
            return;
        }

        let total = wrap_delta(
            u32::from(sample.accumulated_power),
            u32::from(previous.accumulated_power),
            65536,
        );
        self.reading.power = Some(f64::from(total) / f64::from(events));
        self.previous = Some(CounterPair {
            event_count: sample.event_count,
            accumulated_power: sample.accumulated_power,
        });
    }

    /// Snapshot of the current (power, cadence) pair.
    #[must_use]
    pub fn snapshot(&self) -> FusedReading {
        self.reading
    }
}

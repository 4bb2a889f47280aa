//! ANT+ Bicycle Power broadcast page decoding.
//!
//! A bicycle power sensor broadcasts fixed 8-byte data pages with no
//! delivery guarantee. This library decodes the Standard Power-Only
//! page (0x10) into a [`PowerBroadcast`] and converts it to the core
//! [`RawSample`] consumed by the fusion pipeline. Transport concerns
//! (channel setup, radio timing) stay with the driver that delivers
//! the payloads.

use pedalglow_zones_lib::RawSample;

/// Data page number of the Standard Power-Only page.
pub const POWER_ONLY_PAGE: u8 = 0x10;

/// Marker for an invalid/unreported single-byte field.
pub const INVALID_U8: u8 = 0xFF;

/// Marker for an invalid/unreported instantaneous power field.
pub const INVALID_U16: u16 = 0xFFFF;

/// Decoded Standard Power-Only broadcast page.
///
/// Page layout (all multi-byte fields little-endian):
///
/// ```text
/// byte 0: data page number (0x10)
/// byte 1: update event count (wraps mod 256)
/// byte 2: pedal power balance (0xFF = not used)
/// byte 3: instantaneous cadence, RPM (0xFF = invalid)
/// byte 4-5: accumulated power, watts (wraps mod 65536)
/// byte 6-7: instantaneous power, watts (0xFFFF = invalid)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerBroadcast {
    pub update_event_count: u8,
    /// Pedal power balance percentage, if the sensor reports it.
    pub pedal_power: Option<u8>,
    /// Instantaneous cadence in RPM, if the sensor reports it.
    pub cadence: Option<u8>,
    pub accumulated_power: u16,
    /// Instantaneous power in watts, if the sensor reports it.
    pub instantaneous_power: Option<u16>,
}

impl PowerBroadcast {
    /// Convert to the fusion pipeline's input sample.
    #[must_use]
    pub fn to_sample(&self) -> RawSample {
        RawSample {
            event_count: self.update_event_count,
            accumulated_power: self.accumulated_power,
            instantaneous_power: self.instantaneous_power,
            cadence: self.cadence,
        }
    }
}

/// Decode a broadcast payload, returning `None` for any page other
/// than Standard Power-Only (calibration, torque, and manufacturer
/// pages carry no data this pipeline uses).
#[must_use]
pub fn decode_power_page(payload: &[u8; 8]) -> Option<PowerBroadcast> {
    if payload[0] != POWER_ONLY_PAGE {
        return None;
    }

    let pedal_power = match payload[2] {
        INVALID_U8 => None,
        value => Some(value),
    };
    let cadence = match payload[3] {
        INVALID_U8 => None,
        value => Some(value),
    };
    let accumulated_power = u16::from_le_bytes([payload[4], payload[5]]);
    let instantaneous_power = match u16::from_le_bytes([payload[6], payload[7]]) {
        INVALID_U16 => None,
        value => Some(value),
    };

    Some(PowerBroadcast {
        update_event_count: payload[1],
        pedal_power,
        cadence,
        accumulated_power,
        instantaneous_power,
    })
}

/// Encode a broadcast back into the page layout.
///
/// Used by test rigs and the daemon's simulated sensor so synthetic
/// samples travel through the same decoder as real ones.
#[must_use]
pub fn encode_power_page(broadcast: &PowerBroadcast) -> [u8; 8] {
    let acc = broadcast.accumulated_power.to_le_bytes();
    let inst = broadcast.instantaneous_power.unwrap_or(INVALID_U16).to_le_bytes();
    [
        POWER_ONLY_PAGE,
        broadcast.update_event_count,
        broadcast.pedal_power.unwrap_or(INVALID_U8),
        broadcast.cadence.unwrap_or(INVALID_U8),
        acc[0],
        acc[1],
        inst[0],
        inst[1],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_golden_payload() {
        // Event 5, 50/50 balance, 85 RPM, 1000 W accumulated, 200 W.
        let payload = [0x10, 0x05, 0x32, 0x55, 0xE8, 0x03, 0xC8, 0x00];
        let page = decode_power_page(&payload).unwrap();

        assert_eq!(page.update_event_count, 5);
        assert_eq!(page.pedal_power, Some(0x32));
        assert_eq!(page.cadence, Some(85));
        assert_eq!(page.accumulated_power, 1000);
        assert_eq!(page.instantaneous_power, Some(200));
    }

    #[test]
    fn test_invalid_markers_decode_as_absent() {
        let payload = [0x10, 0x09, 0xFF, 0xFF, 0x10, 0x27, 0xFF, 0xFF];
        let page = decode_power_page(&payload).unwrap();

        assert_eq!(page.pedal_power, None);
        assert_eq!(page.cadence, None);
        assert_eq!(page.accumulated_power, 10000);
        assert_eq!(page.instantaneous_power, None);
    }

    #[test]
    fn test_other_pages_are_ignored() {
        // Calibration request page.
        let payload = [0x01, 0xAA, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(decode_power_page(&payload), None);
    }

    #[test]
    fn test_encode_decode_agree() {
        let broadcast = PowerBroadcast {
            update_event_count: 250,
            pedal_power: None,
            cadence: Some(92),
            accumulated_power: 65500,
            instantaneous_power: Some(312),
        };
        let decoded = decode_power_page(&encode_power_page(&broadcast)).unwrap();
        assert_eq!(decoded, broadcast);
    }

    #[test]
    fn test_to_sample_carries_counters_and_optionals() {
        let payload = [0x10, 0x07, 0xFF, 0x5A, 0x20, 0x03, 0x96, 0x00];
        let sample = decode_power_page(&payload).unwrap().to_sample();

        assert_eq!(sample.event_count, 7);
        assert_eq!(sample.accumulated_power, 800);
        assert_eq!(sample.instantaneous_power, Some(150));
        assert_eq!(sample.cadence, Some(90));
    }
}

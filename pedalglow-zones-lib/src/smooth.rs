use crate::error::ConfigError;

/// Default share of each new sample in the moving average.
///
/// 0.25 is equivalent to `(sample + 3 * average) / 4`: a single-pole
/// low-pass with a time constant of about four broadcast intervals,
/// enough to damp broadcast-to-broadcast jitter while staying
/// responsive within a few seconds.
pub const DEFAULT_SMOOTHING_WEIGHT: f64 = 0.25;

/// Fixed-weight exponential moving average over the fused power value.
///
/// No bounds checking: a physically impossible negative power passes
/// through unchanged, this layer only smooths.
#[derive(Debug, Clone)]
pub struct PowerSmoother {
    average: f64,
    new_sample_weight: f64,
}

impl Default for PowerSmoother {
    fn default() -> Self {
        Self {
            average: 0.0,
            new_sample_weight: DEFAULT_SMOOTHING_WEIGHT,
        }
    }
}

impl PowerSmoother {
    /// Create a smoother with a custom new-sample weight in `(0, 1]`.
    ///
    /// Higher weights respond faster; lower weights reject more jitter.
    /// A weight of 1 disables smoothing entirely.
    pub fn new(new_sample_weight: f64) -> Result<Self, ConfigError> {
        if !(new_sample_weight > 0.0 && new_sample_weight <= 1.0) {
            return Err(ConfigError::InvalidSmoothingWeight {
                value: new_sample_weight,
            });
        }
        Ok(Self {
            average: 0.0,
            new_sample_weight,
        })
    }

    /// Blend one sample into the running average and return the result.
    pub fn update(&mut self, sample_power: f64) -> f64 {
        self.average = sample_power * self.new_sample_weight
            + self.average * (1.0 - self.new_sample_weight);
        self.average
    }

    #[must_use]
    pub fn average(&self) -> f64 {
        self.average
    }
}

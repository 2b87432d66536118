//! Moving-average and deadband conditioning of the raw analog reading.

use crate::config::{ConfigError, FilterConfig, FilterStages, MAX_FILTER_WINDOW};

/// Two-stage conditioning of one raw sample per tick.
///
/// Stage 1 keeps the last `window_size` raw samples in a fixed ring and a
/// running sum; its output is `sum / window_size`. Stage 2 (optional) holds a
/// stable value and only replaces it when the average moves by at least
/// `deadband_threshold`.
///
/// The ring starts zero-filled, so the average ramps up over the first
/// `window_size` ticks.
///
/// # Example
///
/// ```
/// use turntable_core::{FilterConfig, SampleFilter};
///
/// let mut filter = SampleFilter::new(FilterConfig::TWO_STAGE).unwrap();
/// for _ in 0..8 {
///     filter.filter(1000);
/// }
/// assert_eq!(filter.filter(1002), 1000); // average 1000, inside the deadband
/// ```
#[derive(Debug, Clone)]
pub struct SampleFilter {
    config: FilterConfig,
    window: [u16; MAX_FILTER_WINDOW],
    cursor: usize,
    sum: u32,
    stable: Option<u16>,
}

impl SampleFilter {
    /// Create a filter, rejecting a zero or oversized window.
    pub fn new(config: FilterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            window: [0; MAX_FILTER_WINDOW],
            cursor: 0,
            sum: 0,
            stable: None,
        })
    }

    /// Feed one raw sample and return the conditioned value.
    pub fn filter(&mut self, raw: u16) -> u16 {
        let average = self.push_average(raw);

        match self.config.stages {
            FilterStages::MovingAverageOnly => average,
            FilterStages::MovingAverageThenDeadband => self.apply_deadband(average),
        }
    }

    /// Last value handed out by the deadband stage, if any.
    #[inline]
    #[must_use]
    pub fn stable(&self) -> Option<u16> {
        self.stable
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    fn push_average(&mut self, raw: u16) -> u16 {
        let slot = &mut self.window[self.cursor];
        self.sum -= u32::from(*slot);
        *slot = raw;
        self.sum += u32::from(raw);
        self.cursor = (self.cursor + 1) % self.config.window_size;

        // window_size >= 1 and every slot is a u16, so the quotient fits.
        (self.sum / self.config.window_size as u32) as u16
    }

    fn apply_deadband(&mut self, average: u16) -> u16 {
        match self.stable {
            // First sample seeds the stable value unfiltered.
            None => {
                self.stable = Some(average);
                average
            }
            Some(stable) if average.abs_diff(stable) < self.config.deadband_threshold => stable,
            Some(_) => {
                self.stable = Some(average);
                average
            }
        }
    }
}

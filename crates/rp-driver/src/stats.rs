//! Runtime measurements
//!
//! Frame times and audio buffer occupancy are sampled into fixed-size
//! rings. The statistics derived from them are advisory: they are logged
//! on teardown and can be used to suggest a better refresh rate, but are
//! never applied automatically.

use std::collections::VecDeque;

/// Frame time samples kept for monitor refresh estimation
pub const MEASURE_FRAME_TIME_SAMPLES_COUNT: usize = 2048;

/// Audio buffer free-space samples kept for saturation statistics
pub const AUDIO_BUFFER_FREE_SAMPLES_COUNT: usize = 8192;

/// Bounded ring of measurements, the oldest sample is evicted first
#[derive(Debug, Clone)]
pub struct SampleRing<T> {
    samples: VecDeque<T>,
    capacity: usize,
    total: u64,
}

impl<T: Copy> SampleRing<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    pub fn push(&mut self, sample: T) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        self.total += 1;
    }

    /// Samples currently held, oldest first
    pub fn iter(&self) -> impl Iterator<Item = T> + Clone + '_ {
        self.samples.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples pushed since the last clear, including evicted ones
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.total = 0;
    }
}

fn mean_and_stddev(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let count = values.clone().count() as f64;
    let mean = values.clone().sum::<f64>() / count;
    let variance = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / count;
    (mean, variance.sqrt())
}

/// Monitor refresh rate estimated from frame times
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorFps {
    /// Estimated refresh rate in Hz
    pub refresh_rate: f64,
    /// Standard deviation of the frame time relative to its mean
    pub deviation: f64,
    pub sample_points: usize,
}

impl MonitorFps {
    /// Estimate from frame times in microseconds, `None` below two samples.
    pub fn from_frame_times(ring: &SampleRing<u64>) -> Option<Self> {
        if ring.len() < 2 {
            return None;
        }
        let (mean, stddev) = mean_and_stddev(ring.iter().map(|t| t as f64));
        if mean <= 0.0 {
            return None;
        }
        Some(Self {
            refresh_rate: 1_000_000.0 / mean,
            deviation: stddev / mean,
            sample_points: ring.len(),
        })
    }
}

/// Audio buffer occupancy derived from free-space samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioBufferStats {
    /// Average fill level, 0.0 empty to 1.0 full
    pub saturation: f64,
    /// Standard deviation of the free space relative to the buffer size
    pub deviation: f64,
    /// Fraction of samples with at least 3/4 of the buffer free
    pub near_underrun: f64,
    /// Fraction of samples with at most 1/4 of the buffer free
    pub near_blocking: f64,
}

impl AudioBufferStats {
    /// Compute from free-space samples, `None` below three samples.
    ///
    /// The first sample is skipped; it is taken before the backend had a
    /// chance to fill its buffer.
    pub fn from_free_samples(ring: &SampleRing<usize>, buffer_size: usize) -> Option<Self> {
        if ring.len() < 3 || buffer_size == 0 {
            return None;
        }
        let size = buffer_size as f64;
        let free = ring.iter().skip(1).map(|s| s as f64);
        let count = (ring.len() - 1) as f64;
        let (mean, stddev) = mean_and_stddev(free.clone());

        let low_water = (buffer_size * 3 / 4) as f64;
        let high_water = (buffer_size / 4) as f64;
        let mut low_water_count = 0usize;
        let mut high_water_count = 0usize;
        for sample in free {
            if sample >= low_water {
                low_water_count += 1;
            } else if sample <= high_water {
                high_water_count += 1;
            }
        }

        Some(Self {
            saturation: 1.0 - mean / size,
            deviation: stddev / size,
            near_underrun: low_water_count as f64 / count,
            near_blocking: high_water_count as f64 / count,
        })
    }
}

use std::collections::VecDeque;

/// Number of readings the slope is computed over.
pub(crate) const WINDOW_CAPACITY: usize = 4;

/// Slope magnitude (BPM per sample) past which the heart rate counts as moving.
const TREND_THRESHOLD: f64 = 0.65;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trend {
    Rising,
    Falling,
    Flat,
}

impl Trend {
    pub(crate) fn from_slope(slope: f64) -> Self {
        if slope > TREND_THRESHOLD {
            Trend::Rising
        } else if slope < -TREND_THRESHOLD {
            Trend::Falling
        } else {
            Trend::Flat
        }
    }

    /// Chatbox glyph for the trend, `None` when flat.
    pub(crate) fn glyph(self) -> Option<&'static str> {
        match self {
            Trend::Rising => Some("⤴️"),
            Trend::Falling => Some("⤵️"),
            Trend::Flat => None,
        }
    }
}

/// Sliding window over the most recent heart rate readings.
#[derive(Debug, Default)]
pub(crate) struct TrendTracker {
    window: VecDeque<f64>,
}

impl TrendTracker {
    pub(crate) fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(WINDOW_CAPACITY),
        }
    }

    pub(crate) fn observe(&mut self, sample: f64) {
        if self.window.len() == WINDOW_CAPACITY {
            self.window.pop_front();
        }
        self.window.push_back(sample);
    }

    #[cfg(test)]
    pub(crate) fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.window.iter().copied()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.window.len()
    }

    /// Least-squares slope of value against sample index.
    ///
    /// The x mean is taken as `n / 2` rather than `(n - 1) / 2`. The chatbox
    /// thresholds were tuned against this exact formula, so it stays.
    pub(crate) fn slope(&self) -> Option<f64> {
        let count = self.window.len();
        if count < 2 {
            return None;
        }

        let avg_x = count as f64 / 2.0;
        let avg_y = self.window.iter().sum::<f64>() / count as f64;

        let (sum_xy, sum_xx) = self
            .window
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(xy, xx), (i, &y)| {
                let dx = i as f64 - avg_x;
                (xy + dx * (y - avg_y), xx + dx * dx)
            });

        Some(sum_xy / sum_xx)
    }

    pub(crate) fn trend(&self) -> Trend {
        self.slope().map_or(Trend::Flat, Trend::from_slope)
    }
}

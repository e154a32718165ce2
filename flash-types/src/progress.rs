// SPDX-License-Identifier: GPL-3.0-only

use std::time::{Duration, Instant};

const RATE_SMOOTHING: f64 = 0.3;

/// Tracks download percentage and estimates the time remaining.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    percent: u8,
    last_sample: Option<(Instant, u8)>,
    /// Smoothed rate in percent per second.
    rate: Option<f64>,
}

impl ProgressTracker {
    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn fraction(&self) -> f32 {
        f32::from(self.percent) / 100.0
    }

    pub fn update(&mut self, percent: u8, now: Instant) {
        let percent = percent.min(100);

        match self.last_sample {
            // A new download (progress went backwards) restarts the estimate.
            Some((_, last)) if percent < last => self.rate = None,
            Some((at, last)) if percent > last => {
                let elapsed = now.saturating_duration_since(at).as_secs_f64();
                if elapsed > 0.0 {
                    let sample = f64::from(percent - last) / elapsed;
                    self.rate = Some(ewma_update(self.rate, sample, RATE_SMOOTHING));
                }
            }
            // Unchanged percentage: keep the old sample so the next delta spans the stall.
            Some(_) => {
                self.percent = percent;
                return;
            }
            None => {}
        }

        self.percent = percent;
        self.last_sample = Some((now, percent));
    }

    pub fn eta(&self) -> Option<Duration> {
        compute_eta_from_rate(self.percent, self.rate?)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub fn compute_eta_from_rate(percent: u8, rate_percent_per_sec: f64) -> Option<Duration> {
    if percent >= 100 {
        return Some(Duration::from_secs(0));
    }

    if rate_percent_per_sec <= 0.0 || !rate_percent_per_sec.is_finite() {
        return None;
    }

    let remaining = f64::from(100 - percent);
    Some(Duration::from_secs_f64(remaining / rate_percent_per_sec))
}

pub fn ewma_update(previous: Option<f64>, sample: f64, alpha: f64) -> f64 {
    let alpha = alpha.clamp(0.0, 1.0);
    match previous {
        Some(prev) => alpha * sample + (1.0 - alpha) * prev,
        None => sample,
    }
}

pub fn format_eta(eta: Option<Duration>) -> String {
    let Some(eta) = eta else {
        return "--:--:--".to_string();
    };

    let total_secs = eta.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eta_follows_rate() {
        let start = Instant::now();
        let mut tracker = ProgressTracker::default();
        assert!(tracker.eta().is_none());

        tracker.update(10, start);
        tracker.update(20, start + Duration::from_secs(10));

        // 1%/s with 80% to go.
        assert_eq!(tracker.eta(), Some(Duration::from_secs(80)));
        assert_eq!(tracker.percent(), 20);
    }

    #[test]
    fn progress_going_backwards_restarts_estimate() {
        let start = Instant::now();
        let mut tracker = ProgressTracker::default();
        tracker.update(50, start);
        tracker.update(60, start + Duration::from_secs(1));
        tracker.update(5, start + Duration::from_secs(2));
        assert!(tracker.eta().is_none());
        assert_eq!(tracker.percent(), 5);
    }

    #[test]
    fn complete_and_degenerate_rates() {
        assert_eq!(compute_eta_from_rate(100, 0.0), Some(Duration::ZERO));
        assert!(compute_eta_from_rate(40, 0.0).is_none());
        assert_eq!(ewma_update(None, 4.0, 0.3), 4.0);
        assert_eq!(format_eta(None), "--:--:--");
        assert_eq!(format_eta(Some(Duration::from_secs(3725))), "01:02:05");
    }
}

use std::collections::HashMap;
use std::time::Instant;

use crate::shared::constants::PROGRESS_LOG_INTERVAL;

/// Observer for render-loop events: progress, per-stage timings, metrics
/// and status messages.
///
/// Keeps the executor free of any particular output channel. The CLI logs
/// through the `log` facade; tests use [`NullPipelineLogger`].
pub trait PipelineLogger: Send {
    /// `current` frames done out of `total` (0 when the container does not
    /// report a frame count).
    fn progress(&mut self, current: usize, total: usize);

    /// Time spent in a named stage for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// End-of-run report. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logs throttled progress through `log::info!` and keeps per-stage timings
/// for a summary at the end of the run.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    frames_done: usize,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            frames_done: 0,
        }
    }

    /// Whether a progress line would be emitted for `current` of `total`.
    pub fn should_report(&self, current: usize, total: usize) -> bool {
        current > 0 && (current % self.throttle_frames == 0 || current == total)
    }

    /// Formatted summary, or `None` when nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.frames_done;
        let mut lines = vec![format!(
            "Depth render summary ({frames} frames, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:10}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  ({pct:4.1}%)"
            ));
        }

        let mut metric_names: Vec<_> = self.metrics.keys().collect();
        metric_names.sort();
        for name in metric_names {
            lines.push(format!("  {name}: avg {:.1}", mean(&self.metrics[name])));
        }

        if frames > 0 && elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.2} fps"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }

    pub fn frames_done(&self) -> usize {
        self.frames_done
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(PROGRESS_LOG_INTERVAL)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames_done = self.frames_done.max(current);
        if !self.should_report(current, total) {
            return;
        }
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Processed {current}/{total} frames ({pct:.1}%)");
        } else {
            log::info!("Processed {current} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_accepts_everything() {
        let mut logger = NullPipelineLogger;
        logger.progress(1, 10);
        logger.timing("infer", 5.0);
        logger.metric("depth_range", 3.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("infer", 20.0);
        logger.timing("infer", 30.0);
        logger.timing("render", 5.0);

        assert_eq!(logger.timings_for("infer").unwrap(), &[20.0, 30.0]);
        assert_eq!(logger.timings_for("render").unwrap(), &[5.0]);
        assert!(logger.timings_for("write").is_none());
    }

    #[test]
    fn test_metric_average_in_summary() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.metric("depth_range", 3.0);
        logger.metric("depth_range", 4.0);

        assert_relative_eq!(mean(logger.metrics_for("depth_range").unwrap()), 3.5);
        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("depth_range: avg 3.5"));
    }

    #[test]
    fn test_summary_lists_stages_and_throughput() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.progress(10, 10);
        logger.timing("infer", 20.0);
        logger.timing("smooth", 1.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Depth render summary (10 frames"));
        assert!(summary.contains("infer"));
        assert!(summary.contains("smooth"));
        assert!(summary.contains("fps"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let logger = StdoutPipelineLogger::new(10);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_progress_throttle() {
        let logger = StdoutPipelineLogger::new(50);
        assert!(!logger.should_report(0, 120));
        assert!(!logger.should_report(49, 120));
        assert!(logger.should_report(50, 120));
        assert!(logger.should_report(100, 120));
        assert!(logger.should_report(120, 120));
        // Unknown totals still report on the interval.
        assert!(logger.should_report(50, 0));
        assert!(!logger.should_report(51, 0));
    }

    #[test]
    fn test_progress_tracks_frames_done() {
        let mut logger = StdoutPipelineLogger::new(10);
        for i in 1..=23 {
            logger.progress(i, 0);
        }
        assert_eq!(logger.frames_done(), 23);
    }

    #[test]
    fn test_default_throttle_is_progress_interval() {
        let logger = StdoutPipelineLogger::default();
        assert_eq!(logger.throttle_frames, PROGRESS_LOG_INTERVAL);
    }
}

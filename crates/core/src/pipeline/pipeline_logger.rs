use std::collections::BTreeMap;
use std::time::Instant;

/// Observer for run-level events of the heatmap pipeline.
///
/// Keeps the use case free of any particular output mechanism; the CLI
/// reports through `log`, tests discard everything.
pub trait PipelineLogger: Send {
    /// Report tick progress. `total` is 0 when the stream length is unknown.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one tick.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a per-tick sample such as a person count.
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

#[derive(Debug, Default)]
struct Samples {
    count: usize,
    sum: f64,
    max: f64,
}

impl Samples {
    fn push(&mut self, value: f64) {
        if self.count == 0 || value > self.max {
            self.max = value;
        }
        self.count += 1;
        self.sum += value;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// `log`-backed logger for the CLI. Progress lines are throttled to every
/// `throttle_ticks` ticks; timings and metrics are folded into running
/// aggregates and printed by [`summary`](PipelineLogger::summary).
pub struct StdoutPipelineLogger {
    throttle_ticks: usize,
    timings: BTreeMap<String, Samples>,
    metrics: BTreeMap<String, Samples>,
    start_time: Instant,
    ticks_seen: usize,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_ticks: usize) -> Self {
        Self {
            throttle_ticks: throttle_ticks.max(1),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time: Instant::now(),
            ticks_seen: 0,
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let ticks = self.ticks_seen;
        let mut lines = vec![format!(
            "Heatmap run summary ({ticks} ticks, {elapsed_s:.1}s):"
        )];

        for (stage, samples) in &self.timings {
            lines.push(format!(
                "  {stage:10}: avg {:6.2}ms  max {:7.2}ms  total {:8.0}ms  ({} calls)",
                samples.mean(),
                samples.max,
                samples.sum,
                samples.count
            ));
        }
        for (name, samples) in &self.metrics {
            lines.push(format!(
                "  {name}: avg {:.1}  peak {:.0}",
                samples.mean(),
                samples.max
            ));
        }
        if ticks > 0 && elapsed_s > 0.0 {
            lines.push(format!("  Throughput: {:.1} ticks/s", ticks as f64 / elapsed_s));
        }

        Some(lines.join("\n"))
    }

    pub fn timing_count(&self, stage: &str) -> usize {
        self.timings.get(stage).map_or(0, |s| s.count)
    }

    pub fn timing_mean(&self, stage: &str) -> Option<f64> {
        self.timings.get(stage).map(Samples::mean)
    }

    pub fn metric_mean(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).map(Samples::mean)
    }

    pub fn metric_peak(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).map(|s| s.max)
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.ticks_seen = current;
        if current % self.throttle_ticks != 0 && current != total {
            return;
        }
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Processed {current}/{total} ticks ({pct:.1}%)");
        } else {
            log::info!("Processed {current} ticks");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
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

// Collaborator interfaces for side effects the core triggers but never reads
// back from: metric sinks and audio-style feedback.

use std::io::Write;

use hoverseek_shared::*;

/// Fire-and-forget sink for named scalar metrics.
pub trait TelemetrySink {
    fn record(&mut self, metric: Metric, value: f32);
}

/// Sink that discards all metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn record(&mut self, _metric: Metric, _value: f32) {}
}

/// Keeps every record in memory, in arrival order.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub records: Vec<(Metric, f32)>,
}

impl MemorySink {
    pub fn values(&self, metric: Metric) -> Vec<f32> {
        self.records
            .iter()
            .filter(|(m, _)| *m == metric)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn last(&self, metric: Metric) -> Option<f32> {
        self.records
            .iter()
            .rev()
            .find(|(m, _)| *m == metric)
            .map(|(_, v)| *v)
    }
}

impl TelemetrySink for MemorySink {
    fn record(&mut self, metric: Metric, value: f32) {
        self.records.push((metric, value));
    }
}

/// Emits each record as a `tracing` event at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record(&mut self, metric: Metric, value: f32) {
        tracing::trace!(metric = metric.name(), value, "telemetry");
    }
}

/// One JSON object per line: `{"metric":"Reward","value":-0.001}`.
///
/// Write failures are logged once and further records are dropped.
pub struct JsonlSink<W: Write> {
    writer: W,
    failed: bool,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TelemetrySink for JsonlSink<W> {
    fn record(&mut self, metric: Metric, value: f32) {
        if self.failed {
            return;
        }
        let line = serde_json::json!({ "metric": metric.name(), "value": value });
        if let Err(e) = writeln!(self.writer, "{}", line) {
            tracing::warn!("telemetry write failed, dropping further records: {e}");
            self.failed = true;
        }
    }
}

impl<S: TelemetrySink + ?Sized> TelemetrySink for &mut S {
    fn record(&mut self, metric: Metric, value: f32) {
        (**self).record(metric, value);
    }
}

impl<S: TelemetrySink + ?Sized> TelemetrySink for Box<S> {
    fn record(&mut self, metric: Metric, value: f32) {
        (**self).record(metric, value);
    }
}

/// Audio-style cues. Nothing flows back into control or reward.
pub trait Feedback {
    fn goal_reached(&mut self, _index: usize) {}
    fn hum_pitch(&mut self, _pitch: f32) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Feedback for Silent {}

/// Drone hum pitch for a given speed.
pub fn hum_pitch(speed: f32) -> f32 {
    let t = (speed / HUM_FULL_SPEED).clamp(0.0, 1.0);
    HUM_PITCH_MIN + t * (HUM_PITCH_MAX - HUM_PITCH_MIN)
}

use hoverseek_shared::*;
use serde::Serialize;

/// Population statistics of one metric across episodes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MetricSummary {
    pub mean: f32,
    /// Population standard deviation.
    pub std: f32,
    pub min: f32,
    pub max: f32,
    pub count: usize,
}

impl MetricSummary {
    pub fn from_values(values: &[f32]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f32;
        let mean = values.iter().sum::<f32>() / n;
        let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n;
        Self {
            mean,
            std: var.max(0.0).sqrt(),
            min: values.iter().copied().fold(f32::INFINITY, f32::min),
            max: values.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            count: values.len(),
        }
    }
}

/// Aggregate view over a batch of episode summaries.
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeAnalysis {
    pub episodes: usize,
    pub reward: MetricSummary,
    pub length: MetricSummary,
    pub targets_found: MetricSummary,
    pub path_efficiency: MetricSummary,
    /// Percentage of episodes with at least one ground contact.
    pub collision_rate: f32,
    /// Percentage of episodes that met the goal quota.
    pub success_rate: f32,
}

pub fn analyze(summaries: &[EpisodeSummary], quota: u32) -> EpisodeAnalysis {
    let metric = |f: fn(&EpisodeSummary) -> f32| {
        let values: Vec<f32> = summaries.iter().map(f).collect();
        MetricSummary::from_values(&values)
    };
    let rate = |hits: usize| {
        if summaries.is_empty() {
            0.0
        } else {
            hits as f32 / summaries.len() as f32 * 100.0
        }
    };

    let collisions = summaries.iter().filter(|s| s.ground_collision).count();
    let successes = summaries.iter().filter(|s| s.succeeded(quota)).count();

    EpisodeAnalysis {
        episodes: summaries.len(),
        reward: metric(|s| s.cumulative_reward),
        length: metric(|s| s.length as f32),
        targets_found: metric(|s| s.goals_reached as f32),
        path_efficiency: metric(|s| s.path_efficiency),
        collision_rate: rate(collisions),
        success_rate: rate(successes),
    }
}

/// The last `fraction` of episodes (at least one when any exist).
pub fn final_portion(summaries: &[EpisodeSummary], fraction: f32) -> &[EpisodeSummary] {
    if summaries.is_empty() {
        return summaries;
    }
    let take = (summaries.len() as f32 * fraction.clamp(0.0, 1.0)).ceil() as usize;
    let take = take.clamp(1, summaries.len());
    &summaries[summaries.len() - take..]
}

/// Early, mid and late thirds of a run, in order.
pub fn training_phases(summaries: &[EpisodeSummary]) -> [&[EpisodeSummary]; 3] {
    let third = summaries.len() / 3;
    let (early, rest) = summaries.split_at(third);
    let (mid, late) = rest.split_at(third);
    [early, mid, late]
}

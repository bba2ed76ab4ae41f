use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use hoverseek_shared::*;
use hoverseek_sim::analyzer::{analyze, EpisodeAnalysis};
use hoverseek_sim::{run_episode, NoopSink};

use crate::resolve_policy;

/// A sweepable controller or body parameter with its range and accessor.
struct SweepParam {
    name: &'static str,
    min: f64,
    default: f64,
    max: f64,
    /// Apply this parameter value to a SimConfig.
    apply: fn(&mut SimConfig, f64),
}

const SWEEP_PARAMS: &[SweepParam] = &[
    SweepParam {
        name: "move_step",
        min: 1.0,
        default: MOVE_STEP as f64,
        max: 5.0,
        apply: |c, v| c.controller.move_step = v as f32,
    },
    SweepParam {
        name: "lateral_force",
        min: 2.0,
        default: LATERAL_FORCE as f64,
        max: 10.0,
        apply: |c, v| c.controller.lateral_force = v as f32,
    },
    SweepParam {
        name: "ascend_d",
        min: 1.0,
        default: ASCEND_D as f64,
        max: 10.0,
        apply: |c, v| c.controller.ascend_d = v as f32,
    },
    SweepParam {
        name: "descend_d",
        min: 2.5,
        default: DESCEND_D as f64,
        max: 20.0,
        apply: |c, v| c.controller.descend_d = v as f32,
    },
    SweepParam {
        name: "hover_d",
        min: 5.0,
        default: HOVER_D as f64,
        max: 40.0,
        apply: |c, v| c.controller.hover_d = v as f32,
    },
    SweepParam {
        name: "torque_kp",
        min: 0.1,
        default: TORQUE_KP as f64,
        max: 1.0,
        apply: |c, v| c.controller.torque_kp = v as f32,
    },
    SweepParam {
        name: "linear_damping",
        min: 0.0,
        default: 0.0,
        max: 2.0,
        apply: |c, v| c.body.linear_damping = v as f32,
    },
    SweepParam {
        name: "mass",
        min: 0.5,
        default: AGENT_MASS as f64,
        max: 2.0,
        apply: |c, v| c.body.mass = v as f32,
    },
];

/// Aggregated metrics for one parameter value across all seeds.
struct AggResult {
    value: f64,
    analysis: EpisodeAnalysis,
}

impl AggResult {
    /// Mean goals reached; the quantity the sweep maximizes.
    fn score(&self) -> f32 {
        self.analysis.targets_found.mean
    }
}

fn eval_config(config: &SimConfig, policy: &str, seeds: u32) -> EpisodeAnalysis {
    let summaries: Vec<EpisodeSummary> = (0..seeds as u64)
        .into_par_iter()
        .filter_map(|seed| {
            let mut p = resolve_policy(policy);
            match run_episode(config, seed, p.as_mut(), NoopSink) {
                Ok(replay) => Some(replay.summary),
                Err(e) => {
                    tracing::warn!(seed, "skipping episode: {e}");
                    None
                }
            }
        })
        .collect();
    analyze(&summaries, config.episode.goal_quota)
}

fn sweep_param(param: &SweepParam, steps: usize, seeds: u32, policy: &str) -> Vec<AggResult> {
    // Generate linearly-spaced values
    let values: Vec<f64> = if steps == 1 {
        vec![param.default]
    } else {
        (0..steps)
            .map(|i| param.min + (param.max - param.min) * i as f64 / (steps - 1) as f64)
            .collect()
    };

    values
        .iter()
        .map(|&value| {
            let mut config = SimConfig::default();
            (param.apply)(&mut config, value);
            let analysis = eval_config(&config, policy, seeds);
            tracing::debug!(param = param.name, value, goals = analysis.targets_found.mean, "swept");
            AggResult { value, analysis }
        })
        .collect()
}

fn best(results: &[AggResult]) -> Option<&AggResult> {
    results
        .iter()
        .max_by(|a, b| a.score().total_cmp(&b.score()))
}

fn print_param_table(param_name: &str, results: &[AggResult]) {
    println!("\n--- {} ---", param_name);
    println!(
        "{:>10} {:>8} {:>8} {:>9} {:>8} {:>8}",
        "value", "goals", "success%", "reward", "path_eff", "ground%"
    );
    println!("{:-<56}", "");

    let best_value = best(results).map(|r| r.value);
    for r in results {
        let marker = if Some(r.value) == best_value { " *" } else { "" };
        let a = &r.analysis;
        println!(
            "{:>10.3} {:>8.2} {:>8.1} {:>9.3} {:>8.3} {:>8.1}{}",
            r.value,
            a.targets_found.mean,
            a.success_rate,
            a.reward.mean,
            a.path_efficiency.mean,
            a.collision_rate,
            marker,
        );
    }
}

fn write_csv(path: &Path, all_results: &[(&str, Vec<AggResult>)]) -> std::io::Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(
        file,
        "parameter,value,targets_found,success_rate,reward,path_efficiency,collision_rate,episodes"
    )?;

    for (param_name, results) in all_results {
        for r in results {
            let a = &r.analysis;
            writeln!(
                file,
                "{},{:.4},{:.3},{:.2},{:.4},{:.4},{:.2},{}",
                param_name,
                r.value,
                a.targets_found.mean,
                a.success_rate,
                a.reward.mean,
                a.path_efficiency.mean,
                a.collision_rate,
                a.episodes,
            )?;
        }
    }
    file.flush()
}

pub fn cmd_sweep(
    param_filter: Option<&str>,
    steps: usize,
    seeds: u32,
    policy: &str,
    output: Option<PathBuf>,
) {
    // Fail early on an unknown policy name.
    resolve_policy(policy);

    let params_to_sweep: Vec<&SweepParam> = if let Some(name) = param_filter {
        match SWEEP_PARAMS.iter().find(|p| p.name == name) {
            Some(p) => vec![p],
            None => {
                eprintln!(
                    "Unknown parameter '{}'. Available: {}",
                    name,
                    SWEEP_PARAMS
                        .iter()
                        .map(|p| p.name)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                std::process::exit(1);
            }
        }
    } else {
        SWEEP_PARAMS.iter().collect()
    };

    println!(
        "=== Controller Sweep ===\nPolicy: {} | Steps: {} | Seeds: {}\nParams: {} | Total episodes: {}",
        policy,
        steps,
        seeds,
        params_to_sweep.len(),
        params_to_sweep.len() * steps * seeds as usize,
    );

    let start = std::time::Instant::now();
    let mut all_results: Vec<(&str, Vec<AggResult>)> = Vec::new();
    let mut best_per_param: Vec<(&str, f64, f32)> = Vec::new();

    for param in &params_to_sweep {
        let results = sweep_param(param, steps, seeds, policy);
        if let Some(b) = best(&results) {
            best_per_param.push((param.name, b.value, b.score()));
        }
        print_param_table(param.name, &results);
        all_results.push((param.name, results));
    }

    println!("\n=== Summary ({:.1}s) ===", start.elapsed().as_secs_f32());
    println!("{:<20} {:>12} {:>10}", "Parameter", "Best Value", "Goals");
    println!("{:-<44}", "");
    for (name, value, score) in &best_per_param {
        println!("{:<20} {:>12.3} {:>10.2}", name, value, score);
    }

    if let Some(path) = &output {
        match write_csv(path, &all_results) {
            Ok(()) => println!("\nCSV written to {}", path.display()),
            Err(e) => eprintln!("\nFailed to write CSV: {}", e),
        }
    }
}

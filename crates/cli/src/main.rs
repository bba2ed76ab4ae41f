mod sweep;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use hoverseek_shared::*;
use hoverseek_sim::analyzer::{analyze, final_portion, training_phases, EpisodeAnalysis};
use hoverseek_sim::{
    policy_by_name, run_episode, run_episodes, JsonlSink, NoopSink, Policy, TelemetrySink,
    TracingSink, POLICY_NAMES,
};

#[derive(Parser)]
#[command(name = "hoverseek", about = "Hover drone goal-seeking simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one or more consecutive episodes with a policy
    Run {
        /// Policy name (do_nothing, seeker)
        #[arg(long, default_value = "seeker")]
        policy: String,

        /// Random seed for layouts
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Number of consecutive episodes (at least 1)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        episodes: u32,

        /// JSON config file; defaults apply to missing fields
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output path for the replay JSON (single episode) or summaries JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write per-tick telemetry as JSON lines to this path
        #[arg(long)]
        telemetry: Option<PathBuf>,
    },

    /// Run one episode per seed in parallel
    Batch {
        #[arg(long, default_value = "seeker")]
        policy: String,

        /// Number of seeds, starting at --start-seed
        #[arg(long, default_value_t = 100)]
        seeds: u32,

        #[arg(long, default_value_t = 0)]
        start_seed: u64,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Output path for the summaries JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Sweep controller and reward parameters
    Sweep {
        /// Parameter to sweep (omit to sweep all)
        #[arg(long)]
        param: Option<String>,

        /// Number of values per parameter
        #[arg(long, default_value_t = 5)]
        steps: usize,

        /// Seeds per value
        #[arg(long, default_value_t = 20)]
        seeds: u32,

        #[arg(long, default_value = "seeker")]
        policy: String,

        /// CSV output path
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print statistics for a summaries JSON file
    Summarize {
        input: PathBuf,

        /// Fraction of final episodes reported separately
        #[arg(long, default_value_t = 0.2)]
        final_fraction: f32,

        /// Goal quota used for the success rate
        #[arg(long, default_value_t = GOAL_QUOTA)]
        quota: u32,
    },
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{}", msg);
    std::process::exit(1);
}

/// Resolve a policy name, exiting with the valid names on a miss.
pub(crate) fn resolve_policy(name: &str) -> Box<dyn Policy> {
    policy_by_name(name).unwrap_or_else(|| {
        fail(format!(
            "Unknown policy '{}'. Valid options: {}",
            name,
            POLICY_NAMES.join(", ")
        ))
    })
}

fn load_config(path: Option<&Path>) -> SimConfig {
    match path {
        Some(path) => SimConfig::load(path)
            .unwrap_or_else(|e| fail(format!("Failed to load {}: {}", path.display(), e))),
        None => SimConfig::default(),
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T, what: &str) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => match std::fs::write(path, json) {
            Ok(()) => println!("\n{} written to {}", what, path.display()),
            Err(e) => eprintln!("\nFailed to write {}: {}", what, e),
        },
        Err(e) => eprintln!("\nFailed to serialize {}: {}", what, e),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            policy,
            seed,
            episodes,
            config,
            output,
            telemetry,
        } => {
            let config = load_config(config.as_deref());
            match telemetry {
                Some(path) => {
                    let file = File::create(&path).unwrap_or_else(|e| {
                        fail(format!("Failed to create {}: {}", path.display(), e))
                    });
                    let sink = JsonlSink::new(BufWriter::new(file));
                    cmd_run(&config, &policy, seed, episodes, output.as_deref(), sink);
                }
                None => cmd_run(&config, &policy, seed, episodes, output.as_deref(), TracingSink),
            }
        }

        Commands::Batch {
            policy,
            seeds,
            start_seed,
            config,
            output,
        } => {
            let config = load_config(config.as_deref());
            cmd_batch(&config, &policy, seeds, start_seed, output.as_deref());
        }

        Commands::Sweep {
            param,
            steps,
            seeds,
            policy,
            output,
        } => sweep::cmd_sweep(param.as_deref(), steps, seeds, &policy, output),

        Commands::Summarize {
            input,
            final_fraction,
            quota,
        } => cmd_summarize(&input, final_fraction, quota),
    }
}

fn cmd_run<S: TelemetrySink>(
    config: &SimConfig,
    policy_name: &str,
    seed: u64,
    episodes: u32,
    output: Option<&Path>,
    telemetry: S,
) {
    let mut policy = resolve_policy(policy_name);
    println!(
        "Running {} episode(s) with {} (seed={})",
        episodes,
        policy.name(),
        seed
    );

    if episodes == 1 {
        let replay = run_episode(config, seed, policy.as_mut(), telemetry)
            .unwrap_or_else(|e| fail(format!("Invalid config: {}", e)));
        let s = &replay.summary;

        println!();
        println!("=== Episode Result ===");
        println!("Reason:          {:?}", s.reason);
        println!("Length:          {} ticks ({:.1}s)", s.length, s.length as f32 / TICK_RATE as f32);
        println!("Goals reached:   {}/{}", s.goals_reached, config.episode.goal_quota);
        println!("Reward:          {:.3}", s.cumulative_reward);
        println!("Path efficiency: {:.3} ({:.2} / {:.2})", s.path_efficiency, s.shortest_path, s.distance_traveled);
        println!("Ground contact:  {}", s.ground_collision);

        if let Some(path) = output {
            write_json(path, &replay, "Replay");
        }
        return;
    }

    let summaries = run_episodes(config, seed, episodes, policy.as_mut(), telemetry)
        .unwrap_or_else(|e| fail(format!("Invalid config: {}", e)));
    print_episode_table(&summaries);
    print_analysis("All episodes", &analyze(&summaries, config.episode.goal_quota));

    if let Some(path) = output {
        write_json(path, &summaries, "Summaries");
    }
}

fn cmd_batch(config: &SimConfig, policy_name: &str, seeds: u32, start_seed: u64, output: Option<&Path>) {
    // Fail on a bad name before spinning up workers.
    resolve_policy(policy_name);
    println!(
        "Batch: {} seeds from {} with {}",
        seeds, start_seed, policy_name
    );

    let start = std::time::Instant::now();
    let results: Vec<Result<EpisodeSummary, ConfigError>> = (0..seeds as u64)
        .into_par_iter()
        .map(|i| {
            let mut policy = resolve_policy(policy_name);
            run_episode(config, start_seed + i, policy.as_mut(), NoopSink).map(|r| r.summary)
        })
        .collect();

    let mut summaries = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(s) => summaries.push(s),
            Err(e) => fail(format!("Invalid config: {}", e)),
        }
    }

    println!("Finished in {:.1}s", start.elapsed().as_secs_f32());
    print_analysis("All seeds", &analyze(&summaries, config.episode.goal_quota));

    if let Some(path) = output {
        write_json(path, &summaries, "Summaries");
    }
}

fn cmd_summarize(input: &Path, fraction: f32, quota: u32) {
    let json = std::fs::read_to_string(input)
        .unwrap_or_else(|e| fail(format!("Failed to read {}: {}", input.display(), e)));
    let summaries: Vec<EpisodeSummary> = serde_json::from_str(&json)
        .unwrap_or_else(|e| fail(format!("Failed to parse {}: {}", input.display(), e)));

    if summaries.is_empty() {
        fail("No episodes in input.");
    }

    print_analysis("All episodes", &analyze(&summaries, quota));

    let [early, mid, late] = training_phases(&summaries);
    println!();
    println!("=== Progression ===");
    println!("{:<8} {:>6} {:>10} {:>8} {:>10}", "phase", "eps", "reward", "targets", "path_eff");
    println!("{:-<46}", "");
    for (name, part) in [("early", early), ("mid", mid), ("late", late)] {
        let a = analyze(part, quota);
        println!(
            "{:<8} {:>6} {:>10.3} {:>8.2} {:>10.3}",
            name, a.episodes, a.reward.mean, a.targets_found.mean, a.path_efficiency.mean
        );
    }

    let tail = final_portion(&summaries, fraction);
    print_analysis(
        &format!("Final {:.0}%", fraction * 100.0),
        &analyze(tail, quota),
    );
}

fn print_episode_table(summaries: &[EpisodeSummary]) {
    println!();
    println!(
        "{:>4} {:>6} {:>6} {:>9} {:>8} {:>7} {:<12}",
        "ep", "len", "goals", "reward", "path_eff", "ground", "reason"
    );
    println!("{:-<60}", "");
    for s in summaries {
        println!(
            "{:>4} {:>6} {:>6} {:>9.3} {:>8.3} {:>7} {:<12}",
            s.episode,
            s.length,
            s.goals_reached,
            s.cumulative_reward,
            s.path_efficiency,
            s.ground_collision,
            format!("{:?}", s.reason),
        );
    }
}

fn print_analysis(title: &str, a: &EpisodeAnalysis) {
    println!();
    println!("=== {} ({} episodes) ===", title, a.episodes);
    println!(
        "{:<16} {:>10} {:>10} {:>10} {:>10}",
        "metric", "mean", "std", "min", "max"
    );
    println!("{:-<60}", "");
    for (name, m) in [
        ("reward", &a.reward),
        ("length", &a.length),
        ("targets_found", &a.targets_found),
        ("path_efficiency", &a.path_efficiency),
    ] {
        println!(
            "{:<16} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
            name, m.mean, m.std, m.min, m.max
        );
    }
    println!("Collision rate: {:.1}%", a.collision_rate);
    println!("Success rate:   {:.1}%", a.success_rate);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episodes_arg(args: &[&str]) -> Result<u32, clap::Error> {
        let cli = Cli::try_parse_from(args)?;
        match cli.command {
            Commands::Run { episodes, .. } => Ok(episodes),
            _ => panic!("expected the run subcommand"),
        }
    }

    #[test]
    fn test_run_rejects_zero_episodes() {
        assert!(episodes_arg(&["hoverseek", "run", "--episodes", "0"]).is_err());
    }

    #[test]
    fn test_run_episode_count() {
        assert_eq!(episodes_arg(&["hoverseek", "run"]).unwrap(), 1);
        assert_eq!(episodes_arg(&["hoverseek", "run", "--episodes", "3"]).unwrap(), 3);
    }
}

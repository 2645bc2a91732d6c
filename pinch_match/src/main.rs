//! pinch_match: interactive entry point.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pinch_match::app::run;
use pinch_match::config::AppConfig;

const DEFAULT_LOG_FILTER: &str = "pinch_match=info,match_puzzle=info,hand_gesture=warn";

/// Pinch-gesture symbol matching game.
#[derive(Debug, Parser)]
#[command(name = "pinch_match", version, about)]
struct Cli {
    /// JSON configuration file; missing fields take their defaults.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Start in mouse mode without launching the hand detector.
    #[arg(long)]
    pointer: bool,

    /// Detector command line, e.g. "python3 scripts/hand_landmarks.py".
    #[arg(long, value_name = "CMD")]
    detector: Option<String>,

    /// Countdown length in seconds.
    #[arg(long, value_name = "SECS")]
    time_limit: Option<u64>,

    /// Fixed seed for a reproducible layout.
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Start with landmark and metrics annotations hidden.
    #[arg(long)]
    quiet_annotations: bool,
}

impl Cli {
    /// Fold command-line overrides into a loaded configuration.
    fn apply(&self, mut cfg: AppConfig) -> AppConfig {
        if self.pointer {
            cfg.detector.enabled = false;
        }
        if let Some(cmd) = &self.detector {
            cfg.detector.command = cmd.split_whitespace().map(str::to_string).collect();
        }
        if let Some(secs) = self.time_limit {
            cfg.puzzle.time_limit_secs = secs;
        }
        if self.seed.is_some() {
            cfg.puzzle.seed = self.seed;
        }
        if self.quiet_annotations {
            cfg.verbose = false;
        }
        cfg
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Pinch Match: Symbol Matching Challenge              ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let base = match &cli.config {
        Some(path) => match AppConfig::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => AppConfig::default(),
    };
    let cfg = cli.apply(base);

    if cfg.detector.enabled {
        println!("  Mode: camera  (detector: {})", cfg.detector.command.join(" "));
    } else {
        println!("  Mode: mouse");
    }
    println!("  Time limit: {} s", cfg.puzzle.time_limit_secs);
    println!();
    info!(seed = ?cfg.puzzle.seed, "starting");

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pinch_match").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_flags_keeps_defaults() {
        let cfg = parse(&[]).apply(AppConfig::default());
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn pointer_flag_disables_detector() {
        let cfg = parse(&["--pointer"]).apply(AppConfig::default());
        assert!(!cfg.detector.enabled);
    }

    #[test]
    fn detector_command_is_split() {
        let cfg = parse(&["--detector", "python3 track.py --cam 1"]).apply(AppConfig::default());
        assert_eq!(cfg.detector.command, vec!["python3", "track.py", "--cam", "1"]);
    }

    #[test]
    fn numeric_overrides() {
        let cfg = parse(&["--time-limit", "30", "--seed", "9", "--quiet-annotations"])
            .apply(AppConfig::default());
        assert_eq!(cfg.puzzle.time_limit_secs, 30);
        assert_eq!(cfg.puzzle.seed, Some(9));
        assert!(!cfg.verbose);
    }
}

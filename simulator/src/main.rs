use anyhow::{anyhow, Context};
use arcade_execution::{Config, ValidatedConfig};
use arcade_simulator::{simulate, Plan, Report};
use arcade_types::casino::{GameFamily, RiskTier};
use clap::Parser;
use std::{path::PathBuf, str::FromStr};
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML table configuration. Built-in defaults (no cases) when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Family to simulate. Every family when omitted.
    #[arg(short, long, value_parser = parse_family)]
    family: Option<GameFamily>,

    #[arg(short, long, default_value_t = 10_000)]
    trials: u64,

    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    #[arg(short, long, default_value_t = 100)]
    wager: u64,

    /// Safe reveals before cashing out bones and door rounds.
    #[arg(short, long, default_value_t = 2)]
    depth: u8,

    #[arg(long)]
    traps: Option<u8>,

    #[arg(long, value_parser = parse_risk, default_value = "medium")]
    risk: RiskTier,

    #[arg(long)]
    case: Option<u32>,

    /// Cases opened per spin.
    #[arg(long, default_value_t = 1)]
    spins: u8,

    /// Offered value over target price for upgrades, in percent.
    #[arg(long, default_value_t = 50)]
    upgrade_ratio: u8,

    /// Overrides the configured log level.
    #[arg(long)]
    log_level: Option<String>,

    /// Print the report (and logs) as JSON.
    #[arg(long)]
    json: bool,

    /// Split trials across all cores (needs the `parallel` feature).
    #[arg(long)]
    parallel: bool,
}

fn parse_family(value: &str) -> Result<GameFamily, String> {
    GameFamily::ALL
        .into_iter()
        .find(|family| format!("{family:?}").eq_ignore_ascii_case(value))
        .ok_or_else(|| format!("unknown game family: {value}"))
}

fn parse_risk(value: &str) -> Result<RiskTier, String> {
    match value.to_ascii_lowercase().as_str() {
        "low" => Ok(RiskTier::Low),
        "medium" => Ok(RiskTier::Medium),
        "high" => Ok(RiskTier::High),
        _ => Err(format!("unknown risk tier: {value}")),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ValidatedConfig> {
    let config = match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Config::from_yaml(&source).context("failed to parse config")?
        }
        None => Config::default(),
    };
    config.validate().context("invalid config")
}

fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    // Create logger
    let level = match &args.log_level {
        Some(value) => {
            Level::from_str(value).map_err(|_| anyhow!("invalid log level: {value}"))?
        }
        None => config.log_level,
    };
    if args.json {
        tracing_subscriber::fmt().json().with_max_level(level).init();
    } else {
        tracing_subscriber::fmt().with_max_level(level).init();
    }

    let plan = Plan {
        trials: args.trials,
        seed: args.seed,
        wager: args.wager,
        depth: args.depth,
        traps: args.traps,
        risk: args.risk,
        case_id: args.case,
        spins: args.spins,
        upgrade_ratio: args.upgrade_ratio,
    };
    let families = match args.family {
        Some(family) => vec![family],
        // Cases need a configured case to open
        None => GameFamily::ALL
            .into_iter()
            .filter(|&family| family != GameFamily::Cases || !config.cases.is_empty())
            .collect(),
    };
    info!(trials = plan.trials, seed = plan.seed, ?families, "starting simulation");
    if args.parallel && cfg!(not(feature = "parallel")) {
        warn!("built without the parallel feature; running sequentially");
    }

    let mut reports = Vec::new();
    for family in families {
        #[cfg(feature = "parallel")]
        let report = if args.parallel {
            arcade_simulator::simulate_parallel(&config, family, &plan)
        } else {
            simulate(&config, family, &plan)
        };
        #[cfg(not(feature = "parallel"))]
        let report = simulate(&config, family, &plan);

        reports.push(report.with_context(|| format!("{family:?} simulation failed"))?);
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reports).context("failed to encode report")?
        );
    } else {
        print_table(&reports);
    }
    Ok(())
}

fn print_table(reports: &[Report]) {
    println!(
        "{:<10} {:>10} {:>14} {:>14} {:>8} {:>8}",
        "family", "rounds", "wagered", "returned", "win %", "rtp"
    );
    for report in reports {
        let stats = &report.stats;
        let win_rate = if stats.rounds == 0 {
            0.0
        } else {
            stats.wins as f64 * 100.0 / stats.rounds as f64
        };
        println!(
            "{:<10} {:>10} {:>14} {:>14} {:>8.2} {:>8.4}",
            format!("{:?}", report.family).to_lowercase(),
            stats.rounds,
            stats.wagered,
            stats.returned,
            win_rate,
            report.rtp
        );
    }
}

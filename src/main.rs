//! EnergyCity entry point: CLI wiring, ADP training, and policy evaluation.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::Level;

use energy_city::city::MeasureCatalog;
use energy_city::config::ScenarioConfig;
use energy_city::io::export::export_csv;
use energy_city::policy::{
    AdaptivePolicy, AdpPolicy, AnyPolicy, Policy, ValueWeights, weights,
};
use energy_city::sim::kpi::{PolicyComparison, SampleSummary};
use energy_city::sim::monte_carlo::{
    APARTMENT_LEVELS, HOUSE_LEVELS, MonteCarlo, Samples, VOLATILITY_LEVELS,
};
use energy_city::sim::training::train;

/// City energy-efficiency investment simulator.
///
/// If no --scenario or --preset is given, the baseline preset is used.
#[derive(Debug, Parser)]
#[command(name = "energy-city", version)]
struct Cli {
    /// Load scenario from TOML config file
    #[arg(long, value_name = "PATH", conflicts_with = "preset")]
    scenario: Option<PathBuf>,

    /// Use a built-in preset (baseline, high_volatility, large_city)
    #[arg(long, value_name = "NAME")]
    preset: Option<String>,

    /// Override random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override Monte Carlo replications per policy
    #[arg(long)]
    replications: Option<usize>,

    /// Train the ADP policy and save its weights before evaluating
    #[arg(long)]
    train: bool,

    /// Override training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// ADP weights file (written with --train, read otherwise)
    #[arg(long, value_name = "PATH", default_value = "adp_weights.json")]
    weights: PathBuf,

    /// Export paired per-replication outcomes to CSV
    #[arg(long, value_name = "PATH")]
    samples_out: Option<PathBuf>,

    /// Spread replications over all cores
    #[arg(long)]
    parallel: bool,

    /// Also compare the policies across a parameter sweep
    #[arg(long, value_enum)]
    sweep: Option<Sweep>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Start REST API server after evaluation
    #[cfg(feature = "api")]
    #[arg(long)]
    serve: bool,

    /// API server port
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Sweep {
    /// Price volatility multipliers 0.5, 1, 2 and 3
    Volatility,
    /// 6x6 grid of apartment and house counts
    Sizing,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

/// Resolves the scenario: --scenario, then --preset, then baseline, with
/// command-line overrides applied on top.
fn load_scenario(cli: &Cli) -> Result<ScenarioConfig, Box<dyn Error>> {
    let mut scenario = if let Some(ref path) = cli.scenario {
        ScenarioConfig::from_toml_file(path)?
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)?
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed {
        scenario.simulation.seed = seed;
    }
    if let Some(n) = cli.replications {
        scenario.simulation.replications = n;
    }
    if let Some(n) = cli.episodes {
        scenario.adp.episodes = n;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        return Err(format!("invalid scenario ({} errors)", errors.len()).into());
    }
    Ok(scenario)
}

/// Trains fresh weights and saves them, or loads previously saved ones.
fn resolve_weights(
    cli: &Cli,
    scenario: &ScenarioConfig,
    catalog: &MeasureCatalog,
) -> Result<ValueWeights, Box<dyn Error>> {
    if !cli.train {
        return Ok(weights::load_or_default(&cli.weights)?);
    }

    let mut trainee = scenario.adp_trainee();
    let report = train(
        &mut trainee,
        &scenario.sim_config(),
        catalog,
        &scenario.city,
        &scenario.training_config(),
    );
    if let Some(last) = report
        .convergence_curve(scenario.adp.convergence_window)
        .last()
    {
        println!(
            "Training: {} episodes, final moving-average budget {last:.2}",
            report.episode_budgets.len()
        );
    }
    weights::save(&trainee.weights, &cli.weights)?;
    eprintln!("Weights written to {}", cli.weights.display());
    Ok(trainee.weights)
}

fn evaluate(
    mc: &MonteCarlo<'_>,
    policy: &AnyPolicy,
    scenario: &ScenarioConfig,
    parallel: bool,
) -> Samples {
    let n = scenario.simulation.replications;
    if parallel {
        mc.evaluate_parallel(policy, &scenario.city, n)
    } else {
        mc.evaluate(policy, &scenario.city, n)
    }
}

fn print_sweep(
    sweep: Sweep,
    mc: &MonteCarlo<'_>,
    scenario: &ScenarioConfig,
    adaptive: &AdaptivePolicy,
    adp: &AdpPolicy,
) {
    let n = scenario.simulation.replications;
    match sweep {
        Sweep::Volatility => {
            println!("\nvolatility  adaptive-adp  relative  ci95");
            for p in mc.volatility_sweep(adaptive, adp, &scenario.city, &VOLATILITY_LEVELS, n) {
                println!(
                    "{:>10.2}  {:>12.2}  {:>8.4}  {:.2}",
                    p.volatility, p.advantage, p.relative_advantage, p.ci95
                );
            }
        }
        Sweep::Sizing => {
            println!("\nhouses  apartments  adaptive-adp  p-value");
            let grid =
                mc.sizing_sweep(adaptive, adp, &scenario.city, &APARTMENT_LEVELS, &HOUSE_LEVELS, n);
            for p in grid {
                println!(
                    "{:>6}  {:>10}  {:>12.2}  {:.4}",
                    p.houses, p.apartments, p.advantage, p.welch_p
                );
            }
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let scenario = load_scenario(cli)?;
    let catalog = MeasureCatalog::default();
    let weights = resolve_weights(cli, &scenario, &catalog)?;

    let policies = [
        AnyPolicy::Adaptive(scenario.adaptive_policy()),
        AnyPolicy::Adp(scenario.adp_policy(weights)),
    ];
    let mc = MonteCarlo::new(scenario.sim_config(), &catalog, scenario.simulation.seed);
    let names = policies.each_ref().map(|p| p.name());
    let [adaptive, adp] = policies.map(|p| evaluate(&mc, &p, &scenario, cli.parallel));

    for (policy, samples) in names.iter().zip([&adaptive, &adp]) {
        println!("{policy} final energy: {}", SampleSummary::from_samples(&samples.energy));
        println!("{policy} final budget: {}", SampleSummary::from_samples(&samples.budget));
    }
    let comparison = PolicyComparison::from_samples(&adaptive, &adp);
    println!("\n{comparison}");

    if let Some(sweep) = cli.sweep {
        print_sweep(
            sweep,
            &mc,
            &scenario,
            &scenario.adaptive_policy(),
            &scenario.adp_policy(weights),
        );
    }

    if let Some(ref path) = cli.samples_out {
        export_csv(&adaptive, &adp, path)
            .map_err(|e| format!("failed to write CSV: {e}"))?;
        eprintln!("Samples written to {}", path.display());
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(energy_city::api::AppState {
            scenario,
            weights,
            adaptive,
            adp,
            comparison,
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(energy_city::api::serve(state, addr))?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

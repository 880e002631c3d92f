use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use litmus_demo::{
    chaos::{
        abort_summary, list_experiments, render_listing, render_summary, ExperimentResult,
        ExperimentRunner, ExperimentSuite, RunnerSettings,
    },
    chaos_ops,
    cli::{Cli, Commands, TestArgs},
    cluster::ClusterLifecycle,
    config::{Config, LogFormat},
    error::EXIT_CONFIG,
    output,
    shell::{CommandRunner, Shell},
    shutdown::{install_signal_handler, shutdown_channel},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            output::error(format!("Invalid configuration: {:#}", e));
            return ExitCode::from(EXIT_CONFIG as u8);
        }
    };

    init_tracing(config.log_format);

    match run(cli, config).await {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            output::error(format!("{:#}", e));
            ExitCode::from(EXIT_CONFIG as u8)
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

async fn run(cli: Cli, config: Config) -> Result<i32> {
    let runner: Arc<dyn CommandRunner> = Arc::new(Shell::new());

    match cli.command {
        Commands::Start(args) => {
            ClusterLifecycle::new(runner, config)
                .start(&args.cluster.spec(), args.key.as_deref())
                .await;
        }
        Commands::Stop(args) => {
            ClusterLifecycle::new(runner, config)
                .stop(&args.spec())
                .await;
        }
        Commands::List => {
            let entries = list_experiments(&config.experiments_dir)?;
            output::banner("Available chaos experiments:");
            print!("{}", render_listing(&entries));
        }
        Commands::Test(args) => return run_tests(args, config, runner).await,
    }

    Ok(0)
}

async fn run_tests(args: TestArgs, config: Config, runner: Arc<dyn CommandRunner>) -> Result<i32> {
    let (controller, signal) = shutdown_channel();
    install_signal_handler(controller);

    let ops = chaos_ops(config.backend, runner).await?;
    tracing::info!(backend = %config.backend, "Chaos backend ready");

    let runner = ExperimentRunner::new(ops, signal, RunnerSettings::from(&config));
    let suite = ExperimentSuite::new(runner, config.experiments_dir.clone());

    output::banner("Starting Litmus ChaosEngine experiments...");

    match suite.run(&args.selector(), args.wait, args.delay).await {
        Ok(results) => {
            print_summary(&results);
            Ok(0)
        }
        Err(aborted) => {
            if let Some(summary) = abort_summary(&aborted, config.partial_summary_on_cancel) {
                output::banner("Experiment results:");
                print!("{}", summary);
            }
            output::error(aborted.to_string());
            Ok(aborted.exit_code())
        }
    }
}

fn print_summary(results: &[ExperimentResult]) {
    output::banner("Experiment results:");
    print!("{}", render_summary(results));
}

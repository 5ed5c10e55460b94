use clap::{CommandFactory, FromArgMatches};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use trickle::args::{OutputFormat, RunArgs};
use trickle::config::load_scenario_file;
use trickle::engine::{RunReports, run_scenarios};
use trickle::error::AppResult;
use trickle::summary::{summary_json, summary_lines};

use crate::shutdown_handlers::setup_signal_shutdown_handler;

pub(crate) fn run() -> AppResult<()> {
    let args = parse_args()?;

    crate::logger::init_logging(args.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

/// Parses the command line. Help, version and usage errors are printed by
/// clap, which then exits with its own status code.
fn parse_args() -> AppResult<RunArgs> {
    let matches = RunArgs::command().get_matches();
    Ok(RunArgs::from_arg_matches(&matches)?)
}

async fn run_async(args: RunArgs) -> AppResult<()> {
    let scenario_file = load_scenario_file(&args.scenario_file).inspect_err(|err| {
        error!("{}", err);
    })?;

    let shutdown = CancellationToken::new();
    let signal_handle = setup_signal_shutdown_handler(&shutdown);

    let reports = run_scenarios(scenario_file.scenarios, &args.engine_config(), &shutdown).await;

    shutdown.cancel();
    signal_handle.await?;

    print_summary(&reports, args.output_format)
}

fn print_summary(reports: &RunReports, format: OutputFormat) -> AppResult<()> {
    match format {
        OutputFormat::Text => {
            info!("--------------------Result--------------------");
            for line in summary_lines(reports) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => {
            println!("{}", summary_json(reports)?);
        }
    }
    Ok(())
}

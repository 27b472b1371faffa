//! CVD CLI - ingest daily COVID-19 records and forecast them.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "cvd-cli",
    version,
    about = "COVID-19 time-series forecasting toolkit"
)]
struct Cli {
    /// Source CSV with country, date, confirmed (or cases), deaths, recovered
    #[arg(long, global = true, default_value = "covid_data.csv")]
    data: String,

    #[command(subcommand)]
    command: cvd_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("[CVD] cli: reading {}", cli.data);
    cvd_cmd::run(&cli.data, cli.command)
}

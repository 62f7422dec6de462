use clap::Parser;
use color_eyre::eyre::Result;
use quectel_cm_stub::args::Args;

const SYSLOG_IDENTIFIER: &str = "quectel-cm-stub";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let telemetry = cm_telemetry::TelemetryConfig::new(SYSLOG_IDENTIFIER).init();

    let args = Args::parse();
    let result = quectel_cm_stub::run(args).await;

    telemetry.flush();

    result
}

use std::time::Duration;

use clap::Parser;

/// Pretends to be quectel-CM: prints a fake registration state line every few
/// seconds so that supervisors can be exercised without a modem attached.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// APN, and optionally user and password, as passed to the real quectel-CM.
    /// Accepted for compatibility and otherwise ignored.
    #[arg(short = 's', long = "apn", num_args = 1..=3, value_names = ["APN", "USER", "PASS"])]
    pub apn: Vec<String>,

    /// Seconds between two status lines.
    #[arg(
        long,
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    /// Exit after printing this many lines. Runs until terminated if unset.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub count: Option<u64>,
}

impl Args {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn apn_name(&self) -> Option<&str> {
        self.apn.first().map(String::as_str)
    }
}

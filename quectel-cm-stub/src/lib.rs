//! A stand-in for the Quectel connection manager (`quectel-CM`).
//!
//! It never talks to a modem. It prints the registration state line that
//! `quectel-CM` logs once attached, every [`emitter::DEFAULT_INTERVAL`], so that
//! whatever supervises and tails `quectel-CM` can be tested on any machine.

pub mod args;
pub mod clock;
pub mod emitter;
pub mod error;
pub mod status;

use color_eyre::eyre::Result;
use tokio::signal::unix::{self, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{args::Args, clock::SystemClock, emitter::Emitter};

pub async fn run(args: Args) -> Result<()> {
    if let Some(apn) = args.apn_name() {
        // never log the credentials
        info!(apn, "ignoring APN configuration, no modem to configure");
    }

    let cancel = CancellationToken::new();
    let mut sigterm = unix::signal(SignalKind::terminate())?;
    let mut sigint = unix::signal(SignalKind::interrupt())?;

    // The reported status is fixed, only the timing is adjustable for tests.
    let emitter = Emitter::new(tokio::io::stdout(), SystemClock)
        .interval(args.interval())
        .limit(args.count);
    let mut emitter_task = tokio::spawn(emitter.run(cancel.clone()));

    let emitted = tokio::select! {
        result = &mut emitter_task => result??,
        _ = sigterm.recv() => {
            warn!("received SIGTERM");
            cancel.cancel();
            emitter_task.await??
        }
        _ = sigint.recv() => {
            warn!("received SIGINT");
            cancel.cancel();
            emitter_task.await??
        }
    };

    info!(emitted, "exiting gracefully");

    Ok(())
}

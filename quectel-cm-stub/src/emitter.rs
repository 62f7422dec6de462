use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncWrite, AsyncWriteExt as _};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::EmitError;
use crate::status::{RegistrationProfile, StatusEvent};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Writes one status line per tick to `out`, flushing after every line.
pub struct Emitter<W, C> {
    out: W,
    clock: C,
    profile: RegistrationProfile,
    interval: Duration,
    limit: Option<u64>,
    last: Option<DateTime<Utc>>,
}

impl<W, C> Emitter<W, C>
where
    W: AsyncWrite + Unpin,
    C: Clock,
{
    pub fn new(out: W, clock: C) -> Self {
        Self {
            out,
            clock,
            profile: RegistrationProfile::default(),
            interval: DEFAULT_INTERVAL,
            limit: None,
            last: None,
        }
    }

    pub fn profile(self, profile: RegistrationProfile) -> Self {
        Self { profile, ..self }
    }

    pub fn interval(self, interval: Duration) -> Self {
        Self { interval, ..self }
    }

    /// Stop after `limit` lines. Without a limit the emitter runs until cancelled.
    pub fn limit(self, limit: Option<u64>) -> Self {
        Self { limit, ..self }
    }

    /// Runs the tick loop. Returns the number of lines emitted once `cancel` fires
    /// or the limit is reached. A failed write ends the loop with an error.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<u64, EmitError> {
        if self.interval.is_zero() {
            return Err(EmitError::InvalidInterval);
        }

        info!(interval = ?self.interval, limit = ?self.limit, "starting status emitter");
        let mut emitted = 0;

        while !cancel.is_cancelled() && !self.limit_reached(emitted) {
            self.tick().await?;
            emitted += 1;

            if self.limit_reached(emitted) {
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = time::sleep(self.interval) => {}
            }
        }

        info!(emitted, "status emitter stopped");

        Ok(emitted)
    }

    fn limit_reached(&self, emitted: u64) -> bool {
        self.limit.is_some_and(|limit| emitted >= limit)
    }

    async fn tick(&mut self) -> Result<(), EmitError> {
        let mut now = self.clock.now();
        if let Some(last) = self.last.filter(|last| now < *last) {
            warn!(%now, %last, "wall clock went backwards, holding last timestamp");
            now = last;
        }

        let event = StatusEvent::new(now, &self.profile);
        self.last = Some(event.timestamp());
        let line = format!("{event}\n");
        self.out
            .write_all(line.as_bytes())
            .await
            .map_err(EmitError::Write)?;
        self.out.flush().await.map_err(EmitError::Write)?;

        debug!(line = line.trim_end(), "emitted status line");

        Ok(())
    }
}

//! Scheduled canvas clears.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::canvas::CanvasHandle;
use crate::error::ServerError;

/// When the next automatic clear is due.
pub trait ClearSchedule: Send + Sync {
    /// The first fire time strictly after `now`, or `None` when the schedule
    /// never fires again.
    fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>>;
}

/// A cron expression evaluated in UTC.
///
/// Accepts the classic 5-field form (minute first) as well as the 6 and 7
/// field forms with seconds.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expr: String,
    schedule: cron::Schedule,
}

impl CronSchedule {
    pub fn parse(expr: &str) -> Result<Self, ServerError> {
        let expr = expr.trim();
        let normalized = if expr.split_whitespace().count() == 5 {
            format!("0 {expr}")
        } else {
            expr.to_owned()
        };
        let schedule =
            cron::Schedule::from_str(&normalized).map_err(|err| ServerError::InvalidSchedule {
                expr: expr.to_owned(),
                reason: err.to_string(),
            })?;
        Ok(Self {
            expr: expr.to_owned(),
            schedule,
        })
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }
}

impl ClearSchedule for CronSchedule {
    fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&now).next()
    }
}

/// Sleeps until each fire time and clears the canvas. Returns when the
/// schedule is exhausted or the canvas actor is gone.
pub async fn run_clear_schedule(schedule: impl ClearSchedule, canvas: CanvasHandle) {
    loop {
        let now = Utc::now();
        let Some(next) = schedule.next_after(now) else {
            info!("clear schedule exhausted");
            return;
        };
        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        info!(at = %next, "scheduled clear");
        if let Err(err) = canvas.clear().await {
            warn!(error = %err, "scheduled clear stopped");
            return;
        }
    }
}

// src/services/poller.rs
//
// Job-based providers (Leonardo) answer the submit call with a generation id
// and render in the background. This loop drives that job to a terminal
// state with a fixed interval and a hard attempt budget, so a stuck upstream
// can never hold a request open indefinitely.

use std::time::Duration;

use log::{debug, warn};

use crate::errors::ProxyError;
use crate::models::{GenerationJob, JobStatus};
use crate::services::providers::GenerationBackend;

/// Fixed wait between status fetches.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
/// 12 attempts at 5 s each keeps total wait around one minute.
pub const MAX_POLL_ATTEMPTS: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PollState {
    Polling { remaining: u32 },
    Completed(String),
    Failed(String),
    TimedOut,
}

/// Polls `job` on `backend` until it completes, fails, or the attempt budget
/// runs out, returning the generated asset URL. Transport errors on a status
/// fetch are transient: the attempt is consumed and the loop continues.
pub async fn await_generation(
    backend: &dyn GenerationBackend,
    job: &GenerationJob,
    interval: Duration,
    max_attempts: u32,
) -> Result<String, ProxyError> {
    let mut state = PollState::Polling {
        remaining: max_attempts,
    };

    loop {
        state = match state {
            PollState::Polling { remaining: 0 } => PollState::TimedOut,
            PollState::Polling { remaining } => {
                tokio::time::sleep(interval).await;
                match backend.fetch_job_status(&job.id).await {
                    Ok(update) => advance(update, remaining),
                    Err(e) => {
                        warn!("status fetch for job {} failed (transient): {}", job.id, e);
                        PollState::Polling {
                            remaining: remaining - 1,
                        }
                    }
                }
            }
            PollState::Completed(url) => return Ok(url),
            PollState::Failed(reason) => return Err(ProxyError::GenerationFailed(reason)),
            PollState::TimedOut => return Err(ProxyError::GenerationTimeout),
        };
    }
}

fn advance(update: GenerationJob, remaining: u32) -> PollState {
    match update.status {
        JobStatus::Complete => match update.result_url {
            Some(url) => PollState::Completed(url),
            // COMPLETE without an asset is an upstream contract violation.
            None => PollState::Failed("job completed without an image URL".to_string()),
        },
        JobStatus::Failed => PollState::Failed("provider reported the job as failed".to_string()),
        JobStatus::Pending => {
            debug!("job {} still pending, {} attempts left", update.id, remaining - 1);
            PollState::Polling {
                remaining: remaining - 1,
            }
        }
    }
}

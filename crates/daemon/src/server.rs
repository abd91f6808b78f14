// SPDX-License-Identifier: MIT

//! Socket server and connection handling

use tokio::net::UnixStream;
use tracing::{debug, error};

use crate::lifecycle::DaemonState;
use crate::protocol::{
    self, JobOutcome, JobSummary, Query, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION,
};
use docket_core::Outcome;
use docket_engine::EngineError;

/// Handle a single client connection
pub async fn handle_connection(
    daemon: &mut DaemonState,
    stream: UnixStream,
) -> Result<(), ServerError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(req) => req,
        Err(protocol::ProtocolError::Timeout) => {
            error!("Request read timeout");
            return Err(ServerError::Timeout);
        }
        Err(protocol::ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected before sending request");
            return Ok(());
        }
        Err(e) => {
            error!("Failed to read request: {}", e);
            return Err(ServerError::Protocol(e));
        }
    };

    debug!("Received request: {:?}", request);

    let response = handle_request(daemon, request);

    debug!("Sending response: {:?}", response);

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT)
        .await
        .map_err(ServerError::Protocol)?;

    Ok(())
}

/// Handle a single request and return a response
pub fn handle_request(daemon: &mut DaemonState, request: Request) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version: _ } => Response::Hello {
            version: PROTOCOL_VERSION.to_string(),
        },

        Request::Submit { reference } => match daemon.dispatcher.submit(&reference) {
            Ok(job) => Response::Submitted { id: job.id },
            Err(EngineError::InvalidReference(r)) => Response::Error {
                message: format!("invalid repository reference: {r}"),
            },
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        },

        Request::Query { query } => handle_query(daemon, query),

        Request::Shutdown => {
            daemon.shutdown_requested = true;
            Response::ShuttingDown
        }

        Request::Status => {
            let uptime_secs = daemon.start_time.elapsed().as_secs();
            let jobs_active = daemon
                .store
                .list()
                .iter()
                .filter(|j| !j.is_terminal())
                .count();
            let queue_depth = {
                let queue = daemon.queue.lock().unwrap_or_else(|e| e.into_inner());
                queue.len() + queue.claimed_len()
            };

            Response::Status {
                uptime_secs,
                jobs_active,
                queue_depth,
                workers: daemon.config.settings.workers,
            }
        }
    }
}

fn handle_query(daemon: &DaemonState, query: Query) -> Response {
    match query {
        Query::Job { id } => match daemon.store.get(&id) {
            Ok(job) => Response::Job { job: Box::new(job) },
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        },

        Query::Outcome { id } => match daemon.store.get(&id) {
            Ok(job) => Response::Outcome {
                outcome: match (job.outcome, job.result) {
                    (Some(Outcome::Succeeded), Some(result)) => JobOutcome::Succeeded { result },
                    (Some(Outcome::Failed), _) => JobOutcome::Failed {
                        stage: job.stage.name().to_string(),
                        error: job.error.unwrap_or_default(),
                    },
                    _ => JobOutcome::Pending {
                        stage: job.stage.name().to_string(),
                    },
                },
            },
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        },

        Query::ListJobs => {
            let jobs = daemon
                .store
                .list()
                .into_iter()
                .map(|j| JobSummary {
                    id: j.id,
                    source: j.source,
                    stage: j.stage.name().to_string(),
                    outcome: j.outcome.map(|o| {
                        match o {
                            Outcome::Succeeded => "succeeded",
                            Outcome::Failed => "failed",
                        }
                        .to_string()
                    }),
                    created_at: j.created_at,
                })
                .collect();
            Response::Jobs { jobs }
        }
    }
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("request timeout")]
    Timeout,
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;

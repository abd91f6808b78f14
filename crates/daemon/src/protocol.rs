// SPDX-License-Identifier: MIT

//! Wire protocol: length-prefixed JSON over the Unix socket
//!
//! Every message is a 4-byte big-endian length followed by one JSON
//! document. One request, one response, then the connection is done.

use chrono::{DateTime, Utc};
use docket_core::{Job, JobResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Version exchanged in the Hello handshake
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default timeout for a single read or write
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on a single message; anything larger is a broken peer
const MAX_MESSAGE_BYTES: u32 = 1024 * 1024;

/// Requests a client can send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Hello { version: String },
    Ping,
    Status,
    Submit { reference: String },
    Query { query: Query },
    Shutdown,
}

/// Read-only lookups against the job store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Query {
    Job { id: String },
    Outcome { id: String },
    ListJobs,
}

/// Responses the daemon sends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Hello {
        version: String,
    },
    Pong,
    Status {
        uptime_secs: u64,
        jobs_active: usize,
        queue_depth: usize,
        workers: usize,
    },
    Submitted {
        id: String,
    },
    Job {
        job: Box<Job>,
    },
    Outcome {
        outcome: JobOutcome,
    },
    Jobs {
        jobs: Vec<JobSummary>,
    },
    ShuttingDown,
    Error {
        message: String,
    },
}

/// Poll answer for a single job
///
/// `Pending` names the stage the job is currently in so clients can show
/// progress without a second query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobOutcome {
    Pending { stage: String },
    Succeeded { result: JobResult },
    Failed { stage: String, error: String },
}

/// One row in a job listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: String,
    pub source: String,
    pub stage: String,
    pub outcome: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("timed out")]
    Timeout,
    #[error("connection closed")]
    ConnectionClosed,
    #[error("message too large: {0} bytes")]
    MessageTooLarge(u32),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize a message to raw JSON bytes (no length prefix)
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(message)?)
}

/// Deserialize a message from raw JSON bytes
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(data)?)
}

/// Write one length-prefixed message
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    let len = u32::try_from(data.len()).map_err(|_| ProtocolError::MessageTooLarge(u32::MAX))?;
    if len > MAX_MESSAGE_BYTES {
        return Err(ProtocolError::MessageTooLarge(len));
    }
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed message
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ProtocolError::ConnectionClosed
        } else {
            ProtocolError::Io(e)
        }
    })?;

    let len = u32::from_be_bytes(len_buf);
    if len > MAX_MESSAGE_BYTES {
        return Err(ProtocolError::MessageTooLarge(len));
    }

    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ProtocolError::ConnectionClosed
        } else {
            ProtocolError::Io(e)
        }
    })?;
    Ok(buf)
}

/// Read a request with a timeout
pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Request, ProtocolError> {
    let bytes = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&bytes)
}

/// Write a response with a timeout
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    let bytes = encode(response)?;
    tokio::time::timeout(timeout, write_message(writer, &bytes))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

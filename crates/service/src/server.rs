// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The daemon: a Unix socket listener in front of a single registry task.
//!
//! ```text
//! conn task ──┐
//! conn task ──┼── mpsc ──▶ registry task (owns Facade) ──▶ oneshot reply
//! conn task ──┘
//! ```
//!
//! Connections only frame lines. Every request is executed to completion by
//! the registry task before it takes the next one, so the core never sees
//! concurrent mutation.

use crate::protocol::{Fault, FaultKind, Response};
use crate::{Facade, ServiceConfig, ServiceError};
use std::future::Future;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};

/// Requests queued towards the registry task before connections wait.
const QUEUE_DEPTH: usize = 64;

/// Longest request line accepted, newline excluded.
const MAX_LINE: usize = 64 * 1024;

type Job = (String, oneshot::Sender<Response>);

/// A bound, not yet running daemon.
pub struct Daemon {
    listener: UnixListener,
    socket_path: PathBuf,
    facade: Facade,
}

impl Daemon {
    /// Builds the pool and binds the socket. Must be called inside a tokio
    /// runtime.
    ///
    /// A leftover socket file nobody listens on is replaced; a live one is
    /// an error.
    pub fn bind(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let facade = Facade::new(config)?;
        let socket_path = config.resolve_socket_path();
        remove_stale_socket(&socket_path)?;
        let listener =
            UnixListener::bind(&socket_path).map_err(|e| ServiceError::io(&socket_path, e))?;
        tracing::info!(
            "listening on {} with pool {}",
            socket_path.display(),
            config.pool
        );
        Ok(Self {
            listener,
            socket_path,
            facade,
        })
    }

    /// Path of the bound socket.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Serves connections until `shutdown` resolves, then removes the socket.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServiceError>
    where
        F: Future<Output = ()>,
    {
        let Daemon {
            listener,
            socket_path,
            facade,
        } = self;

        let (tx, rx) = mpsc::channel::<Job>(QUEUE_DEPTH);
        let registry = tokio::spawn(run_registry(facade, rx));

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, _)) => {
                        tracing::debug!("client connected");
                        let tx = tx.clone();
                        let path = socket_path.clone();
                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(stream, tx, &path).await {
                                tracing::warn!("connection dropped: {e}");
                            }
                        });
                    }
                    Err(e) => tracing::warn!("accept failed: {e}"),
                },
            }
        }

        drop(listener);
        drop(tx);
        registry.abort();
        if let Err(e) = std::fs::remove_file(&socket_path) {
            tracing::warn!("could not remove {}: {e}", socket_path.display());
        }
        tracing::info!("daemon stopped");
        Ok(())
    }
}

/// Executes queued requests one at a time.
async fn run_registry(mut facade: Facade, mut rx: mpsc::Receiver<Job>) {
    while let Some((line, reply)) = rx.recv().await {
        let response = facade.handle_line(&line);
        // The client may have gone away; the request still took effect.
        let _ = reply.send(response);
    }
}

async fn serve_connection(
    stream: UnixStream,
    tx: mpsc::Sender<Job>,
    socket_path: &Path,
) -> Result<(), ServiceError> {
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);
    let mut buf = Vec::new();

    loop {
        let line = match read_frame(&mut reader, &mut buf)
            .await
            .map_err(|e| ServiceError::io(socket_path, e))?
        {
            Frame::Eof => break,
            Frame::Line(line) => line,
            Frame::Rejected(fault) => {
                tracing::warn!("rejected request line: {fault}");
                write_response(&mut write, &Response::Error(fault), socket_path).await?;
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send((line, reply_tx))
            .await
            .map_err(|_| ServiceError::Disconnected)?;
        let response = reply_rx.await.map_err(|_| ServiceError::Disconnected)?;
        write_response(&mut write, &response, socket_path).await?;
    }
    tracing::debug!("client disconnected");
    Ok(())
}

async fn write_response(
    write: &mut OwnedWriteHalf,
    response: &Response,
    socket_path: &Path,
) -> Result<(), ServiceError> {
    let mut out = serde_json::to_string(response)?;
    out.push('\n');
    write
        .write_all(out.as_bytes())
        .await
        .map_err(|e| ServiceError::io(socket_path, e))
}

/// One unit read off a connection.
#[derive(Debug, PartialEq)]
enum Frame {
    Line(String),
    /// A line that cannot be a request; answered without reaching the registry.
    Rejected(Fault),
    Eof,
}

/// Reads up to the next newline, keeping at most [`MAX_LINE`] bytes.
///
/// An over-long line is drained to its newline and rejected, so memory stays
/// bounded whatever the peer sends. A final line without a newline still
/// counts.
async fn read_frame<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let mut overflow = false;
    let mut seen_any = false;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            if !seen_any {
                return Ok(Frame::Eof);
            }
            break;
        }
        seen_any = true;
        let newline = available.iter().position(|&b| b == b'\n');
        let take = newline.unwrap_or(available.len());
        if !overflow {
            if buf.len() + take > MAX_LINE {
                overflow = true;
                buf.clear();
            } else {
                buf.extend_from_slice(&available[..take]);
            }
        }
        reader.consume(newline.map_or(take, |i| i + 1));
        if newline.is_some() {
            break;
        }
    }

    if overflow {
        return Ok(Frame::Rejected(Fault::new(
            FaultKind::InvalidRequest,
            format!("request line longer than {MAX_LINE} bytes"),
        )));
    }
    match std::str::from_utf8(buf) {
        Ok(line) => Ok(Frame::Line(line.to_string())),
        Err(e) => Ok(Frame::Rejected(Fault::new(
            FaultKind::InvalidRequest,
            format!("request is not UTF-8: {e}"),
        ))),
    }
}

/// Unlinks a socket file nobody listens on. Anything else at `path` is left
/// alone and reported.
fn remove_stale_socket(path: &Path) -> Result<(), ServiceError> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(ServiceError::io(path, e)),
    };
    if !meta.file_type().is_socket() {
        return Err(ServiceError::ConfigError(format!(
            "'{}' exists and is not a socket",
            path.display()
        )));
    }
    if std::os::unix::net::UnixStream::connect(path).is_ok() {
        return Err(ServiceError::ConfigError(format!(
            "another daemon is listening on '{}'",
            path.display()
        )));
    }
    tracing::warn!("removing stale socket {}", path.display());
    std::fs::remove_file(path).map_err(|e| ServiceError::io(path, e))
}

/// Binds and serves until `shutdown` resolves.
pub async fn serve<F>(config: &ServiceConfig, shutdown: F) -> Result<(), ServiceError>
where
    F: Future<Output = ()>,
{
    Daemon::bind(config)?.run_until(shutdown).await
}

//! Tokio connection driver
//!
//! Runs the lifecycle against a TCP host speaking newline-delimited JSON.
//! Everything happens on one task: socket reads, user input and the
//! reconnect timer are awaited together with `select!`, so no two reactions
//! ever overlap.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use super::lifecycle::Lifecycle;
use super::{ConnectionResult, UserInput};
use crate::render::RenderSink;
use crate::session::Session;

/// Appends every inbound message to a JSONL file
#[derive(Debug)]
pub struct TraceLog {
    writer: BufWriter<File>,
}

impl TraceLog {
    /// Open `path` for appending, creating it if needed
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Record one message as a line
    pub fn record(&mut self, message: &str) -> io::Result<()> {
        self.writer.write_all(message.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

/// Why a connection stopped being served
enum Exit {
    /// The socket closed or the session desynchronized
    Closed,
    /// The input channel closed
    Shutdown,
}

type Observer = Box<dyn FnMut(&Session)>;

/// Event loop connecting a [`Lifecycle`] to a host
pub struct Driver<S: RenderSink> {
    addr: String,
    lifecycle: Lifecycle<S>,
    trace: Option<TraceLog>,
    observer: Option<Observer>,
}

impl<S: RenderSink> Driver<S> {
    pub fn new(addr: impl Into<String>, lifecycle: Lifecycle<S>) -> Self {
        Self {
            addr: addr.into(),
            lifecycle,
            trace: None,
            observer: None,
        }
    }

    /// Record inbound messages to a trace file
    pub fn with_trace(mut self, trace: TraceLog) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Call `observer` with the session after each inbound message while
    /// the sink is attached
    pub fn with_observer(mut self, observer: impl FnMut(&Session) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn lifecycle(&self) -> &Lifecycle<S> {
        &self.lifecycle
    }

    pub fn into_lifecycle(self) -> Lifecycle<S> {
        self.lifecycle
    }

    /// Connect, serve and reconnect until `input` is closed
    pub async fn run(&mut self, mut input: mpsc::Receiver<UserInput>) -> ConnectionResult<()> {
        loop {
            self.lifecycle.begin_connect();
            match TcpStream::connect(&self.addr).await {
                Ok(stream) => {
                    self.lifecycle.opened();
                    if let Exit::Shutdown = self.serve(stream, &mut input).await? {
                        self.lifecycle.shutdown();
                        return Ok(());
                    }
                }
                Err(err) => tracing::warn!(addr = %self.addr, error = %err, "connect failed"),
            }

            let delay = self.lifecycle.closed();
            if wait_or_shutdown(delay, &mut input).await {
                self.lifecycle.shutdown();
                return Ok(());
            }
        }
    }

    async fn serve(&mut self, stream: TcpStream, input: &mut mpsc::Receiver<UserInput>) -> ConnectionResult<Exit> {
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        loop {
            tokio::select! {
                biased;

                line = lines.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => return Ok(Exit::Closed),
                        Err(err) => {
                            tracing::warn!(error = %err, "read failed");
                            return Ok(Exit::Closed);
                        }
                    };
                    self.inbound(&line);
                    if self.lifecycle.receive(&line).is_err() {
                        return Ok(Exit::Closed);
                    }
                    if self.lifecycle.is_attached() {
                        if let Some(observer) = self.observer.as_mut() {
                            observer(self.lifecycle.session());
                        }
                    }
                }
                msg = input.recv() => {
                    let Some(msg) = msg else {
                        return Ok(Exit::Shutdown);
                    };
                    if let Some(mut text) = self.lifecycle.outbound(&msg)? {
                        text.push('\n');
                        if let Err(err) = writer.write_all(text.as_bytes()).await {
                            tracing::warn!(error = %err, "write failed");
                            return Ok(Exit::Closed);
                        }
                    }
                }
            }
        }
    }

    fn inbound(&mut self, line: &str) {
        if let Some(trace) = self.trace.as_mut() {
            if let Err(err) = trace.record(line) {
                tracing::warn!(error = %err, "trace write failed, tracing disabled");
                self.trace = None;
            }
        }
    }
}

/// Sleep for `delay`, dropping input that arrives meanwhile. Returns true
/// if the input channel closed.
async fn wait_or_shutdown(delay: Duration, input: &mut mpsc::Receiver<UserInput>) -> bool {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return false,
            msg = input.recv() => match msg {
                Some(msg) => tracing::debug!(?msg, "dropping input while disconnected"),
                None => return true,
            },
        }
    }
}

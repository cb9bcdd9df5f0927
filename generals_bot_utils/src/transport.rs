use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use anyhow::Context;
use generals::{ClientCommand, ServerEvent};
use tracing::{trace, warn};

/// The connection to the game server, as seen by a session.
pub trait Transport {
    fn send(&mut self, command: &ClientCommand) -> anyhow::Result<()>;

    /// Waits for the next event until `deadline`, or forever if there is none.
    ///
    /// Returns `Ok(None)` if the deadline passed without an event.
    fn recv(&mut self, deadline: Option<Instant>) -> anyhow::Result<Option<ServerEvent>>;
}

/// Speaks line-delimited JSON: one [`ClientCommand`] per line written,
/// one [`ServerEvent`] per line read.
///
/// Lines are read on a separate thread, so that [`Transport::recv`] can
/// time out. The end of the input is reported as a `disconnect` event.
pub struct LineTransport<W: Write> {
    writer: W,
    events: Receiver<anyhow::Result<ServerEvent>>,
}

impl<W: Write> LineTransport<W> {
    pub fn new<R: BufRead + Send + 'static>(reader: R, writer: W) -> Self {
        Self {
            writer,
            events: spawn_reader(reader),
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

fn spawn_reader<R: BufRead + Send + 'static>(reader: R) -> Receiver<anyhow::Result<ServerEvent>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        for line in reader.lines() {
            let event = match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => {
                    trace!(name: "Received event", event = %line);
                    serde_json::from_str::<ServerEvent>(&line)
                        .with_context(|| format!("Could not parse event '{}'", line))
                }
                Err(err) => Err(anyhow::Error::new(err).context("Could not read event")),
            };
            let failed = event.is_err();
            if sender.send(event).is_err() || failed {
                return;
            }
        }
        // 0 bytes read means EOF - the server connection is gone.
        let _ = sender.send(Ok(ServerEvent::Disconnect));
    });
    receiver
}

impl<W: Write> Transport for LineTransport<W> {
    fn send(&mut self, command: &ClientCommand) -> anyhow::Result<()> {
        let json = serde_json::to_string(command)?;
        trace!(name: "Sending command", command = %json);
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;
        Ok(())
    }

    fn recv(&mut self, deadline: Option<Instant>) -> anyhow::Result<Option<ServerEvent>> {
        let received = match deadline {
            Some(deadline) => {
                match self
                    .events
                    .recv_timeout(deadline.saturating_duration_since(Instant::now()))
                {
                    Ok(event) => event,
                    Err(RecvTimeoutError::Timeout) => return Ok(None),
                    Err(RecvTimeoutError::Disconnected) => Ok(ServerEvent::Disconnect),
                }
            }
            None => self.events.recv().unwrap_or(Ok(ServerEvent::Disconnect)),
        };
        received.map(Some)
    }
}

/// Runs a bridge program that relays between the game server and its
/// stdin/stdout, and talks to it as a [`LineTransport`].
pub struct ProcessTransport {
    child: Child,
    inner: LineTransport<ChildStdin>,
}

impl ProcessTransport {
    pub fn spawn(program: &str, args: &[String]) -> anyhow::Result<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|| format!("Could not start bridge '{}'", program))?;
        let stdin = child.stdin.take().context("Could not access stdin of bridge")?;
        let stdout = child.stdout.take().context("Could not access stdout of bridge")?;

        Ok(Self {
            child,
            inner: LineTransport::new(BufReader::new(stdout), stdin),
        })
    }
}

impl Transport for ProcessTransport {
    fn send(&mut self, command: &ClientCommand) -> anyhow::Result<()> {
        self.inner.send(command)
    }

    fn recv(&mut self, deadline: Option<Instant>) -> anyhow::Result<Option<ServerEvent>> {
        self.inner.recv(deadline)
    }
}

impl Drop for ProcessTransport {
    fn drop(&mut self) {
        if let Err(err) = self.child.kill() {
            warn!("Could not stop bridge: {}", err);
        }
        let _ = self.child.wait();
    }
}

//! Subprocess execution with concurrent output draining
//!
//! One invocation spawns one child with both output streams piped. Each pipe
//! gets its own reader task that forwards complete lines over a channel, and a
//! third channel carries the first read error. The runner's select loop merges
//! the two line channels and either writes each line to the host output as it
//! arrives (pass-through) or appends it to a single buffer (capture).
//!
//! Lines from the same stream keep their order. No order is imposed between
//! stdout and stderr lines.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::InvocationError;

/// Lines buffered per stream before a reader waits on the runner
const LINE_CHANNEL_CAPACITY: usize = 64;

/// Exit code reported for a child that was terminated by a signal
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// Which output stream of the child a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Stdout => write!(f, "stdout"),
            Stream::Stderr => write!(f, "stderr"),
        }
    }
}

/// One command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Working directory for the child (None = current directory)
    pub working_dir: Option<PathBuf>,
    /// Print the command line before running it
    pub show_command: bool,
    /// Stream output live instead of capturing it
    pub pipe_stdout: bool,
    /// Executable name
    pub program: String,
    /// Arguments, the first one conventionally a subcommand
    pub args: Vec<String>,
}

impl Invocation {
    /// Create an invocation of `program` with `args`
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            working_dir: None,
            show_command: false,
            pipe_stdout: false,
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Set the working directory; an empty path keeps the current directory
    pub fn in_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.working_dir = if dir.as_os_str().is_empty() {
            None
        } else {
            Some(dir.to_path_buf())
        };
        self
    }

    /// Echo the command line before running
    pub fn with_show_command(mut self, show_command: bool) -> Self {
        self.show_command = show_command;
        self
    }

    /// Pass output through to the host instead of capturing it
    pub fn with_pipe_stdout(mut self, pipe_stdout: bool) -> Self {
        self.pipe_stdout = pipe_stdout;
        self
    }

    /// Program and arguments joined with spaces
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Run an invocation, writing echoed and passed-through output to stdout
///
/// # Errors
/// * `InvocationError::MissingArguments` - If the argument list is empty
/// * `InvocationError::SpawnFailed` - If the child or its pipes couldn't be created
/// * `InvocationError::Stream` - If reading stdout or stderr failed
/// * `InvocationError::NonZeroExit` - If the child exited with a non-zero code
/// * `InvocationError::WaitFailed` - If the child couldn't be waited on
pub async fn run(invocation: &Invocation) -> Result<(), InvocationError> {
    let mut stdout = tokio::io::stdout();
    run_with_output(invocation, &mut stdout).await
}

/// Run an invocation, writing echoed and passed-through output to `out`
///
/// In capture mode nothing but the echoed command line is written to `out`;
/// the captured output is only surfaced through
/// [`InvocationError::NonZeroExit`] and discarded on success.
pub async fn run_with_output<W>(invocation: &Invocation, out: &mut W) -> Result<(), InvocationError>
where
    W: AsyncWrite + Unpin,
{
    if invocation.args.is_empty() {
        return Err(InvocationError::MissingArguments {
            program: invocation.program.clone(),
        });
    }

    let command = invocation.command_line();

    if invocation.show_command {
        out.write_all(command.as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await?;
    }

    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    if let Some(ref dir) = invocation.working_dir {
        cmd.current_dir(dir);
    }

    tracing::debug!(
        command = %command,
        dir = ?invocation.working_dir,
        pipe_stdout = invocation.pipe_stdout,
        "spawning command"
    );

    let mut child = cmd.spawn().map_err(|e| InvocationError::SpawnFailed {
        command: command.clone(),
        error: e.to_string(),
    })?;

    let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
        (Some(stdout), Some(stderr)) => (stdout, stderr),
        _ => {
            return Err(InvocationError::SpawnFailed {
                command,
                error: "output pipes were not attached".to_string(),
            })
        }
    };

    // The child is left running on a read error; it is not killed on drop.
    let captured = match drain(stdout, stderr, invocation.pipe_stdout, out).await {
        Ok(captured) => captured,
        Err(DrainError::Stream(stream, source)) => {
            return Err(InvocationError::Stream {
                command,
                stream,
                source,
            })
        }
        Err(DrainError::Output(e)) => return Err(InvocationError::Output(e)),
    };

    let status = child
        .wait()
        .await
        .map_err(|source| InvocationError::WaitFailed {
            command: command.clone(),
            source,
        })?;

    let exit_code = status.code().unwrap_or(SIGNAL_EXIT_CODE);
    if exit_code != 0 {
        tracing::debug!(command = %command, exit_code, "command failed");
        return Err(InvocationError::NonZeroExit {
            command,
            exit_code,
            output: captured,
        });
    }

    tracing::info!(command = %command, "command completed");
    Ok(())
}

/// Run an invocation synchronously (convenience wrapper for sync contexts)
pub fn run_sync(invocation: &Invocation) -> Result<(), InvocationError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            InvocationError::Output(io::Error::other(format!("Failed to create runtime: {}", e)))
        })?;

    rt.block_on(run(invocation))
}

/// Why draining the output streams stopped early
#[derive(Debug)]
enum DrainError {
    /// Reading a child stream failed
    Stream(Stream, io::Error),
    /// Writing to the host output failed
    Output(io::Error),
}

/// Where accepted lines go
struct OutputSink<'a, W> {
    writer: &'a mut W,
    pipe_stdout: bool,
    captured: String,
}

impl<'a, W: AsyncWrite + Unpin> OutputSink<'a, W> {
    fn new(writer: &'a mut W, pipe_stdout: bool) -> Self {
        Self {
            writer,
            pipe_stdout,
            captured: String::new(),
        }
    }

    async fn accept(&mut self, stream: Stream, line: &str) -> io::Result<()> {
        tracing::trace!(%stream, line = line.trim_end(), "output line");
        if self.pipe_stdout {
            self.writer.write_all(line.as_bytes()).await?;
            self.writer.flush().await
        } else {
            self.captured.push_str(line);
            Ok(())
        }
    }
}

/// Drain both streams until they close or one of them fails
///
/// Returns the captured output, which is empty in pass-through mode. Both
/// reader tasks have finished when this returns `Ok`; on error the remaining
/// readers are aborted.
async fn drain<O, E, W>(
    stdout: O,
    stderr: E,
    pipe_stdout: bool,
    out: &mut W,
) -> Result<String, DrainError>
where
    O: AsyncRead + Unpin + Send + 'static,
    E: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let (err_tx, mut err_rx) = mpsc::channel::<(Stream, io::Error)>(2);
    let (stdout_tx, mut stdout_rx) = mpsc::channel::<String>(LINE_CHANNEL_CAPACITY);
    let (stderr_tx, mut stderr_rx) = mpsc::channel::<String>(LINE_CHANNEL_CAPACITY);

    let readers = [
        tokio::spawn(read_pipe(stdout, Stream::Stdout, stdout_tx, err_tx.clone())),
        tokio::spawn(read_pipe(stderr, Stream::Stderr, stderr_tx, err_tx)),
    ];

    let mut sink = OutputSink::new(out, pipe_stdout);
    let mut stdout_open = true;
    let mut stderr_open = true;

    while stdout_open || stderr_open {
        let accepted = tokio::select! {
            line = stdout_rx.recv(), if stdout_open => match line {
                Some(line) => sink.accept(Stream::Stdout, &line).await,
                None => {
                    stdout_open = false;
                    Ok(())
                }
            },
            line = stderr_rx.recv(), if stderr_open => match line {
                Some(line) => sink.accept(Stream::Stderr, &line).await,
                None => {
                    stderr_open = false;
                    Ok(())
                }
            },
            Some((stream, source)) = err_rx.recv() => {
                abort_readers(&readers);
                return Err(DrainError::Stream(stream, source));
            }
        };

        if let Err(e) = accepted {
            abort_readers(&readers);
            return Err(DrainError::Output(e));
        }
    }

    // A reader reports its error before closing its line channel, so an
    // error racing the last close is still queued here.
    if let Ok((stream, source)) = err_rx.try_recv() {
        return Err(DrainError::Stream(stream, source));
    }

    for reader in readers {
        if let Err(e) = reader.await {
            tracing::warn!(error = %e, "output reader task failed");
        }
    }

    Ok(sink.captured)
}

fn abort_readers(readers: &[JoinHandle<()>]) {
    for reader in readers {
        reader.abort();
    }
}

/// Forward newline-terminated lines from `pipe` until it closes
///
/// Each line keeps its trailing `\n`. A final fragment without a newline is
/// dropped at end of stream. On a read error the error is reported on
/// `errors` first, then the line channel is closed by returning.
async fn read_pipe<R>(
    pipe: R,
    stream: Stream,
    lines: mpsc::Sender<String>,
    errors: mpsc::Sender<(Stream, io::Error)>,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::with_capacity(4096);

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if buf.last() != Some(&b'\n') {
                    tracing::debug!(
                        %stream,
                        bytes = n,
                        "dropping unterminated output at end of stream"
                    );
                    break;
                }
                let line = String::from_utf8_lossy(&buf).into_owned();
                if lines.send(line).await.is_err() {
                    // Runner stopped listening
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(%stream, error = %e, "error reading command output");
                let _ = errors.send((stream, e)).await;
                break;
            }
        }
    }
}

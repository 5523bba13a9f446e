use std::ffi::OsString;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use super::{CommandResult, LineBuffer, RunError, Runner};
use crate::classify::is_spinner_line;
use crate::log_sink::LogSink;

/// Executable looked up on `PATH` when none is configured.
pub const DEFAULT_PROGRAM: &str = "winget";

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Runs the real package-manager executable.
pub struct WingetRunner {
    program: OsString,
    sink: Arc<LogSink>,
}

impl WingetRunner {
    pub fn new(program: impl Into<OsString>, sink: Arc<LogSink>) -> Self {
        Self {
            program: program.into(),
            sink,
        }
    }

    /// Name of the executable, for messages.
    pub fn program(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);
        command
    }
}

#[async_trait]
impl Runner for WingetRunner {
    #[tracing::instrument(skip(self))]
    async fn run(&self, args: &[String], stream_to_log: bool) -> Result<CommandResult, RunError> {
        let program = self.program();
        debug!("Running {} {}", program, args.join(" "));

        let mut child = self
            .command(args)
            .spawn()
            .map_err(|source| RunError::Launch {
                program: program.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or_else(|| RunError::MissingPipe {
            program: program.clone(),
            stream: "stdout",
        })?;
        let stderr = child.stderr.take().ok_or_else(|| RunError::MissingPipe {
            program: program.clone(),
            stream: "stderr",
        })?;

        let buffer = Mutex::new(LineBuffer::new());
        let sink = stream_to_log.then_some(self.sink.as_ref());

        let ((), (), status) = tokio::join!(
            drain(stdout, &buffer, sink),
            drain(stderr, &buffer, sink),
            child.wait(),
        );

        let status = status.map_err(|source| RunError::Wait {
            program: program.clone(),
            source,
        })?;
        debug!("{} exited with {}", program, status);

        let lines = buffer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_lines();
        Ok(CommandResult::new(lines))
    }
}

/// Longest partial line held back while waiting for a terminator.
const MAX_PENDING_LINE: usize = 64 * 1024;

/// Read a stream to its end, splitting on `\n` and on the bare `\r` used by
/// progress redraws as soon as either arrives.
async fn drain<S>(stream: S, buffer: &Mutex<LineBuffer>, sink: Option<&LogSink>)
where
    S: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut pending = Vec::new();
    loop {
        let chunk = match reader.fill_buf().await {
            Ok(chunk) if chunk.is_empty() => break,
            Ok(chunk) => chunk,
            Err(e) => {
                warn!("Stopped reading subprocess output: {}", e);
                break;
            }
        };
        for &byte in chunk {
            if byte == b'\r' || byte == b'\n' {
                flush(&mut pending, buffer, sink);
            } else {
                pending.push(byte);
                if pending.len() >= MAX_PENDING_LINE {
                    flush(&mut pending, buffer, sink);
                }
            }
        }
        let consumed = chunk.len();
        reader.consume(consumed);
    }
    flush(&mut pending, buffer, sink);
}

fn flush(pending: &mut Vec<u8>, buffer: &Mutex<LineBuffer>, sink: Option<&LogSink>) {
    if pending.is_empty() {
        return;
    }
    accept(&String::from_utf8_lossy(pending), buffer, sink);
    pending.clear();
}

fn accept(raw: &str, buffer: &Mutex<LineBuffer>, sink: Option<&LogSink>) {
    let line = raw.trim();
    if is_spinner_line(line) {
        return;
    }
    if let Some(sink) = sink {
        sink.append(line);
    }
    buffer
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(line);
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::log_sink::DEFAULT_CAPACITY;
    use crate::runner::MAX_LINES;
    use std::time::{Duration, Instant};

    fn shell(sink: &Arc<LogSink>) -> WingetRunner {
        WingetRunner::new("sh", Arc::clone(sink))
    }

    fn script(body: &str) -> Vec<String> {
        vec!["-c".to_string(), body.to_string()]
    }

    #[tokio::test]
    async fn test_captures_stdout_and_stderr() {
        let sink = Arc::new(LogSink::default());
        let result = shell(&sink)
            .run(&script("echo out; echo err 1>&2"), false)
            .await
            .unwrap();
        assert!(result.lines().contains(&"out".to_string()));
        assert!(result.lines().contains(&"err".to_string()));
        assert_eq!(result.lines().len(), 2);
    }

    #[tokio::test]
    async fn test_drops_spinner_lines_and_trims() {
        let sink = Arc::new(LogSink::default());
        let result = shell(&sink)
            .run(
                &script(r"printf '%s\n' '\' '|' '█▒░' '   Found it   ' ''"),
                false,
            )
            .await
            .unwrap();
        assert_eq!(result.text(), "Found it");
    }

    #[tokio::test]
    async fn test_splits_carriage_return_progress() {
        let sink = Arc::new(LogSink::default());
        let result = shell(&sink)
            .run(&script(r"printf 'first\rsecond\r\nthird\n'"), false)
            .await
            .unwrap();
        assert_eq!(result.lines(), ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_carriage_return_redraw_streams_before_newline() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let sink = Arc::new(LogSink::with_listener(DEFAULT_CAPACITY, move |line| {
            seen_clone
                .lock()
                .unwrap()
                .push((line.to_string(), Instant::now()));
        }));

        shell(&sink)
            .run(
                &script(r"printf 'Downloading 50%%\r'; sleep 1; printf 'done\n'"),
                true,
            )
            .await
            .unwrap();

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, "Downloading 50%");
        assert_eq!(events[1].0, "done");
        assert!(events[1].1.duration_since(events[0].1) >= Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_unterminated_output_is_split_into_bounded_lines() {
        let sink = Arc::new(LogSink::default());
        let result = shell(&sink)
            .run(&script("head -c 200000 /dev/zero | tr '\\0' 'a'"), false)
            .await
            .unwrap();
        assert_eq!(result.lines().len(), 4);
        assert!(result.lines().iter().all(|line| line.len() <= MAX_PENDING_LINE));
        let total: usize = result.lines().iter().map(String::len).sum();
        assert_eq!(total, 200_000);
    }

    #[tokio::test]
    async fn test_keeps_only_recent_lines() {
        let sink = Arc::new(LogSink::default());
        let result = shell(&sink)
            .run(
                &script(r#"i=0; while [ $i -lt 250 ]; do echo "line $i"; i=$((i+1)); done"#),
                false,
            )
            .await
            .unwrap();
        assert_eq!(result.lines().len(), MAX_LINES);
        assert_eq!(result.lines()[0], "line 50");
        assert_eq!(result.lines()[MAX_LINES - 1], "line 249");
    }

    #[tokio::test]
    async fn test_streams_to_sink_only_when_asked() {
        let sink = Arc::new(LogSink::default());
        let runner = shell(&sink);

        runner.run(&script("echo quiet"), false).await.unwrap();
        assert!(sink.is_empty());

        runner.run(&script("echo loud"), true).await.unwrap();
        assert_eq!(sink.contents(), "loud\n");
    }

    #[tokio::test]
    async fn test_missing_executable_is_launch_error() {
        let sink = Arc::new(LogSink::default());
        let runner = WingetRunner::new("/nonexistent/winget-for-tests", Arc::clone(&sink));
        let err = runner.run(&["list".to_string()], false).await.unwrap_err();
        assert!(matches!(err, RunError::Launch { .. }));
        assert!(err.to_string().contains("/nonexistent/winget-for-tests"));
    }

    #[tokio::test]
    async fn test_exit_code_does_not_matter() {
        let sink = Arc::new(LogSink::default());
        let result = shell(&sink)
            .run(&script("echo 'No installed package found'; exit 3"), false)
            .await
            .unwrap();
        assert_eq!(result.text(), "No installed package found");
    }
}

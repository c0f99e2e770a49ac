//! Log tail — polls the watched file and raises a trigger per marker line.

use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::io::{AsyncReadExt as _, AsyncSeekExt as _};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use azerus_app::ports::{RecoveryTrigger, TriggerSourceControl};
use azerus_domain::marker::Marker;
use azerus_domain::recovery::{RecoveryAttempt, TriggerOrigin};

use crate::error::LogTailError;
use crate::lines::LineBuffer;

/// Read position in the watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Not read yet; the first successful poll jumps to the current end.
    Unanchored,
    At(u64),
}

#[derive(Debug)]
struct TailState {
    /// Path the cursor belongs to. A different source resets the cursor.
    path: Option<PathBuf>,
    cursor: Cursor,
    lines: LineBuffer,
}

/// Trigger source over an append-only text file.
///
/// Content present when a file is first observed is history and never
/// triggers: the first poll anchors the cursor at the current end of file,
/// so restarting the daemon or repointing the source does not replay old
/// markers. A file that does not exist yet is anchored at offset 0 once it
/// appears, and all of its content is scanned.
///
/// A file that shrinks between polls was truncated or rotated; reading
/// restarts from offset 0.
pub struct LogTail<T> {
    trigger: T,
    marker: Marker,
    poll_interval: Duration,
    source: RwLock<Option<PathBuf>>,
    state: tokio::sync::Mutex<TailState>,
    shutdown: Notify,
}

impl<T: RecoveryTrigger> LogTail<T> {
    #[must_use]
    pub fn new(trigger: T, marker: Marker, poll_interval: Duration) -> Self {
        Self {
            trigger,
            marker,
            poll_interval,
            source: RwLock::new(None),
            state: tokio::sync::Mutex::new(TailState {
                path: None,
                cursor: Cursor::Unanchored,
                lines: LineBuffer::default(),
            }),
            shutdown: Notify::new(),
        }
    }

    /// Builder-style variant of [`TriggerSourceControl::set_source`].
    #[must_use]
    pub fn with_source(self, path: impl Into<PathBuf>) -> Self {
        self.set_source(path.into());
        self
    }

    #[must_use]
    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    /// Read whatever was appended since the last poll and raise one trigger
    /// per matching line, sequentially.
    ///
    /// Returns the number of triggers raised.
    ///
    /// # Errors
    ///
    /// Returns [`LogTailError`] when the file cannot be inspected or read.
    /// The cursor is left untouched so the next poll retries the same range.
    pub async fn poll_once(&self) -> Result<usize, LogTailError> {
        let Some(path) = self.source() else {
            return Ok(0);
        };

        let matches = {
            let mut state = self.state.lock().await;
            if state.path.as_deref() != Some(path.as_path()) {
                tracing::debug!(path = %path.display(), "new log source; cursor reset");
                state.path = Some(path.clone());
                state.cursor = Cursor::Unanchored;
                state.lines.clear();
            }
            self.read_appended(&path, &mut state).await?
        };

        for line in &matches {
            tracing::info!(%line, "marker found in log stream");
            match self.trigger.trigger(TriggerOrigin::LogStream).await {
                RecoveryAttempt::Completed(outcome) => {
                    tracing::debug!(%outcome, "triggered recovery completed");
                }
                RecoveryAttempt::Dropped => {
                    tracing::debug!("triggered recovery dropped, one already running");
                }
            }
        }
        Ok(matches.len())
    }

    async fn read_appended(
        &self,
        path: &Path,
        state: &mut TailState,
    ) -> Result<Vec<String>, LogTailError> {
        let size = match tokio::fs::metadata(path).await {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                // Everything written once the file appears is new.
                state.cursor = Cursor::At(0);
                state.lines.clear();
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(LogTailError::Metadata {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let offset = match state.cursor {
            Cursor::Unanchored => {
                tracing::debug!(path = %path.display(), size, "anchored at end of log source");
                state.cursor = Cursor::At(size);
                return Ok(Vec::new());
            }
            Cursor::At(offset) if size < offset => {
                tracing::info!(
                    path = %path.display(),
                    previous = offset,
                    size,
                    "log source truncated or rotated; reading from start"
                );
                state.lines.clear();
                0
            }
            Cursor::At(offset) => offset,
        };
        if size == offset {
            state.cursor = Cursor::At(offset);
            return Ok(Vec::new());
        }

        let bytes = read_range(path, offset, size - offset)
            .await
            .map_err(|source| LogTailError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        state.cursor = Cursor::At(offset + bytes.len() as u64);

        Ok(state
            .lines
            .push(&bytes)
            .into_iter()
            .filter(|line| self.marker.matches(line))
            .collect())
    }
}

impl<T: RecoveryTrigger + 'static> LogTail<T> {
    /// Spawn the background poll loop. It runs until [`stop`](Self::stop).
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let tail = Arc::clone(self);
        tokio::spawn(async move { tail.run().await })
    }

    async fn run(&self) {
        tracing::info!(
            marker = %self.marker,
            interval = ?self.poll_interval,
            "log tail started"
        );
        loop {
            if let Err(err) = self.poll_once().await {
                tracing::warn!(%err, "log poll failed, retrying next interval");
            }
            tokio::select! {
                () = tokio::time::sleep(self.poll_interval) => {}
                () = self.shutdown.notified() => break,
            }
        }
        tracing::info!("log tail stopped");
    }

    /// Ask the poll loop to exit.
    ///
    /// A recovery triggered by the current poll still runs to completion;
    /// await the handle returned by [`start`](Self::start) to wait for it.
    pub fn stop(&self) {
        self.shutdown.notify_one();
    }
}

impl<T: RecoveryTrigger> TriggerSourceControl for LogTail<T> {
    fn set_source(&self, path: PathBuf) {
        tracing::info!(path = %path.display(), "log source set");
        *self.source.write().unwrap_or_else(PoisonError::into_inner) = Some(path);
    }

    fn source(&self) -> Option<PathBuf> {
        self.source
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

async fn read_range(path: &Path, offset: u64, len: u64) -> std::io::Result<Vec<u8>> {
    let mut file = tokio::fs::File::open(path).await?;
    file.seek(SeekFrom::Start(offset)).await?;
    let mut bytes = Vec::new();
    file.take(len).read_to_end(&mut bytes).await?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use azerus_domain::recovery::RecoveryOutcome;
    use std::io::Write as _;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TriggerSpy {
        count: AtomicUsize,
    }

    impl TriggerSpy {
        fn count(&self) -> usize {
            self.count.load(Ordering::SeqCst)
        }
    }

    impl RecoveryTrigger for TriggerSpy {
        async fn trigger(&self, origin: TriggerOrigin) -> RecoveryAttempt {
            assert_eq!(origin, TriggerOrigin::LogStream);
            self.count.fetch_add(1, Ordering::SeqCst);
            RecoveryAttempt::Completed(RecoveryOutcome::Recovered)
        }
    }

    const MARKER_LINE: &str = "[12:00:01] [CHAT] У вас выбили оружие из рук!\n";

    fn temp_log(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "azerus-log-tail-{}-{name}.log",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    fn append(path: &Path, text: &str) {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        file.write_all(text.as_bytes()).unwrap();
    }

    fn tail(path: &Path) -> (Arc<TriggerSpy>, LogTail<Arc<TriggerSpy>>) {
        let spy = Arc::new(TriggerSpy::default());
        let tail = LogTail::new(
            Arc::clone(&spy),
            Marker::default(),
            Duration::from_millis(10),
        )
        .with_source(path);
        (spy, tail)
    }

    #[tokio::test]
    async fn should_do_nothing_without_source() {
        let spy = Arc::new(TriggerSpy::default());
        let tail = LogTail::new(Arc::clone(&spy), Marker::default(), Duration::from_millis(10));

        assert_eq!(tail.poll_once().await.unwrap(), 0);
        assert!(tail.source().is_none());
    }

    #[tokio::test]
    async fn should_skip_history_and_trigger_on_appended_marker() {
        let path = temp_log("history");
        append(&path, MARKER_LINE);
        let (spy, tail) = tail(&path);

        assert_eq!(tail.poll_once().await.unwrap(), 0);
        append(&path, "[12:00:02] [CHAT] hello\n");
        assert_eq!(tail.poll_once().await.unwrap(), 0);
        append(&path, MARKER_LINE);
        assert_eq!(tail.poll_once().await.unwrap(), 1);
        assert_eq!(tail.poll_once().await.unwrap(), 0);

        assert_eq!(spy.count(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn should_read_file_created_after_first_poll_from_start() {
        let path = temp_log("late");
        let (spy, tail) = tail(&path);

        assert_eq!(tail.poll_once().await.unwrap(), 0);
        append(&path, MARKER_LINE);
        assert_eq!(tail.poll_once().await.unwrap(), 1);

        assert_eq!(spy.count(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn should_restart_from_zero_after_truncation_without_replaying() {
        let path = temp_log("rotate");
        append(&path, &"[12:00:00] [CHAT] filler line\n".repeat(20));
        let (spy, tail) = tail(&path);
        tail.poll_once().await.unwrap();
        append(&path, MARKER_LINE);
        assert_eq!(tail.poll_once().await.unwrap(), 1);

        std::fs::write(&path, MARKER_LINE).unwrap();
        assert_eq!(tail.poll_once().await.unwrap(), 1);
        assert_eq!(tail.poll_once().await.unwrap(), 0);

        assert_eq!(spy.count(), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn should_trigger_once_per_matching_line_in_one_batch() {
        let path = temp_log("batch");
        let (spy, tail) = tail(&path);
        tail.poll_once().await.unwrap();

        append(&path, MARKER_LINE);
        append(&path, "[12:00:03] [CHAT] unrelated\n");
        append(&path, MARKER_LINE);

        assert_eq!(tail.poll_once().await.unwrap(), 2);
        assert_eq!(spy.count(), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn should_trigger_once_for_marker_split_across_appends() {
        let path = temp_log("split");
        let (spy, tail) = tail(&path);
        tail.poll_once().await.unwrap();

        let (head, rest) = MARKER_LINE.split_at(20);
        append(&path, head);
        assert_eq!(tail.poll_once().await.unwrap(), 0);
        append(&path, rest);
        assert_eq!(tail.poll_once().await.unwrap(), 1);

        assert_eq!(spy.count(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn should_anchor_new_source_at_its_end() {
        let first = temp_log("switch-a");
        let second = temp_log("switch-b");
        append(&second, MARKER_LINE);
        let (spy, tail) = tail(&first);
        tail.poll_once().await.unwrap();

        tail.set_source(second.clone());
        assert_eq!(tail.source(), Some(second.clone()));
        assert_eq!(tail.poll_once().await.unwrap(), 0);
        append(&second, MARKER_LINE);
        assert_eq!(tail.poll_once().await.unwrap(), 1);

        assert_eq!(spy.count(), 1);
        let _ = std::fs::remove_file(&first);
        let _ = std::fs::remove_file(&second);
    }

    #[tokio::test]
    async fn should_honour_custom_marker() {
        let path = temp_log("custom");
        let spy = Arc::new(TriggerSpy::default());
        let tail = LogTail::new(
            Arc::clone(&spy),
            Marker::new("disarmed").unwrap(),
            Duration::from_millis(10),
        )
        .with_source(&path);
        tail.poll_once().await.unwrap();

        append(&path, MARKER_LINE);
        append(&path, "you were disarmed\n");

        assert_eq!(tail.poll_once().await.unwrap(), 1);
        assert_eq!(tail.marker().as_str(), "disarmed");
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn should_poll_in_background_until_stopped() {
        let path = temp_log("background");
        let spy = Arc::new(TriggerSpy::default());
        let tail = Arc::new(
            LogTail::new(
                Arc::clone(&spy),
                Marker::default(),
                Duration::from_millis(10),
            )
            .with_source(&path),
        );

        let handle = tail.start();
        tokio::time::sleep(Duration::from_millis(50)).await;
        append(&path, MARKER_LINE);
        tokio::time::sleep(Duration::from_millis(100)).await;
        tail.stop();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(spy.count(), 1);
        let _ = std::fs::remove_file(&path);
    }
}

use clinote_engine::{IoError, write_note};
use relative_path::RelativePathBuf;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Writes the latest emitted note text once edits go quiet.
///
/// Every change replaces the pending payload and pushes the deadline out by
/// the debounce delay, so a burst of keystrokes produces one write.
#[derive(Debug)]
pub struct DebouncedSaver {
    notes_root: PathBuf,
    note: RelativePathBuf,
    delay: Duration,
    pending: Option<String>,
    deadline: Option<Instant>,
}

impl DebouncedSaver {
    pub fn new(notes_root: PathBuf, note: RelativePathBuf, delay: Duration) -> Self {
        Self {
            notes_root,
            note,
            delay,
            pending: None,
            deadline: None,
        }
    }

    pub fn note(&self) -> &RelativePathBuf {
        &self.note
    }

    pub fn schedule(&mut self, text: &str) {
        self.schedule_at(text, Instant::now());
    }

    pub fn schedule_at(&mut self, text: &str, now: Instant) {
        self.pending = Some(text.to_string());
        self.deadline = Some(now + self.delay);
    }

    /// Whether there is text not yet on disk
    pub fn is_dirty(&self) -> bool {
        self.pending.is_some()
    }

    /// How long the event loop may sleep before the next write is due
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Write the pending text if the quiet period has elapsed.
    /// Returns whether a write happened.
    pub fn save_if_due(&mut self, now: Instant) -> Result<bool, IoError> {
        if !self.deadline.is_some_and(|deadline| now >= deadline) {
            return Ok(false);
        }
        self.flush().inspect_err(|_| {
            // Retry after another quiet period rather than on every tick
            self.deadline = Some(now + self.delay);
        })
    }

    /// Write the pending text now, whatever the deadline
    pub fn flush(&mut self) -> Result<bool, IoError> {
        let Some(text) = self.pending.take() else {
            return Ok(false);
        };
        self.deadline = None;

        match write_note(&self.note, &self.notes_root, &text) {
            Ok(()) => {
                log::info!("Saved {} ({} bytes)", self.note, text.len());
                Ok(true)
            }
            Err(e) => {
                log::error!("Failed to save {}: {e}", self.note);
                self.pending = Some(text);
                Err(e)
            }
        }
    }
}

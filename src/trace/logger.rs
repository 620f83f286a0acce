use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::trace::trace::TraceEvent;

/// Run trace sink: one JSON `TraceEvent` per line, appended across runs.
///
/// Tracing never fails a run. If the file cannot be opened the sink starts
/// out disabled; a failed write is warned about and skipped.
#[derive(Default)]
pub struct TraceLogger {
    sink: Option<TraceFile>,
}

struct TraceFile {
    path: PathBuf,
    file: Mutex<File>,
}

impl TraceLogger {
    /// Append to `path`, creating the file on first use.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                debug!(path = %path.display(), "writing run trace");
                Self {
                    sink: Some(TraceFile {
                        path: path.to_path_buf(),
                        file: Mutex::new(file),
                    }),
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "run trace disabled");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Trace file in use, if any.
    pub fn path(&self) -> Option<&Path> {
        self.sink.as_ref().map(|sink| sink.path.as_path())
    }

    pub fn log(&self, event: &TraceEvent) {
        let Some(sink) = &self.sink else {
            return;
        };

        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                warn!(step = event.step, error = %e, "trace event not serializable");
                return;
            }
        };

        // A poisoned lock only means an earlier writer panicked mid-line
        let mut file = sink.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(file, "{}", line) {
            warn!(path = %sink.path.display(), step = event.step, error = %e, "trace write failed");
        }
    }
}

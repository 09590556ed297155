//! Cooperative stop signal for in-flight runs.

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

/// Stop signal observed between units of work.
///
/// A run checks this before starting each board and before requesting each
/// pagination page. In-flight requests are not aborted, and postings already
/// fetched still flow through the rest of the pipeline, so observing a stop
/// never corrupts the history.
///
/// The optional sentinel path supports the external control convention of
/// dropping a marker file next to the process; the file is only observed
/// here, never created or removed.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    token: CancellationToken,
    sentinel: Option<PathBuf>,
}

impl StopSignal {
    /// Signal that only trips when [`stop`](Self::stop) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal that also trips while `path` exists.
    pub fn with_sentinel(path: impl Into<PathBuf>) -> Self {
        Self {
            token: CancellationToken::new(),
            sentinel: Some(path.into()),
        }
    }

    /// Request a stop.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// True once a stop has been requested or the sentinel file exists.
    pub fn is_stopped(&self) -> bool {
        if self.token.is_cancelled() {
            return true;
        }
        match &self.sentinel {
            Some(path) => path.exists(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_signal_is_not_stopped() {
        assert!(!StopSignal::new().is_stopped());
    }

    #[test]
    fn stop_trips_the_signal_for_all_clones() {
        let signal = StopSignal::new();
        let clone = signal.clone();
        signal.stop();
        assert!(clone.is_stopped());
    }

    #[test]
    fn sentinel_file_trips_the_signal() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("STOP_SCRAPE");

        let signal = StopSignal::with_sentinel(&marker);
        assert!(!signal.is_stopped());

        std::fs::write(&marker, b"").unwrap();
        assert!(signal.is_stopped());

        // The signal never deletes the marker itself.
        std::fs::remove_file(&marker).unwrap();
        assert!(!signal.is_stopped());
    }
}

//! File-backed history in the collaborator's CSV ledger format.
//!
//! Layout contract: one header row at the top of a fresh file, then runs of
//! records, each run introduced by a `#`-prefixed separator line carrying
//! the run's date and time. Every field is double-quoted, with `"` and `\`
//! escaped by a backslash; readers also accept the doubled-quote escape
//! (`""`) that collaborator-written files use, and treat `#` lines as
//! comments.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{HarvestError, Result};
use crate::types::{AcceptedPosting, RunStamp};

use super::{HistoryStore, COLUMNS};

/// How long to wait for another writer to release the ledger.
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_RETRY: Duration = Duration::from_millis(100);

/// Append-only CSV history with cross-process single-writer locking.
pub struct CsvHistory {
    path: PathBuf,
    /// Held for the store's lifetime, so a run's read-reconcile-append
    /// window can never interleave with another writer.
    _lock: LedgerLock,
    /// Serializes operations within this process.
    op: Mutex<()>,
}

impl CsvHistory {
    /// Open the ledger at `path`, creating parent directories, and take the
    /// single-writer lock. Fails with [`HarvestError::StoreBusy`] when
    /// another holder does not release it within the bounded wait.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with_timeout(path.into(), LOCK_TIMEOUT).await
    }

    async fn open_with_timeout(path: PathBuf, timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| HarvestError::store(parent, e))?;
            }
        }
        let lock = LedgerLock::acquire(&path, timeout).await?;
        Ok(Self {
            path,
            _lock: lock,
            op: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-filter-rewrite for the collaborator's delete and block
    /// operations. Comment separators and the header survive; records whose
    /// `column` value satisfies `matches` are dropped. The rewrite goes
    /// through a temp file and a rename so readers never observe a
    /// half-written ledger.
    async fn rewrite_without<F>(&self, column: &str, matches: F) -> Result<usize>
    where
        F: Fn(&str) -> bool,
    {
        let _op = self.op.lock().await;

        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(HarvestError::store(&self.path, e)),
        };

        let mut column_idx: Option<usize> = None;
        let mut header_seen = false;
        let mut kept = String::with_capacity(contents.len());
        let mut removed = 0usize;

        for line in contents.lines() {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                kept.push_str(line);
                kept.push('\n');
                continue;
            }
            if !header_seen {
                header_seen = true;
                column_idx = parse_fields(line)
                    .and_then(|fields| fields.iter().position(|f| f.trim() == column));
                kept.push_str(line);
                kept.push('\n');
                continue;
            }
            let is_match = match column_idx {
                Some(idx) => parse_fields(line)
                    .and_then(|fields| fields.get(idx).cloned())
                    .map(|value| matches(&value))
                    .unwrap_or(false),
                None => false,
            };
            if is_match {
                removed += 1;
            } else {
                kept.push_str(line);
                kept.push('\n');
            }
        }

        if removed == 0 {
            return Ok(0);
        }

        let tmp = self.path.with_extension("csv.tmp");
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| HarvestError::store(&tmp, e))?;
        file.write_all(kept.as_bytes())
            .await
            .map_err(|e| HarvestError::store(&tmp, e))?;
        file.sync_all()
            .await
            .map_err(|e| HarvestError::store(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| HarvestError::store(&self.path, e))?;

        debug!(path = %self.path.display(), removed, "Rewrote history without matching records");
        Ok(removed)
    }
}

#[async_trait]
impl HistoryStore for CsvHistory {
    async fn read_existing_urls(&self) -> Result<HashSet<String>> {
        let _op = self.op.lock().await;

        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => return Err(HarvestError::store(&self.path, e)),
        };

        Ok(collect_urls(&contents, &self.path))
    }

    async fn append_run(&self, stamp: &RunStamp, postings: &[AcceptedPosting]) -> Result<()> {
        let _op = self.op.lock().await;

        let is_new = !self.path.exists();
        let mut block = String::new();
        if is_new {
            block.push_str(&header_line());
            block.push('\n');
        }
        block.push_str(&separator_line(stamp));
        block.push('\n');
        for posting in postings {
            block.push_str(&format_record(posting));
            block.push('\n');
        }

        // One buffered append per run: a reader never observes a partial run
        // and an interrupted process leaves the previous contents intact.
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| HarvestError::store(&self.path, e))?;
        file.write_all(block.as_bytes())
            .await
            .map_err(|e| HarvestError::store(&self.path, e))?;
        file.sync_all()
            .await
            .map_err(|e| HarvestError::store(&self.path, e))?;

        debug!(
            path = %self.path.display(),
            appended = postings.len(),
            wrote_header = is_new,
            "Appended run to history"
        );
        Ok(())
    }

    async fn remove_url(&self, url: &str) -> Result<usize> {
        self.rewrite_without("job_url", |value| value == url).await
    }

    async fn remove_company(&self, company: &str) -> Result<usize> {
        self.rewrite_without("company", |value| value == company).await
    }
}

/// Exclusive advisory lock on the ledger's `.lock` sidecar. Dropping the
/// lock (with the store) releases it.
struct LedgerLock {
    _file: std::fs::File,
}

impl LedgerLock {
    async fn acquire(ledger_path: &Path, timeout: Duration) -> Result<Self> {
        let lock_path = lock_path_for(ledger_path);
        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)
            .map_err(|e| HarvestError::store(&lock_path, e))?;

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match try_lock_exclusive(&file) {
                Ok(true) => return Ok(Self { _file: file }),
                Ok(false) => {
                    if tokio::time::Instant::now() >= deadline {
                        return Err(HarvestError::StoreBusy {
                            path: ledger_path.to_path_buf(),
                        });
                    }
                    tokio::time::sleep(LOCK_RETRY).await;
                }
                Err(e) => return Err(HarvestError::store(&lock_path, e)),
            }
        }
    }
}

fn lock_path_for(ledger: &Path) -> PathBuf {
    let mut name = ledger
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "ledger".into());
    name.push(".lock");
    ledger.with_file_name(name)
}

/// Non-blocking exclusive flock. `Ok(false)` means another holder has it.
#[cfg(unix)]
fn try_lock_exclusive(file: &std::fs::File) -> std::io::Result<bool> {
    use std::os::unix::io::AsRawFd;

    // SAFETY: flock on a valid, owned file descriptor.
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        return Ok(true);
    }
    let err = std::io::Error::last_os_error();
    if err.kind() == std::io::ErrorKind::WouldBlock {
        return Ok(false);
    }
    Err(err)
}

#[cfg(not(unix))]
fn try_lock_exclusive(_file: &std::fs::File) -> std::io::Result<bool> {
    Ok(true)
}

/// Quote one field. Embedded quotes and backslashes are backslash-escaped;
/// newlines collapse to spaces to keep the record stream line-oriented.
fn quote(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 2);
    out.push('"');
    for ch in field.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' | '\r' => out.push(' '),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

fn header_line() -> String {
    COLUMNS
        .iter()
        .map(|column| quote(column))
        .collect::<Vec<_>>()
        .join(",")
}

/// Run separator in the collaborator's comment format.
fn separator_line(stamp: &RunStamp) -> String {
    format!("# Jobs Scraped at : , #, {}, {}", stamp.date, stamp.time)
}

fn format_record(accepted: &AcceptedPosting) -> String {
    let posting = &accepted.posting;
    [
        quote(&posting.url),
        quote(&posting.title),
        quote(&posting.company),
        quote(&posting.location),
        quote(&accepted.scrape_date),
        quote(&accepted.scrape_time),
    ]
    .join(",")
}

/// Split one line into unquoted field values.
///
/// Handles quoted fields with backslash or doubled-quote escapes as well as
/// bare fields, and tolerates padding around separators. A structurally
/// broken line (an unterminated quote, junk between fields) yields `None`.
fn parse_fields(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while matches!(chars.peek(), Some(' ' | '\t')) {
            chars.next();
        }

        let field = if chars.peek() == Some(&'"') {
            chars.next();
            let mut out = String::new();
            loop {
                match chars.next()? {
                    '\\' => out.push(chars.next()?),
                    // A doubled quote is a literal one; a lone quote closes
                    // the field.
                    '"' if chars.peek() == Some(&'"') => {
                        chars.next();
                        out.push('"');
                    }
                    '"' => break,
                    ch => out.push(ch),
                }
            }
            out
        } else {
            let mut out = String::new();
            while let Some(&ch) = chars.peek() {
                if ch == ',' {
                    break;
                }
                out.push(ch);
                chars.next();
            }
            out.trim_end().to_string()
        };
        fields.push(field);

        while matches!(chars.peek(), Some(' ' | '\t')) {
            chars.next();
        }
        match chars.next() {
            Some(',') => continue,
            None => break,
            Some(_) => return None,
        }
    }

    Some(fields)
}

/// Collect the URL column of every record in `contents`.
fn collect_urls(contents: &str, path: &Path) -> HashSet<String> {
    let mut lines = data_lines(contents);

    let url_idx = match lines.next().and_then(url_column) {
        Some(idx) => idx,
        None => {
            warn!(
                path = %path.display(),
                "History record has no job_url column; deduplication degraded to empty"
            );
            return HashSet::new();
        }
    };

    lines
        .filter_map(|line| match parse_fields(line) {
            Some(fields) => fields.get(url_idx).cloned(),
            None => {
                warn!(
                    path = %path.display(),
                    line,
                    "Skipping unparseable history record; its URL is not deduplicated"
                );
                None
            }
        })
        .filter(|url| !url.is_empty())
        .collect()
}

/// Non-comment, non-blank lines, in file order. The first is the header.
fn data_lines(contents: &str) -> impl Iterator<Item = &str> {
    contents.lines().filter(|line| {
        let trimmed = line.trim_start();
        !trimmed.is_empty() && !trimmed.starts_with('#')
    })
}

fn url_column(header: &str) -> Option<usize> {
    parse_fields(header)?.iter().position(|f| f.trim() == "job_url")
}

//! `search_in_file PATH PHRASE`, a KMP substring search over a large file,
//! parallelized across line-number-tagged chunks using the same
//! re-entrant-submission and chunk-completion-condvar pattern
//! [`crate::tasks::sort_big_vec`] uses.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::condvar::Condvar;
use crate::core::error::TaskError;
use crate::core::scheduler::PoolHandle;
use crate::core::task::Task;
use crate::mutex::Mutex;
use crate::tasks::kmp;

/// Number of lines handed to each `SearchInAChunk` sub-task, matching the
/// original's own `chunk_size = 100`.
const LINES_PER_CHUNK: usize = 100;

struct SearchState {
    /// line number (1-based) -> matched line text.
    matches: BTreeMap<usize, String>,
    completed: usize,
}

struct Shared {
    phrase: String,
    state: Mutex<SearchState>,
    chunks_done: Condvar,
}

/// Re-entrant parent task: reads `path` in line-chunks, submits one
/// `SearchInAChunk` per chunk through its [`PoolHandle`], waits for all of
/// them, then presents the matching line numbers.
pub struct SearchInFile {
    path: String,
    shared: Arc<Shared>,
}

impl SearchInFile {
    /// Builds a task searching `path` for `phrase`.
    #[must_use]
    pub fn new(path: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            shared: Arc::new(Shared {
                phrase: phrase.into(),
                state: Mutex::new(SearchState { matches: BTreeMap::new(), completed: 0 }),
                chunks_done: Condvar::new(),
            }),
        }
    }
}

impl Task for SearchInFile {
    fn execute(&self, pool: &PoolHandle) -> Result<(), TaskError> {
        let file = fs::File::open(&self.path)?;
        let lines: Vec<(usize, String)> = io::BufReader::new(file)
            .lines()
            .enumerate()
            .map(|(i, line)| Ok::<_, io::Error>((i + 1, line?)))
            .collect::<Result<_, _>>()?;

        let expected = lines.chunks(LINES_PER_CHUNK).count().max(1);
        let mut submitted = 0;
        for chunk in lines.chunks(LINES_PER_CHUNK) {
            let sub = Arc::new(SearchInAChunk { lines: chunk.to_vec(), shared: self.shared.clone() });
            pool.submit(sub).map_err(|e| TaskError::Failed { reason: e.to_string() })?;
            submitted += 1;
        }
        if submitted == 0 {
            return Ok(());
        }

        pool.set_current_worker_waiting(true);
        {
            let mut state = self.shared.state.lock();
            self.shared.chunks_done.wait_while(&mut state, |s| s.completed < submitted.min(expected));
        }
        pool.set_current_worker_waiting(false);
        Ok(())
    }

    fn present(&self, out: &mut dyn Write) -> std::io::Result<()> {
        let state = self.shared.state.lock();
        if state.matches.is_empty() {
            writeln!(out, "No matches for \"{}\" in {}", self.shared.phrase, self.path)?;
            return Ok(());
        }
        writeln!(out, "Matches for \"{}\" in {} at lines:", self.shared.phrase, self.path)?;
        let line_numbers: Vec<String> = state.matches.keys().map(ToString::to_string).collect();
        writeln!(out, "{}", line_numbers.join(" "))?;

        write!(out, "Show matching lines? [y/N] ")?;
        out.flush()?;
        let mut answer = String::new();
        if io::stdin().read_line(&mut answer).is_ok() && answer.trim().eq_ignore_ascii_case("y") {
            for (line_no, text) in &state.matches {
                writeln!(out, "{line_no}: {text}")?;
            }
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("Searched for \"{}\" in {}", self.shared.phrase, self.path)
    }
}

/// Sub-task of [`SearchInFile`]: KMP-searches one line-chunk for the
/// parent's phrase and reports matches back through the shared state.
struct SearchInAChunk {
    lines: Vec<(usize, String)>,
    shared: Arc<Shared>,
}

impl Task for SearchInAChunk {
    fn execute(&self, _pool: &PoolHandle) -> Result<(), TaskError> {
        let needle = self.shared.phrase.as_bytes();
        let mut found = Vec::new();
        for (line_no, text) in &self.lines {
            if kmp::contains(text.as_bytes(), needle) {
                found.push((*line_no, text.clone()));
            }
        }

        let mut state = self.shared.state.lock();
        state.matches.extend(found);
        state.completed += 1;
        self.shared.chunks_done.notify_one();
        Ok(())
    }

    fn present(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "Chunk search completed")
    }

    fn description(&self) -> String {
        "Auxiliary task for searching a chunk".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::core::scheduler::TaskPool;
    use std::io::Write as _;
    use std::sync::Arc as StdArc;

    #[test]
    fn finds_matching_line_numbers() {
        // Drives `execute` directly (rather than through `present`) so the
        // test never touches the interactive stdin prompt `present` issues
        // when matches are found.
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("haystack.txt");
        {
            let mut f = fs::File::create(&file_path).unwrap();
            writeln!(f, "the quick brown fox").unwrap();
            writeln!(f, "jumps over the lazy dog").unwrap();
            writeln!(f, "another quick line").unwrap();
        }

        let config = PoolConfig {
            worker_count: 2,
            max_workers: 4,
            sample_interval_ms: 20,
            audit_log_path: dir.path().join("log.txt"),
        };
        let pool = TaskPool::new(&config).unwrap();
        let task = SearchInFile::new(file_path.to_string_lossy().to_string(), "quick");
        task.execute(&pool.handle()).unwrap();

        let state = task.shared.state.lock();
        let lines: Vec<usize> = state.matches.keys().copied().collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn empty_match_set_reports_no_matches() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("haystack.txt");
        fs::write(&file_path, "nothing interesting here\n").unwrap();

        let config = PoolConfig {
            worker_count: 1,
            max_workers: 2,
            sample_interval_ms: 20,
            audit_log_path: dir.path().join("log.txt"),
        };
        let pool = TaskPool::new(&config).unwrap();
        let task = SearchInFile::new(file_path.to_string_lossy().to_string(), "zzz_absent");
        let id = pool.submit(StdArc::new(task)).unwrap();
        pool.wait_until_drained();

        let mut out = Vec::new();
        pool.await_result_by_id(id, &mut out);
        assert!(String::from_utf8(out).unwrap().contains("No matches"));
    }
}

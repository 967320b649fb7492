//! `sort_big_vec N`, an external-memory sort of `N` random 16-bit integers.
//!
//! The parent writes the generated values to a scratch file, splits them
//! into chunks, submits one `SortingChunk` sub-task per chunk through its
//! [`PoolHandle`] (re-entrant submission), blocks on a condvar until every
//! chunk reports back, then k-way merges the sorted chunk files into a
//! result file.
//!
//! The scratch directory, the generated-input file, and the result file are
//! reachable only through [`Shared`], which every `SortingChunk` holds an
//! `Arc` clone of alongside the parent `SortBigVec` itself. Cleanup lives in
//! `Shared`'s `Drop`, so it runs automatically once the last clone, parent
//! or sub-task, is released. That can never happen before every sub-task
//! has finished, because `SortBigVec::execute` blocks on the
//! chunk-completion condvar before it returns.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::Rng;

use crate::condvar::Condvar;
use crate::core::error::TaskError;
use crate::core::scheduler::PoolHandle;
use crate::core::task::Task;
use crate::mutex::Mutex;

/// Kept small enough that a multi-megabyte `sort_big_vec N` submission on a
/// few-worker pool genuinely contends workers, the stall `core::controller`
/// is built to recover from.
const DEFAULT_CHUNK_SIZE: usize = 1_000_000;

struct ChunkState {
    temp_files: Vec<PathBuf>,
    completed: usize,
}

/// State shared between a `SortBigVec` and every `SortingChunk` it spawns.
/// Scratch files live as long as any clone of this `Arc` does.
struct Shared {
    base_dir: PathBuf,
    file_id: u64,
    next_chunk: AtomicU64,
    state: Mutex<ChunkState>,
    chunks_done: Condvar,
}

impl Shared {
    fn int_vec_path(&self) -> PathBuf {
        self.base_dir.join(format!("{}_int_vec.txt", self.file_id))
    }

    fn tmp_dir(&self) -> PathBuf {
        self.base_dir.join(format!("{}_tmp_files", self.file_id))
    }

    fn result_path(&self) -> PathBuf {
        self.base_dir.join(format!("result_{}.txt", self.file_id))
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(self.tmp_dir());
        let _ = fs::remove_file(self.int_vec_path());
        let _ = fs::remove_file(self.result_path());
    }
}

/// Picks the lowest `k >= 1` such that neither `{k}_int_vec.txt` nor
/// `{k}_tmp_files/` already exists under `base_dir`, mirroring the
/// original's own "find an unused numeric prefix" constructor loop.
fn next_free_file_id(base_dir: &Path) -> u64 {
    let mut k = 1u64;
    loop {
        let vec_path = base_dir.join(format!("{k}_int_vec.txt"));
        let dir_path = base_dir.join(format!("{k}_tmp_files"));
        if !vec_path.exists() && !dir_path.exists() {
            return k;
        }
        k += 1;
    }
}

/// External-memory sort: generates `n` random `i16`s, sorts them via
/// parallel chunk sub-tasks, and k-way merges the sorted chunks into a
/// result file.
pub struct SortBigVec {
    n: usize,
    chunk_size: usize,
    shared: Arc<Shared>,
    sorted_ok: Mutex<Option<bool>>,
}

impl SortBigVec {
    /// Builds a task sorting `n` random `i16`s, scratching files in the
    /// current directory.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self::with_base_dir(n, DEFAULT_CHUNK_SIZE, PathBuf::from("."))
    }

    /// Builds a task with an explicit scratch directory and chunk size, for
    /// tests that want to avoid littering the real working directory and
    /// want a deterministic sub-task fan-out.
    #[must_use]
    pub fn with_base_dir(n: usize, chunk_size: usize, base_dir: PathBuf) -> Self {
        let file_id = next_free_file_id(&base_dir);
        let shared = Arc::new(Shared {
            base_dir,
            file_id,
            next_chunk: AtomicU64::new(0),
            state: Mutex::new(ChunkState { temp_files: Vec::new(), completed: 0 }),
            chunks_done: Condvar::new(),
        });
        fs::create_dir_all(shared.tmp_dir()).ok();
        Self { n, chunk_size: chunk_size.max(1), shared, sorted_ok: Mutex::new(None) }
    }
}

impl Task for SortBigVec {
    fn execute(&self, pool: &PoolHandle) -> Result<(), TaskError> {
        let mut rng = rand::rng();
        let values: Vec<i16> = (0..self.n).map(|_| rng.random()).collect();

        {
            let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
            fs::write(self.shared.int_vec_path(), rendered.join(" "))?;
        }

        let chunks: Vec<Vec<i16>> = values.chunks(self.chunk_size).map(<[i16]>::to_vec).collect();
        let expected = chunks.len();

        for chunk in chunks {
            let sub = Arc::new(SortingChunk { arr: Mutex::new(chunk), shared: self.shared.clone() });
            pool.submit(sub).map_err(|e| TaskError::Failed { reason: e.to_string() })?;
        }

        pool.set_current_worker_waiting(true);
        {
            let mut state = self.shared.state.lock();
            self.shared.chunks_done.wait_while(&mut state, |s| s.completed < expected);
        }
        pool.set_current_worker_waiting(false);

        let ok = merge_sorted_chunks(&self.shared, self.n)?;
        *self.sorted_ok.lock() = Some(ok);
        Ok(())
    }

    fn present(&self, out: &mut dyn Write) -> std::io::Result<()> {
        match *self.sorted_ok.lock() {
            Some(true) => writeln!(out, "The file was sorted correctly"),
            Some(false) => writeln!(out, "An error occurred while sorting the file"),
            None => writeln!(out, "No result available"),
        }
    }

    fn description(&self) -> String {
        format!("Created and sorted file of {} elements", self.n)
    }
}

/// K-way merges every chunk's temp file into the result file via a min-heap
/// over `(value, chunk_index)`, and reports whether the merged output is
/// non-decreasing and has exactly `expected_len` elements.
fn merge_sorted_chunks(shared: &Shared, expected_len: usize) -> io::Result<bool> {
    let temp_files = shared.state.lock().temp_files.clone();
    let mut chunk_values: Vec<Vec<i16>> = Vec::with_capacity(temp_files.len());
    for path in &temp_files {
        let contents = fs::read_to_string(path)?;
        chunk_values.push(contents.split_whitespace().map(|t| t.parse().unwrap_or(0)).collect());
    }

    let mut cursors = vec![0usize; chunk_values.len()];
    let mut heap: BinaryHeap<Reverse<(i16, usize)>> = BinaryHeap::new();
    for (i, chunk) in chunk_values.iter().enumerate() {
        if let Some(&first) = chunk.first() {
            heap.push(Reverse((first, i)));
        }
    }

    let mut merged = Vec::with_capacity(expected_len);
    while let Some(Reverse((value, chunk_idx))) = heap.pop() {
        merged.push(value);
        cursors[chunk_idx] += 1;
        if let Some(&next) = chunk_values[chunk_idx].get(cursors[chunk_idx]) {
            heap.push(Reverse((next, chunk_idx)));
        }
    }

    let rendered: Vec<String> = merged.iter().map(ToString::to_string).collect();
    fs::write(shared.result_path(), rendered.join(" "))?;

    let sorted = merged.windows(2).all(|w| w[0] <= w[1]);
    Ok(sorted && merged.len() == expected_len)
}

/// Sub-task of [`SortBigVec`]: sorts one chunk in place and writes it to a
/// uniquely-named file under the parent's scratch directory.
struct SortingChunk {
    arr: Mutex<Vec<i16>>,
    shared: Arc<Shared>,
}

impl Task for SortingChunk {
    fn execute(&self, _pool: &PoolHandle) -> Result<(), TaskError> {
        let mut arr = self.arr.lock();
        arr.sort_unstable();

        let chunk_id = self.shared.next_chunk.fetch_add(1, Ordering::AcqRel);
        let path = self.shared.tmp_dir().join(format!("{chunk_id}.txt"));
        let rendered: Vec<String> = arr.iter().map(ToString::to_string).collect();
        fs::write(&path, rendered.join(" "))?;

        let mut state = self.shared.state.lock();
        state.temp_files.push(path);
        state.completed += 1;
        self.shared.chunks_done.notify_one();
        Ok(())
    }

    fn present(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "The sorting of the chunk is completed")
    }

    fn description(&self) -> String {
        "Auxiliary task for sorting the chunk".to_string()
    }
}

//! Command-line front end for the task-execution server.
//!
//! Reads newline-delimited commands from standard input, dispatches them
//! against a [`TaskPool`], and prints the command summary on startup.
//! Unknown commands print `Error: ...` and the REPL continues; `exit`
//! breaks the loop and lets `TaskPool::shutdown` drain and join before
//! returning exit code `0`.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use task_pool::config::PoolConfig;
use task_pool::core::error::AppResult;
use task_pool::core::scheduler::TaskPool;
use task_pool::tasks::{ComputePrimes, SearchInFile, SortBigVec, SortRandom, WaitEcho};
use task_pool::util::init_tracing;

const BANNER: &str = "\
Server started. Enter commands:
compute_primes N
sort_random N
wait_echo SECONDS MESSAGE
sort_big_vec N
search_in_file
result ID
pause - to pause working server
start - to resume working server
count working threads - press '?'
count waiting threads - press '!'
exit";

fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = load_config();
    let mut pool = match TaskPool::new(&config) {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("failed to start task pool: {err}");
            std::process::exit(1);
        }
    };

    println!("{BANNER}");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line == "exit" {
            break;
        }

        if let Err(err) = dispatch(&pool, line) {
            println!("Error: {err}");
        }
    }

    pool.shutdown(Duration::from_secs(5));
    println!("Server shut down.");
}

/// Loads pool configuration from `TASK_POOL_*` environment variables
/// (populated from `.env` via `dotenvy` if present), falling back to
/// [`PoolConfig::default`] for anything unset.
fn load_config() -> PoolConfig {
    let mut config = PoolConfig::default();
    if let Ok(workers) = std::env::var("TASK_POOL_WORKERS") {
        if let Ok(n) = workers.parse() {
            config.worker_count = n;
        }
    }
    if let Ok(max_workers) = std::env::var("TASK_POOL_MAX_WORKERS") {
        if let Ok(n) = max_workers.parse() {
            config.max_workers = n;
        }
    }
    if let Ok(path) = std::env::var("TASK_POOL_AUDIT_LOG") {
        config.audit_log_path = path.into();
    }
    config
}

fn dispatch(pool: &TaskPool, line: &str) -> AppResult<()> {
    let mut parts = line.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default().trim();

    match command {
        "compute_primes" => {
            let n: u64 = rest.parse()?;
            pool.submit(Arc::new(ComputePrimes::new(n)))?;
        }
        "sort_random" => {
            let n: usize = rest.parse()?;
            pool.submit(Arc::new(SortRandom::new(n)))?;
        }
        "wait_echo" => {
            let mut args = rest.splitn(2, char::is_whitespace);
            let seconds: u64 = args.next().unwrap_or_default().parse()?;
            let message = args.next().unwrap_or_default();
            pool.submit(Arc::new(WaitEcho::new(seconds, message)))?;
        }
        "sort_big_vec" => {
            let n: usize = rest.parse()?;
            pool.submit(Arc::new(SortBigVec::new(n)))?;
        }
        "search_in_file" => {
            let mut args = rest.splitn(2, char::is_whitespace);
            let path = args.next().unwrap_or_default();
            let phrase = args.next().unwrap_or_default();
            if path.is_empty() || phrase.is_empty() {
                anyhow::bail!("search_in_file requires a path and a phrase");
            }
            pool.submit(Arc::new(SearchInFile::new(path, phrase)))?;
        }
        "result" => {
            let id = rest.parse()?;
            let mut out = io::stdout();
            pool.await_result_by_id(id, &mut out);
            out.flush()?;
        }
        "pause" => pool.pause(),
        "start" => pool.resume(),
        "?" => {
            let _console = pool.lock_console();
            println!("{}", pool.working_count());
        }
        "!" => {
            let _console = pool.lock_console();
            println!("{}", pool.waiting_count());
        }
        other => anyhow::bail!("Unknown command: {other}"),
    }
    Ok(())
}

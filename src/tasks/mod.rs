//! Concrete task bodies submitted from the command line. Kept as a sibling
//! module to the pool's core rather than inside it: the pool dispatches
//! `Arc<dyn Task>` without caring what kind of task it is, and the REPL
//! has nothing to dispatch without these.

mod compute_primes;
mod kmp;
mod search_in_file;
mod sort_big_vec;
mod sort_random;
mod wait_echo;

pub use compute_primes::ComputePrimes;
pub use search_in_file::SearchInFile;
pub use sort_big_vec::SortBigVec;
pub use sort_random::SortRandom;
pub use wait_echo::WaitEcho;

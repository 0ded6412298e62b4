//! Drives the benchmark pipeline from Run creation to Result/Error
//! persistence under concurrency, retry, and budget constraints.

mod prompt;
mod run;
mod runner;

pub use llmb_validator::normalize_model_name;
pub use prompt::BENCHMARK_PROMPT;
pub use run::RunManager;
pub use runner::{
    get_run_queue_stats, init_benchmark_queue, run_benchmark_batch, BatchOutcome, DEFAULT_BATCH_SIZE,
    MAX_BATCH_SIZE, MIN_BATCH_SIZE,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_size_bounds_match_spec() {
        assert_eq!(MIN_BATCH_SIZE, 1);
        assert_eq!(MAX_BATCH_SIZE, 50);
        assert_eq!(DEFAULT_BATCH_SIZE, 10);
    }
}

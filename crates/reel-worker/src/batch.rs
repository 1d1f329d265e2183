//! Bounded-concurrency batch rendering.

use async_trait::async_trait;
use reel_models::{BatchSummary, JobId, JobStage, RenderRequest, RenderResult};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Error kind reported for jobs that panicked or could not be scheduled.
pub const INTERNAL_ERROR_KIND: &str = "internal_error";

/// Anything that can run one render job to a result.
#[async_trait]
pub trait JobRunner: Send + Sync + 'static {
    async fn run_job(&self, job_id: JobId, request: RenderRequest) -> RenderResult;
}

/// Number of jobs allowed to run at once.
pub fn worker_count(requested: usize, jobs: usize, host_cap: usize) -> usize {
    requested.min(jobs).min(host_cap).max(1)
}

/// Run `requests` with at most `min(max_concurrency, jobs, host_cap)` in flight.
///
/// One job's failure or panic never affects the others: every request yields
/// exactly one result, in completion order.
pub async fn render_batch<R: JobRunner>(
    runner: Arc<R>,
    requests: Vec<RenderRequest>,
    max_concurrency: usize,
    host_cap: usize,
) -> BatchSummary {
    let started = Instant::now();
    let total = requests.len();
    if total == 0 {
        return BatchSummary::from_results(Vec::new(), started.elapsed().as_secs_f64());
    }

    let workers = worker_count(max_concurrency, total, host_cap);
    info!(jobs = total, workers, "batch started");

    let semaphore = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();

    for request in requests {
        let runner = Arc::clone(&runner);
        let semaphore = Arc::clone(&semaphore);
        let job_id = JobId::new();

        tasks.spawn(async move {
            let job_started = Instant::now();
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return RenderResult::failure(
                        job_id,
                        JobStage::Created,
                        INTERNAL_ERROR_KIND,
                        "batch scheduler closed",
                        job_started.elapsed().as_secs_f64(),
                    )
                }
            };

            // Inner task so a panic surfaces as a JoinError instead of tearing down the batch
            let inner_id = job_id.clone();
            let handle = tokio::spawn(async move { runner.run_job(inner_id, request).await });
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    error!(job_id = %job_id, error = %e, "render job panicked");
                    RenderResult::failure(
                        job_id,
                        JobStage::Failed,
                        INTERNAL_ERROR_KIND,
                        format!("job aborted: {e}"),
                        job_started.elapsed().as_secs_f64(),
                    )
                }
            }
        });
    }

    let mut results = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => {
                error!(error = %e, "batch task aborted");
                results.push(RenderResult::failure(
                    JobId::new(),
                    JobStage::Failed,
                    INTERNAL_ERROR_KIND,
                    format!("batch task aborted: {e}"),
                    started.elapsed().as_secs_f64(),
                ));
            }
        }
    }

    let summary = BatchSummary::from_results(results, started.elapsed().as_secs_f64());
    info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        elapsed_secs = summary.elapsed_seconds,
        "batch finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count() {
        assert_eq!(worker_count(8, 3, 4), 3);
        assert_eq!(worker_count(2, 10, 4), 2);
        assert_eq!(worker_count(16, 10, 4), 4);
        assert_eq!(worker_count(0, 10, 4), 1);
    }

    struct Echo;

    #[async_trait]
    impl JobRunner for Echo {
        async fn run_job(&self, job_id: JobId, request: RenderRequest) -> RenderResult {
            if request.hook == "boom" {
                panic!("renderer exploded");
            }
            RenderResult::failure(job_id, JobStage::Fetching, "fetch_error", request.hook, 0.0)
        }
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let summary = render_batch(Arc::new(Echo), Vec::new(), 4, 4).await;
        assert_eq!(summary.total, 0);
        assert!(summary.results.is_empty());
    }

    #[tokio::test]
    async fn test_panic_becomes_failed_result() {
        let requests = vec![
            RenderRequest::new("a", "", "toxic", "https://x.test/a.mp3"),
            RenderRequest::new("boom", "", "toxic", "https://x.test/b.mp3"),
            RenderRequest::new("c", "", "toxic", "https://x.test/c.mp3"),
        ];
        let summary = render_batch(Arc::new(Echo), requests, 2, 4).await;

        assert_eq!(summary.total, 3);
        assert_eq!(summary.failed, 3);
        let kinds: Vec<_> = summary
            .results
            .iter()
            .filter_map(|r| r.error_kind.as_deref())
            .collect();
        assert_eq!(kinds.iter().filter(|k| **k == INTERNAL_ERROR_KIND).count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == "fetch_error").count(), 2);
    }
}

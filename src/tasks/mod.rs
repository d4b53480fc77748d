//! Concurrent draw runs and background maintenance jobs.
//!
//! `run_simulation` drives a batch of draws against a shared engine, injecting
//! repeated submissions of a fixed request id the way a retrying client would.
//! `spawn_admission_purge` periodically drops expired ids from an
//! `ExpiringAdmissionStore`.

use crate::config::SimulationConfig;
use crate::error::{AppError, AppResult};
use crate::models::{DrawResolution, DrawSummary};
use crate::services::{DrawEngine, ExpiringAdmissionStore};
use crate::utils::generate_request_id;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Run `config.draws` draws concurrently and tally the results.
///
/// Notes
/// - Every draw gets a fresh `REQ-xxxxxxxx` id.
/// - Every `duplicate_every` draws (starting with the first) the fixed
///   `duplicate_request_id` is submitted twice; only its first submission can
///   ever be admitted.
pub async fn run_simulation(
    engine: Arc<DrawEngine>,
    config: &SimulationConfig,
) -> AppResult<DrawSummary> {
    let mut handles: Vec<JoinHandle<DrawResolution>> = Vec::new();

    for i in 0..config.draws {
        handles.push(spawn_draw(engine.clone(), generate_request_id()));

        if config.duplicate_every > 0 && i % config.duplicate_every == 0 {
            log::info!(
                "Submitting duplicate request: {}",
                config.duplicate_request_id
            );
            for _ in 0..2 {
                handles.push(spawn_draw(
                    engine.clone(),
                    config.duplicate_request_id.clone(),
                ));
            }
        }
    }

    let mut summary = DrawSummary::default();
    for result in join_all(handles).await {
        let resolution =
            result.map_err(|e| AppError::InternalError(format!("Draw task failed: {e}")))?;
        summary.record(&resolution);
    }

    log::info!(
        "Simulation finished: {} requests, {} won, {} consolation ({} sold out), {} duplicate",
        summary.total,
        summary.total_won(),
        summary.consolation,
        summary.sold_out,
        summary.duplicate
    );
    Ok(summary)
}

fn spawn_draw(engine: Arc<DrawEngine>, request_id: String) -> JoinHandle<DrawResolution> {
    tokio::spawn(async move { engine.resolve(&request_id) })
}

/// Spawn a detached task purging expired request ids every `interval`.
pub fn spawn_admission_purge(
    store: Arc<ExpiringAdmissionStore>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // 第一次 tick 立即返回
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let purged = store.purge_expired();
            if purged > 0 {
                log::info!("Purged {purged} expired request ids");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_catalog;
    use crate::services::AdmissionStore;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_run_simulation_counts() {
        let engine = Arc::new(DrawEngine::new(default_catalog()).unwrap());
        let config = SimulationConfig {
            draws: 100,
            duplicate_every: 20,
            ..Default::default()
        };

        let summary = run_simulation(engine.clone(), &config).await.unwrap();

        // 100 次唯一请求 + 5 轮 x 2 次重复请求
        assert_eq!(summary.total, 110);
        assert_eq!(summary.duplicate, 9);
        assert_eq!(engine.processed_count(), 101);
        assert!(summary.won_count("P001") <= 1);
        assert!(summary.won_count("P002") <= 5);
        assert!(summary.won_count("P003") <= 50);
        assert_eq!(
            summary.total_won() + summary.consolation + summary.duplicate,
            summary.total
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_simulation_without_duplicates() {
        let engine = Arc::new(DrawEngine::new(default_catalog()).unwrap());
        let config = SimulationConfig {
            draws: 50,
            duplicate_every: 0,
            ..Default::default()
        };

        let summary = run_simulation(engine, &config).await.unwrap();
        assert_eq!(summary.total, 50);
        assert_eq!(summary.duplicate, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_admission_purge_task() {
        let store = Arc::new(ExpiringAdmissionStore::new(Duration::from_millis(1)).unwrap());
        store.try_admit("REQ-1");
        store.try_admit("REQ-2");
        // ttl 使用真实时钟, 不受暂停的 tokio 时间影响
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.len(), 2);

        let handle = spawn_admission_purge(store.clone(), Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(11)).await;
        tokio::task::yield_now().await;

        assert_eq!(store.len(), 0);
        handle.abort();
    }
}

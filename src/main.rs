use anyhow::Context;
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;
use std::time::Duration;

use wheel_draw::{
    config::Config,
    services::{AdmissionStore, DrawEngine, ExpiringAdmissionStore, InMemoryAdmissionStore},
    tasks,
    utils::{RandomSource, SeededRandomSource, ThreadRngSource},
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().context("Failed to load configuration file")?;

    // 固定大小的工作线程池
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.simulation.workers.max(1))
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(run(config))
}

async fn run(config: Config) -> anyhow::Result<()> {
    // 请求准入存储: 配置了 ttl 则使用带过期的实现, 并启动后台清理
    let admission: Arc<dyn AdmissionStore> = match config.admission.ttl_seconds {
        Some(ttl) => {
            let store = Arc::new(ExpiringAdmissionStore::new(Duration::from_secs(ttl))?);
            tasks::spawn_admission_purge(store.clone(), Duration::from_secs(ttl.max(1)));
            store
        }
        None => Arc::new(InMemoryAdmissionStore::new()),
    };

    let random: Arc<dyn RandomSource> = match config.simulation.seed {
        Some(seed) => Arc::new(SeededRandomSource::new(seed)),
        None => Arc::new(ThreadRngSource),
    };

    let engine = Arc::new(
        DrawEngine::with_parts(config.catalog(), admission, random)
            .context("Invalid prize catalog")?,
    );

    log::info!("Prize status before draws:");
    for status in engine.current_prize_status() {
        log::info!("{status}");
    }

    let summary = tasks::run_simulation(engine.clone(), &config.simulation).await?;

    log::info!("Prize status after draws:");
    for status in engine.current_prize_status() {
        log::info!("{status}");
    }
    log::info!("Draw summary: {}", serde_json::to_string(&summary)?);
    log::info!(
        "Processed request count (first attempt of duplicated ids included): {}",
        engine.processed_count()
    );

    Ok(())
}

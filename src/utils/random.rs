//! Random sources used by candidate selection.
//!
//! Production draws use `ThreadRngSource`; `SequenceRandomSource` and
//! `SeededRandomSource` make selection reproducible for tests and replays.

use crate::error::{AppError, AppResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 随机数来源, 返回 `[0.0, 1.0)` 内均匀分布的值
pub trait RandomSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// 每次调用使用 `rand::thread_rng()`, 各抽奖线程之间无共享状态
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn next_unit(&self) -> f64 {
        rand::thread_rng().gen_range(0.0..1.0)
    }
}

/// 按固定序列返回随机值, 用完后从头循环 (测试 / 回放使用)
#[derive(Debug)]
pub struct SequenceRandomSource {
    values: Vec<f64>,
    index: AtomicUsize,
}

impl SequenceRandomSource {
    pub fn new(values: Vec<f64>) -> AppResult<Self> {
        if values.is_empty() {
            return Err(AppError::ValidationError(
                "Random sequence cannot be empty".into(),
            ));
        }
        if let Some(bad) = values.iter().find(|v| !(0.0..1.0).contains(*v)) {
            return Err(AppError::ValidationError(format!(
                "Random value {bad} is outside [0.0, 1.0)"
            )));
        }
        Ok(Self {
            values,
            index: AtomicUsize::new(0),
        })
    }
}

impl RandomSource for SequenceRandomSource {
    fn next_unit(&self) -> f64 {
        let idx = self.index.fetch_add(1, Ordering::Relaxed);
        self.values[idx % self.values.len()]
    }
}

/// 固定种子的 `StdRng` (互斥锁保护)
///
/// 单一调用方时结果可复现; 多线程并发时哪次抽奖拿到哪个值取决于调度顺序。
#[derive(Debug)]
pub struct SeededRandomSource {
    rng: Mutex<StdRng>,
}

impl SeededRandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandomSource {
    fn next_unit(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(0.0..1.0)
    }
}

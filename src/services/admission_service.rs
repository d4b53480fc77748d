use crate::error::{AppError, AppResult};
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use std::time::{Duration, Instant};

/// 请求准入存储: 每个请求 ID 只允许被准入一次
///
/// `try_admit` 必须对同一 ID 的并发调用保持原子: 恰好一个调用方返回 true。
pub trait AdmissionStore: Send + Sync {
    fn try_admit(&self, request_id: &str) -> bool;

    /// 当前记录的请求 ID 数量
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 默认实现: 内存中只增不减的集合
///
/// 注意: 集合会持续增长, 长期运行的进程应改用 [`ExpiringAdmissionStore`]
/// 或其他有容量/过期上限的实现。
#[derive(Debug, Default)]
pub struct InMemoryAdmissionStore {
    processed: DashSet<String>,
}

impl InMemoryAdmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, request_id: &str) -> bool {
        self.processed.contains(request_id)
    }
}

impl AdmissionStore for InMemoryAdmissionStore {
    fn try_admit(&self, request_id: &str) -> bool {
        self.processed.insert(request_id.to_owned())
    }

    fn len(&self) -> usize {
        self.processed.len()
    }
}

/// 带过期时间的准入存储
///
/// 同一 ID 在 ttl 内重复提交视为重复请求; 超过 ttl 后再次提交会被当作新请求准入。
/// ttl 必须大于 0, 否则每次重复提交都会被重新准入。
#[derive(Debug)]
pub struct ExpiringAdmissionStore {
    ttl: Duration,
    admitted: DashMap<String, Instant>,
}

impl ExpiringAdmissionStore {
    pub fn new(ttl: Duration) -> AppResult<Self> {
        if ttl.is_zero() {
            return Err(AppError::ValidationError(
                "Admission ttl must be greater than zero".into(),
            ));
        }
        Ok(Self {
            ttl,
            admitted: DashMap::new(),
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 清理已过期的请求 ID, 返回清理数量
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.admitted.len();
        self.admitted
            .retain(|_, admitted_at| now.duration_since(*admitted_at) < self.ttl);
        before.saturating_sub(self.admitted.len())
    }
}

impl AdmissionStore for ExpiringAdmissionStore {
    fn try_admit(&self, request_id: &str) -> bool {
        let now = Instant::now();
        // entry 持有分片写锁, 检查与写入在同一临界区内完成
        match self.admitted.entry(request_id.to_owned()) {
            Entry::Occupied(mut entry) => {
                if now.duration_since(*entry.get()) >= self.ttl {
                    entry.insert(now);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        }
    }

    fn len(&self) -> usize {
        self.admitted.len()
    }
}

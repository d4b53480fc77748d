use crate::entities::PrizeStock;
use crate::error::{AppError, AppResult};
use crate::models::{DrawOutcome, DrawResolution, DrawState, Prize, PrizeStatus, Quantity};
use crate::services::{AdmissionStore, InMemoryAdmissionStore};
use crate::utils::{RandomSource, ThreadRngSource};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// 概率总和允许的浮点误差
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// 按概率选出的候选项 (尚未检查库存)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// 奖品列表中的下标
    Prize(usize),
    /// 浮点舍入导致没有命中任何区间
    Fallback,
}

/// 抽奖引擎
///
/// 奖品列表在构建后不可变, 只有各奖品的剩余库存会变化。
/// 可通过 `Arc<DrawEngine>` 在多线程间共享并发调用 `draw`。
pub struct DrawEngine {
    prizes: Vec<PrizeStock>,
    total_probability: f64,
    admission: Arc<dyn AdmissionStore>,
    random: Arc<dyn RandomSource>,
}

impl fmt::Debug for DrawEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawEngine")
            .field("prizes", &self.prizes)
            .field("total_probability", &self.total_probability)
            .field("processed", &self.admission.len())
            .finish()
    }
}

impl DrawEngine {
    pub fn new(prizes: Vec<Prize>) -> AppResult<Self> {
        Self::with_parts(
            prizes,
            Arc::new(InMemoryAdmissionStore::new()),
            Arc::new(ThreadRngSource),
        )
    }

    pub fn with_admission_store(
        prizes: Vec<Prize>,
        admission: Arc<dyn AdmissionStore>,
    ) -> AppResult<Self> {
        Self::with_parts(prizes, admission, Arc::new(ThreadRngSource))
    }

    pub fn with_random_source(
        prizes: Vec<Prize>,
        random: Arc<dyn RandomSource>,
    ) -> AppResult<Self> {
        Self::with_parts(prizes, Arc::new(InMemoryAdmissionStore::new()), random)
    }

    /// 校验奖品列表并创建引擎
    ///
    /// 校验失败返回 `AppError::ValidationError`, 引擎不会被创建。
    pub fn with_parts(
        prizes: Vec<Prize>,
        admission: Arc<dyn AdmissionStore>,
        random: Arc<dyn RandomSource>,
    ) -> AppResult<Self> {
        let total_probability = validate_catalog(&prizes)?;

        log::info!(
            "Draw engine created with {} prizes (total probability {})",
            prizes.len(),
            total_probability
        );

        Ok(Self {
            prizes: prizes.into_iter().map(PrizeStock::new).collect(),
            total_probability,
            admission,
            random,
        })
    }

    /// 执行抽奖, 同一 request_id 只会被处理一次
    pub fn draw(&self, request_id: &str) -> DrawOutcome {
        self.resolve(request_id).outcome
    }

    /// 执行抽奖并返回终止状态
    ///
    /// 逻辑:
    /// 1. 准入: 请求 ID 已存在则直接返回 Duplicate, 不触碰库存
    /// 2. 按概率选出候选奖品
    /// 3. 兜底奖品直接返回 Consolation; 限量奖品原子扣减库存,
    ///    扣减失败 (已发完) 降级为 Consolation
    pub fn resolve(&self, request_id: &str) -> DrawResolution {
        if !self.admission.try_admit(request_id) {
            log::debug!("Request ID: {request_id} - duplicate draw request ignored");
            return DrawResolution {
                outcome: DrawOutcome::Duplicate,
                state: DrawState::RejectedDuplicate,
            };
        }

        let stock = match self.select_candidate(self.random.next_unit()) {
            Candidate::Prize(idx) if !self.prizes[idx].is_consolation() => &self.prizes[idx],
            _ => {
                log::debug!("Request ID: {request_id} - consolation");
                return DrawResolution {
                    outcome: DrawOutcome::Consolation,
                    state: DrawState::Consolation,
                };
            }
        };

        if stock.try_decrement() {
            log::debug!("Request ID: {request_id} - won {}", stock.name());
            DrawResolution {
                outcome: DrawOutcome::Won {
                    prize_id: stock.id().to_string(),
                    prize_name: stock.name().to_string(),
                },
                state: DrawState::Awarded,
            }
        } else {
            log::warn!(
                "Request ID: {request_id} - drew {} but it is sold out",
                stock.name()
            );
            DrawResolution {
                outcome: DrawOutcome::Consolation,
                state: DrawState::SoldOut,
            }
        }
    }

    /// 按累计概率区间选出候选项
    ///
    /// `r` 落在区间边界上时属于下一个区间 (严格小于比较)。
    pub fn select_candidate(&self, r: f64) -> Candidate {
        let mut cumulative = 0.0;
        for (idx, stock) in self.prizes.iter().enumerate() {
            cumulative += stock.probability();
            if r < cumulative {
                return Candidate::Prize(idx);
            }
        }
        Candidate::Fallback
    }

    /// 获取当前奖品库存情况 (各奖品分别读取, 不保证跨奖品的一致快照)
    pub fn current_prize_status(&self) -> Vec<PrizeStatus> {
        self.prizes.iter().map(PrizeStock::status).collect()
    }

    pub fn prizes(&self) -> &[PrizeStock] {
        &self.prizes
    }

    pub fn stock(&self, prize_id: &str) -> Option<&PrizeStock> {
        self.prizes.iter().find(|p| p.id() == prize_id)
    }

    pub fn total_probability(&self) -> f64 {
        self.total_probability
    }

    /// 已准入的请求数量 (重复请求只计首次)
    pub fn processed_count(&self) -> usize {
        self.admission.len()
    }
}

/// 校验奖品列表, 返回概率总和
fn validate_catalog(prizes: &[Prize]) -> AppResult<f64> {
    if prizes.is_empty() {
        return Err(AppError::ValidationError(
            "Prize list cannot be empty".into(),
        ));
    }

    let mut ids = HashSet::with_capacity(prizes.len());
    let mut consolation_count = 0;

    for prize in prizes {
        if !(0.0..=1.0).contains(&prize.probability) {
            return Err(AppError::ValidationError(format!(
                "Probability of prize {} must be between 0.0 and 1.0, got {}",
                prize.id, prize.probability
            )));
        }
        if let Quantity::Finite(n) = prize.quantity
            && n < 0
        {
            return Err(AppError::ValidationError(format!(
                "Quantity of prize {} cannot be negative, got {n}",
                prize.id
            )));
        }
        if prize.consolation {
            if !prize.quantity.is_unlimited() {
                return Err(AppError::ValidationError(format!(
                    "Consolation prize {} must have unlimited quantity",
                    prize.id
                )));
            }
            consolation_count += 1;
        }
        if !ids.insert(prize.id.as_str()) {
            return Err(AppError::ValidationError(format!(
                "Duplicate prize id: {}",
                prize.id
            )));
        }
    }

    if consolation_count > 1 {
        return Err(AppError::ValidationError(
            "At most one consolation prize is allowed".into(),
        ));
    }

    let total: f64 = prizes.iter().map(|p| p.probability).sum();
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(AppError::ValidationError(format!(
            "Total probability of prizes must sum up to 1.0. Current sum: {total}"
        )));
    }

    Ok(total)
}

use serde::Serialize;
use std::collections::BTreeMap;

/// 抽奖结果 (返回给调用方)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DrawOutcome {
    /// 抽中并成功扣减库存
    Won {
        prize_id: String,
        prize_name: String,
    },
    /// 谢谢参与 (按概率落入兜底, 或候选奖品已无库存)
    Consolation,
    /// 请求 ID 已处理过
    Duplicate,
}

impl DrawOutcome {
    pub fn is_won(&self) -> bool {
        matches!(self, DrawOutcome::Won { .. })
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, DrawOutcome::Duplicate)
    }

    pub fn prize_id(&self) -> Option<&str> {
        match self {
            DrawOutcome::Won { prize_id, .. } => Some(prize_id),
            _ => None,
        }
    }
}

/// 单次请求的终止状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawState {
    Awarded,
    Consolation,
    /// 按概率命中但库存已发完, 降级为 Consolation
    SoldOut,
    RejectedDuplicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawResolution {
    pub outcome: DrawOutcome,
    pub state: DrawState,
}

/// 一批抽奖的汇总统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrawSummary {
    pub total: u64,
    /// prize_id -> 中奖次数
    pub won: BTreeMap<String, u64>,
    /// 谢谢参与次数 (包含库存已发完的降级)
    pub consolation: u64,
    pub sold_out: u64,
    pub duplicate: u64,
}

impl DrawSummary {
    pub fn record(&mut self, resolution: &DrawResolution) {
        self.total += 1;
        match &resolution.outcome {
            DrawOutcome::Won { prize_id, .. } => {
                *self.won.entry(prize_id.clone()).or_default() += 1;
            }
            DrawOutcome::Consolation => self.consolation += 1,
            DrawOutcome::Duplicate => self.duplicate += 1,
        }
        if resolution.state == DrawState::SoldOut {
            self.sold_out += 1;
        }
    }

    pub fn won_count(&self, prize_id: &str) -> u64 {
        self.won.get(prize_id).copied().unwrap_or(0)
    }

    pub fn total_won(&self) -> u64 {
        self.won.values().sum()
    }

    /// 合并另一批统计 (多线程分别汇总后使用)
    pub fn merge(&mut self, other: DrawSummary) {
        self.total += other.total;
        for (prize_id, count) in other.won {
            *self.won.entry(prize_id).or_default() += count;
        }
        self.consolation += other.consolation;
        self.sold_out += other.sold_out;
        self.duplicate += other.duplicate;
    }
}

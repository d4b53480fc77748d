use serde::{Deserialize, Serialize};
use std::fmt;

/// 奖品数量 (有限 / 无限)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Finite(i64),
    Unlimited,
}

impl Quantity {
    /// 从库存上限构建 (None = 无限)
    pub fn from_limit(limit: Option<i64>) -> Self {
        match limit {
            Some(n) => Quantity::Finite(n),
            None => Quantity::Unlimited,
        }
    }

    /// 库存上限 (None = 无限)
    pub fn limit(&self) -> Option<i64> {
        match self {
            Quantity::Finite(n) => Some(*n),
            Quantity::Unlimited => None,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Quantity::Unlimited)
    }
}

/// 奖品定义
/// 概念说明:
/// - probability: 成为候选奖品的概率 (0.0 ~ 1.0)
/// - quantity: 初始库存 (Unlimited 表示无限)
/// - consolation: 是否为兜底奖品 (谢谢参与类, 必须无限库存)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prize {
    pub id: String,
    pub name: String,
    pub quantity: Quantity,
    pub probability: f64,
    #[serde(default)]
    pub consolation: bool,
}

impl Prize {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        quantity: Quantity,
        probability: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity,
            probability,
            consolation: false,
        }
    }

    /// 限量奖品
    pub fn limited(
        id: impl Into<String>,
        name: impl Into<String>,
        quantity: i64,
        probability: f64,
    ) -> Self {
        Self::new(id, name, Quantity::Finite(quantity), probability)
    }

    /// 无限库存奖品
    pub fn unlimited(id: impl Into<String>, name: impl Into<String>, probability: f64) -> Self {
        Self::new(id, name, Quantity::Unlimited, probability)
    }

    /// 兜底奖品 (无限库存, 命中即为 Consolation)
    pub fn consolation(id: impl Into<String>, name: impl Into<String>, probability: f64) -> Self {
        Self {
            consolation: true,
            ..Self::unlimited(id, name, probability)
        }
    }
}

/// 奖品当前状态快照（用于观察）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrizeStatus {
    pub id: String,
    pub name: String,
    pub probability: f64,
    /// 总库存 (None = 无限)
    pub stock_limit: Option<i64>,
    /// 剩余库存 (None = 无限)
    pub stock_remaining: Option<i64>,
    /// 已成功发放次数
    pub awarded: u64,
    pub consolation: bool,
}

impl fmt::Display for PrizeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let remaining = match self.stock_remaining {
            Some(n) => n.to_string(),
            None => "∞".to_string(),
        };
        write!(
            f,
            "Prize{{id='{}', name='{}', remaining={}, probability={}}}",
            self.id, self.name, remaining, self.probability
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_limit() {
        assert_eq!(Quantity::from_limit(Some(5)), Quantity::Finite(5));
        assert_eq!(Quantity::from_limit(None), Quantity::Unlimited);
        assert_eq!(Quantity::Finite(3).limit(), Some(3));
        assert!(Quantity::Unlimited.is_unlimited());
        assert!(!Quantity::Finite(0).is_unlimited());
    }

    #[test]
    fn test_consolation_constructor() {
        let prize = Prize::consolation("THANK_YOU", "Thank You", 0.74);
        assert!(prize.consolation);
        assert_eq!(prize.quantity, Quantity::Unlimited);

        let prize = Prize::limited("P001", "First Prize", 1, 0.01);
        assert!(!prize.consolation);
        assert_eq!(prize.quantity.limit(), Some(1));
    }

    #[test]
    fn test_status_display() {
        let status = PrizeStatus {
            id: "P002".into(),
            name: "Second Prize".into(),
            probability: 0.05,
            stock_limit: Some(5),
            stock_remaining: Some(3),
            awarded: 2,
            consolation: false,
        };
        assert_eq!(
            status.to_string(),
            "Prize{id='P002', name='Second Prize', remaining=3, probability=0.05}"
        );

        let unlimited = PrizeStatus {
            stock_limit: None,
            stock_remaining: None,
            ..status
        };
        assert!(unlimited.to_string().contains("remaining=∞"));
    }
}

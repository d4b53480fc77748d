use super::Prize;

pub const THANK_YOU_ID: &str = "THANK_YOU";
pub const THANK_YOU_NAME: &str = "Thank You";

/// 追加兜底奖品, 其概率 = 1.0 - 其他奖品概率总和
///
/// 若其他奖品概率总和已超过 1.0, 兜底概率取 0, 由引擎构建时的校验拒绝。
pub fn with_consolation_fill(
    mut prizes: Vec<Prize>,
    id: impl Into<String>,
    name: impl Into<String>,
) -> Vec<Prize> {
    let assigned: f64 = prizes.iter().map(|p| p.probability).sum();
    let fill = (1.0 - assigned).max(0.0);
    prizes.push(Prize::consolation(id, name, fill));
    prizes
}

/// 默认演示奖品列表
pub fn default_catalog() -> Vec<Prize> {
    let prizes = vec![
        Prize::limited("P001", "First Prize: iPhone 16 Pro Max", 1, 0.01),
        Prize::limited("P002", "Second Prize: AirPods 4", 5, 0.05),
        Prize::limited("P003", "Third Prize: $10 Coupon", 50, 0.20),
    ];
    with_consolation_fill(prizes, THANK_YOU_ID, THANK_YOU_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Quantity;

    #[test]
    fn test_default_catalog() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 4);

        let fill = &catalog[3];
        assert_eq!(fill.id, THANK_YOU_ID);
        assert!(fill.consolation);
        assert_eq!(fill.quantity, Quantity::Unlimited);
        assert!((fill.probability - 0.74).abs() < 1e-9);

        let sum: f64 = catalog.iter().map(|p| p.probability).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fill_clamped_when_over_assigned() {
        let prizes = vec![
            Prize::limited("A", "A", 1, 0.7),
            Prize::limited("B", "B", 1, 0.5),
        ];
        let catalog = with_consolation_fill(prizes, "NONE", "None");
        assert_eq!(catalog[2].probability, 0.0);
    }
}

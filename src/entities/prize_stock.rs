use crate::models::{Prize, PrizeStatus};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// 奖品库存实体
/// 概念说明:
/// - remaining: 剩余库存, 仅限量奖品参与扣减, 永不为负
/// - awarded: 成功发放次数 (无限库存奖品也计数, 仅用于观察)
#[derive(Debug)]
pub struct PrizeStock {
    prize: Prize,
    remaining: AtomicI64,
    awarded: AtomicU64,
}

impl PrizeStock {
    pub fn new(prize: Prize) -> Self {
        let initial = prize.quantity.limit().unwrap_or(0);
        Self {
            prize,
            remaining: AtomicI64::new(initial),
            awarded: AtomicU64::new(0),
        }
    }

    pub fn prize(&self) -> &Prize {
        &self.prize
    }

    pub fn id(&self) -> &str {
        &self.prize.id
    }

    pub fn name(&self) -> &str {
        &self.prize.name
    }

    pub fn probability(&self) -> f64 {
        self.prize.probability
    }

    /// 是否是限量奖品
    pub fn is_limited(&self) -> bool {
        !self.prize.quantity.is_unlimited()
    }

    pub fn is_consolation(&self) -> bool {
        self.prize.consolation
    }

    /// 是否还有库存 (无限库存或剩余 > 0)
    pub fn is_available(&self) -> bool {
        match self.remaining() {
            None => true,
            Some(remain) => remain > 0,
        }
    }

    /// 剩余库存 (None = 无限)
    pub fn remaining(&self) -> Option<i64> {
        if self.is_limited() {
            Some(self.remaining.load(Ordering::Acquire))
        } else {
            None
        }
    }

    pub fn awarded(&self) -> u64 {
        self.awarded.load(Ordering::Relaxed)
    }

    /// 尝试扣减一件库存, 成功返回 true
    ///
    /// 限量奖品使用 CAS 循环: 读取当前值, 若 <= 0 直接失败 (不修改状态),
    /// 否则尝试把 current 换成 current - 1; 期间被其他线程修改则用最新值重试。
    pub fn try_decrement(&self) -> bool {
        if !self.is_limited() {
            self.awarded.fetch_add(1, Ordering::Relaxed);
            return true;
        }

        let mut current = self.remaining.load(Ordering::Acquire);
        loop {
            if current <= 0 {
                return false;
            }
            match self.remaining.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.awarded.fetch_add(1, Ordering::Relaxed);
                    return true;
                }
                Err(actual) => current = actual,
            }
        }
    }

    pub fn status(&self) -> PrizeStatus {
        PrizeStatus {
            id: self.prize.id.clone(),
            name: self.prize.name.clone(),
            probability: self.prize.probability,
            stock_limit: self.prize.quantity.limit(),
            stock_remaining: self.remaining(),
            awarded: self.awarded(),
            consolation: self.prize.consolation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn test_unlimited_always_succeeds() {
        let stock = PrizeStock::new(Prize::unlimited("U", "Unlimited", 0.5));
        for _ in 0..1000 {
            assert!(stock.try_decrement());
        }
        assert_eq!(stock.remaining(), None);
        assert!(stock.is_available());
        assert_eq!(stock.awarded(), 1000);
    }

    #[test]
    fn test_finite_exhausts() {
        let stock = PrizeStock::new(Prize::limited("P", "Limited", 3, 0.5));
        assert!(stock.try_decrement());
        assert!(stock.try_decrement());
        assert!(stock.try_decrement());
        assert!(!stock.try_decrement());
        assert!(!stock.try_decrement());
        assert_eq!(stock.remaining(), Some(0));
        assert!(!stock.is_available());
        assert_eq!(stock.awarded(), 3);
    }

    #[test]
    fn test_zero_quantity_never_succeeds() {
        let stock = PrizeStock::new(Prize::limited("Z", "Zero", 0, 1.0));
        assert!(!stock.try_decrement());
        assert_eq!(stock.remaining(), Some(0));
        assert_eq!(stock.awarded(), 0);
    }

    #[test]
    fn test_concurrent_decrements_are_exact() {
        const QUANTITY: i64 = 10;
        const CALLERS: usize = 64;

        let stock = PrizeStock::new(Prize::limited("P", "Limited", QUANTITY, 0.5));
        let successes = AtomicUsize::new(0);
        let failures = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..CALLERS {
                s.spawn(|| {
                    if stock.try_decrement() {
                        successes.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failures.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
        });

        assert_eq!(successes.load(Ordering::Relaxed), QUANTITY as usize);
        assert_eq!(failures.load(Ordering::Relaxed), CALLERS - QUANTITY as usize);
        assert_eq!(stock.remaining(), Some(0));
    }

    #[test]
    fn test_status_snapshot() {
        let stock = PrizeStock::new(Prize::limited("P002", "Second Prize", 5, 0.05));
        stock.try_decrement();
        let status = stock.status();
        assert_eq!(status.id, "P002");
        assert_eq!(status.stock_limit, Some(5));
        assert_eq!(status.stock_remaining, Some(4));
        assert_eq!(status.awarded, 1);
        assert!(!status.consolation);
    }
}

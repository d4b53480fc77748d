pub mod prize_stock;

pub use prize_stock::PrizeStock;

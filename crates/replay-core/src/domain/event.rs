//! 합성 마켓 이벤트 타입.
//!
//! 이벤트 합성기가 캔들로부터 생성하는 호가창 스냅샷과 개별 체결 프린트,
//! 그리고 둘을 묶는 `MarketEvent` tagged union을 정의합니다.
//!
//! # 순서 불변식
//!
//! 전역 이벤트 시퀀스는 타임스탬프 비감소 순서를 유지해야 하며,
//! 이전 시각의 이벤트보다 먼저 관측되는 이벤트는 존재할 수 없습니다 (룩어헤드 금지).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// 호가창 단일 레벨 (가격, 잔량).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    /// 호가 가격
    pub price: Decimal,
    /// 잔량
    pub size: Decimal,
}

impl BookLevel {
    pub fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }
}

/// 합성 호가창 스냅샷.
///
/// 매수 호가는 가격 내림차순, 매도 호가는 오름차순으로 정렬되어 있으며
/// 생성 이후 수정되지 않습니다. 소속 이벤트가 단독 소유합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// 스냅샷 시각
    pub timestamp: DateTime<Utc>,
    /// 매수 호가 (내림차순)
    pub bids: Vec<BookLevel>,
    /// 매도 호가 (오름차순)
    pub asks: Vec<BookLevel>,
}

impl OrderBookSnapshot {
    /// 최우선 매수 호가.
    pub fn best_bid(&self) -> Option<&BookLevel> {
        self.bids.first()
    }

    /// 최우선 매도 호가.
    pub fn best_ask(&self) -> Option<&BookLevel> {
        self.asks.first()
    }

    /// 중간가 (best bid/ask 평균). 어느 한쪽이 비어 있으면 None.
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid.price + ask.price) / dec!(2)),
            _ => None,
        }
    }
}

/// 합성 체결 프린트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeTick {
    /// 체결 시각
    pub timestamp: DateTime<Utc>,
    /// 체결 가격
    pub price: Decimal,
    /// 체결 수량
    pub quantity: Decimal,
    /// 매수자가 메이커인지 여부 (true면 공격적 매도)
    pub is_buyer_maker: bool,
}

impl TradeTick {
    /// 공격적 매수(테이커 매수) 여부.
    pub fn is_aggressive_buy(&self) -> bool {
        !self.is_buyer_maker
    }
}

/// 마켓 이벤트 (호가창 스냅샷 또는 체결).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketEvent {
    /// 호가창 스냅샷 이벤트
    OrderBook(OrderBookSnapshot),
    /// 체결 이벤트
    Trade(TradeTick),
}

impl MarketEvent {
    /// 이벤트 타임스탬프.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::OrderBook(book) => book.timestamp,
            Self::Trade(trade) => trade.timestamp,
        }
    }

    /// 체결 이벤트 여부.
    pub fn is_trade(&self) -> bool {
        matches!(self, Self::Trade(_))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_mid_price() {
        let book = OrderBookSnapshot {
            timestamp: Utc.with_ymd_and_hms(2024, 11, 10, 0, 0, 0).unwrap(),
            bids: vec![BookLevel::new(dec!(99), dec!(1))],
            asks: vec![BookLevel::new(dec!(101), dec!(2))],
        };
        assert_eq!(book.mid_price(), Some(dec!(100)));
    }

    #[test]
    fn test_mid_price_empty_side() {
        let book = OrderBookSnapshot {
            timestamp: Utc.with_ymd_and_hms(2024, 11, 10, 0, 0, 0).unwrap(),
            bids: vec![],
            asks: vec![BookLevel::new(dec!(101), dec!(2))],
        };
        assert_eq!(book.mid_price(), None);
    }

    #[test]
    fn test_event_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 11, 10, 0, 0, 30).unwrap();
        let event = MarketEvent::Trade(TradeTick {
            timestamp: ts,
            price: dec!(90000),
            quantity: dec!(0.01),
            is_buyer_maker: false,
        });
        assert_eq!(event.timestamp(), ts);
        assert!(event.is_trade());
    }
}

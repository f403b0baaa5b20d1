//! OHLCV 캔들 도메인 타입.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OHLCV 캔들 (불변).
///
/// `(symbol, interval, open_time)` 당 하나만 존재하며, 로드 이후 수정되지 않습니다.
/// 이벤트 합성기가 이 캔들 하나로부터 호가창 스냅샷과 체결 프린트를 생성합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 바 시작 시각
    pub open_time: DateTime<Utc>,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 총 거래량 (base asset)
    pub volume: Decimal,
    /// 테이커 매수 거래량 (base asset)
    pub taker_buy_volume: Decimal,
    /// 체결 건수
    pub trade_count: u64,
}

impl Candle {
    /// 새 캔들 생성.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        open_time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
        taker_buy_volume: Decimal,
        trade_count: u64,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
            taker_buy_volume,
            trade_count,
        }
    }

    /// 테이커 매수 비율.
    ///
    /// 거래량이 0이면 0.5를 반환합니다 (합성 시 중립 가정, 에러 아님).
    pub fn buy_ratio(&self) -> f64 {
        if self.volume.is_zero() {
            return 0.5;
        }
        (self.taker_buy_volume / self.volume).to_f64().unwrap_or(0.5)
    }

    /// 고가-저가 범위.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// 캔들 내부 정합성 확인.
    ///
    /// `low <= open/close <= high`, 거래량 비음수, 테이커 매수량이 총량 이하인지 검사합니다.
    pub fn is_consistent(&self) -> bool {
        self.low <= self.high
            && self.low <= self.open
            && self.open <= self.high
            && self.low <= self.close
            && self.close <= self.high
            && !self.volume.is_sign_negative()
            && !self.taker_buy_volume.is_sign_negative()
            && self.taker_buy_volume <= self.volume
    }
}

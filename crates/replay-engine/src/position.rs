//! 단일 포지션 원장.
//!
//! 한 번에 포지션 하나만 유지하는 단순 원장입니다. 진입/청산 수수료와
//! 펀딩 비용을 모두 반영한 실현 손익을 계산합니다.
//!
//! 이중 청산은 타입 수준에서 차단됩니다: `close`가 `self`를 소비하므로
//! 같은 포지션을 두 번 청산하는 코드는 컴파일되지 않습니다.

use chrono::{DateTime, Utc};
use replay_core::SignalDirection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use thiserror::Error;

/// 테이커 수수료율 (시장가 체결)
pub const TAKER_FEE: Decimal = dec!(0.0005);

/// 메이커 수수료율 (지정가 체결)
pub const MAKER_FEE: Decimal = dec!(0.0002);

/// 시간당 펀딩 비율 (8시간 펀딩 0.01%의 시간 환산 근사)
pub const FUNDING_RATE_HOURLY: Decimal = dec!(0.00003);

/// 원장 오류.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("진입가는 0보다 커야 합니다: {0}")]
    InvalidEntryPrice(Decimal),

    #[error("포지션 크기는 (0, 1] 범위여야 합니다: {0}")]
    InvalidSizeFraction(Decimal),

    #[error("레버리지는 1 이상이어야 합니다: {0}")]
    InvalidLeverage(Decimal),

    #[error("방향 없는 신호로는 포지션을 열 수 없습니다")]
    NeutralDirection,
}

/// 청산 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    BacktestEnd,
}

/// 열린 포지션.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    /// 방향 (Long 또는 Short)
    pub direction: SignalDirection,
    /// 진입가
    pub entry_price: Decimal,
    /// 진입 시각
    pub entry_time: DateTime<Utc>,
    /// 기준 자본금
    pub capital: Decimal,
    /// 자본 대비 포지션 비율 (0, 1]
    pub size_fraction: Decimal,
    /// 레버리지
    pub leverage: Decimal,
    /// 명목 가치 = capital * size_fraction * leverage
    pub notional: Decimal,
    /// 수량 = notional / entry_price
    pub units: Decimal,
    /// 진입 수수료 (테이커, 진입 시점에 확정)
    pub entry_fee: Decimal,
    /// 손절 임계값 (레버리지 반영 손익률, %)
    pub stop_loss_pct: Decimal,
    /// 익절 임계값 (레버리지 반영 손익률, %)
    pub take_profit_pct: Decimal,
}

/// 청산된 포지션.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedPosition {
    pub direction: SignalDirection,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub size_fraction: Decimal,
    pub leverage: Decimal,
    pub notional: Decimal,
    pub units: Decimal,
    /// 보유 시간 (시간 단위)
    pub holding_hours: Decimal,
    pub entry_fee: Decimal,
    pub exit_fee: Decimal,
    pub funding_fee: Decimal,
    /// 수수료 차감 전 가격 손익
    pub price_pnl: Decimal,
    /// 모든 비용 차감 후 실현 손익
    pub realized_pnl: Decimal,
    /// 투입 증거금 대비 실현 손익률 (%)
    pub realized_pnl_pct: Decimal,
    pub exit_reason: ExitReason,
}

impl ClosedPosition {
    /// 이 거래에 부과된 총 비용 (진입 + 청산 + 펀딩).
    pub fn total_fees(&self) -> Decimal {
        self.entry_fee + self.exit_fee + self.funding_fee
    }

    /// 수익 거래 여부 (손익 0은 패배로 집계).
    pub fn is_win(&self) -> bool {
        self.realized_pnl > Decimal::ZERO
    }
}

impl Position {
    /// 포지션 진입.
    ///
    /// 진입 수수료는 이 시점에 명목 가치 기준 테이커 요율로 확정됩니다.
    pub fn open(
        direction: SignalDirection,
        entry_price: Decimal,
        entry_time: DateTime<Utc>,
        capital: Decimal,
        size_fraction: Decimal,
        leverage: Decimal,
        stop_loss_pct: Decimal,
        take_profit_pct: Decimal,
    ) -> Result<Self, LedgerError> {
        if !direction.is_actionable() {
            return Err(LedgerError::NeutralDirection);
        }
        if entry_price <= Decimal::ZERO {
            return Err(LedgerError::InvalidEntryPrice(entry_price));
        }
        if size_fraction <= Decimal::ZERO || size_fraction > Decimal::ONE {
            return Err(LedgerError::InvalidSizeFraction(size_fraction));
        }
        if leverage < Decimal::ONE {
            return Err(LedgerError::InvalidLeverage(leverage));
        }

        let notional = capital * size_fraction * leverage;
        let units = notional / entry_price;
        let entry_fee = notional * TAKER_FEE;

        Ok(Self {
            direction,
            entry_price,
            entry_time,
            capital,
            size_fraction,
            leverage,
            notional,
            units,
            entry_fee,
            stop_loss_pct,
            take_profit_pct,
        })
    }

    /// 레버리지 반영 손익률 (%).
    fn leveraged_pnl_pct(&self, price: Decimal) -> Decimal {
        let raw = (price - self.entry_price) / self.entry_price * dec!(100) * self.leverage;
        match self.direction {
            SignalDirection::Short => -raw,
            _ => raw,
        }
    }

    /// 손절/익절 판정.
    ///
    /// 발동 시 사유와 함께 발동 시점의 레버리지 반영 손익률(%)을 반환합니다.
    /// 손절과 익절이 같은 틱에서 동시에 성립하면 손절이 우선합니다.
    pub fn check_exit(&self, price: Decimal) -> Option<(ExitReason, Decimal)> {
        let pnl_pct = self.leveraged_pnl_pct(price);
        if pnl_pct <= -self.stop_loss_pct {
            Some((ExitReason::StopLoss, pnl_pct))
        } else if pnl_pct >= self.take_profit_pct {
            Some((ExitReason::TakeProfit, pnl_pct))
        } else {
            None
        }
    }

    /// 포지션 청산. `self`를 소비하므로 정확히 한 번만 가능합니다.
    pub fn close(
        self,
        exit_price: Decimal,
        reason: ExitReason,
        exit_time: DateTime<Utc>,
    ) -> ClosedPosition {
        let holding_ms = (exit_time - self.entry_time).num_milliseconds();
        let holding_hours = Decimal::from(holding_ms) / dec!(3_600_000);

        let funding_fee = self.notional * FUNDING_RATE_HOURLY * holding_hours;
        let exit_fee = self.units * exit_price * TAKER_FEE;

        let raw_pnl = (exit_price - self.entry_price) * self.units;
        let price_pnl = match self.direction {
            SignalDirection::Short => -raw_pnl,
            _ => raw_pnl,
        };

        let realized_pnl = price_pnl - self.entry_fee - exit_fee - funding_fee;
        let margin = self.capital * self.size_fraction;
        let realized_pnl_pct = realized_pnl / margin * dec!(100);

        ClosedPosition {
            direction: self.direction,
            entry_price: self.entry_price,
            exit_price,
            entry_time: self.entry_time,
            exit_time,
            size_fraction: self.size_fraction,
            leverage: self.leverage,
            notional: self.notional,
            units: self.units,
            holding_hours,
            entry_fee: self.entry_fee,
            exit_fee,
            funding_fee,
            price_pnl,
            realized_pnl,
            realized_pnl_pct,
            exit_reason: reason,
        }
    }

    /// 현재가 기준 미실현 손익.
    ///
    /// 청산 수수료와 펀딩은 지금 청산한다고 가정한 추정치입니다.
    /// 상태를 변경하지 않습니다.
    pub fn unrealized_pnl(&self, price: Decimal, now: DateTime<Utc>) -> Decimal {
        let holding_ms = (now - self.entry_time).num_milliseconds();
        let holding_hours = Decimal::from(holding_ms) / dec!(3_600_000);

        let funding_fee = self.notional * FUNDING_RATE_HOURLY * holding_hours;
        let exit_fee = self.units * price * TAKER_FEE;

        let raw_pnl = (price - self.entry_price) * self.units;
        let price_pnl = match self.direction {
            SignalDirection::Short => -raw_pnl,
            _ => raw_pnl,
        };

        price_pnl - self.entry_fee - exit_fee - funding_fee
    }
}

//! 리플레이 결과 리포트.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::{position::ClosedPosition, session::ReplaySession};

/// 리플레이 실행 결과 통계.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// 청산 거래 수
    pub trade_count: usize,
    /// 승률 (%): realized_pnl > 0인 거래 비율, 거래 없으면 0
    pub win_rate_pct: Decimal,
    /// 총 실현 손익
    pub total_pnl: Decimal,
    /// 거래당 평균 실현 손익
    pub avg_pnl: Decimal,
    /// 기준 자본 대비 총 손익률 (%)
    pub total_pnl_pct: Decimal,
    /// 거래당 평균 손익률 (%, 투입 증거금 대비)
    pub avg_pnl_pct: Decimal,
    /// 총 비용 (진입 + 청산 + 펀딩)
    pub total_fees: Decimal,

    /// 의사결정 엔진 호출 수
    pub decision_count: u64,
    /// 비중립 신호 수
    pub signal_count: u64,
    /// 레짐 필터 차단 수
    pub blocked_count: u64,
    /// 실제 진입 수
    pub executed_count: u64,

    /// 신호율 (%): signals / decisions
    pub signal_rate_pct: Decimal,
    /// 차단율 (%): blocked / signals
    pub block_rate_pct: Decimal,
    /// 실행율 (%): executed / decisions
    pub execution_rate_pct: Decimal,

    /// 청산 포지션 상세 기록
    pub closed_positions: Vec<ClosedPosition>,
}

/// 0으로 나누기를 막는 비율 계산 (%).
fn rate_pct(numerator: u64, denominator: u64) -> Decimal {
    if denominator == 0 {
        Decimal::ZERO
    } else {
        Decimal::from(numerator) / Decimal::from(denominator) * dec!(100)
    }
}

impl ReplayReport {
    /// 세션 상태로부터 리포트 생성.
    pub fn from_session(session: &ReplaySession, capital: Decimal) -> Self {
        let closed = &session.closed_positions;
        let trade_count = closed.len();

        let wins = closed.iter().filter(|p| p.is_win()).count();
        let total_pnl: Decimal = closed.iter().map(|p| p.realized_pnl).sum();
        let total_pnl_pct_sum: Decimal = closed.iter().map(|p| p.realized_pnl_pct).sum();
        let total_fees: Decimal = closed.iter().map(|p| p.total_fees()).sum();

        let trades = Decimal::from(trade_count as u64);
        let (win_rate_pct, avg_pnl, avg_pnl_pct) = if trade_count == 0 {
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
        } else {
            (
                Decimal::from(wins as u64) / trades * dec!(100),
                total_pnl / trades,
                total_pnl_pct_sum / trades,
            )
        };

        let total_pnl_pct = if capital.is_zero() {
            Decimal::ZERO
        } else {
            total_pnl / capital * dec!(100)
        };

        Self {
            trade_count,
            win_rate_pct,
            total_pnl,
            avg_pnl,
            total_pnl_pct,
            avg_pnl_pct,
            total_fees,
            decision_count: session.decision_count,
            signal_count: session.signal_count,
            blocked_count: session.blocked_count,
            executed_count: session.executed_count,
            signal_rate_pct: rate_pct(session.signal_count, session.decision_count),
            block_rate_pct: rate_pct(session.blocked_count, session.signal_count),
            execution_rate_pct: rate_pct(session.executed_count, session.decision_count),
            closed_positions: closed.clone(),
        }
    }

    /// 사람이 읽는 요약 블록.
    pub fn summary(&self) -> String {
        format!(
            "=== 리플레이 결과 ===\n\
             거래 수: {}\n\
             승률: {:.2}%\n\
             총 손익: {:.4} ({:.2}%)\n\
             평균 손익: {:.4} ({:.2}%)\n\
             총 수수료: {:.4}\n\
             의사결정: {} | 신호: {} ({:.1}%) | 차단: {} ({:.1}%) | 실행: {} ({:.1}%)",
            self.trade_count,
            self.win_rate_pct,
            self.total_pnl,
            self.total_pnl_pct,
            self.avg_pnl,
            self.avg_pnl_pct,
            self.total_fees,
            self.decision_count,
            self.signal_count,
            self.signal_rate_pct,
            self.blocked_count,
            self.block_rate_pct,
            self.executed_count,
            self.execution_rate_pct,
        )
    }
}

//! 리플레이 세션 상태.
//!
//! 한 번의 리플레이 실행에 속한 모든 가변 상태를 담습니다. 전역 상태가
//! 없으므로 여러 세션을 동시에 돌려도 서로 간섭하지 않습니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::position::{ClosedPosition, Position};

/// 리플레이 수명주기 단계.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayPhase {
    /// 계산기 워밍업 중 (의사결정 없음)
    WarmingUp,
    /// 정상 의사결정 구간
    Active,
    /// 종료됨 (강제 청산 완료)
    Terminated,
}

/// 리플레이 세션 상태.
#[derive(Debug)]
pub struct ReplaySession {
    pub phase: ReplayPhase,

    /// 최신 중간가 (호가창 이벤트에서만 갱신)
    pub latest_price: Option<Decimal>,

    /// 열린 포지션 (최대 하나)
    pub open_position: Option<Position>,

    /// 청산된 포지션 기록
    pub closed_positions: Vec<ClosedPosition>,

    /// 의사결정 엔진 호출 수
    pub decision_count: u64,
    /// 비중립 신호 수
    pub signal_count: u64,
    /// 레짐 필터에 차단된 신호 수
    pub blocked_count: u64,
    /// 실제 진입 수
    pub executed_count: u64,

    /// 마지막 의사결정 시도 시각 (워밍업 중 건너뛴 시도 포함)
    pub last_decision_time: Option<DateTime<Utc>>,

    /// 지금까지 전달한 체결 이벤트 수 (워밍업 판정용)
    pub trades_seen: u64,

    /// 마지막으로 처리한 이벤트 시각 (실패 진단용)
    pub last_event_time: Option<DateTime<Utc>>,

    /// 처리한 이벤트 총수
    pub events_processed: u64,
}

impl ReplaySession {
    pub fn new() -> Self {
        Self {
            phase: ReplayPhase::WarmingUp,
            latest_price: None,
            open_position: None,
            closed_positions: Vec::new(),
            decision_count: 0,
            signal_count: 0,
            blocked_count: 0,
            executed_count: 0,
            last_decision_time: None,
            trades_seen: 0,
            last_event_time: None,
            events_processed: 0,
        }
    }

    /// 워밍업 완료 판정.
    pub fn is_warmed_up(&self, min_warmup_trades: u64) -> bool {
        self.trades_seen >= min_warmup_trades
    }

    /// 포지션 진입 기록.
    ///
    /// 이미 열린 포지션 위에 또 여는 것은 호출자 버그이므로 패닉합니다.
    pub fn enter_position(&mut self, position: Position) {
        assert!(
            self.open_position.is_none(),
            "열린 포지션 위에 새 포지션을 진입하려 했습니다"
        );
        self.open_position = Some(position);
        self.executed_count += 1;
    }

    /// 청산 기록.
    pub fn record_close(&mut self, closed: ClosedPosition) {
        self.closed_positions.push(closed);
    }
}

impl Default for ReplaySession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use replay_core::SignalDirection;
    use rust_decimal_macros::dec;

    use super::*;

    fn position() -> Position {
        Position::open(
            SignalDirection::Long,
            dec!(100),
            Utc.with_ymd_and_hms(2024, 11, 10, 0, 0, 0).unwrap(),
            dec!(100),
            dec!(0.5),
            dec!(10),
            dec!(5),
            dec!(10),
        )
        .unwrap()
    }

    #[test]
    fn test_warmup_threshold() {
        let mut session = ReplaySession::new();
        session.trades_seen = 49;
        assert!(!session.is_warmed_up(50));
        session.trades_seen = 50;
        assert!(session.is_warmed_up(50));
    }

    #[test]
    fn test_enter_counts_execution() {
        let mut session = ReplaySession::new();
        session.enter_position(position());
        assert_eq!(session.executed_count, 1);
        assert!(session.open_position.is_some());
    }

    #[test]
    #[should_panic(expected = "열린 포지션")]
    fn test_enter_over_open_panics() {
        let mut session = ReplaySession::new();
        session.enter_position(position());
        session.enter_position(position());
    }
}

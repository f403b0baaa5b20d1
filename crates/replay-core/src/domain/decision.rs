//! 거래 결정 타입.
//!
//! 외부 결정 엔진이 피처 벡터를 받아 반환하는 결정 구조를 정의합니다.
//! 리플레이 엔진은 이 구조의 의미(방향, 리스크 게이트, 실행 계획)만 알고
//! 결정 로직 자체는 알지 못합니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 신호 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalDirection {
    /// 롱 진입 신호
    Long,
    /// 숏 진입 신호
    Short,
    /// 중립 (신호 없음)
    Neutral,
}

impl SignalDirection {
    /// 비중립(실제 거래 신호) 여부.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Self::Neutral)
    }
}

/// 신호 평가 (방향 + 신뢰도).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalAssessment {
    /// 신호 방향
    pub direction: SignalDirection,
    /// 신뢰도 (0~1)
    pub confidence: f64,
}

/// 리스크 수준.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Safe,
    Warning,
    Danger,
    Critical,
}

/// 레짐 평가 (리스크 필터 결과).
///
/// `is_safe`가 false면 유효한 신호라도 진입이 차단됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeAssessment {
    /// 리스크 수준
    pub risk_level: RiskLevel,
    /// 진입 허용 여부
    pub is_safe: bool,
}

/// 실행 스타일.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStyle {
    /// 공격적 실행
    Aggressive,
    /// 보통 실행
    Moderate,
    /// 보수적 실행
    Conservative,
    /// 실행 안 함
    NoTrade,
}

impl ExecutionStyle {
    /// 실제 주문으로 이어지는 스타일인지 여부.
    pub fn is_tradeable(&self) -> bool {
        !matches!(self, Self::NoTrade)
    }
}

/// 실행 계획.
///
/// 결정 엔진이 진입을 권고할 때 포지션 파라미터를 담습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// 포지션 크기 (자본 대비 비율, 0~1)
    pub position_size: Decimal,
    /// 레버리지 (>= 1)
    pub leverage: Decimal,
    /// 손절 비율 (%, 레버리지 반영 후)
    pub stop_loss_pct: Decimal,
    /// 익절 비율 (%, 레버리지 반영 후)
    pub take_profit_pct: Decimal,
    /// 실행 스타일
    pub execution_style: ExecutionStyle,
}

/// 결정 엔진의 최종 출력.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingDecision {
    /// 신호 평가
    pub signal: SignalAssessment,
    /// 레짐 평가
    pub regime: RegimeAssessment,
    /// 실행 계획 (None이면 진입 권고 없음)
    pub execution: Option<ExecutionPlan>,
}

impl TradingDecision {
    /// 중립 결정 (신호 없음, 안전 레짐).
    pub fn neutral() -> Self {
        Self {
            signal: SignalAssessment {
                direction: SignalDirection::Neutral,
                confidence: 0.0,
            },
            regime: RegimeAssessment {
                risk_level: RiskLevel::Safe,
                is_safe: true,
            },
            execution: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_decision() {
        let decision = TradingDecision::neutral();
        assert_eq!(decision.signal.direction, SignalDirection::Neutral);
        assert!(!decision.signal.direction.is_actionable());
        assert!(decision.execution.is_none());
    }

    #[test]
    fn test_direction_serde_format() {
        // 원본 데이터 계약과 동일한 표기 유지
        let json = serde_json::to_string(&SignalDirection::Long).unwrap();
        assert_eq!(json, "\"LONG\"");
        let style = serde_json::to_string(&ExecutionStyle::NoTrade).unwrap();
        assert_eq!(style, "\"NO_TRADE\"");
    }
}

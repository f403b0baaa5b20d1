//! 외부 협력자 capability trait.
//!
//! 지표 계산기와 결정 엔진은 이 크레이트 바깥에서 구현됩니다.
//! 리플레이 엔진은 trait object로만 접근하며 구체적인 지표 수식을 알지 못합니다.

use std::collections::HashMap;

use crate::domain::decision::TradingDecision;
use crate::domain::event::MarketEvent;

/// 피처 계산기 trait.
///
/// 계산기는 모든 이벤트를 전달받고 자신이 소비할 종류만 골라 누적합니다.
/// 값이 아직 준비되지 않았으면 `current_value()`가 `None`을 반환하며,
/// 이 경우 해당 결정 스텝은 건너뜁니다 (동기적 가용성을 가정하지 않음).
pub trait FeatureCalculator: Send + Sync {
    /// 원시 이벤트로 내부 상태 갱신.
    fn update(&mut self, event: &MarketEvent);

    /// 현재 피처 값. 아직 계산 불가능하면 None.
    fn current_value(&self) -> Option<f64>;
}

/// 결정 엔진 trait.
///
/// 피처 벡터를 받아 거래 결정을 반환합니다. 단일 결정 스텝의 실패는
/// 리플레이 전체를 중단시키지 않고 "신호 없음"으로 처리됩니다.
pub trait DecisionEngine: Send + Sync {
    /// 피처 벡터 처리 후 결정 반환.
    fn process(
        &mut self,
        features: &HashMap<String, f64>,
    ) -> Result<TradingDecision, Box<dyn std::error::Error + Send + Sync>>;
}

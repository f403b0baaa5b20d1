//! 마켓 리플레이 백테스터의 핵심 도메인 타입.
//!
//! 캔들, 합성 마켓 이벤트, 거래 결정 등 모든 크레이트가 공유하는
//! 타입과 외부 협력자(지표 계산기, 결정 엔진)의 capability trait를 정의합니다.
//!
//! # 크레이트 구조
//!
//! ```text
//! replay-data  ──┐
//! replay-synth ──┼── replay-core (도메인 타입)
//! replay-engine ─┘
//! ```

pub mod domain;

pub use domain::calculator::{DecisionEngine, FeatureCalculator};
pub use domain::candle::Candle;
pub use domain::decision::{
    ExecutionPlan, ExecutionStyle, RegimeAssessment, RiskLevel, SignalAssessment, SignalDirection,
    TradingDecision,
};
pub use domain::event::{BookLevel, MarketEvent, OrderBookSnapshot, TradeTick};

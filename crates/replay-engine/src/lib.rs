//! 마켓 리플레이 백테스팅 엔진.
//!
//! 과거 캔들 데이터로부터 합성한 마이크로스트럭처 이벤트 스트림을
//! 시간순으로 재생하며 전략을 시뮬레이션합니다.
//!
//! # 주요 기능
//!
//! - **리플레이 루프**: 워밍업 → 활성 → 종료 단계의 이벤트 구동 상태 기계
//! - **포지션 원장**: 진입/청산/펀딩 수수료를 반영한 단일 포지션 회계
//! - **통계 리포트**: 승률, 손익, 의사결정 퍼널 지표
//!
//! 지표 계산기와 의사결정 엔진은 `replay-core`의 트레이트 뒤에 있는
//! 외부 협력자입니다. 이 크레이트는 그것들을 호출만 합니다.

pub mod calculators;
pub mod config;
pub mod engine;
pub mod error;
pub mod position;
pub mod report;
pub mod session;

pub use calculators::{FeatureSet, FEATURE_KEYS};
pub use config::ReplayConfig;
pub use engine::MarketReplayEngine;
pub use error::{ReplayError, ReplayResult};
pub use position::{
    ClosedPosition, ExitReason, LedgerError, Position, FUNDING_RATE_HOURLY, MAKER_FEE, TAKER_FEE,
};
pub use report::ReplayReport;
pub use session::{ReplayPhase, ReplaySession};

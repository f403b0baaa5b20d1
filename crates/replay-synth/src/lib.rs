//! 마켓 이벤트 합성 크레이트.
//!
//! 희소한 OHLCV 캔들로부터 통계적으로 일관된 마이크로스트럭처 이벤트
//! (호가창 스냅샷 + 개별 체결)를 생성하고, 바 단위 배치를 전역 시간순
//! 타임라인으로 병합합니다.
//!
//! # 재현성
//!
//! 모든 난수는 합성기가 소유한 `StdRng`에서 나옵니다. 설정에 시드를 지정하면
//! 동일 입력에 대해 항상 동일한 이벤트 스트림이 생성됩니다.

pub mod config;
pub mod synthesizer;
pub mod timeline;

pub use config::SynthesisConfig;
pub use synthesizer::EventSynthesizer;
pub use timeline::{merge_batches, EventTimeline};

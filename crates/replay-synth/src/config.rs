//! 이벤트 합성 설정.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 합성 설정 에러.
#[derive(Debug, Error)]
pub enum SynthesisConfigError {
    #[error("합성 설정 오류: {0}")]
    Invalid(String),
}

/// 이벤트 합성 설정.
///
/// 기본값은 원본 데이터 허브의 합성 파라미터와 동일합니다:
/// 100ms 간격 호가창, 바당 50건 체결, 20개 호가 레벨, 1분봉.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// 호가창 스냅샷 간격 (밀리초)
    #[serde(default = "default_orderbook_interval_ms")]
    pub orderbook_interval_ms: i64,

    /// 바당 체결 프린트 수
    #[serde(default = "default_trades_per_bar")]
    pub trades_per_bar: usize,

    /// 호가창 레벨 수 (양방향 각각)
    #[serde(default = "default_depth_levels")]
    pub depth_levels: usize,

    /// 바 길이 (밀리초)
    #[serde(default = "default_bar_duration_ms")]
    pub bar_duration_ms: i64,

    /// 난수 시드 (None이면 비결정적)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_orderbook_interval_ms() -> i64 {
    100
}
fn default_trades_per_bar() -> usize {
    50
}
fn default_depth_levels() -> usize {
    20
}
fn default_bar_duration_ms() -> i64 {
    60_000
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            orderbook_interval_ms: default_orderbook_interval_ms(),
            trades_per_bar: default_trades_per_bar(),
            depth_levels: default_depth_levels(),
            bar_duration_ms: default_bar_duration_ms(),
            seed: None,
        }
    }
}

impl SynthesisConfig {
    /// 시드 설정 (재현 가능한 백테스트용).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 호가창 간격 설정.
    pub fn with_orderbook_interval_ms(mut self, interval_ms: i64) -> Self {
        self.orderbook_interval_ms = interval_ms;
        self
    }

    /// 바당 체결 수 설정.
    pub fn with_trades_per_bar(mut self, trades: usize) -> Self {
        self.trades_per_bar = trades;
        self
    }

    /// 호가 레벨 수 설정.
    pub fn with_depth_levels(mut self, levels: usize) -> Self {
        self.depth_levels = levels;
        self
    }

    /// 바 길이 설정.
    pub fn with_bar_duration_ms(mut self, duration_ms: i64) -> Self {
        self.bar_duration_ms = duration_ms;
        self
    }

    /// 설정 검증.
    pub fn validate(&self) -> Result<(), SynthesisConfigError> {
        if self.orderbook_interval_ms <= 0 {
            return Err(SynthesisConfigError::Invalid(
                "호가창 간격은 0보다 커야 합니다".to_string(),
            ));
        }
        if self.bar_duration_ms < self.orderbook_interval_ms {
            return Err(SynthesisConfigError::Invalid(
                "바 길이는 호가창 간격 이상이어야 합니다".to_string(),
            ));
        }
        if self.trades_per_bar == 0 {
            return Err(SynthesisConfigError::Invalid(
                "바당 체결 수는 1 이상이어야 합니다".to_string(),
            ));
        }
        if self.depth_levels == 0 {
            return Err(SynthesisConfigError::Invalid(
                "호가 레벨 수는 1 이상이어야 합니다".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SynthesisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.orderbook_interval_ms, 100);
        assert_eq!(config.trades_per_bar, 50);
        assert_eq!(config.depth_levels, 20);
        assert_eq!(config.bar_duration_ms, 60_000);
    }

    #[test]
    fn test_invalid_interval_rejected() {
        let config = SynthesisConfig::default().with_orderbook_interval_ms(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bar_shorter_than_interval_rejected() {
        let config = SynthesisConfig::default()
            .with_bar_duration_ms(50)
            .with_orderbook_interval_ms(100);
        assert!(config.validate().is_err());
    }
}

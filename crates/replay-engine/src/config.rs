//! 리플레이 설정.

use replay_synth::SynthesisConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{ReplayError, ReplayResult};

/// 리플레이 설정.
///
/// 합성 파라미터는 `SynthesisConfig`에 내장됩니다. 시드를 지정하면
/// 전체 리플레이가 결정적으로 재현됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// 심볼 (예: "BTCUSDT")
    pub symbol: String,

    /// 캔들 인터벌 (예: "1m")
    #[serde(default = "default_interval")]
    pub interval: String,

    /// 기준 자본금 (USDT)
    #[serde(default = "default_capital")]
    pub capital: Decimal,

    /// 의사결정 주기 (밀리초)
    #[serde(default = "default_decision_interval_ms")]
    pub decision_interval_ms: i64,

    /// 워밍업에 필요한 체결 이벤트 수
    #[serde(default = "default_min_warmup_trades")]
    pub min_warmup_trades: u64,

    /// 진행 로그 주기 (이벤트 수, 0이면 비활성)
    #[serde(default = "default_progress_log_every")]
    pub progress_log_every: u64,

    /// 이벤트 합성 설정
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

fn default_interval() -> String {
    "1m".to_string()
}
fn default_capital() -> Decimal {
    dec!(100)
}
fn default_decision_interval_ms() -> i64 {
    15_000
}
fn default_min_warmup_trades() -> u64 {
    50
}
fn default_progress_log_every() -> u64 {
    100_000
}

impl ReplayConfig {
    /// 심볼만 지정하고 나머지는 기본값으로 생성.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            interval: default_interval(),
            capital: default_capital(),
            decision_interval_ms: default_decision_interval_ms(),
            min_warmup_trades: default_min_warmup_trades(),
            progress_log_every: default_progress_log_every(),
            synthesis: SynthesisConfig::default(),
        }
    }

    /// 자본금 설정.
    pub fn with_capital(mut self, capital: Decimal) -> Self {
        self.capital = capital;
        self
    }

    /// 의사결정 주기 설정.
    pub fn with_decision_interval_ms(mut self, interval_ms: i64) -> Self {
        self.decision_interval_ms = interval_ms;
        self
    }

    /// 워밍업 체결 수 설정.
    pub fn with_min_warmup_trades(mut self, trades: u64) -> Self {
        self.min_warmup_trades = trades;
        self
    }

    /// 합성 설정 교체.
    pub fn with_synthesis(mut self, synthesis: SynthesisConfig) -> Self {
        self.synthesis = synthesis;
        self
    }

    /// 설정 검증.
    pub fn validate(&self) -> ReplayResult<()> {
        if self.symbol.is_empty() {
            return Err(ReplayError::Config("심볼이 비어 있습니다".to_string()));
        }
        if self.capital <= Decimal::ZERO {
            return Err(ReplayError::Config(
                "자본금은 0보다 커야 합니다".to_string(),
            ));
        }
        if self.decision_interval_ms <= 0 {
            return Err(ReplayError::Config(
                "의사결정 주기는 0보다 커야 합니다".to_string(),
            ));
        }
        self.synthesis
            .validate()
            .map_err(|e| ReplayError::Config(e.to_string()))?;
        Ok(())
    }
}

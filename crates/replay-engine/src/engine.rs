//! 마켓 리플레이 엔진.
//!
//! 캔들 → 합성 이벤트 → 계산기 → 의사결정 → 포지션 원장으로 이어지는
//! 리플레이 루프를 구동합니다. 이벤트는 타임스탬프 순으로 정확히 한 번씩
//! 처리되며, 루프 내부는 완전히 동기적입니다 (비동기 경계는 캔들 적재뿐).
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use replay_engine::{MarketReplayEngine, ReplayConfig, FeatureSet};
//!
//! let config = ReplayConfig::new("BTCUSDT");
//! let mut engine = MarketReplayEngine::new(config, features, decision_engine)?;
//! let report = engine.replay(source, start, end).await?;
//! println!("{}", report.summary());
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use replay_core::{DecisionEngine, MarketEvent, TradingDecision};
use replay_data::CandleSource;
use replay_synth::{EventSynthesizer, EventTimeline};
use tracing::{debug, error, info, warn};

use crate::{
    calculators::FeatureSet,
    config::ReplayConfig,
    error::ReplayResult,
    position::{ExitReason, Position},
    report::ReplayReport,
    session::{ReplayPhase, ReplaySession},
};

/// 마켓 리플레이 엔진.
pub struct MarketReplayEngine {
    config: ReplayConfig,
    features: FeatureSet,
    decision_engine: Box<dyn DecisionEngine>,
    session: ReplaySession,
}

impl MarketReplayEngine {
    /// 엔진 생성. 설정을 검증합니다.
    pub fn new(
        config: ReplayConfig,
        features: FeatureSet,
        decision_engine: Box<dyn DecisionEngine>,
    ) -> ReplayResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            features,
            decision_engine,
            session: ReplaySession::new(),
        })
    }

    /// 세션 상태 조회 (테스트/리포트용).
    pub fn session(&self) -> &ReplaySession {
        &self.session
    }

    /// 날짜 범위 리플레이 실행.
    ///
    /// 캔들은 한 번에 적재하되 이벤트 합성은 캔들 단위로 수행하여
    /// 메모리 사용을 바 하나 분량으로 제한합니다. 종료 시 열린 포지션은
    /// 마지막 이벤트 시각에 강제 청산됩니다.
    pub async fn replay(
        &mut self,
        source: Arc<dyn CandleSource>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ReplayResult<ReplayReport> {
        info!(
            symbol = %self.config.symbol,
            interval = %self.config.interval,
            %start,
            %end,
            "리플레이 시작"
        );

        let candles = match source
            .load(&self.config.symbol, &self.config.interval, start, end)
            .await
        {
            Ok(candles) => candles,
            Err(e) => {
                error!(
                    stage = "candle_load",
                    last_event_time = ?self.session.last_event_time,
                    error = %e,
                    "리플레이 실패"
                );
                return Err(e.into());
            }
        };

        info!(candles = candles.len(), "캔들 적재 완료, 이벤트 합성 시작");

        let mut synthesizer = EventSynthesizer::new(self.config.synthesis.clone());
        for event in EventTimeline::new(&mut synthesizer, candles.into_iter()) {
            self.process_event(&event);
        }

        self.finalize();

        let report = ReplayReport::from_session(&self.session, self.config.capital);
        info!(
            trades = report.trade_count,
            total_pnl = %report.total_pnl,
            "리플레이 완료"
        );
        Ok(report)
    }

    /// 이벤트 하나 처리.
    ///
    /// 호가창 이벤트만 기준가(`latest_price`)를 갱신합니다. 체결 이벤트는
    /// 계산기에 전달되고 워밍업 카운터를 올립니다. 처리 후 의사결정 주기가
    /// 지났으면 의사결정 단계를 실행합니다.
    pub fn process_event(&mut self, event: &MarketEvent) {
        let timestamp = event.timestamp();
        self.session.last_event_time = Some(timestamp);
        self.session.events_processed += 1;

        match event {
            MarketEvent::OrderBook(book) => {
                if let Some(mid) = book.mid_price() {
                    self.session.latest_price = Some(mid);
                }
                self.features.update(event);
            }
            MarketEvent::Trade(_) => {
                self.features.update(event);
                self.session.trades_seen += 1;
            }
        }

        if self.decision_due(timestamp) {
            // 워밍업으로 건너뛰어도 시각은 찍는다 (의사결정 주기 유지)
            self.session.last_decision_time = Some(timestamp);
            self.decision_step(timestamp);
        }

        self.log_progress(timestamp);
    }

    /// 의사결정 주기 도래 판정. 첫 이벤트는 항상 시도합니다.
    fn decision_due(&self, timestamp: DateTime<Utc>) -> bool {
        match self.session.last_decision_time {
            None => true,
            Some(last) => {
                timestamp - last >= Duration::milliseconds(self.config.decision_interval_ms)
            }
        }
    }

    /// 의사결정 단계.
    fn decision_step(&mut self, timestamp: DateTime<Utc>) {
        if self.session.phase == ReplayPhase::Terminated {
            return;
        }

        if self.session.phase == ReplayPhase::WarmingUp {
            if !self.session.is_warmed_up(self.config.min_warmup_trades) {
                return;
            }
            self.session.phase = ReplayPhase::Active;
            info!(
                trades_seen = self.session.trades_seen,
                "워밍업 완료, 의사결정 시작"
            );
        }

        // 계산기 하나라도 준비되지 않았으면 이번 주기는 건너뜀
        let Some(feature_vector) = self.features.collect() else {
            debug!("피처 벡터 미완성, 의사결정 건너뜀");
            return;
        };

        self.session.decision_count += 1;
        let decision = match self.decision_engine.process(&feature_vector) {
            Ok(decision) => decision,
            Err(e) => {
                // 의사결정 실패는 리플레이를 중단시키지 않는다
                warn!(error = %e, "의사결정 엔진 오류, 신호 없음으로 처리");
                TradingDecision::neutral()
            }
        };

        if decision.signal.direction.is_actionable() {
            self.session.signal_count += 1;
            if !decision.regime.is_safe {
                self.session.blocked_count += 1;
            }
        }

        // 진입 판단보다 먼저 기존 포지션의 손절/익절을 평가한다
        self.check_position_exit(timestamp);

        if self.session.open_position.is_none() {
            self.try_enter(&decision, timestamp);
        }
    }

    /// 열린 포지션의 손절/익절 평가.
    fn check_position_exit(&mut self, timestamp: DateTime<Utc>) {
        let Some(price) = self.session.latest_price else {
            return;
        };
        let Some(position) = self.session.open_position.take() else {
            return;
        };

        match position.check_exit(price) {
            Some((reason, trigger_pnl_pct)) => {
                let closed = position.close(price, reason, timestamp);
                info!(
                    direction = ?closed.direction,
                    entry = %closed.entry_price,
                    exit = %closed.exit_price,
                    trigger_pnl_pct = %trigger_pnl_pct,
                    pnl = %closed.realized_pnl,
                    reason = ?closed.exit_reason,
                    "포지션 청산"
                );
                self.session.record_close(closed);
            }
            None => self.session.open_position = Some(position),
        }
    }

    /// 진입 시도. 신호/레짐/실행 계획이 모두 갖춰져야 진입합니다.
    fn try_enter(&mut self, decision: &TradingDecision, timestamp: DateTime<Utc>) {
        if !decision.signal.direction.is_actionable() || !decision.regime.is_safe {
            return;
        }
        let Some(plan) = &decision.execution else {
            return;
        };
        if !plan.execution_style.is_tradeable() {
            return;
        }
        let Some(price) = self.session.latest_price else {
            return;
        };

        match Position::open(
            decision.signal.direction,
            price,
            timestamp,
            self.config.capital,
            plan.position_size,
            plan.leverage,
            plan.stop_loss_pct,
            plan.take_profit_pct,
        ) {
            Ok(position) => {
                info!(
                    direction = ?position.direction,
                    entry = %position.entry_price,
                    size = %position.size_fraction,
                    leverage = %position.leverage,
                    style = ?plan.execution_style,
                    "포지션 진입"
                );
                self.session.enter_position(position);
            }
            Err(e) => {
                warn!(error = %e, "실행 계획이 유효하지 않아 진입 취소");
            }
        }
    }

    /// 리플레이 종료 처리.
    ///
    /// 열린 포지션을 마지막 이벤트 시각에 기준가로 강제 청산합니다.
    /// 포지션이 없으면 아무 일도 하지 않습니다 (멱등).
    pub fn finalize(&mut self) {
        if let Some(position) = self.session.open_position.take() {
            let exit_time = self
                .session
                .last_event_time
                .unwrap_or(position.entry_time);
            let exit_price = self.session.latest_price.unwrap_or(position.entry_price);
            let closed = position.close(exit_price, ExitReason::BacktestEnd, exit_time);
            info!(
                direction = ?closed.direction,
                exit = %closed.exit_price,
                pnl = %closed.realized_pnl,
                "종료 시점 강제 청산"
            );
            self.session.record_close(closed);
        }
        self.session.phase = ReplayPhase::Terminated;
    }

    /// 진행 상황 로그.
    fn log_progress(&self, timestamp: DateTime<Utc>) {
        let stride = self.config.progress_log_every;
        if stride == 0 || self.session.events_processed % stride != 0 {
            return;
        }

        let unrealized = match (&self.session.open_position, self.session.latest_price) {
            (Some(position), Some(price)) => Some(position.unrealized_pnl(price, timestamp)),
            _ => None,
        };
        info!(
            events = self.session.events_processed,
            time = %timestamp,
            price = ?self.session.latest_price,
            unrealized_pnl = ?unrealized,
            closed_trades = self.session.closed_positions.len(),
            "리플레이 진행"
        );
    }
}

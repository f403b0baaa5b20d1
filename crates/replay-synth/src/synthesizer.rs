//! 이벤트 합성기.
//!
//! 캔들 하나로부터 (a) 고정 간격 호가창 스냅샷과 (b) 개별 체결 프린트를 생성합니다.
//! 합성은 통계적 근사이며 틱 단위 재현이 아닙니다. 다만 바 전체의 집계
//! (가격 분포, 거래량, 테이커 매수 비율)는 원본 캔들과 일관되도록 유지합니다.
//!
//! # 합성 규칙
//!
//! - 스프레드: `max(0.1 * (high - low), close * 0.0001)`, 최소 1bp.
//! - 레벨 가격: 터치에서 멀어질수록 간격이 초선형으로 증가
//!   (`offset_i = spread * (i+1) * (1 + i*0.1)`).
//! - 레벨 잔량: 평균 잔량에 `(1 + i*0.2)` 스케일과 ±20% 균등 섭동.
//! - 체결 가격: 종가로 치우친 삼각 분포 (60%는 시가-종가 구간, 40%는 바 전체 구간).
//! - 체결 수량: 로그정규 (작은 체결 다수, 큰 체결 소수, 실측 체결 크기 왜도 근사).
//! - 체결 방향: 바 집계 테이커 매수 비율이 `taker_buy_volume / volume`에 수렴.

use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal, Triangular};
use replay_core::{BookLevel, Candle, MarketEvent, OrderBookSnapshot, TradeTick};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::config::SynthesisConfig;

/// 가격 퇴화 판정 임계값 (절대값).
const PRICE_EPSILON: f64 = 0.01;

/// 체결 수량 로그정규 시그마.
const TRADE_SIZE_SIGMA: f64 = 0.5;

/// 종가 근방 삼각 분포를 선택할 확률.
const NEAR_CLOSE_PROB: f64 = 0.6;

/// 이벤트 합성기.
///
/// 난수 소스를 명시적으로 소유하여 시드 지정 시 완전히 재현 가능합니다.
/// 호출자는 캔들 단위로 `synthesize`를 호출하고 결과를 즉시 소비하면
/// 전체 구간에서도 메모리가 바 하나 분량으로 제한됩니다.
pub struct EventSynthesizer {
    config: SynthesisConfig,
    rng: StdRng,
}

impl EventSynthesizer {
    /// 설정으로 합성기 생성. 시드가 없으면 OS 엔트로피를 사용합니다.
    pub fn new(config: SynthesisConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    /// 설정 조회.
    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// 캔들 하나의 이벤트 배치 생성.
    ///
    /// 반환 배치는 타임스탬프 비감소 순서이며, 동일 시각에서는
    /// 호가창 이벤트가 체결 이벤트보다 앞에 옵니다 (리플레이 루프가
    /// 동일 시각 체결을 소비하기 전에 중간가를 갱신해야 하므로).
    ///
    /// 거래량이 0인 캔들도 에러가 아닙니다. 매수 비율 0.5에
    /// 수량 0의 퇴화 체결이 생성됩니다.
    pub fn synthesize(&mut self, candle: &Candle) -> Vec<MarketEvent> {
        let snapshots = (self.config.bar_duration_ms / self.config.orderbook_interval_ms) as usize;
        let mut events = Vec::with_capacity(snapshots + self.config.trades_per_bar);

        for k in 0..snapshots {
            let timestamp = candle.open_time
                + Duration::milliseconds(k as i64 * self.config.orderbook_interval_ms);
            events.push(MarketEvent::OrderBook(self.generate_orderbook(candle, timestamp)));
        }

        for trade in self.generate_trades(candle) {
            events.push(MarketEvent::Trade(trade));
        }

        // 안정 정렬: 동일 시각에서 호가창 → 체결 순서 보존
        events.sort_by_key(|e| e.timestamp());
        events
    }

    /// 호가창 스냅샷 생성.
    fn generate_orderbook(
        &mut self,
        candle: &Candle,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) -> OrderBookSnapshot {
        let close = candle.close.to_f64().unwrap_or(0.0);
        let range = candle.range().to_f64().unwrap_or(0.0);
        let volume = candle.volume.to_f64().unwrap_or(0.0);

        let spread = (0.1 * range).max(close * 0.0001);
        let base_size = volume / self.config.depth_levels as f64;

        let bid_anchor = close - spread / 2.0;
        let ask_anchor = close + spread / 2.0;

        let mut bids = Vec::with_capacity(self.config.depth_levels);
        let mut asks = Vec::with_capacity(self.config.depth_levels);

        for i in 0..self.config.depth_levels {
            // 터치에서 멀어질수록 레벨 간격이 초선형으로 증가
            let offset = spread * (i + 1) as f64 * (1.0 + i as f64 * 0.1);

            let bid_size = (base_size * (1.0 + i as f64 * 0.2) * self.rng.gen_range(0.8..1.2)).max(0.0);
            let ask_size = (base_size * (1.0 + i as f64 * 0.2) * self.rng.gen_range(0.8..1.2)).max(0.0);

            bids.push(BookLevel::new(
                price_to_decimal(bid_anchor - offset, candle.close),
                size_to_decimal(bid_size),
            ));
            asks.push(BookLevel::new(
                price_to_decimal(ask_anchor + offset, candle.close),
                size_to_decimal(ask_size),
            ));
        }

        OrderBookSnapshot {
            timestamp,
            bids,
            asks,
        }
    }

    /// 체결 프린트 생성.
    fn generate_trades(&mut self, candle: &Candle) -> Vec<TradeTick> {
        let open = candle.open.to_f64().unwrap_or(0.0);
        let high = candle.high.to_f64().unwrap_or(0.0);
        let low = candle.low.to_f64().unwrap_or(0.0);
        let close = candle.close.to_f64().unwrap_or(0.0);
        let volume = candle.volume.to_f64().unwrap_or(0.0);

        let buy_ratio = candle.buy_ratio();
        let avg_size = volume / self.config.trades_per_bar as f64;

        let mut trades = Vec::with_capacity(self.config.trades_per_bar);
        for n in 0..self.config.trades_per_bar {
            // 바 안에서 균등 간격 배치
            let offset_ms =
                n as i64 * self.config.bar_duration_ms / self.config.trades_per_bar as i64;
            let timestamp = candle.open_time + Duration::milliseconds(offset_ms);

            let price = self.draw_price(open, high, low, close);

            // 로그정규 수량: avg * exp(sigma * N(0,1))
            let z: f64 = StandardNormal.sample(&mut self.rng);
            let quantity = (avg_size * (TRADE_SIZE_SIGMA * z).exp()).max(0.0);

            // 집계 테이커 매수 비율이 buy_ratio에 수렴하도록 샘플링
            let is_buyer_maker = self.rng.gen::<f64>() > buy_ratio;

            trades.push(TradeTick {
                timestamp,
                price: price_to_decimal(price, candle.close),
                quantity: size_to_decimal(quantity),
                is_buyer_maker,
            });
        }
        trades
    }

    /// 체결 가격 샘플링.
    ///
    /// 시가≈종가이고 고가≈저가이면 종가로 수렴합니다 (완전 퇴화 바).
    fn draw_price(&mut self, open: f64, high: f64, low: f64, close: f64) -> f64 {
        if (open - close).abs() < PRICE_EPSILON {
            if (high - low).abs() < PRICE_EPSILON {
                close
            } else {
                self.triangular(low, close, high)
            }
        } else if self.rng.gen::<f64>() < NEAR_CLOSE_PROB {
            self.triangular(open.min(close), close, open.max(close))
        } else if (high - low).abs() < PRICE_EPSILON {
            close
        } else {
            self.triangular(low, close, high)
        }
    }

    /// 삼각 분포 샘플. 파라미터가 퇴화하면 mode로 수렴.
    fn triangular(&mut self, min: f64, mode: f64, max: f64) -> f64 {
        match Triangular::new(min, max, mode) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => mode,
        }
    }
}

/// f64 가격을 Decimal로 변환. 변환 불가 시 종가로 폴백.
fn price_to_decimal(price: f64, fallback: Decimal) -> Decimal {
    Decimal::from_f64(price).unwrap_or(fallback)
}

/// f64 수량을 Decimal로 변환. 변환 불가 시 0.
fn size_to_decimal(size: f64) -> Decimal {
    Decimal::from_f64(size).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    use super::*;

    fn candle(open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Candle {
        Candle::new(
            Utc.with_ymd_and_hms(2024, 11, 10, 0, 0, 0).unwrap(),
            open,
            high,
            low,
            close,
            dec!(1000),
            dec!(500),
            5000,
        )
    }

    fn synthesizer(seed: u64) -> EventSynthesizer {
        EventSynthesizer::new(SynthesisConfig::default().with_seed(seed))
    }

    #[test]
    fn test_event_count() {
        let mut synth = synthesizer(42);
        let events = synth.synthesize(&candle(dec!(90000), dec!(90100), dec!(89900), dec!(90050)));

        // 1분봉 / 100ms 호가창 = 600 스냅샷 + 50 체결
        assert_eq!(events.len(), 650);
        assert_eq!(events.iter().filter(|e| e.is_trade()).count(), 50);
    }

    #[test]
    fn test_events_are_time_ordered() {
        let mut synth = synthesizer(42);
        let events = synth.synthesize(&candle(dec!(90000), dec!(90100), dec!(89900), dec!(90050)));

        assert!(events
            .windows(2)
            .all(|w| w[0].timestamp() <= w[1].timestamp()));
    }

    #[test]
    fn test_orderbook_precedes_trade_at_same_instant() {
        let mut synth = synthesizer(7);
        let events = synth.synthesize(&candle(dec!(90000), dec!(90100), dec!(89900), dec!(90050)));

        // 바 시작 시각에는 스냅샷(k=0)과 체결(n=0)이 공존, 스냅샷이 먼저
        let first_ts = events[0].timestamp();
        let same_instant: Vec<_> = events.iter().filter(|e| e.timestamp() == first_ts).collect();
        assert!(same_instant.len() >= 2);
        assert!(matches!(same_instant[0], MarketEvent::OrderBook(_)));
        assert!(same_instant.iter().any(|e| e.is_trade()));
    }

    #[test]
    fn test_book_shape() {
        let mut synth = synthesizer(42);
        let c = candle(dec!(90000), dec!(90100), dec!(89900), dec!(90050));
        let events = synth.synthesize(&c);

        let book = events
            .iter()
            .find_map(|e| match e {
                MarketEvent::OrderBook(b) => Some(b),
                _ => None,
            })
            .unwrap();

        assert_eq!(book.bids.len(), 20);
        assert_eq!(book.asks.len(), 20);
        // 매수 내림차순, 매도 오름차순
        assert!(book.bids.windows(2).all(|w| w[0].price > w[1].price));
        assert!(book.asks.windows(2).all(|w| w[0].price < w[1].price));
        // 스프레드 양수, 잔량 비음수
        assert!(book.best_ask().unwrap().price > book.best_bid().unwrap().price);
        assert!(book.bids.iter().all(|l| !l.size.is_sign_negative()));
        // 중간가는 종가 근방
        let mid = book.mid_price().unwrap();
        assert!((mid - c.close).abs() < dec!(200));
    }

    #[test]
    fn test_spread_floor_on_flat_range() {
        // 고가 == 저가 → 스프레드는 close * 0.0001로 바닥 처리
        let mut synth = synthesizer(42);
        let c = candle(dec!(90000), dec!(90000), dec!(90000), dec!(90000));
        let events = synth.synthesize(&c);

        let book = events
            .iter()
            .find_map(|e| match e {
                MarketEvent::OrderBook(b) => Some(b),
                _ => None,
            })
            .unwrap();
        assert!(book.best_ask().unwrap().price > book.best_bid().unwrap().price);
    }

    #[test]
    fn test_flat_candle_trades_collapse_to_close() {
        // 완전 퇴화 바: 모든 체결 가격이 종가와 같고 매수 비율은 0.5 근방
        let flat = Candle::new(
            Utc.with_ymd_and_hms(2024, 11, 10, 0, 0, 0).unwrap(),
            dec!(90000),
            dec!(90000),
            dec!(90000),
            dec!(90000),
            dec!(1000),
            dec!(500),
            1000,
        );

        let mut synth = EventSynthesizer::new(
            SynthesisConfig::default()
                .with_seed(42)
                .with_trades_per_bar(2000),
        );
        let events = synth.synthesize(&flat);

        let trades: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                MarketEvent::Trade(t) => Some(t),
                _ => None,
            })
            .collect();

        assert!(trades.iter().all(|t| t.price == dec!(90000)));

        let buys = trades.iter().filter(|t| t.is_aggressive_buy()).count();
        let ratio = buys as f64 / trades.len() as f64;
        assert!((ratio - 0.5).abs() < 0.05, "buy ratio = {}", ratio);
    }

    #[test]
    fn test_buy_ratio_converges() {
        // 거래량 보존: 테이커 매수 비율 0.7에 ±5% 이내 수렴
        let c = Candle::new(
            Utc.with_ymd_and_hms(2024, 11, 10, 0, 0, 0).unwrap(),
            dec!(90000),
            dec!(90100),
            dec!(89900),
            dec!(90050),
            dec!(1000),
            dec!(700),
            5000,
        );

        let mut synth = EventSynthesizer::new(
            SynthesisConfig::default()
                .with_seed(123)
                .with_trades_per_bar(5000),
        );
        let events = synth.synthesize(&c);

        let trades: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                MarketEvent::Trade(t) => Some(t),
                _ => None,
            })
            .collect();

        let buys = trades.iter().filter(|t| t.is_aggressive_buy()).count();
        let ratio = buys as f64 / trades.len() as f64;
        assert!((ratio - 0.7).abs() < 0.05, "buy ratio = {}", ratio);
    }

    #[test]
    fn test_trade_prices_within_bar_range() {
        let mut synth = synthesizer(99);
        let c = candle(dec!(89950), dec!(90100), dec!(89900), dec!(90050));
        let events = synth.synthesize(&c);

        for event in &events {
            if let MarketEvent::Trade(t) = event {
                assert!(t.price >= c.low && t.price <= c.high);
                assert!(!t.quantity.is_sign_negative());
            }
        }
    }

    #[test]
    fn test_zero_volume_candle_is_not_an_error() {
        let zero = Candle::new(
            Utc.with_ymd_and_hms(2024, 11, 10, 0, 0, 0).unwrap(),
            dec!(90000),
            dec!(90000),
            dec!(90000),
            dec!(90000),
            Decimal::ZERO,
            Decimal::ZERO,
            0,
        );

        let mut synth = synthesizer(42);
        let events = synth.synthesize(&zero);

        // 수량 0의 퇴화 체결 허용
        assert_eq!(events.iter().filter(|e| e.is_trade()).count(), 50);
        for event in &events {
            if let MarketEvent::Trade(t) = event {
                assert_eq!(t.quantity, Decimal::ZERO);
            }
        }
    }

    #[test]
    fn test_same_seed_same_events() {
        let c = candle(dec!(90000), dec!(90100), dec!(89900), dec!(90050));

        let events_a = synthesizer(7).synthesize(&c);
        let events_b = synthesizer(7).synthesize(&c);
        assert_eq!(events_a, events_b);

        let events_c = synthesizer(8).synthesize(&c);
        assert_ne!(events_a, events_c);
    }
}

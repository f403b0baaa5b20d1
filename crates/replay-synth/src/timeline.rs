//! 이벤트 타임라인.
//!
//! 캔들 단위 이벤트 배치를 전역 시간순 스트림으로 이어 붙입니다.
//! 캔들은 시간순으로 정렬되어 들어오고 각 배치 내부도 정렬되어 있으므로
//! 배치를 순서대로 평탄화하면 전역 순서가 유지됩니다. `EventTimeline`은
//! 이 성질을 이용해 전체 구간을 메모리에 올리지 않고 바 하나 분량의
//! 버퍼만 유지합니다.

use replay_core::{Candle, MarketEvent};
use tracing::debug;

use crate::synthesizer::EventSynthesizer;

/// 배치들을 단일 시간순 벡터로 병합.
///
/// 입력 배치가 각각 정렬되어 있지 않아도 되도록 안정 정렬을 한 번 더
/// 수행합니다. 동일 시각 이벤트의 상대 순서 (호가창 → 체결)는 보존됩니다.
pub fn merge_batches(batches: Vec<Vec<MarketEvent>>) -> Vec<MarketEvent> {
    let mut merged: Vec<MarketEvent> = batches.into_iter().flatten().collect();
    merged.sort_by_key(|e| e.timestamp());
    merged
}

/// 스트리밍 이벤트 타임라인.
///
/// 캔들 반복자에서 바를 하나씩 꺼내 합성하고, 해당 배치를 소진하면
/// 다음 바로 넘어갑니다. 며칠치 리플레이도 메모리는 바 하나 분량으로
/// 제한됩니다.
pub struct EventTimeline<'a, I>
where
    I: Iterator<Item = Candle>,
{
    synthesizer: &'a mut EventSynthesizer,
    candles: I,
    buffer: std::vec::IntoIter<MarketEvent>,
    bars_consumed: usize,
}

impl<'a, I> EventTimeline<'a, I>
where
    I: Iterator<Item = Candle>,
{
    pub fn new(synthesizer: &'a mut EventSynthesizer, candles: I) -> Self {
        Self {
            synthesizer,
            candles,
            buffer: Vec::new().into_iter(),
            bars_consumed: 0,
        }
    }

    /// 지금까지 소비한 캔들 수.
    pub fn bars_consumed(&self) -> usize {
        self.bars_consumed
    }
}

impl<I> Iterator for EventTimeline<'_, I>
where
    I: Iterator<Item = Candle>,
{
    type Item = MarketEvent;

    fn next(&mut self) -> Option<MarketEvent> {
        loop {
            if let Some(event) = self.buffer.next() {
                return Some(event);
            }
            let candle = self.candles.next()?;
            let batch = self.synthesizer.synthesize(&candle);
            self.bars_consumed += 1;
            debug!(
                open_time = %candle.open_time,
                events = batch.len(),
                "캔들 이벤트 배치 합성"
            );
            self.buffer = batch.into_iter();
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::SynthesisConfig;

    fn candle_at(minute: u32) -> Candle {
        Candle::new(
            Utc.with_ymd_and_hms(2024, 11, 10, 0, minute, 0).unwrap(),
            dec!(90000),
            dec!(90100),
            dec!(89900),
            dec!(90050),
            dec!(1000),
            dec!(500),
            5000,
        )
    }

    #[test]
    fn test_merged_timeline_is_globally_ordered() {
        // 이른 캔들의 모든 이벤트가 늦은 캔들의 이벤트보다 앞에 와야 함
        let mut synth = EventSynthesizer::new(SynthesisConfig::default().with_seed(42));
        let batch_a = synth.synthesize(&candle_at(0));
        let batch_b = synth.synthesize(&candle_at(1));

        let boundary = Utc.with_ymd_and_hms(2024, 11, 10, 0, 1, 0).unwrap();
        let merged = merge_batches(vec![batch_a, batch_b]);

        assert!(merged
            .windows(2)
            .all(|w| w[0].timestamp() <= w[1].timestamp()));

        // 첫 바의 이벤트는 모두 두 번째 바 시작 이전
        let split = merged
            .iter()
            .position(|e| e.timestamp() >= boundary)
            .unwrap();
        assert_eq!(split, 650);
    }

    #[test]
    fn test_merge_preserves_book_before_trade_tie() {
        let mut synth = EventSynthesizer::new(SynthesisConfig::default().with_seed(42));
        let batch = synth.synthesize(&candle_at(0));
        let merged = merge_batches(vec![batch]);

        // 동일 시각 묶음마다 호가창이 체결보다 앞에 와야 함
        for window in merged.windows(2) {
            if window[0].timestamp() == window[1].timestamp() && window[0].is_trade() {
                assert!(window[1].is_trade(), "체결 뒤에 같은 시각 호가창이 왔음");
            }
        }
    }

    #[test]
    fn test_streaming_timeline_matches_eager_merge() {
        let candles = vec![candle_at(0), candle_at(1), candle_at(2)];

        let mut synth_a = EventSynthesizer::new(SynthesisConfig::default().with_seed(9));
        let streamed: Vec<_> =
            EventTimeline::new(&mut synth_a, candles.clone().into_iter()).collect();

        let mut synth_b = EventSynthesizer::new(SynthesisConfig::default().with_seed(9));
        let batches: Vec<_> = candles.iter().map(|c| synth_b.synthesize(c)).collect();
        let eager = merge_batches(batches);

        assert_eq!(streamed, eager);
    }

    #[test]
    fn test_timeline_counts_bars() {
        let candles = vec![candle_at(0), candle_at(1)];
        let mut synth = EventSynthesizer::new(SynthesisConfig::default().with_seed(1));
        let mut timeline = EventTimeline::new(&mut synth, candles.into_iter());

        assert_eq!(timeline.bars_consumed(), 0);
        let total = timeline.by_ref().count();
        assert_eq!(total, 1300);
        assert_eq!(timeline.bars_consumed(), 2);
    }

    #[test]
    fn test_empty_candle_iterator() {
        let mut synth = EventSynthesizer::new(SynthesisConfig::default().with_seed(1));
        let mut timeline = EventTimeline::new(&mut synth, std::iter::empty());
        assert!(timeline.next().is_none());
    }

    proptest! {
        #[test]
        fn prop_any_seed_yields_ordered_timeline(
            seed in any::<u64>(),
            bars in 1usize..4,
        ) {
            let mut synth = EventSynthesizer::new(
                SynthesisConfig::default()
                    .with_seed(seed)
                    .with_orderbook_interval_ms(1000)
                    .with_trades_per_bar(10),
            );
            let candles: Vec<Candle> = (0..bars)
                .map(|i| {
                    let mut c = candle_at(0);
                    c.open_time = c.open_time + Duration::minutes(i as i64);
                    c
                })
                .collect();

            let events: Vec<_> =
                EventTimeline::new(&mut synth, candles.into_iter()).collect();

            prop_assert_eq!(events.len(), bars * 70);
            prop_assert!(events
                .windows(2)
                .all(|w| w[0].timestamp() <= w[1].timestamp()));
        }
    }
}

//! Parquet 캔들 로더.
//!
//! `(symbol, interval)` 당 하나의 parquet 파일에서 캔들을 읽습니다.
//! 1분봉은 연도 분할 파일(`{symbol}_{interval}_{year}.parquet`)이 있으면 우선 사용하고
//! 없으면 메인 파일로 폴백합니다.
//!
//! # 스키마
//!
//! 필수 컬럼: `open_time`(epoch ms), `open`, `high`, `low`, `close`,
//! `volume`, `taker_buy_volume`, `trade_count`.
//!
//! 반환되는 캔들은 open_time 오름차순 정렬이 보장되며 중복이 없습니다.
//! 위반 시 치명적 에러로 처리합니다, 손상된 범위는 리플레이할 수 없습니다.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use polars::prelude::*;
use replay_core::Candle;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{DataError, Result};

/// 캔들 소스 trait.
///
/// 리플레이 엔진은 이 trait를 통해서만 캔들을 받습니다.
/// parquet 외의 저장소(DB 등)도 동일 계약으로 대체할 수 있습니다.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// 날짜 범위(양끝 포함)의 캔들을 시간순으로 로드.
    ///
    /// 끝 날짜는 해당 일의 끝(23:59:59.999)까지 포함합니다.
    async fn load(
        &self,
        symbol: &str,
        interval: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Candle>>;
}

/// Parquet 기반 캔들 스토어.
#[derive(Debug, Clone)]
pub struct ParquetCandleStore {
    data_dir: PathBuf,
}

impl ParquetCandleStore {
    /// 데이터 디렉토리를 지정하여 생성.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// 파일 경로 결정.
    ///
    /// 1분봉은 시작 연도의 분할 파일을 우선 탐색하고, 없으면 메인 파일을 사용합니다.
    fn resolve_path(&self, symbol: &str, interval: &str, start: NaiveDate) -> Result<PathBuf> {
        if interval == "1m" {
            let year_file = self
                .data_dir
                .join(format!("{}_{}_{}.parquet", symbol, interval, start.year()));
            if year_file.exists() {
                debug!(path = %year_file.display(), "연도 분할 파일 사용");
                return Ok(year_file);
            }
        }

        let main_file = self.data_dir.join(format!("{}_{}.parquet", symbol, interval));
        if main_file.exists() {
            Ok(main_file)
        } else {
            Err(DataError::FileNotFound(main_file.display().to_string()))
        }
    }

    /// 범위 스캔 후 정렬된 DataFrame 반환.
    fn read_range(&self, path: &Path, start_ms: i64, end_ms: i64) -> Result<DataFrame> {
        let frame = LazyFrame::scan_parquet(path, ScanArgsParquet::default())?
            .with_column(col("open_time").cast(DataType::Int64))
            .filter(
                col("open_time")
                    .gt_eq(lit(start_ms))
                    .and(col("open_time").lt_eq(lit(end_ms))),
            )
            .sort(["open_time"], SortMultipleOptions::default())
            .collect()?;
        Ok(frame)
    }
}

#[async_trait]
impl CandleSource for ParquetCandleStore {
    async fn load(
        &self,
        symbol: &str,
        interval: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Candle>> {
        let path = self.resolve_path(symbol, interval, start)?;

        let start_dt = start.and_time(NaiveTime::MIN).and_utc();
        // 끝 날짜는 당일 끝까지 포함
        let end_dt =
            end.and_time(NaiveTime::MIN).and_utc() + Duration::days(1) - Duration::milliseconds(1);

        info!(
            symbol = symbol,
            interval = interval,
            path = %path.display(),
            start = %start_dt,
            end = %end_dt,
            "캔들 데이터 로드"
        );

        let frame = self.read_range(&path, start_dt.timestamp_millis(), end_dt.timestamp_millis())?;
        let candles = dataframe_to_candles(&frame)?;

        if candles.is_empty() {
            return Err(DataError::EmptyRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        validate_candles(&candles)?;

        info!(
            count = candles.len(),
            first = %candles[0].open_time,
            last = %candles[candles.len() - 1].open_time,
            "캔들 로드 완료"
        );

        Ok(candles)
    }
}

/// DataFrame을 캔들 목록으로 변환.
fn dataframe_to_candles(frame: &DataFrame) -> Result<Vec<Candle>> {
    let open_time = i64_values(frame, "open_time")?;
    let open = decimal_values(frame, "open")?;
    let high = decimal_values(frame, "high")?;
    let low = decimal_values(frame, "low")?;
    let close = decimal_values(frame, "close")?;
    let volume = decimal_values(frame, "volume")?;
    let taker_buy_volume = decimal_values(frame, "taker_buy_volume")?;
    let trade_count = i64_values(frame, "trade_count")?;

    let mut candles = Vec::with_capacity(frame.height());
    for i in 0..frame.height() {
        let ts = epoch_ms_to_datetime(open_time[i])?;
        candles.push(Candle::new(
            ts,
            open[i],
            high[i],
            low[i],
            close[i],
            volume[i],
            taker_buy_volume[i],
            trade_count[i].max(0) as u64,
        ));
    }
    Ok(candles)
}

/// 정렬/중복/정합성 검증.
fn validate_candles(candles: &[Candle]) -> Result<()> {
    for window in candles.windows(2) {
        if window[1].open_time < window[0].open_time {
            return Err(DataError::OutOfOrder {
                at: window[1].open_time,
            });
        }
        if window[1].open_time == window[0].open_time {
            return Err(DataError::Duplicate {
                at: window[1].open_time,
            });
        }
    }

    for candle in candles {
        if !candle.is_consistent() {
            return Err(DataError::Corrupt {
                at: candle.open_time,
                reason: "OHLC 범위 역전 또는 음수 거래량".to_string(),
            });
        }
    }

    Ok(())
}

/// i64 컬럼 추출 (null 불허).
fn i64_values(frame: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let series = frame
        .column(name)
        .map_err(|_| DataError::Schema(format!("필수 컬럼 누락: {}", name)))?
        .as_materialized_series()
        .cast(&DataType::Int64)?;
    series
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| v.ok_or_else(|| DataError::Schema(format!("{}[{}] 값이 null", name, i))))
        .collect()
}

/// Decimal 컬럼 추출 (f64 경유, null/NaN 불허).
fn decimal_values(frame: &DataFrame, name: &str) -> Result<Vec<Decimal>> {
    let series = frame
        .column(name)
        .map_err(|_| DataError::Schema(format!("필수 컬럼 누락: {}", name)))?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    series
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.and_then(Decimal::from_f64)
                .ok_or_else(|| DataError::Schema(format!("{}[{}] 값이 null 또는 NaN", name, i)))
        })
        .collect()
}

/// epoch ms를 DateTime<Utc>로 변환.
fn epoch_ms_to_datetime(ms: i64) -> Result<DateTime<Utc>> {
    match Utc.timestamp_millis_opt(ms) {
        chrono::LocalResult::Single(dt) => Ok(dt),
        _ => Err(DataError::Schema(format!("유효하지 않은 타임스탬프: {}", ms))),
    }
}

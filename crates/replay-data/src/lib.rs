//! 캔들 데이터 스토리지 크레이트.
//!
//! `(symbol, interval)` 별 parquet 파일에서 OHLCV 캔들을 로드하고
//! 날짜 범위 필터링과 정렬/중복 검증을 수행합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use replay_data::{CandleSource, ParquetCandleStore};
//!
//! let store = ParquetCandleStore::new("data/historical");
//! let candles = store.load("BTCUSDT", "1m", start, end).await?;
//! ```

pub mod error;
pub mod loader;

pub use error::{DataError, Result};
pub use loader::{CandleSource, ParquetCandleStore};

//! 데이터 에러 타입 정의.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// 캔들 데이터 에러.
///
/// 모든 variant는 치명적입니다. 손상되거나 누락된 캔들로는
/// 해당 구간의 합성을 시작할 수 없습니다.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터 파일 없음
    #[error("데이터 파일을 찾을 수 없습니다: {0}")]
    FileNotFound(String),

    /// 요청 범위에 캔들 없음
    #[error("요청 범위에 캔들이 없습니다: {start} ~ {end}")]
    EmptyRange { start: String, end: String },

    /// 시간순 정렬 위반
    #[error("캔들 데이터가 시간순으로 정렬되어 있지 않습니다: {at}")]
    OutOfOrder { at: DateTime<Utc> },

    /// open_time 중복
    #[error("중복된 캔들이 있습니다: {at}")]
    Duplicate { at: DateTime<Utc> },

    /// 캔들 필드 비정상 (OHLC 역전, 음수 거래량 등)
    #[error("손상된 캔들: {at} ({reason})")]
    Corrupt { at: DateTime<Utc>, reason: String },

    /// 스키마/타입 변환 실패
    #[error("컬럼 변환 실패: {0}")]
    Schema(String),

    /// polars 내부 에러
    #[error("스토리지 에러: {0}")]
    Storage(#[from] polars::error::PolarsError),
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, DataError>;

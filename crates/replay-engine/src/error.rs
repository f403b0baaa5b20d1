//! 리플레이 엔진 에러 타입.

use replay_data::DataError;
use thiserror::Error;

/// 리플레이 오류.
///
/// 모든 variant는 치명적입니다. 실패 시 엔진이 실패 단계와 마지막으로
/// 처리한 이벤트 시각을 로그로 남깁니다 (재시작 지점 진단용).
#[derive(Debug, Error)]
pub enum ReplayError {
    /// 설정 오류
    #[error("리플레이 설정 오류: {0}")]
    Config(String),

    /// 데이터 적재 오류
    #[error("데이터 적재 실패: {source}")]
    Data {
        #[from]
        source: DataError,
    },
}

/// 리플레이 결과 타입
pub type ReplayResult<T> = Result<T, ReplayError>;

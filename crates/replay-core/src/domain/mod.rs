//! 도메인 타입 모듈.

pub mod calculator;
pub mod candle;
pub mod decision;
pub mod event;

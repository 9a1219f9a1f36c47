//! 에러 타입 정의

use std::path::PathBuf;

use thiserror::Error;

/// SFU 프로토콜 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO 에러: {0}")]
    Io(#[from] std::io::Error),

    #[error("파일이 존재하지 않음: {0}")]
    FileNotFound(PathBuf),

    #[error("일반 파일이 아님: {0}")]
    NotAFile(PathBuf),

    #[error("파일이 너무 큼: {size} bytes (최대 {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("파일명이 너무 김: {len} bytes (최대 {max})")]
    FileNameTooLong { len: usize, max: usize },

    #[error("유효하지 않은 파일명: {0:?}")]
    InvalidFileName(String),

    #[error("헤더의 파일 크기가 한도 초과: {size} bytes (최대 {max})")]
    HeaderTooLarge { size: u64, max: u64 },

    #[error("유효하지 않은 상태 응답: {got:?}")]
    InvalidStatus { got: Vec<u8> },

    #[error("연결 종료")]
    ConnectionClosed,
}

impl Error {
    /// 연결 전 로컬 검증 단계에서 발생하는 에러인지 여부
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::FileNotFound(_)
                | Error::NotAFile(_)
                | Error::FileTooLarge { .. }
                | Error::FileNameTooLong { .. }
                | Error::InvalidFileName(_)
        )
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, Error>;

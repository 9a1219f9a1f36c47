//! 프로토콜 설정

use std::path::PathBuf;
use std::time::Duration;

use crate::{BUFFER_SIZE, DEFAULT_UPLOAD_DIR, MAX_FILE_NAME_LEN, MAX_FILE_SIZE, REPORT_INTERVAL_MS};

/// SFU 프로토콜 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 업로드 파일 저장 디렉터리 (샌드박스 루트)
    pub upload_dir: PathBuf,

    /// 청크 읽기/쓰기 버퍼 크기 (바이트)
    pub buffer_size: usize,

    /// 처리율 보고 주기 (밀리초)
    pub report_interval_ms: u64,

    /// 허용 최대 파일 크기 (바이트)
    pub max_file_size: u64,

    /// 허용 최대 파일명 길이 (UTF-8 바이트)
    pub max_file_name_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            buffer_size: BUFFER_SIZE,
            report_interval_ms: REPORT_INTERVAL_MS, // 3초
            max_file_size: MAX_FILE_SIZE,           // 1 TiB
            max_file_name_len: MAX_FILE_NAME_LEN,
        }
    }
}

impl Config {
    /// 새 설정 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 업로드 디렉터리 지정
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    /// 보고 주기
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }
}

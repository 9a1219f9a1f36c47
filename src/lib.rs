//! # SFU (Stream File Upload)
//!
//! TCP 기반 단일 파일 업로드 프로토콜
//!
//! ## 핵심 특징
//! - **단순 프레임**: 길이 접두 UTF-8 파일명 + u64 크기 + 원시 본문
//! - **고정 응답**: 7바이트 ASCII `SUCCESS` / `FAILURE`
//! - **연결당 태스크**: 서버는 연결마다 독립 태스크로 세션 처리
//! - **샌드박스 저장**: 파일명은 base name만 사용, 업로드 루트 밖으로 쓰기 불가
//! - **처리율 보고**: 활성 연결마다 3초 주기로 순간/평균 속도 출력

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod sandbox;
pub mod server;
pub mod session;
pub mod stats;

pub use client::{send_file, validate_source, SourceFile, TransferOutcome};
pub use config::Config;
pub use error::{Error, Result};
pub use protocol::{StatusReply, TransferHeader};
pub use server::Server;
pub use session::{SessionState, SessionSummary, TransferSession};
pub use stats::{ThroughputMeter, ThroughputReport};

/// 기본 읽기/쓰기 버퍼 크기 (바이트)
pub const BUFFER_SIZE: usize = 4096;

/// 파일명 최대 길이 (UTF-8 바이트)
pub const MAX_FILE_NAME_LEN: usize = 4096;

/// 파일 최대 크기 (1 TiB)
pub const MAX_FILE_SIZE: u64 = 1 << 40;

/// 상태 응답 길이 (바이트)
pub const STATUS_LEN: usize = 7;

/// 처리율 보고 주기 (밀리초)
pub const REPORT_INTERVAL_MS: u64 = 3000;

/// 기본 업로드 디렉터리 (서버 작업 디렉터리 기준)
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

//! 전송 클라이언트
//!
//! 로컬 파일 검증 → 연결 1회 → 헤더 + 본문 전송 → 상태 응답 수신.
//! 자동 재시도는 하지 않음.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::protocol::{StatusReply, TransferHeader};
use crate::{Config, Error, Result};

/// 검증을 통과한 전송 대상 파일
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// 서버로 보낼 base name
    pub file_name: String,
    pub size: u64,
}

/// 전송 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// 서버가 `SUCCESS` 응답
    Success,
    /// 서버가 `FAILURE` 응답
    Failure,
    /// 응답 7바이트 전에 서버가 연결 종료
    NoResponse,
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Success)
    }
}

impl From<Option<StatusReply>> for TransferOutcome {
    fn from(reply: Option<StatusReply>) -> Self {
        match reply {
            Some(StatusReply::Success) => TransferOutcome::Success,
            Some(StatusReply::Failure) => TransferOutcome::Failure,
            None => TransferOutcome::NoResponse,
        }
    }
}

/// 연결 전 로컬 검증
///
/// 파일명 길이 한도, 파일 존재 여부, 일반 파일 여부, 크기 한도 확인
pub async fn validate_source(path: &Path, config: &Config) -> Result<SourceFile> {
    // 파일시스템 한도(NAME_MAX)보다 긴 이름도 IO 에러가 아닌 검증 에러로 처리
    let name = path.file_name().and_then(|n| n.to_str());
    if let Some(name) = name {
        if name.len() > config.max_file_name_len {
            return Err(Error::FileNameTooLong {
                len: name.len(),
                max: config.max_file_name_len,
            });
        }
    }

    let metadata = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::FileNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_file() {
        return Err(Error::NotAFile(path.to_path_buf()));
    }

    let size = metadata.len();
    if size > config.max_file_size {
        return Err(Error::FileTooLarge {
            size,
            max: config.max_file_size,
        });
    }

    let file_name = name.ok_or_else(|| Error::InvalidFileName(path.display().to_string()))?;

    Ok(SourceFile {
        path: path.to_path_buf(),
        file_name: file_name.to_string(),
        size,
    })
}

/// 파일 하나를 서버로 업로드
///
/// 검증 실패 시 연결을 시도하지 않음 (`Error::is_validation`)
pub async fn send_file(path: &Path, host: &str, port: u16, config: &Config) -> Result<TransferOutcome> {
    let source = validate_source(path, config).await?;
    info!(
        "Sending \"{}\" ({} bytes) to {}:{}",
        source.file_name, source.size, host, port
    );

    let mut stream = TcpStream::connect((host, port)).await?;
    debug!("Connected to {}", stream.peer_addr()?);

    match send_body(&mut stream, &source, config.buffer_size).await {
        Ok(sent) => {
            debug!("Sent {} body bytes", sent);
            if sent != source.size {
                warn!(
                    "File size changed during transfer: declared {}, sent {}",
                    source.size, sent
                );
            }
        }
        Err(e) => {
            // 서버가 먼저 응답하고 닫았을 수 있음
            warn!("Transfer interrupted: {}", e);
            return match StatusReply::read_from(&mut stream).await {
                Ok(Some(reply)) => Ok(Some(reply).into()),
                _ => Err(e),
            };
        }
    }

    let reply = StatusReply::read_from(&mut stream).await?;
    Ok(reply.into())
}

/// 헤더와 본문 전송 후 쓰기 방향 종료
async fn send_body(stream: &mut TcpStream, source: &SourceFile, buffer_size: usize) -> Result<u64> {
    let mut file = File::open(&source.path).await?;

    TransferHeader::new(source.file_name.clone(), source.size)
        .write_to(stream)
        .await?;

    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut sent = 0u64;
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        stream.write_all(&buf[..n]).await?;
        sent += n as u64;
    }

    stream.flush().await?;
    // 파일이 줄어든 경우에도 서버가 EOF로 부족분을 판정하도록
    stream.shutdown().await?;
    Ok(sent)
}

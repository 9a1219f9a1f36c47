//! 전송 세션 (서버측, 연결당 1개)
//!
//! - 헤더 디코딩 → 본문 수신 → 상태 응답
//! - 파일과 연결은 어떤 종료 경로에서도 세션과 함께 해제됨
//! - 실패는 세션 밖으로 전파되지 않고 로그와 `SessionSummary`로만 남음

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use crate::protocol::{StatusReply, TransferHeader};
use crate::sandbox;
use crate::stats::ThroughputMeter;
use crate::{Config, Result};

/// 세션 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitHeader,
    ReceivingBody,
    Completed,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Failed)
    }
}

/// 종료된 세션 요약
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub peer: SocketAddr,
    pub state: SessionState,
    pub header: Option<TransferHeader>,
    /// 저장 경로 (샌드박스 경로가 결정된 경우)
    pub path: Option<PathBuf>,
    pub bytes_received: u64,
    /// 실제로 기록에 성공한 응답
    pub reply_sent: Option<StatusReply>,
    pub interval_reports: u64,
    pub elapsed: Duration,
}

/// 본문 수신 루프 종료 사유
enum BodyEnd {
    /// 선언 크기만큼 수신
    Complete,
    /// 선언 크기 전에 스트림 종료
    Shortfall,
}

/// 연결 하나의 전체 수명 동안의 서버측 상태
pub struct TransferSession {
    peer: SocketAddr,
    config: Arc<Config>,
    state: SessionState,
    meter: ThroughputMeter,
    header: Option<TransferHeader>,
    path: Option<PathBuf>,
    /// 스트림에서 읽어낸 본문 바이트 (파일 기록 실패분 포함)
    consumed: u64,
}

impl TransferSession {
    /// 연결 수락 즉시 생성
    pub fn new(peer: SocketAddr, config: Arc<Config>) -> Self {
        let meter = ThroughputMeter::new(config.report_interval());
        Self {
            peer,
            config,
            state: SessionState::AwaitHeader,
            meter,
            header: None,
            path: None,
            consumed: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// 세션 실행. 스트림은 반환 시 해제됨
    pub async fn run<S>(mut self, mut stream: S) -> SessionSummary
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        // === AwaitHeader ===
        let header = match TransferHeader::read_from(
            &mut stream,
            self.config.max_file_name_len,
            self.config.max_file_size,
        )
        .await
        {
            Ok(header) => header,
            Err(e) => {
                warn!("[Client {}] Failed to decode header: {}", self.peer, e);
                self.state = SessionState::Failed;
                return self.summary(None);
            }
        };

        info!(
            "[Client {}] Receiving \"{}\" ({} bytes)",
            self.peer, header.file_name, header.file_size
        );
        self.header = Some(header.clone());

        // === ReceivingBody ===
        self.state = SessionState::ReceivingBody;
        let result = self.receive_body(&mut stream, &header).await;

        if let Some(report) = self.meter.finish(Instant::now()) {
            info!("[Client {}] {}", self.peer, report);
        }

        let received = self.meter.total_bytes();
        let reply = match result {
            Ok(BodyEnd::Complete) => {
                info!(
                    "[Client {}] File \"{}\" successfully received",
                    self.peer, header.file_name
                );
                StatusReply::for_counts(received, header.file_size)
            }
            Ok(BodyEnd::Shortfall) => {
                warn!(
                    "[Client {}] Error receiving \"{}\": expected {}, received {}",
                    self.peer, header.file_name, header.file_size, received
                );
                StatusReply::Failure
            }
            Err(e) => {
                error!(
                    "[Client {}] Transfer of \"{}\" failed after {} bytes: {}",
                    self.peer, header.file_name, received, e
                );
                // 미수신 본문이 남은 채 닫으면 RST로 응답이 유실됨
                self.discard_body(&mut stream, header.file_size).await;
                StatusReply::Failure
            }
        };

        self.state = if reply.is_success() {
            SessionState::Completed
        } else {
            SessionState::Failed
        };

        // 연결이 살아있을 때만 응답 전달됨
        let reply_sent = match reply.write_to(&mut stream).await {
            Ok(()) => Some(reply),
            Err(e) => {
                debug!("[Client {}] Could not send {}: {}", self.peer, reply, e);
                None
            }
        };
        let _ = stream.shutdown().await;

        self.summary(reply_sent)
    }

    /// 본문 수신. 출력 파일은 반환 전에 닫힘
    async fn receive_body<S>(&mut self, stream: &mut S, header: &TransferHeader) -> Result<BodyEnd>
    where
        S: AsyncRead + Unpin,
    {
        let path = sandbox::upload_path(&self.config.upload_dir, &header.file_name)?;
        self.path = Some(path.clone());

        let mut file = File::create(&path).await?;
        debug!("[Client {}] Writing to {}", self.peer, path.display());

        let mut buf = vec![0u8; self.config.buffer_size.max(1)];
        let mut end = BodyEnd::Complete;

        while self.meter.total_bytes() < header.file_size {
            let remaining = header.file_size - self.meter.total_bytes();
            let want = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));

            let n = stream.read(&mut buf[..want]).await?;
            if n == 0 {
                end = BodyEnd::Shortfall;
                break;
            }
            self.consumed += n as u64;

            file.write_all(&buf[..n]).await?;

            if let Some(report) = self.meter.record(n, Instant::now()) {
                info!("[Client {}] {}", self.peer, report);
            }
        }

        file.flush().await?;
        Ok(end)
    }

    /// 선언 크기까지 남은 본문을 읽어서 버림. EOF나 읽기 에러에서 중단
    async fn discard_body<S>(&mut self, stream: &mut S, file_size: u64)
    where
        S: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; self.config.buffer_size.max(1)];
        while self.consumed < file_size {
            let remaining = file_size - self.consumed;
            let want = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));

            match stream.read(&mut buf[..want]).await {
                Ok(0) => break,
                Ok(n) => self.consumed += n as u64,
                Err(e) => {
                    debug!("[Client {}] Discard stopped: {}", self.peer, e);
                    break;
                }
            }
        }
        debug!(
            "[Client {}] Discarded body up to {} of {} bytes",
            self.peer, self.consumed, file_size
        );
    }

    fn summary(&self, reply_sent: Option<StatusReply>) -> SessionSummary {
        SessionSummary {
            peer: self.peer,
            state: self.state,
            header: self.header.clone(),
            path: self.path.clone(),
            bytes_received: self.meter.total_bytes(),
            reply_sent,
            interval_reports: self.meter.interval_reports(),
            elapsed: self.meter.elapsed(Instant::now()),
        }
    }
}

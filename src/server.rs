//! 연결 수락기
//!
//! 연결마다 독립 태스크에 세션을 넘기고 즉시 다음 연결을 기다린다.
//! 동시 연결 수 제한은 없음.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::{debug, info, warn};

use crate::sandbox;
use crate::session::TransferSession;
use crate::{Config, Result};

/// accept 실패 후 재시도 대기
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// 업로드 서버
pub struct Server {
    listener: TcpListener,
    config: Arc<Config>,
}

impl Server {
    /// 업로드 디렉터리를 만들고 리스닝 소켓 바인딩
    pub async fn bind<A: ToSocketAddrs>(addr: A, config: Config) -> Result<Self> {
        sandbox::ensure_upload_dir(&config.upload_dir).await?;
        let listener = TcpListener::bind(addr).await?;

        Ok(Self {
            listener,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 연결 수락 루프 (프로세스 종료 전까지 반환하지 않음)
    pub async fn run(self) -> Result<()> {
        info!("Waiting for clients...");

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    // 개별 accept 실패는 서버를 멈추지 않음
                    warn!("Accept failed: {}", e);
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    continue;
                }
            };

            info!("New client connection from {}", peer);
            if let Err(e) = stream.set_nodelay(true) {
                debug!("[Client {}] set_nodelay failed: {}", peer, e);
            }

            let session = TransferSession::new(peer, self.config.clone());
            tokio::spawn(async move {
                let summary = session.run(stream).await;
                debug!(
                    "[Client {}] Session ended: {:?}, {} bytes in {:.2}s",
                    summary.peer,
                    summary.state,
                    summary.bytes_received,
                    summary.elapsed.as_secs_f64()
                );
            });
        }
    }
}

//! SFU 서버 - Stream File Upload
//!
//! 여러 클라이언트의 업로드를 동시에 받아 업로드 디렉터리에 저장
//! - 연결마다 독립 태스크
//! - 활성 연결마다 3초 주기 순간/평균 속도 출력
//!
//! 사용법:
//!   cargo run --release --bin sfu-server -- <PORT> [OPTIONS]
//!
//! 예시:
//!   cargo run --release --bin sfu-server -- 9000
//!   cargo run --release --bin sfu-server -- 9000 --upload-dir /srv/uploads

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sfu::{Config, Server};

const USAGE: &str = r#"SFU Server - Stream File Upload 서버

사용법:
  sfu-server <PORT> [OPTIONS]

옵션:
  -u, --upload-dir <DIR>  업로드 디렉터리 (기본: ./uploads)
  -v, --verbose           디버그 로그 출력
  -h, --help              이 도움말 출력
"#;

/// 서버 설정
struct ServerArgs {
    port: u16,
    upload_dir: Option<PathBuf>,
    verbose: bool,
}

fn parse_args() -> Result<ServerArgs, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut port = None;
    let mut upload_dir = None;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--upload-dir" | "-u" => {
                let dir = args.get(i + 1).ok_or("--upload-dir 값 필요")?;
                upload_dir = Some(PathBuf::from(dir));
                i += 1;
            }
            "--verbose" | "-v" => verbose = true,
            "--help" | "-h" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            arg if port.is_none() => {
                port = Some(arg.parse().map_err(|_| format!("유효한 포트 번호 필요: {}", arg))?);
            }
            arg => return Err(format!("알 수 없는 인자: {}", arg)),
        }
        i += 1;
    }

    Ok(ServerArgs {
        port: port.ok_or("포트 번호 필요")?,
        upload_dir,
        verbose,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}\n\n{}", msg, USAGE);
            std::process::exit(2);
        }
    };

    // 로깅 설정
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = Config::default();
    if let Some(dir) = args.upload_dir {
        config.upload_dir = dir;
    }

    info!("SFU Server starting...");
    info!("Upload directory: {}", config.upload_dir.display());

    // 바인딩 실패만 치명적
    let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.port));
    let server = Server::bind(bind_addr, config).await?;
    let local_addr = server.local_addr()?;
    info!("Server runs at ip-address {}", local_addr.ip());
    info!("Server runs at port {}", local_addr.port());

    server.run().await?;
    Ok(())
}

//! SFU 클라이언트 - Stream File Upload
//!
//! 파일 하나를 서버에 업로드하고 결과 출력
//!
//! 사용법:
//!   cargo run --release --bin sfu-client -- <FILE> <HOST> <PORT>
//!
//! 예시:
//!   cargo run --release --bin sfu-client -- ./data.bin 127.0.0.1 9000
//!
//! 종료 코드: 0 성공, 1 전송 실패/무응답, 2 사용법 또는 로컬 검증 실패

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use sfu::{send_file, Config, TransferOutcome};

const USAGE: &str = r#"SFU Client - Stream File Upload 클라이언트

사용법:
  sfu-client <FILE> <HOST> <PORT> [OPTIONS]

옵션:
  -v, --verbose    디버그 로그 출력
  -h, --help       이 도움말 출력
"#;

/// 클라이언트 설정
struct ClientArgs {
    file: PathBuf,
    host: String,
    port: u16,
    verbose: bool,
}

fn parse_args() -> Result<ClientArgs, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut positional = Vec::new();
    let mut verbose = false;

    for arg in &args[1..] {
        match arg.as_str() {
            "--verbose" | "-v" => verbose = true,
            "--help" | "-h" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            _ => positional.push(arg.clone()),
        }
    }

    if positional.len() != 3 {
        return Err(format!("인자 3개 필요, {}개 받음", positional.len()));
    }

    let port = positional[2]
        .parse()
        .map_err(|_| format!("유효한 포트 번호 필요: {}", positional[2]))?;

    Ok(ClientArgs {
        file: PathBuf::from(&positional[0]),
        host: positional[1].clone(),
        port,
        verbose,
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}\n\n{}", msg, USAGE);
            return ExitCode::from(2);
        }
    };

    // 로깅 설정
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("로깅 초기화 실패: {}", e);
    }

    let start = Instant::now();
    let outcome = send_file(&args.file, &args.host, args.port, &Config::default()).await;
    let elapsed = start.elapsed();

    match outcome {
        Ok(TransferOutcome::Success) => {
            info!("File transferred successfully ({:.2}s)", elapsed.as_secs_f64());
            ExitCode::SUCCESS
        }
        Ok(TransferOutcome::Failure) => {
            error!("Server reported failure while transferring file");
            ExitCode::from(1)
        }
        Ok(TransferOutcome::NoResponse) => {
            error!("No response from server");
            ExitCode::from(1)
        }
        Err(e) if e.is_validation() => {
            error!("Wrong input: {}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            error!("Transfer failed: {}", e);
            ExitCode::from(1)
        }
    }
}

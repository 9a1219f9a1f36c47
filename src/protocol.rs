//! 와이어 프레임 정의
//!
//! 클라이언트 → 서버 (연결당 1회):
//! - 파일명 길이 `u16` (big-endian) + UTF-8 파일명
//! - 파일 크기 `u64` (big-endian)
//! - 본문: 정확히 파일 크기만큼의 원시 바이트 (프레이밍/체크섬 없음)
//!
//! 서버 → 클라이언트 (본문 단계 종료 후 1회, 연결이 살아있을 때만):
//! - 7바이트 ASCII `SUCCESS` 또는 `FAILURE`

use std::io::ErrorKind;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{Error, Result, STATUS_LEN};

/// 전송 헤더 (세션 시작 시 1회 전송, 이후 불변)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferHeader {
    /// 클라이언트가 보낸 파일명 (정제 전)
    pub file_name: String,

    /// 선언된 본문 크기 (바이트)
    pub file_size: u64,
}

impl TransferHeader {
    pub fn new(file_name: impl Into<String>, file_size: u64) -> Self {
        Self {
            file_name: file_name.into(),
            file_size,
        }
    }

    /// 인코딩된 헤더 길이
    pub fn encoded_len(&self) -> usize {
        2 + self.file_name.len() + 8
    }

    /// 바이트로 직렬화
    ///
    /// 파일명 길이가 `u16` 범위를 넘으면 실패
    pub fn encode(&self) -> Result<Bytes> {
        let name = self.file_name.as_bytes();
        let name_len = u16::try_from(name.len()).map_err(|_| Error::FileNameTooLong {
            len: name.len(),
            max: u16::MAX as usize,
        })?;

        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u16(name_len);
        buf.put_slice(name);
        buf.put_u64(self.file_size);
        Ok(buf.freeze())
    }

    /// 스트림에 헤더 기록
    pub async fn write_to<W>(&self, writer: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let bytes = self.encode()?;
        writer.write_all(&bytes).await?;
        Ok(())
    }

    /// 스트림에서 헤더 디코딩
    ///
    /// 헤더 도중 스트림이 끝나면 `ConnectionClosed`
    pub async fn read_from<R>(reader: &mut R, max_name_len: usize, max_file_size: u64) -> Result<Self>
    where
        R: AsyncRead + Unpin,
    {
        let name_len = reader.read_u16().await.map_err(eof_as_closed)? as usize;
        if name_len > max_name_len {
            return Err(Error::FileNameTooLong {
                len: name_len,
                max: max_name_len,
            });
        }

        let mut name = vec![0u8; name_len];
        reader.read_exact(&mut name).await.map_err(eof_as_closed)?;
        let file_name = String::from_utf8(name)
            .map_err(|e| Error::InvalidFileName(String::from_utf8_lossy(e.as_bytes()).into_owned()))?;

        let file_size = reader.read_u64().await.map_err(eof_as_closed)?;
        if file_size > max_file_size {
            return Err(Error::HeaderTooLarge {
                size: file_size,
                max: max_file_size,
            });
        }

        Ok(Self { file_name, file_size })
    }
}

/// 상태 응답
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusReply {
    Success,
    Failure,
}

impl StatusReply {
    pub fn as_bytes(&self) -> &'static [u8; STATUS_LEN] {
        match self {
            StatusReply::Success => b"SUCCESS",
            StatusReply::Failure => b"FAILURE",
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            b"SUCCESS" => Some(StatusReply::Success),
            b"FAILURE" => Some(StatusReply::Failure),
            _ => None,
        }
    }

    /// 수신 바이트 수가 선언 크기와 같을 때만 성공
    pub fn for_counts(received: u64, declared: u64) -> Self {
        if received == declared {
            StatusReply::Success
        } else {
            StatusReply::Failure
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StatusReply::Success)
    }

    pub async fn write_to<W>(&self, writer: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(self.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }

    /// 스트림에서 응답 7바이트 읽기
    ///
    /// 7바이트가 오기 전에 상대가 닫으면 `Ok(None)` (무응답)
    pub async fn read_from<R>(reader: &mut R) -> Result<Option<Self>>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = [0u8; STATUS_LEN];
        match reader.read_exact(&mut buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        Self::from_bytes(&buf)
            .map(Some)
            .ok_or_else(|| Error::InvalidStatus { got: buf.to_vec() })
    }
}

impl std::fmt::Display for StatusReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusReply::Success => f.write_str("SUCCESS"),
            StatusReply::Failure => f.write_str("FAILURE"),
        }
    }
}

fn eof_as_closed(e: std::io::Error) -> Error {
    if e.kind() == ErrorKind::UnexpectedEof {
        Error::ConnectionClosed
    } else {
        Error::Io(e)
    }
}

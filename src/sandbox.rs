//! 업로드 샌드박스
//!
//! 클라이언트가 보낸 파일명에서 디렉터리 성분을 모두 제거하고
//! base name만 업로드 루트에 결합한다.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::{Error, Result};

#[cfg(windows)]
const SEPARATORS: &[char] = &['/', '\\', ':'];
#[cfg(not(windows))]
const SEPARATORS: &[char] = &['/', '\\'];

/// 파일명의 base name 추출
///
/// 마지막 구분자 뒤의 텍스트만 남긴다. 빈 이름, `.`, `..`, NUL 포함 이름은 거부.
pub fn base_name(file_name: &str) -> Result<&str> {
    let base = file_name.rsplit(SEPARATORS).next().unwrap_or_default();

    if base.is_empty() || base == "." || base == ".." || base.contains('\0') {
        return Err(Error::InvalidFileName(file_name.to_string()));
    }

    Ok(base)
}

/// 샌드박스 루트 아래의 저장 경로
pub fn upload_path(root: &Path, file_name: &str) -> Result<PathBuf> {
    let base = base_name(file_name)?;

    let mut components = Path::new(base).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {}
        _ => return Err(Error::InvalidFileName(file_name.to_string())),
    }

    Ok(root.join(base))
}

/// 업로드 디렉터리 생성 (이미 있으면 그대로)
pub async fn ensure_upload_dir(root: &Path) -> Result<()> {
    tokio::fs::create_dir_all(root).await?;
    debug!("Upload directory ready: {}", root.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name() {
        assert_eq!(base_name("report.pdf").unwrap(), "report.pdf");
        assert_eq!(base_name("파일 이름.txt").unwrap(), "파일 이름.txt");
        assert_eq!(base_name(".hidden").unwrap(), ".hidden");
    }

    #[test]
    fn test_strips_directories() {
        assert_eq!(base_name("../../secret").unwrap(), "secret");
        assert_eq!(base_name("/etc/passwd").unwrap(), "passwd");
        assert_eq!(base_name("a/b/c.txt").unwrap(), "c.txt");
        assert_eq!(base_name("..\\..\\windows\\win.ini").unwrap(), "win.ini");
    }

    #[test]
    fn test_rejects_degenerate_names() {
        for name in ["", ".", "..", "dir/", "../..", "/", "a/..", "nul\0byte"] {
            assert!(
                matches!(base_name(name), Err(Error::InvalidFileName(_))),
                "name={name:?}"
            );
        }
    }

    #[test]
    fn test_upload_path_stays_in_root() {
        let root = Path::new("/srv/uploads");
        for name in ["../../secret", "/abs/path/file", "sub/../../x", "plain"] {
            let path = upload_path(root, name).unwrap();
            assert_eq!(path.parent(), Some(root), "name={name:?}");
        }
        assert_eq!(
            upload_path(root, "../../secret").unwrap(),
            root.join("secret")
        );
    }

    #[tokio::test]
    async fn test_ensure_upload_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path().join("a").join("uploads");

        ensure_upload_dir(&root).await.unwrap();
        assert!(root.is_dir());

        // 두 번째 호출도 성공
        ensure_upload_dir(&root).await.unwrap();
    }
}

//! Checksum-guarded file copies
//!
//! Staging and mirroring rewrite the same trees over and over, so every
//! copy first compares size and SHA-256 digest and is skipped when the
//! destination already matches. Destination directories are created on
//! demand.

use std::fs;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::report::Reporter;

/// What [`copy_if_changed`] did with the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    UpToDate,
}

/// Hex SHA-256 digest of a file's contents.
pub fn file_digest(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Copies `src` over `dst` unless the contents already match.
///
/// The size check runs first so identical large trees cost one metadata
/// read per file instead of two full hashes.
pub fn copy_if_changed(src: &Path, dst: &Path) -> io::Result<CopyOutcome> {
    if dst.is_file() {
        let src_len = fs::metadata(src)?.len();
        let dst_len = fs::metadata(dst)?.len();
        if src_len == dst_len && file_digest(src)? == file_digest(dst)? {
            return Ok(CopyOutcome::UpToDate);
        }
    }
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dst)?;
    Ok(CopyOutcome::Copied)
}

/// Reports the outcome of one guarded copy on `reporter`.
pub fn copy_reporting(src: &Path, dst: &Path, reporter: &Reporter) {
    match copy_if_changed(src, dst) {
        Ok(CopyOutcome::Copied) => reporter.copied(src, dst),
        Ok(CopyOutcome::UpToDate) => reporter.up_to_date(dst),
        Err(err) => {
            let context = format!("copy {} -> {}", src.display(), dst.display());
            reporter.failed(&context, &err);
        }
    }
}

/// True when `a` carries a strictly newer modification time than `b`.
pub fn newer_than(a: &Path, b: &Path) -> io::Result<bool> {
    let a_modified = fs::metadata(a)?.modified()?;
    let b_modified = fs::metadata(b)?.modified()?;
    Ok(a_modified > b_modified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable_hex() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, b"hello").unwrap();
        let digest = file_digest(&path).unwrap();
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, file_digest(&path).unwrap());
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_copy_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.c");
        let dst = dir.path().join("Lib").join("SPL").join("src.c");
        fs::write(&src, b"int main;").unwrap();
        assert_eq!(copy_if_changed(&src, &dst).unwrap(), CopyOutcome::Copied);
        assert_eq!(fs::read(&dst).unwrap(), b"int main;");
    }

    #[test]
    fn test_identical_destination_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.c");
        let dst = dir.path().join("dst.c");
        fs::write(&src, b"same").unwrap();
        fs::write(&dst, b"same").unwrap();
        assert_eq!(copy_if_changed(&src, &dst).unwrap(), CopyOutcome::UpToDate);
    }

    #[test]
    fn test_same_size_different_content_is_copied() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.c");
        let dst = dir.path().join("dst.c");
        fs::write(&src, b"aaaa").unwrap();
        fs::write(&dst, b"bbbb").unwrap();
        assert_eq!(copy_if_changed(&src, &dst).unwrap(), CopyOutcome::Copied);
        assert_eq!(fs::read(&dst).unwrap(), b"aaaa");
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("absent.c");
        let dst = dir.path().join("dst.c");
        assert!(copy_if_changed(&src, &dst).is_err());
    }

    #[test]
    fn test_newer_than_orders_by_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.c");
        let new = dir.path().join("new.c");
        fs::write(&old, b"old").unwrap();
        fs::write(&new, b"new").unwrap();
        let file = fs::File::options().write(true).open(&new).unwrap();
        let later = std::time::SystemTime::now() + std::time::Duration::from_secs(60);
        file.set_modified(later).unwrap();
        assert!(newer_than(&new, &old).unwrap());
        assert!(!newer_than(&old, &new).unwrap());
    }

    #[test]
    fn test_reporting_copy_tallies() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.c");
        let dst = dir.path().join("dst.c");
        fs::write(&src, b"body").unwrap();
        let reporter = Reporter::new();
        copy_reporting(&src, &dst, &reporter);
        copy_reporting(&src, &dst, &reporter);
        copy_reporting(&dir.path().join("absent.c"), &dst, &reporter);
        let tally = reporter.tally();
        assert_eq!(tally.copied, 1);
        assert_eq!(tally.up_to_date, 1);
        assert_eq!(tally.failed, 1);
    }
}

//! Tests for the atomic replace primitive and the read helpers

use cni_fs::io;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

fn temp_files(dir: &std::path::Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect()
}

#[test]
fn write_atomic_creates_missing_parents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("host").join("opt").join("cni").join("bin").join("plugin");

    io::write_atomic(&path, b"v1", None).unwrap();

    assert_eq!(fs::read(&path).unwrap(), b"v1");
}

#[test]
fn write_atomic_replaces_existing_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plugin");
    fs::write(&path, b"a much longer old binary").unwrap();

    io::write_atomic(&path, b"v2", None).unwrap();

    assert_eq!(fs::read(&path).unwrap(), b"v2");
}

#[test]
fn write_atomic_leaves_no_temp_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kubeconfig");

    io::write_atomic(&path, b"content", Some(0o600)).unwrap();

    let leftovers = temp_files(dir.path());
    assert!(leftovers.is_empty(), "temp files left behind: {:?}", leftovers);
}

#[test]
fn read_optional_returns_content_when_present() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("token");
    fs::write(&path, b"abc").unwrap();

    assert_eq!(io::read_optional(&path).unwrap(), Some(b"abc".to_vec()));
}

#[test]
fn read_bytes_missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let err = io::read_bytes(&dir.path().join("token")).unwrap_err();

    assert!(err.is_not_found(), "unexpected error: {err}");
    assert!(err.to_string().contains("token"));
}

#[test]
fn regular_files_skips_directories_and_sorts() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b-plugin"), b"b").unwrap();
    fs::write(dir.path().join("a-plugin"), b"a").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();

    let names: Vec<String> = io::regular_files(dir.path())
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names, vec!["a-plugin".to_string(), "b-plugin".to_string()]);
}

#[test]
fn regular_files_missing_dir_is_error() {
    let dir = tempdir().unwrap();
    assert!(io::regular_files(&dir.path().join("nope")).is_err());
}

#[test]
fn ensure_dir_is_idempotent() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("a").join("b");

    io::ensure_dir(&target).unwrap();
    io::ensure_dir(&target).unwrap();

    assert!(target.is_dir());
}

#[cfg(unix)]
mod unix_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    fn is_root() -> bool {
        match std::process::Command::new("id").arg("-u").output() {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim() == "0",
            Err(_) => false,
        }
    }

    #[rstest]
    #[case(0o755)]
    #[case(0o600)]
    #[case(0o644)]
    fn write_atomic_applies_mode_regardless_of_umask(#[case] mode: u32) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file");

        io::write_atomic(&path, b"content", Some(mode)).unwrap();

        assert_eq!(io::file_mode(&path).unwrap(), Some(mode));
    }

    #[test]
    fn file_mode_missing_is_none() {
        let dir = tempdir().unwrap();
        assert_eq!(io::file_mode(&dir.path().join("absent")).unwrap(), None);
    }

    #[test]
    fn set_mode_changes_permissions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file");
        fs::write(&path, b"x").unwrap();
        fs::set_permissions(&path, Permissions::from_mode(0o644)).unwrap();

        io::set_mode(&path, 0o600).unwrap();

        assert_eq!(io::file_mode(&path).unwrap(), Some(0o600));
    }

    #[test]
    fn write_atomic_to_readonly_directory_returns_error() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let readonly_dir = dir.path().join("readonly");
        fs::create_dir(&readonly_dir).unwrap();
        fs::set_permissions(&readonly_dir, Permissions::from_mode(0o555)).unwrap();

        let result = io::write_atomic(&readonly_dir.join("plugin"), b"v1", Some(0o755));

        // Restore permissions before assertions (for cleanup)
        let _ = fs::set_permissions(&readonly_dir, Permissions::from_mode(0o755));

        assert!(result.is_err(), "Writing to read-only directory should fail");
        assert!(temp_files(&readonly_dir).is_empty());
    }

    #[test]
    fn read_optional_permission_denied_is_error() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let path = dir.path().join("kubeconfig");
        fs::write(&path, b"secret").unwrap();
        fs::set_permissions(&path, Permissions::from_mode(0o000)).unwrap();

        let result = io::read_optional(&path);

        let _ = fs::set_permissions(&path, Permissions::from_mode(0o644));

        assert!(result.is_err(), "Unreadable file must not look absent");
    }
}

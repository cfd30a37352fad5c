//! Archive extraction

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use super::InstallError;

/// Extract the entry named `binary` from a zip archive into `dest_dir`
///
/// Only the file name of each entry is compared, so `bin/terraform` matches too.
pub fn extract_binary(archive: &Path, binary: &str, dest_dir: &Path) -> Result<PathBuf, InstallError> {
    let fail = |reason: String| InstallError::Extract {
        binary: binary.to_string(),
        reason,
    };

    let file = File::open(archive).map_err(|e| fail(format!("cannot open archive: {}", e)))?;
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|e| fail(format!("not a valid zip archive: {}", e)))?;

    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| fail(format!("corrupt archive entry: {}", e)))?;
        if entry.is_dir() {
            continue;
        }
        let Some(name) = entry.enclosed_name() else {
            continue;
        };
        if name.file_name().and_then(|n| n.to_str()) != Some(binary) {
            continue;
        }

        fs::create_dir_all(dest_dir).map_err(|e| fail(e.to_string()))?;
        let out_path = dest_dir.join(binary);
        let mut out = File::create(&out_path).map_err(|e| fail(e.to_string()))?;
        io::copy(&mut entry, &mut out)
            .map_err(|e| fail(format!("corrupt archive data: {}", e)))?;
        return Ok(out_path);
    }

    Err(fail(format!("'{}' not found in archive", binary)))
}

/// Set mode 0755 on `path`
pub fn make_executable(path: &Path) -> Result<(), InstallError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|e| {
            InstallError::permission(path.parent().unwrap_or(path), e)
        })?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extract_finds_binary() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("terraform.zip");
        write_zip(
            &archive,
            &[("LICENSE.txt", b"license"), ("terraform", b"#!/bin/sh\n")],
        );

        let out = extract_binary(&archive, "terraform", &dir.path().join("out")).unwrap();
        assert_eq!(out, dir.path().join("out").join("terraform"));
        assert_eq!(fs::read(&out).unwrap(), b"#!/bin/sh\n");
    }

    #[test]
    fn test_extract_matches_nested_entry() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("tool.zip");
        write_zip(&archive, &[("release/bin/terraform", b"bin")]);

        let out = extract_binary(&archive, "terraform", dir.path()).unwrap();
        assert_eq!(fs::read(out).unwrap(), b"bin");
    }

    #[test]
    fn test_extract_missing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("tool.zip");
        write_zip(&archive, &[("README.md", b"docs")]);

        let err = extract_binary(&archive, "terraform", dir.path()).unwrap_err();
        assert_eq!(err.class(), "extract");
        assert!(err.to_string().contains("not found in archive"));
    }

    #[test]
    fn test_extract_corrupt_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("tool.zip");
        fs::write(&archive, b"this is not a zip file").unwrap();

        let err = extract_binary(&archive, "terraform", dir.path()).unwrap_err();
        assert!(matches!(err, InstallError::Extract { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_make_executable_sets_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terragrunt");
        fs::write(&path, b"binary").unwrap();

        make_executable(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}

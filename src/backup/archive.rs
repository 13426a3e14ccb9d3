// dbvault/src/backup/archive.rs
use std::fs::File;
use std::io;
use std::path::Path;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::backup::artifact::{ArtifactKind, LocalArtifact};
use crate::errors::PackageError;

/// Entry name of the dump inside every packaged artifact. Restore tooling in
/// existing deployments extracts this exact name, so it stays fixed even
/// though the archive file itself is timestamped.
const ARCHIVE_ENTRY_NAME: &str = "backup.sql";

/// Compresses one raw artifact into one packaged artifact.
pub trait Packager: Send + Sync {
    fn pack(&self, raw: &LocalArtifact, dest: &Path) -> Result<LocalArtifact, PackageError>;
}

/// Writes a zip archive holding the raw dump under [`ARCHIVE_ENTRY_NAME`].
/// The archive is finalized before returning, so the caller may hand the
/// returned artifact straight to an uploader.
pub struct ZipPackager;

impl Packager for ZipPackager {
    fn pack(&self, raw: &LocalArtifact, dest: &Path) -> Result<LocalArtifact, PackageError> {
        println!(
            "Compressing {} to {}",
            raw.path.display(),
            dest.display()
        );

        let mut input = File::open(&raw.path)?;
        let mut writer = ZipWriter::new(File::create(dest)?);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(true);

        writer.start_file(ARCHIVE_ENTRY_NAME, options)?;
        io::copy(&mut input, &mut writer)?;
        writer.finish()?.sync_all()?;

        let size = std::fs::metadata(dest)?.len();
        println!("✓ Archive created: {} ({} bytes)", dest.display(), size);

        Ok(LocalArtifact {
            path: dest.to_path_buf(),
            kind: ArtifactKind::Packaged,
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    fn raw_artifact(dir: &Path, contents: &[u8]) -> LocalArtifact {
        let path = dir.join("shopdb_2024-03-07T21-15-09.042.sql");
        let mut file = File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        LocalArtifact {
            path,
            kind: ArtifactKind::RawDump,
            size: contents.len() as u64,
        }
    }

    #[test]
    fn packs_raw_bytes_under_fixed_entry_name() {
        let dir = tempfile::tempdir().unwrap();
        let contents = b"-- PostgreSQL dump\nCREATE TABLE t (id int);\n";
        let raw = raw_artifact(dir.path(), contents);
        let dest = dir.path().join("shopdb_2024-03-07T21-15-09.042.sql.zip");

        let packaged = ZipPackager.pack(&raw, &dest).unwrap();
        assert_eq!(packaged.kind, ArtifactKind::Packaged);
        assert_eq!(packaged.path, dest);
        assert!(packaged.size > 0);

        // The returned artifact must already be a complete, readable archive.
        let mut archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
        let mut entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), ARCHIVE_ENTRY_NAME);
        let mut unpacked = Vec::new();
        entry.read_to_end(&mut unpacked).unwrap();
        assert_eq!(unpacked, contents);
    }

    #[test]
    fn missing_raw_artifact_is_a_package_error() {
        let dir = tempfile::tempdir().unwrap();
        let raw = LocalArtifact {
            path: dir.path().join("missing.sql"),
            kind: ArtifactKind::RawDump,
            size: 0,
        };
        let dest = dir.path().join("missing.sql.zip");
        assert!(matches!(
            ZipPackager.pack(&raw, &dest),
            Err(PackageError::Io(_))
        ));
    }
}

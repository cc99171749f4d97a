//! Archive handling
//!
//! Unpacks toolchain releases (zip, tar.xz, tar.gz) and writes the gzipped
//! tarballs the packager produces.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::ToolchainError;

/// Unpack an archive into `dest_dir`, picking the format from the file name
pub fn extract(archive_path: &Path, dest_dir: &Path) -> Result<(), ToolchainError> {
    let failed = |error: String| ToolchainError::ExtractionFailed {
        archive: archive_path.to_path_buf(),
        error,
    };

    fs::create_dir_all(dest_dir).map_err(|e| failed(e.to_string()))?;
    tracing::info!(
        "Extracting {} to {}",
        archive_path.display(),
        dest_dir.display()
    );

    let name = archive_path.to_string_lossy();
    let result = if name.ends_with(".zip") {
        unpack_zip(archive_path, dest_dir)
    } else if name.ends_with(".tar.xz") {
        unpack_tar_xz(archive_path, dest_dir)
    } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        unpack_tar_gz(archive_path, dest_dir)
    } else if name.ends_with(".tar") {
        unpack_tar(archive_path, dest_dir)
    } else {
        return Err(failed(format!("Unsupported archive format: {name}")));
    };

    result.map_err(|e| failed(e.to_string()))
}

fn unpack_zip(archive_path: &Path, dest_dir: &Path) -> io::Result<()> {
    let file = fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(io::Error::other)?;
    archive.extract(dest_dir).map_err(io::Error::other)
}

fn unpack_tar_xz(archive_path: &Path, dest_dir: &Path) -> io::Result<()> {
    let file = fs::File::open(archive_path)?;
    let decoder = xz2::read::XzDecoder::new(file);
    tar::Archive::new(decoder).unpack(dest_dir)
}

fn unpack_tar_gz(archive_path: &Path, dest_dir: &Path) -> io::Result<()> {
    let file = fs::File::open(archive_path)?;
    let decoder = flate2::read::GzDecoder::new(file);
    tar::Archive::new(decoder).unpack(dest_dir)
}

fn unpack_tar(archive_path: &Path, dest_dir: &Path) -> io::Result<()> {
    let file = fs::File::open(archive_path)?;
    tar::Archive::new(file).unpack(dest_dir)
}

/// Find the top-level directory an archive unpacked to, by name prefix
///
/// Entries are checked in name order so the choice is stable when more
/// than one directory matches.
pub fn find_extracted_dir(dir: &Path, prefixes: &[&str]) -> Option<PathBuf> {
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            prefixes.iter().any(|prefix| name.starts_with(prefix))
        })
        .map(|entry| entry.path())
        .collect();
    matches.sort();
    matches.into_iter().next()
}

/// Write a gzipped tarball from `(source file, name inside archive)` pairs
pub fn create_tar_gz(dest: &Path, entries: &[(PathBuf, String)]) -> io::Result<()> {
    let file = fs::File::create(dest)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (source, name) in entries {
        builder.append_path_with_name(source, name)?;
        tracing::debug!("Added to package: {name}");
    }

    builder.into_inner()?.finish()?;
    Ok(())
}

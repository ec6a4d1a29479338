//! Plugin packages: zip archives carrying a `plugin.json` manifest.
//!
//! The archive is extracted into a temporary directory, the shallowest
//! `plugin.json` is parsed and validated, and the directory holding it is
//! copied to `<plugins_dir>/<slug>`.

use std::fs::{self, File};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::ZipArchive;

use pixelmagix_core::error::AppError;

use crate::error::PluginError;
use crate::manifest::PluginDescriptor;

/// File name of the package manifest.
pub const MANIFEST_FILE: &str = "plugin.json";

const MAX_ENTRIES: usize = 1_000;
const MAX_EXTRACTED_SIZE: u64 = 100 * 1024 * 1024;
const BUFFER_SIZE: usize = 64 * 1024;

/// A package copied into the plugins directory.
#[derive(Debug, Clone)]
pub struct StagedPackage {
    /// The validated manifest.
    pub descriptor: PluginDescriptor,
    /// Where the package now lives.
    pub directory: PathBuf,
}

/// Extracts `bytes` and stages the package under `plugins_dir`.
pub async fn stage(bytes: Vec<u8>, plugins_dir: &Path) -> Result<StagedPackage, PluginError> {
    let plugins_dir = plugins_dir.to_path_buf();
    tokio::task::spawn_blocking(move || stage_blocking(&bytes, &plugins_dir))
        .await
        .map_err(|e| {
            PluginError::Storage(AppError::internal(format!("Package task failed: {e}")))
        })?
}

/// Removes `<plugins_dir>/<slug>` if it exists. Returns whether anything was removed.
pub async fn remove(plugins_dir: &Path, slug: &str) -> Result<bool, PluginError> {
    let dir = plugins_dir.join(slug);
    if !tokio::fs::try_exists(&dir).await.map_err(AppError::from)? {
        return Ok(false);
    }
    tokio::fs::remove_dir_all(&dir).await.map_err(AppError::from)?;
    info!(plugin = %slug, path = %dir.display(), "Plugin directory removed");
    Ok(true)
}

fn stage_blocking(bytes: &[u8], plugins_dir: &Path) -> Result<StagedPackage, PluginError> {
    let workdir = tempfile::tempdir().map_err(AppError::from)?;
    extract(bytes, workdir.path())?;

    let manifest_path = find_manifest(workdir.path())?.ok_or_else(|| {
        PluginError::InvalidManifest(format!("archive contains no {MANIFEST_FILE}"))
    })?;
    let raw = fs::read(&manifest_path).map_err(AppError::from)?;
    let descriptor = PluginDescriptor::from_json(&raw)?;

    let target = plugins_dir.join(&descriptor.slug);
    if target.exists() {
        return Err(PluginError::DuplicateSlug(descriptor.slug));
    }

    let source = manifest_path.parent().unwrap_or(workdir.path());
    fs::create_dir_all(plugins_dir).map_err(AppError::from)?;
    if let Err(err) = copy_dir(source, &target) {
        let _ = fs::remove_dir_all(&target);
        return Err(AppError::from(err).into());
    }

    debug!(plugin = %descriptor.slug, path = %target.display(), "Plugin package staged");
    Ok(StagedPackage {
        descriptor,
        directory: target,
    })
}

fn extract(bytes: &[u8], into: &Path) -> Result<(), PluginError> {
    let invalid = |e: zip::result::ZipError| PluginError::InvalidManifest(format!("bad archive: {e}"));

    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(invalid)?;
    if archive.len() > MAX_ENTRIES {
        return Err(PluginError::InvalidManifest(format!(
            "archive has {} entries, limit is {MAX_ENTRIES}",
            archive.len()
        )));
    }

    let mut total_size = 0u64;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(invalid)?;
        let Some(name) = entry.enclosed_name() else {
            continue;
        };
        let out_path = into.join(name);

        total_size += entry.size();
        if total_size > MAX_EXTRACTED_SIZE {
            return Err(PluginError::InvalidManifest(format!(
                "archive expands beyond {MAX_EXTRACTED_SIZE} bytes"
            )));
        }

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(AppError::from)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(AppError::from)?;
        }
        let mut out = File::create(&out_path).map_err(AppError::from)?;
        let mut buffer = vec![0u8; BUFFER_SIZE];
        loop {
            let n = entry.read(&mut buffer).map_err(AppError::from)?;
            if n == 0 {
                break;
            }
            out.write_all(&buffer[..n]).map_err(AppError::from)?;
        }
    }
    Ok(())
}

/// Breadth-first search for the shallowest manifest.
fn find_manifest(root: &Path) -> Result<Option<PathBuf>, PluginError> {
    let mut level = vec![root.to_path_buf()];
    while !level.is_empty() {
        let mut next = Vec::new();
        let mut found = Vec::new();
        for dir in &level {
            for entry in fs::read_dir(dir).map_err(AppError::from)? {
                let path = entry.map_err(AppError::from)?.path();
                if path.is_dir() {
                    next.push(path);
                } else if path.file_name().is_some_and(|n| n == MANIFEST_FILE) {
                    found.push(path);
                }
            }
        }
        if !found.is_empty() {
            found.sort();
            return Ok(found.into_iter().next());
        }
        level = next;
    }
    Ok(None)
}

fn copy_dir(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

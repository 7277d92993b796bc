//! The physical package store: unpacks a `.docx` container into a private
//! working directory and packs that directory back into a container.
//!
//! The working directory is a [`tempfile::TempDir`]; it lives exactly as long
//! as the store that owns it. Two stores never share a directory.

use crate::common::{Error, Result};
use crate::ooxml::opc::constants::part_path;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Owner of an unpacked package's working directory.
#[derive(Debug)]
pub struct PackageStore {
    dir: TempDir,
}

impl PackageStore {
    /// Unpack a container into a fresh working directory.
    ///
    /// Entries whose names would escape the working directory are skipped.
    /// Archive and IO failures are returned unchanged.
    pub fn unpack(container: &Path) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("wordml-").tempdir()?;
        let mut archive = zip::ZipArchive::new(BufReader::new(File::open(container)?))?;

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let Some(relative) = entry.enclosed_name() else {
                tracing::warn!(
                    name = entry.name(),
                    "skipping archive entry outside the package root"
                );
                continue;
            };
            let out_path = dir.path().join(relative);

            if entry.is_dir() {
                std::fs::create_dir_all(&out_path)?;
                continue;
            }
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&out_path)?;
            std::io::copy(&mut entry, &mut out)?;
        }

        tracing::debug!(
            container = %container.display(),
            workdir = %dir.path().display(),
            members = archive.len(),
            "unpacked package"
        );
        Ok(Self { dir })
    }

    /// Materialise a package from in-memory members (`(member name, content)`).
    pub fn from_members<'a, I>(members: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let dir = tempfile::Builder::new().prefix("wordml-").tempdir()?;
        for (name, content) in members {
            let out_path = dir.path().join(name);
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out_path, content)?;
        }
        Ok(Self { dir })
    }

    /// Root of the working directory.
    #[inline]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Filesystem location of a package member such as `word/styles.xml`.
    #[inline]
    pub fn member_path(&self, member: &str) -> PathBuf {
        self.dir.path().join(member)
    }

    /// Fail with `InvalidTargetExtension` unless `target` ends in `.{expected}`
    /// (compared case-insensitively).
    pub fn check_target_extension(target: &Path, expected: &str) -> Result<()> {
        let matches = target
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(expected));
        if matches {
            Ok(())
        } else {
            Err(Error::InvalidTargetExtension {
                target: target.display().to_string(),
                expected: expected.to_string(),
            })
        }
    }

    /// Pack the working directory into a container at `target`.
    ///
    /// `[Content_Types].xml` is written first, then the package relationships,
    /// then every other member in sorted order.
    pub fn pack(&self, target: &Path) -> Result<()> {
        let mut members = self.members()?;
        members.sort_by(|(a, _), (b, _)| {
            member_rank(a)
                .cmp(&member_rank(b))
                .then_with(|| a.cmp(b))
        });

        let mut writer = zip::ZipWriter::new(BufWriter::new(File::create(target)?));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, path) in &members {
            writer.start_file(name.as_str(), options)?;
            let mut source = File::open(path)?;
            std::io::copy(&mut source, &mut writer)?;
        }

        let mut out = writer.finish()?;
        out.flush()?;

        tracing::debug!(path = %target.display(), members = members.len(), "packed package");
        Ok(())
    }

    /// Every file below the working directory as `(member name, path)`.
    fn members(&self) -> Result<Vec<(String, PathBuf)>> {
        let root = self.dir.path();
        let mut members = Vec::new();

        for entry in WalkDir::new(root) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            members.push((name, entry.path().to_path_buf()));
        }

        Ok(members)
    }
}

fn member_rank(name: &str) -> u8 {
    match name {
        part_path::CONTENT_TYPES => 0,
        part_path::PACKAGE_RELS => 1,
        _ => 2,
    }
}

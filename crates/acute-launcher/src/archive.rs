//! Materialises the bundled server archive in the installation root.
//!
//! The presence of the installation root is the only completeness marker.
//! A directory left behind by an interrupted extraction is trusted on every
//! later call.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use tar::{Archive, Entry};
use tracing::{debug, info};

use crate::errors::ExtractError;
use crate::permissions::PermissionTriplet;

/// Log target for extraction.
const ARCHIVE_TARGET: &str = "acute_launcher::archive";

/// Whether the server installation exists on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationState {
    root: PathBuf,
    present: bool,
}

impl InstallationState {
    /// Inspects `root` without touching the filesystem further.
    #[must_use]
    pub fn inspect(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let present = root.exists();
        Self { root, present }
    }

    /// Installation root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the installation root exists.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.present
    }
}

/// Streams a tar payload into an installation root, at most once.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveExtractor {
    apply_permissions: bool,
}

impl Default for ArchiveExtractor {
    fn default() -> Self {
        Self {
            apply_permissions: cfg!(unix),
        }
    }
}

impl ArchiveExtractor {
    /// Creates an extractor that restores entry modes on POSIX hosts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables restoring entry modes.
    ///
    /// Has no effect on hosts without POSIX permissions.
    #[must_use]
    pub const fn with_permissions(mut self, apply: bool) -> Self {
        self.apply_permissions = apply && cfg!(unix);
        self
    }

    /// Extracts `archive` into `root` unless `root` already exists.
    ///
    /// The archive reader is consumed and dropped on every path, including
    /// the early return for an existing installation.
    pub fn ensure_extracted<R: Read>(
        &self,
        archive: R,
        root: &Path,
    ) -> Result<InstallationState, ExtractError> {
        let state = InstallationState::inspect(root);
        if state.is_present() {
            debug!(
                target: ARCHIVE_TARGET,
                root = %root.display(),
                "installation already present, skipping extraction"
            );
            return Ok(state);
        }

        create_directory(root)?;
        info!(
            target: ARCHIVE_TARGET,
            root = %root.display(),
            "extracting server payload"
        );
        let files = self.unpack(archive, root)?;
        info!(
            target: ARCHIVE_TARGET,
            root = %root.display(),
            files,
            "server payload extracted"
        );

        Ok(InstallationState {
            root: root.to_path_buf(),
            present: true,
        })
    }

    fn unpack<R: Read>(&self, archive: R, root: &Path) -> Result<usize, ExtractError> {
        let canonical_root = fs::canonicalize(root).map_err(|source| {
            ExtractError::CreateDirectory {
                path: root.to_path_buf(),
                source,
            }
        })?;
        let mut archive = Archive::new(archive);
        let entries = archive.entries().map_err(read_error)?;
        let mut written = 0usize;

        for entry in entries {
            let mut entry = entry.map_err(read_error)?;
            let kind = entry.header().entry_type();
            if kind.is_dir() {
                continue;
            }

            let name = entry.path().map_err(read_error)?.into_owned();
            let target = entry_target(root, &name)?;

            if kind.is_file() || kind.is_contiguous() {
                ensure_contained(&canonical_root, &target, &name)?;
                self.write_file(&mut entry, &target)?;
                written += 1;
            } else if kind.is_symlink() || kind.is_hard_link() {
                let link = entry
                    .link_name()
                    .map_err(read_error)?
                    .map(Cow::into_owned)
                    .unwrap_or_default();
                if kind.is_symlink() {
                    check_symlink_target(&name, &link)?;
                } else {
                    entry_target(root, &link)?;
                }
                ensure_contained(&canonical_root, &target, &name)?;
                let unpacked = entry
                    .unpack_in(root)
                    .map_err(|source| ExtractError::WriteFile {
                        path: target.clone(),
                        source,
                    })?;
                if !unpacked {
                    return Err(ExtractError::UnsafeEntryPath { path: name });
                }
            } else {
                debug!(
                    target: ARCHIVE_TARGET,
                    entry = %name.display(),
                    ?kind,
                    "skipping special archive entry"
                );
            }
        }

        Ok(written)
    }

    fn write_file<R: Read>(
        &self,
        entry: &mut Entry<'_, R>,
        target: &Path,
    ) -> Result<(), ExtractError> {
        if let Some(parent) = target.parent() {
            create_directory(parent)?;
        }

        let declared = entry.header().size().map_err(read_error)?;
        let mut file = File::create(target).map_err(|source| ExtractError::WriteFile {
            path: target.to_path_buf(),
            source,
        })?;
        // The archive is one continuous stream; copying past the declared
        // size would consume the next header.
        let copied = io::copy(&mut entry.by_ref().take(declared), &mut file).map_err(|source| {
            ExtractError::WriteFile {
                path: target.to_path_buf(),
                source,
            }
        })?;
        if copied != declared {
            return Err(read_error(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "entry '{}' ended after {copied} of {declared} bytes",
                    target.display()
                ),
            )));
        }
        drop(file);

        if self.apply_permissions {
            let mode = entry.header().mode().map_err(read_error)?;
            apply_permissions(target, PermissionTriplet::from_mode_bits(mode))?;
        }
        Ok(())
    }
}

/// Joins an entry name onto the root, refusing names that leave it.
fn entry_target(root: &Path, name: &Path) -> Result<PathBuf, ExtractError> {
    let mut target = root.to_path_buf();
    let mut depth = 0usize;
    for component in name.components() {
        match component {
            Component::Normal(part) => {
                target.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ExtractError::UnsafeEntryPath {
                    path: name.to_path_buf(),
                });
            }
        }
    }
    if depth == 0 {
        return Err(ExtractError::UnsafeEntryPath {
            path: name.to_path_buf(),
        });
    }
    Ok(target)
}

/// Rejects symlink targets that are absolute or climb above the root.
///
/// Relative targets resolve against the directory holding the link.
fn check_symlink_target(name: &Path, link: &Path) -> Result<(), ExtractError> {
    let escapes = || ExtractError::UnsafeEntryPath {
        path: name.to_path_buf(),
    };
    let mut depth = name
        .components()
        .filter(|component| matches!(component, Component::Normal(_)))
        .count()
        .saturating_sub(1);
    if link.as_os_str().is_empty() {
        return Err(escapes());
    }
    for component in link.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => depth = depth.checked_sub(1).ok_or_else(escapes)?,
            Component::RootDir | Component::Prefix(_) => return Err(escapes()),
        }
    }
    Ok(())
}

/// Resolves the deepest existing ancestor of `target` and requires it to sit
/// inside the root, so links unpacked earlier cannot redirect a write.
fn ensure_contained(
    canonical_root: &Path,
    target: &Path,
    name: &Path,
) -> Result<(), ExtractError> {
    let Some(existing) = target
        .parent()
        .into_iter()
        .flat_map(Path::ancestors)
        .find(|ancestor| fs::symlink_metadata(ancestor).is_ok())
    else {
        return Err(ExtractError::UnsafeEntryPath {
            path: name.to_path_buf(),
        });
    };
    let resolved = fs::canonicalize(existing).map_err(|source| ExtractError::WriteFile {
        path: target.to_path_buf(),
        source,
    })?;
    if resolved.starts_with(canonical_root) {
        Ok(())
    } else {
        Err(ExtractError::UnsafeEntryPath {
            path: name.to_path_buf(),
        })
    }
}

fn create_directory(path: &Path) -> Result<(), ExtractError> {
    fs::create_dir_all(path).map_err(|source| ExtractError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })
}

fn read_error(source: io::Error) -> ExtractError {
    ExtractError::ReadArchive { source }
}

#[cfg(unix)]
fn apply_permissions(path: &Path, triplet: PermissionTriplet) -> Result<(), ExtractError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(triplet.mode_bits())).map_err(|source| {
        ExtractError::SetPermissions {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn apply_permissions(_path: &Path, _triplet: PermissionTriplet) -> Result<(), ExtractError> {
    Ok(())
}

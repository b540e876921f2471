use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::AppError;

/// Copies `template_root` into a new directory at `dest_root`
///
/// The tree is staged in a hidden sibling directory and renamed into place
/// once every entry is copied, so a failed copy never leaves a partial project
/// behind. Symbolic links and special files abort the copy.
///
/// # Errors
/// * `AlreadyExists` - `dest_root` is already present; it is left untouched
/// * `TemplateMissing` - `template_root` does not exist
/// * `CopyFailure` - any entry could not be copied
pub fn materialize(template_root: &Path, dest_root: &Path) -> Result<(), AppError> {
    if dest_root.exists() {
        return Err(AppError::AlreadyExists(dest_root.to_path_buf()));
    }
    if !template_root.is_dir() {
        return Err(AppError::TemplateMissing(template_root.to_path_buf()));
    }

    let parent = dest_root
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(parent).map_err(|err| AppError::copy_failure(parent, err))?;

    let staging = tempfile::Builder::new()
        .prefix(".kickoff-")
        .tempdir_in(parent)
        .map_err(|err| AppError::copy_failure(parent, err))?;

    let copied = copy_tree(template_root, staging.path())?;
    let root_permissions = fs::metadata(template_root)
        .map_err(|err| AppError::copy_failure(template_root, err))?
        .permissions();
    fs::set_permissions(staging.path(), root_permissions)
        .map_err(|err| AppError::copy_failure(template_root, err))?;

    // A concurrent request may have claimed the name while we were copying.
    if dest_root.exists() {
        return Err(AppError::AlreadyExists(dest_root.to_path_buf()));
    }
    fs::rename(staging.path(), dest_root).map_err(|err| AppError::copy_failure(dest_root, err))?;

    info!(
        template = %template_root.display(),
        dest = %dest_root.display(),
        files = copied,
        "materialized template"
    );
    Ok(())
}

/// Copies every entry below `src` into the existing directory `dst`
///
/// Directory permissions are applied after all files are in place, deepest
/// first, so read-only template directories can still be filled.
fn copy_tree(src: &Path, dst: &Path) -> Result<usize, AppError> {
    let mut copied = 0;
    let mut directories: Vec<(PathBuf, fs::Permissions)> = Vec::new();

    for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(src).to_path_buf();
            AppError::copy_failure(path, err)
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|err| AppError::copy_failure(entry.path(), err))?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir(&target).map_err(|err| AppError::copy_failure(entry.path(), err))?;
            let permissions = entry
                .metadata()
                .map_err(|err| AppError::copy_failure(entry.path(), err))?
                .permissions();
            directories.push((target, permissions));
        } else if file_type.is_file() {
            // fs::copy carries the permission bits over
            fs::copy(entry.path(), &target)
                .map_err(|err| AppError::copy_failure(entry.path(), err))?;
            copied += 1;
            debug!(file = %relative.display(), "copied");
        } else {
            return Err(AppError::copy_failure(
                entry.path(),
                "symbolic links and special files are not supported",
            ));
        }
    }

    // WalkDir yields parents before children, so reversing puts children first.
    for (target, permissions) in directories.into_iter().rev() {
        fs::set_permissions(&target, permissions)
            .map_err(|err| AppError::copy_failure(&target, err))?;
    }

    Ok(copied)
}

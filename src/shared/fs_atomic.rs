use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

fn staging_path(path: &Path) -> std::io::Result<std::path::PathBuf> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("path has no parent directory"))?;
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    Ok(parent.join(format!(
        ".{}.{}-{stamp}.partial",
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("talos"),
        std::process::id(),
    )))
}

fn write_staged(path: &Path, content: &[u8], private: bool) -> std::io::Result<()> {
    let staged = staging_path(path)?;
    let mut options = fs::OpenOptions::new();
    options.create_new(true).write(true);
    restrict_to_owner(&mut options, private);
    {
        let mut file = options.open(&staged)?;
        file.write_all(content)?;
        file.sync_all()?;
    }
    if let Err(err) = fs::rename(&staged, path) {
        let _ = fs::remove_file(&staged);
        return Err(err);
    }
    Ok(())
}

#[cfg(unix)]
fn restrict_to_owner(options: &mut fs::OpenOptions, private: bool) {
    use std::os::unix::fs::OpenOptionsExt;
    if private {
        options.mode(0o600);
    }
}

#[cfg(not(unix))]
fn restrict_to_owner(_options: &mut fs::OpenOptions, _private: bool) {}

/// Replaces `path` with `content` via a sibling temp file and rename.
pub fn atomic_write_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    write_staged(path, content, false)
}

/// Same as [`atomic_write_file`], readable only by the owner on unix.
pub fn atomic_write_private_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    write_staged(path, content, true)
}

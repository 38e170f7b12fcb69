use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Upper bound for criteria and config files (1 MB)
pub const MAX_INPUT_FILE_SIZE: u64 = 1024 * 1024;

/// Rejects symbolic links for the given operation (`read`, `write`).
///
/// Uses `symlink_metadata()` so the link itself is inspected, not its target.
pub fn validate_not_symlink(path: &Path, operation: &str) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read metadata for {} operation on {}: {}",
            operation,
            path.display(),
            e
        )
    })?;

    if metadata.is_symlink() {
        anyhow::bail!(
            "Security: {} is a symbolic link. {} operations on symbolic links are not allowed.",
            path.display(),
            operation
        );
    }

    Ok(())
}

/// Reads a small user-supplied input file after checking that it is a
/// regular file (not a symlink or directory) within `MAX_INPUT_FILE_SIZE`
pub fn read_input_file(path: &Path, description: &str) -> Result<String> {
    let metadata = fs::symlink_metadata(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {} {}: {}", description, path.display(), e))?;

    if metadata.is_symlink() {
        anyhow::bail!(
            "Security: {} {} is a symbolic link. Symbolic links are not allowed.",
            description,
            path.display()
        );
    }
    if !metadata.is_file() {
        anyhow::bail!("{} {} is not a regular file", description, path.display());
    }
    if metadata.len() > MAX_INPUT_FILE_SIZE {
        anyhow::bail!(
            "Security: {} {} is too large ({} bytes). Maximum allowed size is {} bytes.",
            description,
            path.display(),
            metadata.len(),
            MAX_INPUT_FILE_SIZE
        );
    }

    fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {} {}: {}", description, path.display(), e))
}

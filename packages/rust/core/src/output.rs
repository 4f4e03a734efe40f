//! Writing generated files to disk.

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use rules_assembler_shared::{AssemblerError, Result};

/// Metadata of a file written by [`write_atomic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub size_bytes: usize,
    pub sha256: String,
}

/// Create `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        debug!(path = %dir.display(), "creating directory");
        std::fs::create_dir_all(dir).map_err(|e| AssemblerError::io(dir, e))?;
    }
    Ok(())
}

/// Replace the contents of `target` with `content`.
///
/// Writes to a hidden sibling temp file first, then renames it over the
/// target, so readers never see a half-written file. A symlinked target is
/// written through: the link stays and its destination gets the content.
pub fn write_atomic(target: &Path, content: &str) -> Result<Written> {
    let is_symlink = std::fs::symlink_metadata(target)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    if !is_symlink {
        return replace_file(target, content);
    }

    match std::fs::canonicalize(target) {
        Ok(resolved) => {
            debug!(link = %target.display(), path = %resolved.display(), "writing through symlink");
            replace_file(&resolved, content)
        }
        // Dangling link: a plain write creates its destination.
        Err(_) => {
            std::fs::write(target, content).map_err(|e| AssemblerError::io(target, e))?;
            Ok(written(target, content))
        }
    }
}

fn replace_file(target: &Path, content: &str) -> Result<Written> {
    let file_name = target
        .file_name()
        .ok_or_else(|| {
            AssemblerError::validation(format!("{} has no file name", target.display()))
        })?
        .to_string_lossy();
    let temp = target.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| AssemblerError::io(&temp, e))?;
    if let Err(e) = std::fs::rename(&temp, target) {
        let _ = std::fs::remove_file(&temp);
        return Err(AssemblerError::io(target, e));
    }

    Ok(written(target, content))
}

fn written(target: &Path, content: &str) -> Written {
    let written = Written {
        size_bytes: content.len(),
        sha256: sha256_hex(content.as_bytes()),
    };
    debug!(path = %target.display(), size = written.size_bytes, "wrote file");
    written
}

/// Read a file as text. Invalid UTF-8 is replaced, not rejected.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| AssemblerError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

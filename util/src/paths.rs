use crate::config::AppConfig;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Create a directory (and all parents) if it doesn't exist, and return the path.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    let p = path.as_ref();
    fs::create_dir_all(p)?;
    Ok(p.to_path_buf())
}

/// Ensure the parent directory of a *file path* exists (no-op if none).
pub fn ensure_parent_dir<P: AsRef<Path>>(file_path: P) -> io::Result<()> {
    if let Some(parent) = file_path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Global work root (absolute), from `AppConfig::global().work_storage_root`.
/// If relative in env, resolve against current_dir().
pub fn work_root() -> PathBuf {
    let root = AppConfig::global().work_storage_root.clone();
    let p = PathBuf::from(root);
    if p.is_absolute() {
        p
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(p)
    }
}

// ─── Directory helpers for evaluations ──────────────────────────────

/// Working directory for a single task evaluation:
/// {WORK_ROOT}/eval/{task_id}
pub fn eval_work_dir(task_id: &str) -> PathBuf {
    work_root().join("eval").join(task_id)
}

/// Path of the persisted evaluation summary inside a work directory.
pub fn result_json_path(work_dir: &Path) -> PathBuf {
    work_dir.join("result.json")
}

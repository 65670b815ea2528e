//! Locating the cargo workspace

use std::{
    env,
    fs,
    path::PathBuf,
};

/// Nearest ancestor of `CARGO_MANIFEST_DIR` whose `Cargo.toml` declares a
/// `[workspace]`, or the manifest dir itself.
fn find_workspace_root() -> Option<PathBuf> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").ok()?);
    let root = manifest_dir
        .ancestors()
        .find(|dir| {
            fs::read_to_string(dir.join("Cargo.toml"))
                .is_ok_and(|contents| contents.contains("[workspace]"))
        })
        .map(|dir| dir.to_path_buf())
        .unwrap_or(manifest_dir);
    Some(root)
}

/// Target directory used by cargo: `CARGO_TARGET_DIR` if set, otherwise
/// `target` below the workspace root.
pub(super) fn get_target_dir() -> PathBuf {
    if let Ok(target_dir) = env::var("CARGO_TARGET_DIR") {
        return PathBuf::from(target_dir);
    }
    find_workspace_root()
        .map(|root| root.join("target"))
        .unwrap_or_else(|| PathBuf::from("target"))
}

/// Workspace root, or the current directory outside of cargo.
pub(super) fn get_workspace_root() -> PathBuf {
    find_workspace_root().unwrap_or_else(|| {
        env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    })
}

use std::path::{Path, PathBuf};
use teamgrid_core::paths::TEAMGRID_DIR;

/// Directories that mark a project root, in order of preference.
const ROOT_MARKERS: [&str; 2] = [TEAMGRID_DIR, ".git"];

/// Where `.teamgrid/` lives for this invocation.
///
/// `--root` / `TEAMGRID_ROOT` wins. Otherwise the nearest ancestor of the
/// working directory holding `.teamgrid/`, then `.git/`, then the working
/// directory itself.
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(root) = explicit {
        return root.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    discover(&cwd).unwrap_or(cwd)
}

fn discover(start: &Path) -> Option<PathBuf> {
    ROOT_MARKERS.iter().find_map(|marker| {
        start
            .ancestors()
            .find(|dir| dir.join(marker).is_dir())
            .map(Path::to_path_buf)
    })
}

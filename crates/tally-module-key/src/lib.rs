//! Single-responsibility module-key derivation for deterministic grouping.

/// Key for files that sit directly at the scan root when no roots are configured.
pub const ROOT_KEY: &str = "(root)";

/// Catch-all key for files outside every configured module root.
pub const OTHER_KEY: &str = "(other)";

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
}

/// Normalize a path to forward slashes with no leading `./` or `/` and no
/// empty or `.` segments.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    segments(path).collect::<Vec<_>>().join("/")
}

/// Compute a module key from an input path.
///
/// Rules:
/// - With no `module_roots`, the key is the first `module_depth` directory
///   segments; files without a directory become `"(root)"`.
/// - With `module_roots`, a path whose directory starts with one of the roots
///   (compared segment by segment) gets its first `module_depth` directory
///   segments; every other path becomes `"(other)"`.
///
/// A depth of zero is treated as one. Pass `usize::MAX` to keep the full
/// directory path.
#[must_use]
pub fn module_key(path: &str, module_roots: &[String], module_depth: usize) -> String {
    let segs: Vec<&str> = segments(path).collect();
    let dirs: &[&str] = match segs.split_last() {
        Some((_file, dirs)) => dirs,
        None => &[],
    };

    if !module_roots.is_empty() && !under_any_root(dirs, module_roots) {
        return OTHER_KEY.to_string();
    }
    if dirs.is_empty() {
        return ROOT_KEY.to_string();
    }

    let take = module_depth.max(1).min(dirs.len());
    dirs[..take].join("/")
}

fn under_any_root(dirs: &[&str], module_roots: &[String]) -> bool {
    module_roots.iter().any(|root| {
        let root_segs: Vec<&str> = segments(root).collect();
        !root_segs.is_empty() && dirs.starts_with(&root_segs)
    })
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

//! Helpers for slash separated remote paths.

/// The last non empty component, `/a/b/` gives `b`.
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.is_empty() { "" } else { "/" };
    }
    match trimmed.rfind('/') {
        Some(p) => &trimmed[p + 1..],
        None => trimmed,
    }
}

/// The directory part, or `None` for a bare name.
pub fn parent(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => Some("/"),
        Some(p) => Some(&trimmed[..p]),
        None if path.starts_with('/') => Some("/"),
        None => None,
    }
}

/// Join `name` to `base`, absolute names are returned as is.
pub fn join(base: &str, name: &str) -> String {
    if name.starts_with('/') || base.is_empty() {
        name.to_string()
    } else if base.ends_with('/') {
        format!("{base}{name}")
    } else {
        format!("{base}/{name}")
    }
}

/// Resolve `.` and `..` segments and collapse repeated slashes.
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            s => parts.push(s),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name() {
        assert_eq!(basename("/a/b"), "b");
        assert_eq!(basename("/a/b/"), "b");
        assert_eq!(basename("b"), "b");
        assert_eq!(basename("/"), "/");
        assert_eq!(basename(""), "");
    }

    #[test]
    fn parent_dir() {
        assert_eq!(parent("/a/b"), Some("/a"));
        assert_eq!(parent("/a"), Some("/"));
        assert_eq!(parent("/"), Some("/"));
        assert_eq!(parent("a/b/"), Some("a"));
        assert_eq!(parent("b"), None);
    }

    #[test]
    fn join_path() {
        assert_eq!(join("/pub", "a.txt"), "/pub/a.txt");
        assert_eq!(join("/pub/", "a.txt"), "/pub/a.txt");
        assert_eq!(join("/pub", "/etc"), "/etc");
        assert_eq!(join("", "a"), "a");
    }

    #[test]
    fn normalize_path() {
        assert_eq!(normalize("/a//b/./c/../d"), "/a/b/d");
        assert_eq!(normalize("/.."), "/");
        assert_eq!(normalize("../x"), "../x");
        assert_eq!(normalize("a/.."), ".");
    }
}

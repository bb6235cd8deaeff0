//! Directory path normalization and validation.
//!
//! Catalog paths are compared as strings, so every path entering the catalog
//! goes through [`normalize_path`] first.

const SEPARATORS: [char; 2] = ['/', '\\'];

/// Collapse repeated separators and strip a trailing separator.
///
/// A leading UNC prefix (`\\server`) keeps its double backslash, and a bare
/// root (`/`, `C:\`) keeps its separator.
pub fn normalize_path(path: &str) -> String {
    let path = path.trim();
    let (prefix, rest) = if is_unc(path) {
        ("\\\\", &path[2..])
    } else {
        ("", path)
    };

    let mut normalized = String::with_capacity(path.len());
    normalized.push_str(prefix);

    let mut previous_was_separator = false;
    for c in rest.chars() {
        let is_separator = SEPARATORS.contains(&c);
        if is_separator && previous_was_separator {
            continue;
        }
        normalized.push(c);
        previous_was_separator = is_separator;
    }

    while normalized.len() > prefix.len() + 1 && normalized.ends_with(SEPARATORS) {
        if is_drive_root(&normalized) {
            break;
        }
        normalized.pop();
    }

    normalized
}

/// Whether a path is an absolute local path or a UNC share path
pub fn is_valid_directory_path(path: &str) -> bool {
    let path = path.trim();
    if path.is_empty() {
        return false;
    }

    if is_unc(path) {
        // \\server\share at minimum
        let mut parts = path[2..].split(SEPARATORS).filter(|p| !p.is_empty());
        return parts.next().is_some() && parts.next().is_some();
    }

    if path.starts_with('/') {
        return true;
    }

    has_drive_prefix(path)
        && path[2..].starts_with(SEPARATORS)
}

/// Join a file name onto a catalog directory path
pub fn join_path(directory: &str, file_name: &str) -> String {
    let separator = if directory.contains('\\') && !directory.contains('/') {
        '\\'
    } else {
        '/'
    };

    if directory.ends_with(SEPARATORS) {
        format!("{}{}", directory, file_name)
    } else {
        format!("{}{}{}", directory, separator, file_name)
    }
}

/// Whether `path` equals `root` or lies beneath it
pub fn is_nested_under(path: &str, root: &str) -> bool {
    let path = normalize_path(path);
    let root = normalize_path(root);

    if path == root {
        return true;
    }

    path.strip_prefix(root.as_str())
        .map(|rest| rest.starts_with(SEPARATORS) || root.ends_with(SEPARATORS))
        .unwrap_or(false)
}

fn is_unc(path: &str) -> bool {
    path.starts_with("\\\\")
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn is_drive_root(path: &str) -> bool {
    path.len() == 3 && has_drive_prefix(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_separators() {
        assert_eq!(normalize_path("/home//user///pictures/"), "/home/user/pictures");
        assert_eq!(normalize_path("C:\\\\Users\\Pictures\\\\"), "C:\\Users\\Pictures");
        assert_eq!(normalize_path("\\\\server\\share\\\\photos\\"), "\\\\server\\share\\photos");
    }

    #[test]
    fn test_normalize_keeps_roots() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("C:\\"), "C:\\");
    }

    #[test]
    fn test_path_validation() {
        assert!(is_valid_directory_path("/home/user"));
        assert!(is_valid_directory_path("C:\\Users"));
        assert!(is_valid_directory_path("\\\\server\\share"));

        assert!(!is_valid_directory_path(""));
        assert!(!is_valid_directory_path("relative/path"));
        assert!(!is_valid_directory_path("\\\\server"));
        assert!(!is_valid_directory_path("C:relative"));
    }

    #[test]
    fn test_nested_paths() {
        assert!(is_nested_under("/pictures/2020", "/pictures"));
        assert!(is_nested_under("/pictures", "/pictures/"));
        assert!(!is_nested_under("/pictures-old", "/pictures"));
        assert!(!is_nested_under("/other", "/pictures"));
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/pictures", "a.jpg"), "/pictures/a.jpg");
        assert_eq!(join_path("C:\\Pictures", "a.jpg"), "C:\\Pictures\\a.jpg");
        assert_eq!(join_path("/", "a.jpg"), "/a.jpg");
    }
}

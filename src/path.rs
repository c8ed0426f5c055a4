//! Virtual path grammar
//!
//! A virtual path is a sequence of names separated by one or more `/`.
//! Leading, trailing and repeated separators never yield empty segments,
//! so `""`, `"/"` and `"///"` all denote the root.

pub const SEPARATOR: char = '/';

/// Root path as rendered by the facade
pub const ROOT: &str = "/";

/// Split a virtual path into its non-empty segments.
pub fn split(path: &str) -> Vec<&str> {
    path.split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// True when the path has no segments.
pub fn is_root(path: &str) -> bool {
    path.split(SEPARATOR).all(str::is_empty)
}

/// Last segment of the path, or an empty string for the root.
pub fn leaf_name(path: &str) -> &str {
    path.split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .last()
        .unwrap_or("")
}

/// Path formed by all but the last segment; the root when there is at
/// most one segment.
pub fn parent_path(path: &str) -> String {
    let segments = split(path);
    match segments.split_last() {
        Some((_, init)) if !init.is_empty() => from_segments(init),
        _ => ROOT.to_string(),
    }
}

/// Join a parent path and a child name into a normalized path.
pub fn join(parent: &str, name: &str) -> String {
    let mut segments = split(parent);
    segments.extend(split(name));
    from_segments(&segments)
}

/// Render segments as an absolute path.
pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> String {
    if segments.is_empty() {
        return ROOT.to_string();
    }
    let mut out = String::new();
    for segment in segments {
        out.push(SEPARATOR);
        out.push_str(segment.as_ref());
    }
    out
}

/// A name is usable as a segment when it is non-empty and holds no separator.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(SEPARATOR)
}

//! POSIX-like dataset paths

use crate::Result;
use arrayfile_core::validation::validate_path_segment;
use arrayfile_core::ArrayError;

/// Root of every container
pub const ROOT: &str = "/";

/// Resolve `path` against the current prefix `cwd`
///
/// A leading `/` makes `path` absolute. `.` segments are dropped and `..`
/// removes the previous segment; `..` at the root stays at the root. The
/// result is always absolute and never ends with `/` unless it is the root.
pub fn resolve(cwd: &str, path: &str) -> Result<String> {
    let mut segments: Vec<&str> = Vec::new();
    if !path.starts_with('/') {
        push_segments(&mut segments, cwd)?;
    }
    push_segments(&mut segments, path)?;

    if segments.is_empty() {
        return Ok(ROOT.to_string());
    }
    let mut resolved = String::with_capacity(path.len() + cwd.len() + 1);
    for segment in segments {
        resolved.push('/');
        resolved.push_str(segment);
    }
    Ok(resolved)
}

/// Resolve a path that must name a dataset rather than the root
pub fn resolve_dataset(cwd: &str, path: &str) -> Result<String> {
    let resolved = resolve(cwd, path)?;
    if resolved == ROOT {
        return Err(ArrayError::InvalidPath.into());
    }
    Ok(resolved)
}

fn push_segments<'a>(segments: &mut Vec<&'a str>, path: &'a str) -> Result<()> {
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => {
                validate_path_segment(other)?;
                segments.push(other);
            }
        }
    }
    Ok(())
}

//! Path validation
//!
//! Decides whether a path string could name an entry on the host filesystem,
//! and whether a file name stays inside the working directory.

use log::debug;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Returns `true` if `path` is acceptable to the host filesystem.
///
/// Each component is probed with a non-following metadata call as a direct
/// child of the filesystem root, so the parent always exists and the OS gets
/// as far as checking the name itself. The target does not need to exist.
/// Only "name too long" / "invalid name" answers reject the path; any other
/// probe error is accepted, which means a path may still fail later for
/// reasons like permissions or quota.
pub fn is_valid_path(path: &str) -> bool {
    if path.is_empty() || path.contains('\0') {
        return false;
    }

    let root = probe_root();
    let pathname = strip_drive(path);

    for part in pathname
        .split(is_component_separator)
        .filter(|part| !part.is_empty())
    {
        let probe = root.join(part);
        match fs::symlink_metadata(&probe) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::InvalidFilename => {
                debug!("Rejected path {path:?}: component {part:?} is not a valid name ({e})");
                return false;
            }
            Err(e) => {
                debug!("Probe of {} failed, accepting: {e}", probe.display());
            }
        }
    }

    true
}

/// Returns `true` if `name` is non-empty and cannot leave the directory it is
/// joined onto: no root, no drive or UNC prefix, no `..` component.
///
/// Drive prefixes are refused on every host, so `c:notes.txt` is rejected
/// even where `:` is a legal file name character.
pub fn is_confined_name(name: &str) -> bool {
    if name.is_empty() || strip_drive(name).len() != name.len() {
        return false;
    }
    if name.starts_with(['/', '\\']) {
        return false;
    }

    Path::new(name)
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
        && !name.split(['/', '\\']).any(|part| part == "..")
}

/// Strips a Windows drive (`C:`) or UNC (`\\server\share`) prefix, on any host.
fn strip_drive(path: &str) -> &str {
    let bytes = path.as_bytes();

    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        return &path[2..];
    }

    if bytes.len() > 2 && is_separator(bytes[0] as char) && is_separator(bytes[1] as char) {
        if is_separator(bytes[2] as char) {
            return path;
        }
        let rest = &path[2..];
        let Some(server_end) = rest.find(is_separator) else {
            return path;
        };
        let share = &rest[server_end + 1..];
        return match share.find(is_separator) {
            Some(0) => path,
            Some(share_end) => &share[share_end..],
            None if share.is_empty() => path,
            None => "",
        };
    }

    path
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

#[cfg(windows)]
fn is_component_separator(c: char) -> bool {
    is_separator(c)
}

#[cfg(not(windows))]
fn is_component_separator(c: char) -> bool {
    c == '/'
}

#[cfg(windows)]
fn probe_root() -> PathBuf {
    let drive = std::env::var("HOMEDRIVE").unwrap_or_else(|_| "C:".to_string());
    PathBuf::from(format!("{}\\", drive.trim_end_matches('\\')))
}

#[cfg(not(windows))]
fn probe_root() -> PathBuf {
    PathBuf::from("/")
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Automatic file naming.
//!
//! Scans are named `<prefix><number>.<extension>` with the number padded to
//! four digits. Destinations are probed from the current counter upwards for
//! the first unused name.

use std::path::{Path, PathBuf};

/// Digits the counter is padded to.
pub const NUMBER_WIDTH: usize = 4;

/// Highest counter value tried before giving up.
pub const MAX_FILE_NUMBER: u32 = 999_999;

/// Somewhere files can be saved, able to tell whether a name is taken.
pub trait Destination {
    fn exists(&self, file_name: &str) -> bool;
}

/// A directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalDirectory(pub PathBuf);

impl Destination for LocalDirectory {
    fn exists(&self, file_name: &str) -> bool {
        self.0.join(file_name).exists()
    }
}

/// A location on another machine, given as a URL.
///
/// There is no way to stat remote files here, so every name is reported
/// as free.
#[derive(Debug, Clone)]
pub struct RemoteLocation(pub String);

impl Destination for RemoteLocation {
    fn exists(&self, _file_name: &str) -> bool {
        false
    }
}

/// Where a configured save directory points.
#[derive(Debug, Clone)]
pub enum Location {
    Local(PathBuf),
    Remote(String),
}

impl Location {
    /// Interpret a directory setting. `file://` URLs and plain paths are
    /// local; any other `scheme://` is remote.
    pub fn parse(directory: &str) -> Self {
        if let Some(path) = directory.strip_prefix("file://") {
            return Location::Local(PathBuf::from(path));
        }
        match directory.split_once("://") {
            Some((scheme, _))
                if !scheme.is_empty()
                    && scheme.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)) =>
            {
                Location::Remote(directory.to_string())
            }
            _ => Location::Local(PathBuf::from(directory)),
        }
    }

    pub fn destination(&self) -> Box<dyn Destination> {
        match self {
            Location::Local(path) => Box::new(LocalDirectory(path.clone())),
            Location::Remote(url) => Box::new(RemoteLocation(url.clone())),
        }
    }

    /// Full path or URL for a file name in this location.
    pub fn join(&self, file_name: &str) -> PathBuf {
        match self {
            Location::Local(path) => path.join(file_name),
            Location::Remote(url) => PathBuf::from(format!("{}/{}", url.trim_end_matches('/'), file_name)),
        }
    }
}

/// `<prefix><number padded to four digits>.<extension>`
pub fn compose_file_name(prefix: &str, number: u32, extension: &str) -> String {
    format!("{}{:0width$}.{}", prefix, number, extension, width = NUMBER_WIDTH)
}

/// Lowest number at or above `start` whose composed name is unused, or
/// `None` when every number up to [`MAX_FILE_NUMBER`] is taken.
pub fn next_free_number(
    destination: &dyn Destination,
    prefix: &str,
    start: u32,
    extension: &str,
) -> Option<u32> {
    (start..=MAX_FILE_NUMBER).find(|&n| !destination.exists(&compose_file_name(prefix, n, extension)))
}

/// Split a file base name into its text prefix and trailing number.
///
/// At least one character is always left in the prefix. The number is 0
/// when there are no trailing digits or they do not fit a `u32`.
pub fn split_trailing_number(base_name: &str) -> (String, u32) {
    let mut prefix = base_name;
    while prefix.chars().count() > 1 {
        match prefix.chars().last() {
            Some(c) if c.is_ascii_digit() => prefix = &prefix[..prefix.len() - 1],
            _ => break,
        }
    }

    let number = base_name[prefix.len()..].parse().unwrap_or(0);
    (prefix.to_string(), number)
}

/// Base name of a saved file: everything before the last extension.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Taken(HashSet<String>);

    impl Destination for Taken {
        fn exists(&self, file_name: &str) -> bool {
            self.0.contains(file_name)
        }
    }

    fn taken(names: &[&str]) -> Taken {
        Taken(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_compose_pads_to_four_digits() {
        assert_eq!(compose_file_name("Image-", 7, "png"), "Image-0007.png");
        assert_eq!(compose_file_name("scan", 12345, "jpeg"), "scan12345.jpeg");
    }

    #[test]
    fn test_next_free_number_skips_taken_names() {
        let dest = taken(&["Image-0001.png", "Image-0002.png", "Image-0004.png"]);
        assert_eq!(next_free_number(&dest, "Image-", 1, "png"), Some(3));
        assert_eq!(next_free_number(&dest, "Image-", 4, "png"), Some(5));
        assert_eq!(next_free_number(&dest, "Image-", 1, "jpeg"), Some(1));
    }

    #[test]
    fn test_next_free_number_is_smallest_at_or_above_start() {
        let existing = [0u32, 1, 2, 5, 6, 9, 10, 11];
        let names: HashSet<String> = existing
            .iter()
            .map(|n| compose_file_name("p", *n, "tif"))
            .collect();
        let dest = Taken(names);

        for start in 0..15 {
            let expected = (start..).find(|n| !existing.contains(n)).unwrap();
            assert_eq!(next_free_number(&dest, "p", start, "tif"), Some(expected));
        }
    }

    #[test]
    fn test_next_free_number_exhausted() {
        let last = compose_file_name("x", MAX_FILE_NUMBER, "png");
        let dest = taken(&[last.as_str()]);
        assert_eq!(next_free_number(&dest, "x", MAX_FILE_NUMBER, "png"), None);
        assert_eq!(next_free_number(&dest, "x", MAX_FILE_NUMBER + 1, "png"), None);
    }

    #[test]
    fn test_local_directory_probe() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Image-0001.png"), b"x").unwrap();

        let dest = LocalDirectory(dir.path().to_path_buf());
        assert_eq!(next_free_number(&dest, "Image-", 1, "png"), Some(2));
    }

    #[test]
    fn test_split_trailing_number() {
        assert_eq!(split_trailing_number("Image-0007"), ("Image-".to_string(), 7));
        assert_eq!(split_trailing_number("scan"), ("scan".to_string(), 0));
        assert_eq!(split_trailing_number("page12b3"), ("page12b".to_string(), 3));
    }

    #[test]
    fn test_split_keeps_one_character() {
        assert_eq!(split_trailing_number("0042"), ("0".to_string(), 42));
        assert_eq!(split_trailing_number("7"), ("7".to_string(), 0));
        assert_eq!(split_trailing_number(""), (String::new(), 0));
    }

    #[test]
    fn test_split_overflowing_number_is_zero() {
        let (prefix, number) = split_trailing_number("a99999999999999");
        assert_eq!(prefix, "a");
        assert_eq!(number, 0);
    }

    #[test]
    fn test_location_parse() {
        assert!(matches!(Location::parse("/home/me/scans"), Location::Local(_)));
        assert!(matches!(Location::parse("file:///tmp"), Location::Local(p) if p == Path::new("/tmp")));
        assert!(matches!(Location::parse("sftp://nas/scans"), Location::Remote(_)));
        assert!(matches!(Location::parse("C:\\scans"), Location::Local(_)));
    }

    #[test]
    fn test_remote_names_are_always_free() {
        let location = Location::parse("smb://server/share");
        let dest = location.destination();
        assert!(!dest.exists("Image-0001.png"));
        assert_eq!(
            location.join("Image-0001.png"),
            PathBuf::from("smb://server/share/Image-0001.png")
        );
    }

    #[test]
    fn test_base_name_drops_last_extension() {
        assert_eq!(base_name(Path::new("/tmp/Image-0007.png")), "Image-0007");
        assert_eq!(base_name(Path::new("/tmp/scan.tar.gz")), "scan.tar");
    }
}

//! Finds the report files in a directory.
//!
//! Report files carry an extension (the IDL sequence number) and are
//! otherwise plain text. Hidden files, extensionless entries, and the
//! tool's own inputs and outputs (`csv`, `txt`, `py`, `exe`, `ipynb`) are
//! dismissed.

use std::path::Path;

use crate::BatchError;

/// Extensions that are never reports.
pub const DISMISSED_EXTENSIONS: &[&str] = &["csv", "txt", "py", "exe", "ipynb"];

/// File names found in a directory, split into reports and dismissed files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Candidate report files, sorted by name.
    pub reports: Vec<String>,
    /// Files with a dismissed extension, sorted by name.
    pub dismissed: Vec<String>,
}

/// How a single directory entry is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Report,
    Dismissed,
    /// Hidden or without an extension; not listed at all.
    Ignored,
}

/// Classifies a file name. The extension is the text between the first and
/// second `.`, so `104512.002` has extension `002` and `out.tar.csv` has
/// extension `tar`.
#[must_use]
pub fn classify_file_name(name: &str) -> FileClass {
    if name.starts_with('.') {
        return FileClass::Ignored;
    }

    let Some(extension) = name.split('.').nth(1) else {
        return FileClass::Ignored;
    };

    if DISMISSED_EXTENSIONS.contains(&extension) {
        FileClass::Dismissed
    } else {
        FileClass::Report
    }
}

/// Lists the regular files in `dir` (including symlinks to files) and
/// classifies them.
///
/// # Errors
///
/// Returns [`BatchError::Io`] if the directory cannot be read.
pub fn scan_directory(dir: &Path) -> Result<Discovery, BatchError> {
    let mut discovery = Discovery::default();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        // Follows symlinks, so a linked report is listed like a regular one.
        if !entry.path().is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            log::warn!("Skipping non UTF-8 file name {:?}", entry.file_name());
            continue;
        };

        match classify_file_name(&name) {
            FileClass::Report => discovery.reports.push(name),
            FileClass::Dismissed => discovery.dismissed.push(name),
            FileClass::Ignored => {}
        }
    }

    discovery.reports.sort_unstable();
    discovery.dismissed.sort_unstable();

    log::debug!(
        "Scanned {}: {} report file(s), {} dismissed",
        dir.display(),
        discovery.reports.len(),
        discovery.dismissed.len()
    );

    Ok(discovery)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_first_extension() {
        assert_eq!(classify_file_name("104512.002"), FileClass::Report);
        assert_eq!(classify_file_name("104512.idl"), FileClass::Report);
        assert_eq!(classify_file_name("output.csv"), FileClass::Dismissed);
        assert_eq!(classify_file_name("gsd_config_01.txt"), FileClass::Dismissed);
        assert_eq!(classify_file_name("notes.txt.bak"), FileClass::Dismissed);
        assert_eq!(classify_file_name("README"), FileClass::Ignored);
        assert_eq!(classify_file_name(".hidden.002"), FileClass::Ignored);
    }

    #[test]
    fn scans_files_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["2.001", "1.001", "out.csv", "README", ".DS_Store"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.dir")).unwrap();

        let discovery = scan_directory(dir.path()).unwrap();
        assert_eq!(discovery.reports, ["1.001", "2.001"]);
        assert_eq!(discovery.dismissed, ["out.csv"]);
    }

    #[cfg(unix)]
    #[test]
    fn lists_symlinked_reports() {
        let dir = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        std::fs::write(target.path().join("3.001"), "").unwrap();
        std::os::unix::fs::symlink(target.path().join("3.001"), dir.path().join("3.001")).unwrap();
        std::os::unix::fs::symlink(target.path(), dir.path().join("linked.dir")).unwrap();

        let discovery = scan_directory(dir.path()).unwrap();
        assert_eq!(discovery.reports, ["3.001"]);
        assert!(discovery.dismissed.is_empty());
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_directory(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, BatchError::Io(_)));
    }
}

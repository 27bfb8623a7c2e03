//! Photo directory bookkeeping: counting entries and choosing the next file name.

use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::StorageError;

const FILENAME_PREFIX: &str = "cam";
const FILENAME_SUFFIX: &str = "jpg";
const SEQ_DIGITS: usize = 5;

/// Number of entries in `dir`, not counting the implicit `.` and `..`.
///
/// `read_dir` never reports the implicit entries, so this is the POSIX
/// "entries read minus two" without any arithmetic. Only used for diagnostics;
/// photo names come from [`PhotoDir::next_path`].
pub fn count_entries(dir: impl AsRef<Path>) -> Result<usize, StorageError> {
    Ok(read_entries(dir.as_ref())?.len())
}

/// All entries of `dir`. An entry that cannot be read fails the whole listing.
fn read_entries(path: &Path) -> Result<Vec<DirEntry>, StorageError> {
    let read_err = |source| StorageError::ReadDir {
        path: path.to_path_buf(),
        source,
    };
    fs::read_dir(path)
        .map_err(read_err)?
        .map(|entry| entry.map_err(read_err))
        .collect()
}

/// The directory photos are written to, named `cam00000.jpg`, `cam00001.jpg`, ...
#[derive(Debug, Clone)]
pub struct PhotoDir {
    dir: PathBuf,
}

impl PhotoDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Creates the directory if it does not exist yet.
    pub fn prepare(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        info!("Saving photos to {}", self.dir.display());
        Ok(())
    }

    pub fn file_name(seq: u32) -> String {
        format!("{FILENAME_PREFIX}{seq:0width$}.{FILENAME_SUFFIX}", width = SEQ_DIGITS)
    }

    /// Sequence number of a file named like [`PhotoDir::file_name`] produces.
    pub fn parse_seq(name: &str) -> Option<u32> {
        let digits = name
            .strip_prefix(FILENAME_PREFIX)?
            .strip_suffix(FILENAME_SUFFIX)?
            .strip_suffix('.')?;
        if digits.len() < SEQ_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// Sequence numbers of the regular files that follow the naming pattern.
    pub fn photos(&self) -> Result<Vec<u32>, StorageError> {
        let mut seqs: Vec<u32> = read_entries(&self.dir)?
            .into_iter()
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| Self::entry_seq(&entry))
            .collect();
        seqs.sort_unstable();
        Ok(seqs)
    }

    /// Path for the next photo: one past the highest sequence number taken by any
    /// entry with a photo name (file, directory or link alike), or `cam00000.jpg`
    /// when there is none.
    pub fn next_path(&self) -> Result<PathBuf, StorageError> {
        let entries = read_entries(&self.dir)?;
        let seq = match entries.iter().filter_map(Self::entry_seq).max() {
            Some(last) => last.saturating_add(1),
            None => 0,
        };
        let path = self.dir.join(Self::file_name(seq));
        debug!("{} entries, next photo: {}", entries.len(), path.display());
        Ok(path)
    }

    fn entry_seq(entry: &DirEntry) -> Option<u32> {
        entry.file_name().to_str().and_then(Self::parse_seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn count_entries_excludes_implicit_entries() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(count_entries(tmp.path()).unwrap(), 0);

        touch(tmp.path(), "a.jpg");
        touch(tmp.path(), "b.txt");
        fs::create_dir(tmp.path().join("sub")).unwrap();
        assert_eq!(count_entries(tmp.path()).unwrap(), 3);
    }

    #[test]
    fn count_entries_fails_on_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(
            count_entries(&missing),
            Err(StorageError::ReadDir { path, .. }) if path == missing
        ));
    }

    #[test]
    fn file_name_is_zero_padded() {
        assert_eq!(PhotoDir::file_name(0), "cam00000.jpg");
        assert_eq!(PhotoDir::file_name(42), "cam00042.jpg");
        assert_eq!(PhotoDir::file_name(123456), "cam123456.jpg");
    }

    #[test]
    fn parse_seq_only_accepts_the_pattern() {
        assert_eq!(PhotoDir::parse_seq("cam00003.jpg"), Some(3));
        assert_eq!(PhotoDir::parse_seq("cam123456.jpg"), Some(123456));
        assert_eq!(PhotoDir::parse_seq("cam3.jpg"), None);
        assert_eq!(PhotoDir::parse_seq("cam0000a.jpg"), None);
        assert_eq!(PhotoDir::parse_seq("img00003.jpg"), None);
        assert_eq!(PhotoDir::parse_seq("cam00003.png"), None);
        assert_eq!(PhotoDir::parse_seq("cam00003jpg"), None);
    }

    #[test]
    fn next_path_follows_existing_photos() {
        let tmp = tempfile::tempdir().unwrap();
        let photos = PhotoDir::new(tmp.path());
        assert_eq!(photos.next_path().unwrap(), tmp.path().join("cam00000.jpg"));

        for seq in 0..3 {
            touch(tmp.path(), &PhotoDir::file_name(seq));
        }
        assert_eq!(photos.next_path().unwrap(), tmp.path().join("cam00003.jpg"));
    }

    #[test]
    fn next_path_ignores_unrelated_entries_and_gaps() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "cam00007.jpg");

        let photos = PhotoDir::new(tmp.path());
        assert_eq!(photos.photos().unwrap(), vec![7]);
        assert_eq!(photos.next_path().unwrap(), tmp.path().join("cam00008.jpg"));
    }

    #[test]
    fn next_path_skips_names_taken_by_non_files() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "cam00000.jpg");
        fs::create_dir(tmp.path().join("cam00001.jpg")).unwrap();

        let photos = PhotoDir::new(tmp.path());
        assert_eq!(photos.photos().unwrap(), vec![0]);
        assert_eq!(photos.next_path().unwrap(), tmp.path().join("cam00002.jpg"));
    }

    #[cfg(unix)]
    #[test]
    fn next_path_skips_names_taken_by_dangling_links() {
        let tmp = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(tmp.path().join("nowhere"), tmp.path().join("cam00004.jpg"))
            .unwrap();

        let photos = PhotoDir::new(tmp.path());
        assert!(photos.photos().unwrap().is_empty());
        assert_eq!(photos.next_path().unwrap(), tmp.path().join("cam00005.jpg"));
    }

    #[test]
    fn next_path_on_missing_dir_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let photos = PhotoDir::new(tmp.path().join("missing"));
        assert!(photos.next_path().is_err());
    }

    #[test]
    fn prepare_creates_nested_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let photos = PhotoDir::new(tmp.path().join("a/b/photo"));
        photos.prepare().unwrap();
        assert!(photos.path().is_dir());
        assert_eq!(count_entries(photos.path()).unwrap(), 0);
    }
}

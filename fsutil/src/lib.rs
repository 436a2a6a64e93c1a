use std::{
    fs::{self, ReadDir},
    path::{Path, PathBuf},
};

pub mod error {
    use std::{io, path::PathBuf};

    pub type Result<T> = std::result::Result<T, self::Error>;

    type Msg = &'static str;

    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error("{0} ({1}): {2}")]
        SingleIO(Msg, PathBuf, #[source] io::Error),

        #[error("Not a directory: '{0}'")]
        NotADirectory(PathBuf),

        #[error("Invalid glob pattern '{0}': {1}")]
        InvalidGlob(String, #[source] ::glob::PatternError),
    }
}
pub use error::{Error, Result};

#[must_use]
pub fn mkdir_all(path: impl AsRef<Path>) -> Result<()> {
    let dir = path.as_ref();
    fs::create_dir_all(dir).map_err(|e| Error::SingleIO("Cannot create dir", dir.to_owned(), e))
}

#[must_use]
pub fn write<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    fs::write(&filepath, contents)
        .map_err(|e| Error::SingleIO("Cannot write file", filepath.as_ref().to_owned(), e))
}

#[must_use]
pub fn read_to_string(filepath: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(&filepath)
        .map_err(|e| Error::SingleIO("Cannot read file", filepath.as_ref().to_owned(), e))
}

#[must_use]
pub fn read_dir(dir: impl AsRef<Path>) -> Result<ReadDir> {
    fs::read_dir(&dir).map_err(|e| Error::SingleIO("Cannot read dir", dir.as_ref().to_owned(), e))
}

/// Lists regular files matching `pattern`, which is resolved relative to `dir`
/// (so `"expected/*.out"` looks inside `dir/expected`). Sorted by path.
pub fn list_files_matching(
    dir: impl AsRef<Path>,
    pattern: &::glob::Pattern,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_owned()));
    }

    let base = ::glob::Pattern::escape(&dir.to_string_lossy());
    let full_pattern = format!("{}/{}", base.trim_end_matches('/'), pattern.as_str());
    let paths =
        ::glob::glob(&full_pattern).map_err(|e| Error::InvalidGlob(full_pattern.clone(), e))?;

    let mut files: Vec<PathBuf> = paths
        .filter_map(std::result::Result::ok)
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Finds `filename` in `start_dir` or one of its ancestors, nearest first.
pub fn find_file_in_ancestors(start_dir: impl AsRef<Path>, filename: &str) -> Option<PathBuf> {
    start_dir
        .as_ref()
        .ancestors()
        .map(|dir| dir.join(filename))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn list_files_matching_sorts_and_skips_dirs() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path().join("b.in"), "").unwrap();
        write(dir.path().join("a.in"), "").unwrap();
        write(dir.path().join("a.out"), "").unwrap();
        mkdir_all(dir.path().join("c.in")).unwrap();

        let pat = ::glob::Pattern::new("*.in").unwrap();
        let files = list_files_matching(dir.path(), &pat).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.in", "b.in"]);
    }

    #[test]
    fn list_files_matching_resolves_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        mkdir_all(dir.path().join("expected")).unwrap();
        write(dir.path().join("expected/t2.out"), "").unwrap();
        write(dir.path().join("expected/t1.out"), "").unwrap();
        write(dir.path().join("t1.out"), "").unwrap();

        let pat = ::glob::Pattern::new("expected/*.out").unwrap();
        let files = list_files_matching(dir.path(), &pat).unwrap();
        assert_eq!(
            files,
            [
                dir.path().join("expected/t1.out"),
                dir.path().join("expected/t2.out"),
            ]
        );
    }

    #[test]
    fn list_files_matching_errors_on_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let pat = ::glob::Pattern::new("*").unwrap();
        let err = list_files_matching(&missing, &pat).unwrap_err();
        assert!(matches!(err, Error::NotADirectory(_)), "{:?}", err);
    }

    #[test]
    fn find_file_in_ancestors_finds_nearest() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("x/y");
        mkdir_all(&nested).unwrap();
        write(dir.path().join("conf.toml"), "").unwrap();
        write(dir.path().join("x/conf.toml"), "").unwrap();

        let found = find_file_in_ancestors(&nested, "conf.toml").unwrap();
        assert_eq!(found, dir.path().join("x/conf.toml"));
        assert_eq!(find_file_in_ancestors(&nested, "absent.toml"), None);
    }
}

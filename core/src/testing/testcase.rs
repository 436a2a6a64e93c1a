use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::serdable::GlobPattern;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub expected_output: String,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            name: None,
            input: input.into(),
            expected_output: expected_output.into(),
        }
    }

    pub fn named(
        name: impl Into<String>,
        input: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(input, expected_output)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Test directory not found: '{0}'")]
    DirNotFound(PathBuf),

    #[error("No input files found matching pattern '{pattern}' in '{dir}'")]
    NoInputFiles { pattern: String, dir: PathBuf },

    #[error(transparent)]
    Fs(#[from] fsutil::Error),
}

/// An input file that was left out of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedInput {
    pub input_file: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub cases: Vec<TestCase>,
    pub skipped: Vec<SkippedInput>,
}

/// Pairs `*.in`-like files with `*.out`-like files by file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestcaseFinder {
    pub input_pattern: GlobPattern,
    pub output_pattern: GlobPattern,
}

impl Default for TestcaseFinder {
    fn default() -> Self {
        Self {
            input_pattern: GlobPattern::parse(Self::DEFAULT_INPUT_PATTERN).unwrap(),
            output_pattern: GlobPattern::parse(Self::DEFAULT_OUTPUT_PATTERN).unwrap(),
        }
    }
}

impl TestcaseFinder {
    pub const DEFAULT_INPUT_PATTERN: &str = "*.in";
    pub const DEFAULT_OUTPUT_PATTERN: &str = "*.out";

    pub fn new(input_pattern: GlobPattern, output_pattern: GlobPattern) -> Self {
        Self {
            input_pattern,
            output_pattern,
        }
    }

    /// Lists input files, pairs each with an output file and reads both.
    /// Unpaired or unreadable inputs are skipped with a warning.
    pub fn discover(&self, dir: impl AsRef<Path>) -> Result<Discovery, DiscoveryError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(DiscoveryError::DirNotFound(dir.to_owned()));
        }

        let input_files = fsutil::list_files_matching(dir, &self.input_pattern)?;
        if input_files.is_empty() {
            return Err(DiscoveryError::NoInputFiles {
                pattern: self.input_pattern.as_str().to_owned(),
                dir: dir.to_owned(),
            });
        }
        let output_files = fsutil::list_files_matching(dir, &self.output_pattern)?;

        let mut res = Discovery::default();
        for input_file in input_files {
            let input_name = file_name_of(&input_file);
            let Some(output_file) =
                pair_output_for(&input_file, self.output_pattern.as_str(), &output_files)
            else {
                log::warn!("No matching output file found for {}, skipping...", input_name);
                res.skipped.push(SkippedInput {
                    input_file,
                    reason: "no matching output file".to_owned(),
                });
                continue;
            };
            let output_name = file_name_of(&output_file);

            match read_pair(&input_file, &output_file) {
                Ok((input, expected_output)) => res.cases.push(TestCase {
                    name: Some(file_stem(&input_name).to_owned()),
                    input,
                    expected_output,
                }),
                Err(e) => {
                    log::warn!(
                        "Error reading test files {}/{}: {}",
                        input_name,
                        output_name,
                        e
                    );
                    res.skipped.push(SkippedInput {
                        input_file,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(res)
    }
}

fn read_pair(input_file: &Path, output_file: &Path) -> fsutil::Result<(String, String)> {
    Ok((
        fsutil::read_to_string(input_file)?,
        fsutil::read_to_string(output_file)?,
    ))
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// File name without its last extension (`"test1.in"` -> `"test1"`, `".in"` -> `".in"`).
pub fn file_stem(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(0) | None => filename,
        Some(i) => &filename[..i],
    }
}

/// Extension of the last path segment of a glob, if it is a literal one (`"*.out"` -> `"out"`).
fn literal_extension(pattern: &str) -> Option<&str> {
    let last = pattern.rsplit('/').next().unwrap_or(pattern);
    let stem = file_stem(last);
    if stem.len() == last.len() {
        return None;
    }
    let ext = &last[stem.len() + 1..];
    let is_literal = !ext.is_empty() && !ext.contains(['*', '?', '[', ']']);
    is_literal.then_some(ext)
}

/// Picks the output file paired with `input_file` from `output_files`.
///
/// The file named `<stem>.<ext>` is preferred when `output_pattern` ends in a literal extension;
/// otherwise the first output whose stem equals the input stem is taken.
/// Outputs may live in another directory than the input.
pub fn pair_output_for(
    input_file: &Path,
    output_pattern: &str,
    output_files: &[PathBuf],
) -> Option<PathBuf> {
    let input_name = file_name_of(input_file);
    let stem = file_stem(&input_name);
    let candidates = || output_files.iter().filter(move |p| p.as_path() != input_file);

    if let Some(ext) = literal_extension(output_pattern) {
        let wanted = format!("{}.{}", stem, ext);
        if let Some(found) = candidates().find(|p| file_name_of(p) == wanted) {
            return Some(found.clone());
        }
    }
    candidates()
        .find(|p| file_stem(&file_name_of(p)) == stem)
        .cloned()
}

#[cfg(test)]
mod test {
    use super::*;

    fn paths(xs: &[&str]) -> Vec<PathBuf> {
        xs.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn file_stem_strips_last_extension() {
        assert_eq!(file_stem("test1.in"), "test1");
        assert_eq!(file_stem("a.b.out"), "a.b");
        assert_eq!(file_stem("noext"), "noext");
        assert_eq!(file_stem(".hidden"), ".hidden");
    }

    #[test]
    fn literal_extension_of_pattern() {
        assert_eq!(literal_extension("*.out"), Some("out"));
        assert_eq!(literal_extension("sub/*.output"), Some("output"));
        assert_eq!(literal_extension("*"), None);
        assert_eq!(literal_extension("*.*"), None);
        assert_eq!(literal_extension("*.[ot]ut"), None);
    }

    #[test]
    fn pairs_by_replacing_extension() {
        let outs = paths(&["t/1.out", "t/2.out"]);
        let pair = |input: &str| pair_output_for(Path::new(input), "*.out", &outs);
        assert_eq!(pair("t/2.in"), Some("t/2.out".into()));
        assert_eq!(pair("t/3.in"), None);
    }

    #[test]
    fn pairs_by_stem_when_extension_is_not_literal() {
        let outs = paths(&["t/a.ans", "t/b.res"]);
        let pair = |input: &str| pair_output_for(Path::new(input), "*.*", &outs);
        assert_eq!(pair("t/b.in"), Some("t/b.res".into()));
        assert_eq!(pair("t/c.in"), None);
    }

    #[test]
    fn pairs_across_directories() {
        let outs = paths(&["t/expected/1.out"]);
        assert_eq!(
            pair_output_for(Path::new("t/1.in"), "expected/*.out", &outs),
            Some("t/expected/1.out".into())
        );
    }

    #[test]
    fn never_pairs_input_with_itself() {
        let outs = paths(&["t/x.txt"]);
        assert_eq!(pair_output_for(Path::new("t/x.txt"), "*.txt", &outs), None);
    }

    #[test]
    fn discover_pairs_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        fsutil::write(p.join("test2.in"), "2 2\n").unwrap();
        fsutil::write(p.join("test2.out"), "4\n").unwrap();
        fsutil::write(p.join("test1.in"), "1 2\n").unwrap();
        fsutil::write(p.join("test1.out"), "3\n").unwrap();
        fsutil::write(p.join("orphan.in"), "0\n").unwrap();

        let d = TestcaseFinder::default().discover(p).unwrap();
        assert_eq!(
            d.cases,
            vec![
                TestCase::named("test1", "1 2\n", "3\n"),
                TestCase::named("test2", "2 2\n", "4\n"),
            ]
        );
        assert_eq!(d.skipped.len(), 1);
        assert_eq!(d.skipped[0].input_file, p.join("orphan.in"));
    }

    #[test]
    fn discover_with_custom_patterns() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        fsutil::write(p.join("a.input"), "x").unwrap();
        fsutil::write(p.join("a.output"), "y").unwrap();
        fsutil::write(p.join("a.in"), "ignored").unwrap();

        let finder = TestcaseFinder::new(
            GlobPattern::parse("*.input").unwrap(),
            GlobPattern::parse("*.output").unwrap(),
        );
        let d = finder.discover(p).unwrap();
        assert_eq!(d.cases, vec![TestCase::named("a", "x", "y")]);
        assert!(d.skipped.is_empty());
    }

    #[test]
    fn discover_reads_outputs_from_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        fsutil::mkdir_all(p.join("expected")).unwrap();
        fsutil::write(p.join("t1.in"), "1\n").unwrap();
        fsutil::write(p.join("expected/t1.out"), "1\n").unwrap();

        let finder = TestcaseFinder::new(
            GlobPattern::parse("*.in").unwrap(),
            GlobPattern::parse("expected/*.out").unwrap(),
        );
        let d = finder.discover(p).unwrap();
        assert_eq!(d.cases, vec![TestCase::named("t1", "1\n", "1\n")]);
        assert!(d.skipped.is_empty());
    }

    #[test]
    fn discover_errors_on_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = TestcaseFinder::default()
            .discover(dir.path().join("tests"))
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::DirNotFound(_)), "{:?}", err);
    }

    #[test]
    fn discover_errors_on_no_input_files() {
        let dir = tempfile::tempdir().unwrap();
        fsutil::write(dir.path().join("only.out"), "1").unwrap();

        let err = TestcaseFinder::default().discover(dir.path()).unwrap_err();
        assert!(
            matches!(err, DiscoveryError::NoInputFiles { .. }),
            "{:?}",
            err
        );
        assert!(err.to_string().contains("'*.in'"));
    }
}

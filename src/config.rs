//! Run configuration for document generation.
//!
//! [`GenerateConfig`] is built with `with_*` methods and checked once with
//! [`GenerateConfig::validate`] before any file is traversed.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Output file name when none is given.
pub const DEFAULT_OUTPUT: &str = "demo.docx";
/// Upper bound for a single diagram rendering.
pub const DEFAULT_DIAGRAM_TIMEOUT: Duration = Duration::from_secs(60);
/// Environment variable naming the PlantUML jar.
pub const PLANTUML_JAR_ENV: &str = "FEATUREDOC_PLANTUML_JAR";

const OUTPUT_EXTENSION: &str = "docx";

/// Configuration errors, reported before any traversal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("repository {} does not exist", .0.display())]
    RepositoryMissing(PathBuf),

    #[error("repository {} is not a directory", .0.display())]
    RepositoryNotDirectory(PathBuf),

    #[error("the document title must not be empty")]
    EmptyTitle,

    #[error("forewords folder {} is not a directory", .0.display())]
    ForewordsMissing(PathBuf),

    #[error("execution report {} does not exist", .0.display())]
    ReportMissing(PathBuf),

    #[error("the output file name must not be empty")]
    EmptyOutput,
}

/// Heading levels of the feature sections.
///
/// When a report or forewords are included, the features are nested one level deeper under a
/// "Living documentation" heading, so every level is offset by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeadingLevels {
    offset: usize,
}

impl HeadingLevels {
    pub const fn new(nested: bool) -> Self {
        Self {
            offset: if nested { 1 } else { 0 },
        }
    }

    pub const fn offset(self) -> usize {
        self.offset
    }

    /// Level of a section whose un-nested level is `base`.
    pub const fn level(self, base: usize) -> usize {
        base + self.offset
    }

    pub const fn h1(self) -> usize {
        self.level(1)
    }

    pub const fn h2(self) -> usize {
        self.level(2)
    }

    pub const fn h3(self) -> usize {
        self.level(3)
    }
}

/// Everything a generation run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateConfig {
    /// Root of the `.feature` tree.
    pub repository: PathBuf,
    pub title: String,
    /// Tags containing this text are shown as the related user story.
    pub tag_prefix: Option<String>,
    /// Plain execution report.
    pub report: Option<PathBuf>,
    /// Folder of `*.md` forewords.
    pub forewords: Option<PathBuf>,
    pub output: PathBuf,
    pub plantuml_jar: Option<PathBuf>,
    pub diagram_timeout: Duration,
}

impl GenerateConfig {
    pub fn new(repository: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            title: title.into(),
            tag_prefix: None,
            report: None,
            forewords: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            plantuml_jar: None,
            diagram_timeout: DEFAULT_DIAGRAM_TIMEOUT,
        }
    }

    pub fn with_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = Some(prefix.into());
        self
    }

    pub fn with_report(mut self, report: impl Into<PathBuf>) -> Self {
        self.report = Some(report.into());
        self
    }

    pub fn with_forewords(mut self, folder: impl Into<PathBuf>) -> Self {
        self.forewords = Some(folder.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_plantuml_jar(mut self, jar: impl Into<PathBuf>) -> Self {
        self.plantuml_jar = Some(jar.into());
        self
    }

    pub fn with_diagram_timeout(mut self, timeout: Duration) -> Self {
        self.diagram_timeout = timeout;
        self
    }

    /// Check the configuration against the file system.
    ///
    /// ## Errors
    /// The first problem found, in the order repository, title, forewords, report, output.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.repository.exists() {
            return Err(ConfigError::RepositoryMissing(self.repository.clone()));
        }
        if !self.repository.is_dir() {
            return Err(ConfigError::RepositoryNotDirectory(self.repository.clone()));
        }
        if self.title.trim().is_empty() {
            return Err(ConfigError::EmptyTitle);
        }
        if let Some(folder) = &self.forewords {
            if !folder.is_dir() {
                return Err(ConfigError::ForewordsMissing(folder.clone()));
            }
        }
        if let Some(report) = &self.report {
            if !report.is_file() {
                return Err(ConfigError::ReportMissing(report.clone()));
            }
        }
        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::EmptyOutput);
        }
        Ok(())
    }

    pub fn heading_levels(&self) -> HeadingLevels {
        HeadingLevels::new(self.report.is_some() || self.forewords.is_some())
    }

    /// The output path with the `.docx` extension enforced.
    pub fn output_path(&self) -> PathBuf {
        with_docx_extension(&self.output)
    }

    /// PlantUML jar: explicit setting, then [`PLANTUML_JAR_ENV`], then `assets/plantuml.jar` next
    /// to the executable.
    pub fn plantuml_jar_path(&self) -> PathBuf {
        resolve_plantuml_jar(
            self.plantuml_jar.as_deref(),
            std::env::var_os(PLANTUML_JAR_ENV),
            std::env::current_exe().ok(),
        )
    }
}

/// Append `.docx` unless the name already ends with it.
pub fn with_docx_extension(path: &Path) -> PathBuf {
    let has_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(OUTPUT_EXTENSION));
    if has_extension {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(OUTPUT_EXTENSION);
        PathBuf::from(name)
    }
}

fn resolve_plantuml_jar(explicit: Option<&Path>, env: Option<OsString>, exe: Option<PathBuf>) -> PathBuf {
    if let Some(jar) = explicit {
        return jar.to_path_buf();
    }
    if let Some(jar) = env.filter(|v| !v.is_empty()) {
        return PathBuf::from(jar);
    }
    exe.as_deref()
        .and_then(Path::parent)
        .map(|dir| dir.join("assets").join("plantuml.jar"))
        .unwrap_or_else(|| PathBuf::from("assets/plantuml.jar"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Defaults and builder
    // ========================================

    #[test]
    fn test_defaults() {
        let config = GenerateConfig::new("features", "Doc");
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.diagram_timeout, DEFAULT_DIAGRAM_TIMEOUT);
        assert_eq!(config.tag_prefix, None);
        assert_eq!(config.heading_levels().offset(), 0);
    }

    #[test]
    fn test_builder() {
        let config = GenerateConfig::new("features", "Doc")
            .with_tag_prefix("US-")
            .with_output("living")
            .with_diagram_timeout(Duration::from_secs(5));
        assert_eq!(config.tag_prefix.as_deref(), Some("US-"));
        assert_eq!(config.output_path(), PathBuf::from("living.docx"));
        assert_eq!(config.diagram_timeout, Duration::from_secs(5));
    }

    // ========================================
    // Heading levels
    // ========================================

    #[test]
    fn test_report_or_forewords_nest_headings() {
        let plain = GenerateConfig::new("f", "t").heading_levels();
        assert_eq!((plain.h1(), plain.h2(), plain.h3()), (1, 2, 3));

        let with_report = GenerateConfig::new("f", "t").with_report("r.txt").heading_levels();
        assert_eq!((with_report.h1(), with_report.h2(), with_report.h3()), (2, 3, 4));

        let with_forewords = GenerateConfig::new("f", "t").with_forewords("fw").heading_levels();
        assert_eq!(with_forewords.offset(), 1);
    }

    // ========================================
    // Output name
    // ========================================

    #[test]
    fn test_docx_extension() {
        assert_eq!(with_docx_extension(Path::new("a.docx")), PathBuf::from("a.docx"));
        assert_eq!(with_docx_extension(Path::new("a.DOCX")), PathBuf::from("a.DOCX"));
        assert_eq!(with_docx_extension(Path::new("a")), PathBuf::from("a.docx"));
        assert_eq!(with_docx_extension(Path::new("v1.2")), PathBuf::from("v1.2.docx"));
    }

    // ========================================
    // Validation
    // ========================================

    #[test]
    fn test_validate_repository() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert_eq!(
            GenerateConfig::new(&missing, "t").validate(),
            Err(ConfigError::RepositoryMissing(missing))
        );

        let file = dir.path().join("file.feature");
        std::fs::write(&file, "").unwrap();
        assert_eq!(
            GenerateConfig::new(&file, "t").validate(),
            Err(ConfigError::RepositoryNotDirectory(file))
        );
    }

    #[test]
    fn test_validate_title_forewords_report() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(GenerateConfig::new(dir.path(), "  ").validate(), Err(ConfigError::EmptyTitle));

        let config = GenerateConfig::new(dir.path(), "t").with_forewords(dir.path().join("fw"));
        assert!(matches!(config.validate(), Err(ConfigError::ForewordsMissing(_))));

        let config = GenerateConfig::new(dir.path(), "t").with_report(dir.path().join("r.txt"));
        assert!(matches!(config.validate(), Err(ConfigError::ReportMissing(_))));

        assert_eq!(GenerateConfig::new(dir.path(), "t").validate(), Ok(()));
    }

    // ========================================
    // PlantUML jar lookup
    // ========================================

    #[test]
    fn test_plantuml_jar_order() {
        let exe = Some(PathBuf::from("/opt/featuredoc/featuredoc"));
        assert_eq!(
            resolve_plantuml_jar(Some(Path::new("/x/p.jar")), Some("/env/p.jar".into()), exe.clone()),
            PathBuf::from("/x/p.jar")
        );
        assert_eq!(
            resolve_plantuml_jar(None, Some("/env/p.jar".into()), exe.clone()),
            PathBuf::from("/env/p.jar")
        );
        assert_eq!(
            resolve_plantuml_jar(None, Some(OsString::new()), exe.clone()),
            PathBuf::from("/opt/featuredoc/assets/plantuml.jar")
        );
        assert_eq!(resolve_plantuml_jar(None, None, None), PathBuf::from("assets/plantuml.jar"));
    }
}

//! Asset pre-flight steps.
//!
//! Source layout (below `source_dir`):
//!
//! ```text
//! vendor/            copied to <compiled>/vendor/
//! media/             copied to <compiled>/media/
//! styles/main.scss   compiled to <compiled>/styles/main.css
//! scripts/main.ts    bundled to <compiled>/scripts/main.js
//! ```
//!
//! Missing inputs are skipped. Compilation is delegated to external commands.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use folio_config::AssetsConfig;

use crate::{AssetError, AssetStep};

/// What a pipeline run produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssetReport {
    /// Number of files copied from `vendor/` and `media/`.
    pub copied_files: usize,
    /// Compiled stylesheet, if styles were compiled.
    pub styles: Option<PathBuf>,
    /// Bundled script, if scripts were compiled.
    pub scripts: Option<PathBuf>,
}

/// Copies and compiles front-end assets into the compiled directory.
#[derive(Debug, Clone)]
pub struct AssetPipeline {
    config: AssetsConfig,
}

impl AssetPipeline {
    /// Create a pipeline for the given configuration.
    #[must_use]
    pub fn new(config: AssetsConfig) -> Self {
        Self { config }
    }

    /// Run every step in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns an [`AssetError`] naming the failed step.
    pub fn run(&self) -> Result<AssetReport, AssetError> {
        let source = &self.config.source_dir;
        let compiled = &self.config.compiled_dir;
        let mut report = AssetReport::default();

        if !source.is_dir() {
            tracing::info!(source = %source.display(), "No asset sources, skipping pipeline");
            return Ok(report);
        }

        report.copied_files += copy_tree(
            AssetStep::CopyVendor,
            &source.join("vendor"),
            &compiled.join("vendor"),
        )?;
        report.copied_files += copy_tree(
            AssetStep::CopyMedia,
            &source.join("media"),
            &compiled.join("media"),
        )?;

        report.styles = compile(
            AssetStep::CompileStyles,
            &self.config.styles_command,
            &source.join("styles/main.scss"),
            &compiled.join("styles/main.css"),
        )?;
        report.scripts = compile(
            AssetStep::CompileScripts,
            &self.config.scripts_command,
            &source.join("scripts/main.ts"),
            &compiled.join("scripts/main.js"),
        )?;

        tracing::info!(
            compiled = %compiled.display(),
            copied = report.copied_files,
            styles = report.styles.is_some(),
            scripts = report.scripts.is_some(),
            "Asset pipeline finished"
        );
        Ok(report)
    }
}

/// Recursively copy `from` into `to`. Returns the number of files copied.
fn copy_tree(step: AssetStep, from: &Path, to: &Path) -> Result<usize, AssetError> {
    if !from.is_dir() {
        tracing::debug!(%step, path = %from.display(), "Nothing to copy");
        return Ok(0);
    }
    let io_error = |path: &Path, source| AssetError::Io {
        step,
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(to).map_err(|e| io_error(to, e))?;
    let mut copied = 0;
    for entry in fs::read_dir(from).map_err(|e| io_error(from, e))? {
        let entry = entry.map_err(|e| io_error(from, e))?;
        let path = entry.path();
        let target = to.join(entry.file_name());
        if path.is_dir() {
            if loops_back(from, &path) {
                tracing::warn!(%step, path = %path.display(), "Skipping symlink loop");
                continue;
            }
            copied += copy_tree(step, &path, &target)?;
        } else {
            fs::copy(&path, &target).map_err(|e| io_error(&path, e))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Whether descending into `child` would revisit `dir` or one of its
/// ancestors through a symlink.
fn loops_back(dir: &Path, child: &Path) -> bool {
    match (fs::canonicalize(dir), fs::canonicalize(child)) {
        (Ok(dir), Ok(child)) => dir.starts_with(child),
        _ => false,
    }
}

/// Run `command` to turn `input` into `output`.
///
/// Returns `Ok(None)` when `input` does not exist.
fn compile(
    step: AssetStep,
    command: &[String],
    input: &Path,
    output: &Path,
) -> Result<Option<PathBuf>, AssetError> {
    if !input.is_file() {
        tracing::debug!(%step, input = %input.display(), "No input, skipping");
        return Ok(None);
    }

    let program = command.first().ok_or(AssetError::EmptyCommand { step })?;
    which::which(program).map_err(|_| AssetError::ProgramNotFound {
        step,
        program: program.clone(),
    })?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|source| AssetError::Io {
            step,
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let input_str = input.to_string_lossy();
    let output_str = output.to_string_lossy();
    let args: Vec<String> = command[1..]
        .iter()
        .map(|arg| {
            arg.replace("{input}", &input_str)
                .replace("{output}", &output_str)
        })
        .collect();

    tracing::debug!(%step, program, ?args, "Running asset command");
    let result = Command::new(program)
        .args(&args)
        .output()
        .map_err(|source| AssetError::Io {
            step,
            path: PathBuf::from(program),
            source,
        })?;

    if !result.status.success() {
        return Err(AssetError::CommandFailed {
            step,
            program: program.clone(),
            status: result.status.to_string(),
            stderr: String::from_utf8_lossy(&result.stderr).trim().to_owned(),
        });
    }

    Ok(Some(output.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config(root: &Path) -> AssetsConfig {
        AssetsConfig {
            styles_command: vec!["cp".to_owned(), "{input}".to_owned(), "{output}".to_owned()],
            scripts_command: vec![
                "cp".to_owned(),
                "{input}".to_owned(),
                "{output}".to_owned(),
            ],
            ..AssetsConfig::with_base(root)
        }
    }

    #[test]
    fn test_missing_source_dir_is_noop() {
        let temp = tempfile::tempdir().unwrap();
        let report = AssetPipeline::new(config(temp.path())).run().unwrap();
        assert_eq!(report, AssetReport::default());
        assert!(!temp.path().join("_compiled").exists());
    }

    #[test]
    fn test_copies_vendor_and_media() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "assets/vendor/lib/a.js", "a");
        write(temp.path(), "assets/vendor/b.css", "b");
        write(temp.path(), "assets/media/logo.svg", "<svg/>");

        let report = AssetPipeline::new(config(temp.path())).run().unwrap();

        assert_eq!(report.copied_files, 3);
        let compiled = temp.path().join("_compiled");
        assert_eq!(
            fs::read_to_string(compiled.join("vendor/lib/a.js")).unwrap(),
            "a"
        );
        assert!(compiled.join("vendor/b.css").is_file());
        assert!(compiled.join("media/logo.svg").is_file());
        assert_eq!(report.styles, None);
        assert_eq!(report.scripts, None);
    }

    #[cfg(unix)]
    #[test]
    fn test_copies_through_symlinked_dirs() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "shared/fonts/inter.woff2", "font");
        write(temp.path(), "assets/vendor/a.js", "a");
        let vendor = temp.path().join("assets/vendor");
        std::os::unix::fs::symlink(temp.path().join("shared/fonts"), vendor.join("fonts")).unwrap();
        std::os::unix::fs::symlink(&vendor, vendor.join("again")).unwrap();

        let report = AssetPipeline::new(config(temp.path())).run().unwrap();

        assert_eq!(report.copied_files, 2);
        let compiled = temp.path().join("_compiled");
        assert!(compiled.join("vendor/fonts/inter.woff2").is_file());
        assert!(!compiled.join("vendor/again").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_compiles_with_substituted_paths() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "assets/styles/main.scss", "body {}");
        write(temp.path(), "assets/scripts/main.ts", "let x = 1;");

        let report = AssetPipeline::new(config(temp.path())).run().unwrap();

        let compiled = temp.path().join("_compiled");
        assert_eq!(report.styles, Some(compiled.join("styles/main.css")));
        assert_eq!(report.scripts, Some(compiled.join("scripts/main.js")));
        assert_eq!(
            fs::read_to_string(compiled.join("scripts/main.js")).unwrap(),
            "let x = 1;"
        );
    }

    #[test]
    fn test_missing_program_names_step() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "assets/styles/main.scss", "body {}");
        let config = AssetsConfig {
            styles_command: vec!["folio-no-such-sass-binary".to_owned()],
            ..config(temp.path())
        };

        let err = AssetPipeline::new(config).run().unwrap_err();
        assert_eq!(err.step(), AssetStep::CompileStyles);
        assert!(err.to_string().starts_with("compile styles: "));
        assert!(matches!(err, AssetError::ProgramNotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command_aborts() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "assets/scripts/main.ts", "let x;");
        let config = AssetsConfig {
            scripts_command: vec![
                "sh".to_owned(),
                "-c".to_owned(),
                "echo 'syntax error' >&2; exit 3".to_owned(),
            ],
            ..config(temp.path())
        };

        let err = AssetPipeline::new(config).run().unwrap_err();
        match err {
            AssetError::CommandFailed { step, stderr, .. } => {
                assert_eq!(step, AssetStep::CompileScripts);
                assert_eq!(stderr, "syntax error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_command() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "assets/styles/main.scss", "body {}");
        let config = AssetsConfig {
            styles_command: Vec::new(),
            ..config(temp.path())
        };

        let err = AssetPipeline::new(config).run().unwrap_err();
        assert!(matches!(err, AssetError::EmptyCommand { .. }));
    }
}

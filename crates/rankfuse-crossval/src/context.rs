//! Working directory layout for a cross-validation run.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rankfuse_core::folds::fold_dir_name;
use tracing::{debug, warn};

use crate::error::CrossValError;

/// File name of the final fused run for `k` folds.
pub fn final_run_name(k: usize) -> String {
    format!("ranklib-combined-{}-fold-cross-validated-file.run", k)
}

/// Resolved paths under the cross-validation directory.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    root: PathBuf,
}

impl PipelineContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copies of the input runs.
    pub fn runs_dir(&self) -> PathBuf {
        self.root.join("runs")
    }

    pub fn folds_dir(&self) -> PathBuf {
        self.root.join("folds")
    }

    pub fn fold_dir(&self, index: usize) -> PathBuf {
        self.folds_dir().join(fold_dir_name(index))
    }

    pub fn test_dir(&self) -> PathBuf {
        self.root.join("test")
    }

    pub fn train_dir(&self) -> PathBuf {
        self.root.join("train")
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    pub fn combined_dir(&self) -> PathBuf {
        self.root.join("combined")
    }

    pub fn final_dir(&self) -> PathBuf {
        self.root.join("final")
    }

    pub fn test_file(&self, fold: usize) -> PathBuf {
        self.test_dir().join(format!("feature-file-{}.txt", fold))
    }

    /// Training file for the set that leaves fold `excluded` out.
    pub fn train_file(&self, excluded: usize) -> PathBuf {
        self.train_dir().join(format!("leave-{}.txt", excluded))
    }

    pub fn model_file(&self, excluded: usize) -> PathBuf {
        self.models_dir().join(format!("model-{}.txt", excluded))
    }

    pub fn combined_file(&self, excluded: usize) -> PathBuf {
        self.combined_dir().join(format!("comb-{}.txt", excluded))
    }

    pub fn final_run(&self, k: usize) -> PathBuf {
        self.final_dir().join(final_run_name(k))
    }

    pub fn summary_file(&self) -> PathBuf {
        self.root.join("summary.json")
    }

    /// Create the working directories.
    ///
    /// Directories that already exist are reused with a warning. Model and
    /// combined directories are only created when weights will be learned.
    pub fn create_dirs(&self, k: usize, with_learner: bool) -> Result<(), CrossValError> {
        fs::create_dir_all(&self.root)?;

        let mut dirs = vec![self.runs_dir(), self.folds_dir()];
        dirs.extend((0..k).map(|i| self.fold_dir(i)));
        dirs.push(self.test_dir());
        dirs.push(self.train_dir());
        if with_learner {
            dirs.push(self.models_dir());
            dirs.push(self.combined_dir());
            dirs.push(self.final_dir());
        }

        for dir in dirs {
            create_dir(&dir)?;
        }
        Ok(())
    }

    /// Empty every phase directory and remove the previous summary.
    ///
    /// Every file a later phase finds in the working directory is then one
    /// this run wrote.
    pub fn clear_stale(&self) -> Result<(), CrossValError> {
        let dirs = [
            self.runs_dir(),
            self.folds_dir(),
            self.test_dir(),
            self.train_dir(),
            self.models_dir(),
            self.combined_dir(),
            self.final_dir(),
        ];
        for dir in &dirs {
            clear_dir(dir)?;
        }
        remove_if_exists(&self.summary_file())?;
        Ok(())
    }

    /// Copy every regular file of `run_dir` into the runs directory.
    pub fn copy_runs(&self, run_dir: &Path) -> Result<Vec<PathBuf>, CrossValError> {
        let dest = self.runs_dir();
        let mut copied = Vec::new();

        for entry in fs::read_dir(run_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let target = dest.join(entry.file_name());
            fs::copy(entry.path(), &target)?;
            copied.push(target);
        }

        copied.sort();
        debug!("Copied {} runs into {}", copied.len(), dest.display());
        Ok(copied)
    }
}

fn clear_dir(dir: &Path) -> Result<(), CrossValError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
        removed += 1;
    }
    if removed > 0 {
        warn!("Removed {} stale entries from {}", removed, dir.display());
    }
    Ok(())
}

/// Remove a file, treating an absent file as success.
pub(crate) fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn create_dir(dir: &Path) -> Result<(), CrossValError> {
    match fs::create_dir(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            warn!("Directory {} already exists, reusing it", dir.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths() {
        let ctx = PipelineContext::new("/cv");
        assert_eq!(ctx.fold_dir(2), PathBuf::from("/cv/folds/fold-2"));
        assert_eq!(ctx.test_file(0), PathBuf::from("/cv/test/feature-file-0.txt"));
        assert_eq!(ctx.train_file(4), PathBuf::from("/cv/train/leave-4.txt"));
        assert_eq!(ctx.model_file(1), PathBuf::from("/cv/models/model-1.txt"));
        assert_eq!(ctx.combined_file(3), PathBuf::from("/cv/combined/comb-3.txt"));
        assert_eq!(
            ctx.final_run(5),
            PathBuf::from("/cv/final/ranklib-combined-5-fold-cross-validated-file.run")
        );
    }

    #[test]
    fn test_create_dirs_twice_is_ok() {
        let temp = TempDir::new().unwrap();
        let ctx = PipelineContext::new(temp.path().join("cv"));

        ctx.create_dirs(3, true).unwrap();
        ctx.create_dirs(3, true).unwrap();

        assert!(ctx.fold_dir(2).is_dir());
        assert!(ctx.models_dir().is_dir());
        assert!(ctx.final_dir().is_dir());
    }

    #[test]
    fn test_create_dirs_without_learner() {
        let temp = TempDir::new().unwrap();
        let ctx = PipelineContext::new(temp.path());

        ctx.create_dirs(2, false).unwrap();

        assert!(ctx.train_dir().is_dir());
        assert!(!ctx.models_dir().exists());
        assert!(!ctx.combined_dir().exists());
    }

    #[test]
    fn test_clear_stale_empties_phase_dirs() {
        let temp = TempDir::new().unwrap();
        let ctx = PipelineContext::new(temp.path().join("cv"));
        ctx.create_dirs(2, true).unwrap();
        fs::write(ctx.runs_dir().join("old.run"), "q1 Q0 d1 1 1.0 old\n").unwrap();
        fs::write(ctx.fold_dir(1).join("fold_1_old.run"), "").unwrap();
        fs::write(ctx.model_file(0), "1:7\n").unwrap();
        fs::write(ctx.summary_file(), "{}").unwrap();

        ctx.clear_stale().unwrap();

        assert_eq!(fs::read_dir(ctx.runs_dir()).unwrap().count(), 0);
        assert_eq!(fs::read_dir(ctx.folds_dir()).unwrap().count(), 0);
        assert!(!ctx.model_file(0).exists());
        assert!(!ctx.summary_file().exists());
        assert!(ctx.runs_dir().is_dir());
    }

    #[test]
    fn test_clear_stale_on_fresh_dir() {
        let temp = TempDir::new().unwrap();
        let ctx = PipelineContext::new(temp.path().join("absent"));
        ctx.clear_stale().unwrap();
        assert!(!ctx.root().exists());
    }

    #[test]
    fn test_copy_runs_skips_directories() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("input");
        fs::create_dir(&input).unwrap();
        fs::write(input.join("b.run"), "q1 Q0 d1 1 2.0 b\n").unwrap();
        fs::write(input.join("a.run"), "q1 Q0 d1 1 1.0 a\n").unwrap();
        fs::create_dir(input.join("nested")).unwrap();

        let ctx = PipelineContext::new(temp.path().join("cv"));
        ctx.create_dirs(2, false).unwrap();
        let copied = ctx.copy_runs(&input).unwrap();

        assert_eq!(copied, vec![ctx.runs_dir().join("a.run"), ctx.runs_dir().join("b.run")]);
        assert_eq!(
            fs::read_to_string(&copied[1]).unwrap(),
            "q1 Q0 d1 1 2.0 b\n"
        );
    }
}

use std::path::{Path, PathBuf};

type Release = Box<dyn FnOnce() -> anyhow::Result<()>>;

/// Release actions registered while the workflow acquires resources.
///
/// When dropped without [`Rollback::disarm`], the actions run in reverse
/// registration order. Each action runs at most once and a failing action
/// does not stop the ones after it.
#[derive(Default)]
pub struct Rollback {
    actions: Vec<(String, Release)>,
}

impl Rollback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: FnOnce() -> anyhow::Result<()> + 'static,
    {
        self.actions.push((name.into(), Box::new(f)));
    }

    /// Registers the recursive removal of `dir`.
    pub fn remove_dir_on_failure(&mut self, dir: &Path) {
        let dir: PathBuf = dir.to_path_buf();
        self.push(format!("remove {}", dir.display()), move || {
            std::fs::remove_dir_all(&dir)?;
            Ok(())
        });
    }

    /// Keeps everything acquired so far.
    pub fn disarm(mut self) {
        self.actions.clear();
    }

    fn release(&mut self) {
        while let Some((name, action)) = self.actions.pop() {
            tracing::debug!(action = name.as_str(), "rolling back");
            if let Err(e) = action() {
                tracing::warn!(action = name.as_str(), "rollback failed: {:#}", e);
            }
        }
    }
}

impl Drop for Rollback {
    fn drop(&mut self) {
        self.release();
    }
}

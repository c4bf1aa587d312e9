use std::fmt;
use std::path::Path;
use std::process::Command;

use anyhow::Context;

use crate::init::Options;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Yarn,
    Npm,
    Cargo,
}

impl PackageManager {
    /// Picks the package manager for the project at `root`, if it has a
    /// manifest we know about.
    pub fn detect(root: &Path, force_npm: bool) -> Option<Self> {
        if root.join("package.json").is_file() {
            if !force_npm && which::which("yarn").is_ok() {
                return Some(PackageManager::Yarn);
            }
            return Some(PackageManager::Npm);
        }
        if root.join("Cargo.toml").is_file() {
            return Some(PackageManager::Cargo);
        }
        None
    }

    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Yarn => "yarn",
            PackageManager::Npm => "npm",
            PackageManager::Cargo => "cargo",
        }
    }

    fn install_args(&self) -> &'static [&'static str] {
        match self {
            PackageManager::Yarn | PackageManager::Npm => &["install"],
            PackageManager::Cargo => &["fetch"],
        }
    }

    /// The command that starts the freshly created project.
    pub fn run_command(&self) -> &'static str {
        match self {
            PackageManager::Yarn => "yarn start",
            PackageManager::Npm => "npm start",
            PackageManager::Cargo => "cargo run",
        }
    }

    pub fn install_all(&self, root: &Path) -> anyhow::Result<()> {
        let program = which::which(self.program())
            .with_context(|| format!("{} is required to install dependencies", self.program()))?;

        tracing::info!(package_manager = %self, "installing dependencies");

        let status = Command::new(program)
            .args(self.install_args())
            .current_dir(root)
            .status()
            .with_context(|| format!("{} {} failed", self.program(), self.install_args().join(" ")))?;

        anyhow::ensure!(
            status.success(),
            "{} {} exited with {}",
            self.program(),
            self.install_args().join(" "),
            status
        );
        Ok(())
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

pub trait Installer {
    /// Installs the project's dependencies, returning the package manager
    /// used, if any.
    fn install(
        &self,
        project_root: &Path,
        options: &Options,
    ) -> anyhow::Result<Option<PackageManager>>;
}

#[derive(Debug, Default, Clone)]
pub struct DependencyInstaller;

impl Installer for DependencyInstaller {
    fn install(
        &self,
        project_root: &Path,
        options: &Options,
    ) -> anyhow::Result<Option<PackageManager>> {
        let Some(pm) = PackageManager::detect(project_root, options.npm) else {
            tracing::debug!("no package manifest found, nothing to install");
            return Ok(None);
        };

        pm.install_all(project_root)?;
        Ok(Some(pm))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn detects_cargo_projects() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        assert_eq!(PackageManager::detect(tmp.path(), false), None);

        fs::write(tmp.path().join("Cargo.toml"), "")?;
        assert_eq!(
            PackageManager::detect(tmp.path(), false),
            Some(PackageManager::Cargo)
        );
        Ok(())
    }

    #[test]
    fn forced_npm_wins_over_yarn() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        fs::write(tmp.path().join("package.json"), "{}")?;

        assert_eq!(
            PackageManager::detect(tmp.path(), true),
            Some(PackageManager::Npm)
        );
        assert!(matches!(
            PackageManager::detect(tmp.path(), false),
            Some(PackageManager::Npm) | Some(PackageManager::Yarn)
        ));
        Ok(())
    }

    #[test]
    fn nothing_to_install_without_manifest() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let installed = DependencyInstaller.install(tmp.path(), &Options::default())?;
        assert_eq!(installed, None);
        Ok(())
    }

    #[test]
    fn run_commands() {
        assert_eq!(PackageManager::Cargo.run_command(), "cargo run");
        assert_eq!(PackageManager::Yarn.run_command(), "yarn start");
        assert_eq!(PackageManager::Npm.to_string(), "npm");
    }
}

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::edit_template::{PlaceholderSubstitution, Substitution};
use crate::error::{InitError, Step};
use crate::instructions::print_run_instructions;
use crate::package_manager::{DependencyInstaller, Installer, PackageManager};
use crate::post_init::{PostInitRunner, ScriptRunner};
use crate::rollback::Rollback;
use crate::template::{TemplateProvider, Templates};
use crate::validate::validate_project_name;

/// Version of the default template used when `--version` isn't given.
pub const DEFAULT_VERSION: &str = "latest";

#[derive(Debug, Default, Clone)]
pub struct Options {
    /// External template to use instead of the default one.
    pub template: Option<String>,
    /// Install with npm even when yarn is available.
    pub npm: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub project_root: PathBuf,
    pub template: String,
    pub package_manager: Option<PackageManager>,
}

pub struct Initializer {
    base_dir: PathBuf,
    templates: Box<dyn TemplateProvider>,
    substitution: Box<dyn Substitution>,
    installer: Box<dyn Installer>,
    post_init: Box<dyn PostInitRunner>,
}

impl Initializer {
    /// Creates projects below `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            templates: Box::new(Templates),
            substitution: Box::new(PlaceholderSubstitution),
            installer: Box::new(DependencyInstaller),
            post_init: Box::new(ScriptRunner),
        }
    }

    pub fn with_templates(mut self, templates: impl TemplateProvider + 'static) -> Self {
        self.templates = Box::new(templates);
        self
    }

    pub fn with_substitution(mut self, substitution: impl Substitution + 'static) -> Self {
        self.substitution = Box::new(substitution);
        self
    }

    pub fn with_installer(mut self, installer: impl Installer + 'static) -> Self {
        self.installer = Box::new(installer);
        self
    }

    pub fn with_post_init(mut self, post_init: impl PostInitRunner + 'static) -> Self {
        self.post_init = Box::new(post_init);
        self
    }

    /// Creates the project named by the first of `args`.
    ///
    /// The default template version comes from `--version` in `raw_args`,
    /// the unparsed process arguments, not from `options`. Run
    /// instructions are written to `out` on success. On failure anything
    /// created so far is removed before the error is returned.
    #[tracing::instrument(skip_all, level = "trace")]
    pub fn initialize<S: AsRef<str>>(
        &self,
        args: &[String],
        options: &Options,
        raw_args: &[S],
        out: &mut impl Write,
    ) -> Result<InitReport, InitError> {
        let project_name = args.first().map(String::as_str).unwrap_or_default();
        validate_project_name(project_name)?;

        let version = version_from_args(raw_args);

        let project_root = self.base_dir.join(project_name);
        if fs::symlink_metadata(&project_root).is_ok() {
            return Err(InitError::DirectoryAlreadyExists(project_name.to_owned()));
        }

        let mut rollback = Rollback::new();
        fs::create_dir(&project_root).map_err(|source| InitError::CreateDirectory {
            path: project_root.clone(),
            source,
        })?;
        rollback.remove_dir_on_failure(&project_root);

        let template = match &options.template {
            Some(template) => {
                tracing::info!("Initializing new project from external template");
                template.clone()
            }
            None => {
                tracing::info!("Initializing new project");
                self.templates
                    .resolve_default(&version)
                    .map_err(InitError::step(Step::ResolveVersion))?
            }
        };

        let package_manager =
            self.create_from_template(project_name, &template, &project_root, options)?;

        if let Err(e) = print_run_instructions(out, &project_root, project_name, package_manager)
        {
            tracing::warn!("failed to print run instructions: {}", e);
        }

        rollback.disarm();

        Ok(InitReport {
            project_root,
            template,
            package_manager,
        })
    }

    fn create_from_template(
        &self,
        project_name: &str,
        template: &str,
        project_root: &Path,
        options: &Options,
    ) -> Result<Option<PackageManager>, InitError> {
        tracing::debug!(template, "creating project from template");

        let fetched = self
            .templates
            .fetch(template)
            .map_err(InitError::step(Step::Fetch))?;
        let config = self
            .templates
            .config(&fetched)
            .map_err(InitError::step(Step::Config))?;

        self.templates
            .copy(&fetched, &config.template_dir, project_root)
            .map_err(InitError::step(Step::Copy))?;
        self.substitution
            .change_placeholder(project_root, project_name, &config.placeholder_name)
            .map_err(InitError::step(Step::Substitute))?;

        let package_manager = self
            .installer
            .install(project_root, options)
            .map_err(InitError::step(Step::Install))?;

        if let Some(script) = &config.post_init_script {
            self.post_init
                .run(&fetched, script, project_root)
                .map_err(InitError::step(Step::PostInit))?;
        }

        Ok(package_manager)
    }
}

/// Reads `--version <v>` or `--version=<v>` from unparsed arguments.
///
/// Parsing stops at `--`. A `--version` without a value is ignored.
pub fn version_from_args<S: AsRef<str>>(raw_args: &[S]) -> String {
    let mut args = raw_args.iter().map(|a| AsRef::<str>::as_ref(a));

    while let Some(arg) = args.next() {
        if arg == "--" {
            break;
        }
        if let Some(version) = arg.strip_prefix("--version=") {
            if !version.is_empty() {
                return version.to_owned();
            }
            continue;
        }
        if arg == "--version" {
            match args.next() {
                Some(version) if !version.starts_with('-') => return version.to_owned(),
                Some("--") | None => break,
                Some(_) => continue,
            }
        }
    }

    DEFAULT_VERSION.to_owned()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::validate::NameError;

    fn raw(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn version_defaults_to_latest() {
        assert_eq!(version_from_args(&raw(&["projinit", "init", "MyApp"])), "latest");
        assert_eq!(version_from_args::<String>(&[]), "latest");
    }

    #[test]
    fn version_from_separate_or_inline_value() {
        assert_eq!(
            version_from_args(&raw(&["projinit", "init", "MyApp", "--version", "0.1.0"])),
            "0.1.0"
        );
        assert_eq!(
            version_from_args(&raw(&["projinit", "init", "--version=0.2.0", "MyApp"])),
            "0.2.0"
        );
    }

    #[test]
    fn bare_version_flag_is_ignored() {
        assert_eq!(
            version_from_args(&raw(&["projinit", "init", "MyApp", "--version"])),
            "latest"
        );
        assert_eq!(
            version_from_args(&raw(&["init", "--version", "--npm", "MyApp"])),
            "latest"
        );
        assert_eq!(version_from_args(&raw(&["init", "--version="])), "latest");
    }

    #[test]
    fn stops_at_double_dash() {
        assert_eq!(
            version_from_args(&raw(&["init", "MyApp", "--", "--version", "0.1.0"])),
            "latest"
        );
    }

    #[test]
    fn missing_name_is_invalid() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let mut out = Vec::new();

        let err = Initializer::new(tmp.path())
            .initialize::<String>(&[], &Options::default(), &[], &mut out)
            .unwrap_err();

        assert!(matches!(err, InitError::InvalidName(NameError::Invalid(_))));
        assert!(out.is_empty());
        Ok(())
    }
}

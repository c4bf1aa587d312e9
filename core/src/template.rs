use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use tempfile::TempDir;

pub const CONFIG_FILE: &str = "template.toml";

const BUILTIN_PREFIX: &str = "builtin:";

static BUILTIN_TEMPLATES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates/default");

/// Template files that can't be shipped under their real name, either
/// because packaging drops dotfiles or because cargo treats a nested
/// `Cargo.toml` as a separate package.
const RENAMED_FILES: &[(&str, &str)] = &[
    ("_gitignore", ".gitignore"),
    ("_gitattributes", ".gitattributes"),
    ("_editorconfig", ".editorconfig"),
    ("_npmrc", ".npmrc"),
    ("_prettierrc.js", ".prettierrc.js"),
    ("_eslintrc.js", ".eslintrc.js"),
    ("_watchmanconfig", ".watchmanconfig"),
    ("_env", ".env"),
    ("_Cargo.toml", "Cargo.toml"),
];

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Unknown template version \"{version}\". Available versions: {available}")]
    UnknownVersion { version: String, available: String },
    #[error("Unsupported template \"{0}\". Use a git url, a local directory or `builtin:<version>`")]
    UnsupportedTemplate(String),
    #[error("Path \"{0}\" escapes the template directory")]
    EscapesTemplate(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TemplateConfig {
    pub template_dir: String,
    pub placeholder_name: String,
    #[serde(default)]
    pub post_init_script: Option<String>,
}

impl TemplateConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Cannot read template config {:?}", path))?;
        toml::from_str(&raw).with_context(|| format!("Invalid template config {:?}", path))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Builtin(String),
    Git(String),
    Local(PathBuf),
}

impl TemplateSource {
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        if let Some(version) = template.strip_prefix(BUILTIN_PREFIX) {
            return Ok(TemplateSource::Builtin(version.to_owned()));
        }
        if let Some(url) = template.strip_prefix("git+") {
            return Ok(TemplateSource::Git(url.to_owned()));
        }
        if ["https://", "http://", "ssh://", "git@"]
            .iter()
            .any(|p| template.starts_with(p))
            || template.ends_with(".git")
        {
            return Ok(TemplateSource::Git(template.to_owned()));
        }
        if let Some(path) = template.strip_prefix("file:") {
            return Ok(TemplateSource::Local(PathBuf::from(path)));
        }
        let path = Path::new(template);
        if path.is_dir() {
            return Ok(TemplateSource::Local(path.to_path_buf()));
        }
        Err(TemplateError::UnsupportedTemplate(template.to_owned()))
    }
}

/// A template materialized on disk. Owned templates are deleted on drop.
#[derive(Debug)]
pub struct FetchedTemplate {
    identifier: String,
    root: PathBuf,
    _dir: Option<TempDir>,
}

impl FetchedTemplate {
    pub fn owned(identifier: impl Into<String>, dir: TempDir) -> Self {
        Self {
            identifier: identifier.into(),
            root: dir.path().to_path_buf(),
            _dir: Some(dir),
        }
    }

    pub fn borrowed(identifier: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            identifier: identifier.into(),
            root: root.into(),
            _dir: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins a path from the template config onto the template root.
    pub fn resolve(&self, rel: &str) -> anyhow::Result<PathBuf> {
        let path = Path::new(rel);
        let inside = path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !inside {
            return Err(TemplateError::EscapesTemplate(rel.to_owned()).into());
        }
        Ok(self.root.join(path))
    }
}

pub trait TemplateProvider {
    /// Maps a version of the default template to a template identifier.
    fn resolve_default(&self, version: &str) -> anyhow::Result<String>;
    fn fetch(&self, template: &str) -> anyhow::Result<FetchedTemplate>;
    fn config(&self, template: &FetchedTemplate) -> anyhow::Result<TemplateConfig>;
    fn copy(
        &self,
        template: &FetchedTemplate,
        template_dir: &str,
        project_root: &Path,
    ) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct Templates;

impl TemplateProvider for Templates {
    fn resolve_default(&self, version: &str) -> anyhow::Result<String> {
        resolve_default_template(version)
    }

    #[tracing::instrument(skip(self), level = "trace")]
    fn fetch(&self, template: &str) -> anyhow::Result<FetchedTemplate> {
        let source = TemplateSource::parse(template)?;
        let dir = tempfile::Builder::new()
            .prefix("projinit-template-")
            .tempdir()
            .context("Cannot create a temporary directory for the template")?;

        tracing::debug!(
            template,
            dest = dir.path().display().to_string(),
            "fetching template"
        );

        match &source {
            TemplateSource::Builtin(version) => extract_builtin(version, dir.path())?,
            TemplateSource::Git(url) => git_clone(url, dir.path())?,
            TemplateSource::Local(path) => copy_local(path, dir.path())?,
        }

        Ok(FetchedTemplate::owned(template, dir))
    }

    fn config(&self, template: &FetchedTemplate) -> anyhow::Result<TemplateConfig> {
        TemplateConfig::from_file(&template.root().join(CONFIG_FILE))
    }

    fn copy(
        &self,
        template: &FetchedTemplate,
        template_dir: &str,
        project_root: &Path,
    ) -> anyhow::Result<()> {
        copy_template(template, template_dir, project_root)
    }
}

pub fn builtin_versions() -> Vec<String> {
    let mut versions: Vec<String> = BUILTIN_TEMPLATES
        .dirs()
        .filter_map(|d| d.path().file_name()?.to_str().map(str::to_owned))
        .collect();
    versions.sort_by_key(|v| version_key(v));
    versions
}

pub fn resolve_default_template(version: &str) -> anyhow::Result<String> {
    let versions = builtin_versions();

    let resolved = if version == crate::init::DEFAULT_VERSION {
        versions.last().cloned()
    } else {
        versions.iter().find(|v| v.as_str() == version).cloned()
    };

    match resolved {
        Some(v) => Ok(format!("{}{}", BUILTIN_PREFIX, v)),
        None => Err(TemplateError::UnknownVersion {
            version: version.to_owned(),
            available: versions.join(", "),
        }
        .into()),
    }
}

fn version_key(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}

fn extract_builtin(version: &str, dest: &Path) -> anyhow::Result<()> {
    let dir = BUILTIN_TEMPLATES
        .get_dir(version)
        .ok_or_else(|| TemplateError::UnknownVersion {
            version: version.to_owned(),
            available: builtin_versions().join(", "),
        })?;

    extract_dir(dir, dir.path(), dest)
}

fn extract_dir(dir: &Dir<'_>, base: &Path, dest: &Path) -> anyhow::Result<()> {
    for f in dir.files() {
        let target = dest.join(f.path().strip_prefix(base)?);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, f.contents())
            .with_context(|| format!("Cannot write {:?}", target))?;
    }
    for sub in dir.dirs() {
        extract_dir(sub, base, dest)?;
    }
    Ok(())
}

fn git_clone_args<'a>(url: &'a str, dest: &'a Path) -> [&'a OsStr; 6] {
    [
        OsStr::new("clone"),
        OsStr::new("--depth"),
        OsStr::new("1"),
        OsStr::new("--"),
        OsStr::new(url),
        dest.as_os_str(),
    ]
}

fn git_clone(url: &str, dest: &Path) -> anyhow::Result<()> {
    let git = which::which("git").context("git is required to fetch templates from a url")?;

    let output = Command::new(git)
        .args(git_clone_args(url, dest))
        .output()
        .context("git clone failed")?;

    anyhow::ensure!(
        output.status.success(),
        "git clone of {} failed: {}",
        url,
        String::from_utf8_lossy(&output.stderr).trim()
    );

    let dot_git = dest.join(".git");
    if dot_git.exists() {
        fs::remove_dir_all(&dot_git).context("Cannot remove .git from template")?;
    }
    Ok(())
}

fn copy_local(src: &Path, dest: &Path) -> anyhow::Result<()> {
    anyhow::ensure!(src.is_dir(), "Template directory {:?} doesn't exist", src);

    copy_dir_contents(src, dest).context("Cannot copy template folder")
}

/// Copies everything below `src` into `dest`, keeping file permissions.
fn copy_dir_contents(src: &Path, dest: &Path) -> anyhow::Result<()> {
    for entry in walkdir::WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src)?;
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        tracing::trace!(
            src = entry.path().display().to_string(),
            dest = target.display().to_string(),
            "copy file"
        );
        fs::copy(entry.path(), &target)
            .with_context(|| format!("Cannot copy {:?}", entry.path()))?;
    }
    Ok(())
}

pub fn copy_template(
    template: &FetchedTemplate,
    template_dir: &str,
    project_root: &Path,
) -> anyhow::Result<()> {
    let src = template.resolve(template_dir)?;
    anyhow::ensure!(
        src.is_dir(),
        "Template dir \"{}\" not found in {}",
        template_dir,
        template.identifier()
    );

    tracing::debug!(
        src = src.display().to_string(),
        dest = project_root.display().to_string(),
        "copying template"
    );

    copy_dir_contents(&src, project_root).context("Cannot copy template")?;

    rename_shipped_files(project_root)
}

fn rename_shipped_files(root: &Path) -> anyhow::Result<()> {
    let entries = walkdir::WalkDir::new(root)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    for entry in entries {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        let Some((_, real_name)) = RENAMED_FILES.iter().find(|(shipped, _)| *shipped == name)
        else {
            continue;
        };
        let target = entry.path().with_file_name(real_name);
        tracing::trace!(file = entry.path().display().to_string(), "renaming shipped file");
        fs::rename(entry.path(), &target)
            .with_context(|| format!("Cannot rename {:?}", entry.path()))?;
    }
    Ok(())
}

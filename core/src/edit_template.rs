use std::fs;
use std::path::Path;

use anyhow::Context;
use walkdir::{DirEntry, WalkDir};

const IGNORED: &[&str] = &[".git", "node_modules"];

pub trait Substitution {
    fn change_placeholder(
        &self,
        project_root: &Path,
        project_name: &str,
        placeholder: &str,
    ) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct PlaceholderSubstitution;

impl Substitution for PlaceholderSubstitution {
    fn change_placeholder(
        &self,
        project_root: &Path,
        project_name: &str,
        placeholder: &str,
    ) -> anyhow::Result<()> {
        change_placeholder_in_template(project_root, project_name, placeholder)
    }
}

fn is_ignored(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| IGNORED.contains(&name))
        .unwrap_or(false)
}

/// Replaces `placeholder` with `project_name` in file contents and file
/// names below `root`. The lowercase forms are replaced as well.
pub fn change_placeholder_in_template(
    root: &Path,
    project_name: &str,
    placeholder: &str,
) -> anyhow::Result<()> {
    anyhow::ensure!(!placeholder.is_empty(), "Placeholder name must not be empty");

    let replacements = [
        (placeholder.to_owned(), project_name.to_owned()),
        (placeholder.to_lowercase(), project_name.to_lowercase()),
    ];

    tracing::debug!(
        root = root.display().to_string(),
        placeholder,
        project_name,
        "changing placeholder in template"
    );

    // collected in pre-order so ignored directories are pruned, then
    // visited in reverse so children are renamed before their parent
    let entries = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !is_ignored(e))
        .collect::<Result<Vec<_>, _>>()?;

    for entry in entries.into_iter().rev() {
        let path = entry.path();

        if entry.file_type().is_file() {
            replace_in_file(path, &replacements)?;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let renamed = replacements
            .iter()
            .fold(name.to_owned(), |acc, (from, to)| acc.replace(from, to));
        if renamed != name {
            let target = path.with_file_name(&renamed);
            tracing::trace!(
                from = path.display().to_string(),
                to = target.display().to_string(),
                "renaming"
            );
            fs::rename(path, &target).with_context(|| format!("Cannot rename {:?}", path))?;
        }
    }

    Ok(())
}

fn replace_in_file(path: &Path, replacements: &[(String, String)]) -> anyhow::Result<()> {
    let bytes = fs::read(path).with_context(|| format!("Cannot read {:?}", path))?;
    let Ok(content) = String::from_utf8(bytes) else {
        tracing::trace!(file = path.display().to_string(), "skipping binary file");
        return Ok(());
    };

    let replaced = replacements
        .iter()
        .fold(content.clone(), |acc, (from, to)| acc.replace(from, to));

    if replaced != content {
        tracing::trace!(file = path.display().to_string(), "replacing placeholder");
        fs::write(path, replaced).with_context(|| format!("Cannot write {:?}", path))?;
    }
    Ok(())
}

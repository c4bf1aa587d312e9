use once_cell::sync::Lazy;
use regex::Regex;

static NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[$A-Z_][0-9A-Z_$]*$").expect("valid name regex"));

static HELLO_WORLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)helloworld").expect("valid helloworld regex"));

const RESERVED_NAMES: &[&str] = &["projinit", "test", "core", "std", "alloc"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error(
        "\"{0}\" is not a valid name for a project. Please use a valid identifier name (alphanumeric)."
    )]
    Invalid(String),
    #[error("Not a valid name for a project. Please do not use the reserved word \"{0}\".")]
    Reserved(String),
    #[error(
        "Project name shouldn't contain \"HelloWorld\" name in it, because it is CLI's default placeholder name."
    )]
    HelloWorld,
}

pub fn validate_project_name(name: &str) -> Result<(), NameError> {
    if !NAME_REGEX.is_match(name) {
        return Err(NameError::Invalid(name.to_owned()));
    }

    let lower = name.to_lowercase();
    if RESERVED_NAMES.contains(&lower.as_str()) {
        return Err(NameError::Reserved(lower));
    }

    if HELLO_WORLD.is_match(name) {
        return Err(NameError::HelloWorld);
    }

    Ok(())
}

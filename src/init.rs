use anyhow::Context;
use projinit_core::{Initializer, Options};
use structopt::StructOpt;

#[derive(StructOpt)]
pub struct InitCommand {
    /// The name of the project
    #[structopt(value_name = "PROJECT_NAME", required = true)]
    args: Vec<String>,
    /// Template to use instead of the default one: a git url, a local
    /// directory or `builtin:<version>`
    #[structopt(long, value_name = "TEMPLATE", env = "PROJINIT_TEMPLATE")]
    template: Option<String>,
    /// Version of the default template [default: latest]
    #[structopt(long, value_name = "VERSION")]
    version: Option<String>,
    /// Install dependencies with npm even when yarn is available
    #[structopt(long)]
    npm: bool,
}

pub fn projinit_init(command: InitCommand) -> anyhow::Result<()> {
    // the default template version is taken from the raw arguments below,
    // this parsed value only exists for `--help`
    tracing::trace!(version = ?command.version, "parsed version flag");

    let raw_args: Vec<String> = std::env::args_os()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    let cwd = std::env::current_dir().context("Cannot read the current directory")?;

    let options = Options {
        template: command.template,
        npm: command.npm,
    };

    let report = Initializer::new(cwd).initialize(
        &command.args,
        &options,
        &raw_args,
        &mut std::io::stdout(),
    )?;

    tracing::debug!(
        project_root = report.project_root.display().to_string(),
        template = report.template.as_str(),
        "initialized"
    );

    Ok(())
}

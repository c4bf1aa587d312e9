use clap::AppSettings;
use projinit_core::InitError;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

mod init;

#[derive(StructOpt)]
#[structopt(name = "projinit", global_settings = &[AppSettings::VersionlessSubcommands])]
enum Projinit {
    /// Initialize a new project
    Init(init::InitCommand),
}

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opts = Projinit::from_args();
    let res = match opts {
        Projinit::Init(command) => init::projinit_init(command),
    };

    if let Err(e) = res {
        tracing::error!("{}", e);
        let code = e
            .downcast_ref::<InitError>()
            .map(InitError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

mod batch;
mod connector;
mod item;
mod model;
mod resources;
mod shape;

use anyhow::Result;
use clap::{arg, Command};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::model::ConfigFile;

static CLIENT_NAME: &str = "teller";

async fn run() -> Result<()> {
    let app = Command::new(CLIENT_NAME)
        .about("The teller utility maps declarative operation items onto the \
         Firefly III REST API and emits one result record per item.")
        .version("0.1.0")
        .subcommand_required(true)
        .allow_external_subcommands(false)
        .arg(arg!(CONFIG: -c --config [FILE] "Sets a custom config file"))
        .arg(arg!(verbose: -v --verbose [Boolean] "Sets the level of verbosity"))
        .subcommand(Command::new("run")
            .about("Processes a JSON array of operation items against the configured server.")
            .arg(arg!(input: <FILE> "A file holding the operation items to process."))
            .arg(arg!(out: -o --out [DIR] "Directory for export attachments, defaults to the working directory.")))
        .subcommand(Command::new("operations")
            .about("Prints the supported resource and operation pairs."));

    if app.clone().get_matches().value_of("verbose") == Some("true") {
        tracing_subscriber::registry()
            .with(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    match app.clone().get_matches().subcommand() {
        Some(("run", run_matches)) => {
            let conf = ConfigFile::read(app.get_matches().value_of("CONFIG"))?;
            batch::run(run_matches, conf).await?;
        }
        Some(("operations", _)) => {
            print!("{}", resources::operations_table()?);
        }
        None => unreachable!("subcommand is required"),
        _ => unreachable!(),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        println!("{:#}", err);
        std::process::exit(1);
    }
}

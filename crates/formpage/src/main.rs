use crate::prelude::*;
use clap::Parser;

mod batch;
mod config;
mod error;
mod fields;
mod fill;
mod paginate;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Find the fields of a document template, fill them in and lay the result out on pages"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Path to a TOML configuration file (page geometry, extractor, layout)
    #[clap(long, env = "FORMPAGE_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,

    /// Whether to display additional information.
    #[clap(long, env = "FORMPAGE_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// List the fillable fields found in a template
    Fields(crate::fields::Options),

    /// Paginate a JSON list of content elements
    Paginate(crate::paginate::Options),

    /// Fill a template with values and render it
    Fill(crate::fill::Options),

    /// Fill many templates into PDFs concurrently
    Batch(crate::batch::Options),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Fields(options) => crate::fields::run(options, app.global).await,
        SubCommands::Paginate(options) => crate::paginate::run(options, app.global).await,
        SubCommands::Fill(options) => crate::fill::run(options, app.global).await,
        SubCommands::Batch(options) => crate::batch::run(options, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}

pub mod inspect;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

use crate::config::Config;
use crate::output::Theme;

#[derive(Clone, Debug, Parser)]
#[command(name = "kcap", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// Config file [default: ~/.kcap/config.toml]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Print machine readable JSON")]
    pub json: bool,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,

    #[arg(long, global = true, help = "Hide the transfer progress bar")]
    pub no_progress: bool,

    /// More logging; repeat for more detail
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "i", name = "inspect", about = "Download inspect data of objects on every drive")]
    Inspect(inspect::InspectArg),
}

impl App {
    /// Base log level; `RUST_LOG` still takes precedence.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}

pub fn run(app: App) -> Result<()> {
    let config = Config::load(app.config.as_deref()).context("unable to load configuration")?;
    let theme = Theme::detect(app.no_color);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("unable to start async runtime")?;

    match &app.cmd {
        Commands::Inspect(arg) => {
            if let Some(notice) = inspect::wildcard_notice(&arg.target) {
                if !app.json {
                    eprintln!("{}", theme.info.apply_to(notice));
                }
            }
            let msg = runtime.block_on(inspect::inspect_with_config(arg, &app, &config))?;
            if app.json {
                println!("{}", msg.to_json().context("unable to marshal into JSON")?);
            } else {
                println!("{}", msg.render(&theme));
            }
        }
    }

    Ok(())
}

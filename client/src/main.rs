mod cli;
mod options;
mod play;
mod self_play;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use common::ConfigLoader;
use dotenv::dotenv;
use env_logger::Env;
use log::{info, warn};
use options::ClientOptions;

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Play(play_args) => {
            let options = load_options(&play_args.config, "play")?;

            play::play(&options)?
        }
        Commands::SelfPlay(self_play_args) => {
            let options = load_options(&self_play_args.config, "self_play")?;
            let games = self_play_args.games.unwrap_or(options.games);

            self_play::self_play(&options, games, self_play_args.output.as_deref())?
        }
    }

    Ok(())
}

fn load_options(config_path: &str, scope: &str) -> Result<ClientOptions> {
    if !Path::new(config_path).is_file() {
        warn!("Config {} not found, using defaults", config_path);
        return Ok(ClientOptions::default());
    }

    let config = ConfigLoader::new(config_path, scope.to_string())?;
    let options = config.load()?;

    info!("{:?}", options);

    Ok(options)
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version)]
#[clap(name = "Monte Carlo Tree Search Client")]
#[clap(about = "Plays tic-tac-toe using Monte Carlo tree search", long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Play(PlayCommand),
    SelfPlay(SelfPlayCommand),
}

#[derive(Args)]
#[clap(about = "Play a game against the engine on the command line", long_about = None)]
pub struct PlayCommand {
    #[clap(short, long, default_value_t = String::from("client.conf"))]
    pub config: String,
}

#[derive(Args)]
#[clap(about = "Let the engine play against itself", long_about = None)]
pub struct SelfPlayCommand {
    #[clap(short, long, default_value_t = String::from("client.conf"))]
    pub config: String,

    /// Overrides the number of games from the config.
    #[clap(short, long)]
    pub games: Option<usize>,

    /// Appends every finished game as a JSON line to this file.
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}

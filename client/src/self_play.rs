use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use engine::GameState as GameStateTrait;
use log::{debug, info};
use serde::Serialize;
use tictactoe::{Action, GameState, Player};

use crate::options::ClientOptions;
use crate::play::build_mcts;

#[derive(Serialize, Debug)]
pub struct GameRecord {
    pub actions: Vec<Action>,
    pub visits: Vec<usize>,
    pub winner: Option<Player>,
}

#[derive(Default, Debug)]
struct Tally {
    x_wins: usize,
    o_wins: usize,
    draws: usize,
}

pub fn self_play(options: &ClientOptions, games: usize, output: Option<&Path>) -> Result<()> {
    let mut writer = output
        .map(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map(BufWriter::new)
                .with_context(|| format!("Failed to open {:?}", path))
        })
        .transpose()?;

    let mut tally = Tally::default();

    for game in 1..=games {
        let record = play_game(options)?;

        match record.winner {
            Some(Player::X) => tally.x_wins += 1,
            Some(Player::O) => tally.o_wins += 1,
            None => tally.draws += 1,
        }

        info!(
            "Game {}/{} finished in {} moves, winner: {}",
            game,
            games,
            record.actions.len(),
            record
                .winner
                .map_or_else(|| "draw".to_string(), |p| p.to_string())
        );

        if let Some(writer) = writer.as_mut() {
            serde_json::to_writer(&mut *writer, &record)?;
            writeln!(writer)?;
        }
    }

    if let Some(writer) = writer.as_mut() {
        writer.flush()?;
    }

    info!(
        "X wins: {}, O wins: {}, Draws: {}",
        tally.x_wins, tally.o_wins, tally.draws
    );

    Ok(())
}

pub fn play_game(options: &ClientOptions) -> Result<GameRecord> {
    let mut state = GameState::initial();
    let mcts = build_mcts(state.clone(), options);
    let mut actions = Vec::new();
    let mut visits = Vec::new();

    let outcome = loop {
        if let Some(outcome) = state.outcome() {
            break outcome;
        }

        let results = mcts
            .search_iterations(options.iterations)?
            .ok_or_else(|| anyhow!("The search found no moves"))?;

        debug!("{}", results);

        let action = *results
            .best_action()
            .ok_or_else(|| anyhow!("The best result has no action"))?;

        visits.push(results.visits);
        actions.push(action);

        state = state.take_action(&action);
        mcts.update_root_state(state.clone())?;
    };

    Ok(GameRecord {
        actions,
        visits,
        winner: outcome.winner(),
    })
}

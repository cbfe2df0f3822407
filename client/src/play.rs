use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use engine::GameState as GameStateTrait;
use log::info;
use mcts::MCTS;
use tictactoe::{Action, Engine, GameState, Outcome};

use crate::options::ClientOptions;

pub fn build_mcts(state: GameState, options: &ClientOptions) -> MCTS<Engine> {
    MCTS::with_strategy(
        state,
        Engine::new(options.perspective),
        options.selection_strategy(),
        options.mcts_options(),
    )
}

/// Plays a single game between a human on stdin and the engine.
pub fn play(options: &ClientOptions) -> Result<()> {
    let mut state = GameState::initial();
    let mcts = build_mcts(state.clone(), options);
    let search_time = Duration::from_millis(options.search_time_ms);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("You are {}.", options.human_player);

    let outcome = loop {
        if let Some(outcome) = state.outcome() {
            break outcome;
        }

        println!("\n{}", state);

        let action = if state.player_to_move() == options.human_player {
            read_action(&mut lines, &state)?
        } else {
            let results = mcts
                .search_time(search_time)?
                .ok_or_else(|| anyhow!("The search found no moves"))?;

            info!("{}", results);

            let action = *results
                .best_action()
                .ok_or_else(|| anyhow!("The best result has no action"))?;

            println!("Engine plays {}", action);
            action
        };

        state = state.take_action(&action);
        mcts.update_root_state(state.clone())?;
    };

    println!("\n{}", state);
    match outcome {
        Outcome::Win(player) if player == options.human_player => println!("You win!"),
        Outcome::Win(player) => println!("{} wins.", player),
        Outcome::Draw => println!("Draw."),
    }

    Ok(())
}

fn read_action<I>(lines: &mut I, state: &GameState) -> Result<Action>
where
    I: Iterator<Item = io::Result<String>>,
{
    loop {
        print!("Your move (0-8): ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => bail!("Input closed before the game finished"),
        };

        match line.parse::<Action>() {
            Ok(action) if state.is_legal(&action) => return Ok(action),
            Ok(action) => println!("Cell {} is taken.", action),
            Err(err) => println!("{}", err),
        }
    }
}

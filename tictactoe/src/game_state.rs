use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use super::Action;

const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opponent(&self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

impl FromStr for Player {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "X" | "x" => Ok(Player::X),
            "O" | "o" => Ok(Player::O),
            _ => Err(anyhow!("Player must be X or O")),
        }
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Player::X => write!(f, "X"),
            Player::O => write!(f, "O"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Outcome {
    Win(Player),
    Draw,
}

impl Outcome {
    pub fn winner(&self) -> Option<Player> {
        match self {
            Outcome::Win(player) => Some(*player),
            Outcome::Draw => None,
        }
    }

    /// +1 for a win, -1 for a loss and 0 for a draw, as seen by `player`.
    pub fn score_for(&self, player: Player) -> f64 {
        match self {
            Outcome::Win(winner) if *winner == player => 1.0,
            Outcome::Win(_) => -1.0,
            Outcome::Draw => 0.0,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct GameState {
    board: [Option<Player>; 9],
    player_to_move: Player,
}

impl engine::GameState for GameState {
    fn initial() -> Self {
        GameState {
            board: [None; 9],
            player_to_move: Player::X,
        }
    }
}

impl GameState {
    /// Replays `cells` from the empty board, alternating marks starting with X.
    pub fn from_moves(cells: &[u8]) -> Self {
        cells.iter().fold(
            <Self as engine::GameState>::initial(),
            |state, cell| state.take_action(&Action(*cell)),
        )
    }

    pub fn board(&self) -> &[Option<Player>; 9] {
        &self.board
    }

    pub fn player_to_move(&self) -> Player {
        self.player_to_move
    }

    /// The player whose mark was placed last. On the empty board this is the one moving second.
    pub fn last_mover(&self) -> Player {
        self.player_to_move.opponent()
    }

    pub fn take_action(&self, action: &Action) -> Self {
        debug_assert!(self.board[action.cell()].is_none(), "cell is occupied");

        let mut board = self.board;
        board[action.cell()] = Some(self.player_to_move);

        Self {
            board,
            player_to_move: self.player_to_move.opponent(),
        }
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = u8> + '_ {
        self.board
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| i as u8)
    }

    pub fn is_legal(&self, action: &Action) -> bool {
        self.outcome().is_none() && matches!(self.board.get(action.cell()), Some(None))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        let winner = WINNING_LINES.iter().find_map(|[a, b, c]| {
            match (self.board[*a], self.board[*b], self.board[*c]) {
                (Some(x), Some(y), Some(z)) if x == y && y == z => Some(x),
                _ => None,
            }
        });

        match winner {
            Some(player) => Some(Outcome::Win(player)),
            None if self.board.iter().all(Option::is_some) => Some(Outcome::Draw),
            None => None,
        }
    }
}

impl Display for GameState {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for (row, cells) in self.board.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f, "---+---+---")?;
            }

            let cells: Vec<String> = cells
                .iter()
                .enumerate()
                .map(|(col, cell)| match cell {
                    Some(player) => player.to_string(),
                    None => (row * 3 + col).to_string(),
                })
                .collect();

            writeln!(f, " {} | {} | {}", cells[0], cells[1], cells[2])?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::GameState as GameStateTrait;

    #[test]
    fn test_initial_state_is_empty() {
        let state = GameState::initial();

        assert!(state.board().iter().all(Option::is_none));
        assert_eq!(state.player_to_move(), Player::X);
        assert_eq!(state.outcome(), None);
        assert_eq!(state.empty_cells().count(), 9);
    }

    #[test]
    fn test_take_action_switches_player() {
        let state = GameState::initial().take_action(&Action(4));

        assert_eq!(state.board()[4], Some(Player::X));
        assert_eq!(state.player_to_move(), Player::O);
        assert_eq!(state.last_mover(), Player::X);

        let state = state.take_action(&Action(0));

        assert_eq!(state.board()[0], Some(Player::O));
        assert_eq!(state.player_to_move(), Player::X);
    }

    #[test]
    fn test_take_action_leaves_original_untouched() {
        let state = GameState::initial();
        let next = state.take_action(&Action(2));

        assert_eq!(state, GameState::initial());
        assert_ne!(state, next);
    }

    #[test]
    fn test_row_win() {
        let state = GameState::from_moves(&[0, 3, 1, 4, 2]);

        assert_eq!(state.outcome(), Some(Outcome::Win(Player::X)));
    }

    #[test]
    fn test_column_win() {
        let state = GameState::from_moves(&[0, 1, 3, 4, 8, 7]);

        assert_eq!(state.outcome(), Some(Outcome::Win(Player::O)));
    }

    #[test]
    fn test_diagonal_win() {
        let state = GameState::from_moves(&[2, 0, 4, 1, 6]);

        assert_eq!(state.outcome(), Some(Outcome::Win(Player::X)));
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let state = GameState::from_moves(&[0, 1, 2, 4, 3, 5, 7, 6, 8]);

        assert_eq!(state.outcome(), Some(Outcome::Draw));
        assert_eq!(state.empty_cells().count(), 0);
    }

    #[test]
    fn test_is_legal() {
        let state = GameState::from_moves(&[4]);

        assert!(state.is_legal(&Action(0)));
        assert!(!state.is_legal(&Action(4)));
        assert!(!state.is_legal(&Action(9)));

        let won = GameState::from_moves(&[0, 3, 1, 4, 2]);
        assert!(!won.is_legal(&Action(8)));
    }

    #[test]
    fn test_score_for() {
        assert_eq!(Outcome::Win(Player::X).score_for(Player::X), 1.0);
        assert_eq!(Outcome::Win(Player::X).score_for(Player::O), -1.0);
        assert_eq!(Outcome::Draw.score_for(Player::O), 0.0);
    }

    #[test]
    fn test_parse_player() {
        assert_eq!("x".parse::<Player>().unwrap(), Player::X);
        assert_eq!("O\n".parse::<Player>().unwrap(), Player::O);
        assert!("Z".parse::<Player>().is_err());
    }

    #[test]
    fn test_display() {
        let state = GameState::from_moves(&[0, 4]);

        assert_eq!(
            state.to_string(),
            " X | 1 | 2\n---+---+---\n 3 | O | 5\n---+---+---\n 6 | 7 | 8\n"
        );
    }
}

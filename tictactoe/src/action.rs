use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// Places the mover's mark on a cell. Cells are numbered 0 to 8, row by row from the top left.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Action(pub u8);

impl Action {
    pub fn cell(&self) -> usize {
        self.0 as usize
    }
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cell: u8 = s.trim().parse()?;

        if cell > 8 {
            return Err(anyhow!("Cell number must be between 0 and 8"));
        }

        Ok(Action(cell))
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Statistics a selection strategy gets to see for a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStats {
    pub visits: usize,
    pub value: f64,
    pub average_value: f64,
}

/// Scores a visited candidate child. The child with the highest score is descended into.
///
/// Unvisited children never reach the strategy; they are always tried first.
pub trait SelectionStrategy {
    fn score(&self, candidate: &NodeStats, root: &NodeStats) -> f64;
}

impl<F> SelectionStrategy for F
where
    F: Fn(&NodeStats, &NodeStats) -> f64,
{
    fn score(&self, candidate: &NodeStats, root: &NodeStats) -> f64 {
        self(candidate, root)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct UCB1 {
    exploration_constant: f64,
}

impl UCB1 {
    pub fn new(exploration_constant: f64) -> Self {
        Self {
            exploration_constant,
        }
    }

    pub fn exploration_constant(&self) -> f64 {
        self.exploration_constant
    }
}

impl Default for UCB1 {
    fn default() -> Self {
        Self {
            exploration_constant: 2.0,
        }
    }
}

impl SelectionStrategy for UCB1 {
    #[allow(non_snake_case)]
    fn score(&self, candidate: &NodeStats, root: &NodeStats) -> f64 {
        let Nsa = candidate.visits as f64;
        let Nr = root.visits as f64;

        candidate.average_value + self.exploration_constant * (Nr.ln() / Nsa).sqrt()
    }
}

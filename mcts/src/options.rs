#[derive(Clone, Debug)]
pub struct MCTSOptions {
    pub(crate) flip_sign: bool,
    pub(crate) best_candidate_threshold: f64,
}

impl MCTSOptions {
    /// `flip_sign` negates the propagated value at every hop toward the root, which suits
    /// alternating two player domains whose rollouts are scored for the player who moved last.
    ///
    /// `best_candidate_threshold` is how close to the top average value a root child must be
    /// to be picked as the best result.
    pub fn new(flip_sign: bool, best_candidate_threshold: f64) -> Self {
        MCTSOptions {
            flip_sign,
            best_candidate_threshold,
        }
    }

    pub fn flip_sign(&self) -> bool {
        self.flip_sign
    }

    pub fn best_candidate_threshold(&self) -> f64 {
        self.best_candidate_threshold
    }
}

impl Default for MCTSOptions {
    fn default() -> Self {
        Self {
            flip_sign: false,
            best_candidate_threshold: 0.1,
        }
    }
}

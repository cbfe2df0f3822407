/// The contract a decision domain implements so it can be searched.
///
/// The search never inspects an `Action`; it only hands it back to `take_action`
/// and reports it in results.
pub trait GameEngine {
    type Action;
    type State;

    /// All legal actions from `game_state`, in a stable order.
    fn possible_actions(&self, game_state: &Self::State) -> Vec<Self::Action>;

    /// Produces the successor state. Must not mutate `game_state`.
    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State;

    fn is_terminal_state(&self, game_state: &Self::State) -> bool;

    /// Plays out from `game_state` to a terminal state and scores the outcome relative to
    /// `reference_state`. Must terminate with probability 1.
    fn simulate(&self, game_state: &Self::State, reference_state: &Self::State) -> f64;
}

use common::div_or_zero;
use engine::GameEngine;
use generational_arena::Index;

use crate::NodeStats;

/// One state in the search tree.
///
/// Children are owned by the tree's arena and referenced by index. The parent link is a plain
/// index as well and is only followed during backpropagation.
#[derive(Debug)]
pub struct MCTSNode<S, A> {
    state: S,
    action: Option<A>,
    parent: Option<Index>,
    children: Vec<Index>,
    visits: usize,
    value: f64,
    average_value: f64,
    was_expanded: bool,
}

impl<S, A> MCTSNode<S, A> {
    pub fn new_root(state: S) -> Self {
        Self::new(state, None, None)
    }

    pub fn new_child(state: S, action: A, parent: Index) -> Self {
        Self::new(state, Some(action), Some(parent))
    }

    fn new(state: S, action: Option<A>, parent: Option<Index>) -> Self {
        Self {
            state,
            action,
            parent,
            children: Vec::new(),
            visits: 0,
            value: 0.0,
            average_value: 0.0,
            was_expanded: false,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// The action that produced this node from its parent. `None` for a root.
    pub fn action(&self) -> Option<&A> {
        self.action.as_ref()
    }

    pub fn parent(&self) -> Option<Index> {
        self.parent
    }

    pub fn children(&self) -> &[Index] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn visits(&self) -> usize {
        self.visits
    }

    pub fn was_visited(&self) -> bool {
        self.visits > 0
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn average_value(&self) -> f64 {
        self.average_value
    }

    pub fn was_expanded(&self) -> bool {
        self.was_expanded
    }

    pub fn stats(&self) -> NodeStats {
        NodeStats {
            visits: self.visits,
            value: self.value,
            average_value: self.average_value,
        }
    }

    /// Adds to the running totals. Ancestors are left untouched.
    pub fn update(&mut self, value: f64, visits: usize) {
        self.value += value;
        self.visits += visits;
        self.average_value = div_or_zero(self.value, self.visits as f64);
    }

    pub fn is_terminal<E>(&self, game_engine: &E) -> bool
    where
        E: GameEngine<State = S, Action = A>,
    {
        game_engine.is_terminal_state(&self.state)
    }

    pub fn simulate<E>(&self, game_engine: &E, reference_state: &S) -> f64
    where
        E: GameEngine<State = S, Action = A>,
    {
        game_engine.simulate(&self.state, reference_state)
    }

    pub(crate) fn push_child(&mut self, child: Index) {
        self.children.push(child);
    }

    pub(crate) fn remove_child(&mut self, child: Index) {
        self.children.retain(|c| *c != child);
    }

    pub(crate) fn mark_expanded(&mut self) {
        self.was_expanded = true;
    }

    /// Turns the node into a root: no parent and no producing action.
    pub(crate) fn detach(&mut self) {
        self.parent = None;
        self.action = None;
    }

    #[cfg(test)]
    pub(crate) fn set_stats(&mut self, value: f64, visits: usize) {
        self.value = value;
        self.visits = visits;
        self.average_value = div_or_zero(value, visits as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn node() -> MCTSNode<u32, u32> {
        MCTSNode::new_root(7)
    }

    #[test]
    fn test_new_root_has_no_information() {
        let node = node();

        assert_eq!(node.visits(), 0);
        assert_eq!(node.value(), 0.0);
        assert_eq!(node.average_value(), 0.0);
        assert!(node.parent().is_none());
        assert!(node.action().is_none());
        assert!(node.is_leaf());
        assert!(!node.was_expanded());
        assert!(!node.was_visited());
    }

    #[test]
    fn test_update_computes_average() {
        let mut node = node();

        node.update(5.0, 2);

        assert_eq!(node.visits(), 2);
        assert_approx_eq!(node.value(), 5.0);
        assert_approx_eq!(node.average_value(), 2.5);
    }

    #[test]
    fn test_update_averages_cumulative_totals() {
        let mut node = node();

        node.update(5.0, 2);
        node.update(0.0, 3_123_321);

        assert_eq!(node.visits(), 3_123_323);
        assert_approx_eq!(node.value(), 5.0);
        assert_approx_eq!(node.average_value(), 5.0 / 3_123_323.0);
    }

    #[test]
    fn test_update_with_negative_value() {
        let mut node = node();

        node.update(-3.0, 1);
        node.update(1.0, 1);

        assert_approx_eq!(node.average_value(), -1.0);
    }

    #[test]
    fn test_update_with_zero_visits_keeps_average_at_zero() {
        let mut node = node();

        node.update(4.0, 0);

        assert_eq!(node.average_value(), 0.0);
    }

    #[test]
    fn test_detach_clears_parent_and_action() {
        let mut arena = generational_arena::Arena::new();
        let parent = arena.insert(());
        let mut child: MCTSNode<u32, u32> = MCTSNode::new_child(8, 3, parent);
        child.update(2.0, 1);

        child.detach();

        assert!(child.parent().is_none());
        assert!(child.action().is_none());
        assert_eq!(child.visits(), 1);
        assert_eq!(child.state(), &8);
    }

    #[test]
    fn test_stats_snapshot() {
        let mut node = node();
        node.update(3.0, 4);

        let stats = node.stats();

        assert_eq!(stats.visits, 4);
        assert_approx_eq!(stats.value, 3.0);
        assert_approx_eq!(stats.average_value, 0.75);
    }
}

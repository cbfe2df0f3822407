use std::cmp::Ordering;
use std::collections::VecDeque;

use engine::GameEngine;
use generational_arena::{Arena, Index};
use itertools::Itertools;
use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::{MCTSNode, MCTSOptions, NodeDetails, SearchResults, SelectionStrategy};

/// The search tree. Nodes live in an arena and refer to each other by index, so the parent
/// back-reference never owns anything.
#[derive(Debug)]
pub struct SearchTree<S, A> {
    arena: Arena<MCTSNode<S, A>>,
    root: Index,
}

impl<S, A> SearchTree<S, A> {
    pub fn new(state: S) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(MCTSNode::new_root(state));

        Self { arena, root }
    }

    pub fn root_index(&self) -> Index {
        self.root
    }

    pub fn root(&self) -> &MCTSNode<S, A> {
        &self.arena[self.root]
    }

    pub fn get(&self, index: Index) -> Option<&MCTSNode<S, A>> {
        self.arena.get(index)
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Creates a child for every possible action, in the order the engine returned them.
    ///
    /// No-op when the node was already expanded or its state is terminal.
    pub fn expand<E>(&mut self, index: Index, game_engine: &E)
    where
        E: GameEngine<State = S, Action = A>,
    {
        let node = &self.arena[index];
        if node.was_expanded() || node.is_terminal(game_engine) {
            return;
        }

        let children: Vec<_> = game_engine
            .possible_actions(node.state())
            .into_iter()
            .map(|action| {
                let state = game_engine.take_action(node.state(), &action);
                MCTSNode::new_child(state, action, index)
            })
            .collect();

        for child in children {
            let child_index = self.arena.insert(child);
            self.arena[index].push_child(child_index);
        }

        self.arena[index].mark_expanded();
    }

    /// Picks the child to descend into. Unvisited children always win, otherwise the children
    /// with the top strategy score are candidates. Ties are broken uniformly at random.
    pub fn find_next_to_visit<Sel, R>(
        &self,
        children: &[Index],
        selection_strategy: &Sel,
        rng: &mut R,
    ) -> Option<Index>
    where
        Sel: SelectionStrategy + ?Sized,
        R: Rng + ?Sized,
    {
        let not_visited: Vec<Index> = children
            .iter()
            .copied()
            .filter(|c| !self.arena[*c].was_visited())
            .collect();

        if !not_visited.is_empty() {
            return not_visited.choose(rng).copied();
        }

        let root_stats = self.root().stats();
        let scores: Vec<(Index, f64)> = children
            .iter()
            .map(|c| (*c, selection_strategy.score(&self.arena[*c].stats(), &root_stats)))
            .collect();

        let max_score = scores
            .iter()
            .map(|(_, score)| *score)
            .fold(f64::NEG_INFINITY, f64::max);

        let best: Vec<Index> = scores
            .iter()
            .filter(|(_, score)| *score == max_score)
            .map(|(c, _)| *c)
            .collect();

        // Only reachable when every score is NaN.
        best.choose(rng)
            .or_else(|| children.choose(rng))
            .copied()
    }

    /// Descends from `index` until a leaf is reached.
    pub fn select<Sel, R>(&self, index: Index, selection_strategy: &Sel, rng: &mut R) -> Index
    where
        Sel: SelectionStrategy + ?Sized,
        R: Rng + ?Sized,
    {
        let mut current = index;

        while let Some(next) =
            self.find_next_to_visit(self.arena[current].children(), selection_strategy, rng)
        {
            current = next;
        }

        current
    }

    /// Adds `value` and `visits` to `index` and every ancestor up to the root.
    pub fn backpropagate(&mut self, index: Index, value: f64, visits: usize, flip_sign: bool) {
        let mut current = Some(index);
        let mut value = value;

        while let Some(node_index) = current {
            let node = &mut self.arena[node_index];
            node.update(value, visits);

            if flip_sign {
                value = -value;
            }

            current = node.parent();
        }
    }

    /// Runs one select, expand, simulate, backpropagate pass. Returns the simulated node.
    pub fn iterate<E, Sel, R>(
        &mut self,
        game_engine: &E,
        selection_strategy: &Sel,
        options: &MCTSOptions,
        rng: &mut R,
    ) -> Index
    where
        E: GameEngine<State = S, Action = A>,
        Sel: SelectionStrategy + ?Sized,
        R: Rng + ?Sized,
    {
        let mut index = self.select(self.root, selection_strategy, rng);
        trace!(
            "Selected {:?} with {} visits",
            index,
            self.arena[index].visits()
        );

        let node = &self.arena[index];
        if node.was_visited() && !node.is_terminal(game_engine) {
            self.expand(index, game_engine);

            if let Some(child) = self.arena[index].children().choose(rng) {
                index = *child;
            }
        }

        let value = self.arena[index].simulate(game_engine, self.root().state());
        trace!("Simulated {:?} with value {}", index, value);

        self.backpropagate(index, value, 1, options.flip_sign);

        index
    }

    /// Breadth first search for a node holding `state`, starting at the root.
    pub fn find_node(&self, state: &S) -> Option<Index>
    where
        S: PartialEq,
    {
        let mut queue = VecDeque::from([self.root]);

        while let Some(index) = queue.pop_front() {
            let node = &self.arena[index];
            if node.state() == state {
                return Some(index);
            }

            queue.extend(node.children().iter().copied());
        }

        None
    }

    /// Makes the node holding `state` the new root, keeping its subtree and dropping everything
    /// else. When no node holds `state` the whole tree is replaced by a fresh root.
    ///
    /// Returns whether an existing subtree was reused.
    pub fn update_root_state(&mut self, state: S) -> bool
    where
        S: PartialEq,
    {
        match self.find_node(&state) {
            Some(index) => {
                self.promote_to_root(index);
                true
            }
            None => {
                *self = Self::new(state);
                false
            }
        }
    }

    /// Ranks the root's children by average value and picks the recommendation uniformly among
    /// those within `threshold` of the top. `None` when the root has no children.
    pub fn results<R>(&self, threshold: f64, rng: &mut R) -> Option<SearchResults<S, A>>
    where
        S: Clone,
        A: Clone,
        R: Rng + ?Sized,
    {
        let root = self.root();

        let ranked: Vec<&MCTSNode<S, A>> = root
            .children()
            .iter()
            .map(|c| &self.arena[*c])
            .sorted_by(|l, r| {
                r.average_value()
                    .partial_cmp(&l.average_value())
                    .unwrap_or(Ordering::Equal)
            })
            .collect();

        let top = *ranked.first()?;
        let max_average_value = top.average_value();

        let candidates: Vec<&MCTSNode<S, A>> = ranked
            .iter()
            .copied()
            .filter(|n| (max_average_value - n.average_value()).abs() < threshold)
            .collect();

        let best = candidates.choose(rng).copied().unwrap_or(top);

        Some(SearchResults {
            visits: root.visits(),
            children: ranked.into_iter().map(NodeDetails::from_node).collect(),
            best: NodeDetails::from_node(best),
        })
    }

    pub fn details(&self, index: Index) -> Option<NodeDetails<S, A>>
    where
        S: Clone,
        A: Clone,
    {
        self.arena.get(index).map(NodeDetails::from_node)
    }

    fn promote_to_root(&mut self, index: Index) {
        if index == self.root {
            return;
        }

        if let Some(parent) = self.arena[index].parent() {
            self.arena[parent].remove_child(index);
        }

        self.arena[index].detach();

        let previous_root = std::mem::replace(&mut self.root, index);
        self.remove_subtree(previous_root);
    }

    fn remove_subtree(&mut self, index: Index) {
        let mut stack = vec![index];

        while let Some(index) = stack.pop() {
            if let Some(node) = self.arena.remove(index) {
                stack.extend(node.children().iter().copied());
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn get_mut(&mut self, index: Index) -> &mut MCTSNode<S, A> {
        &mut self.arena[index]
    }

    #[cfg(test)]
    pub(crate) fn add_child(&mut self, parent: Index, state: S, action: A) -> Index {
        let child = self.arena.insert(MCTSNode::new_child(state, action, parent));
        self.arena[parent].push_child(child);
        self.arena[parent].mark_expanded();
        child
    }
}

use std::fmt::{self, Debug, Display, Formatter};

use crate::MCTSNode;

/// Snapshot of a single node's statistics, detached from the tree.
#[derive(Clone, PartialEq)]
pub struct NodeDetails<S, A> {
    pub action: Option<A>,
    pub state: S,
    pub visits: usize,
    pub value: f64,
    pub average_value: f64,
}

impl<S, A> NodeDetails<S, A>
where
    S: Clone,
    A: Clone,
{
    pub fn from_node(node: &MCTSNode<S, A>) -> Self {
        Self {
            action: node.action().cloned(),
            state: node.state().clone(),
            visits: node.visits(),
            value: node.value(),
            average_value: node.average_value(),
        }
    }
}

impl<S, A: Display> Display for NodeDetails<S, A> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.action {
            Some(action) => write!(f, "A: {}, ", action)?,
            None => write!(f, "A: -, ")?,
        }

        write!(
            f,
            "N: {visits}, W: {value:.3}, Q: {average_value:.3}",
            visits = self.visits,
            value = self.value,
            average_value = self.average_value,
        )
    }
}

impl<S, A: Display> Debug for NodeDetails<S, A> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// Outcome of a search: every child of the root ranked by average value, plus the child chosen
/// as the recommendation.
#[derive(Clone, PartialEq)]
pub struct SearchResults<S, A> {
    pub visits: usize,
    pub children: Vec<NodeDetails<S, A>>,
    pub best: NodeDetails<S, A>,
}

impl<S, A> SearchResults<S, A> {
    /// The action leading to the recommended child.
    pub fn best_action(&self) -> Option<&A> {
        self.best.action.as_ref()
    }
}

impl<S, A: Display> Display for SearchResults<S, A> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let children = self
            .children
            .iter()
            .fold(String::new(), |acc, child| acc + &format!("\n\t({}),", child));

        write!(
            f,
            "V: {visits}, Best: ({best}), Children: [{children}]",
            visits = self.visits,
            best = self.best,
            children = children
        )
    }
}

impl<S, A: Display> Debug for SearchResults<S, A> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(action: Option<u8>, visits: usize, value: f64) -> NodeDetails<(), u8> {
        NodeDetails {
            action,
            state: (),
            visits,
            value,
            average_value: value / visits as f64,
        }
    }

    #[test]
    fn test_node_details_display() {
        let details = details(Some(4), 4, 3.0);

        assert_eq!(details.to_string(), "A: 4, N: 4, W: 3.000, Q: 0.750");
    }

    #[test]
    fn test_root_details_display() {
        let details = details(None, 2, 1.0);

        assert_eq!(details.to_string(), "A: -, N: 2, W: 1.000, Q: 0.500");
    }

    #[test]
    fn test_best_action() {
        let best = details(Some(2), 1, 1.0);
        let results = SearchResults {
            visits: 3,
            children: vec![best.clone(), details(Some(1), 2, 0.0)],
            best,
        };

        assert_eq!(results.best_action(), Some(&2));
    }
}

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use crossbeam::channel;
use engine::GameEngine;
use log::{debug, info, warn};
use parking_lot::Mutex;
use rand::thread_rng;

use crate::{MCTSOptions, NodeDetails, SearchResults, SearchTree, SelectionStrategy, UCB1};

const STOPPED: usize = 0;

/// A background Monte Carlo tree search over any `GameEngine`.
///
/// Every run executes on its own worker thread. The tree sits behind a mutex that the worker
/// takes for exactly one iteration, so `results`, `root_metrics` and `stop` can be called from
/// any thread while a run is in progress.
pub struct MCTS<E: GameEngine, Sel = UCB1> {
    shared: Arc<SharedSearch<E, Sel>>,
    next_run: AtomicUsize,
}

struct SharedSearch<E: GameEngine, Sel> {
    game_engine: E,
    selection_strategy: Sel,
    options: MCTSOptions,
    tree: Mutex<SearchTree<E::State, E::Action>>,
    active_run: AtomicUsize,
    discarded: AtomicBool,
    // Dropping the sender wakes the pending deadline timer of a time bounded run.
    timer_cancel: Mutex<Option<channel::Sender<()>>>,
}

impl<E> MCTS<E, UCB1>
where
    E: GameEngine + Send + Sync + 'static,
    E::State: PartialEq + Clone + Send + 'static,
    E::Action: Clone + Send + 'static,
{
    pub fn new(initial_state: E::State, game_engine: E) -> Self {
        Self::with_strategy(
            initial_state,
            game_engine,
            UCB1::default(),
            MCTSOptions::default(),
        )
    }
}

impl<E, Sel> MCTS<E, Sel>
where
    E: GameEngine + Send + Sync + 'static,
    E::State: PartialEq + Clone + Send + 'static,
    E::Action: Clone + Send + 'static,
    Sel: SelectionStrategy + Send + Sync + 'static,
{
    pub fn with_strategy(
        initial_state: E::State,
        game_engine: E,
        selection_strategy: Sel,
        options: MCTSOptions,
    ) -> Self {
        Self {
            shared: Arc::new(SharedSearch {
                game_engine,
                selection_strategy,
                options,
                tree: Mutex::new(SearchTree::new(initial_state)),
                active_run: AtomicUsize::new(STOPPED),
                discarded: AtomicBool::new(false),
                timer_cancel: Mutex::new(None),
            }),
            next_run: AtomicUsize::new(1),
        }
    }

    /// Searches until `duration` elapses or `stop` is called. `on_complete` runs on a timer
    /// thread at the deadline, and only if this run is still the active one by then. A stop
    /// wakes the timer right away and `on_complete` is dropped without being called.
    pub fn start_time<F>(&self, duration: Duration, on_complete: F) -> Result<()>
    where
        F: FnOnce(Option<SearchResults<E::State, E::Action>>) + Send + 'static,
    {
        let (cancel_sender, cancel_receiver) = channel::bounded::<()>(0);
        let run_id = self.begin_run(Some(cancel_sender))?;
        debug!("Starting run {} for {:?}", run_id, duration);

        let worker = Arc::clone(&self.shared);
        thread::spawn(move || {
            worker.run(run_id, None);
        });

        let timer = Arc::downgrade(&self.shared);
        thread::spawn(move || {
            channel::select! {
                recv(cancel_receiver) -> _ => {
                    debug!("Timer of run {} cancelled", run_id);
                    return;
                },
                recv(channel::after(duration)) -> _ => {}
            }

            let Some(shared) = timer.upgrade() else {
                return;
            };

            if shared.finish_run(run_id) {
                shared.deliver(run_id, on_complete);
            }
        });

        Ok(())
    }

    /// Runs `iterations` iterations, fewer if stopped first, then calls `on_complete` on the
    /// worker thread.
    pub fn start_iterations<F>(&self, iterations: usize, on_complete: F) -> Result<()>
    where
        F: FnOnce(Option<SearchResults<E::State, E::Action>>) + Send + 'static,
    {
        let run_id = self.begin_run(None)?;
        debug!("Starting run {} for {} iterations", run_id, iterations);

        let worker = Arc::clone(&self.shared);
        thread::spawn(move || {
            worker.run(run_id, Some(iterations));
            worker.finish_run(run_id);
            worker.deliver(run_id, on_complete);
        });

        Ok(())
    }

    /// Blocks until the time bounded search completes.
    pub fn search_time(
        &self,
        duration: Duration,
    ) -> Result<Option<SearchResults<E::State, E::Action>>> {
        let (sender, receiver) = channel::bounded(1);

        self.start_time(duration, move |results| {
            let _ = sender.send(results);
        })?;

        receiver
            .recv()
            .map_err(|_| anyhow!("The search was stopped before its deadline"))
    }

    /// Blocks until the iteration bounded search completes.
    pub fn search_iterations(
        &self,
        iterations: usize,
    ) -> Result<Option<SearchResults<E::State, E::Action>>> {
        let (sender, receiver) = channel::bounded(1);

        self.start_iterations(iterations, move |results| {
            let _ = sender.send(results);
        })?;

        receiver
            .recv()
            .map_err(|_| anyhow!("The search ended without delivering results"))
    }

    /// Reuses the subtree rooted at `state` if the tree contains it. Returns whether it did.
    pub fn update_root_state(&self, state: E::State) -> Result<bool> {
        let mut tree = self.shared.tree.lock();

        if self.is_running() {
            warn!("Rejected root update while a search is running");
            bail!("Cannot update the root state while the search is running");
        }

        let reused = tree.update_root_state(state);
        debug!(
            "Root updated, reused subtree: {}, root visits: {}",
            reused,
            tree.root().visits()
        );

        Ok(reused)
    }

    pub fn results(&self) -> Option<SearchResults<E::State, E::Action>> {
        self.shared.results()
    }

    pub fn root_metrics(&self) -> NodeDetails<E::State, E::Action> {
        NodeDetails::from_node(self.shared.tree.lock().root())
    }

    fn begin_run(&self, timer_cancel: Option<channel::Sender<()>>) -> Result<usize> {
        if self.is_running() {
            warn!("Rejected start while a search is running");
            bail!("The search is already running");
        }

        self.shared.prepare_root()?;

        let run_id = self.next_run.fetch_add(1, Ordering::SeqCst);

        // Held across the swap so a concurrent stop can't miss this run's timer.
        let mut cancel = self.shared.timer_cancel.lock();
        if self
            .shared
            .active_run
            .compare_exchange(STOPPED, run_id, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Rejected start while a search is running");
            bail!("The search is already running");
        }
        *cancel = timer_cancel;

        Ok(run_id)
    }

    #[cfg(test)]
    pub(crate) fn run_loop(&self, run_id: usize, iterations: Option<usize>) -> usize {
        self.shared.run(run_id, iterations)
    }

    #[cfg(test)]
    pub(crate) fn game_engine(&self) -> &E {
        &self.shared.game_engine
    }

    #[cfg(test)]
    pub(crate) fn with_tree<T>(&self, f: impl FnOnce(&SearchTree<E::State, E::Action>) -> T) -> T {
        f(&self.shared.tree.lock())
    }
}

impl<E: GameEngine, Sel> MCTS<E, Sel> {
    /// Stops the active run, if any. Safe to call at any time.
    pub fn stop(&self) {
        let mut cancel = self.shared.timer_cancel.lock();
        self.shared.active_run.store(STOPPED, Ordering::SeqCst);
        cancel.take();
    }

    pub fn is_running(&self) -> bool {
        self.shared.active_run.load(Ordering::SeqCst) != STOPPED
    }
}

impl<E: GameEngine, Sel> Drop for MCTS<E, Sel> {
    fn drop(&mut self) {
        self.shared.discarded.store(true, Ordering::SeqCst);
        self.stop();
    }
}

impl<E, Sel> SharedSearch<E, Sel>
where
    E: GameEngine,
    E::State: PartialEq + Clone,
    E::Action: Clone,
    Sel: SelectionStrategy,
{
    /// Iterates while `run_id` is the active run, up to `iterations` when given.
    fn run(&self, run_id: usize, iterations: Option<usize>) -> usize {
        let mut rng = thread_rng();
        let mut completed = 0;

        while iterations.map_or(true, |limit| completed < limit) {
            let mut tree = self.tree.lock();

            if self.active_run.load(Ordering::SeqCst) != run_id {
                break;
            }

            if completed == 0 {
                let root = tree.root_index();
                tree.expand(root, &self.game_engine);
            }

            tree.iterate(
                &self.game_engine,
                &self.selection_strategy,
                &self.options,
                &mut rng,
            );

            completed += 1;
        }

        debug!("Run {} completed {} iterations", run_id, completed);

        completed
    }

    /// Moves `run_id` to stopped. False when it was no longer the active run.
    fn finish_run(&self, run_id: usize) -> bool {
        self.active_run
            .compare_exchange(run_id, STOPPED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Expands the root so a run always starts from a root with children, unless it is
    /// terminal. A non-terminal root without actions can't be searched.
    fn prepare_root(&self) -> Result<()> {
        let mut tree = self.tree.lock();
        let root = tree.root_index();
        tree.expand(root, &self.game_engine);

        let root = tree.root();
        if root.is_leaf() && !root.is_terminal(&self.game_engine) {
            bail!("The root state is not terminal but has no possible actions");
        }

        Ok(())
    }

    /// Calls `on_complete` with the current results unless the engine was dropped.
    fn deliver<F>(&self, run_id: usize, on_complete: F)
    where
        F: FnOnce(Option<SearchResults<E::State, E::Action>>),
    {
        if self.discarded.load(Ordering::SeqCst) {
            debug!("Run {} discarded, skipping completion", run_id);
            return;
        }

        let results = self.results();
        match &results {
            Some(results) => info!(
                "Run {} finished with {} root visits over {} children, best visited {} times with average {:.3}",
                run_id,
                results.visits,
                results.children.len(),
                results.best.visits,
                results.best.average_value
            ),
            None => info!("Run {} finished without results", run_id),
        }

        on_complete(results);
    }

    fn results(&self) -> Option<SearchResults<E::State, E::Action>> {
        self.tree
            .lock()
            .results(self.options.best_candidate_threshold, &mut thread_rng())
    }
}

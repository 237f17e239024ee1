use std::sync::{Arc, atomic::AtomicBool};

use super::{
    is_cancelled,
    state::{DeltaBatch, Status, TraversalState},
};
use crate::maze::{Coord, Maze};

/// A cell on the current search path and the neighbors still to try from it.
struct Frame {
    coord: Coord,
    neighbors: std::vec::IntoIter<Coord>,
}

/// Depth-first search driven one step at a time.
///
/// Every call to `next` visits or backtracks exactly one cell and yields the
/// resulting changes. Once the goal is reached the search stops and the path
/// leading to it stays `Visiting`.
pub struct DfsSolver {
    state: TraversalState,
    /// Current search path, from the start cell to the most recently entered cell
    stack: Vec<Frame>,
    /// Cell to enter on the next step
    pending: Option<Coord>,
    cancel: Option<Arc<AtomicBool>>,
    done: bool,
}

impl DfsSolver {
    /// # Panics
    /// If `start` or `goal` lies outside the maze.
    pub fn new(maze: Arc<Maze>, start: Coord, goal: Coord) -> Self {
        assert!(
            maze.is_in_bounds(start),
            "start {:?} is out of bounds",
            start
        );
        Self {
            state: TraversalState::new(maze, goal),
            stack: Vec::new(),
            pending: Some(start),
            cancel: None,
            done: false,
        }
    }

    /// Stops the search at the next step once `cancel` is set.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    pub fn is_solved(&self) -> bool {
        self.state.is_solved()
    }

    /// The cells from start to goal, once the goal has been reached.
    pub fn path(&self) -> Option<Vec<Coord>> {
        self.is_solved()
            .then(|| self.stack.iter().map(|frame| frame.coord).collect())
    }
}

impl Iterator for DfsSolver {
    type Item = DeltaBatch;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if is_cancelled(self.cancel.as_deref()) {
            tracing::debug!("[dfs] cancelled with {} cells on the path", self.stack.len());
            self.done = true;
            return None;
        }

        loop {
            if let Some(coord) = self.pending.take() {
                self.state.visit(coord);
                let neighbors = if self.state.is_solved() {
                    tracing::debug!("[dfs] reached goal {:?}", coord);
                    self.done = true;
                    Vec::new()
                } else {
                    self.state.next_unvisited_neighbors(coord)
                };
                self.stack.push(Frame {
                    coord,
                    neighbors: neighbors.into_iter(),
                });
                return Some(self.state.drain_processed());
            }

            let Some(frame) = self.stack.last_mut() else {
                tracing::debug!("[dfs] search exhausted without reaching the goal");
                self.done = true;
                return None;
            };

            // A neighbor may have been reached through another branch since this frame was entered
            let state = &self.state;
            match frame
                .neighbors
                .find(|&n| state.status(n) == Status::NotVisited)
            {
                Some(next) => self.pending = Some(next),
                None => {
                    let coord = frame.coord;
                    self.stack.pop();
                    self.state.backtrack(coord);
                    return Some(self.state.drain_processed());
                }
            }
        }
    }
}

impl std::iter::FusedIterator for DfsSolver {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::generate_maze;

    /// (0,0) -> (0,1) -> (0,2), with a dead end (0,1) -> (1,1)
    fn branching() -> Arc<Maze> {
        let mut maze = Maze::new(2, 3);
        maze.carve((0, 0), (0, 1));
        maze.carve((0, 1), (1, 1));
        maze.carve((0, 1), (0, 2));
        Arc::new(maze)
    }

    #[test]
    fn test_explores_in_link_order_and_backtracks_dead_ends() {
        let mut solver = DfsSolver::new(branching(), (0, 0), (0, 2));
        let steps = solver.by_ref().collect::<Vec<_>>();
        assert_eq!(
            steps,
            vec![
                vec![((0, 0), Status::Visiting)],
                vec![((0, 1), Status::Visiting)],
                vec![((1, 1), Status::Visiting)],
                vec![((1, 1), Status::Backtracked)],
                vec![((0, 2), Status::Visiting)],
            ]
        );
        assert!(solver.is_solved());
        assert_eq!(solver.path(), Some(vec![(0, 0), (0, 1), (0, 2)]));
        assert_eq!(solver.state().status((0, 1)), Status::Visiting);
        assert_eq!(solver.next(), None);
    }

    #[test]
    fn test_unreachable_goal_ends_unsolved() {
        // (1,2) has no passages
        let mut solver = DfsSolver::new(branching(), (0, 0), (1, 2));
        let steps = solver.by_ref().count();
        // Four cells visited then backtracked
        assert_eq!(steps, 8);
        assert!(!solver.is_solved());
        assert_eq!(solver.path(), None);
        assert_eq!(solver.state().count(Status::Backtracked), 4);
        assert_eq!(solver.state().status((1, 2)), Status::NotVisited);
    }

    #[test]
    fn test_start_is_goal() {
        let mut solver = DfsSolver::new(branching(), (0, 1), (0, 1));
        assert_eq!(solver.next(), Some(vec![((0, 1), Status::Visiting)]));
        assert_eq!(solver.next(), None);
        assert_eq!(solver.path(), Some(vec![(0, 1)]));
    }

    #[test]
    fn test_statuses_never_revert() {
        let maze = Arc::new(generate_maze(15, 20, Some(9)));
        let goal = maze.goal();
        let mut seen = crate::maze::Grid::new(15, 20, Status::NotVisited);
        for batch in DfsSolver::new(maze, (0, 0), goal) {
            assert_eq!(batch.len(), 1);
            for (coord, status) in batch {
                let expected = match seen[coord] {
                    Status::NotVisited => Status::Visiting,
                    Status::Visiting => Status::Backtracked,
                    Status::Backtracked => panic!("{:?} changed after backtracking", coord),
                };
                assert_eq!(status, expected);
                seen[coord] = status;
            }
        }
        assert_eq!(seen[goal], Status::Visiting);
    }

    #[test]
    fn test_cancelled_run_yields_nothing_more() {
        let cancel = Arc::new(AtomicBool::new(false));
        let maze = Arc::new(generate_maze(10, 10, Some(4)));
        let goal = maze.goal();
        let mut solver = DfsSolver::new(maze, (0, 0), goal).with_cancel(cancel.clone());
        assert!(solver.next().is_some());
        cancel.store(true, std::sync::atomic::Ordering::Relaxed);
        assert_eq!(solver.next(), None);
        assert_eq!(solver.next(), None);
        assert!(!solver.is_solved());
    }
}

use std::{
    collections::VecDeque,
    sync::{Arc, atomic::AtomicBool},
};

use super::{
    is_cancelled,
    state::{DeltaBatch, TraversalState},
};
use crate::maze::{Coord, Grid, Maze};

/// Breadth-first search driven one step at a time.
///
/// Each step dequeues and visits one cell. The step after the goal is
/// visited marks the shortest path, goal first, as `Backtracked` in a
/// single batch and ends the search.
pub struct BfsSolver {
    state: TraversalState,
    start: Coord,
    queue: VecDeque<Coord>,
    /// Cell each discovered cell was reached from
    parents: Grid<Option<Coord>>,
    path: Option<Vec<Coord>>,
    cancel: Option<Arc<AtomicBool>>,
    done: bool,
}

impl BfsSolver {
    /// # Panics
    /// If `start` or `goal` lies outside the maze.
    pub fn new(maze: Arc<Maze>, start: Coord, goal: Coord) -> Self {
        assert!(
            maze.is_in_bounds(start),
            "start {:?} is out of bounds",
            start
        );
        let parents = Grid::new(maze.rows(), maze.cols(), None);
        Self {
            state: TraversalState::new(maze, goal),
            start,
            queue: VecDeque::from([start]),
            parents,
            path: None,
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

    /// The shortest path from start to goal, once it has been marked.
    pub fn path(&self) -> Option<Vec<Coord>> {
        self.path.clone()
    }

    fn is_discovered(&self, coord: Coord) -> bool {
        coord == self.start || self.parents[coord].is_some()
    }

    /// Marks the path from goal back to start and returns it in start-to-goal order.
    fn mark_path(&mut self) -> Vec<Coord> {
        let mut current = self.state.goal();
        let mut trace = vec![current];
        while let Some(parent) = self.parents[current] {
            trace.push(parent);
            current = parent;
        }
        trace.iter().for_each(|&coord| self.state.backtrack(coord));
        trace.reverse();
        trace
    }
}

impl Iterator for BfsSolver {
    type Item = DeltaBatch;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if is_cancelled(self.cancel.as_deref()) {
            tracing::debug!("[bfs] cancelled with {} cells queued", self.queue.len());
            self.done = true;
            return None;
        }

        if self.state.is_solved() {
            let path = self.mark_path();
            tracing::debug!("[bfs] marked path of {} cells", path.len());
            self.path = Some(path);
            self.done = true;
            return Some(self.state.drain_processed());
        }

        let Some(coord) = self.queue.pop_front() else {
            tracing::debug!("[bfs] queue exhausted without reaching the goal");
            self.done = true;
            return None;
        };

        self.state.visit(coord);
        if !self.state.is_solved() {
            for next in self.state.next_unvisited_neighbors(coord) {
                if self.is_discovered(next) {
                    continue;
                }
                self.parents[next] = Some(coord);
                self.queue.push_back(next);
            }
        }
        Some(self.state.drain_processed())
    }
}

impl std::iter::FusedIterator for BfsSolver {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::state::Status;

    /// 2x3 maze with two routes from (0,0) to (1,2): along the top row, or
    /// down then along the bottom row. Not a perfect maze.
    fn two_routes() -> Arc<Maze> {
        let mut maze = Maze::new(2, 3);
        maze.carve((0, 0), (0, 1));
        maze.carve((0, 1), (0, 2));
        maze.carve((0, 2), (1, 2));
        maze.carve((0, 0), (1, 0));
        maze.carve((1, 0), (1, 1));
        maze.carve((1, 1), (1, 2));
        Arc::new(maze)
    }

    #[test]
    fn test_visits_in_level_order_then_marks_path() {
        let mut solver = BfsSolver::new(two_routes(), (0, 0), (1, 2));
        let steps = solver.by_ref().collect::<Vec<_>>();
        assert_eq!(
            steps,
            vec![
                vec![((0, 0), Status::Visiting)],
                vec![((0, 1), Status::Visiting)],
                vec![((1, 0), Status::Visiting)],
                vec![((0, 2), Status::Visiting)],
                vec![((1, 1), Status::Visiting)],
                vec![((1, 2), Status::Visiting)],
                vec![
                    ((1, 2), Status::Backtracked),
                    ((0, 2), Status::Backtracked),
                    ((0, 1), Status::Backtracked),
                    ((0, 0), Status::Backtracked),
                ],
            ]
        );
        assert!(solver.is_solved());
        assert_eq!(solver.path(), Some(vec![(0, 0), (0, 1), (0, 2), (1, 2)]));
        assert_eq!(solver.state().status((1, 1)), Status::Visiting);
    }

    #[test]
    fn test_stops_as_soon_as_goal_is_visited() {
        let mut solver = BfsSolver::new(two_routes(), (0, 0), (1, 0));
        let visits = solver
            .by_ref()
            .flatten()
            .filter(|&(_, s)| s == Status::Visiting)
            .count();
        assert_eq!(visits, 3);
        assert_eq!(solver.path(), Some(vec![(0, 0), (1, 0)]));
    }

    #[test]
    fn test_unreachable_goal_ends_unsolved() {
        let mut maze = Maze::new(2, 2);
        maze.carve((0, 0), (0, 1));
        let mut solver = BfsSolver::new(Arc::new(maze), (0, 0), (1, 1));
        assert_eq!(solver.by_ref().count(), 2);
        assert!(!solver.is_solved());
        assert_eq!(solver.path(), None);
    }

    #[test]
    fn test_start_is_goal() {
        let mut solver = BfsSolver::new(two_routes(), (0, 0), (0, 0));
        assert_eq!(solver.next(), Some(vec![((0, 0), Status::Visiting)]));
        assert_eq!(solver.next(), Some(vec![((0, 0), Status::Backtracked)]));
        assert_eq!(solver.next(), None);
        assert_eq!(solver.path(), Some(vec![(0, 0)]));
    }

    #[test]
    fn test_full_exploration_queues_every_cell_once() {
        // (1,2) is reachable from both (0,2) and (1,1) at the same depth
        let mut solver = BfsSolver::new(two_routes(), (0, 0), (1, 2));
        let visited = solver
            .by_ref()
            .flatten()
            .filter(|&(_, s)| s == Status::Visiting)
            .count();
        assert_eq!(visited, 6);
    }
}

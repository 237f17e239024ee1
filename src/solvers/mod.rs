use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

pub mod bfs;
pub mod dfs;
pub mod state;

pub use bfs::BfsSolver;
pub use dfs::DfsSolver;
pub use state::{DeltaBatch, Status, TraversalState};

use crate::maze::{Coord, Maze};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solver {
    Dfs,
    Bfs,
}

impl Solver {
    pub const ALL: [Solver; 2] = [Solver::Dfs, Solver::Bfs];
}

impl std::fmt::Display for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Solver::Dfs => write!(f, "Depth-First Search (DFS)"),
            Solver::Bfs => write!(f, "Breadth-First Search (BFS)"),
        }
    }
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

/// A single-use solve of either kind, yielding one delta batch per step.
pub enum SolveRun {
    Dfs(DfsSolver),
    Bfs(BfsSolver),
}

impl SolveRun {
    pub fn solver(&self) -> Solver {
        match self {
            SolveRun::Dfs(_) => Solver::Dfs,
            SolveRun::Bfs(_) => Solver::Bfs,
        }
    }

    pub fn with_cancel(self, cancel: Arc<AtomicBool>) -> Self {
        match self {
            SolveRun::Dfs(s) => SolveRun::Dfs(s.with_cancel(cancel)),
            SolveRun::Bfs(s) => SolveRun::Bfs(s.with_cancel(cancel)),
        }
    }

    pub fn state(&self) -> &TraversalState {
        match self {
            SolveRun::Dfs(s) => s.state(),
            SolveRun::Bfs(s) => s.state(),
        }
    }

    pub fn is_solved(&self) -> bool {
        self.state().is_solved()
    }

    pub fn path(&self) -> Option<Vec<Coord>> {
        match self {
            SolveRun::Dfs(s) => s.path(),
            SolveRun::Bfs(s) => s.path(),
        }
    }
}

impl Iterator for SolveRun {
    type Item = DeltaBatch;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            SolveRun::Dfs(s) => s.next(),
            SolveRun::Bfs(s) => s.next(),
        }
    }
}

impl std::iter::FusedIterator for SolveRun {}

/// Depth-first solve from the top-left cell to `goal`.
pub fn solve_dfs(maze: Arc<Maze>, goal: Coord) -> DfsSolver {
    let start = maze.start();
    DfsSolver::new(maze, start, goal)
}

/// Breadth-first solve from the top-left cell to `goal`.
pub fn solve_bfs(maze: Arc<Maze>, goal: Coord) -> BfsSolver {
    let start = maze.start();
    BfsSolver::new(maze, start, goal)
}

pub fn solve_maze(maze: Arc<Maze>, solver: Solver, start: Coord, goal: Coord) -> SolveRun {
    match solver {
        Solver::Dfs => SolveRun::Dfs(DfsSolver::new(maze, start, goal)),
        Solver::Bfs => SolveRun::Bfs(BfsSolver::new(maze, start, goal)),
    }
}

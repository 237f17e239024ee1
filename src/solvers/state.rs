use std::sync::Arc;

use crate::maze::{Coord, Grid, Maze};

/// Search status of a single cell during a solve.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Not reached by the search yet.
    #[default]
    NotVisited,
    /// Reached and still on the search frontier or the current path.
    Visiting,
    /// Fully explored without leading to the goal (DFS), or part of the
    /// reconstructed solution path (BFS).
    Backtracked,
}

/// Status changes produced by one solver step, in the order they happened.
pub type DeltaBatch = Vec<(Coord, Status)>;

/// Per-run search state shared by the solvers: the status of every cell and
/// the changes made since the renderer last drained them.
#[derive(Debug, Clone)]
pub struct TraversalState {
    maze: Arc<Maze>,
    statuses: Grid<Status>,
    goal: Coord,
    processed: DeltaBatch,
}

impl TraversalState {
    /// # Panics
    /// If `goal` lies outside the maze.
    pub fn new(maze: Arc<Maze>, goal: Coord) -> Self {
        assert!(
            maze.is_in_bounds(goal),
            "goal {:?} is out of bounds for a {}x{} maze",
            goal,
            maze.rows(),
            maze.cols()
        );
        let statuses = Grid::new(maze.rows(), maze.cols(), Status::NotVisited);
        Self {
            maze,
            statuses,
            goal,
            processed: Vec::new(),
        }
    }

    pub fn goal(&self) -> Coord {
        self.goal
    }

    pub fn status(&self, coord: Coord) -> Status {
        self.statuses[coord]
    }

    pub fn visit(&mut self, coord: Coord) {
        debug_assert_eq!(self.statuses[coord], Status::NotVisited, "{:?} visited twice", coord);
        self.set(coord, Status::Visiting);
    }

    pub fn backtrack(&mut self, coord: Coord) {
        debug_assert_eq!(
            self.statuses[coord],
            Status::Visiting,
            "{:?} backtracked before being visited",
            coord
        );
        self.set(coord, Status::Backtracked);
    }

    fn set(&mut self, coord: Coord, status: Status) {
        self.statuses[coord] = status;
        self.processed.push((coord, status));
    }

    /// Whether the goal has been discovered.
    ///
    /// DFS leaves a found goal as `Visiting`. BFS promotes it to `Backtracked`
    /// when it marks the solution path, which still counts as solved.
    pub fn is_solved(&self) -> bool {
        self.statuses[self.goal] != Status::NotVisited
    }

    /// Cells sharing a passage with `coord` that the search has not reached yet.
    pub fn next_unvisited_neighbors(&self, coord: Coord) -> Vec<Coord> {
        self.maze
            .links(coord)
            .filter(|&c| self.statuses[c] == Status::NotVisited)
            .collect()
    }

    /// Returns the changes made since the previous drain and clears them.
    pub fn drain_processed(&mut self) -> DeltaBatch {
        std::mem::take(&mut self.processed)
    }

    /// Number of cells currently in the given status.
    pub fn count(&self, status: Status) -> usize {
        self.statuses.iter().filter(|&(_, &s)| s == status).count()
    }
}

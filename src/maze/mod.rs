pub mod cell;
pub mod grid;

pub use cell::Cell;
pub use grid::Grid;

/// Cell coordinate as `(row, col)`.
pub type Coord = (u8, u8);

/// Number of rows in the default maze.
pub const ROWS: u8 = 40;
/// Number of columns in the default maze.
pub const COLS: u8 = 60;

/// A rectangular maze. Passages are recorded in the direction they were carved.
#[derive(Debug, Clone, PartialEq)]
pub struct Maze {
    cells: Grid<Cell>,
}

impl Maze {
    /// Creates a maze with no passages.
    pub fn new(rows: u8, cols: u8) -> Self {
        Maze {
            cells: Grid::new(rows, cols, Cell::default()),
        }
    }

    pub fn rows(&self) -> u8 {
        self.cells.rows()
    }

    pub fn cols(&self) -> u8 {
        self.cells.cols()
    }

    /// Checks if the maze has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of cells in the maze.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// The top-left cell, where carving and solving start.
    pub fn start(&self) -> Coord {
        (0, 0)
    }

    /// The bottom-right cell.
    pub fn goal(&self) -> Coord {
        (self.rows().saturating_sub(1), self.cols().saturating_sub(1))
    }

    pub fn is_in_bounds(&self, coord: Coord) -> bool {
        self.cells.is_in_bounds(coord)
    }

    /// Get the grid neighbors of a cell, whether or not a passage leads to them.
    /// Neighbors are listed up, down, right, left, skipping those outside the maze.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        let in_bounds = self.is_in_bounds(coord);
        let (row, col) = coord;
        [
            // NOTE: Going below zero wraps to u8::MAX and going above saturates at u8::MAX.
            // Neither can be in bounds, as the largest index possible is u8::MAX - 1.
            (row.wrapping_sub(1), col),
            (row.saturating_add(1), col),
            (row, col.saturating_add(1)),
            (row, col.wrapping_sub(1)),
        ]
        .into_iter()
        .filter(move |&c| in_bounds && self.is_in_bounds(c))
    }

    /// Records a passage carved from `from` into `to`.
    ///
    /// # Panics
    /// If either coordinate is out of bounds.
    pub fn carve(&mut self, from: Coord, to: Coord) {
        debug_assert!(
            from.0.abs_diff(to.0) + from.1.abs_diff(to.1) == 1,
            "cannot carve between non-adjacent cells {:?} and {:?}",
            from,
            to
        );
        self.cells[from].adjacency.push(to);
        self.cells[to].inbound.push(from);
    }

    pub fn mark_visited(&mut self, coord: Coord) {
        self.cells[coord].visited = true;
    }

    pub fn is_visited(&self, coord: Coord) -> bool {
        self.cells[coord].is_visited()
    }

    /// Passages carved from the given cell.
    pub fn adjacency(&self, coord: Coord) -> &[Coord] {
        self.cells[coord].adjacency()
    }

    /// Cells that carved a passage into the given cell.
    pub fn inbound(&self, coord: Coord) -> &[Coord] {
        self.cells[coord].inbound()
    }

    /// Every cell sharing a passage with the given cell, in either direction.
    pub fn links(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        self.cells[coord].links()
    }

    /// Iterates over every carved passage as `(from, to)`.
    pub fn passages(&self) -> impl Iterator<Item = (Coord, Coord)> + '_ {
        self.cells
            .iter()
            .flat_map(|(from, cell)| cell.adjacency().iter().map(move |&to| (from, to)))
    }

    pub fn passage_count(&self) -> usize {
        self.cells.iter().map(|(_, cell)| cell.adjacency().len()).sum()
    }

    /// Removes every passage and clears the generation marks.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::default());
    }
}

impl std::ops::Index<Coord> for Maze {
    type Output = Cell;

    fn index(&self, index: Coord) -> &Self::Output {
        &self.cells[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_order() {
        let maze = Maze::new(3, 3);
        let neighbors = maze.neighbors((1, 1)).collect::<Vec<_>>();
        assert_eq!(neighbors, vec![(0, 1), (2, 1), (1, 2), (1, 0)]);
    }

    #[test]
    fn test_neighbors_at_corners() {
        let maze = Maze::new(3, 4);
        assert_eq!(maze.neighbors((0, 0)).collect::<Vec<_>>(), vec![(1, 0), (0, 1)]);
        assert_eq!(maze.neighbors((2, 3)).collect::<Vec<_>>(), vec![(1, 3), (2, 2)]);
    }

    #[test]
    fn test_neighbors_out_of_bounds() {
        let maze = Maze::new(3, 3);
        assert_eq!(maze.neighbors((3, 1)).count(), 0);
        let maze = Maze::new(u8::MAX, 1);
        assert_eq!(maze.neighbors((u8::MAX - 1, 0)).collect::<Vec<_>>(), vec![(253, 0)]);
    }

    #[test]
    fn test_carve_is_directed() {
        let mut maze = Maze::new(2, 2);
        maze.carve((0, 0), (0, 1));
        assert_eq!(maze.adjacency((0, 0)), &[(0, 1)]);
        assert!(maze.adjacency((0, 1)).is_empty());
        assert_eq!(maze.inbound((0, 1)), &[(0, 0)]);
        assert_eq!(maze.passage_count(), 1);
        assert_eq!(maze.passages().collect::<Vec<_>>(), vec![((0, 0), (0, 1))]);
    }

    #[test]
    fn test_links_cover_both_directions() {
        let mut maze = Maze::new(2, 2);
        maze.carve((0, 0), (0, 1));
        maze.carve((0, 1), (1, 1));
        assert_eq!(maze.links((0, 1)).collect::<Vec<_>>(), vec![(1, 1), (0, 0)]);
        assert!(maze[(1, 1)].is_open_to((0, 1)));
        assert!(!maze[(1, 1)].is_open_to((1, 0)));
    }

    #[test]
    fn test_reset_clears_passages() {
        let mut maze = Maze::new(2, 2);
        maze.mark_visited((0, 0));
        maze.carve((0, 0), (1, 0));
        maze.reset();
        assert_eq!(maze.passage_count(), 0);
        assert!(!maze.is_visited((0, 0)));
        assert!(maze.inbound((1, 0)).is_empty());
    }

    #[test]
    fn test_start_and_goal() {
        let maze = Maze::new(ROWS, COLS);
        assert_eq!(maze.start(), (0, 0));
        assert_eq!(maze.goal(), (ROWS - 1, COLS - 1));
        assert_eq!(maze.len(), ROWS as usize * COLS as usize);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_carve_out_of_bounds_panics() {
        let mut maze = Maze::new(2, 2);
        maze.carve((1, 1), (1, 2));
    }
}

use super::Coord;

/// Row-major storage holding one value per maze cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    data: Box<[T]>,
    rows: u8,
    cols: u8,
}

impl<T: Clone> Grid<T> {
    pub fn new(rows: u8, cols: u8, value: T) -> Self {
        let data = vec![value; rows as usize * cols as usize].into_boxed_slice();
        Grid { data, rows, cols }
    }

    /// Overwrites every cell with `value`.
    pub fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|cell| *cell = value.clone());
    }
}

impl<T> Grid<T> {
    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_in_bounds(&self, coord: Coord) -> bool {
        coord.0 < self.rows && coord.1 < self.cols
    }

    fn ravel_index(&self, coord: Coord) -> usize {
        if !self.is_in_bounds(coord) {
            panic!(
                "coordinate {:?} is out of bounds for a {}x{} grid",
                coord, self.rows, self.cols
            );
        }
        coord.0 as usize * self.cols as usize + coord.1 as usize
    }

    /// Iterates over all cells in row-major order together with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &T)> {
        let cols = self.cols as usize;
        self.data.iter().enumerate().map(move |(i, value)| {
            // Both parts fit in u8 since rows and cols do
            (((i / cols) as u8, (i % cols) as u8), value)
        })
    }
}

impl<T> std::ops::Index<Coord> for Grid<T> {
    type Output = T;

    fn index(&self, index: Coord) -> &Self::Output {
        &self.data[self.ravel_index(index)]
    }
}

impl<T> std::ops::IndexMut<Coord> for Grid<T> {
    fn index_mut(&mut self, index: Coord) -> &mut Self::Output {
        let idx = self.ravel_index(index);
        &mut self.data[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_indexing() {
        let mut grid = Grid::new(3, 4, 0u8);
        grid[(2, 3)] = 7;
        assert_eq!(grid[(2, 3)], 7);
        assert_eq!(grid[(1, 0)], 0);
        assert_eq!(grid.len(), 12);
    }

    #[test]
    fn test_iter_is_row_major() {
        let grid = Grid::new(2, 3, ());
        let coords = grid.iter().map(|(c, _)| c).collect::<Vec<_>>();
        assert_eq!(coords, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
    }

    #[test]
    fn test_fill() {
        let mut grid = Grid::new(2, 2, 1u32);
        grid[(1, 1)] = 9;
        grid.fill(3);
        assert!(grid.iter().all(|(_, &v)| v == 3));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_out_of_bounds_panics() {
        let grid = Grid::new(2, 2, 0u8);
        let _ = grid[(0, 2)];
    }
}

use super::Coord;

/// A single maze cell and the passages carved through it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    /// Set once the generator has reached this cell. Meaningless after generation.
    pub(super) visited: bool,
    /// Cells reachable through passages carved from this cell, in carving order.
    pub(super) adjacency: Vec<Coord>,
    /// Cells that carved a passage into this cell.
    pub(super) inbound: Vec<Coord>,
}

impl Cell {
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    /// Passages carved from this cell, in the order they were carved.
    pub fn adjacency(&self) -> &[Coord] {
        &self.adjacency
    }

    /// Cells whose passage leads into this cell.
    pub fn inbound(&self) -> &[Coord] {
        &self.inbound
    }

    /// Every cell sharing an open passage with this one, regardless of carving direction.
    /// Outgoing passages come first, in carving order.
    pub fn links(&self) -> impl Iterator<Item = Coord> + '_ {
        self.adjacency.iter().chain(self.inbound.iter()).copied()
    }

    pub fn is_open_to(&self, other: Coord) -> bool {
        self.links().any(|c| c == other)
    }
}

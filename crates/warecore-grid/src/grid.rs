//! The static warehouse grid: cell types, facility placement, and
//! per-cell agent occupancy.

use crate::geometry::{Direction, Position};
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};
use warecore_ids::{AgentId, GateId, RackId, StationId, WarehouseError, WarehouseResult};

/// A reference to the facility occupying a cell, if any.
#[derive(
    Archive, Deserialize, Serialize, SerdeDeserialize, SerdeSerialize,
    Clone, Copy, PartialEq, Eq, Debug,
)]
pub enum Facility {
    Rack(RackId),
    Gate(GateId),
    Station(StationId),
}

/// The static type of a grid cell, fixed at initialisation time.
#[derive(
    Archive, Deserialize, Serialize, SerdeDeserialize, SerdeSerialize,
    Clone, Copy, PartialEq, Eq, Debug, Default,
)]
pub enum CellType {
    #[default]
    Empty,
    Obstacle,
    Rack,
    Gate,
    Station,
}

/// A single cell of the warehouse grid.
#[derive(Archive, Deserialize, Serialize, Clone, Debug, Default)]
pub struct GridCell {
    pub cell_type: CellType,
    pub facility: Option<Facility>,
    /// The agent physically occupying this cell right now, if any.
    pub current_agent: Option<AgentId>,
}

impl GridCell {
    pub fn is_passable(&self) -> bool {
        self.cell_type != CellType::Obstacle
    }
}

/// The static 2-D cell matrix of the warehouse (§4.1).
#[derive(Clone, Debug)]
pub struct WarehouseGrid {
    rows: u32,
    cols: u32,
    cells: Vec<GridCell>,
}

impl WarehouseGrid {
    pub fn new(rows: u32, cols: u32) -> WarehouseResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(WarehouseError::InvalidDimensions(format!(
                "grid must be non-empty, got {rows}x{cols}"
            )));
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![GridCell::default(); (rows * cols) as usize],
        })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.row < self.rows && pos.col < self.cols {
            Some((pos.row * self.cols + pos.col) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Bounds-checked cell access (§4.1 `cell_at`).
    pub fn cell_at(&self, pos: Position) -> Option<&GridCell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub fn cell_at_mut(&mut self, pos: Position) -> Option<&mut GridCell> {
        self.index(pos).map(move |i| &mut self.cells[i])
    }

    pub fn set_cell_type(&mut self, pos: Position, cell_type: CellType) -> WarehouseResult<()> {
        let idx = self
            .index(pos)
            .ok_or_else(|| WarehouseError::InvalidDimensions(format!("{pos} out of bounds")))?;
        self.cells[idx].cell_type = cell_type;
        Ok(())
    }

    pub fn place_facility(&mut self, pos: Position, facility: Facility) -> WarehouseResult<()> {
        let idx = self
            .index(pos)
            .ok_or_else(|| WarehouseError::InvalidDimensions(format!("{pos} out of bounds")))?;
        if self.cells[idx].facility.is_some() {
            return Err(WarehouseError::InvalidState(format!(
                "cell {pos} already holds a facility"
            )));
        }
        self.cells[idx].facility = Some(facility);
        Ok(())
    }

    /// ±1 in the four cardinal directions (§4.1 `neighbor`).
    pub fn neighbor(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let row = pos.row as i64 + dr;
        let col = pos.col as i64 + dc;
        if row < 0 || col < 0 {
            return None;
        }
        let candidate = Position::new(row as u32, col as u32);
        self.in_bounds(candidate).then_some(candidate)
    }

    /// The cell you'd have to be standing in, facing `dir`, to reach
    /// `pos` with one MOVE (§4.1 `inverse_neighbor`).
    pub fn inverse_neighbor(&self, pos: Position, dir: Direction) -> Option<Position> {
        self.neighbor(pos, dir.opposite())
    }

    pub fn set_agent(&mut self, pos: Position, agent: Option<AgentId>) -> WarehouseResult<()> {
        let idx = self
            .index(pos)
            .ok_or_else(|| WarehouseError::InvalidDimensions(format!("{pos} out of bounds")))?;
        self.cells[idx].current_agent = agent;
        Ok(())
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| Position::new(row, col)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_at_bounds_checked() {
        let grid = WarehouseGrid::new(3, 3).unwrap();
        assert!(grid.cell_at(Position::new(2, 2)).is_some());
        assert!(grid.cell_at(Position::new(3, 0)).is_none());
    }

    #[test]
    fn test_neighbor_respects_bounds() {
        let grid = WarehouseGrid::new(3, 3).unwrap();
        assert_eq!(grid.neighbor(Position::new(0, 0), Direction::Up), None);
        assert_eq!(
            grid.neighbor(Position::new(0, 0), Direction::Right),
            Some(Position::new(0, 1))
        );
    }

    #[test]
    fn test_inverse_neighbor_round_trips() {
        let grid = WarehouseGrid::new(5, 5).unwrap();
        let pos = Position::new(2, 2);
        for dir in Direction::ALL {
            if let Some(n) = grid.neighbor(pos, dir) {
                assert_eq!(grid.inverse_neighbor(n, dir), Some(pos));
            }
        }
    }

    #[test]
    fn test_place_facility_rejects_duplicate() {
        let mut grid = WarehouseGrid::new(2, 2).unwrap();
        let pos = Position::new(0, 0);
        grid.place_facility(pos, Facility::Gate(GateId::new(0))).unwrap();
        assert!(grid.place_facility(pos, Facility::Rack(RackId::new(0))).is_err());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(WarehouseGrid::new(0, 5).is_err());
    }
}

//! Per-facility distance fields, computed once at warehouse
//! initialisation and read-only thereafter (§4.2).

use crate::geometry::{Direction, Position};
use crate::grid::WarehouseGrid;
use std::collections::VecDeque;

/// `D_F(pos)`: the minimum number of moves from `pos` to the facility F
/// this guide map was built for, treating obstacles and other facility
/// cells as impassable. `None` means unreachable.
#[derive(Clone, Debug)]
pub struct GuideMap {
    rows: u32,
    cols: u32,
    distances: Vec<Option<u32>>,
    source: Position,
}

impl GuideMap {
    /// Reverse BFS from `source` over the static grid. A cell is passable
    /// for this walk iff it is not an obstacle, and either carries no
    /// facility or is `source` itself.
    pub fn compute(grid: &WarehouseGrid, source: Position) -> Self {
        let rows = grid.rows();
        let cols = grid.cols();
        let mut distances = vec![None; (rows * cols) as usize];
        let idx = |p: Position| (p.row * cols + p.col) as usize;

        distances[idx(source)] = Some(0);
        let mut queue = VecDeque::new();
        queue.push_back(source);

        while let Some(cur) = queue.pop_front() {
            let cur_dist = distances[idx(cur)].unwrap();
            for dir in Direction::ALL {
                let Some(next) = grid.neighbor(cur, dir) else {
                    continue;
                };
                if distances[idx(next)].is_some() {
                    continue;
                }
                let Some(cell) = grid.cell_at(next) else {
                    continue;
                };
                if !cell.is_passable() {
                    continue;
                }
                if cell.facility.is_some() && next != source {
                    continue;
                }
                distances[idx(next)] = Some(cur_dist + 1);
                queue.push_back(next);
            }
        }

        Self { rows, cols, distances, source }
    }

    pub fn distance(&self, pos: Position) -> Option<u32> {
        if pos.row >= self.rows || pos.col >= self.cols {
            return None;
        }
        self.distances[(pos.row * self.cols + pos.col) as usize]
    }

    pub fn is_reachable(&self, pos: Position) -> bool {
        self.distance(pos).is_some()
    }

    pub fn source(&self) -> Position {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellType, Facility};
    use warecore_ids::GateId;

    fn open_grid(rows: u32, cols: u32) -> WarehouseGrid {
        WarehouseGrid::new(rows, cols).unwrap()
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let grid = open_grid(3, 3);
        let gm = GuideMap::compute(&grid, Position::new(1, 1));
        assert_eq!(gm.distance(Position::new(1, 1)), Some(0));
    }

    #[test]
    fn test_distance_grows_by_exactly_one_between_neighbours() {
        let grid = open_grid(5, 5);
        let source = Position::new(0, 0);
        let gm = GuideMap::compute(&grid, source);
        for pos in grid.positions() {
            let Some(d) = gm.distance(pos) else { continue };
            for dir in Direction::ALL {
                if let Some(n) = grid.neighbor(pos, dir) {
                    if let Some(dn) = gm.distance(n) {
                        assert!(dn == d + 1 || dn + 1 == d || dn == d);
                    }
                }
            }
        }
    }

    #[test]
    fn test_obstacle_blocks_path() {
        let mut grid = open_grid(1, 3);
        grid.set_cell_type(Position::new(0, 1), CellType::Obstacle).unwrap();
        let gm = GuideMap::compute(&grid, Position::new(0, 0));
        assert_eq!(gm.distance(Position::new(0, 2)), None);
    }

    #[test]
    fn test_other_facility_cells_are_blocked_except_source() {
        let mut grid = open_grid(1, 3);
        grid.set_cell_type(Position::new(0, 0), CellType::Gate).unwrap();
        grid.place_facility(Position::new(0, 0), Facility::Gate(GateId::new(0))).unwrap();
        grid.set_cell_type(Position::new(0, 2), CellType::Gate).unwrap();
        grid.place_facility(Position::new(0, 2), Facility::Gate(GateId::new(1))).unwrap();

        let gm = GuideMap::compute(&grid, Position::new(0, 0));
        // The far gate cell is a different facility - unreachable.
        assert_eq!(gm.distance(Position::new(0, 2)), None);
        // But the middle aisle cell between them is fine.
        assert_eq!(gm.distance(Position::new(0, 1)), Some(1));
    }
}

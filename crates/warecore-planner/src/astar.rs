//! Space-time A* plan generation (§4.5.1).

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use warecore_entities::{Action, Agent};
use warecore_grid::{Direction, Facility, Position, ReservationTimeline, WarehouseGrid};
use warecore_ids::{AgentId, Tick};

/// A search-node on the open list, ordered by ascending `f = g + h` with
/// ties broken towards lower `g` (mirrors the teacher's reversed
/// `BinaryHeap` ordering: the heap is a max-heap, so we compare the
/// other way round to make it behave like a min-heap).
#[derive(Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f: u32,
    g: u32,
    pos: Position,
    dir: Direction,
    tick: Tick,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.cmp(&self.f).then_with(|| other.g.cmp(&self.g))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Clone, Copy)]
struct ParentLink {
    pos: Position,
    dir: Direction,
    tick: Tick,
    action: Action,
}

/// A successful plan: the primitive action list and the (position, tick)
/// reservation each action consumes, in lockstep (§4.5.1, §4.5.3).
pub struct Plan {
    pub actions: VecDeque<Action>,
    pub reservations: VecDeque<(Position, Tick)>,
}

/// Priorities of every other agent currently known to the planner,
/// looked up by id so the search never needs the whole agent table.
pub trait PriorityLookup {
    fn priority_of(&self, agent: AgentId) -> Option<u32>;
}

impl PriorityLookup for HashMap<AgentId, Agent> {
    fn priority_of(&self, agent: AgentId) -> Option<u32> {
        self.get(&agent).map(|a| a.priority)
    }
}

/// Search a path from `agent`'s current pose to `target`, against the
/// static grid and the live reservation timeline. Does not mutate the
/// timeline; the caller commits the returned `reservations` (see
/// `warecore-planner::commit`).
pub fn plan(
    grid: &WarehouseGrid,
    timeline: &ReservationTimeline,
    priorities: &impl PriorityLookup,
    agent: &Agent,
    target: Position,
    now: Tick,
) -> Option<Plan> {
    let start_pos = agent.position;
    let start_dir = agent.direction;
    let my_priority = agent.priority;

    if start_pos == target {
        return Some(Plan {
            actions: VecDeque::new(),
            reservations: VecDeque::new(),
        });
    }

    let rows = grid.rows();
    let cols = grid.cols();
    let cell_index = |p: Position, d: Direction| -> usize {
        ((p.row * cols + p.col) as usize) * 4 + d.index()
    };

    let mut closed = vec![false; (rows * cols) as usize * 4];
    let mut parents: Vec<Option<ParentLink>> = vec![None; (rows * cols) as usize * 4];

    let is_facility_passable = |pos: Position| -> bool {
        let Some(cell) = grid.cell_at(pos) else {
            return false;
        };
        match cell.facility {
            None => true,
            Some(Facility::Rack(rid)) if agent.carrying == Some(rid) => true,
            Some(_) => pos == start_pos || pos == target,
        }
    };

    let is_timeline_clear = |pos: Position, tick: Tick| -> bool {
        match timeline.scheduled_at(pos, tick) {
            None => true,
            Some(holder) if holder == agent.id => true,
            Some(holder) => priorities.priority_of(holder).map(|p| p > my_priority).unwrap_or(true),
        }
    };

    let mut open = BinaryHeap::new();
    open.push(OpenEntry {
        f: start_pos.manhattan_distance(&target),
        g: 0,
        pos: start_pos,
        dir: start_dir,
        tick: now,
    });

    let mut goal: Option<(Position, Direction, Tick)> = None;

    while let Some(entry) = open.pop() {
        let idx = cell_index(entry.pos, entry.dir);
        if closed[idx] {
            continue;
        }
        closed[idx] = true;

        if entry.pos == target {
            goal = Some((entry.pos, entry.dir, entry.tick));
            break;
        }

        let next_tick = entry.tick.succ();
        let candidates = [
            (grid.neighbor(entry.pos, entry.dir), entry.dir, Action::Move),
            (Some(entry.pos), entry.dir.rotate_right(), Action::RotateRight),
            (Some(entry.pos), entry.dir.rotate_left(), Action::RotateLeft),
        ];

        for (next_pos, next_dir, action) in candidates {
            let Some(next_pos) = next_pos else { continue };
            let next_idx = cell_index(next_pos, next_dir);
            if closed[next_idx] {
                continue;
            }
            let Some(cell) = grid.cell_at(next_pos) else { continue };
            if !cell.is_passable() {
                continue;
            }
            if !is_facility_passable(next_pos) {
                continue;
            }
            if !is_timeline_clear(next_pos, next_tick) {
                continue;
            }

            let g = entry.g + 1;
            let h = next_pos.manhattan_distance(&target);
            parents[next_idx] = Some(ParentLink {
                pos: entry.pos,
                dir: entry.dir,
                tick: entry.tick,
                action,
            });
            open.push(OpenEntry {
                f: g + h,
                g,
                pos: next_pos,
                dir: next_dir,
                tick: next_tick,
            });
        }
    }

    let (mut pos, mut dir, mut tick) = goal?;
    let mut actions = VecDeque::new();
    let mut reservations = VecDeque::new();

    loop {
        let idx = cell_index(pos, dir);
        let Some(link) = parents[idx] else { break };
        actions.push_front(link.action);
        reservations.push_front((pos, tick));
        pos = link.pos;
        dir = link.dir;
        tick = link.tick;
    }

    Some(Plan { actions, reservations })
}

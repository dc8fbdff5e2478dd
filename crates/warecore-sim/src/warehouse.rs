//! The `Warehouse`: a single owned struct holding every entity map, id
//! generator, and policy the tick loop and its collaborators need (see
//! DESIGN.md's entity-ownership note). All cross-entity references are
//! resolved through stable numeric ids into these maps, never through
//! owning references in both directions.

use std::collections::{HashMap, VecDeque};

use warecore_config::{validate_scenario, FieldPath, ValidationError, ValidationErrorKind, WarehouseConfig};
use warecore_dispatcher::DistanceField;
use warecore_entities::{Agent, AgentStatus, Gate, Order, Station, Task};
use warecore_grid::{CellType, Direction, Facility, GuideMap, Position, ReservationTimeline, WarehouseGrid};
use warecore_ids::{
    AgentId, GateId, IdGenerator, ItemId, OrderId, RackId, StationId, TaskId, Tick, WarehouseError,
    WarehouseResult,
};
use warecore_metrics::EventLogWriter;
use warecore_planner::SlideTarget;
use warecore_storage::{inventory, Item, ItemCatalog, Rack};

use crate::policy_set::PolicySet;

/// All simulation state. Owned by the tick loop (or, once an external
/// transport exists, behind the single world `Mutex` §5 describes).
pub struct Warehouse {
    pub tick: Tick,
    pub grid: WarehouseGrid,
    pub timeline: ReservationTimeline,

    pub agents: HashMap<AgentId, Agent>,
    pub racks: HashMap<RackId, Rack>,
    pub gates: HashMap<GateId, Gate>,
    pub stations: HashMap<StationId, Station>,
    pub orders: HashMap<OrderId, Order>,
    pub tasks: HashMap<TaskId, Task>,

    /// Read-only directory mapping external string ids <-> typed ids and
    /// each item's static unit weight, built once at `Initialise` time.
    /// The live, mutating per-item ledger (`total`/`reserved`/`stored_in`)
    /// lives separately in `items` below so the dispatcher can borrow the
    /// two independently (see DESIGN.md: `catalog`/`items` split).
    pub catalog: ItemCatalog,
    pub items: HashMap<ItemId, Item>,

    pub agent_ids: IdGenerator<AgentId>,
    pub rack_ids: IdGenerator<RackId>,
    pub gate_ids: IdGenerator<GateId>,
    pub station_ids: IdGenerator<StationId>,
    pub order_ids: IdGenerator<OrderId>,
    pub task_ids: IdGenerator<TaskId>,

    pub rack_by_string: HashMap<String, RackId>,
    pub gate_by_string: HashMap<String, GateId>,
    pub order_by_external: HashMap<String, OrderId>,

    /// §4.2: one guide map per gate and per rack, computed once here and
    /// read-only thereafter.
    pub gate_guides: HashMap<GateId, GuideMap>,
    pub rack_guides: HashMap<RackId, GuideMap>,

    pub pending_orders: VecDeque<OrderId>,
    pub ready_agents: Vec<AgentId>,

    pub policies: PolicySet,
    pub events: EventLogWriter,
}

impl Warehouse {
    /// §6 `Initialise`: validate `config`, then build a fresh `Warehouse`
    /// from it. Returns every validation error found rather than the
    /// first, matching `validate_scenario`'s "see the whole picture"
    /// contract.
    pub fn from_config(config: &WarehouseConfig) -> Result<Self, Vec<ValidationError>> {
        let errors = validate_scenario(config);
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut grid = WarehouseGrid::new(config.dimensions.rows, config.dimensions.cols)
            .expect("validated dimensions are non-zero");
        for obstacle in &config.obstacles {
            let _ = grid.set_cell_type(Position::new(obstacle.row, obstacle.col), CellType::Obstacle);
        }

        let mut catalog = ItemCatalog::new();
        let mut items = HashMap::new();
        let mut item_ids: IdGenerator<ItemId> = IdGenerator::new();
        for item_cfg in &config.items {
            let id = item_ids.next();
            let item = Item::new(id, item_cfg.id.clone(), item_cfg.unit_weight);
            catalog.add(item.clone());
            items.insert(id, item);
        }

        let mut rack_ids: IdGenerator<RackId> = IdGenerator::new();
        let mut racks = HashMap::new();
        let mut rack_by_string = HashMap::new();
        for rack_cfg in &config.racks {
            let id = rack_ids.next();
            let pos = Position::new(rack_cfg.row, rack_cfg.col);
            grid.set_cell_type(pos, CellType::Rack).expect("validated in-bounds");
            grid.place_facility(pos, Facility::Rack(id)).expect("validated unoccupied cell");
            let mut rack = Rack::new(id, pos, rack_cfg.container_weight, rack_cfg.capacity);
            for (item_str, &qty) in &rack_cfg.initial_stock {
                let item_id = catalog.by_string(item_str).expect("validated item reference");
                let item = items.get_mut(&item_id).expect("catalog and items built together");
                inventory::add_stock(item, &mut rack, qty as i64).expect("validated capacity");
            }
            rack_by_string.insert(rack_cfg.id.clone(), id);
            racks.insert(id, rack);
        }

        let mut gate_ids: IdGenerator<GateId> = IdGenerator::new();
        let mut gates = HashMap::new();
        let mut gate_by_string = HashMap::new();
        for gate_cfg in &config.gates {
            let id = gate_ids.next();
            let pos = Position::new(gate_cfg.row, gate_cfg.col);
            grid.set_cell_type(pos, CellType::Gate).expect("validated in-bounds");
            grid.place_facility(pos, Facility::Gate(id)).expect("validated unoccupied cell");
            gate_by_string.insert(gate_cfg.id.clone(), id);
            gates.insert(id, Gate::new(id, pos));
        }

        let mut station_ids: IdGenerator<StationId> = IdGenerator::new();
        let mut stations = HashMap::new();
        for station_cfg in &config.stations {
            let id = station_ids.next();
            let pos = Position::new(station_cfg.row, station_cfg.col);
            grid.set_cell_type(pos, CellType::Station).expect("validated in-bounds");
            grid.place_facility(pos, Facility::Station(id)).expect("validated unoccupied cell");
            stations.insert(id, Station::new(id, pos));
        }

        let mut agent_ids: IdGenerator<AgentId> = IdGenerator::new();
        let mut agents = HashMap::new();
        let mut ready_agents = Vec::new();
        for agent_cfg in &config.agents {
            let id = agent_ids.next();
            let pos = Position::new(agent_cfg.row, agent_cfg.col);
            let dir = parse_direction(&agent_cfg.direction).unwrap_or(Direction::Up);
            grid.set_agent(pos, Some(id)).expect("validated in-bounds");
            agents.insert(id, Agent::new(id, pos, dir, agent_cfg.load_capacity));
            ready_agents.push(id);
        }

        let gate_guides = gates.values().map(|g| (g.id, GuideMap::compute(&grid, g.position))).collect();
        let rack_guides = racks.values().map(|r| (r.id, GuideMap::compute(&grid, r.home_position))).collect();

        let mut policies = PolicySet::default();
        if let Some(ticks) = config.policies.gate_dwell_ticks {
            policies.gate_dwell = warecore_policies::create_gate_dwell_policy("fixed", ticks);
        }
        if let Some(threshold) = config.policies.dismissal_threshold_ticks {
            policies.dismissal = warecore_policies::create_dismissal_policy("threshold", threshold);
        }
        if let Some(threshold) = config.policies.redundant_rack_threshold {
            policies.redundant_rack_threshold = threshold;
        }

        let mut warehouse = Self {
            tick: Tick::ZERO,
            grid,
            timeline: ReservationTimeline::new(),
            agents,
            racks,
            gates,
            stations,
            orders: HashMap::new(),
            tasks: HashMap::new(),
            catalog,
            items,
            agent_ids,
            rack_ids,
            gate_ids,
            station_ids,
            order_ids: IdGenerator::new(),
            task_ids: IdGenerator::new(),
            rack_by_string,
            gate_by_string,
            order_by_external: HashMap::new(),
            gate_guides,
            rack_guides,
            pending_orders: VecDeque::new(),
            ready_agents,
            policies,
            events: EventLogWriter::in_memory(),
        };

        let mut seed_errors = Vec::new();
        for (i, seed) in config.orders.iter().enumerate() {
            let kind = if seed.kind == "refill" {
                SubmitOrderKind::Refill { rack_external_id: seed.rack.clone().unwrap_or_default() }
            } else {
                SubmitOrderKind::Collect
            };
            let request = SubmitOrderRequest {
                external_id: seed.id.clone(),
                kind,
                gate_external_id: seed.gate.clone(),
                items: seed.items.iter().map(|(item_id, qty)| (item_id.clone(), *qty)).collect(),
            };
            if let Err(e) = warehouse.submit_order(request) {
                seed_errors.push(ValidationError::new(
                    FieldPath::root().field("orders").index(i),
                    ValidationErrorKind::OrderSeedRejected { order_id: seed.id.clone(), reason: e.to_string() },
                ));
            }
        }
        if !seed_errors.is_empty() {
            return Err(seed_errors);
        }

        Ok(warehouse)
    }

    /// True once there is no further work for the tick loop to do: no
    /// pending orders, no in-flight tasks. Used by batch callers (the
    /// `simulate` CLI mode) to know when to stop ticking.
    pub fn is_idle(&self) -> bool {
        self.pending_orders.is_empty() && self.tasks.is_empty()
    }

    /// §4.4: the candidate-rack set a fresh dispatch pass considers for
    /// `order` — every stocked, gate-reachable rack for a collect order,
    /// or exactly the one named rack for a refill.
    pub fn candidate_racks_for(&self, order: &Order) -> Vec<RackId> {
        match &order.kind {
            warecore_entities::OrderKind::Collect => self
                .racks
                .values()
                .filter(|r| self.gate_guides.get(&order.gate_id).map(|g| g.is_reachable(r.home_position)).unwrap_or(false))
                .filter(|r| order.pending_items().keys().any(|&item| r.stored(item) > 0))
                .map(|r| r.id)
                .collect(),
            warecore_entities::OrderKind::Refill { rack_id } => vec![*rack_id],
        }
    }

    /// The rack or gate guide map an agent should make progress against
    /// right now, per its active task's current phase (§4.5.4's slide
    /// fallback and the tick loop's replanning both consult this).
    pub fn guide_map_for_task(&self, task: &Task) -> Option<&GuideMap> {
        match task.phase {
            warecore_entities::TaskPhase::ApproachRack | warecore_entities::TaskPhase::ReturnRack => {
                self.rack_guides.get(&task.rack_id)
            }
            warecore_entities::TaskPhase::ApproachGate => self.gate_guides.get(&task.gate_id),
            _ => None,
        }
    }

    pub fn error_not_found_gate(&self, id: GateId) -> WarehouseError {
        WarehouseError::NotFound { entity_type: "Gate", id: id.as_u32() }
    }

    /// §6 `SubmitOrder`: validate and admit a new order, keyed by its
    /// caller-supplied external id. Rejects with a structured
    /// `WarehouseError` rather than partially mutating state.
    pub fn submit_order(&mut self, request: SubmitOrderRequest) -> WarehouseResult<OrderId> {
        if self.order_by_external.contains_key(&request.external_id) {
            return Err(WarehouseError::DuplicateId { entity_type: "Order", id: 0 });
        }
        if request.items.is_empty() || request.items.iter().any(|(_, qty)| *qty == 0) {
            return Err(WarehouseError::OrderInfeasible {
                reason: "every item quantity must be positive".to_string(),
            });
        }

        let gate_id = *self
            .gate_by_string
            .get(&request.gate_external_id)
            .ok_or_else(|| WarehouseError::NotFound { entity_type: "Gate", id: 0 })?;

        let mut resolved_items = Vec::with_capacity(request.items.len());
        for (item_str, qty) in &request.items {
            let item_id = self
                .catalog
                .by_string(item_str)
                .ok_or_else(|| WarehouseError::NotFound { entity_type: "Item", id: 0 })?;
            resolved_items.push((item_id, *qty));
        }

        let kind = match &request.kind {
            SubmitOrderKind::Collect => {
                for (item_id, qty) in &resolved_items {
                    let item = self.items.get(item_id).expect("resolved from catalog");
                    if item.available() < *qty {
                        return Err(WarehouseError::OrderInfeasible {
                            reason: format!("item {} has insufficient available stock", item.string_id),
                        });
                    }
                }
                warecore_entities::OrderKind::Collect
            }
            SubmitOrderKind::Refill { rack_external_id } => {
                let rack_id = *self
                    .rack_by_string
                    .get(rack_external_id)
                    .ok_or_else(|| WarehouseError::NotFound { entity_type: "Rack", id: 0 })?;
                let rack = self.racks.get(&rack_id).expect("resolved from rack_by_string");
                let added_weight: f64 = resolved_items
                    .iter()
                    .map(|(item_id, qty)| {
                        let item = self.items.get(item_id).expect("resolved from catalog");
                        item.unit_weight * (*qty as f64)
                    })
                    .sum();
                if rack.stored_weight + added_weight > rack.capacity {
                    return Err(WarehouseError::CapacityExceeded(format!(
                        "rack {rack_external_id} cannot hold the refill"
                    )));
                }
                if !self.gate_guides.get(&gate_id).map(|g| g.is_reachable(rack.home_position)).unwrap_or(false) {
                    return Err(WarehouseError::RackUnreachable { rack_id: rack_id.as_u32(), gate_id: gate_id.as_u32() });
                }
                warecore_entities::OrderKind::Refill { rack_id }
            }
        };

        let id = self.order_ids.next();
        let order = Order::new(id, kind, gate_id, resolved_items);
        self.order_by_external.insert(request.external_id, id);
        self.orders.insert(id, order);
        self.pending_orders.push_back(id);
        Ok(id)
    }
}

/// Caller-facing request shape for `Warehouse::submit_order`, resolved
/// from external string ids the way every other config-time entity is.
pub struct SubmitOrderRequest {
    pub external_id: String,
    pub kind: SubmitOrderKind,
    pub gate_external_id: String,
    pub items: Vec<(String, u32)>,
}

pub enum SubmitOrderKind {
    Collect,
    Refill { rack_external_id: String },
}

impl DistanceField for Warehouse {
    fn gate_distance(&self, gate: GateId, pos: Position) -> Option<u32> {
        self.gate_guides.get(&gate).and_then(|g| g.distance(pos))
    }

    fn rack_distance(&self, rack: RackId, pos: Position) -> Option<u32> {
        self.rack_guides.get(&rack).and_then(|g| g.distance(pos))
    }
}

impl SlideTarget for Warehouse {
    fn guide_map_for(&self, agent: AgentId) -> Option<&GuideMap> {
        let task_id = self.agents.get(&agent)?.active_task?;
        let task = self.tasks.get(&task_id)?;
        self.guide_map_for_task(task)
    }
}

fn parse_direction(value: &str) -> WarehouseResult<Direction> {
    match value.to_lowercase().as_str() {
        "up" => Ok(Direction::Up),
        "down" => Ok(Direction::Down),
        "left" => Ok(Direction::Left),
        "right" => Ok(Direction::Right),
        other => Err(WarehouseError::InvalidDirection(other.bytes().next().unwrap_or(0))),
    }
}

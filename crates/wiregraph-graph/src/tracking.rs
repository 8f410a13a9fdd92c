//! Edge endpoint tracking as an explicit dependency graph. Every edge
//! registers the node ids whose geometry its endpoints depend on (the
//! connected ports' nodes plus their container ancestors). The scene
//! collects moved ids per frame; `flush_geometry` recomputes the affected
//! endpoints once, instead of fanning out nested change subscriptions.

use crate::scene::{EdgeEnd, Scene};
use std::collections::{HashMap, HashSet};
use wiregraph_core::ElementId;

#[derive(Debug, Default)]
pub struct GeometryTracker {
    /// node id -> edges whose endpoints move with it.
    node_deps: HashMap<ElementId, HashSet<ElementId>>,
    /// port id -> edges attached to it (for port-offset changes).
    port_deps: HashMap<ElementId, HashSet<ElementId>>,
    /// edge id -> registered node keys, for cheap unregistration.
    edge_nodes: HashMap<ElementId, Vec<ElementId>>,
    edge_ports: HashMap<ElementId, Vec<ElementId>>,
    /// Edges whose dependency chain changed shape and must re-register
    /// before the next endpoint recompute.
    stale: HashSet<ElementId>,
}

impl GeometryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the dependency set of `edge`.
    pub fn register_edge(&mut self, edge: ElementId, nodes: &[ElementId], ports: &[ElementId]) {
        self.unregister_edge(edge);
        for node in nodes {
            self.node_deps.entry(*node).or_default().insert(edge);
        }
        for port in ports {
            self.port_deps.entry(*port).or_default().insert(edge);
        }
        self.edge_nodes.insert(edge, nodes.to_vec());
        self.edge_ports.insert(edge, ports.to_vec());
    }

    pub fn unregister_edge(&mut self, edge: ElementId) {
        for node in self.edge_nodes.remove(&edge).unwrap_or_default() {
            if let Some(set) = self.node_deps.get_mut(&node) {
                set.remove(&edge);
                if set.is_empty() {
                    self.node_deps.remove(&node);
                }
            }
        }
        for port in self.edge_ports.remove(&edge).unwrap_or_default() {
            if let Some(set) = self.port_deps.get_mut(&port) {
                set.remove(&edge);
                if set.is_empty() {
                    self.port_deps.remove(&port);
                }
            }
        }
    }

    /// Marks every edge registered against `node` for re-registration; used
    /// when the ancestor chain changes shape (re-parenting).
    pub fn invalidate_node(&mut self, node: ElementId) {
        if let Some(edges) = self.node_deps.get(&node) {
            self.stale.extend(edges.iter().copied());
        }
    }

    pub fn dependents_of_node(&self, node: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.node_deps
            .get(&node)
            .into_iter()
            .flat_map(|s| s.iter().copied())
    }

    pub fn dependents_of_port(&self, port: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.port_deps
            .get(&port)
            .into_iter()
            .flat_map(|s| s.iter().copied())
    }

    pub fn registered_nodes(&self, edge: ElementId) -> &[ElementId] {
        self.edge_nodes
            .get(&edge)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn take_stale(&mut self) -> HashSet<ElementId> {
        std::mem::take(&mut self.stale)
    }
}

impl Scene {
    /// Recomputes cached endpoint positions for every edge affected by
    /// geometry changes since the last flush. Call once per frame/tick.
    pub fn flush_geometry(&mut self) {
        let moved = self.take_pending_moves();
        if moved.is_empty() && self.tracker_stale_is_empty() {
            return;
        }

        let mut affected: HashSet<ElementId> = HashSet::new();
        for id in &moved {
            let Some(element) = self.get(*id) else {
                continue;
            };
            if element.is_node() {
                affected.extend(self.tracker.dependents_of_node(*id));
            } else if element.is_port() {
                affected.extend(self.tracker.dependents_of_port(*id));
            }
        }

        // Edges whose dependency chain changed shape re-register first.
        let stale = self.tracker.take_stale();
        for edge in &stale {
            self.reindex_edge(*edge);
        }
        affected.extend(stale);
        // reindex_edge marks nodes moved again; drop those, the endpoints
        // are recomputed right here.
        self.take_pending_moves();

        for edge in affected {
            self.recompute_endpoints(edge);
        }
    }

    fn tracker_stale_is_empty(&self) -> bool {
        self.tracker.stale.is_empty()
    }

    pub(crate) fn recompute_endpoints(&mut self, edge: ElementId) {
        let Ok(data) = self.edge(edge) else {
            return;
        };
        let input_pos = data
            .input
            .and_then(|port| self.world_position(port));
        let output_pos = data
            .output
            .and_then(|port| self.world_position(port));
        if let Ok(data) = self.edge_mut(edge) {
            if let Some(pos) = input_pos {
                data.input_pos = pos;
            }
            if let Some(pos) = output_pos {
                data.output_pos = pos;
            }
        }
    }

    /// Sets a candidate override for one endpoint. The override wins over
    /// the port-derived position until cleared.
    pub fn set_endpoint_override(&mut self, edge: ElementId, end: EdgeEnd, position: crate::geometry::Vec2) {
        if let Ok(data) = self.edge_mut(edge) {
            match end {
                EdgeEnd::Input => data.input_override = Some(position),
                EdgeEnd::Output => data.output_override = Some(position),
            }
        }
    }

    /// Clears both overrides and restores port-derived endpoint positions.
    pub fn clear_endpoint_overrides(&mut self, edge: ElementId) {
        if let Ok(data) = self.edge_mut(edge) {
            data.input_override = None;
            data.output_override = None;
        }
        self.recompute_endpoints(edge);
    }
}

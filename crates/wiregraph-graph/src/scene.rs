//! The element arena. Nodes, ports and edges live here, referenced by
//! stable `ElementId` handles; nothing in the workspace holds an owning
//! pointer to anything else. Removal detaches; a handle that outlives its
//! element is a recoverable stale reference.

use crate::geometry::{Rect, Vec2};
use crate::layers::LayerRegistry;
use crate::style::Color;
use crate::tracking::GeometryTracker;
use std::collections::{HashMap, HashSet};
use wiregraph_core::{
    Capabilities, ElementId, GraphError, PortCapacity, PortDirection, PortOrientation,
};

/// Which endpoint of an edge is being addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeEnd {
    Input,
    Output,
}

impl EdgeEnd {
    pub fn for_direction(direction: PortDirection) -> Self {
        match direction {
            PortDirection::Input => EdgeEnd::Input,
            PortDirection::Output => EdgeEnd::Output,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeData {
    pub label: String,
    pub size: Vec2,
    /// Nesting container, if any. World position sums the ancestor chain.
    pub parent: Option<ElementId>,
    pub ports: Vec<ElementId>,
    pub children: Vec<ElementId>,
}

#[derive(Debug, Clone)]
pub struct PortData {
    /// Owning node, set at add time and never reassigned.
    pub node: ElementId,
    pub direction: PortDirection,
    pub orientation: PortOrientation,
    pub capacity: PortCapacity,
    pub highlighted: bool,
    pub color: Color,
    pub edges: Vec<ElementId>,
}

#[derive(Debug, Clone, Default)]
pub struct EdgeData {
    pub input: Option<ElementId>,
    pub output: Option<ElementId>,
    /// World-space override while the input end follows the pointer.
    pub input_override: Option<Vec2>,
    pub output_override: Option<Vec2>,
    /// Cached world-space endpoints, refreshed by the geometry flush.
    pub input_pos: Vec2,
    pub output_pos: Vec2,
    /// Preview-only edge suggested during a drag; never a real connection.
    pub ghost: bool,
}

impl EdgeData {
    pub fn is_real(&self) -> bool {
        self.input.is_some() && self.output.is_some()
    }

    pub fn is_candidate(&self) -> bool {
        self.input_override.is_some() || self.output_override.is_some()
    }

    pub fn port(&self, end: EdgeEnd) -> Option<ElementId> {
        match end {
            EdgeEnd::Input => self.input,
            EdgeEnd::Output => self.output,
        }
    }

    /// Endpoint the renderer should use: the override wins while set.
    pub fn endpoint(&self, end: EdgeEnd) -> Vec2 {
        match end {
            EdgeEnd::Input => self.input_override.unwrap_or(self.input_pos),
            EdgeEnd::Output => self.output_override.unwrap_or(self.output_pos),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ElementKind {
    Node(NodeData),
    Port(PortData),
    Edge(EdgeData),
}

#[derive(Debug, Clone)]
pub struct Element {
    pub id: ElementId,
    pub capabilities: Capabilities,
    pub layer: i32,
    pub selected: bool,
    /// Local offset: relative to the parent node for nodes and ports,
    /// unused for edges.
    pub position: Vec2,
    pub kind: ElementKind,
}

impl Element {
    pub fn as_node(&self) -> Option<&NodeData> {
        match &self.kind {
            ElementKind::Node(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_port(&self) -> Option<&PortData> {
        match &self.kind {
            ElementKind::Port(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_edge(&self) -> Option<&EdgeData> {
        match &self.kind {
            ElementKind::Edge(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self.kind, ElementKind::Node(_))
    }

    pub fn is_port(&self) -> bool {
        matches!(self.kind, ElementKind::Port(_))
    }

    pub fn is_edge(&self) -> bool {
        matches!(self.kind, ElementKind::Edge(_))
    }
}

/// Default layer assignments. Edges paint under nodes, ports above them.
pub const LAYER_EDGES: i32 = 0;
pub const LAYER_NODES: i32 = 1;
pub const LAYER_PORTS: i32 = 2;

#[derive(Debug, Default)]
pub struct Scene {
    elements: HashMap<ElementId, Element>,
    layers: LayerRegistry,
    pub(crate) tracker: GeometryTracker,
    /// Elements whose geometry changed since the last flush.
    pending_moves: HashSet<ElementId>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> ElementId {
        self.next_id += 1;
        ElementId(self.next_id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.keys().copied()
    }

    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    pub fn add_node(&mut self, label: impl Into<String>, position: Vec2, size: Vec2) -> ElementId {
        self.add_node_with(label, position, size, LAYER_NODES, Capabilities::node(), None)
            .expect("adding a root node cannot fail")
    }

    pub fn add_node_with(
        &mut self,
        label: impl Into<String>,
        position: Vec2,
        size: Vec2,
        layer: i32,
        capabilities: Capabilities,
        parent: Option<ElementId>,
    ) -> Result<ElementId, GraphError> {
        if let Some(parent_id) = parent {
            let parent_el = self
                .elements
                .get(&parent_id)
                .ok_or(GraphError::ElementNotFound(parent_id))?;
            if !parent_el.is_node() {
                return Err(GraphError::WrongKind(parent_id, "node"));
            }
        }
        let id = self.alloc_id();
        self.elements.insert(
            id,
            Element {
                id,
                capabilities,
                layer,
                selected: false,
                position,
                kind: ElementKind::Node(NodeData {
                    label: label.into(),
                    size,
                    parent,
                    ports: Vec::new(),
                    children: Vec::new(),
                }),
            },
        );
        self.layers.insert(layer, id);
        if let Some(parent_id) = parent {
            if let Some(ElementKind::Node(data)) =
                self.elements.get_mut(&parent_id).map(|e| &mut e.kind)
            {
                data.children.push(id);
            }
        }
        Ok(id)
    }

    pub fn add_port(
        &mut self,
        node: ElementId,
        direction: PortDirection,
        orientation: PortOrientation,
        capacity: PortCapacity,
        offset: Vec2,
        color: Color,
    ) -> Result<ElementId, GraphError> {
        let node_el = self
            .elements
            .get(&node)
            .ok_or(GraphError::ElementNotFound(node))?;
        if !node_el.is_node() {
            return Err(GraphError::WrongKind(node, "node"));
        }
        let id = self.alloc_id();
        self.elements.insert(
            id,
            Element {
                id,
                capabilities: Capabilities::port(),
                layer: LAYER_PORTS,
                selected: false,
                position: offset,
                kind: ElementKind::Port(PortData {
                    node,
                    direction,
                    orientation,
                    capacity,
                    highlighted: false,
                    color,
                    edges: Vec::new(),
                }),
            },
        );
        self.layers.insert(LAYER_PORTS, id);
        if let Some(ElementKind::Node(data)) = self.elements.get_mut(&node).map(|e| &mut e.kind) {
            data.ports.push(id);
        }
        Ok(id)
    }

    /// Adds a detached edge element. Endpoints are attached through the port
    /// connection model, which keeps capacity and compatibility enforced in
    /// one place.
    pub fn add_edge(&mut self) -> ElementId {
        let id = self.alloc_id();
        self.elements.insert(
            id,
            Element {
                id,
                capabilities: Capabilities::edge(),
                layer: LAYER_EDGES,
                selected: false,
                position: Vec2::ZERO,
                kind: ElementKind::Edge(EdgeData::default()),
            },
        );
        self.layers.insert(LAYER_EDGES, id);
        id
    }

    /// Removes an element and detaches every reference to it. Connected
    /// edges lose the corresponding endpoint; child ports of a removed node
    /// are removed with it; nested children are re-parented to the root.
    pub fn remove(&mut self, id: ElementId) -> Result<(), GraphError> {
        enum Detach {
            Node {
                ports: Vec<ElementId>,
                children: Vec<ElementId>,
                parent: Option<ElementId>,
            },
            Port {
                node: ElementId,
                edges: Vec<ElementId>,
            },
            Edge {
                endpoints: Vec<ElementId>,
            },
        }

        let detach = {
            let element = self
                .elements
                .get(&id)
                .ok_or(GraphError::ElementNotFound(id))?;
            match &element.kind {
                ElementKind::Node(data) => Detach::Node {
                    ports: data.ports.clone(),
                    children: data.children.clone(),
                    parent: data.parent,
                },
                ElementKind::Port(data) => Detach::Port {
                    node: data.node,
                    edges: data.edges.clone(),
                },
                ElementKind::Edge(data) => Detach::Edge {
                    endpoints: data.input.into_iter().chain(data.output).collect(),
                },
            }
        };

        match detach {
            Detach::Node {
                ports,
                children,
                parent,
            } => {
                for port in ports {
                    let _ = self.remove(port);
                }
                for child in children {
                    if let Some(ElementKind::Node(child_data)) =
                        self.elements.get_mut(&child).map(|e| &mut e.kind)
                    {
                        child_data.parent = None;
                    }
                    self.pending_moves.insert(child);
                }
                if let Some(parent_id) = parent {
                    if let Some(ElementKind::Node(parent_data)) =
                        self.elements.get_mut(&parent_id).map(|e| &mut e.kind)
                    {
                        parent_data.children.retain(|c| *c != id);
                    }
                }
            }
            Detach::Port { node, edges } => {
                for edge in edges {
                    if let Some(ElementKind::Edge(edge_data)) =
                        self.elements.get_mut(&edge).map(|e| &mut e.kind)
                    {
                        if edge_data.input == Some(id) {
                            edge_data.input = None;
                        }
                        if edge_data.output == Some(id) {
                            edge_data.output = None;
                        }
                    }
                    self.reindex_edge(edge);
                }
                if let Some(ElementKind::Node(node_data)) =
                    self.elements.get_mut(&node).map(|e| &mut e.kind)
                {
                    node_data.ports.retain(|p| *p != id);
                }
            }
            Detach::Edge { endpoints } => {
                for port in endpoints {
                    if let Some(ElementKind::Port(port_data)) =
                        self.elements.get_mut(&port).map(|e| &mut e.kind)
                    {
                        port_data.edges.retain(|e| *e != id);
                    }
                }
                self.tracker.unregister_edge(id);
            }
        }
        let element = self.elements.remove(&id).expect("checked above");
        self.layers.remove(element.layer, id);
        self.pending_moves.remove(&id);
        tracing::debug!(id = id.0, "removed element from scene");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// World-space position of a node (ancestor chain summed) or a port
    /// (node position plus port offset). `None` for stale handles.
    pub fn world_position(&self, id: ElementId) -> Option<Vec2> {
        let element = self.elements.get(&id)?;
        match &element.kind {
            ElementKind::Node(data) => {
                let mut pos = element.position;
                let mut parent = data.parent;
                let mut hops = 0usize;
                while let Some(parent_id) = parent {
                    let parent_el = self.elements.get(&parent_id)?;
                    pos += parent_el.position;
                    parent = parent_el.as_node().and_then(|n| n.parent);
                    hops += 1;
                    if hops > self.elements.len() {
                        tracing::warn!(id = id.0, "parent cycle while resolving world position");
                        return None;
                    }
                }
                Some(pos)
            }
            ElementKind::Port(data) => Some(self.world_position(data.node)? + element.position),
            ElementKind::Edge(_) => None,
        }
    }

    /// World-space bounding rect of a node, or a point rect for a port.
    pub fn world_rect(&self, id: ElementId) -> Option<Rect> {
        let element = self.elements.get(&id)?;
        let pos = self.world_position(id)?;
        match &element.kind {
            ElementKind::Node(data) => Some(Rect::from_pos_size(pos, data.size)),
            ElementKind::Port(_) => Some(Rect::from_center_size(pos, Vec2::ZERO)),
            ElementKind::Edge(_) => None,
        }
    }

    /// Chain of container ancestors for a node, nearest first. The owning
    /// layer is not an element, so the full chain is returned.
    pub fn ancestors(&self, node: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut current = self
            .get(node)
            .and_then(|e| e.as_node())
            .and_then(|n| n.parent);
        while let Some(id) = current {
            if out.contains(&id) {
                tracing::warn!(id = id.0, "parent cycle in ancestor walk");
                break;
            }
            out.push(id);
            current = self.get(id).and_then(|e| e.as_node()).and_then(|n| n.parent);
        }
        out
    }

    pub fn set_position(&mut self, id: ElementId, position: Vec2) {
        if let Some(element) = self.elements.get_mut(&id) {
            if element.position != position {
                element.position = position;
                self.pending_moves.insert(id);
            }
        }
    }

    pub fn translate(&mut self, id: ElementId, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        if let Some(element) = self.elements.get_mut(&id) {
            element.position += delta;
            self.pending_moves.insert(id);
        }
    }

    /// Re-parents a node into another container (or to the root). The
    /// world position is preserved by rebasing the local offset.
    pub fn set_parent(
        &mut self,
        id: ElementId,
        new_parent: Option<ElementId>,
    ) -> Result<(), GraphError> {
        let world = self
            .world_position(id)
            .ok_or(GraphError::ElementNotFound(id))?;
        if self.get(id).map(|e| e.is_node()) != Some(true) {
            return Err(GraphError::WrongKind(id, "node"));
        }
        if let Some(parent_id) = new_parent {
            if self.get(parent_id).and_then(|e| e.as_node()).is_none() {
                return Err(GraphError::WrongKind(parent_id, "node"));
            }
        }
        let old_parent = self
            .get(id)
            .and_then(|e| e.as_node())
            .and_then(|n| n.parent);
        if old_parent == new_parent {
            return Ok(());
        }
        if let Some(old) = old_parent {
            if let Some(ElementKind::Node(data)) = self.elements.get_mut(&old).map(|e| &mut e.kind)
            {
                data.children.retain(|c| *c != id);
            }
        }
        let parent_world = match new_parent {
            Some(p) => self
                .world_position(p)
                .ok_or(GraphError::ElementNotFound(p))?,
            None => Vec2::ZERO,
        };
        if let Some(element) = self.elements.get_mut(&id) {
            element.position = world - parent_world;
            if let ElementKind::Node(data) = &mut element.kind {
                data.parent = new_parent;
            }
        }
        if let Some(new) = new_parent {
            if let Some(ElementKind::Node(data)) = self.elements.get_mut(&new).map(|e| &mut e.kind)
            {
                data.children.push(id);
            }
        }
        // Dependency chains through this node changed shape.
        self.tracker.invalidate_node(id);
        self.pending_moves.insert(id);
        Ok(())
    }

    pub(crate) fn mark_moved(&mut self, id: ElementId) {
        self.pending_moves.insert(id);
    }

    pub(crate) fn take_pending_moves(&mut self) -> HashSet<ElementId> {
        std::mem::take(&mut self.pending_moves)
    }

    // ------------------------------------------------------------------
    // Layers
    // ------------------------------------------------------------------

    /// Moves an element to another z-bucket. Bucket membership always
    /// matches the `layer` field.
    pub fn set_layer(&mut self, id: ElementId, layer: i32) {
        let Some(element) = self.elements.get_mut(&id) else {
            return;
        };
        if element.layer == layer {
            return;
        }
        let old = element.layer;
        element.layer = layer;
        self.layers.remove(old, id);
        self.layers.insert(layer, id);
    }

    /// Raises an element to the top of its bucket.
    pub fn bring_to_front(&mut self, id: ElementId) {
        if let Some(element) = self.elements.get(&id) {
            self.layers.raise(element.layer, id);
        }
    }

    /// Ids in paint order: ascending layer, insertion order within a bucket.
    pub fn paint_order(&self) -> Vec<ElementId> {
        self.layers.iter_bottom_up().collect()
    }

    /// Ids in pick order: descending layer, latest-raised first.
    pub fn pick_order(&self) -> Vec<ElementId> {
        self.layers.iter_top_down().collect()
    }

    // ------------------------------------------------------------------
    // Typed access
    // ------------------------------------------------------------------

    pub fn node(&self, id: ElementId) -> Result<&NodeData, GraphError> {
        self.elements
            .get(&id)
            .ok_or(GraphError::ElementNotFound(id))?
            .as_node()
            .ok_or(GraphError::WrongKind(id, "node"))
    }

    pub fn port(&self, id: ElementId) -> Result<&PortData, GraphError> {
        self.elements
            .get(&id)
            .ok_or(GraphError::ElementNotFound(id))?
            .as_port()
            .ok_or(GraphError::WrongKind(id, "port"))
    }

    pub fn edge(&self, id: ElementId) -> Result<&EdgeData, GraphError> {
        self.elements
            .get(&id)
            .ok_or(GraphError::ElementNotFound(id))?
            .as_edge()
            .ok_or(GraphError::WrongKind(id, "edge"))
    }

    pub(crate) fn port_mut(&mut self, id: ElementId) -> Result<&mut PortData, GraphError> {
        match self.elements.get_mut(&id).map(|e| &mut e.kind) {
            Some(ElementKind::Port(data)) => Ok(data),
            Some(_) => Err(GraphError::WrongKind(id, "port")),
            None => Err(GraphError::ElementNotFound(id)),
        }
    }

    pub(crate) fn edge_mut(&mut self, id: ElementId) -> Result<&mut EdgeData, GraphError> {
        match self.elements.get_mut(&id).map(|e| &mut e.kind) {
            Some(ElementKind::Edge(data)) => Ok(data),
            Some(_) => Err(GraphError::WrongKind(id, "edge")),
            None => Err(GraphError::ElementNotFound(id)),
        }
    }

    /// Re-registers an edge's geometry dependencies from its current
    /// endpoints.
    pub(crate) fn reindex_edge(&mut self, edge: ElementId) {
        let Ok(data) = self.edge(edge) else {
            return;
        };
        let mut nodes = Vec::new();
        let mut ports = Vec::new();
        for port in data.input.into_iter().chain(data.output) {
            ports.push(port);
            if let Ok(port_data) = self.port(port) {
                let node = port_data.node;
                nodes.push(node);
                nodes.extend(self.ancestors(node));
            }
        }
        let mut tracker = std::mem::take(&mut self.tracker);
        tracker.register_edge(edge, &nodes, &ports);
        self.tracker = tracker;
        self.pending_moves.extend(nodes);
    }
}

//! The port connection model: compatibility rules, connect/disconnect,
//! capacity enforcement, and the highlight propagation used while a
//! connection drag is live. Connectivity lives on the ports (each port
//! keeps the set of attached edge ids); edges hold the back-references.

use crate::scene::{EdgeEnd, Scene};
use wiregraph_core::{CandidateMode, ElementId, GraphError, PortCapacity};

/// Edges that count as occupying a connection slot: attached, fully
/// connected, and not a candidate or preview. Candidate edges never consume
/// capacity.
fn counting_connections(scene: &Scene, port: ElementId) -> usize {
    let Ok(data) = scene.port(port) else {
        return 0;
    };
    data.edges
        .iter()
        .filter(|edge| {
            scene
                .edge(**edge)
                .map(|e| e.is_real() && !e.ghost && !e.is_candidate())
                .unwrap_or(false)
        })
        .count()
}

fn has_free_capacity(scene: &Scene, port: ElementId) -> bool {
    match scene.port(port) {
        Ok(data) => match data.capacity {
            PortCapacity::Multi => true,
            PortCapacity::Single => counting_connections(scene, port) == 0,
        },
        Err(_) => false,
    }
}

/// Whether `a` and `b` already share an edge. `CandidateMode::Ignore` only
/// counts settled connections; `Strict` also counts candidate and preview
/// edges, which is what drop validation wants.
fn already_connected(scene: &Scene, a: ElementId, b: ElementId, mode: CandidateMode) -> bool {
    let (Ok(pa), Ok(pb)) = (scene.port(a), scene.port(b)) else {
        return false;
    };
    pa.edges.iter().any(|edge| {
        if !pb.edges.contains(edge) {
            return false;
        }
        match mode {
            CandidateMode::Strict => true,
            CandidateMode::Ignore => scene
                .edge(*edge)
                .map(|e| !e.ghost && !e.is_candidate())
                .unwrap_or(false),
        }
    })
}

/// Compatibility check. Symmetric in `a` and `b`.
pub fn can_connect(scene: &Scene, a: ElementId, b: ElementId, mode: CandidateMode) -> bool {
    if a == b {
        return false;
    }
    let (Ok(pa), Ok(pb)) = (scene.port(a), scene.port(b)) else {
        return false;
    };
    pa.direction != pb.direction
        && pa.node != pb.node
        && has_free_capacity(scene, a)
        && has_free_capacity(scene, b)
        && !already_connected(scene, a, b, mode)
}

/// Attaches one endpoint of `edge` to `port` (the endpoint is chosen by the
/// port's direction). Idempotent per (port, edge): re-connecting refreshes
/// the port's visual cap and does nothing else. Attaching a settled edge to
/// a Single port displaces the connection that occupied the slot.
pub fn connect(scene: &mut Scene, edge: ElementId, port: ElementId) -> Result<(), GraphError> {
    let port_data = scene.port(port)?;
    let direction = port_data.direction;
    let capacity = port_data.capacity;
    let end = EdgeEnd::for_direction(direction);
    let edge_data = scene.edge(edge)?;

    if edge_data.port(end) == Some(port) {
        // Already attached here; just repaint the cap.
        scene.mark_moved(port);
        return Ok(());
    }

    // Re-attaching an edge that was connected elsewhere on this end.
    if let Some(previous) = edge_data.port(end) {
        disconnect(scene, edge, previous);
    }

    // A settled edge landing on an occupied Single port displaces the
    // incumbent connection.
    let incoming_counts = {
        let e = scene.edge(edge)?;
        !e.ghost && !e.is_candidate()
    };
    if capacity == PortCapacity::Single && incoming_counts {
        let occupied: Vec<ElementId> = scene
            .port(port)?
            .edges
            .iter()
            .copied()
            .filter(|other| {
                scene
                    .edge(*other)
                    .map(|e| e.is_real() && !e.ghost && !e.is_candidate())
                    .unwrap_or(false)
            })
            .collect();
        for other in occupied {
            disconnect(scene, other, port);
        }
    }

    if let Ok(data) = scene.edge_mut(edge) {
        match end {
            EdgeEnd::Input => data.input = Some(port),
            EdgeEnd::Output => data.output = Some(port),
        }
    }
    if let Ok(data) = scene.port_mut(port) {
        if !data.edges.contains(&edge) {
            data.edges.push(edge);
        }
    }
    scene.reindex_edge(edge);
    Ok(())
}

/// Removes `edge` from `port`'s connection set and clears the matching
/// endpoint. Disconnecting an edge that is not present is a no-op.
pub fn disconnect(scene: &mut Scene, edge: ElementId, port: ElementId) {
    let present = scene
        .port(port)
        .map(|p| p.edges.contains(&edge))
        .unwrap_or(false);
    if !present {
        return;
    }
    if let Ok(data) = scene.port_mut(port) {
        data.edges.retain(|e| *e != edge);
    }
    if let Ok(data) = scene.edge_mut(edge) {
        if data.input == Some(port) {
            data.input = None;
        }
        if data.output == Some(port) {
            data.output = None;
        }
    }
    scene.reindex_edge(edge);
}

/// Connects two compatible ports with a fresh edge and returns its id. If
/// the ports are already connected to each other the existing edge id is
/// returned instead; no second edge is created.
pub fn connect_ports(
    scene: &mut Scene,
    a: ElementId,
    b: ElementId,
) -> Result<ElementId, GraphError> {
    if let Some(existing) = edge_between(scene, a, b) {
        // Refresh both caps, as a repeat connect would.
        scene.mark_moved(a);
        scene.mark_moved(b);
        return Ok(existing);
    }
    if !can_connect(scene, a, b, CandidateMode::Ignore) {
        return Err(GraphError::IncompatiblePorts(a, b));
    }
    let edge = scene.add_edge();
    connect(scene, edge, a)?;
    connect(scene, edge, b)?;
    Ok(edge)
}

/// The settled edge shared by `a` and `b`, if any.
pub fn edge_between(scene: &Scene, a: ElementId, b: ElementId) -> Option<ElementId> {
    let (Ok(pa), Ok(pb)) = (scene.port(a), scene.port(b)) else {
        return None;
    };
    pa.edges
        .iter()
        .copied()
        .find(|edge| {
            pb.edges.contains(edge)
                && scene
                    .edge(*edge)
                    .map(|e| !e.ghost && !e.is_candidate())
                    .unwrap_or(false)
        })
}

/// Purely visual; never affects connectivity.
pub fn set_highlight(scene: &mut Scene, port: ElementId, on: bool) {
    if let Ok(data) = scene.port_mut(port) {
        data.highlighted = on;
    }
}

/// Highlights every port compatible with `from` while a connection drag is
/// live. Returns the highlighted ids.
pub fn illuminate_candidates(
    scene: &mut Scene,
    from: ElementId,
    mode: CandidateMode,
) -> Vec<ElementId> {
    let ports: Vec<ElementId> = crate::selection::ports(scene);
    let mut lit = Vec::new();
    for port in ports {
        let on = port != from && can_connect(scene, from, port, mode);
        set_highlight(scene, port, on);
        if on {
            lit.push(port);
        }
    }
    lit
}

pub fn clear_highlights(scene: &mut Scene) {
    let ports: Vec<ElementId> = crate::selection::ports(scene);
    for port in ports {
        set_highlight(scene, port, false);
    }
}

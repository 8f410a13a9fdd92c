//! Selection is not a separate owned collection: it is derived by filtering
//! scene elements on their `selected` flag. This module carries the bulk
//! queries and the mutation helpers that keep the ascend-on-select behavior
//! in one place.

use crate::scene::Scene;
use wiregraph_core::ElementId;

/// Sets the flag and raises ascendable elements to the top of their layer
/// bucket. Returns whether anything changed. Non-selectable elements are
/// ignored.
pub fn select(scene: &mut Scene, id: ElementId) -> bool {
    let Some(element) = scene.get(id) else {
        return false;
    };
    if !element.capabilities.selectable || element.selected {
        return false;
    }
    let ascend = element.capabilities.ascendable;
    if let Some(element) = scene.get_mut(id) {
        element.selected = true;
    }
    if ascend {
        scene.bring_to_front(id);
    }
    true
}

pub fn deselect(scene: &mut Scene, id: ElementId) -> bool {
    match scene.get_mut(id) {
        Some(element) if element.selected => {
            element.selected = false;
            true
        }
        _ => false,
    }
}

pub fn toggle(scene: &mut Scene, id: ElementId) -> bool {
    match scene.get(id) {
        Some(element) if element.selected => deselect(scene, id),
        Some(_) => select(scene, id),
        None => false,
    }
}

/// Deselects everything. Returns the ids that were selected.
pub fn clear(scene: &mut Scene) -> Vec<ElementId> {
    let cleared: Vec<ElementId> = selected(scene);
    for id in &cleared {
        if let Some(element) = scene.get_mut(*id) {
            element.selected = false;
        }
    }
    cleared
}

pub fn is_selected(scene: &Scene, id: ElementId) -> bool {
    scene.get(id).map(|e| e.selected).unwrap_or(false)
}

pub fn selected(scene: &Scene) -> Vec<ElementId> {
    scene
        .elements()
        .filter(|e| e.selected)
        .map(|e| e.id)
        .collect()
}

pub fn unselected(scene: &Scene) -> Vec<ElementId> {
    scene
        .elements()
        .filter(|e| !e.selected)
        .map(|e| e.id)
        .collect()
}

pub fn selected_nodes(scene: &Scene) -> Vec<ElementId> {
    scene
        .elements()
        .filter(|e| e.selected && e.is_node())
        .map(|e| e.id)
        .collect()
}

pub fn selected_edges(scene: &Scene) -> Vec<ElementId> {
    scene
        .elements()
        .filter(|e| e.selected && e.is_edge())
        .map(|e| e.id)
        .collect()
}

pub fn unselected_nodes(scene: &Scene) -> Vec<ElementId> {
    scene
        .elements()
        .filter(|e| !e.selected && e.is_node())
        .map(|e| e.id)
        .collect()
}

pub fn nodes(scene: &Scene) -> Vec<ElementId> {
    scene
        .elements()
        .filter(|e| e.is_node())
        .map(|e| e.id)
        .collect()
}

pub fn edges(scene: &Scene) -> Vec<ElementId> {
    scene
        .elements()
        .filter(|e| e.is_edge())
        .map(|e| e.id)
        .collect()
}

pub fn ports(scene: &Scene) -> Vec<ElementId> {
    scene
        .elements()
        .filter(|e| e.is_port())
        .map(|e| e.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;
    use wiregraph_core::Capabilities;

    #[test]
    fn select_respects_capability() {
        let mut scene = Scene::new();
        let node = scene.add_node("n", Vec2::ZERO, Vec2::new(10.0, 10.0));
        let frozen = scene
            .add_node_with(
                "f",
                Vec2::ZERO,
                Vec2::new(10.0, 10.0),
                crate::scene::LAYER_NODES,
                Capabilities::node().with_selectable(false),
                None,
            )
            .unwrap();

        assert!(select(&mut scene, node));
        assert!(!select(&mut scene, frozen));
        assert_eq!(selected(&scene), vec![node]);
    }

    #[test]
    fn select_ascends_to_bucket_top() {
        let mut scene = Scene::new();
        let a = scene.add_node("a", Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = scene.add_node("b", Vec2::ZERO, Vec2::new(10.0, 10.0));
        assert_eq!(
            scene.layers().bucket(crate::scene::LAYER_NODES),
            &[a, b]
        );

        select(&mut scene, a);
        assert_eq!(
            scene.layers().bucket(crate::scene::LAYER_NODES),
            &[b, a]
        );
    }

    #[test]
    fn clear_returns_previous_selection() {
        let mut scene = Scene::new();
        let a = scene.add_node("a", Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = scene.add_node("b", Vec2::ZERO, Vec2::new(10.0, 10.0));
        select(&mut scene, a);
        select(&mut scene, b);

        let mut cleared = clear(&mut scene);
        cleared.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(cleared, expected);
        assert!(selected(&scene).is_empty());
    }

    #[test]
    fn queries_partition_by_kind_and_flag() {
        let mut scene = Scene::new();
        let a = scene.add_node("a", Vec2::ZERO, Vec2::new(10.0, 10.0));
        let _b = scene.add_node("b", Vec2::ZERO, Vec2::new(10.0, 10.0));
        let edge = scene.add_edge();
        select(&mut scene, a);
        select(&mut scene, edge);

        assert_eq!(selected_nodes(&scene), vec![a]);
        assert_eq!(selected_edges(&scene), vec![edge]);
        assert_eq!(unselected_nodes(&scene).len(), 1);
        assert_eq!(nodes(&scene).len(), 2);
    }
}

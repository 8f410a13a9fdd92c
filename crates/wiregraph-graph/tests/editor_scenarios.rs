//! End-to-end scenarios through the public controller API: interactive
//! wiring, host-driven deletion, geometry tracking across gestures, and
//! view-state persistence.

use wiregraph_core::{
    EngineConfig, InputEvent, Modifiers, PointerButton, PortCapacity, PortDirection,
    PortOrientation,
};
use wiregraph_events::{Event, EventBus};
use wiregraph_graph::interaction::EditorController;
use wiregraph_graph::{Color, Rect, Theme, Vec2, ports, selection};

fn controller(bus: EventBus) -> EditorController {
    let mut ctl = EditorController::new(EngineConfig::default(), Theme::bright(), bus);
    ctl.viewport_mut()
        .set_view_rect(Rect::from_min_max(Vec2::ZERO, Vec2::new(800.0, 600.0)));
    ctl
}

fn pointer(ctl: &mut EditorController, event: InputEvent) {
    ctl.handle_input(event);
}

fn press(ctl: &mut EditorController, x: f32, y: f32) {
    pointer(
        ctl,
        InputEvent::PointerDown {
            x,
            y,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        },
    );
}

fn drag(ctl: &mut EditorController, x: f32, y: f32) {
    pointer(
        ctl,
        InputEvent::PointerMove {
            x,
            y,
            modifiers: Modifiers::NONE,
        },
    );
}

fn release(ctl: &mut EditorController, x: f32, y: f32) {
    pointer(
        ctl,
        InputEvent::PointerUp {
            x,
            y,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        },
    );
}

struct Rig {
    node_a: wiregraph_core::ElementId,
    out: wiregraph_core::ElementId,
    node_b: wiregraph_core::ElementId,
    inp: wiregraph_core::ElementId,
}

fn rig(ctl: &mut EditorController) -> Rig {
    let scene = ctl.scene_mut();
    let node_a = scene.add_node("producer", Vec2::new(40.0, 40.0), Vec2::new(120.0, 60.0));
    let out = scene
        .add_port(
            node_a,
            PortDirection::Output,
            PortOrientation::Horizontal,
            PortCapacity::Single,
            Vec2::new(120.0, 30.0),
            Color::rgb(220, 180, 100),
        )
        .unwrap();
    let node_b = scene.add_node("consumer", Vec2::new(420.0, 40.0), Vec2::new(120.0, 60.0));
    let inp = scene
        .add_port(
            node_b,
            PortDirection::Input,
            PortOrientation::Horizontal,
            PortCapacity::Single,
            Vec2::new(0.0, 30.0),
            Color::rgb(100, 160, 210),
        )
        .unwrap();
    Rig {
        node_a,
        out,
        node_b,
        inp,
    }
}

#[test]
fn wire_then_track_then_delete() {
    let bus = EventBus::new();
    let mut ctl = controller(bus.clone());
    let rig = rig(&mut ctl);

    // Wire interactively: drag from the output port onto the input port.
    press(&mut ctl, 160.0, 70.0);
    drag(&mut ctl, 300.0, 70.0);
    drag(&mut ctl, 421.0, 70.0);
    release(&mut ctl, 421.0, 70.0);

    let edge = ports::edge_between(ctl.scene(), rig.out, rig.inp).expect("edge settled");

    // The edge endpoint follows its node through a later move drag.
    press(&mut ctl, 480.0, 70.0);
    drag(&mut ctl, 490.0, 70.0);
    drag(&mut ctl, 490.0, 170.0);
    release(&mut ctl, 490.0, 170.0);
    ctl.tick();

    let input_end = ctl
        .scene()
        .edge(edge)
        .unwrap()
        .endpoint(wiregraph_graph::EdgeEnd::Input);
    let port_pos = ctl.scene().world_position(rig.inp).unwrap();
    assert_eq!(input_end, port_pos);
    assert_ne!(port_pos, Vec2::new(420.0, 70.0));

    // Host deletes the selected node in response to the bus request.
    pointer(
        &mut ctl,
        InputEvent::KeyDown {
            key: wiregraph_core::Key::Delete,
            modifiers: Modifiers::NONE,
        },
    );
    let mut requested = Vec::new();
    while let Ok(event) = bus.receiver().try_recv() {
        if let Event::DeleteRequested { elements } = event {
            requested = elements;
        }
    }
    assert_eq!(requested, vec![rig.node_b]);
    for id in requested {
        ctl.scene_mut().remove(id).unwrap();
    }

    // The edge survives with a dangling endpoint; the source side is intact.
    let data = ctl.scene().edge(edge).unwrap();
    assert_eq!(data.input, None);
    assert_eq!(data.output, Some(rig.out));
    assert!(ctl.scene().contains(rig.node_a));
}

#[test]
fn single_capacity_pair_connects_once() {
    let bus = EventBus::new();
    let mut ctl = controller(bus);
    let rig = rig(&mut ctl);

    let first = ports::connect_ports(ctl.scene_mut(), rig.out, rig.inp).unwrap();
    let second = ports::connect_ports(ctl.scene_mut(), rig.inp, rig.out).unwrap();
    assert_eq!(first, second);
    assert_eq!(ctl.scene().port(rig.out).unwrap().edges.len(), 1);
    assert_eq!(ctl.scene().port(rig.inp).unwrap().edges.len(), 1);
}

#[test]
fn frame_content_then_persist_view_state() {
    let bus = EventBus::new();
    let mut ctl = controller(bus);
    let rig = rig(&mut ctl);
    selection::select(ctl.scene_mut(), rig.node_a);

    ctl.handle_event(&Event::FrameContent);
    let framed = ctl.viewport().transform();
    let center = ctl
        .scene()
        .world_rect(rig.node_a)
        .unwrap()
        .center();
    assert!(
        framed
            .world_to_screen(center)
            .distance(ctl.viewport().view_rect().center())
            < 1e-2
    );

    let json = serde_json::to_string(&ctl.viewport().view_state()).unwrap();
    let restored: wiregraph_graph::ViewState = serde_json::from_str(&json).unwrap();
    let bus2 = EventBus::new();
    let mut other = controller(bus2);
    other.viewport_mut().apply_view_state(restored);
    assert_eq!(other.viewport().transform(), framed);
}

#[test]
fn invalid_zoom_input_never_corrupts_state() {
    let bus = EventBus::new();
    let mut ctl = controller(bus);
    let before = ctl.viewport().transform();

    assert!(!ctl
        .viewport_mut()
        .update_view_transform(Vec2::new(f32::NAN, 0.0), Vec2::splat(1.0)));
    assert!(!ctl.viewport_mut().zoom_by(f32::INFINITY, Vec2::ZERO));
    assert!(!ctl.viewport_mut().zoom_by(-1.0, Vec2::ZERO));
    assert_eq!(ctl.viewport().transform(), before);
}

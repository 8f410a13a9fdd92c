//! The generalized drag/drop protocol. One gesture at a time, driven by the
//! pointer stream: `Idle → Offered → (threshold) → Dragging → {Dropped |
//! Cancelled} → Idle`. The protocol resolves exactly one target per gesture
//! and returns structured transitions; consumers never rely on ambient
//! event propagation.
//!
//! Contract: every offer resolves to exactly one of begin or silent reset,
//! and every begun drag resolves to exactly one terminal event (end or
//! cancel). Querying the payload outside an active drag is a programming
//! error and panics.

use crate::geometry::Vec2;
use wiregraph_core::ElementId;

/// What an element under the pointer registers when it accepts a drag
/// offer: itself, an optional per-gesture threshold override, and opaque
/// payload the consumer interprets.
#[derive(Debug)]
pub struct AcceptedDrag<P> {
    pub dragged: ElementId,
    pub threshold: Option<f32>,
    pub payload: P,
}

/// Structured transition emitted by a protocol step. `Ended` and
/// `Cancelled` are terminal and carry the payload back out; after one of
/// them the gesture is torn down.
#[derive(Debug)]
pub enum DragEvent<P> {
    /// The threshold was breached; the gesture is live from here.
    Begun { dragged: ElementId, position: Vec2 },
    /// Pointer moved while dragging. `delta` is since the last delivered
    /// event; `total` is since the begin position.
    Moved {
        dragged: ElementId,
        position: Vec2,
        delta: Vec2,
        total: Vec2,
    },
    /// Advisory: the pointer left the previous drop target.
    DropExited { target: ElementId },
    /// Advisory: the pointer entered a new drop target.
    DropEntered { target: ElementId },
    /// Delivered to the tracked target right before `Ended`.
    Dropped {
        target: ElementId,
        dragged: ElementId,
    },
    Ended {
        dragged: ElementId,
        total: Vec2,
        payload: P,
    },
    Cancelled {
        dragged: ElementId,
        total: Vec2,
        payload: P,
    },
}

#[derive(Debug)]
enum State<P> {
    Idle,
    Offered {
        dragged: ElementId,
        origin: Vec2,
        threshold: f32,
        payload: P,
    },
    Dragging {
        dragged: ElementId,
        begin_position: Vec2,
        last: Vec2,
        payload: P,
        drop_target: Option<ElementId>,
    },
}

#[derive(Debug)]
pub struct DragProtocol<P> {
    state: State<P>,
    default_threshold: f32,
}

impl<P> DragProtocol<P> {
    pub fn new(default_threshold: f32) -> Self {
        Self {
            state: State::Idle,
            default_threshold,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    pub fn is_offered(&self) -> bool {
        matches!(self.state, State::Offered { .. })
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, State::Dragging { .. })
    }

    pub fn dragged(&self) -> Option<ElementId> {
        match &self.state {
            State::Idle => None,
            State::Offered { dragged, .. } | State::Dragging { dragged, .. } => Some(*dragged),
        }
    }

    pub fn drop_target(&self) -> Option<ElementId> {
        match &self.state {
            State::Dragging { drop_target, .. } => *drop_target,
            _ => None,
        }
    }

    /// The payload registered at accept time.
    ///
    /// # Panics
    /// Outside an active (begun) drag. That is a producer/consumer contract
    /// violation, not a runtime condition.
    pub fn payload(&self) -> &P {
        match &self.state {
            State::Dragging { payload, .. } => payload,
            State::Offered { .. } => panic!("drag payload queried before the gesture began"),
            State::Idle => panic!("drag payload queried with no gesture active"),
        }
    }

    pub fn payload_mut(&mut self) -> &mut P {
        match &mut self.state {
            State::Dragging { payload, .. } => payload,
            State::Offered { .. } => panic!("drag payload queried before the gesture began"),
            State::Idle => panic!("drag payload queried with no gesture active"),
        }
    }

    /// Primary-button press. `accepted` is the single acceptor resolved by
    /// the caller's topmost-first pick, or `None` when nobody wants the
    /// gesture. A press while a gesture is active cancels the running
    /// gesture first; the returned events carry that cancellation.
    pub fn offer(&mut self, origin: Vec2, accepted: Option<AcceptedDrag<P>>) -> Vec<DragEvent<P>> {
        let mut events = Vec::new();
        if !self.is_idle() {
            tracing::debug!("new press while a gesture is active; cancelling it");
            events.extend(self.cancel());
        }
        match accepted {
            Some(accept) => {
                self.state = State::Offered {
                    dragged: accept.dragged,
                    origin,
                    threshold: accept.threshold.unwrap_or(self.default_threshold),
                    payload: accept.payload,
                };
            }
            None => {
                self.state = State::Idle;
            }
        }
        events
    }

    /// Pointer move. `pick` is the topmost droppable element currently
    /// under the cursor, excluding the dragged element; the caller resolves
    /// it because picking needs the scene.
    pub fn pointer_moved(&mut self, position: Vec2, pick: Option<ElementId>) -> Vec<DragEvent<P>> {
        let mut events = Vec::new();
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => {}
            State::Offered {
                dragged,
                origin,
                threshold,
                payload,
            } => {
                if position.distance(origin) >= threshold {
                    events.push(DragEvent::Begun { dragged, position });
                    let mut drop_target = None;
                    Self::track_drop_target(&mut drop_target, pick, dragged, &mut events);
                    self.state = State::Dragging {
                        dragged,
                        begin_position: position,
                        last: position,
                        payload,
                        drop_target,
                    };
                } else {
                    // Below threshold: displacement tracked, nothing emitted.
                    self.state = State::Offered {
                        dragged,
                        origin,
                        threshold,
                        payload,
                    };
                }
            }
            State::Dragging {
                dragged,
                begin_position,
                last,
                payload,
                mut drop_target,
            } => {
                events.push(DragEvent::Moved {
                    dragged,
                    position,
                    delta: position - last,
                    total: position - begin_position,
                });
                Self::track_drop_target(&mut drop_target, pick, dragged, &mut events);
                self.state = State::Dragging {
                    dragged,
                    begin_position,
                    last: position,
                    payload,
                    drop_target,
                };
            }
        }
        events
    }

    /// Primary-button release. Below threshold this is a silent reset.
    pub fn pointer_released(&mut self, position: Vec2) -> Vec<DragEvent<P>> {
        let mut events = Vec::new();
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => {}
            State::Offered { .. } => {
                // Never begun; resolves without any event.
            }
            State::Dragging {
                dragged,
                begin_position,
                payload,
                drop_target,
                ..
            } => {
                if let Some(target) = drop_target {
                    events.push(DragEvent::Dropped { target, dragged });
                }
                events.push(DragEvent::Ended {
                    dragged,
                    total: position - begin_position,
                    payload,
                });
            }
        }
        events
    }

    /// Escape, capture loss, or an explicit cancellation request from the
    /// dragged entity. Before the threshold is breached the reset is
    /// silent.
    pub fn cancel(&mut self) -> Vec<DragEvent<P>> {
        let mut events = Vec::new();
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => {}
            State::Offered { .. } => {}
            State::Dragging {
                dragged,
                begin_position,
                last,
                payload,
                drop_target,
            } => {
                if let Some(target) = drop_target {
                    events.push(DragEvent::DropExited { target });
                }
                events.push(DragEvent::Cancelled {
                    dragged,
                    total: last - begin_position,
                    payload,
                });
            }
        }
        events
    }

    fn track_drop_target(
        drop_target: &mut Option<ElementId>,
        pick: Option<ElementId>,
        dragged: ElementId,
        events: &mut Vec<DragEvent<P>>,
    ) {
        let pick = pick.filter(|id| *id != dragged);
        if pick == *drop_target {
            return;
        }
        if let Some(previous) = drop_target.take() {
            events.push(DragEvent::DropExited { target: previous });
        }
        if let Some(next) = pick {
            events.push(DragEvent::DropEntered { target: next });
        }
        *drop_target = pick;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept(id: u64) -> Option<AcceptedDrag<&'static str>> {
        Some(AcceptedDrag {
            dragged: ElementId(id),
            threshold: None,
            payload: "payload",
        })
    }

    #[test]
    fn unaccepted_offer_resolves_to_idle() {
        let mut drag: DragProtocol<&str> = DragProtocol::new(4.0);
        let events = drag.offer(Vec2::ZERO, None);
        assert!(events.is_empty());
        assert!(drag.is_idle());
    }

    #[test]
    fn below_threshold_emits_nothing() {
        let mut drag = DragProtocol::new(4.0);
        drag.offer(Vec2::ZERO, accept(1));
        let events = drag.pointer_moved(Vec2::new(2.0, 1.0), None);
        assert!(events.is_empty());
        assert!(drag.is_offered());

        // Release before breaching: silent reset, no terminal event.
        let events = drag.pointer_released(Vec2::new(2.0, 1.0));
        assert!(events.is_empty());
        assert!(drag.is_idle());
    }

    #[test]
    fn begin_then_deltas_sum_to_total() {
        let mut drag = DragProtocol::new(4.0);
        drag.offer(Vec2::ZERO, accept(1));
        let events = drag.pointer_moved(Vec2::new(5.0, 0.0), None);
        assert!(matches!(events[0], DragEvent::Begun { .. }));

        let mut sum = Vec2::ZERO;
        for pos in [
            Vec2::new(10.0, 4.0),
            Vec2::new(12.0, -6.0),
            Vec2::new(30.0, 2.0),
        ] {
            for event in drag.pointer_moved(pos, None) {
                if let DragEvent::Moved { delta, .. } = event {
                    sum += delta;
                }
            }
        }
        let events = drag.pointer_released(Vec2::new(30.0, 2.0));
        let Some(DragEvent::Ended { total, .. }) = events.last() else {
            panic!("expected Ended, got {events:?}");
        };
        // Deltas sum to end − begin.
        assert!((sum - *total).length() < 1e-5);
        assert_eq!(*total, Vec2::new(25.0, 2.0));
    }

    #[test]
    fn drop_target_transitions_fire_exit_then_enter() {
        let mut drag = DragProtocol::new(0.0);
        drag.offer(Vec2::ZERO, accept(1));
        drag.pointer_moved(Vec2::new(1.0, 0.0), None);

        let events = drag.pointer_moved(Vec2::new(2.0, 0.0), Some(ElementId(7)));
        assert!(matches!(
            events[1],
            DragEvent::DropEntered { target: ElementId(7) }
        ));

        let events = drag.pointer_moved(Vec2::new(3.0, 0.0), Some(ElementId(8)));
        assert!(matches!(
            events[1],
            DragEvent::DropExited { target: ElementId(7) }
        ));
        assert!(matches!(
            events[2],
            DragEvent::DropEntered { target: ElementId(8) }
        ));

        // The dragged element itself never becomes a target.
        let events = drag.pointer_moved(Vec2::new(4.0, 0.0), Some(ElementId(1)));
        assert!(matches!(
            events[1],
            DragEvent::DropExited { target: ElementId(8) }
        ));
        assert_eq!(drag.drop_target(), None);
    }

    #[test]
    fn drop_delivered_before_end() {
        let mut drag = DragProtocol::new(0.0);
        drag.offer(Vec2::ZERO, accept(1));
        drag.pointer_moved(Vec2::new(1.0, 0.0), None);
        drag.pointer_moved(Vec2::new(2.0, 0.0), Some(ElementId(9)));

        let events = drag.pointer_released(Vec2::new(2.0, 0.0));
        assert!(matches!(
            events[0],
            DragEvent::Dropped { target: ElementId(9), dragged: ElementId(1) }
        ));
        assert!(matches!(events[1], DragEvent::Ended { .. }));
    }

    #[test]
    fn cancel_fires_drop_exit_first() {
        let mut drag = DragProtocol::new(0.0);
        drag.offer(Vec2::ZERO, accept(1));
        drag.pointer_moved(Vec2::new(1.0, 0.0), Some(ElementId(9)));

        let events = drag.cancel();
        assert!(matches!(
            events[0],
            DragEvent::DropExited { target: ElementId(9) }
        ));
        assert!(matches!(events[1], DragEvent::Cancelled { .. }));
        assert!(drag.is_idle());
    }

    #[test]
    fn second_press_cancels_running_gesture() {
        let mut drag = DragProtocol::new(0.0);
        drag.offer(Vec2::ZERO, accept(1));
        drag.pointer_moved(Vec2::new(1.0, 0.0), None);

        let events = drag.offer(Vec2::new(50.0, 50.0), accept(2));
        assert!(matches!(events[0], DragEvent::Cancelled { dragged: ElementId(1), .. }));
        assert_eq!(drag.dragged(), Some(ElementId(2)));
        assert!(drag.is_offered());
    }

    #[test]
    #[should_panic(expected = "before the gesture began")]
    fn payload_before_begin_panics() {
        let mut drag = DragProtocol::new(4.0);
        drag.offer(Vec2::ZERO, accept(1));
        let _ = drag.payload();
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn positions() -> impl Strategy<Value = Vec<Vec2>> {
        proptest::collection::vec(
            (-200.0f32..200.0, -200.0f32..200.0).prop_map(|(x, y)| Vec2::new(x, y)),
            1..30,
        )
    }

    proptest! {
        /// Any offer → moves → release sequence yields exactly one terminal
        /// event, and the delivered deltas sum to (end − begin).
        #[test]
        fn exactly_one_terminal_and_deltas_sum(
            moves in positions(),
            threshold in 0.0f32..20.0,
        ) {
            let mut drag = DragProtocol::new(threshold);
            drag.offer(Vec2::ZERO, Some(AcceptedDrag {
                dragged: ElementId(1),
                threshold: None,
                payload: (),
            }));

            let mut terminals = 0usize;
            let mut begun_at = None;
            let mut sum = Vec2::ZERO;
            let mut last = Vec2::ZERO;
            for pos in &moves {
                last = *pos;
                for event in drag.pointer_moved(*pos, None) {
                    match event {
                        DragEvent::Begun { position, .. } => begun_at = Some(position),
                        DragEvent::Moved { delta, .. } => sum += delta,
                        DragEvent::Ended { .. } | DragEvent::Cancelled { .. } => terminals += 1,
                        _ => {}
                    }
                }
            }
            for event in drag.pointer_released(last) {
                match event {
                    DragEvent::Ended { total, .. } => {
                        terminals += 1;
                        let begin = begun_at.expect("ended without begin");
                        prop_assert!((sum - total).length() < 1e-3);
                        prop_assert!(((last - begin) - total).length() < 1e-3);
                    }
                    DragEvent::Cancelled { .. } => terminals += 1,
                    _ => {}
                }
            }

            if begun_at.is_some() {
                prop_assert_eq!(terminals, 1);
            } else {
                // Never breached the threshold: silent reset, no events.
                prop_assert_eq!(terminals, 0);
            }
            prop_assert!(drag.is_idle());
        }
    }
}

//! Scenario tests driving whole circuits through the public `Scene` API.
//!
//! Covers:
//! - combinational circuits (AND, full adder)
//! - connect / disconnect / reconnect behaviour
//! - components: single and multi output, nesting, dependency removal
//! - persistence: reload reproduces behaviour, round trips are stable
//! - properties: `run` is pure, random edit sequences round-trip

use gatesim_core::{
    CoreError, Gate, GateType, NodeKind, NodeRef, RelId, Scene, SceneMeta, State,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn cin(i: u32) -> NodeRef {
    NodeRef::boundary_input(i)
}

fn cout(i: u32) -> NodeRef {
    NodeRef::boundary_output(i)
}

fn out(scene: &Scene, node: NodeRef) -> State {
    scene.value(node, 0).unwrap()
}

/// Two-to-one multiplexer: `CIn@2 ? CIn@0 : CIn@1`.
fn mux() -> Scene {
    let mut scene = Scene::with_meta(SceneMeta::new("mux").with_author("tests")).unwrap();
    scene.setup_context(3, 1).unwrap();
    let not_s = scene.add_gate(GateType::Not, 1);
    let pick_a = scene.add_gate(GateType::And, 2);
    let pick_b = scene.add_gate(GateType::And, 2);
    let either = scene.add_gate(GateType::Or, 2);
    scene.connect(not_s, 0, cin(2), 0).unwrap();
    scene.connect(pick_a, 0, cin(0), 0).unwrap();
    scene.connect(pick_a, 1, cin(2), 0).unwrap();
    scene.connect(pick_b, 0, cin(1), 0).unwrap();
    scene.connect(pick_b, 1, not_s, 0).unwrap();
    scene.connect(either, 0, pick_a, 0).unwrap();
    scene.connect(either, 1, pick_b, 0).unwrap();
    scene.connect(cout(0), 0, either, 0).unwrap();
    scene
}

/// Half adder with sum on `COut@0` and carry on `COut@1`.
fn half_adder() -> Scene {
    let mut scene = Scene::with_meta(SceneMeta::new("half-adder")).unwrap();
    scene.setup_context(2, 2).unwrap();
    let sum = scene.add_gate(GateType::Xor, 2);
    let carry = scene.add_gate(GateType::And, 2);
    for gate in [sum, carry] {
        scene.connect(gate, 0, cin(0), 0).unwrap();
        scene.connect(gate, 1, cin(1), 0).unwrap();
    }
    scene.connect(cout(0), 0, sum, 0).unwrap();
    scene.connect(cout(1), 0, carry, 0).unwrap();
    scene
}

struct FullAdder {
    scene: Scene,
    a: NodeRef,
    b: NodeRef,
    c: NodeRef,
    sum: NodeRef,
    carry: NodeRef,
}

fn full_adder() -> FullAdder {
    let mut scene = Scene::new();
    let a = scene.add_input();
    let b = scene.add_input();
    let c = scene.add_input();
    let ab = scene.add_gate(GateType::Xor, 2);
    let abc = scene.add_gate(GateType::Xor, 2);
    let and_ab = scene.add_gate(GateType::And, 2);
    let and_c = scene.add_gate(GateType::And, 2);
    let or = scene.add_gate(GateType::Or, 2);
    let sum = scene.add_output();
    let carry = scene.add_output();
    scene.connect(ab, 0, a, 0).unwrap();
    scene.connect(ab, 1, b, 0).unwrap();
    scene.connect(abc, 0, ab, 0).unwrap();
    scene.connect(abc, 1, c, 0).unwrap();
    scene.connect(and_ab, 0, a, 0).unwrap();
    scene.connect(and_ab, 1, b, 0).unwrap();
    scene.connect(and_c, 0, ab, 0).unwrap();
    scene.connect(and_c, 1, c, 0).unwrap();
    scene.connect(or, 0, and_ab, 0).unwrap();
    scene.connect(or, 1, and_c, 0).unwrap();
    scene.connect(sum, 0, abc, 0).unwrap();
    scene.connect(carry, 0, or, 0).unwrap();
    FullAdder {
        scene,
        a,
        b,
        c,
        sum,
        carry,
    }
}

// ---------------------------------------------------------------------------
// Combinational circuits
// ---------------------------------------------------------------------------

#[test]
fn and_gate_truth_and_disabled() {
    let mut scene = Scene::new();
    let a = scene.add_input();
    let b = scene.add_input();
    let gate = scene.add_gate(GateType::And, 2);
    let o = scene.add_output();
    scene.connect(o, 0, gate, 0).unwrap();
    scene.connect(gate, 0, a, 0).unwrap();
    assert_eq!(out(&scene, o), State::Disabled);
    scene.connect(gate, 1, b, 0).unwrap();

    for (x, y, expected) in [
        (true, true, State::True),
        (true, false, State::False),
        (false, true, State::False),
        (false, false, State::False),
    ] {
        scene.set_input(a, x).unwrap();
        scene.set_input(b, y).unwrap();
        assert_eq!(out(&scene, o), expected, "{x} AND {y}");
    }
}

#[test]
fn full_adder_adds() {
    let mut fa = full_adder();
    for (bits, sum, carry) in [
        ((true, false, false), State::True, State::False),
        ((true, true, false), State::False, State::True),
        ((true, true, true), State::True, State::True),
        ((false, false, false), State::False, State::False),
        ((false, true, true), State::False, State::True),
    ] {
        fa.scene.set_input(fa.a, bits.0).unwrap();
        fa.scene.set_input(fa.b, bits.1).unwrap();
        fa.scene.set_input(fa.c, bits.2).unwrap();
        assert_eq!(out(&fa.scene, fa.sum), sum, "sum of {bits:?}");
        assert_eq!(out(&fa.scene, fa.carry), carry, "carry of {bits:?}");
    }
}

#[test]
fn reconnect_restores_value_without_toggling() {
    let mut scene = Scene::new();
    let input = scene.add_input();
    let o = scene.add_output();
    let rel = scene.connect(o, 0, input, 0).unwrap();
    scene.toggle(input).unwrap();
    assert_eq!(out(&scene, o), State::True);

    scene.disconnect(rel).unwrap();
    assert_eq!(out(&scene, o), State::Disabled);

    scene.connect(o, 0, input, 0).unwrap();
    assert_eq!(out(&scene, o), State::True);
}

#[test]
fn second_producer_is_rejected() {
    let mut scene = Scene::new();
    let a = scene.add_input();
    let b = scene.add_input();
    let o = scene.add_output();
    let rel = scene.connect(o, 0, a, 0).unwrap();
    scene.set_input(a, true).unwrap();
    assert_eq!(
        scene.connect(o, 0, b, 0),
        Err(CoreError::AlreadyConnected { node: o, socket: 0 })
    );
    assert_eq!(scene.get::<gatesim_core::Output>(o).unwrap().input(), rel);
    assert_eq!(out(&scene, o), State::True);
}

#[test]
fn removed_slot_is_reused_only_at_the_end() {
    let mut scene = Scene::new();
    let g0 = scene.add_gate(GateType::And, 2);
    let g1 = scene.add_gate(GateType::Or, 2);
    let g2 = scene.add_gate(GateType::Xor, 2);
    scene.remove_node(g1).unwrap();
    assert_eq!(scene.add_gate(GateType::Nor, 2).index, 3);
    scene.remove_node(g2).unwrap();
    scene.remove_node(NodeRef::new(NodeKind::Gate, 3)).unwrap();
    assert_eq!(scene.add_gate(GateType::Nand, 2).index, 1);
    assert!(scene.get::<Gate>(g0).is_some());
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[test]
fn mux_run_table() {
    let mut scene = mux();
    let mut context = scene.context_mut().unwrap();
    let expected = [0, 0, 1, 1, 0, 1, 0, 1];
    for (mask, &bit) in expected.iter().enumerate() {
        assert_eq!(context.run(mask as u64), bit, "run({mask:#05b})");
    }
}

#[test]
fn mux_as_component_node() {
    let mut top = Scene::new();
    let dep = top.add_dependency(mux());
    let component = top.add_component(dep).unwrap();
    let inputs: Vec<NodeRef> = (0..3).map(|_| top.add_input()).collect();
    let o = top.add_output();
    for (socket, &input) in inputs.iter().enumerate() {
        top.connect(component, socket as u32, input, 0).unwrap();
    }
    assert_eq!(out(&top, o), State::Disabled);
    top.connect(o, 0, component, 0).unwrap();
    assert_eq!(out(&top, o), State::False);

    top.set_input(inputs[1], true).unwrap();
    assert_eq!(out(&top, o), State::True);
    top.set_input(inputs[2], true).unwrap();
    assert_eq!(out(&top, o), State::False);
    top.set_input(inputs[0], true).unwrap();
    assert_eq!(out(&top, o), State::True);
}

#[test]
fn unconnected_component_input_disables_all_outputs() {
    let mut top = Scene::new();
    let dep = top.add_dependency(half_adder());
    let component = top.add_component(dep).unwrap();
    let a = top.add_input();
    top.connect(component, 0, a, 0).unwrap();
    let sum = top.add_output();
    let carry = top.add_output();
    top.connect(sum, 0, component, 0).unwrap();
    top.connect(carry, 0, component, 1).unwrap();
    assert_eq!(out(&top, sum), State::Disabled);
    assert_eq!(out(&top, carry), State::Disabled);
}

#[test]
fn multi_output_component_maps_bits_to_sockets() {
    let mut top = Scene::new();
    let dep = top.add_dependency(half_adder());
    let component = top.add_component(dep).unwrap();
    let a = top.add_input();
    let b = top.add_input();
    let sum = top.add_output();
    let carry = top.add_output();
    top.connect(component, 0, a, 0).unwrap();
    top.connect(component, 1, b, 0).unwrap();
    top.connect(sum, 0, component, 0).unwrap();
    top.connect(carry, 0, component, 1).unwrap();

    top.set_input(a, true).unwrap();
    assert_eq!((out(&top, sum), out(&top, carry)), (State::True, State::False));
    top.set_input(b, true).unwrap();
    assert_eq!((out(&top, sum), out(&top, carry)), (State::False, State::True));
    assert_eq!(top.value(component, 1), Some(State::True));
}

#[test]
fn shrinking_boundary_keeps_remaining_outputs() {
    let mut scene = half_adder();
    scene.setup_context(2, 1).unwrap();
    let mut context = scene.context_mut().unwrap();
    assert_eq!(context.run(0b01), 1);
    assert_eq!(context.run(0b11), 0);
    assert_eq!(context.output_count(), 1);
}

#[test]
fn nested_components_evaluate_recursively() {
    let mut adder = half_adder();
    adder.set_name("wrapped").unwrap();
    let mut wrapper = Scene::with_meta(SceneMeta::new("wrapper")).unwrap();
    wrapper.setup_context(2, 2).unwrap();
    let dep = wrapper.add_dependency(adder);
    let inner = wrapper.add_component(dep).unwrap();
    wrapper.connect(inner, 0, cin(0), 0).unwrap();
    wrapper.connect(inner, 1, cin(1), 0).unwrap();
    wrapper.connect(cout(0), 0, inner, 1).unwrap();
    wrapper.connect(cout(1), 0, inner, 0).unwrap();

    let mut context = wrapper.context_mut().unwrap();
    assert_eq!(context.run(0b11), 0b01);
    assert_eq!(context.run(0b10), 0b10);
    assert_eq!(context.run(0b00), 0b00);
}

#[test]
fn remove_dependency_reindexes_components() {
    let mut top = Scene::new();
    let first = top.add_dependency(half_adder());
    let second = top.add_dependency(mux());
    let doomed = top.add_component(first).unwrap();
    let kept = top.add_component(second).unwrap();
    top.remove_dependency(first).unwrap();

    assert!(top.get::<gatesim_core::Component>(doomed).is_none());
    let component = top.get::<gatesim_core::Component>(kept).unwrap();
    assert_eq!(component.dependency(), 0);
    assert_eq!(top.dependency(0).unwrap().name(), "mux");
    assert_eq!(
        top.remove_dependency(4),
        Err(CoreError::ComponentNotFound { index: 4 })
    );
}

#[test]
fn clone_is_independent() {
    let mut original = Scene::new();
    let dep = original.add_dependency(mux());
    original.add_component(dep).unwrap();
    let input = original.add_input();
    let o = original.add_output();
    original.connect(o, 0, input, 0).unwrap();

    let mut copy = original.clone();
    copy.toggle(input).unwrap();
    assert_eq!(out(&copy, o), State::True);
    assert_eq!(out(&original, o), State::False);
    assert_eq!(copy.dependencies().len(), 1);
}

#[test]
fn find_dependency_by_string() {
    let mut top = Scene::new();
    top.add_dependency(half_adder());
    top.add_dependency(mux());
    assert_eq!(top.find_dependency("tests/mux/0"), Some(1));
    assert_eq!(top.find_dependency("local/half-adder/0"), Some(0));
    assert_eq!(top.find_dependency("local/mux/0"), None);
}

#[test]
fn feedback_loop_is_reported() {
    let mut scene = Scene::new();
    let a = scene.add_input();
    let or = scene.add_gate(GateType::Or, 2);
    let and = scene.add_gate(GateType::And, 2);
    scene.connect(or, 0, a, 0).unwrap();
    scene.connect(and, 0, or, 0).unwrap();
    scene.connect(or, 1, and, 0).unwrap();
    assert_eq!(scene.feedback_loops(), vec![vec![or, and]]);
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn reload_reproduces_behaviour() {
    let mut scene = Scene::new();
    let a = scene.add_input();
    let b = scene.add_input();
    let c = scene.add_input();
    let or = scene.add_gate(GateType::Or, 2);
    let and = scene.add_gate(GateType::And, 2);
    let o = scene.add_output();
    scene.connect(or, 0, a, 0).unwrap();
    scene.connect(or, 1, b, 0).unwrap();
    scene.connect(and, 0, or, 0).unwrap();
    scene.connect(and, 1, c, 0).unwrap();
    scene.connect(o, 0, and, 0).unwrap();

    let saved = scene.to_bytes().unwrap();
    let steps = [(a, true), (c, true), (a, false), (b, true), (c, false)];
    let drive = |scene: &mut Scene| -> Vec<State> {
        steps
            .iter()
            .map(|&(node, value)| {
                scene.set_input(node, value).unwrap();
                out(scene, o)
            })
            .collect()
    };

    let before = drive(&mut scene);
    let mut reloaded = Scene::from_bytes(&saved).unwrap();
    assert_eq!(out(&reloaded, o), State::False);
    assert_eq!(drive(&mut reloaded), before);
    assert_eq!(
        before,
        vec![State::False, State::True, State::False, State::True, State::False]
    );
}

#[test]
fn round_trip_with_dependencies_and_context() {
    let mut top = Scene::with_meta(
        SceneMeta::new("top")
            .with_author("ada")
            .with_description("adds two bits")
            .with_version(7),
    )
    .unwrap();
    top.setup_context(2, 2).unwrap();
    let dep = top.add_dependency(half_adder());
    let component = top.add_component(dep).unwrap();
    top.connect(component, 0, cin(0), 0).unwrap();
    top.connect(component, 1, cin(1), 0).unwrap();
    top.connect(cout(0), 0, component, 0).unwrap();
    top.connect(cout(1), 0, component, 1).unwrap();
    top.context_mut().unwrap().run(0b11);

    let bytes = top.to_bytes().unwrap();
    let mut reloaded = Scene::from_bytes(&bytes).unwrap();
    assert_eq!(reloaded.meta(), top.meta());
    assert_eq!(reloaded.dependencies().len(), 1);
    assert!(reloaded.is_component());
    assert_eq!(reloaded.value(cout(1), 0), Some(State::True));
    assert_eq!(reloaded.to_bytes().unwrap().len(), bytes.len());
    assert_eq!(reloaded.context_mut().unwrap().run(0b01), 0b01);
}

#[test]
fn rebind_is_idempotent() {
    let mut top = Scene::new();
    let dep = top.add_dependency(half_adder());
    let component = top.add_component(dep).unwrap();
    let a = top.add_input();
    let b = top.add_input();
    top.connect(component, 0, a, 0).unwrap();
    top.connect(component, 1, b, 0).unwrap();
    top.set_input(a, true).unwrap();
    let before = top.to_bytes().unwrap();
    top.rebind();
    assert_eq!(top.to_bytes().unwrap(), before);
    assert_eq!(top.value(component, 0), Some(State::True));
}

#[test]
fn stale_relation_ids_are_distinguished() {
    let mut scene = Scene::new();
    let a = scene.add_input();
    let o = scene.add_output();
    let rel = scene.connect(o, 0, a, 0).unwrap();
    scene.remove_node(o).unwrap();
    assert_eq!(scene.disconnect(rel), Err(CoreError::RelNotFound { id: rel }));
    assert_eq!(
        scene.disconnect(RelId(rel.0 + 1)),
        Err(CoreError::InvalidRelId { id: RelId(rel.0 + 1) })
    );
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn pick(scene: &Scene, kind: NodeKind, n: u8) -> Option<NodeRef> {
    let nodes = scene.nodes(kind);
    (!nodes.is_empty()).then(|| nodes[n as usize % nodes.len()])
}

/// One random edit: `(operation, a, b)` interpreted against the scene's
/// current nodes. Invalid edits are skipped.
fn apply(scene: &mut Scene, (op, a, b): (u8, u8, u8)) {
    match op % 7 {
        0 => {
            scene.add_input();
        }
        1 => {
            scene.add_gate(GateType::ALL[a as usize % 7], 2 + (b as usize % 3));
        }
        2 => {
            scene.add_output();
        }
        3 => {
            let producer = if a % 2 == 0 {
                pick(scene, NodeKind::Input, b)
            } else {
                pick(scene, NodeKind::Gate, b)
            };
            let consumer = if b % 2 == 0 {
                pick(scene, NodeKind::Output, a)
            } else {
                pick(scene, NodeKind::Gate, a)
            };
            if let (Some(from), Some(to)) = (producer, consumer) {
                if !scene.closes_loop(from, to) {
                    let _ = scene.connect(to, u32::from(b % 3), from, 0);
                }
            }
        }
        4 => {
            if let Some(input) = pick(scene, NodeKind::Input, a) {
                let _ = scene.toggle(input);
            }
        }
        5 => {
            let kind = NodeKind::STORED[b as usize % 4];
            if let Some(node) = pick(scene, kind, a) {
                let _ = scene.remove_node(node);
            }
        }
        _ => {
            if let Some(rel) = scene.relations().sorted().get(a as usize).map(|r| r.id) {
                let _ = scene.disconnect(rel);
            }
        }
    }
}

proptest! {
    #[test]
    fn run_is_pure(mask in 0u64..8, repeats in 1usize..4) {
        let mut scene = mux();
        let mut context = scene.context_mut().unwrap();
        let first = context.run(mask);
        for _ in 0..repeats {
            prop_assert_eq!(context.run(mask), first);
        }
        let (a, b, s) = (mask & 1, (mask >> 1) & 1, (mask >> 2) & 1);
        prop_assert_eq!(first, if s == 1 { a } else { b });
    }

    #[test]
    fn random_edits_round_trip(edits in proptest::collection::vec(any::<(u8, u8, u8)>(), 0..60)) {
        let mut scene = Scene::new();
        for edit in edits {
            apply(&mut scene, edit);
        }
        let bytes = scene.to_bytes().unwrap();
        let reloaded = Scene::from_bytes(&bytes).unwrap();
        for kind in NodeKind::STORED {
            prop_assert_eq!(reloaded.count(kind), scene.count(kind));
        }
        prop_assert_eq!(reloaded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn disconnect_after_connect_disables(toggles in 0usize..3) {
        let mut scene = Scene::new();
        let input = scene.add_input();
        let not = scene.add_gate(GateType::Not, 1);
        let o = scene.add_output();
        scene.connect(o, 0, not, 0).unwrap();
        for _ in 0..toggles {
            scene.toggle(input).unwrap();
        }
        let rel = scene.connect(not, 0, input, 0).unwrap();
        prop_assert!(!out(&scene, o).is_disabled());
        scene.disconnect(rel).unwrap();
        prop_assert_eq!(out(&scene, o), State::Disabled);
    }
}

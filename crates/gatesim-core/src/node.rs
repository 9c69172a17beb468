//! Node types stored in a scene's arenas.
//!
//! Every stored node carries a [`NodeBase`] (editor position plus the
//! tombstone flag) and the relation ids bound to its sockets. Nodes never
//! point at each other directly: wiring is expressed only through relation
//! ids resolved by the owning [`Scene`](crate::scene::Scene).
//!
//! Node fields are read-only outside the crate; all mutation goes through
//! `Scene` so cached values and relation bookkeeping stay consistent.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::arena::NodeArena;
use crate::gate::GateType;
use crate::id::{NodeKind, RelId};
use crate::scene::Scene;
use crate::state::State;

/// Input socket list of a gate; most gates have two inputs.
pub type GateInputs = SmallVec<[RelId; 4]>;

/// Integer position of a node in the editor plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Point {
    pub fn new(x: i16, y: i16) -> Self {
        Point { x, y }
    }
}

/// Fields shared by every stored node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeBase {
    pub(crate) point: Point,
    pub(crate) null: bool,
}

/// Behavior common to all arena-stored node kinds.
pub trait SceneNode: Clone {
    /// The [`NodeKind`] tag of references to this node type.
    const KIND: NodeKind;

    fn base(&self) -> &NodeBase;

    fn base_mut(&mut self) -> &mut NodeBase;

    /// A tombstoned placeholder used to fill a removed slot.
    fn tombstone() -> Self;

    /// Every relation id bound to one of this node's sockets.
    fn incident(&self) -> Vec<RelId>;

    /// `true` iff every required socket has a relation bound to it.
    fn is_connected(&self) -> bool;

    /// A copy of this node with every socket unbound.
    fn unwired(&self) -> Self;

    /// The arena holding nodes of this type in `scene`.
    fn arena(scene: &Scene) -> &NodeArena<Self>;

    fn arena_mut(scene: &mut Scene) -> &mut NodeArena<Self>;

    fn point(&self) -> Point {
        self.base().point
    }

    fn is_null(&self) -> bool {
        self.base().null
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// A logic gate with a variable number of inputs and one fan-out output.
#[derive(Debug, Clone, PartialEq)]
pub struct Gate {
    pub(crate) base: NodeBase,
    pub(crate) gate_type: GateType,
    pub(crate) inputs: GateInputs,
    pub(crate) outputs: Vec<RelId>,
    pub(crate) value: State,
}

impl Gate {
    pub(crate) fn new(gate_type: GateType, inputs: usize) -> Self {
        let count = gate_type.clamp_inputs(inputs);
        Gate {
            base: NodeBase::default(),
            gate_type,
            inputs: SmallVec::from_elem(RelId::NONE, count),
            outputs: Vec::new(),
            value: State::Disabled,
        }
    }

    pub fn gate_type(&self) -> GateType {
        self.gate_type
    }

    /// Relation bound to each input socket, `RelId::NONE` when empty.
    pub fn inputs(&self) -> &[RelId] {
        &self.inputs
    }

    /// Relations driven by this gate's output.
    pub fn outputs(&self) -> &[RelId] {
        &self.outputs
    }

    /// The cached output value.
    pub fn get(&self) -> State {
        self.value
    }
}

impl SceneNode for Gate {
    const KIND: NodeKind = NodeKind::Gate;

    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn tombstone() -> Self {
        let mut gate = Gate::new(GateType::And, 2);
        gate.base.null = true;
        gate
    }

    fn incident(&self) -> Vec<RelId> {
        self.inputs
            .iter()
            .copied()
            .filter(|r| r.is_some())
            .chain(self.outputs.iter().copied())
            .collect()
    }

    fn is_connected(&self) -> bool {
        self.inputs.iter().all(|r| r.is_some())
    }

    fn unwired(&self) -> Self {
        let mut gate = self.clone();
        gate.inputs.iter_mut().for_each(|r| *r = RelId::NONE);
        gate.outputs.clear();
        gate.value = State::Disabled;
        gate
    }

    fn arena(scene: &Scene) -> &NodeArena<Self> {
        &scene.gates
    }

    fn arena_mut(scene: &mut Scene) -> &mut NodeArena<Self> {
        &mut scene.gates
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// How an input's value is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputMode {
    /// A literal toggled by the user.
    Toggle,
    /// A periodic source driven by the frame clock. The period is in
    /// tenths of a time unit and is never zero.
    Timer { period: u32 },
}

/// A signal source: a user toggle or a timer.
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub(crate) base: NodeBase,
    pub(crate) mode: InputMode,
    pub(crate) outputs: Vec<RelId>,
    pub(crate) value: State,
}

impl Input {
    pub(crate) fn new(mode: InputMode) -> Self {
        Input {
            base: NodeBase::default(),
            mode,
            outputs: Vec::new(),
            value: State::False,
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn is_timer(&self) -> bool {
        matches!(self.mode, InputMode::Timer { .. })
    }

    /// Timer period in tenths of a time unit, `None` for toggles.
    pub fn period(&self) -> Option<u32> {
        match self.mode {
            InputMode::Timer { period } => Some(period),
            InputMode::Toggle => None,
        }
    }

    pub fn outputs(&self) -> &[RelId] {
        &self.outputs
    }

    pub fn get(&self) -> State {
        self.value
    }
}

impl SceneNode for Input {
    const KIND: NodeKind = NodeKind::Input;

    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn tombstone() -> Self {
        let mut input = Input::new(InputMode::Toggle);
        input.base.null = true;
        input
    }

    fn incident(&self) -> Vec<RelId> {
        self.outputs.clone()
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn unwired(&self) -> Self {
        let mut input = self.clone();
        input.outputs.clear();
        input
    }

    fn arena(scene: &Scene) -> &NodeArena<Self> {
        &scene.inputs
    }

    fn arena_mut(scene: &mut Scene) -> &mut NodeArena<Self> {
        &mut scene.inputs
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A signal sink mirroring the value of its single input relation.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub(crate) base: NodeBase,
    pub(crate) input: RelId,
    pub(crate) value: State,
}

impl Output {
    pub(crate) fn new() -> Self {
        Output {
            base: NodeBase::default(),
            input: RelId::NONE,
            value: State::Disabled,
        }
    }

    pub fn input(&self) -> RelId {
        self.input
    }

    pub fn get(&self) -> State {
        self.value
    }
}

impl SceneNode for Output {
    const KIND: NodeKind = NodeKind::Output;

    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn tombstone() -> Self {
        let mut output = Output::new();
        output.base.null = true;
        output
    }

    fn incident(&self) -> Vec<RelId> {
        if self.input.is_some() {
            vec![self.input]
        } else {
            Vec::new()
        }
    }

    fn is_connected(&self) -> bool {
        self.input.is_some()
    }

    fn unwired(&self) -> Self {
        let mut output = self.clone();
        output.input = RelId::NONE;
        output.value = State::Disabled;
        output
    }

    fn arena(scene: &Scene) -> &NodeArena<Self> {
        &scene.outputs
    }

    fn arena_mut(scene: &mut Scene) -> &mut NodeArena<Self> {
        &mut scene.outputs
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// An instance of a dependency sub-graph used as a black-box function.
///
/// Socket counts mirror the dependency's component context: one input
/// socket per boundary input, one fan-out list and cached value per
/// boundary output.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub(crate) base: NodeBase,
    pub(crate) dependency: usize,
    pub(crate) inputs: Vec<RelId>,
    pub(crate) outputs: Vec<Vec<RelId>>,
    pub(crate) values: Vec<State>,
}

impl Component {
    pub(crate) fn new(dependency: usize, inputs: usize, outputs: usize) -> Self {
        Component {
            base: NodeBase::default(),
            dependency,
            inputs: vec![RelId::NONE; inputs],
            outputs: vec![Vec::new(); outputs],
            values: vec![State::Disabled; outputs],
        }
    }

    /// Index of the dependency scene this component instantiates.
    pub fn dependency(&self) -> usize {
        self.dependency
    }

    pub fn inputs(&self) -> &[RelId] {
        &self.inputs
    }

    /// Fan-out list of each output socket.
    pub fn outputs(&self) -> &[Vec<RelId>] {
        &self.outputs
    }

    /// Cached value of output socket `socket`.
    pub fn get(&self, socket: usize) -> Option<State> {
        self.values.get(socket).copied()
    }

    pub fn values(&self) -> &[State] {
        &self.values
    }
}

impl SceneNode for Component {
    const KIND: NodeKind = NodeKind::Component;

    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn tombstone() -> Self {
        let mut component = Component::new(0, 0, 0);
        component.base.null = true;
        component
    }

    fn incident(&self) -> Vec<RelId> {
        self.inputs
            .iter()
            .copied()
            .filter(|r| r.is_some())
            .chain(self.outputs.iter().flatten().copied())
            .collect()
    }

    fn is_connected(&self) -> bool {
        self.inputs.iter().all(|r| r.is_some())
    }

    fn unwired(&self) -> Self {
        let mut component = self.clone();
        component.inputs.iter_mut().for_each(|r| *r = RelId::NONE);
        component.outputs.iter_mut().for_each(Vec::clear);
        component.values.iter_mut().for_each(|v| *v = State::Disabled);
        component
    }

    fn arena(scene: &Scene) -> &NodeArena<Self> {
        &scene.components
    }

    fn arena_mut(scene: &mut Scene) -> &mut NodeArena<Self> {
        &mut scene.components
    }
}

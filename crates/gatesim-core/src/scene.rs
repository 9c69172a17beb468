//! Scene: the unit of composition tying node arenas, relations and
//! embedded dependencies together.
//!
//! [`Scene`] is the single entry point for building and mutating a circuit.
//! Every mutation completes its full propagation cascade before returning,
//! and every recoverable error is raised before anything is changed.
//!
//! Dependencies are owned values: adding one moves a scene into this one,
//! and cloning a scene deep-copies its whole dependency tree. Components
//! refer to their dependency by index only, so there is nothing to patch
//! after a move or clone beyond [`Scene::rebind`] re-deriving socket counts.

use crate::arena::NodeArena;
use crate::context::ComponentContext;
use crate::error::CoreError;
use crate::gate::{GateType, MAX_GATE_INPUTS, MIN_GATE_INPUTS};
use crate::id::{NodeKind, NodeRef, RelId, SocketId};
use crate::meta::{self, SceneMeta, AUTHOR_LIMIT, DESCRIPTION_LIMIT, NAME_LIMIT};
use crate::node::{Component, Gate, Input, InputMode, NodeBase, Output, Point, SceneNode};
use crate::propagate::Job;
use crate::relation::{Endpoint, Relation, RelationTable};
use crate::state::State;

/// Frame clock driving timer inputs. Not persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct FrameClock {
    pub(crate) seconds: f64,
    pub(crate) tick: u64,
}

/// A circuit graph.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub(crate) meta: SceneMeta,
    pub(crate) gates: NodeArena<Gate>,
    pub(crate) inputs: NodeArena<Input>,
    pub(crate) outputs: NodeArena<Output>,
    pub(crate) components: NodeArena<Component>,
    pub(crate) rels: RelationTable,
    pub(crate) dependencies: Vec<Scene>,
    pub(crate) context: Option<ComponentContext>,
    pub(crate) clock: FrameClock,
}

impl Scene {
    /// Creates an empty, unnamed scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty scene with the given identity.
    pub fn with_meta(meta: SceneMeta) -> Result<Self, CoreError> {
        meta.validate()?;
        Ok(Scene {
            meta,
            ..Self::default()
        })
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    pub fn meta(&self) -> &SceneMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn author(&self) -> &str {
        &self.meta.author
    }

    pub fn description(&self) -> &str {
        &self.meta.description
    }

    pub fn version(&self) -> i32 {
        self.meta.version
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), CoreError> {
        let name = name.into();
        meta::check("name", &name, NAME_LIMIT)?;
        self.meta.name = name;
        Ok(())
    }

    pub fn set_author(&mut self, author: impl Into<String>) -> Result<(), CoreError> {
        let author = author.into();
        meta::check("author", &author, AUTHOR_LIMIT)?;
        self.meta.author = author;
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), CoreError> {
        let description = description.into();
        meta::check("description", &description, DESCRIPTION_LIMIT)?;
        self.meta.description = description;
        Ok(())
    }

    pub fn set_version(&mut self, version: i32) {
        self.meta.version = version;
    }

    /// The `author/name/version` string naming this scene as a dependency.
    pub fn to_dependency(&self) -> String {
        self.meta.to_dependency()
    }

    // -----------------------------------------------------------------------
    // Node store
    // -----------------------------------------------------------------------

    /// Adds a gate. The input count is clamped to the gate type's arity.
    pub fn add_gate(&mut self, gate_type: GateType, inputs: usize) -> NodeRef {
        let index = self.gates.alloc(Gate::new(gate_type, inputs));
        let node = NodeRef::new(NodeKind::Gate, index);
        tracing::info!("added {} gate {}", gate_type, node);
        node
    }

    /// Adds a toggle input holding `FALSE`.
    pub fn add_input(&mut self) -> NodeRef {
        let index = self.inputs.alloc(Input::new(InputMode::Toggle));
        let node = NodeRef::new(NodeKind::Input, index);
        tracing::info!("added input {}", node);
        node
    }

    /// Adds a timer input with `period` in tenths of a time unit.
    pub fn add_timer(&mut self, period: u32) -> Result<NodeRef, CoreError> {
        if period == 0 {
            return Err(CoreError::invalid_argument("timer period must be positive"));
        }
        let mut input = Input::new(InputMode::Timer { period });
        input.value = timer_value(self.clock.tick, period);
        let index = self.inputs.alloc(input);
        let node = NodeRef::new(NodeKind::Input, index);
        tracing::info!("added timer {} with period {}", node, period);
        Ok(node)
    }

    pub fn add_output(&mut self) -> NodeRef {
        let index = self.outputs.alloc(Output::new());
        let node = NodeRef::new(NodeKind::Output, index);
        tracing::info!("added output {}", node);
        node
    }

    /// Adds a component instantiating dependency `dependency`, with one
    /// socket per boundary socket of that dependency's context.
    pub fn add_component(&mut self, dependency: usize) -> Result<NodeRef, CoreError> {
        let scene = self
            .dependencies
            .get(dependency)
            .ok_or(CoreError::ComponentNotFound { index: dependency })?;
        let context = scene.context.as_ref().ok_or(CoreError::NotAComponent)?;
        let component = Component::new(dependency, context.input_count(), context.output_count());
        let index = self.components.alloc(component);
        let node = NodeRef::new(NodeKind::Component, index);
        tracing::info!("added component {} of {}", node, scene.to_dependency());
        self.propagate(vec![Job::Evaluate(node)]);
        Ok(node)
    }

    /// Returns the live node `node` points at, if it is of type `T`.
    pub fn get<T: SceneNode>(&self, node: NodeRef) -> Option<&T> {
        if node.kind != T::KIND {
            return None;
        }
        T::arena(self).get(node.index)
    }

    pub fn gates(&self) -> &NodeArena<Gate> {
        &self.gates
    }

    pub fn inputs(&self) -> &NodeArena<Input> {
        &self.inputs
    }

    pub fn outputs(&self) -> &NodeArena<Output> {
        &self.outputs
    }

    pub fn components(&self) -> &NodeArena<Component> {
        &self.components
    }

    /// Returns `true` if `node` names a live node or an existing boundary
    /// socket.
    pub fn contains(&self, node: NodeRef) -> bool {
        match node.kind {
            NodeKind::Gate => self.gates.get(node.index).is_some(),
            NodeKind::Input => self.inputs.get(node.index).is_some(),
            NodeKind::Output => self.outputs.get(node.index).is_some(),
            NodeKind::Component => self.components.get(node.index).is_some(),
            NodeKind::ComponentInputBoundary => self
                .context
                .as_ref()
                .is_some_and(|c| node.slot() < c.input_count()),
            NodeKind::ComponentOutputBoundary => self
                .context
                .as_ref()
                .is_some_and(|c| node.slot() < c.output_count()),
        }
    }

    /// Live nodes of `kind` in index order.
    pub fn nodes(&self, kind: NodeKind) -> Vec<NodeRef> {
        let indices: Vec<u32> = match kind {
            NodeKind::Gate => self.gates.iter().map(|(i, _)| i).collect(),
            NodeKind::Input => self.inputs.iter().map(|(i, _)| i).collect(),
            NodeKind::Output => self.outputs.iter().map(|(i, _)| i).collect(),
            NodeKind::Component => self.components.iter().map(|(i, _)| i).collect(),
            NodeKind::ComponentInputBoundary => {
                let n = self.context.as_ref().map_or(0, |c| c.input_count());
                (0..n as u32).collect()
            }
            NodeKind::ComponentOutputBoundary => {
                let n = self.context.as_ref().map_or(0, |c| c.output_count());
                (0..n as u32).collect()
            }
        };
        indices.into_iter().map(|i| NodeRef::new(kind, i)).collect()
    }

    /// Number of live nodes of `kind`.
    pub fn count(&self, kind: NodeKind) -> usize {
        match kind {
            NodeKind::Gate => self.gates.live(),
            NodeKind::Input => self.inputs.live(),
            NodeKind::Output => self.outputs.live(),
            NodeKind::Component => self.components.live(),
            _ => self.nodes(kind).len(),
        }
    }

    /// Current value at `socket` of `node`: a gate, input or output's
    /// cached value, a component output socket, or a boundary socket.
    pub fn value(&self, node: NodeRef, socket: SocketId) -> Option<State> {
        match node.kind {
            NodeKind::Gate => self.gates.get(node.index).map(Gate::get),
            NodeKind::Input => self.inputs.get(node.index).map(Input::get),
            NodeKind::Output => self.outputs.get(node.index).map(Output::get),
            NodeKind::Component => self
                .components
                .get(node.index)
                .and_then(|c| c.get(socket as usize)),
            NodeKind::ComponentInputBoundary | NodeKind::ComponentOutputBoundary => {
                self.context.as_ref()?.value(node).ok()
            }
        }
    }

    fn base(&self, node: NodeRef) -> Option<&NodeBase> {
        match node.kind {
            NodeKind::Gate => self.gates.get(node.index).map(SceneNode::base),
            NodeKind::Input => self.inputs.get(node.index).map(SceneNode::base),
            NodeKind::Output => self.outputs.get(node.index).map(SceneNode::base),
            NodeKind::Component => self.components.get(node.index).map(SceneNode::base),
            _ => None,
        }
    }

    fn base_mut(&mut self, node: NodeRef) -> Option<&mut NodeBase> {
        match node.kind {
            NodeKind::Gate => self.gates.get_mut(node.index).map(SceneNode::base_mut),
            NodeKind::Input => self.inputs.get_mut(node.index).map(SceneNode::base_mut),
            NodeKind::Output => self.outputs.get_mut(node.index).map(SceneNode::base_mut),
            NodeKind::Component => self.components.get_mut(node.index).map(SceneNode::base_mut),
            _ => None,
        }
    }

    /// Rejects boundary references and absent nodes.
    fn check_stored(&self, node: NodeRef) -> Result<(), CoreError> {
        if node.kind.is_boundary() {
            return Err(CoreError::InvalidNode { node });
        }
        if self.base(node).is_none() {
            return Err(CoreError::NodeNotFound { node });
        }
        Ok(())
    }

    pub fn point(&self, node: NodeRef) -> Option<Point> {
        self.base(node).map(|b| b.point)
    }

    pub fn move_node(&mut self, node: NodeRef, point: Point) -> Result<(), CoreError> {
        self.check_stored(node)?;
        if let Some(base) = self.base_mut(node) {
            base.point = point;
        }
        Ok(())
    }

    /// Every relation touching `node`, without duplicates.
    fn incident(&self, node: NodeRef) -> Vec<RelId> {
        let mut rels = match node.kind {
            NodeKind::Gate => self.gates.get(node.index).map(SceneNode::incident),
            NodeKind::Input => self.inputs.get(node.index).map(SceneNode::incident),
            NodeKind::Output => self.outputs.get(node.index).map(SceneNode::incident),
            NodeKind::Component => self.components.get(node.index).map(SceneNode::incident),
            _ => None,
        }
        .unwrap_or_default();
        rels.sort();
        rels.dedup();
        rels
    }

    /// Detaches every relation touching `node` and tombstones it.
    pub fn remove_node(&mut self, node: NodeRef) -> Result<(), CoreError> {
        self.check_stored(node)?;
        for id in self.incident(node) {
            self.disconnect(id)?;
        }
        let removed = match node.kind {
            NodeKind::Gate => self.gates.remove(node.index),
            NodeKind::Input => self.inputs.remove(node.index),
            NodeKind::Output => self.outputs.remove(node.index),
            NodeKind::Component => self.components.remove(node.index),
            _ => false,
        };
        debug_assert!(removed, "live node vanished during removal");
        tracing::info!("removed {}", node);
        Ok(())
    }

    /// Appends an unconnected copy of a live node.
    pub fn duplicate_node(&mut self, node: NodeRef) -> Result<NodeRef, CoreError> {
        self.check_stored(node)?;
        let index = match node.kind {
            NodeKind::Gate => duplicate(&mut self.gates, node.index),
            NodeKind::Input => duplicate(&mut self.inputs, node.index),
            NodeKind::Output => duplicate(&mut self.outputs, node.index),
            NodeKind::Component => duplicate(&mut self.components, node.index),
            _ => None,
        }
        .ok_or(CoreError::NodeNotFound { node })?;
        let copy = NodeRef::new(node.kind, index);
        tracing::info!("duplicated {} as {}", node, copy);
        self.propagate(vec![Job::Evaluate(copy)]);
        Ok(copy)
    }

    // -----------------------------------------------------------------------
    // Relations
    // -----------------------------------------------------------------------

    /// Connects producer socket `from:from_socket` to consumer socket
    /// `to:to_socket` and propagates the producer's current value through
    /// the new relation.
    pub fn connect(
        &mut self,
        to: NodeRef,
        to_socket: SocketId,
        from: NodeRef,
        from_socket: SocketId,
    ) -> Result<RelId, CoreError> {
        if !from.kind.is_producer() {
            return Err(CoreError::InvalidFromType { kind: from.kind });
        }
        if !to.kind.is_consumer() {
            return Err(CoreError::InvalidToType { kind: to.kind });
        }
        if (from.kind.is_boundary() || to.kind.is_boundary()) && self.context.is_none() {
            return Err(CoreError::NotAComponent);
        }
        let from_ep = Endpoint::new(from, from_socket);
        let to_ep = Endpoint::new(to, to_socket);
        self.fan_out(from_ep)?;
        if self.consumer(to_ep)?.is_some() {
            return Err(CoreError::AlreadyConnected {
                node: to,
                socket: to_socket,
            });
        }

        let id = self.rels.next_id()?;
        let looped = self.closes_loop(from, to);
        *self.consumer_mut(to_ep)? = id;
        self.fan_out_mut(from_ep)?.push(id);
        self.rels.insert(Relation {
            id,
            from: from_ep,
            to: to_ep,
            value: State::Disabled,
        });
        tracing::info!(
            "connected {}:{} -> {}:{} as relation {}",
            from,
            from_socket,
            to,
            to_socket,
            id
        );
        if looped {
            tracing::warn!(
                "relation {} closes a feedback loop through {}; propagation may not settle",
                id,
                to
            );
        }

        let value = self.produced(from_ep);
        self.propagate(vec![Job::Signal {
            id,
            value,
            force: true,
        }]);
        Ok(id)
    }

    /// Removes relation `id` and re-evaluates its now undriven consumer.
    pub fn disconnect(&mut self, id: RelId) -> Result<(), CoreError> {
        let rel = self.rels.lookup(id)?.clone();
        if self.consumer(rel.to).ok() != Some(id) {
            return Err(CoreError::NotConnected {
                node: rel.to.node,
                socket: rel.to.socket,
            });
        }
        *self.consumer_mut(rel.to)? = RelId::NONE;
        if let Ok(list) = self.fan_out_mut(rel.from) {
            list.retain(|r| *r != id);
        }
        self.rels.remove(id);
        tracing::info!("disconnected relation {}", id);
        self.propagate(vec![Job::Evaluate(rel.to.node)]);
        Ok(())
    }

    pub fn rel(&self, id: RelId) -> Option<&Relation> {
        self.rels.get(id)
    }

    pub fn relations(&self) -> &RelationTable {
        &self.rels
    }

    /// Relation id held by a consumer socket.
    pub(crate) fn consumer(&self, ep: Endpoint) -> Result<RelId, CoreError> {
        let node = ep.node;
        let socket = ep.socket as usize;
        let missing = CoreError::NodeNotFound { node };
        let slot = match node.kind {
            NodeKind::Gate => self.gates.get(node.index).ok_or(missing)?.inputs.get(socket),
            NodeKind::Output => {
                let output = self.outputs.get(node.index).ok_or(missing)?;
                (socket == 0).then_some(&output.input)
            }
            NodeKind::Component => self
                .components
                .get(node.index)
                .ok_or(missing)?
                .inputs
                .get(socket),
            NodeKind::ComponentOutputBoundary => {
                let context = self.context.as_ref().ok_or(CoreError::NotAComponent)?;
                let output = context.outputs.get(node.slot()).ok_or(missing)?;
                (socket == 0).then_some(&output.input)
            }
            NodeKind::Input | NodeKind::ComponentInputBoundary => {
                return Err(CoreError::InvalidToType { kind: node.kind })
            }
        };
        slot.copied().ok_or_else(|| no_socket(ep))
    }

    pub(crate) fn consumer_mut(&mut self, ep: Endpoint) -> Result<&mut RelId, CoreError> {
        let node = ep.node;
        let socket = ep.socket as usize;
        let missing = CoreError::NodeNotFound { node };
        let slot = match node.kind {
            NodeKind::Gate => self
                .gates
                .get_mut(node.index)
                .ok_or(missing)?
                .inputs
                .get_mut(socket),
            NodeKind::Output => {
                let output = self.outputs.get_mut(node.index).ok_or(missing)?;
                (socket == 0).then_some(&mut output.input)
            }
            NodeKind::Component => self
                .components
                .get_mut(node.index)
                .ok_or(missing)?
                .inputs
                .get_mut(socket),
            NodeKind::ComponentOutputBoundary => {
                let context = self.context.as_mut().ok_or(CoreError::NotAComponent)?;
                let output = context.outputs.get_mut(node.slot()).ok_or(missing)?;
                (socket == 0).then_some(&mut output.input)
            }
            NodeKind::Input | NodeKind::ComponentInputBoundary => {
                return Err(CoreError::InvalidToType { kind: node.kind })
            }
        };
        slot.ok_or_else(|| no_socket(ep))
    }

    /// Fan-out list of a producer socket.
    pub(crate) fn fan_out(&self, ep: Endpoint) -> Result<&Vec<RelId>, CoreError> {
        let node = ep.node;
        let socket = ep.socket as usize;
        let missing = CoreError::NodeNotFound { node };
        let list = match node.kind {
            NodeKind::Gate => {
                let gate = self.gates.get(node.index).ok_or(missing)?;
                (socket == 0).then_some(&gate.outputs)
            }
            NodeKind::Input => {
                let input = self.inputs.get(node.index).ok_or(missing)?;
                (socket == 0).then_some(&input.outputs)
            }
            NodeKind::Component => self
                .components
                .get(node.index)
                .ok_or(missing)?
                .outputs
                .get(socket),
            NodeKind::ComponentInputBoundary => {
                let context = self.context.as_ref().ok_or(CoreError::NotAComponent)?;
                let input = context.inputs.get(node.slot()).ok_or(missing)?;
                (socket == 0).then_some(&input.outputs)
            }
            NodeKind::Output | NodeKind::ComponentOutputBoundary => {
                return Err(CoreError::InvalidFromType { kind: node.kind })
            }
        };
        list.ok_or_else(|| no_socket(ep))
    }

    pub(crate) fn fan_out_mut(&mut self, ep: Endpoint) -> Result<&mut Vec<RelId>, CoreError> {
        let node = ep.node;
        let socket = ep.socket as usize;
        let missing = CoreError::NodeNotFound { node };
        let list = match node.kind {
            NodeKind::Gate => {
                let gate = self.gates.get_mut(node.index).ok_or(missing)?;
                (socket == 0).then_some(&mut gate.outputs)
            }
            NodeKind::Input => {
                let input = self.inputs.get_mut(node.index).ok_or(missing)?;
                (socket == 0).then_some(&mut input.outputs)
            }
            NodeKind::Component => self
                .components
                .get_mut(node.index)
                .ok_or(missing)?
                .outputs
                .get_mut(socket),
            NodeKind::ComponentInputBoundary => {
                let context = self.context.as_mut().ok_or(CoreError::NotAComponent)?;
                let input = context.inputs.get_mut(node.slot()).ok_or(missing)?;
                (socket == 0).then_some(&mut input.outputs)
            }
            NodeKind::Output | NodeKind::ComponentOutputBoundary => {
                return Err(CoreError::InvalidFromType { kind: node.kind })
            }
        };
        list.ok_or_else(|| no_socket(ep))
    }

    /// Value currently produced at a producer socket.
    pub(crate) fn produced(&self, ep: Endpoint) -> State {
        self.value(ep.node, ep.socket).unwrap_or(State::Disabled)
    }

    // -----------------------------------------------------------------------
    // Inputs and gate sockets
    // -----------------------------------------------------------------------

    fn input_mut(&mut self, node: NodeRef) -> Result<&mut Input, CoreError> {
        if node.kind != NodeKind::Input {
            return Err(CoreError::InvalidNode { node });
        }
        self.inputs
            .get_mut(node.index)
            .ok_or(CoreError::NodeNotFound { node })
    }

    /// Sets an input's literal and propagates it to every consumer.
    pub fn set_input(&mut self, node: NodeRef, value: bool) -> Result<(), CoreError> {
        self.input_mut(node)?.value = State::from(value);
        tracing::debug!("set {} to {}", node, value);
        self.propagate(vec![Job::Evaluate(node)]);
        Ok(())
    }

    /// Flips an input's literal and returns the new value.
    pub fn toggle(&mut self, node: NodeRef) -> Result<State, CoreError> {
        let current = self.input_mut(node)?.value;
        let next = !current.as_bool().unwrap_or(false);
        self.set_input(node, next)?;
        Ok(State::from(next))
    }

    /// Changes a timer's period, in tenths of a time unit.
    pub fn set_period(&mut self, node: NodeRef, period: u32) -> Result<(), CoreError> {
        let tick = self.clock.tick;
        let input = self.input_mut(node)?;
        if !input.is_timer() {
            return Err(CoreError::invalid_argument(format!("{node} is not a timer")));
        }
        if period == 0 {
            return Err(CoreError::invalid_argument("timer period must be positive"));
        }
        input.mode = InputMode::Timer { period };
        input.value = timer_value(tick, period);
        self.propagate(vec![Job::Evaluate(node)]);
        Ok(())
    }

    fn gate_mut(&mut self, node: NodeRef) -> Result<&mut Gate, CoreError> {
        if node.kind != NodeKind::Gate {
            return Err(CoreError::InvalidNode { node });
        }
        self.gates
            .get_mut(node.index)
            .ok_or(CoreError::NodeNotFound { node })
    }

    /// Adds an empty input socket to a gate. Returns `false` for NOT gates
    /// and gates already at the maximum arity.
    pub fn increment(&mut self, node: NodeRef) -> Result<bool, CoreError> {
        let gate = self.gate_mut(node)?;
        if gate.gate_type == GateType::Not || gate.inputs.len() >= MAX_GATE_INPUTS {
            return Ok(false);
        }
        gate.inputs.push(RelId::NONE);
        tracing::debug!("{} now has {} inputs", node, gate.inputs.len());
        self.propagate(vec![Job::Evaluate(node)]);
        Ok(true)
    }

    /// Drops a gate's last input socket. Returns `false` at the minimum
    /// arity or while that socket is connected.
    pub fn decrement(&mut self, node: NodeRef) -> Result<bool, CoreError> {
        let gate = self.gate_mut(node)?;
        if gate.gate_type == GateType::Not || gate.inputs.len() <= MIN_GATE_INPUTS {
            return Ok(false);
        }
        if gate.inputs.last().is_some_and(|r| r.is_some()) {
            return Ok(false);
        }
        gate.inputs.pop();
        tracing::debug!("{} now has {} inputs", node, gate.inputs.len());
        self.propagate(vec![Job::Evaluate(node)]);
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Dependencies
    // -----------------------------------------------------------------------

    /// Moves `scene` into the dependency list and returns its index.
    pub fn add_dependency(&mut self, mut scene: Scene) -> usize {
        scene.rebind();
        tracing::info!("added dependency {}", scene.to_dependency());
        self.dependencies.push(scene);
        self.dependencies.len() - 1
    }

    pub fn dependency(&self, index: usize) -> Option<&Scene> {
        self.dependencies.get(index)
    }

    pub fn dependencies(&self) -> &[Scene] {
        &self.dependencies
    }

    /// Index of the dependency named by `dependency` (`author/name/version`).
    pub fn find_dependency(&self, dependency: &str) -> Option<usize> {
        self.dependencies
            .iter()
            .position(|d| d.to_dependency() == dependency)
    }

    /// Removes dependency `index` together with every component bound to
    /// it. Components of later dependencies are re-indexed.
    pub fn remove_dependency(&mut self, index: usize) -> Result<(), CoreError> {
        if index >= self.dependencies.len() {
            return Err(CoreError::ComponentNotFound { index });
        }
        let bound: Vec<NodeRef> = self
            .components
            .iter()
            .filter(|(_, c)| c.dependency == index)
            .map(|(i, _)| NodeRef::new(NodeKind::Component, i))
            .collect();
        for node in bound {
            self.remove_node(node)?;
        }
        let removed = self.dependencies.remove(index);
        for (_, component) in self.components.iter_mut() {
            if component.dependency > index {
                component.dependency -= 1;
            }
        }
        tracing::info!("removed dependency {}", removed.to_dependency());
        Ok(())
    }

    /// Re-derives every component's socket counts from its dependency's
    /// context and refreshes component outputs, innermost scenes first.
    ///
    /// Relations bound to sockets that no longer exist are detached.
    pub fn rebind(&mut self) {
        for dependency in &mut self.dependencies {
            dependency.rebind();
        }
        let indices: Vec<u32> = self.components.iter().map(|(i, _)| i).collect();
        for index in indices {
            let node = NodeRef::new(NodeKind::Component, index);
            let Some(component) = self.components.get(index) else {
                continue;
            };
            let (inputs, outputs) = self
                .dependencies
                .get(component.dependency)
                .and_then(|d| d.context.as_ref())
                .map_or((0, 0), |c| (c.input_count(), c.output_count()));
            let stale: Vec<RelId> = component
                .inputs
                .iter()
                .skip(inputs)
                .copied()
                .filter(|r| r.is_some())
                .chain(component.outputs.iter().skip(outputs).flatten().copied())
                .collect();
            for id in stale {
                if let Err(err) = self.disconnect(id) {
                    tracing::warn!("could not detach relation {} from {}: {}", id, node, err);
                }
            }
            if let Some(component) = self.components.get_mut(index) {
                component.inputs.resize(inputs, RelId::NONE);
                component.outputs.resize(outputs, Vec::new());
                component.values.resize(outputs, State::Disabled);
            }
            self.propagate(vec![Job::Evaluate(node)]);
        }
    }

    // -----------------------------------------------------------------------
    // Frame clock
    // -----------------------------------------------------------------------

    /// Advances the frame clock by `delta_seconds` and re-evaluates timers
    /// whenever the clock crosses into a new tenth.
    pub fn tick(&mut self, delta_seconds: f64) {
        if !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            return;
        }
        self.clock.seconds += delta_seconds;
        let tick = (self.clock.seconds * 10.0).floor() as u64;
        if tick == self.clock.tick {
            return;
        }
        self.clock.tick = tick;
        let mut jobs = Vec::new();
        for (index, input) in self.inputs.iter_mut() {
            if let InputMode::Timer { period } = input.mode {
                let value = timer_value(tick, period);
                if value != input.value {
                    input.value = value;
                    jobs.push(Job::Evaluate(NodeRef::new(NodeKind::Input, index)));
                }
            }
        }
        self.propagate(jobs);
    }

    /// Tenths of a time unit elapsed on the frame clock.
    pub fn frame_tick(&self) -> u64 {
        self.clock.tick
    }
}

fn timer_value(tick: u64, period: u32) -> State {
    State::from((tick / u64::from(period.max(1))) % 2 == 1)
}

fn duplicate<T: SceneNode>(arena: &mut NodeArena<T>, index: u32) -> Option<u32> {
    let copy = arena.get(index)?.unwired();
    Some(arena.alloc(copy))
}

fn no_socket(ep: Endpoint) -> CoreError {
    CoreError::invalid_argument(format!("{} has no socket {}", ep.node, ep.socket))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn and_scene() -> (Scene, NodeRef, NodeRef, NodeRef, NodeRef) {
        let mut scene = Scene::new();
        let a = scene.add_input();
        let b = scene.add_input();
        let gate = scene.add_gate(GateType::And, 2);
        let out = scene.add_output();
        scene.connect(gate, 0, a, 0).unwrap();
        scene.connect(gate, 1, b, 0).unwrap();
        scene.connect(out, 0, gate, 0).unwrap();
        (scene, a, b, gate, out)
    }

    #[test]
    fn and_gate_follows_inputs() {
        let (mut scene, a, b, _, out) = and_scene();
        assert_eq!(scene.value(out, 0), Some(State::False));
        scene.set_input(a, true).unwrap();
        scene.set_input(b, true).unwrap();
        assert_eq!(scene.value(out, 0), Some(State::True));
        scene.set_input(b, false).unwrap();
        assert_eq!(scene.value(out, 0), Some(State::False));
    }

    #[test]
    fn unconnected_gate_input_disables() {
        let (mut scene, a, _, gate, out) = and_scene();
        scene.set_input(a, true).unwrap();
        let id = scene.get::<Gate>(gate).unwrap().inputs()[1];
        scene.disconnect(id).unwrap();
        assert_eq!(scene.value(out, 0), Some(State::Disabled));
    }

    #[test]
    fn connect_validates_endpoints() {
        let (mut scene, a, _, gate, out) = and_scene();
        assert_eq!(
            scene.connect(gate, 0, out, 0),
            Err(CoreError::InvalidFromType {
                kind: NodeKind::Output
            })
        );
        assert_eq!(
            scene.connect(a, 0, gate, 0),
            Err(CoreError::InvalidToType {
                kind: NodeKind::Input
            })
        );
        assert_eq!(
            scene.connect(NodeRef::boundary_output(0), 0, a, 0),
            Err(CoreError::NotAComponent)
        );
        assert_eq!(
            scene.connect(gate, 1, a, 0),
            Err(CoreError::AlreadyConnected {
                node: gate,
                socket: 1
            })
        );
        assert!(matches!(
            scene.connect(gate, 7, a, 0),
            Err(CoreError::InvalidArgument { .. })
        ));
        let ghost = NodeRef::new(NodeKind::Gate, 42);
        assert_eq!(
            scene.connect(ghost, 0, a, 0),
            Err(CoreError::NodeNotFound { node: ghost })
        );
    }

    #[test]
    fn failed_connect_leaves_scene_untouched() {
        let (mut scene, a, _, gate, _) = and_scene();
        let before = scene.relations().len();
        let last = scene.relations().last_id();
        let _ = scene.connect(gate, 0, a, 0);
        assert_eq!(scene.relations().len(), before);
        assert_eq!(scene.relations().last_id(), last);
        assert_eq!(scene.get::<Input>(a).unwrap().outputs().len(), 1);
    }

    #[test]
    fn disconnect_errors() {
        let (mut scene, ..) = and_scene();
        assert_eq!(
            scene.disconnect(RelId::NONE),
            Err(CoreError::InvalidRelId { id: RelId::NONE })
        );
        scene.disconnect(RelId(1)).unwrap();
        assert_eq!(
            scene.disconnect(RelId(1)),
            Err(CoreError::RelNotFound { id: RelId(1) })
        );
    }

    #[test]
    fn remove_node_detaches_relations() {
        let (mut scene, a, b, gate, out) = and_scene();
        scene.set_input(a, true).unwrap();
        scene.set_input(b, true).unwrap();
        scene.remove_node(gate).unwrap();
        assert!(scene.relations().is_empty());
        assert_eq!(scene.value(out, 0), Some(State::Disabled));
        assert!(scene.get::<Input>(a).unwrap().outputs().is_empty());
        assert_eq!(
            scene.remove_node(gate),
            Err(CoreError::NodeNotFound { node: gate })
        );
    }

    #[test]
    fn get_checks_kind() {
        let (scene, a, ..) = and_scene();
        assert!(scene.get::<Input>(a).is_some());
        assert!(scene.get::<Gate>(a).is_none());
    }

    #[test]
    fn gate_resizing() {
        let (mut scene, a, b, gate, out) = and_scene();
        scene.set_input(a, true).unwrap();
        scene.set_input(b, true).unwrap();
        assert!(scene.increment(gate).unwrap());
        assert_eq!(scene.value(out, 0), Some(State::Disabled));
        assert!(scene.decrement(gate).unwrap());
        assert_eq!(scene.value(out, 0), Some(State::True));
        assert!(!scene.decrement(gate).unwrap());

        let not = scene.add_gate(GateType::Not, 1);
        assert!(!scene.increment(not).unwrap());
        assert_eq!(scene.increment(a), Err(CoreError::InvalidNode { node: a }));
    }

    #[test]
    fn decrement_refuses_connected_socket() {
        let mut scene = Scene::new();
        let a = scene.add_input();
        let gate = scene.add_gate(GateType::Or, 3);
        scene.connect(gate, 2, a, 0).unwrap();
        assert!(!scene.decrement(gate).unwrap());
        assert_eq!(scene.get::<Gate>(gate).unwrap().inputs().len(), 3);
    }

    #[test]
    fn gate_arity_is_capped() {
        let mut scene = Scene::new();
        let gate = scene.add_gate(GateType::Xor, MAX_GATE_INPUTS);
        assert!(!scene.increment(gate).unwrap());
    }

    #[test]
    fn toggle_flips_literal() {
        let mut scene = Scene::new();
        let a = scene.add_input();
        assert_eq!(scene.toggle(a).unwrap(), State::True);
        assert_eq!(scene.toggle(a).unwrap(), State::False);
    }

    #[test]
    fn duplicate_is_unwired() {
        let (mut scene, _, _, gate, _) = and_scene();
        scene.move_node(gate, Point::new(3, -4)).unwrap();
        let copy = scene.duplicate_node(gate).unwrap();
        let node = scene.get::<Gate>(copy).unwrap();
        assert_eq!(node.gate_type(), GateType::And);
        assert!(!node.is_connected());
        assert_eq!(scene.point(copy), Some(Point::new(3, -4)));
        assert_eq!(
            scene.duplicate_node(NodeRef::boundary_input(0)),
            Err(CoreError::InvalidNode {
                node: NodeRef::boundary_input(0)
            })
        );
    }

    #[test]
    fn metadata_setters_enforce_bounds() {
        let mut scene = Scene::new();
        scene.set_name("adder").unwrap();
        assert!(scene.set_name("n".repeat(200)).is_err());
        assert_eq!(scene.name(), "adder");
        assert!(scene.set_author("a".repeat(60)).is_err());
        assert!(scene.set_description("d".repeat(600)).is_err());
        assert_eq!(scene.to_dependency(), "local/adder/0");
    }

    #[test]
    fn timers_follow_the_frame_clock() {
        let mut scene = Scene::new();
        let timer = scene.add_timer(5).unwrap();
        let out = scene.add_output();
        scene.connect(out, 0, timer, 0).unwrap();
        assert_eq!(scene.value(out, 0), Some(State::False));
        scene.tick(0.5);
        assert_eq!(scene.frame_tick(), 5);
        assert_eq!(scene.value(out, 0), Some(State::True));
        scene.tick(0.25);
        assert_eq!(scene.value(out, 0), Some(State::True));
        scene.tick(0.25);
        assert_eq!(scene.value(out, 0), Some(State::False));
        assert!(scene.add_timer(0).is_err());
    }

    #[test]
    fn set_period_requires_timer() {
        let mut scene = Scene::new();
        let toggle = scene.add_input();
        let timer = scene.add_timer(2).unwrap();
        assert!(scene.set_period(toggle, 3).is_err());
        assert!(scene.set_period(timer, 0).is_err());
        scene.set_period(timer, 3).unwrap();
        assert_eq!(scene.get::<Input>(timer).unwrap().period(), Some(3));
    }

    #[test]
    fn connect_fails_cleanly_once_ids_run_out() {
        let (mut scene, a, _, _, _) = and_scene();
        let spare = scene.add_output();
        let last = scene.relations().last_id();
        let rels: Vec<Relation> = scene.relations().sorted().into_iter().cloned().collect();
        scene.rels = RelationTable::from_parts(rels, u32::MAX);
        assert_eq!(scene.connect(spare, 0, a, 0), Err(CoreError::RelIdsExhausted));
        assert_eq!(scene.consumer(Endpoint::new(spare, 0)), Ok(RelId::NONE));
        assert_eq!(scene.fan_out(Endpoint::new(a, 0)).unwrap().len(), 1);
        assert_eq!(scene.relations().len(), last as usize);
    }

    #[test]
    fn disconnect_rejects_relation_its_socket_does_not_hold() {
        let (mut scene, _, _, gate, out) = and_scene();
        let id = scene.consumer(Endpoint::new(out, 0)).unwrap();
        scene.outputs.get_mut(out.index).unwrap().input = RelId::NONE;
        assert_eq!(
            scene.disconnect(id),
            Err(CoreError::NotConnected { node: out, socket: 0 })
        );
        assert!(scene.rel(id).is_some());
        assert!(scene.fan_out(Endpoint::new(gate, 0)).unwrap().contains(&id));
    }

    #[test]
    fn add_component_requires_context() {
        let mut scene = Scene::new();
        assert_eq!(
            scene.add_component(0),
            Err(CoreError::ComponentNotFound { index: 0 })
        );
        let dep = scene.add_dependency(Scene::new());
        assert_eq!(scene.add_component(dep), Err(CoreError::NotAComponent));
    }
}

//! Component contexts: the boundary that turns a scene into a reusable
//! black-box function.
//!
//! A scene with a [`ComponentContext`] exposes numbered virtual inputs
//! (`CIn@i`), which drive internal relations like ordinary inputs, and
//! numbered virtual outputs (`COut@i`), which each read one internal
//! relation. [`ContextMut::run`] evaluates the whole scene for one
//! assignment of the virtual inputs.

use crate::error::CoreError;
use crate::id::{NodeKind, NodeRef, RelId};
use crate::propagate::Job;
use crate::scene::Scene;
use crate::state::State;

/// Maximum number of virtual inputs or outputs, the width of a run bitmask.
pub const MAX_BOUNDARY_SOCKETS: usize = 64;

/// A virtual input: a literal plus the internal relations it drives.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryInput {
    pub(crate) outputs: Vec<RelId>,
    pub(crate) value: State,
}

impl Default for BoundaryInput {
    fn default() -> Self {
        BoundaryInput {
            outputs: Vec::new(),
            value: State::False,
        }
    }
}

impl BoundaryInput {
    pub fn outputs(&self) -> &[RelId] {
        &self.outputs
    }

    pub fn get(&self) -> State {
        self.value
    }
}

/// A virtual output bound to at most one internal relation.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryOutput {
    pub(crate) input: RelId,
    pub(crate) value: State,
}

impl Default for BoundaryOutput {
    fn default() -> Self {
        BoundaryOutput {
            input: RelId::NONE,
            value: State::Disabled,
        }
    }
}

impl BoundaryOutput {
    pub fn input(&self) -> RelId {
        self.input
    }

    pub fn get(&self) -> State {
        self.value
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentContext {
    pub(crate) inputs: Vec<BoundaryInput>,
    pub(crate) outputs: Vec<BoundaryOutput>,
}

impl ComponentContext {
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    pub fn inputs(&self) -> &[BoundaryInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[BoundaryOutput] {
        &self.outputs
    }

    /// Current value of a boundary socket.
    pub fn value(&self, node: NodeRef) -> Result<State, CoreError> {
        let missing = CoreError::NodeNotFound { node };
        match node.kind {
            NodeKind::ComponentInputBoundary => {
                self.inputs.get(node.slot()).map(|i| i.value).ok_or(missing)
            }
            NodeKind::ComponentOutputBoundary => {
                self.outputs.get(node.slot()).map(|o| o.value).ok_or(missing)
            }
            _ => Err(CoreError::InvalidNode { node }),
        }
    }

    /// Packs the virtual outputs into a bitmask, output 0 in the lowest bit.
    /// `DISABLED` outputs read as 0.
    pub fn output_mask(&self) -> u64 {
        self.outputs
            .iter()
            .enumerate()
            .fold(0u64, |mask, (i, o)| mask | (o.value.bit() << i))
    }
}

/// Mutable access to a scene's component context.
///
/// Writes to virtual inputs propagate through the owning scene, so the
/// handle borrows the whole scene rather than the context alone.
pub struct ContextMut<'a> {
    scene: &'a mut Scene,
}

impl Scene {
    pub fn context(&self) -> Option<&ComponentContext> {
        self.context.as_ref()
    }

    pub fn is_component(&self) -> bool {
        self.context.is_some()
    }

    /// Returns a handle on the component context, or `NotAComponent`.
    pub fn context_mut(&mut self) -> Result<ContextMut<'_>, CoreError> {
        if self.context.is_none() {
            return Err(CoreError::NotAComponent);
        }
        Ok(ContextMut { scene: self })
    }

    /// Turns this scene into a component with the given boundary, creating
    /// the context if needed.
    pub fn setup_context(&mut self, inputs: usize, outputs: usize) -> Result<(), CoreError> {
        check_width(inputs, outputs)?;
        if self.context.is_none() {
            self.context = Some(ComponentContext::default());
            tracing::info!("scene {} is now a component", self.name());
        }
        self.context_mut()?.setup(inputs, outputs)
    }

    /// Detaches every boundary relation and drops the context.
    pub fn remove_context(&mut self) -> Result<(), CoreError> {
        self.context_mut()?.setup(0, 0)?;
        self.context = None;
        tracing::info!("scene {} is no longer a component", self.name());
        Ok(())
    }
}

impl ContextMut<'_> {
    fn context(&self) -> &ComponentContext {
        match &self.scene.context {
            Some(context) => context,
            None => unreachable!("ContextMut exists only for scenes with a context"),
        }
    }

    fn context_mut(&mut self) -> &mut ComponentContext {
        match &mut self.scene.context {
            Some(context) => context,
            None => unreachable!("ContextMut exists only for scenes with a context"),
        }
    }

    pub fn input_count(&self) -> usize {
        self.context().input_count()
    }

    pub fn output_count(&self) -> usize {
        self.context().output_count()
    }

    pub fn get_value(&self, node: NodeRef) -> Result<State, CoreError> {
        self.context().value(node)
    }

    /// Sets a boundary socket. A virtual input propagates the new literal
    /// into the scene; a virtual output only stores the value.
    pub fn set_value(&mut self, node: NodeRef, value: State) -> Result<(), CoreError> {
        let missing = CoreError::NodeNotFound { node };
        match node.kind {
            NodeKind::ComponentInputBoundary => {
                let input = self
                    .context_mut()
                    .inputs
                    .get_mut(node.slot())
                    .ok_or(missing)?;
                input.value = value;
                self.scene.propagate(vec![Job::Evaluate(node)]);
                Ok(())
            }
            NodeKind::ComponentOutputBoundary => {
                let output = self
                    .context_mut()
                    .outputs
                    .get_mut(node.slot())
                    .ok_or(missing)?;
                output.value = value;
                Ok(())
            }
            _ => Err(CoreError::InvalidNode { node }),
        }
    }

    /// Resizes the boundary. Relations bound to removed sockets are
    /// detached first; new inputs hold `FALSE`, new outputs are unbound.
    pub fn setup(&mut self, inputs: usize, outputs: usize) -> Result<(), CoreError> {
        check_width(inputs, outputs)?;
        let context = self.context();
        let stale: Vec<RelId> = context
            .inputs
            .iter()
            .skip(inputs)
            .flat_map(|i| i.outputs.iter().copied())
            .chain(
                context
                    .outputs
                    .iter()
                    .skip(outputs)
                    .map(|o| o.input)
                    .filter(|r| r.is_some()),
            )
            .collect();
        for id in stale {
            self.scene.disconnect(id)?;
        }
        let context = self.context_mut();
        context.inputs.resize(inputs, BoundaryInput::default());
        context.outputs.resize(outputs, BoundaryOutput::default());
        tracing::info!("component boundary set to {} inputs, {} outputs", inputs, outputs);
        Ok(())
    }

    /// Evaluates the scene for one input assignment.
    ///
    /// Bit `i` of `mask` drives virtual input `i`, lowest bit first; the
    /// result packs virtual output `i` into bit `i`, `DISABLED` as 0.
    pub fn run(&mut self, mask: u64) -> u64 {
        for index in 0..self.input_count() {
            let value = State::from((mask >> index) & 1 == 1);
            let node = NodeRef::boundary_input(index as u32);
            if let Some(input) = self.context_mut().inputs.get_mut(index) {
                input.value = value;
            }
            self.scene.propagate(vec![Job::Evaluate(node)]);
        }
        let result = self.context().output_mask();
        tracing::debug!("run {:#b} -> {:#b}", mask, result);
        result
    }
}

fn check_width(inputs: usize, outputs: usize) -> Result<(), CoreError> {
    if inputs > MAX_BOUNDARY_SOCKETS || outputs > MAX_BOUNDARY_SOCKETS {
        return Err(CoreError::invalid_argument(format!(
            "a component has at most {MAX_BOUNDARY_SOCKETS} inputs and outputs"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateType;

    #[test]
    fn boundary_requires_context() {
        let mut scene = Scene::new();
        assert!(scene.context_mut().is_err());
        scene.setup_context(1, 1).unwrap();
        assert!(scene.is_component());
        assert_eq!(scene.count(NodeKind::ComponentInputBoundary), 1);
    }

    #[test]
    fn wire_through_component() {
        let mut scene = Scene::new();
        scene.setup_context(1, 1).unwrap();
        scene
            .connect(NodeRef::boundary_output(0), 0, NodeRef::boundary_input(0), 0)
            .unwrap();
        let mut context = scene.context_mut().unwrap();
        assert_eq!(context.run(1), 1);
        assert_eq!(context.run(0), 0);
        assert_eq!(
            context.get_value(NodeRef::boundary_output(0)),
            Ok(State::False)
        );
    }

    #[test]
    fn unbound_output_reads_zero() {
        let mut scene = Scene::new();
        scene.setup_context(2, 2).unwrap();
        let gate = scene.add_gate(GateType::Or, 2);
        scene.connect(gate, 0, NodeRef::boundary_input(0), 0).unwrap();
        scene.connect(gate, 1, NodeRef::boundary_input(1), 0).unwrap();
        scene.connect(NodeRef::boundary_output(1), 0, gate, 0).unwrap();
        let mut context = scene.context_mut().unwrap();
        assert_eq!(context.run(0b01), 0b10);
        assert_eq!(context.run(0b00), 0b00);
        assert_eq!(
            context.get_value(NodeRef::boundary_output(0)),
            Ok(State::Disabled)
        );
    }

    #[test]
    fn shrinking_detaches_removed_sockets() {
        let mut scene = Scene::new();
        scene.setup_context(2, 2).unwrap();
        let not = scene.add_gate(GateType::Not, 1);
        scene.connect(not, 0, NodeRef::boundary_input(1), 0).unwrap();
        scene.connect(NodeRef::boundary_output(0), 0, not, 0).unwrap();
        scene.connect(NodeRef::boundary_output(1), 0, not, 0).unwrap();
        scene.setup_context(1, 1).unwrap();
        assert_eq!(scene.relations().len(), 1);
        assert_eq!(scene.value(not, 0), Some(State::Disabled));
        assert_eq!(scene.context_mut().unwrap().run(0), 0);
    }

    #[test]
    fn width_is_bounded() {
        let mut scene = Scene::new();
        assert!(scene.setup_context(65, 1).is_err());
        assert!(scene.context().is_none());
        scene.setup_context(64, 64).unwrap();
    }

    #[test]
    fn set_value_on_output_does_not_propagate() {
        let mut scene = Scene::new();
        scene.setup_context(0, 1).unwrap();
        let mut context = scene.context_mut().unwrap();
        context
            .set_value(NodeRef::boundary_output(0), State::True)
            .unwrap();
        assert_eq!(
            context.get_value(NodeRef::boundary_output(0)),
            Ok(State::True)
        );
        assert!(context
            .set_value(NodeRef::new(NodeKind::Gate, 0), State::True)
            .is_err());
    }

    #[test]
    fn remove_context_detaches_everything() {
        let mut scene = Scene::new();
        scene.setup_context(1, 1).unwrap();
        scene
            .connect(NodeRef::boundary_output(0), 0, NodeRef::boundary_input(0), 0)
            .unwrap();
        scene.remove_context().unwrap();
        assert!(scene.relations().is_empty());
        assert!(!scene.is_component());
    }
}

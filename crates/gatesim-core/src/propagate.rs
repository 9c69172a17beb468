//! Signal propagation.
//!
//! Changes cascade through an explicit stack of jobs rather than through
//! recursion, so the depth of a circuit never grows the call stack. Jobs are
//! processed depth-first: a relation's consumer is re-evaluated before the
//! producer's next fan-out relation is signalled.
//!
//! A node re-fires its fan-out when its value changed or was `DISABLED`
//! before. A relation forwards a signal only when the value it carries
//! changes, except for a freshly created relation, which always delivers its
//! first value. A circuit that oscillates (a true feedback loop) never
//! settles; [`Scene::feedback_loops`] reports such wiring.

use crate::gate;
use crate::id::{NodeKind, NodeRef, RelId};
use crate::scene::Scene;
use crate::state::State;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Job {
    /// Send `value` through relation `id`.
    Signal { id: RelId, value: State, force: bool },
    /// Recompute `node` from its inputs and fire its fan-out if needed.
    Evaluate(NodeRef),
}

impl Scene {
    pub(crate) fn propagate(&mut self, jobs: Vec<Job>) {
        let mut stack: Vec<Job> = jobs.into_iter().rev().collect();
        while let Some(job) = stack.pop() {
            match job {
                Job::Signal { id, value, force } => {
                    let Some(rel) = self.rels.get_mut(id) else {
                        continue;
                    };
                    if !force && rel.value == value {
                        continue;
                    }
                    rel.value = value;
                    tracing::debug!("signal {} on relation {} to {}", value, id, rel.to.node);
                    stack.push(Job::Evaluate(rel.to.node));
                }
                Job::Evaluate(node) => {
                    let fired = self.evaluate(node);
                    stack.extend(fired.into_iter().rev());
                }
            }
        }
    }

    /// Value carried by the relation bound to a consumer socket.
    fn rel_value(&self, id: RelId) -> State {
        if id.is_none() {
            return State::Disabled;
        }
        self.rels.get(id).map_or(State::Disabled, |r| r.value)
    }

    /// Recomputes `node` and returns the signals it emits.
    fn evaluate(&mut self, node: NodeRef) -> Vec<Job> {
        match node.kind {
            NodeKind::Gate => {
                let Some(g) = self.gates.get(node.index) else {
                    return Vec::new();
                };
                let next = gate::evaluate(g.gate_type, g.inputs.iter().map(|&r| self.rel_value(r)));
                let Some(g) = self.gates.get_mut(node.index) else {
                    return Vec::new();
                };
                let previous = std::mem::replace(&mut g.value, next);
                if next != previous || previous.is_disabled() {
                    signals(&g.outputs, next)
                } else {
                    Vec::new()
                }
            }
            NodeKind::Input => match self.inputs.get(node.index) {
                Some(input) => signals(&input.outputs, input.value),
                None => Vec::new(),
            },
            NodeKind::Output => {
                let Some(output) = self.outputs.get(node.index) else {
                    return Vec::new();
                };
                let next = self.rel_value(output.input);
                if let Some(output) = self.outputs.get_mut(node.index) {
                    output.value = next;
                }
                Vec::new()
            }
            NodeKind::Component => self.evaluate_component(node),
            NodeKind::ComponentInputBoundary => match &self.context {
                Some(context) => match context.inputs.get(node.slot()) {
                    Some(input) => signals(&input.outputs, input.value),
                    None => Vec::new(),
                },
                None => Vec::new(),
            },
            NodeKind::ComponentOutputBoundary => {
                let Some(bound) = self
                    .context
                    .as_ref()
                    .and_then(|c| c.outputs.get(node.slot()))
                    .map(|o| o.input)
                else {
                    return Vec::new();
                };
                let next = self.rel_value(bound);
                if let Some(output) = self
                    .context
                    .as_mut()
                    .and_then(|c| c.outputs.get_mut(node.slot()))
                {
                    output.value = next;
                }
                Vec::new()
            }
        }
    }

    /// Runs a component's dependency on its current inputs and fires every
    /// output socket whose value changed.
    fn evaluate_component(&mut self, node: NodeRef) -> Vec<Job> {
        let Some(component) = self.components.get(node.index) else {
            return Vec::new();
        };
        let states: Vec<State> = component.inputs.iter().map(|&r| self.rel_value(r)).collect();
        let width = component.values.len();
        let dependency = component.dependency;

        let next: Vec<State> = if states.iter().any(|s| s.is_disabled()) {
            vec![State::Disabled; width]
        } else {
            let mask = states
                .iter()
                .enumerate()
                .fold(0u64, |mask, (i, s)| mask | (s.bit() << i));
            match self
                .dependencies
                .get_mut(dependency)
                .and_then(|d| d.context_mut().ok())
            {
                Some(mut context) => {
                    let bits = context.run(mask);
                    (0..width).map(|i| State::from((bits >> i) & 1 == 1)).collect()
                }
                None => vec![State::Disabled; width],
            }
        };

        let Some(component) = self.components.get_mut(node.index) else {
            return Vec::new();
        };
        let mut jobs = Vec::new();
        let sockets = component.values.iter_mut().zip(&component.outputs);
        for ((cached, fan_out), &value) in sockets.zip(&next) {
            let previous = std::mem::replace(cached, value);
            if value != previous || previous.is_disabled() {
                jobs.extend(signals(fan_out, value));
            }
        }
        jobs
    }
}

fn signals(fan_out: &[RelId], value: State) -> Vec<Job> {
    fan_out
        .iter()
        .map(|&id| Job::Signal {
            id,
            value,
            force: false,
        })
        .collect()
}

//! Binary scene documents.
//!
//! Layout: the magic `GSIM`, a format version byte, then one scene block.
//! All integers are little-endian. A scene block holds, in order:
//!
//! - the metadata as a `u32`-length-prefixed JSON object,
//! - the gate, input, output and component arrays, each as
//!   `(slot count, frontier)` followed by one tagged record per slot
//!   (tombstones are a single zero tag),
//! - the relation counter and the relation records ordered by id,
//! - the dependency count and one length-prefixed nested scene block each,
//! - a presence byte for the component context and its sockets.
//!
//! Cached values are stored so a reloaded scene reads the same values
//! without re-driving its inputs. The frame clock is not stored.
//!
//! Decoding builds a fresh scene, checks every cross-reference and only
//! then hands it out, so a failed read never touches the caller's scene.

use std::collections::HashSet;

use crate::arena::NodeArena;
use crate::context::{BoundaryInput, BoundaryOutput, ComponentContext, MAX_BOUNDARY_SOCKETS};
use crate::error::CoreError;
use crate::gate::{GateType, MAX_GATE_INPUTS, MIN_GATE_INPUTS};
use crate::id::{NodeKind, NodeRef, RelId};
use crate::meta::SceneMeta;
use crate::node::{Component, Gate, GateInputs, Input, InputMode, NodeBase, Output, Point, SceneNode};
use crate::relation::{Endpoint, Relation, RelationTable};
use crate::scene::Scene;
use crate::state::State;

pub const MAGIC: &[u8; 4] = b"GSIM";
pub const FORMAT_VERSION: u8 = 1;

/// Dependency trees deeper than this are rejected on decode.
const MAX_DEPTH: usize = 32;

const TAG_NULL: u8 = 0;
const TAG_LIVE: u8 = 1;
const TAG_TIMER: u8 = 2;

impl Scene {
    /// Encodes the scene into `buf`, replacing its contents.
    pub fn write_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        buf.clear();
        buf.extend_from_slice(MAGIC);
        buf.push(FORMAT_VERSION);
        encode_scene(self, &mut Encoder { buf })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Replaces this scene with the one encoded in `bytes`. On error the
    /// scene is left unchanged.
    pub fn read_from(&mut self, bytes: &[u8]) -> Result<(), CoreError> {
        *self = Scene::from_bytes(bytes)?;
        Ok(())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Scene, CoreError> {
        let mut dec = Decoder::new(bytes, 0);
        let magic = dec.take(MAGIC.len())?;
        if magic != MAGIC {
            return Err(CoreError::InvalidByte {
                offset: 0,
                reason: "not a scene document".to_string(),
            });
        }
        let version = dec.u8()?;
        if version != FORMAT_VERSION {
            return Err(CoreError::InvalidByte {
                offset: MAGIC.len(),
                reason: format!("unsupported format version {version}"),
            });
        }
        let scene = decode_scene(&mut dec, 0)?;
        dec.finish()?;
        tracing::debug!(
            "decoded scene {} ({} relations, {} dependencies)",
            scene.name(),
            scene.rels.len(),
            scene.dependencies.len()
        );
        Ok(scene)
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

struct Encoder<'a> {
    buf: &'a mut Vec<u8>,
}

impl Encoder<'_> {
    fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    fn i16(&mut self, value: i16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn len(&mut self, len: usize) -> Result<(), CoreError> {
        let len = u32::try_from(len)
            .map_err(|_| CoreError::invalid_format(format!("length {len} does not fit the format")))?;
        self.u32(len);
        Ok(())
    }

    fn bytes(&mut self, bytes: &[u8]) -> Result<(), CoreError> {
        self.len(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn state(&mut self, state: State) {
        self.u8(state.tag());
    }

    fn point(&mut self, point: Point) {
        self.i16(point.x);
        self.i16(point.y);
    }

    fn rels(&mut self, rels: &[RelId]) -> Result<(), CoreError> {
        self.len(rels.len())?;
        for rel in rels {
            self.u32(rel.0);
        }
        Ok(())
    }

    fn endpoint(&mut self, ep: Endpoint) {
        self.u8(ep.node.kind.tag());
        self.u32(ep.node.index);
        self.u32(ep.socket);
    }

    fn arena_header<T: SceneNode>(&mut self, arena: &NodeArena<T>) -> Result<(), CoreError> {
        self.len(arena.len())?;
        self.len(arena.frontier())
    }
}

fn encode_scene(scene: &Scene, enc: &mut Encoder<'_>) -> Result<(), CoreError> {
    let meta = serde_json::to_vec(&scene.meta).map_err(|e| CoreError::InvalidJson {
        reason: e.to_string(),
    })?;
    enc.bytes(&meta)?;

    enc.arena_header(&scene.gates)?;
    for gate in scene.gates.slots() {
        if gate.is_null() {
            enc.u8(TAG_NULL);
            continue;
        }
        enc.u8(TAG_LIVE);
        enc.point(gate.point());
        enc.u8(gate.gate_type.tag());
        enc.rels(&gate.inputs)?;
        enc.rels(&gate.outputs)?;
        enc.state(gate.value);
    }

    enc.arena_header(&scene.inputs)?;
    for input in scene.inputs.slots() {
        if input.is_null() {
            enc.u8(TAG_NULL);
            continue;
        }
        match input.mode {
            InputMode::Toggle => enc.u8(TAG_LIVE),
            InputMode::Timer { .. } => enc.u8(TAG_TIMER),
        }
        enc.point(input.point());
        if let InputMode::Timer { period } = input.mode {
            enc.u32(period);
        }
        enc.rels(&input.outputs)?;
        enc.state(input.value);
    }

    enc.arena_header(&scene.outputs)?;
    for output in scene.outputs.slots() {
        if output.is_null() {
            enc.u8(TAG_NULL);
            continue;
        }
        enc.u8(TAG_LIVE);
        enc.point(output.point());
        enc.u32(output.input.0);
        enc.state(output.value);
    }

    enc.arena_header(&scene.components)?;
    for component in scene.components.slots() {
        if component.is_null() {
            enc.u8(TAG_NULL);
            continue;
        }
        enc.u8(TAG_LIVE);
        enc.point(component.point());
        enc.len(component.dependency)?;
        enc.rels(&component.inputs)?;
        enc.len(component.outputs.len())?;
        for (fan_out, &value) in component.outputs.iter().zip(&component.values) {
            enc.rels(fan_out)?;
            enc.state(value);
        }
    }

    enc.u32(scene.rels.last_id());
    enc.len(scene.rels.len())?;
    for rel in scene.rels.sorted() {
        enc.u32(rel.id.0);
        enc.endpoint(rel.from);
        enc.endpoint(rel.to);
        enc.state(rel.value);
    }

    enc.len(scene.dependencies.len())?;
    for dependency in &scene.dependencies {
        let mut nested = Vec::new();
        encode_scene(dependency, &mut Encoder { buf: &mut nested })?;
        enc.bytes(&nested)?;
    }

    match &scene.context {
        None => enc.u8(TAG_NULL),
        Some(context) => {
            enc.u8(TAG_LIVE);
            enc.len(context.inputs.len())?;
            for input in &context.inputs {
                enc.rels(&input.outputs)?;
                enc.state(input.value);
            }
            enc.len(context.outputs.len())?;
            for output in &context.outputs {
                enc.u32(output.input.0);
                enc.state(output.value);
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// Offset of `bytes` within the outermost buffer, for error reports.
    base: usize,
}

impl<'a> Decoder<'a> {
    fn new(bytes: &'a [u8], base: usize) -> Self {
        Decoder {
            bytes,
            pos: 0,
            base,
        }
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn error(&self, reason: impl Into<String>) -> CoreError {
        CoreError::InvalidByte {
            offset: self.offset(),
            reason: reason.into(),
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CoreError> {
        if self.bytes.len() - self.pos < n {
            return Err(self.error("unexpected end of data"));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, CoreError> {
        Ok(self.take(1)?[0])
    }

    fn i16(&mut self) -> Result<i16, CoreError> {
        let b = self.take(2)?;
        Ok(i16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, CoreError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// A count of items each at least `item_size` bytes long. Rejecting
    /// counts the remaining data can not hold keeps allocations bounded.
    fn count(&mut self, item_size: usize) -> Result<usize, CoreError> {
        let at = self.offset();
        let n = self.u32()? as usize;
        if n.saturating_mul(item_size) > self.bytes.len() - self.pos {
            return Err(CoreError::InvalidByte {
                offset: at,
                reason: format!("count {n} exceeds the remaining data"),
            });
        }
        Ok(n)
    }

    fn state(&mut self) -> Result<State, CoreError> {
        let at = self.offset();
        let tag = self.u8()?;
        State::from_tag(tag).ok_or(CoreError::InvalidByte {
            offset: at,
            reason: format!("unknown state tag {tag}"),
        })
    }

    fn point(&mut self) -> Result<Point, CoreError> {
        Ok(Point::new(self.i16()?, self.i16()?))
    }

    fn rel(&mut self) -> Result<RelId, CoreError> {
        Ok(RelId(self.u32()?))
    }

    fn rels(&mut self) -> Result<Vec<RelId>, CoreError> {
        let n = self.count(4)?;
        (0..n).map(|_| self.rel()).collect()
    }

    fn endpoint(&mut self) -> Result<Endpoint, CoreError> {
        let at = self.offset();
        let tag = self.u8()?;
        let kind = NodeKind::from_tag(tag).ok_or(CoreError::InvalidByte {
            offset: at,
            reason: format!("unknown node kind tag {tag}"),
        })?;
        let index = self.u32()?;
        let socket = self.u32()?;
        Ok(Endpoint::new(NodeRef::new(kind, index), socket))
    }

    fn base_node(&mut self) -> Result<NodeBase, CoreError> {
        Ok(NodeBase {
            point: self.point()?,
            null: false,
        })
    }

    fn finish(&self) -> Result<(), CoreError> {
        if self.pos != self.bytes.len() {
            return Err(self.error("trailing data after scene"));
        }
        Ok(())
    }

    /// Reads `(slot count, frontier)` and one record per slot.
    fn arena<T, F>(&mut self, mut record: F) -> Result<NodeArena<T>, CoreError>
    where
        T: SceneNode,
        F: FnMut(&mut Self, u8) -> Result<T, CoreError>,
    {
        let len = self.count(1)?;
        let frontier = self.u32()? as usize;
        let mut slots = Vec::with_capacity(len);
        for _ in 0..len {
            let tag = self.u8()?;
            if tag == TAG_NULL {
                slots.push(T::tombstone());
            } else {
                slots.push(record(self, tag)?);
            }
        }
        NodeArena::from_parts(slots, frontier).ok_or_else(|| {
            CoreError::invalid_format(format!(
                "{} frontier {} does not match its slots",
                T::KIND,
                frontier
            ))
        })
    }
}

fn unknown_tag(dec: &Decoder<'_>, tag: u8) -> CoreError {
    CoreError::InvalidByte {
        offset: dec.offset() - 1,
        reason: format!("unknown record tag {tag}"),
    }
}

fn decode_scene(dec: &mut Decoder<'_>, depth: usize) -> Result<Scene, CoreError> {
    if depth > MAX_DEPTH {
        return Err(CoreError::invalid_format("dependencies nested too deeply"));
    }

    let meta_len = dec.count(1)?;
    let meta: SceneMeta =
        serde_json::from_slice(dec.take(meta_len)?).map_err(|e| CoreError::InvalidJson {
            reason: e.to_string(),
        })?;
    meta.validate()
        .map_err(|e| CoreError::invalid_format(e.to_string()))?;

    let gates = dec.arena(|dec, tag| {
        if tag != TAG_LIVE {
            return Err(unknown_tag(dec, tag));
        }
        let base = dec.base_node()?;
        let type_tag = dec.u8()?;
        let gate_type = GateType::from_tag(type_tag)
            .ok_or_else(|| dec.error(format!("unknown gate type {type_tag}")))?;
        let inputs: GateInputs = dec.rels()?.into_iter().collect();
        let arity_ok = match gate_type {
            GateType::Not => inputs.len() == 1,
            _ => (MIN_GATE_INPUTS..=MAX_GATE_INPUTS).contains(&inputs.len()),
        };
        if !arity_ok {
            return Err(CoreError::invalid_format(format!(
                "{} gate with {} inputs",
                gate_type,
                inputs.len()
            )));
        }
        Ok(Gate {
            base,
            gate_type,
            inputs,
            outputs: dec.rels()?,
            value: dec.state()?,
        })
    })?;

    let inputs = dec.arena(|dec, tag| {
        let timer = match tag {
            TAG_LIVE => false,
            TAG_TIMER => true,
            _ => return Err(unknown_tag(dec, tag)),
        };
        let base = dec.base_node()?;
        let mode = if timer {
            let period = dec.u32()?;
            if period == 0 {
                return Err(CoreError::invalid_format("timer with zero period"));
            }
            InputMode::Timer { period }
        } else {
            InputMode::Toggle
        };
        Ok(Input {
            base,
            mode,
            outputs: dec.rels()?,
            value: dec.state()?,
        })
    })?;

    let outputs = dec.arena(|dec, tag| {
        if tag != TAG_LIVE {
            return Err(unknown_tag(dec, tag));
        }
        Ok(Output {
            base: dec.base_node()?,
            input: dec.rel()?,
            value: dec.state()?,
        })
    })?;

    let components = dec.arena(|dec, tag| {
        if tag != TAG_LIVE {
            return Err(unknown_tag(dec, tag));
        }
        let base = dec.base_node()?;
        let dependency = dec.u32()? as usize;
        let inputs = dec.rels()?;
        let n = dec.count(5)?;
        let mut outputs = Vec::with_capacity(n);
        let mut values = Vec::with_capacity(n);
        for _ in 0..n {
            outputs.push(dec.rels()?);
            values.push(dec.state()?);
        }
        Ok(Component {
            base,
            dependency,
            inputs,
            outputs,
            values,
        })
    })?;

    let last = dec.u32()?;
    let n = dec.count(23)?;
    let mut rels = Vec::with_capacity(n);
    let mut previous = 0;
    for _ in 0..n {
        let id = dec.rel()?;
        if id.0 <= previous || id.0 > last {
            return Err(CoreError::invalid_format(format!(
                "relation id {id} out of order or above counter {last}"
            )));
        }
        previous = id.0;
        rels.push(Relation {
            id,
            from: dec.endpoint()?,
            to: dec.endpoint()?,
            value: dec.state()?,
        });
    }

    let n = dec.count(4)?;
    let mut dependencies = Vec::with_capacity(n);
    for _ in 0..n {
        let len = dec.count(1)?;
        let base = dec.offset();
        let mut nested = Decoder::new(dec.take(len)?, base);
        dependencies.push(decode_scene(&mut nested, depth + 1)?);
        nested.finish()?;
    }

    let context = match dec.u8()? {
        TAG_NULL => None,
        TAG_LIVE => {
            let n = dec.count(5)?;
            let mut inputs = Vec::with_capacity(n);
            for _ in 0..n {
                inputs.push(BoundaryInput {
                    outputs: dec.rels()?,
                    value: dec.state()?,
                });
            }
            let n = dec.count(5)?;
            let mut outputs = Vec::with_capacity(n);
            for _ in 0..n {
                outputs.push(BoundaryOutput {
                    input: dec.rel()?,
                    value: dec.state()?,
                });
            }
            if inputs.len() > MAX_BOUNDARY_SOCKETS || outputs.len() > MAX_BOUNDARY_SOCKETS {
                return Err(CoreError::invalid_format("component boundary too wide"));
            }
            Some(ComponentContext { inputs, outputs })
        }
        tag => return Err(unknown_tag(dec, tag)),
    };

    let scene = Scene {
        meta,
        gates,
        inputs,
        outputs,
        components,
        rels: RelationTable::from_parts(rels, last),
        dependencies,
        context,
        ..Scene::default()
    };
    validate(&scene)?;
    Ok(scene)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Socket bindings of a scene: `(consumers, producers)`, each pairing an
/// endpoint with a relation id stored on it.
fn bindings(scene: &Scene) -> (Vec<(Endpoint, RelId)>, Vec<(Endpoint, RelId)>) {
    let mut consumers = Vec::new();
    let mut producers = Vec::new();
    let mut consume = |node: NodeRef, socket: usize, id: RelId| {
        if id.is_some() {
            consumers.push((Endpoint::new(node, socket as u32), id));
        }
    };
    for (i, gate) in scene.gates.iter() {
        let node = NodeRef::new(NodeKind::Gate, i);
        gate.inputs
            .iter()
            .enumerate()
            .for_each(|(s, &id)| consume(node, s, id));
        producers.extend(gate.outputs.iter().map(|&id| (Endpoint::new(node, 0), id)));
    }
    for (i, input) in scene.inputs.iter() {
        let node = NodeRef::new(NodeKind::Input, i);
        producers.extend(input.outputs.iter().map(|&id| (Endpoint::new(node, 0), id)));
    }
    for (i, output) in scene.outputs.iter() {
        consume(NodeRef::new(NodeKind::Output, i), 0, output.input);
    }
    for (i, component) in scene.components.iter() {
        let node = NodeRef::new(NodeKind::Component, i);
        component
            .inputs
            .iter()
            .enumerate()
            .for_each(|(s, &id)| consume(node, s, id));
        for (s, fan_out) in component.outputs.iter().enumerate() {
            producers.extend(fan_out.iter().map(|&id| (Endpoint::new(node, s as u32), id)));
        }
    }
    if let Some(context) = &scene.context {
        for (i, output) in context.outputs.iter().enumerate() {
            consume(NodeRef::boundary_output(i as u32), 0, output.input);
        }
        for (i, input) in context.inputs.iter().enumerate() {
            let node = NodeRef::boundary_input(i as u32);
            producers.extend(input.outputs.iter().map(|&id| (Endpoint::new(node, 0), id)));
        }
    }
    (consumers, producers)
}

/// Checks that relations and sockets reference each other one to one and
/// that every component matches its dependency's boundary.
fn validate(scene: &Scene) -> Result<(), CoreError> {
    let (consumers, producers) = bindings(scene);
    for (side, list) in [("consumer", &consumers), ("producer", &producers)] {
        let mut seen = HashSet::new();
        for &(ep, id) in list {
            let rel = scene.rels.get(id).ok_or_else(|| {
                CoreError::invalid_format(format!("{} socket {} holds unknown relation {}", ep.node, ep.socket, id))
            })?;
            let expected = if side == "consumer" { rel.to } else { rel.from };
            if expected != ep || !seen.insert(id) {
                return Err(CoreError::invalid_format(format!(
                    "relation {id} is bound to the wrong {side} socket"
                )));
            }
        }
        if seen.len() != scene.rels.len() {
            return Err(CoreError::invalid_format(format!(
                "{} relations but {} {side} bindings",
                scene.rels.len(),
                seen.len()
            )));
        }
    }

    for (i, component) in scene.components.iter() {
        let node = NodeRef::new(NodeKind::Component, i);
        let context = scene
            .dependencies
            .get(component.dependency)
            .and_then(|d| d.context.as_ref())
            .ok_or_else(|| {
                CoreError::invalid_format(format!(
                    "{node} is bound to missing component {}",
                    component.dependency
                ))
            })?;
        if component.inputs.len() != context.input_count()
            || component.outputs.len() != context.output_count()
        {
            return Err(CoreError::invalid_format(format!(
                "{node} sockets do not match its dependency"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Scene {
        let mut scene = Scene::with_meta(
            SceneMeta::new("sample")
                .with_author("ada")
                .with_description("or of two inputs")
                .with_version(3),
        )
        .unwrap();
        let a = scene.add_input();
        let b = scene.add_timer(4).unwrap();
        let gate = scene.add_gate(GateType::Or, 3);
        let out = scene.add_output();
        scene.connect(gate, 0, a, 0).unwrap();
        scene.connect(gate, 1, b, 0).unwrap();
        scene.connect(out, 0, gate, 0).unwrap();
        let spare = scene.add_gate(GateType::Not, 1);
        scene.remove_node(spare).unwrap();
        scene.move_node(out, Point::new(-20, 45)).unwrap();
        scene
    }

    #[test]
    fn round_trip_preserves_bytes() {
        let scene = sample();
        let bytes = scene.to_bytes().unwrap();
        assert_eq!(&bytes[..4], MAGIC);
        let reloaded = Scene::from_bytes(&bytes).unwrap();
        assert_eq!(reloaded.meta(), scene.meta());
        assert_eq!(reloaded.gates(), scene.gates());
        assert_eq!(reloaded.inputs(), scene.inputs());
        assert_eq!(reloaded.outputs(), scene.outputs());
        assert_eq!(reloaded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn write_to_replaces_buffer() {
        let scene = sample();
        let mut buf = vec![0xAA; 8];
        scene.write_to(&mut buf).unwrap();
        assert_eq!(buf, scene.to_bytes().unwrap());
    }

    #[test]
    fn rejects_bad_magic_and_version() {
        assert!(matches!(
            Scene::from_bytes(b"NOPE\x01"),
            Err(CoreError::InvalidByte { offset: 0, .. })
        ));
        assert!(matches!(
            Scene::from_bytes(b"GSIM\x09"),
            Err(CoreError::InvalidByte { offset: 4, .. })
        ));
    }

    #[test]
    fn every_truncation_fails_cleanly() {
        let bytes = sample().to_bytes().unwrap();
        for len in 0..bytes.len() {
            assert!(Scene::from_bytes(&bytes[..len]).is_err(), "prefix {len}");
        }
    }

    #[test]
    fn trailing_data_is_rejected() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes.push(0);
        assert!(matches!(
            Scene::from_bytes(&bytes),
            Err(CoreError::InvalidByte { .. })
        ));
    }

    #[test]
    fn malformed_metadata_is_invalid_json() {
        let mut bytes = Vec::from(&MAGIC[..]);
        bytes.push(FORMAT_VERSION);
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(b"{x}");
        assert!(matches!(
            Scene::from_bytes(&bytes),
            Err(CoreError::InvalidJson { .. })
        ));
    }

    #[test]
    fn dangling_relation_is_invalid_format() {
        let mut scene = sample();
        scene.outputs.get_mut(0).unwrap().input = RelId(99);
        let bytes = scene.to_bytes().unwrap();
        assert!(matches!(
            Scene::from_bytes(&bytes),
            Err(CoreError::InvalidSceneFormat { .. })
        ));
    }

    #[test]
    fn saturated_relation_counter_survives_reload() {
        let mut scene = Scene::new();
        let a = scene.add_input();
        let out = scene.add_output();
        scene.rels = RelationTable::from_parts(Vec::new(), u32::MAX);
        let bytes = scene.to_bytes().unwrap();
        let mut reloaded = Scene::from_bytes(&bytes).unwrap();
        assert_eq!(reloaded.relations().last_id(), u32::MAX);
        assert_eq!(reloaded.connect(out, 0, a, 0), Err(CoreError::RelIdsExhausted));
        assert_eq!(reloaded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn failed_read_leaves_scene_untouched() {
        let mut scene = sample();
        let before = scene.to_bytes().unwrap();
        assert!(scene.read_from(&before[..before.len() - 1]).is_err());
        assert_eq!(scene.to_bytes().unwrap(), before);
    }

    #[test]
    fn read_from_replaces_scene() {
        let source = sample();
        let mut target = Scene::new();
        target.add_output();
        target.read_from(&source.to_bytes().unwrap()).unwrap();
        assert_eq!(target.name(), "sample");
        assert_eq!(target.count(NodeKind::Output), 1);
        assert_eq!(target.count(NodeKind::Gate), 1);
        assert_eq!(target.gates().len(), 2);
    }
}

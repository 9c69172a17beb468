//! The line-oriented gatesim shell.
//!
//! [`Shell`] owns the open documents and the component library and turns
//! each command line into calls on them. Commands return their printable
//! result; errors are returned to the caller, which reports them and keeps
//! the session going.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use gatesim_core::{
    Component, CoreError, Gate, GateType, Input, InputMode, NodeKind, NodeRef, Output, Point,
    RelId, Relation, Scene, SceneMeta, SceneNode,
};
use gatesim_storage::{has_suffix, DocumentStore, Library, Tabs};

use crate::command::{self, Action, Args};
use crate::error::ShellError;

/// Gate arity used when `add gate` gets no count.
const DEFAULT_GATE_INPUTS: usize = 2;
/// Timer period, in tenths, used when `add timer` gets none.
const DEFAULT_TIMER_PERIOD: u32 = 10;

pub struct Shell<S> {
    tabs: Tabs<S>,
    library: Library<S>,
    running: bool,
}

impl<S: DocumentStore> Shell<S> {
    pub fn new(tabs: Tabs<S>, library: Library<S>) -> Self {
        Shell {
            tabs,
            library,
            running: true,
        }
    }

    pub fn tabs(&self) -> &Tabs<S> {
        &self.tabs
    }

    pub fn library(&self) -> &Library<S> {
        &self.library
    }

    /// `false` once `exit` ran.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Opens a document named on the command line.
    pub fn open_file(&mut self, path: &Path) -> Result<(), ShellError> {
        if !has_suffix(path) {
            return Err(ShellError::InvalidFile(path.display().to_string()));
        }
        self.tabs.open(path)?;
        Ok(())
    }

    /// The interactive prompt: the active scene's name, starred when it has
    /// unsaved changes.
    pub fn prompt(&self) -> String {
        match self.tabs.active() {
            None => "(empty) # ".to_string(),
            Some(doc) if doc.is_saved() => format!("({}) # ", doc.scene().name()),
            Some(doc) => format!("({}*) # ", doc.scene().name()),
        }
    }

    fn scene(&self) -> Result<&Scene, ShellError> {
        self.tabs.active().map(|d| d.scene()).ok_or(ShellError::NoScene)
    }

    fn scene_mut(&mut self) -> Result<&mut Scene, ShellError> {
        self.tabs.active_mut().ok_or(ShellError::NoScene)
    }

    fn expect_no_scene(&self) -> Result<(), ShellError> {
        match self.tabs.active() {
            Some(doc) => Err(ShellError::AlreadyActiveScene(doc.scene().name().to_string())),
            None => Ok(()),
        }
    }

    /// Runs one command line and returns what it prints. Blank lines do
    /// nothing.
    pub fn execute(&mut self, line: &str) -> Result<String, ShellError> {
        if line.trim().is_empty() {
            return Ok(String::new());
        }
        let (command, args) =
            command::lookup(line).ok_or_else(|| ShellError::UnknownCommand(line.trim().to_string()))?;
        tracing::debug!("running {} with '{}'", command.name, args.text());
        self.dispatch(command.action, args)
    }

    /// Runs `lines` in order until `exit`, writing results to `out` and
    /// errors to `err`. Returns how many commands failed.
    pub fn run_lines<I, O, E>(&mut self, lines: I, out: &mut O, err: &mut E) -> io::Result<usize>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        O: Write,
        E: Write,
    {
        let mut failed = 0;
        for line in lines {
            if !self.running {
                break;
            }
            match self.execute(line.as_ref()) {
                Ok(text) if text.is_empty() => {}
                Ok(text) => writeln!(out, "{text}")?,
                Err(e) => {
                    failed += 1;
                    writeln!(err, "error: {e}")?;
                }
            }
        }
        Ok(failed)
    }

    fn dispatch(&mut self, action: Action, mut args: Args<'_>) -> Result<String, ShellError> {
        let out = match action {
            Action::AddComponent => {
                let dependency = args.next::<String>()?;
                args.finish()?;
                self.scene()?;
                let index = self.tabs.include(&self.library, &dependency)?;
                let node = self.scene_mut()?.add_component(index)?;
                node.to_string()
            }
            Action::AddGate => {
                let gate_type = args.next::<GateType>()?;
                let inputs = args.optional::<usize>()?.unwrap_or(DEFAULT_GATE_INPUTS);
                args.finish()?;
                self.scene_mut()?.add_gate(gate_type, inputs).to_string()
            }
            Action::AddInput => {
                let value = args.flag()?;
                args.finish()?;
                let scene = self.scene_mut()?;
                let node = scene.add_input();
                if let Some(value) = value {
                    scene.set_input(node, value)?;
                }
                node.to_string()
            }
            Action::AddOutput => {
                args.finish()?;
                self.scene_mut()?.add_output().to_string()
            }
            Action::AddTimer => {
                let period = args.optional::<u32>()?.unwrap_or(DEFAULT_TIMER_PERIOD);
                args.finish()?;
                self.scene_mut()?.add_timer(period)?.to_string()
            }
            Action::New => {
                self.expect_no_scene()?;
                let name = match args.text() {
                    "" => "untitled",
                    name => name,
                };
                self.tabs.create(SceneMeta::new(name).with_version(1))?;
                String::new()
            }
            Action::Open => {
                self.expect_no_scene()?;
                let path = path_arg(&args)?;
                self.tabs.open(&path)?;
                String::new()
            }
            Action::Close => {
                args.finish()?;
                if self.tabs.active().is_none() {
                    return Err(ShellError::NoScene);
                }
                self.tabs.close(None)?;
                String::new()
            }
            Action::Save => {
                args.finish()?;
                self.scene()?;
                self.tabs.save(None)?;
                saved_to(self.tabs.active().and_then(|d| d.path()))
            }
            Action::SaveAs => {
                let path = path_arg(&args)?;
                self.scene()?;
                let path = self.tabs.save_as(&path, None)?;
                saved_to(Some(&path))
            }
            Action::Install => {
                args.finish()?;
                let scene = self.scene()?.clone();
                self.library.install(&scene)?;
                format!("installed {}", scene.to_dependency())
            }
            Action::Include => {
                let dependency = args.next::<String>()?;
                args.finish()?;
                self.scene()?;
                let index = self.tabs.include(&self.library, &dependency)?;
                format!("dependency {index}: {dependency}")
            }
            Action::Connect => {
                let to = args.node()?;
                let to_socket = args.next::<u32>()?;
                let from = args.node()?;
                let from_socket = args.next::<u32>()?;
                args.finish()?;
                let id = self.scene_mut()?.connect(to, to_socket, from, from_socket)?;
                format!("relation {id}")
            }
            Action::Disconnect => {
                let id = args.rel()?;
                args.finish()?;
                self.scene_mut()?.disconnect(id)?;
                String::new()
            }
            Action::Remove => {
                let node = args.node()?;
                args.finish()?;
                self.scene_mut()?.remove_node(node)?;
                String::new()
            }
            Action::Duplicate => {
                let node = args.node()?;
                args.finish()?;
                self.scene_mut()?.duplicate_node(node)?.to_string()
            }
            Action::Move => {
                let node = args.node()?;
                let x = args.next::<i16>()?;
                let y = args.next::<i16>()?;
                args.finish()?;
                self.scene_mut()?.move_node(node, Point::new(x, y))?;
                String::new()
            }
            Action::Toggle => {
                let node = args.node()?;
                args.finish()?;
                let value = self.scene_mut()?.toggle(node)?;
                format!("{node} = {value}")
            }
            Action::Increment | Action::Decrement => {
                let node = args.node()?;
                args.finish()?;
                let scene = self.scene_mut()?;
                let changed = if action == Action::Increment {
                    scene.increment(node)?
                } else {
                    scene.decrement(node)?
                };
                let count = scene.get::<Gate>(node).map_or(0, |g| g.inputs().len());
                if changed {
                    format!("{node} has {count} inputs")
                } else {
                    format!("{node} unchanged at {count} inputs")
                }
            }
            Action::Context => {
                let inputs = args.next::<usize>()?;
                let outputs = args.next::<usize>()?;
                args.finish()?;
                self.scene_mut()?.setup_context(inputs, outputs)?;
                String::new()
            }
            Action::Run => {
                let mask = args.mask()?;
                args.finish()?;
                let mut context = self.scene_mut()?.context_mut()?;
                let width = context.output_count().max(1);
                let result = context.run(mask);
                format!("0b{result:0width$b}")
            }
            Action::Tick => {
                let seconds = args.next::<f64>()?;
                args.finish()?;
                let scene = self.scene_mut()?;
                scene.tick(seconds);
                format!("tick {}", scene.frame_tick())
            }
            Action::List => {
                let filter = args.optional::<String>()?;
                args.finish()?;
                list(self.scene()?, filter.as_deref())?
            }
            Action::ShowNode => {
                let node = args.node()?;
                args.finish()?;
                describe_node(self.scene()?, node)?
            }
            Action::ShowRel => {
                let id = args.rel()?;
                args.finish()?;
                let scene = self.scene()?;
                describe_rel(scene.relations().lookup(id)?)
            }
            Action::Info => {
                args.finish()?;
                let doc = self.tabs.active().ok_or(ShellError::NoScene)?;
                serde_json::to_string_pretty(&doc.info())?
            }
            Action::Loops => {
                args.finish()?;
                let loops = self.scene()?.feedback_loops();
                if loops.is_empty() {
                    "no feedback loops".to_string()
                } else {
                    loops
                        .iter()
                        .map(|group| join(group.iter()))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            Action::SetName => {
                let name = required_text(&args)?;
                self.scene_mut()?.set_name(name)?;
                String::new()
            }
            Action::SetAuthor => {
                let author = required_text(&args)?;
                self.scene_mut()?.set_author(author)?;
                String::new()
            }
            Action::SetDesc => {
                let description = args.text();
                self.scene_mut()?.set_description(description)?;
                String::new()
            }
            Action::Help => command::help(),
            Action::Exit => {
                self.running = false;
                String::new()
            }
        };
        Ok(out)
    }
}

fn required_text<'a>(args: &Args<'a>) -> Result<&'a str, ShellError> {
    match args.text() {
        "" => Err(CoreError::NoArgument.into()),
        text => Ok(text),
    }
}

fn path_arg(args: &Args<'_>) -> Result<PathBuf, ShellError> {
    required_text(args).map(PathBuf::from)
}

fn saved_to(path: Option<&Path>) -> String {
    match path {
        Some(path) => format!("saved to {}", path.display()),
        None => String::new(),
    }
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(" ")
}

fn sockets(rels: &[RelId]) -> String {
    rels.iter()
        .map(|r| if r.is_some() { r.to_string() } else { "-".to_string() })
        .collect::<Vec<_>>()
        .join(", ")
}

fn list(scene: &Scene, filter: Option<&str>) -> Result<String, ShellError> {
    let kinds: &[NodeKind] = match filter {
        None => &NodeKind::STORED,
        Some("gate") => &[NodeKind::Gate],
        Some("input") => &[NodeKind::Input],
        Some("output") => &[NodeKind::Output],
        Some("component") => &[NodeKind::Component],
        Some("rel") => {
            let lines: Vec<String> = scene.relations().sorted().into_iter().map(describe_rel).collect();
            return Ok(lines.join("\n"));
        }
        Some(other) => {
            return Err(CoreError::invalid_argument(format!(
                "unknown list filter '{other}'"
            ))
            .into())
        }
    };
    let mut lines = Vec::new();
    for kind in kinds {
        for node in scene.nodes(*kind) {
            lines.push(describe_node(scene, node)?);
        }
    }
    if filter.is_none() {
        for node in scene
            .nodes(NodeKind::ComponentInputBoundary)
            .into_iter()
            .chain(scene.nodes(NodeKind::ComponentOutputBoundary))
        {
            lines.push(describe_node(scene, node)?);
        }
    }
    Ok(lines.join("\n"))
}

/// One-line description of a node.
pub fn describe_node(scene: &Scene, node: NodeRef) -> Result<String, ShellError> {
    let missing = || ShellError::from(CoreError::NodeNotFound { node });
    let at = |p: Point| format!("at ({}, {})", p.x, p.y);
    let mut out = String::new();
    match node.kind {
        NodeKind::Gate => {
            let gate = scene.get::<Gate>(node).ok_or_else(missing)?;
            let _ = write!(
                out,
                "{node} {} {} inputs [{}] outputs [{}] {}",
                gate.gate_type(),
                gate.get(),
                sockets(gate.inputs()),
                sockets(gate.outputs()),
                at(gate.point())
            );
        }
        NodeKind::Input => {
            let input = scene.get::<Input>(node).ok_or_else(missing)?;
            let mode = match input.mode() {
                InputMode::Toggle => "input".to_string(),
                InputMode::Timer { period } => format!("timer period {period}"),
            };
            let _ = write!(
                out,
                "{node} {mode} {} outputs [{}] {}",
                input.get(),
                sockets(input.outputs()),
                at(input.point())
            );
        }
        NodeKind::Output => {
            let output = scene.get::<Output>(node).ok_or_else(missing)?;
            let _ = write!(
                out,
                "{node} output {} input [{}] {}",
                output.get(),
                sockets(&[output.input()]),
                at(output.point())
            );
        }
        NodeKind::Component => {
            let component = scene.get::<Component>(node).ok_or_else(missing)?;
            let dependency = scene
                .dependency(component.dependency())
                .map_or_else(|| "?".to_string(), Scene::to_dependency);
            let outputs = component
                .outputs()
                .iter()
                .map(|fan| format!("[{}]", sockets(fan)))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = write!(
                out,
                "{node} component {dependency} values [{}] inputs [{}] outputs {{{outputs}}} {}",
                join(component.values().iter()),
                sockets(component.inputs()),
                at(component.point())
            );
        }
        NodeKind::ComponentInputBoundary => {
            let context = scene.context().ok_or(CoreError::NotAComponent)?;
            let input = context.inputs().get(node.index as usize).ok_or_else(missing)?;
            let _ = write!(out, "{node} {} outputs [{}]", input.get(), sockets(input.outputs()));
        }
        NodeKind::ComponentOutputBoundary => {
            let context = scene.context().ok_or(CoreError::NotAComponent)?;
            let output = context.outputs().get(node.index as usize).ok_or_else(missing)?;
            let _ = write!(out, "{node} {} input [{}]", output.get(), sockets(&[output.input()]));
        }
    }
    Ok(out)
}

/// One-line description of a relation.
pub fn describe_rel(rel: &Relation) -> String {
    format!(
        "{} | {}[{}] -[{}]-> {}[{}]",
        rel.id, rel.from.node, rel.from.socket, rel.value, rel.to.node, rel.to.socket
    )
}

//! Storage-layer summaries of open documents.

use std::path::PathBuf;

use serde::Serialize;

use gatesim_core::{NodeKind, Scene};

/// Boundary width of a component document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Boundary {
    pub inputs: usize,
    pub outputs: usize,
}

/// Summary of one open document (for listing and `info`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    pub name: String,
    pub author: String,
    pub description: String,
    pub version: i32,
    /// The `author/name/version` string the scene is included under.
    pub dependency: String,
    pub path: Option<PathBuf>,
    pub saved: bool,
    pub gates: usize,
    pub inputs: usize,
    pub outputs: usize,
    pub components: usize,
    pub relations: usize,
    pub dependencies: Vec<String>,
    pub boundary: Option<Boundary>,
}

impl DocumentInfo {
    pub fn new(scene: &Scene, path: Option<PathBuf>, saved: bool) -> Self {
        DocumentInfo {
            name: scene.name().to_string(),
            author: scene.author().to_string(),
            description: scene.description().to_string(),
            version: scene.version(),
            dependency: scene.to_dependency(),
            path,
            saved,
            gates: scene.count(NodeKind::Gate),
            inputs: scene.count(NodeKind::Input),
            outputs: scene.count(NodeKind::Output),
            components: scene.count(NodeKind::Component),
            relations: scene.relations().len(),
            dependencies: scene.dependencies().iter().map(Scene::to_dependency).collect(),
            boundary: scene.context().map(|c| Boundary {
                inputs: c.input_count(),
                outputs: c.output_count(),
            }),
        }
    }
}

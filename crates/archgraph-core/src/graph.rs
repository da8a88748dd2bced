use std::collections::HashMap;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::context::AnalysisContext;
use crate::error::GraphIntegrityError;
use crate::facts::{FactSet, FileFacts, FunctionFact};
use crate::resolver::canonicalize;

/// Node in the dependency graph: one declared file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub path: String,
    pub layer: Option<String>,
    #[serde(default)]
    pub functions: Vec<FunctionFact>,
}

/// Edge in the dependency graph: one resolved import occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEdge {
    pub specifier: String,
    pub line: usize,
}

/// Directed file/import graph. Nodes are inserted in canonical-path order, so
/// `NodeIndex` order is lexicographic path order.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<FileNode, ImportEdge>,
    index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Build the graph from a fact set: canonicalize and validate every file,
    /// merge entries sharing a canonical path, drop excluded files, then
    /// resolve imports in parallel.
    pub fn build(facts: &FactSet, ctx: &AnalysisContext) -> Result<Self, GraphIntegrityError> {
        let mut declared: Vec<(String, FileFacts)> = Vec::with_capacity(facts.files.len());
        let mut positions: HashMap<String, usize> = HashMap::new();
        for file in &facts.files {
            let path = canonicalize(&file.path).ok_or_else(|| {
                GraphIntegrityError::UnresolvableFile {
                    path: file.path.clone(),
                }
            })?;
            validate_lines(&path, file)?;
            match positions.get(&path).copied() {
                Some(pos) => {
                    tracing::trace!(file = %path, "duplicate file entry merged");
                    let merged = &mut declared[pos].1;
                    merged.imports.extend(file.imports.iter().cloned());
                    merged.functions.extend(file.functions.iter().cloned());
                }
                None => {
                    positions.insert(path.clone(), declared.len());
                    declared.push((path, file.clone()));
                }
            }
        }

        let mut included: Vec<(String, FileFacts)> = declared
            .into_iter()
            .filter(|(path, _)| {
                let excluded = ctx.is_excluded(path);
                if excluded {
                    tracing::trace!(file = %path, "excluded from graph");
                }
                !excluded
            })
            .collect();
        included.sort_by(|a, b| a.0.cmp(&b.0));

        let mut graph = Self::new();
        for (path, file) in &included {
            graph.add_file(FileNode {
                path: path.clone(),
                layer: ctx.classifier().classify(path).map(str::to_string),
                functions: file.functions.clone(),
            });
        }

        let index = &graph.index;
        let resolved: Vec<Vec<(NodeIndex, NodeIndex, ImportEdge)>> = included
            .par_iter()
            .map(|(path, file)| {
                let from = index[path.as_str()];
                file.imports
                    .iter()
                    .filter_map(|import| {
                        let target = ctx.resolver().resolve(path, &import.specifier, |candidate| {
                            index.contains_key(candidate)
                        });
                        match target {
                            Some(target) => Some((
                                from,
                                index[target.as_str()],
                                ImportEdge {
                                    specifier: import.specifier.clone(),
                                    line: import.line,
                                },
                            )),
                            None => {
                                tracing::trace!(
                                    file = %path,
                                    specifier = %import.specifier,
                                    "unresolved import dropped"
                                );
                                None
                            }
                        }
                    })
                    .collect()
            })
            .collect();

        for (from, to, edge) in resolved.into_iter().flatten() {
            graph.graph.add_edge(from, to, edge);
        }

        tracing::debug!(
            files = graph.node_count(),
            edges = graph.edge_count(),
            "dependency graph built"
        );
        Ok(graph)
    }

    /// Add a file as a node. Returns the existing index if the path is already present.
    pub fn add_file(&mut self, node: FileNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node.path) {
            return idx;
        }
        let path = node.path.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(path, idx);
        idx
    }

    /// Add an import edge between two existing nodes.
    pub fn add_import(&mut self, from: NodeIndex, to: NodeIndex, edge: ImportEdge) -> EdgeIndex {
        self.graph.add_edge(from, to, edge)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, idx: NodeIndex) -> &FileNode {
        &self.graph[idx]
    }

    pub fn index_of(&self, path: &str) -> Option<NodeIndex> {
        self.index.get(path).copied()
    }

    /// All nodes in index order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &FileNode)> {
        self.graph
            .node_indices()
            .map(move |idx| (idx, &self.graph[idx]))
    }

    /// Every edge with its source and target nodes, in insertion order.
    pub fn edges_with_nodes(&self) -> Vec<(&FileNode, &FileNode, &ImportEdge)> {
        self.graph
            .edge_references()
            .map(|e| {
                let src = &self.graph[e.source()];
                let tgt = &self.graph[e.target()];
                (src, tgt, e.weight())
            })
            .collect()
    }

    /// Distinct successors of `idx`, ascending by index.
    pub fn successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut next: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        next.sort_unstable();
        next.dedup();
        next
    }

    /// Smallest line among the edges `from -> to`, if any exist.
    pub fn min_edge_line(&self, from: NodeIndex, to: NodeIndex) -> Option<usize> {
        self.graph
            .edges_connecting(from, to)
            .map(|e| e.weight().line)
            .min()
    }

    pub fn has_edge(&self, from: NodeIndex, to: NodeIndex) -> bool {
        self.graph.contains_edge(from, to)
    }

    pub(crate) fn inner(&self) -> &DiGraph<FileNode, ImportEdge> {
        &self.graph
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_lines(path: &str, file: &FileFacts) -> Result<(), GraphIntegrityError> {
    if let Some(import) = file.imports.iter().find(|i| i.line == 0) {
        return Err(GraphIntegrityError::InvalidLine {
            file: path.to_string(),
            what: format!("import '{}'", import.specifier),
        });
    }
    if let Some(function) = file.functions.iter().find(|f| f.start_line == 0) {
        return Err(GraphIntegrityError::InvalidLine {
            file: path.to_string(),
            what: format!("function '{}'", function.name),
        });
    }
    Ok(())
}

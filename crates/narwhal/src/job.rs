//! Layout work that can be computed away from the engine.

use orca::{Edge, Graph, LayoutResult, Node, RadialOptions};

/// Identity of a layout input: the visible node ids, the visible edge ids (both sorted) and the
/// requested focal node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutKey {
    pub nodes: Vec<String>,
    pub edges: Vec<String>,
    pub focal: Option<String>,
}

/// A self-contained layout computation stamped with the engine generation that requested it.
///
/// Jobs own all of their input, so [`LayoutJob::run`] may execute on another thread. Only the
/// outcome of the most recently prepared job is accepted by [`Engine::commit_layout`].
///
/// [`Engine::commit_layout`]: crate::Engine::commit_layout
#[derive(Debug, Clone)]
pub struct LayoutJob {
    pub(crate) generation: u64,
    pub(crate) key: LayoutKey,
    pub(crate) graph: Graph,
    pub(crate) options: RadialOptions,
}

impl LayoutJob {
    pub(crate) fn new(
        generation: u64,
        key: LayoutKey,
        edges: Vec<Edge>,
        options: RadialOptions,
    ) -> Self {
        let nodes = key.nodes.iter().map(|id| Node::new(id.clone())).collect();
        Self {
            generation,
            key,
            graph: Graph::new(nodes, edges),
            options,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn key(&self) -> &LayoutKey {
        &self.key
    }

    pub fn run(self) -> LayoutOutcome {
        let result = orca::layout(&self.graph, self.key.focal.as_deref(), &self.options);
        LayoutOutcome {
            generation: self.generation,
            key: self.key,
            result,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayoutOutcome {
    pub(crate) generation: u64,
    pub(crate) key: LayoutKey,
    pub(crate) result: orca::Result<LayoutResult>,
}

impl LayoutOutcome {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn result(&self) -> Result<&LayoutResult, &orca::Error> {
        self.result.as_ref()
    }
}

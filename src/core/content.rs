//! In-memory content tree: layers, their sublayers, and legend entries.
//!
//! The [`ContentNode`] is the fundamental unit – it holds the name and
//! visibility flags of one layer or sublayer and links to its sublayers via
//! indices into an arena (the [`ContentTree`] struct).  The row model reads
//! this tree and only ever mutates two flags on it: `visible` and `expanded`.

use super::symbol::Symbol;

// ───────────────────────────────────────── node metadata ─────

/// Whether a node is a top-level layer or something nested inside one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Layer,
    Sublayer,
}

/// Name and visibility flags for a node being added to the tree.
#[derive(Debug, Clone)]
pub struct NodeMeta {
    pub name: String,
    pub visible: bool,
    pub can_change_visibility: bool,
    pub expanded: bool,
}

impl NodeMeta {
    /// Visible, toggleable and expanded.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            can_change_visibility: true,
            expanded: true,
        }
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn can_change_visibility(mut self, can: bool) -> Self {
        self.can_change_visibility = can;
        self
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }
}

/// One legend entry: a label and the symbol drawn beside it.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub name: String,
    pub symbol: Option<Symbol>,
}

impl LegendEntry {
    pub fn new(name: impl Into<String>, symbol: Option<Symbol>) -> Self {
        Self {
            name: name.into(),
            symbol,
        }
    }
}

// ───────────────────────────────────────── tree node ─────────

/// Index into [`ContentTree::nodes`].
pub type NodeId = usize;

/// A single node in the arena-allocated tree.
#[derive(Debug, Clone)]
pub struct ContentNode {
    pub kind: NodeKind,
    pub name: String,
    pub visible: bool,
    pub can_change_visibility: bool,
    /// Accordion state: whether sublayers and legend entries are revealed.
    pub expanded: bool,
    pub parent: Option<NodeId>,
    /// Depth from the top level (0 = layer).
    pub depth: usize,
    pub sublayers: Vec<NodeId>,
    pub legend: Vec<LegendEntry>,
}

impl ContentNode {
    /// Whether expanding this node would reveal anything.
    pub fn has_children(&self) -> bool {
        !self.sublayers.is_empty() || !self.legend.is_empty()
    }
}

// ───────────────────────────────────────── arena tree ────────

/// Arena-backed content tree.  Top-level layers are listed in display
/// order in [`ContentTree::layers`].
#[derive(Debug, Clone, Default)]
pub struct ContentTree {
    pub nodes: Vec<ContentNode>,
    pub layers: Vec<NodeId>,
}

impl ContentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a top-level layer and return its [`NodeId`].
    pub fn add_layer(&mut self, meta: NodeMeta) -> NodeId {
        let id = self.push(NodeKind::Layer, meta, None, 0);
        self.layers.push(id);
        id
    }

    /// Add a sublayer under `parent_id` and return its [`NodeId`].
    pub fn add_sublayer(&mut self, parent_id: NodeId, meta: NodeMeta) -> NodeId {
        let depth = self.nodes[parent_id].depth + 1;
        let id = self.push(NodeKind::Sublayer, meta, Some(parent_id), depth);
        self.nodes[parent_id].sublayers.push(id);
        id
    }

    pub fn add_legend_entry(&mut self, node_id: NodeId, entry: LegendEntry) {
        self.nodes[node_id].legend.push(entry);
    }

    fn push(
        &mut self,
        kind: NodeKind,
        meta: NodeMeta,
        parent: Option<NodeId>,
        depth: usize,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(ContentNode {
            kind,
            name: meta.name,
            visible: meta.visible,
            can_change_visibility: meta.can_change_visibility,
            expanded: meta.expanded,
            parent,
            depth,
            sublayers: Vec::new(),
            legend: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: NodeId) -> &ContentNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.nodes[id].visible = visible;
    }

    /// Flip the accordion state of a node and return the new value.
    pub fn toggle_expand(&mut self, id: NodeId) -> bool {
        let node = &mut self.nodes[id];
        node.expanded = !node.expanded;
        node.expanded
    }

    /// Number of rows the tree flattens into, given whether collapsed nodes
    /// hide their contents.
    pub fn count_revealed_rows(&self, honor_expansion: bool) -> usize {
        self.layers
            .iter()
            .map(|&id| self.count_from(id, honor_expansion))
            .sum()
    }

    fn count_from(&self, id: NodeId, honor_expansion: bool) -> usize {
        let node = &self.nodes[id];
        if honor_expansion && !node.expanded {
            return 1;
        }
        1 + node.legend.len()
            + node
                .sublayers
                .iter()
                .map(|&child| self.count_from(child, honor_expansion))
                .sum::<usize>()
    }
}

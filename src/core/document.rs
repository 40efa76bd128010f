//! Map documents — the JSON file a table of contents is built from.
//!
//! ```json
//! { "layers": [
//!     { "name": "Roads",
//!       "legend": [ { "name": "Highway",
//!                     "symbol": { "type": "simple_line", "color": [230, 80, 20, 255], "width": 3 } } ],
//!       "sublayers": [ { "name": "Ramps", "visible": false } ] } ] }
//! ```
//!
//! Top-level entries become layers, everything nested becomes a sublayer.
//! Nodes default to visible, toggleable and expanded.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use super::content::{ContentTree, LegendEntry, NodeId, NodeMeta};
use super::symbol::Symbol;

#[derive(Debug, Deserialize)]
pub struct MapDocument {
    #[serde(default)]
    pub layers: Vec<DocumentNode>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentNode {
    pub name: String,
    #[serde(default = "yes")]
    pub visible: bool,
    #[serde(default = "yes")]
    pub can_change_visibility: bool,
    #[serde(default = "yes")]
    pub expanded: bool,
    #[serde(default)]
    pub legend: Vec<DocumentLegend>,
    #[serde(default)]
    pub sublayers: Vec<DocumentNode>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentLegend {
    pub name: String,
    #[serde(default)]
    pub symbol: Option<Symbol>,
}

fn yes() -> bool {
    true
}

impl MapDocument {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid map document")
    }

    /// Read and parse a document from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("in {}", path.display()))
    }

    /// Build the content tree the row model consumes.
    pub fn to_tree(&self) -> ContentTree {
        let mut tree = ContentTree::new();
        for layer in &self.layers {
            let id = tree.add_layer(layer.meta());
            add_contents(&mut tree, id, layer);
        }
        tree
    }
}

impl DocumentNode {
    fn meta(&self) -> NodeMeta {
        NodeMeta::new(self.name.clone())
            .visible(self.visible)
            .can_change_visibility(self.can_change_visibility)
            .expanded(self.expanded)
    }
}

fn add_contents(tree: &mut ContentTree, id: NodeId, node: &DocumentNode) {
    for entry in &node.legend {
        tree.add_legend_entry(id, LegendEntry::new(entry.name.clone(), entry.symbol.clone()));
    }
    for sub in &node.sublayers {
        let child = tree.add_sublayer(id, sub.meta());
        add_contents(tree, child, sub);
    }
}

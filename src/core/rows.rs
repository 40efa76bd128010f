//! The row model — a flat, indentation-aware view of a [`ContentTree`].
//!
//! [`ContentRowModel`] flattens layers, sublayers and legend entries into an
//! ordered list of [`Row`]s and resolves legend swatches in the background.
//!
//! Swatch renders run on worker threads and report back over an mpsc channel;
//! the owner of the model drains that channel on its own thread and feeds
//! each [`SwatchUpdate`] to [`ContentRowModel::apply_swatch_update`].  Every
//! rebuild of the row list starts a new *epoch*; callbacks registered in an
//! older epoch are dropped, so a late render can never be bound to a row that
//! has since been replaced.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use super::content::{ContentTree, NodeId, NodeKind};
use super::swatch::{Swatch, SwatchRenderer};
use super::symbol::{Symbol, SymbolKey};

// ───────────────────────────────────────── configuration ─────

/// How the table of contents is presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfiguration {
    pub title: String,
    pub show_row_separator: bool,
    pub allow_layers_accordion: bool,
    pub allow_toggle_visibility: bool,
    pub allow_layer_reordering: bool,
}

impl DisplayConfiguration {
    /// Interactive table of contents: everything enabled.
    pub fn table_of_contents() -> Self {
        Self {
            title: "Table of Contents".into(),
            show_row_separator: true,
            allow_layers_accordion: true,
            allow_toggle_visibility: true,
            allow_layer_reordering: true,
        }
    }

    /// Read-only legend.
    pub fn legend() -> Self {
        Self {
            title: "Legend".into(),
            show_row_separator: false,
            allow_layers_accordion: false,
            allow_toggle_visibility: false,
            allow_layer_reordering: false,
        }
    }
}

impl Default for DisplayConfiguration {
    fn default() -> Self {
        Self::table_of_contents()
    }
}

/// Horizontal offset of a row: `base + level * step`, in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indentation {
    pub base: u16,
    pub step: u16,
}

impl Default for Indentation {
    fn default() -> Self {
        Self { base: 16, step: 8 }
    }
}

impl Indentation {
    pub fn offset(&self, level: usize) -> u32 {
        u32::from(self.base) + level as u32 * u32::from(self.step)
    }
}

// ───────────────────────────────────────── rows ──────────────

/// One displayable line.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Layer {
        node: NodeId,
        name: String,
        indent_level: usize,
        can_toggle_visibility: bool,
        is_visible: bool,
        expanded: bool,
        /// Whether the node has sublayers or legend entries to reveal.
        expandable: bool,
    },
    Sublayer {
        node: NodeId,
        name: String,
        indent_level: usize,
        can_toggle_visibility: bool,
        is_visible: bool,
        expanded: bool,
        expandable: bool,
    },
    Legend {
        /// Layer or sublayer the entry belongs to.
        owner: NodeId,
        /// Index into the owner's legend entries.
        entry: usize,
        name: String,
        symbol_key: Option<SymbolKey>,
        indent_level: usize,
    },
}

impl Row {
    pub fn name(&self) -> &str {
        match self {
            Row::Layer { name, .. } | Row::Sublayer { name, .. } | Row::Legend { name, .. } => {
                name
            }
        }
    }

    pub fn indent_level(&self) -> usize {
        match self {
            Row::Layer { indent_level, .. }
            | Row::Sublayer { indent_level, .. }
            | Row::Legend { indent_level, .. } => *indent_level,
        }
    }

    /// The content node this row shows (the owner, for legend rows).
    pub fn node(&self) -> NodeId {
        match self {
            Row::Layer { node, .. } | Row::Sublayer { node, .. } => *node,
            Row::Legend { owner, .. } => *owner,
        }
    }

    pub fn symbol_key(&self) -> Option<&SymbolKey> {
        match self {
            Row::Legend { symbol_key, .. } => symbol_key.as_ref(),
            _ => None,
        }
    }
}

/// Identity of a row slot within one epoch of the row list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowToken {
    pub epoch: u64,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("row {index} is out of range (row count {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("row {index} does not allow visibility changes")]
    NotToggleable { index: usize },
    #[error("row {index} cannot be expanded or collapsed")]
    NotExpandable { index: usize },
}

// ───────────────────────────────────────── swatches ──────────

/// Outcome of [`ContentRowModel::request_swatch`].
#[derive(Debug, Clone)]
pub enum SwatchState {
    /// Not a legend row, or a legend entry without a symbol.
    NoSymbol,
    /// A render is in flight; the callback fires when it lands.
    Pending,
    Resolved(Arc<Swatch>),
    /// The symbol could not be rendered.
    Unavailable,
}

/// Result of a background render, sent back to the model's owner.
#[derive(Debug)]
pub struct SwatchUpdate {
    pub key: SymbolKey,
    pub swatch: Option<Swatch>,
}

type SwatchCallback = Box<dyn FnOnce(Option<Arc<Swatch>>)>;

struct PendingRequest {
    token: RowToken,
    on_resolved: SwatchCallback,
}

// ───────────────────────────────────────── model ─────────────

pub struct ContentRowModel {
    tree: ContentTree,
    config: DisplayConfiguration,
    indentation: Indentation,
    rows: Vec<Row>,
    epoch: u64,
    cache: HashMap<SymbolKey, Arc<Swatch>>,
    /// Keys whose render failed during the current epoch.
    unavailable: HashSet<SymbolKey>,
    /// Renders in flight, with the requests waiting on each.
    in_flight: HashMap<SymbolKey, Vec<PendingRequest>>,
    renderer: Arc<dyn SwatchRenderer>,
    tx: mpsc::UnboundedSender<SwatchUpdate>,
}

impl ContentRowModel {
    /// Create an empty model.  Render results are delivered on `tx`.
    pub fn new(
        renderer: Arc<dyn SwatchRenderer>,
        tx: mpsc::UnboundedSender<SwatchUpdate>,
    ) -> Self {
        Self {
            tree: ContentTree::new(),
            config: DisplayConfiguration::default(),
            indentation: Indentation::default(),
            rows: Vec::new(),
            epoch: 0,
            cache: HashMap::new(),
            unavailable: HashSet::new(),
            in_flight: HashMap::new(),
            renderer,
            tx,
        }
    }

    pub fn with_indentation(mut self, indentation: Indentation) -> Self {
        self.indentation = indentation;
        self
    }

    /// Replace the tree and configuration and rebuild every row.
    pub fn set_content(&mut self, tree: ContentTree, config: DisplayConfiguration) {
        self.tree = tree;
        self.config = config;
        self.rebuild();
    }

    pub fn set_tree(&mut self, tree: ContentTree) {
        self.tree = tree;
        self.rebuild();
    }

    pub fn set_config(&mut self, config: DisplayConfiguration) {
        self.config = config;
        self.rebuild();
    }

    pub fn set_indentation(&mut self, indentation: Indentation) {
        self.indentation = indentation;
    }

    pub fn content(&self) -> &ContentTree {
        &self.tree
    }

    pub fn config(&self) -> &DisplayConfiguration {
        &self.config
    }

    // ── rows ────────────────────────────────────────────────────

    fn rebuild(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        // In-flight renders keep running and still fill the cache; only
        // the callbacks bound to old rows are dropped.
        for waiters in self.in_flight.values_mut() {
            waiters.clear();
        }
        // Failed renders get another try once the rows are rebuilt (a
        // reload may have fixed a missing picture).
        self.unavailable.clear();

        let mut rows = Vec::with_capacity(self.tree.len());
        for &id in &self.tree.layers {
            self.collect_rows(id, &mut rows);
        }
        self.rows = rows;
        tracing::debug!(
            "rebuilt {} rows (epoch {}, {} renders in flight)",
            self.rows.len(),
            self.epoch,
            self.in_flight.len()
        );
    }

    fn collect_rows(&self, id: NodeId, rows: &mut Vec<Row>) {
        let node = self.tree.get(id);
        let indent_level = node.depth;
        let can_toggle_visibility =
            self.config.allow_toggle_visibility && node.can_change_visibility;

        let (name, is_visible, expanded, expandable) = (
            node.name.clone(),
            node.visible,
            node.expanded,
            node.has_children(),
        );
        rows.push(match node.kind {
            NodeKind::Layer => Row::Layer {
                node: id,
                name,
                indent_level,
                can_toggle_visibility,
                is_visible,
                expanded,
                expandable,
            },
            NodeKind::Sublayer => Row::Sublayer {
                node: id,
                name,
                indent_level,
                can_toggle_visibility,
                is_visible,
                expanded,
                expandable,
            },
        });

        if self.config.allow_layers_accordion && !node.expanded {
            return;
        }

        for (entry, legend) in node.legend.iter().enumerate() {
            rows.push(Row::Legend {
                owner: id,
                entry,
                name: legend.name.clone(),
                symbol_key: legend.symbol.as_ref().map(Symbol::key),
                indent_level,
            });
        }
        for &child in &node.sublayers {
            self.collect_rows(child, rows);
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_at(&self, index: usize) -> Result<&Row, RowError> {
        self.rows.get(index).ok_or(RowError::IndexOutOfRange {
            index,
            len: self.rows.len(),
        })
    }

    pub fn row_token(&self, index: usize) -> Result<RowToken, RowError> {
        self.row_at(index)?;
        Ok(RowToken {
            epoch: self.epoch,
            index,
        })
    }

    /// Horizontal offset of a row in indentation points.
    pub fn indent_offset(&self, index: usize) -> Result<u32, RowError> {
        Ok(self.indentation.offset(self.row_at(index)?.indent_level()))
    }

    pub fn can_reorder(&self) -> bool {
        self.config.allow_layer_reordering
    }

    // ── mutations ───────────────────────────────────────────────

    /// Show or hide the layer behind a row.
    pub fn update_visibility(&mut self, index: usize, visible: bool) -> Result<(), RowError> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(RowError::IndexOutOfRange { index, len })?;
        match row {
            Row::Layer {
                node,
                can_toggle_visibility: true,
                is_visible,
                ..
            }
            | Row::Sublayer {
                node,
                can_toggle_visibility: true,
                is_visible,
                ..
            } => {
                *is_visible = visible;
                self.tree.set_visible(*node, visible);
                Ok(())
            }
            _ => Err(RowError::NotToggleable { index }),
        }
    }

    /// Expand or collapse the node behind a row.  Returns the new state.
    pub fn toggle_expanded(&mut self, index: usize) -> Result<bool, RowError> {
        let node = match self.row_at(index)? {
            Row::Layer {
                node,
                expandable: true,
                ..
            }
            | Row::Sublayer {
                node,
                expandable: true,
                ..
            } if self.config.allow_layers_accordion => *node,
            _ => return Err(RowError::NotExpandable { index }),
        };
        let expanded = self.tree.toggle_expand(node);
        self.rebuild();
        Ok(expanded)
    }

    // ── swatches ────────────────────────────────────────────────

    /// Ask for the swatch of a legend row.
    ///
    /// Cached swatches call `on_resolved` immediately, as do symbols whose
    /// render failed since the last rebuild.  Otherwise the callback is
    /// parked until the render lands, and is dropped if the row list is
    /// rebuilt first.  A row that asks again while pending replaces its
    /// earlier callback.
    pub fn request_swatch(
        &mut self,
        index: usize,
        on_resolved: impl FnOnce(Option<Arc<Swatch>>) + 'static,
    ) -> Result<SwatchState, RowError> {
        let token = self.row_token(index)?;
        let Some(key) = self.rows[index].symbol_key().cloned() else {
            return Ok(SwatchState::NoSymbol);
        };

        if let Some(swatch) = self.cache.get(&key) {
            on_resolved(Some(Arc::clone(swatch)));
            return Ok(SwatchState::Resolved(Arc::clone(swatch)));
        }
        if self.unavailable.contains(&key) {
            on_resolved(None);
            return Ok(SwatchState::Unavailable);
        }

        let request = PendingRequest {
            token,
            on_resolved: Box::new(on_resolved),
        };
        match self.in_flight.get_mut(&key) {
            Some(waiters) => {
                waiters.retain(|w| w.token != token);
                waiters.push(request);
            }
            None => {
                self.spawn_render(key.clone());
                self.in_flight.insert(key, vec![request]);
            }
        }
        Ok(SwatchState::Pending)
    }

    fn spawn_render(&self, key: SymbolKey) {
        let renderer = Arc::clone(&self.renderer);
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let t0 = std::time::Instant::now();
            let swatch = match renderer.render(key.symbol()) {
                Ok(swatch) => Some(swatch),
                Err(err) => {
                    tracing::debug!("swatch {key} unavailable: {err}");
                    None
                }
            };
            tracing::trace!("render swatch {key}: {:.2?}", t0.elapsed());
            let _ = tx.send(SwatchUpdate { key, swatch });
        });
    }

    /// Store a finished render and notify the rows still waiting on it.
    /// Returns how many callbacks fired.
    pub fn apply_swatch_update(&mut self, update: SwatchUpdate) -> usize {
        let SwatchUpdate { key, swatch } = update;
        let swatch = swatch.map(Arc::new);
        match &swatch {
            Some(s) => {
                self.cache.insert(key.clone(), Arc::clone(s));
            }
            None => {
                self.unavailable.insert(key.clone());
            }
        }

        let waiters = self.in_flight.remove(&key).unwrap_or_default();
        let mut fired = 0;
        for waiter in waiters {
            if self.still_bound(waiter.token, &key) {
                (waiter.on_resolved)(swatch.clone());
                fired += 1;
            } else {
                tracing::trace!("discarding swatch {key} for stale row {:?}", waiter.token);
            }
        }
        fired
    }

    fn still_bound(&self, token: RowToken, key: &SymbolKey) -> bool {
        token.epoch == self.epoch
            && self
                .rows
                .get(token.index)
                .is_some_and(|row| row.symbol_key() == Some(key))
    }

    /// Swatch for a row, if already rendered.
    pub fn cached_swatch(&self, index: usize) -> Option<Arc<Swatch>> {
        let key = self.rows.get(index)?.symbol_key()?;
        self.cache.get(key).cloned()
    }

    /// Whether a render for this row's symbol is in flight.
    pub fn is_pending(&self, index: usize) -> bool {
        self.rows
            .get(index)
            .and_then(Row::symbol_key)
            .is_some_and(|key| self.in_flight.contains_key(key))
    }

    pub fn pending_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::core::content::{LegendEntry, NodeMeta};
    use crate::core::swatch::{ImageSwatchRenderer, SwatchError};
    use crate::core::symbol::LineStyle;

    /// Wraps the stock renderer and counts calls.
    #[derive(Default)]
    struct CountingRenderer {
        inner: ImageSwatchRenderer,
        calls: AtomicUsize,
    }

    impl SwatchRenderer for CountingRenderer {
        fn render(&self, symbol: &Symbol) -> Result<Swatch, SwatchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.render(symbol)
        }
    }

    type Seen = Rc<RefCell<Vec<Option<Arc<Swatch>>>>>;

    fn recorder() -> (Seen, impl Fn() -> Box<dyn FnOnce(Option<Arc<Swatch>>)>) {
        let seen: Seen = Rc::default();
        let sink = Rc::clone(&seen);
        let make = move || {
            let sink = Rc::clone(&sink);
            Box::new(move |s: Option<Arc<Swatch>>| sink.borrow_mut().push(s))
                as Box<dyn FnOnce(Option<Arc<Swatch>>)>
        };
        (seen, make)
    }

    fn model() -> (
        ContentRowModel,
        mpsc::UnboundedReceiver<SwatchUpdate>,
        Arc<CountingRenderer>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let renderer = Arc::new(CountingRenderer::default());
        let model = ContentRowModel::new(renderer.clone(), tx);
        (model, rx, renderer)
    }

    fn highway() -> Symbol {
        Symbol::SimpleLine {
            style: LineStyle::Solid,
            color: [230, 80, 20, 255],
            width: 3,
        }
    }

    fn unrenderable() -> Symbol {
        Symbol::PictureMarker {
            path: PathBuf::from("/nonexistent/local-road.png"),
        }
    }

    /// Roads (Highway, Local) — the canonical single-layer document.
    fn roads() -> ContentTree {
        let mut tree = ContentTree::new();
        let roads = tree.add_layer(NodeMeta::new("Roads"));
        tree.add_legend_entry(roads, LegendEntry::new("Highway", Some(highway())));
        tree.add_legend_entry(roads, LegendEntry::new("Local", Some(unrenderable())));
        tree
    }

    /// Parks > Trails > Loops, with legends at every level and a locked
    /// basemap layer.
    fn nested() -> ContentTree {
        let mut tree = ContentTree::new();
        let parks = tree.add_layer(NodeMeta::new("Parks"));
        tree.add_legend_entry(parks, LegendEntry::new("Park", Some(highway())));
        let trails = tree.add_sublayer(parks, NodeMeta::new("Trails"));
        tree.add_legend_entry(trails, LegendEntry::new("Paved", Some(highway())));
        tree.add_legend_entry(trails, LegendEntry::new("Gravel", None));
        let loops = tree.add_sublayer(trails, NodeMeta::new("Loops").expanded(false));
        tree.add_legend_entry(loops, LegendEntry::new("Loop", None));
        tree.add_layer(NodeMeta::new("Basemap").can_change_visibility(false));
        tree
    }

    fn shape(model: &ContentRowModel) -> Vec<(&'static str, String, usize)> {
        model
            .rows()
            .iter()
            .map(|row| {
                let kind = match row {
                    Row::Layer { .. } => "layer",
                    Row::Sublayer { .. } => "sublayer",
                    Row::Legend { .. } => "legend",
                };
                (kind, row.name().to_string(), row.indent_level())
            })
            .collect()
    }

    fn settle(
        model: &mut ContentRowModel,
        rx: &mut mpsc::UnboundedReceiver<SwatchUpdate>,
    ) -> usize {
        let update = rx.blocking_recv().expect("renderer dropped the channel");
        model.apply_swatch_update(update)
    }

    #[test]
    fn roads_scenario_flattens_to_layer_and_legend_rows() {
        let (mut model, mut rx, _) = model();
        model.set_content(roads(), DisplayConfiguration::default());

        assert_eq!(
            shape(&model),
            vec![
                ("layer", "Roads".into(), 0),
                ("legend", "Highway".into(), 0),
                ("legend", "Local".into(), 0),
            ]
        );

        let (seen, cb) = recorder();
        assert!(matches!(
            model.request_swatch(1, cb()).unwrap(),
            SwatchState::Pending
        ));
        assert_eq!(settle(&mut model, &mut rx), 1);
        assert!(seen.borrow()[0].is_some());
        assert!(model.cached_swatch(1).is_some());

        assert!(matches!(
            model.request_swatch(2, cb()).unwrap(),
            SwatchState::Pending
        ));
        assert_eq!(settle(&mut model, &mut rx), 1);
        assert!(seen.borrow()[1].is_none());

        // Permanently unavailable: answered immediately, no new render.
        assert!(matches!(
            model.request_swatch(2, cb()).unwrap(),
            SwatchState::Unavailable
        ));
        assert_eq!(seen.borrow().len(), 3);
        assert_eq!(model.pending_count(), 0);
    }

    #[test]
    fn failed_render_is_retried_after_rebuild() {
        let (mut model, mut rx, renderer) = model();
        let path = std::env::temp_dir().join(format!(
            "layer-contents-{}-late-marker.png",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let mut tree = ContentTree::new();
        let roads = tree.add_layer(NodeMeta::new("Roads"));
        let marker = Symbol::PictureMarker { path: path.clone() };
        tree.add_legend_entry(roads, LegendEntry::new("Rest area", Some(marker)));
        model.set_content(tree.clone(), DisplayConfiguration::default());

        let (seen, cb) = recorder();
        model.request_swatch(1, cb()).unwrap();
        settle(&mut model, &mut rx);
        assert!(seen.borrow()[0].is_none());
        assert!(matches!(
            model.request_swatch(1, cb()).unwrap(),
            SwatchState::Unavailable
        ));
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);

        // The picture shows up on disk, then the document is reloaded.
        image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 90, 200, 255]))
            .save(&path)
            .unwrap();
        model.set_tree(tree);

        assert!(matches!(
            model.request_swatch(1, cb()).unwrap(),
            SwatchState::Pending
        ));
        assert_eq!(settle(&mut model, &mut rx), 1);
        let _ = std::fs::remove_file(&path);

        assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);
        assert!(seen.borrow().last().is_some_and(|s| s.is_some()));
        assert!(model.cached_swatch(1).is_some());
    }

    #[test]
    fn nested_content_indents_by_depth() {
        let (mut model, _rx, _) = model();
        model.set_content(nested(), DisplayConfiguration::default());

        assert_eq!(
            shape(&model),
            vec![
                ("layer", "Parks".into(), 0),
                ("legend", "Park".into(), 0),
                ("sublayer", "Trails".into(), 1),
                ("legend", "Paved".into(), 1),
                ("legend", "Gravel".into(), 1),
                ("sublayer", "Loops".into(), 2),
                ("layer", "Basemap".into(), 0),
            ]
        );
        assert_eq!(model.row_count(), model.content().count_revealed_rows(true));
        assert_eq!(model.indent_offset(0).unwrap(), 16);
        assert_eq!(model.indent_offset(5).unwrap(), 32);
    }

    #[test]
    fn disabling_the_accordion_reveals_everything() {
        let (mut model, _rx, _) = model();
        model.set_content(nested(), DisplayConfiguration::legend());

        assert_eq!(model.row_count(), 8);
        assert_eq!(model.row_count(), model.content().count_revealed_rows(false));
        assert_eq!(model.rows()[6].name(), "Loop");
        assert_eq!(model.rows()[6].indent_level(), 2);
    }

    #[test]
    fn set_content_is_idempotent() {
        let (mut model, _rx, _) = model();
        model.set_content(nested(), DisplayConfiguration::default());
        let first = model.rows().to_vec();
        model.set_content(nested(), DisplayConfiguration::default());
        assert_eq!(model.rows(), first.as_slice());
    }

    #[test]
    fn accessors_reject_out_of_range_rows() {
        let (mut model, _rx, _) = model();
        model.set_content(roads(), DisplayConfiguration::default());

        assert_eq!(
            model.row_at(3),
            Err(RowError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert!(model.request_swatch(7, |_| {}).is_err());
        assert!(model.update_visibility(3, false).is_err());
    }

    #[test]
    fn shared_symbols_render_once() {
        let (mut model, mut rx, renderer) = model();
        model.set_content(nested(), DisplayConfiguration::default());

        // "Park" and "Paved" use the same symbol definition.
        let (seen, cb) = recorder();
        model.request_swatch(1, cb()).unwrap();
        model.request_swatch(3, cb()).unwrap();
        assert_eq!(model.pending_count(), 1);

        assert_eq!(settle(&mut model, &mut rx), 2);
        assert_eq!(seen.borrow().len(), 2);

        assert!(matches!(
            model.request_swatch(3, cb()).unwrap(),
            SwatchState::Resolved(_)
        ));
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn repeated_requests_from_one_row_keep_one_callback() {
        let (mut model, mut rx, renderer) = model();
        model.set_content(roads(), DisplayConfiguration::default());

        let (seen, cb) = recorder();
        model.request_swatch(1, cb()).unwrap();
        model.request_swatch(1, cb()).unwrap();

        assert_eq!(settle(&mut model, &mut rx), 1);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rebuild_discards_pending_callbacks_but_keeps_the_swatch() {
        let (mut model, mut rx, renderer) = model();
        model.set_content(nested(), DisplayConfiguration::default());

        let (seen, cb) = recorder();
        assert!(matches!(
            model.request_swatch(3, cb()).unwrap(),
            SwatchState::Pending
        ));
        model.set_content(nested(), DisplayConfiguration::default());

        assert_eq!(settle(&mut model, &mut rx), 0);
        assert!(seen.borrow().is_empty());

        // The render still landed in the cache for the new rows.
        assert!(model.cached_swatch(3).is_some());
        assert!(matches!(
            model.request_swatch(3, cb()).unwrap(),
            SwatchState::Resolved(_)
        ));
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn slot_reassigned_to_other_data_is_not_notified() {
        let (mut model, mut rx, _) = model();
        model.set_content(nested(), DisplayConfiguration::default());

        let (seen, cb) = recorder();
        model.request_swatch(3, cb()).unwrap();
        let pending_token = model.row_token(3).unwrap();

        // Collapsing "Parks" rebuilds the list; slot 3 no longer exists.
        assert!(!model.toggle_expanded(0).unwrap());
        assert_ne!(model.row_token(1).unwrap().epoch, pending_token.epoch);
        assert_eq!(model.row_count(), 2);

        assert_eq!(settle(&mut model, &mut rx), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn rows_without_symbols_never_fetch() {
        let (mut model, _rx, renderer) = model();
        model.set_content(nested(), DisplayConfiguration::default());

        let (seen, cb) = recorder();
        assert!(matches!(
            model.request_swatch(4, cb()).unwrap(),
            SwatchState::NoSymbol
        ));
        assert!(matches!(
            model.request_swatch(0, cb()).unwrap(),
            SwatchState::NoSymbol
        ));
        assert!(seen.borrow().is_empty());
        assert_eq!(model.pending_count(), 0);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn update_visibility_mutates_the_content_node() {
        let (mut model, _rx, _) = model();
        model.set_content(nested(), DisplayConfiguration::default());

        model.update_visibility(2, false).unwrap();
        let trails = model.rows()[2].node();
        assert!(!model.content().get(trails).visible);
        assert!(matches!(
            model.rows()[2],
            Row::Sublayer {
                is_visible: false,
                ..
            }
        ));
    }

    #[test]
    fn update_visibility_rejects_locked_rows() {
        let (mut model, _rx, _) = model();
        model.set_content(nested(), DisplayConfiguration::default());

        let basemap = model.rows()[6].node();
        assert_eq!(
            model.update_visibility(6, false),
            Err(RowError::NotToggleable { index: 6 })
        );
        assert!(model.content().get(basemap).visible);

        assert_eq!(
            model.update_visibility(1, false),
            Err(RowError::NotToggleable { index: 1 })
        );
    }

    #[test]
    fn update_visibility_respects_configuration() {
        let (mut model, _rx, _) = model();
        let config = DisplayConfiguration {
            allow_toggle_visibility: false,
            ..DisplayConfiguration::default()
        };
        model.set_content(roads(), config);

        assert_eq!(
            model.update_visibility(0, false),
            Err(RowError::NotToggleable { index: 0 })
        );
        assert!(model.content().get(0).visible);
    }

    #[test]
    fn accordion_expands_and_collapses() {
        let (mut model, _rx, _) = model();
        model.set_content(nested(), DisplayConfiguration::default());

        assert!(model.toggle_expanded(5).unwrap());
        assert_eq!(model.rows()[6].name(), "Loop");
        assert_eq!(model.row_count(), 8);

        assert_eq!(
            model.toggle_expanded(1),
            Err(RowError::NotExpandable { index: 1 })
        );
        // Basemap has nothing to reveal.
        assert_eq!(
            model.toggle_expanded(7),
            Err(RowError::NotExpandable { index: 7 })
        );
    }

    #[test]
    fn accordion_is_unavailable_when_disabled() {
        let (mut model, _rx, _) = model();
        model.set_content(nested(), DisplayConfiguration::legend());

        assert_eq!(
            model.toggle_expanded(0),
            Err(RowError::NotExpandable { index: 0 })
        );
    }

    #[test]
    fn reordering_follows_configuration() {
        let (mut model, _rx, _) = model();
        model.set_content(roads(), DisplayConfiguration::table_of_contents());
        assert!(model.can_reorder());
        model.set_config(DisplayConfiguration::legend());
        assert!(!model.can_reorder());
    }
}

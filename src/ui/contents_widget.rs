//! Custom Ratatui widget that renders a [`ContentRowModel`] as an indented
//! table of contents with visibility boxes, accordion arrows and swatches.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, StatefulWidget, Widget},
};

use crate::config::AppConfig;
use crate::core::rows::{ContentRowModel, Row};

use super::spinner::spinner_frame;
use super::swatch::render_swatch_halfblocks;
use super::theme::Theme;

/// Terminal columns a legend swatch occupies.
const SWATCH_COLUMNS: u16 = 2;

// ───────────────────────────────────────── state ─────────────

/// Persistent state for the contents list (selected row, scroll offset).
#[derive(Debug, Default)]
pub struct ContentsListState {
    /// Index into the model's rows that is currently highlighted.
    pub selected: usize,
    /// Vertical scroll offset (first visible row).
    pub offset: usize,
}

impl ContentsListState {
    pub fn select_next(&mut self, max: usize) {
        if max > 0 && self.selected < max - 1 {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keep the selection inside a list that may have shrunk.
    pub fn clamp_selection(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Ensure the selected row is visible within the viewport of `height` rows.
    pub fn clamp_scroll(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + height {
            self.offset = self.selected - height + 1;
        }
    }

    /// Row indices currently on screen for a viewport of `height` rows.
    pub fn visible_range(&self, height: usize, len: usize) -> std::ops::Range<usize> {
        let start = self.offset.min(len);
        start..(start + height).min(len)
    }
}

// ───────────────────────────────────────── widget ────────────

/// The contents widget itself — created fresh each frame.
pub struct ContentsWidget<'a> {
    model: &'a ContentRowModel,
    config: &'a AppConfig,
    block: Option<Block<'a>>,
    tick: u64,
}

impl<'a> ContentsWidget<'a> {
    pub fn new(model: &'a ContentRowModel, config: &'a AppConfig) -> Self {
        Self {
            model,
            config,
            block: None,
            tick: 0,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Frame counter for the pending-swatch spinner.
    pub fn tick(mut self, tick: u64) -> Self {
        self.tick = tick;
        self
    }

    /// Build the text of one row.  The swatch (for legend rows) is drawn
    /// separately over the blank cells reserved here.
    fn row_line(&self, index: usize, row: &Row, is_selected: bool) -> Line<'a> {
        let display = self.model.config();
        let indent = self
            .model
            .indent_offset(index)
            .map_or(0, |points| self.config.indent_columns(points));
        let mut spans = vec![Span::raw(" ".repeat(indent as usize))];

        match row {
            Row::Layer {
                name,
                can_toggle_visibility,
                is_visible,
                expanded,
                expandable,
                ..
            }
            | Row::Sublayer {
                name,
                can_toggle_visibility,
                is_visible,
                expanded,
                expandable,
                ..
            } => {
                if display.allow_layers_accordion {
                    let arrow = match (*expandable, *expanded) {
                        (false, _) => "  ",
                        (true, true) => "▾ ",
                        (true, false) => "▸ ",
                    };
                    spans.push(Span::styled(arrow, Theme::accordion_style()));
                }
                if *can_toggle_visibility {
                    let mark = if *is_visible { "[x] " } else { "[ ] " };
                    spans.push(Span::styled(mark, Theme::toggle_style(*is_visible)));
                }
                let style = if is_selected {
                    Theme::selected_style()
                } else if !is_visible {
                    Theme::hidden_style()
                } else if matches!(row, Row::Layer { .. }) {
                    Theme::layer_style()
                } else {
                    Theme::sublayer_style()
                };
                spans.push(Span::styled(name.clone(), style));
            }
            Row::Legend { name, .. } => {
                let marker = if self.model.is_pending(index) {
                    format!("{} ", spinner_frame(self.tick))
                } else {
                    " ".repeat(SWATCH_COLUMNS as usize)
                };
                spans.push(Span::styled(marker, Theme::spinner_style()));
                spans.push(Span::raw(" "));
                let style = if is_selected {
                    Theme::selected_style()
                } else {
                    Theme::legend_style()
                };
                spans.push(Span::styled(name.clone(), style));
            }
        }

        Line::from(spans)
    }
}

impl<'a> StatefulWidget for ContentsWidget<'a> {
    type State = ContentsListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let rows = self.model.rows();
        state.clamp_selection(rows.len());
        state.clamp_scroll(inner.height as usize);
        let separators = self.model.config().show_row_separator;
        let reorder = self.model.can_reorder();

        for (i, index) in state
            .visible_range(inner.height as usize, rows.len())
            .enumerate()
        {
            let row = &rows[index];
            let y = inner.y + i as u16;
            let is_selected = index == state.selected;
            let row_area = Rect::new(inner.x, y, inner.width, 1);

            let line = self.row_line(index, row, is_selected);
            buf.set_line(inner.x, y, &line, inner.width);

            if let Row::Legend { .. } = row {
                if let Some(swatch) = self.model.cached_swatch(index) {
                    let indent = self
                        .model
                        .indent_offset(index)
                        .map_or(0, |points| self.config.indent_columns(points));
                    let cell = Rect::new(inner.x + indent, y, SWATCH_COLUMNS, 1)
                        .intersection(row_area);
                    render_swatch_halfblocks(&swatch, cell, buf);
                }
            }

            if reorder && matches!(row, Row::Layer { .. }) && inner.width > 2 {
                let handle = Line::from(Span::styled("≡", Theme::reorder_style()));
                buf.set_line(inner.x + inner.width - 2, y, &handle, 1);
            }

            if separators {
                buf.set_style(row_area, Theme::separator_style());
            }
        }
    }
}

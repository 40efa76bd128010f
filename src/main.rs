//! A terminal table of contents for map documents.
//!
//! Opens a JSON map document and shows its layers, sublayers and legend
//! entries as an indented list, with symbol swatches rendered off-thread.

mod app;
mod config;
mod core;
mod ui;

use std::io::{self, stderr};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use tokio::sync::mpsc;

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    state::{ActiveView, AppState},
};
use crate::config::AppConfig;
use crate::core::{
    document::MapDocument,
    rows::{ContentRowModel, DisplayConfiguration, SwatchUpdate},
    swatch::ImageSwatchRenderer,
};
use crate::ui::{
    contents_widget::ContentsWidget, layout::AppLayout, popup, spinner::LoadingIndicator,
    theme::Theme,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    /// Every row interaction enabled.
    Toc,
    /// Read-only legend.
    Legend,
}

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Layer table of contents for map documents")]
struct Cli {
    /// Map document (JSON) to open.
    document: PathBuf,

    /// Display preset; overrides the config file for this session.
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Swatch edge in pixels.
    #[arg(long, value_parser = clap::value_parser!(u32).range(4..=128))]
    swatch_size: Option<u32>,
}

// ───────────────────────────────────────── swatches ─────────

/// Ask for the swatches of legend rows currently on screen.
///
/// Rows that already hold a swatch or are waiting on one are skipped, so
/// calling this every frame only starts work for rows that just scrolled in
/// or were rebuilt.
fn request_visible_swatches(state: &mut AppState, visible_rows: usize) {
    let range = state
        .list_state
        .visible_range(visible_rows, state.model.row_count());
    for index in range {
        if state.model.rows()[index].symbol_key().is_none()
            || state.model.cached_swatch(index).is_some()
            || state.model.is_pending(index)
        {
            continue;
        }
        let resolved = Rc::clone(&state.swatches_resolved);
        let result = state.model.request_swatch(index, move |swatch| {
            if swatch.is_some() {
                resolved.set(resolved.get() + 1);
            }
        });
        if let Err(err) = result {
            tracing::warn!("swatch request for row {index}: {err}");
        }
    }
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // ── load document + config ────────────────────────────────
    let document = MapDocument::load(&cli.document)
        .with_context(|| format!("cannot open {}", cli.document.display()))?;

    let mut user_config = AppConfig::load();
    match cli.preset {
        Some(Preset::Toc) => user_config.display = DisplayConfiguration::table_of_contents(),
        Some(Preset::Legend) => user_config.display = DisplayConfiguration::legend(),
        None => {}
    }
    if let Some(size) = cli.swatch_size {
        user_config.swatch_size = size;
    }

    let (swatch_tx, mut swatch_rx) = mpsc::unbounded_channel::<SwatchUpdate>();
    let renderer = Arc::new(ImageSwatchRenderer::new(user_config.swatch_size));
    let mut model =
        ContentRowModel::new(renderer, swatch_tx).with_indentation(user_config.indentation);
    model.set_content(document.to_tree(), user_config.display.clone());
    tracing::debug!(
        "loaded {}: {} rows",
        cli.document.display(),
        model.row_count()
    );

    let mut state = AppState::new(cli.document, model, user_config);

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    execute!(stderr(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let mut events = spawn_event_reader(Duration::from_millis(100));

    // ── event loop ────────────────────────────────────────────
    loop {
        let size = terminal.size()?;
        let visible_rows =
            AppLayout::from_area(Rect::new(0, 0, size.width, size.height)).visible_rows();
        request_visible_swatches(&mut state, visible_rows);

        let settings_popup = (state.active_view == ActiveView::SettingsMenu)
            .then(|| popup::SettingsPopup::new(&state));

        terminal.draw(|frame| {
            let layout = AppLayout::from_area(frame.area());

            let block = Block::default()
                .title(format!(" {} ", state.model.config().title))
                .title_style(Theme::title_style())
                .borders(Borders::ALL)
                .border_style(Theme::border_style());

            let widget = ContentsWidget::new(&state.model, &state.config)
                .block(block)
                .tick(state.tick);
            frame.render_stateful_widget(widget, layout.contents_area, &mut state.list_state);

            frame.render_widget(
                LoadingIndicator {
                    pending: state.model.pending_count(),
                    tick: state.tick,
                },
                layout.contents_area,
            );

            let hint = state.config.status_bar_hint();
            let status_text = match state.active_view {
                ActiveView::Contents => state.status_message.as_deref().unwrap_or(&hint),
                ActiveView::SettingsMenu | ActiveView::ControlsSubmenu => "",
            };
            let status = Paragraph::new(status_text).style(Theme::status_bar_style());
            frame.render_widget(status, layout.status_area);

            if let Some(settings) = settings_popup {
                frame.render_widget(settings, frame.area());
            }
            if state.active_view == ActiveView::ControlsSubmenu {
                frame.render_widget(
                    popup::ControlsPopup {
                        config: &state.config,
                        selected: state.controls_selected,
                        awaiting_rebind: state.awaiting_rebind,
                    },
                    frame.area(),
                );
            }
        })?;

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(&mut state, k),
                    AppEvent::Resize(_, _) => {}
                    AppEvent::Tick => state.tick = state.tick.wrapping_add(1),
                }
            }

            Some(update) = swatch_rx.recv() => {
                // Drain whatever else has landed before redrawing.
                let mut fired = state.model.apply_swatch_update(update);
                while let Ok(update) = swatch_rx.try_recv() {
                    fired += state.model.apply_swatch_update(update);
                }
                tracing::trace!("swatch batch: {fired} rows notified");
            }
        }

        if state.should_quit {
            break;
        }
    }

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::debug!(
        "{} swatches delivered, {} cached",
        state.swatches_resolved.get(),
        state.model.cached_count()
    );

    Ok(())
}

//! Terminal event abstraction.
//!
//! Wraps crossterm events into a simpler enum and runs a background task that
//! forwards them over a channel so the main loop stays non-blocking.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Nothing happened within the tick rate; used to animate spinners.
    Tick,
}

impl AppEvent {
    /// Map a raw terminal event, dropping the ones the app ignores
    /// (key releases, mouse, focus, paste).
    fn from_terminal(ev: CtEvent) -> Option<Self> {
        match ev {
            CtEvent::Key(k) if k.kind != KeyEventKind::Release => Some(AppEvent::Key(k)),
            CtEvent::Resize(w, h) => Some(AppEvent::Resize(w, h)),
            _ => None,
        }
    }
}

/// Spawns a blocking task that polls the terminal for events and sends them
/// through the returned channel.  The task ends when the receiver is dropped.
pub fn spawn_event_reader(tick_rate: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || loop {
        let next = match event::poll(tick_rate) {
            Ok(true) => match event::read() {
                Ok(ev) => AppEvent::from_terminal(ev),
                Err(err) => {
                    tracing::debug!("terminal read failed: {err}");
                    None
                }
            },
            Ok(false) => Some(AppEvent::Tick),
            Err(_) => Some(AppEvent::Tick),
        };
        if let Some(ev) = next {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    #[test]
    fn key_releases_are_dropped() {
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(AppEvent::from_terminal(CtEvent::Key(release)).is_none());

        let press = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(matches!(
            AppEvent::from_terminal(CtEvent::Key(press)),
            Some(AppEvent::Key(_))
        ));
    }

    #[test]
    fn resize_is_forwarded_and_focus_is_not() {
        assert!(matches!(
            AppEvent::from_terminal(CtEvent::Resize(80, 24)),
            Some(AppEvent::Resize(80, 24))
        ));
        assert!(AppEvent::from_terminal(CtEvent::FocusGained).is_none());
    }
}

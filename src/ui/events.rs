use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use ratatui::layout::{Position, Rect};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::state::{Action, Input, Mode};

/// What the app loop gets from the outside world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Terminal(Event),
    /// The player has to close: hangup, terminate, or the terminal went away.
    Shutdown(&'static str),
}

/// Forwards raw terminal events and shutdown signals to the app task.
pub struct EventHandler {
    event_receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();

        spawn_signal_watcher(event_sender.clone());

        tokio::task::spawn_blocking(move || loop {
            match event::poll(Duration::from_millis(50)) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if event_sender.send(AppEvent::Terminal(ev)).is_err() {
                            break; // app is gone
                        }
                    }
                    Err(e) => debug!("terminal read failed: {}", e),
                },
                Ok(false) if event_sender.is_closed() => break,
                Ok(false) => {}
                Err(e) => {
                    warn!("terminal poll failed: {}", e);
                    let _ = event_sender.send(AppEvent::Shutdown("terminal input lost"));
                    break;
                }
            }
        });

        Self { event_receiver }
    }

    /// Wait up to `timeout` for the next event. A closed channel means
    /// nobody is feeding input any more, which is reported as a shutdown.
    pub async fn next_event(&mut self, timeout: Duration) -> Option<AppEvent> {
        match tokio::time::timeout(timeout, self.event_receiver.recv()).await {
            Ok(Some(event)) => Some(event),
            Ok(None) => Some(AppEvent::Shutdown("event channel closed")),
            Err(_) => None,
        }
    }
}

#[cfg(unix)]
fn spawn_signal_watcher(sender: mpsc::UnboundedSender<AppEvent>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut hangup, mut terminate) =
            match (signal(SignalKind::hangup()), signal(SignalKind::terminate())) {
                (Ok(hangup), Ok(terminate)) => (hangup, terminate),
                (Err(e), _) | (_, Err(e)) => {
                    warn!("Cannot watch for hangup/terminate: {}", e);
                    return;
                }
            };

        let reason = tokio::select! {
            _ = hangup.recv() => "hangup",
            _ = terminate.recv() => "terminate",
        };
        info!("Received {} signal", reason);
        let _ = sender.send(AppEvent::Shutdown(reason));
    });
}

#[cfg(not(unix))]
fn spawn_signal_watcher(sender: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = sender.send(AppEvent::Shutdown("ctrl-c"));
        }
    });
}

/// A list drawn in the last frame, for turning a click into a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListArea {
    pub area: Rect, // including the border
    pub offset: usize,
    pub len: usize,
}

impl ListArea {
    fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let inner = Rect {
            x: self.area.x.saturating_add(1),
            y: self.area.y.saturating_add(1),
            width: self.area.width.saturating_sub(2),
            height: self.area.height.saturating_sub(2),
        };
        if !inner.contains(Position::new(column, row)) {
            return None;
        }
        let idx = self.offset + usize::from(row - inner.y);
        (idx < self.len).then_some(idx)
    }
}

/// Clickable regions of the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickMap {
    pub list: Option<ListArea>,
    pub play_button: Option<Rect>,
}

impl ClickMap {
    fn action_at(&self, column: u16, row: u16) -> Option<Action> {
        if let Some(idx) = self.list.and_then(|list| list.row_at(column, row)) {
            return Some(Action::ClickRow(idx));
        }
        self.play_button
            .filter(|button| button.contains(Position::new(column, row)))
            .map(|_| Action::PlayPause)
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn one terminal event into press/release inputs for the current screen.
///
/// Most terminals never report key releases, so a plain key press is
/// followed by a synthetic release to re-arm the click debounce. Clicks only
/// count when they land on something in `clicks`.
pub fn translate(event: &Event, mode: Mode, clicks: &ClickMap) -> Vec<Input> {
    match event {
        Event::Key(key) => match key.kind {
            KeyEventKind::Press => match key_to_action(key, mode) {
                Some(action) => vec![Input::press(action), Input::release()],
                None => Vec::new(),
            },
            KeyEventKind::Repeat => key_to_action(key, mode)
                .map(|action| vec![Input::repeat(action)])
                .unwrap_or_default(),
            KeyEventKind::Release => vec![Input::release()],
        },
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => clicks
                .action_at(mouse.column, mouse.row)
                .map(|action| vec![Input::press(action)])
                .unwrap_or_default(),
            MouseEventKind::Up(MouseButton::Left) => vec![Input::release()],
            MouseEventKind::ScrollUp => vec![Input::press(Action::Up), Input::release()],
            MouseEventKind::ScrollDown => vec![Input::press(Action::Down), Input::release()],
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn key_to_action(key: &KeyEvent, mode: Mode) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(match mode {
            Mode::MainPlayer => Action::Quit,
            _ => Action::Cancel,
        });
    }

    // Shared navigation
    match key.code {
        KeyCode::Up => return Some(Action::Up),
        KeyCode::Down => return Some(Action::Down),
        KeyCode::Enter => return Some(Action::Confirm),
        KeyCode::Esc => return Some(Action::Cancel),
        _ => {}
    }

    match mode {
        Mode::MainPlayer => match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char(' ') => Some(Action::PlayPause),
            KeyCode::Char('n') | KeyCode::Right => Some(Action::Next),
            KeyCode::Char('b') | KeyCode::Left => Some(Action::Previous),
            KeyCode::Char('c') => Some(Action::OpenCreate),
            KeyCode::Char('p') => Some(Action::OpenSelect),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::VolumeUp),
            KeyCode::Char('-') => Some(Action::VolumeDown),
            _ => None,
        },
        // Everything printable is text here; the screen decides by focus
        Mode::CreatePlaylist => match key.code {
            KeyCode::Tab | KeyCode::BackTab => Some(Action::SwitchFocus),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(ch) => Some(Action::Input(ch)),
            _ => None,
        },
        Mode::SelectPlaylist => match key.code {
            KeyCode::Char('q') => Some(Action::Cancel),
            _ => None,
        },
    }
}

use super::{translate, AppEvent, ClickMap, EventHandler, ListArea, TerminalManager};
use crate::audio::{PlaybackBackend, PlaybackState};
use crate::config::UiConfig;
use crate::state::mode::CreateFocus;
use crate::state::{Mode, PlayerSession};
use anyhow::Result;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::time::Duration;
use tracing::{error, info};

pub struct App<B: PlaybackBackend> {
    terminal: TerminalManager,
    event_handler: EventHandler,
    session: PlayerSession<B>,
    ui: UiConfig,
    clicks: ClickMap,
}

impl<B: PlaybackBackend> App<B> {
    pub fn new(session: PlayerSession<B>, ui: UiConfig) -> Result<Self> {
        let terminal = TerminalManager::new()?;
        let event_handler = EventHandler::new();

        Ok(Self {
            terminal,
            event_handler,
            session,
            ui,
            clicks: ClickMap::default(),
        })
    }

    /// Poll, dispatch, render until the user quits. Playlists are saved on the
    /// way out, also when drawing fails or the terminal goes away.
    pub async fn run(&mut self) -> Result<()> {
        let result = self.event_loop().await;
        if let Err(e) = &result {
            error!("UI loop failed: {:#}", e);
            self.session.shutdown("ui error");
        }
        info!("Player closed");
        result
    }

    async fn event_loop(&mut self) -> Result<()> {
        let tick = Duration::from_millis(self.ui.tick_rate_ms.max(10));

        while !self.session.should_quit() {
            let session = &self.session;
            let ui = &self.ui;
            let mut clicks = ClickMap::default();
            self.terminal.draw(|f| render(f, session, ui, &mut clicks))?;
            self.clicks = clicks;

            match self.event_handler.next_event(tick).await {
                Some(AppEvent::Terminal(event)) => {
                    for input in translate(&event, self.session.mode(), &self.clicks) {
                        self.session.dispatch(input);
                    }
                }
                Some(AppEvent::Shutdown(reason)) => {
                    self.session.shutdown(reason);
                    break;
                }
                None => {}
            }
            self.session.tick();
        }
        Ok(())
    }

    pub fn into_session(self) -> PlayerSession<B> {
        self.session
    }
}

fn render<B: PlaybackBackend>(
    f: &mut Frame,
    session: &PlayerSession<B>,
    ui: &UiConfig,
    clicks: &mut ClickMap,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // screen body
            Constraint::Length(1), // status
            Constraint::Length(1), // key help
        ])
        .split(f.area());

    render_header(f, chunks[0], session.mode());
    match session.mode() {
        Mode::MainPlayer => render_main(f, chunks[1], session, ui, clicks),
        Mode::CreatePlaylist => render_create(f, chunks[1], session, clicks),
        Mode::SelectPlaylist => render_select(f, chunks[1], session, clicks),
    }
    render_status(f, chunks[2], session.state.status());
    render_help(f, chunks[3], session.mode());
}

fn render_header(f: &mut Frame, area: Rect, mode: Mode) {
    let title = match mode {
        Mode::MainPlayer => "TuneDeck",
        Mode::CreatePlaylist => "TuneDeck - Create New Playlist",
        Mode::SelectPlaylist => "TuneDeck - Select Playlist to Play",
    };
    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn render_main<B: PlaybackBackend>(
    f: &mut Frame,
    area: Rect,
    session: &PlayerSession<B>,
    ui: &UiConfig,
    clicks: &mut ClickMap,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(rows[0]);

    let state = &session.state;

    // Current playlist + upcoming songs
    let mut queue_lines = Vec::new();
    match state.store.active() {
        Some(active) => {
            queue_lines.push(Line::from(Span::styled(
                active.name().to_string(),
                Style::default().fg(Color::Yellow),
            )));
            queue_lines.extend(
                active
                    .upcoming()
                    .take(ui.queue_preview)
                    .filter_map(|id| state.song(id))
                    .map(|song| Line::from(format!("  {}", song.short_title()))),
            );
        }
        None => queue_lines.push(Line::from("No Playlist Selected")),
    }
    let queue = Paragraph::new(queue_lines)
        .block(Block::default().borders(Borders::ALL).title("Current Playlist"));
    f.render_widget(queue, columns[0]);

    // Library
    let now_playing = state.now_playing();
    let items: Vec<ListItem> = state
        .catalog
        .iter()
        .map(|(id, song)| {
            if now_playing == Some(id) {
                ListItem::new(format!("♪ {}", song.display_title()))
                    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                ListItem::new(format!("  {}", song.display_title()))
            }
        })
        .collect();
    let library_title = if state.catalog.is_empty() {
        "Library (no songs found)".to_string()
    } else {
        format!("Library ({})", state.catalog.len())
    };
    let library = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(library_title))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("► ");
    let mut list_state = ListState::default();
    if !state.catalog.is_empty() {
        list_state.select(Some(session.controller.library_highlight));
    }
    f.render_stateful_widget(library, columns[1], &mut list_state);
    clicks.list = Some(ListArea {
        area: columns[1],
        offset: list_state.offset(),
        len: state.catalog.len(),
    });

    // Recently played
    let recent: Vec<ListItem> = state
        .history
        .entries()
        .filter_map(|entry| {
            state.song(entry.song).map(|song| {
                ListItem::new(format!(
                    "{} {}",
                    entry.played_at.format("%H:%M"),
                    song.short_title()
                ))
            })
        })
        .collect();
    let recent = List::new(recent)
        .block(Block::default().borders(Borders::ALL).title("Recently Played"));
    f.render_widget(recent, columns[2]);

    render_controls(f, rows[1], session, clicks);
}

fn render_controls<B: PlaybackBackend>(
    f: &mut Frame,
    area: Rect,
    session: &PlayerSession<B>,
    clicks: &mut ClickMap,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
        ])
        .split(area);

    let playback = session.playback_state();
    let title = match (session.state.now_playing_song(), playback) {
        (None, _) => "No Songs Available".to_string(),
        (Some(_), PlaybackState::Stopped) if session.state.history.is_empty() => {
            "No Song Playing".to_string()
        }
        (Some(song), _) => format!("♪ {}", song.display_title()),
    };
    let info = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL).title("Now Playing"));
    f.render_widget(info, chunks[0]);

    let volume = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Volume"))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(session.backend().volume().clamp(0.0, 1.0) as f64);
    f.render_widget(volume, chunks[1]);

    let state_text = match playback {
        PlaybackState::Playing => "▶ Playing",
        PlaybackState::Paused => "⏸ Paused",
        PlaybackState::Stopped => "⏹ Stopped",
    };
    let status = Paragraph::new(state_text)
        .block(Block::default().borders(Borders::ALL).title("Play/Pause"));
    f.render_widget(status, chunks[2]);
    clicks.play_button = Some(chunks[2]);
}

fn render_create<B: PlaybackBackend>(
    f: &mut Frame,
    area: Rect,
    session: &PlayerSession<B>,
    clicks: &mut ClickMap,
) {
    let screen = &session.controller.create;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let focused = Style::default().fg(Color::Yellow);
    let (name_text, name_style) = match &screen.error {
        Some(error) if screen.name.is_empty() => (error.clone(), Style::default().fg(Color::Red)),
        _ => (screen.name.clone(), Style::default()),
    };
    let name_border = if screen.focus == CreateFocus::Name {
        focused
    } else {
        Style::default()
    };
    let name = Paragraph::new(name_text).style(name_style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(name_border)
            .title("Playlist Name"),
    );
    f.render_widget(name, chunks[0]);

    let items: Vec<ListItem> = session
        .state
        .catalog
        .songs()
        .iter()
        .zip(&screen.selected)
        .map(|(song, on)| {
            let mark = if *on { "[x]" } else { "[ ]" };
            let style = if *on {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };
            ListItem::new(format!("{} {}", mark, song.display_title())).style(style)
        })
        .collect();
    let songs_border = if screen.focus == CreateFocus::Songs {
        focused
    } else {
        Style::default()
    };
    let songs = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(songs_border)
                .title(format!("Available Songs ({} selected)", screen.chosen_count())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("► ");
    let mut list_state = ListState::default();
    if !screen.selected.is_empty() {
        list_state.select(Some(screen.highlighted));
    }
    f.render_stateful_widget(songs, chunks[1], &mut list_state);
    clicks.list = Some(ListArea {
        area: chunks[1],
        offset: list_state.offset(),
        len: screen.selected.len(),
    });
}

fn render_select<B: PlaybackBackend>(
    f: &mut Frame,
    area: Rect,
    session: &PlayerSession<B>,
    clicks: &mut ClickMap,
) {
    let store = &session.state.store;
    let items: Vec<ListItem> = if store.is_empty() {
        vec![ListItem::new("No playlists yet - press Esc and create one")]
    } else {
        store
            .playlists()
            .iter()
            .map(|pl| ListItem::new(format!("{} ({} songs)", pl.name, pl.len())))
            .collect()
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Playlists"))
        .highlight_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
        .highlight_symbol("► ");
    let mut list_state = ListState::default();
    list_state.select(session.controller.select.highlighted);
    f.render_stateful_widget(list, area, &mut list_state);
    clicks.list = Some(ListArea {
        area,
        offset: list_state.offset(),
        len: store.len(),
    });
}

fn render_status(f: &mut Frame, area: Rect, status: Option<&str>) {
    if let Some(message) = status {
        let line = Paragraph::new(message).style(Style::default().fg(Color::Yellow));
        f.render_widget(line, area);
    }
}

fn render_help(f: &mut Frame, area: Rect, mode: Mode) {
    let help = match mode {
        Mode::MainPlayer => {
            "space play/pause  n/b next/prev  ↑↓ enter/click pick song  c create  p play playlist  +/- volume  q quit"
        }
        Mode::CreatePlaylist => {
            "type name  tab switch to songs  space/click toggle  enter create  esc cancel"
        }
        Mode::SelectPlaylist => "↑↓ choose  enter/click play selected  esc cancel",
    };
    let line = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(line, area);
}

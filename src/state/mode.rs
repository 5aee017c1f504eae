use tracing::{debug, info};

use super::{AppState, Step};
use crate::audio::playlist::MAX_PLAYLIST_NAME_LENGTH;
use crate::audio::SongId;

/// Which screen owns input and drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    MainPlayer,
    CreatePlaylist,
    SelectPlaylist,
}

/// Device-independent user intents. The terminal layer maps keys and mouse
/// buttons onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    /// Mouse click on row `n` of the screen's list.
    ClickRow(usize),
    SwitchFocus,
    Input(char),
    Backspace,
    Confirm,
    Cancel,
    PlayPause,
    Next,
    Previous,
    VolumeUp,
    VolumeDown,
    OpenCreate,
    OpenSelect,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPhase {
    Press,
    Repeat,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Input {
    pub phase: InputPhase,
    pub action: Option<Action>,
}

impl Input {
    pub fn press(action: Action) -> Self {
        Self {
            phase: InputPhase::Press,
            action: Some(action),
        }
    }

    pub fn repeat(action: Action) -> Self {
        Self {
            phase: InputPhase::Repeat,
            action: Some(action),
        }
    }

    pub fn release() -> Self {
        Self {
            phase: InputPhase::Release,
            action: None,
        }
    }
}

/// What the playback side has to do after an input was handled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    None,
    Play(SongId),
    Restart(SongId),
    TogglePlayback,
    Volume(f32),
    Quit,
}

/// One accepted action per press/release cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Debounce {
    held: bool,
}

impl Debounce {
    /// Feed an input phase; true when the press should be acted on.
    pub fn accept(&mut self, phase: InputPhase) -> bool {
        match phase {
            InputPhase::Press if !self.held => {
                self.held = true;
                true
            }
            InputPhase::Press | InputPhase::Repeat => false,
            InputPhase::Release => {
                self.held = false;
                false
            }
        }
    }

    pub fn reset(&mut self) {
        self.held = false;
    }
}

/// Entry/exit hooks for a screen's throwaway widget state.
pub trait Screen {
    fn on_enter(&mut self, state: &AppState);
    fn on_exit(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateFocus {
    #[default]
    Name,
    Songs,
}

/// Name input plus a toggle per catalog song.
#[derive(Debug, Clone, Default)]
pub struct CreatePlaylistScreen {
    pub name: String,
    pub selected: Vec<bool>, // parallel to the catalog
    pub highlighted: usize,
    pub focus: CreateFocus,
    pub error: Option<String>,
}

impl CreatePlaylistScreen {
    pub fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() || self.name.chars().count() >= MAX_PLAYLIST_NAME_LENGTH {
            return false;
        }
        self.name.push(ch);
        self.error = None;
        true
    }

    pub fn backspace(&mut self) {
        self.name.pop();
    }

    pub fn toggle_highlighted(&mut self) -> Option<bool> {
        let slot = self.selected.get_mut(self.highlighted)?;
        *slot = !*slot;
        Some(*slot)
    }

    pub fn move_highlight(&mut self, delta: isize) {
        if self.selected.is_empty() {
            return;
        }
        let last = self.selected.len() - 1;
        self.highlighted = self.highlighted.saturating_add_signed(delta).min(last);
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            CreateFocus::Name => CreateFocus::Songs,
            CreateFocus::Songs => CreateFocus::Name,
        };
    }

    /// Chosen songs in catalog order, regardless of toggle order.
    pub fn chosen(&self) -> impl Iterator<Item = SongId> + '_ {
        self.selected
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(|(idx, _)| SongId(idx))
    }

    pub fn chosen_count(&self) -> usize {
        self.selected.iter().filter(|on| **on).count()
    }
}

impl Screen for CreatePlaylistScreen {
    fn on_enter(&mut self, state: &AppState) {
        self.name.clear();
        self.selected = vec![false; state.catalog.len()];
        self.highlighted = 0;
        self.focus = CreateFocus::Name;
        self.error = None;
    }

    fn on_exit(&mut self) {
        *self = Self::default();
    }
}

/// Highlight over the persistent playlists.
#[derive(Debug, Clone, Default)]
pub struct SelectPlaylistScreen {
    pub highlighted: Option<usize>,
    count: usize,
}

impl SelectPlaylistScreen {
    pub fn move_highlight(&mut self, delta: isize) {
        if self.count == 0 {
            return;
        }
        let next = match self.highlighted {
            Some(idx) => idx.saturating_add_signed(delta),
            None => 0,
        };
        self.highlighted = Some(next.min(self.count - 1));
    }
}

impl Screen for SelectPlaylistScreen {
    fn on_enter(&mut self, state: &AppState) {
        self.count = state.store.len();
        self.highlighted = (self.count > 0).then_some(0);
    }

    fn on_exit(&mut self) {
        *self = Self::default();
    }
}

/// Three-screen switch plus the shared click debounce.
#[derive(Debug, Clone, Default)]
pub struct ModeController {
    mode: Mode,
    debounce: Debounce,
    pub library_highlight: usize,
    pub create: CreatePlaylistScreen,
    pub select: SelectPlaylistScreen,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Leave the current screen and enter `next`, running both hooks.
    pub fn switch_to(&mut self, next: Mode, state: &AppState) {
        let current = self.mode();
        if current == next {
            return;
        }
        match current {
            Mode::CreatePlaylist => self.create.on_exit(),
            Mode::SelectPlaylist => self.select.on_exit(),
            Mode::MainPlayer => {}
        }
        match next {
            Mode::CreatePlaylist => self.create.on_enter(state),
            Mode::SelectPlaylist => self.select.on_enter(state),
            Mode::MainPlayer => {}
        }
        debug!("Screen {:?} -> {:?}", current, next);
        self.debounce.reset();
        self.mode = next;
    }

    /// Route one input to the active screen.
    pub fn handle(&mut self, input: Input, state: &mut AppState) -> Command {
        if !self.debounce.accept(input.phase) {
            return Command::None;
        }
        let Some(action) = input.action else {
            return Command::None;
        };

        match self.mode() {
            Mode::MainPlayer => self.handle_main(action, state),
            Mode::CreatePlaylist => self.handle_create(action, state),
            Mode::SelectPlaylist => self.handle_select(action, state),
        }
    }

    fn handle_main(&mut self, action: Action, state: &mut AppState) -> Command {
        match action {
            Action::PlayPause => Command::TogglePlayback,
            Action::Next => state.next_song().map_or(Command::None, Command::Play),
            Action::Previous => match state.previous_song() {
                Step::Play(id) => Command::Play(id),
                Step::Restart(id) => Command::Restart(id),
                Step::Nothing => Command::None,
            },
            Action::Up => {
                self.library_highlight = self.library_highlight.saturating_sub(1);
                Command::None
            }
            Action::Down => {
                let last = state.catalog.len().saturating_sub(1);
                self.library_highlight = (self.library_highlight + 1).min(last);
                Command::None
            }
            Action::Confirm => state
                .select(SongId(self.library_highlight))
                .map_or(Command::None, Command::Play),
            Action::ClickRow(row) => match state.select(SongId(row)) {
                Some(id) => {
                    self.library_highlight = row;
                    Command::Play(id)
                }
                None => Command::None,
            },
            Action::VolumeUp => Command::Volume(0.1),
            Action::VolumeDown => Command::Volume(-0.1),
            Action::OpenCreate => {
                self.switch_to(Mode::CreatePlaylist, state);
                Command::None
            }
            Action::OpenSelect => {
                self.switch_to(Mode::SelectPlaylist, state);
                Command::None
            }
            Action::Quit => Command::Quit,
            _ => Command::None,
        }
    }

    fn handle_create(&mut self, action: Action, state: &mut AppState) -> Command {
        let screen = &mut self.create;
        match action {
            Action::Up => screen.move_highlight(-1),
            Action::Down => screen.move_highlight(1),
            Action::SwitchFocus => screen.toggle_focus(),
            Action::ClickRow(row) if row < screen.selected.len() => {
                screen.highlighted = row;
                screen.focus = CreateFocus::Songs;
                screen.toggle_highlighted();
            }
            Action::Input(' ') if screen.focus == CreateFocus::Songs => {
                screen.toggle_highlighted();
            }
            Action::Input(ch) if screen.focus == CreateFocus::Name => {
                screen.push_char(ch);
            }
            Action::Backspace if screen.focus == CreateFocus::Name => screen.backspace(),
            Action::Confirm => {
                let name = screen.name.trim().to_string();
                if name.is_empty() {
                    screen.error = Some("Please enter a playlist name".to_string());
                    screen.focus = CreateFocus::Name;
                    return Command::None;
                }
                let songs: Vec<SongId> = screen.chosen().collect();
                state.create_playlist(&name, songs);
                self.switch_to(Mode::MainPlayer, state);
            }
            Action::Cancel => {
                info!("Playlist creation canceled");
                self.switch_to(Mode::MainPlayer, state);
            }
            _ => {}
        }
        Command::None
    }

    fn handle_select(&mut self, action: Action, state: &mut AppState) -> Command {
        match action {
            Action::Up => self.select.move_highlight(-1),
            Action::Down => self.select.move_highlight(1),
            Action::ClickRow(row) if row < self.select.count => {
                self.select.highlighted = Some(row);
                return self.play_highlighted(state);
            }
            Action::Confirm => return self.play_highlighted(state),
            Action::Cancel => {
                info!("Playlist selection canceled");
                self.switch_to(Mode::MainPlayer, state);
            }
            _ => {}
        }
        Command::None
    }

    fn play_highlighted(&mut self, state: &mut AppState) -> Command {
        let Some(index) = self.select.highlighted else {
            state.set_status("No playlist selected");
            return Command::None;
        };
        match state.activate_playlist(index) {
            Some(id) => {
                self.switch_to(Mode::MainPlayer, state);
                Command::Play(id)
            }
            None => Command::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{Catalog, History, PlaylistStore, Song};

    fn state() -> AppState {
        let catalog = Catalog::new(
            ["a.ogg", "b.ogg", "c.ogg"]
                .iter()
                .map(|name| Song::from_path(format!("music/{name}")))
                .collect(),
        );
        AppState::new(catalog, PlaylistStore::new(), History::new())
    }

    fn click(ctrl: &mut ModeController, state: &mut AppState, action: Action) -> Command {
        let command = ctrl.handle(Input::press(action), state);
        ctrl.handle(Input::release(), state);
        command
    }

    fn type_text(ctrl: &mut ModeController, state: &mut AppState, text: &str) {
        for ch in text.chars() {
            click(ctrl, state, Action::Input(ch));
        }
    }

    #[test]
    fn debounce_accepts_one_press_per_cycle() {
        let mut debounce = Debounce::default();
        assert!(debounce.accept(InputPhase::Press));
        assert!(!debounce.accept(InputPhase::Press));
        assert!(!debounce.accept(InputPhase::Repeat));
        assert!(!debounce.accept(InputPhase::Release));
        assert!(debounce.accept(InputPhase::Press));
    }

    #[test]
    fn held_button_triggers_once() {
        let mut ctrl = ModeController::new();
        let mut state = state();

        assert_eq!(ctrl.handle(Input::press(Action::Next), &mut state), Command::Play(SongId(1)));
        assert_eq!(ctrl.handle(Input::repeat(Action::Next), &mut state), Command::None);
        assert_eq!(ctrl.handle(Input::press(Action::Next), &mut state), Command::None);
        assert_eq!(state.now_playing(), Some(SongId(1)));
    }

    #[test]
    fn create_screen_resets_on_every_entry() {
        let mut ctrl = ModeController::new();
        let mut state = state();

        click(&mut ctrl, &mut state, Action::OpenCreate);
        type_text(&mut ctrl, &mut state, "junk");
        click(&mut ctrl, &mut state, Action::ClickRow(1));
        click(&mut ctrl, &mut state, Action::Cancel);
        assert_eq!(ctrl.mode(), Mode::MainPlayer);
        assert!(ctrl.create.name.is_empty());

        click(&mut ctrl, &mut state, Action::OpenCreate);
        assert_eq!(ctrl.mode(), Mode::CreatePlaylist);
        assert!(ctrl.create.name.is_empty());
        assert_eq!(ctrl.create.selected, [false, false, false]);
        assert!(state.store.is_empty());
    }

    #[test]
    fn confirm_creates_playlist_in_catalog_order() {
        let mut ctrl = ModeController::new();
        let mut state = state();

        click(&mut ctrl, &mut state, Action::OpenCreate);
        type_text(&mut ctrl, &mut state, "P");
        click(&mut ctrl, &mut state, Action::SwitchFocus);
        click(&mut ctrl, &mut state, Action::Down);
        click(&mut ctrl, &mut state, Action::Down);
        click(&mut ctrl, &mut state, Action::Input(' '));
        click(&mut ctrl, &mut state, Action::Up);
        click(&mut ctrl, &mut state, Action::Up);
        click(&mut ctrl, &mut state, Action::Input(' '));
        click(&mut ctrl, &mut state, Action::Confirm);

        assert_eq!(ctrl.mode(), Mode::MainPlayer);
        let pl = state.store.find("P").unwrap();
        assert_eq!(pl.songs().collect::<Vec<_>>(), [SongId(0), SongId(2)]);
    }

    #[test]
    fn empty_name_keeps_create_screen_open() {
        let mut ctrl = ModeController::new();
        let mut state = state();

        click(&mut ctrl, &mut state, Action::OpenCreate);
        type_text(&mut ctrl, &mut state, "   ");
        click(&mut ctrl, &mut state, Action::Confirm);

        assert_eq!(ctrl.mode(), Mode::CreatePlaylist);
        assert!(ctrl.create.error.is_some());
        assert!(state.store.is_empty());
    }

    #[test]
    fn name_input_is_capped() {
        let mut screen = CreatePlaylistScreen::default();
        for _ in 0..MAX_PLAYLIST_NAME_LENGTH {
            assert!(screen.push_char('x'));
        }
        assert!(!screen.push_char('y'));
        assert!(!CreatePlaylistScreen::default().push_char('\n'));
    }

    #[test]
    fn select_confirm_plays_first_song_and_returns() {
        let mut ctrl = ModeController::new();
        let mut state = state();
        state.create_playlist("P", [SongId(2), SongId(0)]);

        click(&mut ctrl, &mut state, Action::OpenSelect);
        assert_eq!(ctrl.select.highlighted, Some(0));
        let command = click(&mut ctrl, &mut state, Action::Confirm);

        assert_eq!(command, Command::Play(SongId(2)));
        assert_eq!(ctrl.mode(), Mode::MainPlayer);
        assert_eq!(ctrl.select.highlighted, None);
    }

    #[test]
    fn selecting_empty_playlist_stays_on_screen() {
        let mut ctrl = ModeController::new();
        let mut state = state();
        state.create_playlist("nothing", Vec::new());

        click(&mut ctrl, &mut state, Action::OpenSelect);
        assert_eq!(click(&mut ctrl, &mut state, Action::Confirm), Command::None);
        assert_eq!(ctrl.mode(), Mode::SelectPlaylist);
        assert_eq!(state.now_playing(), Some(SongId(0)));
    }

    #[test]
    fn select_with_no_playlists_reports_it() {
        let mut ctrl = ModeController::new();
        let mut state = state();

        click(&mut ctrl, &mut state, Action::OpenSelect);
        click(&mut ctrl, &mut state, Action::Down);
        assert_eq!(click(&mut ctrl, &mut state, Action::Confirm), Command::None);
        assert_eq!(state.status(), Some("No playlist selected"));

        click(&mut ctrl, &mut state, Action::Cancel);
        assert_eq!(ctrl.mode(), Mode::MainPlayer);
    }

    #[test]
    fn screen_switch_rearms_the_debounce() {
        let mut ctrl = ModeController::new();
        let mut state = state();

        // the release for this press never arrives
        ctrl.handle(Input::press(Action::OpenCreate), &mut state);
        assert_eq!(ctrl.mode(), Mode::CreatePlaylist);

        ctrl.handle(Input::press(Action::Input('x')), &mut state);
        assert_eq!(ctrl.create.name, "x");
    }

    #[test]
    fn esc_on_main_screen_does_not_quit() {
        let mut ctrl = ModeController::new();
        let mut state = state();

        click(&mut ctrl, &mut state, Action::OpenCreate);
        click(&mut ctrl, &mut state, Action::Cancel);
        assert_eq!(click(&mut ctrl, &mut state, Action::Cancel), Command::None);
        assert_eq!(ctrl.mode(), Mode::MainPlayer);
        assert_eq!(click(&mut ctrl, &mut state, Action::Quit), Command::Quit);
    }

    #[test]
    fn clicked_rows_act_on_the_row_not_the_highlight() {
        let mut ctrl = ModeController::new();
        let mut state = state();

        assert_eq!(click(&mut ctrl, &mut state, Action::ClickRow(2)), Command::Play(SongId(2)));
        assert_eq!(ctrl.library_highlight, 2);
        assert_eq!(click(&mut ctrl, &mut state, Action::ClickRow(9)), Command::None);

        click(&mut ctrl, &mut state, Action::OpenCreate);
        click(&mut ctrl, &mut state, Action::ClickRow(1));
        assert_eq!(ctrl.create.selected, [false, true, false]);
        assert_eq!(ctrl.create.focus, CreateFocus::Songs);
        click(&mut ctrl, &mut state, Action::Cancel);

        state.create_playlist("first", [SongId(0)]);
        state.create_playlist("second", [SongId(1)]);
        click(&mut ctrl, &mut state, Action::OpenSelect);
        // newest first: row 1 is "first"
        assert_eq!(click(&mut ctrl, &mut state, Action::ClickRow(1)), Command::Play(SongId(0)));
        assert_eq!(state.store.active().unwrap().name(), "first");
    }
}

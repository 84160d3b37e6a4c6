mod app;
mod markup;
mod ui;

use crate::index::StoreHandle;
use crate::router::Location;
use crate::session::{Session, UiEvent};
use crate::utils::AppConfig;
use anyhow::Result;
use app::{App, Focus, Page};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Duration;

type Term = Terminal<CrosstermBackend<Stdout>>;

pub fn run(archive: PathBuf, location: Option<String>, config: &AppConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Clear the terminal to prevent any artifacts from previous content
    terminal.clear()?;

    let result = load_and_run(&mut terminal, archive, location, config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn load_and_run(
    terminal: &mut Term,
    archive: PathBuf,
    location: Option<String>,
    config: &AppConfig,
) -> Result<()> {
    terminal.draw(|f| ui::draw_loading(f, &archive))?;

    match StoreHandle::open(&archive) {
        Ok(store) => {
            let initial = Location::parse(location.as_deref().unwrap_or("#/"));
            let session = Session::new(&store, initial, config.session_options());
            let mut app = App::new(session);
            run_app(terminal, &mut app)
        }
        Err(err) => {
            tracing::error!(error = %err, archive = %archive.display(), "archive failed to load");
            let mut app = App::failed(&err);
            run_app(terminal, &mut app)
        }
    }
}

fn run_app(terminal: &mut Term, app: &mut App<'_>) -> Result<()> {
    loop {
        let size = terminal.size()?;
        let (width, height) = ui::body_size(size.width, size.height);
        app.screen.resize(width, height);

        terminal.draw(|f| ui::draw(f, app))?;

        if app.should_quit {
            return Ok(());
        }

        // Poll for events with timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            // Only handle key press events, not release or repeat
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Global keybindings
                match (key.modifiers, key.code) {
                    (KeyModifiers::CONTROL, KeyCode::Char('c'))
                    | (KeyModifiers::CONTROL, KeyCode::Char('q')) => return Ok(()),
                    (KeyModifiers::CONTROL, KeyCode::Char('l')) => {
                        app.start_location_edit();
                        continue;
                    }
                    (KeyModifiers::ALT, KeyCode::Left) => {
                        app.go_back();
                        continue;
                    }
                    _ => {}
                }

                match app.focus {
                    Focus::Help => app.hide_help(),
                    Focus::Location(_) => handle_location_key(app, key),
                    Focus::View => match app.screen.page {
                        Page::List(_) => handle_list_key(app, key),
                        Page::Detail(_) => handle_detail_key(app, key),
                        Page::Fatal(_) => {
                            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                                app.should_quit = true;
                            }
                        }
                        Page::Loading => {}
                    },
                }
            }
        }
    }
}

fn handle_location_key(app: &mut App<'_>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_location_edit(),
        KeyCode::Enter => app.commit_location(),
        KeyCode::Backspace => {
            if let Some(text) = app.location_input() {
                text.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(text) = app.location_input() {
                text.push(c);
            }
        }
        _ => {}
    }
}

fn handle_list_key(app: &mut App<'_>, key: KeyEvent) {
    match (key.modifiers, key.code) {
        // Vim: Ctrl+j/Ctrl+n - select next result
        (KeyModifiers::CONTROL, KeyCode::Char('j'))
        | (KeyModifiers::CONTROL, KeyCode::Char('n')) => app.screen.select_by(1),
        // Vim: Ctrl+k/Ctrl+p - select previous result
        (KeyModifiers::CONTROL, KeyCode::Char('k'))
        | (KeyModifiers::CONTROL, KeyCode::Char('p')) => app.screen.select_by(-1),
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => app.screen.select_by(10),
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => app.screen.select_by(-10),
        // Vim: Ctrl+w - delete word backward
        (KeyModifiers::CONTROL, KeyCode::Char('w')) => app.delete_word(),
        // Ctrl+h - backspace (terminal standard)
        (KeyModifiers::CONTROL, KeyCode::Char('h')) => app.backspace(),
        (KeyModifiers::CONTROL, KeyCode::Char('a')) => app.screen.select_first(),
        (KeyModifiers::CONTROL, KeyCode::Char('e')) => app.screen.select_last(),
        (KeyModifiers::NONE | KeyModifiers::SHIFT, code) => match code {
            KeyCode::Esc => {
                if app.query_is_empty() {
                    app.should_quit = true;
                } else {
                    app.clear_query();
                }
            }
            KeyCode::Enter => app.open_selected(),
            KeyCode::Tab => app.dispatch(UiEvent::ToggleMode),
            KeyCode::Down => app.screen.select_by(1),
            KeyCode::Up | KeyCode::BackTab => app.screen.select_by(-1),
            KeyCode::PageDown => app.screen.select_by(20),
            KeyCode::PageUp => app.screen.select_by(-20),
            KeyCode::F(1) => app.show_help(),
            KeyCode::Char(c) => app.type_char(c),
            KeyCode::Backspace => app.backspace(),
            _ => {}
        },
        _ => {}
    }
}

fn handle_detail_key(app: &mut App<'_>, key: KeyEvent) {
    match (key.modifiers, key.code) {
        // Vim: Ctrl+d / Ctrl+u - half-page
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => app.half_page_down(),
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => app.half_page_up(),
        // Vim: Ctrl+f / Ctrl+b - full page
        (KeyModifiers::CONTROL, KeyCode::Char('f')) => app.page_down(),
        (KeyModifiers::CONTROL, KeyCode::Char('b')) => app.page_up(),
        (KeyModifiers::NONE | KeyModifiers::SHIFT, code) => match code {
            // The configured shortcut wins over every other binding
            KeyCode::Char(c) if c == app.next_key() => app.dispatch(UiEvent::KeyPressed(c)),
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') | KeyCode::Char('b') => {
                app.dispatch(UiEvent::BackToIndex)
            }
            KeyCode::Enter => app.dispatch(UiEvent::NextOccurrence),
            KeyCode::Down | KeyCode::Char('j') => app.scroll(1),
            KeyCode::Up | KeyCode::Char('k') => app.scroll(-1),
            KeyCode::PageDown | KeyCode::Char(' ') => app.page_down(),
            KeyCode::PageUp => app.page_up(),
            KeyCode::Home | KeyCode::Char('g') | KeyCode::Char('t') => {
                app.dispatch(UiEvent::BackToTop)
            }
            KeyCode::End | KeyCode::Char('G') => app.scroll_to_bottom(),
            KeyCode::Char('?') | KeyCode::F(1) => app.show_help(),
            KeyCode::Char(c) => app.dispatch(UiEvent::KeyPressed(c)),
            _ => {}
        },
        _ => {}
    }
}

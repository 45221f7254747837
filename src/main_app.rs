use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use log::{debug, info};
use ratatui::{
    Frame, Terminal,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};

use crate::event_source::EventSource;
use crate::gallery::{
    Command, Dispatcher, Entry, ImageLoader, Session, SharedCache, WorkerPool, completion_handler,
};
use crate::sequence::SequenceIndex;
use crate::settings::Settings;
use crate::widget::{HELP_TEXT, PictureView, status_line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
}

/// Terminal picture browser.
///
/// The app only ever looks at the cache through the session; it keeps the
/// entry it last drew so a tick can tell it when a picture arrives.
pub struct App<D: Dispatcher = WorkerPool> {
    index: SequenceIndex,
    session: Session<D>,
    displayed: Entry,
    goto_buffer: String,
}

impl App<WorkerPool> {
    /// Browse `dir` with background decoding configured by `settings`
    pub fn open(dir: &Path, settings: &Settings) -> Result<Self> {
        let index = SequenceIndex::from_dir(dir)?;
        info!(
            "Opened {:?}: {} pictures, lookahead {}, max edge {}, {} workers",
            dir,
            index.len(),
            settings.lookahead_steps,
            settings.max_edge,
            settings.workers
        );

        let cache = SharedCache::new();
        let pool = WorkerPool::new(
            settings.workers,
            Arc::new(ImageLoader::new(settings.max_edge)),
            completion_handler(cache.clone()),
        );
        let session = Session::new(index.paths(), settings.lookahead_steps, cache, pool);
        Ok(Self::new(index, session))
    }
}

impl<D: Dispatcher> App<D> {
    /// Wrap an existing session and load the first picture's window
    pub fn new(index: SequenceIndex, mut session: Session<D>) -> Self {
        session.set_index(0);
        Self {
            index,
            session,
            displayed: Entry::Absent,
            goto_buffer: String::new(),
        }
    }

    pub fn session(&self) -> &Session<D> {
        &self.session
    }

    pub fn displayed(&self) -> &Entry {
        &self.displayed
    }

    /// Pull a newly settled picture from the session; true if the screen
    /// needs redrawing
    pub fn tick(&mut self) -> bool {
        match self.session.tick() {
            Some(entry) => {
                self.displayed = entry;
                true
            }
            None => false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<AppAction> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        match key.code {
            KeyCode::Char('q') => return Some(AppAction::Quit),
            KeyCode::Esc => {
                if self.goto_buffer.is_empty() {
                    return Some(AppAction::Quit);
                }
                self.goto_buffer.clear();
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if self.goto_buffer.len() < 9 {
                    self.goto_buffer.push(c);
                }
            }
            KeyCode::Enter => {
                if let Ok(number) = self.goto_buffer.parse::<usize>() {
                    self.navigate(Command::GoTo(number.saturating_sub(1)));
                }
                self.goto_buffer.clear();
            }
            KeyCode::Right | KeyCode::Char('l' | ' ' | 'n') => self.navigate(Command::Next),
            KeyCode::Left | KeyCode::Backspace | KeyCode::Char('h' | 'p') => {
                self.navigate(Command::Previous)
            }
            KeyCode::Home | KeyCode::Char('g') => self.navigate(Command::First),
            KeyCode::End | KeyCode::Char('G') => self.navigate(Command::Last),
            _ => {}
        }
        None
    }

    fn navigate(&mut self, cmd: Command) {
        debug!("navigate {cmd:?}");
        self.goto_buffer.clear();
        self.session.apply(cmd);
    }

    pub fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(f.area());

        let title = self
            .session
            .current_path()
            .and_then(Path::file_name)
            .map(|name| format!(" {} ", name.to_string_lossy()))
            .unwrap_or_default();
        let frame_block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = frame_block.inner(chunks[0]);
        f.render_widget(frame_block, chunks[0]);

        if !self.session.is_empty() {
            f.render_widget(PictureView::new(&self.displayed), inner);
        }

        let position = (!self.session.is_empty()).then(|| (self.session.current(), self.session.len()));
        let name = self.index.file_name(self.session.current());
        f.render_widget(
            Paragraph::new(status_line(
                position,
                name.as_deref(),
                &self.displayed,
                &self.goto_buffer,
            )),
            chunks[1],
        );
        f.render_widget(
            Paragraph::new(Line::from(HELP_TEXT)).style(Style::default().fg(Color::DarkGray)),
            chunks[2],
        );
    }
}

/// Main loop: drain input, tick, redraw on change.
///
/// Returns on quit, or once a finite event source runs dry.
pub fn run_app_with_event_source<B: ratatui::backend::Backend, D: Dispatcher>(
    terminal: &mut Terminal<B>,
    app: &mut App<D>,
    event_source: &mut dyn EventSource,
    tick_rate: Duration,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let mut last_tick = Instant::now();
    let mut needs_redraw = true;

    loop {
        let mut events_processed = 0;
        while event_source.poll(Duration::from_millis(0))? && events_processed < 50 {
            events_processed += 1;
            match event_source.read()? {
                Event::Key(key) => {
                    if app.handle_key(key) == Some(AppAction::Quit) {
                        return Ok(());
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }

        if app.tick() {
            needs_redraw = true;
        }
        if needs_redraw {
            terminal.draw(|f| app.draw(f))?;
            needs_redraw = false;
        }

        if event_source.is_exhausted() {
            return Ok(());
        }

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        event_source.poll(timeout)?;
        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
}

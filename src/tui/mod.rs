//! Terminal UI
//!
//! One cooperative loop owns the terminal: it draws the current step, then
//! waits for either a key press (forwarded from a blocking reader thread)
//! or an engine event. Nothing here blocks on the engine; request/response
//! calls are awaited inline on the same task.

mod dialogs;
mod panels;
pub mod styles;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{execute, terminal};
use ratatui::prelude::*;
use ratatui::widgets::*;
use tokio::sync::mpsc;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::engine::{Engine, EngineEvent};
use crate::wizard::{ProcessingPhase, Step, StepController};

use dialogs::{CompletionDialog, DialogResult};
use panels::{DirectoriesPanel, FiltersPanel, NamingPanel, OrganisePanel, ProcessingPanel};
use styles::Theme;

pub struct App<E: Engine> {
    controller: StepController<E>,
    directories: DirectoriesPanel,
    filters: FiltersPanel,
    naming: NamingPanel,
    organise: OrganisePanel,
    processing: ProcessingPanel,
    dialog: Option<CompletionDialog>,
    completion_shown: bool,
    engine_lost: bool,
    theme: Theme,
    should_quit: bool,
}

impl<E: Engine> App<E> {
    pub fn new(engine: E) -> Self {
        Self {
            controller: StepController::new(engine),
            directories: DirectoriesPanel::default(),
            filters: FiltersPanel::default(),
            naming: NamingPanel::default(),
            organise: OrganisePanel::default(),
            processing: ProcessingPanel::default(),
            dialog: None,
            completion_shown: false,
            engine_lost: false,
            theme: Theme::default(),
            should_quit: false,
        }
    }

    async fn handle_input(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key).await;
            }
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if let Some(dialog) = &mut self.dialog {
            if key.code == KeyCode::Char('o') {
                self.controller.open_destination();
                return;
            }
            if let DialogResult::Submit(()) = dialog.handle_key(key) {
                self.dialog = None;
                self.controller.acknowledge_and_reset().await;
                self.reset_panels();
            }
            return;
        }

        let step = self.controller.step();
        match key.code {
            // Steps without a text field also quit on plain q.
            KeyCode::Char('q')
                if matches!(step, Step::Directories | Step::Organise | Step::Processing) =>
            {
                self.should_quit = true;
            }
            KeyCode::Enter if step != Step::Processing => {
                self.controller.go_next().await;
            }
            KeyCode::Esc => {
                self.controller.go_previous();
            }
            _ => match step {
                Step::Directories => self.directories.handle_key(key, &mut self.controller).await,
                Step::Filters => self.filters.handle_key(key, &mut self.controller).await,
                Step::Naming => self.naming.handle_key(key, &mut self.controller).await,
                Step::Organise => self.organise.handle_key(key, &mut self.controller).await,
                Step::Processing => self.processing.handle_key(key, &mut self.controller).await,
            },
        }
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        self.controller.handle_event(&event);
    }

    /// Present the completion acknowledgment once per run, the first time
    /// the relocation reports complete.
    fn maybe_present_completion(&mut self) {
        if self.completion_shown
            || self.controller.progress().phase() != ProcessingPhase::RelocatingComplete
        {
            return;
        }
        self.completion_shown = true;
        let progress = self.controller.progress();
        let total = match progress.total_files() {
            0 => progress.found_count() as u64,
            n => n,
        };
        self.dialog = Some(CompletionDialog::new(
            total,
            self.controller.session().transfer_mode.past_tense(),
            self.controller.session().destination_directory.clone(),
        ));
    }

    fn reset_panels(&mut self) {
        self.directories = DirectoriesPanel::default();
        self.filters = FiltersPanel::default();
        self.naming = NamingPanel::default();
        self.organise = OrganisePanel::default();
        self.processing = ProcessingPanel::default();
        self.completion_shown = false;
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.render_step_indicator(frame, chunks[0]);

        match self.controller.step() {
            Step::Directories => {
                self.directories
                    .render(frame, chunks[1], &self.controller, &self.theme)
            }
            Step::Filters => self
                .filters
                .render(frame, chunks[1], &self.controller, &self.theme),
            Step::Naming => self
                .naming
                .render(frame, chunks[1], &self.controller, &self.theme),
            Step::Organise => self
                .organise
                .render(frame, chunks[1], &self.controller, &self.theme),
            Step::Processing => {
                self.processing
                    .render(frame, chunks[1], &self.controller, &self.theme)
            }
        }

        self.render_footer(frame, chunks[2]);

        if let Some(dialog) = &self.dialog {
            dialog.render(frame, frame.area(), &self.theme);
        }
    }

    fn render_step_indicator(&self, frame: &mut Frame, area: Rect) {
        let current = self.controller.step();
        let mut spans = Vec::new();
        for step in Step::ALL {
            let style = if step == current {
                Style::default().fg(self.theme.accent).bold()
            } else {
                Style::default().fg(self.theme.dimmed)
            };
            spans.push(Span::styled(
                format!(" {} {} ", step.number(), step.title()),
                style,
            ));
            if step != Step::Processing {
                spans.push(Span::styled("›", Style::default().fg(self.theme.dimmed)));
            }
        }
        let indicator = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(indicator, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let step = self.controller.step();
        let mut left = Vec::new();
        let mut right = Vec::new();

        if self.engine_lost {
            left.push(Span::styled(
                "engine disconnected  ",
                Style::default().fg(self.theme.error).bold(),
            ));
        } else if let Some(warning) = self.controller.push_warning() {
            left.push(Span::styled(
                format!("{warning}  "),
                Style::default().fg(self.theme.warn),
            ));
        }

        if step.previous().is_some() {
            left.push(Span::styled(
                "Esc Previous",
                Style::default().fg(self.theme.dimmed),
            ));
        }

        if step != Step::Processing {
            let label = if step == Step::Organise {
                "Enter Organise"
            } else {
                "Enter Next"
            };
            let style = if self.controller.can_proceed() {
                Style::default().fg(self.theme.ok).bold()
            } else {
                Style::default().fg(self.theme.dimmed)
            };
            right.push(Span::styled(label, style));
        } else if self.controller.session().verify_before_finalize
            && self.controller.progress().phase() == ProcessingPhase::FindingComplete
            && self.controller.can_proceed()
        {
            right.push(Span::styled(
                "v Verify",
                Style::default().fg(self.theme.ok).bold(),
            ));
        }

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(16)])
            .split(area);
        frame.render_widget(Paragraph::new(Line::from(left)), chunks[0]);
        frame.render_widget(
            Paragraph::new(Line::from(right)).alignment(Alignment::Right),
            chunks[1],
        );
    }
}

/// Middle-truncate to a display width, measured in terminal columns.
pub(crate) fn truncate_middle(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= 1 {
        return "…".to_string();
    }

    let keep = max_width - 1;
    let front_budget = keep / 2;
    let back_budget = keep - front_budget;

    let mut front = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > front_budget {
            break;
        }
        front.push(c);
        used += w;
    }

    let mut back_chars = Vec::new();
    let mut used = 0;
    for c in text.chars().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > back_budget {
            break;
        }
        back_chars.push(c);
        used += w;
    }
    back_chars.reverse();
    let back: String = back_chars.into_iter().collect();

    format!("{front}…{back}")
}

/// Run the wizard UI until the user quits.
pub async fn run<E: Engine>(
    engine: E,
    mut engine_events: mpsc::UnboundedReceiver<EngineEvent>,
) -> Result<()> {
    terminal::enable_raw_mode()?;
    execute!(std::io::stdout(), terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal_ui = Terminal::new(backend)?;

    let result = event_loop(&mut terminal_ui, engine, &mut engine_events).await;

    terminal::disable_raw_mode()?;
    execute!(std::io::stdout(), terminal::LeaveAlternateScreen)?;
    result
}

async fn event_loop<E: Engine>(
    terminal_ui: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    engine: E,
    engine_events: &mut mpsc::UnboundedReceiver<EngineEvent>,
) -> Result<()> {
    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || loop {
        match crossterm::event::poll(std::time::Duration::from_millis(100)) {
            Ok(true) => match crossterm::event::read() {
                Ok(event) => {
                    if input_tx.send(event).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if input_tx.is_closed() {
                    break;
                }
            }
            Err(_) => break,
        }
    });

    let mut app = App::new(engine);
    let mut engine_open = true;

    loop {
        if app.controller.step() == Step::Naming && app.controller.previews_stale() {
            app.controller.refresh_previews().await;
        }
        // The execution step may be re-entered by redraws; the controller
        // latch keeps the engine call single-shot.
        if app.controller.step() == Step::Processing {
            app.controller.ensure_processing_started().await;
        }
        app.maybe_present_completion();

        terminal_ui.draw(|frame| app.render(frame))?;

        tokio::select! {
            input = input_rx.recv() => match input {
                Some(event) => app.handle_input(event).await,
                None => break,
            },
            event = engine_events.recv(), if engine_open => match event {
                Some(event) => app.handle_engine_event(event),
                None => {
                    engine_open = false;
                    app.engine_lost = true;
                    tracing::error!("engine event stream closed");
                }
            },
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_middle_keeps_short_paths_intact() {
        assert_eq!(truncate_middle("/photos/a.jpg", 20), "/photos/a.jpg");
    }

    #[test]
    fn truncate_middle_preserves_both_ends() {
        let path = "/photos/2023/holidays/scotland/IMG_1234.jpg";
        let truncated = truncate_middle(path, 20);
        assert!(truncated.width() <= 20);
        assert!(truncated.starts_with("/photos/"));
        assert!(truncated.ends_with(".jpg"));
        assert!(truncated.contains('…'));
    }

    #[test]
    fn truncate_middle_handles_wide_characters() {
        let path = "/写真/二〇二三年/休暇/IMG_1234.jpg";
        let truncated = truncate_middle(path, 16);
        assert!(truncated.width() <= 16);
        assert!(truncated.contains('…'));
    }

    #[test]
    fn truncate_middle_degenerate_width() {
        assert_eq!(truncate_middle("/long/path", 1), "…");
    }
}

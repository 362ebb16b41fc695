//! Processing step: live progress of the engine run

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::engine::Engine;
use crate::tui::styles::Theme;
use crate::tui::truncate_middle;
use crate::wizard::{ProcessingPhase, StepController};

#[derive(Default)]
pub struct ProcessingPanel {
    offset: usize,
}

impl ProcessingPanel {
    pub async fn handle_key<E: Engine>(
        &mut self,
        key: KeyEvent,
        controller: &mut StepController<E>,
    ) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.offset = self.offset.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let count = controller.progress().found_count();
                self.offset = (self.offset + 1).min(count.saturating_sub(1));
            }
            KeyCode::Char('v') => {
                controller.verify().await;
            }
            KeyCode::Char('o') => {
                controller.open_destination();
            }
            _ => {}
        }
    }

    pub fn render<E: Engine>(
        &self,
        frame: &mut Frame,
        area: Rect,
        controller: &StepController<E>,
        theme: &Theme,
    ) {
        let progress = controller.progress();
        let session = controller.session();
        let mode = session.transfer_mode;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(area);

        let (headline, headline_style, subtext) = if let Some(failure) = progress.failure() {
            (
                failure.to_string(),
                Style::default().fg(theme.error).bold(),
                String::new(),
            )
        } else {
            match progress.phase() {
                ProcessingPhase::Idle | ProcessingPhase::Finding => (
                    format!("Finding files to {}", mode.as_str()),
                    Style::default().fg(theme.text).bold(),
                    match progress.found_count() {
                        0 => String::new(),
                        n => format!("{n} found"),
                    },
                ),
                ProcessingPhase::FindingComplete if progress.empty_result() => (
                    "No images were found".to_string(),
                    Style::default().fg(theme.warn).bold(),
                    "Please check the directories and filters and try again".to_string(),
                ),
                ProcessingPhase::FindingComplete => {
                    if session.verify_before_finalize {
                        (
                            format!(
                                "Please verify the files are OK to be {}",
                                mode.past_tense()
                            ),
                            Style::default().fg(theme.text).bold(),
                            format!("{} found -- press v to continue", progress.found_count()),
                        )
                    } else {
                        (
                            format!("The following files were {}", mode.past_tense()),
                            Style::default().fg(theme.text).bold(),
                            format!("{} found", progress.found_count()),
                        )
                    }
                }
                ProcessingPhase::RelocatingStart | ProcessingPhase::Relocating => (
                    format!("Files are being {}", mode.past_tense()),
                    Style::default().fg(theme.text).bold(),
                    format!(
                        "{}/{}",
                        progress.total_relocated(),
                        progress.total_files()
                    ),
                ),
                ProcessingPhase::RelocatingComplete => (
                    format!("The following files were {}", mode.past_tense()),
                    Style::default().fg(theme.ok).bold(),
                    format!("{} in total", progress.total_files()),
                ),
            }
        };

        let header = Paragraph::new(vec![
            Line::from(Span::styled(headline, headline_style)),
            Line::from(Span::styled(subtext, Style::default().fg(theme.dimmed))),
        ]);
        frame.render_widget(header, chunks[0]);

        let list_area = chunks[1];
        let inner_width = list_area.width.saturating_sub(2) as usize;
        let path_budget = inner_width.saturating_sub(5) / 2;

        let items: Vec<ListItem> = progress
            .files()
            .iter()
            .skip(self.offset)
            .map(|record| {
                let marker = if record.relocated {
                    Span::styled(" ✓ ", Style::default().fg(theme.ok))
                } else {
                    Span::styled(" → ", Style::default().fg(theme.dimmed))
                };
                let to_style = if record.suffix.is_some() {
                    Style::default().fg(theme.warn)
                } else {
                    Style::default().fg(theme.text)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        truncate_middle(&record.from, path_budget),
                        Style::default().fg(theme.text),
                    ),
                    marker,
                    Span::styled(truncate_middle(&record.display_to(), path_budget), to_style),
                ]))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Files ({}) ", progress.found_count())),
        );
        frame.render_widget(list, list_area);
    }
}

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{app::App, evaluator::Highlight, session::Phase};

const HORIZONTAL_MARGIN: u16 = 5;
const TITLE: &str = "NuggetType";

/// Label of the reset action for the current phase
pub fn reset_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Finished => "Play Again",
        _ => "Reset",
    }
}

pub fn format_time(elapsed_secs: f64) -> String {
    format!("Time: {elapsed_secs:.2} seconds")
}

/// Coloured spans for the sentence: what was typed right, what was typed
/// wrong, and what is left (with the next character underlined).
pub fn sentence_spans(highlight: Highlight<'_>) -> Vec<Span<'static>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let underlined_dim_bold_style = Style::default()
        .patch(dim_bold_style)
        .add_modifier(Modifier::UNDERLINED);

    let mut spans = Vec::with_capacity(4);

    if !highlight.correct.is_empty() {
        spans.push(Span::styled(highlight.correct.to_owned(), green_bold_style));
    }

    if !highlight.incorrect.is_empty() {
        // a mistyped space would be invisible
        let shown = highlight.incorrect.replace(' ', "·");
        spans.push(Span::styled(shown, red_bold_style));
    }

    let mut remaining = highlight.remaining.chars();
    if let Some(next) = remaining.next() {
        spans.push(Span::styled(next.to_string(), underlined_dim_bold_style));
        let rest = remaining.as_str();
        if !rest.is_empty() {
            spans.push(Span::styled(rest.to_owned(), dim_bold_style));
        }
    }

    spans
}

fn prompt_lines(sentence: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    let lines = sentence.width().div_ceil(width).max(1);
    u16::try_from(lines).unwrap_or(u16::MAX)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let title_style = Style::default().patch(bold_style).fg(Color::Magenta);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2);
        let sentence_lines = prompt_lines(&session.sentence, max_chars_per_line);
        let results_lines = if session.has_finished() { 2 } else { 0 };

        let content_height = 2 + 1 + sentence_lines + 1 + 1 + 1 + results_lines + 1;
        let padding = area.height.saturating_sub(content_height) / 2;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(padding),
                Constraint::Length(1),              // title
                Constraint::Length(1),              // time
                Constraint::Length(1),              // padding
                Constraint::Length(sentence_lines), // sentence
                Constraint::Length(1),              // padding
                Constraint::Length(1),              // input
                Constraint::Length(1),              // padding
                Constraint::Length(results_lines),  // results
                Constraint::Length(1),              // legend
                Constraint::Min(0),
            ])
            .split(area);

        Paragraph::new(Span::styled(TITLE, title_style))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        Paragraph::new(Span::styled(format_time(session.elapsed_secs), dim_style))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        let sentence = Paragraph::new(Line::from(sentence_spans(session.highlight())))
            .alignment(if sentence_lines == 1 {
                Alignment::Center
            } else {
                Alignment::Left
            })
            .wrap(Wrap { trim: false });
        sentence.render(chunks[4], buf);

        let input_style = if session.has_finished() {
            dim_style
        } else {
            bold_style
        };
        let input_line = Line::from(vec![
            Span::styled("> ", dim_style),
            Span::styled(session.input.clone(), input_style),
        ]);
        Paragraph::new(input_line).render(chunks[6], buf);

        if session.has_finished() {
            let results = vec![
                Line::from(Span::styled(
                    format!("Finished! Your time: {:.2} seconds", session.elapsed_secs),
                    bold_style,
                )),
                Line::from(Span::styled(
                    format!("Speed: {:.2} wpm", session.speed()),
                    Style::default().patch(bold_style).fg(Color::Green),
                )),
            ];
            Paragraph::new(results)
                .alignment(Alignment::Center)
                .render(chunks[8], buf);
        }

        let legend = Paragraph::new(Span::styled(
            format!("(tab) {}   (esc) quit", reset_label(session.phase).to_lowercase()),
            italic_style,
        ))
        .alignment(Alignment::Center);
        legend.render(chunks[9], buf);
    }
}

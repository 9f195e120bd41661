use crate::tui::state::{AppMode, StatusLevel, StatusMessage};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

pub struct FooterData<'a> {
    pub mode: AppMode,
    pub page: usize,
    pub total_pages: usize,
    pub search_text: &'a str,
    pub search_input: &'a str,
    pub status: Option<&'a StatusMessage>,
}

fn key_hints(mode: AppMode) -> Vec<Span<'static>> {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Cyan));
    match mode {
        AppMode::Search => vec![
            key("Enter"),
            Span::raw(" Apply  "),
            key("Esc"),
            Span::raw(" Cancel"),
        ],
        _ => vec![
            key("↑↓"),
            Span::raw(" Nav  "),
            key("Enter"),
            Span::raw(" Open  "),
            key("Esc/⌫"),
            Span::raw(" Back  "),
            key("h"),
            Span::raw(" Home  "),
            key("/"),
            Span::raw(" Search  "),
            key("←→"),
            Span::raw(" Page  "),
            key("?"),
            Span::raw(" Help  "),
            key("q"),
            Span::raw(" Quit"),
        ],
    }
}

pub fn render_browse_footer(f: &mut Frame, area: Rect, data: &FooterData) {
    let status_line = match (data.mode, data.status) {
        (AppMode::Search, _) => Line::from(vec![
            Span::styled("Search: ", Style::default().fg(Color::Yellow)),
            Span::raw(data.search_input.to_string()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
        ]),
        (_, Some(status)) => {
            let color = match status.level {
                StatusLevel::Info => Color::Green,
                StatusLevel::Error => Color::Red,
            };
            Line::from(Span::styled(status.text.clone(), Style::default().fg(color)))
        }
        _ if !data.search_text.is_empty() => Line::from(vec![
            Span::styled("Filter: ", Style::default().fg(Color::Yellow)),
            Span::raw(format!("\"{}\"", data.search_text)),
            Span::styled("  (Esc clears)", Style::default().fg(Color::DarkGray)),
        ]),
        _ => Line::from(""),
    };

    let mut hints = key_hints(data.mode);
    if data.total_pages > 1 {
        hints.push(Span::raw("  "));
        hints.push(Span::styled(
            format!("| Page {}/{}", data.page, data.total_pages),
            Style::default().fg(Color::Green),
        ));
    }

    let footer = Paragraph::new(vec![status_line, Line::from(hints)])
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(footer, area);
}

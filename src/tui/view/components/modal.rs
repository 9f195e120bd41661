use crate::index::{path, Entry};
use crate::tui::view::components::centered_rect;
use crate::utils::{format_size_with, format_timestamp, FileCategory};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

fn field<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

pub fn render_file_info_modal(f: &mut Frame, entry: &Entry, sizes_in_bytes: bool) {
    let area = centered_rect(60, 40, f.area());
    let category = FileCategory::of(entry);

    let mut text = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw(format!("{} ", category.icon())),
            Span::styled(
                entry.name.clone(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        field("Type", category.label().to_string()),
        field("Location", path::display(&entry.parent_path)),
        field(
            "Size",
            format!(
                "{} ({} bytes)",
                format_size_with(entry.size, sizes_in_bytes),
                entry.size
            ),
        ),
    ];
    if let Some(modified) = entry.modified() {
        text.push(field("Modified", format_timestamp(modified)));
    }
    if let Some(ext) = &entry.extension {
        text.push(field("Extension", format!(".{}", ext)));
    }
    text.push(Line::from(""));
    text.push(Line::from(Span::styled(
        "Press Enter or Esc to close",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(text)
        .block(Block::default().title(" File Info ").borders(Borders::ALL))
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

pub fn render_help_modal(f: &mut Frame) {
    let area = centered_rect(65, 65, f.area());

    let heading = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )])
    };
    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(k, Style::default().fg(Color::Cyan)),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        Line::from(vec![Span::styled(
            "dirlens Help",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        heading("Navigation"),
        key("  ↑/↓    ", "Move selection"),
        key("  Enter  ", "Open folder / show file info"),
        key("  Esc/⌫  ", "Clear filter, then go back"),
        key("  h      ", "Go to root"),
        key("  0-9    ", "Jump to breadcrumb at that depth"),
        Line::from(""),
        heading("Listing"),
        key("  /      ", "Filter current folder by name"),
        key("  ←/→    ", "Previous / next page"),
        key("  r      ", "Reload manifest from disk"),
        Line::from(""),
        key("  ?      ", "Show this help"),
        key("  q      ", "Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press q, Esc, or ? to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph =
        Paragraph::new(help_text).block(Block::default().title(" Help ").borders(Borders::ALL));

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

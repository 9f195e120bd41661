use crate::index::{path, DirectoryIndex};
use crate::tui::state::{AppMode, BrowseState};
use crate::tui::view::components::footer::{render_browse_footer, FooterData};
use crate::tui::view::screens::render_loading;
use crate::utils::{format_modified, format_size_with, FileCategory};
use chrono::Utc;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::ListState;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

fn breadcrumb_spans(current: &str) -> Vec<Span<'static>> {
    let crumbs = path::breadcrumbs(current);
    let last = crumbs.len() - 1;
    let mut spans = Vec::new();
    for (depth, (label, _)) in crumbs.into_iter().enumerate() {
        if depth > 0 {
            spans.push(Span::styled(" › ", Style::default().fg(Color::DarkGray)));
        }
        let style = if depth == last {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green)
        };
        if depth < 10 && depth != last {
            spans.push(Span::styled(
                format!("{}:", depth),
                Style::default().fg(Color::DarkGray),
            ));
        }
        spans.push(Span::styled(label, style));
    }
    spans
}

pub fn render_browse(
    f: &mut Frame,
    list_state: &mut ListState,
    index: &DirectoryIndex,
    browse: &BrowseState,
    mode: AppMode,
    sizes_in_bytes: bool,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(f.area());

    let listing = &browse.listing;
    let mut title_spans = vec![
        Span::styled(
            " dirlens ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];
    title_spans.extend(breadcrumb_spans(index.current_path()));
    title_spans.push(Span::styled(
        format!("  [{} folders / {} files]", listing.dir_count, listing.file_count),
        Style::default().fg(Color::Yellow),
    ));
    if browse.is_loading() {
        title_spans.push(Span::styled(
            "  Loading...",
            Style::default().fg(Color::Magenta),
        ));
    }
    let title = Paragraph::new(Line::from(title_spans)).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(title, chunks[0]);

    let search_text = index.navigation().search_text();
    if listing.entries.is_empty() {
        let message = if browse.is_loading() {
            String::new()
        } else if search_text.is_empty() {
            "Folder is empty".to_string()
        } else {
            format!("No matches for \"{}\"", search_text)
        };
        let empty = Paragraph::new(Line::from(Span::styled(
            message,
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Center);
        f.render_widget(empty, chunks[1]);
    } else {
        let now = Utc::now();
        let items: Vec<ListItem> = listing
            .entries
            .iter()
            .map(|entry| {
                let category = FileCategory::of(entry);
                let (name_style, size_text) = if entry.is_dir() {
                    (
                        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                        String::new(),
                    )
                } else {
                    (
                        Style::default().fg(Color::White),
                        format_size_with(entry.size, sizes_in_bytes),
                    )
                };
                let modified = entry
                    .modified()
                    .map(|m| format_modified(m, now))
                    .unwrap_or_default();
                let suffix = if entry.is_dir() { "/" } else { "" };

                ListItem::new(Line::from(vec![
                    Span::raw(format!("{} ", category.icon())),
                    Span::styled(format!("{:<40}", format!("{}{}", entry.name, suffix)), name_style),
                    Span::styled(format!("{:>12}", size_text), Style::default().fg(Color::Green)),
                    Span::styled(format!("  {}", modified), Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        f.render_stateful_widget(list, chunks[1], list_state);
    }

    render_browse_footer(
        f,
        chunks[2],
        &FooterData {
            mode,
            page: index.navigation().page(),
            total_pages: browse.total_pages(),
            search_text,
            search_input: &browse.search_input,
            status: browse.status.as_ref(),
        },
    );

    if browse.is_loading() && listing.entries.is_empty() {
        render_loading(f, "Loading manifest...");
    }
}

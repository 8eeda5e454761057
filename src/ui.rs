use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use crate::app::{App, ChatRole, InputMode, Mode};
use crate::trip::{classify_stop, store_for_waypoint, StopKind, Store};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.mode {
        Mode::Start => render_start_screen(app, frame, body_area),
        Mode::Route => render_route_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let result_indicator = if !app.stores.is_empty() {
        format!(" [{} stores]", app.stores.len())
    } else {
        String::new()
    };

    let title = Line::from(vec![
        Span::styled(" Yorimichi Magazine ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(result_indicator, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.mode {
        Mode::Start => " CHAT ",
        Mode::Route => " ROUTE ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match (app.mode, app.input_mode) {
        (Mode::Start, InputMode::Normal) => {
            let mut hints = vec![
                Span::styled(" i ", key_style),
                Span::styled(" type ", label_style),
                Span::styled(" j/k ", key_style),
                Span::styled(" prompts ", label_style),
                Span::styled(" Enter ", key_style),
                Span::styled(" use prompt ", label_style),
            ];
            if !app.routes.is_empty() {
                hints.extend(vec![
                    Span::styled(" r ", key_style),
                    Span::styled(" route ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
            hints
        }
        (Mode::Start, InputMode::Editing) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
        (Mode::Route, _) => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" alternative ", label_style),
            Span::styled(" C-d/C-u ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" back ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    let mut footer_spans = vec![Span::styled(mode_text, mode_style), Span::styled(" ", label_style)];
    footer_spans.extend(hints);

    let footer = Paragraph::new(Line::from(footer_spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_start_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, stores_area] = Layout::horizontal([
        Constraint::Percentage(55),
        Constraint::Percentage(45),
    ])
    .areas(area);

    let template_count = app.templates().len() as u16;
    let status_height = if app.status.is_some() { 1 } else { 0 };
    let [log_area, status_area, templates_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(status_height),
        Constraint::Length(if template_count > 0 { template_count + 2 } else { 0 }),
        Constraint::Length(3),
    ])
    .areas(chat_area);

    render_chat_log(app, frame, log_area);

    if let Some(status) = &app.status {
        let banner = Paragraph::new(status.as_str())
            .style(Style::default().fg(Color::White).bg(Color::Red));
        frame.render_widget(banner, status_area);
    }

    render_templates(app, frame, templates_area);
    render_chat_input(app, frame, input_area);
    render_stores(app, frame, stores_area);
}

fn render_chat_log(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store chat area dimensions for scroll calculations (inner size
    // minus borders)
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Start chatting to create your first journal ");

    let chat_text = if app.messages.is_empty() && !app.is_loading() {
        Text::from(Span::styled(
            "Search for anything you'd like to do, buy, or enjoy in Japan...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in &app.messages {
            match msg.role {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                }
                ChatRole::Bot => {
                    lines.push(Line::from(Span::styled(
                        "Yorimichi:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                }
            }
            for line in msg.content.lines() {
                lines.push(Line::from(line.to_string()));
            }
            lines.push(Line::default());
        }

        if app.is_loading() {
            lines.push(Line::from(Span::styled(
                "Yorimichi:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_templates(app: &mut App, frame: &mut Frame, area: Rect) {
    let templates = app.templates();
    if templates.is_empty() || area.height == 0 {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Suggestions ");

    let items: Vec<ListItem> = templates
        .iter()
        .map(|t| ListItem::new(format!(" {} ", t)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.template_state);
}

fn render_chat_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(if app.is_loading() {
            " Message (waiting for reply...) "
        } else {
            " Message (i to edit) "
        });

    // Keep the cursor visible with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let skip = if inner_width > 0 && app.chat_cursor >= inner_width {
        app.chat_cursor + 1 - inner_width
    } else {
        0
    };
    let visible: String = app.chat_input.chars().skip(skip).take(inner_width.max(1)).collect();

    let input = Paragraph::new(visible)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    if editing {
        frame.set_cursor_position((
            area.x + (app.chat_cursor - skip) as u16 + 1,
            area.y + 1,
        ));
    }
}

fn store_card_lines(store: &Store, indent: &str) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!("{}{}", indent, store.name),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))];
    lines.push(Line::from(vec![
        Span::raw(format!("{}{} ", indent, stars(store.rating))),
        Span::styled(format!("{:.1}", store.rating), Style::default().fg(Color::DarkGray)),
    ]));
    if !store.address.is_empty() {
        lines.push(Line::from(format!("{}{}", indent, store.address)));
    }
    if !store.website.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("{}{}", indent, store.website),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
        )));
    }
    if !store.photo.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("{}photo: {}", indent, store.photo),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}

/// Five-slot star rating, rounded to the nearest whole star.
fn stars(rating: f64) -> String {
    let filled = (rating.clamp(0.0, 5.0) + 0.5) as usize;
    let mut out = String::new();
    for i in 0..5 {
        out.push(if i < filled { '★' } else { '☆' });
    }
    out
}

fn render_stores(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Stores ({}) ", app.stores.len()));

    let text = if app.stores.is_empty() {
        Text::from(Span::styled(
            "Stores from the recommendations appear here.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();
        for store in &app.stores {
            lines.extend(store_card_lines(store, ""));
            lines.push(Line::default());
        }
        Text::from(lines)
    };

    let stores = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.store_scroll, 0));

    frame.render_widget(stores, area);
}

fn render_route_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [itinerary_area, routes_area] = Layout::horizontal([
        Constraint::Percentage(55),
        Constraint::Percentage(45),
    ])
    .areas(area);

    render_itinerary(app, frame, itinerary_area);
    render_route_alternatives(app, frame, routes_area);
}

fn render_itinerary(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Itinerary ");

    // The itinerary needs a station and waypoints; both come from the
    // backend and are rebuilt from the latest snapshot on every draw.
    let (Some(station), false) = (&app.station, app.waypoints.is_empty()) else {
        let hint = Paragraph::new(Span::styled(
            "No itinerary yet. Ask for a route first.",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(hint, area);
        return;
    };

    let mut lines: Vec<Line> = Vec::new();
    lines.push(stop_line(&station.name, &station.location));
    lines.push(Line::from(Span::styled("│", Style::default().fg(Color::DarkGray))));

    for waypoint in &app.waypoints {
        // Unknown stops keep the red marker; known stops match a
        // returned location by substring
        let (marker_color, name_style) = match classify_stop(waypoint, &app.locations) {
            StopKind::Known => (Color::Green, Style::default().add_modifier(Modifier::BOLD)),
            StopKind::Unknown => (Color::Red, Style::default().fg(Color::Red)),
        };
        let coords = app
            .locations
            .iter()
            .find(|loc| loc.name.contains(waypoint.as_str()))
            .map(|loc| format!("  ({:.4}, {:.4})", loc.location.lat, loc.location.lng))
            .unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled("● ", Style::default().fg(marker_color)),
            Span::styled(waypoint.clone(), name_style),
            Span::styled(coords, Style::default().fg(Color::DarkGray)),
        ]));

        if let Some(store) = store_for_waypoint(waypoint, &app.stores) {
            lines.extend(store_card_lines(store, "│   "));
        }
        lines.push(Line::from(Span::styled("│", Style::default().fg(Color::DarkGray))));
    }

    lines.push(stop_line(&station.name, &station.location));

    let itinerary = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.itinerary_scroll, 0));

    frame.render_widget(itinerary, area);
}

fn stop_line(name: &str, location: &crate::trip::LatLng) -> Line<'static> {
    Line::from(vec![
        Span::styled("◉ ", Style::default().fg(Color::Green)),
        Span::styled(name.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  ({:.4}, {:.4})", location.lat, location.lng),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn render_route_alternatives(app: &mut App, frame: &mut Frame, area: Rect) {
    if app.routes.is_empty() {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Routes ");
        let empty = Paragraph::new(Span::styled(
            "No route found.",
            Style::default().fg(Color::Red),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let list_height = (app.routes.len().min(5) + 2) as u16;
    let [list_area, legs_area] = Layout::vertical([
        Constraint::Length(list_height),
        Constraint::Min(0),
    ])
    .areas(area);

    let list_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(format!(" Routes ({}) ", app.routes.len()));

    let items: Vec<ListItem> = app
        .routes
        .iter()
        .enumerate()
        .map(|(i, alt)| ListItem::new(format!(" {}. {} ", i + 1, alt.label())))
        .collect();

    let list = List::new(items)
        .block(list_block)
        .highlight_style(
            Style::default()
                .bg(Color::Magenta)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, list_area, &mut app.route_state);

    let legs_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Legs ");

    let legs_text = if let Some(alt) = app.selected_route() {
        let mut lines: Vec<Line> = Vec::new();
        for (i, leg) in alt.legs.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{}. ", i + 1),
                    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("{} → {}", leg.start_address, leg.end_address)),
            ]));
            lines.push(Line::from(Span::styled(
                format!("   {} / {}", leg.distance.text, leg.duration.text),
                Style::default().fg(Color::DarkGray),
            )));
        }
        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "No leg details for this route.",
                Style::default().fg(Color::DarkGray),
            )));
        }
        Text::from(lines)
    } else {
        Text::from("Select a route alternative")
    };

    let legs = Paragraph::new(legs_text)
        .block(legs_block)
        .wrap(Wrap { trim: true });

    frame.render_widget(legs, legs_area);
}

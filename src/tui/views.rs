//! TUI views and rendering

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};

use crate::map::{SceneView, MapScene};
use crate::plan::{MAX_BREAK_HOURS, TripPlan};
use crate::session::View;

use super::app::{App, BreakModal, HotelPanel, Overlay, RefineFocus, RefinePanel, RouteField, SELECTION_ITEMS, TripField};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Longitude bounds of the default India view
const INDIA_X_BOUNDS: [f64; 2] = [68.0, 98.0];
/// Latitude bounds of the default India view
const INDIA_Y_BOUNDS: [f64; 2] = [6.0, 38.0];

/// Main render function
pub fn render(app: &App, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(app, frame, chunks[0]);

    match app.session.view() {
        View::Selecting => render_selection(app, frame, chunks[1]),
        View::TripForm => render_trip_form(app, frame, chunks[1]),
        View::TransportForm => render_transport_form(app, frame, chunks[1]),
        View::Synthesizing { .. } => render_loading(app, frame, chunks[1]),
        View::SynthesisFailed { message, .. } => render_blocking_error(message, frame, chunks[1]),
        View::Viewing { plan, refining, banner } => {
            render_viewing(app, plan, *refining, banner.as_deref(), frame, chunks[1]);
        }
    }

    match &app.overlay {
        Overlay::None => {}
        Overlay::Refine(panel) => render_refine_overlay(panel, frame, chunks[1]),
        Overlay::Break(modal) => render_break_overlay(modal, frame, chunks[1]),
        Overlay::Hotels(panel) => render_hotels_overlay(panel, frame, chunks[1]),
        Overlay::History => render_history_overlay(app, frame, chunks[1]),
    }

    render_footer(app, frame, chunks[2]);
}

fn view_name(view: &View) -> &'static str {
    match view {
        View::Selecting => "Choose a mode",
        View::TripForm => "Plan a Trip",
        View::TransportForm => "Find a Route",
        View::Synthesizing { .. } => "Planning",
        View::SynthesisFailed { .. } => "Error",
        View::Viewing { .. } => "Itinerary",
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled("Yatra ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(view_name(app.session.view()), Style::default().fg(Color::Yellow)),
    ];
    if app.session.locating {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled("Locating…", Style::default().fg(Color::Magenta)));
    }
    if app.session.saving {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled("Saving…", Style::default().fg(Color::Magenta)));
    }
    if app.session.plan().is_some_and(|p| p.id.is_some()) {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled("Saved", Style::default().fg(Color::Green)));
    }

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).title(" Yatra — India by public transport "));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = match (&app.overlay, app.session.view()) {
        (Overlay::Refine(_), _) => "Tab: field │ ←/→: adjust │ type: free-text ask │ Enter: refine │ Esc: cancel",
        (Overlay::Break(_), _) => "Tab: hours/minutes │ ←/→: adjust │ Enter: add break │ h: hotels │ Esc: cancel",
        (Overlay::Hotels(_), _) => "Esc: close",
        (Overlay::History, _) => "j/k: move │ Enter: open trip │ Esc: close",
        (_, View::Selecting) => "j/k: move │ Enter: select │ q: quit",
        (_, View::TripForm) => "Tab: field │ Space: toggle │ ←/→: style │ Ctrl+L: use my location │ Enter: plan │ Esc: back",
        (_, View::TransportForm) => "Tab: field │ Space: toggle │ Ctrl+L: use my location │ Enter: find route │ Esc: back",
        (_, View::Synthesizing { .. }) => "Esc: abandon and go home",
        (_, View::SynthesisFailed { .. }) => "r/Enter: back to form │ Esc: home",
        (_, View::Viewing { .. }) => {
            if app.session.can_save() {
                "j/k: day │ r: refine │ b: break │ h: hotels │ s: save │ x: dismiss │ Esc: home"
            } else {
                "j/k: day │ r: refine │ b: break │ h: hotels │ x: dismiss │ Esc: home"
            }
        }
    };
    let footer = Paragraph::new(hints).block(Block::default().borders(Borders::ALL).title(" Keys "));
    frame.render_widget(footer, area);
}

fn render_selection(app: &App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = SELECTION_ITEMS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let line = Line::from(vec![
                Span::raw(if i == app.selection_cursor { "> " } else { "  " }),
                Span::styled(
                    *label,
                    if i == app.selection_cursor {
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    },
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let block = centered_rect(40, 7, area);
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" How do you want to travel? "));
    frame.render_widget(list, block);
}

fn field_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn checkbox(label: &str, checked: bool, focused: bool) -> Line<'_> {
    Line::from(vec![
        Span::styled(if checked { "[x] " } else { "[ ] " }, field_style(focused)),
        Span::styled(label, field_style(focused)),
    ])
}

fn render_trip_form(app: &App, frame: &mut Frame, area: Rect) {
    let form = &app.session.trip_form;
    let focus = app.trip_focus;

    let mut lines = vec![
        Line::from(vec![
            Span::styled("From:  ", field_style(focus == TripField::From)),
            Span::raw(form.from.as_str()),
            Span::raw(if focus == TripField::From { "▏" } else { "" }),
        ]),
        Line::from(vec![
            Span::styled("To:    ", field_style(focus == TripField::To)),
            Span::raw(form.to.as_str()),
            Span::raw(if focus == TripField::To { "▏" } else { "" }),
        ]),
        Line::from(vec![
            Span::styled("Style: ", field_style(focus == TripField::Style)),
            Span::styled(
                format!("◂ {} ▸", form.style.label()),
                field_style(focus == TripField::Style),
            ),
        ]),
        Line::raw(""),
        Line::raw("Transport preferences:"),
        checkbox("Train", form.prefer_train, focus == TripField::Train),
        checkbox("Bus", form.prefer_bus, focus == TripField::Bus),
        Line::raw(""),
    ];
    if !form.prefer_train && !form.prefer_bus {
        lines.push(Line::styled(
            "Select at least one transport preference",
            Style::default().fg(Color::Red),
        ));
    } else {
        lines.push(Line::styled(
            "Enter: plan my trip",
            Style::default().fg(Color::Green),
        ));
    }

    let block = centered_rect(56, 12, area);
    let form_widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Plan a Trip "));
    frame.render_widget(form_widget, block);
}

fn render_transport_form(app: &App, frame: &mut Frame, area: Rect) {
    let form = &app.session.transport_form;
    let focus = app.route_focus;

    let mut lines = vec![
        Line::from(vec![
            Span::styled("From:  ", field_style(focus == RouteField::From)),
            Span::raw(form.from.as_str()),
            Span::raw(if focus == RouteField::From { "▏" } else { "" }),
        ]),
        Line::from(vec![
            Span::styled("To:    ", field_style(focus == RouteField::To)),
            Span::raw(form.to.as_str()),
            Span::raw(if focus == RouteField::To { "▏" } else { "" }),
        ]),
        Line::raw(""),
        Line::raw("Transport preferences:"),
        checkbox("Train", form.prefer_train, focus == RouteField::Train),
        checkbox("Bus", form.prefer_bus, focus == RouteField::Bus),
        Line::raw(""),
    ];
    if !form.prefer_train && !form.prefer_bus {
        lines.push(Line::styled(
            "Select at least one transport preference",
            Style::default().fg(Color::Red),
        ));
    } else {
        lines.push(Line::styled("Enter: find my route", Style::default().fg(Color::Green)));
    }

    let block = centered_rect(56, 11, area);
    let form_widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Find a Route "));
    frame.render_widget(form_widget, block);
}

fn render_loading(app: &App, frame: &mut Frame, area: Rect) {
    let spinner = SPINNER[app.spinner_frame % SPINNER.len()];
    let dots = ".".repeat(app.spinner_frame / 4 % 4);
    let text = vec![
        Line::raw(""),
        Line::from(vec![
            Span::styled(spinner, Style::default().fg(Color::Cyan)),
            Span::raw(" "),
            Span::styled(
                format!("{}{}", app.loading_word, dots),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::raw(""),
        Line::raw("Talking to the planning service. Slow rural routes take a moment."),
    ];
    let block = centered_rect(64, 6, area);
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, block);
}

fn render_blocking_error(message: &str, frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::raw(""),
        Line::styled("Something went wrong", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Line::raw(""),
        Line::raw(message.to_string()),
        Line::raw(""),
        Line::styled("Press r to go back to the form and retry", Style::default().fg(Color::Yellow)),
    ];
    let block = centered_rect(64, 9, area);
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Error "));
    frame.render_widget(widget, block);
}

fn render_viewing(
    app: &App,
    plan: &TripPlan,
    refining: bool,
    banner: Option<&str>,
    frame: &mut Frame,
    area: Rect,
) {
    let mut area = area;
    if let Some(message) = banner {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);
        let banner_widget = Paragraph::new(format!("{} (x to dismiss)", message))
            .style(Style::default().fg(Color::Black).bg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(banner_widget, split[0]);
        area = split[1];
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_itinerary(app, plan, refining, frame, columns[0]);
    render_map(&app.map_scene, frame, columns[1]);
}

fn render_itinerary(app: &App, plan: &TripPlan, refining: bool, frame: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    let mut selected_line = 0usize;

    lines.push(Line::styled(
        plan.title.clone(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ));
    let budget = plan.estimated_budget.as_deref().unwrap_or("n/a");
    lines.push(Line::raw(format!("{} days │ Budget: {}", plan.total_duration, budget)));
    lines.push(Line::raw(""));

    for (i, day) in plan.itinerary.iter().enumerate() {
        let selected = i == app.selected_day;
        if selected {
            selected_line = lines.len();
        }
        let header_style = if selected {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        lines.push(Line::styled(
            format!("Day {} — {} ({})", day.day, day.title, day.city),
            header_style,
        ));
        for leg in &day.transport {
            let mut leg_text = format!("  {} {} → {}", leg.mode.label(), leg.from, leg.to);
            if let (Some(dep), Some(arr)) = (&leg.departure_time, &leg.arrival_time) {
                leg_text.push_str(&format!("  {} – {}", dep, arr));
            }
            lines.push(Line::styled(leg_text, Style::default().fg(Color::Green)));
            lines.push(Line::styled(
                format!("    {}", leg.details),
                Style::default().fg(Color::DarkGray),
            ));
            if let Some(price) = &leg.price {
                lines.push(Line::styled(format!("    {}", price), Style::default().fg(Color::DarkGray)));
            }
            if let Some(link) = &leg.booking_link {
                lines.push(Line::styled(
                    format!("    Book: {}", link),
                    Style::default().fg(Color::Blue),
                ));
            }
        }
        for activity in &day.activities {
            lines.push(Line::raw(format!("  • {}", activity)));
        }
        lines.push(Line::raw(""));
    }

    let title = if refining { " Itinerary (refining…) " } else { " Itinerary " };
    let scroll = selected_line.saturating_sub(3) as u16;
    let widget = Paragraph::new(lines)
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(widget, area);
}

/// Viewport bounds for the recorded scene
fn scene_bounds(scene: &MapScene) -> ([f64; 2], [f64; 2]) {
    match &scene.view {
        SceneView::Default => (INDIA_X_BOUNDS, INDIA_Y_BOUNDS),
        SceneView::Centered { lat, lng, zoom } => {
            let span = 360.0 / 2f64.powf(*zoom);
            ([lng - span / 2.0, lng + span / 2.0], [lat - span / 4.0, lat + span / 4.0])
        }
        SceneView::FitRoute { padding } => {
            let xs: Vec<f64> = scene.route.iter().map(|p| p.1).collect();
            let ys: Vec<f64> = scene.route.iter().map(|p| p.0).collect();
            let (min_x, max_x) = min_max(&xs);
            let (min_y, max_y) = min_max(&ys);
            let pad_x = ((max_x - min_x).max(1.0)) * padding;
            let pad_y = ((max_y - min_y).max(1.0)) * padding;
            ([min_x - pad_x, max_x + pad_x], [min_y - pad_y, max_y + pad_y])
        }
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values.iter().fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
}

fn render_map(scene: &MapScene, frame: &mut Frame, area: Rect) {
    let (x_bounds, y_bounds) = scene_bounds(scene);
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(" Route Map "))
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            for pair in scene.route.windows(2) {
                ctx.draw(&CanvasLine {
                    x1: pair[0].1,
                    y1: pair[0].0,
                    x2: pair[1].1,
                    y2: pair[1].0,
                    color: Color::Cyan,
                });
            }
            ctx.layer();
            for marker in &scene.markers {
                ctx.print(
                    marker.lng,
                    marker.lat,
                    Line::styled(
                        format!("● {}", marker.label),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });
    frame.render_widget(canvas, area);
}

fn render_refine_overlay(panel: &RefinePanel, frame: &mut Frame, area: Rect) {
    let block = centered_rect(60, 11, area);
    frame.render_widget(Clear, block);

    let lines = vec![
        Line::from(vec![
            Span::styled("Duration: ", field_style(panel.focus == RefineFocus::Days)),
            Span::styled(
                format!("◂ {} days ▸", panel.days),
                field_style(panel.focus == RefineFocus::Days),
            ),
        ]),
        Line::from(vec![
            Span::styled("Budget:   ", field_style(panel.focus == RefineFocus::Budget)),
            Span::styled(
                format!("◂ ₹{} ▸", crate::plan::format_inr(panel.budget)),
                field_style(panel.focus == RefineFocus::Budget),
            ),
        ]),
        Line::raw(""),
        Line::from(vec![
            Span::styled("Ask:      ", field_style(panel.focus == RefineFocus::Text)),
            Span::raw(panel.text.as_str()),
            Span::raw(if panel.focus == RefineFocus::Text { "▏" } else { "" }),
        ]),
        Line::raw(""),
        Line::styled(
            "Enter sends all changes as one request; unchanged fields are skipped.",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Refine this trip "));
    frame.render_widget(widget, block);
}

fn render_break_overlay(modal: &BreakModal, frame: &mut Frame, area: Rect) {
    let block = centered_rect(56, 10, area);
    frame.render_widget(Clear, block);

    let req = &modal.request;
    let confirm_line = if req.is_confirmable() {
        Line::styled("Enter: add break", Style::default().fg(Color::Green))
    } else {
        Line::styled("Pick a duration first", Style::default().fg(Color::DarkGray))
    };
    let lines = vec![
        Line::raw(format!("Add a break on Day {} in {}", req.day, req.city)),
        Line::raw(""),
        Line::from(vec![
            Span::styled("Hours:   ", field_style(!modal.minutes_focused)),
            Span::styled(
                format!("◂ {} ▸ (0–{})", req.hours, MAX_BREAK_HOURS),
                field_style(!modal.minutes_focused),
            ),
        ]),
        Line::from(vec![
            Span::styled("Minutes: ", field_style(modal.minutes_focused)),
            Span::styled(format!("◂ {} ▸ (steps of 15)", req.minutes), field_style(modal.minutes_focused)),
        ]),
        Line::raw(""),
        confirm_line,
    ];
    let widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Take a break "));
    frame.render_widget(widget, block);
}

fn render_hotels_overlay(panel: &HotelPanel, frame: &mut Frame, area: Rect) {
    let block = centered_rect(76, 13, area);
    frame.render_widget(Clear, block);

    let mut lines = vec![Line::raw("Check these popular sites for accommodation:"), Line::raw("")];
    for site in &panel.links {
        lines.push(Line::styled(
            site.name,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
        lines.push(Line::styled(
            format!("  {}", site.url),
            Style::default().fg(Color::Blue),
        ));
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Find Hotels in {} ", panel.city)),
    );
    frame.render_widget(widget, block);
}

fn render_history_overlay(app: &App, frame: &mut Frame, area: Rect) {
    let block = centered_rect(70, 14, area);
    frame.render_widget(Clear, block);

    let widget: Paragraph = match &app.history {
        None => Paragraph::new("Loading saved trips…"),
        Some(trips) if trips.is_empty() => Paragraph::new("No saved trips yet."),
        Some(trips) => {
            let lines: Vec<Line> = trips
                .iter()
                .enumerate()
                .map(|(i, trip)| {
                    let style = if i == app.history_cursor {
                        Style::default().fg(Color::Black).bg(Color::Cyan)
                    } else {
                        Style::default()
                    };
                    Line::styled(
                        format!(
                            "{}  {} ({} days, saved {})",
                            if i == app.history_cursor { ">" } else { " " },
                            trip.plan.title,
                            trip.plan.total_duration,
                            trip.saved_at.format("%Y-%m-%d"),
                        ),
                        style,
                    )
                })
                .collect();
            Paragraph::new(lines)
        }
    };
    frame.render_widget(
        widget.block(Block::default().borders(Borders::ALL).title(" Trip History ")),
        block,
    );
}

/// Center a fixed-size box inside the given area
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

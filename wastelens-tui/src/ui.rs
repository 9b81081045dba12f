use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, TableState, Wrap},
};
use wastelens_core::{
    model::{AnalysisResult, Category, InsightKind},
    view::{CitySummary, ComplianceBand, RECYCLING_TARGET_PERCENT, is_high_alert},
};

use crate::app::{App, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let view_label = match app.screen {
        Screen::Overview => "City Overview",
        Screen::Households => "Household Monitor",
    };
    let header = Paragraph::new(format!(
        "wastelens – Hanoi waste analytics · {view_label} · last {} days, simulated IoT data",
        app.days
    ))
    .block(Block::default().borders(Borders::ALL).title("Wastelens"));
    frame.render_widget(header, *header_area);

    // Main screen; nothing to show until the first analysis exists
    match &app.result {
        None => {
            let loading = Paragraph::new("Loading smart city data…")
                .block(Block::default().borders(Borders::ALL))
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(loading, *content_area);
        }
        Some(result) => match app.screen {
            Screen::Overview => draw_overview(frame, app, result, *content_area),
            Screen::Households => draw_households(frame, app, *content_area),
        },
    }

    // Status bar
    let nav_hint = match app.screen {
        Screen::Overview => "Tab households · r regenerate · i refresh insights · q/Ctrl-C quit",
        Screen::Households if app.editing_search => "Type to search · Enter/Esc done",
        Screen::Households => {
            "↑/↓ move · / search · d district · Esc clear filters · Tab overview · r regenerate · q quit"
        }
    };

    let status_text = if app.result.is_none() {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.result.is_none() || app.insights_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_overview(frame: &mut Frame<'_>, app: &App, result: &AnalysisResult, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);
    let [cards_area, body_area] = layout_chunks.as_ref() else {
        return;
    };

    let summary = CitySummary::from_result(result);
    draw_stat_cards(frame, &summary, *cards_area);

    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(*body_area);
    let [left_area, right_area] = body_chunks.as_ref() else {
        return;
    };

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(*left_area);
    let [organic_area, recyclable_area, residual_area, districts_area] = left_chunks.as_ref()
    else {
        return;
    };

    for (category, gauge_area) in Category::ALL
        .into_iter()
        .zip([organic_area, recyclable_area, residual_area])
    {
        let share = summary.composition.get(category);
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(format!(
                "{category} · {:.0} kg",
                summary.weights.get(category)
            )))
            .gauge_style(Style::default().fg(category_color(category)))
            .ratio((share / 100.0).clamp(0.0, 1.0))
            .label(format!("{share:.1}%"));
        frame.render_widget(gauge, *gauge_area);
    }

    draw_district_table(frame, result, *districts_area);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(8)])
        .split(*right_area);
    let [insights_area, alerts_area] = right_chunks.as_ref() else {
        return;
    };

    draw_insights(frame, app, *insights_area);
    draw_alert_summary(frame, result, *alerts_area);
}

fn draw_stat_cards(frame: &mut Frame<'_>, summary: &CitySummary, area: Rect) {
    let card_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let compliance = summary
        .average_compliance
        .map_or_else(|| "n/a".to_owned(), |score| format!("{score:.1}/100"));
    let compliance_color = match summary.average_compliance {
        Some(score) if score > 70.0 => Color::Green,
        Some(_) => Color::Yellow,
        None => Color::DarkGray,
    };
    let recycling_color = if summary.meets_recycling_target() {
        Color::Green
    } else {
        Color::Cyan
    };

    let cards = [
        (
            "Total Waste Collected",
            format!("{:.1} tons", summary.total_tonnes()),
            "Simulated window".to_owned(),
            Color::Blue,
        ),
        (
            "Avg Compliance Score",
            compliance,
            "Based on residual ratio".to_owned(),
            compliance_color,
        ),
        (
            "Recycling Rate",
            format!("{:.1}%", summary.recycling_rate),
            format!("Target: {RECYCLING_TARGET_PERCENT:.0}%"),
            recycling_color,
        ),
        (
            "Flagged Households",
            summary.flagged_households.to_string(),
            "High residual waste alert".to_owned(),
            Color::Red,
        ),
    ];

    for ((title, value, subtext, color), card_area) in cards.into_iter().zip(card_chunks.iter()) {
        let card = Paragraph::new(vec![
            Line::from(Span::styled(
                value,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(subtext, Style::default().fg(Color::DarkGray))),
        ])
        .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(card, *card_area);
    }
}

fn draw_district_table(frame: &mut Frame<'_>, result: &AnalysisResult, area: Rect) {
    let rows = result.district_stats.iter().map(|district| {
        Row::new(vec![
            Cell::from(district.district.name()),
            Cell::from(format!("{:.0}", district.total_weight)),
            Cell::from(format!("{:.1}%", district.composition.organic)),
            Cell::from(format!("{:.1}%", district.composition.recyclable)),
            Cell::from(format!("{:.1}%", district.composition.residual))
                .style(Style::default().fg(category_color(Category::Residual))),
            Cell::from(format!("{:.1}", district.average_household_weight)),
        ])
    });

    let column_widths = [
        Constraint::Min(14),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["District", "Total kg", "Organic", "Recycle", "Residual", "Avg/HH kg"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("District Compliance Comparison"),
        )
        .column_spacing(1);

    frame.render_widget(table, area);
}

fn draw_insights(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let title = if app.insights_loading {
        "Policy Insights (analyzing…)"
    } else {
        "Policy Insights"
    };

    let lines: Vec<Line<'_>> = if app.insights.is_empty() {
        let placeholder = if app.insights_loading {
            "Analyzing district data…"
        } else if app.service.has_advisor() {
            "Initializing analysis model…"
        } else {
            "Advisor API key missing. Set GEMINI_API_KEY to see insights."
        };
        vec![Line::from(Span::styled(
            placeholder,
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        app.insights
            .iter()
            .flat_map(|insight| {
                [
                    Line::from(Span::styled(
                        format!("{} {}", insight_marker(insight.kind), insight.title),
                        Style::default()
                            .fg(insight_color(insight.kind))
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(insight.content.as_str()),
                    Line::default(),
                ]
            })
            .collect()
    };

    let panel = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(panel, area);
}

fn draw_alert_summary(frame: &mut Frame<'_>, result: &AnalysisResult, area: Rect) {
    let lines: Vec<Line<'_>> = result
        .district_stats
        .iter()
        .map(|district| {
            let color = if is_high_alert(district) {
                Color::Red
            } else {
                Color::Green
            };
            Line::from(vec![
                Span::styled("● ", Style::default().fg(color)),
                Span::raw(format!(
                    "{:<14}{} alerts",
                    district.district.name(),
                    district.flagged_households_count
                )),
            ])
        })
        .collect();

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("District Alert Summary"),
    );
    frame.render_widget(panel, area);
}

fn draw_households(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // filters
            Constraint::Min(0),    // table
            Constraint::Length(1), // footer
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [filter_area, table_area, footer_area] = chunks else {
        return;
    };

    let district_label = app
        .filter
        .district
        .map_or("All Districts", |district| district.name());
    let search_style = if app.editing_search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let filters = Paragraph::new(Line::from(vec![
        Span::raw("Search ID: "),
        Span::styled(
            if app.filter.search.is_empty() && !app.editing_search {
                "<none>".to_owned()
            } else {
                app.filter.search.clone()
            },
            search_style,
        ),
        Span::raw(format!("  ·  District: {district_label}")),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Household Monitor (/ search, d district)"),
    );
    frame.render_widget(filters, *filter_area);

    let households = app.filtered_households();
    let count = households.len();

    let rows: Vec<Row<'_>> = if households.is_empty() {
        vec![Row::new(vec![Cell::from(
            "No households found matching your filters.",
        )])
        .style(Style::default().fg(Color::DarkGray))]
    } else {
        households
            .into_iter()
            .map(|household| {
                let score_style = Style::default()
                    .fg(band_color(ComplianceBand::for_score(household.compliance_score)));
                let status = if household.is_flagged {
                    Cell::from("⚠ Flagged").style(Style::default().fg(Color::Red))
                } else {
                    Cell::from("OK").style(Style::default().fg(Color::Green))
                };
                Row::new(vec![
                    Cell::from(household.household_id.0.clone()),
                    Cell::from(household.district.name()),
                    Cell::from(format!("{:.0}", household.compliance_score)).style(score_style),
                    Cell::from(format!("{:.1}%", household.composition.organic)),
                    Cell::from(format!("{:.1}%", household.composition.recyclable)),
                    Cell::from(format!("{:.1}%", household.composition.residual)),
                    status,
                ])
            })
            .collect()
    };

    let column_widths = [
        Constraint::Length(18),
        Constraint::Length(14),
        Constraint::Length(11),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(11),
        Constraint::Min(10),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec![
                "Household ID",
                "District",
                "Compliance",
                "Organic %",
                "Recycle %",
                "Residual %",
                "Status",
            ])
            .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .column_spacing(1);

    let mut state = TableState::default();
    if count > 0 {
        state.select(Some(app.household_index));
    }
    frame.render_stateful_widget(table, *table_area, &mut state);

    let footer = Paragraph::new(format!(
        "Showing {count} households. Data is simulated for analytics prototyping."
    ))
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, *footer_area);
}

fn category_color(category: Category) -> Color {
    match category {
        Category::Organic => Color::Green,
        Category::Recyclable => Color::Blue,
        Category::Residual => Color::Red,
    }
}

fn band_color(band: ComplianceBand) -> Color {
    match band {
        ComplianceBand::Good => Color::Green,
        ComplianceBand::Fair => Color::Yellow,
        ComplianceBand::Poor => Color::Red,
    }
}

fn insight_color(kind: InsightKind) -> Color {
    match kind {
        InsightKind::Alert => Color::Red,
        InsightKind::Observation => Color::Blue,
        InsightKind::Recommendation => Color::Green,
    }
}

fn insight_marker(kind: InsightKind) -> &'static str {
    match kind {
        InsightKind::Alert => "▲",
        InsightKind::Observation => "↗",
        InsightKind::Recommendation => "✦",
    }
}

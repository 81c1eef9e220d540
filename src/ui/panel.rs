// ============================================================================
// Panel - Rendu de l'indicateur dans le terminal
// ============================================================================
// Trois zones :
// - header : source et devise
// - contenu : la ligne tournante colorée + "Last update" / "Next update"
// - footer : raccourcis clavier (ou confirmation de quit)
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. Span / Line : texte composé de morceaux stylés
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::ticker::TickerLine;

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    render_ticker(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

/// Crée le layout principal (header, content, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header : 3 lignes
            Constraint::Min(0),    // Content : tout le reste
            Constraint::Length(3), // Footer : 3 lignes
        ])
        .split(area)
        .to_vec()
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" MetalWatch ")
        .title_alignment(Alignment::Center);

    let text = Line::from(vec![
        Span::styled(
            app.settings.enabled_source.clone(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(app.settings.currency.clone(), Style::default().fg(Color::Gray)),
    ]);

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Convertit une ligne du ticker en Line ratatui colorée
///
/// Même découpage que le markup : libellé dans la couleur du métal,
/// variations en vert ou en rouge.
pub fn ticker_spans(line: &TickerLine) -> Line<'static> {
    let (r, g, b) = line.color;
    let trend = if line.up { Color::Green } else { Color::Red };

    Line::from(vec![
        Span::raw(":"),
        Span::styled(line.label, Style::default().fg(Color::Rgb(r, g, b)).add_modifier(Modifier::BOLD)),
        Span::raw(format!(": {} ", line.price)),
        Span::styled(
            format!("{}{} {}{}%", line.sign(), line.change, line.sign(), line.pchange),
            Style::default().fg(trend),
        ),
    ])
}

fn render_ticker(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let mut lines = vec![Line::from("")];

    match app.current_line() {
        Some(line) => lines.push(ticker_spans(line)),
        None => lines.push(Line::from(Span::styled("...", Style::default().fg(Color::Gray)))),
    }

    lines.push(Line::from(""));
    let timestamps = [app.last_update(), app.next_update()];
    for text in timestamps.into_iter().flatten() {
        lines.push(Line::from(Span::styled(text.to_string(), Style::default().fg(Color::Gray))));
    }

    if app.is_fetching {
        lines.push(Line::from(Span::styled(
            "Fetching...",
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(error) = &app.last_error {
        lines.push(Line::from(Span::styled(
            format!("Last fetch failed: {}", error),
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(lines).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled("[q]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Quit  "),
            Span::styled("[r]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Refresh"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

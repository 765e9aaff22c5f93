use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};
use time_humanize::{Accuracy, HumanTime, Tense};

use crate::app::App;
use crate::history::{GameSummary, HistorySink};

/// Final standings table plus the achievement badges, rendered once the
/// match settles.
pub fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // headline
            Constraint::Min(5),    // standings
            Constraint::Length(5), // achievements
            Constraint::Length(2), // keys
        ])
        .split(area);

    let Some(summary) = app.last_summary.as_ref() else {
        let empty = Paragraph::new("No finished derby yet.")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        empty.render(area, buf);
        return;
    };

    let headline = Paragraph::new(format!(
        "{} wins it - {} homers, {} points",
        summary.winner_name, summary.total_home_runs, summary.total_score
    ))
    .block(Block::default().borders(Borders::ALL).title(format!(
        "Final - {}",
        summary.stadium_name
    )))
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center);
    headline.render(chunks[0], buf);

    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("Player"),
        Cell::from("HR"),
        Cell::from("Score"),
        Cell::from("Avg Dist"),
        Cell::from("Avg EV"),
        Cell::from("Longest HR"),
        Cell::from("EV Spread"),
    ])
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = summary
        .players
        .iter()
        .enumerate()
        .map(|(rank, line)| {
            let style = if rank == 0 {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(format!("{}", rank + 1)),
                Cell::from(line.name.clone()),
                Cell::from(format!("{}", line.home_runs)),
                Cell::from(format!("{}", line.total_score)),
                Cell::from(format!("{:.0} ft", line.avg_distance_ft)),
                Cell::from(format!("{:.1} mph", line.avg_exit_velocity_mph)),
                Cell::from(if line.longest_home_run_ft > 0 {
                    format!("{} ft", line.longest_home_run_ft)
                } else {
                    "-".to_string()
                }),
                Cell::from(format!("{:.1}", line.exit_velocity_spread)),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        &[
            Constraint::Length(3),
            Constraint::Length(16),
            Constraint::Length(4),
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("Standings"));
    Widget::render(table, chunks[1], buf);

    let achievements = crate::stats::award_achievements(&summary.players);
    let lines: Vec<Line> = achievements
        .iter()
        .map(|award| {
            Line::from(vec![
                Span::styled(
                    format!("{}: ", award.achievement),
                    Style::default().fg(Color::Magenta),
                ),
                Span::raw(format!("{} ({:.0})", award.player_name, award.value)),
            ])
        })
        .collect();
    let badges = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Achievements"));
    badges.render(chunks[2], buf);

    let keys = Paragraph::new("(n)ew derby  (h)istory  (enter) dashboard")
        .style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )
        .alignment(Alignment::Center);
    keys.render(chunks[3], buf);
}

fn summary_line(game: &GameSummary) -> String {
    let elapsed = chrono::Local::now()
        .signed_duration_since(game.finished_at)
        .to_std()
        .unwrap_or_default();
    let when = HumanTime::from(elapsed).to_text_en(Accuracy::Rough, Tense::Past);
    format!(
        "{:<14} {:>2} HR  {:>4} pts  {:>5.1} mph  {} - {}",
        game.winner_name,
        game.total_home_runs,
        game.total_score,
        game.max_exit_velocity,
        game.stadium_name,
        when,
    )
}

/// Recent derby ledger, newest first.
pub fn render_history(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(area);

    let games = app.history.recent(20).unwrap_or_default();
    let body: Vec<Line> = if games.is_empty() {
        vec![Line::from(Span::styled(
            "No games on record. Win one!",
            Style::default().fg(Color::Gray),
        ))]
    } else {
        games.iter().map(|g| Line::from(summary_line(g))).collect()
    };

    let list = Paragraph::new(body)
        .block(Block::default().borders(Borders::ALL).title("Game history"));
    list.render(chunks[0], buf);

    let keys = Paragraph::new("(b)ack")
        .style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )
        .alignment(Alignment::Center);
    keys.render(chunks[1], buf);
}

pub mod charting;
pub mod results;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use time_humanize::{Accuracy, HumanTime, Tense};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, AppState};
use crate::derby::{DerbyGame, GamePhase};
use crate::history::HistorySink;
use crate::practice::{PracticeSession, RecordingState};
use crate::session::SessionLifecycle;
use crate::setup::SetupWizard;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Dashboard => render_dashboard(self, area, buf),
            AppState::Setup => {
                if let Some(wizard) = &self.wizard {
                    render_setup(wizard, area, buf);
                }
            }
            AppState::Derby => {
                if let Some(game) = &self.derby {
                    render_derby(game, area, buf);
                }
            }
            AppState::Results => results::render_results(self, area, buf),
            AppState::Practice => {
                if let Some(session) = &self.practice {
                    render_practice(session, area, buf);
                }
            }
            AppState::History => results::render_history(self, area, buf),
        }

        if self.celebration.is_active {
            render_celebration(self, area, buf);
        }
    }
}

fn render_dashboard(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // banner
            Constraint::Length(4), // paused session
            Constraint::Length(3), // last game
            Constraint::Min(1),
            Constraint::Length(2), // keys
        ])
        .split(area);

    let banner = Paragraph::new("DINGER - swing training")
        .block(Block::default().borders(Borders::ALL))
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    banner.render(chunks[0], buf);

    let session_lines: Vec<Line> = match app.store.backgrounded() {
        Some(snapshot) => vec![
            Line::from(Span::styled(
                format!(
                    "Paused session - {} swings, avg {:.1} mph, top {:.1} mph, {:.0} min",
                    snapshot.swing_count,
                    snapshot.avg_exit_velocity,
                    snapshot.top_exit_velocity,
                    snapshot.duration_mins,
                ),
                Style::default().fg(Color::Cyan),
            )),
            Line::from(Span::styled(
                "(r)esume  (e)nd session",
                Style::default().fg(Color::Gray),
            )),
        ],
        None => {
            let label = match app.store.lifecycle() {
                SessionLifecycle::Active => "Session in progress",
                _ => "No session in progress",
            };
            vec![Line::from(Span::styled(
                label,
                Style::default().fg(Color::Gray),
            ))]
        }
    };
    let session = Paragraph::new(session_lines)
        .block(Block::default().borders(Borders::ALL).title("Practice"))
        .wrap(Wrap { trim: true });
    session.render(chunks[1], buf);

    let last_game = match app.history.recent(1) {
        Ok(games) => match games.first() {
            Some(game) => {
                let elapsed = chrono::Local::now()
                    .signed_duration_since(game.finished_at)
                    .to_std()
                    .unwrap_or_default();
                format!(
                    "Last derby: {} won at {}, {}",
                    game.winner_name,
                    game.stadium_name,
                    HumanTime::from(elapsed).to_text_en(Accuracy::Rough, Tense::Past),
                )
            }
            None => "No derbies played yet.".to_string(),
        },
        Err(_) => "History unavailable.".to_string(),
    };
    let last = Paragraph::new(last_game)
        .block(Block::default().borders(Borders::ALL).title("Derby"))
        .style(Style::default().fg(Color::Gray));
    last.render(chunks[2], buf);

    let keys = Paragraph::new("(d)erby  (p)ractice  (h)istory  (q)uit")
        .style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )
        .alignment(Alignment::Center);
    keys.render(chunks[4], buf);
}

fn render_setup(wizard: &SetupWizard, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Length(2),
        ])
        .split(area);

    let title = Paragraph::new(format!(
        "Derby setup - step {}/4: {}",
        wizard.step() + 1,
        wizard.step_title()
    ))
    .block(Block::default().borders(Borders::ALL))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center);
    title.render(chunks[0], buf);

    let body: Vec<Line> = match wizard.step() {
        0 => vec![
            Line::from(format!("Session (t): {}", wizard.session_type)),
            Line::from(format!("Location (l): {}", wizard.location)),
        ],
        1 => wizard
            .players
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let marker = if i == wizard.roster_cursor { "> " } else { "  " };
                let style = if i == wizard.roster_cursor {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(format!("{}{}. {}", marker, i + 1, p.name), style))
            })
            .collect(),
        2 => {
            let mut lines: Vec<Line> = wizard
                .stadiums()
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let selected = if i == wizard.stadium_index { "> " } else { "  " };
                    let lock = if s.unlocked { "" } else { " [locked]" };
                    let style = if s.unlocked {
                        Style::default()
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    Line::from(Span::styled(
                        format!("{}{} ({}){}", selected, s.name, s.size, lock),
                        style,
                    ))
                })
                .collect();
            lines.push(Line::from(""));
            lines.push(Line::from(format!(
                "Weather (w): {}   Time (o): {}",
                wizard.weather, wizard.time_of_day
            )));
            lines
        }
        _ => vec![Line::from(
            "Connect your launch monitor to start. Press (c) to pair.",
        )],
    };
    let body = Paragraph::new(body)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    body.render(chunks[1], buf);

    let hint = match wizard.step() {
        0 => "(t)oggle session  (l)ocation  (enter) next  (esc) cancel",
        1 => "(a)dd  (x) remove  (k/j) reorder  arrows select  (enter) next  (backspace) back",
        2 => "(s)tadium  (w)eather  (o) time of day  (enter) next  (backspace) back",
        _ => "(c) pair device  (enter) play ball  (backspace) back",
    };
    let keys = Paragraph::new(hint)
        .style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )
        .alignment(Alignment::Center);
    keys.render(chunks[2], buf);
}

fn phase_line(game: &DerbyGame) -> Line<'static> {
    match game.phase() {
        GamePhase::PreSwing => Line::from(Span::styled(
            "Ready - press space to swing",
            Style::default().fg(Color::Green),
        )),
        GamePhase::SwingDetected => Line::from(Span::styled(
            "Tracking ball flight...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        )),
        GamePhase::PostMetric => {
            let verdict = game
                .latest_shot()
                .map(|s| s.outcome().to_string().to_uppercase())
                .unwrap_or_default();
            Line::from(Span::styled(
                verdict,
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ))
        }
        GamePhase::PlayerChange => Line::from(Span::styled(
            format!("Next up: {}", game.current_player().name),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
    }
}

fn render_derby(game: &DerbyGame, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(2), // phase
            Constraint::Min(6),    // spray chart
            Constraint::Length(4), // latest metrics
            Constraint::Length(1), // keys
        ])
        .split(area);

    let config = game.config();
    let header = Paragraph::new(format!(
        "{} - {} | {}, {} | {}  ball {}/{}",
        config.stadium.name,
        config.session_type,
        config.weather,
        config.time_of_day,
        game.current_player().name,
        game.ball_count(),
        game.max_balls(),
    ))
    .block(Block::default().borders(Borders::ALL))
    .style(Style::default().add_modifier(Modifier::BOLD))
    .alignment(Alignment::Center);
    header.render(chunks[0], buf);

    Paragraph::new(phase_line(game))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let shots = &game.current_player().shots;
    let (balls_in_play, homers) = charting::spray_series(shots);
    let ([x_lo, x_hi], [y_lo, y_hi]) = charting::spray_bounds(shots);
    let datasets = vec![
        Dataset::default()
            .name("in play")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Gray))
            .data(&balls_in_play),
        Dataset::default()
            .name("homers")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Yellow))
            .data(&homers),
    ];
    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title("Spray chart"))
        .x_axis(
            Axis::default()
                .title("direction")
                .bounds([x_lo, x_hi])
                .labels(vec![
                    Span::raw(charting::format_label(x_lo)),
                    Span::raw("0"),
                    Span::raw(charting::format_label(x_hi)),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("feet")
                .bounds([y_lo, y_hi])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(charting::format_label(y_hi)),
                ]),
        );
    chart.render(chunks[2], buf);

    let metrics = match game.latest_shot() {
        Some(shot) => format!(
            "{} ft   {} mph EV   {}° launch   {}° dir   {} mph bat   +{} pts",
            shot.distance_ft,
            shot.exit_velocity_mph,
            shot.launch_angle_deg,
            shot.launch_direction_deg,
            shot.bat_speed_mph,
            shot.score,
        ),
        None => "Waiting on the first swing...".to_string(),
    };
    let metrics = Paragraph::new(metrics)
        .block(Block::default().borders(Borders::ALL).title("Last swing"))
        .alignment(Alignment::Center);
    metrics.render(chunks[3], buf);

    Paragraph::new("(space) swing  (esc) end match")
        .style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
}

fn render_practice(session: &PracticeSession, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Length(2),
        ])
        .split(area);

    let recording = match session.recording {
        RecordingState::Running => Span::styled("RECORDING", Style::default().fg(Color::Green)),
        RecordingState::Halted => Span::styled("PAUSED", Style::default().fg(Color::Yellow)),
    };
    let title = Paragraph::new(Line::from(vec![
        Span::raw(format!("{} practice - ", session.session_type)),
        recording,
    ]))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    title.render(chunks[0], buf);

    let mut lines = vec![
        Line::from(format!("Swings: {}", session.swing_count())),
        Line::from(format!("Avg exit velo: {:.1} mph", session.avg_exit_velocity())),
        Line::from(format!("Top exit velo: {:.1} mph", session.top_exit_velocity())),
        Line::from(format!("Duration: {:.1} min", session.duration_mins())),
    ];
    if let Some(shot) = session.latest_shot() {
        lines.push(Line::from(""));
        lines.push(Line::from(format!(
            "Last: {} ft at {} mph - {}",
            shot.distance_ft,
            shot.exit_velocity_mph,
            shot.outcome()
        )));
    }
    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Session"));
    body.render(chunks[1], buf);

    Paragraph::new("(space) swing  (p)ause/resume  (m)inimize  (e)nd")
        .style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
}

/// Overlay the home-run celebration on whatever screen is up.
fn render_celebration(app: &App, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Green,
        Color::Red,
        Color::Blue,
        Color::LightYellow,
    ];

    let celebration = &app.celebration;
    for particle in &celebration.particles {
        let x = particle.x as u16;
        let y = particle.y as u16;
        if x >= area.width || y >= area.height {
            continue;
        }

        let color = colors[particle.color_index % colors.len()];
        let alpha = 1.0 - (particle.age / particle.max_age);
        let style = if alpha > 0.7 {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else if alpha > 0.3 {
            Style::default().fg(color)
        } else {
            Style::default().fg(color).add_modifier(Modifier::DIM)
        };

        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_symbol(&particle.symbol.to_string());
            cell.set_style(style);
        }
    }

    // Headline dead center, over the sparks.
    let headline = celebration.headline;
    let width = headline.width() as u16;
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height / 2;
    for (i, ch) in headline.chars().enumerate() {
        if let Some(cell) = buf.cell_mut((x + i as u16, y)) {
            cell.set_symbol(&ch.to_string());
            cell.set_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        }
    }
}

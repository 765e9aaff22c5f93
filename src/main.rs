use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use dinger::app::App;
use dinger::config::{Config, ConfigStore, FileConfigStore};
use dinger::history::{export_csv, HistorySink, SqliteHistory};
use dinger::runtime::{AppEvent, CrosstermEventSource, EventPump};

const TICK_RATE_MS: u64 = 100;

/// terminal home run derby with simulated launch-monitor shots
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal home run derby and swing-training app: multi-player derby matches, tee/soft-toss practice sessions, and per-swing launch metrics, with a persisted game ledger."
)]
pub struct Cli {
    /// balls each player gets per derby round
    #[clap(short = 'b', long)]
    balls: Option<u32>,

    /// seed the derby roster with a player (repeatable)
    #[clap(short = 'p', long = "player")]
    players: Vec<String>,

    /// take swings from the paired launch monitor instead of the simulator
    #[clap(long)]
    device: bool,

    /// write the match ledger as CSV to the given path, then exit
    #[clap(long, value_name = "PATH")]
    export_history: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(balls) = self.balls {
            config.balls_per_player = balls.max(1);
        }
        if !self.players.is_empty() {
            config.default_players = self.players.clone();
        }
        if self.device {
            config.simulate = false;
        }
    }
}

fn export_history(path: &PathBuf) -> Result<(), Box<dyn Error>> {
    let ledger = SqliteHistory::new()?;
    let games = ledger.recent(1000)?;
    let file = std::fs::File::create(path)?;
    export_csv(&games, file)?;
    println!("Exported {} games to {}", games.len(), path.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = &cli.export_history {
        return export_history(path);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    cli.apply(&mut config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Remember settings tweaked via the CLI for next launch.
    let _ = config_store.save(&app.config);

    result
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let pump = EventPump::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    loop {
        terminal.draw(|f| {
            app.terminal_size = (f.area().width, f.area().height);
            f.render_widget(&*app, f.area());
        })?;

        match pump.next() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => app.handle_key(key),
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["dinger"]);
        assert_eq!(cli.balls, None);
        assert!(cli.players.is_empty());
        assert!(!cli.device);
        assert_eq!(cli.export_history, None);
    }

    #[test]
    fn test_cli_balls() {
        let cli = Cli::parse_from(["dinger", "-b", "5"]);
        assert_eq!(cli.balls, Some(5));

        let cli = Cli::parse_from(["dinger", "--balls", "12"]);
        assert_eq!(cli.balls, Some(12));
    }

    #[test]
    fn test_cli_repeated_players() {
        let cli = Cli::parse_from(["dinger", "-p", "Ace", "--player", "Bo"]);
        assert_eq!(cli.players, vec!["Ace".to_string(), "Bo".to_string()]);
    }

    #[test]
    fn test_cli_device_flag() {
        let cli = Cli::parse_from(["dinger", "--device"]);
        assert!(cli.device);
    }

    #[test]
    fn test_cli_export_history_path() {
        let cli = Cli::parse_from(["dinger", "--export-history", "/tmp/games.csv"]);
        assert_eq!(cli.export_history, Some(PathBuf::from("/tmp/games.csv")));
    }

    #[test]
    fn test_cli_apply_overrides_config() {
        let cli = Cli::parse_from(["dinger", "-b", "3", "-p", "Ace", "--device"]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.balls_per_player, 3);
        assert_eq!(config.default_players, vec!["Ace".to_string()]);
        assert!(!config.simulate);
    }

    #[test]
    fn test_cli_apply_keeps_defaults_when_unset() {
        let cli = Cli::parse_from(["dinger"]);
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_cli_zero_balls_clamped() {
        let cli = Cli::parse_from(["dinger", "-b", "0"]);
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.balls_per_player, 1);
    }
}

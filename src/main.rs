use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use crossterm::event::KeyEventKind;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

mod app;
mod config;
mod db;
mod error;
mod models;
mod services;
mod tui;

use app::App;
use config::Config;
use error::Result;
use models::{SortKey, DUE_DATE_FORMAT};
use tui::{draw, handle_key_event};

enum Command {
    Tui,
    Add { url: String, due_date: String },
    List { sort: Option<SortKey> },
    Export { path: PathBuf },
}

fn parse_args(args: &[String]) -> std::result::Result<Command, String> {
    match args.get(1).map(String::as_str) {
        None => Ok(Command::Tui),
        Some("--add") => {
            let url = args.get(2).ok_or("--add needs a URL")?.clone();
            let due_date = match (args.get(3).map(String::as_str), args.get(4)) {
                (Some("--due"), Some(date)) => date.clone(),
                (None, _) => Local::now().date_naive().format(DUE_DATE_FORMAT).to_string(),
                _ => return Err("usage: --add <url> [--due YYYY-MM-DD]".to_string()),
            };
            Ok(Command::Add { url, due_date })
        }
        Some("--list") => {
            let sort = match (args.get(2).map(String::as_str), args.get(3)) {
                (Some("--sort"), Some(key)) => {
                    Some(SortKey::from_arg(key).ok_or(format!("unknown sort key: {key}"))?)
                }
                (None, _) => None,
                _ => return Err("usage: --list [--sort due|stored]".to_string()),
            };
            Ok(Command::List { sort })
        }
        Some("--export") => {
            let path = args.get(2).ok_or("--export needs a file path")?;
            Ok(Command::Export {
                path: PathBuf::from(path),
            })
        }
        Some(other) => Err(format!("unknown argument: {other}")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    };

    // Load configuration
    let config = Config::load()?;

    // Initialize app
    let mut app = App::new(&config).await?;

    match command {
        Command::Tui => {}
        Command::Add { url, due_date } => {
            match app.save_bookmark(&url, &due_date).await {
                Ok(id) => println!("Saved bookmark {id}"),
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            }
            return Ok(());
        }
        Command::List { sort } => {
            let bookmarks = app
                .repository
                .list_sorted(sort.unwrap_or(config.default_sort))
                .await?;
            let today = Local::now().date_naive();
            for bookmark in bookmarks {
                // Unparsable due dates abort the listing rather than print unflagged
                let marker = if bookmark.is_overdue(today)? { "OVERDUE" } else { "" };
                println!(
                    "{:>5}  {}  {:<7}  {}  {}",
                    bookmark.id, bookmark.due_date, marker, bookmark.title, bookmark.url
                );
            }
            return Ok(());
        }
        Command::Export { path } => {
            let bookmarks = app.repository.list_sorted(config.default_sort).await?;
            std::fs::write(&path, serde_json::to_string_pretty(&bookmarks)?)?;
            println!("Exported {} bookmarks to {:?}", bookmarks.len(), path);
            return Ok(());
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        // A queued save runs only after its "Fetching..." frame is on screen
        if app.is_fetching {
            app.run_pending_save().await?;
            continue;
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = handle_key_event(key, app.input_mode()) {
                        let should_quit = app.handle_action(action).await?;
                        if should_quit {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("bookmarker")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn no_arguments_start_the_tui() {
        assert!(matches!(parse_args(&args(&[])), Ok(Command::Tui)));
    }

    #[test]
    fn add_takes_an_optional_due_date() {
        match parse_args(&args(&["--add", "https://example.com", "--due", "2024-05-01"])) {
            Ok(Command::Add { url, due_date }) => {
                assert_eq!(url, "https://example.com");
                assert_eq!(due_date, "2024-05-01");
            }
            _ => panic!("expected add command"),
        }

        match parse_args(&args(&["--add", "https://example.com"])) {
            Ok(Command::Add { due_date, .. }) => assert_eq!(due_date.len(), 10),
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn list_accepts_sort_names() {
        assert!(matches!(
            parse_args(&args(&["--list", "--sort", "stored"])),
            Ok(Command::List { sort: Some(SortKey::StoredDate) })
        ));
        assert!(parse_args(&args(&["--list", "--sort", "title"])).is_err());
    }

    #[test]
    fn unknown_and_incomplete_arguments_are_rejected() {
        assert!(parse_args(&args(&["--add"])).is_err());
        assert!(parse_args(&args(&["--export"])).is_err());
        assert!(parse_args(&args(&["--frobnicate"])).is_err());
    }
}

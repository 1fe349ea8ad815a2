use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tracing_subscriber::EnvFilter;

use todo_cli::api::ApiClient;
use todo_cli::app::App;
use todo_cli::ui;

#[derive(Parser)]
#[command(name = "todo-cli", about = "To-do list terminal client")]
struct Cli {
    /// Todo server base URL
    #[arg(long, env = "TODO_SERVER_URL", default_value = "http://localhost:5000")]
    server_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut terminal = ratatui::try_init()?;

    let result = run(&mut terminal, cli).await;

    ratatui::try_restore()?;

    result
}

async fn run(terminal: &mut ratatui::DefaultTerminal, cli: Cli) -> Result<()> {
    let api = ApiClient::new(&cli.server_url);
    let mut app = App::new(cli.server_url);

    app.load(&api).await;

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if app.input.is_some() {
                    match key.code {
                        KeyCode::Enter => app.submit_input(&api).await,
                        KeyCode::Esc => app.cancel_input(),
                        KeyCode::Backspace => app.input_backspace(),
                        KeyCode::Char(c) => app.input_char(c),
                        _ => {}
                    }
                } else {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Up => app.select_prev(),
                        KeyCode::Down => app.select_next(),
                        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected(&api).await,
                        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(&api).await,
                        KeyCode::Char('a') => app.open_input(),
                        KeyCode::Char('r') => app.reload(&api).await,
                        KeyCode::Char('l') => app.log_out(&api).await,
                        _ => {}
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

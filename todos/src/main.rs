//! todos - command line to-do list
//!
//! Reads commands from stdin, dispatches them through a runtime with
//! logging middleware, and prints the filtered list after each one.
//!
//! # Usage
//!
//! ```sh
//! # In-memory backend with sample items
//! cargo run -p todos
//!
//! # Real backend, verbose logs
//! cargo run -p todos -- --server http://localhost:3000 --log-level debug
//! ```

use std::io::Write;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use todo_dispatch::{LoggingMiddleware, Runtime, StoreWithMiddleware};
use todos::repl::{Command, Reply, Session, HELP};
use todos::{reducer, AppState, Args, Config, TodoSelectors};

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn show(reply: anyhow::Result<Reply>) -> bool {
    match reply {
        Ok(Reply::Text(text)) => {
            println!("{}", text);
            true
        }
        Ok(Reply::Quit) => false,
        Err(err) => {
            eprintln!("error: {:#}", err);
            true
        }
    }
}

fn progress(text: &str) {
    println!("{}", text);
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from(Args::parse());
    init_tracing(&config.log_level);

    let api = config.api();
    let store = StoreWithMiddleware::new(AppState::default(), reducer, LoggingMiddleware::new());
    let runtime = Runtime::from_store(store);
    let mut session = Session::new(
        runtime,
        TodoSelectors::with_capacity(config.max_cached),
        api,
    );

    println!("{}\n", HELP);
    show(session.execute_with(Command::Fetch, progress).await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let keep_going = match line.parse::<Command>() {
            Ok(command) => show(session.execute_with(command, progress).await),
            Err(err) => {
                eprintln!("error: {}", err);
                true
            }
        };
        if !keep_going {
            break;
        }
    }

    session.shutdown();
    tracing::debug!("Bye");
    Ok(())
}

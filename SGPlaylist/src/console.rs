//! Console interactive de la file de lecture
//!
//! Lit des commandes sur l'entrée standard et réagit aux fins de piste
//! signalées par le lecteur externe.

use anyhow::Result;
use sgpconfig::get_config;
use sgpqueue::{
    CommandPlayer, HttpResolver, JsonFileStore, PlaybackSurface, QueueConfigExt, QueueController,
    StateStore, Tone, TrackResolver,
};
use sgpresolver::ResolverConfigExt;
use sgpserver::LogState;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

const HELP: &str = "\
Commands:
  add <url> [<url> ...]   add page or audio URLs (a bare URL line works too)
  play [n]                play track n, or start/resume playback
  next                    skip to the next track
  remove <n>              remove track n
  clear                   empty the queue
  list                    show the queue
  log <level>             change the log level (ERROR, WARN, INFO, DEBUG, TRACE)
  help                    show this help
  quit                    leave";

/// Commande saisie par l'utilisateur (indices 0-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Play(usize),
    Resume,
    Next,
    Remove(usize),
    Clear,
    List,
    Log(String),
    Help,
    Quit,
}

impl Command {
    /// Analyse une ligne ; `Ok(None)` pour une ligne vide
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let rest: Vec<&str> = words.collect();

        let command = match head.to_lowercase().as_str() {
            "add" | "a" => {
                if rest.is_empty() {
                    return Err("add needs at least one URL".to_string());
                }
                Command::Add(rest.join("\n"))
            }
            "play" | "p" => match rest.first() {
                None => Command::Resume,
                Some(n) => Command::Play(parse_position(n)?),
            },
            "next" | "n" => Command::Next,
            "remove" | "rm" => match rest.first() {
                None => return Err("remove needs a track number".to_string()),
                Some(n) => Command::Remove(parse_position(n)?),
            },
            "clear" => Command::Clear,
            "list" | "ls" => Command::List,
            "log" => match rest.first() {
                None => return Err("log needs a level".to_string()),
                Some(level) => Command::Log(level.to_string()),
            },
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ if head.starts_with("http://") || head.starts_with("https://") => {
                let mut urls = vec![head];
                urls.extend(rest);
                Command::Add(urls.join("\n"))
            }
            other => return Err(format!("Unknown command '{}' (try help)", other)),
        };

        Ok(Some(command))
    }
}

/// Numéro de piste affiché (1-based) vers index
fn parse_position(raw: &str) -> std::result::Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("'{}' is not a track number", raw)),
    }
}

fn build_resolver(local: bool) -> Result<Arc<dyn TrackResolver>> {
    let config = get_config();
    if local {
        info!("Resolving pages in-process");
        Ok(Arc::new(config.resolver_client_builder().build()?))
    } else {
        let url = config.get_queue_resolver_url();
        info!("Using resolver service at {}", url);
        Ok(Arc::new(HttpResolver::new(&url)?))
    }
}

/// Lance la console
pub async fn run(log_state: LogState, local: bool) -> Result<()> {
    let config = get_config();

    let resolver = build_resolver(local)?;
    let (player, mut events) = CommandPlayer::new(config.get_queue_player_command())?;
    let store = JsonFileStore::new(config.queue_state_path()?);
    info!("Queue state file: {}", store.path().display());

    let mut controller = QueueController::new(resolver, player, store);

    print_queue(&controller);
    println!("{}", controller.now_playing());
    println!("Type 'help' for the list of commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => execute(&mut controller, &log_state, command).await,
                    Err(message) => println!("{}", message),
                }
            }
            Some(event) = events.recv() => {
                println!();
                controller.handle_event(event).await;
                print_status(&controller);
                println!("{}", controller.now_playing());
            }
        }
    }

    // Le lecteur externe est arrêté avec le contrôleur
    Ok(())
}

async fn execute<P, S>(controller: &mut QueueController<P, S>, log_state: &LogState, command: Command)
where
    P: PlaybackSurface,
    S: StateStore,
{
    match command {
        Command::Add(text) => {
            let report = controller.add_urls(&text).await;
            for failure in &report.failures {
                println!("  ! {}: {}", failure.page_url, failure.error);
            }
            print_status(controller);
            if !report.added.is_empty() {
                print_queue(controller);
            }
        }
        Command::Play(index) => {
            if controller.play_at_index(index).await {
                print_status(controller);
            } else {
                println!("No track {}", index + 1);
            }
        }
        Command::Resume => {
            controller.resume().await;
            print_status(controller);
        }
        Command::Next => {
            controller.play_next().await;
            print_status(controller);
            println!("{}", controller.now_playing());
        }
        Command::Remove(index) => match controller.remove_at_index(index) {
            Some(track) => {
                println!("Removed {}", track.label());
                print_queue(controller);
            }
            None => println!("No track {}", index + 1),
        },
        Command::Clear => {
            controller.clear();
            print_status(controller);
        }
        Command::List => {
            print_queue(controller);
            println!("{}", controller.now_playing());
        }
        Command::Log(level) => {
            if let Err(e) = log_state.set_max_level_str(&level) {
                println!("{}", e);
            }
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn print_status<P, S>(controller: &QueueController<P, S>)
where
    P: PlaybackSurface,
    S: StateStore,
{
    if let Some(status) = controller.status() {
        let marker = match status.tone {
            Tone::Info => "·",
            Tone::Success => "✓",
            Tone::Error => "✗",
        };
        println!("{} {}", marker, status);
    }
}

fn print_queue<P, S>(controller: &QueueController<P, S>)
where
    P: PlaybackSurface,
    S: StateStore,
{
    if controller.queue().is_empty() {
        println!("Queue is empty.");
        return;
    }

    for (index, track) in controller.queue().iter().enumerate() {
        let marker = if controller.current_index() == Some(index) {
            "▶"
        } else {
            " "
        };
        println!("{} {:>3}. {}", marker, index + 1, track.display_title(index));
        println!("        {}", track.page_url);
    }
}

//! Stdin-driven dashboard.
//!
//! Everything funnels into one event channel: input lines from a reader thread,
//! debounced suggestion queries, and finished network requests. Requests run
//! on spawned tasks so typing never waits on the network; stale replies are
//! discarded by the dashboard.

use anyhow::Result;
use forecast_core::{
    Completed, Dashboard, DashboardView, Debouncer, Location, Pending, WeatherSnapshot,
};
use std::{io::BufRead, thread, time::Duration};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::debug;

use crate::terminal;

/// One line typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Free text: look up suggestions once typing pauses.
    Typing(String),
    /// `/QUERY`: search and load the first match.
    Search(String),
    /// `#N`: pick suggestion N (one based).
    Pick(usize),
    Here,
    Refresh,
    Quit,
    Help,
    Empty,
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Input::Empty;
        }
        if let Some(query) = line.strip_prefix('/') {
            return Input::Search(query.trim().to_string());
        }
        if let Some(n) = line.strip_prefix('#').and_then(|n| n.trim().parse().ok()) {
            return Input::Pick(n);
        }
        match line {
            ":here" => Input::Here,
            ":refresh" => Input::Refresh,
            ":quit" | ":q" => Input::Quit,
            ":help" | "?" => Input::Help,
            _ => Input::Typing(line.to_string()),
        }
    }
}

const HELP: &str = "\
Type a place name to see suggestions.
  /QUERY     search and show the first match
  #N         pick suggestion N
  :here      use my location
  :refresh   reload the current location
  :quit      exit";

#[derive(Debug)]
enum Event {
    Line(String),
    InputClosed,
    Suggest(String),
    Suggestions(Completed<Vec<Location>>),
    Weather(Completed<WeatherSnapshot>),
}

pub async fn run(
    mut dash: Dashboard<DashboardView>,
    default_location: Location,
    debounce: Duration,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut debouncer = Debouncer::new(debounce, tx.clone());

    dash.startup(default_location).await;
    print!("{}", terminal::dashboard(dash.display()));
    println!("{HELP}");

    spawn_reader(tx.clone());

    while let Some(event) = rx.recv().await {
        match event {
            Event::Line(line) => match Input::parse(&line) {
                Input::Empty => {}
                Input::Help => println!("{HELP}"),
                Input::Quit => break,
                Input::Typing(text) => debouncer.schedule(Event::Suggest(text)),
                Input::Search(query) => {
                    debouncer.cancel();
                    if dash.resolve_search(&query).await {
                        spawn_load(&mut dash, &tx);
                    } else {
                        print!("{}", terminal::dashboard(dash.display()));
                    }
                }
                Input::Pick(n) => {
                    let picked = n.checked_sub(1).and_then(|i| dash.suggestion(i).cloned());
                    match picked {
                        Some(location) => {
                            dash.choose(location);
                            spawn_load(&mut dash, &tx);
                        }
                        None => println!("No suggestion #{n}."),
                    }
                }
                Input::Here => {
                    if dash.resolve_my_location().await {
                        spawn_load(&mut dash, &tx);
                    } else {
                        print!("{}", terminal::dashboard(dash.display()));
                    }
                }
                Input::Refresh => spawn_load(&mut dash, &tx),
            },
            Event::InputClosed => break,
            Event::Suggest(query) => match dash.begin_suggestions(&query) {
                Some(pending) => spawn(pending, &tx, Event::Suggestions),
                None => debug!("query '{query}' too short for suggestions"),
            },
            Event::Suggestions(done) => {
                dash.finish_suggestions(done);
                print!("{}", terminal::suggestions(dash.display()));
            }
            Event::Weather(done) => {
                dash.finish_load(done);
                print!("{}", terminal::dashboard(dash.display()));
            }
        }
    }

    Ok(())
}

/// Blocking reads live on a plain thread so a pending read never holds up
/// runtime shutdown.
fn spawn_reader(tx: UnboundedSender<Event>) {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(Event::Line(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    debug!("stdin read failed: {e}");
                    break;
                }
            }
        }
        let _ = tx.send(Event::InputClosed);
    });
}

fn spawn_load(dash: &mut Dashboard<DashboardView>, tx: &UnboundedSender<Event>) {
    match dash.begin_load() {
        Some(pending) => spawn(pending, tx, Event::Weather),
        None => print!("{}", terminal::dashboard(dash.display())),
    }
}

fn spawn<T: Send + 'static>(
    pending: Pending<T>,
    tx: &UnboundedSender<Event>,
    wrap: fn(Completed<T>) -> Event,
) {
    let tx = tx.clone();
    tokio::spawn(async move {
        let done = pending.run().await;
        // Receiver gone means we are shutting down.
        let _ = tx.send(wrap(done));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_typing() {
        assert_eq!(Input::parse("  Kath "), Input::Typing("Kath".into()));
    }

    #[test]
    fn slash_searches() {
        assert_eq!(Input::parse("/Pokhara"), Input::Search("Pokhara".into()));
        assert_eq!(Input::parse("/ New York "), Input::Search("New York".into()));
    }

    #[test]
    fn hash_picks_suggestion() {
        assert_eq!(Input::parse("#2"), Input::Pick(2));
        assert_eq!(Input::parse("#two"), Input::Typing("#two".into()));
    }

    #[test]
    fn commands() {
        assert_eq!(Input::parse(":here"), Input::Here);
        assert_eq!(Input::parse(":refresh"), Input::Refresh);
        assert_eq!(Input::parse(":q"), Input::Quit);
        assert_eq!(Input::parse(""), Input::Empty);
    }
}

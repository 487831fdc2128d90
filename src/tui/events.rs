use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::warn;

use crate::api::Character;
use crate::gallery::{FetchOutcome, GalleryResult};

/// Application events
#[derive(Debug)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),

    /// Terminal resize event
    Resize(u16, u16),

    /// Periodic tick event, drives the loading spinner
    Tick,

    /// A background page load finished
    Loaded(GalleryResult<FetchOutcome<Character>>),
}

/// Merges terminal input, load completions and ticks into one stream
pub struct EventHandler {
    /// Terminal input
    terminal: EventStream,

    /// Event receiver channel
    receiver: mpsc::UnboundedReceiver<Event>,

    /// Event sender channel
    sender: mpsc::UnboundedSender<Event>,

    /// Tick timer for periodic events
    ticker: Interval,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut ticker = interval(Duration::from_millis(120));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            terminal: EventStream::new(),
            receiver,
            sender,
            ticker,
        }
    }

    /// Get the next event; `None` once terminal input has ended
    pub async fn next(&mut self) -> Option<Event> {
        loop {
            tokio::select! {
                input = self.terminal.next() => {
                    match input {
                        Some(Ok(event)) => {
                            if let Some(event) = Self::convert_crossterm_event(event) {
                                return Some(event);
                            }
                        }
                        Some(Err(e)) => warn!("terminal input error: {}", e),
                        None => return None,
                    }
                }
                Some(event) = self.receiver.recv() => return Some(event),
                _ = self.ticker.tick() => return Some(Event::Tick),
            }
        }
    }

    /// Convert crossterm events to application events
    fn convert_crossterm_event(event: CrosstermEvent) -> Option<Event> {
        match event {
            // Windows reports releases as well
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
            CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
            _ => None,
        }
    }

    /// Get a clone of the sender
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.sender.clone()
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

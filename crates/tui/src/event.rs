use anyhow::{Context, Result};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, MouseEvent};
use log::{debug, error};
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::store;

/// How often we check for terminal events. This is also how often [`Event::Tick`] is sent.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// An event our app may receive
#[derive(Debug)]
pub enum Event {
    /// Key press.
    Key(KeyEvent),

    /// Mouse click/scroll.
    Mouse(MouseEvent),

    /// Terminal resize.
    Resize(u16, u16),

    /// Nothing happened for a bit. Used to drive timers.
    Tick,

    /// Some data for the store, sent by the store worker.
    Store(store::Event),
}

/// The event bus aggregates events from multiple threads, and joins them all back when dropped.
#[derive(Debug)]
pub struct EventBus {
    sender: mpsc::Sender<Event>,
    receiver: mpsc::Receiver<Event>,
    running: Arc<AtomicBool>,
    handles: RefCell<Vec<thread::JoinHandle<()>>>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(true)),
            handles: Default::default(),
        }
    }

    /// Receive the next event from the handler thread.
    ///
    /// This function will always block the current thread if
    /// there is no data available and it's possible for more data to be sent.
    pub fn next(&self) -> Result<Event> {
        Ok(self.receiver.recv()?)
    }

    /// Spawn a new thread that can publish to this event bus
    pub fn spawn<F>(&self, name: impl ToString, f: F)
    where
        F: 'static + Send + FnOnce(Arc<AtomicBool>, Sender<Event>),
    {
        let name = name.to_string();
        let sender = self.sender.clone();
        let running = self.running.clone();
        match thread::Builder::new()
            .name(name.clone())
            .spawn(move || f(running, sender))
        {
            Ok(h) => self.handles.borrow_mut().push(h),
            Err(e) => error!("error spawning thread {}: {}", name, e),
        }
    }

    /// Spawn a thread to publish terminal events to this bus
    pub fn spawn_terminal_listener(&self) {
        self.spawn("terminal_events", |running, sender| {
            if let Err(e) = Self::terminal_events(running, sender) {
                error!("terminal listener stopped: {:?}", e);
            }
        })
    }

    /// Polls for terminal events and sends them to the given sender, with a tick whenever nothing happens.
    fn terminal_events(running: Arc<AtomicBool>, sender: Sender<Event>) -> Result<()> {
        while running.load(Ordering::Relaxed) {
            let ev = if event::poll(POLL_INTERVAL).context("unable to poll for events")? {
                match event::read().context("unable to read event")? {
                    CrosstermEvent::Key(e) => Event::Key(e),
                    CrosstermEvent::Mouse(e) => Event::Mouse(e),
                    CrosstermEvent::Resize(w, h) => Event::Resize(w, h),
                    _ => continue,
                }
            } else {
                Event::Tick
            };

            if sender.send(ev).is_err() {
                // receiver is gone, so we're shutting down
                break;
            }
        }

        Ok(())
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        self.handles.borrow_mut().drain(..).for_each(|h| {
            debug!("joining thread {:?}", h.thread().name());
            if h.join().is_err() {
                error!("thread panicked");
            }
        });
    }
}

use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};

/// Everything that can move a round forward: a keypress, a terminal
/// resize, or the clock.
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Spawns the two producer threads the TUI loop consumes: one reading
/// crossterm events, and (when `should_tick` is set) one emitting a
/// `Tick` every `tick_every`. Both stop once the receiver is dropped.
pub fn game_events(should_tick: bool, tick_every: Duration) -> Receiver<GameEvent> {
    let (tx, rx) = mpsc::channel();

    if should_tick {
        let tick_tx = tx.clone();
        thread::spawn(move || loop {
            if tick_tx.send(GameEvent::Tick).is_err() {
                break;
            }
            thread::sleep(tick_every);
        });
    }

    thread::spawn(move || loop {
        let forwarded = match event::read() {
            Ok(Event::Key(key)) => tx.send(GameEvent::Key(key)),
            Ok(Event::Resize(_, _)) => tx.send(GameEvent::Resize),
            Ok(_) => Ok(()),
            Err(_) => break,
        };
        if forwarded.is_err() {
            break;
        }
    });

    rx
}

/// Where a headless runner gets its input from. Production code goes
/// through [`game_events`] instead; this seam exists so integration
/// tests can script a session without a terminal.
pub trait EventSource {
    /// Waits up to `wait` for the next event; `None` means the source
    /// stayed quiet.
    fn poll(&self, wait: Duration) -> Option<GameEvent>;
}

/// Scripted event source fed from a plain channel.
pub struct TestEventSource {
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn poll(&self, wait: Duration) -> Option<GameEvent> {
        self.rx.recv_timeout(wait).ok()
    }
}

/// Drives a session one event at a time: whenever the source has
/// nothing to say for a whole tick interval, the clock speaks instead.
pub struct Runner<S: EventSource> {
    source: S,
    tick_every: Duration,
}

impl<S: EventSource> Runner<S> {
    pub fn new(source: S, tick_every: Duration) -> Self {
        Self { source, tick_every }
    }

    pub fn step(&self) -> GameEvent {
        self.source
            .poll(self.tick_every)
            .unwrap_or(GameEvent::Tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn quiet_source_produces_ticks() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(1));

        assert!(matches!(runner.step(), GameEvent::Tick));
        assert!(matches!(runner.step(), GameEvent::Tick));
    }

    #[test]
    fn queued_events_come_out_before_any_tick() {
        let (tx, rx) = mpsc::channel();
        tx.send(GameEvent::Resize).unwrap();
        tx.send(GameEvent::Key(KeyEvent::new(
            KeyCode::Char('a'),
            KeyModifiers::NONE,
        )))
        .unwrap();
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(20));

        assert!(matches!(runner.step(), GameEvent::Resize));
        match runner.step() {
            GameEvent::Key(key) => assert_eq!(key.code, KeyCode::Char('a')),
            other => panic!("expected the queued key, got {:?}", other),
        }
        assert!(matches!(runner.step(), GameEvent::Tick));
    }

    #[test]
    fn disconnected_source_degrades_to_ticks() {
        let (tx, rx) = mpsc::channel::<GameEvent>();
        drop(tx);
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(1));

        assert!(matches!(runner.step(), GameEvent::Tick));
    }
}

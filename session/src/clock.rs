use std::{
    io,
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::StageHandle;

/// Start/stop gate for the round clock.
pub trait RoundClock {
    /// Starts counting down.
    fn resume(&mut self);

    /// Stops counting down.
    fn pause(&mut self);
}

#[derive(Debug)]
enum ClockCommand {
    Resume,
    Pause,
    Shutdown,
}

/// Round clock that takes one second off the stage per `interval` of real
/// time while resumed.
pub struct IntervalClock {
    tx: mpsc::Sender<ClockCommand>,
    handle: Option<thread::JoinHandle<()>>,
}

impl IntervalClock {
    /// Spawns the clock thread in the paused state.
    pub fn spawn(stage: StageHandle, interval: Duration) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<ClockCommand>();
        let handle = thread::Builder::new()
            .name("round-clock".into())
            .spawn(move || run(&stage, interval, &rx))?;
        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    fn send(&self, command: ClockCommand) {
        if self.tx.send(command).is_err() {
            warn!("round clock thread is gone");
        }
    }
}

impl RoundClock for IntervalClock {
    fn resume(&mut self) {
        self.send(ClockCommand::Resume);
    }

    fn pause(&mut self) {
        self.send(ClockCommand::Pause);
    }
}

impl Drop for IntervalClock {
    fn drop(&mut self) {
        let _ = self.tx.send(ClockCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.join() {
                warn!(?err, "round clock thread panicked");
            }
        }
    }
}

fn run(stage: &StageHandle, interval: Duration, rx: &mpsc::Receiver<ClockCommand>) {
    let mut deadline: Option<Instant> = None;
    loop {
        let command = match deadline {
            None => match rx.recv() {
                Ok(command) => command,
                Err(_) => break,
            },
            Some(at) => match rx.recv_timeout(at.saturating_duration_since(Instant::now())) {
                Ok(command) => command,
                Err(RecvTimeoutError::Timeout) => {
                    if let Err(err) = stage.lock().elapse_second() {
                        warn!(%err, "failed to draw the round clock");
                    }
                    deadline = Some(at + interval);
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            },
        };
        match command {
            ClockCommand::Resume => {
                if deadline.is_none() {
                    deadline = Some(Instant::now() + interval);
                }
            }
            ClockCommand::Pause => deadline = None,
            ClockCommand::Shutdown => break,
        }
    }
    debug!("round clock stopped");
}

/// Clock driven by hand, for tests and non-interactive runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ManualClock {
    running: bool,
    resumes: u32,
}

impl ManualClock {
    /// Whether the clock is currently resumed.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Number of pause-to-running transitions.
    #[must_use]
    pub const fn resumes(&self) -> u32 {
        self.resumes
    }
}

impl RoundClock for ManualClock {
    fn resume(&mut self) {
        if !self.running {
            self.resumes += 1;
        }
        self.running = true;
    }

    fn pause(&mut self) {
        self.running = false;
    }
}

use crate::gateway::{Candidate, GatewayError};
use crate::shared::EventLog;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(200);

/// Lookup callback bound to a wizard step.
pub trait CandidateSource: Send + Sync {
    fn lookup(&self, term: &str) -> Result<Vec<Candidate>, GatewayError>;
}

/// Quiescence window plus "same as last dispatch" suppression, driven by an external clock.
///
/// Blank input normalizes to `None` and dispatches like any other value.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    pending: Option<(Option<String>, Instant)>,
    last_dispatched: Option<Option<String>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            last_dispatched: None,
        }
    }

    pub fn push(&mut self, input: Option<&str>, now: Instant) {
        let input = input
            .filter(|value| !value.trim().is_empty())
            .map(str::to_string);
        self.pending = Some((input, now));
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.window)
    }

    /// Returns the value to dispatch once the window has elapsed without newer input.
    pub fn poll(&mut self, now: Instant) -> Option<Option<String>> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }
        let (value, _) = self.pending.take()?;
        if self.last_dispatched.as_ref() == Some(&value) {
            return None;
        }
        self.last_dispatched = Some(value.clone());
        Some(value)
    }

    /// Forgets pending input and the last dispatch; the next value always goes out.
    pub fn retarget(&mut self) {
        self.pending = None;
        self.last_dispatched = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBatch {
    pub generation: u64,
    /// Retarget epoch the lookup was dispatched under.
    pub epoch: u64,
    pub term: Option<String>,
    pub candidates: Vec<Candidate>,
    /// Set when the lookup failed; the batch is then empty.
    pub error: Option<String>,
}

enum SearchCommand {
    Input(Option<String>),
    Retarget(u64, Option<Arc<dyn CandidateSource>>),
    Shutdown,
}

/// Debounced, latest-wins search over the lookup of the active step.
///
/// Every dispatch or retarget bumps the generation; batches from older
/// generations or from a previous target are dropped when they arrive.
/// Dropping the channel stops the dispatcher and joins it; lookups still in
/// flight finish on their own threads and their results go nowhere.
pub struct SearchChannel {
    commands: Sender<SearchCommand>,
    results: Receiver<SearchBatch>,
    latest: Arc<AtomicU64>,
    epoch: AtomicU64,
    worker: Option<JoinHandle<()>>,
}

impl SearchChannel {
    pub fn spawn(window: Duration, log: EventLog) -> Self {
        let (commands, command_rx) = mpsc::channel();
        let (result_tx, results) = mpsc::channel();
        let latest = Arc::new(AtomicU64::new(0));
        let worker_latest = Arc::clone(&latest);
        let worker = thread::spawn(move || {
            run_dispatcher(command_rx, result_tx, worker_latest, window, log);
        });
        Self {
            commands,
            results,
            latest,
            epoch: AtomicU64::new(0),
            worker: Some(worker),
        }
    }

    pub fn push(&self, input: Option<&str>) {
        let _ = self
            .commands
            .send(SearchCommand::Input(input.map(str::to_string)));
    }

    /// Routes future dispatches to `source`, discarding pending input and in-flight results.
    pub fn retarget(&self, source: Option<Arc<dyn CandidateSource>>) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.commands.send(SearchCommand::Retarget(epoch, source));
    }

    /// Newest current batch already delivered, without blocking.
    pub fn try_next(&self) -> Option<SearchBatch> {
        let mut newest = None;
        while let Ok(batch) = self.results.try_recv() {
            if self.is_current(&batch) {
                newest = Some(batch);
            }
        }
        newest
    }

    /// Waits up to `timeout` for a current batch.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<SearchBatch> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results.recv_timeout(remaining) {
                Ok(batch) if self.is_current(&batch) => return Some(batch),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }

    fn is_current(&self, batch: &SearchBatch) -> bool {
        batch.epoch == self.epoch.load(Ordering::SeqCst)
            && batch.generation == self.latest.load(Ordering::SeqCst)
    }

    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.commands.send(SearchCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for SearchChannel {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_dispatcher(
    commands: Receiver<SearchCommand>,
    results: Sender<SearchBatch>,
    latest: Arc<AtomicU64>,
    window: Duration,
    log: EventLog,
) {
    let mut debouncer = Debouncer::new(window);
    let mut target: Option<Arc<dyn CandidateSource>> = None;
    let mut epoch = 0;

    loop {
        let received = match debouncer.deadline() {
            Some(deadline) => {
                match commands.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match commands.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            },
        };

        match received {
            Some(SearchCommand::Input(input)) => debouncer.push(input.as_deref(), Instant::now()),
            Some(SearchCommand::Retarget(next_epoch, source)) => {
                debouncer.retarget();
                target = source;
                epoch = next_epoch;
                latest.fetch_add(1, Ordering::SeqCst);
            }
            Some(SearchCommand::Shutdown) => break,
            None => {}
        }

        if let Some(term) = debouncer.poll(Instant::now()) {
            let generation = latest.fetch_add(1, Ordering::SeqCst) + 1;
            dispatch(term, generation, epoch, target.clone(), results.clone(), &log);
        }
    }
}

fn dispatch(
    term: Option<String>,
    generation: u64,
    epoch: u64,
    target: Option<Arc<dyn CandidateSource>>,
    results: Sender<SearchBatch>,
    log: &EventLog,
) {
    let (Some(term), Some(source)) = (term.clone(), target) else {
        let _ = results.send(SearchBatch {
            generation,
            epoch,
            term,
            candidates: Vec::new(),
            error: None,
        });
        return;
    };

    log.info(
        "search.dispatch",
        &format!("generation={generation} term={term}"),
    );
    let log = log.clone();
    thread::spawn(move || {
        let batch = match source.lookup(&term) {
            Ok(candidates) => SearchBatch {
                generation,
                epoch,
                term: Some(term),
                candidates,
                error: None,
            },
            Err(err) => {
                log.warn(
                    "search.lookup_failed",
                    &format!("generation={generation} term={term} error={err}"),
                );
                SearchBatch {
                    generation,
                    epoch,
                    term: Some(term),
                    candidates: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
        };
        let _ = results.send(batch);
    });
}

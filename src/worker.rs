//! Background tokenization.
//!
//! A [`Worker`] owns a single thread that tokenizes snapshots handed to it one at a
//! time. Jobs and results travel over bounded channels of capacity `1`, and at most
//! one job is ever in flight, so neither side blocks on a send.

use crate::error::{Error, Result};
use crate::syntax::{Library, Mode};
use crate::token::{Tokenizer, Tokens};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A snapshot of a document to be tokenized.
pub struct Job {
    pub revision: u64,
    pub mode: Mode,
    pub text: String,
}

/// The tokens of a snapshot taken at `revision`.
pub struct Done {
    pub revision: u64,
    pub tokens: Tokens,
}

pub struct Worker {
    job_tx: Option<SyncSender<Job>>,
    done_rx: Receiver<Done>,
    busy: bool,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn(library: Arc<Library>, budget: Option<Duration>) -> Result<Worker> {
        let (job_tx, job_rx) = mpsc::sync_channel::<Job>(1);
        let (done_tx, done_rx) = mpsc::sync_channel::<Done>(1);
        let thread = thread::Builder::new()
            .name("tint-worker".to_string())
            .spawn(move || {
                while let Ok(job) = job_rx.recv() {
                    let tokens = Tokenizer::new(library.find(job.mode))
                        .with_budget(budget)
                        .tokenize(&job.text);
                    tracing::debug!(
                        revision = job.revision,
                        markers = tokens.markers().len(),
                        "tokenized in background"
                    );
                    let done = Done {
                        revision: job.revision,
                        tokens,
                    };
                    if done_tx.send(done).is_err() {
                        break;
                    }
                }
            })
            .map_err(Error::os)?;

        Ok(Worker {
            job_tx: Some(job_tx),
            done_rx,
            busy: false,
            thread: Some(thread),
        })
    }

    /// Returns `true` if a job has been submitted whose result has not yet been
    /// received.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Submits `job` unless another job is in flight, returning `true` if the job
    /// was accepted.
    pub fn submit(&mut self, job: Job) -> bool {
        if self.busy {
            return false;
        }
        let Some(job_tx) = &self.job_tx else {
            return false;
        };
        match job_tx.try_send(job) {
            Ok(()) => {
                self.busy = true;
                true
            }
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!("background worker terminated");
                false
            }
        }
    }

    /// Returns the result of the job in flight if it has completed.
    pub fn poll(&mut self) -> Option<Done> {
        if !self.busy {
            return None;
        }
        match self.done_rx.try_recv() {
            Ok(done) => {
                self.busy = false;
                Some(done)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                tracing::error!("background worker terminated");
                self.busy = false;
                None
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Closing the job channel ends the receive loop of the worker thread.
        self.job_tx.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("background worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;
    use std::time::Instant;

    fn wait(worker: &mut Worker) -> Done {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(done) = worker.poll() {
                return done;
            }
            assert!(Instant::now() < deadline, "worker did not respond");
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn job(revision: u64, text: &str) -> Job {
        Job {
            revision,
            mode: Mode::Code,
            text: text.to_string(),
        }
    }

    #[test]
    fn tokenize_job() {
        let library = Arc::new(Library::new().unwrap());
        let mut worker = Worker::spawn(library, None).unwrap();
        assert!(!worker.is_busy());
        assert!(worker.poll().is_none());

        assert!(worker.submit(job(7, "# note")));
        let done = wait(&mut worker);
        assert_eq!(done.revision, 7);
        assert_eq!(done.tokens.markers()[0].class, Class::Comment);
        assert!(!worker.is_busy());
    }

    #[test]
    fn single_flight() {
        let library = Arc::new(Library::new().unwrap());
        let mut worker = Worker::spawn(library, None).unwrap();
        assert!(worker.submit(job(1, "x = 1")));
        assert!(worker.is_busy());
        assert!(!worker.submit(job(2, "x = 2")));

        assert_eq!(wait(&mut worker).revision, 1);
        assert!(worker.submit(job(3, "x = 3")));
        assert_eq!(wait(&mut worker).revision, 3);
    }

    #[test]
    fn drop_while_busy() {
        let library = Arc::new(Library::new().unwrap());
        let mut worker = Worker::spawn(library, None).unwrap();
        assert!(worker.submit(job(1, &"y = 2\n".repeat(1000))));
        drop(worker);
    }
}

//! Running a verification on a tokio blocking worker.
//!
//! The worker owns the run. The handle can only raise the cancel flag and
//! send queries, which the worker answers between search steps.

use super::*;
use chrono::Utc;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

enum Query<S> {
    Path(oneshot::Sender<Vec<ProductState<S>>>),
    Stats(oneshot::Sender<ExplorationStats>),
}

impl<S> Query<S> {
    fn answer<P, E>(self, explorer: &Explorer<P, E>)
    where
        P: ProgramAutomaton<State = S>,
        E: Evaluator<S>,
    {
        // the asking side may have given up already
        match self {
            Query::Path(reply) => {
                let _ = reply.send(explorer.first_search_path());
            }
            Query::Stats(reply) => {
                let _ = reply.send(explorer.stats());
            }
        }
    }
}

fn panic_message(cause: &(dyn Any + Send)) -> String {
    if let Some(s) = cause.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = cause.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown cause".to_string()
    }
}

pub struct RunHandle<S> {
    cancel: Arc<AtomicBool>,
    queries: mpsc::UnboundedSender<Query<S>>,
    worker: JoinHandle<RunReport<S>>,
}

impl<P, E> Verification<P, E>
where
    P: ProgramAutomaton + Send + 'static,
    P::State: Send + 'static,
    E: Evaluator<P::State> + Send + 'static,
{
    /// Move the run to a blocking worker. `listener` is called exactly once,
    /// with the final report, after the program has been released. A panic
    /// in the search ends the run with an `Outcome::Error`.
    /// Must be called from within a tokio runtime.
    pub fn start<L>(mut self, listener: L) -> RunHandle<P::State>
    where
        L: FnOnce(&RunReport<P::State>) + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let (tx_queries, mut rx_queries) = mpsc::unbounded_channel::<Query<P::State>>();

        let flag = cancel.clone();
        let worker = tokio::task::spawn_blocking(move || {
            let started = Utc::now();
            let run = panic::catch_unwind(AssertUnwindSafe(|| {
                self.run_with(|explorer| {
                    while let Ok(query) = rx_queries.try_recv() {
                        query.answer(explorer);
                    }
                    !flag.load(Ordering::SeqCst)
                })
            }));
            let report = match run {
                Ok(report) => report,
                Err(cause) => self.aborted(started, &panic_message(cause.as_ref())),
            };

            // queries that raced the end of the run see the final state
            rx_queries.close();
            while let Ok(query) = rx_queries.try_recv() {
                query.answer(self.explorer());
            }

            listener(&report);
            report
        });

        RunHandle {
            cancel,
            queries: tx_queries,
            worker,
        }
    }
}

impl<S> RunHandle<S> {
    /// Stop the run at its next search step. The worker then releases the
    /// program and reports `Outcome::Cancelled`. Later calls do nothing.
    pub fn dispose(&self) {
        if !self.cancel.swap(true, Ordering::SeqCst) {
            log_info!("cancelling run");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// The first search path as the worker sees it now, `None` once the
    /// run is over.
    pub async fn search_path(&self) -> Option<Vec<ProductState<S>>> {
        let (tx, rx) = oneshot::channel();
        self.queries.send(Query::Path(tx)).ok()?;
        rx.await.ok()
    }

    /// Automaton sizes and search counters so far, `None` once the run is
    /// over.
    pub async fn stats(&self) -> Option<ExplorationStats> {
        let (tx, rx) = oneshot::channel();
        self.queries.send(Query::Stats(tx)).ok()?;
        rx.await.ok()
    }

    pub async fn wait(self) -> MCResult<RunReport<S>> {
        self.worker.await.map_err(MCError::from_any)
    }
}

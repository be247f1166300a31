use std::sync::Arc;

use log::*;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use super::QueueClosed;
use crate::db_types::OrderNumber;

pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// A request to reconcile one order with the accrual service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub order_number: OrderNumber,
}

impl Job {
    pub fn new(order_number: OrderNumber) -> Self {
        Self { order_number }
    }
}

/// Bounded multi-producer, multi-consumer job queue.
///
/// Producers wait when the queue is full. Consumers share a single receiver, so each job is handed to exactly one
/// worker. After [`JobQueue::shutdown`], pushes fail, and consumers receive whatever is still buffered followed by
/// `None`.
#[derive(Clone)]
pub struct JobQueue {
    sender: mpsc::Sender<Job>,
    receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
    shutdown: CancellationToken,
    capacity: usize,
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JobQueue (capacity: {}, closed: {})", self.capacity, self.is_closed())
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl JobQueue {
    /// Creates a queue that holds at most `capacity` jobs. A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        Self { sender, receiver: Arc::new(Mutex::new(receiver)), shutdown: CancellationToken::new(), capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of jobs currently waiting in the queue.
    pub fn len(&self) -> usize {
        self.capacity - self.sender.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Adds a job to the queue, waiting for a free slot if the queue is full.
    pub async fn push(&self, job: Job) -> Result<(), QueueClosed> {
        if self.is_closed() {
            return Err(QueueClosed);
        }
        let number = job.order_number.clone();
        tokio::select! {
            result = self.sender.send(job) => result.map_err(|_| QueueClosed)?,
            _ = self.shutdown.cancelled() => return Err(QueueClosed),
        }
        trace!("📬️ Order [{number}] queued for reconciliation");
        Ok(())
    }

    /// Takes the next job off the queue, waiting for one to arrive.
    ///
    /// Returns `None` once the queue has been shut down and every buffered job has been handed out.
    pub async fn next(&self) -> Option<Job> {
        let mut receiver = self.receiver.lock().await;
        tokio::select! {
            biased;
            job = receiver.recv() => job,
            _ = self.shutdown.cancelled() => {
                receiver.close();
                receiver.recv().await
            },
        }
    }

    /// Stops accepting jobs. Workers drain what is left, then stop.
    pub fn shutdown(&self) {
        if !self.is_closed() {
            info!("📬️ Job queue is shutting down. {} job(s) left to drain", self.len());
        }
        self.shutdown.cancel();
    }
}

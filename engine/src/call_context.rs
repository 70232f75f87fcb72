//! Deadline and cancellation for outbound calls.
//!
//! Each inbound request builds one [`CallContext`] and keeps the paired
//! [`CancelHandle`] alive while it runs. Dropping the handle (for example
//! when the client disconnects and axum drops the handler future) cancels
//! every call still bound to the context.

use crate::error::ServiceError;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{timeout_at, Instant};

#[derive(Debug, Clone)]
pub struct CallContext {
    deadline: Instant,
    cancelled: watch::Receiver<bool>,
}

#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl CallContext {
    pub fn new(timeout: Duration) -> (Self, CancelHandle) {
        let (sender, cancelled) = watch::channel(false);
        let context = Self {
            deadline: Instant::now() + timeout,
            cancelled,
        };
        (context, CancelHandle { sender })
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Runs an outbound call, bounded by the deadline and the cancel signal.
    pub async fn run<F, T>(&self, call: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, ServiceError>>,
    {
        if self.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }

        let mut cancelled = self.cancelled.clone();
        tokio::select! {
            outcome = timeout_at(self.deadline, call) => match outcome {
                Ok(result) => result,
                Err(_) => {
                    log::warn!("Outbound call exceeded its deadline");
                    Err(ServiceError::DeadlineExceeded)
                }
            },
            _ = wait_for_cancel(&mut cancelled) => {
                log::info!("Outbound call cancelled");
                Err(ServiceError::Cancelled)
            }
        }
    }
}

async fn wait_for_cancel(cancelled: &mut watch::Receiver<bool>) {
    loop {
        if *cancelled.borrow_and_update() {
            return;
        }
        // Sender gone means the handle was dropped.
        if cancelled.changed().await.is_err() {
            return;
        }
    }
}

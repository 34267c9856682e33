//! Async driver for the executor
// (c) 2026 the xfer-engine developers

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::debug;

use super::{Executor, Transport};
use crate::protocol::command::Command;
use crate::protocol::data::DataChannel;
use crate::protocol::reply::Reply;

/// A [`Transport`] whose outstanding I/O can be awaited
#[async_trait]
pub trait AsyncTransport: Transport {
    /// Waits until the outstanding I/O has finished.
    ///
    /// If a transfer is running, `data` is its local end; the transport reads upload data from
    /// it or writes download data to it. When this returns, [`Transport::result`] must hold the
    /// outcome.
    async fn wait_for_completion(&mut self, data: Option<&mut DataChannel>);
}

/// Drives commands to completion over an [`AsyncTransport`]
#[derive(Debug)]
pub struct Session<T: AsyncTransport> {
    executor: Executor<T>,
    cancel: Option<watch::Receiver<bool>>,
}

impl<T: AsyncTransport> Session<T> {
    /// Constructor
    pub fn new(executor: Executor<T>) -> Self {
        Self {
            executor,
            cancel: None,
        }
    }

    /// Builder-style: cancel the running command whenever `signal` becomes true.
    ///
    /// The signal stays raised until its sender lowers it, so every command started while it is
    /// raised is canceled at its first wait.
    #[must_use]
    pub fn with_cancel(mut self, signal: watch::Receiver<bool>) -> Self {
        self.cancel = Some(signal);
        self
    }

    /// Accessor
    pub fn executor(&self) -> &Executor<T> {
        &self.executor
    }

    /// Mutable accessor
    pub fn executor_mut(&mut self) -> &mut Executor<T> {
        &mut self.executor
    }

    /// Executes a command, returning its terminal reply
    pub async fn run(&mut self, command: Command) -> Reply {
        let mut reply = self.executor.execute(command);
        while reply == Reply::WOULDBLOCK {
            let was_cancelled = {
                let (transport, data) = self.executor.wait_parts();
                let completion = transport.wait_for_completion(data);
                match self.cancel.as_mut() {
                    // A raised signal wins over I/O that is ready at the same poll
                    Some(signal) => tokio::select! {
                        biased;
                        () = cancelled(signal) => true,
                        () = completion => false,
                    },
                    None => {
                        completion.await;
                        false
                    }
                }
            };
            reply = if was_cancelled {
                debug!("cancellation requested");
                self.executor.cancel()
            } else {
                self.executor.response_received()
            };
        }
        reply
    }
}

/// Resolves when the signal is raised. Never resolves if the sender has gone.
async fn cancelled(signal: &mut watch::Receiver<bool>) {
    if signal.wait_for(|raised| *raised).await.is_err() {
        std::future::pending::<()>().await;
    }
}

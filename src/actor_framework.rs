//! Virtual actor hosting.
//!
//! An actor instance is addressed by `(actor type, id)` and activated on first
//! use. Each activation owns a mailbox and runs in its own Tokio task, handling
//! one request at a time, so actor state needs no locking. Different
//! activations run in parallel.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::clients::{KeyHashClient, KeyValueClient, RoleActorClient, UserActorClient};
use crate::keys::ActorAddress;

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// Behaviour of one actor type.
///
/// `handle` is never called concurrently for the same activation.
#[async_trait]
pub trait VirtualActor: Send + 'static {
    type Request: Send + Debug + 'static;

    async fn handle(&mut self, request: Self::Request);
}

/// Builds clients for actor instances.
///
/// Stores and index services receive this explicitly instead of reaching for
/// a process-wide locator.
pub trait ActorProxyFactory: Send + Sync + 'static {
    fn user_actor(&self, user_id: &str) -> UserActorClient;

    fn role_actor(&self, role_id: &str) -> RoleActorClient;

    fn key_value_actor(&self, address: ActorAddress) -> KeyValueClient;

    fn key_hash_actor(&self, address: ActorAddress) -> KeyHashClient;
}

/// A mailbox nobody reads: every send fails.
pub fn closed_mailbox<R>() -> mpsc::Sender<R> {
    let (sender, _) = mpsc::channel(1);
    sender
}

// =============================================================================
// 2. THE DIRECTORY OF ACTIVATIONS
// =============================================================================

/// Live activations of one actor implementation, keyed by address.
pub struct ActorDirectory<A: VirtualActor> {
    buffer_size: usize,
    mailboxes: Mutex<HashMap<ActorAddress, mpsc::Sender<A::Request>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl<A: VirtualActor> ActorDirectory<A> {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
            mailboxes: Mutex::new(HashMap::new()),
            handles: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Returns the mailbox of `address`, activating the actor with `activate`
    /// when it is not running.
    ///
    /// Once the directory is closed the returned mailbox is already closed, so
    /// sends fail instead of reviving actors during shutdown.
    pub fn mailbox(&self, address: &ActorAddress, activate: impl FnOnce() -> A) -> mpsc::Sender<A::Request> {
        if self.closed.load(Ordering::SeqCst) {
            return closed_mailbox();
        }

        let mut mailboxes = self.mailboxes.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(sender) = mailboxes.get(address) {
            if !sender.is_closed() {
                return sender.clone();
            }
        }

        let (sender, receiver) = mpsc::channel(self.buffer_size);
        let handle = tokio::spawn(run(address.clone(), activate(), receiver));
        mailboxes.insert(address.clone(), sender.clone());

        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
        sender
    }

    /// Forgets the activation of `address`.
    ///
    /// The task stops once in-flight clients are dropped; the next call
    /// activates a fresh instance that reloads its state from the store.
    pub fn deactivate(&self, address: &ActorAddress) -> bool {
        self.mailboxes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(address)
            .is_some()
    }

    pub fn active_count(&self) -> usize {
        self.mailboxes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|sender| !sender.is_closed())
            .count()
    }

    /// Closes every mailbox and waits for the actor tasks to finish.
    pub async fn shutdown(&self) -> Result<(), String> {
        self.closed.store(true, Ordering::SeqCst);
        self.mailboxes.lock().unwrap_or_else(PoisonError::into_inner).clear();
        let handles = std::mem::take(&mut *self.handles.lock().unwrap_or_else(PoisonError::into_inner));
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = ?e, "Actor task failed");
                return Err(format!("Actor task failed: {e:?}"));
            }
        }
        Ok(())
    }
}

// =============================================================================
// 3. THE RUN LOOP
// =============================================================================

#[instrument(name = "actor", skip(actor, receiver), fields(actor = %address))]
async fn run<A: VirtualActor>(address: ActorAddress, mut actor: A, mut receiver: mpsc::Receiver<A::Request>) {
    debug!("Actor activated");
    while let Some(request) = receiver.recv().await {
        actor.handle(request).await;
    }
    debug!("Actor deactivated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[derive(Debug)]
    enum CounterRequest {
        Increment { respond_to: oneshot::Sender<u64> },
    }

    struct Counter {
        value: u64,
    }

    #[async_trait]
    impl VirtualActor for Counter {
        type Request = CounterRequest;

        async fn handle(&mut self, request: CounterRequest) {
            match request {
                CounterRequest::Increment { respond_to } => {
                    self.value += 1;
                    let _ = respond_to.send(self.value);
                }
            }
        }
    }

    async fn increment(sender: &mpsc::Sender<CounterRequest>) -> u64 {
        let (respond_to, response) = oneshot::channel();
        sender.send(CounterRequest::Increment { respond_to }).await.unwrap();
        response.await.unwrap()
    }

    #[tokio::test]
    async fn test_activation_is_reused_per_address() {
        let directory = ActorDirectory::<Counter>::new(8);
        let a = ActorAddress::new("Counter", "a");
        let b = ActorAddress::new("Counter", "b");

        let first = directory.mailbox(&a, || Counter { value: 0 });
        assert_eq!(increment(&first).await, 1);
        let again = directory.mailbox(&a, || Counter { value: 100 });
        assert_eq!(increment(&again).await, 2);

        let other = directory.mailbox(&b, || Counter { value: 10 });
        assert_eq!(increment(&other).await, 11);
        assert_eq!(directory.active_count(), 2);
    }

    #[tokio::test]
    async fn test_deactivate_starts_fresh_instance() {
        let directory = ActorDirectory::<Counter>::new(8);
        let a = ActorAddress::new("Counter", "a");
        let first = directory.mailbox(&a, || Counter { value: 0 });
        assert_eq!(increment(&first).await, 1);
        drop(first);

        assert!(directory.deactivate(&a));
        let fresh = directory.mailbox(&a, || Counter { value: 0 });
        assert_eq!(increment(&fresh).await, 1);
    }

    #[tokio::test]
    async fn test_shutdown_closes_mailboxes() {
        let directory = ActorDirectory::<Counter>::new(8);
        let a = ActorAddress::new("Counter", "a");
        drop(directory.mailbox(&a, || Counter { value: 0 }));

        directory.shutdown().await.unwrap();
        let after = directory.mailbox(&a, || Counter { value: 0 });
        let (respond_to, _response) = oneshot::channel();
        assert!(after.send(CounterRequest::Increment { respond_to }).await.is_err());
    }
}

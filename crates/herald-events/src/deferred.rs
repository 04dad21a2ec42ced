//! Completion handles for `wait_once` and `few`.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::{EventError, EventResult};
use crate::listener::{Arguments, Listener};

/// A value delivered by a one-shot or N-shot subscription.
///
/// Resolves once the subscription has seen enough invocations. If the
/// subscription is removed first (for example by
/// [`Emitter::remove_all_listeners`](crate::Emitter::remove_all_listeners)),
/// it resolves to [`EventError::Abandoned`].
#[derive(Debug)]
#[must_use = "a deferred does nothing unless awaited"]
pub struct Deferred<T> {
    event: String,
    receiver: oneshot::Receiver<T>,
}

impl<T> Deferred<T> {
    /// Name of the event the subscription listens to.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }
}

impl<T> Future for Deferred<T> {
    type Output = EventResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.receiver).poll(cx).map(|result| {
            result.map_err(|_| EventError::Abandoned {
                event: this.event.clone(),
            })
        })
    }
}

/// Listener that resolves with the arguments of its first invocation.
pub(crate) fn first_arguments(event: &str) -> (Listener, Deferred<Arguments>) {
    let (sender, receiver) = oneshot::channel();
    let sender = Mutex::new(Some(sender));

    let listener = Listener::new(move |inv| {
        let sender = sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(sender) = sender {
            // The caller may have dropped the deferred; nothing to report.
            let _ = sender.send(inv.args().clone());
        }
    });

    let deferred = Deferred {
        event: event.to_string(),
        receiver,
    };
    (listener, deferred)
}

/// Listener that resolves once it has collected `count` argument lists.
pub(crate) fn collected_arguments(event: &str, count: u32) -> (Listener, Deferred<Vec<Arguments>>) {
    struct Collector {
        seen: Vec<Arguments>,
        sender: Option<oneshot::Sender<Vec<Arguments>>>,
    }

    let (sender, receiver) = oneshot::channel();
    let expected = usize::try_from(count).unwrap_or(usize::MAX);
    let collector = Mutex::new(Collector {
        seen: Vec::with_capacity(expected.min(64)),
        sender: Some(sender),
    });

    let listener = Listener::new(move |inv| {
        let mut collector = collector.lock().unwrap_or_else(PoisonError::into_inner);
        if collector.sender.is_none() {
            return;
        }
        collector.seen.push(inv.args().clone());
        if collector.seen.len() >= expected
            && let Some(sender) = collector.sender.take()
        {
            let seen = std::mem::take(&mut collector.seen);
            let _ = sender.send(seen);
        }
    });

    let deferred = Deferred {
        event: event.to_string(),
        receiver,
    };
    (listener, deferred)
}

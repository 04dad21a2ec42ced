//! Listener callables and the arguments they receive.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::ops::Index;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

use crate::error::ListenerError;

/// Value bound to a listener at subscription time.
pub type Context = Arc<dyn Any + Send + Sync>;

/// Future returned by an asynchronous listener.
pub type ListenerFuture = BoxFuture<'static, Result<Value, ListenerError>>;

/// What a listener produced for one invocation.
pub enum Outcome {
    /// The listener finished synchronously.
    Ready(Result<Value, ListenerError>),
    /// The listener returned a future that has not been awaited yet.
    Pending(ListenerFuture),
}

impl Outcome {
    /// Turn the outcome into a future, ready or not.
    #[must_use]
    pub fn into_future(self) -> ListenerFuture {
        match self {
            Self::Ready(result) => futures::future::ready(result).boxed(),
            Self::Pending(future) => future,
        }
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// Conversion from a synchronous listener's return value.
pub trait IntoOutcome {
    /// Convert into an [`Outcome`].
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for Outcome {
    fn into_outcome(self) -> Outcome {
        self
    }
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Outcome {
        Outcome::Ready(Ok(Value::Null))
    }
}

impl IntoOutcome for Value {
    fn into_outcome(self) -> Outcome {
        Outcome::Ready(Ok(self))
    }
}

impl IntoOutcome for anyhow::Result<()> {
    fn into_outcome(self) -> Outcome {
        Outcome::Ready(self.map(|()| Value::Null).map_err(ListenerError::from))
    }
}

impl IntoOutcome for anyhow::Result<Value> {
    fn into_outcome(self) -> Outcome {
        Outcome::Ready(self.map_err(ListenerError::from))
    }
}

/// Positional arguments delivered to a listener.
///
/// Without `spread` there is one argument, the update data. With `spread`
/// each element of an array payload becomes its own argument. When `tags`
/// is in effect the update's tag map is appended last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Vec<Arc<Value>>);

impl Arguments {
    pub(crate) fn from_shared(values: Vec<Arc<Value>>) -> Self {
        Self(values)
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Argument at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index).map(AsRef::as_ref)
    }

    /// Shared handle to the argument at `index`.
    ///
    /// Listeners that did not ask for a clone receive the same allocation as
    /// every other non-cloning listener of the update.
    #[must_use]
    pub fn shared(&self, index: usize) -> Option<&Arc<Value>> {
        self.0.get(index)
    }

    /// Iterate over the arguments.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().map(AsRef::as_ref)
    }

    /// Copy the arguments into owned values.
    #[must_use]
    pub fn to_values(&self) -> Vec<Value> {
        self.iter().cloned().collect()
    }
}

impl Index<usize> for Arguments {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.0[index]
    }
}

/// A single listener call.
#[derive(Clone)]
pub struct Invocation {
    event: Arc<str>,
    args: Arguments,
    context: Option<Context>,
}

impl Invocation {
    pub(crate) fn new(event: Arc<str>, args: Arguments, context: Option<Context>) -> Self {
        Self {
            event,
            args,
            context,
        }
    }

    /// Name of the event being delivered.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }

    /// The positional arguments.
    #[must_use]
    pub fn args(&self) -> &Arguments {
        &self.args
    }

    /// Argument at `index`.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// The subscription's context, if it is a `T`.
    #[must_use]
    pub fn context<T: Any>(&self) -> Option<&T> {
        self.context.as_deref()?.downcast_ref::<T>()
    }

    /// Take ownership of the arguments.
    #[must_use]
    pub fn into_args(self) -> Arguments {
        self.args
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("event", &self.event)
            .field("args", &self.args)
            .field("context", &self.context.is_some())
            .finish()
    }
}

type Callback = dyn Fn(Invocation) -> Outcome + Send + Sync;

/// A subscribed callable.
///
/// Listeners compare by identity: clones of one `Listener` are the same
/// listener for [`Emitter::remove_listener`](crate::Emitter::remove_listener).
#[derive(Clone)]
pub struct Listener {
    callback: Arc<Callback>,
}

impl Listener {
    /// Wrap a synchronous callable.
    ///
    /// The callable may return `()`, a [`Value`], or an `anyhow::Result` of
    /// either.
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&Invocation) -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        Self {
            callback: Arc::new(move |invocation: Invocation| f(&invocation).into_outcome()),
        }
    }

    /// Wrap an asynchronous callable.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self {
            callback: Arc::new(move |invocation: Invocation| {
                let future = AssertUnwindSafe(f(invocation)).catch_unwind();
                Outcome::Pending(
                    future
                        .map(|result| match result {
                            Ok(output) => output.map_err(ListenerError::from),
                            Err(panic) => Err(panic_error(&*panic)),
                        })
                        .boxed(),
                )
            }),
        }
    }

    /// Whether both handles refer to the same listener.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }

    /// Invoke the listener, converting a panic into a [`ListenerError`].
    pub(crate) fn call(&self, invocation: Invocation) -> Outcome {
        catch_unwind(AssertUnwindSafe(|| (self.callback)(invocation)))
            .unwrap_or_else(|panic| Outcome::Ready(Err(panic_error(&*panic))))
    }
}

/// A panic raised by a listener or by the future it returned.
fn panic_error(panic: &(dyn Any + Send)) -> ListenerError {
    let message = panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    ListenerError::msg(format!("listener panicked: {message}"))
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").finish_non_exhaustive()
    }
}

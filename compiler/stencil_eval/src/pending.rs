//! Filter outcomes: a value, a value still being computed, or a control
//! signal for the pipeline.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::mpsc as sync_mpsc;
use std::time::Duration;

use futures::channel::{mpsc, oneshot};
use futures::{FutureExt, StreamExt};

use crate::errors::{EvalError, EvalResult};
use crate::Value;

/// Pipeline directives returned by control filters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ControlSignal {
    /// End the fragment. Nothing is written.
    Stop,
    /// Drop this filter's result and keep the previous value flowing.
    Ignore,
}

/// A value that is not ready yet.
pub struct AsyncValue(Pin<Box<dyn Future<Output = EvalResult> + Send>>);

impl AsyncValue {
    pub fn new(future: impl Future<Output = EvalResult> + Send + 'static) -> Self {
        AsyncValue(Box::pin(future))
    }

    /// Already resolved.
    pub fn ready(value: Value) -> Self {
        AsyncValue::new(futures::future::ready(Ok(value)))
    }

    /// Park the thread until the value is ready.
    pub fn resolve(self) -> EvalResult {
        futures::executor::block_on(self.0)
    }

    /// Resolve without parking, if the value is already there.
    pub fn try_now(&mut self) -> Option<EvalResult> {
        (&mut self.0).now_or_never()
    }
}

impl Future for AsyncValue {
    type Output = EvalResult;

    fn poll(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        self.0.as_mut().poll(cx)
    }
}

impl fmt::Debug for AsyncValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AsyncValue(..)")
    }
}

/// `value` after `duration`, produced on a helper thread.
pub fn delayed(value: Value, duration: Duration) -> AsyncValue {
    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        std::thread::sleep(duration);
        let _ = tx.send(value);
    });
    AsyncValue::new(async move {
        rx.await
            .map_err(|_| EvalError::new("delayed value was dropped before it resolved"))
    })
}

/// Hands pending values from a render thread to the task awaiting the
/// render. The render thread blocks until the task answers.
#[derive(Clone)]
pub(crate) struct Suspender(mpsc::UnboundedSender<Suspended>);

/// A pending value and the way back to the render thread that raised it.
pub(crate) struct Suspended {
    pending: AsyncValue,
    reply: sync_mpsc::SyncSender<EvalResult>,
}

impl Suspender {
    /// Suspender and the stream of values to await. The stream ends once
    /// every suspender is dropped.
    pub(crate) fn channel() -> (Suspender, mpsc::UnboundedReceiver<Suspended>) {
        let (tx, rx) = mpsc::unbounded();
        (Suspender(tx), rx)
    }

    /// Wait for the awaiting task to resolve `pending`.
    pub(crate) fn wait(&self, pending: AsyncValue) -> EvalResult {
        let (reply, answer) = sync_mpsc::sync_channel(1);
        self.0
            .unbounded_send(Suspended { pending, reply })
            .map_err(|_| EvalError::new("render was dropped while a value was pending"))?;
        answer
            .recv()
            .map_err(|_| EvalError::new("render was dropped while a value was pending"))?
    }
}

impl fmt::Debug for Suspender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Suspender(..)")
    }
}

/// Await every pending value a render thread hands over, in order.
pub(crate) async fn answer_all(mut suspended: mpsc::UnboundedReceiver<Suspended>) {
    while let Some(Suspended { pending, reply }) = suspended.next().await {
        // The render thread is gone if this fails; its result reports why.
        let _ = reply.send(pending.await);
    }
}

/// What a filter returned.
#[derive(Debug)]
pub enum Outcome {
    Value(Value),
    Pending(AsyncValue),
    Signal(ControlSignal),
}

impl Outcome {
    pub const STOP: Outcome = Outcome::Signal(ControlSignal::Stop);
    pub const IGNORE: Outcome = Outcome::Signal(ControlSignal::Ignore);

    /// Settle into a value or a signal, waiting on pending results.
    pub fn settle(self) -> Result<Settled, EvalError> {
        match self {
            Outcome::Value(value) => Ok(Settled::Value(value)),
            Outcome::Pending(pending) => pending.resolve().map(Settled::Value),
            Outcome::Signal(signal) => Ok(Settled::Signal(signal)),
        }
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Outcome::Value(value)
    }
}

/// An outcome after pending values are resolved.
#[derive(Debug, PartialEq)]
pub enum Settled {
    Value(Value),
    Signal(ControlSignal),
}

impl Settled {
    /// The value, with signals read as `undefined`. Used where a filter is
    /// called inside an expression and there is no pipeline to control.
    pub fn into_value(self) -> Value {
        match self {
            Settled::Value(value) => value,
            Settled::Signal(_) => Value::Undefined,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ready_values_resolve_immediately() {
        let mut pending = AsyncValue::ready(Value::Int(1));
        assert_eq!(pending.try_now().unwrap().unwrap(), Value::Int(1));
    }

    #[test]
    fn delayed_values_park_until_ready() {
        let pending = delayed(Value::from("later"), Duration::from_millis(5));
        assert_eq!(pending.resolve().unwrap(), Value::from("later"));
    }

    #[test]
    fn suspended_values_are_answered_by_the_awaiting_task() {
        let (suspender, suspended) = Suspender::channel();
        let (tx, rx) = oneshot::channel();
        let worker = std::thread::spawn(move || {
            suspender.wait(AsyncValue::new(async move {
                rx.await.map_err(|_| EvalError::new("dropped"))
            }))
        });
        futures::executor::block_on(async move {
            let _ = tx.send(Value::Int(7));
            answer_all(suspended).await;
        });
        assert_eq!(worker.join().unwrap().unwrap(), Value::Int(7));
    }

    #[test]
    fn settle_keeps_signals() {
        assert_eq!(Outcome::STOP.settle().unwrap(), Settled::Signal(ControlSignal::Stop));
        let settled = Outcome::Pending(AsyncValue::ready(Value::Int(2))).settle().unwrap();
        assert_eq!(settled, Settled::Value(Value::Int(2)));
        assert!(Settled::Signal(ControlSignal::Ignore).into_value().is_undefined());
    }
}

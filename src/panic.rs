use pin_project::pin_project;
use std::{any::Any, future::Future, panic, pin::Pin, task};

/// Payload of a caught panic.
pub type Payload = Box<dyn Any + Send + 'static>;

/// A future that turns panics of the inner future into an error carrying
/// the panic payload.
#[pin_project]
pub struct CatchUnwind<A> {
    #[pin]
    inner: A,
}

impl<A> CatchUnwind<A>
where
    A: Future,
{
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

impl<A> Future for CatchUnwind<A>
where
    A: Future,
{
    type Output = Result<A::Output, Payload>;

    fn poll(
        self: Pin<&mut Self>,
        ctx: &mut task::Context<'_>,
    ) -> task::Poll<Self::Output> {
        let inner = self.project().inner;
        let result =
            panic::catch_unwind(panic::AssertUnwindSafe(move || inner.poll(ctx)));

        match result {
            Ok(task::Poll::Pending) => task::Poll::Pending,
            Ok(task::Poll::Ready(data)) => task::Poll::Ready(Ok(data)),
            Err(payload) => task::Poll::Ready(Err(payload)),
        }
    }
}

//! Minimal executor for driver tests

use core::future::Future;
use core::pin::pin;
use core::task::{Context, Poll, Waker};

/// Poll a future to completion on the current thread
///
/// The fakes in these tests complete after a bounded number of yields,
/// so busy-polling with a no-op waker terminates.
pub fn block_on<F: Future>(fut: F) -> F::Output {
    let mut fut = pin!(fut);
    let mut cx = Context::from_waker(Waker::noop());
    loop {
        if let Poll::Ready(output) = fut.as_mut().poll(&mut cx) {
            return output;
        }
    }
}

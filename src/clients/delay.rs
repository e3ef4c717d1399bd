use std::{future::Future, time::Duration};

use tokio::time::sleep;

/// Suspends the current task without holding up the rest of the runtime.
pub trait Delay: Send + Sync {
    fn wait(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        sleep(duration).await;
    }
}

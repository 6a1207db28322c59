use core::future::Future;
use core::time::Duration;
use futures::future::join_all;

/// Fixed-size batching with a fixed pause between batches.
///
/// Work inside a batch runs concurrently; batches run one after the other. This is the only
/// throttling applied to third-party services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batching {
    pub size: usize,
    pub pause: Duration,
}

impl Batching {
    #[must_use]
    pub const fn new(size: usize, pause: Duration) -> Self {
        Self { size, pause }
    }

    /// Run `f` over every item, returning the outputs in input order.
    pub async fn run<I, F, Fut>(&self, items: I, mut f: F) -> Vec<Fut::Output>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future,
    {
        let size = self.size.max(1);
        let mut items = items.into_iter().peekable();
        let mut results = Vec::new();
        let mut first = true;

        while items.peek().is_some() {
            if !first && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
            first = false;

            let batch: Vec<Fut> = items.by_ref().take(size).map(&mut f).collect();
            results.extend(join_all(batch).await);
        }

        results
    }
}

//! 주기 실행 백그라운드 작업

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// 주기적으로 실행되는 정리 작업. 드롭되면 중단된다.
pub struct PeriodicTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// `period`마다 `job`을 실행하는 작업을 띄운다 (첫 실행은 한 주기 뒤)
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval의 첫 tick은 즉시 완료됨
            interval.tick().await;
            loop {
                interval.tick().await;
                job().await;
            }
        });

        tracing::debug!(task = name, period_secs = period.as_secs(), "Periodic task started");
        Self { name, handle }
    }

    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.handle.abort();
        tracing::debug!(task = self.name, "Periodic task stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn runs_every_period_until_dropped() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let task = PeriodicTask::spawn("test", Duration::from_secs(10), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(21)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        task.shutdown();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}

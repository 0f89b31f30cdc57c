use crate::subscription::{forward, Subscription, SubscriptionId};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::IntervalStream;

/// Marker type for repeating timer ids.
pub struct Every;

/// A repeating timer that emits the current [`Instant`] every `interval`.
///
/// `name` keeps timers apart, so a loading spinner and a chart animation can
/// tick side by side. The interval is only created once the runtime starts
/// the subscription; building one is free outside a tokio context.
///
/// ```rust,ignore
/// subs.push(every(Duration::from_millis(80), "spinner").map(|_| Msg::SpinnerTick));
/// ```
pub fn every(interval: Duration, name: &'static str) -> Subscription<Instant> {
    Subscription::new(SubscriptionId::with_str::<Every>(name), move |emit| {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let ticks = IntervalStream::new(ticker).map(|tick| tick.into_std());
            forward(Box::pin(ticks), emit).await;
        })
        .abort_handle()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    #[test]
    fn timers_with_distinct_names_have_distinct_ids() {
        let spinner = every(Duration::from_millis(80), "spinner");
        let chart = every(Duration::from_millis(80), "chart");
        assert_ne!(spinner.id(), chart.id());
        assert_eq!(spinner.id(), every(Duration::from_secs(1), "spinner").id());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_ticks_once_started() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let emit = Arc::new(move |t: Instant| tx.send(t).is_ok());
        let handle = (every(Duration::from_millis(16), "frame").spawn)(emit);
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_some());
        handle.abort();
    }
}

use crate::event::TerminalEvent;
use crate::subscription::{forward, Subscription, SubscriptionId};
use crossterm::event::EventStream;
use futures::StreamExt;

/// Marker type for the terminal input subscription id.
pub struct TerminalEvents;

/// Subscribe to keyboard, mouse, resize, focus and paste input.
///
/// `map` turns each [`TerminalEvent`] into `Some(Msg)` to forward it, or
/// `None` to drop it. Read errors are logged and skipped.
///
/// The crossterm `EventStream` is created inside the spawned task:
/// `subscriptions()` runs after every update, and a second stream would
/// compete with the one already polling.
pub fn terminal_events<Msg: Send + 'static>(
    map: impl Fn(TerminalEvent) -> Option<Msg> + Send + Sync + 'static,
) -> Subscription<Msg> {
    Subscription::new(SubscriptionId::of::<TerminalEvents>(), move |emit| {
        tokio::spawn(async move {
            let messages = EventStream::new().filter_map(move |event| {
                let msg = match event {
                    Ok(event) => map(TerminalEvent::from(event)),
                    Err(e) => {
                        tracing::warn!(error = %e, "terminal event stream error");
                        None
                    }
                };
                futures::future::ready(msg)
            });
            forward(Box::pin(messages), emit).await;
        })
        .abort_handle()
    })
}

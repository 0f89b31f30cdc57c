use futures::stream::BoxStream;
use futures::StreamExt;
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

/// Delivers one message from a running subscription. Returns `false` once the
/// program is gone, which tells the source to stop.
pub type Emitter<Msg> = Arc<dyn Fn(Msg) -> bool + Send + Sync>;

type Spawn<Msg> = Box<dyn FnOnce(Emitter<Msg>) -> AbortHandle + Send>;

/// A long-lived event source managed by the runtime.
///
/// Subscriptions are declared in [`Model::subscriptions`](crate::Model::subscriptions).
/// After each update the runtime compares the declared ids with the running
/// set: new ids are started, missing ids are aborted, and ids present in both
/// keep their task untouched.
pub struct Subscription<Msg: Send + 'static> {
    pub(crate) id: SubscriptionId,
    pub(crate) spawn: Spawn<Msg>,
}

/// Identity used to diff subscriptions between updates: a marker type plus a
/// discriminant for telling instances of the same kind apart.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    type_id: TypeId,
    discriminant: u64,
}

impl SubscriptionId {
    /// Id for a singleton source.
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            discriminant: 0,
        }
    }

    /// Id for one of several sources of the same kind, told apart by name.
    pub fn with_str<T: 'static>(name: &str) -> Self {
        let mut hasher = std::hash::DefaultHasher::new();
        name.hash(&mut hasher);
        Self {
            type_id: TypeId::of::<T>(),
            discriminant: hasher.finish(),
        }
    }
}

impl<Msg: Send + 'static> Subscription<Msg> {
    /// Build a subscription from a start function. `spawn` receives the
    /// emitter and returns a handle that stops the source when aborted.
    pub fn new(
        id: SubscriptionId,
        spawn: impl FnOnce(Emitter<Msg>) -> AbortHandle + Send + 'static,
    ) -> Self {
        Subscription {
            id,
            spawn: Box::new(spawn),
        }
    }

    /// Forward every item of `stream`.
    pub fn from_stream(id: SubscriptionId, stream: BoxStream<'static, Msg>) -> Self {
        Self::new(id, move |emit| tokio::spawn(forward(stream, emit)).abort_handle())
    }

    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    /// Transform the message type, for embedding a component's subscriptions
    /// in its parent.
    pub fn map<NewMsg: Send + 'static>(
        self,
        f: impl Fn(Msg) -> NewMsg + Send + Sync + 'static,
    ) -> Subscription<NewMsg> {
        let Subscription { id, spawn } = self;
        Subscription::new(id, move |emit: Emitter<NewMsg>| {
            spawn(Arc::new(move |msg| emit(f(msg))))
        })
    }
}

/// Emit every stream item until the stream ends or the program goes away.
pub(crate) async fn forward<Msg: Send + 'static>(
    mut stream: BoxStream<'static, Msg>,
    emit: Emitter<Msg>,
) {
    while let Some(msg) = stream.next().await {
        if !emit(msg) {
            break;
        }
    }
}

/// Running subscriptions keyed by id.
pub(crate) struct SubscriptionSet<Msg: Send + 'static> {
    running: HashMap<SubscriptionId, AbortHandle>,
    emit: Emitter<Msg>,
}

impl<Msg: Send + 'static> SubscriptionSet<Msg> {
    pub fn new(msg_tx: mpsc::UnboundedSender<Msg>) -> Self {
        Self {
            running: HashMap::new(),
            emit: Arc::new(move |msg| msg_tx.send(msg).is_ok()),
        }
    }

    /// Bring the running set in line with `declared`.
    pub fn sync(&mut self, declared: Vec<Subscription<Msg>>) {
        let wanted: HashSet<SubscriptionId> = declared.iter().map(|s| s.id.clone()).collect();

        let stale: Vec<SubscriptionId> = self
            .running
            .keys()
            .filter(|id| !wanted.contains(*id))
            .cloned()
            .collect();
        for id in stale {
            if let Some(handle) = self.running.remove(&id) {
                handle.abort();
                tracing::trace!(?id, "subscription stopped");
            }
        }

        for sub in declared {
            if self.running.contains_key(&sub.id) {
                continue;
            }
            tracing::trace!(id = ?sub.id, "subscription started");
            let handle = (sub.spawn)(self.emit.clone());
            self.running.insert(sub.id, handle);
        }
    }

    pub fn stop_all(&mut self) {
        for (_, handle) in self.running.drain() {
            handle.abort();
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.running.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Spinner;
    struct Chart;

    fn pending(id: SubscriptionId) -> Subscription<i32> {
        Subscription::from_stream(id, Box::pin(futures::stream::pending()))
    }

    #[test]
    fn ids_compare_by_kind_and_name() {
        assert_eq!(SubscriptionId::of::<Spinner>(), SubscriptionId::of::<Spinner>());
        assert_ne!(SubscriptionId::of::<Spinner>(), SubscriptionId::of::<Chart>());

        let loading = SubscriptionId::with_str::<Spinner>("loading");
        assert_ne!(loading, SubscriptionId::with_str::<Spinner>("frame"));
        assert_eq!(loading, SubscriptionId::with_str::<Spinner>("loading"));
    }

    #[tokio::test]
    async fn sync_starts_keeps_and_stops() {
        let (tx, _rx) = mpsc::unbounded_channel::<i32>();
        let mut set = SubscriptionSet::new(tx);

        set.sync(vec![
            pending(SubscriptionId::of::<Spinner>()),
            pending(SubscriptionId::of::<Chart>()),
        ]);
        assert_eq!(set.len(), 2);

        set.sync(vec![pending(SubscriptionId::of::<Chart>())]);
        assert_eq!(set.len(), 1);

        set.sync(vec![]);
        assert_eq!(set.len(), 0);
    }

    #[tokio::test]
    async fn stop_all_empties_the_set() {
        let (tx, _rx) = mpsc::unbounded_channel::<i32>();
        let mut set = SubscriptionSet::new(tx);
        set.sync(vec![pending(SubscriptionId::of::<Spinner>())]);
        set.stop_all();
        assert_eq!(set.len(), 0);
    }

    #[tokio::test]
    async fn mapped_subscription_delivers_transformed_messages() {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let mut set = SubscriptionSet::new(tx);

        let source = Subscription::from_stream(
            SubscriptionId::of::<Chart>(),
            Box::pin(futures::stream::iter(vec![1, 2])),
        );
        set.sync(vec![source.map(|n| format!("bar {n}"))]);

        assert_eq!(rx.recv().await.as_deref(), Some("bar 1"));
        assert_eq!(rx.recv().await.as_deref(), Some("bar 2"));
    }

    #[tokio::test]
    async fn closed_program_stops_the_source() {
        let (tx, rx) = mpsc::unbounded_channel::<i32>();
        drop(rx);
        let emit: Emitter<i32> = Arc::new(move |msg| tx.send(msg).is_ok());
        // Would never finish if a failed send did not end the loop.
        forward(Box::pin(futures::stream::repeat(1)), emit).await;
    }
}

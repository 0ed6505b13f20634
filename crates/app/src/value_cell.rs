//! Observable value cell — the primitive under every property.
//!
//! A [`ValueCell`] holds one value, optionally guarded by a validator, and
//! notifies subscribers synchronously on every accepted write. Whole
//! write+notify rounds are serialized per cell, so concurrent writers never
//! interleave their notifications and subscribers never observe a torn value.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, ThreadId};

use nlpthing_domain::error::InvalidValue;

use crate::lock;

type Callback<T> = Arc<dyn Fn(&T, &T) + Send + Sync>;
type Validator<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

struct Subscribers<T> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Callback<T>)>>,
}

impl<T> Subscribers<T> {
    fn snapshot(&self) -> Vec<Callback<T>> {
        lock(&self.entries)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect()
    }
}

trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: u64);
}

impl<T> Unsubscribe for Subscribers<T> {
    fn unsubscribe(&self, id: u64) {
        lock(&self.entries).retain(|(entry, _)| *entry != id);
    }
}

/// Keeps a subscription alive. Dropping it removes the subscriber.
#[must_use = "dropping the handle unsubscribes immediately"]
pub struct SubscriptionHandle {
    id: u64,
    registry: Option<Weak<dyn Unsubscribe>>,
}

impl SubscriptionHandle {
    /// Keep the subscriber registered for as long as the cell lives.
    pub fn detach(mut self) {
        self.registry = None;
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.take().and_then(|weak| weak.upgrade()) {
            registry.unsubscribe(self.id);
        }
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("attached", &self.registry.is_some())
            .finish()
    }
}

/// Writes that arrive from inside a notification round on the thread that
/// owns the round. They are applied after the round, never nested in it.
struct Dispatch<T> {
    owner: Option<ThreadId>,
    queued: VecDeque<T>,
}

struct OwnerGuard<'a, T> {
    dispatch: &'a Mutex<Dispatch<T>>,
}

impl<'a, T> OwnerGuard<'a, T> {
    fn claim(dispatch: &'a Mutex<Dispatch<T>>, owner: ThreadId) -> Self {
        lock(dispatch).owner = Some(owner);
        Self { dispatch }
    }
}

impl<T> Drop for OwnerGuard<'_, T> {
    fn drop(&mut self) {
        let mut dispatch = lock(self.dispatch);
        dispatch.owner = None;
        dispatch.queued.clear();
    }
}

/// A single observable, optionally validated value.
pub struct ValueCell<T> {
    current: Mutex<T>,
    validator: Option<Validator<T>>,
    subscribers: Arc<Subscribers<T>>,
    round: Mutex<()>,
    dispatch: Mutex<Dispatch<T>>,
}

impl<T> ValueCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an unvalidated cell.
    pub fn new(initial: T) -> Self {
        Self {
            current: Mutex::new(initial),
            validator: None,
            subscribers: Arc::new(Subscribers {
                next_id: AtomicU64::new(0),
                entries: Mutex::new(Vec::new()),
            }),
            round: Mutex::new(()),
            dispatch: Mutex::new(Dispatch {
                owner: None,
                queued: VecDeque::new(),
            }),
        }
    }

    /// Create a cell whose every value must satisfy `validator`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidValue`] if `initial` itself is rejected.
    pub fn with_validator<F>(initial: T, validator: F) -> Result<Self, InvalidValue>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        if !validator(&initial) {
            return Err(InvalidValue);
        }
        let mut cell = Self::new(initial);
        cell.validator = Some(Box::new(validator));
        Ok(cell)
    }

    /// Current value.
    pub fn get(&self) -> T {
        lock(&self.current).clone()
    }

    /// Whether `value` would be accepted by [`set`](Self::set).
    pub fn accepts(&self, value: &T) -> bool {
        self.validator.as_ref().is_none_or(|validator| validator(value))
    }

    /// Replace the value and notify every subscriber with `(old, new)`.
    ///
    /// All subscribers have been called by the time this returns. A `set`
    /// issued by a subscriber on this same cell is validated immediately but
    /// applied after the current notification round completes, with a full
    /// round of its own, still before the outermost `set` returns.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidValue`] and leaves the value untouched when the
    /// validator rejects `value`.
    pub fn set(&self, value: T) -> Result<(), InvalidValue> {
        if !self.accepts(&value) {
            return Err(InvalidValue);
        }

        let me = thread::current().id();
        {
            let mut dispatch = lock(&self.dispatch);
            if dispatch.owner == Some(me) {
                dispatch.queued.push_back(value);
                return Ok(());
            }
        }

        let _round = lock(&self.round);
        let _owner = OwnerGuard::claim(&self.dispatch, me);
        let mut next = Some(value);
        while let Some(value) = next {
            self.apply(value);
            next = lock(&self.dispatch).queued.pop_front();
        }
        Ok(())
    }

    /// Register a change callback, called with `(old, new)` after each write.
    ///
    /// Callbacks run on the writer's thread inside [`set`](Self::set) and
    /// must stay short.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        let id = self.subscribers.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.subscribers.entries).push((id, Arc::new(callback)));
        let weak = Arc::downgrade(&self.subscribers);
        let registry: Weak<dyn Unsubscribe> = weak;
        SubscriptionHandle {
            id,
            registry: Some(registry),
        }
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers.entries).len()
    }

    fn apply(&self, value: T) {
        let old = std::mem::replace(&mut *lock(&self.current), value.clone());
        for callback in self.subscribers.snapshot() {
            callback(&old, &value);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueCell")
            .field("current", &*lock(&self.current))
            .field("validated", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    type Log = Arc<Mutex<Vec<(&'static str, i64, i64)>>>;

    fn record(log: &Log, tag: &'static str) -> impl Fn(&i64, &i64) + Send + Sync + 'static {
        let log = Arc::clone(log);
        move |old, new| log.lock().unwrap().push((tag, *old, *new))
    }

    #[test]
    fn should_return_initial_value() {
        let cell = ValueCell::new(7_i64);
        assert_eq!(cell.get(), 7);
    }

    #[test]
    fn should_notify_subscriber_with_old_and_new_value() {
        let cell = ValueCell::new(0_i64);
        let log = Log::default();
        let _sub = cell.subscribe(record(&log, "a"));

        cell.set(5).unwrap();

        assert_eq!(cell.get(), 5);
        assert_eq!(*log.lock().unwrap(), vec![("a", 0, 5)]);
    }

    #[test]
    fn should_keep_value_when_validator_rejects_write() {
        let cell = ValueCell::with_validator(1_i64, |v| *v >= 0).unwrap();
        let log = Log::default();
        let _sub = cell.subscribe(record(&log, "a"));

        assert_eq!(cell.set(-3), Err(InvalidValue));

        assert_eq!(cell.get(), 1);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn should_reject_invalid_initial_value() {
        let result = ValueCell::with_validator(-1_i64, |v| *v >= 0);
        assert!(result.is_err());
    }

    #[test]
    fn should_notify_subscribers_in_insertion_order() {
        let cell = ValueCell::new(0_i64);
        let log = Log::default();
        let _a = cell.subscribe(record(&log, "a"));
        let _b = cell.subscribe(record(&log, "b"));
        let _c = cell.subscribe(record(&log, "c"));

        cell.set(1).unwrap();

        let tags: Vec<_> = log.lock().unwrap().iter().map(|(tag, ..)| *tag).collect();
        assert_eq!(tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn should_stop_notifying_after_handle_is_dropped() {
        let cell = ValueCell::new(0_i64);
        let log = Log::default();
        let sub = cell.subscribe(record(&log, "a"));
        cell.set(1).unwrap();

        drop(sub);
        cell.set(2).unwrap();

        assert_eq!(log.lock().unwrap().len(), 1);
        assert_eq!(cell.subscriber_count(), 0);
    }

    #[test]
    fn should_keep_detached_subscriber() {
        let cell = ValueCell::new(0_i64);
        let log = Log::default();
        cell.subscribe(record(&log, "a")).detach();

        cell.set(1).unwrap();
        cell.set(2).unwrap();

        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn should_let_subscriber_read_the_new_value() {
        let cell = Arc::new(ValueCell::new(0_i64));
        let seen = Arc::new(AtomicUsize::new(0));
        let weak = Arc::downgrade(&cell);
        let seen_in_cb = Arc::clone(&seen);
        let _sub = cell.subscribe(move |_, new| {
            let current = weak.upgrade().unwrap().get();
            assert_eq!(current, *new);
            seen_in_cb.fetch_add(1, Ordering::SeqCst);
        });

        cell.set(9).unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_queue_reentrant_writes_after_current_round() {
        let cell = Arc::new(ValueCell::new(0_i64));
        let log = Log::default();
        let weak = Arc::downgrade(&cell);
        let inner_log = Arc::clone(&log);
        let _bump = cell.subscribe(move |old, new| {
            inner_log.lock().unwrap().push(("bump", *old, *new));
            if *new < 3 {
                weak.upgrade().unwrap().set(new + 1).unwrap();
            }
        });
        let _watch = cell.subscribe(record(&log, "watch"));

        cell.set(1).unwrap();

        assert_eq!(cell.get(), 3);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                ("bump", 0, 1),
                ("watch", 0, 1),
                ("bump", 1, 2),
                ("watch", 1, 2),
                ("bump", 2, 3),
                ("watch", 2, 3),
            ]
        );
    }

    #[test]
    fn should_not_queue_rejected_reentrant_writes() {
        let cell = Arc::new(ValueCell::with_validator(0_i64, |v| *v < 10).unwrap());
        let weak = Arc::downgrade(&cell);
        let result = Arc::new(Mutex::new(None));
        let result_in_cb = Arc::clone(&result);
        let _sub = cell.subscribe(move |_, new| {
            if *new == 1 {
                *result_in_cb.lock().unwrap() = Some(weak.upgrade().unwrap().set(42));
            }
        });

        cell.set(1).unwrap();

        assert_eq!(*result.lock().unwrap(), Some(Err(InvalidValue)));
        assert_eq!(cell.get(), 1);
    }

    #[test]
    fn should_serialize_concurrent_writes_into_full_rounds() {
        let cell = Arc::new(ValueCell::new(0_i64));
        let rounds = Arc::new(AtomicUsize::new(0));
        let log = Log::default();
        let rounds_in_cb = Arc::clone(&rounds);
        let log_in_cb = Arc::clone(&log);
        let _sub = cell.subscribe(move |old, new| {
            rounds_in_cb.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(5));
            log_in_cb.lock().unwrap().push(("round", *old, *new));
        });

        std::thread::scope(|scope| {
            for value in [10, 20] {
                let cell = Arc::clone(&cell);
                scope.spawn(move || cell.set(value).unwrap());
            }
        });

        assert_eq!(rounds.load(Ordering::SeqCst), 2);
        let final_value = cell.get();
        assert!(final_value == 10 || final_value == 20);

        let log = log.lock().unwrap();
        // The second round must start from the value the first one wrote.
        assert_eq!(log[0].1, 0);
        assert_eq!(log[1].1, log[0].2);
        assert_eq!(log[1].2, final_value);
    }
}

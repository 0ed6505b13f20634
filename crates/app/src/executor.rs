//! Action executor — runs actions off the caller's path and keeps their history.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Semaphore;

use nlpthing_domain::action::{ActionSnapshot, ActionStatus};
use nlpthing_domain::error::{ActionError, NotFoundError};
use nlpthing_domain::event::ThingEvent;
use nlpthing_domain::id::ActionId;

use crate::action::Action;
use crate::lock;
use crate::ports::EventPublisher;

/// Tuning knobs of an [`ActionExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Terminal actions kept for status queries; older ones are evicted first.
    pub history_limit: usize,
    /// Upper bound on actions running at once. `None` is unbounded.
    pub max_concurrent: Option<usize>,
    /// Wall-clock budget of a single action. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            history_limit: 100,
            max_concurrent: None,
            timeout: None,
        }
    }
}

#[derive(Debug, Default)]
struct Table {
    actions: HashMap<ActionId, Arc<Action>>,
    order: VecDeque<ActionId>,
}

/// Schedules actions on a tokio runtime and tracks every submitted action
/// until it is evicted or removed.
pub struct ActionExecutor {
    runtime: Handle,
    config: ExecutorConfig,
    limiter: Option<Arc<Semaphore>>,
    publisher: Arc<dyn EventPublisher>,
    table: Mutex<Table>,
}

impl ActionExecutor {
    #[must_use]
    pub fn new(runtime: Handle, config: ExecutorConfig, publisher: Arc<dyn EventPublisher>) -> Self {
        let limiter = config
            .max_concurrent
            .map(|permits| Arc::new(Semaphore::new(permits.max(1))));
        Self {
            runtime,
            config,
            limiter,
            publisher,
            table: Mutex::new(Table::default()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Record `action` and schedule it. Returns at once, before the action runs.
    pub fn submit(&self, action: Action) -> ActionId {
        let action = Arc::new(action);
        let snapshot = action.snapshot();
        let id = snapshot.id;
        {
            let mut table = lock(&self.table);
            table.actions.insert(action.id(), Arc::clone(&action));
            table.order.push_back(action.id());
            self.evict(&mut table);
        }
        tracing::debug!(action = %snapshot.name, id = %snapshot.id, "action submitted");
        self.publisher.publish(ThingEvent::ActionStatus(snapshot));

        let limiter = self.limiter.clone();
        let publisher = Arc::clone(&self.publisher);
        let timeout = self.config.timeout;
        self.runtime.spawn(async move {
            let _permit = match limiter {
                Some(semaphore) => match semaphore.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => return,
                },
                None => None,
            };
            action.run(publisher.as_ref(), timeout).await;
        });

        id
    }

    /// Current snapshot of action `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::NotFound`] for unknown or evicted ids.
    pub fn status_of(&self, id: ActionId) -> Result<ActionSnapshot, ActionError> {
        Ok(self.get(id)?.snapshot())
    }

    /// Request cancellation of action `id`. See [`Action::cancel`].
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::NotFound`] for unknown ids and
    /// [`ActionError::AlreadyTerminal`] for finished actions.
    pub fn cancel(&self, id: ActionId) -> Result<ActionStatus, ActionError> {
        let action = self.get(id)?;
        let status = action.cancel()?;
        if status == ActionStatus::Cancelled {
            self.publisher
                .publish(ThingEvent::ActionStatus(action.snapshot()));
        }
        Ok(status)
    }

    /// Snapshots in submission order, optionally only those named `name`.
    #[must_use]
    pub fn list(&self, name: Option<&str>) -> Vec<ActionSnapshot> {
        let table = lock(&self.table);
        table
            .order
            .iter()
            .filter_map(|id| table.actions.get(id))
            .filter(|action| name.is_none_or(|name| action.name() == name))
            .map(|action| action.snapshot())
            .collect()
    }

    /// Forget action `id`, cancelling it first if it has not finished.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::NotFound`] for unknown ids.
    pub fn remove(&self, id: ActionId) -> Result<ActionSnapshot, ActionError> {
        let action = {
            let mut table = lock(&self.table);
            let action = table.actions.remove(&id).ok_or_else(|| not_found(id))?;
            table.order.retain(|other| *other != id);
            action
        };
        if let Ok(ActionStatus::Cancelled) = action.cancel() {
            self.publisher
                .publish(ThingEvent::ActionStatus(action.snapshot()));
        }
        tracing::debug!(action = %action.name(), %id, "action removed");
        Ok(action.snapshot())
    }

    /// Number of tracked actions, terminal or not.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.table).actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, id: ActionId) -> Result<Arc<Action>, ActionError> {
        lock(&self.table)
            .actions
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    fn evict(&self, table: &mut Table) {
        let Table { actions, order } = table;
        let is_terminal =
            |id: &ActionId| actions.get(id).is_some_and(|a| a.status().is_terminal());

        let terminal = order.iter().filter(|id| is_terminal(id)).count();
        let mut excess = terminal.saturating_sub(self.config.history_limit);
        if excess == 0 {
            return;
        }

        let mut evicted = Vec::with_capacity(excess);
        order.retain(|id| {
            if excess > 0 && is_terminal(id) {
                excess -= 1;
                evicted.push(*id);
                false
            } else {
                true
            }
        });
        for id in &evicted {
            actions.remove(id);
        }
        tracing::debug!(count = evicted.len(), "evicted finished actions");
    }
}

impl std::fmt::Debug for ActionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionExecutor")
            .field("config", &self.config)
            .field("tracked", &self.len())
            .finish_non_exhaustive()
    }
}

fn not_found(id: ActionId) -> ActionError {
    NotFoundError {
        entity: "ActionRequest",
        id: id.to_string(),
    }
    .into()
}

use super::{Cancellation, RequestToken, SearchOptions, SearchOutcome, SearchState};
use crate::api::{SiteResult, SiteSearch};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::task::JoinHandle;

type Callback = Arc<dyn Fn(&SearchState) + Send + Sync>;

/// Debounced, cancellable site search
///
/// Every keystroke goes to [`set_query`](Self::set_query). Once the input has
/// been quiet for the debounce window a single request is issued; any newer
/// input aborts it. Only the response for the most recently issued request is
/// ever applied, so the last query wins regardless of response order.
///
/// The debounce timer and the request each run as a spawned tokio task, so
/// the controller must be driven from inside a tokio runtime. Dropping the
/// controller disposes it.
pub struct SearchController {
    shared: Arc<Shared>,
}

struct Shared {
    api: Arc<dyn SiteSearch>,
    options: SearchOptions,
    inner: Mutex<Inner>,
    subscribers: Mutex<Subscribers>,
}

struct Inner {
    /// Raw text from the last `set_query`
    query: String,
    state: SearchState,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every new timer so a timer that lost an abort race is ignored
    timer_seq: u64,
    request: Option<JoinHandle<()>>,
    /// Token of the request whose response may still be applied
    current_token: Option<RequestToken>,
    last_minted: Option<RequestToken>,
    /// Transitions not yet handed to subscribers, oldest first
    pending: VecDeque<SearchState>,
    /// Set while some caller is draining `pending`
    delivering: bool,
    disposed: bool,
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

impl SearchController {
    pub fn new(api: Arc<dyn SiteSearch>, options: SearchOptions) -> Self {
        tracing::debug!(
            debounce_ms = options.debounce.as_millis() as u64,
            request_timeout_ms = options.request_timeout.as_millis() as u64,
            "search controller created"
        );

        Self {
            shared: Arc::new(Shared {
                api,
                options,
                inner: Mutex::new(Inner {
                    query: String::new(),
                    state: SearchState::Idle,
                    timer: None,
                    timer_seq: 0,
                    request: None,
                    current_token: None,
                    last_minted: None,
                    pending: VecDeque::new(),
                    delivering: false,
                    disposed: false,
                }),
                subscribers: Mutex::new(Subscribers::default()),
            }),
        }
    }

    pub fn options(&self) -> SearchOptions {
        self.shared.options
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SearchState {
        self.shared.lock_inner().state.clone()
    }

    /// Raw text last passed to `set_query` (or the name of the selected site)
    pub fn query(&self) -> String {
        self.shared.lock_inner().query.clone()
    }

    /// Feed the latest input text. Never blocks.
    ///
    /// Restarts the debounce window and aborts any request still running for
    /// an older query. Blank input goes straight to `Idle` without touching
    /// the network.
    pub fn set_query(&self, text: impl Into<String>) {
        let mut inner = self.shared.lock_inner();
        if inner.disposed {
            tracing::trace!("set_query after dispose ignored");
            return;
        }

        inner.query = text.into();
        let trimmed = inner.query.trim().to_string();
        inner.cancel_timer();

        if trimmed.is_empty() {
            inner.cancel_request(Cancellation::Cleared);
            self.shared.transition(inner, SearchState::Idle);
            return;
        }

        inner.cancel_request(Cancellation::NewerQuery);

        inner.timer_seq += 1;
        let seq = inner.timer_seq;
        let delay = self.shared.options.debounce;
        let shared = Arc::downgrade(&self.shared);
        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(shared) = shared.upgrade() {
                Shared::fire(&shared, seq);
            }
        }));

        self.shared
            .transition(inner, SearchState::Debouncing { query: trimmed });
    }

    /// Hand a chosen result back to the caller, cancelling pending search work
    ///
    /// Nothing still in flight can overwrite the state afterwards.
    pub fn select_result(&self, result: SiteResult) -> SiteResult {
        let mut inner = self.shared.lock_inner();
        if inner.disposed {
            return result;
        }

        tracing::info!(site_id = %result.id, site_name = %result.name, "search result selected");

        inner.cancel_timer();
        inner.cancel_request(Cancellation::Selected);
        inner.query = result.name.clone();
        self.shared.transition(inner, SearchState::Idle);
        result
    }

    /// Manual "scan" of whatever was typed, bypassing search results
    ///
    /// Returns the trimmed query and cancels pending work, or `None` (and
    /// changes nothing) when the query is blank.
    pub fn manual_scan(&self) -> Option<String> {
        let mut inner = self.shared.lock_inner();
        if inner.disposed {
            return None;
        }

        let query = inner.query.trim().to_string();
        if query.is_empty() {
            return None;
        }

        tracing::info!(query = %query, "manual scan requested");

        inner.cancel_timer();
        inner.cancel_request(Cancellation::Selected);
        self.shared.transition(inner, SearchState::Idle);
        Some(query)
    }

    /// Register an observer called on every state transition, in order
    ///
    /// The callback runs on whichever task caused the transition, with no
    /// controller lock held, so it may call back into the controller or drop
    /// its own [`Subscription`]. Transitions it causes are delivered after it
    /// returns.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SearchState) + Send + Sync + 'static,
    {
        let mut subscribers = self.shared.lock_subscribers();
        subscribers.next_id += 1;
        let id = subscribers.next_id;
        subscribers.entries.push((id, Arc::new(callback)));

        tracing::trace!(subscriber = id, "search subscriber added");

        Subscription {
            shared: Arc::downgrade(&self.shared),
            id,
        }
    }

    /// Cancel all pending work; no transition happens afterwards. Idempotent.
    pub fn dispose(&self) {
        self.shared.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.lock_inner().disposed
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.shared.dispose();
    }
}

impl Shared {
    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply `next` and notify subscribers in transition order
    ///
    /// Transitions are queued under the state lock. Whoever finds no delivery
    /// running drains the queue; everyone else (including callbacks that
    /// re-enter the controller) only enqueues.
    fn transition(&self, mut inner: MutexGuard<'_, Inner>, next: SearchState) {
        if inner.state == next {
            return;
        }

        tracing::debug!(
            from = inner.state.label(),
            to = next.label(),
            query = next.query().unwrap_or(""),
            "search state transition"
        );

        inner.state = next.clone();
        inner.pending.push_back(next);
        if inner.delivering {
            return;
        }
        inner.delivering = true;
        drop(inner);

        self.deliver();
    }

    fn deliver(&self) {
        loop {
            let next = {
                let mut inner = self.lock_inner();
                match inner.pending.pop_front() {
                    Some(next) if !inner.disposed => next,
                    _ => {
                        inner.pending.clear();
                        inner.delivering = false;
                        return;
                    }
                }
            };

            let callbacks: Vec<Callback> = self
                .lock_subscribers()
                .entries
                .iter()
                .map(|(_, callback)| callback.clone())
                .collect();

            for callback in callbacks {
                if self.lock_inner().disposed {
                    break;
                }
                callback(&next);
            }
        }
    }

    /// Debounce window elapsed: issue the request for the settled query
    fn fire(shared: &Arc<Shared>, seq: u64) {
        let mut inner = shared.lock_inner();
        if inner.disposed || inner.timer_seq != seq {
            return;
        }
        inner.timer = None;

        let query = inner.query.trim().to_string();
        if query.is_empty() {
            return;
        }

        inner.cancel_request(Cancellation::NewerQuery);
        let token = inner.mint_token();

        let api = shared.api.clone();
        let timeout = shared.options.request_timeout;
        let weak = Arc::downgrade(shared);
        let request_query = query.clone();
        inner.request = Some(tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, api.search_sites(&request_query)).await {
                Ok(result) => SearchOutcome::from(result),
                Err(_) => SearchOutcome::TimedOut,
            };
            if let Some(shared) = weak.upgrade() {
                shared.complete(token, outcome);
            }
        }));

        tracing::debug!(query = %query, token = %token, "search request issued");
        shared.transition(inner, SearchState::InFlight { query, token });
    }

    /// A request finished; apply it only if its token is still current
    fn complete(&self, token: RequestToken, outcome: SearchOutcome) {
        let mut inner = self.lock_inner();
        if inner.disposed {
            tracing::trace!(token = %token, "search response after dispose discarded");
            return;
        }
        if inner.current_token != Some(token) {
            tracing::debug!(
                token = %token,
                current = ?inner.current_token,
                "discarding stale search response"
            );
            return;
        }

        inner.current_token = None;
        inner.request = None;
        let query = inner.query.trim().to_string();

        let next = match outcome {
            SearchOutcome::Results(results) => {
                tracing::debug!(query = %query, token = %token, result_count = results.len(), "search succeeded");
                SearchState::Succeeded { query, results }
            }
            SearchOutcome::Failed(reason) => {
                tracing::warn!(query = %query, token = %token, reason = %reason, "search failed");
                SearchState::Failed { query, reason }
            }
            SearchOutcome::TimedOut => {
                tracing::warn!(
                    query = %query,
                    token = %token,
                    timeout_ms = self.options.request_timeout.as_millis() as u64,
                    "search timed out"
                );
                SearchState::TimedOut { query }
            }
        };

        self.transition(inner, next);
    }

    fn dispose(&self) {
        {
            let mut inner = self.lock_inner();
            if inner.disposed {
                return;
            }
            inner.disposed = true;
            inner.pending.clear();
            inner.cancel_timer();
            inner.cancel_request(Cancellation::Disposed);
        }

        self.lock_subscribers().entries.clear();
        tracing::debug!("search controller disposed");
    }

    fn unsubscribe(&self, id: u64) {
        let mut subscribers = self.lock_subscribers();
        subscribers.entries.retain(|(entry_id, _)| *entry_id != id);
        tracing::trace!(subscriber = id, "search subscriber removed");
    }
}

impl Inner {
    fn mint_token(&mut self) -> RequestToken {
        let token = self
            .last_minted
            .map(RequestToken::next)
            .unwrap_or_else(RequestToken::first);
        self.last_minted = Some(token);
        self.current_token = Some(token);
        token
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Abort the transport operation and invalidate its token
    fn cancel_request(&mut self, reason: Cancellation) {
        let token = self.current_token.take();
        if let Some(request) = self.request.take() {
            request.abort();
            tracing::debug!(token = ?token, reason = %reason, "search request cancelled");
        }
    }
}

/// Handle returned by [`SearchController::subscribe`]
///
/// Dropping it removes the observer.
pub struct Subscription {
    shared: Weak<Shared>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.unsubscribe(self.id);
        }
    }
}

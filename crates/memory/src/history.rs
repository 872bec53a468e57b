//! Per-user conversation history with a bounded rolling window.
//!
//! Each user owns a slot guarded by its own async mutex. The orchestrator
//! holds the slot's [`HistoryGuard`] for a whole request (provisional append,
//! remote call, commit or rollback), so turns from two concurrent requests of
//! the same user never interleave. Different users never contend beyond a
//! brief map lookup. A guard dropped with its provisional turn unsettled
//! (for example when the request future is cancelled) rolls the turn back.
//!
//! Slots whose sequence becomes empty are retired and removed from the map.
//! A task that was waiting on a retired slot re-resolves the user's current
//! slot instead of writing into the orphan.

use gemrelay_core::message::{Role, Turn, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct Slot {
    turns: Vec<Turn>,
    retired: bool,
}

type SlotHandle = Arc<AsyncMutex<Slot>>;

/// What `forget_last_exchange` removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForgetOutcome {
    /// The trailing `(user, model)` exchange was removed.
    RemovedPair { question: Turn, answer: Turn },
    /// The history held a single turn, now removed.
    RemovedSingle { turn: Turn },
    /// The tail was not a `(user, model)` pair; only the last turn was removed.
    RemovedOneFallback { turn: Turn },
    /// The history was already empty.
    NothingToForget,
}

/// Mapping from user to their recent turns.
pub struct HistoryStore {
    max_history_turns: usize,
    slots: Mutex<HashMap<UserId, SlotHandle>>,
}

impl HistoryStore {
    /// `max_history_turns` counts exchanges; up to twice as many turns are kept.
    pub fn new(max_history_turns: usize) -> Self {
        Self {
            max_history_turns,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_history_turns(&self) -> usize {
        self.max_history_turns
    }

    /// Largest number of turns retained per user.
    pub fn capacity(&self) -> usize {
        self.max_history_turns.saturating_mul(2)
    }

    /// Acquire exclusive access to a user's history, creating it if absent.
    ///
    /// The lock is released when the guard drops, including when the owning
    /// future is cancelled.
    pub async fn lock(&self, user: &UserId) -> HistoryGuard<'_> {
        loop {
            let handle = {
                let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
                Arc::clone(slots.entry(user.clone()).or_default())
            };
            if let Some(guard) = self.acquire(user, handle).await {
                return guard;
            }
        }
    }

    /// Like [`HistoryStore::lock`] but never creates a slot.
    async fn lock_existing(&self, user: &UserId) -> Option<HistoryGuard<'_>> {
        loop {
            let handle = {
                let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
                Arc::clone(slots.get(user)?)
            };
            if let Some(guard) = self.acquire(user, handle).await {
                return Some(guard);
            }
        }
    }

    async fn acquire(&self, user: &UserId, handle: SlotHandle) -> Option<HistoryGuard<'_>> {
        let slot = Arc::clone(&handle).lock_owned().await;
        if slot.retired {
            return None;
        }
        Some(HistoryGuard {
            store: self,
            user: user.clone(),
            handle,
            slot,
            evicted: Vec::new(),
            pending: false,
        })
    }

    /// Snapshot of the user's turns; empty when the user has no history.
    pub async fn get(&self, user: &UserId) -> Vec<Turn> {
        match self.lock_existing(user).await {
            Some(guard) => guard.turns().to_vec(),
            None => Vec::new(),
        }
    }

    /// Delete the user's history. Returns whether there was any.
    pub async fn reset(&self, user: &UserId) -> bool {
        let Some(mut guard) = self.lock_existing(user).await else {
            return false;
        };
        let existed = !guard.slot.turns.is_empty();
        guard.slot.turns.clear();
        existed
    }

    /// Remove the most recent exchange (see [`HistoryGuard::forget_last_exchange`]).
    pub async fn forget_last_exchange(&self, user: &UserId) -> ForgetOutcome {
        match self.lock_existing(user).await {
            Some(mut guard) => guard.forget_last_exchange(),
            None => ForgetOutcome::NothingToForget,
        }
    }

    /// Number of users with a non-empty history.
    pub fn user_count(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn remove_if_current(&self, user: &UserId, handle: &SlotHandle) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots.get(user).is_some_and(|current| Arc::ptr_eq(current, handle)) {
            slots.remove(user);
        }
    }
}

/// Exclusive, scoped access to one user's history.
pub struct HistoryGuard<'a> {
    store: &'a HistoryStore,
    user: UserId,
    handle: SlotHandle,
    slot: OwnedMutexGuard<Slot>,
    /// Turns pushed out of the window by the last provisional append.
    evicted: Vec<Turn>,
    /// A provisional turn awaits commit, keep or rollback.
    pending: bool,
}

impl HistoryGuard<'_> {
    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn turns(&self) -> &[Turn] {
        &self.slot.turns
    }

    pub fn len(&self) -> usize {
        self.slot.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.turns.is_empty()
    }

    /// Append the user's question ahead of the remote call and return the
    /// window to send.
    pub fn append_provisional(&mut self, turn: Turn) -> &[Turn] {
        self.slot.turns.push(turn);
        self.evicted = self.truncate();
        self.pending = true;
        &self.slot.turns
    }

    /// Append the model's answer, settling the provisional turn.
    pub fn commit_model_turn(&mut self, turn: Turn) -> &[Turn] {
        self.slot.turns.push(turn);
        self.truncate();
        self.evicted.clear();
        self.pending = false;
        &self.slot.turns
    }

    /// Settle a provisional turn by leaving it in place without an answer.
    pub fn keep_provisional(&mut self) {
        self.evicted.clear();
        self.pending = false;
    }

    /// Undo a provisional append: removes the last turn iff it is a user turn.
    ///
    /// Turns that the provisional append pushed out of the window are put
    /// back, so append followed by rollback leaves the history unchanged.
    pub fn rollback_last_if_user(&mut self) -> bool {
        self.pending = false;
        if !self.slot.turns.last().is_some_and(Turn::is_user) {
            return false;
        }
        self.slot.turns.pop();
        if !self.evicted.is_empty() {
            let restored = std::mem::take(&mut self.evicted);
            self.slot.turns.splice(0..0, restored);
        }
        true
    }

    /// Remove the most recent exchange.
    ///
    /// A trailing `(user, model)` pair is removed as a unit. Any other
    /// non-empty tail loses exactly one turn.
    pub fn forget_last_exchange(&mut self) -> ForgetOutcome {
        self.evicted.clear();
        self.pending = false;
        let turns = &mut self.slot.turns;
        let n = turns.len();

        if n >= 2 && turns[n - 2].role == Role::User && turns[n - 1].role == Role::Model {
            let answer = turns.pop();
            let question = turns.pop();
            if let (Some(question), Some(answer)) = (question, answer) {
                return ForgetOutcome::RemovedPair { question, answer };
            }
        }

        match turns.pop() {
            Some(turn) if n == 1 => ForgetOutcome::RemovedSingle { turn },
            Some(turn) => ForgetOutcome::RemovedOneFallback { turn },
            None => ForgetOutcome::NothingToForget,
        }
    }

    fn truncate(&mut self) -> Vec<Turn> {
        let cap = self.store.capacity();
        let len = self.slot.turns.len();
        if len <= cap {
            return Vec::new();
        }
        debug!(user = %self.user, dropped = len - cap, "Trimming history window");
        self.slot.turns.drain(..len - cap).collect()
    }
}

impl Drop for HistoryGuard<'_> {
    fn drop(&mut self) {
        if self.pending {
            debug!(user = %self.user, "Rolling back unsettled provisional turn");
            self.rollback_last_if_user();
        }
        if self.slot.turns.is_empty() && !self.slot.retired {
            self.slot.retired = true;
            self.store.remove_if_current(&self.user, &self.handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn user(id: &str) -> UserId {
        UserId::from(id)
    }

    async fn exchange(store: &HistoryStore, who: &UserId, n: usize) {
        let mut guard = store.lock(who).await;
        guard.append_provisional(Turn::user(format!("q{n}")));
        guard.commit_model_turn(Turn::model(format!("a{n}")));
    }

    #[tokio::test]
    async fn get_on_unknown_user_is_empty_and_creates_nothing() {
        let store = HistoryStore::new(10);
        assert!(store.get(&user("nobody")).await.is_empty());
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn append_returns_window_including_question() {
        let store = HistoryStore::new(10);
        let alice = user("alice");
        let mut guard = store.lock(&alice).await;
        let window = guard.append_provisional(Turn::user("hello"));
        assert_eq!(window, &[Turn::user("hello")]);
    }

    #[tokio::test]
    async fn window_never_exceeds_capacity() {
        let store = HistoryStore::new(3);
        let alice = user("alice");
        for n in 0..10 {
            let mut guard = store.lock(&alice).await;
            assert!(guard.append_provisional(Turn::user(format!("q{n}"))).len() <= 6);
            assert!(guard.commit_model_turn(Turn::model(format!("a{n}"))).len() <= 6);
        }
        let turns = store.get(&alice).await;
        assert_eq!(turns.len(), 6);
        assert_eq!(turns[0], Turn::user("q7"));
        assert_eq!(turns[5], Turn::model("a9"));
    }

    #[tokio::test]
    async fn rollback_cancels_provisional_append() {
        let store = HistoryStore::new(10);
        let alice = user("alice");
        exchange(&store, &alice, 0).await;
        let before = store.get(&alice).await;

        let mut guard = store.lock(&alice).await;
        guard.append_provisional(Turn::user("doomed"));
        assert!(guard.rollback_last_if_user());
        drop(guard);

        assert_eq!(store.get(&alice).await, before);
    }

    #[tokio::test]
    async fn rollback_restores_turns_evicted_by_the_append() {
        let store = HistoryStore::new(2);
        let alice = user("alice");
        exchange(&store, &alice, 0).await;
        exchange(&store, &alice, 1).await;
        let before = store.get(&alice).await;
        assert_eq!(before.len(), 4);

        let mut guard = store.lock(&alice).await;
        let window = guard.append_provisional(Turn::user("q2"));
        assert_eq!(window.len(), 4);
        assert_eq!(window[0], Turn::model("a0"));
        guard.rollback_last_if_user();
        drop(guard);

        assert_eq!(store.get(&alice).await, before);
    }

    #[tokio::test]
    async fn rollback_is_noop_when_last_turn_is_model() {
        let store = HistoryStore::new(10);
        let alice = user("alice");
        exchange(&store, &alice, 0).await;
        let mut guard = store.lock(&alice).await;
        assert!(!guard.rollback_last_if_user());
        assert_eq!(guard.len(), 2);
    }

    #[tokio::test]
    async fn emptied_history_is_pruned() {
        let store = HistoryStore::new(10);
        let alice = user("alice");
        let mut guard = store.lock(&alice).await;
        guard.append_provisional(Turn::user("q"));
        guard.rollback_last_if_user();
        drop(guard);

        assert_eq!(store.user_count(), 0);
        assert!(!store.reset(&alice).await);
    }

    #[tokio::test]
    async fn reset_reports_whether_history_existed() {
        let store = HistoryStore::new(10);
        let alice = user("alice");
        assert!(!store.reset(&alice).await);

        exchange(&store, &alice, 0).await;
        assert!(store.reset(&alice).await);
        assert!(store.get(&alice).await.is_empty());
        assert!(!store.reset(&alice).await);
    }

    #[tokio::test]
    async fn forget_removes_trailing_pair() {
        let store = HistoryStore::new(10);
        let alice = user("alice");
        exchange(&store, &alice, 0).await;
        exchange(&store, &alice, 1).await;

        let outcome = store.forget_last_exchange(&alice).await;
        assert_eq!(
            outcome,
            ForgetOutcome::RemovedPair {
                question: Turn::user("q1"),
                answer: Turn::model("a1"),
            }
        );
        assert_eq!(store.get(&alice).await.len(), 2);
    }

    #[tokio::test]
    async fn forget_single_unanswered_turn_then_nothing() {
        let store = HistoryStore::new(10);
        let alice = user("alice");
        {
            let mut guard = store.lock(&alice).await;
            guard.append_provisional(Turn::user("unanswered"));
            guard.keep_provisional();
        }

        assert_eq!(
            store.forget_last_exchange(&alice).await,
            ForgetOutcome::RemovedSingle { turn: Turn::user("unanswered") }
        );
        assert_eq!(
            store.forget_last_exchange(&alice).await,
            ForgetOutcome::NothingToForget
        );
    }

    #[tokio::test]
    async fn forget_irregular_tail_removes_only_one_turn() {
        let store = HistoryStore::new(10);
        let alice = user("alice");
        exchange(&store, &alice, 0).await;
        // A kept question with no answer, as after a stopped generation.
        {
            let mut guard = store.lock(&alice).await;
            guard.append_provisional(Turn::user("kept"));
            guard.keep_provisional();
        }

        assert_eq!(
            store.forget_last_exchange(&alice).await,
            ForgetOutcome::RemovedOneFallback { turn: Turn::user("kept") }
        );
        assert_eq!(store.get(&alice).await, vec![Turn::user("q0"), Turn::model("a0")]);
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let store = HistoryStore::new(10);
        exchange(&store, &user("alice"), 0).await;
        assert!(store.get(&user("bob")).await.is_empty());
        assert!(!store.reset(&user("bob")).await);
        assert_eq!(store.get(&user("alice")).await.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn same_user_requests_are_serialized() {
        let store = Arc::new(HistoryStore::new(50));
        let alice = user("alice");

        let tasks = (0..8).map(|n| {
            let store = Arc::clone(&store);
            let alice = alice.clone();
            tokio::spawn(async move {
                let mut guard = store.lock(&alice).await;
                guard.append_provisional(Turn::user(format!("q{n}")));
                tokio::time::sleep(Duration::from_millis(5)).await;
                guard.commit_model_turn(Turn::model(format!("a{n}")));
            })
        });
        for result in futures::future::join_all(tasks).await {
            result.unwrap();
        }

        let turns = store.get(&alice).await;
        assert_eq!(turns.len(), 16);
        for pair in turns.chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Model);
            assert_eq!(pair[0].text[1..], pair[1].text[1..]);
        }
    }

    #[tokio::test]
    async fn waiter_on_reset_slot_starts_fresh_history() {
        let store = Arc::new(HistoryStore::new(10));
        let alice = user("alice");
        exchange(&store, &alice, 0).await;

        let holder = store.lock(&alice).await;
        let waiter = {
            let store = Arc::clone(&store);
            let alice = alice.clone();
            tokio::spawn(async move {
                let mut guard = store.lock(&alice).await;
                guard.append_provisional(Turn::user("after"));
                guard.keep_provisional();
            })
        };
        tokio::task::yield_now().await;

        // Empty the slot while the waiter is parked on it.
        let mut holder = holder;
        holder.forget_last_exchange();
        drop(holder);
        waiter.await.unwrap();

        assert_eq!(store.get(&alice).await, vec![Turn::user("after")]);
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn dropping_guard_mid_request_releases_lock() {
        let store = HistoryStore::new(10);
        let alice = user("alice");
        let pending = async {
            let mut guard = store.lock(&alice).await;
            guard.append_provisional(Turn::user("q"));
            std::future::pending::<()>().await;
        };
        let timed_out = tokio::time::timeout(Duration::from_millis(10), pending).await;
        assert!(timed_out.is_err());

        // The abandoned provisional turn is rolled back and the lock released.
        let turns = tokio::time::timeout(Duration::from_secs(1), store.get(&alice))
            .await
            .unwrap();
        assert!(turns.is_empty());
        assert_eq!(store.user_count(), 0);
    }
}

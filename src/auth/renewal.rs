//! Single-flight credential renewal with replay of stalled calls
//!
//! [`RenewalCoordinator`] owns the `Idle`/`Refreshing` state and the queue of
//! calls waiting for a fresh credential. Entry into `Refreshing` is a
//! check-and-set under one mutex with no await in between, so any number of
//! concurrent authorization failures collapse into one renewal call.
//!
//! The renewal itself runs on a spawned task. Dropping a waiting caller's
//! future therefore never strands the coordinator in `Refreshing`; the task
//! always drains the queue and returns to `Idle`.
//!
//! Login and logout go through [`RenewalCoordinator::reset_session`], which
//! bumps a session epoch. A renewal that settles after the epoch moved does
//! not touch the credential store and does not publish session expiry.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;

use super::credential::CredentialStore;
use super::expiry::SessionExpiryBus;
use super::unauthenticated::UnauthenticatedChannel;
use crate::callbacks::SessionEnded;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};
use crate::types::AccessToken;

/// Renewal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalState {
    /// No renewal outstanding
    Idle,
    /// One renewal call is in flight
    Refreshing,
}

/// A call waiting for the in-flight renewal to settle
#[derive(Debug)]
pub struct PendingReplay {
    request: ApiRequest,
    reply: oneshot::Sender<Result<ApiResponse>>,
}

impl PendingReplay {
    /// The call that will be replayed
    #[must_use]
    pub fn request(&self) -> &ApiRequest {
        &self.request
    }
}

#[derive(Debug)]
struct Shared {
    state: RenewalState,
    // Bumped on every login and logout
    epoch: u64,
    queue: VecDeque<PendingReplay>,
    // Callers that want the renewed credential itself rather than a replay
    token_waiters: Vec<oneshot::Sender<Result<AccessToken>>>,
}

impl Shared {
    fn waiting(&self) -> usize {
        self.queue.len() + self.token_waiters.len()
    }
}

struct Inner {
    transport: Arc<dyn HttpTransport>,
    unauthenticated: UnauthenticatedChannel,
    store: CredentialStore,
    bus: SessionExpiryBus,
    renewal_timeout: Duration,
    max_pending: usize,
    renewals: AtomicU64,
    shared: Mutex<Shared>,
}

/// What the caller does after the state check
enum Entry {
    /// Credential already replaced since the call was sent
    ReplayNow(AccessToken),
    /// Wait on the in-flight renewal
    Wait(oneshot::Receiver<Result<ApiResponse>>),
}

/// How a renewal ended, decided under the lock
enum Settled {
    Renewed(AccessToken),
    Expired(String),
    /// Login or logout happened meanwhile; carries the credential now in the store
    Superseded(Option<AccessToken>),
}

/// Coordinates one renewal at a time and replays every call that hit an
/// authorization failure while it was pending.
///
/// Cloning yields a handle to the same coordinator.
#[derive(Clone)]
pub struct RenewalCoordinator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for RenewalCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenewalCoordinator")
            .field("state", &self.state())
            .field("pending", &self.pending())
            .field("renewals", &self.renewal_count())
            .finish_non_exhaustive()
    }
}

impl RenewalCoordinator {
    /// Create a coordinator.
    ///
    /// `transport` replays calls with the renewed credential; `unauthenticated`
    /// performs the renewal itself.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        unauthenticated: UnauthenticatedChannel,
        store: CredentialStore,
        bus: SessionExpiryBus,
        config: &ClientConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                unauthenticated,
                store,
                bus,
                renewal_timeout: config.renewal_timeout,
                max_pending: config.max_pending_replays,
                renewals: AtomicU64::new(0),
                shared: Mutex::new(Shared {
                    state: RenewalState::Idle,
                    epoch: 0,
                    queue: VecDeque::new(),
                    token_waiters: Vec::new(),
                }),
            }),
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> RenewalState {
        self.lock().state
    }

    /// Number of callers waiting on the in-flight renewal
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().waiting()
    }

    /// Number of renewal calls started since creation
    #[must_use]
    pub fn renewal_count(&self) -> u64 {
        self.inner.renewals.load(Ordering::SeqCst)
    }

    /// The credential store this coordinator updates
    #[must_use]
    pub fn store(&self) -> &CredentialStore {
        &self.inner.store
    }

    /// Replace the session credential and start a new session epoch.
    ///
    /// `Some` installs the credential from a fresh login, `None` ends the
    /// session. A renewal still in flight keeps running but its outcome is
    /// discarded: its waiters are replayed with the new credential, or
    /// rejected if there is none, and no session expiry is published.
    pub fn reset_session(&self, token: Option<AccessToken>) {
        let mut shared = self.lock();
        shared.epoch = shared.epoch.wrapping_add(1);
        match token {
            Some(token) => self.inner.store.set(token),
            None => self.inner.store.clear(),
        }
        tracing::debug!(epoch = shared.epoch, "Session reset");
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.inner
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Recover from an authorization failure on `request` and replay it.
    ///
    /// Joins the in-flight renewal if there is one, otherwise starts one.
    /// The request is expected to be marked as retried already.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::SessionExpired` if the renewal fails,
    /// `ClientError::ReplayQueueFull` if too many calls are already waiting,
    /// or whatever the replay itself returns.
    pub async fn recover_and_retry(&self, request: ApiRequest) -> Result<ApiResponse> {
        let entry = {
            let mut shared = self.lock();
            match shared.state {
                RenewalState::Idle => match self.replaced_credential(&request) {
                    Some(current) => Entry::ReplayNow(current),
                    None => {
                        let (reply, rx) = oneshot::channel();
                        shared.queue.push_back(PendingReplay {
                            request: request.clone(),
                            reply,
                        });
                        self.begin_renewal(&mut shared);
                        Entry::Wait(rx)
                    }
                },
                RenewalState::Refreshing => {
                    if shared.waiting() >= self.inner.max_pending {
                        tracing::warn!(
                            path = %request.path(),
                            capacity = self.inner.max_pending,
                            "Replay queue full; rejecting call"
                        );
                        return Err(ClientError::ReplayQueueFull {
                            capacity: self.inner.max_pending,
                        });
                    }
                    let (reply, rx) = oneshot::channel();
                    shared.queue.push_back(PendingReplay {
                        request: request.clone(),
                        reply,
                    });
                    tracing::debug!(
                        path = %request.path(),
                        queued = shared.queue.len(),
                        "Joined in-flight renewal"
                    );
                    Entry::Wait(rx)
                }
            }
        };

        match entry {
            Entry::ReplayNow(current) => {
                tracing::debug!(
                    path = %request.path(),
                    "Credential already renewed; replaying with current credential"
                );
                let request = request.with_credential(Some(current));
                self.inner.transport.execute(&request).await
            }
            Entry::Wait(rx) => rx.await.unwrap_or(Err(ClientError::ReplayAbandoned)),
        }
    }

    /// Obtain a fresh credential, sharing any renewal already in flight.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::SessionExpired` if the renewal fails or
    /// `ClientError::ReplayQueueFull` if too many callers are already waiting.
    pub async fn renew_now(&self) -> Result<AccessToken> {
        let rx = {
            let mut shared = self.lock();
            if shared.state == RenewalState::Refreshing
                && shared.waiting() >= self.inner.max_pending
            {
                return Err(ClientError::ReplayQueueFull {
                    capacity: self.inner.max_pending,
                });
            }
            let (tx, rx) = oneshot::channel();
            shared.token_waiters.push(tx);
            if shared.state == RenewalState::Idle {
                self.begin_renewal(&mut shared);
            }
            rx
        };

        rx.await.unwrap_or(Err(ClientError::ReplayAbandoned))
    }

    /// The current credential, if it differs from the one `request` was sent with
    fn replaced_credential(&self, request: &ApiRequest) -> Option<AccessToken> {
        let current = self.inner.store.get()?;
        if request.credential() == Some(&current) {
            None
        } else {
            Some(current)
        }
    }

    /// Enter `Refreshing` and start the renewal task. Caller holds the lock.
    fn begin_renewal(&self, shared: &mut Shared) {
        shared.state = RenewalState::Refreshing;
        self.inner.renewals.fetch_add(1, Ordering::SeqCst);
        tracing::info!("Access credential rejected; starting renewal");

        let coordinator = self.clone();
        let epoch = shared.epoch;
        tokio::spawn(async move { coordinator.run_renewal(epoch).await });
    }

    async fn run_renewal(self, epoch: u64) {
        let timeout = self.inner.renewal_timeout;
        let outcome =
            match tokio::time::timeout(timeout, self.inner.unauthenticated.renew()).await {
                Ok(Ok(token)) => Ok(token),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err(format!("renewal timed out after {}s", timeout.as_secs_f32())),
            };

        // Leaving Refreshing, taking the queue and updating the store happen
        // in one critical section so no waiter slips between them.
        let (settled, queue, token_waiters) = {
            let mut shared = self.lock();
            shared.state = RenewalState::Idle;
            let queue = std::mem::take(&mut shared.queue);
            let token_waiters = std::mem::take(&mut shared.token_waiters);

            let settled = if shared.epoch != epoch {
                Settled::Superseded(self.inner.store.get())
            } else {
                match outcome {
                    Ok(token) => {
                        self.inner.store.set(token.clone());
                        Settled::Renewed(token)
                    }
                    Err(reason) => {
                        self.inner.store.clear();
                        Settled::Expired(reason)
                    }
                }
            };
            (settled, queue, token_waiters)
        };

        match settled {
            Settled::Renewed(token) => self.settle_success(token, queue, token_waiters).await,
            Settled::Expired(reason) => self.settle_failure(reason, queue, token_waiters).await,
            Settled::Superseded(current) => {
                tracing::info!(
                    queued = queue.len(),
                    "Session changed during renewal; discarding its outcome"
                );
                self.settle_superseded(queue, token_waiters, current).await;
            }
        }
    }

    async fn settle_success(
        &self,
        token: AccessToken,
        queue: VecDeque<PendingReplay>,
        token_waiters: Vec<oneshot::Sender<Result<AccessToken>>>,
    ) {
        tracing::info!(queued = queue.len(), "Credential renewed; replaying calls");

        for waiter in token_waiters {
            let _ = waiter.send(Ok(token.clone()));
        }
        self.replay_all(queue, token).await;
    }

    /// Replay queued calls with `token`; starts are in enqueue order,
    /// completions may interleave
    async fn replay_all(&self, queue: VecDeque<PendingReplay>, token: AccessToken) {
        let replays = queue.into_iter().map(|pending| {
            let transport = Arc::clone(&self.inner.transport);
            let token = token.clone();
            async move {
                let request = pending.request.with_credential(Some(token));
                tracing::debug!(
                    path = %request.path(),
                    retried = request.is_retried(),
                    "Replaying call"
                );
                let result = transport.execute(&request).await;
                if pending.reply.send(result).is_err() {
                    tracing::debug!(path = %request.path(), "Replay finished after caller left");
                }
            }
        });
        futures::future::join_all(replays).await;
    }

    async fn settle_failure(
        &self,
        reason: String,
        queue: VecDeque<PendingReplay>,
        token_waiters: Vec<oneshot::Sender<Result<AccessToken>>>,
    ) {
        tracing::warn!(
            reason = %reason,
            queued = queue.len(),
            "Credential renewal failed; session expired"
        );

        for pending in queue {
            let _ = pending.reply.send(Err(ClientError::session_expired(&reason)));
        }
        for waiter in token_waiters {
            let _ = waiter.send(Err(ClientError::session_expired(&reason)));
        }

        if self.inner.bus.is_on_login_surface() {
            tracing::debug!("Already on login surface; not publishing session expiry");
        } else {
            self.inner.bus.publish(SessionEnded::new(reason)).await;
        }
    }

    /// Login or logout happened while the renewal ran. The store already
    /// holds the new session's credential, or nothing after a logout.
    async fn settle_superseded(
        &self,
        queue: VecDeque<PendingReplay>,
        token_waiters: Vec<oneshot::Sender<Result<AccessToken>>>,
        current: Option<AccessToken>,
    ) {
        match current {
            Some(token) => {
                for waiter in token_waiters {
                    let _ = waiter.send(Ok(token.clone()));
                }
                self.replay_all(queue, token).await;
            }
            None => {
                const SIGNED_OUT: &str = "Signed out during renewal";
                for pending in queue {
                    let _ = pending.reply.send(Err(ClientError::session_expired(SIGNED_OUT)));
                }
                for waiter in token_waiters {
                    let _ = waiter.send(Err(ClientError::session_expired(SIGNED_OUT)));
                }
            }
        }
    }
}

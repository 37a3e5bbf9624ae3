//! Single-flight access-token refresh.
//!
//! [`RefreshCoordinator`] is a two-state machine, `IDLE` and `REFRESHING`,
//! held in [`RefreshState`]. The first authorization failure to arrive
//! while idle becomes the leader of a refresh cycle and performs the
//! exchange; every failure arriving while the cycle is in flight queues a
//! [`oneshot`] sender and waits. When the exchange settles, the flag is
//! reset and the queue drained in one critical section, and every waiter
//! receives the same outcome.
//!
//! The check-and-set on the flag happens under a mutex that is never held
//! across an await, so it stays atomic on a multi-threaded runtime.

use std::mem;
use std::sync::{Arc, Mutex, PoisonError};

use reqwest::Url;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::error::{ClientError, RefreshError};
use crate::navigator::LoginNavigator;
use crate::session::TokenStore;

type Outcome = Result<String, RefreshError>;

/// Shared refresh flag plus the queue of requests waiting on it.
///
/// `waiters` is only non-empty while `refreshing` is true.
#[derive(Debug, Default)]
struct RefreshState {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<Outcome>>,
}

/// Tokens returned by a successful refresh exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

enum Ticket {
    Lead,
    Wait(oneshot::Receiver<Outcome>),
    Reuse(String),
    /// The request carried a token but the session has since been cleared
    /// by an earlier cycle, which already redirected.
    Ended,
}

/// Coordinates token refreshes for one [`ApiClient`](crate::ApiClient).
pub struct RefreshCoordinator {
    http: reqwest::Client,
    refresh_url: Url,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn LoginNavigator>,
    login_path: String,
    rotate_refresh_token: bool,
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    /// `http` must be a client with no interception of its own; the
    /// exchange is sent on it directly, outside the request pipeline.
    pub fn new(
        http: reqwest::Client,
        refresh_url: Url,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn LoginNavigator>,
        login_path: String,
        rotate_refresh_token: bool,
    ) -> Self {
        Self {
            http,
            refresh_url,
            store,
            navigator,
            login_path,
            rotate_refresh_token,
            state: Mutex::new(RefreshState::default()),
        }
    }

    /// True while a refresh exchange is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.lock_state().refreshing
    }

    /// Obtain an access token to replay a request that failed with 401.
    ///
    /// `sent_with` is the token the failed request carried and `original`
    /// the error it produced. Returns the token to replay with, or the
    /// error the caller should see:
    ///
    /// - If no cycle is running and the store already holds a different
    ///   token than `sent_with`, a refresh completed after the request was
    ///   sent; that token is returned without a new exchange.
    /// - If no cycle is running and the store is empty although the request
    ///   carried a token, an earlier cycle already ended the session; this
    ///   fails with [`RefreshError::MissingRefreshToken`] without another
    ///   redirect.
    /// - If no cycle is running otherwise, this call leads a new cycle.
    /// - If a cycle is running, this call waits for its outcome.
    pub async fn recover(
        &self,
        sent_with: Option<&str>,
        original: ClientError,
    ) -> Result<String, ClientError> {
        let ticket = {
            let mut state = self.lock_state();
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Ticket::Wait(rx)
            } else {
                match (self.store.access_token(), sent_with) {
                    (Some(current), _) if Some(current.as_str()) != sent_with => {
                        Ticket::Reuse(current)
                    }
                    (None, Some(_)) => Ticket::Ended,
                    _ => {
                        state.refreshing = true;
                        Ticket::Lead
                    }
                }
            }
        };

        match ticket {
            Ticket::Ended => {
                tracing::debug!("Session ended after request was sent");
                Err(ClientError::SessionExpired(RefreshError::MissingRefreshToken))
            }
            Ticket::Reuse(token) => {
                tracing::debug!("Access token changed since request was sent, replaying");
                Ok(token)
            }
            Ticket::Wait(rx) => {
                tracing::debug!("Refresh in flight, request queued");
                match rx.await {
                    Ok(Ok(token)) => Ok(token),
                    Ok(Err(e)) => Err(ClientError::SessionExpired(e)),
                    Err(_) => Err(ClientError::SessionExpired(RefreshError::Abandoned)),
                }
            }
            Ticket::Lead => self.lead(original).await,
        }
    }

    async fn lead(&self, original: ClientError) -> Result<String, ClientError> {
        let mut cycle = Cycle::new(self);

        let Some(refresh_token) = self.store.refresh_token() else {
            tracing::warn!("Authorization failed and no refresh token is stored");
            self.end_session();
            cycle.settle(Err(RefreshError::MissingRefreshToken));
            return Err(original);
        };

        tracing::info!("Access token rejected, refreshing");

        match self.exchange(&refresh_token).await {
            Ok(grant) => {
                self.store.set_access_token(&grant.access_token);
                if self.rotate_refresh_token {
                    if let Some(rotated) = &grant.refresh_token {
                        self.store.set_refresh_token(rotated);
                    }
                }
                let waiting = cycle.settle(Ok(grant.access_token.clone()));
                tracing::info!(replayed = waiting + 1, "Access token refreshed");
                Ok(grant.access_token)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed");
                self.end_session();
                cycle.settle(Err(e.clone()));
                Err(ClientError::SessionExpired(e))
            }
        }
    }

    /// Exchange `refresh_token` for a new access token.
    pub async fn exchange(&self, refresh_token: &str) -> Result<TokenGrant, RefreshError> {
        let response = self
            .http
            .post(self.refresh_url.clone())
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                message: crate::pipeline::error_message(&body),
            });
        }

        parse_grant(&body).ok_or(RefreshError::MalformedResponse)
    }

    fn end_session(&self) {
        self.store.clear_session();
        self.navigator.navigate_to_login(&self.login_path);
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One leader's hold on the `REFRESHING` state.
///
/// Dropping it unsettled (the leading future was cancelled) settles the
/// cycle as [`RefreshError::Abandoned`] so waiters never hang and the flag
/// never sticks.
struct Cycle<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl<'a> Cycle<'a> {
    fn new(coordinator: &'a RefreshCoordinator) -> Self {
        Self {
            coordinator,
            settled: false,
        }
    }

    /// Return to `IDLE` and deliver `outcome` to every waiter. Returns the
    /// number of waiters that were queued.
    fn settle(&mut self, outcome: Outcome) -> usize {
        let waiters = {
            let mut state = self.coordinator.lock_state();
            state.refreshing = false;
            mem::take(&mut state.waiters)
        };
        self.settled = true;

        let count = waiters.len();
        for tx in waiters {
            // A waiter whose caller went away has nothing to receive.
            let _ = tx.send(outcome.clone());
        }
        count
    }
}

impl Drop for Cycle<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("Refresh cycle dropped before completion");
            self.settle(Err(RefreshError::Abandoned));
        }
    }
}

/// Read the grant from `{ data: { accessToken } }` or `{ accessToken }`.
fn parse_grant(body: &[u8]) -> Option<TokenGrant> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let source = value
        .get("data")
        .filter(|d| d.is_object())
        .unwrap_or(&value);

    let access_token = source
        .get("accessToken")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())?
        .to_owned();
    let refresh_token = source
        .get("refreshToken")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_owned);

    Some(TokenGrant {
        access_token,
        refresh_token,
    })
}

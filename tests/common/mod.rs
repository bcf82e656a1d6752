//! Scripted in-memory backend shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use expensevista_client::auth::{
    CredentialStore, RenewalCoordinator, SessionExpiryBus, UnauthenticatedChannel,
};
use expensevista_client::callbacks::FnSessionExpiryHandler;
use expensevista_client::{
    ApiRequest, ApiResponse, AuthenticatedChannel, ClientConfig, HttpTransport, Result,
};
use reqwest::StatusCode;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const REFRESH: &str = "/api/auth/refresh";
pub const LOGOUT: &str = "/api/auth/logout";

/// What the next renewal call does
#[derive(Debug, Clone)]
pub enum Renewal {
    /// Issue this credential after the delay
    Issue(&'static str, Duration),
    /// Reject the session cookie after the delay
    Reject(Duration),
}

/// Backend that accepts exactly one bearer credential at a time.
///
/// Renewal calls pop the next scripted [`Renewal`]; with nothing scripted
/// they are rejected immediately. Every call is recorded with the
/// `Authorization` header it carried.
#[derive(Default)]
pub struct ScriptedBackend {
    valid: Mutex<Option<String>>,
    renewals: Mutex<VecDeque<Renewal>>,
    always_reject: Mutex<HashSet<String>>,
    log: Mutex<Vec<(String, Option<String>)>>,
    refresh_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Credential the backend currently accepts
    pub fn accept(&self, token: &str) {
        *self.valid.lock().unwrap() = Some(token.to_string());
    }

    pub fn script(&self, renewal: Renewal) {
        self.renewals.lock().unwrap().push_back(renewal);
    }

    /// Path that answers 401 whatever credential it carries
    pub fn reject_path(&self, path: &str) {
        self.always_reject.lock().unwrap().insert(path.to_string());
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// `Authorization` headers sent to `path`, in order
    pub fn headers_for(&self, path: &str) -> Vec<Option<String>> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, auth)| auth.clone())
            .collect()
    }

    async fn renew(&self) -> ApiResponse {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.renewals.lock().unwrap().pop_front();
        match next {
            Some(Renewal::Issue(token, delay)) => {
                tokio::time::sleep(delay).await;
                self.accept(token);
                ApiResponse::json_value(
                    StatusCode::OK,
                    &serde_json::json!({ "accessToken": token }),
                )
            }
            Some(Renewal::Reject(delay)) => {
                tokio::time::sleep(delay).await;
                ApiResponse::new(
                    StatusCode::UNAUTHORIZED,
                    r#"{"message":"Refresh token expired"}"#,
                )
            }
            None => ApiResponse::new(StatusCode::UNAUTHORIZED, ""),
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedBackend {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let auth = request.authorization();
        self.log
            .lock()
            .unwrap()
            .push((request.path().to_string(), auth.clone()));

        if request.path() == REFRESH {
            return Ok(self.renew().await);
        }

        let expected = self
            .valid
            .lock()
            .unwrap()
            .as_ref()
            .map(|token| format!("Bearer {token}"));
        let rejected = self.always_reject.lock().unwrap().contains(request.path());

        if rejected || auth.is_none() || auth != expected {
            return Ok(ApiResponse::new(StatusCode::UNAUTHORIZED, ""));
        }
        Ok(ApiResponse::json_value(
            StatusCode::OK,
            &serde_json::json!({ "path": request.path(), "auth": auth }),
        ))
    }
}

/// Route events to the test output; set `RUST_LOG=expensevista_client=debug`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The request layer wired over a [`ScriptedBackend`]
pub struct Harness {
    pub backend: Arc<ScriptedBackend>,
    pub store: CredentialStore,
    pub bus: SessionExpiryBus,
    pub coordinator: RenewalCoordinator,
    pub channel: AuthenticatedChannel,
    pub published: Arc<AtomicUsize>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        init_tracing();

        let backend = ScriptedBackend::new();
        let transport: Arc<dyn HttpTransport> = backend.clone();
        let config = Arc::new(config);
        let store = CredentialStore::new();
        let bus = SessionExpiryBus::new();

        let published = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&published);
        bus.subscribe(FnSessionExpiryHandler::new(move |_event| {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        }));

        let coordinator = RenewalCoordinator::new(
            Arc::clone(&transport),
            UnauthenticatedChannel::new(Arc::clone(&transport), Arc::clone(&config)),
            store.clone(),
            bus.clone(),
            &config,
        );
        let channel =
            AuthenticatedChannel::new(transport, store.clone(), coordinator.clone(), config);

        Self {
            backend,
            store,
            bus,
            coordinator,
            channel,
            published,
        }
    }

    pub fn published(&self) -> usize {
        self.published.load(Ordering::SeqCst)
    }

    /// Wait until the expiry handler has run at least once, then a little
    /// longer so a duplicate publication would be visible
    pub async fn settle_publications(&self) {
        let _ = tokio::time::timeout(Duration::from_secs(2), async {
            while self.published() == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

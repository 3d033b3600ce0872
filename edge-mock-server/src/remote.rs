use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use edge_client::{
    api::{Action, Article, AuthToken, Error as ApiError, Thread},
    Api, Error,
};
use tokio::sync::{Mutex, Semaphore};

use crate::MockServer;

/// Holds submitted actions until the test lets them through
#[derive(Clone)]
pub struct Gate {
    permits: Arc<Semaphore>,
    waiting: Arc<AtomicUsize>,
}

impl Gate {
    pub fn new() -> Gate {
        Gate {
            permits: Arc::new(Semaphore::new(0)),
            waiting: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of actions currently held
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Lets `n` held (or future) actions through
    pub fn release(&self, n: usize) {
        self.permits.add_permits(n);
    }

    async fn pass(&self) {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        // Never closed
        if let Ok(p) = self.permits.acquire().await {
            p.forget();
        }
        self.waiting.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for Gate {
    fn default() -> Gate {
        Gate::new()
    }
}

/// A client's view of a `MockServer`, logged in as one user or anonymous
#[derive(Clone)]
pub struct MockApi {
    server: Arc<Mutex<MockServer>>,
    token: Option<AuthToken>,
    gate: Option<Gate>,
    offline: Arc<AtomicBool>,
}

impl MockApi {
    pub fn new(server: Arc<Mutex<MockServer>>, token: Option<AuthToken>) -> MockApi {
        MockApi {
            server,
            token,
            gate: None,
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_gate(self, gate: Gate) -> MockApi {
        MockApi {
            gate: Some(gate),
            ..self
        }
    }

    /// While offline, every request fails without reaching the server
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), Error> {
        match self.offline.load(Ordering::SeqCst) {
            true => Err(Error::Transport(anyhow::anyhow!("mock server is unreachable"))),
            false => Ok(()),
        }
    }
}

#[async_trait]
impl Api for MockApi {
    async fn fetch_amas(&self) -> Result<Vec<Article>, Error> {
        self.check_online()?;
        Ok(self.server.lock().await.fetch_amas(self.token)?)
    }

    async fn fetch_feed(&self) -> Result<Vec<Article>, Error> {
        self.check_online()?;
        Ok(self.server.lock().await.fetch_feed(self.token)?)
    }

    async fn fetch_thread(&self, slug: &str) -> Result<Thread, Error> {
        self.check_online()?;
        Ok(self.server.lock().await.fetch_thread(self.token, slug)?)
    }

    async fn submit_action(&self, a: Action) -> Result<(), Error> {
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        self.check_online()?;
        let tok = self.token.ok_or(ApiError::Unauthenticated)?;
        Ok(self.server.lock().await.submit_action(tok, a).await?)
    }
}

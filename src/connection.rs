//! Process-wide connection cache.
//!
//! The first caller starts the one and only connection attempt; everyone who
//! arrives while it is in flight awaits that same attempt. A resolved handle is
//! kept and returned without further I/O. A failed attempt is delivered to all
//! of its waiters and then forgotten, so the next caller starts a fresh one.

use futures::future::{BoxFuture, FutureExt, Shared};
use futures::lock::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

use crate::database::{Database, DatabaseInfo};
use crate::error::Result;

type Attempt<T> = Shared<BoxFuture<'static, Result<T>>>;
type Connect<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

struct State<T> {
    connection: Option<T>,
    pending: Option<Attempt<T>>,
}

pub struct ConnectionCache<T> {
    connect: Connect<T>,
    state: Mutex<State<T>>,
}

impl<T> ConnectionCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a cache around an establishment routine. Nothing is started
    /// until the first call to [`ConnectionCache::get`].
    pub fn new<F>(connect: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<T>> + Send + Sync + 'static,
    {
        Self {
            connect: Arc::new(connect),
            state: Mutex::new(State {
                connection: None,
                pending: None,
            }),
        }
    }

    /// Get the cached handle, establishing it if this is the first call.
    pub async fn get(&self) -> Result<T> {
        let attempt = {
            let mut state = self.state.lock().await;
            if let Some(connection) = &state.connection {
                return Ok(connection.clone());
            }

            // An attempt that already failed is only waiting for its waiters
            // to clear it; joining it would hand out a stale error.
            match &state.pending {
                Some(attempt) if !matches!(attempt.peek(), Some(Err(_))) => attempt.clone(),
                _ => {
                    let attempt = (self.connect)().shared();
                    state.pending = Some(attempt.clone());
                    attempt
                }
            }
        };

        let result = attempt.clone().await;

        let mut state = self.state.lock().await;
        // Only the attempt we awaited may be settled here; a newer one
        // started by a later caller is left alone.
        let is_current = state
            .pending
            .as_ref()
            .is_some_and(|pending| pending.ptr_eq(&attempt));

        match &result {
            Ok(connection) => {
                if is_current {
                    state.pending = None;
                }
                if state.connection.is_none() {
                    state.connection = Some(connection.clone());
                }
            }
            Err(error) => {
                if is_current {
                    warn!("Connection attempt failed: {}", error);
                    state.pending = None;
                }
            }
        }

        result
    }

    /// Whether a handle has been established
    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.connection.is_some()
    }
}

impl ConnectionCache<Database> {
    /// Connection cache for the configured database
    pub fn from_info(info: DatabaseInfo) -> Self {
        Self::new(move || {
            let info = info.clone();
            async move {
                let db = info.connect().await?;
                info!("Database connected");
                Ok(db)
            }
            .boxed()
        })
    }
}

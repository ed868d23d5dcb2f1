//!
//! Connection acceptance and process bootstrap.
//!
//! Bind, then one handler per accepted connection, the same shape as
//! a plain `tcp_server`/`accept_handler` pair — generalized to Tokio's
//! async accept loop, one `spawn`ed task per connection instead of a
//! single-threaded reactor registering a file event per socket.

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::db::Keyspace;
use crate::dispatch::handle_connection;
use crate::persistence;
use crate::pubsub::Registry;

/// Loads the persisted keyspace (if any), binds the listener, and
/// accepts connections until the process is killed. Bind failure is
/// the one fatal condition: it propagates out for `main` to log and
/// exit nonzero.
pub async fn run(config: Config) -> std::io::Result<()> {
    let db = Arc::new(Keyspace::new());
    match persistence::load(&config.dump_path) {
        Ok(entries) => {
            let count = entries.len();
            db.restore(entries);
            log::info!("loaded {count} keys from '{}'", config.dump_path);
        }
        Err(e) => log::warn!("could not load '{}', starting empty: {e}", config.dump_path),
    }
    let registry = Arc::new(Registry::new());
    let config = Arc::new(config);

    let listener = TcpListener::bind(config.addr).await?;
    log::info!("redlite listening on {}", config.addr);

    spawn_sweep_task(db.clone(), config.sweep_interval);

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                log::error!("accept failed: {e}");
                continue;
            }
        };
        log::debug!("accepted connection from {peer}");
        let db = db.clone();
        let registry = registry.clone();
        let config = config.clone();
        tokio::spawn(async move {
            handle_connection(stream, db, registry, config).await;
            log::debug!("connection from {peer} closed");
        });
    }
}

/// The proactive expiry sweep: a full scan under the keyspace lock
/// every `interval`, the async-runtime-native equivalent of a periodic
/// cron callback.
fn spawn_sweep_task(db: Arc<Keyspace>, interval: std::time::Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let swept = db.sweep_expired();
            if swept > 0 {
                log::debug!("expiration sweep removed {swept} keys");
            }
        }
    });
}

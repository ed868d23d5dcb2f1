//!
//! Publish/subscribe fan-out.
//!
//! Grounded on the original source's `cache/pubsub.go`: a channel name
//! maps to a list of subscribers, `IsAlreadySubscribed` guards against
//! double-subscribing the same client, and a client that disconnects is
//! scrubbed from every channel it belongs to
//! (`removeClientFromAllChannels`). `publish` snapshots the subscriber
//! list under the registry lock and releases it before writing to any
//! socket, so one slow subscriber cannot stall the registry for other
//! publishers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex as SyncMutex;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex as AsyncMutex;

use crate::resp::Frame;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

pub fn next_client_id() -> u64 {
    NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed)
}

type Writer = dyn AsyncWrite + Unpin + Send;

/// A subscriber's identity plus a handle to its serialized output
/// stream. Channels hold clones of this (cheap — an `Arc` bump) rather
/// than a back-reference to the whole client, so the registry never
/// needs to know about anything but sockets and ids.
#[derive(Clone)]
pub struct ClientHandle {
    pub id: u64,
    writer: Arc<AsyncMutex<Box<Writer>>>,
}

impl ClientHandle {
    pub fn new(id: u64, writer: Arc<AsyncMutex<Box<Writer>>>) -> Self {
        ClientHandle { id, writer }
    }

    /// Writes one frame to this client's socket. A failure means the
    /// peer is gone; the caller removes it from the registry.
    pub async fn send(&self, frame: &Frame) -> std::io::Result<()> {
        let mut buf = Vec::new();
        frame.encode(&mut buf);
        let mut writer = self.writer.lock().await;
        writer.write_all(&buf).await
    }
}

/// Channel -> subscriber fan-out table.
pub struct Registry {
    channels: SyncMutex<HashMap<String, Vec<ClientHandle>>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry { channels: SyncMutex::new(HashMap::new()) }
    }

    /// Subscribes `client` to `channel` unless already subscribed.
    /// Returns the channel's subscriber count afterward.
    pub fn subscribe(&self, channel: &str, client: ClientHandle) -> usize {
        let mut channels = self.channels.lock();
        let subscribers = channels.entry(channel.to_string()).or_default();
        if !subscribers.iter().any(|c| c.id == client.id) {
            subscribers.push(client);
        }
        subscribers.len()
    }

    /// Unsubscribes `client_id` from `channel`, dropping the channel
    /// entirely once its subscriber list is empty. Returns the
    /// remaining subscriber count (0 if the channel didn't exist).
    pub fn unsubscribe(&self, channel: &str, client_id: u64) -> usize {
        let mut channels = self.channels.lock();
        let remaining = match channels.get_mut(channel) {
            Some(subscribers) => {
                subscribers.retain(|c| c.id != client_id);
                subscribers.len()
            }
            None => return 0,
        };
        if remaining == 0 {
            channels.remove(channel);
        }
        remaining
    }

    /// Removes `client_id` from every channel (client disconnect, or
    /// dead-subscriber cleanup after a failed publish write).
    pub fn remove_everywhere(&self, client_id: u64) {
        let mut channels = self.channels.lock();
        channels.retain(|_, subscribers| {
            subscribers.retain(|c| c.id != client_id);
            !subscribers.is_empty()
        });
    }

    fn snapshot(&self, channel: &str) -> Vec<ClientHandle> {
        self.channels.lock().get(channel).cloned().unwrap_or_default()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.lock().len()
    }

    /// Delivers `message` to every current subscriber of `channel`.
    /// Returns the number of subscribers it reached.
    pub async fn publish(&self, channel: &str, message: &str) -> usize {
        let subscribers = self.snapshot(channel);
        let frame = Frame::bulk_array(["message", channel, message]);
        let mut delivered = 0;
        let mut dead = Vec::new();
        for client in &subscribers {
            match client.send(&frame).await {
                Ok(()) => delivered += 1,
                Err(_) => dead.push(client.id),
            }
        }
        for id in dead {
            self.remove_everywhere(id);
        }
        delivered
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

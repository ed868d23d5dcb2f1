//!
//! Per-connection client state.
//!
//! One struct per connection tracking transaction/subscription mode,
//! as a `flags`-bitfield alternative: three mutually exclusive modes,
//! `Normal`, `InTransaction` (queued commands awaiting `EXEC`/
//! `DISCARD`), and `InSubscription` (channel memberships, command
//! surface restricted to pub/sub + `PING`/`QUIT`).

use std::collections::HashSet;

use crate::pubsub::ClientHandle;

/// A client is in exactly one of these modes at a time (invariant: a
/// transaction and a subscription session never overlap).
pub enum Mode {
    Normal,
    InTransaction { queue: Vec<Vec<Vec<u8>>> },
    InSubscription { channels: HashSet<String> },
}

pub struct Client {
    pub id: u64,
    pub handle: ClientHandle,
    pub mode: Mode,
}

impl Client {
    pub fn new(id: u64, handle: ClientHandle) -> Self {
        Client { id, handle, mode: Mode::Normal }
    }

    pub fn in_transaction(&self) -> bool {
        matches!(self.mode, Mode::InTransaction { .. })
    }

    pub fn in_subscription(&self) -> bool {
        matches!(self.mode, Mode::InSubscription { .. })
    }

    pub fn begin_transaction(&mut self) {
        self.mode = Mode::InTransaction { queue: Vec::new() };
    }

    /// Queues one command. Panics if called outside a transaction —
    /// callers must check [`Client::in_transaction`] first.
    pub fn queue_command(&mut self, cmd: Vec<Vec<u8>>) {
        match &mut self.mode {
            Mode::InTransaction { queue } => queue.push(cmd),
            _ => unreachable!("queue_command called outside a transaction"),
        }
    }

    /// Ends the transaction, returning its queued commands in order.
    pub fn take_transaction(&mut self) -> Vec<Vec<Vec<u8>>> {
        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::InTransaction { queue } => queue,
            other => {
                self.mode = other;
                Vec::new()
            }
        }
    }

    pub fn subscribed_channels(&self) -> Vec<String> {
        match &self.mode {
            Mode::InSubscription { channels } => channels.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Records a new channel membership, entering subscription mode if
    /// this is the client's first subscription. Returns the client's
    /// total subscription count after the call.
    pub fn add_subscription(&mut self, channel: &str) -> usize {
        if !self.in_subscription() {
            self.mode = Mode::InSubscription { channels: HashSet::new() };
        }
        match &mut self.mode {
            Mode::InSubscription { channels } => {
                channels.insert(channel.to_string());
                channels.len()
            }
            _ => unreachable!(),
        }
    }

    /// Drops a channel membership, leaving subscription mode once none
    /// remain. Returns the client's remaining subscription count.
    pub fn remove_subscription(&mut self, channel: &str) -> usize {
        match &mut self.mode {
            Mode::InSubscription { channels } => {
                channels.remove(channel);
                let remaining = channels.len();
                if remaining == 0 {
                    self.mode = Mode::Normal;
                }
                remaining
            }
            _ => 0,
        }
    }
}

//!
//! The per-connection command dispatcher.
//!
//! One Tokio task per accepted connection: decode one frame, validate
//! its shape, route it through the transaction and subscription state
//! machine, and write back the reply frame(s). Each connection is an
//! independent `tokio::spawn`ed task rather than a callback registered
//! on a shared single-threaded reactor, so clients never block on each
//! other's I/O.

use std::sync::Arc;

use tokio::io::{AsyncWrite, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Mutex as AsyncMutex;

use crate::client::Client;
use crate::commands::{self, Ctx};
use crate::config::Config;
use crate::db::{is_keyspace_command, Keyspace};
use crate::error::RedliteError;
use crate::pubsub::{next_client_id, ClientHandle, Registry};
use crate::resp::{decode_frame, frame_as_command, Frame};

/// Commands the dispatcher writes directly to the socket itself rather
/// than via the usual "one reply frame per command" path, because they
/// can produce more than one reply frame (one per channel argument).
fn writes_its_own_replies(name: &str) -> bool {
    matches!(name, "SUBSCRIBE" | "UNSUBSCRIBE")
}

/// Runs the dispatcher loop for one accepted connection until the peer
/// disconnects or an unparseable frame closes it. A well-formed frame
/// of the wrong shape (not a non-empty array of bulk strings) replies
/// with a protocol error and keeps the connection open.
pub async fn handle_connection(stream: TcpStream, db: Arc<Keyspace>, registry: Arc<Registry>, config: Arc<Config>) {
    let id = next_client_id();
    let (read_half, write_half) = stream.into_split();
    let writer: Box<dyn AsyncWrite + Unpin + Send> = Box::new(write_half);
    let handle = ClientHandle::new(id, Arc::new(AsyncMutex::new(writer)));
    let mut client = Client::new(id, handle.clone());
    let mut reader = BufReader::new(read_half);

    loop {
        let frame = match decode_frame(&mut reader).await {
            Ok(None) => break,
            Ok(Some(frame)) => frame,
            Err(e) => {
                let _ = handle.send(&Frame::from_error(&e)).await;
                break;
            }
        };
        // A well-formed frame of the wrong shape (not a non-empty array
        // of bulk strings) is a per-command protocol error, not a dead
        // connection — only a `decode_frame` failure above closes it.
        let command = match frame_as_command(frame) {
            Ok(c) => c,
            Err(e) => {
                let _ = handle.send(&Frame::from_error(&e)).await;
                continue;
            }
        };

        let name = String::from_utf8_lossy(&command[0]).to_ascii_uppercase();
        let args = command[1..].to_vec();

        // `QUIT` queues like any other command inside a transaction (invariant 4)
        // and only actually closes the connection once it runs for real.
        let was_queueing = client.in_transaction();
        let mut ctx = Ctx { db: db.as_ref(), registry: registry.as_ref(), client: &mut client, config: config.as_ref() };
        let reply = dispatch_one(&mut ctx, &name, &args).await;
        if let Some(reply) = reply {
            if handle.send(&reply).await.is_err() {
                break;
            }
        }
        if name == "QUIT" && !was_queueing {
            break;
        }
    }

    registry.remove_everywhere(id);
}

/// Routes one decoded command through the transaction/subscription
/// state machine. Returns `None` when the command already wrote its own reply
/// frame(s) directly (`SUBSCRIBE`/`UNSUBSCRIBE`).
async fn dispatch_one(ctx: &mut Ctx<'_>, name: &str, args: &[Vec<u8>]) -> Option<Frame> {
    if ctx.client.in_subscription() && !matches!(name, "SUBSCRIBE" | "UNSUBSCRIBE" | "PING" | "QUIT") {
        return Some(Frame::from_error(&RedliteError::Syntax(
            "only (P|S)SUBSCRIBE / (P|S)UNSUBSCRIBE / PING / QUIT allowed in this context".to_string(),
        )));
    }

    match name {
        "MULTI" => Some(multi(ctx.client)),
        "EXEC" => Some(exec(ctx).await),
        "DISCARD" => Some(discard(ctx.client)),
        _ if ctx.client.in_transaction() => {
            let mut queued = Vec::with_capacity(args.len() + 1);
            queued.push(name.as_bytes().to_vec());
            queued.extend(args.iter().cloned());
            ctx.client.queue_command(queued);
            Some(Frame::queued())
        }
        _ => {
            let reply = commands::execute(ctx, name, args).await;
            if writes_its_own_replies(name) {
                None
            } else {
                Some(reply)
            }
        }
    }
}

fn multi(client: &mut Client) -> Frame {
    if client.in_transaction() {
        return Frame::from_error(&RedliteError::Syntax("MULTI calls cannot be nested".to_string()));
    }
    client.begin_transaction();
    Frame::ok()
}

fn discard(client: &mut Client) -> Frame {
    if !client.in_transaction() {
        return Frame::from_error(&RedliteError::Syntax("DISCARD without MULTI".to_string()));
    }
    client.take_transaction();
    Frame::ok()
}

/// `EXEC`: replays the queued commands in order, collecting one reply
/// frame per command. Contiguous runs of keyspace-touching commands
/// share a single lock acquisition, so no other client's keyspace
/// command can be observed between the first and last effect of such a
/// run. A command that needs the registry or the client's own socket
/// (`PING`, `SUBSCRIBE`, ...) interrupts that run; mixing those with
/// keyspace commands inside one transaction loses contiguity across
/// that boundary.
async fn exec(ctx: &mut Ctx<'_>) -> Frame {
    if !ctx.client.in_transaction() {
        return Frame::from_error(&RedliteError::Syntax("EXEC without MULTI".to_string()));
    }
    let queue = ctx.client.take_transaction();
    let mut replies = Vec::with_capacity(queue.len());
    let mut i = 0;
    while i < queue.len() {
        let name = String::from_utf8_lossy(&queue[i][0]).to_ascii_uppercase();
        if is_keyspace_command(&name) {
            let mut map = ctx.db.lock();
            while i < queue.len() {
                let name = String::from_utf8_lossy(&queue[i][0]).to_ascii_uppercase();
                if !is_keyspace_command(&name) {
                    break;
                }
                let frame = commands::dispatch_keyspace(&mut map, &name, &queue[i][1..])
                    .unwrap_or_else(|e| Frame::from_error(&e));
                replies.push(frame);
                i += 1;
            }
        } else {
            let args = queue[i][1..].to_vec();
            replies.push(commands::execute(ctx, &name, &args).await);
            i += 1;
        }
    }
    Frame::array(replies)
}

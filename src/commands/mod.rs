//!
//! Command handlers.
//!
//! One module per data-type family, mirroring the per-type file split
//! of `cache/lists.go` / `cache/sets.go` / `cache/hashes.go`. Every
//! keyspace-touching handler is written against an already-locked
//! [`crate::db::Map`] (a `_locked` function) so the dispatcher can run
//! either one handler under its own lock acquisition, or a whole
//! `EXEC` block's contiguous run of them under a single one.

pub mod admin;
pub mod hashes;
pub mod lists;
pub mod pubsub;
pub mod sets;
pub mod strings;
pub mod ttl;

use crate::client::Client;
use crate::config::Config;
use crate::db::{is_keyspace_command, Keyspace, Map};
use crate::error::{RedliteError, Result};
use crate::pubsub::Registry;
use crate::resp::Frame;

/// Everything a command handler might need beyond the keyspace itself.
pub struct Ctx<'a> {
    pub db: &'a Keyspace,
    pub registry: &'a Registry,
    pub client: &'a mut Client,
    pub config: &'a Config,
}

pub(crate) fn arg_str(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| RedliteError::Syntax("invalid argument encoding".to_string()))
}

pub(crate) fn arg_i64(bytes: &[u8]) -> Result<i64> {
    arg_str(bytes)?.parse::<i64>().map_err(|_| RedliteError::NotAnInteger)
}

pub(crate) fn check_arity(name: &str, args: &[Vec<u8>], expected: usize) -> Result<()> {
    if args.len() != expected {
        Err(RedliteError::arity(name))
    } else {
        Ok(())
    }
}

pub(crate) fn check_min_arity(name: &str, args: &[Vec<u8>], min: usize) -> Result<()> {
    if args.len() < min {
        Err(RedliteError::arity(name))
    } else {
        Ok(())
    }
}

/// Dispatches one of the keyspace-touching commands against an
/// already-locked map. Shared by ordinary single-command dispatch
/// (which locks once per call) and `EXEC` (which locks once for a
/// whole contiguous run of these).
pub fn dispatch_keyspace(map: &mut Map, name: &str, args: &[Vec<u8>]) -> Result<Frame> {
    match name {
        "SET" => strings::set_locked(map, args),
        "GET" => strings::get_locked(map, args),
        "DELETE" => strings::delete_locked(map, args),

        "LPUSH" => lists::lpush_locked(map, args),
        "RPUSH" => lists::rpush_locked(map, args),
        "LRANGE" => lists::lrange_locked(map, args),
        "LPOP" => lists::lpop_locked(map, args),
        "RPOP" => lists::rpop_locked(map, args),
        "LLEN" => lists::llen_locked(map, args),
        "LINDEX" => lists::lindex_locked(map, args),
        "LSET" => lists::lset_locked(map, args),
        "LREM" => lists::lrem_locked(map, args),
        "LTRIM" => lists::ltrim_locked(map, args),

        "SADD" => sets::sadd_locked(map, args),
        "SISMEMBER" => sets::sismember_locked(map, args),
        "SREM" => sets::srem_locked(map, args),
        "SCARD" => sets::scard_locked(map, args),
        "SMEMBERS" => sets::smembers_locked(map, args),

        "HSET" => hashes::hset_locked(map, args),
        "HGET" => hashes::hget_locked(map, args),
        "HGETALL" => hashes::hgetall_locked(map, args),
        "HDEL" => hashes::hdel_locked(map, args),
        "HLEN" => hashes::hlen_locked(map, args),

        "EXPIRE" => ttl::expire_locked(map, args),
        "PEXPIRE" => ttl::pexpire_locked(map, args),
        "TTL" => ttl::ttl_locked(map, args),
        "PTTL" => ttl::pttl_locked(map, args),
        "PERSIST" => ttl::persist_locked(map, args),

        other => unreachable!("'{other}' is not a keyspace command"),
    }
}

/// Executes one non-transaction-control command. `MULTI`/`EXEC`/`DISCARD`
/// are intercepted earlier by the dispatcher, since those mutate the
/// client's transaction state rather than the keyspace.
pub async fn execute(ctx: &mut Ctx<'_>, name: &str, args: &[Vec<u8>]) -> Frame {
    if is_keyspace_command(name) {
        let mut map = ctx.db.lock();
        let result = dispatch_keyspace(&mut map, name, args);
        drop(map);
        return match result {
            Ok(frame) => frame,
            Err(e) => Frame::from_error(&e),
        };
    }

    let result = match name {
        "PING" => admin::ping(args),
        "QUIT" => Ok(Frame::ok()),
        "SAVE" => admin::save(ctx.db, args, &ctx.config.dump_path),
        "SUBSCRIBE" => return pubsub::subscribe(ctx, args).await,
        "UNSUBSCRIBE" => return pubsub::unsubscribe(ctx, args).await,
        "PUBLISH" => return pubsub::publish(ctx, args).await,
        other => Err(RedliteError::UnknownCommand(other.to_lowercase())),
    };
    match result {
        Ok(frame) => frame,
        Err(e) => Frame::from_error(&e),
    }
}

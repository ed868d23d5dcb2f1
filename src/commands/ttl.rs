//! `EXPIRE` / `PEXPIRE` / `TTL` / `PTTL` / `PERSIST`.

use super::{arg_i64, arg_str, check_arity};
use crate::db::{Keyspace, Map};
use crate::error::Result;
use crate::resp::Frame;

pub fn expire_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("expire", args, 2)?;
    let key = arg_str(&args[0])?;
    let secs = arg_i64(&args[1])?;
    let existed = Keyspace::expire_millis_locked(map, &key, secs.saturating_mul(1000));
    Ok(Frame::int(existed as i64))
}

pub fn pexpire_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("pexpire", args, 2)?;
    let key = arg_str(&args[0])?;
    let millis = arg_i64(&args[1])?;
    let existed = Keyspace::expire_millis_locked(map, &key, millis);
    Ok(Frame::int(existed as i64))
}

pub fn ttl_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("ttl", args, 1)?;
    let key = arg_str(&args[0])?;
    Ok(Frame::int(Keyspace::ttl_secs_locked(map, &key)))
}

pub fn pttl_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("pttl", args, 1)?;
    let key = arg_str(&args[0])?;
    Ok(Frame::int(Keyspace::pttl_millis_locked(map, &key)))
}

pub fn persist_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("persist", args, 1)?;
    let key = arg_str(&args[0])?;
    Ok(Frame::int(Keyspace::persist_locked(map, &key) as i64))
}

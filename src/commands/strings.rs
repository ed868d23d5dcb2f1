//! `SET` / `GET` / `DELETE`, grounded on `cache/cache.go`'s string path.

use std::time::Duration;

use super::{arg_i64, arg_str, check_arity};
use crate::db::{Keyspace, Map};
use crate::error::{RedliteError, Result};
use crate::resp::Frame;

/// Parses `SET key value [EX seconds | PX milliseconds | ttl_ms]`.
///
/// A bare trailing millisecond count is accepted, and so is the
/// canonical `EX`/`PX` option pair — matching how clients issue it in
/// practice. Both resolve to the same absolute expiry.
fn parse_ttl(args: &[Vec<u8>]) -> Result<Option<Duration>> {
    match args.len() {
        2 => Ok(None),
        3 => {
            let ms = arg_i64(&args[2])?;
            Ok(if ms > 0 { Some(Duration::from_millis(ms as u64)) } else { None })
        }
        4 => {
            let option = arg_str(&args[2])?.to_ascii_uppercase();
            let amount = arg_i64(&args[3])?;
            if amount <= 0 {
                return Ok(None);
            }
            match option.as_str() {
                "EX" => Ok(Some(Duration::from_secs(amount as u64))),
                "PX" => Ok(Some(Duration::from_millis(amount as u64))),
                _ => Err(RedliteError::Syntax("syntax error".to_string())),
            }
        }
        _ => Err(RedliteError::arity("set")),
    }
}

pub fn set_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    if args.len() < 2 {
        return Err(RedliteError::arity("set"));
    }
    let key = arg_str(&args[0])?;
    let value = arg_str(&args[1])?;
    let ttl = parse_ttl(args)?;
    Keyspace::set_locked(map, &key, value, ttl);
    Ok(Frame::ok())
}

pub fn get_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("get", args, 1)?;
    let key = arg_str(&args[0])?;
    match Keyspace::get_locked(map, &key)? {
        Some(v) => Ok(Frame::bulk(v)),
        None => Ok(Frame::nil_bulk()),
    }
}

pub fn delete_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("delete", args, 1)?;
    let key = arg_str(&args[0])?;
    let existed = Keyspace::delete_locked(map, &key);
    Ok(Frame::int(existed as i64))
}

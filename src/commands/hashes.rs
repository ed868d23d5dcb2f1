//! `H*` hash commands, grounded on `cache/hashes.go`.

use super::{arg_str, check_arity, check_min_arity};
use crate::db::{Keyspace, Map};
use crate::error::{RedliteError, Result};
use crate::resp::Frame;

pub fn hset_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_min_arity("hset", args, 3)?;
    if (args.len() - 1) % 2 != 0 {
        return Err(RedliteError::arity("hset"));
    }
    let key = arg_str(&args[0])?;
    let mut pairs = Vec::with_capacity((args.len() - 1) / 2);
    for chunk in args[1..].chunks(2) {
        pairs.push((arg_str(&chunk[0])?, arg_str(&chunk[1])?));
    }
    let created = Keyspace::hset_locked(map, &key, &pairs)?;
    Ok(Frame::int(created as i64))
}

pub fn hget_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("hget", args, 2)?;
    let key = arg_str(&args[0])?;
    let field = arg_str(&args[1])?;
    match Keyspace::hget_locked(map, &key, &field)? {
        Some(v) => Ok(Frame::bulk(v)),
        None => Ok(Frame::nil_bulk()),
    }
}

pub fn hgetall_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("hgetall", args, 1)?;
    let key = arg_str(&args[0])?;
    let pairs = Keyspace::hgetall_locked(map, &key)?;
    let flat: Vec<String> = pairs.into_iter().flat_map(|(f, v)| [f, v]).collect();
    Ok(Frame::bulk_array(flat))
}

pub fn hdel_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_min_arity("hdel", args, 2)?;
    let key = arg_str(&args[0])?;
    let fields = args[1..].iter().map(|b| arg_str(b)).collect::<Result<Vec<_>>>()?;
    let removed = Keyspace::hdel_locked(map, &key, &fields)?;
    Ok(Frame::int(removed as i64))
}

pub fn hlen_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("hlen", args, 1)?;
    let key = arg_str(&args[0])?;
    Ok(Frame::int(Keyspace::hlen_locked(map, &key)? as i64))
}

//! `L*` list commands, grounded on `cache/lists.go`.

use super::{arg_i64, arg_str, check_arity, check_min_arity};
use crate::db::{Keyspace, Map};
use crate::error::Result;
use crate::resp::Frame;

pub fn lpush_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_min_arity("lpush", args, 2)?;
    let key = arg_str(&args[0])?;
    let values = args[1..].iter().map(|b| arg_str(b)).collect::<Result<Vec<_>>>()?;
    let len = Keyspace::lpush_locked(map, &key, &values)?;
    Ok(Frame::int(len as i64))
}

pub fn rpush_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_min_arity("rpush", args, 2)?;
    let key = arg_str(&args[0])?;
    let values = args[1..].iter().map(|b| arg_str(b)).collect::<Result<Vec<_>>>()?;
    let len = Keyspace::rpush_locked(map, &key, &values)?;
    Ok(Frame::int(len as i64))
}

pub fn lrange_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("lrange", args, 3)?;
    let key = arg_str(&args[0])?;
    let start = arg_i64(&args[1])?;
    let stop = arg_i64(&args[2])?;
    let values = Keyspace::lrange_locked(map, &key, start, stop)?;
    Ok(Frame::bulk_array(values))
}

pub fn lpop_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("lpop", args, 1)?;
    let key = arg_str(&args[0])?;
    match Keyspace::lpop_locked(map, &key)? {
        Some(v) => Ok(Frame::bulk(v)),
        None => Ok(Frame::nil_bulk()),
    }
}

pub fn rpop_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("rpop", args, 1)?;
    let key = arg_str(&args[0])?;
    match Keyspace::rpop_locked(map, &key)? {
        Some(v) => Ok(Frame::bulk(v)),
        None => Ok(Frame::nil_bulk()),
    }
}

pub fn llen_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("llen", args, 1)?;
    let key = arg_str(&args[0])?;
    Ok(Frame::int(Keyspace::llen_locked(map, &key)? as i64))
}

pub fn lindex_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("lindex", args, 2)?;
    let key = arg_str(&args[0])?;
    let index = arg_i64(&args[1])?;
    match Keyspace::lindex_locked(map, &key, index)? {
        Some(v) => Ok(Frame::bulk(v)),
        None => Ok(Frame::nil_bulk()),
    }
}

pub fn lset_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("lset", args, 3)?;
    let key = arg_str(&args[0])?;
    let index = arg_i64(&args[1])?;
    let element = arg_str(&args[2])?;
    Keyspace::lset_locked(map, &key, index, element)?;
    Ok(Frame::ok())
}

pub fn lrem_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("lrem", args, 3)?;
    let key = arg_str(&args[0])?;
    let count = arg_i64(&args[1])?;
    let element = arg_str(&args[2])?;
    let removed = Keyspace::lrem_locked(map, &key, count, &element)?;
    Ok(Frame::int(removed))
}

pub fn ltrim_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("ltrim", args, 3)?;
    let key = arg_str(&args[0])?;
    let start = arg_i64(&args[1])?;
    let stop = arg_i64(&args[2])?;
    Keyspace::ltrim_locked(map, &key, start, stop)?;
    Ok(Frame::ok())
}

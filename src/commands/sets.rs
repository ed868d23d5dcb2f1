//! `S*` set commands, grounded on `cache/sets.go`.

use super::{arg_str, check_arity, check_min_arity};
use crate::db::{Keyspace, Map};
use crate::error::Result;
use crate::resp::Frame;

pub fn sadd_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_min_arity("sadd", args, 2)?;
    let key = arg_str(&args[0])?;
    let members = args[1..].iter().map(|b| arg_str(b)).collect::<Result<Vec<_>>>()?;
    let added = Keyspace::sadd_locked(map, &key, &members)?;
    Ok(Frame::int(added as i64))
}

pub fn sismember_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("sismember", args, 2)?;
    let key = arg_str(&args[0])?;
    let member = arg_str(&args[1])?;
    let is_member = Keyspace::sismember_locked(map, &key, &member)?;
    Ok(Frame::int(is_member as i64))
}

pub fn srem_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_min_arity("srem", args, 2)?;
    let key = arg_str(&args[0])?;
    let members = args[1..].iter().map(|b| arg_str(b)).collect::<Result<Vec<_>>>()?;
    let removed = Keyspace::srem_locked(map, &key, &members)?;
    Ok(Frame::int(removed as i64))
}

pub fn scard_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("scard", args, 1)?;
    let key = arg_str(&args[0])?;
    Ok(Frame::int(Keyspace::scard_locked(map, &key)? as i64))
}

pub fn smembers_locked(map: &mut Map, args: &[Vec<u8>]) -> Result<Frame> {
    check_arity("smembers", args, 1)?;
    let key = arg_str(&args[0])?;
    let members = Keyspace::smembers_locked(map, &key)?;
    Ok(Frame::bulk_array(members))
}

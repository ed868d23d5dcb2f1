//! `PING` and `SAVE`.

use super::{arg_str, check_arity};
use crate::db::Keyspace;
use crate::error::Result;
use crate::persistence;
use crate::resp::Frame;

pub fn ping(args: &[Vec<u8>]) -> Result<Frame> {
    match args.len() {
        0 => Ok(Frame::pong()),
        1 => Ok(Frame::bulk(arg_str(&args[0])?)),
        _ => Err(crate::error::RedliteError::arity("ping")),
    }
}

pub fn save(db: &Keyspace, args: &[Vec<u8>], dump_path: &str) -> Result<Frame> {
    check_arity("save", args, 0)?;
    let snapshot = db.snapshot();
    persistence::save(&snapshot, dump_path)?;
    log::info!("saved {} keys to {dump_path}", snapshot.len());
    Ok(Frame::ok())
}

//! `SUBSCRIBE` / `UNSUBSCRIBE` / `PUBLISH`, grounded on `cache/pubsub.go`.
//!
//! Real Redis clients expect one reply frame per channel processed by
//! `SUBSCRIBE`/`UNSUBSCRIBE`, not all of them folded into a single
//! array — so these two write straight to the client's own output
//! stream (through its already-serialized [`crate::pubsub::ClientHandle`])
//! instead of returning a `Frame` for the dispatcher to write once.
//! `PUBLISH` has a single scalar reply and fits the normal return path.

use super::{arg_str, check_arity, check_min_arity, Ctx};
use crate::error::{RedliteError, Result};
use crate::resp::Frame;

async fn send_or_err(ctx: &Ctx<'_>, frame: &Frame) -> Result<()> {
    ctx.client.handle.send(frame).await.map_err(RedliteError::Io)
}

pub async fn subscribe(ctx: &mut Ctx<'_>, args: &[Vec<u8>]) -> Frame {
    if let Err(e) = check_min_arity("subscribe", args, 1) {
        return Frame::from_error(&e);
    }
    for raw in args {
        let channel = match arg_str(raw) {
            Ok(c) => c,
            Err(e) => return Frame::from_error(&e),
        };
        ctx.registry.subscribe(&channel, ctx.client.handle.clone());
        let count = ctx.client.add_subscription(&channel);
        let frame = Frame::array(vec![
            Frame::bulk("subscribe"),
            Frame::bulk(channel),
            Frame::int(count as i64),
        ]);
        if send_or_err(ctx, &frame).await.is_err() {
            break;
        }
    }
    // The dispatcher already saw this command's replies written directly;
    // it writes nothing further for `SUBSCRIBE`.
    Frame::empty_array()
}

pub async fn unsubscribe(ctx: &mut Ctx<'_>, args: &[Vec<u8>]) -> Frame {
    let channels: Vec<String> = if args.is_empty() {
        ctx.client.subscribed_channels()
    } else {
        match args.iter().map(|a| arg_str(a)).collect::<Result<Vec<_>>>() {
            Ok(cs) => cs,
            Err(e) => return Frame::from_error(&e),
        }
    };

    if channels.is_empty() {
        let frame = Frame::array(vec![Frame::bulk("unsubscribe"), Frame::nil_bulk(), Frame::int(0)]);
        let _ = send_or_err(ctx, &frame).await;
        return Frame::empty_array();
    }

    for channel in channels {
        ctx.registry.unsubscribe(&channel, ctx.client.id);
        let count = ctx.client.remove_subscription(&channel);
        let frame = Frame::array(vec![
            Frame::bulk("unsubscribe"),
            Frame::bulk(channel),
            Frame::int(count as i64),
        ]);
        if send_or_err(ctx, &frame).await.is_err() {
            break;
        }
    }
    Frame::empty_array()
}

pub async fn publish(ctx: &mut Ctx<'_>, args: &[Vec<u8>]) -> Frame {
    if let Err(e) = check_arity("publish", args, 2) {
        return Frame::from_error(&e);
    }
    let channel = match arg_str(&args[0]) {
        Ok(c) => c,
        Err(e) => return Frame::from_error(&e),
    };
    let message = match arg_str(&args[1]) {
        Ok(m) => m,
        Err(e) => return Frame::from_error(&e),
    };
    let delivered = ctx.registry.publish(&channel, &message).await;
    Frame::int(delivered as i64)
}

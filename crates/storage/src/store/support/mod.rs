#![forbid(unsafe_code)]

mod resolve_tx;
mod schema;
mod time;
mod tree_tx;

pub(super) use resolve_tx::*;
pub(super) use schema::*;
pub(super) use time::now_ms;
pub(super) use tree_tx::*;

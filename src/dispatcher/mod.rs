//! # Dispatcher Module
//!
//! Coroutine-based handler dispatch.
//!
//! ## Overview
//!
//! The dispatcher:
//! - keeps a registry of handler coroutines keyed by handler name
//! - sends each matched request to its handler over a channel
//! - runs middleware before and after the handler
//! - turns a panicking handler into a 500 response
//!
//! ## Architecture
//!
//! Every handler runs in its own `may` coroutine and loops over an MPSC
//! channel of [`HandlerRequest`]s. A request carries a reply sender; the
//! dispatcher blocks (cooperatively) on the matching receiver until the
//! handler answers. Stack size comes from [`RuntimeConfig`](crate::runtime_config::RuntimeConfig).
//!
//! ## Request Flow
//!
//! 1. Router matches the request to a handler name and path params
//! 2. Dispatcher runs each middleware's `before`; the first early response wins
//! 3. Otherwise the request goes to the handler coroutine
//! 4. The reply (or a 500/503 on panic/closed channel) passes through `after`
//!
//! ## Error Handling
//!
//! - Unknown handler name: `dispatch` returns `None`, the server answers 500
//! - Handler panic: caught in the coroutine, answered with 500
//! - Handler exits without replying: 503

mod core;

pub use core::{
    Dispatcher, HandlerRequest, HandlerResponse, HandlerSender, HeaderVec, MAX_INLINE_HEADERS,
};

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

//! The _smolrpl_ library is a standalone control plane for the Routing Protocol for Low-Power
//! and Lossy Networks. It has no heap usage, no global state and never touches a socket or a
//! clock by itself.
//!
//! # Table of contents
//! The crate is split into two layers, each providing a different degree of abstraction over
//! the protocol:
//!
//!   * [wire]: the binary codec of the RPL control messages and their options;
//!   * [iface]: the protocol machinery, i.e. the neighbor table, the objective functions, the
//!     Trickle timer, the routing tables and the [iface::Rpl] controller tying them together.
//!
//! # The `wire` layer
//! The `wire` layer contains the `Packet` wrappers that give field-level access to a byte buffer
//! and the `Repr` structures that can be parsed from, and emitted into, such a buffer. Parsing
//! never reads outside of the buffer and emitting never writes outside of it.
//!
//! # The `iface` layer
//! The controller is generic over two collaborators owned by the caller:
//!
//!   * a [iface::rpl::Transport] that carries control messages to a destination address;
//!   * a [iface::rpl::Scheduler] that arms and cancels one-shot timers.
//!
//! Incoming messages are handed to [iface::Rpl::process_message], expired timers to
//! [iface::Rpl::handle_timer]. Everything runs to completion on the caller's thread.
//!
//! # Minimum Supported Rust Version (MSRV)
//!
//! This crate is guaranteed to compile on stable Rust 1.77 and up with any valid set of features.

#[cfg(all(feature = "log", feature = "defmt"))]
compile_error!("You must enable at most one of the following features: defmt, log");

#[macro_use]
mod macros;
mod rand;

pub mod iface;
pub mod time;
pub mod wire;

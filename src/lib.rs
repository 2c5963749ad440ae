//! A small persisted to-do list.
//!
//! [`ops::controller::ListController`] keeps the in-memory list and writes
//! it through to a key-value [`io::store::Store`] on every change;
//! [`ops::detail::DetailEditor`] edits single items directly against the
//! persisted list. All store access goes through one worker thread
//! ([`io::worker::StoreHandle`]), so writes land in the order they were made.

pub mod cli;
pub mod io;
pub mod model;
pub mod ops;

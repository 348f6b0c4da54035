//! Low-level memory utilities.
//!
//! This module provides the private stacks coroutines run on. A [`Stack`]
//! is mapped once, never grows, and is unmapped when dropped.

mod stack;

pub(crate) use stack::Stack;

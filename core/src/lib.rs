//! Core types and proof verification for binary sparse zk-tries.
//!
//! A zk-trie is a binary merkle trie keyed by the hash of a 256-bit key, in which every hash is a
//! domain-separated two-to-one compression supplied by a [`HashOracle`]. This crate walks proofs
//! produced for such a trie, decodes the account and storage leaves they end in and authenticates
//! those leaves against the committed root.
//!
//! The core types and proof verification routines of this crate do not require the
//! standard library, but do require Rust's alloc crate.

#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

extern crate alloc;

pub mod hasher;
pub mod leaf;
pub mod proof;
#[cfg(any(test, feature = "test-utils"))]
pub mod reference;
pub mod state;
pub mod trie;
pub mod wire;

pub use hasher::HashOracle;

// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The settlement manager and its context.
//!
//! [`Marketplace`] drives a settlement through its gate sequence and hands
//! the resulting plan to the context for one commit-or-abort application.
//! The context is anything implementing the [`adapters`] traits; an
//! in-memory implementation lives in [`context::memory`].

pub mod adapters;
pub mod context;
mod marketplace;

pub use marketplace::{Marketplace, SettledItem, Settlement};

//! The registered base-type graph and the upcast engine.
//!
//! ## Menu
//!
//! - [`AsBase`]: safe projection from a derived value to one of its bases.
//! - [`HasBases`]: the type-level list of direct bases; implemented with
//!   [`reflect_bases!`](crate::reflect_bases). Listing a base that never
//!   declared its own list fails to compile.
//! - [`BaseEdge`]: one direct edge with its monomorphized pointer adjuster.
//! - [`BaseGraph`]: the adjacency table; resolves transitive ancestors and
//!   composes adjusters along a deterministic breadth-first path.
//!
//! Only upcasts along registered edges are served. Shared ancestors are
//! collapsed by a visited set during the search, so every resolution of a
//! (from, to) pair lands on the same pointer; a type whose bases share an
//! ancestor should list that ancestor as a direct base of its own, which
//! the breadth-first order then always prefers.

// -----------------------------------------------------------------------------
// Modules

mod base_graph;
mod register;

// -----------------------------------------------------------------------------
// Exports

pub use base_graph::BaseGraph;
pub use register::{AsBase, BaseEdge, BaseList, HasBases};

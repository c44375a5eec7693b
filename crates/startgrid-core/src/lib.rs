#![forbid(unsafe_code)]

//! Core: geometry primitives, the drag vocabulary, and the reorder consumer.
//!
//! # Role in startgrid
//! `startgrid-core` holds the types every other crate agrees on. The layout
//! solver (`startgrid-layout`) reasons about [`geometry::Rect`]s and produces
//! [`drag::HoverTarget`]s; the session state machine (`startgrid-web`) turns
//! the final hover target into a [`drag::DropPayload`]; the host applies that
//! payload to its bookmark model with [`reorder::apply_drop`].

pub mod drag;
pub mod geometry;
pub mod reorder;

pub use drag::{DragKind, DropPayload, HoverTarget};
pub use geometry::{Point, Rect, Size, Viewport};

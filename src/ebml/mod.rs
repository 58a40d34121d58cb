//! EBML decoding module
//!
//! This module handles the container-independent layer:
//! - Tag registry for the recognized Matroska element ids
//! - Primitive codec (VINTs, fixed integers, floats, strings)
//! - Element headers and bounded traversal of an element's children

pub mod element;
pub mod reader;
pub mod tag;

pub use element::{walk_children, Element, Flow};
pub use reader::{EbmlReader, TextEncoding};
pub use tag::ElementTag;

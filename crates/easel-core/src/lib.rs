//! Easel Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Easel stencil
//! builder. It includes:
//!
//! - **Config**: The stencil configuration and connection points ([`config`] module)
//! - **Request**: The ordered list of source images ([`request::StencilRequest`])
//! - **Master**: Identifiers and derived data for one stencil master ([`master`] module)
//! - **Ordering**: Deterministic image ordering and ID assignment ([`ordering`] module)
//! - **Scale**: Resolution normalization and physical sizing ([`scale`] module)

pub mod config;
pub mod master;
pub mod ordering;
pub mod request;
pub mod scale;

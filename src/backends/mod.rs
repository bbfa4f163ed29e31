//! Cloud backend implementations
//!
//! Each backend is one module implementing the [`Provider`] contract; the
//! shared pipeline never special-cases a vendor.
//!
//! [`Provider`]: crate::provider::Provider

pub mod huaweicloud;
pub mod mock;

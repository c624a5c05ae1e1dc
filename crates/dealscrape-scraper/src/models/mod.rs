//! Built-in content models.

pub mod groupon;

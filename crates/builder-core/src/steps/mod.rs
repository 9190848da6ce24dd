//! The individual units of work a plan is made of

pub mod build;
pub mod clean;
pub mod docker;
pub mod generate;
pub mod minify;
pub mod release;
pub mod sync;

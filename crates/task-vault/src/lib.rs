pub mod archive;
pub mod codec;
pub mod error;
pub mod gateway;
pub mod log;
pub mod object_store;
pub mod store;
pub mod task;
pub mod workspace;

pub use error::{Error, Result};

//! Pure reshaping logic, one module per endpoint.
//!
//! Each module maps an upstream record (as returned by its port) to the
//! simplified client payload. Handlers in `api::http` orchestrate fetch,
//! reshape, and error classification.

pub mod presence;
pub mod server_status;
pub mod stream_status;

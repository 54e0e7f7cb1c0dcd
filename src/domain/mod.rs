//! Domain layer: entities, capability traits and the delete batcher.
//!
//! - [`entities`] - Stored URL mapping
//! - [`repositories`] - Capability traits implemented by the backends
//! - [`delete_request`] - Deletion intent queued by the service
//! - [`delete_worker`] - Timer driven batch deletion worker
//!
//! # Deletion Flow
//!
//! 1. The service filters candidates down to the caller's live records
//! 2. Each survivor is sent to [`delete_worker::DeleteQueue`]
//! 3. [`delete_worker::run_delete_worker`] buffers them until the next tick
//! 4. The whole buffer is handed to [`repositories::BatchDeletable`] and cleared

pub mod delete_request;
pub mod delete_worker;
pub mod entities;
pub mod repositories;

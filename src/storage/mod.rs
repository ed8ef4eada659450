// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Durable blob storage backends for serialized document indexes

pub mod index_storage;

// Re-export main types for convenience
pub use index_storage::{FsStorage, IndexStorage, MemoryStorage, StorageError};

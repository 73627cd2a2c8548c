//! chunksum - Chunked checksum verification for storage and replication data
//!
//! One 32-bit checksum per fixed-size chunk, so corruption is located
//! at a byte offset instead of failing a whole file.

pub mod checksum;

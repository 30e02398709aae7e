pub mod ingest_service;
pub mod metadata;
pub mod storage;

pub mod fetcher;
pub mod storage;

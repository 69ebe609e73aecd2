pub mod http;
pub mod sink;
pub mod storage;

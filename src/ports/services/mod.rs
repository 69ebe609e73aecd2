mod setu_service;

pub use setu_service::SetuService;

pub mod dispatch;
pub mod file_store;
pub mod host_bridge;
pub mod processors;
pub mod selection;
pub mod upload_service;

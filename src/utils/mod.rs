pub mod data_url;
pub mod hash;

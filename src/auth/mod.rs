pub mod cookie;
pub mod extractors;
pub mod jwt;

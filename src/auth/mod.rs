pub mod credentials;
pub mod extractors;
pub mod jwt;
pub mod password;

pub mod combined;
pub mod error;

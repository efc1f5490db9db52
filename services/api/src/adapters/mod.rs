pub mod db;
pub mod memory;
pub mod verse_api;

pub use db::DbAdapter;
pub use memory::InMemoryStore;
pub use verse_api::BibleApiAdapter;

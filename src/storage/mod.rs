pub mod object_store;

pub use object_store::{object_key, HttpObjectStore, ObjectStore, StorageError};

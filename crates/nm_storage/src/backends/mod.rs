pub mod azure;
pub mod filesystem;
pub mod memory;

pub use azure::AzureBlobStorage;
pub use filesystem::FilesystemStorage;
pub use memory::MemoryStorage;

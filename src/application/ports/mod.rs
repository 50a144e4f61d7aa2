pub mod billing_provider;
pub mod image_generation;
pub mod object_storage;

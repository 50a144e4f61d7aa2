pub mod payload_fields;
pub mod prompt;

pub mod collection;
pub mod manifest;
pub mod registry;
pub mod word;

pub use collection::{MalformedLine, WordCollection};
pub use manifest::Manifest;
pub use registry::{CollectionRegistry, LoadSummary};
pub use word::WordEntry;

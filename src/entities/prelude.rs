pub use super::image_metadata::Entity as ImageMetadata;

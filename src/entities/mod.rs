pub mod prelude;

pub mod image_metadata;

#![deny(missing_docs)]
//! Image types and traits for the tessera filter engine

/// image representation for filtering purposes.
pub mod image;

/// runtime-typed images.
pub mod dynamic;

/// Error types for the image module.
pub mod error;

/// element types of image buffers.
pub mod pixel;

pub use crate::dynamic::DynamicImage;
pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
pub use crate::pixel::{ElementType, Pixel};

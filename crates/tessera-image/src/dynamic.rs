use crate::image::{Image, ImageSize};
use crate::pixel::ElementType;

/// An image whose element type is only known at runtime.
///
/// This is the buffer exchanged between chained filter passes: 8-bit images
/// as they come from disk or display conversion, and 32-bit float images as
/// produced by the filters.
#[derive(Clone, Debug, PartialEq)]
pub enum DynamicImage {
    /// 8-bit unsigned image.
    U8(Image<u8>),
    /// 32-bit float image.
    F32(Image<f32>),
}

impl DynamicImage {
    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        match self {
            DynamicImage::U8(img) => img.size(),
            DynamicImage::F32(img) => img.size(),
        }
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        match self {
            DynamicImage::U8(img) => img.num_channels(),
            DynamicImage::F32(img) => img.num_channels(),
        }
    }

    /// The runtime element type.
    pub fn element_type(&self) -> ElementType {
        match self {
            DynamicImage::U8(_) => ElementType::U8,
            DynamicImage::F32(_) => ElementType::F32,
        }
    }

    /// Borrow the f32 image, if this is one.
    pub fn as_f32(&self) -> Option<&Image<f32>> {
        match self {
            DynamicImage::F32(img) => Some(img),
            DynamicImage::U8(_) => None,
        }
    }

    /// Borrow the u8 image, if this is one.
    pub fn as_u8(&self) -> Option<&Image<u8>> {
        match self {
            DynamicImage::U8(img) => Some(img),
            DynamicImage::F32(_) => None,
        }
    }

    /// Convert into an f32 image, widening u8 values without scaling.
    pub fn into_f32(self) -> Image<f32> {
        match self {
            DynamicImage::F32(img) => img,
            DynamicImage::U8(img) => img.to_f32(),
        }
    }
}

impl From<Image<u8>> for DynamicImage {
    fn from(img: Image<u8>) -> Self {
        DynamicImage::U8(img)
    }
}

impl From<Image<f32>> for DynamicImage {
    fn from(img: Image<f32>) -> Self {
        DynamicImage::F32(img)
    }
}

use crate::error::ImageError;
use crate::pixel::Pixel;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use tessera_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by the size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// Represents an image with pixel data.
///
/// The pixels are stored row-major with the channels last, i.e. a buffer of
/// shape (H, W, C). A single channel image is the (H, W) case.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T> {
    size: ImageSize,
    num_channels: usize,
    data: Vec<T>,
}

impl<T> Image<T> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `num_channels` - The number of interleaved channels per pixel.
    /// * `data` - The pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image shape, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8>::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     3,
    ///     vec![0u8; 10 * 20 * 3],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn new(size: ImageSize, num_channels: usize, data: Vec<T>) -> Result<Self, ImageError> {
        if num_channels == 0 {
            return Err(ImageError::ZeroChannels);
        }

        let expected = size.width * size.height * num_channels;
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }

        Ok(Self {
            size,
            num_channels,
            data,
        })
    }

    /// Create a new image with the given size and a constant pixel value.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera_image::{Image, ImageSize};
    ///
    /// let image = Image::<f32>::from_size_val([4, 2].into(), 1, 0.0).unwrap();
    ///
    /// assert_eq!(image.size().width, 4);
    /// assert_eq!(image.as_slice().len(), 8);
    /// ```
    pub fn from_size_val(size: ImageSize, num_channels: usize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let data = vec![val; size.width * size.height * num_channels];
        Image::new(size, num_channels, data)
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.size.width
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.size.height
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// The buffer shape as `[height, width, channels]`.
    pub fn shape(&self) -> [usize; 3] {
        [self.size.height, self.size.width, self.num_channels]
    }

    /// Number of elements in one row (width * channels).
    pub fn row_stride(&self) -> usize {
        self.size.width * self.num_channels
    }

    /// Get the pixel data of the image.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the mutable pixel data of the image.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Get the element at `[row, col, channel]`, if it exists.
    pub fn get(&self, index: [usize; 3]) -> Option<&T> {
        let [y, x, ch] = index;
        if y >= self.size.height || x >= self.size.width || ch >= self.num_channels {
            return None;
        }
        self.data.get((y * self.size.width + x) * self.num_channels + ch)
    }

    /// Get a channel of the image.
    ///
    /// # Arguments
    ///
    /// * `channel` - The channel to get.
    ///
    /// # Errors
    ///
    /// If the channel index is out of bounds, an error is returned.
    pub fn channel(&self, channel: usize) -> Result<Image<T>, ImageError>
    where
        T: Clone,
    {
        if channel >= self.num_channels {
            return Err(ImageError::ChannelIndexOutOfBounds(
                channel,
                self.num_channels,
            ));
        }

        let channel_data = self
            .data
            .iter()
            .skip(channel)
            .step_by(self.num_channels)
            .cloned()
            .collect();

        Image::new(self.size, 1, channel_data)
    }
}

impl<T: Pixel> Image<T> {
    /// Convert the pixel data to f32 without scaling.
    pub fn to_f32(&self) -> Image<f32> {
        Image {
            size: self.size,
            num_channels: self.num_channels,
            data: self.data.iter().map(|&x| x.to_f32()).collect(),
        }
    }
}

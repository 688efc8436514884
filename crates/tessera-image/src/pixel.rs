/// Element types an image buffer can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            ElementType::U8 => "u8",
            ElementType::U16 => "u16",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
        };
        write!(f, "{name}")
    }
}

/// Trait for image element types.
///
/// Send and Sync are required so buffers can be shared with a rayon pool.
pub trait Pixel: Copy + Default + PartialEq + Send + Sync + std::fmt::Debug + 'static {
    /// Runtime tag of the element type.
    const ELEMENT_TYPE: ElementType;

    /// Convert the value to f32.
    fn to_f32(self) -> f32;
}

impl Pixel for u8 {
    const ELEMENT_TYPE: ElementType = ElementType::U8;

    fn to_f32(self) -> f32 {
        self as f32
    }
}

impl Pixel for u16 {
    const ELEMENT_TYPE: ElementType = ElementType::U16;

    fn to_f32(self) -> f32 {
        self as f32
    }
}

impl Pixel for f32 {
    const ELEMENT_TYPE: ElementType = ElementType::F32;

    fn to_f32(self) -> f32 {
        self
    }
}

impl Pixel for f64 {
    const ELEMENT_TYPE: ElementType = ElementType::F64;

    fn to_f32(self) -> f32 {
        self as f32
    }
}

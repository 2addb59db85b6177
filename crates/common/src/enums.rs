use serde::Deserialize;

/// Errors from converting raw glTF enum values.
#[derive(Debug, thiserror::Error)]
pub enum EnumError {
    #[error("unknown component type: {0}")]
    UnknownComponentType(u32),
    #[error("unknown element type: {0}")]
    UnknownElementType(String),
    #[error("unknown filter mode: {0}")]
    UnknownFilter(u32),
    #[error("unknown wrap mode: {0}")]
    UnknownWrap(u32),
}

/// Numeric component type of an accessor (glTF values 5120-5126).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    U32,
    F32,
}

impl ComponentType {
    /// Width of a single component in bytes.
    pub fn byte_width(self) -> usize {
        match self {
            ComponentType::I8 | ComponentType::U8 => 1,
            ComponentType::I16 | ComponentType::U16 => 2,
            ComponentType::U32 | ComponentType::F32 => 4,
        }
    }
}

impl TryFrom<u32> for ComponentType {
    type Error = EnumError;

    fn try_from(value: u32) -> Result<Self, EnumError> {
        match value {
            5120 => Ok(ComponentType::I8),
            5121 => Ok(ComponentType::U8),
            5122 => Ok(ComponentType::I16),
            5123 => Ok(ComponentType::U16),
            5125 => Ok(ComponentType::U32),
            5126 => Ok(ComponentType::F32),
            other => Err(EnumError::UnknownComponentType(other)),
        }
    }
}

/// Element arity of an accessor ("SCALAR", "VEC3", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ElementType {
    /// Number of components per element.
    pub fn component_count(self) -> usize {
        match self {
            ElementType::Scalar => 1,
            ElementType::Vec2 => 2,
            ElementType::Vec3 => 3,
            ElementType::Vec4 => 4,
            ElementType::Mat2 => 4,
            ElementType::Mat3 => 9,
            ElementType::Mat4 => 16,
        }
    }

    pub fn parse(name: &str) -> Result<Self, EnumError> {
        match name {
            "SCALAR" => Ok(ElementType::Scalar),
            "VEC2" => Ok(ElementType::Vec2),
            "VEC3" => Ok(ElementType::Vec3),
            "VEC4" => Ok(ElementType::Vec4),
            "MAT2" => Ok(ElementType::Mat2),
            "MAT3" => Ok(ElementType::Mat3),
            "MAT4" => Ok(ElementType::Mat4),
            other => Err(EnumError::UnknownElementType(other.to_string())),
        }
    }
}

/// Minification filter (OpenGL-style enum values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinFilter {
    Nearest,
    #[default]
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl TryFrom<u32> for MinFilter {
    type Error = EnumError;

    fn try_from(value: u32) -> Result<Self, EnumError> {
        match value {
            9728 => Ok(MinFilter::Nearest),
            9729 => Ok(MinFilter::Linear),
            9984 => Ok(MinFilter::NearestMipmapNearest),
            9985 => Ok(MinFilter::LinearMipmapNearest),
            9986 => Ok(MinFilter::NearestMipmapLinear),
            9987 => Ok(MinFilter::LinearMipmapLinear),
            other => Err(EnumError::UnknownFilter(other)),
        }
    }
}

/// Magnification filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MagFilter {
    Nearest,
    #[default]
    Linear,
}

impl TryFrom<u32> for MagFilter {
    type Error = EnumError;

    fn try_from(value: u32) -> Result<Self, EnumError> {
        match value {
            9728 => Ok(MagFilter::Nearest),
            9729 => Ok(MagFilter::Linear),
            other => Err(EnumError::UnknownFilter(other)),
        }
    }
}

/// Texture coordinate wrap mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    ClampToEdge,
    MirroredRepeat,
    #[default]
    Repeat,
}

impl TryFrom<u32> for WrapMode {
    type Error = EnumError;

    fn try_from(value: u32) -> Result<Self, EnumError> {
        match value {
            33071 => Ok(WrapMode::ClampToEdge),
            33648 => Ok(WrapMode::MirroredRepeat),
            10497 => Ok(WrapMode::Repeat),
            other => Err(EnumError::UnknownWrap(other)),
        }
    }
}

/// Keyframe interpolation mode of an animation sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    Cubicspline,
}

/// Node property targeted by an animation channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
    Weights,
}

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::gfx::UniformType;

/// A value uploaded to one uniform location.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    UInt(u32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
}

impl UniformValue {
    pub const fn ty(&self) -> UniformType {
        match self {
            UniformValue::Int(_) => UniformType::Int,
            UniformValue::UInt(_) => UniformType::UInt,
            UniformValue::Float(_) => UniformType::Float,
            UniformValue::Vec2(_) => UniformType::Vec2,
            UniformValue::Vec3(_) => UniformType::Vec3,
            UniformValue::Vec4(_) => UniformType::Vec4,
            UniformValue::Mat3(_) => UniformType::Mat3,
            UniformValue::Mat4(_) => UniformType::Mat4,
        }
    }

    /// Bytes as laid out in the uniform block; matrices are column-major.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            UniformValue::Int(v) => v.to_ne_bytes().to_vec(),
            UniformValue::UInt(v) => v.to_ne_bytes().to_vec(),
            UniformValue::Float(v) => v.to_ne_bytes().to_vec(),
            UniformValue::Vec2(v) => bytemuck::bytes_of(v).to_vec(),
            UniformValue::Vec3(v) => bytemuck::bytes_of(v).to_vec(),
            UniformValue::Vec4(v) => bytemuck::bytes_of(v).to_vec(),
            UniformValue::Mat3(m) => {
                // mat3x3<f32> columns have a 16-byte stride.
                let mut cols = [0.0f32; 12];
                for (i, col) in m.to_cols_array_2d().iter().enumerate() {
                    cols[i * 4..i * 4 + 3].copy_from_slice(col);
                }
                bytemuck::cast_slice(&cols).to_vec()
            }
            UniformValue::Mat4(m) => bytemuck::cast_slice(&m.to_cols_array()).to_vec(),
        }
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        UniformValue::UInt(v)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(m: Mat4) -> Self {
        UniformValue::Mat4(m)
    }
}

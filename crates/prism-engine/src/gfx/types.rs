use std::fmt;

use bytemuck::{Pod, Zeroable};

macro_rules! gpu_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(u32);

        impl $name {
            /// Wraps a raw id. Contexts never hand out zero.
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

gpu_id!(
    /// Texture object id.
    TextureId
);
gpu_id!(
    /// Framebuffer (attachment table) id.
    FramebufferId
);
gpu_id!(
    /// Compiled shader stage id.
    StageId
);
gpu_id!(
    /// Program id.
    ProgramId
);
gpu_id!(
    /// Vertex array id.
    VertexArrayId
);

/// Color storage formats a canvas can be created with.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ColorFormat {
    Rgba8,
    Rgba16F,
    Rgba32F,
}

impl ColorFormat {
    #[inline]
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            ColorFormat::Rgba8 => 4,
            ColorFormat::Rgba16F => 8,
            ColorFormat::Rgba32F => 16,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureFormat {
    Color(ColorFormat),
    Stencil8,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MinFilter {
    Nearest,
    Linear,
    LinearMipmapLinear,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MagFilter {
    Nearest,
    Linear,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Wrap {
    Repeat,
    ClampToEdge,
    ClampToBorder,
}

/// Filtering and wrapping applied when a texture is sampled.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SamplingParams {
    pub min_filter: MinFilter,
    pub mag_filter: MagFilter,
    pub wrap: Wrap,
}

impl SamplingParams {
    /// Canvas attachments: trilinear minification, linear magnification, clamp to border.
    pub const CANVAS: Self = Self {
        min_filter: MinFilter::LinearMipmapLinear,
        mag_filter: MagFilter::Linear,
        wrap: Wrap::ClampToBorder,
    };
}

/// Texture creation parameters.
///
/// `sampling` is `None` for multi-sampled storage, which has no filter/wrap state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub samples: u32,
    pub sampling: Option<SamplingParams>,
}

impl TextureDesc {
    pub fn is_multisampled(&self) -> bool {
        self.samples > 1
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Attachment {
    Color(u32),
    Stencil,
}

/// Result of a framebuffer completeness check.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FramebufferStatus {
    Complete,
    /// No texture attached at color attachment 0.
    MissingColorAttachment,
    /// Attachments disagree on width/height.
    MismatchedDimensions,
    /// Attachments disagree on sample count.
    MismatchedSamples,
    /// An attachment has a format unusable at its attachment point, or no longer exists.
    InvalidAttachment,
}

impl FramebufferStatus {
    #[inline]
    pub fn is_complete(self) -> bool {
        self == FramebufferStatus::Complete
    }
}

impl fmt::Display for FramebufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FramebufferStatus::Complete => "complete",
            FramebufferStatus::MissingColorAttachment => "missing color attachment 0",
            FramebufferStatus::MismatchedDimensions => "attachments have mismatched dimensions",
            FramebufferStatus::MismatchedSamples => "attachments have mismatched sample counts",
            FramebufferStatus::InvalidAttachment => "invalid attachment",
        };
        f.write_str(s)
    }
}

/// What a framebuffer clear writes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ClearTarget {
    Color { index: u32, rgba: [f32; 4] },
    Stencil(i32),
    Depth(f32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEval,
    Compute,
}

impl ShaderStage {
    /// Human-readable label used as the header of compile logs.
    pub const fn label(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "Vertex Shader",
            ShaderStage::Fragment => "Fragment Shader",
            ShaderStage::Geometry => "Geometry Shader",
            ShaderStage::TessControl => "Tessellation Control Shader",
            ShaderStage::TessEval => "Tessellation Evaluation Shader",
            ShaderStage::Compute => "Compute Shader",
        }
    }

    /// Entry point name a stage's source must define.
    pub const fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_main",
            ShaderStage::Fragment => "fs_main",
            ShaderStage::Geometry => "gs_main",
            ShaderStage::TessControl => "tcs_main",
            ShaderStage::TessEval => "tes_main",
            ShaderStage::Compute => "cs_main",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ImageAccess {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MemoryBarrier {
    /// Makes image stores visible to later image loads and texture fetches.
    ShaderImageAccess,
    All,
}

/// Vertex of the screen quad: position in model space plus texture coordinate.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
}

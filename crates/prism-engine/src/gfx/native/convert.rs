//! Engine enums to wgpu enums.

use crate::gfx::{
    ColorFormat, ImageAccess, MagFilter, MinFilter, SamplingParams, TextureFormat, Wrap,
};

pub(super) fn texture_format(format: TextureFormat) -> wgpu::TextureFormat {
    match format {
        TextureFormat::Color(color) => color_format(color),
        TextureFormat::Stencil8 => wgpu::TextureFormat::Stencil8,
    }
}

pub(super) fn color_format(format: ColorFormat) -> wgpu::TextureFormat {
    match format {
        ColorFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
        ColorFormat::Rgba16F => wgpu::TextureFormat::Rgba16Float,
        ColorFormat::Rgba32F => wgpu::TextureFormat::Rgba32Float,
    }
}

pub(super) fn storage_access(access: ImageAccess) -> wgpu::StorageTextureAccess {
    match access {
        ImageAccess::ReadOnly => wgpu::StorageTextureAccess::ReadOnly,
        ImageAccess::WriteOnly => wgpu::StorageTextureAccess::WriteOnly,
        ImageAccess::ReadWrite => wgpu::StorageTextureAccess::ReadWrite,
    }
}

/// Usages for a texture of `format` with `samples` samples.
pub(super) fn texture_usages(format: TextureFormat, samples: u32) -> wgpu::TextureUsages {
    use wgpu::TextureUsages as U;
    match format {
        TextureFormat::Stencil8 => U::RENDER_ATTACHMENT,
        TextureFormat::Color(_) if samples > 1 => U::RENDER_ATTACHMENT | U::TEXTURE_BINDING,
        TextureFormat::Color(_) => {
            U::RENDER_ATTACHMENT | U::TEXTURE_BINDING | U::STORAGE_BINDING | U::COPY_SRC
        }
    }
}

/// Sampler for `params`.
///
/// Textures are created with a single mip level, so the mipmap part of
/// `LinearMipmapLinear` selects that level.
pub(super) fn sampler_descriptor(
    params: SamplingParams,
    border_clamp: bool,
) -> wgpu::SamplerDescriptor<'static> {
    let address = match params.wrap {
        Wrap::Repeat => wgpu::AddressMode::Repeat,
        Wrap::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        Wrap::ClampToBorder if border_clamp => wgpu::AddressMode::ClampToBorder,
        Wrap::ClampToBorder => wgpu::AddressMode::ClampToEdge,
    };
    let min_filter = match params.min_filter {
        MinFilter::Nearest => wgpu::FilterMode::Nearest,
        MinFilter::Linear | MinFilter::LinearMipmapLinear => wgpu::FilterMode::Linear,
    };
    let mag_filter = match params.mag_filter {
        MagFilter::Nearest => wgpu::FilterMode::Nearest,
        MagFilter::Linear => wgpu::FilterMode::Linear,
    };

    wgpu::SamplerDescriptor {
        label: Some("prism canvas sampler"),
        address_mode_u: address,
        address_mode_v: address,
        address_mode_w: address,
        mag_filter,
        min_filter,
        border_color: (address == wgpu::AddressMode::ClampToBorder)
            .then_some(wgpu::SamplerBorderColor::TransparentBlack),
        ..Default::default()
    }
}

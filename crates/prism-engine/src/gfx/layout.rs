//! Uniform interface of a program.
//!
//! A program's uniforms live in one uniform block at binding 0, laid out with the
//! WGSL uniform address-space rules. Textures follow at bindings 1.. in
//! declaration order. The layout maps logical names (`FrameIndex`,
//! `Sphere[3].Center`, ...) to locations; names it does not know resolve to
//! `None`, which uploads treat as a no-op.

use std::collections::HashMap;

use super::{ColorFormat, ImageAccess};

/// Binding index of the uniform block.
pub const UNIFORM_BLOCK_BINDING: u32 = 0;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformType {
    Int,
    UInt,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
    Mat4,
}

impl UniformType {
    /// Alignment in the uniform address space.
    pub const fn align(self) -> u32 {
        match self {
            UniformType::Int | UniformType::UInt | UniformType::Float => 4,
            UniformType::Vec2 => 8,
            UniformType::Vec3 | UniformType::Vec4 | UniformType::Mat3 | UniformType::Mat4 => 16,
        }
    }

    /// Size in bytes; `Mat3` columns are padded to 16 bytes each.
    pub const fn size(self) -> u32 {
        match self {
            UniformType::Int | UniformType::UInt | UniformType::Float => 4,
            UniformType::Vec2 => 8,
            UniformType::Vec3 => 12,
            UniformType::Vec4 => 16,
            UniformType::Mat3 => 48,
            UniformType::Mat4 => 64,
        }
    }
}

/// Resolved location of a named uniform.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformLocation {
    /// Byte range inside the uniform block.
    Block { offset: u32, ty: UniformType },
    /// A sampled texture; the value uploaded to it is a texture unit.
    Sampler { binding: u32 },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResourceKind {
    /// Image read/written with image load/store; bound through an image unit.
    StorageImage { format: ColorFormat, access: ImageAccess },
    /// Filtered texture; occupies `binding` (texture) and `binding + 1` (sampler).
    SampledTexture,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResourceBinding {
    pub name: String,
    pub binding: u32,
    pub kind: ResourceKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformLayout {
    size: u32,
    entries: HashMap<String, UniformLocation>,
    resources: Vec<ResourceBinding>,
}

impl UniformLayout {
    pub fn builder() -> UniformLayoutBuilder {
        UniformLayoutBuilder::default()
    }

    /// Size of the uniform block in bytes (multiple of 16, zero if there are no fields).
    #[inline]
    pub fn block_size(&self) -> u32 {
        self.size
    }

    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        self.entries.get(name).copied()
    }

    pub fn resources(&self) -> &[ResourceBinding] {
        &self.resources
    }

    /// Storage images in image-unit order (unit = position in the iterator).
    pub fn storage_images(&self) -> impl Iterator<Item = &ResourceBinding> {
        self.resources
            .iter()
            .filter(|r| matches!(r.kind, ResourceKind::StorageImage { .. }))
    }

    pub fn sampled_textures(&self) -> impl Iterator<Item = &ResourceBinding> {
        self.resources
            .iter()
            .filter(|r| r.kind == ResourceKind::SampledTexture)
    }
}

#[derive(Debug, Default)]
pub struct UniformLayoutBuilder {
    cursor: u32,
    entries: HashMap<String, UniformLocation>,
    resources: Vec<ResourceBinding>,
    next_binding: Option<u32>,
}

impl UniformLayoutBuilder {
    /// Appends a plain field to the uniform block.
    pub fn field(mut self, name: &str, ty: UniformType) -> Self {
        let offset = align_to(self.cursor, ty.align());
        self.entries
            .insert(name.to_string(), UniformLocation::Block { offset, ty });
        self.cursor = offset + ty.size();
        self
    }

    /// Appends `array<S, count>` where `S` has the given members.
    ///
    /// Elements are addressed as `name[i].member`.
    pub fn struct_array(mut self, name: &str, count: u32, members: &[(&str, UniformType)]) -> Self {
        let mut member_offsets = Vec::with_capacity(members.len());
        let mut end = 0u32;
        let mut struct_align = 4u32;
        for &(member, ty) in members {
            let offset = align_to(end, ty.align());
            member_offsets.push((member, ty, offset));
            end = offset + ty.size();
            struct_align = struct_align.max(ty.align());
        }

        // Uniform arrays need a 16-byte element stride.
        let struct_size = align_to(end, struct_align);
        let stride = align_to(struct_size, 16);
        let base = align_to(self.cursor, 16);

        for i in 0..count {
            for &(member, ty, offset) in &member_offsets {
                self.entries.insert(
                    format!("{name}[{i}].{member}"),
                    UniformLocation::Block {
                        offset: base + i * stride + offset,
                        ty,
                    },
                );
            }
        }

        self.cursor = base + count * stride;
        self
    }

    /// Declares a storage image; image units are assigned in declaration order.
    pub fn storage_image(mut self, name: &str, format: ColorFormat, access: ImageAccess) -> Self {
        let binding = self.take_bindings(1);
        self.resources.push(ResourceBinding {
            name: name.to_string(),
            binding,
            kind: ResourceKind::StorageImage { format, access },
        });
        self
    }

    /// Declares a filtered texture + sampler pair.
    pub fn sampler(mut self, name: &str) -> Self {
        let binding = self.take_bindings(2);
        self.entries
            .insert(name.to_string(), UniformLocation::Sampler { binding });
        self.resources.push(ResourceBinding {
            name: name.to_string(),
            binding,
            kind: ResourceKind::SampledTexture,
        });
        self
    }

    pub fn build(self) -> UniformLayout {
        UniformLayout {
            size: align_to(self.cursor, 16),
            entries: self.entries,
            resources: self.resources,
        }
    }

    fn take_bindings(&mut self, count: u32) -> u32 {
        let binding = self.next_binding.unwrap_or(UNIFORM_BLOCK_BINDING + 1);
        self.next_binding = Some(binding + count);
        binding
    }
}

#[inline]
fn align_to(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset(layout: &UniformLayout, name: &str) -> u32 {
        match layout.location(name) {
            Some(UniformLocation::Block { offset, .. }) => offset,
            other => panic!("{name}: expected block location, got {other:?}"),
        }
    }

    // ── scalar packing ────────────────────────────────────────────────────

    #[test]
    fn scalars_pack_tightly() {
        let layout = UniformLayout::builder()
            .field("a", UniformType::Int)
            .field("b", UniformType::Float)
            .field("c", UniformType::UInt)
            .build();
        assert_eq!(offset(&layout, "a"), 0);
        assert_eq!(offset(&layout, "b"), 4);
        assert_eq!(offset(&layout, "c"), 8);
        assert_eq!(layout.block_size(), 16);
    }

    #[test]
    fn vec3_aligns_to_16_and_scalar_fills_its_tail() {
        let layout = UniformLayout::builder()
            .field("s", UniformType::Float)
            .field("v", UniformType::Vec3)
            .field("t", UniformType::Float)
            .build();
        assert_eq!(offset(&layout, "v"), 16);
        assert_eq!(offset(&layout, "t"), 28);
        assert_eq!(layout.block_size(), 32);
    }

    #[test]
    fn matrices_align_to_16() {
        let layout = UniformLayout::builder()
            .field("f", UniformType::Float)
            .field("m3", UniformType::Mat3)
            .field("m4", UniformType::Mat4)
            .build();
        assert_eq!(offset(&layout, "m3"), 16);
        assert_eq!(offset(&layout, "m4"), 64);
        assert_eq!(layout.block_size(), 128);
    }

    // ── struct arrays ─────────────────────────────────────────────────────

    #[test]
    fn struct_array_uses_16_byte_stride() {
        let layout = UniformLayout::builder()
            .field("FrameIndex", UniformType::UInt)
            .field("SphereNum", UniformType::Int)
            .struct_array(
                "Sphere",
                32,
                &[
                    ("Type", UniformType::Int),
                    ("Radius", UniformType::Float),
                    ("Center", UniformType::Vec3),
                    ("Albedo", UniformType::Vec3),
                ],
            )
            .build();

        assert_eq!(offset(&layout, "Sphere[0].Type"), 16);
        assert_eq!(offset(&layout, "Sphere[0].Radius"), 20);
        assert_eq!(offset(&layout, "Sphere[0].Center"), 32);
        assert_eq!(offset(&layout, "Sphere[0].Albedo"), 48);
        assert_eq!(offset(&layout, "Sphere[1].Center"), 80);
        assert_eq!(offset(&layout, "Sphere[31].Albedo"), 16 + 31 * 48 + 32);
        assert_eq!(layout.block_size(), 16 + 32 * 48);
    }

    #[test]
    fn out_of_range_element_is_unknown() {
        let layout = UniformLayout::builder()
            .struct_array("S", 2, &[("X", UniformType::Float)])
            .build();
        assert!(layout.location("S[1].X").is_some());
        assert!(layout.location("S[2].X").is_none());
        assert!(layout.location("S[0].Y").is_none());
    }

    // ── resources ─────────────────────────────────────────────────────────

    #[test]
    fn resources_follow_the_uniform_block() {
        let layout = UniformLayout::builder()
            .field("m", UniformType::Mat4)
            .storage_image("Output", ColorFormat::Rgba8, ImageAccess::WriteOnly)
            .sampler("BaseTexture")
            .build();

        let image = layout.storage_images().next().map(|r| r.binding);
        assert_eq!(image, Some(1));
        assert_eq!(
            layout.location("BaseTexture"),
            Some(UniformLocation::Sampler { binding: 2 })
        );
        assert_eq!(layout.sampled_textures().count(), 1);
    }

    #[test]
    fn empty_layout_has_no_block() {
        let layout = UniformLayout::builder().build();
        assert_eq!(layout.block_size(), 0);
        assert!(layout.resources().is_empty());
    }
}

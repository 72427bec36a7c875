//! Bookkeeping shared by every context: framebuffer completeness and the
//! unit bindings consulted at dispatch/draw time.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::{
    Attachment, FramebufferStatus, GfxError, ResourceKind, TextureDesc, TextureFormat, TextureId,
    UniformLayout,
};

/// GL-style completeness of an attachment table.
pub(crate) fn framebuffer_status(
    attachments: &BTreeMap<Attachment, TextureId>,
    desc_of: impl Fn(TextureId) -> Option<TextureDesc>,
) -> FramebufferStatus {
    if !attachments.contains_key(&Attachment::Color(0)) {
        return FramebufferStatus::MissingColorAttachment;
    }

    let mut first: Option<TextureDesc> = None;
    for (&attachment, &texture) in attachments {
        let Some(desc) = desc_of(texture) else {
            return FramebufferStatus::InvalidAttachment;
        };
        let format_ok = match attachment {
            Attachment::Color(_) => matches!(desc.format, TextureFormat::Color(_)),
            Attachment::Stencil => desc.format == TextureFormat::Stencil8,
        };
        if !format_ok {
            return FramebufferStatus::InvalidAttachment;
        }
        match first {
            None => first = Some(desc),
            Some(f) if (f.width, f.height) != (desc.width, desc.height) => {
                return FramebufferStatus::MismatchedDimensions;
            }
            Some(f) if f.samples != desc.samples => {
                return FramebufferStatus::MismatchedSamples;
            }
            Some(_) => {}
        }
    }

    FramebufferStatus::Complete
}

/// Textures bound to image and texture units, plus the set of textures with
/// image writes not yet made visible by a barrier.
#[derive(Debug, Default)]
pub(crate) struct UnitBindings {
    image_units: BTreeMap<u32, TextureId>,
    texture_units: BTreeMap<u32, TextureId>,
    unsynced: HashSet<TextureId>,
}

impl UnitBindings {
    pub fn bind_image(&mut self, unit: u32, texture: TextureId) {
        self.image_units.insert(unit, texture);
    }

    pub fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.texture_units.insert(unit, texture);
    }

    /// Drops every reference to a deleted texture.
    pub fn forget(&mut self, texture: TextureId) {
        self.image_units.retain(|_, t| *t != texture);
        self.texture_units.retain(|_, t| *t != texture);
        self.unsynced.remove(&texture);
    }

    /// Resolves the storage images of `layout` to `(binding, texture)` pairs.
    pub fn storage_images(
        &self,
        layout: &UniformLayout,
        desc_of: impl Fn(TextureId) -> Option<TextureDesc>,
    ) -> Result<Vec<(u32, TextureId)>, GfxError> {
        let mut out = Vec::new();
        for (unit, resource) in layout.storage_images().enumerate() {
            let unit = unit as u32;
            let &texture = self
                .image_units
                .get(&unit)
                .ok_or(GfxError::UnboundUnit { kind: "image", unit })?;
            let desc = desc_of(texture).ok_or(GfxError::UnknownTexture(texture))?;
            if let ResourceKind::StorageImage { format, .. } = resource.kind {
                if desc.format != TextureFormat::Color(format) {
                    return Err(GfxError::FormatMismatch {
                        texture,
                        expected: format,
                        found: desc.format,
                    });
                }
            }
            out.push((resource.binding, texture));
        }
        Ok(out)
    }

    /// Resolves the sampled textures of `layout` through the program's sampler
    /// units, refusing textures with pending image writes.
    pub fn sampled_textures(
        &self,
        layout: &UniformLayout,
        sampler_units: &HashMap<u32, u32>,
    ) -> Result<Vec<(u32, TextureId)>, GfxError> {
        let mut out = Vec::new();
        for resource in layout.sampled_textures() {
            let unit = sampler_units.get(&resource.binding).copied().unwrap_or(0);
            let &texture = self
                .texture_units
                .get(&unit)
                .ok_or(GfxError::UnboundUnit { kind: "texture", unit })?;
            if self.unsynced.contains(&texture) {
                return Err(GfxError::MissingBarrier(texture));
            }
            out.push((resource.binding, texture));
        }
        Ok(out)
    }

    pub fn mark_written(&mut self, textures: impl IntoIterator<Item = TextureId>) {
        self.unsynced.extend(textures);
    }

    pub fn barrier(&mut self) {
        self.unsynced.clear();
    }
}

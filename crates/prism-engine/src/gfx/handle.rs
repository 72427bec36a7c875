//! Scoped ownership of context resources.
//!
//! Each wrapper holds the id together with the context that issued it and
//! releases the id when dropped. Moving a wrapper moves the ownership; there is
//! no way to release twice.

use std::fmt;

use super::{FramebufferId, ProgramId, SharedContext, StageId, TextureId, VertexArrayId};

macro_rules! owned_handle {
    ($(#[$meta:meta])* $name:ident, $id:ty, $delete:ident) => {
        $(#[$meta])*
        pub struct $name {
            id: $id,
            ctx: SharedContext,
        }

        impl $name {
            /// Takes ownership of `id`, which must have been issued by `ctx`.
            pub fn new(ctx: SharedContext, id: $id) -> Self {
                Self { id, ctx }
            }

            #[inline]
            pub fn id(&self) -> $id {
                self.id
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                self.ctx.$delete(self.id);
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.id).finish()
            }
        }
    };
}

owned_handle!(OwnedTexture, TextureId, delete_texture);
owned_handle!(OwnedFramebuffer, FramebufferId, delete_framebuffer);
owned_handle!(
    /// A compiled stage; only lives between compile and link.
    OwnedStage,
    StageId,
    delete_stage
);
owned_handle!(OwnedProgram, ProgramId, delete_program);
owned_handle!(OwnedVertexArray, VertexArrayId, delete_vertex_array);

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::gfx::recording::{RecordingContext, ResourceKindCount};
    use crate::gfx::{ColorFormat, SamplingParams, TextureDesc, TextureFormat};

    fn desc() -> TextureDesc {
        TextureDesc {
            width: 4,
            height: 4,
            format: TextureFormat::Color(ColorFormat::Rgba8),
            samples: 1,
            sampling: Some(SamplingParams::CANVAS),
        }
    }

    #[test]
    fn drop_releases_exactly_once() {
        let rec = Rc::new(RecordingContext::new());
        let ctx: SharedContext = rec.clone();

        let tex = ctx.create_texture(&desc()).unwrap();
        let owned = OwnedTexture::new(ctx.clone(), tex);
        assert_eq!(rec.live(ResourceKindCount::Texture), 1);

        let moved = owned;
        assert_eq!(moved.id(), tex);
        drop(moved);

        assert_eq!(rec.live(ResourceKindCount::Texture), 0);
        assert_eq!(rec.deleted(ResourceKindCount::Texture), 1);
    }

    #[test]
    fn program_and_framebuffer_handles_release() {
        let rec = Rc::new(RecordingContext::new());
        let ctx: SharedContext = rec.clone();

        {
            let _p = OwnedProgram::new(ctx.clone(), ctx.create_program());
            let _f = OwnedFramebuffer::new(ctx.clone(), ctx.create_framebuffer());
            assert_eq!(rec.live(ResourceKindCount::Program), 1);
            assert_eq!(rec.live(ResourceKindCount::Framebuffer), 1);
        }

        assert_eq!(rec.live(ResourceKindCount::Program), 0);
        assert_eq!(rec.live(ResourceKindCount::Framebuffer), 0);
    }
}

use crate::gfx::{
    Attachment, ClearTarget, ColorFormat, FramebufferId, OwnedFramebuffer, OwnedTexture,
    SamplingParams, SharedContext, TextureDesc, TextureFormat, TextureId,
};

use super::CanvasError;

/// Off-screen framebuffer with a color attachment and an optional stencil attachment.
///
/// A canvas is either unconfigured (owns nothing) or configured (owns a
/// framebuffer and a color texture). Reconfiguring releases the previous
/// resources before creating new ones.
pub struct Canvas {
    ctx: SharedContext,
    color0: Option<OwnedTexture>,
    stencil: Option<OwnedTexture>,
    framebuffer: Option<OwnedFramebuffer>,
    size: (u32, u32),
    samples: u32,
}

impl Canvas {
    /// Creates an unconfigured canvas.
    pub fn new(ctx: SharedContext) -> Self {
        Self {
            ctx,
            color0: None,
            stencil: None,
            framebuffer: None,
            size: (0, 0),
            samples: 0,
        }
    }

    /// (Re)creates single-sampled attachments of the given size and format.
    ///
    /// Attachments sample with trilinear minification, linear magnification
    /// and clamp-to-border wrapping.
    pub fn configure(
        &mut self,
        width: u32,
        height: u32,
        format: ColorFormat,
        use_stencil: bool,
    ) -> Result<(), CanvasError> {
        self.build(width, height, 1, format, use_stencil)
    }

    /// (Re)creates multi-sampled attachments. Multi-sampled storage has no sampling state.
    pub fn configure_multisampled(
        &mut self,
        width: u32,
        height: u32,
        samples: u32,
        format: ColorFormat,
        use_stencil: bool,
    ) -> Result<(), CanvasError> {
        self.build(width, height, samples, format, use_stencil)
    }

    fn build(
        &mut self,
        width: u32,
        height: u32,
        samples: u32,
        format: ColorFormat,
        use_stencil: bool,
    ) -> Result<(), CanvasError> {
        self.release();

        let sampling = (samples <= 1).then_some(SamplingParams::CANVAS);
        let desc = |format| TextureDesc {
            width,
            height,
            format,
            samples: samples.max(1),
            sampling,
        };

        let ctx = &self.ctx;
        let color0 = OwnedTexture::new(
            ctx.clone(),
            ctx.create_texture(&desc(TextureFormat::Color(format)))?,
        );
        let stencil = if use_stencil {
            Some(OwnedTexture::new(
                ctx.clone(),
                ctx.create_texture(&desc(TextureFormat::Stencil8))?,
            ))
        } else {
            None
        };

        let framebuffer = OwnedFramebuffer::new(ctx.clone(), ctx.create_framebuffer());
        ctx.attach_texture(framebuffer.id(), Attachment::Color(0), color0.id())?;
        if let Some(stencil) = &stencil {
            ctx.attach_texture(framebuffer.id(), Attachment::Stencil, stencil.id())?;
        }

        let status = ctx.check_framebuffer_status(framebuffer.id());

        self.color0 = Some(color0);
        self.stencil = stencil;
        self.framebuffer = Some(framebuffer);
        self.size = (width, height);
        self.samples = samples.max(1);

        if !status.is_complete() {
            log::error!("canvas {width}x{height} x{samples}: framebuffer incomplete ({status})");
            return Err(CanvasError::Incomplete(status));
        }

        log::debug!(
            "canvas {width}x{height} {format:?} x{} stencil={use_stencil}",
            self.samples
        );
        Ok(())
    }

    /// Releases color0, stencil, then the framebuffer. Safe on an unconfigured canvas.
    pub fn release(&mut self) {
        drop(self.color0.take());
        drop(self.stencil.take());
        drop(self.framebuffer.take());
        self.size = (0, 0);
        self.samples = 0;
    }

    /// Clears color attachment `index` to transparent black.
    pub fn clear_color(&self, index: u32) -> Result<(), CanvasError> {
        self.clear_color_with([0.0, 0.0, 0.0, 0.0], index)
    }

    pub fn clear_color_with(&self, rgba: [f32; 4], index: u32) -> Result<(), CanvasError> {
        self.clear(ClearTarget::Color { index, rgba })
    }

    /// Clears the stencil attachment to 0.
    pub fn clear_stencil(&self) -> Result<(), CanvasError> {
        self.clear(ClearTarget::Stencil(0))
    }

    /// Clears depth to 1.0.
    pub fn clear_depth(&self) -> Result<(), CanvasError> {
        self.clear(ClearTarget::Depth(1.0))
    }

    fn clear(&self, target: ClearTarget) -> Result<(), CanvasError> {
        let Some(fb) = &self.framebuffer else {
            log::warn!("clear on an unconfigured canvas ignored");
            return Ok(());
        };
        self.ctx.clear_framebuffer(Some(fb.id()), target)?;
        Ok(())
    }

    #[inline]
    pub fn is_configured(&self) -> bool {
        self.framebuffer.is_some() && self.color0.is_some()
    }

    pub fn framebuffer_id(&self) -> Option<FramebufferId> {
        self.framebuffer.as_ref().map(OwnedFramebuffer::id)
    }

    pub fn color0_texture_id(&self) -> Option<TextureId> {
        self.color0.as_ref().map(OwnedTexture::id)
    }

    pub fn stencil_texture_id(&self) -> Option<TextureId> {
        self.stencil.as_ref().map(OwnedTexture::id)
    }

    /// Attachment size; `(0, 0)` when unconfigured.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Sample count; 0 when unconfigured.
    pub fn samples(&self) -> u32 {
        self.samples
    }
}

impl Drop for Canvas {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::gfx::recording::{Command, RecordingContext, ResourceKindCount};
    use crate::gfx::{FramebufferStatus, GfxError, MinFilter, Wrap};

    fn setup() -> (Rc<RecordingContext>, Canvas) {
        let rec = Rc::new(RecordingContext::new());
        let canvas = Canvas::new(rec.clone());
        (rec, canvas)
    }

    fn live(rec: &RecordingContext) -> (u32, u32) {
        (
            rec.live(ResourceKindCount::Texture),
            rec.live(ResourceKindCount::Framebuffer),
        )
    }

    // ── configure ─────────────────────────────────────────────────────────

    #[test]
    fn new_canvas_is_unconfigured() {
        let (rec, canvas) = setup();
        assert!(!canvas.is_configured());
        assert_eq!(canvas.framebuffer_id(), None);
        assert_eq!(canvas.color0_texture_id(), None);
        assert_eq!(live(&rec), (0, 0));
    }

    #[test]
    fn configure_creates_color_attachment_with_canvas_sampling() {
        let (rec, mut canvas) = setup();
        canvas.configure(64, 32, ColorFormat::Rgba8, false).unwrap();

        assert!(canvas.is_configured());
        assert_eq!(canvas.size(), (64, 32));
        let color = canvas.color0_texture_id().unwrap();
        let desc = rec.texture_desc(color).unwrap();
        assert_eq!(desc.format, TextureFormat::Color(ColorFormat::Rgba8));
        let sampling = desc.sampling.unwrap();
        assert_eq!(sampling.min_filter, MinFilter::LinearMipmapLinear);
        assert_eq!(sampling.wrap, Wrap::ClampToBorder);

        let fb = canvas.framebuffer_id().unwrap();
        assert_eq!(rec.attachments(fb), vec![(Attachment::Color(0), color)]);
        assert_eq!(live(&rec), (1, 1));
    }

    #[test]
    fn stencil_is_attached_with_identical_sampling() {
        let (rec, mut canvas) = setup();
        canvas.configure(16, 16, ColorFormat::Rgba16F, true).unwrap();

        let stencil = canvas.stencil_texture_id().unwrap();
        let desc = rec.texture_desc(stencil).unwrap();
        assert_eq!(desc.format, TextureFormat::Stencil8);
        assert_eq!(desc.sampling, Some(SamplingParams::CANVAS));
        assert_eq!(rec.attachments(canvas.framebuffer_id().unwrap()).len(), 2);
        assert_eq!(live(&rec), (2, 1));
    }

    #[test]
    fn reconfigure_releases_before_acquiring_and_balances_counts() {
        let (rec, mut canvas) = setup();
        canvas.configure(32, 32, ColorFormat::Rgba8, true).unwrap();
        let first_color = canvas.color0_texture_id();
        let first_fb = canvas.framebuffer_id();

        for _ in 0..3 {
            canvas.configure(32, 32, ColorFormat::Rgba8, true).unwrap();
        }

        assert_ne!(canvas.color0_texture_id(), first_color);
        assert_ne!(canvas.framebuffer_id(), first_fb);
        assert_eq!(live(&rec), (2, 1));
        assert_eq!(rec.created(ResourceKindCount::Texture), 8);
        assert_eq!(rec.deleted(ResourceKindCount::Texture), 6);
        assert_eq!(rec.deleted(ResourceKindCount::Framebuffer), 3);
    }

    #[test]
    fn release_order_is_color_stencil_framebuffer() {
        let (rec, mut canvas) = setup();
        canvas.configure(8, 8, ColorFormat::Rgba8, true).unwrap();
        let color = canvas.color0_texture_id().unwrap();
        let stencil = canvas.stencil_texture_id().unwrap();
        let fb = canvas.framebuffer_id().unwrap();
        rec.clear_commands();

        drop(canvas);

        assert_eq!(
            rec.commands(),
            vec![
                Command::DeleteTexture(color),
                Command::DeleteTexture(stencil),
                Command::DeleteFramebuffer(fb),
            ]
        );
        assert_eq!(live(&rec), (0, 0));
    }

    #[test]
    fn release_is_idempotent() {
        let (rec, mut canvas) = setup();
        canvas.release();
        canvas.configure(8, 8, ColorFormat::Rgba8, false).unwrap();
        canvas.release();
        canvas.release();
        assert!(!canvas.is_configured());
        assert_eq!(rec.deleted(ResourceKindCount::Texture), 1);
        assert_eq!(rec.deleted(ResourceKindCount::Framebuffer), 1);
    }

    #[test]
    fn multisampled_storage_has_no_sampling_state() {
        let (rec, mut canvas) = setup();
        canvas
            .configure_multisampled(20, 10, 4, ColorFormat::Rgba8, true)
            .unwrap();

        assert_eq!(canvas.samples(), 4);
        for id in [canvas.color0_texture_id(), canvas.stencil_texture_id()] {
            let desc = rec.texture_desc(id.unwrap()).unwrap();
            assert_eq!(desc.samples, 4);
            assert_eq!(desc.sampling, None);
        }
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn incomplete_framebuffer_is_reported_and_resources_kept() {
        let (rec, mut canvas) = setup();
        rec.set_framebuffer_status(Some(FramebufferStatus::MismatchedSamples));

        let err = canvas.configure(8, 8, ColorFormat::Rgba8, false).unwrap_err();
        assert!(matches!(
            err,
            CanvasError::Incomplete(FramebufferStatus::MismatchedSamples)
        ));
        assert!(canvas.is_configured());
        assert_eq!(live(&rec), (1, 1));

        drop(canvas);
        assert_eq!(live(&rec), (0, 0));
    }

    #[test]
    fn failed_texture_creation_leaves_nothing_behind() {
        let (rec, mut canvas) = setup();
        canvas.configure(8, 8, ColorFormat::Rgba8, true).unwrap();

        let err = canvas.configure(0, 8, ColorFormat::Rgba8, true).unwrap_err();
        assert!(matches!(err, CanvasError::Gfx(GfxError::InvalidSize { .. })));
        assert!(!canvas.is_configured());
        assert_eq!(live(&rec), (0, 0));
    }

    // ── clears ────────────────────────────────────────────────────────────

    #[test]
    fn clears_target_the_owned_framebuffer() {
        let (rec, mut canvas) = setup();
        canvas.configure(8, 8, ColorFormat::Rgba8, true).unwrap();
        let fb = canvas.framebuffer_id();
        rec.clear_commands();

        canvas.clear_color(0).unwrap();
        canvas.clear_stencil().unwrap();
        canvas.clear_depth().unwrap();

        assert_eq!(
            rec.commands(),
            vec![
                Command::Clear {
                    framebuffer: fb,
                    target: ClearTarget::Color {
                        index: 0,
                        rgba: [0.0, 0.0, 0.0, 0.0]
                    },
                },
                Command::Clear {
                    framebuffer: fb,
                    target: ClearTarget::Stencil(0),
                },
                Command::Clear {
                    framebuffer: fb,
                    target: ClearTarget::Depth(1.0),
                },
            ]
        );
    }

    #[test]
    fn clear_on_unconfigured_canvas_is_a_no_op() {
        let (rec, canvas) = setup();
        canvas.clear_color(0).unwrap();
        canvas.clear_stencil().unwrap();
        assert!(rec.commands().is_empty());
    }
}

use std::rc::Rc;

use anyhow::{Context, Result};
use prism_engine::device::GpuInit;
use prism_engine::gfx::native::NativeContext;
use prism_engine::gfx::SharedContext;
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::renderer::{Renderer, RendererConfig};
use prism_engine::scene::demo_scene;
use prism_engine::window::{WindowConfig, WinitHost};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut host = WinitHost::new(WindowConfig::default()).context("failed to open the window")?;

    let native = NativeContext::new(host.window(), GpuInit::default())
        .context("failed to create the graphics context")?;
    let ctx: SharedContext = Rc::new(native);

    let mut renderer = Renderer::new(ctx, RendererConfig::default(), demo_scene());
    renderer
        .initialize()
        .context("failed to initialize the renderer")?;
    renderer.play(&mut host).context("frame loop failed")?;

    log::info!("window closed");
    Ok(())
}

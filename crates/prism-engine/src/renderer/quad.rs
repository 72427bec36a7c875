use crate::gfx::{OwnedVertexArray, QuadVertex, SharedContext, VertexArrayId};

const fn vertex(x: f32, y: f32) -> QuadVertex {
    QuadVertex {
        position: [x, y, 0.0],
        tex_coord: [x, y],
    }
}

/// Unit square over `[0, 1]²` as two triangles, texture coordinates equal to
/// position.
pub const SQUARE_VERTICES: [QuadVertex; 6] = [
    vertex(1.0, 0.0),
    vertex(1.0, 1.0),
    vertex(0.0, 1.0),
    vertex(1.0, 0.0),
    vertex(0.0, 1.0),
    vertex(0.0, 0.0),
];

/// The quad the screen pass scales to the frame.
#[derive(Debug)]
pub struct ScreenQuad {
    vertex_array: OwnedVertexArray,
}

impl ScreenQuad {
    pub fn new(ctx: SharedContext) -> Self {
        let id = ctx.create_vertex_array(&SQUARE_VERTICES);
        Self {
            vertex_array: OwnedVertexArray::new(ctx, id),
        }
    }

    #[inline]
    pub fn id(&self) -> VertexArrayId {
        self.vertex_array.id()
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        SQUARE_VERTICES.len() as u32
    }
}

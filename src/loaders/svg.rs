use anyhow::{Context, Result};
use lyon_tessellation::path::math::point;
use lyon_tessellation::path::Path as LyonPath;
use lyon_tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, StrokeOptions, StrokeTessellator,
    StrokeVertex, VertexBuffers,
};
use usvg::tiny_skia_path::{PathSegment, Transform};

use crate::scene::MeshData;

/// Uniform scale applied to the committed diagram group.
pub const DIAGRAM_SCALE: f32 = 0.025;

const TOLERANCE: f32 = 0.1;

/// One tessellated fill shape or stroke outline, with its style color
/// (linear) and opacity.
#[derive(Debug, Clone)]
pub struct DiagramMesh {
    pub mesh: MeshData,
    pub color: [f32; 4],
}

/// Parse an SVG document and tessellate its path outlines.
///
/// Fill and stroke are handled independently per path: a missing or `none`
/// paint skips that half, so a `fill: none` path can still contribute
/// stroke meshes.
pub fn parse_diagram(data: &[u8]) -> Result<Vec<DiagramMesh>> {
    let tree = usvg::Tree::from_data(data, &usvg::Options::default())
        .context("Failed to parse SVG document")?;

    let mut meshes = Vec::new();
    collect_group(tree.root(), &mut meshes)?;

    log::debug!("svg: tessellated {} meshes", meshes.len());
    Ok(meshes)
}

fn collect_group(group: &usvg::Group, out: &mut Vec<DiagramMesh>) -> Result<()> {
    for node in group.children() {
        match node {
            usvg::Node::Group(child) => collect_group(child, out)?,
            usvg::Node::Path(path) => collect_path(path, out)?,
            // Embedded images and text are not diagram outlines
            _ => {}
        }
    }
    Ok(())
}

fn collect_path(path: &usvg::Path, out: &mut Vec<DiagramMesh>) -> Result<()> {
    let outline = to_lyon(path.data(), path.abs_transform());

    if let Some(fill) = path.fill() {
        if let Some(color) = paint_color(fill.paint(), fill.opacity().get()) {
            let mesh = tessellate_fill(&outline)?;
            if !mesh.indices.is_empty() {
                out.push(DiagramMesh { mesh, color });
            }
        }
    }

    if let Some(stroke) = path.stroke() {
        if let Some(color) = paint_color(stroke.paint(), stroke.opacity().get()) {
            let mesh = tessellate_stroke(&outline, stroke.width().get())?;
            if !mesh.indices.is_empty() {
                out.push(DiagramMesh { mesh, color });
            }
        }
    }

    Ok(())
}

/// Style color as linear RGB plus opacity. Gradients and patterns are
/// skipped like an absent paint.
fn paint_color(paint: &usvg::Paint, opacity: f32) -> Option<[f32; 4]> {
    match paint {
        usvg::Paint::Color(c) => Some([
            srgb_to_linear(c.red),
            srgb_to_linear(c.green),
            srgb_to_linear(c.blue),
            opacity,
        ]),
        _ => {
            log::debug!("svg: skipping non-color paint");
            None
        }
    }
}

pub fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert a usvg path into lyon's path representation, applying the
/// node's accumulated transform.
fn to_lyon(path: &usvg::tiny_skia_path::Path, transform: Transform) -> LyonPath {
    let tp = |x: f32, y: f32| {
        point(
            transform.sx * x + transform.kx * y + transform.tx,
            transform.ky * x + transform.sy * y + transform.ty,
        )
    };

    let mut builder = LyonPath::builder();
    let mut open = false;

    for segment in path.segments() {
        match segment {
            PathSegment::MoveTo(p) => {
                if open {
                    builder.end(false);
                }
                builder.begin(tp(p.x, p.y));
                open = true;
            }
            PathSegment::LineTo(p) => {
                if open {
                    builder.line_to(tp(p.x, p.y));
                }
            }
            PathSegment::QuadTo(c, p) => {
                if open {
                    builder.quadratic_bezier_to(tp(c.x, c.y), tp(p.x, p.y));
                }
            }
            PathSegment::CubicTo(c1, c2, p) => {
                if open {
                    builder.cubic_bezier_to(tp(c1.x, c1.y), tp(c2.x, c2.y), tp(p.x, p.y));
                }
            }
            PathSegment::Close => {
                if open {
                    builder.end(true);
                    open = false;
                }
            }
        }
    }
    if open {
        builder.end(false);
    }

    builder.build()
}

fn tessellate_fill(outline: &LyonPath) -> Result<MeshData> {
    let mut buffers: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();

    tessellator
        .tessellate_path(
            outline,
            &FillOptions::tolerance(TOLERANCE),
            &mut BuffersBuilder::new(&mut buffers, |v: FillVertex| v.position().to_array()),
        )
        .map_err(|e| anyhow::anyhow!("Fill tessellation failed: {:?}", e))?;

    Ok(buffers_to_mesh("fill", buffers))
}

fn tessellate_stroke(outline: &LyonPath, width: f32) -> Result<MeshData> {
    let mut buffers: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    let mut tessellator = StrokeTessellator::new();

    tessellator
        .tessellate_path(
            outline,
            &StrokeOptions::tolerance(TOLERANCE).with_line_width(width),
            &mut BuffersBuilder::new(&mut buffers, |v: StrokeVertex| v.position().to_array()),
        )
        .map_err(|e| anyhow::anyhow!("Stroke tessellation failed: {:?}", e))?;

    Ok(buffers_to_mesh("stroke", buffers))
}

/// Lift the 2D tessellation into scene geometry on the XY plane.
fn buffers_to_mesh(name: &str, buffers: VertexBuffers<[f32; 2], u32>) -> MeshData {
    let mut mesh = MeshData::new(name);
    for [x, y] in buffers.vertices {
        mesh.positions.push([x, y, 0.0]);
        mesh.normals.push([0.0, 0.0, 1.0]);
        mesh.uvs.push([0.0, 0.0]);
    }
    mesh.indices = buffers.indices;
    mesh
}

//! Seams between the rendering core and the host: the GPU-side renderer and
//! the container the render surface is mounted into.
//!
//! The core never talks to a graphics API directly. Everything GPU-resident
//! is owned by a [`RenderBackend`] and referred to through generational
//! handles, so a released handle can never alias a newer resource.

mod headless;

pub use headless::{
    BackendStats, FrameRecord, HeadlessBackend, HeadlessContainer, HeadlessMesh, HeadlessSurface,
};

use slotmap::new_key_type;

use crate::error::BackendError;
use crate::math::{Matrix4, Point3};
use crate::scene::Light;
use crate::tessellation::TriangleMesh;
use crate::theme::{Color, Material};

new_key_type! {
    /// Handle to a render surface owned by a backend.
    pub struct SurfaceId;
    /// Handle to an uploaded mesh owned by a backend.
    pub struct GpuMeshId;
    /// Handle to an event listener registered on a container.
    pub struct ListenerId;
}

/// How line vertices are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTopology {
    /// Each vertex connects to the next.
    Strip,
    /// Vertices pair up into independent segments.
    Segments,
}

/// Borrowed CPU-side mesh data handed to [`RenderBackend::upload`].
#[derive(Debug, Clone, Copy)]
pub enum MeshData<'a> {
    Lines {
        positions: &'a [Point3],
        topology: LineTopology,
    },
    Triangles(&'a TriangleMesh),
}

impl MeshData<'_> {
    /// Returns the number of vertices to upload.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        match self {
            Self::Lines { positions, .. } => positions.len(),
            Self::Triangles(mesh) => mesh.vertices.len(),
        }
    }
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub view: Matrix4,
    pub projection: Matrix4,
    pub eye: Point3,
    pub clear_color: Color,
    pub lights: &'a [Light],
    /// Meshes to draw, in order.
    pub draw_list: &'a [GpuMeshId],
}

/// GPU-side renderer owned by a scene.
pub trait RenderBackend {
    /// Allocates a render surface of the given pixel size.
    ///
    /// # Errors
    ///
    /// Returns an error if no surface can be created.
    fn create_surface(&mut self, width: u32, height: u32) -> Result<SurfaceId, BackendError>;

    /// Resizes a surface's drawing buffer.
    fn resize_surface(&mut self, surface: SurfaceId, width: u32, height: u32);

    /// Releases a surface and its context.
    fn destroy_surface(&mut self, surface: SurfaceId);

    /// Uploads mesh data with a material.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffers cannot be allocated.
    fn upload(&mut self, mesh: MeshData<'_>, material: &Material) -> Result<GpuMeshId, BackendError>;

    /// Replaces the material of an uploaded mesh.
    fn set_material(&mut self, mesh: GpuMeshId, material: &Material);

    /// Frees an uploaded mesh.
    fn release(&mut self, mesh: GpuMeshId);

    /// Draws a frame into a surface.
    fn render(&mut self, surface: SurfaceId, frame: &Frame<'_>);
}

/// Events a scene listens for on its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    Resize,
    Pointer,
}

/// The host region a render surface is mounted into.
pub trait Container {
    /// Current size in pixels.
    fn size(&self) -> (u32, u32);

    /// Places the surface inside the container.
    fn attach_surface(&mut self, surface: SurfaceId);

    /// Removes the surface from the container.
    fn detach_surface(&mut self, surface: SurfaceId);

    /// Registers interest in an event kind.
    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId;

    /// Unregisters a listener.
    fn remove_listener(&mut self, listener: ListenerId);
}

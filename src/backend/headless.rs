use slotmap::SlotMap;

use crate::error::BackendError;
use crate::math::Point3;
use crate::theme::{Color, Material};

use super::{
    Container, Frame, GpuMeshId, ListenerId, ListenerKind, MeshData, RenderBackend, SurfaceId,
};

/// A surface owned by [`HeadlessBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessSurface {
    pub width: u32,
    pub height: u32,
    pub frames: u64,
}

/// A mesh owned by [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessMesh {
    pub vertex_count: usize,
    pub material: Material,
    pub triangles: bool,
}

/// Lifetime counters kept by [`HeadlessBackend`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendStats {
    pub surfaces_created: u64,
    pub surfaces_destroyed: u64,
    pub resizes: u64,
    pub uploads: u64,
    pub releases: u64,
    pub material_updates: u64,
    pub frames: u64,
    /// Operations that named a handle the backend does not own.
    pub invalid_handles: u64,
}

/// What the last rendered frame looked like.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub surface: SurfaceId,
    pub eye: Point3,
    pub clear_color: Color,
    pub draw_list: Vec<GpuMeshId>,
    /// Draw-list entries that did not resolve to a live mesh.
    pub missing: usize,
    pub light_count: usize,
}

/// A render backend that keeps resources in memory and draws nothing.
///
/// It tracks every allocation so callers can check for leaks, double frees
/// and frames that reference released meshes.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    surfaces: SlotMap<SurfaceId, HeadlessSurface>,
    meshes: SlotMap<GpuMeshId, HeadlessMesh>,
    stats: BackendStats,
    last_frame: Option<FrameRecord>,
}

impl HeadlessBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lifetime counters.
    #[must_use]
    pub fn stats(&self) -> BackendStats {
        self.stats
    }

    /// Returns the number of meshes currently allocated.
    #[must_use]
    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    /// Returns the number of surfaces currently allocated.
    #[must_use]
    pub fn live_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    /// Looks up a mesh.
    #[must_use]
    pub fn mesh(&self, id: GpuMeshId) -> Option<&HeadlessMesh> {
        self.meshes.get(id)
    }

    /// Looks up a surface.
    #[must_use]
    pub fn surface(&self, id: SurfaceId) -> Option<&HeadlessSurface> {
        self.surfaces.get(id)
    }

    /// Returns the most recently rendered frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<&FrameRecord> {
        self.last_frame.as_ref()
    }

    fn invalid_handle(&mut self, what: &'static str) {
        self.stats.invalid_handles += 1;
        tracing::warn!(what, "headless backend received a stale handle");
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_surface(&mut self, width: u32, height: u32) -> Result<SurfaceId, BackendError> {
        self.stats.surfaces_created += 1;
        Ok(self.surfaces.insert(HeadlessSurface {
            width,
            height,
            frames: 0,
        }))
    }

    fn resize_surface(&mut self, surface: SurfaceId, width: u32, height: u32) {
        let Some(s) = self.surfaces.get_mut(surface) else {
            self.invalid_handle("surface");
            return;
        };
        s.width = width;
        s.height = height;
        self.stats.resizes += 1;
    }

    fn destroy_surface(&mut self, surface: SurfaceId) {
        if self.surfaces.remove(surface).is_some() {
            self.stats.surfaces_destroyed += 1;
        } else {
            self.invalid_handle("surface");
        }
    }

    fn upload(&mut self, mesh: MeshData<'_>, material: &Material) -> Result<GpuMeshId, BackendError> {
        if mesh.vertex_count() == 0 {
            return Err(BackendError::UploadFailed("mesh has no vertices".to_owned()));
        }
        self.stats.uploads += 1;
        Ok(self.meshes.insert(HeadlessMesh {
            vertex_count: mesh.vertex_count(),
            material: *material,
            triangles: matches!(mesh, MeshData::Triangles(_)),
        }))
    }

    fn set_material(&mut self, mesh: GpuMeshId, material: &Material) {
        let Some(m) = self.meshes.get_mut(mesh) else {
            self.invalid_handle("mesh");
            return;
        };
        m.material = *material;
        self.stats.material_updates += 1;
    }

    fn release(&mut self, mesh: GpuMeshId) {
        if self.meshes.remove(mesh).is_some() {
            self.stats.releases += 1;
        } else {
            self.invalid_handle("mesh");
        }
    }

    fn render(&mut self, surface: SurfaceId, frame: &Frame<'_>) {
        let Some(s) = self.surfaces.get_mut(surface) else {
            self.invalid_handle("surface");
            return;
        };
        s.frames += 1;
        self.stats.frames += 1;

        let missing = frame
            .draw_list
            .iter()
            .filter(|id| !self.meshes.contains_key(**id))
            .count();
        self.last_frame = Some(FrameRecord {
            surface,
            eye: frame.eye,
            clear_color: frame.clear_color,
            draw_list: frame.draw_list.to_vec(),
            missing,
            light_count: frame.lights.len(),
        });
    }
}

/// An in-memory container with a settable size.
#[derive(Debug)]
pub struct HeadlessContainer {
    width: u32,
    height: u32,
    attached: Option<SurfaceId>,
    listeners: SlotMap<ListenerId, ListenerKind>,
}

impl HeadlessContainer {
    /// Creates a container of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            attached: None,
            listeners: SlotMap::with_key(),
        }
    }

    /// Changes the reported size. The host still has to forward the resize.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Returns the attached surface, if any.
    #[must_use]
    pub fn attached_surface(&self) -> Option<SurfaceId> {
        self.attached
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Container for HeadlessContainer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn attach_surface(&mut self, surface: SurfaceId) {
        self.attached = Some(surface);
    }

    fn detach_surface(&mut self, surface: SurfaceId) {
        if self.attached == Some(surface) {
            self.attached = None;
        }
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        self.listeners.insert(kind)
    }

    fn remove_listener(&mut self, listener: ListenerId) {
        self.listeners.remove(listener);
    }
}

use glam::DVec3;

use crate::{
    element::{EH, FH, HH, HasTopology, VH},
    error::Error,
    iterator,
    property::{EProperty, FProperty, TPropData, VProperty},
    status::Status,
    topol::{TopolCache, Topology},
};

/// A triangle mesh: halfedge topology plus vertex positions and sharpness
/// markers.
///
/// Crease sharpness on edges and corner sharpness on vertices are integer
/// counters. A value of `n` means the element stays sharp for `n` more
/// subdivision rounds; [`u16::MAX`] is effectively forever.
pub struct Mesh {
    topol: Topology,
    cache: TopolCache,
    points: VProperty<DVec3>,
    crease: EProperty<u16>,
    corner: VProperty<u16>,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    pub fn new() -> Self {
        let mut topol = Topology::new();
        let points = topol.create_vertex_prop(DVec3::ZERO);
        let crease = topol.create_edge_prop(0u16);
        let corner = topol.create_vertex_prop(0u16);
        Mesh {
            topol,
            cache: TopolCache::default(),
            points,
            crease,
            corner,
        }
    }

    pub fn with_capacity(nverts: usize, nedges: usize, nfaces: usize) -> Self {
        let mut topol = Topology::with_capacity(nverts, nedges, nfaces);
        let points = topol.create_vertex_prop(DVec3::ZERO);
        let crease = topol.create_edge_prop(0u16);
        let corner = topol.create_vertex_prop(0u16);
        Mesh {
            topol,
            cache: TopolCache::default(),
            points,
            crease,
            corner,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.topol.num_vertices()
    }

    pub fn num_halfedges(&self) -> usize {
        self.topol.num_halfedges()
    }

    pub fn num_edges(&self) -> usize {
        self.topol.num_edges()
    }

    pub fn num_faces(&self) -> usize {
        self.topol.num_faces()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<> {
        self.topol.vertices()
    }

    pub fn edges(&self) -> impl Iterator<Item = EH> + use<> {
        self.topol.edges()
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> + use<> {
        self.topol.faces()
    }

    pub fn add_vertex(&mut self, pos: DVec3) -> Result<VH, Error> {
        let v = self.topol.add_vertex()?;
        self.points.set(v, pos)?;
        Ok(v)
    }

    pub fn add_face(&mut self, verts: [VH; 3]) -> Result<FH, Error> {
        self.topol.add_face(verts, &mut self.cache)
    }

    pub fn delete_face(&mut self, f: FH, delete_isolated_vertices: bool) -> Result<(), Error> {
        self.topol
            .delete_face(f, delete_isolated_vertices, &mut self.cache)
    }

    pub fn delete_vertex(&mut self, v: VH) -> Result<(), Error> {
        self.topol.delete_vertex(v, &mut self.cache)
    }

    /// A shared handle to the vertex positions.
    pub fn points(&self) -> VProperty<DVec3> {
        self.points.clone()
    }

    pub fn point(&self, v: VH) -> Result<DVec3, Error> {
        self.points.get_cloned(v)
    }

    pub fn set_point(&mut self, v: VH, pos: DVec3) -> Result<(), Error> {
        self.points.set(v, pos)
    }

    pub fn crease(&self, e: EH) -> Result<u16, Error> {
        self.crease.get_cloned(e)
    }

    pub fn set_crease(&mut self, e: EH, sharpness: u16) -> Result<(), Error> {
        self.crease.set(e, sharpness)
    }

    pub fn is_crease_edge(&self, e: EH) -> Result<bool, Error> {
        Ok(self.crease.get_cloned(e)? > 0)
    }

    pub fn corner(&self, v: VH) -> Result<u16, Error> {
        self.corner.get_cloned(v)
    }

    pub fn set_corner(&mut self, v: VH, sharpness: u16) -> Result<(), Error> {
        self.corner.set(v, sharpness)
    }

    /// Crease edges and boundary edges both interrupt smooth stencils.
    pub fn is_sharp_edge(&self, e: EH) -> Result<bool, Error> {
        Ok(self.topol.is_boundary_edge(e) || self.crease.get_cloned(e)? > 0)
    }

    pub fn vertex_status(&self, v: VH) -> Result<Status, Error> {
        self.topol.vertex_status(v)
    }

    pub fn is_boundary_vertex(&self, v: VH) -> bool {
        self.topol.is_boundary_vertex(v)
    }

    pub fn is_boundary_edge(&self, e: EH) -> bool {
        self.topol.is_boundary_edge(e)
    }

    pub fn is_boundary_halfedge(&self, h: HH) -> bool {
        self.topol.is_boundary_halfedge(h)
    }

    pub fn head_vertex(&self, h: HH) -> VH {
        self.topol.head_vertex(h)
    }

    pub fn tail_vertex(&self, h: HH) -> VH {
        self.topol.tail_vertex(h)
    }

    pub fn next_halfedge(&self, h: HH) -> HH {
        self.topol.next_halfedge(h)
    }

    pub fn prev_halfedge(&self, h: HH) -> HH {
        self.topol.prev_halfedge(h)
    }

    pub fn halfedge_face(&self, h: HH) -> Option<FH> {
        self.topol.halfedge_face(h)
    }

    pub fn face_halfedge(&self, f: FH) -> HH {
        self.topol.face_halfedge(f)
    }

    pub fn vertex_halfedge(&self, v: VH) -> Option<HH> {
        self.topol.vertex_halfedge(v)
    }

    pub fn face_vertices(&self, f: FH) -> [VH; 3] {
        self.topol.face_vertices(f)
    }

    pub fn find_halfedge(&self, from: VH, to: VH) -> Option<HH> {
        self.topol.find_halfedge(from, to)
    }

    pub fn vertex_valence(&self, v: VH) -> usize {
        iterator::voh_ccw_iter(&self.topol, v).count()
    }

    /// The two end vertices of an edge.
    pub fn edge_vertices(&self, e: EH) -> (VH, VH) {
        let (h, oh) = e.halfedges();
        (self.topol.head_vertex(oh), self.topol.head_vertex(h))
    }

    /// The vertices opposite an edge in its incident faces, in the order of
    /// the edge's halfedges. `None` on boundary sides.
    pub fn edge_opposite_vertices(&self, e: EH) -> (Option<VH>, Option<VH>) {
        let (h, oh) = e.halfedges();
        let across = |h: HH| {
            self.topol
                .halfedge_face(h)
                .map(|_| self.topol.head_vertex(self.topol.next_halfedge(h)))
        };
        (across(h), across(oh))
    }

    pub fn voh_ccw_iter(&self, v: VH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::voh_ccw_iter(&self.topol, v)
    }

    pub fn voh_cw_iter(&self, v: VH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::voh_cw_iter(&self.topol, v)
    }

    pub fn vv_ccw_iter(&self, v: VH) -> impl Iterator<Item = VH> + use<'_> {
        iterator::vv_ccw_iter(&self.topol, v)
    }

    pub fn vv_cw_iter(&self, v: VH) -> impl Iterator<Item = VH> + use<'_> {
        iterator::vv_cw_iter(&self.topol, v)
    }

    pub fn ve_ccw_iter(&self, v: VH) -> impl Iterator<Item = EH> + use<'_> {
        iterator::ve_ccw_iter(&self.topol, v)
    }

    pub fn vf_ccw_iter(&self, v: VH) -> impl Iterator<Item = FH> + use<'_> {
        iterator::vf_ccw_iter(&self.topol, v)
    }

    pub fn fh_ccw_iter(&self, f: FH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::fh_ccw_iter(&self.topol, f)
    }

    pub fn fv_ccw_iter(&self, f: FH) -> impl Iterator<Item = VH> + use<'_> {
        iterator::fv_ccw_iter(&self.topol, f)
    }

    pub fn fe_ccw_iter(&self, f: FH) -> impl Iterator<Item = EH> + use<'_> {
        iterator::fe_ccw_iter(&self.topol, f)
    }

    pub fn ff_ccw_iter(&self, f: FH) -> impl Iterator<Item = FH> + use<'_> {
        iterator::ff_ccw_iter(&self.topol, f)
    }

    pub fn ef_iter(&self, e: EH) -> impl Iterator<Item = FH> + use<'_> {
        iterator::ef_iter(&self.topol, e)
    }

    pub fn create_vertex_prop<T: TPropData>(&mut self, default: T) -> VProperty<T> {
        self.topol.create_vertex_prop(default)
    }

    pub fn create_edge_prop<T: TPropData>(&mut self, default: T) -> EProperty<T> {
        self.topol.create_edge_prop(default)
    }

    pub fn create_face_prop<T: TPropData>(&mut self, default: T) -> FProperty<T> {
        self.topol.create_face_prop(default)
    }

    /// Area weighted face normal, i.e. the cross product of two edges. Not
    /// normalized.
    pub fn face_cross(&self, f: FH) -> Result<DVec3, Error> {
        let [a, b, c] = self.face_vertices(f);
        let pa = self.points.get_cloned(a)?;
        let pb = self.points.get_cloned(b)?;
        let pc = self.points.get_cloned(c)?;
        Ok((pb - pa).cross(pc - pa))
    }

    pub fn face_normal(&self, f: FH) -> Result<DVec3, Error> {
        Ok(self.face_cross(f)?.normalize_or_zero())
    }

    /// Vertex normal accumulated from incident faces, weighted by face area.
    pub fn vertex_normal(&self, v: VH) -> Result<DVec3, Error> {
        let mut total = DVec3::ZERO;
        for f in iterator::vf_ccw_iter(&self.topol, v) {
            total += self.face_cross(f)?;
        }
        Ok(total.normalize_or_zero())
    }

    pub fn check_topology(&self) -> Result<(), Error> {
        self.topol.check()
    }
}

impl HasTopology for Mesh {
    fn topology(&self) -> &Topology {
        &self.topol
    }
}

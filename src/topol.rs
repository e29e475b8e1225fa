use crate::{
    element::{EH, Edge, FH, Face, HH, Halfedge, Handle, VH, Vertex},
    error::Error,
    iterator,
    property::{EProperty, FProperty, Property, PropertyContainer, TPropData, VProperty},
    status::Status,
};

/// Scratch buffers reused across topological edits to avoid repeated
/// allocations.
#[derive(Default)]
pub struct TopolCache {
    pub(crate) next_cache: Vec<(HH, HH)>,
    pub(crate) halfedges: Vec<HH>,
    pub(crate) edges: Vec<EH>,
    pub(crate) vertices: Vec<VH>,
    pub(crate) faces: Vec<FH>,
}

/// Halfedge connectivity of a triangle mesh.
///
/// Vertices, edges and faces live in index arenas; a halfedge handle is the
/// edge index shifted left by one with the side in the low bit, so the
/// opposite halfedge is one xor away. Each vertex stores one outgoing
/// halfedge, and for boundary vertices that halfedge is always a boundary
/// halfedge so boundary walks start in constant time.
pub struct Topology {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
    pub(crate) vstatus: VProperty<Status>,
    pub(crate) estatus: EProperty<Status>,
    pub(crate) fstatus: FProperty<Status>,
    pub(crate) vprops: PropertyContainer<VH>,
    pub(crate) hprops: PropertyContainer<HH>,
    pub(crate) eprops: PropertyContainer<EH>,
    pub(crate) fprops: PropertyContainer<FH>,
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}

impl Topology {
    pub fn new() -> Self {
        let mut vprops = PropertyContainer::default();
        let hprops = PropertyContainer::default();
        let mut eprops = PropertyContainer::default();
        let mut fprops = PropertyContainer::default();
        let vstatus = Property::new(&mut vprops, Status::default());
        let estatus = Property::new(&mut eprops, Status::default());
        let fstatus = Property::new(&mut fprops, Status::default());
        Topology {
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            vstatus,
            estatus,
            fstatus,
            vprops,
            hprops,
            eprops,
            fprops,
        }
    }

    pub fn with_capacity(nverts: usize, nedges: usize, nfaces: usize) -> Self {
        let mut topol = Self::new();
        topol.vertices.reserve(nverts);
        topol.edges.reserve(nedges);
        topol.faces.reserve(nfaces);
        let _ = topol.vprops.reserve(nverts);
        let _ = topol.hprops.reserve(2 * nedges);
        let _ = topol.eprops.reserve(nedges);
        let _ = topol.fprops.reserve(nfaces);
        topol
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_halfedges(&self) -> usize {
        self.edges.len() * 2
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<> {
        (0..(self.num_vertices() as u32)).map(VH::from)
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HH> + use<> {
        (0..(self.num_halfedges() as u32)).map(HH::from)
    }

    pub fn edges(&self) -> impl Iterator<Item = EH> + use<> {
        (0..(self.num_edges() as u32)).map(EH::from)
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> + use<> {
        (0..(self.num_faces() as u32)).map(FH::from)
    }

    pub fn is_valid_vertex(&self, v: VH) -> bool {
        (v.index() as usize) < self.vertices.len()
    }

    pub fn is_valid_halfedge(&self, h: HH) -> bool {
        (h.index() as usize) < self.num_halfedges()
    }

    pub fn is_valid_edge(&self, e: EH) -> bool {
        (e.index() as usize) < self.edges.len()
    }

    pub fn is_valid_face(&self, f: FH) -> bool {
        (f.index() as usize) < self.faces.len()
    }

    fn vertex(&self, v: VH) -> &Vertex {
        &self.vertices[v.index() as usize]
    }

    fn vertex_mut(&mut self, v: VH) -> &mut Vertex {
        &mut self.vertices[v.index() as usize]
    }

    pub(crate) fn halfedge(&self, h: HH) -> &Halfedge {
        &self.edges[(h.index() >> 1) as usize].halfedges[(h.index() & 1) as usize]
    }

    fn halfedge_mut(&mut self, h: HH) -> &mut Halfedge {
        &mut self.edges[(h.index() >> 1) as usize].halfedges[(h.index() & 1) as usize]
    }

    fn face(&self, f: FH) -> &Face {
        &self.faces[f.index() as usize]
    }

    pub fn vertex_halfedge(&self, v: VH) -> Option<HH> {
        self.vertex(v).halfedge
    }

    pub fn head_vertex(&self, h: HH) -> VH {
        self.halfedge(h).vertex
    }

    pub fn tail_vertex(&self, h: HH) -> VH {
        self.halfedge(h.opposite()).vertex
    }

    pub fn next_halfedge(&self, h: HH) -> HH {
        self.halfedge(h).next
    }

    pub fn prev_halfedge(&self, h: HH) -> HH {
        self.halfedge(h).prev
    }

    pub fn halfedge_face(&self, h: HH) -> Option<FH> {
        self.halfedge(h).face
    }

    pub fn face_halfedge(&self, f: FH) -> HH {
        self.face(f).halfedge
    }

    /// The counterclockwise rotated outgoing halfedge at the tail of `h`.
    pub fn ccw_rotated_halfedge(&self, h: HH) -> HH {
        self.prev_halfedge(h).opposite()
    }

    /// The clockwise rotated outgoing halfedge at the tail of `h`.
    pub fn cw_rotated_halfedge(&self, h: HH) -> HH {
        self.next_halfedge(h.opposite())
    }

    pub fn is_boundary_halfedge(&self, h: HH) -> bool {
        self.halfedge(h).face.is_none()
    }

    pub fn is_boundary_edge(&self, e: EH) -> bool {
        let (h, oh) = e.halfedges();
        self.is_boundary_halfedge(h) || self.is_boundary_halfedge(oh)
    }

    pub fn is_boundary_vertex(&self, v: VH) -> bool {
        match self.vertex(v).halfedge {
            Some(h) => self.is_boundary_halfedge(h),
            None => true,
        }
    }

    /// The three corner vertices of a face, in counterclockwise order.
    pub fn face_vertices(&self, f: FH) -> [VH; 3] {
        let h0 = self.face_halfedge(f);
        let h1 = self.next_halfedge(h0);
        let h2 = self.next_halfedge(h1);
        [
            self.head_vertex(h0),
            self.head_vertex(h1),
            self.head_vertex(h2),
        ]
    }

    /// Find the halfedge going from vertex `from` to vertex `to`.
    pub fn find_halfedge(&self, from: VH, to: VH) -> Option<HH> {
        iterator::voh_ccw_iter(self, from).find(|h| self.head_vertex(*h) == to)
    }

    pub fn vertex_status(&self, v: VH) -> Result<Status, Error> {
        self.vstatus.get_cloned(v)
    }

    pub fn edge_status(&self, e: EH) -> Result<Status, Error> {
        self.estatus.get_cloned(e)
    }

    pub fn face_status(&self, f: FH) -> Result<Status, Error> {
        self.fstatus.get_cloned(f)
    }

    pub fn create_vertex_prop<T: TPropData>(&mut self, default: T) -> VProperty<T> {
        Property::new(&mut self.vprops, default)
    }

    pub fn create_edge_prop<T: TPropData>(&mut self, default: T) -> EProperty<T> {
        Property::new(&mut self.eprops, default)
    }

    pub fn create_face_prop<T: TPropData>(&mut self, default: T) -> FProperty<T> {
        Property::new(&mut self.fprops, default)
    }

    pub fn add_vertex(&mut self) -> Result<VH, Error> {
        self.vprops.push_value()?;
        let v: VH = (self.vertices.len() as u32).into();
        self.vertices.push(Vertex { halfedge: None });
        Ok(v)
    }

    /// Create a new edge from `from` to `to` and return the halfedge pointing
    /// at `to`. The halfedges are linked to each other like an isolated edge;
    /// the caller is responsible for splicing them into boundary cycles.
    fn new_edge(&mut self, from: VH, to: VH) -> Result<HH, Error> {
        self.eprops.push_value()?;
        self.hprops.push_value()?;
        self.hprops.push_value()?;
        let h: HH = ((self.edges.len() as u32) << 1).into();
        let oh = h.opposite();
        self.edges.push(Edge {
            halfedges: [
                Halfedge {
                    face: None,
                    vertex: to,
                    next: oh,
                    prev: oh,
                },
                Halfedge {
                    face: None,
                    vertex: from,
                    next: h,
                    prev: h,
                },
            ],
        });
        Ok(h)
    }

    fn new_face(&mut self, halfedge: HH) -> Result<FH, Error> {
        self.fprops.push_value()?;
        let f: FH = (self.faces.len() as u32).into();
        self.faces.push(Face { halfedge });
        Ok(f)
    }

    fn link_halfedges(&mut self, prev: HH, next: HH) {
        self.halfedge_mut(prev).next = next;
        self.halfedge_mut(next).prev = prev;
    }

    /// Rotate the outgoing halfedge of `v` onto the boundary, if the vertex
    /// has a boundary halfedge. Keeps boundary vertices recognizable in
    /// constant time.
    fn adjust_outgoing_halfedge(&mut self, v: VH) {
        if let Some(h) = iterator::voh_ccw_iter(self, v).find(|h| self.is_boundary_halfedge(*h)) {
            self.vertex_mut(v).halfedge = Some(h);
        }
    }

    /// Add a triangle connecting the given vertices, in counterclockwise
    /// winding order.
    ///
    /// Faces that would make a vertex or halfedge non-manifold are rejected
    /// with [`Error::ComplexVertex`] / [`Error::ComplexHalfedge`]. A winding
    /// disagreement with an existing neighbor face shows up as a complex
    /// halfedge; it is reported as a diagnostic and the mesh is left
    /// untouched.
    pub fn add_face(&mut self, verts: [VH; 3], cache: &mut TopolCache) -> Result<FH, Error> {
        let mut hes: [Option<HH>; 3] = [None; 3];
        let mut needs_adjust = [false; 3];
        cache.next_cache.clear();
        for i in 0..3 {
            let v = verts[i];
            if !self.is_valid_vertex(v) {
                return Err(Error::OutOfBoundsAccess);
            }
            if !self.is_boundary_vertex(v) {
                return Err(Error::ComplexVertex(v));
            }
            if let Some(h) = self.find_halfedge(v, verts[(i + 1) % 3]) {
                if !self.is_boundary_halfedge(h) {
                    log::warn!(
                        "triangle ({}, {}, {}) disagrees with the winding of an existing face across {}",
                        verts[0],
                        verts[1],
                        verts[2],
                        h
                    );
                    return Err(Error::ComplexHalfedge(h));
                }
                hes[i] = Some(h);
            }
        }
        // When two consecutive existing halfedges are not already linked, the
        // boundary patch between them has to be moved out of the way first.
        for i in 0..3 {
            let j = (i + 1) % 3;
            if let (Some(prev), Some(next)) = (hes[i], hes[j]) {
                if self.next_halfedge(prev) != next {
                    let mut boundary_prev = next.opposite();
                    loop {
                        boundary_prev = self.next_halfedge(boundary_prev).opposite();
                        if self.is_boundary_halfedge(boundary_prev) {
                            break;
                        }
                    }
                    if boundary_prev == prev {
                        return Err(Error::PatchRelinkingFailed);
                    }
                    let boundary_next = self.next_halfedge(boundary_prev);
                    let patch_start = self.next_halfedge(prev);
                    let patch_end = self.prev_halfedge(next);
                    cache.next_cache.push((boundary_prev, patch_start));
                    cache.next_cache.push((patch_end, boundary_next));
                    cache.next_cache.push((prev, next));
                }
            }
        }
        // Create the missing edges.
        let mut is_new = [false; 3];
        for i in 0..3 {
            if hes[i].is_none() {
                is_new[i] = true;
                hes[i] = Some(self.new_edge(verts[i], verts[(i + 1) % 3])?);
            }
        }
        let hes: [HH; 3] = match (hes[0], hes[1], hes[2]) {
            (Some(a), Some(b), Some(c)) => [a, b, c],
            _ => return Err(Error::HalfedgeNotFound),
        };
        let f = self.new_face(hes[2])?;
        // Splice the halfedges into the cycles around each corner vertex.
        for i in 0..3 {
            let j = (i + 1) % 3;
            let v = verts[j];
            match (is_new[i], is_new[j]) {
                (false, false) => {
                    needs_adjust[j] = self.vertex_halfedge(v) == Some(hes[j]);
                }
                (true, false) => {
                    let outer_next = hes[i].opposite();
                    let boundary_prev = self.prev_halfedge(hes[j]);
                    cache.next_cache.push((boundary_prev, outer_next));
                    self.vertex_mut(v).halfedge = Some(outer_next);
                    cache.next_cache.push((hes[i], hes[j]));
                }
                (false, true) => {
                    let outer_prev = hes[j].opposite();
                    let boundary_next = self.next_halfedge(hes[i]);
                    cache.next_cache.push((outer_prev, boundary_next));
                    self.vertex_mut(v).halfedge = Some(boundary_next);
                    cache.next_cache.push((hes[i], hes[j]));
                }
                (true, true) => {
                    let outer_next = hes[i].opposite();
                    let outer_prev = hes[j].opposite();
                    match self.vertex_halfedge(v) {
                        Some(boundary_next) => {
                            let boundary_prev = self.prev_halfedge(boundary_next);
                            cache.next_cache.push((boundary_prev, outer_next));
                            cache.next_cache.push((outer_prev, boundary_next));
                        }
                        None => {
                            self.vertex_mut(v).halfedge = Some(outer_next);
                            cache.next_cache.push((outer_prev, outer_next));
                        }
                    }
                    cache.next_cache.push((hes[i], hes[j]));
                }
            }
            self.halfedge_mut(hes[i]).face = Some(f);
        }
        let links = std::mem::take(&mut cache.next_cache);
        for (prev, next) in links.iter() {
            self.link_halfedges(*prev, *next);
        }
        cache.next_cache = links;
        for i in 0..3 {
            if needs_adjust[i] {
                self.adjust_outgoing_halfedge(verts[i]);
            }
        }
        Ok(f)
    }

    /// Remove a wire edge, i.e. an edge with no face on either side, from the
    /// cycles of its end vertices and mark it deleted.
    fn delete_wire_edge(&mut self, e: EH) -> Result<(), Error> {
        let (h, o) = e.halfedges();
        let vto = self.head_vertex(h);
        let vfrom = self.head_vertex(o);
        if self.next_halfedge(h) == o {
            self.vertex_mut(vto).halfedge = None;
        } else {
            let hn = self.next_halfedge(h);
            let op = self.prev_halfedge(o);
            self.link_halfedges(op, hn);
            if self.vertex_halfedge(vto) == Some(o) {
                self.vertex_mut(vto).halfedge = Some(hn);
            }
        }
        if self.next_halfedge(o) == h {
            self.vertex_mut(vfrom).halfedge = None;
        } else {
            let on = self.next_halfedge(o);
            let hp = self.prev_halfedge(h);
            self.link_halfedges(hp, on);
            if self.vertex_halfedge(vfrom) == Some(h) {
                self.vertex_mut(vfrom).halfedge = Some(on);
            }
        }
        self.estatus.get_mut(e)?.set_deleted(true);
        Ok(())
    }

    /// Delete a face, removing any edge left without a face on either side.
    /// Elements are tombstoned; handles of surviving elements stay stable.
    pub fn delete_face(
        &mut self,
        f: FH,
        delete_isolated_vertices: bool,
        cache: &mut TopolCache,
    ) -> Result<(), Error> {
        if self.fstatus.get_cloned(f)?.deleted() {
            return Err(Error::DeletedFace(f));
        }
        cache.halfedges.clear();
        cache.halfedges.extend(iterator::fh_ccw_iter(self, f));
        cache.vertices.clear();
        cache
            .vertices
            .extend(cache.halfedges.iter().map(|h| self.head_vertex(*h)));
        self.fstatus.get_mut(f)?.set_deleted(true);
        for h in cache.halfedges.iter() {
            self.halfedge_mut(*h).face = None;
        }
        cache.edges.clear();
        for h in cache.halfedges.iter() {
            if self.is_boundary_halfedge(h.opposite()) {
                cache.edges.push(h.edge());
            }
        }
        for i in 0..cache.edges.len() {
            self.delete_wire_edge(cache.edges[i])?;
        }
        for i in 0..cache.vertices.len() {
            let v = cache.vertices[i];
            match self.vertex_halfedge(v) {
                None => {
                    if delete_isolated_vertices {
                        self.vstatus.get_mut(v)?.set_deleted(true);
                    }
                }
                Some(_) => self.adjust_outgoing_halfedge(v),
            }
        }
        Ok(())
    }

    /// Delete a vertex along with all of its incident faces.
    pub fn delete_vertex(&mut self, v: VH, cache: &mut TopolCache) -> Result<(), Error> {
        if self.vstatus.get_cloned(v)?.deleted() {
            return Err(Error::DeletedVertex(v));
        }
        cache.faces.clear();
        cache.faces.extend(iterator::vf_ccw_iter(self, v));
        // delete_face only touches the halfedge/edge/vertex buffers.
        for i in 0..cache.faces.len() {
            let f = cache.faces[i];
            self.delete_face(f, true, cache)?;
        }
        self.vstatus.get_mut(v)?.set_deleted(true);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::{TopolCache, Topology};
    use crate::{element::Handle, error::Error, iterator};

    /// Closed tetrahedron: 4 vertices, 6 edges, 4 faces.
    pub(crate) fn tetra_topol() -> Topology {
        let mut topol = Topology::with_capacity(4, 6, 4);
        let mut cache = TopolCache::default();
        let verts: Vec<_> = (0..4)
            .map(|_| topol.add_vertex().expect("Cannot add vertex"))
            .collect();
        for fvs in [[0usize, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]] {
            topol
                .add_face([verts[fvs[0]], verts[fvs[1]], verts[fvs[2]]], &mut cache)
                .expect("Cannot add face");
        }
        topol
    }

    /// Open fan of 5 triangles around a central vertex 0, with boundary.
    pub(crate) fn fan_topol() -> Topology {
        let mut topol = Topology::with_capacity(7, 11, 5);
        let mut cache = TopolCache::default();
        let verts: Vec<_> = (0..7)
            .map(|_| topol.add_vertex().expect("Cannot add vertex"))
            .collect();
        for i in 1..6 {
            topol
                .add_face([verts[0], verts[i], verts[i + 1]], &mut cache)
                .expect("Cannot add face");
        }
        topol
    }

    #[test]
    fn t_single_triangle() {
        let mut topol = Topology::new();
        let mut cache = TopolCache::default();
        let a = topol.add_vertex().unwrap();
        let b = topol.add_vertex().unwrap();
        let c = topol.add_vertex().unwrap();
        let f = topol.add_face([a, b, c], &mut cache).unwrap();
        assert_eq!(topol.num_vertices(), 3);
        assert_eq!(topol.num_edges(), 3);
        assert_eq!(topol.num_faces(), 1);
        for v in [a, b, c] {
            assert!(topol.is_boundary_vertex(v));
        }
        // The interior loop visits all three halfedges of the face.
        let h0 = topol.face_halfedge(f);
        let h1 = topol.next_halfedge(h0);
        let h2 = topol.next_halfedge(h1);
        assert_eq!(topol.next_halfedge(h2), h0);
        assert_eq!(topol.prev_halfedge(h0), h2);
        assert_eq!(topol.face_vertices(f).len(), 3);
    }

    #[test]
    fn t_two_triangles_share_edge() {
        let mut topol = Topology::new();
        let mut cache = TopolCache::default();
        let verts: Vec<_> = (0..4).map(|_| topol.add_vertex().unwrap()).collect();
        topol
            .add_face([verts[0], verts[1], verts[2]], &mut cache)
            .unwrap();
        topol
            .add_face([verts[0], verts[2], verts[3]], &mut cache)
            .unwrap();
        assert_eq!(topol.num_edges(), 5);
        let shared = topol.find_halfedge(verts[0], verts[2]).unwrap();
        assert!(!topol.is_boundary_halfedge(shared));
        assert!(!topol.is_boundary_halfedge(shared.opposite()));
    }

    #[test]
    fn t_winding_conflict_rejected() {
        let mut topol = Topology::new();
        let mut cache = TopolCache::default();
        let verts: Vec<_> = (0..4).map(|_| topol.add_vertex().unwrap()).collect();
        topol
            .add_face([verts[0], verts[1], verts[2]], &mut cache)
            .unwrap();
        // Same direction over the shared halfedge (1, 2) as the first face.
        let before = (topol.num_edges(), topol.num_faces());
        match topol.add_face([verts[1], verts[2], verts[3]], &mut cache) {
            Err(Error::ComplexHalfedge(_)) => {}
            other => panic!("Expected a complex halfedge, got {:?}", other),
        }
        // Nothing was modified by the failed insertion.
        assert_eq!(before, (topol.num_edges(), topol.num_faces()));
        // Reversed winding is fine.
        topol
            .add_face([verts[2], verts[1], verts[3]], &mut cache)
            .unwrap();
    }

    #[test]
    fn t_tetrahedron_counts() {
        let topol = tetra_topol();
        assert_eq!(topol.num_vertices(), 4);
        assert_eq!(topol.num_edges(), 6);
        assert_eq!(topol.num_faces(), 4);
        for v in topol.vertices() {
            assert!(!topol.is_boundary_vertex(v));
            assert_eq!(iterator::voh_ccw_iter(&topol, v).count(), 3);
        }
        for e in topol.edges() {
            assert!(!topol.is_boundary_edge(e));
        }
    }

    #[test]
    fn t_fan_boundary() {
        let topol = fan_topol();
        assert_eq!(topol.num_vertices(), 7);
        assert_eq!(topol.num_faces(), 5);
        assert_eq!(topol.num_edges(), 11);
        // The fan is open, so even the center lies on the boundary of the
        // missing sector.
        for vi in 0u32..7 {
            assert!(topol.is_boundary_vertex(vi.into()));
            // Outgoing halfedge of a boundary vertex sits on the boundary.
            let h = topol.vertex_halfedge(vi.into()).unwrap();
            assert!(topol.is_boundary_halfedge(h));
        }
    }

    #[test]
    fn t_closed_fan_center_is_interior() {
        let mut topol = fan_topol();
        let mut cache = TopolCache::default();
        topol
            .add_face([0.into(), 6.into(), 1.into()], &mut cache)
            .expect("Cannot close fan");
        assert_eq!(topol.num_edges(), 12);
        assert!(!topol.is_boundary_vertex(0.into()));
        assert_eq!(iterator::voh_ccw_iter(&topol, 0.into()).count(), 6);
        for vi in 1u32..7 {
            assert!(topol.is_boundary_vertex(vi.into()));
        }
    }

    #[test]
    fn t_fan_patch_relinking() {
        // Attach faces around a vertex out of order so the boundary patch
        // between existing halfedges has to be relinked.
        let mut topol = Topology::new();
        let mut cache = TopolCache::default();
        let verts: Vec<_> = (0..7).map(|_| topol.add_vertex().unwrap()).collect();
        for i in [1usize, 3, 5] {
            topol
                .add_face([verts[0], verts[i], verts[i + 1]], &mut cache)
                .expect("Cannot add face");
        }
        for i in [2usize, 4] {
            topol
                .add_face([verts[0], verts[i], verts[i + 1]], &mut cache)
                .expect("Cannot add face");
        }
        assert_eq!(topol.num_faces(), 5);
        assert_eq!(iterator::voh_ccw_iter(&topol, verts[0]).count(), 6);
    }

    #[test]
    fn t_delete_face() {
        let mut topol = tetra_topol();
        let mut cache = TopolCache::default();
        topol
            .delete_face(0.into(), true, &mut cache)
            .expect("Cannot delete face");
        assert!(topol.fstatus.get_cloned(0.into()).unwrap().deleted());
        // The remaining faces expose a consistent boundary loop.
        let fvs = topol.face_vertices(0.into());
        for v in fvs {
            assert!(!topol.vstatus.get_cloned(v).unwrap().deleted());
            assert!(topol.is_boundary_vertex(v));
        }
        assert!(topol.delete_face(0.into(), true, &mut cache).is_err());
    }

    #[test]
    fn t_delete_faces_reuse_cache() {
        let mut topol = tetra_topol();
        let mut cache = TopolCache::default();
        topol
            .delete_face(0.into(), true, &mut cache)
            .expect("Cannot delete face");
        topol
            .delete_face(2.into(), true, &mut cache)
            .expect("Cannot delete face");
        assert_eq!(
            topol
                .faces()
                .filter(|f| !topol.fstatus.get_cloned(*f).unwrap().deleted())
                .count(),
            2
        );
        topol.check().expect("Inconsistent topology");
    }

    #[test]
    fn t_delete_vertex() {
        let mut topol = fan_topol();
        let mut cache = TopolCache::default();
        topol
            .delete_vertex(0.into(), &mut cache)
            .expect("Cannot delete vertex");
        assert!(topol.vstatus.get_cloned(0.into()).unwrap().deleted());
        for f in topol.faces() {
            assert!(topol.fstatus.get_cloned(f).unwrap().deleted());
        }
    }
}

use glam::DVec3;

use crate::{
    element::{EH, FH, Handle, HasTopology, VH},
    error::Error,
    mesh::Mesh,
    property::{EProperty, FProperty, TPropData, VProperty},
    status::Status,
    stencil::Scheme,
};

/// The coarser level element a vertex was subdivided from.
///
/// Control vertices have no parent; every finer vertex descends from either a
/// vertex or an edge of the level below.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Parent {
    #[default]
    None,
    Vert(VH),
    Edge(EH),
}

impl TPropData for Parent {}

fn decremented(sharpness: u16) -> u16 {
    if sharpness == u16::MAX {
        sharpness
    } else {
        sharpness - 1
    }
}

/// One level of a subdivision hierarchy: a mesh plus the bookkeeping that
/// ties it to its neighboring levels.
///
/// The child maps are populated when the next finer level is built. The
/// `offset` property stores the scalar detail displacement of each vertex
/// along its parent's normal; it is folded into the position whenever the
/// subdivision base position is recomputed.
pub struct SubdivLevel {
    mesh: Mesh,
    vstatus: VProperty<Status>,
    estatus: EProperty<Status>,
    parent: VProperty<Parent>,
    offset: VProperty<f64>,
    limit: VProperty<Option<DVec3>>,
    vert_child: VProperty<Option<VH>>,
    edge_child: EProperty<Option<VH>>,
    face_child: FProperty<Option<[FH; 4]>>,
    dirty: Vec<VH>,
}

impl SubdivLevel {
    fn wrap(mut mesh: Mesh) -> Self {
        let parent = mesh.create_vertex_prop(Parent::None);
        let offset = mesh.create_vertex_prop(0.0f64);
        let limit = mesh.create_vertex_prop(None);
        let vert_child = mesh.create_vertex_prop(None);
        let edge_child = mesh.create_edge_prop(None);
        let face_child = mesh.create_face_prop(None);
        let vstatus = mesh.topology().vstatus.clone();
        let estatus = mesh.topology().estatus.clone();
        SubdivLevel {
            mesh,
            vstatus,
            estatus,
            parent,
            offset,
            limit,
            vert_child,
            edge_child,
            face_child,
            dirty: Vec::new(),
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn vertex_parent(&self, v: VH) -> Result<Parent, Error> {
        self.parent.get_cloned(v)
    }

    pub fn vertex_child(&self, v: VH) -> Result<Option<VH>, Error> {
        self.vert_child.get_cloned(v)
    }

    pub fn edge_child(&self, e: EH) -> Result<Option<VH>, Error> {
        self.edge_child.get_cloned(e)
    }

    pub fn face_children(&self, f: FH) -> Result<Option<[FH; 4]>, Error> {
        self.face_child.get_cloned(f)
    }

    pub fn is_boss(&self, v: VH) -> Result<bool, Error> {
        Ok(self.vstatus.get_cloned(v)?.boss())
    }

    pub fn vertex_offset(&self, v: VH) -> Result<f64, Error> {
        self.offset.get_cloned(v)
    }

    /// Queue a vertex for propagation to the next level. The dirty bit keeps
    /// the queue free of duplicates. Edge stencils around the vertex go stale
    /// with it.
    pub(crate) fn mark_dirty(&mut self, v: VH) -> Result<(), Error> {
        {
            let mut status = self.vstatus.get_mut(v)?;
            if status.dirty() {
                return Ok(());
            }
            status.set_dirty(true);
        }
        self.dirty.push(v);
        let edges: Vec<EH> = self
            .mesh
            .vf_ccw_iter(v)
            .flat_map(|f| self.mesh.fe_ccw_iter(f))
            .chain(self.mesh.ve_ccw_iter(v))
            .collect();
        for e in edges {
            self.estatus.get_mut(e)?.set_subdiv_valid(false);
        }
        Ok(())
    }

    fn take_dirty(&mut self) -> Result<Vec<VH>, Error> {
        let dirty = std::mem::take(&mut self.dirty);
        for v in dirty.iter() {
            self.vstatus.get_mut(*v)?.set_dirty(false);
        }
        Ok(dirty)
    }

    /// Cached limit data of `v` and its one ring is stale after `v` moves.
    fn invalidate_limit_around(&mut self, v: VH) -> Result<(), Error> {
        let ring: Vec<VH> = self.mesh.vv_ccw_iter(v).collect();
        self.limit.set(v, None)?;
        for w in ring {
            self.limit.set(w, None)?;
        }
        Ok(())
    }
}

/// Write a freshly computed subdivision position into a level.
///
/// A changed position dirties the vertex so the update cascades to the next
/// level; an unchanged one stops the cascade.
fn write_child_point(level: &mut SubdivLevel, v: VH, pos: DVec3) -> Result<(), Error> {
    if level.mesh.point(v)? != pos {
        level.mesh.set_point(v, pos)?;
        level.mark_dirty(v)?;
        level.invalidate_limit_around(v)?;
    }
    Ok(())
}

/// Direction along which a vertex's detail offset is applied, taken from the
/// parent level so it is stable while the vertex itself moves.
fn parent_normal(parent: &SubdivLevel, p: Parent) -> Result<DVec3, Error> {
    match p {
        Parent::None => Ok(DVec3::ZERO),
        Parent::Vert(pv) => parent.mesh.vertex_normal(pv),
        Parent::Edge(pe) => {
            let (a, b) = parent.mesh.edge_vertices(pe);
            Ok((parent.mesh.vertex_normal(a)? + parent.mesh.vertex_normal(b)?)
                .normalize_or_zero())
        }
    }
}

/// A multiresolution subdivision surface.
///
/// Levels are built lazily by uniform 1-to-4 refinement; positions flow from
/// coarse to fine through the stencils of the active scheme, one dirty region
/// at a time. Level zero is the control mesh and always exists.
pub struct Hierarchy {
    levels: Vec<SubdivLevel>,
    scheme: Scheme,
}

impl Hierarchy {
    pub fn new(mesh: Mesh) -> Result<Self, Error> {
        let mut level = SubdivLevel::wrap(mesh);
        let verts: Vec<VH> = level.mesh.vertices().collect();
        for v in verts {
            level.mark_dirty(v)?;
        }
        Ok(Hierarchy {
            levels: vec![level],
            scheme: Scheme::default(),
        })
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Switch the subdivision scheme. All derived positions are recomputed on
    /// the next update and every cached limit position is discarded.
    pub fn set_scheme(&mut self, scheme: Scheme) -> Result<(), Error> {
        if scheme == self.scheme {
            return Ok(());
        }
        self.scheme = scheme;
        for level in self.levels.iter_mut() {
            level.limit.fill(None)?;
        }
        let verts: Vec<VH> = self.levels[0].mesh.vertices().collect();
        for v in verts {
            self.levels[0].mark_dirty(v)?;
        }
        Ok(())
    }

    pub fn level(&self, k: usize) -> Result<&SubdivLevel, Error> {
        self.levels.get(k).ok_or(Error::LevelNotBuilt(k))
    }

    pub fn control(&self) -> &SubdivLevel {
        &self.levels[0]
    }

    /// Build refined levels up to `depth`. Topology only; positions follow on
    /// the next call to [`update_subdivision`](Self::update_subdivision).
    pub fn ensure_level(&mut self, depth: usize) -> Result<(), Error> {
        while self.levels.len() <= depth {
            self.refine_last()?;
        }
        Ok(())
    }

    /// The 1-to-4 split of the current finest level: one child vertex per
    /// parent vertex and per parent edge, four child faces per parent face.
    fn refine_last(&mut self) -> Result<(), Error> {
        let parent = match self.levels.last_mut() {
            Some(level) => level,
            None => return Ok(()),
        };
        let nv = parent.mesh.num_vertices();
        let ne = parent.mesh.num_edges();
        let nf = parent.mesh.num_faces();
        let mut cmesh = Mesh::with_capacity(nv + ne, 2 * ne + 3 * nf, 4 * nf);
        let mut parents = Vec::with_capacity(nv + ne);
        for v in parent.mesh.vertices() {
            cmesh.add_vertex(parent.mesh.point(v)?)?;
            parents.push(Parent::Vert(v));
        }
        for e in parent.mesh.edges() {
            let (a, b) = parent.mesh.edge_vertices(e);
            cmesh.add_vertex((parent.mesh.point(a)? + parent.mesh.point(b)?) * 0.5)?;
            parents.push(Parent::Edge(e));
        }
        let edge_vert = |e: EH| -> VH { ((nv as u32) + e.index()).into() };
        let mut fchildren: Vec<Option<[FH; 4]>> = vec![None; nf];
        for f in parent.mesh.faces() {
            if parent.mesh.topology().face_status(f)?.deleted() {
                continue;
            }
            let h0 = parent.mesh.face_halfedge(f);
            let h1 = parent.mesh.next_halfedge(h0);
            let h2 = parent.mesh.next_halfedge(h1);
            let (a, b, c) = (
                parent.mesh.head_vertex(h0),
                parent.mesh.head_vertex(h1),
                parent.mesh.head_vertex(h2),
            );
            let (ca, cb, cc): (VH, VH, VH) = (a.index().into(), b.index().into(), c.index().into());
            let (mab, mbc, mca) = (
                edge_vert(h1.edge()),
                edge_vert(h2.edge()),
                edge_vert(h0.edge()),
            );
            let f0 = cmesh.add_face([ca, mab, mca])?;
            let f1 = cmesh.add_face([cb, mbc, mab])?;
            let f2 = cmesh.add_face([cc, mca, mbc])?;
            let f3 = cmesh.add_face([mab, mbc, mca])?;
            fchildren[f.index() as usize] = Some([f0, f1, f2, f3]);
        }
        // Sharpness wears off: each child of a crease edge keeps one round
        // less, crease forever when saturated.
        for e in parent.mesh.edges() {
            let sharpness = parent.mesh.crease(e)?;
            if sharpness == 0 {
                continue;
            }
            let sharpness = decremented(sharpness);
            if sharpness == 0 {
                continue;
            }
            let m = edge_vert(e);
            let (a, b) = parent.mesh.edge_vertices(e);
            for end in [a, b] {
                if let Some(h) = cmesh.find_halfedge(end.index().into(), m) {
                    cmesh.set_crease(h.edge(), sharpness)?;
                }
            }
        }
        for v in parent.mesh.vertices() {
            let sharpness = parent.mesh.corner(v)?;
            if sharpness > 0 {
                let sharpness = decremented(sharpness);
                if sharpness > 0 {
                    cmesh.set_corner(v.index().into(), sharpness)?;
                }
            }
        }
        let mut child = SubdivLevel::wrap(cmesh);
        for (i, p) in parents.iter().enumerate() {
            child.parent.set((i as u32).into(), *p)?;
        }
        for v in parent.mesh.vertices() {
            parent.vert_child.set(v, Some(v.index().into()))?;
        }
        for e in parent.mesh.edges() {
            parent.edge_child.set(e, Some(edge_vert(e)))?;
        }
        for f in parent.mesh.faces() {
            parent.face_child.set(f, fchildren[f.index() as usize])?;
        }
        // Every parent vertex feeds the first position pass of the new level.
        let verts: Vec<VH> = parent.mesh.vertices().collect();
        for v in verts {
            parent.mark_dirty(v)?;
        }
        self.levels.push(child);
        Ok(())
    }

    /// Push the dirty vertices of level `i` down to level `i + 1`.
    ///
    /// The stencil of a child vertex depends on the one ring of its parent,
    /// so a dirty parent vertex touches the children of itself, of its ring
    /// neighbors, and of the edges of its incident faces. Everything else
    /// keeps its position bit for bit.
    fn propagate(&mut self, i: usize) -> Result<(), Error> {
        let scheme = self.scheme;
        let (head, tail) = self.levels.split_at_mut(i + 1);
        let parent = &mut head[i];
        let child = match tail.first_mut() {
            Some(level) => level,
            None => return Ok(()),
        };
        let dirty = parent.take_dirty()?;
        if dirty.is_empty() {
            return Ok(());
        }
        let mut verts = Vec::new();
        let mut edges = Vec::new();
        for v in dirty {
            verts.push(v);
            verts.extend(parent.mesh.vv_ccw_iter(v));
            edges.extend(parent.mesh.ve_ccw_iter(v));
            let fedges: Vec<EH> = parent
                .mesh
                .vf_ccw_iter(v)
                .flat_map(|f| parent.mesh.fe_ccw_iter(f))
                .collect();
            edges.extend(fedges);
        }
        verts.sort_unstable();
        verts.dedup();
        edges.sort_unstable();
        edges.dedup();
        log::trace!(
            "Propagating level {} edits to {} vertices and {} edges",
            i,
            verts.len(),
            edges.len()
        );
        for x in verts {
            if let Some(cv) = parent.vert_child.get_cloned(x)? {
                if child.is_boss(cv)? {
                    continue;
                }
                let mut pos = scheme.vertex_point(&parent.mesh, x)?;
                let offset = child.offset.get_cloned(cv)?;
                if offset != 0.0 {
                    pos += parent.mesh.vertex_normal(x)? * offset;
                }
                write_child_point(child, cv, pos)?;
            }
        }
        for e in edges {
            if parent.estatus.get_cloned(e)?.subdiv_valid() {
                continue;
            }
            if let Some(cv) = parent.edge_child.get_cloned(e)? {
                if !child.is_boss(cv)? {
                    let mut pos = scheme.edge_point(&parent.mesh, e)?;
                    let offset = child.offset.get_cloned(cv)?;
                    if offset != 0.0 {
                        pos += parent_normal(parent, Parent::Edge(e))? * offset;
                    }
                    write_child_point(child, cv, pos)?;
                }
                parent.estatus.get_mut(e)?.set_subdiv_valid(true);
            }
        }
        Ok(())
    }

    /// Bring all levels up to `depth` current, building them as needed. Cost
    /// is proportional to the dirty regions, not the mesh size.
    pub fn update_subdivision(&mut self, depth: usize) -> Result<(), Error> {
        self.ensure_level(depth)?;
        for i in 0..depth {
            self.propagate(i)?;
        }
        Ok(())
    }

    pub fn point(&self, level: usize, v: VH) -> Result<DVec3, Error> {
        self.level(level)?.mesh.point(v)
    }

    /// Move a vertex. On refined levels the displacement is folded into the
    /// vertex's detail offset, projected onto the parent normal, so the edit
    /// survives recomputation from the level below.
    pub fn set_point(&mut self, level: usize, v: VH, pos: DVec3) -> Result<(), Error> {
        if level >= self.levels.len() {
            return Err(Error::LevelNotBuilt(level));
        }
        if level > 0 {
            let (head, tail) = self.levels.split_at_mut(level);
            let parent = &head[level - 1];
            let lvl = &mut tail[0];
            let delta = pos - lvl.mesh.point(v)?;
            if delta != DVec3::ZERO {
                let n = parent_normal(parent, lvl.parent.get_cloned(v)?)?;
                let offset = lvl.offset.get_cloned(v)?;
                lvl.offset.set(v, offset + delta.dot(n))?;
            }
            lvl.mesh.set_point(v, pos)?;
            lvl.mark_dirty(v)?;
            lvl.invalidate_limit_around(v)
        } else {
            let lvl = &mut self.levels[0];
            lvl.mesh.set_point(v, pos)?;
            lvl.mark_dirty(v)?;
            lvl.invalidate_limit_around(v)
        }
    }

    pub fn set_crease(&mut self, level: usize, e: EH, sharpness: u16) -> Result<(), Error> {
        let lvl = self
            .levels
            .get_mut(level)
            .ok_or(Error::LevelNotBuilt(level))?;
        lvl.mesh.set_crease(e, sharpness)?;
        let (a, b) = lvl.mesh.edge_vertices(e);
        lvl.mark_dirty(a)?;
        lvl.mark_dirty(b)?;
        lvl.invalidate_limit_around(a)?;
        lvl.invalidate_limit_around(b)
    }

    pub fn set_corner(&mut self, level: usize, v: VH, sharpness: u16) -> Result<(), Error> {
        let lvl = self
            .levels
            .get_mut(level)
            .ok_or(Error::LevelNotBuilt(level))?;
        lvl.mesh.set_corner(v, sharpness)?;
        lvl.mark_dirty(v)?;
        lvl.invalidate_limit_around(v)
    }

    /// Pin or release a vertex. Pinned vertices are never overwritten by
    /// propagation from the coarser level.
    pub fn set_boss(&mut self, level: usize, v: VH, flag: bool) -> Result<(), Error> {
        let lvl = self
            .levels
            .get_mut(level)
            .ok_or(Error::LevelNotBuilt(level))?;
        lvl.vstatus.get_mut(v)?.set_boss(flag);
        Ok(())
    }

    /// The limit position of a vertex under the active scheme, cached until
    /// the vertex or its ring moves.
    pub fn limit_position(&mut self, level: usize, v: VH) -> Result<DVec3, Error> {
        let scheme = self.scheme;
        let lvl = self
            .levels
            .get_mut(level)
            .ok_or(Error::LevelNotBuilt(level))?;
        if let Some(pos) = lvl.limit.get_cloned(v)? {
            return Ok(pos);
        }
        let pos = scheme.limit_point(&lvl.mesh, v)?;
        lvl.limit.set(v, Some(pos))?;
        Ok(pos)
    }

    pub fn limit_normal(&self, level: usize, v: VH) -> Result<DVec3, Error> {
        self.scheme.limit_normal(&self.level(level)?.mesh, v)
    }

    /// Recompute the given level `k` vertices from the level below with the
    /// active scheme, applying stored detail offsets. Pinned vertices keep
    /// their positions.
    pub fn recompute_verts(&mut self, level: usize, verts: &[VH]) -> Result<(), Error> {
        if level == 0 || level >= self.levels.len() {
            return Err(Error::LevelNotBuilt(level));
        }
        let scheme = self.scheme;
        let (head, tail) = self.levels.split_at_mut(level);
        let parent = &head[level - 1];
        let lvl = &mut tail[0];
        for v in verts {
            if lvl.is_boss(*v)? {
                continue;
            }
            let p = lvl.parent.get_cloned(*v)?;
            let mut pos = match p {
                Parent::None => continue,
                Parent::Vert(pv) => scheme.vertex_point(&parent.mesh, pv)?,
                Parent::Edge(pe) => scheme.edge_point(&parent.mesh, pe)?,
            };
            let offset = lvl.offset.get_cloned(*v)?;
            if offset != 0.0 {
                pos += parent_normal(parent, p)? * offset;
            }
            write_child_point(lvl, *v, pos)?;
        }
        Ok(())
    }

    /// The level `k - 1` vertices whose stencils feed the given level `k`
    /// vertices, sorted and deduplicated.
    pub fn get_subdiv_inputs(&self, level: usize, verts: &[VH]) -> Result<Vec<VH>, Error> {
        if level == 0 || level >= self.levels.len() {
            return Err(Error::LevelNotBuilt(level));
        }
        let lvl = &self.levels[level];
        let below = &self.levels[level - 1];
        let mut inputs = Vec::new();
        for v in verts {
            match lvl.parent.get_cloned(*v)? {
                Parent::None => (),
                Parent::Vert(pv) => {
                    inputs.push(pv);
                    inputs.extend(below.mesh.vv_ccw_iter(pv));
                }
                Parent::Edge(pe) => {
                    let (a, b) = below.mesh.edge_vertices(pe);
                    inputs.push(a);
                    inputs.push(b);
                    let (l, r) = below.mesh.edge_opposite_vertices(pe);
                    inputs.extend(l);
                    inputs.extend(r);
                }
            }
        }
        inputs.sort_unstable();
        inputs.dedup();
        Ok(inputs)
    }

    /// Mark the corners of the given level `k` faces dirty and propagate the
    /// change down to `depth`.
    pub fn update_region(&mut self, level: usize, faces: &[FH], depth: usize) -> Result<(), Error> {
        if level >= self.levels.len() {
            return Err(Error::LevelNotBuilt(level));
        }
        {
            let lvl = &mut self.levels[level];
            let mut verts = Vec::new();
            for f in faces {
                verts.extend(lvl.mesh.face_vertices(*f));
            }
            verts.sort_unstable();
            verts.dedup();
            for v in verts {
                lvl.mark_dirty(v)?;
            }
        }
        self.ensure_level(depth)?;
        for i in level..depth {
            self.propagate(i)?;
        }
        Ok(())
    }

    /// Drop levels finer than `depth`. The control level always survives.
    pub fn truncate_levels(&mut self, depth: usize) -> Result<(), Error> {
        let keep = depth.max(1);
        if keep < self.levels.len() {
            self.levels.truncate(keep);
            if let Some(last) = self.levels.last_mut() {
                last.vert_child.fill(None)?;
                last.edge_child.fill(None)?;
                last.face_child.fill(None)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{Hierarchy, Parent};
    use crate::{
        element::{EH, FH, Handle, VH},
        macros::assert_f64_eq,
        mesh::test::{closed_fan, tetrahedron},
        stencil::Scheme,
    };
    use glam::{DVec3, dvec3};

    #[test]
    fn t_tetra_refinement_counts() {
        let mut hier = Hierarchy::new(tetrahedron(1.0)).expect("Cannot build hierarchy");
        hier.update_subdivision(1).expect("Cannot subdivide");
        let child = hier.level(1).unwrap().mesh();
        assert_eq!(child.num_vertices(), 10);
        assert_eq!(child.num_edges(), 24);
        assert_eq!(child.num_faces(), 16);
        child.check_topology().expect("Inconsistent refinement");
        hier.update_subdivision(2).expect("Cannot subdivide");
        let child = hier.level(2).unwrap().mesh();
        assert_eq!(child.num_vertices(), 34);
        assert_eq!(child.num_faces(), 64);
        child.check_topology().expect("Inconsistent refinement");
    }

    #[test]
    fn t_parent_and_child_maps() {
        let mut hier = Hierarchy::new(tetrahedron(1.0)).expect("Cannot build hierarchy");
        hier.update_subdivision(1).expect("Cannot subdivide");
        let coarse = hier.level(0).unwrap();
        let fine = hier.level(1).unwrap();
        for vi in 0u32..4 {
            assert_eq!(
                fine.vertex_parent(vi.into()).unwrap(),
                Parent::Vert(vi.into())
            );
            assert_eq!(coarse.vertex_child(vi.into()).unwrap(), Some(vi.into()));
        }
        for ei in 0u32..6 {
            let m: VH = (4 + ei).into();
            assert_eq!(fine.vertex_parent(m).unwrap(), Parent::Edge(ei.into()));
            assert_eq!(coarse.edge_child(ei.into()).unwrap(), Some(m));
        }
        let children = coarse.face_children(0.into()).unwrap().unwrap();
        assert_eq!(children, [0.into(), 1.into(), 2.into(), 3.into()]);
        // Control vertices have no parent.
        assert_eq!(coarse.vertex_parent(0.into()).unwrap(), Parent::None);
    }

    #[test]
    fn t_positions_match_stencils() {
        let mut hier = Hierarchy::new(tetrahedron(1.0)).expect("Cannot build hierarchy");
        hier.update_subdivision(1).expect("Cannot subdivide");
        // Valence 3 vertex of the unit tetrahedron lands at a quarter of its
        // original position.
        let p = hier.point(1, 0.into()).unwrap();
        assert_f64_eq!(p.x, 0.25, 1e-14);
        assert_f64_eq!(p.y, 0.25, 1e-14);
        assert_f64_eq!(p.z, 0.25, 1e-14);
        let coarse = hier.level(0).unwrap().mesh();
        let fine = hier.level(1).unwrap();
        for v in fine.mesh().vertices() {
            let expected = match fine.vertex_parent(v).unwrap() {
                Parent::Vert(pv) => Scheme::Loop.vertex_point(coarse, pv).unwrap(),
                Parent::Edge(pe) => Scheme::Loop.edge_point(coarse, pe).unwrap(),
                Parent::None => unreachable!(),
            };
            assert_eq!(fine.mesh().point(v).unwrap(), expected);
        }
    }

    #[test]
    fn t_midpoint_scheme() {
        let mut hier = Hierarchy::new(tetrahedron(1.0)).expect("Cannot build hierarchy");
        hier.set_scheme(Scheme::Midpoint).unwrap();
        hier.update_subdivision(1).expect("Cannot subdivide");
        let coarse = hier.level(0).unwrap().mesh();
        let fine = hier.level(1).unwrap();
        for v in fine.mesh().vertices() {
            let expected = match fine.vertex_parent(v).unwrap() {
                Parent::Vert(pv) => coarse.point(pv).unwrap(),
                Parent::Edge(pe) => {
                    let (a, b) = coarse.edge_vertices(pe);
                    (coarse.point(a).unwrap() + coarse.point(b).unwrap()) * 0.5
                }
                Parent::None => unreachable!(),
            };
            assert_eq!(fine.mesh().point(v).unwrap(), expected);
        }
    }

    #[test]
    fn t_edit_locality() {
        let mut hier = Hierarchy::new(closed_fan(6, 0.0)).expect("Cannot build hierarchy");
        hier.update_subdivision(1).expect("Cannot subdivide");
        let before: Vec<DVec3> = hier
            .level(1)
            .unwrap()
            .mesh()
            .vertices()
            .map(|v| hier.point(1, v).unwrap())
            .collect();
        // Vertex 4 is on the rim; vertex 1 is not in its one ring.
        hier.set_point(0, 4.into(), dvec3(2.0, 2.0, 2.0)).unwrap();
        hier.update_subdivision(1).expect("Cannot subdivide");
        let unchanged = hier.level(0).unwrap().vertex_child(1.into()).unwrap().unwrap();
        assert_eq!(
            hier.point(1, unchanged).unwrap(),
            before[unchanged.index() as usize]
        );
        // The child of the edited vertex did move.
        let moved = hier.level(0).unwrap().vertex_child(4.into()).unwrap().unwrap();
        assert_ne!(hier.point(1, moved).unwrap(), before[moved.index() as usize]);
    }

    #[test]
    fn t_detail_offset_survives_recompute() {
        let mut hier = Hierarchy::new(tetrahedron(1.0)).expect("Cannot build hierarchy");
        hier.update_subdivision(1).expect("Cannot subdivide");
        let cv = hier.level(0).unwrap().vertex_child(0.into()).unwrap().unwrap();
        let n = hier.level(0).unwrap().mesh().vertex_normal(0.into()).unwrap();
        let edited = hier.point(1, cv).unwrap() + n * 0.3;
        hier.set_point(1, cv, edited).unwrap();
        assert_f64_eq!(hier.level(1).unwrap().vertex_offset(cv).unwrap(), 0.3, 1e-12);
        // Force a recompute of the child without moving the parent.
        let p0 = hier.point(0, 0.into()).unwrap();
        hier.set_point(0, 0.into(), p0).unwrap();
        hier.update_subdivision(1).expect("Cannot subdivide");
        let recomputed = hier.point(1, cv).unwrap();
        assert_f64_eq!(recomputed.x, edited.x, 1e-12);
        assert_f64_eq!(recomputed.y, edited.y, 1e-12);
        assert_f64_eq!(recomputed.z, edited.z, 1e-12);
    }

    #[test]
    fn t_boss_vertices_are_pinned() {
        let mut hier = Hierarchy::new(tetrahedron(1.0)).expect("Cannot build hierarchy");
        hier.update_subdivision(1).expect("Cannot subdivide");
        let cv = hier.level(0).unwrap().vertex_child(0.into()).unwrap().unwrap();
        let pinned = hier.point(1, cv).unwrap();
        hier.set_boss(1, cv, true).unwrap();
        hier.set_point(0, 0.into(), dvec3(3.0, 3.0, 3.0)).unwrap();
        hier.update_subdivision(1).expect("Cannot subdivide");
        assert_eq!(hier.point(1, cv).unwrap(), pinned);
        hier.set_boss(1, cv, false).unwrap();
        let p0 = hier.point(0, 0.into()).unwrap();
        hier.set_point(0, 0.into(), p0).unwrap();
        hier.update_subdivision(1).expect("Cannot subdivide");
        assert_ne!(hier.point(1, cv).unwrap(), pinned);
    }

    #[test]
    fn t_sharpness_wears_off() {
        let mut mesh = tetrahedron(1.0);
        let e: EH = 0.into();
        mesh.set_crease(e, 2).unwrap();
        mesh.set_corner(0.into(), u16::MAX).unwrap();
        let mut hier = Hierarchy::new(mesh).expect("Cannot build hierarchy");
        hier.update_subdivision(2).expect("Cannot subdivide");
        let coarse = hier.level(0).unwrap();
        let mid = hier.level(1).unwrap();
        let m = coarse.edge_child(e).unwrap().unwrap();
        let (a, b) = coarse.mesh().edge_vertices(e);
        for end in [a, b] {
            let cv = coarse.vertex_child(end).unwrap().unwrap();
            let h = mid.mesh().find_halfedge(cv, m).unwrap();
            assert_eq!(mid.mesh().crease(h.edge()).unwrap(), 1);
            // One more round and the crease is gone.
            let fine = hier.level(2).unwrap();
            let fm = mid.edge_child(h.edge()).unwrap().unwrap();
            let fcv = mid.vertex_child(cv).unwrap().unwrap();
            let fh = fine.mesh().find_halfedge(fcv, fm).unwrap();
            assert_eq!(fine.mesh().crease(fh.edge()).unwrap(), 0);
        }
        // Saturated corner sharpness persists.
        assert_eq!(hier.level(2).unwrap().mesh().corner(0.into()).unwrap(), u16::MAX);
    }

    #[test]
    fn t_subdiv_inputs() {
        let mut hier = Hierarchy::new(tetrahedron(1.0)).expect("Cannot build hierarchy");
        hier.update_subdivision(1).expect("Cannot subdivide");
        // The child of a vertex depends on the full one ring, which on a
        // tetrahedron is every vertex.
        let cv = hier.level(0).unwrap().vertex_child(0.into()).unwrap().unwrap();
        let inputs = hier.get_subdiv_inputs(1, &[cv]).unwrap();
        assert_eq!(inputs, vec![0.into(), 1.into(), 2.into(), 3.into()]);
        // The child of an edge depends on its endpoints and opposite corners.
        let e: EH = 0.into();
        let m = hier.level(0).unwrap().edge_child(e).unwrap().unwrap();
        let inputs = hier.get_subdiv_inputs(1, &[m]).unwrap();
        let coarse = hier.level(0).unwrap().mesh();
        let (a, b) = coarse.edge_vertices(e);
        let (l, r) = coarse.edge_opposite_vertices(e);
        let mut expected = vec![a, b, l.unwrap(), r.unwrap()];
        expected.sort_unstable();
        assert_eq!(inputs, expected);
    }

    #[test]
    fn t_update_region() {
        let mut hier = Hierarchy::new(closed_fan(6, 0.0)).expect("Cannot build hierarchy");
        hier.update_subdivision(1).expect("Cannot subdivide");
        hier.set_point(0, 0.into(), dvec3(0.0, 0.0, 1.0)).unwrap();
        let f: FH = 0.into();
        hier.update_region(0, &[f], 1).expect("Cannot update region");
        let cv = hier.level(0).unwrap().vertex_child(0.into()).unwrap().unwrap();
        let expected = Scheme::Loop
            .vertex_point(hier.level(0).unwrap().mesh(), 0.into())
            .unwrap();
        assert_eq!(hier.point(1, cv).unwrap(), expected);
    }

    #[test]
    fn t_limit_cache() {
        let mut hier = Hierarchy::new(closed_fan(6, 0.0)).expect("Cannot build hierarchy");
        let l0 = hier.limit_position(0, 0.into()).unwrap();
        assert_f64_eq!(l0.z, 0.0, 1e-14);
        assert_eq!(hier.limit_position(0, 0.into()).unwrap(), l0);
        // Moving a ring vertex invalidates the center's cached limit.
        hier.set_point(0, 1.into(), dvec3(1.0, 0.0, 1.0)).unwrap();
        let l1 = hier.limit_position(0, 0.into()).unwrap();
        assert_ne!(l0, l1);
    }

    #[test]
    fn t_truncate_levels() {
        let mut hier = Hierarchy::new(tetrahedron(1.0)).expect("Cannot build hierarchy");
        hier.update_subdivision(2).expect("Cannot subdivide");
        assert_eq!(hier.num_levels(), 3);
        hier.truncate_levels(1).unwrap();
        assert_eq!(hier.num_levels(), 1);
        assert!(hier.level(1).is_err());
        assert_eq!(hier.level(0).unwrap().vertex_child(0.into()).unwrap(), None);
        // Rebuilding works from scratch.
        hier.update_subdivision(1).expect("Cannot subdivide");
        assert_eq!(hier.num_levels(), 2);
    }
}

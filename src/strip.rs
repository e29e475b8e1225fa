use crate::{
    element::{EH, FH, HH, Handle, VH},
    error::Error,
    hierarchy::SubdivLevel,
    mesh::Mesh,
};

/// Callbacks receiving strip elements in traversal order. Implementors
/// override the callbacks they care about; a renderer would issue one
/// primitive per call.
pub trait StripCB {
    fn begin_strip(&mut self) {}

    fn end_strip(&mut self) {}

    /// A triangle strip vertex, with the face it completes.
    fn face_cb(&mut self, _v: VH, _f: FH) {}

    /// An edge strip vertex, with the edge leaving it.
    fn edge_cb(&mut self, _v: VH, _e: EH) {}

    /// A vertex strip vertex.
    fn vert_cb(&mut self, _v: VH) {}
}

// Face flags used while assembling triangle strips. A face is marked while
// the backup walk passes over it and claimed once it lands in a strip.
const CLEARED: u8 = 0;
const MARKED: u8 = 1;
const CLAIMED: u8 = 2;

/// The corner of `f` following `u` in counterclockwise order.
fn next_vert_ccw(mesh: &Mesh, f: FH, u: VH) -> Option<VH> {
    mesh.fh_ccw_iter(f)
        .find(|h| mesh.tail_vertex(*h) == u)
        .map(|h| mesh.head_vertex(h))
}

/// The corner of `f` that is neither `u` nor `w`.
fn other_vertex(mesh: &Mesh, f: FH, u: VH, w: VH) -> Option<VH> {
    mesh.face_vertices(f).into_iter().find(|v| *v != u && *v != w)
}

/// The halfedge of `f` running from `u` to the next corner.
fn halfedge_from_vert(mesh: &Mesh, f: FH, u: VH) -> Option<HH> {
    mesh.fh_ccw_iter(f).find(|h| mesh.tail_vertex(*h) == u)
}

/// The halfedge of `f` on the edge opposite corner `a`.
fn opposite_halfedge(mesh: &Mesh, f: FH, a: VH) -> Option<HH> {
    mesh.fh_ccw_iter(f)
        .find(|h| mesh.head_vertex(*h) != a && mesh.tail_vertex(*h) != a)
}

/// The face on the other side of `h`'s edge.
fn other_face(mesh: &Mesh, h: HH) -> Option<FH> {
    mesh.halfedge_face(h.opposite())
}

/// Strips may continue across an edge unless it is a boundary or a crease.
fn is_crossable(mesh: &Mesh, e: EH) -> Result<bool, Error> {
    Ok(!mesh.is_boundary_edge(e) && !mesh.is_crease_edge(e)?)
}

fn edge_other_vert(mesh: &Mesh, e: EH, v: VH) -> Option<VH> {
    let (a, b) = mesh.edge_vertices(e);
    if v == a {
        Some(b)
    } else if v == b {
        Some(a)
    } else {
        None
    }
}

/// Build-time scratch shared by all strips grown over one mesh.
struct StripState {
    flags: Vec<u8>,
    orient: Vec<Option<VH>>,
    stack: Vec<FH>,
}

/// A triangle strip: a vertex sequence where every vertex after the second
/// completes one triangle with its two predecessors, winding alternating
/// face by face.
///
/// `faces` parallels `verts`; the first three entries name the seed face.
/// When `orientation` is set the strip starts on an odd winding and replay
/// repeats the first vertex to compensate.
pub struct TriStrip {
    verts: Vec<VH>,
    faces: Vec<FH>,
    orientation: bool,
    substrips: Vec<TriStrip>,
}

impl TriStrip {
    /// Cover every face of the mesh with greedy triangle strips.
    pub fn build_strips(mesh: &Mesh) -> Result<Vec<TriStrip>, Error> {
        let faces: Vec<FH> = mesh.faces().collect();
        build_strips_over(mesh, &faces)
    }

    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }

    pub fn num_tris(&self) -> usize {
        self.verts.len().saturating_sub(2)
    }

    pub fn verts(&self) -> &[VH] {
        &self.verts
    }

    /// The faces covered by this strip, each exactly once.
    pub fn faces(&self) -> &[FH] {
        if self.faces.len() < 3 {
            &self.faces
        } else {
            &self.faces[2..]
        }
    }

    /// Replay the strip. A negatively oriented strip repeats its first
    /// vertex so the triangles keep their winding.
    pub fn draw(&self, cb: &mut dyn StripCB) {
        if self.is_empty() {
            return;
        }
        cb.begin_strip();
        if self.orientation {
            cb.face_cb(self.verts[0], self.faces[0]);
        }
        for (v, f) in self.verts.iter().zip(self.faces.iter()) {
            cb.face_cb(*v, *f);
        }
        cb.end_strip();
    }

    /// The strips covering this strip's child faces one level finer, built
    /// from the parent strip's face set rather than the whole child mesh.
    ///
    /// A stale set, one whose triangle count is not four times the parent's,
    /// is discarded and rebuilt.
    pub fn substrips(
        &mut self,
        parent: &SubdivLevel,
        child: &Mesh,
    ) -> Result<&[TriStrip], Error> {
        let expected = 4 * self.num_tris();
        let current: usize = self.substrips.iter().map(|s| s.num_tris()).sum();
        if current != expected {
            log::debug!(
                "Rebuilding substrips covering {expected} triangles, {current} cached"
            );
            let mut faces = Vec::with_capacity(expected);
            for f in self.faces() {
                match parent.face_children(*f)? {
                    Some(children) => faces.extend(children),
                    None => return Err(Error::LevelNotBuilt(1)),
                }
            }
            self.substrips = build_strips_over(child, &faces)?;
        }
        Ok(&self.substrips)
    }

    /// Throw away cached finer strips. `level == 1` deletes only the
    /// substrips, `level <= 0` also resets this strip, a larger level
    /// recurses.
    pub fn clear_subdivision(&mut self, level: i32) {
        if level <= 0 {
            self.substrips.clear();
            self.verts.clear();
            self.faces.clear();
            self.orientation = false;
        } else if level == 1 {
            self.substrips.clear();
        } else {
            for s in self.substrips.iter_mut() {
                s.clear_subdivision(level - 1);
            }
        }
    }
}

fn build_strips_over(mesh: &Mesh, faces: &[FH]) -> Result<Vec<TriStrip>, Error> {
    let mut state = StripState {
        // Faces outside the set stay claimed so strips never enter them.
        flags: vec![CLAIMED; mesh.num_faces()],
        orient: vec![None; mesh.num_faces()],
        stack: Vec::new(),
    };
    for f in faces {
        state.flags[f.index() as usize] = CLEARED;
    }
    let mut strips = Vec::new();
    for f in faces {
        if state.flags[f.index() as usize] != CLEARED {
            continue;
        }
        // The stack holds faces adjacent to strips built so far, seeding
        // parallel strips that align with their neighbors.
        state.stack.push(*f);
        while let Some(seed) = state.stack.pop() {
            if state.flags[seed.index() as usize] == CLEARED {
                strips.push(build_strip(mesh, seed, &mut state)?);
            }
        }
    }
    Ok(strips)
}

/// Walk backward from `f` across crossable edges with alternating parity to
/// find a start from which the forward walk yields a longer strip. Returns
/// the start face and whether an odd number of steps was taken.
fn backup_strip(
    mesh: &Mesh,
    mut f: FH,
    a: &mut VH,
    flags: &mut [u8],
) -> Result<(FH, bool), Error> {
    flags[f.index() as usize] = MARKED;
    let mut ret = f;
    let mut b = next_vert_ccw(mesh, f, *a).ok_or(Error::HalfedgeNotFound)?;
    let mut i = 0usize;
    loop {
        let from = if i % 2 == 1 { b } else { *a };
        let h = match halfedge_from_vert(mesh, f, from) {
            Some(h) => h,
            None => break,
        };
        if !is_crossable(mesh, h.edge())? {
            break;
        }
        let prev = match other_face(mesh, h) {
            Some(prev) => prev,
            None => break,
        };
        if flags[prev.index() as usize] != CLEARED {
            break;
        }
        flags[prev.index() as usize] = MARKED;
        ret = prev;
        let d = other_vertex(mesh, prev, *a, b).ok_or(Error::HalfedgeNotFound)?;
        b = *a;
        *a = d;
        f = prev;
        i += 1;
    }
    Ok((ret, i % 2 != 0))
}

fn build_strip(mesh: &Mesh, seed: FH, state: &mut StripState) -> Result<TriStrip, Error> {
    let mut a = state.orient[seed.index() as usize]
        .unwrap_or_else(|| mesh.face_vertices(seed)[0]);
    let (start, orientation) = backup_strip(mesh, seed, &mut a, &mut state.flags)?;
    state.flags[start.index() as usize] = CLAIMED;
    state.orient[start.index() as usize] = Some(a);
    // Faces alternate ccw and cw along the strip.
    let (b, c) = if orientation {
        let c = next_vert_ccw(mesh, start, a).ok_or(Error::HalfedgeNotFound)?;
        let b = next_vert_ccw(mesh, start, c).ok_or(Error::HalfedgeNotFound)?;
        (b, c)
    } else {
        let b = next_vert_ccw(mesh, start, a).ok_or(Error::HalfedgeNotFound)?;
        let c = next_vert_ccw(mesh, start, b).ok_or(Error::HalfedgeNotFound)?;
        (b, c)
    };
    let mut verts = vec![a, b, c];
    let mut faces = vec![start, start, start];
    let seed_parallel = |state: &mut StripState, f: FH, opp_of: VH, orient: VH| {
        if let Some(h) = opposite_halfedge(mesh, f, opp_of) {
            if let Some(opp) = other_face(mesh, h) {
                if state.flags[opp.index() as usize] == CLEARED {
                    state.orient[opp.index() as usize] = Some(orient);
                    state.stack.push(opp);
                }
            }
        }
    };
    seed_parallel(state, start, b, if orientation { a } else { c });
    let (mut a, mut b, mut c) = (a, b, c);
    let mut i = orientation as usize;
    let mut cur = start;
    loop {
        // Continue across the crossable edge opposite the orienting vertex.
        let oriented = match state.orient[cur.index() as usize] {
            Some(v) => v,
            None => break,
        };
        let h = match opposite_halfedge(mesh, cur, oriented) {
            Some(h) => h,
            None => break,
        };
        if !is_crossable(mesh, h.edge())? {
            break;
        }
        let next = match other_face(mesh, h) {
            Some(next) => next,
            None => break,
        };
        if state.flags[next.index() as usize] == CLAIMED {
            break;
        }
        state.flags[next.index() as usize] = CLAIMED;
        i += 1;
        a = b;
        b = c;
        c = other_vertex(mesh, next, a, b).ok_or(Error::HalfedgeNotFound)?;
        state.orient[next.index() as usize] = Some(a);
        seed_parallel(state, next, b, if i % 2 == 1 { a } else { c });
        verts.push(c);
        faces.push(next);
        cur = next;
    }
    Ok(TriStrip {
        verts,
        faces,
        orientation,
        substrips: Vec::new(),
    })
}

/// A sequence of (vertex, edge) pairs where each edge leaves its vertex.
/// Consecutive pairs usually chain end to end; a pair that does not continue
/// from its predecessor starts a new line strip.
pub struct EdgeStrip {
    verts: Vec<VH>,
    edges: Vec<EH>,
    substrip: Option<Box<EdgeStrip>>,
}

impl Default for EdgeStrip {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeStrip {
    pub fn new() -> Self {
        EdgeStrip {
            verts: Vec::new(),
            edges: Vec::new(),
            substrip: None,
        }
    }

    /// Gather every edge accepted by the filter into one strip, chaining
    /// edges through shared vertices where possible.
    pub fn build(
        mesh: &Mesh,
        filter: &dyn Fn(&Mesh, EH) -> Result<bool, Error>,
    ) -> Result<EdgeStrip, Error> {
        let mut strip = EdgeStrip::new();
        let mut visited = vec![false; mesh.num_edges()];
        for e in mesh.edges() {
            if visited[e.index() as usize] || !filter(mesh, e)? {
                continue;
            }
            // Back up along the chain so it starts at an end point, or on a
            // closed loop, back where we started.
            let (mut v, _) = mesh.edge_vertices(e);
            let mut start = e;
            let mut guard = mesh.num_edges();
            loop {
                let mut found = None;
                for pe in mesh.ve_ccw_iter(v) {
                    if pe != start && !visited[pe.index() as usize] && filter(mesh, pe)? {
                        found = Some(pe);
                        break;
                    }
                }
                match found {
                    Some(pe) if pe != e && guard > 0 => {
                        guard -= 1;
                        v = edge_other_vert(mesh, pe, v).ok_or(Error::HalfedgeNotFound)?;
                        start = pe;
                    }
                    _ => break,
                }
            }
            // Walk forward from the chain start.
            let mut cur = start;
            loop {
                visited[cur.index() as usize] = true;
                strip.add(v, cur);
                v = edge_other_vert(mesh, cur, v).ok_or(Error::HalfedgeNotFound)?;
                let mut next = None;
                for ne in mesh.ve_ccw_iter(v) {
                    if !visited[ne.index() as usize] && filter(mesh, ne)? {
                        next = Some(ne);
                        break;
                    }
                }
                match next {
                    Some(ne) => cur = ne,
                    None => break,
                }
            }
        }
        Ok(strip)
    }

    pub fn add(&mut self, v: VH, e: EH) {
        self.verts.push(v);
        self.edges.push(e);
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn verts(&self) -> &[VH] {
        &self.verts
    }

    pub fn edges(&self) -> &[EH] {
        &self.edges
    }

    /// Whether the pair at `i` starts a new line strip.
    pub fn has_break(&self, mesh: &Mesh, i: usize) -> bool {
        i == 0
            || i >= self.len()
            || edge_other_vert(mesh, self.edges[i - 1], self.verts[i - 1])
                != Some(self.verts[i])
    }

    pub fn num_line_strips(&self, mesh: &Mesh) -> usize {
        (0..self.len()).filter(|i| self.has_break(mesh, *i)).count()
    }

    pub fn draw(&self, cb: &mut dyn StripCB) {
        if self.is_empty() {
            return;
        }
        cb.begin_strip();
        for (v, e) in self.verts.iter().zip(self.edges.iter()) {
            cb.edge_cb(*v, *e);
        }
        cb.end_strip();
    }

    /// The corresponding strip one level finer: every parent pair maps to
    /// the two child edges its edge splits into, so the substrip has exactly
    /// twice as many pairs. A substrip of any other length is stale and gets
    /// rebuilt.
    pub fn substrip(
        &mut self,
        parent: &SubdivLevel,
        child: &Mesh,
    ) -> Result<&mut EdgeStrip, Error> {
        let expected = 2 * self.len();
        let stale = match &self.substrip {
            Some(s) => s.len() != expected,
            None => true,
        };
        if stale {
            let mut sub = EdgeStrip::new();
            for (v, e) in self.verts.iter().zip(self.edges.iter()) {
                let m = parent.edge_child(*e)?.ok_or(Error::LevelNotBuilt(1))?;
                let cv = parent.vertex_child(*v)?.ok_or(Error::LevelNotBuilt(1))?;
                let w = edge_other_vert(parent.mesh(), *e, *v)
                    .ok_or(Error::HalfedgeNotFound)?;
                let cw = parent.vertex_child(w)?.ok_or(Error::LevelNotBuilt(1))?;
                let h1 = child.find_halfedge(cv, m).ok_or(Error::HalfedgeNotFound)?;
                let h2 = child.find_halfedge(m, cw).ok_or(Error::HalfedgeNotFound)?;
                sub.add(cv, h1.edge());
                sub.add(m, h2.edge());
            }
            self.substrip = Some(Box::new(sub));
        }
        match self.substrip.as_mut() {
            Some(s) => Ok(s),
            None => Err(Error::LevelNotBuilt(1)),
        }
    }

    pub fn clear_subdivision(&mut self, level: i32) {
        if level <= 0 {
            self.substrip = None;
            self.verts.clear();
            self.edges.clear();
        } else if level == 1 {
            self.substrip = None;
        } else if let Some(s) = self.substrip.as_mut() {
            s.clear_subdivision(level - 1);
        }
    }
}

/// A chain of vertices connected by edges, e.g. one line strip of an
/// [`EdgeStrip`].
pub struct VertStrip {
    verts: Vec<VH>,
    edges: Vec<EH>,
    substrip: Option<Box<VertStrip>>,
}

impl VertStrip {
    /// A chain of `n` vertices runs along `n - 1` edges.
    pub fn new(verts: Vec<VH>, edges: Vec<EH>) -> Result<Self, Error> {
        if verts.len() != edges.len() + 1 && !(verts.is_empty() && edges.is_empty()) {
            return Err(Error::MismatchedArrayLengths(verts.len(), edges.len()));
        }
        Ok(VertStrip {
            verts,
            edges,
            substrip: None,
        })
    }

    /// One vertex chain per line strip of the given edge strip.
    pub fn from_edge_strip(mesh: &Mesh, strip: &EdgeStrip) -> Result<Vec<VertStrip>, Error> {
        let mut chains = Vec::new();
        let mut verts = Vec::new();
        let mut edges = Vec::new();
        for i in 0..strip.len() {
            if strip.has_break(mesh, i) && !verts.is_empty() {
                chains.push(VertStrip::new(std::mem::take(&mut verts), std::mem::take(&mut edges))?);
            }
            if verts.is_empty() {
                verts.push(strip.verts()[i]);
            }
            let e = strip.edges()[i];
            let v = strip.verts()[i];
            verts.push(edge_other_vert(mesh, e, v).ok_or(Error::HalfedgeNotFound)?);
            edges.push(e);
        }
        if !verts.is_empty() {
            chains.push(VertStrip::new(verts, edges)?);
        }
        Ok(chains)
    }

    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.verts.len()
    }

    pub fn verts(&self) -> &[VH] {
        &self.verts
    }

    pub fn draw(&self, cb: &mut dyn StripCB) {
        if self.is_empty() {
            return;
        }
        cb.begin_strip();
        for v in self.verts.iter() {
            cb.vert_cb(*v);
        }
        cb.end_strip();
    }

    /// The chain one level finer: child vertices of the parent chain
    /// interleaved with the child vertices of its edges, `2n - 1` vertices
    /// for a parent chain of `n`. Any other cached length is stale.
    pub fn substrip(
        &mut self,
        parent: &SubdivLevel,
        child: &Mesh,
    ) -> Result<&mut VertStrip, Error> {
        let expected = if self.verts.is_empty() {
            0
        } else {
            2 * self.verts.len() - 1
        };
        let stale = match &self.substrip {
            Some(s) => s.len() != expected,
            None => true,
        };
        if stale {
            let mut verts = Vec::with_capacity(expected);
            let mut edges = Vec::with_capacity(expected.saturating_sub(1));
            for (i, v) in self.verts.iter().enumerate() {
                let cv = parent.vertex_child(*v)?.ok_or(Error::LevelNotBuilt(1))?;
                if let Some(prev) = verts.last().copied() {
                    let h = child.find_halfedge(prev, cv).ok_or(Error::HalfedgeNotFound)?;
                    edges.push(h.edge());
                }
                verts.push(cv);
                if let Some(e) = self.edges.get(i) {
                    let m = parent.edge_child(*e)?.ok_or(Error::LevelNotBuilt(1))?;
                    let h = child.find_halfedge(cv, m).ok_or(Error::HalfedgeNotFound)?;
                    edges.push(h.edge());
                    verts.push(m);
                }
            }
            self.substrip = Some(Box::new(VertStrip::new(verts, edges)?));
        }
        match self.substrip.as_mut() {
            Some(s) => Ok(s),
            None => Err(Error::LevelNotBuilt(1)),
        }
    }

    pub fn clear_subdivision(&mut self, level: i32) {
        if level <= 0 {
            self.substrip = None;
            self.verts.clear();
            self.edges.clear();
        } else if level == 1 {
            self.substrip = None;
        } else if let Some(s) = self.substrip.as_mut() {
            s.clear_subdivision(level - 1);
        }
    }
}

#[cfg(test)]
mod test {
    use super::{EdgeStrip, StripCB, TriStrip, VertStrip};
    use crate::{
        element::{EH, FH, VH},
        hierarchy::Hierarchy,
        mesh::{
            Mesh,
            test::{closed_fan, tetrahedron},
        },
    };
    use std::collections::HashSet;

    #[derive(Default)]
    struct Recorder {
        tris: Vec<[VH; 3]>,
        edge_pairs: Vec<(VH, EH)>,
        verts: Vec<VH>,
        pending: Vec<VH>,
        strips: usize,
    }

    impl StripCB for Recorder {
        fn begin_strip(&mut self) {
            self.strips += 1;
            self.pending.clear();
        }

        fn face_cb(&mut self, v: VH, _f: FH) {
            self.pending.push(v);
            let n = self.pending.len();
            if n >= 3 {
                let (a, b, c) = (self.pending[n - 3], self.pending[n - 2], self.pending[n - 1]);
                if a != b && b != c && a != c {
                    // Odd triangles flip their winding, like a GL strip.
                    if (n - 3) % 2 == 0 {
                        self.tris.push([a, b, c]);
                    } else {
                        self.tris.push([b, a, c]);
                    }
                }
            }
        }

        fn edge_cb(&mut self, v: VH, e: EH) {
            self.edge_pairs.push((v, e));
        }

        fn vert_cb(&mut self, v: VH) {
            self.verts.push(v);
        }
    }

    fn cyclic_eq(a: [VH; 3], b: [VH; 3]) -> bool {
        (0..3).any(|r| (0..3).all(|i| a[i] == b[(i + r) % 3]))
    }

    fn check_coverage(mesh: &Mesh, strips: &[TriStrip]) {
        let mut seen = HashSet::new();
        let mut total = 0usize;
        for strip in strips {
            total += strip.num_tris();
            for f in strip.faces() {
                assert!(seen.insert(*f), "{} covered twice", f);
            }
        }
        assert_eq!(total, mesh.num_faces());
        assert_eq!(seen.len(), mesh.num_faces());
    }

    #[test]
    fn t_strips_cover_every_face_once() {
        for mesh in [tetrahedron(1.0), closed_fan(6, 0.5)] {
            let strips = TriStrip::build_strips(&mesh).expect("Cannot build strips");
            check_coverage(&mesh, &strips);
        }
    }

    #[test]
    fn t_strip_replay_preserves_winding() {
        let mesh = tetrahedron(1.0);
        let strips = TriStrip::build_strips(&mesh).expect("Cannot build strips");
        let mut rec = Recorder::default();
        for strip in &strips {
            strip.draw(&mut rec);
        }
        assert_eq!(rec.tris.len(), mesh.num_faces());
        for tri in &rec.tris {
            let found = mesh.faces().any(|f| cyclic_eq(*tri, mesh.face_vertices(f)));
            assert!(found, "triangle {:?} does not match any face", tri);
        }
    }

    #[test]
    fn t_creases_split_strips() {
        let mut mesh = tetrahedron(1.0);
        for e in mesh.edges().collect::<Vec<_>>() {
            mesh.set_crease(e, 1).unwrap();
        }
        let strips = TriStrip::build_strips(&mesh).expect("Cannot build strips");
        // No strip can cross a crease, so each face is its own strip.
        assert_eq!(strips.len(), mesh.num_faces());
        check_coverage(&mesh, &strips);
    }

    #[test]
    fn t_boundary_edge_strip_is_a_loop() {
        let mesh = closed_fan(6, 0.0);
        let strip = EdgeStrip::build(&mesh, &|m, e| Ok(m.is_boundary_edge(e)))
            .expect("Cannot build strip");
        assert_eq!(strip.len(), 6);
        assert_eq!(strip.num_line_strips(&mesh), 1);
        let mut rec = Recorder::default();
        strip.draw(&mut rec);
        assert_eq!(rec.edge_pairs.len(), 6);
    }

    #[test]
    fn t_spokes_chain_through_shared_vertex() {
        let mut mesh = closed_fan(6, 0.0);
        // Two crease spokes meeting at the center chain into one line strip.
        for to in [1u32, 4] {
            let e = mesh.find_halfedge(0.into(), to.into()).unwrap().edge();
            mesh.set_crease(e, 1).unwrap();
        }
        let strip = EdgeStrip::build(&mesh, &|m, e| m.is_crease_edge(e))
            .expect("Cannot build strip");
        assert_eq!(strip.len(), 2);
        assert_eq!(strip.num_line_strips(&mesh), 1);
    }

    #[test]
    fn t_disjoint_crease_edges_break_the_strip() {
        let mut mesh = closed_fan(6, 0.0);
        // Two rim edges with no shared vertex give two line strips.
        for (from, to) in [(1u32, 2u32), (4, 5)] {
            let e = mesh.find_halfedge(from.into(), to.into()).unwrap().edge();
            mesh.set_crease(e, 1).unwrap();
        }
        let strip = EdgeStrip::build(&mesh, &|m, e| m.is_crease_edge(e))
            .expect("Cannot build strip");
        assert_eq!(strip.len(), 2);
        assert_eq!(strip.num_line_strips(&mesh), 2);
    }

    #[test]
    fn t_edge_substrip_doubles() {
        let mut hier = Hierarchy::new(closed_fan(6, 0.0)).expect("Cannot build hierarchy");
        hier.update_subdivision(1).expect("Cannot subdivide");
        let coarse = hier.level(0).unwrap();
        let fine = hier.level(1).unwrap().mesh();
        let mut strip = EdgeStrip::build(coarse.mesh(), &|m, e| Ok(m.is_boundary_edge(e)))
            .expect("Cannot build strip");
        let parent_len = strip.len();
        let sub = strip.substrip(coarse, fine).expect("Cannot build substrip");
        assert_eq!(sub.len(), 2 * parent_len);
        // Still a single closed loop at the finer level.
        assert_eq!(sub.num_line_strips(fine), 1);
        // A truncated substrip is stale and gets rebuilt.
        let sub = strip.substrip(coarse, fine).unwrap();
        sub.verts.pop();
        sub.edges.pop();
        let sub = strip.substrip(coarse, fine).expect("Cannot rebuild substrip");
        assert_eq!(sub.len(), 2 * parent_len);
    }

    #[test]
    fn t_vert_substrip_doubling_rule() {
        let mut hier = Hierarchy::new(closed_fan(6, 0.0)).expect("Cannot build hierarchy");
        hier.update_subdivision(1).expect("Cannot subdivide");
        let coarse = hier.level(0).unwrap();
        let fine = hier.level(1).unwrap().mesh();
        // A chain of two spokes: 1 - 0 - 4.
        let e10 = coarse.mesh().find_halfedge(1.into(), 0.into()).unwrap().edge();
        let e04 = coarse.mesh().find_halfedge(0.into(), 4.into()).unwrap().edge();
        let mut strip =
            VertStrip::new(vec![1.into(), 0.into(), 4.into()], vec![e10, e04]).unwrap();
        let n = strip.len();
        let sub = strip.substrip(coarse, fine).expect("Cannot build substrip");
        assert_eq!(sub.len(), 2 * n - 1);
        // Parent vertices alternate with edge children along the chain.
        let m10 = coarse.edge_child(e10).unwrap().unwrap();
        let m04 = coarse.edge_child(e04).unwrap().unwrap();
        assert_eq!(
            sub.verts(),
            &[1.into(), m10, 0.into(), m04, 4.into()] as &[VH]
        );
        sub.verts.pop();
        sub.edges.pop();
        let sub = strip.substrip(coarse, fine).expect("Cannot rebuild substrip");
        assert_eq!(sub.len(), 2 * n - 1);
    }

    #[test]
    fn t_vert_strips_from_edge_strip() {
        let mut mesh = closed_fan(6, 0.0);
        for (from, to) in [(1u32, 2u32), (4, 5)] {
            let e = mesh.find_halfedge(from.into(), to.into()).unwrap().edge();
            mesh.set_crease(e, 1).unwrap();
        }
        let strip = EdgeStrip::build(&mesh, &|m, e| m.is_crease_edge(e))
            .expect("Cannot build strip");
        let chains = VertStrip::from_edge_strip(&mesh, &strip).expect("Cannot split chains");
        assert_eq!(chains.len(), 2);
        let mut rec = Recorder::default();
        for chain in &chains {
            assert_eq!(chain.len(), 2);
            chain.draw(&mut rec);
        }
        assert_eq!(rec.strips, 2);
        assert_eq!(rec.verts.len(), 4);
    }

    #[test]
    fn t_tri_substrips_cover_children() {
        let mut hier = Hierarchy::new(tetrahedron(1.0)).expect("Cannot build hierarchy");
        hier.update_subdivision(1).expect("Cannot subdivide");
        let coarse = hier.level(0).unwrap();
        let fine = hier.level(1).unwrap().mesh();
        let mut strips = TriStrip::build_strips(coarse.mesh()).expect("Cannot build strips");
        let mut covered = HashSet::new();
        let mut total = 0usize;
        for strip in strips.iter_mut() {
            let expected = 4 * strip.num_tris();
            let subs = strip.substrips(coarse, fine).expect("Cannot build substrips");
            let count: usize = subs.iter().map(|s| s.num_tris()).sum();
            assert_eq!(count, expected);
            for s in subs {
                for f in s.faces() {
                    assert!(covered.insert(*f));
                }
            }
            total += count;
        }
        assert_eq!(total, fine.num_faces());
    }

    #[test]
    fn t_clear_subdivision() {
        let mut hier = Hierarchy::new(closed_fan(6, 0.0)).expect("Cannot build hierarchy");
        hier.update_subdivision(1).expect("Cannot subdivide");
        let coarse = hier.level(0).unwrap();
        let fine = hier.level(1).unwrap().mesh();
        let mut strip = EdgeStrip::build(coarse.mesh(), &|m, e| Ok(m.is_boundary_edge(e)))
            .expect("Cannot build strip");
        strip.substrip(coarse, fine).expect("Cannot build substrip");
        assert!(strip.substrip.is_some());
        strip.clear_subdivision(1);
        assert!(strip.substrip.is_none());
        assert_eq!(strip.len(), 6);
        strip.substrip(coarse, fine).expect("Cannot rebuild substrip");
        strip.clear_subdivision(0);
        assert!(strip.substrip.is_none());
        assert!(strip.is_empty());
    }
}

use crate::{
    element::{EH, FH, HH, VH},
    topol::Topology,
};

/// Iterator over the outgoing halfedges of a vertex. The const parameter
/// picks the direction of rotation.
pub(crate) struct OutgoingHalfedgeIter<'a, const CCW: bool> {
    topol: &'a Topology,
    start: Option<HH>,
    current: Option<HH>,
}

impl<'a, const CCW: bool> OutgoingHalfedgeIter<'a, CCW> {
    fn new(topol: &'a Topology, v: VH) -> Self {
        let h = topol.vertex_halfedge(v);
        OutgoingHalfedgeIter {
            topol,
            start: h,
            current: h,
        }
    }
}

impl Iterator for OutgoingHalfedgeIter<'_, true> {
    type Item = HH;

    fn next(&mut self) -> Option<HH> {
        let current = self.current?;
        let next = self.topol.ccw_rotated_halfedge(current);
        self.current = if Some(next) == self.start {
            None
        } else {
            Some(next)
        };
        Some(current)
    }
}

impl Iterator for OutgoingHalfedgeIter<'_, false> {
    type Item = HH;

    fn next(&mut self) -> Option<HH> {
        let current = self.current?;
        let next = self.topol.cw_rotated_halfedge(current);
        self.current = if Some(next) == self.start {
            None
        } else {
            Some(next)
        };
        Some(current)
    }
}

/// Iterator over the halfedges in a face loop.
pub(crate) struct FaceHalfedgeIter<'a, const CCW: bool> {
    topol: &'a Topology,
    start: HH,
    current: Option<HH>,
}

impl<'a, const CCW: bool> FaceHalfedgeIter<'a, CCW> {
    fn new(topol: &'a Topology, f: FH) -> Self {
        let h = topol.face_halfedge(f);
        FaceHalfedgeIter {
            topol,
            start: h,
            current: Some(h),
        }
    }
}

impl Iterator for FaceHalfedgeIter<'_, true> {
    type Item = HH;

    fn next(&mut self) -> Option<HH> {
        let current = self.current?;
        let next = self.topol.next_halfedge(current);
        self.current = if next == self.start { None } else { Some(next) };
        Some(current)
    }
}

impl Iterator for FaceHalfedgeIter<'_, false> {
    type Item = HH;

    fn next(&mut self) -> Option<HH> {
        let current = self.current?;
        let next = self.topol.prev_halfedge(current);
        self.current = if next == self.start { None } else { Some(next) };
        Some(current)
    }
}

pub(crate) fn voh_ccw_iter(topol: &Topology, v: VH) -> OutgoingHalfedgeIter<'_, true> {
    OutgoingHalfedgeIter::new(topol, v)
}

pub(crate) fn voh_cw_iter(topol: &Topology, v: VH) -> OutgoingHalfedgeIter<'_, false> {
    OutgoingHalfedgeIter::new(topol, v)
}

pub(crate) fn vih_ccw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = HH> + '_ {
    voh_ccw_iter(topol, v).map(|h| h.opposite())
}

pub(crate) fn vv_ccw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = VH> + '_ {
    voh_ccw_iter(topol, v).map(|h| topol.head_vertex(h))
}

pub(crate) fn vv_cw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = VH> + '_ {
    voh_cw_iter(topol, v).map(|h| topol.head_vertex(h))
}

pub(crate) fn ve_ccw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = EH> + '_ {
    voh_ccw_iter(topol, v).map(|h| h.edge())
}

pub(crate) fn vf_ccw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = FH> + '_ {
    voh_ccw_iter(topol, v).filter_map(|h| topol.halfedge_face(h))
}

pub(crate) fn fh_ccw_iter(topol: &Topology, f: FH) -> FaceHalfedgeIter<'_, true> {
    FaceHalfedgeIter::new(topol, f)
}

pub(crate) fn fh_cw_iter(topol: &Topology, f: FH) -> FaceHalfedgeIter<'_, false> {
    FaceHalfedgeIter::new(topol, f)
}

pub(crate) fn fv_ccw_iter(topol: &Topology, f: FH) -> impl Iterator<Item = VH> + '_ {
    fh_ccw_iter(topol, f).map(|h| topol.head_vertex(h))
}

pub(crate) fn fe_ccw_iter(topol: &Topology, f: FH) -> impl Iterator<Item = EH> + '_ {
    fh_ccw_iter(topol, f).map(|h| h.edge())
}

pub(crate) fn ff_ccw_iter(topol: &Topology, f: FH) -> impl Iterator<Item = FH> + '_ {
    fh_ccw_iter(topol, f).filter_map(|h| topol.halfedge_face(h.opposite()))
}

pub(crate) fn ev_iter(topol: &Topology, e: EH) -> impl Iterator<Item = VH> + '_ {
    let (h, oh) = e.halfedges();
    [h, oh].into_iter().map(|h| topol.head_vertex(h))
}

pub(crate) fn ef_iter(topol: &Topology, e: EH) -> impl Iterator<Item = FH> + '_ {
    let (h, oh) = e.halfedges();
    [h, oh].into_iter().filter_map(|h| topol.halfedge_face(h))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::topol::test::{fan_topol, tetra_topol};
    use arrayvec::ArrayVec;

    #[test]
    fn t_tetra_vertex_circulators() {
        let topol = tetra_topol();
        for v in topol.vertices() {
            let nbrs: ArrayVec<VH, 3> = vv_ccw_iter(&topol, v).collect();
            assert_eq!(nbrs.len(), 3);
            // All neighbors distinct and none equal to the center.
            for (i, a) in nbrs.iter().enumerate() {
                assert_ne!(*a, v);
                for b in nbrs.iter().skip(i + 1) {
                    assert_ne!(*a, *b);
                }
            }
            let faces: ArrayVec<FH, 3> = vf_ccw_iter(&topol, v).collect();
            assert_eq!(faces.len(), 3);
        }
    }

    #[test]
    fn t_ccw_cw_are_reverses() {
        let topol = fan_topol();
        for v in topol.vertices() {
            let ccw: Vec<VH> = vv_ccw_iter(&topol, v).collect();
            let mut cw: Vec<VH> = vv_cw_iter(&topol, v).collect();
            // Both directions start at the same halfedge.
            assert_eq!(ccw.first(), cw.first());
            cw[1..].reverse();
            assert_eq!(ccw, cw);
        }
    }

    #[test]
    fn t_boundary_ring_starts_on_boundary() {
        let topol = fan_topol();
        let v: VH = 3.into();
        let first = voh_ccw_iter(&topol, v).next().unwrap();
        assert!(topol.is_boundary_halfedge(first));
        let ring: Vec<VH> = vv_ccw_iter(&topol, v).collect();
        assert_eq!(ring.len(), 3);
        assert!(ring.contains(&0.into()));
        assert!(ring.contains(&2.into()));
        assert!(ring.contains(&4.into()));
    }

    #[test]
    fn t_face_loop() {
        let topol = tetra_topol();
        for f in topol.faces() {
            let hs: ArrayVec<HH, 3> = fh_ccw_iter(&topol, f).collect();
            assert_eq!(hs.len(), 3);
            for h in hs.iter() {
                assert_eq!(topol.halfedge_face(*h), Some(f));
            }
            let vs: ArrayVec<VH, 3> = fv_ccw_iter(&topol, f).collect();
            assert_eq!(vs.len(), 3);
            let mut rev: Vec<HH> = fh_cw_iter(&topol, f).collect();
            rev[1..].reverse();
            assert_eq!(hs.as_slice(), rev.as_slice());
        }
    }

    #[test]
    fn t_edge_iterators() {
        let topol = tetra_topol();
        for e in topol.edges() {
            let vs: Vec<VH> = ev_iter(&topol, e).collect();
            assert_eq!(vs.len(), 2);
            assert_ne!(vs[0], vs[1]);
            assert_eq!(ef_iter(&topol, e).count(), 2);
        }
        let fan = fan_topol();
        let boundary_edges = fan
            .edges()
            .filter(|e| ef_iter(&fan, *e).count() == 1)
            .count();
        assert_eq!(boundary_edges, 7);
    }

    #[test]
    fn t_face_adjacency() {
        let topol = tetra_topol();
        for f in topol.faces() {
            let nbrs: ArrayVec<FH, 3> = ff_ccw_iter(&topol, f).collect();
            assert_eq!(nbrs.len(), 3);
            assert!(nbrs.iter().all(|nf| *nf != f));
        }
    }
}

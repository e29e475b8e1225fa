use crate::{
    element::Handle,
    error::Error,
    iterator,
    status::Status,
    topol::Topology,
};

fn check_vertices(topol: &Topology, vstatus: &[Status], hvisited: &mut [bool]) -> Result<(), Error> {
    hvisited.fill(false);
    for v in topol
        .vertices()
        .filter(|v| !vstatus[v.index() as usize].deleted())
    {
        if let Some(h) = topol.vertex_halfedge(v) {
            if !topol.is_valid_halfedge(h) {
                return Err(Error::InvalidOutgoingHalfedges(v));
            }
            // The outgoing halfedge must be a boundary halfedge, or none of
            // the outgoing halfedges are boundary.
            if !topol.is_boundary_halfedge(h)
                && iterator::voh_ccw_iter(topol, v).any(|h| topol.is_boundary_halfedge(h))
            {
                return Err(Error::OutgoingHalfedgeNotBoundary(v));
            }
            // Outgoing halfedge must point back to this vertex.
            if topol.tail_vertex(h) != v {
                return Err(Error::InvalidOutgoingHalfedges(v));
            }
        }
        // Rotating ccw then cw must visit every outgoing halfedge once.
        for h in iterator::voh_ccw_iter(topol, v) {
            if std::mem::replace(&mut hvisited[h.index() as usize], true) {
                return Err(Error::InvalidOutgoingHalfedges(v));
            }
        }
        for h in iterator::voh_cw_iter(topol, v) {
            if !std::mem::replace(&mut hvisited[h.index() as usize], false) {
                return Err(Error::InvalidOutgoingHalfedges(v));
            }
        }
    }
    Ok(())
}

fn check_edges(
    topol: &Topology,
    vstatus: &[Status],
    estatus: &[Status],
    fstatus: &[Status],
) -> Result<(), Error> {
    for h in topol
        .halfedges()
        .filter(|h| !estatus[h.edge().index() as usize].deleted())
    {
        let head = topol.head_vertex(h);
        let tail = topol.tail_vertex(h);
        if head == tail {
            return Err(Error::DegenerateEdge(h.edge()));
        }
        if vstatus[head.index() as usize].deleted() {
            return Err(Error::DeletedVertex(head));
        }
        if let Some(f) = topol.halfedge_face(h) {
            if fstatus[f.index() as usize].deleted() {
                return Err(Error::DeletedFace(f));
            }
        }
        // Link consistency in both directions.
        let prev = topol.prev_halfedge(h);
        let next = topol.next_halfedge(h);
        if topol.next_halfedge(prev) != h
            || topol.prev_halfedge(next) != h
            || topol.tail_vertex(next) != head
            || topol.head_vertex(prev) != tail
        {
            return Err(Error::InvalidHalfedgeLink(h));
        }
        // The halfedge must be reachable by rotating around its end vertices.
        if !iterator::voh_ccw_iter(topol, tail).any(|hh| hh == h)
            || !iterator::vih_ccw_iter(topol, head).any(|hh| hh == h)
        {
            return Err(Error::InvalidHalfedgeVertexLink(h));
        }
    }
    Ok(())
}

fn check_faces(topol: &Topology, estatus: &[Status], fstatus: &[Status]) -> Result<(), Error> {
    for f in topol
        .faces()
        .filter(|f| !fstatus[f.index() as usize].deleted())
    {
        let h = topol.face_halfedge(f);
        if estatus[h.edge().index() as usize].deleted() {
            return Err(Error::DeletedEdge(h.edge()));
        }
        if topol.halfedge_face(h) != Some(f) {
            return Err(Error::InvalidFaceHalfedgeLink(f, h));
        }
        // Every face loop must be a triangle with a consistent face binding.
        let mut len = 0usize;
        for h in iterator::fh_ccw_iter(topol, f) {
            if topol.halfedge_face(h) != Some(f) {
                return Err(Error::InvalidFaceHalfedgeLink(f, h));
            }
            len += 1;
            if len > 3 {
                break;
            }
        }
        if len != 3 {
            return Err(Error::FaceLoopNotTriangular(f));
        }
    }
    Ok(())
}

impl Topology {
    /// Validate the halfedge structure.
    ///
    /// Walks every vertex ring, halfedge link and face loop, and returns the
    /// first inconsistency found. Deleted elements are skipped, but live
    /// elements referring to deleted ones are reported.
    pub fn check(&self) -> Result<(), Error> {
        let vstatus = self.vstatus.try_borrow()?;
        let vstatus: &[Status] = &vstatus;
        let estatus = self.estatus.try_borrow()?;
        let estatus: &[Status] = &estatus;
        let fstatus = self.fstatus.try_borrow()?;
        let fstatus: &[Status] = &fstatus;
        let mut hvisited = vec![false; self.num_halfedges()].into_boxed_slice();
        check_vertices(self, vstatus, &mut hvisited)?;
        check_edges(self, vstatus, estatus, fstatus)?;
        check_faces(self, estatus, fstatus)?;
        Ok(())
    }
}

use glam::DVec3;
use std::f64::consts::{PI, TAU};

use crate::{
    element::{EH, VH},
    error::Error,
    mesh::Mesh,
};

/// Subdivision role of a vertex, derived from the sharp edges around it.
///
/// An edge is sharp if it is a boundary edge or carries crease sharpness. A
/// vertex with corner sharpness is always a corner. Otherwise the number of
/// sharp edges decides: none makes it smooth, one a dart (smooth rules
/// apply), two a crease vertex, and more than two a corner.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VertexMask {
    Smooth,
    Dart,
    Crease,
    Corner,
}

/// Subdivision role of an edge.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EdgeMask {
    Smooth,
    Sharp,
}

pub fn classify_edge(mesh: &Mesh, e: EH) -> Result<EdgeMask, Error> {
    Ok(if mesh.is_sharp_edge(e)? {
        EdgeMask::Sharp
    } else {
        EdgeMask::Smooth
    })
}

pub fn classify_vertex(mesh: &Mesh, v: VH) -> Result<VertexMask, Error> {
    if mesh.corner(v)? > 0 {
        return Ok(VertexMask::Corner);
    }
    let mut nsharp = 0usize;
    for e in mesh.ve_ccw_iter(v) {
        if mesh.is_sharp_edge(e)? {
            nsharp += 1;
        }
    }
    Ok(match nsharp {
        0 => VertexMask::Smooth,
        1 => VertexMask::Dart,
        2 => VertexMask::Crease,
        _ => VertexMask::Corner,
    })
}

/// The neighbors of `v` across its sharp edges, in ccw order.
fn sharp_neighbors(mesh: &Mesh, v: VH) -> Result<Vec<VH>, Error> {
    let mut nbrs = Vec::new();
    for h in mesh.voh_ccw_iter(v) {
        if mesh.is_sharp_edge(h.edge())? {
            nbrs.push(mesh.head_vertex(h));
        }
    }
    Ok(nbrs)
}

/// The neighbor weight of the smooth vertex stencil for the given valence.
/// The matching center weight is `1 - n * beta`.
pub(crate) fn loop_beta(valence: usize) -> f64 {
    let n = valence as f64;
    (0.625 - (0.375 + 0.25 * (TAU / n).cos()).powi(2)) / n
}

/// Blend factor of the smooth limit mask: the limit position is
/// `w * v + (1 - w) * centroid` over the one ring.
fn loop_limit_blend(valence: usize) -> f64 {
    let n = valence as f64;
    let a = 0.625 - (3.0 + 2.0 * (TAU / n).cos()).powi(2) / 64.0;
    let omega = 3.0 * n / (8.0 * a);
    omega / (omega + n)
}

/// Position stencils of a subdivision scheme, dispatched over a closed set of
/// variants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Loop's quartic box spline scheme with crease and boundary rules.
    #[default]
    Loop,
    /// Plain midpoint refinement: vertices interpolate, edge points are
    /// midpoints. The limit surface is the control mesh itself.
    Midpoint,
}

impl Scheme {
    /// The refined position of a vertex.
    pub fn vertex_point(&self, mesh: &Mesh, v: VH) -> Result<DVec3, Error> {
        let pos = mesh.point(v)?;
        match self {
            Scheme::Midpoint => Ok(pos),
            Scheme::Loop => match classify_vertex(mesh, v)? {
                VertexMask::Corner => Ok(pos),
                VertexMask::Crease => {
                    let nbrs = sharp_neighbors(mesh, v)?;
                    match nbrs.as_slice() {
                        &[a, b] => Ok((pos * 6.0 + mesh.point(a)? + mesh.point(b)?) / 8.0),
                        _ => Ok(pos),
                    }
                }
                VertexMask::Smooth | VertexMask::Dart => {
                    let mut sum = DVec3::ZERO;
                    let mut valence = 0usize;
                    for w in mesh.vv_ccw_iter(v) {
                        sum += mesh.point(w)?;
                        valence += 1;
                    }
                    if valence < 3 {
                        // Degenerate ring, interpolate instead of extrapolating.
                        return Ok(pos);
                    }
                    let beta = loop_beta(valence);
                    Ok(sum * beta + pos * (1.0 - beta * (valence as f64)))
                }
            },
        }
    }

    /// The position of the vertex inserted on an edge.
    pub fn edge_point(&self, mesh: &Mesh, e: EH) -> Result<DVec3, Error> {
        let (a, b) = mesh.edge_vertices(e);
        let midpoint = (mesh.point(a)? + mesh.point(b)?) * 0.5;
        match self {
            Scheme::Midpoint => Ok(midpoint),
            Scheme::Loop => {
                if classify_edge(mesh, e)? == EdgeMask::Sharp {
                    return Ok(midpoint);
                }
                match mesh.edge_opposite_vertices(e) {
                    (Some(l), Some(r)) => Ok(((mesh.point(a)? + mesh.point(b)?) * 3.0
                        + mesh.point(l)?
                        + mesh.point(r)?)
                        / 8.0),
                    _ => Ok(midpoint),
                }
            }
        }
    }

    /// The limit position of a vertex.
    pub fn limit_point(&self, mesh: &Mesh, v: VH) -> Result<DVec3, Error> {
        let pos = mesh.point(v)?;
        match self {
            Scheme::Midpoint => Ok(pos),
            Scheme::Loop => match classify_vertex(mesh, v)? {
                VertexMask::Corner => Ok(pos),
                VertexMask::Crease => {
                    let nbrs = sharp_neighbors(mesh, v)?;
                    match nbrs.as_slice() {
                        &[a, b] => {
                            Ok(pos * (2.0 / 3.0) + (mesh.point(a)? + mesh.point(b)?) / 6.0)
                        }
                        _ => Ok(pos),
                    }
                }
                VertexMask::Smooth | VertexMask::Dart => {
                    let mut sum = DVec3::ZERO;
                    let mut valence = 0usize;
                    for w in mesh.vv_ccw_iter(v) {
                        sum += mesh.point(w)?;
                        valence += 1;
                    }
                    if valence < 3 {
                        return Ok(pos);
                    }
                    let w = loop_limit_blend(valence);
                    Ok(pos * w + (sum / (valence as f64)) * (1.0 - w))
                }
            },
        }
    }

    /// Limit tangents of the surface at `v`, spanning the tangent plane.
    ///
    /// For boundary vertices the first tangent runs along the boundary and
    /// the second one across, with the closed form masks for the low
    /// valences.
    pub fn limit_tangents(&self, mesh: &Mesh, v: VH) -> Result<(DVec3, DVec3), Error> {
        let pos = mesh.point(v)?;
        let mut ring = Vec::new();
        for w in mesh.vv_ccw_iter(v) {
            ring.push(mesh.point(w)?);
        }
        let n = ring.len();
        if n < 2 {
            return Ok((DVec3::ZERO, DVec3::ZERO));
        }
        if let Scheme::Midpoint = self {
            // Tangents of the control polyhedron itself.
            return Ok((ring[0] - pos, ring[1 % n] - pos));
        }
        if mesh.is_boundary_vertex(v) {
            // The ring starts and ends on the boundary, running clockwise
            // from the boundary halfedge. The along-boundary tangent runs
            // last to first so the cross product agrees with the interior
            // orientation.
            let t1 = ring[n - 1] - ring[0];
            let t2 = match n {
                2 => ring[0] + ring[1] - pos * 2.0,
                3 => ring[1] - pos,
                4 => ring[1] * 2.0 + ring[2] * 2.0 - ring[0] - ring[3] - pos * 2.0,
                _ => {
                    let theta = PI / ((n - 1) as f64);
                    let mut t = (ring[0] + ring[n - 1]) * theta.sin();
                    let scale = 2.0 * theta.cos() - 2.0;
                    for (i, p) in ring.iter().enumerate().take(n - 1).skip(1) {
                        t += *p * (scale * ((i as f64) * theta).sin());
                    }
                    t
                }
            };
            Ok((t1, t2))
        } else {
            let step = TAU / (n as f64);
            let mut t1 = DVec3::ZERO;
            let mut t2 = DVec3::ZERO;
            for (i, p) in ring.iter().enumerate() {
                let a = step * (i as f64);
                t1 += *p * a.cos();
                t2 += *p * a.sin();
            }
            Ok((t1, t2))
        }
    }

    /// Limit normal at `v`: the cross product of the limit tangents.
    pub fn limit_normal(&self, mesh: &Mesh, v: VH) -> Result<DVec3, Error> {
        if let Scheme::Midpoint = self {
            return mesh.vertex_normal(v);
        }
        let (t1, t2) = self.limit_tangents(mesh, v)?;
        Ok(t1.cross(t2).normalize_or_zero())
    }
}

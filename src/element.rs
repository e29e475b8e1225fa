use crate::{iterator, topol::Topology};
use std::fmt::{Debug, Display};

/**
 * All mesh elements are identified by a typed index wrapper implementing this
 * trait.
 */
pub trait Handle: Copy {
    /// The index of the element.
    fn index(self) -> u32;
}

macro_rules! impl_handle {
    ($(($name:ident, $doc:literal)),*) => {$(
        #[doc = $doc]
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            idx: u32,
        }

        impl Handle for $name {
            fn index(self) -> u32 {
                self.idx
            }
        }

        impl From<u32> for $name {
            fn from(idx: u32) -> Self {
                $name { idx }
            }
        }

        impl From<&u32> for $name {
            fn from(idx: &u32) -> Self {
                $name { idx: *idx }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.idx)
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.idx)
            }
        }
    )*};
}

impl_handle!(
    (VH, "Vertex handle."),
    (HH, "Halfedge handle."),
    (EH, "Edge handle."),
    (FH, "Face handle.")
);

/// Anything that owns a [`Topology`]. Handle methods and circulators are
/// written against this trait so they work with both the raw topology and the
/// concrete mesh type.
pub trait HasTopology {
    fn topology(&self) -> &Topology;
}

impl VH {
    /// The outgoing halfedge of this vertex, if it has one.
    pub fn halfedge(self, mesh: &impl HasTopology) -> Option<HH> {
        mesh.topology().vertex_halfedge(self)
    }

    /// Check if this vertex is valid for the `mesh`.
    ///
    /// The index has to be less than the number of vertices in the mesh.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().is_valid_vertex(self)
    }

    /// Check if this vertex is on the boundary of the `mesh`.
    pub fn is_boundary(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().is_boundary_vertex(self)
    }

    /// The number of edges incident on this vertex.
    pub fn valence(self, mesh: &impl HasTopology) -> usize {
        iterator::voh_ccw_iter(mesh.topology(), self).count()
    }
}

impl HH {
    /// The vertex this halfedge points at.
    pub fn head(self, mesh: &impl HasTopology) -> VH {
        mesh.topology().head_vertex(self)
    }

    /// The vertex this halfedge points away from.
    pub fn tail(self, mesh: &impl HasTopology) -> VH {
        mesh.topology().tail_vertex(self)
    }

    /// The oppositely oriented twin of this halfedge.
    pub fn opposite(self) -> HH {
        HH { idx: self.idx ^ 1 }
    }

    pub fn prev(self, mesh: &impl HasTopology) -> HH {
        mesh.topology().prev_halfedge(self)
    }

    pub fn next(self, mesh: &impl HasTopology) -> HH {
        mesh.topology().next_halfedge(self)
    }

    pub fn face(self, mesh: &impl HasTopology) -> Option<FH> {
        mesh.topology().halfedge_face(self)
    }

    /// The edge this halfedge belongs to.
    pub fn edge(self) -> EH {
        EH { idx: self.idx >> 1 }
    }

    /// Check if this halfedge is valid for the `mesh`.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().is_valid_halfedge(self)
    }

    /// Check if this halfedge is on the boundary of `mesh`.
    ///
    /// A halfedge is considered interior if it has a face incident on it.
    pub fn is_boundary(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().is_boundary_halfedge(self)
    }
}

impl EH {
    /// Both halfedges of this edge.
    pub fn halfedges(self) -> (HH, HH) {
        let hi = self.idx << 1;
        (hi.into(), (hi | 1).into())
    }

    pub fn halfedge(self, flag: bool) -> HH {
        ((self.idx << 1) | if flag { 1 } else { 0 }).into()
    }

    /// Check if this edge is valid for the `mesh`.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().is_valid_edge(self)
    }

    /// Check if the edge is a boundary edge.
    ///
    /// An edge is interior if both of its halfedges have incident faces.
    pub fn is_boundary(self, mesh: &impl HasTopology) -> bool {
        let (h, oh) = self.halfedges();
        h.is_boundary(mesh) || oh.is_boundary(mesh)
    }
}

impl FH {
    pub fn halfedge(self, mesh: &impl HasTopology) -> HH {
        mesh.topology().face_halfedge(self)
    }

    /// Check if this face is valid for the `mesh`.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().is_valid_face(self)
    }
}

impl HasTopology for Topology {
    fn topology(&self) -> &Topology {
        self
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Vertex {
    pub(crate) halfedge: Option<HH>,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Halfedge {
    pub(crate) face: Option<FH>,
    pub(crate) vertex: VH,
    pub(crate) next: HH,
    pub(crate) prev: HH,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Edge {
    pub(crate) halfedges: [Halfedge; 2],
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Face {
    pub(crate) halfedge: HH,
}

/*!
A halfedge based multiresolution triangle mesh library built around Loop
subdivision.

# Overview

+ A halfedge datastructure represents the topology of a mesh, i.e. the
  connectivity of vertices, edges and faces. [`Mesh`] pairs that topology with
  vertex positions and per element sharpness tags, using
  [`glam`](https://crates.io/crates/glam) for the geometry.

+ [`Hierarchy`] stacks meshes into subdivision levels. Each level is a uniform
  1-to-4 refinement of the one below it, with positions computed from the Loop
  [`Scheme`] stencils and per vertex detail offsets layered on top. Edits at
  any level propagate to finer levels incrementally, recomputing only the
  vertices whose stencils were touched.

+ [`DepGraph`] is a small dependency graph for ordering such recomputations.
  [`RegionUpdater`] uses it to capture the stencil support of a region of
  vertices across all levels, so repeated edits to the same region recompute
  exactly that region, coarse to fine.

+ [`TriStrip`], [`EdgeStrip`] and [`VertStrip`] assemble mesh elements into
  strips for replay through a [`StripCB`], and can derive the matching strips
  at finer subdivision levels from the hierarchy's child maps.
*/

mod check;
mod dag;
mod element;
mod error;
mod hierarchy;
mod iterator;
mod macros;
mod mesh;
mod property;
mod status;
mod stencil;
mod strip;
mod topol;
mod updater;

pub use dag::{DepGraph, NodeId};
pub use element::{EH, FH, HH, Handle, HasTopology, VH};
pub use error::Error;
pub use hierarchy::{Hierarchy, Parent, SubdivLevel};
pub use mesh::Mesh;
pub use property::{EProperty, FProperty, HProperty, Property, VProperty};
pub use status::Status;
pub use stencil::{EdgeMask, Scheme, VertexMask, classify_edge, classify_vertex};
pub use strip::{EdgeStrip, StripCB, TriStrip, VertStrip};
pub use updater::RegionUpdater;

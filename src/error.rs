use crate::element::{EH, FH, HH, VH};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    // Properties.
    BorrowedPropertyAccess,
    OutOfBoundsAccess,
    // Topology.
    ComplexVertex(VH),
    ComplexHalfedge(HH),
    PatchRelinkingFailed,
    HalfedgeNotFound,
    InvalidOutgoingHalfedges(VH),
    OutgoingHalfedgeNotBoundary(VH),
    InvalidHalfedgeLink(HH),
    InvalidHalfedgeVertexLink(HH),
    InvalidFaceHalfedgeLink(FH, HH),
    FaceLoopNotTriangular(FH),
    DegenerateEdge(EH),
    DeletedVertex(VH),
    DeletedEdge(EH),
    DeletedFace(FH),
    // Subdivision hierarchy.
    LevelNotBuilt(usize),
    // Dependency graph.
    DependencyCycle,
    InvalidNode,
    // Other.
    MismatchedArrayLengths(usize, usize),
}

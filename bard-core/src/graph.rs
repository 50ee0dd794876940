use crate::{EdgeName, Frame, Result, TransformError};
use log::trace;
use nalgebra::Matrix4;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// The current transform between every pair of related frames.
///
/// Each stored edge holds only its latest value. Since `A2B` and `B2A`
/// describe the same relation, storing one direction discards the other, so
/// the two directions can never disagree. Queries walk the edges in either
/// direction and compose the shortest chain that links the two frames.
///
/// ```text
///   model --> modelreference <-- camera <-- pointerref
///                                           (pointertip is a point in pointerref)
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformGraph {
    edges: BTreeMap<EdgeName, Matrix4<f64>>,
}

impl TransformGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the transform for the named edge, replacing any previous value
    /// of the edge or of its inverse.
    ///
    /// Any 4x4 matrix is accepted. Supplying rigid transforms is up to the caller.
    pub fn add(&mut self, edge: &str, matrix: Matrix4<f64>) -> Result<()> {
        self.add_edge(edge.parse()?, matrix);
        Ok(())
    }

    pub fn add_edge(&mut self, edge: EdgeName, matrix: Matrix4<f64>) {
        if self.edges.remove(&edge.inverse()).is_some() {
            trace!("{} replaces its stored inverse", edge);
        }
        trace!("storing {}", edge);
        self.edges.insert(edge, matrix);
    }

    /// Resolves the transform for the named edge.
    ///
    /// A stored edge comes back exactly as it was added. Otherwise the
    /// transform is composed along the shortest chain of stored edges,
    /// inverting the ones that point the wrong way. A singular edge is never
    /// walked backwards, so a longer chain is used when one goes around it.
    pub fn get(&self, edge: &str) -> Result<Matrix4<f64>> {
        self.get_edge(&edge.parse()?)
    }

    pub fn get_edge(&self, edge: &EdgeName) -> Result<Matrix4<f64>> {
        if let Some(matrix) = self.edges.get(edge) {
            return Ok(*matrix);
        }
        let mut hops = self.path(edge.source(), edge.target())?.into_iter();
        trace!("resolving {} through {} edges", edge, hops.len());
        let first = hops.next().ok_or_else(|| TransformError::Unresolvable {
            from: edge.source().clone(),
            to: edge.target().clone(),
        })?;
        Ok(hops.fold(first, |composed, hop| hop * composed))
    }

    /// Whether the named edge can currently be resolved.
    pub fn contains(&self, edge: &str) -> bool {
        self.get(edge).is_ok()
    }

    /// The stored edges, in a stable order.
    pub fn edges(&self) -> impl Iterator<Item = (&EdgeName, &Matrix4<f64>)> + '_ {
        self.edges.iter()
    }

    /// Every frame referenced by a stored edge.
    pub fn frames(&self) -> impl Iterator<Item = &Frame> + '_ {
        self.edges
            .keys()
            .flat_map(|edge| [edge.source(), edge.target()])
            .collect::<BTreeSet<_>>()
            .into_iter()
    }

    /// The number of stored edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Breadth-first search for the shortest usable chain from `from` to `to`.
    ///
    /// Returns the transform of every hop in order. An edge walked backwards
    /// must be invertible, so singular edges are only ever walked forwards. If
    /// no chain exists and a singular edge was skipped on the way, that edge
    /// is reported.
    fn path(&self, from: &Frame, to: &Frame) -> Result<Vec<Matrix4<f64>>> {
        let mut previous: BTreeMap<&Frame, Option<(&Frame, Matrix4<f64>)>> = BTreeMap::new();
        let mut queue = VecDeque::new();
        let mut singular = None;
        previous.insert(from, None);
        queue.push_back(from);

        while let Some(frame) = queue.pop_front() {
            if frame == to {
                let mut hops = Vec::new();
                let mut current = frame;
                while let Some((before, hop)) = previous[current] {
                    hops.push(hop);
                    current = before;
                }
                hops.reverse();
                return Ok(hops);
            }
            for (edge, matrix) in &self.edges {
                let (next, hop) = if edge.source() == frame {
                    (edge.target(), *matrix)
                } else if edge.target() == frame {
                    if previous.contains_key(edge.source()) {
                        continue;
                    }
                    match matrix.try_inverse() {
                        Some(inverse) => (edge.source(), inverse),
                        None => {
                            singular.get_or_insert_with(|| edge.clone());
                            continue;
                        }
                    }
                } else {
                    continue;
                };
                if !previous.contains_key(next) {
                    previous.insert(next, Some((frame, hop)));
                    queue.push_back(next);
                }
            }
        }
        Err(match singular {
            Some(edge) => TransformError::Singular { edge },
            None => TransformError::Unresolvable {
                from: from.clone(),
                to: to.clone(),
            },
        })
    }
}

//! Flood fill of the component reachable from a point.

use delve_core::Point;

use crate::PathSearch;
use crate::traits::Pather;

impl PathSearch {
    /// Flood-fill from `p` and return every cell connected to it through
    /// `pather`'s neighbours, `p` included.
    ///
    /// Afterwards [`cc_at`](Self::cc_at) answers membership queries for the
    /// same component.
    pub fn cc_map<P: Pather>(&mut self, pather: &P, p: Point) -> Vec<Point> {
        for v in self.cc_labels.iter_mut() {
            *v = -1;
        }

        let mut result = Vec::new();
        let Some(si) = self.idx(p) else {
            return result;
        };

        let mut nbuf = std::mem::take(&mut self.nbuf);

        self.cc_stack.clear();
        self.cc_stack.push(si);
        self.cc_labels[si] = 0;
        result.push(p);

        while let Some(ci) = self.cc_stack.pop() {
            let cp = self.point(ci);
            nbuf.clear();
            pather.neighbors(cp, &mut nbuf);

            for &np in nbuf.iter() {
                if let Some(ni) = self.idx(np) {
                    if self.cc_labels[ni] < 0 {
                        self.cc_labels[ni] = 0;
                        self.cc_stack.push(ni);
                        result.push(np);
                    }
                }
            }
        }

        self.nbuf = nbuf;
        result
    }

    /// Whether the last [`cc_map`](Self::cc_map) reached `p`.
    pub fn cc_at(&self, p: Point) -> bool {
        self.idx(p).is_some_and(|i| self.cc_labels[i] >= 0)
    }
}

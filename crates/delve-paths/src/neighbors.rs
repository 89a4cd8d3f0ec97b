use delve_core::Point;

/// Adjacency shape of a grid search space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Neighbors {
    /// 4-way: up, right, down, left.
    Cardinal,
    /// 8-way, clockwise from north.
    All,
}

impl Neighbors {
    /// Append the neighbours of `p` for which `keep` returns `true`.
    pub fn extend(self, p: Point, keep: impl Fn(Point) -> bool, buf: &mut Vec<Point>) {
        match self {
            Neighbors::Cardinal => buf.extend(p.neighbors_4().into_iter().filter(|&n| keep(n))),
            Neighbors::All => buf.extend(p.neighbors_8().into_iter().filter(|&n| keep(n))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::Range;

    #[test]
    fn cardinal_clips_to_range() {
        let r = Range::new(0, 0, 3, 3);
        let mut buf = Vec::new();
        Neighbors::Cardinal.extend(Point::new(0, 0), |n| r.contains(n), &mut buf);
        assert_eq!(buf, vec![Point::new(1, 0), Point::new(0, 1)]);
    }

    #[test]
    fn all_has_eight_in_the_open() {
        let mut buf = Vec::new();
        Neighbors::All.extend(Point::new(5, 5), |_| true, &mut buf);
        assert_eq!(buf.len(), 8);
        assert!(!buf.contains(&Point::new(5, 5)));
    }
}

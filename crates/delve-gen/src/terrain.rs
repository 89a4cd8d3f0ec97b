//! Terrain types and their map characters.

/// What occupies one cell of a generated level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Terrain {
    #[default]
    Empty,
    Floor,
    Wall,
    Door,
    Tunnel,
    UpStairs,
    DownStairs,
}

impl Terrain {
    pub const ALL: [Terrain; 7] = [
        Terrain::Empty,
        Terrain::Floor,
        Terrain::Wall,
        Terrain::Door,
        Terrain::Tunnel,
        Terrain::UpStairs,
        Terrain::DownStairs,
    ];

    /// Map character. Walls render as `-`; side walls are picked by the
    /// level, which knows the wall's orientation.
    pub const fn ch(self) -> char {
        match self {
            Terrain::Empty => ' ',
            Terrain::Floor => '.',
            Terrain::Wall => '-',
            Terrain::Door => '+',
            Terrain::Tunnel => '#',
            Terrain::UpStairs => '<',
            Terrain::DownStairs => '>',
        }
    }

    /// Terrain for a map character; both wall characters map to
    /// [`Terrain::Wall`].
    pub const fn from_char(ch: char) -> Option<Terrain> {
        Some(match ch {
            ' ' => Terrain::Empty,
            '.' => Terrain::Floor,
            '-' | '|' => Terrain::Wall,
            '+' => Terrain::Door,
            '#' => Terrain::Tunnel,
            '<' => Terrain::UpStairs,
            '>' => Terrain::DownStairs,
            _ => return None,
        })
    }

    /// Whether a walker can stand here.
    pub const fn is_movable(self) -> bool {
        matches!(
            self,
            Terrain::Floor
                | Terrain::Door
                | Terrain::Tunnel
                | Terrain::UpStairs
                | Terrain::DownStairs
        )
    }

    /// Whether the cell blocks sight.
    pub const fn is_obstructed(self) -> bool {
        matches!(self, Terrain::Wall | Terrain::Empty)
    }
}

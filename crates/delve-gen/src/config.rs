//! Generation settings.

use delve_paths::{CostWeights, DEFAULT_MAX_DEPTH};

use crate::connect::{DEFAULT_FAILURE_BUDGET, EdgeOrder, Topology};
use crate::error::GenError;
use crate::layout::wiggle::DEFAULT_ITERATIONS;
use crate::space::TunnelCosts;
use crate::tunnel::DEFAULT_MAX_CROSSINGS;

/// Links each room may make under the partition layout.
pub const NEAREST_LINKS: usize = 4;

/// How rooms are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutKind {
    /// One room per zone of the grid.
    #[default]
    Zones,
    /// Recursive partition of the whole area.
    Partition { max_rooms: usize },
    /// A uniform grid of rooms, randomly nudged.
    Wiggle { iterations: usize },
}

impl LayoutKind {
    /// Partition layout with the usual room limit.
    pub fn partition() -> Self {
        LayoutKind::Partition { max_rooms: 12 }
    }

    /// Wiggle layout with the usual number of mutations.
    pub fn wiggle() -> Self {
        LayoutKind::Wiggle {
            iterations: DEFAULT_ITERATIONS,
        }
    }

    /// Stairs in mirrored zones rather than in random rooms.
    pub fn zoned_stairs(self) -> bool {
        matches!(self, LayoutKind::Zones)
    }

    pub fn topology(self, grid_width: i32, grid_height: i32) -> Topology {
        match self {
            LayoutKind::Zones | LayoutKind::Wiggle { .. } => Topology::Grid {
                width: grid_width,
                height: grid_height,
            },
            LayoutKind::Partition { .. } => Topology::Nearest {
                count: NEAREST_LINKS,
            },
        }
    }
}

/// Everything [`generate`](fn@crate::generate) needs besides the random source.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LevelConfig {
    pub width: i32,
    pub height: i32,
    pub grid_width: i32,
    pub grid_height: i32,
    pub layout: LayoutKind,
    pub up_stairs: bool,
    pub down_stairs: bool,
    pub edge_order: EdgeOrder,
    /// Consecutive failed bridge attempts before the room graph is given up.
    pub failure_budget: usize,
    pub tunnel_costs: TunnelCosts,
    pub weights: CostWeights,
    /// Longest parent chain the tunnel search will follow.
    pub max_depth: usize,
    /// Doors a single searched tunnel may open.
    pub max_crossings: usize,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            width: 79,
            height: 23,
            grid_width: 3,
            grid_height: 3,
            layout: LayoutKind::Zones,
            up_stairs: true,
            down_stairs: true,
            edge_order: EdgeOrder::Descending,
            failure_budget: DEFAULT_FAILURE_BUDGET,
            tunnel_costs: TunnelCosts::default(),
            weights: CostWeights::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_crossings: DEFAULT_MAX_CROSSINGS,
        }
    }
}

impl LevelConfig {
    pub fn new(width: i32, height: i32, grid_width: i32, grid_height: i32) -> Self {
        Self {
            width,
            height,
            grid_width,
            grid_height,
            ..Self::default()
        }
    }

    pub fn with_layout(mut self, layout: LayoutKind) -> Self {
        self.layout = layout;
        self
    }

    /// Reject settings no layout can work with.
    pub fn validate(&self) -> Result<(), GenError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(GenError::Layout(format!(
                "level size {}x{} must be positive",
                self.width, self.height
            )));
        }
        if self.grid_width < 1 || self.grid_height < 1 {
            return Err(GenError::Layout(format!(
                "zone grid {}x{} must be at least 1x1",
                self.grid_width, self.grid_height
            )));
        }
        if !matches!(self.layout, LayoutKind::Partition { .. })
            && self.grid_width * self.grid_height < 2
        {
            return Err(GenError::Layout(format!(
                "zone grid {}x{} holds a single room",
                self.grid_width, self.grid_height
            )));
        }
        if let LayoutKind::Partition { max_rooms } = self.layout {
            if max_rooms < 2 {
                return Err(GenError::Layout(format!(
                    "partition needs room for at least 2 rooms, not {max_rooms}"
                )));
            }
        }
        if self.tunnel_costs.empty < 0.0
            || self.tunnel_costs.wall < 0.0
            || self.tunnel_costs.double_wall < 0.0
        {
            return Err(GenError::Layout("tunnel costs must not be negative".into()));
        }
        Ok(())
    }
}

//! Room-and-tunnel dungeon level generation.
//!
//! A level is built in five steps, all driven by one [`RandomSource`]:
//!
//! 1. a [`layout`] builder places rectangular [`Room`]s;
//! 2. a [`ConnectionGraph`] links them until every room is reachable;
//! 3. the rooms are drawn onto a [`Level`];
//! 4. a [`Tunneler`] digs a corridor for every link;
//! 5. up and down staircases are placed.
//!
//! [`generate`] runs the whole pipeline from a [`LevelConfig`]. The result
//! prints as ASCII with [`Level::strings`] or [`Level::show`].

pub mod config;
pub mod connect;
pub mod error;
pub mod generate;
pub mod layout;
pub mod level;
pub mod random;
pub mod room;
pub mod space;
pub mod stairs;
pub mod terrain;
pub mod tunnel;

pub use config::{LayoutKind, LevelConfig};
pub use connect::{ConnectionGraph, EdgeOrder, RoomConnection, Topology};
pub use error::{ConnectivityError, GenError, GeometryError, RoomError};
pub use generate::generate;
pub use level::{Level, Node};
pub use random::{RandomSource, RngSource, ScriptedRandom};
pub use room::{Room, Staircase};
pub use space::{TravelSpace, TunnelCosts, TunnelSpace};
pub use terrain::Terrain;
pub use tunnel::Tunneler;

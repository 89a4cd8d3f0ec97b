//! The full generation pipeline.

use crate::config::{LayoutKind, LevelConfig};
use crate::connect::ConnectionGraph;
use crate::error::GenError;
use crate::layout::{partition, wiggle, zones};
use crate::level::Level;
use crate::random::RandomSource;
use crate::stairs;
use crate::tunnel::Tunneler;

/// Generate one level.
///
/// Rooms are laid out, linked into a connected graph, drawn, joined by
/// tunnels and given staircases. Every random decision comes from
/// `random`, in a fixed order, so the same source always yields the same
/// level.
///
/// Fails with a retryable error (see [`GenError::is_retryable`]) when the
/// layout or the room graph cannot be completed, or when an abandoned
/// tunnel leaves a room unreachable.
pub fn generate(config: &LevelConfig, random: &mut impl RandomSource) -> Result<Level, GenError> {
    config.validate()?;

    let mut rooms = match config.layout {
        LayoutKind::Zones => zones::build_rooms(
            random,
            config.width,
            config.height,
            config.grid_width,
            config.grid_height,
        )?,
        LayoutKind::Partition { max_rooms } => {
            partition::build_rooms(random, config.width, config.height, max_rooms)?
        }
        LayoutKind::Wiggle { iterations } => wiggle::build_rooms(
            random,
            config.width,
            config.height,
            config.grid_width,
            config.grid_height,
            iterations,
        )?,
    };
    log::debug!("layout: {} rooms ({:?})", rooms.len(), config.layout);

    if !config.layout.zoned_stairs() {
        stairs::place_room_stairs(&mut rooms, random, config.up_stairs, config.down_stairs)?;
    }

    let mut edges = {
        let topology = config.layout.topology(config.grid_width, config.grid_height);
        let mut graph = ConnectionGraph::new(&rooms, topology)?;
        graph.connect(random, config.failure_budget)?;
        graph.edges(config.edge_order)
    };
    log::debug!("graph: {} connections", edges.len());

    let mut level = Level::from_rooms(rooms)?;
    let mut tunneler = Tunneler::new(level.bounds())
        .with_costs(config.tunnel_costs)
        .with_weights(config.weights)
        .with_max_depth(config.max_depth)
        .with_max_crossings(config.max_crossings);
    tunneler.dig_all(&mut level, &mut edges, random)?;

    if config.layout.zoned_stairs() {
        stairs::place_zone_stairs(
            &mut level,
            random,
            config.grid_width,
            config.grid_height,
            config.up_stairs,
            config.down_stairs,
        )?;
    }

    let unreachable = level.unreachable_rooms();
    if !unreachable.is_empty() {
        if log::log_enabled!(log::Level::Debug) {
            level.label_rooms();
            log::debug!("rooms {unreachable:?} cut off:\n{level}");
        }
        return Err(GenError::Unreachable {
            rooms: unreachable,
            failed: level.failed_connections().to_vec(),
        });
    }
    log::debug!("level: {}x{} done", level.width(), level.height());
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{RngSource, ScriptedRandom};
    use crate::terrain::Terrain;

    #[test]
    fn scripted_zone_level_uses_a_fixed_number_of_draws() {
        let config = LevelConfig::new(20, 20, 3, 3);
        let mut random = ScriptedRandom::new(0..100);
        let level = generate(&config, &mut random).unwrap();
        assert_eq!(random.consumed(), 82);
        assert_eq!((level.width(), level.height()), (17, 17));
    }

    #[test]
    fn seeded_levels_repeat() {
        let config = LevelConfig::default();
        let a = generate(&config, &mut RngSource::seeded(123));
        let b = generate(&config, &mut RngSource::seeded(123));
        match (a, b) {
            (Ok(a), Ok(b)) => assert_eq!(a.strings(), b.strings()),
            (Err(a), Err(b)) => assert_eq!(a, b),
            _ => panic!("same seed, different outcome"),
        }
    }

    #[test]
    fn every_layout_produces_connected_levels() {
        let layouts = [LayoutKind::Zones, LayoutKind::partition(), LayoutKind::wiggle()];
        for layout in layouts {
            let config = LevelConfig::new(80, 40, 4, 3).with_layout(layout);
            let mut built = 0;
            for seed in 0..20 {
                match generate(&config, &mut RngSource::seeded(seed)) {
                    Ok(level) => {
                        built += 1;
                        assert!(level.unreachable_rooms().is_empty());
                        assert_eq!(level.count(Terrain::UpStairs), 1);
                        assert_eq!(level.count(Terrain::DownStairs), 1);
                    }
                    Err(err) => assert!(err.is_retryable(), "{layout:?}: {err}"),
                }
            }
            assert!(built > 0, "{layout:?} never succeeded");
        }
    }

    #[test]
    fn stairs_can_be_left_out() {
        let mut config = LevelConfig::new(40, 40, 2, 2);
        config.up_stairs = false;
        for seed in 0..5 {
            if let Ok(level) = generate(&config, &mut RngSource::seeded(seed)) {
                assert_eq!(level.count(Terrain::UpStairs), 0);
                assert_eq!(level.count(Terrain::DownStairs), 1);
            }
        }
    }

    #[test]
    fn bad_config_is_a_layout_error() {
        let config = LevelConfig::new(10, 10, 5, 5);
        let err = generate(&config, &mut RngSource::seeded(1)).unwrap_err();
        assert!(matches!(err, GenError::Layout(_)));
    }
}

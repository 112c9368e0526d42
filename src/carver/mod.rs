mod backtrack;

pub use backtrack::carve;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::maze::{GridTopology, TopologyError};

/// Get a random number generator, optionally seeded for reproducibility.
pub fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Allocates a fresh topology and carves a maze into it.
///
/// The carve start is drawn uniformly over all cells. It has no bearing on
/// where a consumer places its entry and goal markers: the finished maze is
/// fully connected, so any pair of cells is joined by a path of open edges.
pub fn generate(rows: u8, columns: u8, seed: Option<u64>) -> Result<GridTopology, TopologyError> {
    let mut topology = GridTopology::new(rows, columns)?;
    let mut rng = get_rng(seed);
    let start = (rng.random_range(0..rows), rng.random_range(0..columns));
    tracing::debug!("carving {}x{} maze from {:?}", rows, columns, start);
    carve(&mut topology, start, &mut rng)?;
    Ok(topology)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_validates_dimensions() {
        assert_eq!(
            generate(0, 3, Some(0)).unwrap_err(),
            TopologyError::InvalidDimensions { rows: 0, columns: 3 }
        );
    }

    #[test]
    fn test_generate_is_deterministic_per_seed() {
        let a = generate(9, 12, Some(42)).unwrap();
        let b = generate(9, 12, Some(42)).unwrap();
        assert!(
            a.horizontal_edges().eq(b.horizontal_edges()),
            "same seed must open the same horizontal edges"
        );
        assert!(
            a.vertical_edges().eq(b.vertical_edges()),
            "same seed must open the same vertical edges"
        );
    }
}

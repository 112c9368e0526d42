use rand::Rng;

use crate::maze::{Direction, GridTopology, TopologyError};

/// A cell being explored, with its direction candidates in the order they
/// will be tried. Shuffled once when the cell is entered.
struct Frame {
    cell: (u8, u8),
    candidates: [Direction; 4],
    next: usize,
}

impl Frame {
    fn enter(
        topology: &mut GridTopology,
        cell: (u8, u8),
        rng: &mut impl Rng,
    ) -> Result<Self, TopologyError> {
        topology.mark_visited(cell)?;
        let mut candidates = Direction::ALL;
        fisher_yates(&mut candidates, rng);
        Ok(Frame {
            cell,
            candidates,
            next: 0,
        })
    }
}

/// Unbiased Fisher-Yates shuffle: walk from the last index down to 1 and swap
/// each element with a partner drawn uniformly from the prefix up to and
/// including itself.
fn fisher_yates<T>(items: &mut [T], rng: &mut impl Rng) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Carves a spanning maze into `topology` by randomized depth-first traversal
/// from `start`.
///
/// Each cell is visited exactly once; an edge is only opened toward a
/// neighbor that is still unvisited when it is considered, so the open-edge
/// set forms a tree: exactly `rows * columns - 1` edges end up open, every
/// cell is reachable from `start`, and any two cells are joined by a unique
/// path.
///
/// Fails with [`TopologyError::IndexOutOfBounds`] if `start` lies outside
/// the grid.
pub fn carve(
    topology: &mut GridTopology,
    start: (u8, u8),
    rng: &mut impl Rng,
) -> Result<(), TopologyError> {
    if !topology.in_bounds(start) {
        return Err(TopologyError::IndexOutOfBounds {
            row: start.0,
            column: start.1,
        });
    }

    // Explicit stack instead of call recursion, so the traversal depth is
    // bounded by rows * columns frames rather than the thread stack.
    // Popping a frame whose candidates are exhausted is the backtrack step.
    let mut stack = vec![Frame::enter(topology, start, rng)?];

    while let Some(frame) = stack.last_mut() {
        if frame.next >= frame.candidates.len() {
            stack.pop();
            continue;
        }
        let direction = frame.candidates[frame.next];
        frame.next += 1;
        let cell = frame.cell;

        let neighbor = direction.step(cell);
        // A neighbor may have been claimed by a deeper branch since this
        // frame was entered, so visited is checked now, not at entry.
        if !topology.in_bounds(neighbor) || topology.is_visited(neighbor)? {
            continue;
        }

        topology.open_toward(cell, direction)?;
        stack.push(Frame::enter(topology, neighbor, rng)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carver::get_rng;
    use std::collections::{HashMap, VecDeque};

    /// Breadth-first count of cells reachable from `start` via open edges.
    fn reachable_cells(topology: &GridTopology, start: (u8, u8)) -> usize {
        let columns = topology.columns() as usize;
        let index = |(r, c): (u8, u8)| r as usize * columns + c as usize;
        let mut seen = vec![false; topology.rows() as usize * columns];
        seen[index(start)] = true;
        let mut queue = VecDeque::from([start]);
        let mut count = 0;
        while let Some(cell) = queue.pop_front() {
            count += 1;
            for direction in Direction::ALL {
                let neighbor = direction.step(cell);
                if !topology.in_bounds(neighbor) || seen[index(neighbor)] {
                    continue;
                }
                if topology.is_open_toward(cell, direction).unwrap() {
                    seen[index(neighbor)] = true;
                    queue.push_back(neighbor);
                }
            }
        }
        count
    }

    #[test]
    fn test_spanning_tree_over_assorted_grids() {
        for (rows, columns) in [(1, 1), (1, 8), (8, 1), (2, 2), (5, 7), (16, 16)] {
            for seed in 0..8 {
                let mut topology = GridTopology::new(rows, columns).unwrap();
                let mut rng = get_rng(Some(seed));
                let start = (
                    rng.random_range(0..rows),
                    rng.random_range(0..columns),
                );
                carve(&mut topology, start, &mut rng).unwrap();

                let cells = rows as usize * columns as usize;
                assert_eq!(
                    topology.open_edge_count(),
                    cells - 1,
                    "{rows}x{columns} seed {seed}: a spanning tree opens exactly cells - 1 edges"
                );
                assert_eq!(
                    reachable_cells(&topology, start),
                    cells,
                    "{rows}x{columns} seed {seed}: every cell must be reachable from the start"
                );
                // Connectivity is start-independent
                assert_eq!(reachable_cells(&topology, (0, 0)), cells);
            }
        }
    }

    #[test]
    fn test_every_cell_visited() {
        let mut topology = GridTopology::new(6, 6).unwrap();
        let mut rng = get_rng(Some(3));
        carve(&mut topology, (2, 4), &mut rng).unwrap();
        for row in 0..6 {
            for column in 0..6 {
                assert!(topology.is_visited((row, column)).unwrap());
            }
        }
    }

    #[test]
    fn test_corridor_opens_every_edge() {
        // A 1xN grid has exactly N-1 potential edges; the spanning tree
        // needs them all.
        let mut topology = GridTopology::new(1, 6).unwrap();
        carve(&mut topology, (0, 3), &mut get_rng(Some(0))).unwrap();
        assert!(topology.vertical_edges().all(|(_, open)| open));

        let mut topology = GridTopology::new(6, 1).unwrap();
        carve(&mut topology, (0, 0), &mut get_rng(Some(0))).unwrap();
        assert!(topology.horizontal_edges().all(|(_, open)| open));
    }

    #[test]
    fn test_single_cell_maze() {
        let mut topology = GridTopology::new(1, 1).unwrap();
        carve(&mut topology, (0, 0), &mut get_rng(Some(0))).unwrap();
        assert_eq!(topology.open_edge_count(), 0);
        assert_eq!(reachable_cells(&topology, (0, 0)), 1);
    }

    #[test]
    fn test_two_by_two_leaves_one_wall() {
        // 4 potential edges, 3 opened: exactly one interior wall remains,
        // whichever order the candidates came out in.
        for seed in 0..32 {
            let mut topology = GridTopology::new(2, 2).unwrap();
            carve(&mut topology, (0, 0), &mut get_rng(Some(seed))).unwrap();
            assert_eq!(topology.open_edge_count(), 3);
            assert_eq!(reachable_cells(&topology, (0, 0)), 4);
        }
    }

    #[test]
    fn test_rejects_out_of_range_start() {
        let mut topology = GridTopology::new(4, 5).unwrap();
        let mut rng = get_rng(Some(0));
        assert_eq!(
            carve(&mut topology, (4, 0), &mut rng).unwrap_err(),
            TopologyError::IndexOutOfBounds { row: 4, column: 0 }
        );
        assert_eq!(
            carve(&mut topology, (0, 5), &mut rng).unwrap_err(),
            TopologyError::IndexOutOfBounds { row: 0, column: 5 }
        );
        // A failed start leaves the topology untouched
        assert_eq!(topology.open_edge_count(), 0);
    }

    #[test]
    fn test_carve_is_deterministic_given_rng_state() {
        let mut first = GridTopology::new(7, 9).unwrap();
        carve(&mut first, (3, 3), &mut get_rng(Some(99))).unwrap();
        let mut second = GridTopology::new(7, 9).unwrap();
        carve(&mut second, (3, 3), &mut get_rng(Some(99))).unwrap();
        assert!(first.horizontal_edges().eq(second.horizontal_edges()));
        assert!(first.vertical_edges().eq(second.vertical_edges()));
    }

    #[test]
    fn test_fisher_yates_is_uniform() {
        // Shuffle a 4-element slice many times and check that all 24
        // permutations show up at roughly equal frequency.
        const TRIALS: usize = 24_000;
        let mut rng = get_rng(Some(7));
        let mut counts: HashMap<[u8; 4], usize> = HashMap::new();
        for _ in 0..TRIALS {
            let mut items = [0u8, 1, 2, 3];
            fisher_yates(&mut items, &mut rng);
            *counts.entry(items).or_default() += 1;
        }
        assert_eq!(counts.len(), 24);
        let expected = TRIALS / 24;
        for (permutation, count) in counts {
            assert!(
                count > expected * 4 / 5 && count < expected * 6 / 5,
                "permutation {:?} occurred {} times, expected about {}",
                permutation,
                count,
                expected
            );
        }
    }
}

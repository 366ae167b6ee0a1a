//! Weighted, non-repeating choice of one entry from a text group.

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::Rng;

use crate::schema::text::TextEntry;

/// Outcome of a draw over one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Index into the group slice.
    pub index: usize,
    /// False for single-entry groups, which bypass repeat tracking.
    pub tracked: bool,
    /// True when every candidate was recently used and the window had to
    /// be reset for this draw.
    pub window_reset: bool,
}

/// Pick an entry from `entries`, avoiding ids in `recent`.
///
/// Zero-weight entries are never drawn unless the whole group has zero
/// weight, in which case all entries are equally likely. When `recent`
/// covers every candidate, the draw ignores the window except for its last
/// id, so the same line is never spoken twice in a row while an alternative
/// exists.
pub fn select(entries: &[TextEntry], recent: &[u8], rng: &mut StdRng) -> Option<Selection> {
    match entries.len() {
        0 => return None,
        1 => {
            return Some(Selection {
                index: 0,
                tracked: false,
                window_reset: false,
            })
        }
        _ => {}
    }

    let all_zero = entries.iter().all(|e| !e.is_drawable());
    let eligible: Vec<usize> = (0..entries.len())
        .filter(|&i| all_zero || entries[i].is_drawable())
        .collect();

    let mut window_reset = false;
    let mut pool: Vec<usize> = eligible
        .iter()
        .copied()
        .filter(|&i| !recent.contains(&entries[i].id))
        .collect();

    if pool.is_empty() {
        window_reset = true;
        let last = recent.last().copied();
        pool = eligible
            .iter()
            .copied()
            .filter(|&i| Some(entries[i].id) != last)
            .collect();
        if pool.is_empty() {
            pool = eligible;
        }
    }

    let pick = if all_zero {
        rng.gen_range(0..pool.len())
    } else {
        pick_weighted(entries, &pool, rng)
    };

    Some(Selection {
        index: pool[pick],
        tracked: true,
        window_reset,
    })
}

/// Weighted pick over `pool`, normalized over the pool's weights.
fn pick_weighted(entries: &[TextEntry], pool: &[usize], rng: &mut StdRng) -> usize {
    let weights: Vec<f32> = pool.iter().map(|&i| entries[i].weight).collect();
    let first = weights[0];
    if weights.iter().all(|&w| w == first) {
        return rng.gen_range(0..pool.len());
    }
    match WeightedIndex::new(&weights) {
        Ok(dist) => dist.sample(rng),
        Err(_) => rng.gen_range(0..pool.len()),
    }
}

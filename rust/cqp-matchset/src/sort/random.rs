//! Randomized display order.

use cqp_common::{Result, error::Error};

use super::{interrupt::InterruptFlag, try_sort_by};
use crate::{
    interval::{Interval, try_with_capacity},
    range_set::RangeSet,
};

/// Gives `set` a random display order.
///
/// Without a seed (or with seed `0`) the keys come from the thread-local
/// generator and differ between calls. With a seed, every entry's key is
/// derived from the seed and the entry's own bounds, so identical sets get
/// identical orders across runs. Equal keys fall back to canonical order.
pub fn randomize(set: &mut RangeSet, seed: Option<u64>, interrupt: &InterruptFlag) -> Result<()> {
    let n = set.len();
    let mut keys = try_with_capacity::<u64>(n)?;
    match seed {
        None | Some(0) => keys.extend((0..n).map(|_| fastrand::u64(..))),
        Some(seed) => keys.extend(set.ranges().iter().map(|r| seeded_key(seed, r))),
    }

    let mut perm = try_with_capacity::<usize>(n)?;
    perm.extend(0..n);
    let ranges = set.ranges();
    let sorted = try_sort_by(&mut perm, |a, b| {
        if !interrupt.is_running() {
            return Err(Error::interrupted("randomize"));
        }
        Ok(keys[a]
            .cmp(&keys[b])
            .then(ranges[a].start.cmp(&ranges[b].start))
            .then(ranges[b].end.cmp(&ranges[a].end)))
    })
    .and_then(|()| {
        if interrupt.is_running() {
            Ok(())
        } else {
            Err(Error::interrupted("randomize"))
        }
    });

    if let Err(e) = sorted {
        set.reset_sort();
        log::warn!("randomize of {} failed, default order restored: {e}", set.name());
        return Err(e);
    }
    log::debug!("range set {}: randomized {n} entries (seed: {seed:?})", set.name());
    set.sort_index = Some(perm);
    Ok(())
}

fn seeded_key(seed: u64, range: &Interval) -> u64 {
    let bounds = ((range.start as u32 as u64) << 32) | range.end as u32 as u64;
    fastrand::Rng::with_seed(seed ^ bounds.wrapping_mul(0x9e37_79b9_7f4a_7c15)).u64(..)
}

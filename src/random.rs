use bracket_random::prelude::RandomNumberGenerator;

pub fn uniform_int(rng: &mut RandomNumberGenerator, min: i32, max: i32) -> i32 {
    if max <= min {
        return min;
    }
    rng.range(min, max + 1)
}

pub fn coin_flip(rng: &mut RandomNumberGenerator) -> bool {
    uniform_int(rng, 0, 1) == 1
}

/// Picks an index with probability proportional to its weight.
///
/// Rolls `d` in `[1, sum]` and returns the first index whose running total
/// reaches `d`. Returns `None` when the weights sum to zero.
pub fn weighted_index(rng: &mut RandomNumberGenerator, weights: &[u32]) -> Option<usize> {
    let total: u32 = weights.iter().sum();
    if total == 0 {
        return None;
    }
    let dice = uniform_int(rng, 1, total as i32) as u32;
    let mut running = 0;
    for (idx, weight) in weights.iter().enumerate() {
        running += weight;
        if dice <= running {
            return Some(idx);
        }
    }
    None
}

pub fn weighted_choice<'a, K>(
    rng: &mut RandomNumberGenerator,
    chances: &'a [(K, u32)],
) -> Option<&'a K> {
    let weights: Vec<u32> = chances.iter().map(|(_, weight)| *weight).collect();
    weighted_index(rng, &weights).map(|idx| &chances[idx].0)
}

use rand::Rng;
use rand::seq::SliceRandom;

/// Draw one label with probability `weight / total`.
///
/// Labels are scanned in table order; the first whose running weight sum
/// exceeds a uniform draw in `[0, total)` wins. Non-positive weights are
/// never selected. Returns `None` when no label has positive weight.
pub fn weighted_pick<'a, L, R>(table: &'a [(L, f64)], rng: &mut R) -> Option<&'a L>
where
    R: Rng + ?Sized,
{
    let total: f64 = table
        .iter()
        .map(|(_, w)| *w)
        .filter(|w| *w > 0.0)
        .sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let draw = rng.gen_range(0.0..total);
    let mut running = 0.0;
    let mut last_positive = None;
    for (label, weight) in table {
        if *weight <= 0.0 {
            continue;
        }
        running += *weight;
        last_positive = Some(label);
        if draw < running {
            return Some(label);
        }
    }

    // Rounding can leave the draw a hair above the final sum.
    last_positive
}

/// Uniform pick from a non-empty slice.
pub fn uniform_pick<'a, T, R>(items: &'a [T], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    items.choose(rng)
}

//! Choosing which provider site a charger corresponds to.

use evmap_core::MatchTolerance;

/// The candidates forming the site nearest to the charger, nearest first.
///
/// Candidates further than `max_distance_m` are ignored. Those for which
/// `same_site(nearest, candidate)` holds join the nearest one; any other
/// candidate within `ambiguity_margin_m` of the nearest distance makes the
/// choice ambiguous.
///
/// # Errors
///
/// Returns a reason string when nothing is in range or the match is
/// ambiguous.
pub(crate) fn nearest_site<'a, T>(
    candidates: &'a [T],
    distance_m: impl Fn(&T) -> f64,
    same_site: impl Fn(&T, &T) -> bool,
    tolerance: &MatchTolerance,
) -> Result<Vec<&'a T>, String> {
    let in_range: Vec<(&T, f64)> = candidates
        .iter()
        .map(|c| (c, distance_m(c)))
        .filter(|(_, d)| *d <= tolerance.max_distance_m)
        .collect();

    let Some(&(nearest, nearest_distance)) = in_range.iter().min_by(|a, b| a.1.total_cmp(&b.1))
    else {
        return Err(format!(
            "no location within {} m of the charger",
            tolerance.max_distance_m
        ));
    };

    let mut site = vec![nearest];
    for &(candidate, distance) in &in_range {
        if std::ptr::eq(candidate, nearest) {
            continue;
        }
        if same_site(nearest, candidate) {
            site.push(candidate);
        } else if distance - nearest_distance <= tolerance.ambiguity_margin_m {
            return Err(format!(
                "two sites are equally close ({nearest_distance:.1} m and {distance:.1} m)"
            ));
        }
    }
    Ok(site)
}

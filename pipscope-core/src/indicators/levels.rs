//! Support and resistance clusters.
//!
//! A bar is a resistance candidate when its high is strictly above the high of
//! every bar within `lookback` on either side, and a support candidate when its
//! low is strictly below every neighbouring low. Candidates of the same kind
//! within `tolerance` relative distance merge into one cluster: the price moves
//! to the midpoint of the cluster and the new candidate, strength counts merges.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, LevelKind};

/// A clustered price level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub kind: LevelKind,
    pub strength: u32,
}

/// Detect support/resistance clusters, strongest first.
///
/// Needs at least `2 * lookback + 1` bars; returns an empty list otherwise.
/// Ties in strength keep discovery order.
pub fn support_resistance(
    bars: &[Bar],
    lookback: usize,
    tolerance: f64,
    max_levels: usize,
) -> Vec<PriceLevel> {
    let n = bars.len();
    if n < lookback * 2 + 1 {
        return Vec::new();
    }

    let mut clusters: Vec<PriceLevel> = Vec::new();
    for i in lookback..(n - lookback) {
        let bar = &bars[i];
        let neighbours = bars[i - lookback..i]
            .iter()
            .chain(&bars[i + 1..=i + lookback]);

        let (mut is_high, mut is_low) = (true, true);
        for other in neighbours {
            if bar.high <= other.high {
                is_high = false;
            }
            if bar.low >= other.low {
                is_low = false;
            }
        }

        if is_high {
            merge_candidate(&mut clusters, bar.high, LevelKind::Resistance, tolerance);
        }
        if is_low {
            merge_candidate(&mut clusters, bar.low, LevelKind::Support, tolerance);
        }
    }

    clusters.sort_by(|a, b| b.strength.cmp(&a.strength));
    clusters.truncate(max_levels);
    clusters
}

fn merge_candidate(clusters: &mut Vec<PriceLevel>, price: f64, kind: LevelKind, tolerance: f64) {
    let existing = clusters
        .iter_mut()
        .find(|c| c.kind == kind && ((c.price - price).abs() / price) < tolerance);

    match existing {
        Some(cluster) => {
            cluster.strength += 1;
            cluster.price = (cluster.price + price) / 2.0;
        }
        None => clusters.push(PriceLevel {
            price,
            kind,
            strength: 1,
        }),
    }
}

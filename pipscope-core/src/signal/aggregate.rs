//! Reduce a vote list to a label and a confidence score.

use crate::domain::{SignalLabel, Vote};

/// Mean of all vote values; 0 for an empty list.
pub fn average(votes: &[Vote]) -> f64 {
    if votes.is_empty() {
        return 0.0;
    }
    votes.iter().map(|v| f64::from(v.value)).sum::<f64>() / votes.len() as f64
}

/// Thresholds: ≥1.5 Strong Buy, ≥0.5 Buy, ≤-1.5 Strong Sell, ≤-0.5 Sell.
pub fn classify(avg: f64) -> SignalLabel {
    if avg >= 1.5 {
        SignalLabel::StrongBuy
    } else if avg >= 0.5 {
        SignalLabel::Buy
    } else if avg <= -1.5 {
        SignalLabel::StrongSell
    } else if avg <= -0.5 {
        SignalLabel::Sell
    } else {
        SignalLabel::Neutral
    }
}

/// Fraction of votes whose sign matches the sign of `avg`.
///
/// Zero votes disagree with a non-zero average and agree with a zero one.
pub fn agreement_ratio(votes: &[Vote], avg: f64) -> f64 {
    if votes.is_empty() {
        return 0.0;
    }
    let target = sign(avg);
    let disagreeing = votes
        .iter()
        .filter(|v| sign(f64::from(v.value)) != target)
        .count();
    1.0 - disagreeing as f64 / votes.len() as f64
}

/// `min(100, round(|avg| * 25 + agreement * 75))`.
pub fn confidence(votes: &[Vote], avg: f64) -> u8 {
    let raw = (avg.abs() * 25.0 + agreement_ratio(votes, avg) * 75.0).round();
    raw.clamp(0.0, 100.0) as u8
}

/// Label and confidence for a vote list.
pub fn aggregate(votes: &[Vote]) -> (SignalLabel, u8) {
    let avg = average(votes);
    (classify(avg), confidence(votes, avg))
}

fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

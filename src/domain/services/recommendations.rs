use std::cmp::Ordering;

use serde::Serialize;

const PLAYER_FIT_OPTIMAL: f64 = 40.0;
const PLAYER_FIT_SUPPORTED: f64 = 30.0;
const PLAYER_FIT_NEAR: f64 = 10.0;
const RATING_MAX: f64 = 25.0;
const VOTES_MAX: f64 = 10.0;

/// Scoring input for one proposed game.
#[derive(Debug, Clone)]
pub struct GameCandidate {
    pub event_game_id: String,
    pub name: String,
    pub min_players: i32,
    pub max_players: i32,
    pub catalog_rating: Option<f64>,
    pub participant_ratings: Vec<f64>,
    pub votes: i64,
}

#[derive(Debug, Serialize, Clone)]
pub struct GameRecommendation {
    pub event_game_id: String,
    pub name: String,
    pub score: f64,
    pub reasons: Vec<String>,
}

/// Scores every candidate for the target player count and returns them in
/// descending score order. The sort is stable, so equal scores keep the
/// caller's order.
pub fn recommend_games(candidates: &[GameCandidate], player_count: i32) -> Vec<GameRecommendation> {
    let mut recommendations: Vec<GameRecommendation> = candidates
        .iter()
        .map(|c| {
            let (score, reasons) = score_game(c, player_count);
            GameRecommendation {
                event_game_id: c.event_game_id.clone(),
                name: c.name.clone(),
                score,
                reasons,
            }
        })
        .collect();

    recommendations.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    recommendations
}

/// Additive four-factor score in [0, 100]. Each factor is capped so partial
/// signals never dominate the total.
fn score_game(candidate: &GameCandidate, player_count: i32) -> (f64, Vec<String>) {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    // Factor 1: player count fit (max 40). Full points inside the inner
    // quartile of the supported range, 10 points one seat outside it.
    if player_count >= candidate.min_players && player_count <= candidate.max_players {
        let span = candidate.max_players - candidate.min_players;
        let optimal_min = candidate.min_players + (span as f64 * 0.25).floor() as i32;
        let optimal_max = candidate.min_players + (span as f64 * 0.75).floor() as i32;

        if player_count >= optimal_min && player_count <= optimal_max {
            score += PLAYER_FIT_OPTIMAL;
            reasons.push("Optimal player count".to_string());
        } else {
            score += PLAYER_FIT_SUPPORTED;
            reasons.push("Supports the player count".to_string());
        }
    } else if player_count == candidate.min_players - 1 || player_count == candidate.max_players + 1 {
        score += PLAYER_FIT_NEAR;
        reasons.push("Just outside the supported player range".to_string());
    }

    // Factor 2: external catalog rating (max 25).
    if let Some(rating) = candidate.catalog_rating {
        score += (rating / 10.0 * RATING_MAX).min(RATING_MAX);
        if rating >= 7.5 {
            reasons.push(format!("Highly rated in the catalog ({:.1})", rating));
        }
    }

    // Factor 3: participant-submitted ratings (max 25).
    if !candidate.participant_ratings.is_empty() {
        let avg = candidate.participant_ratings.iter().sum::<f64>() / candidate.participant_ratings.len() as f64;
        score += (avg / 10.0 * RATING_MAX).min(RATING_MAX);
        if avg >= 7.0 {
            reasons.push("Well rated by participants".to_string());
        }
    }

    // Factor 4: thumbs-up balance (max 10).
    if candidate.votes > 0 {
        score += (candidate.votes as f64 * 2.0).min(VOTES_MAX);
        reasons.push(format!("{} vote(s) in favor", candidate.votes));
    }

    (score, reasons)
}

/// Ranking input for one proposed date.
#[derive(Debug, Clone)]
pub struct DateCandidate {
    pub date_id: String,
    pub proposed_date: String,
    pub available_count: i64,
}

#[derive(Debug, Serialize, Clone)]
pub struct DateRecommendation {
    pub date_id: String,
    pub proposed_date: String,
    pub available_count: i64,
    pub percentage: i64,
}

/// Orders dates by absolute availability, best first. The percentage against
/// the attending participant count is informational only and never affects
/// the order; a zero denominator yields 0.
pub fn recommend_dates(candidates: &[DateCandidate], total_participants: usize) -> Vec<DateRecommendation> {
    let mut recommendations: Vec<DateRecommendation> = candidates
        .iter()
        .map(|c| {
            let percentage = if total_participants > 0 {
                (c.available_count as f64 / total_participants as f64 * 100.0).round() as i64
            } else {
                0
            };
            DateRecommendation {
                date_id: c.date_id.clone(),
                proposed_date: c.proposed_date.clone(),
                available_count: c.available_count,
                percentage,
            }
        })
        .collect();

    recommendations.sort_by(|a, b| b.available_count.cmp(&a.available_count));
    recommendations
}

use chrono::Utc;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Service responsible for keeping event standings in sync with match
/// results. Standings are fully recomputed from the event's completed
/// matches, so re-recording a result is idempotent.
#[derive(Debug)]
pub struct StandingsService {
    pool: PgPool,
}

/// Final score of a completed match.
#[derive(Debug, FromRow, Clone)]
pub struct MatchScore {
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub home_score: i32,
    pub away_score: i32,
}

/// Accumulated results for one team, before positions are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamTally {
    pub team_id: Uuid,
    pub played: i32,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub points: i32,
}

impl TeamTally {
    fn new(team_id: Uuid) -> Self {
        Self {
            team_id,
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            points: 0,
        }
    }

    pub fn goal_difference(&self) -> i32 {
        self.goals_for - self.goals_against
    }

    fn record(&mut self, scored: i32, conceded: i32) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        if scored > conceded {
            self.won += 1;
            self.points += 3;
        } else if scored < conceded {
            self.lost += 1;
        } else {
            self.drawn += 1;
            self.points += 1;
        }
    }
}

/// Fold match scores into one tally per team, ordered by points desc,
/// goal difference desc, goals for desc. The returned index is the
/// table position minus one.
pub fn tally_results(results: &[MatchScore]) -> Vec<TeamTally> {
    let mut tallies: Vec<TeamTally> = Vec::new();

    let entry = |team_id: Uuid, tallies: &mut Vec<TeamTally>| -> usize {
        match tallies.iter().position(|t| t.team_id == team_id) {
            Some(idx) => idx,
            None => {
                tallies.push(TeamTally::new(team_id));
                tallies.len() - 1
            }
        }
    };

    for result in results {
        let home = entry(result.home_team_id, &mut tallies);
        tallies[home].record(result.home_score, result.away_score);
        let away = entry(result.away_team_id, &mut tallies);
        tallies[away].record(result.away_score, result.home_score);
    }

    tallies.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference().cmp(&a.goal_difference()))
            .then(b.goals_for.cmp(&a.goals_for))
    });
    tallies
}

impl StandingsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Rebuild the standings table for an event from its completed matches.
    pub async fn recompute_for_event(&self, event_id: Uuid) -> Result<(), sqlx::Error> {
        let results: Vec<MatchScore> = sqlx::query_as(
            r#"
            SELECT home_team_id, away_team_id, home_score, away_score
            FROM matches
            WHERE event_id = $1
              AND status = 'COMPLETED'
              AND home_score IS NOT NULL
              AND away_score IS NOT NULL
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        let table = tally_results(&results);
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM standings WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        for (index, tally) in table.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO standings (
                    id, event_id, team_id, position, played, won, drawn, lost,
                    goals_for, goals_against, goal_difference, points, last_updated
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(event_id)
            .bind(tally.team_id)
            .bind((index + 1) as i32)
            .bind(tally.played)
            .bind(tally.won)
            .bind(tally.drawn)
            .bind(tally.lost)
            .bind(tally.goals_for)
            .bind(tally.goals_against)
            .bind(tally.goal_difference())
            .bind(tally.points)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Recomputed standings for event {}: {} teams over {} results",
            event_id,
            table.len(),
            results.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(home: Uuid, away: Uuid, hs: i32, aws: i32) -> MatchScore {
        MatchScore {
            home_team_id: home,
            away_team_id: away,
            home_score: hs,
            away_score: aws,
        }
    }

    #[test]
    fn win_awards_three_points_and_goal_difference() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let table = tally_results(&[score(a, b, 2, 1)]);

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].team_id, a);
        assert_eq!(table[0].points, 3);
        assert_eq!(table[0].won, 1);
        assert_eq!(table[0].goal_difference(), 1);
        assert_eq!(table[1].team_id, b);
        assert_eq!(table[1].points, 0);
        assert_eq!(table[1].lost, 1);
        assert_eq!(table[1].goal_difference(), -1);
    }

    #[test]
    fn draw_awards_one_point_each() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let table = tally_results(&[score(a, b, 1, 1)]);

        assert_eq!(table[0].points, 1);
        assert_eq!(table[1].points, 1);
        assert_eq!(table[0].drawn, 1);
        assert_eq!(table[1].drawn, 1);
    }

    #[test]
    fn equal_points_rank_by_goal_difference_then_goals_for() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let d = Uuid::new_v4();
        // a and c both win once: a by 3-0, c by 2-1.
        let table = tally_results(&[score(a, b, 3, 0), score(c, d, 2, 1)]);

        assert_eq!(table[0].team_id, a);
        assert_eq!(table[1].team_id, c);
    }

    #[test]
    fn results_accumulate_across_matches() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let table = tally_results(&[score(a, b, 2, 0), score(b, a, 1, 1)]);

        let top = &table[0];
        assert_eq!(top.team_id, a);
        assert_eq!(top.played, 2);
        assert_eq!(top.points, 4);
        assert_eq!(top.goals_for, 3);
        assert_eq!(top.goals_against, 1);
    }

    #[test]
    fn empty_results_produce_empty_table() {
        assert!(tally_results(&[]).is_empty());
    }
}

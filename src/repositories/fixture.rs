//! # Fixture Repository
//!
//! Matches link a season and two teams. Before any match row is written, the
//! season and both teams are checked to belong to the tenant that will own
//! the match, independently of the row filter that loaded them.

use std::collections::HashMap;

use chrono::{DateTime, Days, FixedOffset, NaiveTime, Utc};
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::fixture::{
    ActiveModel as FixtureActiveModel, Column as FixtureColumn, Entity as Fixture, FixtureStatus,
    Model as FixtureModel,
};
use crate::models::match_event::{
    ActiveModel as MatchEventActiveModel, Column as MatchEventColumn, Entity as MatchEvent,
    MatchEventType, Model as MatchEventModel,
};
use crate::models::player::Entity as Player;
use crate::models::season::{Entity as Season, Model as SeasonModel};
use crate::models::team::{Column as TeamColumn, Entity as Team, Model as TeamModel};
use crate::repositories::player::PlayerRepository;
use crate::repositories::season::SeasonRepository;
use crate::repositories::tenant_settings::TenantSettingsRepository;
use crate::tenancy::{ScopedConn, TenantId, TenantLinks, tenant_of};

const KICKOFF_HOUR: u32 = 10;
const DAYS_BETWEEN_MATCHDAYS: u64 = 7;
const DEFAULT_SUSPENSION_MATCHDAYS: i32 = 1;

#[derive(Debug, Clone)]
pub struct ScheduleMatchRequest {
    pub season_id: Uuid,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub match_date: DateTime<FixedOffset>,
    pub matchday: Option<i32>,
}

/// One event of a submitted match report.
#[derive(Debug, Clone)]
pub struct ReportEvent {
    pub team_id: Uuid,
    pub player_id: Option<Uuid>,
    pub event_type: MatchEventType,
    /// Red cards only; defaults to one matchday
    pub suspension_matchdays: Option<i32>,
}

/// A finished match with the events that produced its score.
#[derive(Debug, Clone)]
pub struct MatchReport {
    pub fixture: FixtureModel,
    pub events: Vec<MatchEventModel>,
    pub suspended_players: Vec<Uuid>,
}

pub struct FixtureRepository<'a, C = DatabaseConnection> {
    conn: &'a ScopedConn<C>,
}

impl FixtureRepository<'_> {
    /// Builds an unsaved match owned by `owner`.
    ///
    /// Fails with a cross-tenant reference error when the season or either
    /// team belongs to a different tenant, and with a validation error when a
    /// team would play itself.
    pub fn assemble(
        owner: TenantId,
        season: &SeasonModel,
        home: &TeamModel,
        away: &TeamModel,
        match_date: DateTime<FixedOffset>,
        matchday: Option<i32>,
    ) -> Result<FixtureActiveModel, RepositoryError> {
        if home.id == away.id {
            return Err(RepositoryError::invalid_field(
                "away_team_id",
                "A team cannot play itself",
            ));
        }

        TenantLinks::owned_by(owner)
            .link("season_id", tenant_of(season)?)
            .link("home_team_id", tenant_of(home)?)
            .link("away_team_id", tenant_of(away)?)
            .verify()?;

        Ok(FixtureActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(owner.into_uuid()),
            season_id: Set(season.id),
            matchday: Set(matchday),
            home_team_id: Set(home.id),
            away_team_id: Set(away.id),
            match_date: Set(match_date),
            home_score: Set(None),
            away_score: Set(None),
            status: Set(FixtureStatus::Scheduled.as_str().to_string()),
            created_at: Set(Utc::now().into()),
        })
    }
}

impl<'a, C> FixtureRepository<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a ScopedConn<C>) -> Self {
        Self { conn }
    }

    pub async fn schedule_match(
        &self,
        request: ScheduleMatchRequest,
    ) -> Result<FixtureModel, RepositoryError> {
        if request.matchday.is_some_and(|day| day < 1) {
            return Err(RepositoryError::invalid_field(
                "matchday",
                "Matchday starts at 1",
            ));
        }

        let owner = self.conn.writing_tenant::<Fixture>()?;
        let season = self.conn.find_by_id::<Season>(request.season_id).await?;
        let home = self.conn.find_by_id::<Team>(request.home_team_id).await?;
        let away = self.conn.find_by_id::<Team>(request.away_team_id).await?;

        let fixture = FixtureRepository::assemble(
            owner,
            &season,
            &home,
            &away,
            request.match_date,
            request.matchday,
        )?;
        Ok(self.conn.insert::<Fixture>(fixture).await?)
    }

    pub async fn list_season_matches(
        &self,
        season_id: Uuid,
    ) -> Result<Vec<FixtureModel>, RepositoryError> {
        self.conn.find_by_id::<Season>(season_id).await?;
        let fixtures = self
            .conn
            .find_all(
                Fixture::find()
                    .filter(FixtureColumn::SeasonId.eq(season_id))
                    .order_by_asc(FixtureColumn::MatchDate)
                    .order_by_asc(FixtureColumn::Id),
            )
            .await?;
        Ok(fixtures)
    }

    /// Matches of the active season on `matchday`, in kickoff order.
    pub async fn list_matchday_matches(
        &self,
        matchday: i32,
    ) -> Result<Vec<FixtureModel>, RepositoryError> {
        if matchday < 1 {
            return Err(RepositoryError::invalid_field(
                "matchday",
                "Matchday starts at 1",
            ));
        }

        let season = SeasonRepository::new(self.conn)
            .active_season()
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Active season".to_string()))?;
        let fixtures = self
            .conn
            .find_all(
                Fixture::find()
                    .filter(FixtureColumn::SeasonId.eq(season.id))
                    .filter(FixtureColumn::Matchday.eq(matchday))
                    .order_by_asc(FixtureColumn::MatchDate)
                    .order_by_asc(FixtureColumn::Id),
            )
            .await?;
        Ok(fixtures)
    }

    pub async fn record_result(
        &self,
        id: Uuid,
        home_score: i32,
        away_score: i32,
    ) -> Result<FixtureModel, RepositoryError> {
        if home_score < 0 || away_score < 0 {
            return Err(RepositoryError::invalid_field(
                "score",
                "Scores cannot be negative",
            ));
        }

        let fixture = self.conn.find_by_id::<Fixture>(id).await?;
        if fixture.status() == Some(FixtureStatus::Cancelled) {
            return Err(RepositoryError::invalid_field(
                "status",
                "Cannot record a result for a cancelled match",
            ));
        }

        let mut fixture = fixture.into_active_model();
        fixture.home_score = Set(Some(home_score));
        fixture.away_score = Set(Some(away_score));
        fixture.status = Set(FixtureStatus::Finished.as_str().to_string());
        Ok(self.conn.update::<Fixture>(fixture).await?)
    }

    /// Stores a match report and finishes the match.
    ///
    /// The score is the goal count per team. With automatic suspensions
    /// enabled, a red card suspends its player until matchday
    /// `matchday + suspension_matchdays`. A resubmitted report replaces the
    /// previous events; suspensions already issued stay.
    pub async fn submit_report(
        &self,
        match_id: Uuid,
        events: Vec<ReportEvent>,
    ) -> Result<MatchReport, RepositoryError> {
        if events
            .iter()
            .any(|event| event.suspension_matchdays.is_some_and(|n| n < 1))
        {
            return Err(RepositoryError::invalid_field(
                "suspension_matchdays",
                "A suspension lasts at least one matchday",
            ));
        }

        let txn = self.conn.begin().await?;
        let fixture = txn.lock_by_id::<Fixture>(match_id).await?;
        if fixture.status() == Some(FixtureStatus::Cancelled) {
            return Err(RepositoryError::invalid_field(
                "status",
                "Cannot report a cancelled match",
            ));
        }
        let owner = tenant_of(&fixture)?;
        let auto_suspensions = TenantSettingsRepository::new(&txn)
            .get_settings()
            .await?
            .enable_auto_suspensions;

        let replaced = txn
            .delete_many(MatchEvent::delete_many().filter(MatchEventColumn::MatchId.eq(match_id)))
            .await?;

        let mut goals: HashMap<Uuid, i32> = HashMap::new();
        let mut stored = Vec::with_capacity(events.len());
        let mut suspended_players = Vec::new();
        for event in events {
            if event.team_id != fixture.home_team_id && event.team_id != fixture.away_team_id {
                return Err(RepositoryError::invalid_field(
                    "team_id",
                    "Team did not play in this match",
                ));
            }

            let mut links = TenantLinks::owned_by(owner);
            if let Some(player_id) = event.player_id {
                let player = txn.find_by_id::<Player>(player_id).await?;
                links = links.link("player_id", tenant_of(&player)?);
                if player.team_id != event.team_id {
                    return Err(RepositoryError::invalid_field(
                        "player_id",
                        "Player does not play for this team",
                    ));
                }
            }
            links.verify()?;

            stored.push(
                txn.insert::<MatchEvent>(MatchEventActiveModel {
                    id: Set(Uuid::new_v4()),
                    tenant_id: NotSet,
                    match_id: Set(fixture.id),
                    team_id: Set(event.team_id),
                    player_id: Set(event.player_id),
                    event_type: Set(event.event_type.as_str().to_string()),
                    suspension_matchdays: Set(event.suspension_matchdays),
                    created_at: Set(Utc::now().into()),
                })
                .await?,
            );

            match (event.event_type, event.player_id) {
                (MatchEventType::Goal, _) => *goals.entry(event.team_id).or_default() += 1,
                (MatchEventType::RedCard, Some(player_id)) if auto_suspensions => {
                    let until = fixture.matchday.unwrap_or(0)
                        + event
                            .suspension_matchdays
                            .unwrap_or(DEFAULT_SUSPENSION_MATCHDAYS);
                    PlayerRepository::new(&txn)
                        .suspend_player(player_id, until)
                        .await?;
                    suspended_players.push(player_id);
                }
                _ => {}
            }
        }

        let home_score = goals.get(&fixture.home_team_id).copied().unwrap_or(0);
        let away_score = goals.get(&fixture.away_team_id).copied().unwrap_or(0);
        let mut finished = fixture.into_active_model();
        finished.home_score = Set(Some(home_score));
        finished.away_score = Set(Some(away_score));
        finished.status = Set(FixtureStatus::Finished.as_str().to_string());
        let fixture = txn.update::<Fixture>(finished).await?;
        txn.commit().await?;

        tracing::info!(
            match_id = %fixture.id,
            events = stored.len(),
            replaced,
            home_score,
            away_score,
            suspensions = suspended_players.len(),
            "Recorded match report"
        );
        Ok(MatchReport {
            fixture,
            events: stored,
            suspended_players,
        })
    }

    /// Generates a single round-robin calendar for every team of the tenant.
    ///
    /// Runs in one transaction holding the season row, so two concurrent
    /// requests cannot both see an empty season.
    pub async fn generate_round_robin(
        &self,
        season_id: Uuid,
    ) -> Result<Vec<FixtureModel>, RepositoryError> {
        let owner = self.conn.writing_tenant::<Fixture>()?;
        let txn = self.conn.begin().await?;
        let season = txn.lock_by_id::<Season>(season_id).await?;

        let existing = txn
            .count(Fixture::find().filter(FixtureColumn::SeasonId.eq(season_id)))
            .await?;
        if existing > 0 {
            return Err(RepositoryError::invalid_field(
                "season_id",
                "Season already has matches scheduled",
            ));
        }

        let teams = txn
            .find_all(Team::find().order_by_asc(TeamColumn::Name))
            .await?;
        if teams.len() < 2 {
            return Err(RepositoryError::invalid_field(
                "teams",
                "At least two teams are needed to build a calendar",
            ));
        }

        let mut created = Vec::new();
        for (index, round) in round_robin_rounds(teams.len()).into_iter().enumerate() {
            let matchday = index as i32 + 1;
            let match_date = matchday_kickoff(&season, matchday)?;
            for (home, away) in round {
                let fixture = FixtureRepository::assemble(
                    owner,
                    &season,
                    &teams[home],
                    &teams[away],
                    match_date,
                    Some(matchday),
                )?;
                created.push(txn.insert::<Fixture>(fixture).await?);
            }
        }
        txn.commit().await?;

        tracing::info!(
            season_id = %season_id,
            teams = teams.len(),
            matches = created.len(),
            "Generated round-robin calendar"
        );
        Ok(created)
    }
}

/// Kickoff of matchday `n`: `7 * (n - 1)` days after the season start, 10:00 UTC.
fn matchday_kickoff(
    season: &SeasonModel,
    matchday: i32,
) -> Result<DateTime<FixedOffset>, RepositoryError> {
    let offset = DAYS_BETWEEN_MATCHDAYS * (matchday.max(1) as u64 - 1);
    let kickoff = NaiveTime::from_hms_opt(KICKOFF_HOUR, 0, 0)
        .ok_or_else(|| RepositoryError::validation_error("Invalid kickoff time"))?;
    season
        .start_date
        .checked_add_days(Days::new(offset))
        .map(|date| date.and_time(kickoff).and_utc().fixed_offset())
        .ok_or_else(|| {
            RepositoryError::invalid_field("start_date", "Calendar runs past the supported date range")
        })
}

/// Circle-method pairings for `teams` participants, as `(home, away)` indexes.
///
/// Index 0 stays fixed while the others rotate. An odd count gets a bye, so
/// one team rests each round. The fixed team's pairing swaps home and away on
/// even matchdays; every other pairing keeps its orientation.
pub fn round_robin_rounds(teams: usize) -> Vec<Vec<(usize, usize)>> {
    if teams < 2 {
        return Vec::new();
    }

    let mut slots: Vec<Option<usize>> = (0..teams).map(Some).collect();
    if teams % 2 == 1 {
        slots.push(None);
    }
    let size = slots.len();

    (0..size - 1)
        .map(|round| {
            let pairs = (0..size / 2)
                .filter_map(|i| match (slots[i], slots[size - 1 - i]) {
                    (Some(a), Some(b)) if i == 0 && round % 2 == 1 => Some((b, a)),
                    (Some(a), Some(b)) => Some((a, b)),
                    _ => None,
                })
                .collect();
            slots[1..].rotate_right(1);
            pairs
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn team(tenant: TenantId, name: &str) -> TeamModel {
        TeamModel {
            id: Uuid::new_v4(),
            tenant_id: tenant.into_uuid(),
            name: name.to_string(),
            logo_url: None,
            created_at: Utc::now().into(),
        }
    }

    fn season(tenant: TenantId) -> SeasonModel {
        SeasonModel {
            id: Uuid::new_v4(),
            tenant_id: tenant.into_uuid(),
            name: "Spring".to_string(),
            start_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            status: "active".to_string(),
            current_matchday: 1,
            max_active_players_per_team: 26,
            created_at: Utc::now().into(),
        }
    }

    fn kickoff() -> DateTime<FixedOffset> {
        Utc::now().fixed_offset()
    }

    #[test]
    fn assemble_accepts_same_tenant_links() {
        let tenant = TenantId(Uuid::new_v4());
        let fixture = FixtureRepository::assemble(
            tenant,
            &season(tenant),
            &team(tenant, "Eagles"),
            &team(tenant, "Hawks"),
            kickoff(),
            Some(1),
        )
        .unwrap();

        assert_eq!(fixture.tenant_id, Set(tenant.into_uuid()));
        assert_eq!(fixture.status, Set("scheduled".to_string()));
    }

    #[test]
    fn assemble_rejects_foreign_away_team() {
        let a = TenantId(Uuid::new_v4());
        let b = TenantId(Uuid::new_v4());

        let err = FixtureRepository::assemble(
            a,
            &season(a),
            &team(a, "Eagles"),
            &team(b, "Eagles"),
            kickoff(),
            None,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            RepositoryError::Scope(crate::tenancy::ScopeError::CrossTenantReference {
                field: "away_team_id",
                ..
            })
        ));
    }

    #[test]
    fn assemble_rejects_foreign_season() {
        let a = TenantId(Uuid::new_v4());
        let b = TenantId(Uuid::new_v4());

        let err = FixtureRepository::assemble(
            a,
            &season(b),
            &team(a, "Eagles"),
            &team(a, "Hawks"),
            kickoff(),
            None,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            RepositoryError::Scope(crate::tenancy::ScopeError::CrossTenantReference {
                field: "season_id",
                ..
            })
        ));
    }

    #[test]
    fn assemble_rejects_team_playing_itself() {
        let tenant = TenantId(Uuid::new_v4());
        let eagles = team(tenant, "Eagles");

        let err = FixtureRepository::assemble(
            tenant,
            &season(tenant),
            &eagles,
            &eagles,
            kickoff(),
            None,
        )
        .unwrap_err();

        assert!(matches!(err, RepositoryError::Validation { .. }));
    }

    #[test]
    fn even_round_robin_pairs_every_team_once() {
        let rounds = round_robin_rounds(4);
        assert_eq!(rounds.len(), 3);

        let mut seen = HashSet::new();
        for round in &rounds {
            assert_eq!(round.len(), 2);
            let mut playing = HashSet::new();
            for &(home, away) in round {
                assert!(playing.insert(home) && playing.insert(away));
                assert!(seen.insert((home.min(away), home.max(away))));
            }
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn odd_round_robin_gives_each_team_a_bye() {
        let rounds = round_robin_rounds(5);
        assert_eq!(rounds.len(), 5);
        assert!(rounds.iter().all(|round| round.len() == 2));

        let pairs: HashSet<_> = rounds
            .iter()
            .flatten()
            .map(|&(h, a)| (h.min(a), h.max(a)))
            .collect();
        assert_eq!(pairs.len(), 10);
    }

    #[test]
    fn fixed_team_swaps_venue_on_even_matchdays() {
        let rounds = round_robin_rounds(4);
        assert_eq!(rounds[0][0].0, 0);
        assert_eq!(rounds[1][0].1, 0);
        assert_eq!(rounds[2][0].0, 0);
    }

    #[test]
    fn only_the_fixed_team_pairing_swaps_venue() {
        assert_eq!(
            round_robin_rounds(4),
            vec![
                vec![(0, 3), (1, 2)],
                vec![(2, 0), (3, 1)],
                vec![(0, 1), (2, 3)],
            ]
        );

        // Six teams: the rotating pairings of matchday 2 keep the orientation
        // the circle gives them.
        let rounds = round_robin_rounds(6);
        assert_eq!(rounds[1], vec![(4, 0), (5, 3), (1, 2)]);
    }

    #[test]
    fn fewer_than_two_teams_yield_no_rounds() {
        assert!(round_robin_rounds(0).is_empty());
        assert!(round_robin_rounds(1).is_empty());
    }

    #[test]
    fn kickoffs_are_a_week_apart_at_ten_utc() {
        let tenant = TenantId(Uuid::new_v4());
        let season = season(tenant);

        let first = matchday_kickoff(&season, 1).unwrap();
        let third = matchday_kickoff(&season, 3).unwrap();

        assert_eq!(first.to_rfc3339(), "2025-03-01T10:00:00+00:00");
        assert_eq!(third.to_rfc3339(), "2025-03-15T10:00:00+00:00");
    }
}

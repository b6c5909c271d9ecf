use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::core::store::{MatchingStore, SearchFilters, StoreError};
use crate::models::{
    CandidateProfile, MatchRequest, MatchStatus, RoommateProfile, UpsertProfileRequest, UserSummary,
};

/// PostgreSQL client for the roommate matching domain
///
/// Owns the roommate_profiles, roommate_matches and notifications tables.
/// The users table belongs to the main UniNest backend; this service only
/// reads it.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(sqlx::Error::from)?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    /// Persist a notification record for a user
    pub async fn create_notification(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        match_id: Uuid,
    ) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO notifications (id, user_id, title, message, match_id)
            VALUES ($1, $2, $3, $4, $5)
        "#;

        sqlx::query(query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(title)
            .bind(message)
            .bind(match_id)
            .execute(&self.pool)
            .await?;

        tracing::debug!(user_id = %user_id, match_id = %match_id, "Notification persisted");

        Ok(())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn profile_from_row(row: &PgRow) -> RoommateProfile {
    RoommateProfile {
        user_id: row.get("user_id"),
        university: row.get("university"),
        budget_min: row.get("budget_min"),
        budget_max: row.get("budget_max"),
        cleanliness_level: row.get("cleanliness_level"),
        noise_level: row.get("noise_level"),
        sleep_schedule: row.get("sleep_schedule"),
        study_habits: row.get("study_habits"),
        smoking_allowed: row.get("smoking_allowed"),
        pets_allowed: row.get("pets_allowed"),
        guest_frequency: row.get("guest_frequency"),
        bio: row.get("bio"),
        major: row.get("major"),
        interests: row.get("interests"),
        move_in_date: row.get("move_in_date"),
        preferred_areas: row.get("preferred_areas"),
        matching_priorities: row.get("matching_priorities"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn match_from_row(row: &PgRow) -> MatchRequest {
    MatchRequest {
        id: row.get("id"),
        requester_id: row.get("requester_id"),
        target_id: row.get("target_id"),
        compatibility_score: row.get("compatibility_score"),
        status: row.get("status"),
        message: row.get("message"),
        responded_at: row.get("responded_at"),
        created_at: row.get("created_at"),
    }
}

const PROFILE_COLUMNS: &str = r#"
    user_id, university, budget_min, budget_max, cleanliness_level, noise_level,
    sleep_schedule, study_habits, smoking_allowed, pets_allowed, guest_frequency,
    bio, major, interests, move_in_date, preferred_areas, matching_priorities,
    is_active, created_at, updated_at
"#;

impl MatchingStore for PostgresClient {
    async fn get_user(&self, id: Uuid) -> Result<Option<UserSummary>, StoreError> {
        let query = r#"
            SELECT id, display_name, gender, role
            FROM users
            WHERE id = $1
        "#;

        let row = sqlx::query(query).bind(id).fetch_optional(&self.pool).await?;

        Ok(row.map(|row| UserSummary {
            id: row.get("id"),
            display_name: row.get("display_name"),
            gender: row.get("gender"),
            role: row.get("role"),
        }))
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<RoommateProfile>, StoreError> {
        let query = format!(
            "SELECT {PROFILE_COLUMNS} FROM roommate_profiles WHERE user_id = $1"
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(profile_from_row))
    }

    async fn upsert_profile(
        &self,
        req: &UpsertProfileRequest,
    ) -> Result<RoommateProfile, StoreError> {
        let query = format!(
            r#"
            INSERT INTO roommate_profiles (
                user_id, university, budget_min, budget_max, cleanliness_level,
                noise_level, sleep_schedule, study_habits, smoking_allowed,
                pets_allowed, guest_frequency, bio, major, interests,
                move_in_date, preferred_areas, matching_priorities
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT (user_id)
            DO UPDATE SET
                university = EXCLUDED.university,
                budget_min = EXCLUDED.budget_min,
                budget_max = EXCLUDED.budget_max,
                cleanliness_level = EXCLUDED.cleanliness_level,
                noise_level = EXCLUDED.noise_level,
                sleep_schedule = EXCLUDED.sleep_schedule,
                study_habits = EXCLUDED.study_habits,
                smoking_allowed = EXCLUDED.smoking_allowed,
                pets_allowed = EXCLUDED.pets_allowed,
                guest_frequency = EXCLUDED.guest_frequency,
                bio = EXCLUDED.bio,
                major = EXCLUDED.major,
                interests = EXCLUDED.interests,
                move_in_date = EXCLUDED.move_in_date,
                preferred_areas = EXCLUDED.preferred_areas,
                matching_priorities = EXCLUDED.matching_priorities,
                is_active = TRUE,
                updated_at = NOW()
            RETURNING {PROFILE_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(req.user_id)
            .bind(&req.university)
            .bind(req.budget_min)
            .bind(req.budget_max)
            .bind(req.cleanliness_level)
            .bind(req.noise_level)
            .bind(req.sleep_schedule)
            .bind(req.study_habits)
            .bind(req.smoking_allowed)
            .bind(req.pets_allowed)
            .bind(req.guest_frequency)
            .bind(&req.bio)
            .bind(&req.major)
            .bind(&req.interests)
            .bind(req.move_in_date)
            .bind(&req.preferred_areas)
            .bind(&req.matching_priorities)
            .fetch_one(&self.pool)
            .await?;

        Ok(profile_from_row(&row))
    }

    async fn deactivate_profile(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let query = r#"
            UPDATE roommate_profiles
            SET is_active = FALSE, updated_at = NOW()
            WHERE user_id = $1
        "#;

        let result = sqlx::query(query).bind(user_id).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_match(&self, id: Uuid) -> Result<Option<MatchRequest>, StoreError> {
        let query = r#"
            SELECT id, requester_id, target_id, compatibility_score, status,
                   message, responded_at, created_at
            FROM roommate_matches
            WHERE id = $1
        "#;

        let row = sqlx::query(query).bind(id).fetch_optional(&self.pool).await?;

        Ok(row.as_ref().map(match_from_row))
    }

    async fn find_pair(&self, a: Uuid, b: Uuid) -> Result<Option<MatchRequest>, StoreError> {
        let query = r#"
            SELECT id, requester_id, target_id, compatibility_score, status,
                   message, responded_at, created_at
            FROM roommate_matches
            WHERE (requester_id = $1 AND target_id = $2)
               OR (requester_id = $2 AND target_id = $1)
        "#;

        let row = sqlx::query(query)
            .bind(a)
            .bind(b)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(match_from_row))
    }

    async fn insert_match(
        &self,
        requester_id: Uuid,
        target_id: Uuid,
        score: i16,
        message: Option<String>,
    ) -> Result<MatchRequest, StoreError> {
        let query = r#"
            INSERT INTO roommate_matches (id, requester_id, target_id, compatibility_score, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, requester_id, target_id, compatibility_score, status,
                      message, responded_at, created_at
        "#;

        let result = sqlx::query(query)
            .bind(Uuid::new_v4())
            .bind(requester_id)
            .bind(target_id)
            .bind(score)
            .bind(message)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => Ok(match_from_row(&row)),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::DuplicatePair)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn set_match_status(
        &self,
        id: Uuid,
        status: MatchStatus,
    ) -> Result<MatchRequest, StoreError> {
        let query = r#"
            UPDATE roommate_matches
            SET status = $2, responded_at = NOW()
            WHERE id = $1
            RETURNING id, requester_id, target_id, compatibility_score, status,
                      message, responded_at, created_at
        "#;

        let row = sqlx::query(query)
            .bind(id)
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok(match_from_row(&row))
    }

    async fn delete_match(&self, id: Uuid) -> Result<bool, StoreError> {
        let query = r#"
            DELETE FROM roommate_matches
            WHERE id = $1
        "#;

        let result = sqlx::query(query).bind(id).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_matches(&self, user_id: Uuid) -> Result<Vec<MatchRequest>, StoreError> {
        let query = r#"
            SELECT id, requester_id, target_id, compatibility_score, status,
                   message, responded_at, created_at
            FROM roommate_matches
            WHERE requester_id = $1 OR target_id = $1
            ORDER BY created_at DESC
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(match_from_row).collect())
    }

    async fn search_candidates(
        &self,
        filters: &SearchFilters,
    ) -> Result<Vec<CandidateProfile>, StoreError> {
        // Optional filters collapse to TRUE when the bind is NULL; candidates
        // with no budget set pass the overlap test
        let query = r#"
            SELECT u.display_name, p.*
            FROM roommate_profiles p
            JOIN users u ON u.id = p.user_id
            WHERE p.is_active = TRUE
              AND p.user_id <> $1
              AND ($2::text IS NULL OR p.university = $2)
              AND ($3::int IS NULL OR p.budget_max IS NULL OR p.budget_max >= $3)
              AND ($4::int IS NULL OR p.budget_min IS NULL OR p.budget_min <= $4)
              AND ($5::sleep_schedule IS NULL OR p.sleep_schedule = $5)
              AND ($6::study_habits IS NULL OR p.study_habits = $6)
              AND ($7::boolean IS NULL OR p.smoking_allowed = $7)
              AND ($8::boolean IS NULL OR p.pets_allowed = $8)
              AND ($9::text IS NULL OR p.major = $9)
              AND ($10::text IS NULL OR u.gender = $10)
            ORDER BY p.created_at DESC
            LIMIT $11 OFFSET $12
        "#;

        let rows = sqlx::query(query)
            .bind(filters.exclude_user)
            .bind(&filters.university)
            .bind(filters.budget_min)
            .bind(filters.budget_max)
            .bind(filters.sleep_schedule)
            .bind(filters.study_habits)
            .bind(filters.smoking_allowed)
            .bind(filters.pets_allowed)
            .bind(&filters.major)
            .bind(&filters.gender)
            .bind(filters.limit)
            .bind(filters.offset)
            .fetch_all(&self.pool)
            .await?;

        let candidates = rows
            .iter()
            .map(|row| CandidateProfile {
                display_name: row.get("display_name"),
                profile: profile_from_row(row),
            })
            .collect();

        Ok(candidates)
    }
}

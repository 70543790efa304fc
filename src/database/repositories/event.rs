//! Event repository implementation
//!
//! Registration lives here rather than in its own repository: the relation
//! row and the event's attendee counter must change in one transaction.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::PostgresDb;
use crate::models::event::{Event, EventQuery, EventSort, EventStatus, UpdateEventRequest, Visibility};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::logging::log_database_operation;
use super::{decode_error, like_pattern, on_unique_violation};

#[async_trait]
pub trait AbstractEvents: Sync + Send {
    /// Insert a new event
    async fn insert_event(&self, event: &Event) -> Result<()>;

    /// Fetch an event with its attendee list
    async fn fetch_event(&self, id: Uuid) -> Result<Option<Event>>;

    /// List events matching a query, ordered by its sort key
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Event>>;

    /// Apply an admin edit under the event's lock
    async fn update_event(&self, id: Uuid, update: &UpdateEventRequest) -> Result<Event>;

    /// Delete an event together with its registrations and roster.
    /// Returns false if there was nothing to delete.
    async fn delete_event(&self, id: Uuid) -> Result<bool>;

    async fn count_events(&self) -> Result<i64>;

    /// Most recently created events
    async fn recent_events(&self, limit: i64) -> Result<Vec<Event>>;

    /// Events a user registered for, most recent registration first
    async fn registered_events(&self, user_id: Uuid) -> Result<Vec<Event>>;

    /// Register a user for an event, enforcing status, capacity and uniqueness
    async fn register_attendee(&self, event_id: Uuid, user_id: Uuid) -> Result<Event>;

    /// Remove a user's registration
    async fn unregister_attendee(&self, event_id: Uuid, user_id: Uuid) -> Result<Event>;
}

const EVENT_COLUMNS: &str = "e.id, e.user_id, e.title, e.description, e.category, e.location, e.event_date, \
    e.price, e.capacity, e.status, e.current_attendees, e.created_at";

#[derive(Debug, FromRow)]
struct EventRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: String,
    category: String,
    location: String,
    event_date: DateTime<Utc>,
    price: f64,
    capacity: i32,
    status: String,
    current_attendees: i32,
    created_at: DateTime<Utc>,
}

impl EventRow {
    fn into_event(self, attendees: Vec<Uuid>) -> Result<Event> {
        Ok(Event {
            id: self.id,
            user: self.user_id,
            title: self.title,
            description: self.description,
            category: self.category,
            location: self.location,
            date: self.event_date,
            price: self.price,
            capacity: self.capacity,
            status: self.status.parse().map_err(|e| decode_error("status", e))?,
            current_attendees: self.current_attendees,
            attendees,
            created_at: self.created_at,
        })
    }
}

/// Registered user ids per event, most recent registration first
async fn load_attendees(conn: &mut PgConnection, event_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Uuid>>> {
    let mut attendees: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    if event_ids.is_empty() {
        return Ok(attendees);
    }

    let rows = sqlx::query_as::<_, (Uuid, Uuid)>(
        "SELECT event_id, user_id FROM event_registrations WHERE event_id = ANY($1) ORDER BY registered_at DESC"
    )
    .bind(event_ids)
    .fetch_all(conn)
    .await?;

    for (event_id, user_id) in rows {
        attendees.entry(event_id).or_default().push(user_id);
    }
    Ok(attendees)
}

async fn hydrate(conn: &mut PgConnection, rows: Vec<EventRow>) -> Result<Vec<Event>> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut attendees = load_attendees(conn, &ids).await?;

    rows.into_iter()
        .map(|row| {
            let list = attendees.remove(&row.id).unwrap_or_default();
            row.into_event(list)
        })
        .collect()
}

async fn lock_event(conn: &mut PgConnection, event_id: Uuid) -> Result<Event> {
    let row = sqlx::query_as::<_, EventRow>(&format!(
        "SELECT {} FROM events e WHERE e.id = $1 FOR UPDATE",
        EVENT_COLUMNS
    ))
    .bind(event_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| EventHubError::not_found("Event", event_id))?;

    row.into_event(Vec::new())
}

async fn is_registered(conn: &mut PgConnection, event_id: Uuid, user_id: Uuid) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM event_registrations WHERE event_id = $1 AND user_id = $2)"
    )
    .bind(event_id)
    .bind(user_id)
    .fetch_one(conn)
    .await?;

    Ok(exists)
}

fn push_order_by(builder: &mut QueryBuilder<'_, Postgres>, sort: EventSort) {
    builder.push(match sort {
        EventSort::Date => " ORDER BY e.event_date ASC, e.created_at ASC",
        EventSort::Price => " ORDER BY e.price ASC, e.event_date ASC",
        EventSort::Popularity => " ORDER BY e.current_attendees DESC, e.event_date ASC",
    });
}

#[async_trait]
impl AbstractEvents for PostgresDb {
    async fn insert_event(&self, event: &Event) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, user_id, title, description, category, location, event_date, price, capacity, status, current_attendees, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#
        )
        .bind(event.id)
        .bind(event.user)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.category)
        .bind(&event.location)
        .bind(event.date)
        .bind(event.price)
        .bind(event.capacity)
        .bind(event.status.as_str())
        .bind(event.current_attendees)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch_event(&self, id: Uuid) -> Result<Option<Event>> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, EventRow>(&format!("SELECT {} FROM events e WHERE e.id = $1", EVENT_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => Ok(hydrate(&mut conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Event>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM events e WHERE TRUE", EVENT_COLUMNS));

        match query.visibility {
            Visibility::PublishedOnly => {
                builder.push(" AND e.status = ").push_bind(EventStatus::Published.as_str());
            }
            Visibility::All { status: Some(status) } => {
                builder.push(" AND e.status = ").push_bind(status.as_str());
            }
            Visibility::All { status: None } => {}
        }

        if let Some(ref category) = query.category {
            builder.push(" AND e.category = ").push_bind(category.clone());
        }

        if let Some(ref search) = query.search {
            let pattern = like_pattern(search);
            builder
                .push(" AND (e.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR e.description ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR e.location ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        push_order_by(&mut builder, query.sort);

        let mut conn = self.pool.acquire().await?;
        let rows = builder.build_query_as::<EventRow>().fetch_all(&mut *conn).await?;
        hydrate(&mut conn, rows).await
    }

    async fn update_event(&self, id: Uuid, update: &UpdateEventRequest) -> Result<Event> {
        let mut tx = self.pool.begin().await?;

        let mut event = lock_event(&mut tx, id).await?;
        event.apply_update(update)?;

        sqlx::query(
            r#"
            UPDATE events
            SET title = $2,
                description = $3,
                category = $4,
                location = $5,
                event_date = $6,
                price = $7,
                capacity = $8,
                status = $9
            WHERE id = $1
            "#
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.category)
        .bind(&event.location)
        .bind(event.date)
        .bind(event.price)
        .bind(event.capacity)
        .bind(event.status.as_str())
        .execute(&mut *tx)
        .await?;

        event.attendees = load_attendees(&mut tx, &[id]).await?.remove(&id).unwrap_or_default();
        tx.commit().await?;

        Ok(event)
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool> {
        // Registrations and roster entries go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_events(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn recent_events(&self, limit: i64) -> Result<Vec<Event>> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {} FROM events e ORDER BY e.created_at DESC LIMIT $1",
            EVENT_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        hydrate(&mut conn, rows).await
    }

    async fn registered_events(&self, user_id: Uuid) -> Result<Vec<Event>> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {} FROM events e
            JOIN event_registrations r ON r.event_id = e.id
            WHERE r.user_id = $1
            ORDER BY r.registered_at DESC
            "#,
            EVENT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        hydrate(&mut conn, rows).await
    }

    async fn register_attendee(&self, event_id: Uuid, user_id: Uuid) -> Result<Event> {
        let started = Instant::now();
        let mut tx = self.pool.begin().await?;

        let mut event = lock_event(&mut tx, event_id).await?;

        let user_exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        if !user_exists {
            return Err(EventHubError::not_found("User", user_id));
        }

        let already_registered = is_registered(&mut tx, event_id, user_id).await?;
        event.check_admission(already_registered)?;

        sqlx::query("INSERT INTO event_registrations (event_id, user_id, registered_at) VALUES ($1, $2, $3)")
            .bind(event_id)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(|e| on_unique_violation(e, || EventHubError::AlreadyRegistered { event_id }))?;

        event.current_attendees = sqlx::query_scalar::<_, i32>(
            "UPDATE events SET current_attendees = current_attendees + 1 WHERE id = $1 RETURNING current_attendees"
        )
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await?;

        event.attendees = load_attendees(&mut tx, &[event_id]).await?.remove(&event_id).unwrap_or_default();
        tx.commit().await?;

        log_database_operation("register", "event_registrations", started.elapsed().as_millis() as u64);
        Ok(event)
    }

    async fn unregister_attendee(&self, event_id: Uuid, user_id: Uuid) -> Result<Event> {
        let started = Instant::now();
        let mut tx = self.pool.begin().await?;

        let mut event = lock_event(&mut tx, event_id).await?;

        let removed = sqlx::query("DELETE FROM event_registrations WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if removed.rows_affected() == 0 {
            return Err(EventHubError::NotRegistered { event_id });
        }

        event.current_attendees = sqlx::query_scalar::<_, i32>(
            "UPDATE events SET current_attendees = GREATEST(current_attendees - 1, 0) WHERE id = $1 RETURNING current_attendees"
        )
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await?;

        event.attendees = load_attendees(&mut tx, &[event_id]).await?.remove(&event_id).unwrap_or_default();
        tx.commit().await?;

        log_database_operation("unregister", "event_registrations", started.elapsed().as_millis() as u64);
        Ok(event)
    }
}

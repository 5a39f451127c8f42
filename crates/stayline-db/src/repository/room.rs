//! # Room Repository
//!
//! Database operations for rooms and room types.
//!
//! Rooms carry a soft-delete tombstone; every read here filters
//! `is_deleted = 0`, so a tombstoned room is absent from the engine's
//! point of view rather than present-but-flagged.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stayline_core::{Room, RoomType};

const ROOM_COLUMNS: &str = "id, room_type_id, number, status, is_deleted, created_at";
const ROOM_TYPE_COLUMNS: &str = "id, name, nightly_rate_cents, max_capacity, created_at";

/// Repository for rooms and room types.
#[derive(Debug, Clone)]
pub struct RoomRepository {
    pool: SqlitePool,
}

impl RoomRepository {
    /// Creates a new RoomRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RoomRepository { pool }
    }

    // =========================================================================
    // Room Types
    // =========================================================================

    /// Gets a room type by id.
    pub async fn find_room_type(&self, id: &str) -> DbResult<Option<RoomType>> {
        let room_type = sqlx::query_as::<_, RoomType>(&format!(
            "SELECT {ROOM_TYPE_COLUMNS} FROM room_types WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room_type)
    }

    /// Lists all room types.
    pub async fn list_room_types(&self) -> DbResult<Vec<RoomType>> {
        let room_types = sqlx::query_as::<_, RoomType>(&format!(
            "SELECT {ROOM_TYPE_COLUMNS} FROM room_types ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(room_types)
    }

    /// Inserts a room type (seeding and tests).
    pub async fn insert_room_type(&self, room_type: &RoomType) -> DbResult<()> {
        debug!(id = %room_type.id, name = %room_type.name, "Inserting room type");

        sqlx::query(
            r#"
            INSERT INTO room_types (id, name, nightly_rate_cents, max_capacity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&room_type.id)
        .bind(&room_type.name)
        .bind(room_type.nightly_rate_cents)
        .bind(room_type.max_capacity)
        .bind(room_type.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Rooms
    // =========================================================================

    /// Gets a room by id. Tombstoned rooms read as absent.
    pub async fn find_room(&self, id: &str) -> DbResult<Option<Room>> {
        let room = sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE id = ?1 AND is_deleted = 0"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room)
    }

    /// Lists the live rooms of a room type.
    pub async fn list_rooms_of_type(&self, room_type_id: &str) -> DbResult<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms \
             WHERE room_type_id = ?1 AND is_deleted = 0 ORDER BY number"
        ))
        .bind(room_type_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    /// Inserts a room (seeding and tests).
    pub async fn insert_room(&self, room: &Room) -> DbResult<()> {
        debug!(id = %room.id, number = %room.number, "Inserting room");

        sqlx::query(
            r#"
            INSERT INTO rooms (id, room_type_id, number, status, is_deleted, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&room.id)
        .bind(&room.room_type_id)
        .bind(&room.number)
        .bind(room.status)
        .bind(room.is_deleted)
        .bind(room.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Marks a room as deleted. Existing assignments are untouched; the
    /// room simply stops resolving for new ones.
    pub async fn soft_delete_room(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("UPDATE rooms SET is_deleted = 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use stayline_core::{Room, RoomStatus, RoomType};

    fn room_type(id: &str, rate: i64) -> RoomType {
        RoomType {
            id: id.into(),
            name: format!("Type {id}"),
            nightly_rate_cents: rate,
            max_capacity: 2,
            created_at: Utc::now(),
        }
    }

    fn room(id: &str, type_id: &str, number: &str) -> Room {
        Room {
            id: id.into(),
            room_type_id: type_id.into(),
            number: number.into(),
            status: RoomStatus::Available,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_soft_deleted_room_reads_as_absent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let rooms = db.rooms();

        rooms.insert_room_type(&room_type("rt-1", 10000)).await.unwrap();
        rooms.insert_room(&room("room-1", "rt-1", "101")).await.unwrap();

        assert!(rooms.find_room("room-1").await.unwrap().is_some());

        assert!(rooms.soft_delete_room("room-1").await.unwrap());
        assert!(rooms.find_room("room-1").await.unwrap().is_none());
        assert!(rooms.list_rooms_of_type("rt-1").await.unwrap().is_empty());
    }
}

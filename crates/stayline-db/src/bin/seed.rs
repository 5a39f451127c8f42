//! # Seed Data Generator
//!
//! Populates the database with development data: room types, rooms,
//! hotel services, and a demo customer.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p stayline-db --bin seed
//!
//! # Specify database path
//! cargo run -p stayline-db --bin seed -- --db ./data/stayline.db
//! ```

use chrono::Utc;
use std::env;
use uuid::Uuid;

use stayline_core::{Customer, HotelService, Room, RoomStatus, RoomType};
use stayline_db::{Database, DbConfig};

/// Room types seeded for development: (name, nightly rate in cents, capacity, room count)
const ROOM_TYPES: &[(&str, i64, i64, u32)] = &[
    ("Single", 7500, 1, 10),
    ("Double", 10000, 2, 12),
    ("Double Deluxe", 14500, 2, 6),
    ("Family Suite", 22000, 5, 4),
];

const SERVICES: &[&str] = &["Spa", "Laundry", "Airport pickup", "Room service", "Late checkout"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db_path = parse_db_path().unwrap_or_else(|| "./stayline.db".to_string());
    println!("Seeding database at {db_path}");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let now = Utc::now();

    let mut room_count = 0u32;
    for (type_index, (name, rate, capacity, count)) in ROOM_TYPES.iter().enumerate() {
        let room_type = RoomType {
            id: Uuid::new_v4().to_string(),
            name: (*name).to_string(),
            nightly_rate_cents: *rate,
            max_capacity: *capacity,
            created_at: now,
        };
        db.rooms().insert_room_type(&room_type).await?;

        // Door numbers grouped by floor per type: 101.., 201.., ...
        for n in 0..*count {
            let room = Room {
                id: Uuid::new_v4().to_string(),
                room_type_id: room_type.id.clone(),
                number: format!("{}{:02}", type_index + 1, n + 1),
                status: RoomStatus::Available,
                is_deleted: false,
                created_at: now,
            };
            db.rooms().insert_room(&room).await?;
            room_count += 1;
        }
    }

    for name in SERVICES {
        db.service_requests()
            .insert_service(&HotelService {
                id: Uuid::new_v4().to_string(),
                name: (*name).to_string(),
                is_deleted: false,
                created_at: now,
            })
            .await?;
    }

    db.customers()
        .insert(&Customer {
            id: Uuid::new_v4().to_string(),
            user_id: "demo-customer".to_string(),
            full_name: "Demo Customer".to_string(),
            email: "demo@example.com".to_string(),
            created_at: now,
        })
        .await?;

    println!(
        "Seeded {} room types, {} rooms, {} services, 1 customer",
        ROOM_TYPES.len(),
        room_count,
        SERVICES.len()
    );

    db.close().await;
    Ok(())
}

fn parse_db_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
}

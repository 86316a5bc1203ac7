use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::info;

const SCHEMA: [&str; 6] = [
    "CREATE TABLE IF NOT EXISTS cinema (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(255) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS screen (
        id INT AUTO_INCREMENT PRIMARY KEY,
        cinema_id INT NOT NULL,
        name VARCHAR(255) NOT NULL,
        `rows` INT NOT NULL,
        row_width INT NOT NULL,
        CONSTRAINT screen_cinema_id_fk
            FOREIGN KEY (cinema_id) REFERENCES cinema(id)
            ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS film (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        length_minutes INT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS showing (
        id INT AUTO_INCREMENT PRIMARY KEY,
        film_id INT NOT NULL,
        screen_id INT NOT NULL,
        `time` DATETIME(6) NOT NULL,
        CONSTRAINT showing_film_id_fk
            FOREIGN KEY (film_id) REFERENCES film(id)
            ON DELETE CASCADE,
        CONSTRAINT showing_screen_id_fk
            FOREIGN KEY (screen_id) REFERENCES screen(id)
            ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS booking (
        id CHAR(36) NOT NULL PRIMARY KEY,
        showing_id INT NOT NULL,
        holder_id VARCHAR(128) NOT NULL,
        customer_name VARCHAR(255) NULL,
        customer_email VARCHAR(255) NULL,
        confirmed_at DATETIME(6) NOT NULL,
        CONSTRAINT booking_showing_id_fk
            FOREIGN KEY (showing_id) REFERENCES showing(id)
            ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS booked_seat (
        showing_id INT NOT NULL,
        seat_row INT NOT NULL,
        seat_column INT NOT NULL,
        booking_id CHAR(36) NOT NULL,
        PRIMARY KEY (showing_id, seat_row, seat_column),
        CONSTRAINT booked_seat_booking_id_fk
            FOREIGN KEY (booking_id) REFERENCES booking(id)
            ON DELETE CASCADE
    )",
];

// Database connection manager
pub struct Database {
    pub pool: MySqlPool,
}

impl Database {
    // Create a new database connection pool
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    /// Create any missing tables. Safe to run on every start.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        for create_sql in SCHEMA {
            sqlx::query(create_sql).execute(&self.pool).await?;
        }
        info!("Database schema ready");
        Ok(())
    }

    // Get a reference to the connection pool
    pub fn get_pool(&self) -> &MySqlPool {
        &self.pool
    }
}

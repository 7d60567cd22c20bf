//! `SQLite` storage for the relationship graph.
//!
//! Users, friendships, blocks and subscriptions each live in their own
//! table. Every uniqueness rule of the graph is a SQL constraint, so the
//! database rather than the caller decides whether a record already
//! exists, even when several connections race on the same file.

// SQLite operations need to hold the lock for the duration of the operation.
#![allow(clippy::significant_drop_tightening)]

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::store::{RelationshipStore, StoreError, StoreResult};
use super::types::{Block, Friendship, Subscription, User, UserId};

/// `SQLite`-based [`RelationshipStore`].
///
/// Thread-safe wrapper around a single `SQLite` connection. Separate
/// instances may point at the same database file; their writes are
/// serialised by `SQLite` itself.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or initialized.
    pub fn new(path: &Path) -> StoreResult<Self> {
        Self::open(path, Duration::from_secs(5))
    }

    /// Opens the database at `path`, waiting up to `busy_timeout` for
    /// locks held by other connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or initialized.
    pub fn open(path: &Path, busy_timeout: Duration) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        Self::with_connection(conn)
    }

    /// Creates an in-memory store, mainly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| StoreError::Lock(e.to_string()))
    }

    /// Initializes the database schema.
    fn initialize_schema(&self) -> StoreResult<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                created_at INTEGER NOT NULL
            );

            -- Undirected: endpoints stored lower ID first
            CREATE TABLE IF NOT EXISTS friendships (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_low INTEGER NOT NULL REFERENCES users(id),
                user_high INTEGER NOT NULL REFERENCES users(id),
                created_at INTEGER NOT NULL,
                UNIQUE (user_low, user_high),
                CHECK (user_low < user_high)
            );
            CREATE INDEX IF NOT EXISTS idx_friendships_high ON friendships(user_high);

            CREATE TABLE IF NOT EXISTS blocks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                blocker INTEGER NOT NULL REFERENCES users(id),
                target INTEGER NOT NULL REFERENCES users(id),
                created_at INTEGER NOT NULL,
                UNIQUE (blocker, target)
            );
            CREATE INDEX IF NOT EXISTS idx_blocks_target ON blocks(target);

            CREATE TABLE IF NOT EXISTS subscriptions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subscriber INTEGER NOT NULL REFERENCES users(id),
                target INTEGER NOT NULL REFERENCES users(id),
                created_at INTEGER NOT NULL,
                UNIQUE (subscriber, target)
            );
            CREATE INDEX IF NOT EXISTS idx_subscriptions_target ON subscriptions(target);
            ",
        )?;

        Ok(())
    }
}

/// Values bound per `IN (...)` lookup, well under `SQLite`'s variable limit.
const LOOKUP_CHUNK_SIZE: usize = 500;

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Orders users by ascending ID, dropping repeats from overlapping chunks.
fn sorted_by_id(mut users: Vec<User>) -> Vec<User> {
    users.sort_by_key(|user| user.id);
    users.dedup_by_key(|user| user.id);
    users
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId(row.get(0)?),
        email: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn friendship_from_row(row: &Row<'_>) -> rusqlite::Result<Friendship> {
    Ok(Friendship {
        user_low: UserId(row.get(0)?),
        user_high: UserId(row.get(1)?),
        created_at: row.get(2)?,
    })
}

fn block_from_row(row: &Row<'_>) -> rusqlite::Result<Block> {
    Ok(Block {
        blocker: UserId(row.get(0)?),
        target: UserId(row.get(1)?),
        created_at: row.get(2)?,
    })
}

fn subscription_from_row(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    Ok(Subscription {
        subscriber: UserId(row.get(0)?),
        target: UserId(row.get(1)?),
        created_at: row.get(2)?,
    })
}

impl RelationshipStore for SqliteStore {
    // ==================== User Operations ====================

    fn find_users_by_email(&self, emails: &[&str]) -> StoreResult<Vec<User>> {
        let conn = self.lock()?;
        let mut users = Vec::with_capacity(emails.len());

        for chunk in emails.chunks(LOOKUP_CHUNK_SIZE) {
            let sql = format!(
                "SELECT id, email, created_at FROM users WHERE email IN ({})",
                placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), user_from_row)?;
            for user in rows {
                users.push(user?);
            }
        }

        Ok(sorted_by_id(users))
    }

    fn find_users_by_id(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let conn = self.lock()?;
        let mut users = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(LOOKUP_CHUNK_SIZE) {
            let sql = format!(
                "SELECT id, email, created_at FROM users WHERE id IN ({})",
                placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows =
                stmt.query_map(params_from_iter(chunk.iter().map(|id| id.0)), user_from_row)?;
            for user in rows {
                users.push(user?);
            }
        }

        Ok(sorted_by_id(users))
    }

    fn create_user(&self, email: &str) -> StoreResult<User> {
        let conn = self.lock()?;
        let now = chrono::Utc::now().timestamp();

        // Losing a race to another connection leaves the row untouched;
        // the lookup below then returns the winner's record.
        conn.execute(
            r"
            INSERT INTO users (email, created_at)
            VALUES (?1, ?2)
            ON CONFLICT(email) DO NOTHING
            ",
            params![email, now],
        )?;

        let user = conn
            .query_row(
                "SELECT id, email, created_at FROM users WHERE email = ?1",
                params![email],
                user_from_row,
            )
            .optional()?;

        user.ok_or_else(|| StoreError::InvalidData(format!("User vanished after insert: {email}")))
    }

    // ==================== Friendship Operations ====================

    fn find_friendship(&self, a: UserId, b: UserId) -> StoreResult<Option<Friendship>> {
        let (low, high) = Friendship::between(a, b);
        let conn = self.lock()?;

        let friendship = conn
            .query_row(
                r"
                SELECT user_low, user_high, created_at
                FROM friendships
                WHERE user_low = ?1 AND user_high = ?2
                ",
                params![low.0, high.0],
                friendship_from_row,
            )
            .optional()?;

        Ok(friendship)
    }

    fn create_friendship(&self, a: UserId, b: UserId) -> StoreResult<Friendship> {
        let (low, high) = Friendship::between(a, b);
        let conn = self.lock()?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            "INSERT INTO friendships (user_low, user_high, created_at) VALUES (?1, ?2, ?3)",
            params![low.0, high.0, now],
        )?;

        Ok(Friendship {
            user_low: low,
            user_high: high,
            created_at: now,
        })
    }

    fn friendships_of(&self, user: UserId) -> StoreResult<Vec<Friendship>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r"
            SELECT user_low, user_high, created_at
            FROM friendships
            WHERE user_low = ?1 OR user_high = ?1
            ORDER BY id
            ",
        )?;

        let friendships = stmt
            .query_map(params![user.0], friendship_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(friendships)
    }

    // ==================== Block Operations ====================

    fn find_block(&self, blocker: UserId, target: UserId) -> StoreResult<Option<Block>> {
        let conn = self.lock()?;

        let block = conn
            .query_row(
                r"
                SELECT blocker, target, created_at
                FROM blocks
                WHERE blocker = ?1 AND target = ?2
                ",
                params![blocker.0, target.0],
                block_from_row,
            )
            .optional()?;

        Ok(block)
    }

    fn create_block(&self, blocker: UserId, target: UserId) -> StoreResult<Block> {
        let conn = self.lock()?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            "INSERT INTO blocks (blocker, target, created_at) VALUES (?1, ?2, ?3)",
            params![blocker.0, target.0, now],
        )?;

        Ok(Block {
            blocker,
            target,
            created_at: now,
        })
    }

    fn blocks_targeting(&self, target: UserId) -> StoreResult<Vec<Block>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT blocker, target, created_at FROM blocks WHERE target = ?1 ORDER BY id",
        )?;

        let blocks = stmt
            .query_map(params![target.0], block_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(blocks)
    }

    // ==================== Subscription Operations ====================

    fn find_subscription(
        &self,
        subscriber: UserId,
        target: UserId,
    ) -> StoreResult<Option<Subscription>> {
        let conn = self.lock()?;

        let subscription = conn
            .query_row(
                r"
                SELECT subscriber, target, created_at
                FROM subscriptions
                WHERE subscriber = ?1 AND target = ?2
                ",
                params![subscriber.0, target.0],
                subscription_from_row,
            )
            .optional()?;

        Ok(subscription)
    }

    fn create_subscription(
        &self,
        subscriber: UserId,
        target: UserId,
    ) -> StoreResult<Subscription> {
        let conn = self.lock()?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            "INSERT INTO subscriptions (subscriber, target, created_at) VALUES (?1, ?2, ?3)",
            params![subscriber.0, target.0, now],
        )?;

        Ok(Subscription {
            subscriber,
            target,
            created_at: now,
        })
    }

    fn subscriptions_targeting(&self, target: UserId) -> StoreResult<Vec<Subscription>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r"
            SELECT subscriber, target, created_at
            FROM subscriptions
            WHERE target = ?1
            ORDER BY id
            ",
        )?;

        let subscriptions = stmt
            .query_map(params![target.0], subscription_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(subscriptions)
    }
}

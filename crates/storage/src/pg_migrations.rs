//! PostgreSQL schema migrations for tripdesk storage.
//!
//! Every statement is idempotent so migrations run on each start.

use sqlx::PgPool;

/// Run all PostgreSQL migrations.
pub async fn run_pg_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            name TEXT,
            role TEXT NOT NULL DEFAULT 'agent',
            status TEXT NOT NULL DEFAULT 'active',
            tc_user_id TEXT,
            tc_microsite_id TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users (LOWER(email))")
        .execute(pool)
        .await?;

    // Bookings link to users through a real foreign key resolved from client_email.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id TEXT PRIMARY KEY,
            booking_reference TEXT NOT NULL,
            external_id TEXT NOT NULL,
            microsite_id TEXT NOT NULL,
            user_id TEXT REFERENCES users (id) ON DELETE SET NULL,
            agency_id TEXT,
            status TEXT NOT NULL DEFAULT 'unknown',
            client_email TEXT,
            client_name TEXT,
            destination TEXT,
            start_date DATE,
            end_date DATE,
            total_price DOUBLE PRECISION,
            currency TEXT,
            accommodations JSONB NOT NULL DEFAULT '[]',
            activities JSONB NOT NULL DEFAULT '[]',
            transports JSONB NOT NULL DEFAULT '[]',
            vouchers JSONB NOT NULL DEFAULT '[]',
            raw_data JSONB NOT NULL DEFAULT '{}',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (microsite_id, external_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // References are unique per microsite only; drop the older global index.
    sqlx::query("DROP INDEX IF EXISTS idx_bookings_reference").execute(pool).await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_bookings_microsite_reference
           ON bookings (microsite_id, booking_reference)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookings_ref_lookup ON bookings (booking_reference)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookings_user ON bookings (user_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_bookings_client_email ON bookings (LOWER(client_email))",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookings_start ON bookings (start_date)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookings_status ON bookings (status)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS travel_ideas (
            id TEXT PRIMARY KEY,
            microsite_id TEXT NOT NULL,
            title TEXT NOT NULL,
            destination TEXT,
            themes JSONB NOT NULL DEFAULT '[]',
            price_from DOUBLE PRECISION,
            currency TEXT,
            image_url TEXT,
            description TEXT,
            generated_content JSONB,
            raw_data JSONB NOT NULL DEFAULT '{}',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_ideas_microsite ON travel_ideas (microsite_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feature_requests (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            author_id TEXT REFERENCES users (id) ON DELETE SET NULL,
            status TEXT NOT NULL DEFAULT 'open',
            vote_count INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feature_votes (
            feature_id TEXT NOT NULL REFERENCES feature_requests (id) ON DELETE CASCADE,
            user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (feature_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_votes_user ON feature_votes (user_id)")
        .execute(pool)
        .await?;

    tracing::debug!("PostgreSQL migrations applied");
    Ok(())
}

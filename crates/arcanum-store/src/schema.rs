//! Document store database schema.

/// SQL to create the wizards table.
pub const CREATE_WIZARDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS wizards (
    id         UUID PRIMARY KEY,
    version    BIGINT NOT NULL,
    document   JSONB NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_wizards_owner
    ON wizards ((document->>'owner'));
";

/// SQL to create the duels table.
pub const CREATE_DUELS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS duels (
    id         UUID PRIMARY KEY,
    version    BIGINT NOT NULL,
    document   JSONB NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_duels_join_code
    ON duels ((document->>'join_code'));

CREATE INDEX IF NOT EXISTS idx_duels_status
    ON duels ((document->>'status'));
";

/// SQL to create the lobby entries table.
pub const CREATE_LOBBY_ENTRIES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS lobby_entries (
    id         UUID PRIMARY KEY,
    version    BIGINT NOT NULL,
    document   JSONB NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_lobby_entries_actor
    ON lobby_entries ((document->>'actor'));

CREATE INDEX IF NOT EXISTS idx_lobby_entries_waiting
    ON lobby_entries ((document->>'duel_type'), (document->>'joined_at'))
    WHERE document->>'status' = 'waiting';
";

/// SQL to create the campaign progress table.
pub const CREATE_CAMPAIGN_PROGRESS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS campaign_progress (
    id         UUID PRIMARY KEY,
    version    BIGINT NOT NULL,
    document   JSONB NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_campaign_progress_wizard
    ON campaign_progress ((document->>'actor'), (document->>'wizard_id'));
";

/// Every DDL statement, in creation order.
pub const ALL_TABLES: [&str; 4] = [
    CREATE_WIZARDS_TABLE,
    CREATE_DUELS_TABLE,
    CREATE_LOBBY_ENTRIES_TABLE,
    CREATE_CAMPAIGN_PROGRESS_TABLE,
];

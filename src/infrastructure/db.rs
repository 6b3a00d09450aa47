use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;
    require_foreign_keys(&db).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

/// The schema relies on `ON DELETE CASCADE`. sqlx enables `foreign_keys`
/// on every SQLite connection it opens; refuse to start if it is off.
async fn require_foreign_keys(db: &DatabaseConnection) -> Result<(), DbErr> {
    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            "PRAGMA foreign_keys".to_owned(),
        ))
        .await?;
    let enabled = match row {
        Some(row) => row.try_get::<i32>("", "foreign_keys")? == 1,
        None => false,
    };

    if !enabled {
        return Err(DbErr::Custom(
            "SQLite foreign key enforcement is disabled".to_owned(),
        ));
    }
    Ok(())
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        username TEXT NOT NULL,
        password TEXT NOT NULL,
        photo_url TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        author TEXT NOT NULL,
        category TEXT,
        status TEXT NOT NULL DEFAULT 'unread',
        description TEXT,
        isbn TEXT,
        publisher TEXT,
        publication_place TEXT,
        pages INTEGER,
        language TEXT,
        cover_image TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_books_user_id ON books(user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS book_categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        name_key TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS book_category_links (
        book_id INTEGER NOT NULL,
        category_id INTEGER NOT NULL,
        PRIMARY KEY (book_id, category_id),
        FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
        FOREIGN KEY (category_id) REFERENCES book_categories(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS friendships (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sender_id INTEGER NOT NULL,
        receiver_id INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY (sender_id) REFERENCES users(id) ON DELETE CASCADE,
        FOREIGN KEY (receiver_id) REFERENCES users(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_friendships_sender ON friendships(sender_id)",
    "CREATE INDEX IF NOT EXISTS idx_friendships_receiver ON friendships(receiver_id)",
    r#"
    CREATE TABLE IF NOT EXISTS recommendations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        book_id INTEGER NOT NULL,
        sender_id INTEGER NOT NULL,
        receiver_id INTEGER NOT NULL,
        message TEXT,
        created_at TEXT NOT NULL,
        FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE
    )
    "#,
];

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    for ddl in SCHEMA {
        db.execute(Statement::from_string(
            db.get_database_backend(),
            ddl.to_string(),
        ))
        .await?;
    }

    tracing::debug!("Schema ready ({} statements)", SCHEMA.len());
    Ok(())
}

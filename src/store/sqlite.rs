use chrono::NaiveDateTime;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::ToSql;
use rusqlite::{params, Row};

use crate::models::analytics::{DailyCount, LabelCount};
use crate::models::blog::{Author, BlogPost, BlogQuery, Category, SortOrder};
use crate::models::contact::{ContactForm, ContactMessage};
use crate::models::newsletter::Subscriber;
use crate::models::service_request::{RequestStatus, ServiceRequest, ServiceRequestForm};
use crate::models::settings::{SettingsUpdate, SiteSettings};
use crate::models::visitor::NewVisitor;

use super::Store;

pub type DbPool = Pool<SqliteConnectionManager>;

/// SQLite-backed implementation of the Store trait. The default backend;
/// the test suite runs against it in-memory.
pub struct SqliteStore {
    pool: DbPool,
}

pub fn init_pool(path: &str) -> Result<DbPool, String> {
    if let Some(dir) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(dir).map_err(|e| e.to_string())?;
    }
    let manager = SqliteConnectionManager::file(path);
    let pool = Pool::builder()
        .max_size(10)
        .build(manager)
        .map_err(|e| e.to_string())?;

    // WAL for better concurrent read performance
    let conn = pool.get().map_err(|e| e.to_string())?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .map_err(|e| e.to_string())?;

    Ok(pool)
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        SqliteStore { pool }
    }
}

fn now_str() -> String {
    chrono::Utc::now()
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn fmt_dt(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn json_vec(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

fn parse_json_vec(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn conversion_err(msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, msg.into())
}

fn blog_from_row(row: &Row) -> rusqlite::Result<BlogPost> {
    let category_str: String = row.get("category")?;
    let category = Category::parse(&category_str)
        .ok_or_else(|| conversion_err(format!("unknown category: {}", category_str)))?;
    let tags_raw: String = row.get("tags")?;
    let keywords_raw: String = row.get("keywords")?;
    Ok(BlogPost {
        id: row.get("id")?,
        title: row.get("title")?,
        slug: row.get("slug")?,
        excerpt: row.get("excerpt")?,
        content: row.get("content")?,
        image: row.get("image")?,
        tags: parse_json_vec(&tags_raw),
        category,
        read_time: row.get("read_time")?,
        published: row.get("published")?,
        featured: row.get("featured")?,
        views: row.get("views")?,
        likes: row.get("likes")?,
        meta_title: row.get("meta_title")?,
        meta_description: row.get("meta_description")?,
        keywords: parse_json_vec(&keywords_raw),
        author: Author {
            name: row.get("author_name")?,
            avatar: row.get("author_avatar")?,
            bio: row.get("author_bio")?,
        },
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn contact_from_row(row: &Row) -> rusqlite::Result<ContactMessage> {
    Ok(ContactMessage {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        subject: row.get("subject")?,
        message: row.get("message")?,
        created_at: row.get("created_at")?,
    })
}

fn service_request_from_row(row: &Row) -> rusqlite::Result<ServiceRequest> {
    let status_str: String = row.get("status")?;
    let status = RequestStatus::parse(&status_str)
        .ok_or_else(|| conversion_err(format!("unknown status: {}", status_str)))?;
    Ok(ServiceRequest {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        company: row.get("company")?,
        service: row.get("service")?,
        budget: row.get("budget")?,
        timeline: row.get("timeline")?,
        description: row.get("description")?,
        status,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn subscriber_from_row(row: &Row) -> rusqlite::Result<Subscriber> {
    Ok(Subscriber {
        id: row.get("id")?,
        email: row.get("email")?,
        name: row.get("name")?,
        subscribed: row.get("subscribed")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Query rows of (label, count) pairs — shared by the aggregation helpers.
fn label_counts(conn: &rusqlite::Connection, sql: &str, params: &[&dyn ToSql]) -> Vec<LabelCount> {
    let mut stmt = match conn.prepare(sql) {
        Ok(s) => s,
        Err(_) => return vec![],
    };
    stmt.query_map(params, |row| {
        Ok(LabelCount {
            label: row.get(0)?,
            count: row.get(1)?,
        })
    })
    .map(|rows| rows.filter_map(|r| r.ok()).collect())
    .unwrap_or_default()
}

impl Store for SqliteStore {
    // ── Lifecycle ───────────────────────────────────────────────────

    fn run_migrations(&self) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;

        conn.execute_batch(
            "
            -- Blog posts
            CREATE TABLE IF NOT EXISTS blogs (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                slug TEXT UNIQUE NOT NULL,
                excerpt TEXT NOT NULL,
                content TEXT NOT NULL,
                image TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                category TEXT NOT NULL,
                read_time TEXT NOT NULL DEFAULT '1 min read',
                published INTEGER NOT NULL DEFAULT 0,
                featured INTEGER NOT NULL DEFAULT 0,
                views INTEGER NOT NULL DEFAULT 0,
                likes INTEGER NOT NULL DEFAULT 0,
                meta_title TEXT NOT NULL DEFAULT '',
                meta_description TEXT NOT NULL DEFAULT '',
                keywords TEXT NOT NULL DEFAULT '[]',
                author_name TEXT NOT NULL DEFAULT '',
                author_avatar TEXT NOT NULL DEFAULT '',
                author_bio TEXT NOT NULL DEFAULT '',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_blogs_published ON blogs(published, created_at);
            CREATE INDEX IF NOT EXISTS idx_blogs_category ON blogs(category, published);
            CREATE INDEX IF NOT EXISTS idx_blogs_views ON blogs(views);

            -- Visitor log (append-only)
            CREATE TABLE IF NOT EXISTS visitors (
                id INTEGER PRIMARY KEY,
                ip TEXT NOT NULL,
                user_agent TEXT NOT NULL DEFAULT '',
                page TEXT NOT NULL,
                referrer TEXT,
                device TEXT NOT NULL DEFAULT 'desktop',
                browser TEXT NOT NULL DEFAULT 'Other',
                session_id TEXT NOT NULL DEFAULT '',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_visitors_date ON visitors(created_at);
            CREATE INDEX IF NOT EXISTS idx_visitors_page ON visitors(page);

            -- Contact messages
            CREATE TABLE IF NOT EXISTS contacts (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                subject TEXT NOT NULL,
                message TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Service requests
            CREATE TABLE IF NOT EXISTS service_requests (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                company TEXT,
                service TEXT NOT NULL,
                budget TEXT NOT NULL,
                timeline TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Newsletter subscribers
            CREATE TABLE IF NOT EXISTS newsletter (
                id INTEGER PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                name TEXT,
                subscribed INTEGER NOT NULL DEFAULT 1,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Singleton site settings (JSON document)
            CREATE TABLE IF NOT EXISTS site_settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                data TEXT NOT NULL
            );

            -- Admin sessions
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                created_at DATETIME NOT NULL,
                expires_at DATETIME NOT NULL,
                ip_address TEXT,
                user_agent TEXT
            );
            ",
        )
        .map_err(|e| e.to_string())?;

        Ok(())
    }

    fn db_backend(&self) -> &str {
        "sqlite"
    }

    // ── Site settings ───────────────────────────────────────────────

    fn settings_get(&self) -> Result<SiteSettings, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        let raw: Option<String> = conn
            .query_row("SELECT data FROM site_settings WHERE id = 1", [], |row| {
                row.get(0)
            })
            .ok();

        match raw {
            Some(json) => serde_json::from_str(&json).map_err(|e| e.to_string()),
            None => {
                let defaults = SiteSettings::default();
                let json = serde_json::to_string(&defaults).map_err(|e| e.to_string())?;
                conn.execute(
                    "INSERT OR IGNORE INTO site_settings (id, data) VALUES (1, ?1)",
                    params![json],
                )
                .map_err(|e| e.to_string())?;
                Ok(defaults)
            }
        }
    }

    fn settings_update(&self, update: &SettingsUpdate) -> Result<SiteSettings, String> {
        let mut settings = self.settings_get()?;
        settings.apply(update);
        let json = serde_json::to_string(&settings).map_err(|e| e.to_string())?;
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "UPDATE site_settings SET data = ?1 WHERE id = 1",
            params![json],
        )
        .map_err(|e| e.to_string())?;
        Ok(settings)
    }

    // ── Blog posts ──────────────────────────────────────────────────

    fn blog_slug_exists(&self, slug: &str) -> bool {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return false,
        };
        conn.query_row(
            "SELECT COUNT(*) FROM blogs WHERE slug = ?1",
            params![slug],
            |row| row.get::<_, i64>(0),
        )
        .map(|c| c > 0)
        .unwrap_or(false)
    }

    fn blog_insert(&self, post: &BlogPost) -> Result<i64, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO blogs (title, slug, excerpt, content, image, tags, category, read_time,
                                published, featured, views, likes, meta_title, meta_description,
                                keywords, author_name, author_avatar, author_bio, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
            params![
                post.title,
                post.slug,
                post.excerpt,
                post.content,
                post.image,
                json_vec(&post.tags),
                post.category.as_str(),
                post.read_time,
                post.published,
                post.featured,
                post.views,
                post.likes,
                post.meta_title,
                post.meta_description,
                json_vec(&post.keywords),
                post.author.name,
                post.author.avatar,
                post.author.bio,
                fmt_dt(&post.created_at),
                fmt_dt(&post.updated_at),
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(conn.last_insert_rowid())
    }

    fn blog_find_by_slug(&self, slug: &str) -> Option<BlogPost> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM blogs WHERE slug = ?1",
            params![slug],
            blog_from_row,
        )
        .ok()
    }

    fn blog_list(&self, query: &BlogQuery) -> (Vec<BlogPost>, i64) {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return (vec![], 0),
        };

        let mut where_sql = "published = 1".to_string();
        let mut args: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(category) = &query.category {
            where_sql.push_str(" AND category = ?");
            args.push(Box::new(category.clone()));
        }
        if let Some(tag) = &query.tag {
            where_sql.push_str(
                " AND EXISTS (SELECT 1 FROM json_each(blogs.tags) AS je WHERE je.value = ?)",
            );
            args.push(Box::new(tag.clone()));
        }
        if query.featured {
            where_sql.push_str(" AND featured = 1");
        }
        if let Some(search) = &query.search {
            where_sql.push_str(" AND (title LIKE ? OR content LIKE ? OR tags LIKE ?)");
            let pattern = format!("%{}%", search);
            args.push(Box::new(pattern.clone()));
            args.push(Box::new(pattern.clone()));
            args.push(Box::new(pattern));
        }

        let order_sql = match query.sort {
            SortOrder::Latest => "created_at DESC, id DESC",
            SortOrder::Popular => "views DESC, created_at DESC",
            SortOrder::Liked => "likes DESC, created_at DESC",
        };

        let count_sql = format!("SELECT COUNT(*) FROM blogs WHERE {}", where_sql);
        let count_refs: Vec<&dyn ToSql> = args.iter().map(|a| a.as_ref()).collect();
        let total: i64 = conn
            .query_row(&count_sql, count_refs.as_slice(), |row| row.get(0))
            .unwrap_or(0);

        let list_sql = format!(
            "SELECT * FROM blogs WHERE {} ORDER BY {} LIMIT ? OFFSET ?",
            where_sql, order_sql
        );
        args.push(Box::new(query.limit));
        args.push(Box::new(query.offset()));
        let refs: Vec<&dyn ToSql> = args.iter().map(|a| a.as_ref()).collect();

        let mut stmt = match conn.prepare(&list_sql) {
            Ok(s) => s,
            Err(_) => return (vec![], total),
        };
        let posts = stmt
            .query_map(refs.as_slice(), blog_from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default();

        (posts, total)
    }

    fn blog_categories(&self) -> Vec<String> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn
            .prepare("SELECT DISTINCT category FROM blogs WHERE published = 1 ORDER BY category")
        {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map([], |row| row.get(0))
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn blog_popular_tags(&self, limit: i64) -> Vec<LabelCount> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        label_counts(
            &conn,
            "SELECT je.value AS label, COUNT(*) AS count
             FROM blogs, json_each(blogs.tags) AS je
             WHERE blogs.published = 1
             GROUP BY je.value
             ORDER BY count DESC, label
             LIMIT ?1",
            &[&limit],
        )
    }

    fn blog_view(&self, slug: &str) -> Option<BlogPost> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "UPDATE blogs SET views = views + 1 WHERE slug = ?1 AND published = 1 RETURNING *",
            params![slug],
            blog_from_row,
        )
        .ok()
    }

    fn blog_like(&self, slug: &str) -> Option<i64> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "UPDATE blogs SET likes = likes + 1 WHERE slug = ?1 AND published = 1 RETURNING likes",
            params![slug],
            |row| row.get(0),
        )
        .ok()
    }

    fn blog_related(&self, post: &BlogPost, limit: i64) -> Vec<BlogPost> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };

        let mut args: Vec<Box<dyn ToSql>> = vec![
            Box::new(post.id),
            Box::new(post.category.as_str().to_string()),
        ];
        let mut related_sql =
            "SELECT * FROM blogs WHERE published = 1 AND id != ?1 AND (category = ?2".to_string();
        if !post.tags.is_empty() {
            let placeholders: Vec<String> = (0..post.tags.len())
                .map(|i| format!("?{}", i + 3))
                .collect();
            related_sql.push_str(&format!(
                " OR EXISTS (SELECT 1 FROM json_each(blogs.tags) AS je WHERE je.value IN ({}))",
                placeholders.join(", ")
            ));
            for tag in &post.tags {
                args.push(Box::new(tag.clone()));
            }
        }
        related_sql.push_str(&format!(
            ") ORDER BY views DESC, created_at DESC LIMIT {}",
            limit.max(0)
        ));

        let refs: Vec<&dyn ToSql> = args.iter().map(|a| a.as_ref()).collect();
        let mut stmt = match conn.prepare(&related_sql) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(refs.as_slice(), blog_from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn blog_delete(&self, slug: &str) -> Result<bool, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        let deleted = conn
            .execute("DELETE FROM blogs WHERE slug = ?1", params![slug])
            .map_err(|e| e.to_string())?;
        Ok(deleted > 0)
    }

    fn blog_count(&self) -> i64 {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row("SELECT COUNT(*) FROM blogs", [], |row| row.get(0))
            .unwrap_or(0)
    }

    fn blog_count_published(&self) -> i64 {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row(
            "SELECT COUNT(*) FROM blogs WHERE published = 1",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0)
    }

    // ── Visitor log ─────────────────────────────────────────────────

    fn visitor_record(&self, visitor: &NewVisitor) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO visitors (ip, user_agent, page, referrer, device, browser, session_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                visitor.ip,
                visitor.user_agent,
                visitor.page,
                visitor.referrer,
                visitor.device,
                visitor.browser,
                visitor.session_id,
                now_str(),
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn visitor_count(&self, since: Option<NaiveDateTime>) -> i64 {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        match since {
            Some(ts) => conn
                .query_row(
                    "SELECT COUNT(*) FROM visitors WHERE created_at >= ?1",
                    params![fmt_dt(&ts)],
                    |row| row.get(0),
                )
                .unwrap_or(0),
            None => conn
                .query_row("SELECT COUNT(*) FROM visitors", [], |row| row.get(0))
                .unwrap_or(0),
        }
    }

    fn visitor_unique_count(&self, since: Option<NaiveDateTime>) -> i64 {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        match since {
            Some(ts) => conn
                .query_row(
                    "SELECT COUNT(DISTINCT ip) FROM visitors WHERE created_at >= ?1",
                    params![fmt_dt(&ts)],
                    |row| row.get(0),
                )
                .unwrap_or(0),
            None => conn
                .query_row("SELECT COUNT(DISTINCT ip) FROM visitors", [], |row| {
                    row.get(0)
                })
                .unwrap_or(0),
        }
    }

    fn visitor_top_pages(&self, limit: i64) -> Vec<LabelCount> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        label_counts(
            &conn,
            "SELECT page AS label, COUNT(*) AS count
             FROM visitors
             GROUP BY page
             ORDER BY count DESC
             LIMIT ?1",
            &[&limit],
        )
    }

    fn visitor_top_referrers(&self, limit: i64) -> Vec<LabelCount> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        label_counts(
            &conn,
            "SELECT COALESCE(referrer, 'Direct') AS label, COUNT(*) AS count
             FROM visitors
             GROUP BY label
             ORDER BY count DESC
             LIMIT ?1",
            &[&limit],
        )
    }

    fn visitor_device_counts(&self) -> Vec<LabelCount> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        label_counts(
            &conn,
            "SELECT device AS label, COUNT(*) AS count FROM visitors GROUP BY device ORDER BY count DESC",
            &[],
        )
    }

    fn visitor_browser_counts(&self) -> Vec<LabelCount> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        label_counts(
            &conn,
            "SELECT browser AS label, COUNT(*) AS count FROM visitors GROUP BY browser ORDER BY count DESC",
            &[],
        )
    }

    fn visitor_daily_counts(&self, since: NaiveDateTime) -> Vec<DailyCount> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn.prepare(
            "SELECT DATE(created_at) AS date, COUNT(*) AS count
             FROM visitors
             WHERE created_at >= ?1
             GROUP BY date
             ORDER BY date",
        ) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![fmt_dt(&since)], |row| {
            Ok(DailyCount {
                date: row.get(0)?,
                count: row.get(1)?,
            })
        })
        .map(|rows| rows.filter_map(|r| r.ok()).collect())
        .unwrap_or_default()
    }

    // ── Contact messages ────────────────────────────────────────────

    fn contact_create(&self, form: &ContactForm) -> Result<i64, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO contacts (name, email, subject, message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                form.name.trim(),
                form.email.trim(),
                form.subject.trim(),
                form.message.trim(),
                now_str(),
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(conn.last_insert_rowid())
    }

    fn contact_list(&self) -> Vec<ContactMessage> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn
            .prepare("SELECT * FROM contacts ORDER BY created_at DESC, id DESC")
        {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map([], contact_from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn contact_delete(&self, id: i64) -> Result<bool, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        let deleted = conn
            .execute("DELETE FROM contacts WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(deleted > 0)
    }

    fn contact_count(&self) -> i64 {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))
            .unwrap_or(0)
    }

    // ── Service requests ────────────────────────────────────────────

    fn service_request_create(&self, form: &ServiceRequestForm) -> Result<i64, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        let now = now_str();
        conn.execute(
            "INSERT INTO service_requests (name, email, company, service, budget, timeline,
                                           description, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'pending', ?8, ?8)",
            params![
                form.name.trim(),
                form.email.trim().to_lowercase(),
                form.company,
                form.service,
                form.budget,
                form.timeline,
                form.description.trim(),
                now,
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(conn.last_insert_rowid())
    }

    fn service_request_list(&self) -> Vec<ServiceRequest> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn
            .prepare("SELECT * FROM service_requests ORDER BY created_at DESC, id DESC")
        {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map([], service_request_from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn service_request_set_status(&self, id: i64, status: RequestStatus) -> Result<bool, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        let updated = conn
            .execute(
                "UPDATE service_requests SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), now_str(), id],
            )
            .map_err(|e| e.to_string())?;
        Ok(updated > 0)
    }

    fn service_request_count(&self) -> i64 {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row("SELECT COUNT(*) FROM service_requests", [], |row| {
            row.get(0)
        })
        .unwrap_or(0)
    }

    // ── Newsletter subscribers ──────────────────────────────────────

    fn newsletter_find_by_email(&self, email: &str) -> Option<Subscriber> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM newsletter WHERE email = ?1",
            params![email],
            subscriber_from_row,
        )
        .ok()
    }

    fn newsletter_create(&self, email: &str, name: Option<&str>) -> Result<Subscriber, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO newsletter (email, name, subscribed, created_at, updated_at)
             VALUES (?1, ?2, 1, ?3, ?3)",
            params![email, name, now_str()],
        )
        .map_err(|e| e.to_string())?;
        let id = conn.last_insert_rowid();
        conn.query_row(
            "SELECT * FROM newsletter WHERE id = ?1",
            params![id],
            subscriber_from_row,
        )
        .map_err(|e| e.to_string())
    }

    fn newsletter_set_subscribed(&self, id: i64, subscribed: bool) -> Result<bool, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        let updated = conn
            .execute(
                "UPDATE newsletter SET subscribed = ?1, updated_at = ?2 WHERE id = ?3",
                params![subscribed, now_str(), id],
            )
            .map_err(|e| e.to_string())?;
        Ok(updated > 0)
    }

    fn newsletter_list(&self) -> Vec<Subscriber> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn
            .prepare("SELECT * FROM newsletter ORDER BY created_at DESC, id DESC")
        {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map([], subscriber_from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn newsletter_count(&self) -> i64 {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row("SELECT COUNT(*) FROM newsletter", [], |row| row.get(0))
            .unwrap_or(0)
    }

    // ── Admin sessions ──────────────────────────────────────────────

    fn session_create(
        &self,
        token: &str,
        expires_at: &str,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO sessions (token, created_at, expires_at, ip_address, user_agent)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![token, now_str(), expires_at, ip, user_agent],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn session_validate(&self, token: &str) -> bool {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return false,
        };
        conn.query_row(
            "SELECT COUNT(*) FROM sessions WHERE token = ?1 AND expires_at > ?2",
            params![token, now_str()],
            |row| row.get::<_, i64>(0),
        )
        .map(|c| c > 0)
        .unwrap_or(false)
    }

    fn session_delete(&self, token: &str) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn session_cleanup_expired(&self) {
        if let Ok(conn) = self.pool.get() {
            let _ = conn.execute(
                "DELETE FROM sessions WHERE expires_at <= ?1",
                params![now_str()],
            );
        }
    }
}

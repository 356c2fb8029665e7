use chrono::NaiveDateTime;

use crate::models::analytics::{DailyCount, LabelCount};
use crate::models::blog::{BlogPost, BlogQuery};
use crate::models::contact::{ContactForm, ContactMessage};
use crate::models::newsletter::Subscriber;
use crate::models::service_request::{RequestStatus, ServiceRequest, ServiceRequestForm};
use crate::models::settings::{SettingsUpdate, SiteSettings};
use crate::models::visitor::NewVisitor;

pub mod mongo;
pub mod sqlite;

/// Unified data-access trait. Every database operation goes through here.
/// Implementations: `SqliteStore` (wraps rusqlite/r2d2) and `MongoStore`
/// (wraps the mongodb sync client).
pub trait Store: Send + Sync {
    // ── Lifecycle ───────────────────────────────────────────────────
    fn run_migrations(&self) -> Result<(), String>;

    /// Return the database backend name: "sqlite" or "mongodb"
    fn db_backend(&self) -> &str;

    // ── Site settings (singleton) ───────────────────────────────────
    /// Fetch the settings record, creating it with defaults if absent.
    fn settings_get(&self) -> Result<SiteSettings, String>;
    /// Apply a partial update and return the stored record.
    fn settings_update(&self, update: &SettingsUpdate) -> Result<SiteSettings, String>;

    // ── Blog posts ──────────────────────────────────────────────────
    fn blog_slug_exists(&self, slug: &str) -> bool;
    /// Insert a fully-assembled post; the store assigns and returns the id.
    fn blog_insert(&self, post: &BlogPost) -> Result<i64, String>;
    fn blog_find_by_slug(&self, slug: &str) -> Option<BlogPost>;
    /// Published posts matching the query, plus the total match count.
    fn blog_list(&self, query: &BlogQuery) -> (Vec<BlogPost>, i64);
    /// Distinct categories across published posts.
    fn blog_categories(&self) -> Vec<String>;
    /// Most-used tags across published posts, by frequency.
    fn blog_popular_tags(&self, limit: i64) -> Vec<LabelCount>;
    /// Atomically increment the view counter of a published post and
    /// return the updated document.
    fn blog_view(&self, slug: &str) -> Option<BlogPost>;
    /// Atomically increment the like counter of a published post and
    /// return the new count.
    fn blog_like(&self, slug: &str) -> Option<i64>;
    /// Up to `limit` other published posts sharing a category or tag,
    /// most-viewed first.
    fn blog_related(&self, post: &BlogPost, limit: i64) -> Vec<BlogPost>;
    /// Delete by slug; Ok(false) when the slug is unknown.
    fn blog_delete(&self, slug: &str) -> Result<bool, String>;
    fn blog_count(&self) -> i64;
    fn blog_count_published(&self) -> i64;

    // ── Visitor log (append-only) ───────────────────────────────────
    fn visitor_record(&self, visitor: &NewVisitor) -> Result<(), String>;
    /// Event count, optionally restricted to events at or after `since`.
    fn visitor_count(&self, since: Option<NaiveDateTime>) -> i64;
    /// Distinct-IP count, optionally restricted to events at or after `since`.
    fn visitor_unique_count(&self, since: Option<NaiveDateTime>) -> i64;
    fn visitor_top_pages(&self, limit: i64) -> Vec<LabelCount>;
    /// Referrer domains by frequency; events without one count as "Direct".
    fn visitor_top_referrers(&self, limit: i64) -> Vec<LabelCount>;
    fn visitor_device_counts(&self) -> Vec<LabelCount>;
    fn visitor_browser_counts(&self) -> Vec<LabelCount>;
    /// Per-day event counts since `since`, dates formatted %Y-%m-%d, ascending.
    fn visitor_daily_counts(&self, since: NaiveDateTime) -> Vec<DailyCount>;

    // ── Contact messages ────────────────────────────────────────────
    fn contact_create(&self, form: &ContactForm) -> Result<i64, String>;
    fn contact_list(&self) -> Vec<ContactMessage>;
    fn contact_delete(&self, id: i64) -> Result<bool, String>;
    fn contact_count(&self) -> i64;

    // ── Service requests ────────────────────────────────────────────
    fn service_request_create(&self, form: &ServiceRequestForm) -> Result<i64, String>;
    fn service_request_list(&self) -> Vec<ServiceRequest>;
    /// Free-form status write; Ok(false) when the id is unknown.
    fn service_request_set_status(&self, id: i64, status: RequestStatus) -> Result<bool, String>;
    fn service_request_count(&self) -> i64;

    // ── Newsletter subscribers ──────────────────────────────────────
    fn newsletter_find_by_email(&self, email: &str) -> Option<Subscriber>;
    fn newsletter_create(&self, email: &str, name: Option<&str>) -> Result<Subscriber, String>;
    fn newsletter_set_subscribed(&self, id: i64, subscribed: bool) -> Result<bool, String>;
    fn newsletter_list(&self) -> Vec<Subscriber>;
    fn newsletter_count(&self) -> i64;

    // ── Admin sessions ──────────────────────────────────────────────
    fn session_create(
        &self,
        token: &str,
        expires_at: &str,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<(), String>;
    /// True when the token exists and has not expired.
    fn session_validate(&self, token: &str) -> bool;
    fn session_delete(&self, token: &str) -> Result<(), String>;
    fn session_cleanup_expired(&self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::blog::{base_slug, Category, NewBlogPost, SortOrder};
    use crate::store::sqlite::SqliteStore;

    /// Atomic counter for unique shared-cache DB names so parallel tests
    /// don't collide.
    static TEST_DB_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

    /// Fresh in-memory SqliteStore with migrations applied. Uses a named
    /// shared-cache in-memory DB so every pooled connection sees the same data.
    fn test_store() -> SqliteStore {
        let id = TEST_DB_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let uri = format!("file:store_testdb_{}?mode=memory&cache=shared", id);
        let manager = r2d2_sqlite::SqliteConnectionManager::file(uri);
        let pool = r2d2::Pool::builder()
            .max_size(2)
            .build(manager)
            .expect("Failed to create in-memory pool");
        let store = SqliteStore::new(pool);
        store.run_migrations().expect("migrations failed");
        store
    }

    fn blog_form(title: &str) -> NewBlogPost {
        NewBlogPost {
            title: title.to_string(),
            excerpt: "An excerpt".to_string(),
            content: "<p>Some body text for the post.</p>".to_string(),
            image: "https://example.com/cover.jpg".to_string(),
            tags: Some(vec!["rust".to_string(), "web".to_string()]),
            category: "Tutorial".to_string(),
            meta_title: None,
            meta_description: None,
            keywords: None,
            featured: None,
            published: None,
        }
    }

    fn insert_blog(store: &dyn Store, title: &str) -> BlogPost {
        let form = blog_form(title);
        let mut slug = base_slug(&form.title);
        if store.blog_slug_exists(&slug) {
            slug = crate::models::blog::dedup_slug(&slug);
        }
        let mut post = BlogPost::from_form(&form, Category::Tutorial, slug);
        let id = store.blog_insert(&post).unwrap();
        post.id = id;
        store.blog_find_by_slug(&post.slug).unwrap()
    }

    fn default_query() -> BlogQuery {
        BlogQuery {
            page: 1,
            limit: 10,
            category: None,
            tag: None,
            search: None,
            featured: false,
            sort: SortOrder::Latest,
        }
    }

    // ── Settings ────────────────────────────────────────────────────

    #[test]
    fn test_settings_created_lazily() {
        let s = test_store();
        let settings = s.settings_get().unwrap();
        assert_eq!(settings.site_name, "Portfolio");
        // Second read returns the same stored record, not a new one
        let again = s.settings_get().unwrap();
        assert_eq!(again.updated_at, settings.updated_at);
    }

    #[test]
    fn test_settings_partial_update() {
        let s = test_store();
        let update = SettingsUpdate {
            site_name: Some("My Site".to_string()),
            ..Default::default()
        };
        let updated = s.settings_update(&update).unwrap();
        assert_eq!(updated.site_name, "My Site");

        let reread = s.settings_get().unwrap();
        assert_eq!(reread.site_name, "My Site");
        assert_eq!(reread.site_url, "http://localhost:8000");
    }

    // ── Blogs ───────────────────────────────────────────────────────

    #[test]
    fn test_blog_insert_and_find() {
        let s = test_store();
        let post = insert_blog(&s, "Hello World");
        assert!(post.id > 0);
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.category, Category::Tutorial);
        assert_eq!(post.tags, vec!["rust".to_string(), "web".to_string()]);
        assert!(post.published);
        assert_eq!(post.views, 0);

        assert!(s.blog_slug_exists("hello-world"));
        assert!(!s.blog_slug_exists("nope"));
    }

    #[test]
    fn test_blog_slug_collision_gets_distinct_slug() {
        let s = test_store();
        let first = insert_blog(&s, "My Post!");
        let second = insert_blog(&s, "My Post!");
        assert_eq!(first.slug, "my-post");
        assert_ne!(first.slug, second.slug);
        assert!(second.slug.starts_with("my-post-"));
    }

    #[test]
    fn test_blog_view_increments_monotonically() {
        let s = test_store();
        let post = insert_blog(&s, "Counted");
        let v1 = s.blog_view(&post.slug).unwrap();
        let v2 = s.blog_view(&post.slug).unwrap();
        let v3 = s.blog_view(&post.slug).unwrap();
        assert_eq!(v1.views, 1);
        assert_eq!(v2.views, 2);
        assert_eq!(v3.views, 3);
    }

    #[test]
    fn test_blog_view_ignores_unpublished_and_unknown() {
        let s = test_store();
        let mut form = blog_form("Draft");
        form.published = Some(false);
        let post = BlogPost::from_form(&form, Category::Tutorial, "draft".to_string());
        s.blog_insert(&post).unwrap();

        assert!(s.blog_view("draft").is_none());
        assert!(s.blog_view("missing").is_none());
    }

    #[test]
    fn test_blog_like_increments() {
        let s = test_store();
        let post = insert_blog(&s, "Likeable");
        assert_eq!(s.blog_like(&post.slug), Some(1));
        assert_eq!(s.blog_like(&post.slug), Some(2));
        assert_eq!(s.blog_like("missing"), None);
    }

    #[test]
    fn test_blog_list_featured_filter() {
        let s = test_store();
        insert_blog(&s, "Plain");
        let mut form = blog_form("Starred");
        form.featured = Some(true);
        let post = BlogPost::from_form(&form, Category::Tutorial, "starred".to_string());
        s.blog_insert(&post).unwrap();

        let mut q = default_query();
        q.featured = true;
        let (posts, total) = s.blog_list(&q);
        assert_eq!(total, 1);
        assert_eq!(posts.len(), 1);
        assert!(posts.iter().all(|p| p.featured));
    }

    #[test]
    fn test_blog_list_excludes_unpublished() {
        let s = test_store();
        insert_blog(&s, "Public");
        let mut form = blog_form("Hidden");
        form.published = Some(false);
        let post = BlogPost::from_form(&form, Category::Tutorial, "hidden".to_string());
        s.blog_insert(&post).unwrap();

        let (posts, total) = s.blog_list(&default_query());
        assert_eq!(total, 1);
        assert_eq!(posts[0].slug, "public");
    }

    #[test]
    fn test_blog_list_tag_and_category_filters() {
        let s = test_store();
        insert_blog(&s, "Tagged");
        let mut form = blog_form("Other");
        form.tags = Some(vec!["unrelated".to_string()]);
        form.category = "Database".to_string();
        let post = BlogPost::from_form(&form, Category::Database, "other".to_string());
        s.blog_insert(&post).unwrap();

        let mut q = default_query();
        q.tag = Some("rust".to_string());
        let (posts, total) = s.blog_list(&q);
        assert_eq!(total, 1);
        assert_eq!(posts[0].slug, "tagged");

        let mut q = default_query();
        q.category = Some("Database".to_string());
        let (posts, _) = s.blog_list(&q);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "other");
    }

    #[test]
    fn test_blog_list_sort_by_views_and_likes() {
        let s = test_store();
        let a = insert_blog(&s, "Alpha");
        let b = insert_blog(&s, "Beta");
        s.blog_view(&a.slug);
        s.blog_view(&a.slug);
        s.blog_like(&b.slug);

        let mut q = default_query();
        q.sort = SortOrder::Popular;
        let (posts, _) = s.blog_list(&q);
        assert_eq!(posts[0].slug, "alpha");

        q.sort = SortOrder::Liked;
        let (posts, _) = s.blog_list(&q);
        assert_eq!(posts[0].slug, "beta");
    }

    #[test]
    fn test_blog_list_search() {
        let s = test_store();
        let mut form = blog_form("Needle Post");
        form.content = "<p>haystack haystack</p>".to_string();
        let post = BlogPost::from_form(&form, Category::Tutorial, "needle-post".to_string());
        s.blog_insert(&post).unwrap();
        insert_blog(&s, "Unrelated");

        let mut q = default_query();
        q.search = Some("needle".to_string());
        let (posts, total) = s.blog_list(&q);
        assert_eq!(total, 1);
        assert_eq!(posts[0].slug, "needle-post");
    }

    #[test]
    fn test_blog_pagination() {
        let s = test_store();
        for i in 0..5 {
            insert_blog(&s, &format!("Post number {}", i));
        }
        let mut q = default_query();
        q.limit = 2;
        q.page = 3;
        let (posts, total) = s.blog_list(&q);
        assert_eq!(total, 5);
        assert_eq!(posts.len(), 1);
    }

    #[test]
    fn test_blog_categories_and_popular_tags() {
        let s = test_store();
        insert_blog(&s, "One");
        insert_blog(&s, "Two");
        let mut form = blog_form("Three");
        form.category = "SaaS".to_string();
        form.tags = Some(vec!["rust".to_string()]);
        let post = BlogPost::from_form(&form, Category::SaaS, "three".to_string());
        s.blog_insert(&post).unwrap();

        let cats = s.blog_categories();
        assert!(cats.contains(&"Tutorial".to_string()));
        assert!(cats.contains(&"SaaS".to_string()));

        let tags = s.blog_popular_tags(10);
        assert_eq!(tags[0].label, "rust");
        assert_eq!(tags[0].count, 3);
    }

    #[test]
    fn test_blog_related_by_category_or_tag() {
        let s = test_store();
        let anchor = insert_blog(&s, "Anchor");
        insert_blog(&s, "Same Category");
        let mut form = blog_form("Different");
        form.category = "Database".to_string();
        form.tags = Some(vec!["rust".to_string()]);
        let post = BlogPost::from_form(&form, Category::Database, "different".to_string());
        s.blog_insert(&post).unwrap();
        let mut form = blog_form("Unrelated");
        form.category = "Performance".to_string();
        form.tags = Some(vec!["go".to_string()]);
        let post = BlogPost::from_form(&form, Category::Performance, "unrelated".to_string());
        s.blog_insert(&post).unwrap();

        let related = s.blog_related(&anchor, 3);
        let slugs: Vec<&str> = related.iter().map(|p| p.slug.as_str()).collect();
        assert!(slugs.contains(&"same-category"));
        assert!(slugs.contains(&"different")); // shares the "rust" tag
        assert!(!slugs.contains(&"unrelated"));
        assert!(!slugs.contains(&"anchor"));
    }

    #[test]
    fn test_blog_delete() {
        let s = test_store();
        let post = insert_blog(&s, "Doomed");
        assert!(s.blog_delete(&post.slug).unwrap());
        assert!(s.blog_find_by_slug(&post.slug).is_none());
        assert!(!s.blog_delete(&post.slug).unwrap());
    }

    #[test]
    fn test_blog_counts() {
        let s = test_store();
        insert_blog(&s, "Published one");
        let mut form = blog_form("Draft one");
        form.published = Some(false);
        let post = BlogPost::from_form(&form, Category::Tutorial, "draft-one".to_string());
        s.blog_insert(&post).unwrap();

        assert_eq!(s.blog_count(), 2);
        assert_eq!(s.blog_count_published(), 1);
    }

    // ── Visitors ────────────────────────────────────────────────────

    fn visit(ip: &str, page: &str, device: &str, browser: &str) -> NewVisitor {
        NewVisitor {
            ip: ip.to_string(),
            user_agent: "test-agent".to_string(),
            page: page.to_string(),
            referrer: Some("google.com".to_string()),
            device: device.to_string(),
            browser: browser.to_string(),
            session_id: format!("{}-0", ip),
        }
    }

    #[test]
    fn test_visitor_counts_and_uniques() {
        let s = test_store();
        s.visitor_record(&visit("1.1.1.1", "/", "desktop", "Chrome")).unwrap();
        s.visitor_record(&visit("1.1.1.1", "/blog/a", "desktop", "Chrome")).unwrap();
        s.visitor_record(&visit("2.2.2.2", "/", "mobile", "Safari")).unwrap();

        assert_eq!(s.visitor_count(None), 3);
        assert_eq!(s.visitor_unique_count(None), 2);

        let future = chrono::Utc::now().naive_utc() + chrono::Duration::hours(1);
        assert_eq!(s.visitor_count(Some(future)), 0);
    }

    #[test]
    fn test_visitor_aggregations() {
        let s = test_store();
        s.visitor_record(&visit("1.1.1.1", "/", "desktop", "Chrome")).unwrap();
        s.visitor_record(&visit("2.2.2.2", "/", "desktop", "Firefox")).unwrap();
        s.visitor_record(&visit("3.3.3.3", "/blog/a", "mobile", "Chrome")).unwrap();

        let pages = s.visitor_top_pages(10);
        assert_eq!(pages[0], LabelCount { label: "/".to_string(), count: 2 });

        let devices = s.visitor_device_counts();
        assert!(devices.contains(&LabelCount { label: "desktop".to_string(), count: 2 }));
        assert!(devices.contains(&LabelCount { label: "mobile".to_string(), count: 1 }));

        let browsers = s.visitor_browser_counts();
        assert!(browsers.contains(&LabelCount { label: "Chrome".to_string(), count: 2 }));

        let referrers = s.visitor_top_referrers(10);
        assert_eq!(referrers[0], LabelCount { label: "google.com".to_string(), count: 3 });

        let since = chrono::Utc::now().naive_utc() - chrono::Duration::days(30);
        let daily = s.visitor_daily_counts(since);
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].count, 3);
    }

    #[test]
    fn test_visitor_direct_referrer() {
        let s = test_store();
        let mut v = visit("1.1.1.1", "/", "desktop", "Chrome");
        v.referrer = None;
        s.visitor_record(&v).unwrap();
        let referrers = s.visitor_top_referrers(10);
        assert_eq!(referrers[0].label, "Direct");
    }

    // ── Contacts ────────────────────────────────────────────────────

    #[test]
    fn test_contact_crud() {
        let s = test_store();
        let form = ContactForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            subject: "Hi".to_string(),
            message: "Hello there".to_string(),
        };
        let id = s.contact_create(&form).unwrap();
        assert!(id > 0);
        assert_eq!(s.contact_count(), 1);

        let list = s.contact_list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "Ada");

        assert!(s.contact_delete(id).unwrap());
        assert!(!s.contact_delete(id).unwrap());
        assert_eq!(s.contact_count(), 0);
    }

    // ── Service requests ────────────────────────────────────────────

    #[test]
    fn test_service_request_lifecycle() {
        let s = test_store();
        let form = ServiceRequestForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            company: Some("Acme".to_string()),
            service: "SaaS Platform".to_string(),
            budget: "$50,000+".to_string(),
            timeline: "3-6 months".to_string(),
            description: "Big platform".to_string(),
        };
        let id = s.service_request_create(&form).unwrap();
        assert_eq!(s.service_request_count(), 1);

        let list = s.service_request_list();
        assert_eq!(list[0].status, RequestStatus::Pending);

        // Free-form transitions: completed straight from pending, then back
        assert!(s.service_request_set_status(id, RequestStatus::Completed).unwrap());
        assert!(s.service_request_set_status(id, RequestStatus::Pending).unwrap());
        let list = s.service_request_list();
        assert_eq!(list[0].status, RequestStatus::Pending);

        assert!(!s.service_request_set_status(9999, RequestStatus::Cancelled).unwrap());
    }

    // ── Newsletter ──────────────────────────────────────────────────

    #[test]
    fn test_newsletter_create_and_find() {
        let s = test_store();
        let sub = s.newsletter_create("ada@example.com", Some("Ada")).unwrap();
        assert!(sub.subscribed);
        assert_eq!(sub.email, "ada@example.com");

        let found = s.newsletter_find_by_email("ada@example.com").unwrap();
        assert_eq!(found.id, sub.id);
        assert!(s.newsletter_find_by_email("nobody@example.com").is_none());
    }

    #[test]
    fn test_newsletter_reactivation_keeps_single_record() {
        let s = test_store();
        let sub = s.newsletter_create("ada@example.com", None).unwrap();
        assert!(s.newsletter_set_subscribed(sub.id, false).unwrap());

        let found = s.newsletter_find_by_email("ada@example.com").unwrap();
        assert!(!found.subscribed);

        assert!(s.newsletter_set_subscribed(sub.id, true).unwrap());
        let found = s.newsletter_find_by_email("ada@example.com").unwrap();
        assert!(found.subscribed);
        assert_eq!(s.newsletter_count(), 1);
    }

    #[test]
    fn test_newsletter_duplicate_email_rejected() {
        let s = test_store();
        s.newsletter_create("ada@example.com", None).unwrap();
        assert!(s.newsletter_create("ada@example.com", None).is_err());
    }

    // ── Sessions ────────────────────────────────────────────────────

    #[test]
    fn test_session_lifecycle() {
        let s = test_store();
        s.session_create("tok123", "2099-12-31 23:59:59", Some("1.1.1.1"), None)
            .unwrap();
        assert!(s.session_validate("tok123"));
        assert!(!s.session_validate("other"));

        s.session_delete("tok123").unwrap();
        assert!(!s.session_validate("tok123"));
    }

    #[test]
    fn test_session_expiry() {
        let s = test_store();
        s.session_create("stale", "2000-01-01 00:00:00", None, None).unwrap();
        assert!(!s.session_validate("stale"));
        s.session_cleanup_expired();
        assert!(!s.session_validate("stale"));
    }
}

use chrono::NaiveDateTime;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{
    ClientOptions, FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument,
};
use mongodb::sync::{Client, Database};
use mongodb::IndexModel;

use crate::models::analytics::{DailyCount, LabelCount};
use crate::models::blog::{Author, BlogPost, BlogQuery, Category, SortOrder};
use crate::models::contact::{ContactForm, ContactMessage};
use crate::models::newsletter::Subscriber;
use crate::models::service_request::{RequestStatus, ServiceRequest, ServiceRequestForm};
use crate::models::settings::{SettingsUpdate, SiteSettings};
use crate::models::visitor::NewVisitor;

use super::Store;

/// MongoDB-backed implementation of the Store trait — the document
/// database the original system runs on.
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connect to the given URI and database name.
    pub fn new(uri: &str, db_name: &str) -> Result<Self, String> {
        let client_options = ClientOptions::parse(uri).map_err(|e| e.to_string())?;
        let client = Client::with_options(client_options).map_err(|e| e.to_string())?;
        let db = client.database(db_name);
        Ok(Self { db })
    }

    /// Test connectivity by pinging the server.
    pub fn test_connection(&self) -> Result<(), String> {
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .map_err(|e| format!("MongoDB connection test failed: {}", e))?;
        Ok(())
    }

    // ── Helper: get next auto-increment ID for a collection ──
    fn next_id(&self, collection_name: &str) -> Result<i64, String> {
        let counters = self.db.collection::<Document>("_counters");
        let filter = doc! { "_id": collection_name };
        let update = doc! { "$inc": { "seq": 1_i64 } };
        let opts = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();
        let result = counters
            .find_one_and_update(filter, update, opts)
            .map_err(|e| e.to_string())?;
        match result {
            Some(d) => d
                .get_i64("seq")
                .map_err(|e| format!("Failed to get seq: {}", e)),
            None => Err("Failed to generate ID".to_string()),
        }
    }

    fn unique_index(&self, collection: &str, field: &str) -> Result<(), String> {
        let mut keys = Document::new();
        keys.insert(field, 1);
        self.db
            .collection::<Document>(collection)
            .create_index(
                IndexModel::builder()
                    .keys(keys)
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            )
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    fn plain_index(&self, collection: &str, keys: Document) -> Result<(), String> {
        self.db
            .collection::<Document>(collection)
            .create_index(IndexModel::builder().keys(keys).build(), None)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    /// Run a $group aggregation and read back (label, count) pairs.
    fn label_counts(&self, collection: &str, pipeline: Vec<Document>) -> Vec<LabelCount> {
        let coll = self.db.collection::<Document>(collection);
        let cursor = match coll.aggregate(pipeline, None) {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        cursor
            .filter_map(|r| r.ok())
            .filter_map(|d| {
                let label = match d.get("_id") {
                    Some(Bson::String(s)) => s.clone(),
                    Some(Bson::Null) | None => "Direct".to_string(),
                    Some(other) => other.to_string(),
                };
                Some(LabelCount {
                    label,
                    count: doc_count(&d),
                })
            })
            .collect()
    }
}

fn rfc3339_now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn doc_count(d: &Document) -> i64 {
    d.get_i64("count")
        .unwrap_or_else(|_| d.get_i32("count").unwrap_or(0) as i64)
}

fn parse_naive_dt(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

fn parse_naive_dt_rfc3339(s: &str) -> Option<NaiveDateTime> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| parse_naive_dt(s))
}

fn str_vec(doc: &Document, key: &str) -> Vec<String> {
    doc.get_array(key)
        .map(|arr| {
            arr.iter()
                .filter_map(|b| b.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

// ── Helper: Convert BSON Document to BlogPost ────────────────────────

fn doc_to_blog(doc: &Document) -> Option<BlogPost> {
    let author = doc
        .get_document("author")
        .map(|a| Author {
            name: a.get_str("name").unwrap_or("").to_string(),
            avatar: a.get_str("avatar").unwrap_or("").to_string(),
            bio: a.get_str("bio").unwrap_or("").to_string(),
        })
        .unwrap_or_default();
    Some(BlogPost {
        id: doc.get_i64("id").ok()?,
        title: doc.get_str("title").ok()?.to_string(),
        slug: doc.get_str("slug").ok()?.to_string(),
        excerpt: doc.get_str("excerpt").ok().unwrap_or("").to_string(),
        content: doc.get_str("content").ok().unwrap_or("").to_string(),
        image: doc.get_str("image").ok().unwrap_or("").to_string(),
        tags: str_vec(doc, "tags"),
        category: Category::parse(doc.get_str("category").ok()?)?,
        read_time: doc.get_str("read_time").ok().unwrap_or("1 min read").to_string(),
        published: doc.get_bool("published").unwrap_or(false),
        featured: doc.get_bool("featured").unwrap_or(false),
        views: doc.get_i64("views").unwrap_or(0),
        likes: doc.get_i64("likes").unwrap_or(0),
        meta_title: doc.get_str("meta_title").ok().unwrap_or("").to_string(),
        meta_description: doc.get_str("meta_description").ok().unwrap_or("").to_string(),
        keywords: str_vec(doc, "keywords"),
        author,
        created_at: doc
            .get_str("created_at")
            .ok()
            .and_then(parse_naive_dt_rfc3339)?,
        updated_at: doc
            .get_str("updated_at")
            .ok()
            .and_then(parse_naive_dt_rfc3339)?,
    })
}

fn doc_to_contact(doc: &Document) -> Option<ContactMessage> {
    Some(ContactMessage {
        id: doc.get_i64("id").ok()?,
        name: doc.get_str("name").ok()?.to_string(),
        email: doc.get_str("email").ok()?.to_string(),
        subject: doc.get_str("subject").ok().unwrap_or("").to_string(),
        message: doc.get_str("message").ok().unwrap_or("").to_string(),
        created_at: doc
            .get_str("created_at")
            .ok()
            .and_then(parse_naive_dt_rfc3339)?,
    })
}

fn doc_to_service_request(doc: &Document) -> Option<ServiceRequest> {
    Some(ServiceRequest {
        id: doc.get_i64("id").ok()?,
        name: doc.get_str("name").ok()?.to_string(),
        email: doc.get_str("email").ok()?.to_string(),
        company: doc.get_str("company").ok().map(|s| s.to_string()),
        service: doc.get_str("service").ok()?.to_string(),
        budget: doc.get_str("budget").ok()?.to_string(),
        timeline: doc.get_str("timeline").ok()?.to_string(),
        description: doc.get_str("description").ok().unwrap_or("").to_string(),
        status: RequestStatus::parse(doc.get_str("status").ok().unwrap_or("pending"))?,
        created_at: doc
            .get_str("created_at")
            .ok()
            .and_then(parse_naive_dt_rfc3339)?,
        updated_at: doc
            .get_str("updated_at")
            .ok()
            .and_then(parse_naive_dt_rfc3339)?,
    })
}

fn doc_to_subscriber(doc: &Document) -> Option<Subscriber> {
    Some(Subscriber {
        id: doc.get_i64("id").ok()?,
        email: doc.get_str("email").ok()?.to_string(),
        name: doc.get_str("name").ok().map(|s| s.to_string()),
        subscribed: doc.get_bool("subscribed").unwrap_or(true),
        created_at: doc
            .get_str("created_at")
            .ok()
            .and_then(parse_naive_dt_rfc3339)?,
        updated_at: doc
            .get_str("updated_at")
            .ok()
            .and_then(parse_naive_dt_rfc3339)?,
    })
}

impl Store for MongoStore {
    // ── Lifecycle ───────────────────────────────────────────────────

    fn run_migrations(&self) -> Result<(), String> {
        self.unique_index("blogs", "slug")?;
        self.plain_index("blogs", doc! { "published": 1, "created_at": -1 })?;
        self.plain_index("blogs", doc! { "category": 1, "published": 1 })?;
        self.plain_index("blogs", doc! { "views": -1 })?;
        // Full-text search across title, body and tags
        self.plain_index("blogs", doc! { "title": "text", "content": "text", "tags": "text" })?;

        self.plain_index("visitors", doc! { "created_at": 1 })?;
        self.plain_index("visitors", doc! { "page": 1 })?;

        self.unique_index("newsletter", "email")?;
        self.unique_index("sessions", "token")?;

        Ok(())
    }

    fn db_backend(&self) -> &str {
        "mongodb"
    }

    // ── Site settings ───────────────────────────────────────────────

    fn settings_get(&self) -> Result<SiteSettings, String> {
        let coll = self.db.collection::<Document>("site_settings");
        match coll.find_one(doc! {}, None).map_err(|e| e.to_string())? {
            Some(mut d) => {
                d.remove("_id");
                mongodb::bson::from_document(d).map_err(|e| e.to_string())
            }
            None => {
                let defaults = SiteSettings::default();
                let d = mongodb::bson::to_document(&defaults).map_err(|e| e.to_string())?;
                coll.insert_one(d, None).map_err(|e| e.to_string())?;
                Ok(defaults)
            }
        }
    }

    fn settings_update(&self, update: &SettingsUpdate) -> Result<SiteSettings, String> {
        let mut settings = self.settings_get()?;
        settings.apply(update);
        let d = mongodb::bson::to_document(&settings).map_err(|e| e.to_string())?;
        let coll = self.db.collection::<Document>("site_settings");
        let opts = mongodb::options::ReplaceOptions::builder().upsert(true).build();
        coll.replace_one(doc! {}, d, opts).map_err(|e| e.to_string())?;
        Ok(settings)
    }

    // ── Blog posts ──────────────────────────────────────────────────

    fn blog_slug_exists(&self, slug: &str) -> bool {
        let coll = self.db.collection::<Document>("blogs");
        coll.count_documents(doc! { "slug": slug }, None).unwrap_or(0) > 0
    }

    fn blog_insert(&self, post: &BlogPost) -> Result<i64, String> {
        let id = self.next_id("blogs")?;
        let coll = self.db.collection::<Document>("blogs");
        coll.insert_one(
            doc! {
                "id": id,
                "title": post.title.as_str(),
                "slug": post.slug.as_str(),
                "excerpt": post.excerpt.as_str(),
                "content": post.content.as_str(),
                "image": post.image.as_str(),
                "tags": post.tags.clone(),
                "category": post.category.as_str(),
                "read_time": post.read_time.as_str(),
                "published": post.published,
                "featured": post.featured,
                "views": post.views,
                "likes": post.likes,
                "meta_title": post.meta_title.as_str(),
                "meta_description": post.meta_description.as_str(),
                "keywords": post.keywords.clone(),
                "author": {
                    "name": post.author.name.as_str(),
                    "avatar": post.author.avatar.as_str(),
                    "bio": post.author.bio.as_str(),
                },
                "created_at": rfc3339_now(),
                "updated_at": rfc3339_now(),
            },
            None,
        )
        .map_err(|e| e.to_string())?;
        Ok(id)
    }

    fn blog_find_by_slug(&self, slug: &str) -> Option<BlogPost> {
        let coll = self.db.collection::<Document>("blogs");
        let d = coll.find_one(doc! { "slug": slug }, None).ok()??;
        doc_to_blog(&d)
    }

    fn blog_list(&self, query: &BlogQuery) -> (Vec<BlogPost>, i64) {
        let coll = self.db.collection::<Document>("blogs");

        let mut filter = doc! { "published": true };
        if let Some(category) = &query.category {
            filter.insert("category", category.as_str());
        }
        if let Some(tag) = &query.tag {
            filter.insert("tags", doc! { "$in": [tag.as_str()] });
        }
        if query.featured {
            filter.insert("featured", true);
        }
        if let Some(search) = &query.search {
            filter.insert("$text", doc! { "$search": search.as_str() });
        }

        let sort = match query.sort {
            SortOrder::Latest => doc! { "created_at": -1, "id": -1 },
            SortOrder::Popular => doc! { "views": -1, "created_at": -1 },
            SortOrder::Liked => doc! { "likes": -1, "created_at": -1 },
        };

        let total = coll.count_documents(filter.clone(), None).unwrap_or(0) as i64;

        let opts = FindOptions::builder()
            .sort(sort)
            .skip(query.offset().max(0) as u64)
            .limit(query.limit)
            .build();
        let cursor = match coll.find(filter, opts) {
            Ok(c) => c,
            Err(_) => return (vec![], total),
        };
        let posts = cursor
            .filter_map(|r| r.ok())
            .filter_map(|d| doc_to_blog(&d))
            .collect();

        (posts, total)
    }

    fn blog_categories(&self) -> Vec<String> {
        let coll = self.db.collection::<Document>("blogs");
        let mut categories: Vec<String> = coll
            .distinct("category", doc! { "published": true }, None)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|b| b.as_str().map(|s| s.to_string()))
            .collect();
        categories.sort();
        categories
    }

    fn blog_popular_tags(&self, limit: i64) -> Vec<LabelCount> {
        self.label_counts(
            "blogs",
            vec![
                doc! { "$match": { "published": true } },
                doc! { "$unwind": "$tags" },
                doc! { "$group": { "_id": "$tags", "count": { "$sum": 1 } } },
                doc! { "$sort": { "count": -1, "_id": 1 } },
                doc! { "$limit": limit },
            ],
        )
    }

    fn blog_view(&self, slug: &str) -> Option<BlogPost> {
        let coll = self.db.collection::<Document>("blogs");
        let opts = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let d = coll
            .find_one_and_update(
                doc! { "slug": slug, "published": true },
                doc! { "$inc": { "views": 1_i64 } },
                opts,
            )
            .ok()??;
        doc_to_blog(&d)
    }

    fn blog_like(&self, slug: &str) -> Option<i64> {
        let coll = self.db.collection::<Document>("blogs");
        let opts = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let d = coll
            .find_one_and_update(
                doc! { "slug": slug, "published": true },
                doc! { "$inc": { "likes": 1_i64 } },
                opts,
            )
            .ok()??;
        d.get_i64("likes").ok()
    }

    fn blog_related(&self, post: &BlogPost, limit: i64) -> Vec<BlogPost> {
        let coll = self.db.collection::<Document>("blogs");
        let filter = doc! {
            "id": { "$ne": post.id },
            "published": true,
            "$or": [
                { "category": post.category.as_str() },
                { "tags": { "$in": post.tags.clone() } },
            ],
        };
        let opts = FindOptions::builder()
            .sort(doc! { "views": -1, "created_at": -1 })
            .limit(limit)
            .build();
        let cursor = match coll.find(filter, opts) {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        cursor
            .filter_map(|r| r.ok())
            .filter_map(|d| doc_to_blog(&d))
            .collect()
    }

    fn blog_delete(&self, slug: &str) -> Result<bool, String> {
        let coll = self.db.collection::<Document>("blogs");
        let result = coll
            .delete_one(doc! { "slug": slug }, None)
            .map_err(|e| e.to_string())?;
        Ok(result.deleted_count > 0)
    }

    fn blog_count(&self) -> i64 {
        let coll = self.db.collection::<Document>("blogs");
        coll.count_documents(doc! {}, None).unwrap_or(0) as i64
    }

    fn blog_count_published(&self) -> i64 {
        let coll = self.db.collection::<Document>("blogs");
        coll.count_documents(doc! { "published": true }, None)
            .unwrap_or(0) as i64
    }

    // ── Visitor log ─────────────────────────────────────────────────

    fn visitor_record(&self, visitor: &NewVisitor) -> Result<(), String> {
        let id = self.next_id("visitors")?;
        let coll = self.db.collection::<Document>("visitors");
        let referrer = match &visitor.referrer {
            Some(r) => Bson::String(r.clone()),
            None => Bson::Null,
        };
        coll.insert_one(
            doc! {
                "id": id,
                "ip": visitor.ip.as_str(),
                "user_agent": visitor.user_agent.as_str(),
                "page": visitor.page.as_str(),
                "referrer": referrer,
                "device": visitor.device.as_str(),
                "browser": visitor.browser.as_str(),
                "session_id": visitor.session_id.as_str(),
                "created_at": rfc3339_now(),
            },
            None,
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn visitor_count(&self, since: Option<NaiveDateTime>) -> i64 {
        let coll = self.db.collection::<Document>("visitors");
        let filter = match since {
            Some(ts) => doc! { "created_at": { "$gte": ts.and_utc().to_rfc3339() } },
            None => doc! {},
        };
        coll.count_documents(filter, None).unwrap_or(0) as i64
    }

    fn visitor_unique_count(&self, since: Option<NaiveDateTime>) -> i64 {
        let coll = self.db.collection::<Document>("visitors");
        let filter = match since {
            Some(ts) => doc! { "created_at": { "$gte": ts.and_utc().to_rfc3339() } },
            None => doc! {},
        };
        coll.distinct("ip", filter, None).unwrap_or_default().len() as i64
    }

    fn visitor_top_pages(&self, limit: i64) -> Vec<LabelCount> {
        self.label_counts(
            "visitors",
            vec![
                doc! { "$group": { "_id": "$page", "count": { "$sum": 1 } } },
                doc! { "$sort": { "count": -1 } },
                doc! { "$limit": limit },
            ],
        )
    }

    fn visitor_top_referrers(&self, limit: i64) -> Vec<LabelCount> {
        self.label_counts(
            "visitors",
            vec![
                doc! { "$group": {
                    "_id": { "$ifNull": ["$referrer", "Direct"] },
                    "count": { "$sum": 1 }
                } },
                doc! { "$sort": { "count": -1 } },
                doc! { "$limit": limit },
            ],
        )
    }

    fn visitor_device_counts(&self) -> Vec<LabelCount> {
        self.label_counts(
            "visitors",
            vec![
                doc! { "$group": { "_id": "$device", "count": { "$sum": 1 } } },
                doc! { "$sort": { "count": -1 } },
            ],
        )
    }

    fn visitor_browser_counts(&self) -> Vec<LabelCount> {
        self.label_counts(
            "visitors",
            vec![
                doc! { "$group": { "_id": "$browser", "count": { "$sum": 1 } } },
                doc! { "$sort": { "count": -1 } },
            ],
        )
    }

    fn visitor_daily_counts(&self, since: NaiveDateTime) -> Vec<DailyCount> {
        let coll = self.db.collection::<Document>("visitors");
        let pipeline = vec![
            doc! { "$match": { "created_at": { "$gte": since.and_utc().to_rfc3339() } } },
            doc! { "$addFields": {
                "_dt": { "$dateFromString": { "dateString": "$created_at", "onError": null } }
            }},
            doc! { "$match": { "_dt": { "$ne": null } } },
            doc! { "$group": {
                "_id": { "$dateToString": { "format": "%Y-%m-%d", "date": "$_dt" } },
                "count": { "$sum": 1 }
            }},
            doc! { "$sort": { "_id": 1 } },
        ];
        let cursor = match coll.aggregate(pipeline, None) {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        cursor
            .filter_map(|r| r.ok())
            .filter_map(|d| {
                Some(DailyCount {
                    date: d.get_str("_id").ok()?.to_string(),
                    count: doc_count(&d),
                })
            })
            .collect()
    }

    // ── Contact messages ────────────────────────────────────────────

    fn contact_create(&self, form: &ContactForm) -> Result<i64, String> {
        let id = self.next_id("contacts")?;
        let coll = self.db.collection::<Document>("contacts");
        coll.insert_one(
            doc! {
                "id": id,
                "name": form.name.trim(),
                "email": form.email.trim(),
                "subject": form.subject.trim(),
                "message": form.message.trim(),
                "created_at": rfc3339_now(),
            },
            None,
        )
        .map_err(|e| e.to_string())?;
        Ok(id)
    }

    fn contact_list(&self) -> Vec<ContactMessage> {
        let coll = self.db.collection::<Document>("contacts");
        let opts = FindOptions::builder()
            .sort(doc! { "created_at": -1, "id": -1 })
            .build();
        let cursor = match coll.find(doc! {}, opts) {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        cursor
            .filter_map(|r| r.ok())
            .filter_map(|d| doc_to_contact(&d))
            .collect()
    }

    fn contact_delete(&self, id: i64) -> Result<bool, String> {
        let coll = self.db.collection::<Document>("contacts");
        let result = coll
            .delete_one(doc! { "id": id }, None)
            .map_err(|e| e.to_string())?;
        Ok(result.deleted_count > 0)
    }

    fn contact_count(&self) -> i64 {
        let coll = self.db.collection::<Document>("contacts");
        coll.count_documents(doc! {}, None).unwrap_or(0) as i64
    }

    // ── Service requests ────────────────────────────────────────────

    fn service_request_create(&self, form: &ServiceRequestForm) -> Result<i64, String> {
        let id = self.next_id("service_requests")?;
        let coll = self.db.collection::<Document>("service_requests");
        let company = match &form.company {
            Some(c) => Bson::String(c.clone()),
            None => Bson::Null,
        };
        coll.insert_one(
            doc! {
                "id": id,
                "name": form.name.trim(),
                "email": form.email.trim().to_lowercase(),
                "company": company,
                "service": form.service.as_str(),
                "budget": form.budget.as_str(),
                "timeline": form.timeline.as_str(),
                "description": form.description.trim(),
                "status": RequestStatus::Pending.as_str(),
                "created_at": rfc3339_now(),
                "updated_at": rfc3339_now(),
            },
            None,
        )
        .map_err(|e| e.to_string())?;
        Ok(id)
    }

    fn service_request_list(&self) -> Vec<ServiceRequest> {
        let coll = self.db.collection::<Document>("service_requests");
        let opts = FindOptions::builder()
            .sort(doc! { "created_at": -1, "id": -1 })
            .build();
        let cursor = match coll.find(doc! {}, opts) {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        cursor
            .filter_map(|r| r.ok())
            .filter_map(|d| doc_to_service_request(&d))
            .collect()
    }

    fn service_request_set_status(&self, id: i64, status: RequestStatus) -> Result<bool, String> {
        let coll = self.db.collection::<Document>("service_requests");
        let result = coll
            .update_one(
                doc! { "id": id },
                doc! { "$set": { "status": status.as_str(), "updated_at": rfc3339_now() } },
                None,
            )
            .map_err(|e| e.to_string())?;
        Ok(result.matched_count > 0)
    }

    fn service_request_count(&self) -> i64 {
        let coll = self.db.collection::<Document>("service_requests");
        coll.count_documents(doc! {}, None).unwrap_or(0) as i64
    }

    // ── Newsletter subscribers ──────────────────────────────────────

    fn newsletter_find_by_email(&self, email: &str) -> Option<Subscriber> {
        let coll = self.db.collection::<Document>("newsletter");
        let d = coll.find_one(doc! { "email": email }, None).ok()??;
        doc_to_subscriber(&d)
    }

    fn newsletter_create(&self, email: &str, name: Option<&str>) -> Result<Subscriber, String> {
        let id = self.next_id("newsletter")?;
        let coll = self.db.collection::<Document>("newsletter");
        let name_bson = match name {
            Some(n) => Bson::String(n.to_string()),
            None => Bson::Null,
        };
        coll.insert_one(
            doc! {
                "id": id,
                "email": email,
                "name": name_bson,
                "subscribed": true,
                "created_at": rfc3339_now(),
                "updated_at": rfc3339_now(),
            },
            None,
        )
        .map_err(|e| e.to_string())?;
        self.newsletter_find_by_email(email)
            .ok_or_else(|| "Failed to read back subscriber".to_string())
    }

    fn newsletter_set_subscribed(&self, id: i64, subscribed: bool) -> Result<bool, String> {
        let coll = self.db.collection::<Document>("newsletter");
        let result = coll
            .update_one(
                doc! { "id": id },
                doc! { "$set": { "subscribed": subscribed, "updated_at": rfc3339_now() } },
                None,
            )
            .map_err(|e| e.to_string())?;
        Ok(result.matched_count > 0)
    }

    fn newsletter_list(&self) -> Vec<Subscriber> {
        let coll = self.db.collection::<Document>("newsletter");
        let opts = FindOptions::builder()
            .sort(doc! { "created_at": -1, "id": -1 })
            .build();
        let cursor = match coll.find(doc! {}, opts) {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        cursor
            .filter_map(|r| r.ok())
            .filter_map(|d| doc_to_subscriber(&d))
            .collect()
    }

    fn newsletter_count(&self) -> i64 {
        let coll = self.db.collection::<Document>("newsletter");
        coll.count_documents(doc! {}, None).unwrap_or(0) as i64
    }

    // ── Admin sessions ──────────────────────────────────────────────

    fn session_create(
        &self,
        token: &str,
        expires_at: &str,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<(), String> {
        let coll = self.db.collection::<Document>("sessions");
        let ip_bson = match ip {
            Some(v) => Bson::String(v.to_string()),
            None => Bson::Null,
        };
        let ua_bson = match user_agent {
            Some(v) => Bson::String(v.to_string()),
            None => Bson::Null,
        };
        coll.insert_one(
            doc! {
                "token": token,
                "created_at": chrono::Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string(),
                "expires_at": expires_at,
                "ip_address": ip_bson,
                "user_agent": ua_bson,
            },
            None,
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn session_validate(&self, token: &str) -> bool {
        let coll = self.db.collection::<Document>("sessions");
        let now = chrono::Utc::now()
            .naive_utc()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        coll.count_documents(doc! { "token": token, "expires_at": { "$gt": now } }, None)
            .unwrap_or(0)
            > 0
    }

    fn session_delete(&self, token: &str) -> Result<(), String> {
        let coll = self.db.collection::<Document>("sessions");
        coll.delete_one(doc! { "token": token }, None)
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn session_cleanup_expired(&self) {
        let coll = self.db.collection::<Document>("sessions");
        let now = chrono::Utc::now()
            .naive_utc()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        let _ = coll.delete_many(doc! { "expires_at": { "$lte": now } }, None);
    }
}

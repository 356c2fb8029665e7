use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::AdminSession;
use crate::models::blog::{
    base_slug, dedup_slug, BlogPost, BlogQuery, BlogSummary, Category, NewBlogPost, SortOrder,
};
use crate::routes::{bad_request, internal, not_found, ApiResult};
use crate::store::Store;

/// Public listing: published posts with pagination, filters and derived
/// aggregates (distinct categories, top tags).
#[get("/blogs?<page>&<limit>&<category>&<tag>&<search>&<featured>&<sort>")]
pub fn list_blogs(
    store: &State<Arc<dyn Store>>,
    page: Option<i64>,
    limit: Option<i64>,
    category: Option<String>,
    tag: Option<String>,
    search: Option<String>,
    featured: Option<bool>,
    sort: Option<String>,
) -> Json<Value> {
    let s: &dyn Store = &**store.inner();
    let query = BlogQuery {
        page: page.unwrap_or(1).max(1),
        limit: limit.unwrap_or(10).clamp(1, 100),
        category,
        tag,
        search: search.filter(|q| !q.trim().is_empty()),
        featured: featured.unwrap_or(false),
        sort: SortOrder::parse(sort.as_deref()),
    };

    let (posts, total) = s.blog_list(&query);
    let categories = s.blog_categories();
    let popular_tags = s.blog_popular_tags(10);
    let pages = if total == 0 {
        0
    } else {
        (total + query.limit - 1) / query.limit
    };

    let blogs: Vec<BlogSummary> = posts.into_iter().map(BlogSummary::from).collect();
    Json(json!({
        "blogs": blogs,
        "pagination": {
            "page": query.page,
            "limit": query.limit,
            "total": total,
            "pages": pages,
        },
        "categories": categories,
        "popular_tags": popular_tags,
    }))
}

/// Create a post. Slug is derived from the title and disambiguated with a
/// millisecond timestamp on collision.
#[post("/blogs", format = "json", data = "<form>")]
pub fn create_blog(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    form: Json<NewBlogPost>,
) -> ApiResult<Custom<Json<BlogPost>>> {
    let s: &dyn Store = &**store.inner();

    if form.title.trim().is_empty()
        || form.excerpt.trim().is_empty()
        || form.content.trim().is_empty()
        || form.image.trim().is_empty()
        || form.category.is_empty()
    {
        return Err(bad_request(
            "Missing required fields: title, excerpt, content, image, category",
        ));
    }
    if form.title.trim().len() > 100 {
        return Err(bad_request("Title must be 100 characters or fewer"));
    }
    if form.excerpt.trim().len() > 160 {
        return Err(bad_request("Excerpt must be 160 characters or fewer"));
    }
    let category = Category::parse(&form.category)
        .ok_or_else(|| bad_request(&format!("Unknown category: {}", form.category)))?;

    let mut slug = base_slug(&form.title);
    if slug.is_empty() {
        return Err(bad_request("Title must contain at least one alphanumeric character"));
    }
    if s.blog_slug_exists(&slug) {
        slug = dedup_slug(&slug);
    }

    let mut post = BlogPost::from_form(&form, category, slug);
    let id = s
        .blog_insert(&post)
        .map_err(|e| internal("Blog creation failed", &e))?;
    post.id = id;

    Ok(Custom(Status::Created, Json(post)))
}

/// Fetch a published post: atomically bumps the view counter and returns
/// the updated document with up to three related posts.
#[get("/blogs/<slug>")]
pub fn view_blog(store: &State<Arc<dyn Store>>, slug: &str) -> ApiResult<Json<Value>> {
    let s: &dyn Store = &**store.inner();
    let post = s.blog_view(slug).ok_or_else(|| not_found("Blog not found"))?;

    let related: Vec<BlogSummary> = s
        .blog_related(&post, 3)
        .into_iter()
        .map(BlogSummary::from)
        .collect();

    let mut body = serde_json::to_value(&post)
        .map_err(|e| internal("Blog serialization failed", &e.to_string()))?;
    if let Some(map) = body.as_object_mut() {
        map.insert(
            "related_posts".to_string(),
            serde_json::to_value(related)
                .map_err(|e| internal("Blog serialization failed", &e.to_string()))?,
        );
    }
    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
pub struct BlogAction {
    pub action: String,
}

/// `{"action": "like"}` — best-effort like counter. A client retrying a
/// timed-out request can double-count; there is no idempotency key.
#[patch("/blogs/<slug>", format = "json", data = "<body>")]
pub fn patch_blog(
    store: &State<Arc<dyn Store>>,
    slug: &str,
    body: Json<BlogAction>,
) -> ApiResult<Json<Value>> {
    let s: &dyn Store = &**store.inner();
    if body.action != "like" {
        return Err(bad_request("Invalid action"));
    }
    let likes = s.blog_like(slug).ok_or_else(|| not_found("Blog not found"))?;
    Ok(Json(json!({ "likes": likes })))
}

#[delete("/blogs/<slug>")]
pub fn delete_blog(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    slug: &str,
) -> ApiResult<Json<Value>> {
    let s: &dyn Store = &**store.inner();
    let deleted = s
        .blog_delete(slug)
        .map_err(|e| internal("Blog deletion failed", &e))?;
    if !deleted {
        return Err(not_found("Blog not found"));
    }
    Ok(Json(json!({ "success": true })))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![list_blogs, create_blog, view_blog, patch_blog, delete_blog]
}

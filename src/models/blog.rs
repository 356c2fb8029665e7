use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Closed category set for blog posts. Stored as the display string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "SaaS")]
    SaaS,
    #[serde(rename = "Database")]
    Database,
    #[serde(rename = "Performance")]
    Performance,
    #[serde(rename = "Architecture")]
    Architecture,
    #[serde(rename = "Tutorial")]
    Tutorial,
}

impl Category {
    pub const ALL: &'static [Category] = &[
        Category::WebDevelopment,
        Category::SaaS,
        Category::Database,
        Category::Performance,
        Category::Architecture,
        Category::Tutorial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::WebDevelopment => "Web Development",
            Category::SaaS => "SaaS",
            Category::Database => "Database",
            Category::Performance => "Performance",
            Category::Architecture => "Architecture",
            Category::Tutorial => "Tutorial",
        }
    }

    pub fn parse(s: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub avatar: String,
    pub bio: String,
}

impl Default for Author {
    fn default() -> Self {
        Author {
            name: "Admin".to_string(),
            avatar: String::new(),
            bio: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub image: String,
    pub tags: Vec<String>,
    pub category: Category,
    pub read_time: String,
    pub published: bool,
    pub featured: bool,
    pub views: i64,
    pub likes: i64,
    pub meta_title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub author: Author,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Listing / related-posts projection: everything except the content body.
#[derive(Debug, Serialize)]
pub struct BlogSummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub image: String,
    pub tags: Vec<String>,
    pub category: Category,
    pub read_time: String,
    pub published: bool,
    pub featured: bool,
    pub views: i64,
    pub likes: i64,
    pub meta_title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub author: Author,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<BlogPost> for BlogSummary {
    fn from(p: BlogPost) -> Self {
        BlogSummary {
            id: p.id,
            title: p.title,
            slug: p.slug,
            excerpt: p.excerpt,
            image: p.image,
            tags: p.tags,
            category: p.category,
            read_time: p.read_time,
            published: p.published,
            featured: p.featured,
            views: p.views,
            likes: p.likes,
            meta_title: p.meta_title,
            meta_description: p.meta_description,
            keywords: p.keywords,
            author: p.author,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Creation payload. Category arrives as a plain string so membership
/// failures surface as a 400 instead of a body-parse error.
#[derive(Debug, Deserialize)]
pub struct NewBlogPost {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub image: String,
    pub tags: Option<Vec<String>>,
    pub category: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
}

impl BlogPost {
    /// Assemble a full post from a validated form. The slug must already be
    /// de-duplicated against the store; `id` is assigned on insert.
    pub fn from_form(form: &NewBlogPost, category: Category, slug: String) -> BlogPost {
        let now = chrono::Utc::now().naive_utc();
        let tags = form.tags.clone().unwrap_or_default();
        let keywords = form
            .keywords
            .clone()
            .unwrap_or_else(|| tags.clone());
        BlogPost {
            id: 0,
            title: form.title.trim().to_string(),
            slug,
            excerpt: form.excerpt.trim().to_string(),
            content: form.content.clone(),
            image: form.image.trim().to_string(),
            read_time: read_time(&form.content),
            tags,
            category,
            published: form.published.unwrap_or(true),
            featured: form.featured.unwrap_or(false),
            views: 0,
            likes: 0,
            meta_title: form
                .meta_title
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| form.title.trim().to_string()),
            meta_description: form
                .meta_description
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| form.excerpt.trim().to_string()),
            keywords,
            author: Author::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// URL-safe slug from a title: lowercase, non-alphanumeric runs collapsed
/// to single hyphens, no leading/trailing hyphens.
pub fn base_slug(title: &str) -> String {
    slug::slugify(title.trim())
}

/// Disambiguate a colliding slug by appending the current Unix-millisecond
/// timestamp. A second submission within the same millisecond is not handled.
pub fn dedup_slug(base: &str) -> String {
    format!("{}-{}", base, chrono::Utc::now().timestamp_millis())
}

/// Estimated reading time: strip HTML tags, count words, 200 wpm, minimum 1.
pub fn read_time(content: &str) -> String {
    let text = strip_tags(content);
    let words = text.split_whitespace().count();
    let minutes = (words as f64 / 200.0).ceil().max(1.0) as u64;
    format!("{} min read", minutes)
}

fn strip_tags(html: &str) -> String {
    // A full parser is overkill for a word count.
    let re = regex::Regex::new(r"<[^>]*>").unwrap();
    re.replace_all(html, " ").into_owned()
}

/// Sort orders for the public listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Latest,
    Popular,
    Liked,
}

impl SortOrder {
    pub fn parse(s: Option<&str>) -> SortOrder {
        match s {
            Some("popular") => SortOrder::Popular,
            Some("liked") => SortOrder::Liked,
            _ => SortOrder::Latest,
        }
    }
}

/// Filters for the public listing. Only published posts are ever returned.
#[derive(Debug, Clone)]
pub struct BlogQuery {
    pub page: i64,
    pub limit: i64,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub featured: bool,
    pub sort: SortOrder,
}

impl BlogQuery {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_slug() {
        assert_eq!(base_slug("My Post!"), "my-post");
        assert_eq!(base_slug("  Rust & Rocket: a tour  "), "rust-rocket-a-tour");
        assert_eq!(base_slug("---Already--Hyphenated---"), "already-hyphenated");
    }

    #[test]
    fn test_dedup_slug_appends_suffix() {
        let s = dedup_slug("my-post");
        assert!(s.starts_with("my-post-"));
        assert!(s.len() > "my-post-".len());
    }

    #[test]
    fn test_read_time_strips_markup() {
        let short = "<p>hello world</p>";
        assert_eq!(read_time(short), "1 min read");

        let word = "word ";
        let long = format!("<div>{}</div>", word.repeat(450));
        assert_eq!(read_time(&long), "3 min read");
    }

    #[test]
    fn test_category_round_trip() {
        for c in Category::ALL {
            assert_eq!(Category::parse(c.as_str()), Some(*c));
        }
        assert_eq!(Category::parse("Gardening"), None);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse(Some("popular")), SortOrder::Popular);
        assert_eq!(SortOrder::parse(Some("liked")), SortOrder::Liked);
        assert_eq!(SortOrder::parse(Some("nonsense")), SortOrder::Latest);
        assert_eq!(SortOrder::parse(None), SortOrder::Latest);
    }

    #[test]
    fn test_from_form_defaults() {
        let form = NewBlogPost {
            title: "  Hello  ".to_string(),
            excerpt: "An excerpt".to_string(),
            content: "<p>Body</p>".to_string(),
            image: "https://example.com/a.jpg".to_string(),
            tags: Some(vec!["rust".to_string()]),
            category: "Tutorial".to_string(),
            meta_title: None,
            meta_description: Some(String::new()),
            keywords: None,
            featured: None,
            published: None,
        };
        let post = BlogPost::from_form(&form, Category::Tutorial, "hello".to_string());
        assert_eq!(post.title, "Hello");
        assert_eq!(post.meta_title, "Hello");
        assert_eq!(post.meta_description, "An excerpt");
        assert_eq!(post.keywords, vec!["rust".to_string()]);
        assert!(post.published);
        assert!(!post.featured);
        assert_eq!(post.views, 0);
    }
}

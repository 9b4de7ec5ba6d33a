//! Blog posts, writer verification, and reading history.
//!
//! Writers move through a small state machine: `unregistered → code-sent →
//! verified`. Requesting a code (re)creates the writer record with a fresh
//! six-digit code; verifying requires an exact match inside a one-hour
//! window and clears the code fields for good. Only verified writers can
//! publish, and published posts are prepended so the list stays
//! most-recent-first.
//!
//! Code delivery goes through the [`CodeDelivery`] seam. The default
//! implementation logs the code through the tracing subscriber, a demo
//! stand-in for an email/SMS integration, not something to ship.

mod error;

pub use error::BlogError;

use std::sync::LazyLock;

use chrono::{Duration, Utc};
use rand::Rng;
use regex::Regex;

use ultre_core::{Email, PostId};

use crate::models::blog::{BlogPost, PostSummary, RecentlyViewed, Writer};
use crate::storage::{KeyValueStore, keys};

/// How long a verification code stays redeemable.
pub const VERIFICATION_WINDOW_MINUTES: i64 = 60;

/// Maximum excerpt length in characters, ellipsis included.
pub const EXCERPT_LENGTH: usize = 180;

/// Upper bound on the recently-read history.
pub const RECENTLY_VIEWED_MAX: usize = 12;

/// Author shown for posts that carry none.
const FALLBACK_AUTHOR: &str = "Ultre Team";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Out-of-band delivery of writer verification codes.
pub trait CodeDelivery {
    /// Hand the code to the writer at `email`.
    fn deliver(&self, email: &Email, code: &str);
}

/// Demo delivery: the code goes to the log, nowhere else.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCodeDelivery;

impl CodeDelivery for TracingCodeDelivery {
    fn deliver(&self, email: &Email, code: &str) {
        tracing::info!(%email, code, "verification code issued (demo delivery)");
    }
}

/// Blog service.
pub struct BlogService<'a> {
    store: &'a KeyValueStore,
    delivery: &'a dyn CodeDelivery,
    static_posts: &'a [BlogPost],
}

impl<'a> BlogService<'a> {
    /// Create a new blog service over the shared store.
    ///
    /// `static_posts` is the page-supplied built-in set merged into every
    /// render; pass an empty slice when the page has none.
    #[must_use]
    pub const fn new(
        store: &'a KeyValueStore,
        delivery: &'a dyn CodeDelivery,
        static_posts: &'a [BlogPost],
    ) -> Self {
        Self {
            store,
            delivery,
            static_posts,
        }
    }

    // -- posts -------------------------------------------------------------

    /// The persisted post list, most recent first.
    #[must_use]
    pub fn posts(&self) -> Vec<BlogPost> {
        self.store.get(keys::BLOG_POSTS, Vec::new())
    }

    /// Seed the demo posts when the store holds none.
    ///
    /// Returns whether seeding happened.
    ///
    /// # Errors
    ///
    /// Returns [`BlogError::Storage`] if the seeded list cannot be written.
    pub fn seed(&self) -> Result<bool, BlogError> {
        if !self.posts().is_empty() {
            return Ok(false);
        }
        self.store.set(keys::BLOG_POSTS, &built_in_posts())?;
        tracing::info!("seeded built-in blog posts");
        Ok(true)
    }

    /// Persisted posts followed by the static set.
    #[must_use]
    pub fn merged_posts(&self) -> Vec<BlogPost> {
        let mut merged = self.posts();
        merged.extend(self.static_posts.iter().cloned());
        merged
    }

    /// Render the post list, optionally filtered by category.
    ///
    /// `None` or `"all"` renders everything; otherwise the filter is a
    /// case-insensitive exact match on the post category. Excerpts are
    /// derived by stripping markup and truncating to [`EXCERPT_LENGTH`]
    /// characters with an ellipsis.
    #[must_use]
    pub fn render_posts(&self, category: Option<&str>) -> Vec<PostSummary> {
        self.merged_posts()
            .into_iter()
            .filter(|post| match category {
                None | Some("all") => true,
                Some(wanted) => post
                    .category
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(wanted)),
            })
            .map(|post| summarize(&post))
            .collect()
    }

    /// Resolve a post for the inline viewer and record the view.
    ///
    /// # Errors
    ///
    /// Returns [`BlogError::PostNotFound`] if the ID matches neither a
    /// persisted nor a static post.
    pub fn open_post(&self, id: &PostId) -> Result<BlogPost, BlogError> {
        let post = self
            .merged_posts()
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or(BlogError::PostNotFound)?;
        self.record_view(&post);
        Ok(post)
    }

    /// Publish a post as a verified writer.
    ///
    /// The new post is prepended so the list stays most-recent-first.
    ///
    /// # Errors
    ///
    /// Returns [`BlogError::Validation`] on empty inputs and
    /// [`BlogError::UnverifiedWriter`] when the email does not resolve to
    /// a verified writer.
    pub fn publish(&self, title: &str, email: &str, content: &str) -> Result<BlogPost, BlogError> {
        let title = title.trim();
        let content = content.trim();
        if title.is_empty() || email.trim().is_empty() || content.is_empty() {
            return Err(BlogError::Validation(
                "Please fill title, your verified email and content",
            ));
        }
        let email = Email::parse(email)?;

        let writer = self
            .writers()
            .into_iter()
            .find(|w| w.email.eq_ignore_case(&email) && w.verified)
            .ok_or(BlogError::UnverifiedWriter)?;

        let post = BlogPost {
            id: PostId::generate(),
            title: title.to_owned(),
            content: content.to_owned(),
            excerpt: None,
            author: Some(writer.name),
            email: Some(writer.email),
            verified: true,
            date: Some(Utc::now()),
            category: None,
            image: None,
            read_time: None,
        };

        let mut posts = self.posts();
        posts.insert(0, post.clone());
        self.store.set(keys::BLOG_POSTS, &posts)?;
        tracing::info!(post = %post.id, "post published");
        Ok(post)
    }

    // -- writers -----------------------------------------------------------

    /// The writer records.
    #[must_use]
    pub fn writers(&self) -> Vec<Writer> {
        self.store.get(keys::BLOG_WRITERS, Vec::new())
    }

    /// Start (or restart) writer verification for an email.
    ///
    /// Issues a fresh six-digit code, stamps the send time, resets
    /// `verified`, and hands the code to the delivery seam. Re-requesting
    /// overwrites any outstanding code.
    ///
    /// # Errors
    ///
    /// Returns [`BlogError::Validation`] on empty inputs.
    pub fn request_code(&self, name: &str, email: &str) -> Result<(), BlogError> {
        let name = name.trim();
        if name.is_empty() || email.trim().is_empty() {
            return Err(BlogError::Validation("Please enter name and email"));
        }
        let email = Email::parse(email)?;

        let code = rand::rng().random_range(100_000..1_000_000).to_string();
        let entry = Writer {
            name: name.to_owned(),
            email: email.clone(),
            verified: false,
            code: Some(code.clone()),
            code_sent_at: Some(Utc::now()),
        };

        let mut writers = self.writers();
        match writers.iter_mut().find(|w| w.email.eq_ignore_case(&email)) {
            Some(existing) => *existing = entry,
            None => writers.push(entry),
        }
        self.store.set(keys::BLOG_WRITERS, &writers)?;

        self.delivery.deliver(&email, &code);
        Ok(())
    }

    /// Redeem a verification code.
    ///
    /// On success the writer becomes `verified` and the code fields are
    /// cleared; on any failure the writer stays in `code-sent`.
    ///
    /// # Errors
    ///
    /// Returns [`BlogError::NoVerificationRequest`] for an unknown email,
    /// [`BlogError::ExpiredCode`] when no code is outstanding or the
    /// one-hour window has elapsed, and [`BlogError::InvalidCode`] on a
    /// mismatch.
    pub fn verify(&self, email: &str, code: &str) -> Result<(), BlogError> {
        let email = Email::parse(email)?;
        let mut writers = self.writers();

        let writer = writers
            .iter_mut()
            .find(|w| w.email.eq_ignore_case(&email))
            .ok_or(BlogError::NoVerificationRequest)?;

        let Some(outstanding) = writer.code.as_deref() else {
            return Err(BlogError::ExpiredCode);
        };
        let expired = writer
            .code_sent_at
            .is_none_or(|sent| Utc::now() - sent > Duration::minutes(VERIFICATION_WINDOW_MINUTES));
        if expired {
            return Err(BlogError::ExpiredCode);
        }
        if outstanding != code.trim() {
            return Err(BlogError::InvalidCode);
        }

        writer.verified = true;
        writer.code = None;
        writer.code_sent_at = None;
        self.store.set(keys::BLOG_WRITERS, &writers)?;
        Ok(())
    }

    // -- reading history ---------------------------------------------------

    /// The recently-read history, most recent first.
    #[must_use]
    pub fn recently_viewed(&self) -> Vec<RecentlyViewed> {
        self.store.get(keys::RECENTLY_VIEWED, Vec::new())
    }

    /// Push a post onto the history: dedup by ID, most recent first, cap
    /// at [`RECENTLY_VIEWED_MAX`]. Best-effort; a failed persist is logged.
    fn record_view(&self, post: &BlogPost) {
        let mut history = self.recently_viewed();
        history.retain(|entry| entry.id != post.id);
        history.insert(
            0,
            RecentlyViewed {
                id: post.id.clone(),
                title: post.title.clone(),
                seen_at: Utc::now(),
            },
        );
        history.truncate(RECENTLY_VIEWED_MAX);

        if let Err(err) = self.store.set(keys::RECENTLY_VIEWED, &history) {
            tracing::warn!(%err, "failed to persist reading history");
        }
    }
}

/// Build the rendered-list entry for a post.
fn summarize(post: &BlogPost) -> PostSummary {
    let body = post.content.as_str();
    let source = if body.is_empty() {
        post.excerpt.as_deref().unwrap_or_default()
    } else {
        body
    };

    PostSummary {
        id: post.id.clone(),
        title: post.title.clone(),
        author: post
            .author
            .clone()
            .unwrap_or_else(|| FALLBACK_AUTHOR.to_owned()),
        verified: post.verified,
        excerpt: truncate(&strip_html(source), EXCERPT_LENGTH),
        date: post.date,
        image: post.image.clone(),
        read_time: post.read_time.clone(),
    }
}

/// Drop markup and collapse runs of whitespace.
fn strip_html(html: &str) -> String {
    let text = TAG_RE.replace_all(html, "");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_owned()
}

/// Cap `text` at `len` characters, ellipsis included.
fn truncate(text: &str, len: usize) -> String {
    if text.chars().count() > len {
        let mut out: String = text.chars().take(len.saturating_sub(1)).collect();
        out.push('…');
        out
    } else {
        text.to_owned()
    }
}

/// The three demo posts seeded into an empty store.
#[must_use]
pub fn built_in_posts() -> Vec<BlogPost> {
    let post = |id: &str, title: &str, excerpt: &str, content: &str| BlogPost {
        id: PostId::new(id),
        title: title.to_owned(),
        content: content.to_owned(),
        excerpt: Some(excerpt.to_owned()),
        author: None,
        email: None,
        verified: false,
        date: None,
        category: None,
        image: None,
        read_time: None,
    };

    vec![
        post(
            "post_minimalist-streetwear",
            "Style Tips for 2025: Minimalist Streetwear",
            "Discover clean silhouettes, neutral palettes, and texture play for a refined street look.",
            "<p>Minimalism continues to dominate the streetwear scene in 2025. Designers are \
             focusing on clean silhouettes, thoughtful materials, and small, considered details \
             that elevate a look without loud branding.</p><p>Start with neutral tones: black, \
             white, beige. Introduce texture with loopback fleece, ripstop nylon, or brushed \
             cotton. Keep logos subtle and integrate functional details like reinforced seams \
             and adjustable hems.</p>",
        ),
        post(
            "post_sustainable-fabrics",
            "Sustainable Fabrics: What to Look For",
            "A buyer's guide to recycled fibers, low-impact dyes, and long-lasting craftsmanship.",
            "<p>Sustainable fabrics are not just a trend; they're becoming the industry \
             standard. Recycled polyester, organic cotton, and hemp blends offer reduced \
             environmental impact when sourced correctly.</p><p>Look for certifications and \
             transparency from brands to ensure materials are ethically produced.</p>",
        ),
        post(
            "post_behind-the-scenes",
            "Behind The Scenes: How We Make Our Shirts",
            "From patterning to finishing, a peek into production.",
            "<p>We partner with factories that emphasize careful craftsmanship. Patterns are \
             graded to create consistent sizing, and fabric inspection ensures minimal defects \
             before cutting.</p><p>Finishing touches like pre-washing and enzyme washing extend \
             the life and feel of the garment.</p>",
        ),
    ]
}

//! Directory page model and CRUD operations.
//!
//! A directory page owns the entries listed beneath it and carries the
//! editor-facing copy shown around the listing (sidebar, scanner form,
//! organization details form) plus its pagination settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Largest page size editors may configure.
pub const MAX_PER_PAGE: i16 = 25;

/// Largest orphan allowance editors may configure.
pub const MAX_ORPHANS: i16 = 5;

pub const DEFAULT_PER_PAGE: i16 = 10;
pub const DEFAULT_ORPHANS: i16 = 2;
pub const DEFAULT_SUBMIT_TITLE: &str = "Want to get your instance listed?";
pub const DEFAULT_SUBMIT_BUTTON_TEXT: &str = "Get Started";
pub const DEFAULT_MANAGE_INSTANCES_TEXT: &str = "Manage instances";
pub const DEFAULT_SCANNER_FORM_TITLE: &str = "Scan";
pub const DEFAULT_ORG_DETAILS_FORM_TITLE: &str = "Enter organization details";

const PAGE_COLUMNS: &str = "id, slug, title, live, subtitle, body, source_warning, \
    submit_title, submit_body, submit_button_text, manage_instances_text, faq_link, \
    per_page, orphans, scanner_form_title, scanner_form_text, directory_submission_form, \
    org_details_form_title, org_details_form_text";

/// Directory page record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DirectoryPage {
    pub id: i64,

    /// URL segment the page is served under.
    pub slug: String,

    pub title: String,

    /// Unpublished pages are not served.
    pub live: bool,

    pub subtitle: Option<String>,

    /// Rich text (HTML).
    pub body: Option<String>,

    /// Rich text warning for sources about checking onion addresses.
    pub source_warning: Option<String>,

    pub submit_title: String,

    /// Rich text.
    pub submit_body: Option<String>,

    /// Text displayed on the link to the scanning form.
    pub submit_button_text: String,

    /// Text displayed on the link to the user dashboard.
    pub manage_instances_text: String,

    /// Path of the page linked from the info icon in the table headers.
    pub faq_link: Option<String>,

    /// Number of entries per listing page (1-25).
    pub per_page: i16,

    /// Minimum size of the last page; a smaller remainder is folded into the
    /// preceding page (0-5).
    pub orphans: i16,

    pub scanner_form_title: String,

    /// Rich text.
    pub scanner_form_text: Option<String>,

    /// Path of the form page where admins can submit their instance.
    pub directory_submission_form: Option<String>,

    pub org_details_form_title: String,

    /// Rich text.
    pub org_details_form_text: Option<String>,
}

/// Input for creating a directory page. Unset fields take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateDirectoryPage {
    pub slug: String,
    pub title: String,
    pub live: Option<bool>,
    pub subtitle: Option<String>,
    pub body: Option<String>,
    pub source_warning: Option<String>,
    pub submit_title: Option<String>,
    pub submit_body: Option<String>,
    pub submit_button_text: Option<String>,
    pub manage_instances_text: Option<String>,
    pub faq_link: Option<String>,
    pub per_page: Option<i16>,
    pub orphans: Option<i16>,
    pub scanner_form_title: Option<String>,
    pub scanner_form_text: Option<String>,
    pub directory_submission_form: Option<String>,
    pub org_details_form_title: Option<String>,
    pub org_details_form_text: Option<String>,
}

/// Input for changing the pagination settings of a page.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePagination {
    pub per_page: Option<i16>,
    pub orphans: Option<i16>,
}

/// Validate the pagination settings an editor may store.
pub fn validate_pagination(per_page: i16, orphans: i16) -> Result<()> {
    if !(1..=MAX_PER_PAGE).contains(&per_page) {
        anyhow::bail!("per_page must be between 1 and {MAX_PER_PAGE}, got {per_page}");
    }
    if !(0..=MAX_ORPHANS).contains(&orphans) {
        anyhow::bail!("orphans must be between 0 and {MAX_ORPHANS}, got {orphans}");
    }
    Ok(())
}

fn validate_length(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        anyhow::bail!("{field} must be at most {max} characters, got {len}");
    }
    Ok(())
}

/// Related-page links are site-relative paths.
fn validate_link_path(field: &str, path: &str) -> Result<()> {
    if !path.starts_with('/') || path.starts_with("//") {
        anyhow::bail!("{field} must be a site-relative path starting with '/', got '{path}'");
    }
    validate_length(field, path, 255)
}

fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > 255 {
        anyhow::bail!("slug must be 1-255 characters, got '{slug}'");
    }
    if !slug
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
    {
        anyhow::bail!("slug may only contain lowercase letters, digits, '-' and '_', got '{slug}'");
    }
    Ok(())
}

impl CreateDirectoryPage {
    /// Resolve defaults into a full page record (id 0, not yet stored).
    pub fn into_page(self) -> Result<DirectoryPage> {
        let page = DirectoryPage {
            id: 0,
            slug: self.slug.trim().to_string(),
            title: self.title.trim().to_string(),
            live: self.live.unwrap_or(true),
            subtitle: self.subtitle,
            body: self.body,
            source_warning: self.source_warning,
            submit_title: self
                .submit_title
                .unwrap_or_else(|| DEFAULT_SUBMIT_TITLE.to_string()),
            submit_body: self.submit_body,
            submit_button_text: self
                .submit_button_text
                .unwrap_or_else(|| DEFAULT_SUBMIT_BUTTON_TEXT.to_string()),
            manage_instances_text: self
                .manage_instances_text
                .unwrap_or_else(|| DEFAULT_MANAGE_INSTANCES_TEXT.to_string()),
            faq_link: self.faq_link,
            per_page: self.per_page.unwrap_or(DEFAULT_PER_PAGE),
            orphans: self.orphans.unwrap_or(DEFAULT_ORPHANS),
            scanner_form_title: self
                .scanner_form_title
                .unwrap_or_else(|| DEFAULT_SCANNER_FORM_TITLE.to_string()),
            scanner_form_text: self.scanner_form_text,
            directory_submission_form: self.directory_submission_form,
            org_details_form_title: self
                .org_details_form_title
                .unwrap_or_else(|| DEFAULT_ORG_DETAILS_FORM_TITLE.to_string()),
            org_details_form_text: self.org_details_form_text,
        };
        page.validate()?;
        Ok(page)
    }
}

impl DirectoryPage {
    /// Check field limits and pagination settings.
    pub fn validate(&self) -> Result<()> {
        validate_slug(&self.slug)?;
        if self.title.trim().is_empty() {
            anyhow::bail!("page title must not be empty");
        }
        validate_length("title", &self.title, 255)?;
        if let Some(ref subtitle) = self.subtitle {
            validate_length("subtitle", subtitle, 255)?;
        }
        validate_length("submit_title", &self.submit_title, 255)?;
        validate_length("submit_button_text", &self.submit_button_text, 100)?;
        validate_length("manage_instances_text", &self.manage_instances_text, 100)?;
        validate_length("scanner_form_title", &self.scanner_form_title, 100)?;
        validate_length("org_details_form_title", &self.org_details_form_title, 100)?;
        if let Some(ref link) = self.faq_link {
            validate_link_path("faq_link", link)?;
        }
        if let Some(ref link) = self.directory_submission_form {
            validate_link_path("directory_submission_form", link)?;
        }
        validate_pagination(self.per_page, self.orphans)
    }

    /// Page size as used by the paginator.
    pub fn page_size(&self) -> u32 {
        u32::try_from(self.per_page).unwrap_or(1).max(1)
    }

    /// Orphan allowance as used by the paginator.
    pub fn orphan_allowance(&self) -> u32 {
        u32::try_from(self.orphans).unwrap_or(0)
    }

    /// Find a page by ID.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM directory_page WHERE id = $1");
        let page = sqlx::query_as::<_, DirectoryPage>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch directory page by id")?;

        Ok(page)
    }

    /// Find a page by slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM directory_page WHERE slug = $1");
        let page = sqlx::query_as::<_, DirectoryPage>(&sql)
            .bind(slug)
            .fetch_optional(pool)
            .await
            .context("failed to fetch directory page by slug")?;

        Ok(page)
    }

    /// Create a page.
    pub async fn create(pool: &PgPool, input: CreateDirectoryPage) -> Result<Self> {
        let page = input.into_page()?;

        let sql = format!(
            r#"
            INSERT INTO directory_page (
                slug, title, live, subtitle, body, source_warning,
                submit_title, submit_body, submit_button_text, manage_instances_text,
                faq_link, per_page, orphans, scanner_form_title, scanner_form_text,
                directory_submission_form, org_details_form_title, org_details_form_text
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {PAGE_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, DirectoryPage>(&sql)
            .bind(&page.slug)
            .bind(&page.title)
            .bind(page.live)
            .bind(&page.subtitle)
            .bind(&page.body)
            .bind(&page.source_warning)
            .bind(&page.submit_title)
            .bind(&page.submit_body)
            .bind(&page.submit_button_text)
            .bind(&page.manage_instances_text)
            .bind(&page.faq_link)
            .bind(page.per_page)
            .bind(page.orphans)
            .bind(&page.scanner_form_title)
            .bind(&page.scanner_form_text)
            .bind(&page.directory_submission_form)
            .bind(&page.org_details_form_title)
            .bind(&page.org_details_form_text)
            .fetch_one(pool)
            .await
            .context("failed to create directory page")?;

        Ok(created)
    }

    /// Change the pagination settings of a page.
    pub async fn update_pagination(
        pool: &PgPool,
        id: i64,
        input: UpdatePagination,
    ) -> Result<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let per_page = input.per_page.unwrap_or(current.per_page);
        let orphans = input.orphans.unwrap_or(current.orphans);
        validate_pagination(per_page, orphans)?;

        sqlx::query("UPDATE directory_page SET per_page = $1, orphans = $2 WHERE id = $3")
            .bind(per_page)
            .bind(orphans)
            .bind(id)
            .execute(pool)
            .await
            .context("failed to update directory page pagination")?;

        Self::find_by_id(pool, id).await
    }
}

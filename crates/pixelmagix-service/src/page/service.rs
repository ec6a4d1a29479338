//! Page CRUD. Incoming page data runs through the page-save hooks before it
//! is validated and stored.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use pixelmagix_core::error::AppError;
use pixelmagix_database::repositories::page::PageRepository;
use pixelmagix_entity::page::{Page, PageInput, PageWithSections, SavePage};
use pixelmagix_plugin::HookPoint;
use pixelmagix_plugin::manager::PluginManager;

use super::render;

/// Title given to pages created without one.
pub const DEFAULT_TITLE: &str = "New page";

/// Largest page size accepted by [`PageService::list`].
pub const MAX_LIMIT: i64 = 500;

/// Listing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPagesQuery {
    /// Number of pages to skip.
    #[serde(default)]
    pub skip: i64,
    /// Maximum number of pages to return.
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Only return published pages.
    #[serde(default)]
    pub published_only: bool,
}

impl Default for ListPagesQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
            published_only: false,
        }
    }
}

fn default_limit() -> i64 {
    100
}

/// Manages landing pages.
#[derive(Debug, Clone)]
pub struct PageService {
    /// Page repository.
    repo: Arc<PageRepository>,
    /// Plugin manager for firing hooks.
    plugins: Arc<PluginManager>,
}

impl PageService {
    /// Creates a new page service.
    pub fn new(repo: Arc<PageRepository>, plugins: Arc<PluginManager>) -> Self {
        Self { repo, plugins }
    }

    /// Lists pages ordered by ID.
    pub async fn list(&self, query: &ListPagesQuery) -> Result<Vec<Page>, AppError> {
        if query.skip < 0 || query.limit < 1 || query.limit > MAX_LIMIT {
            return Err(AppError::validation(format!(
                "skip must be >= 0 and limit between 1 and {MAX_LIMIT}"
            )));
        }
        self.repo
            .find_all(query.skip, query.limit, query.published_only)
            .await
    }

    /// Gets a page with its sections.
    pub async fn get(&self, id: i64) -> Result<PageWithSections, AppError> {
        let page = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Page {id} not found")))?;
        self.with_sections(page).await
    }

    /// Gets a page by slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<PageWithSections, AppError> {
        let page = self
            .repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Page '{slug}' not found")))?;
        self.with_sections(page).await
    }

    /// Creates a page.
    pub async fn create(&self, input: PageInput) -> Result<PageWithSections, AppError> {
        let input = self.run_save_hooks(input).await;

        let data = SavePage::from_input(&input, DEFAULT_TITLE, default_slug());
        validate(&data)?;
        if self.repo.slug_taken(&data.slug, None).await? {
            return Err(slug_conflict(&data.slug));
        }

        let sections = input.sections.unwrap_or_default();
        let page = self.repo.create(&data, &sections).await?;
        let stored = self.with_sections(page).await?;

        info!(page_id = stored.page.id, slug = %stored.page.slug, "Page created");
        self.after_save(&stored).await;
        Ok(stored)
    }

    /// Updates a page. Absent fields keep their stored values; sections are
    /// replaced only when given.
    pub async fn update(&self, id: i64, mut input: PageInput) -> Result<PageWithSections, AppError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Page {id} not found")))?;

        input.fill_from(&existing);
        let input = self.run_save_hooks(input).await;

        let data = SavePage::merged(&existing, &input);
        validate(&data)?;
        if data.slug != existing.slug && self.repo.slug_taken(&data.slug, Some(id)).await? {
            return Err(slug_conflict(&data.slug));
        }

        let page = self
            .repo
            .update(id, &data, input.sections.as_deref())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Page {id} not found")))?;
        let stored = self.with_sections(page).await?;

        info!(page_id = id, slug = %stored.page.slug, "Page updated");
        self.after_save(&stored).await;
        Ok(stored)
    }

    /// Deletes a page and its sections.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found(format!("Page {id} not found")));
        }
        info!(page_id = id, "Page deleted");
        self.plugins
            .notify(HookPoint::AfterPageDelete.as_str(), &json!({ "id": id }))
            .await;
        Ok(())
    }

    /// Renders a page to a complete HTML document, passed through the
    /// render hooks.
    pub async fn render(&self, id: i64) -> Result<String, AppError> {
        let page = self.get(id).await?;
        self.render_page(&page).await
    }

    /// Renders an already loaded page.
    pub async fn render_page(&self, page: &PageWithSections) -> Result<String, AppError> {
        let document = render::document(&page.page);
        let context = serde_json::to_value(page)?;
        Ok(self.plugins.process_page_render(document, &context).await)
    }

    async fn with_sections(&self, page: Page) -> Result<PageWithSections, AppError> {
        let sections = self.repo.sections(page.id).await?;
        Ok(PageWithSections { page, sections })
    }

    /// Passes the submitted fields through the page-save hooks. A hook result
    /// that no longer reads as page data is dropped in favour of the input.
    async fn run_save_hooks(&self, input: PageInput) -> PageInput {
        let payload = match serde_json::to_value(&input) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Page input not serializable, skipping save hooks");
                return input;
            }
        };

        let transformed = self.plugins.process_page_save(payload).await;
        match serde_json::from_value::<PageInput>(transformed) {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "Page-save hooks produced invalid page data, ignoring");
                input
            }
        }
    }

    async fn after_save(&self, page: &PageWithSections) {
        match serde_json::to_value(page) {
            Ok(payload) => {
                self.plugins
                    .notify(HookPoint::AfterPageSave.as_str(), &payload)
                    .await;
            }
            Err(e) => warn!(page_id = page.page.id, error = %e, "Skipping after_page_save"),
        }
    }
}

fn default_slug() -> String {
    Utc::now().format("page-%Y%m%d-%H%M%S").to_string()
}

fn validate(data: &SavePage) -> Result<(), AppError> {
    if data.title.trim().is_empty() {
        return Err(AppError::validation("Page title must not be empty"));
    }
    if data.slug.is_empty()
        || !data
            .slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::validation(format!(
            "Invalid page slug '{}': use letters, digits, '-' and '_'",
            data.slug
        )));
    }
    if !data.metadata.is_object() {
        return Err(AppError::validation("Page metadata must be a JSON object"));
    }
    Ok(())
}

fn slug_conflict(slug: &str) -> AppError {
    AppError::conflict(format!("Page slug '{slug}' is already in use"))
}

/// Parses a page JSON body, for callers that hold raw JSON.
pub fn parse_input(value: Value) -> Result<PageInput, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::validation(format!("Invalid page data: {e}")))
}

//! Static export of a page into `<export_dir>/<slug>_<timestamp>_<id>/`.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use pixelmagix_core::error::{AppError, ErrorKind};
use pixelmagix_core::markup;
use pixelmagix_entity::page::Page;

use super::render::{SCRIPT, STYLESHEET};
use super::service::PageService;

/// Where an export was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResult {
    /// Exported page.
    pub page_id: i64,
    /// Export directory.
    pub directory: PathBuf,
    /// Files written into the directory.
    pub files: Vec<String>,
    /// Zip archive beside the directory, when requested.
    pub archive: Option<PathBuf>,
}

/// Writes rendered pages to disk.
#[derive(Debug, Clone)]
pub struct ExportService {
    /// Page service used to load and render.
    pages: PageService,
    /// Root export directory.
    export_dir: PathBuf,
}

impl ExportService {
    /// Creates a new export service.
    pub fn new(pages: PageService, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            pages,
            export_dir: export_dir.into(),
        }
    }

    /// Exports a page: `index.html` (through the render hooks), `style.css`,
    /// `script.js` when the page has a script, `metadata.json`, `sitemap.xml`
    /// and `robots.txt`.
    ///
    /// Every export gets a fresh directory; an existing one is never reused.
    pub async fn export(&self, page_id: i64, with_archive: bool) -> Result<ExportResult, AppError> {
        let page = self.pages.get(page_id).await?;
        let html = self.pages.render_page(&page).await?;
        let page = page.page;

        let id = Uuid::new_v4().simple().to_string();
        let name = format!(
            "{}_{}_{}",
            page.slug,
            Local::now().format("%Y%m%d_%H%M%S"),
            &id[..8]
        );
        let directory = self.export_dir.join(&name);
        tokio::fs::create_dir_all(&self.export_dir).await?;
        tokio::fs::create_dir(&directory).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create export directory '{name}'"),
                e,
            )
        })?;

        let mut files = Vec::new();
        write(&directory, "index.html", html.as_bytes(), &mut files).await?;
        write(&directory, STYLESHEET, page.css_content.as_bytes(), &mut files).await?;
        if !page.js_content.trim().is_empty() {
            write(&directory, SCRIPT, page.js_content.as_bytes(), &mut files).await?;
        }

        let metadata = json!({
            "page_id": page.id,
            "title": page.title,
            "description": page.description,
            "slug": page.slug,
            "exported_at": Utc::now().to_rfc3339(),
            "generator": format!("pixelmagix {}", env!("CARGO_PKG_VERSION")),
        });
        let metadata = serde_json::to_vec_pretty(&metadata)?;
        write(&directory, "metadata.json", &metadata, &mut files).await?;
        write(&directory, "sitemap.xml", sitemap(&page).as_bytes(), &mut files).await?;
        write(&directory, "robots.txt", ROBOTS_TXT.as_bytes(), &mut files).await?;

        let archive = if with_archive {
            let source = directory.clone();
            let path = tokio::task::spawn_blocking(move || zip_directory(&source))
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Internal, "Export archive task failed", e)
                })??;
            Some(path)
        } else {
            None
        };

        info!(
            page_id = page.id,
            path = %directory.display(),
            archive = archive.is_some(),
            "Page exported"
        );

        Ok(ExportResult {
            page_id: page.id,
            directory,
            files,
            archive,
        })
    }
}

const ROBOTS_TXT: &str = "User-agent: *\nAllow: /\n\nSitemap: /sitemap.xml\n";

/// Single-entry sitemap. The location is `metadata.seo.canonical_url` when
/// set, otherwise the exported `index.html`.
fn sitemap(page: &Page) -> String {
    let loc = page
        .metadata
        .get("seo")
        .and_then(|seo| seo.get("canonical_url"))
        .and_then(Value::as_str)
        .unwrap_or("/index.html");

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>{loc}</loc>
    <lastmod>{lastmod}</lastmod>
    <changefreq>monthly</changefreq>
    <priority>0.8</priority>
  </url>
</urlset>
"#,
        loc = markup::escape(loc),
        lastmod = page.updated_at.format("%Y-%m-%d"),
    )
}

async fn write(
    dir: &Path,
    name: &str,
    contents: &[u8],
    files: &mut Vec<String>,
) -> Result<(), AppError> {
    tokio::fs::write(dir.join(name), contents).await?;
    files.push(name.to_string());
    Ok(())
}

/// Zips `dir` into `<dir>.zip`, entries prefixed with the directory name.
fn zip_directory(dir: &Path) -> Result<PathBuf, AppError> {
    let mut target = dir.as_os_str().to_owned();
    target.push(".zip");
    let target = PathBuf::from(target);

    let prefix = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut writer = ZipWriter::new(File::create(&target)?);
    let options = SimpleFileOptions::default();

    let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = format!("{prefix}/{}", entry.file_name().to_string_lossy());
        writer
            .start_file(name, options)
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to write archive", e))?;
        writer.write_all(&std::fs::read(entry.path())?)?;
    }
    writer
        .finish()
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to finish archive", e))?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::page::service::parse_input;
    use crate::test_support::setup;
    use pixelmagix_database::repositories::page::PageRepository;

    #[tokio::test]
    async fn test_export_writes_files_and_archive() {
        let dir = tempfile::tempdir().unwrap();
        let (pool, plugins) = setup(&dir.path().join("plugins")).await;
        let pages = PageService::new(Arc::new(PageRepository::new(pool)), plugins);
        let page = pages
            .create(
                parse_input(json!({
                    "title": "Launch",
                    "slug": "launch",
                    "css_content": "body{}",
                    "js_content": "init()"
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        let exports = ExportService::new(pages, dir.path().join("exports"));
        let result = exports.export(page.page.id, true).await.unwrap();

        assert_eq!(
            result.files,
            vec![
                "index.html",
                "style.css",
                "script.js",
                "metadata.json",
                "sitemap.xml",
                "robots.txt"
            ]
        );
        assert!(
            result
                .directory
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("launch_")
        );
        let index = std::fs::read_to_string(result.directory.join("index.html")).unwrap();
        assert!(index.contains("<title>Launch</title>"));
        let metadata: serde_json::Value = serde_json::from_slice(
            &std::fs::read(result.directory.join("metadata.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(metadata["page_id"], page.page.id);

        let archive = result.archive.unwrap();
        let reader = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        assert_eq!(reader.len(), 6);

        let sitemap = std::fs::read_to_string(result.directory.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>/index.html</loc>"));
        assert!(sitemap.contains(&format!(
            "<lastmod>{}</lastmod>",
            page.page.updated_at.format("%Y-%m-%d")
        )));
        let robots = std::fs::read_to_string(result.directory.join("robots.txt")).unwrap();
        assert!(robots.contains("Sitemap: /sitemap.xml"));
    }

    #[tokio::test]
    async fn test_back_to_back_exports_use_separate_directories() {
        let dir = tempfile::tempdir().unwrap();
        let (pool, plugins) = setup(&dir.path().join("plugins")).await;
        let pages = PageService::new(Arc::new(PageRepository::new(pool)), plugins);
        let page = pages
            .create(parse_input(json!({"title": "Launch", "slug": "launch"})).unwrap())
            .await
            .unwrap();
        let exports = ExportService::new(pages, dir.path().join("exports"));

        let first = exports.export(page.page.id, false).await.unwrap();
        let second = exports.export(page.page.id, false).await.unwrap();

        assert_ne!(first.directory, second.directory);
        assert!(first.directory.join("index.html").is_file());
        assert!(second.directory.join("index.html").is_file());
    }

    #[test]
    fn test_sitemap_prefers_canonical_url() {
        let now = Utc::now();
        let page = Page {
            id: 1,
            title: "Launch".into(),
            slug: "launch".into(),
            description: None,
            html_content: String::new(),
            css_content: String::new(),
            js_content: String::new(),
            components: json!([]),
            styles: json!({}),
            metadata: json!({"seo": {"canonical_url": "https://x.test/?a=1&b=2"}}),
            is_published: true,
            created_at: now,
            updated_at: now,
        };
        assert!(sitemap(&page).contains("<loc>https://x.test/?a=1&amp;b=2</loc>"));
    }

    #[tokio::test]
    async fn test_export_unknown_page() {
        let dir = tempfile::tempdir().unwrap();
        let (pool, plugins) = setup(dir.path()).await;
        let pages = PageService::new(Arc::new(PageRepository::new(pool)), plugins);
        let exports = ExportService::new(pages, dir.path().join("exports"));

        let err = exports.export(42, false).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}

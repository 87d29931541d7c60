//! robots.txt and sitemap.xml.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::app::AppState;
use crate::config::SeoConfig;

fn site_root(config: &SeoConfig) -> &str {
    config.site_url.trim_end_matches('/')
}

pub fn render_robots(config: &SeoConfig) -> String {
    let mut body = String::from("User-agent: *\nAllow: /\n");
    for path in &config.disallowed_paths {
        body.push_str(&format!("Disallow: {}\n", path));
    }
    body.push_str(&format!("\nSitemap: {}/sitemap.xml\n", site_root(config)));
    body
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn render_sitemap(config: &SeoConfig, lastmod: &str) -> String {
    let root = site_root(config);
    let mut body = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for path in &config.public_paths {
        let (changefreq, priority) = if path == "/" {
            ("weekly", "1.0")
        } else {
            ("monthly", "0.8")
        };
        body.push_str(&format!(
            "  <url>\n    <loc>{}{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{}</priority>\n  </url>\n",
            xml_escape(root),
            xml_escape(path),
            lastmod,
            changefreq,
            priority
        ));
    }
    body.push_str("</urlset>\n");
    body
}

/// GET /robots.txt
pub async fn robots_txt(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_robots(&state.config.seo),
    )
        .into_response()
}

/// GET /sitemap.xml
pub async fn sitemap_xml(State(state): State<AppState>) -> Response {
    let lastmod = Utc::now().date_naive().to_string();
    (
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        render_sitemap(&state.config.seo, &lastmod),
    )
        .into_response()
}

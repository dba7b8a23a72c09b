//! RSS feed and sitemap.

use actix_web::{HttpResponse, http::header, web};
use chrono::{DateTime, Utc};

use folio_core::domain::{Post, PostFilter};

use crate::config::SiteConfig;
use crate::middleware::error::AppResult;
use crate::state::AppState;

const FEED_SIZE: u64 = 50;
const SITEMAP_PAGE_SIZE: u64 = 100;
const FEED_CACHE_CONTROL: &str = "public, max-age=3600, stale-while-revalidate=600";

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn rfc822(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}

fn post_url(site: &SiteConfig, slug: &str) -> String {
    format!("{}/blog/{}", site.url, slug)
}

fn render_rss(site: &SiteConfig, posts: &[Post]) -> String {
    let mut items = String::new();
    for post in posts {
        let link = escape_xml(&post_url(site, &post.slug));
        items.push_str(&format!(
            "    <item>\n\
             \x20     <title>{}</title>\n\
             \x20     <link>{}</link>\n\
             \x20     <description>{}</description>\n\
             \x20     <pubDate>{}</pubDate>\n\
             \x20     <guid isPermaLink=\"true\">{}</guid>\n\
             \x20   </item>\n",
            escape_xml(&post.title),
            link,
            escape_xml(post.description.as_deref().unwrap_or("")),
            rfc822(&post.created_at),
            link,
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>{}</title>
    <link>{}</link>
    <description>{}</description>
    <language>en-us</language>
    <atom:link href="{}" rel="self" type="application/rss+xml"/>
    <lastBuildDate>{}</lastBuildDate>
{}  </channel>
</rss>"#,
        escape_xml(&site.title),
        escape_xml(&format!("{}/blog", site.url)),
        escape_xml(&site.description),
        escape_xml(&format!("{}/rss.xml", site.url)),
        posts.first().map(|p| rfc822(&p.created_at)).unwrap_or_default(),
        items,
    )
}

fn sitemap_entry(loc: &str, lastmod: Option<&DateTime<Utc>>) -> String {
    match lastmod {
        Some(dt) => format!(
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n  </url>\n",
            escape_xml(loc),
            dt.format("%Y-%m-%d")
        ),
        None => format!("  <url>\n    <loc>{}</loc>\n  </url>\n", escape_xml(loc)),
    }
}

/// GET /rss.xml
pub async fn rss_feed(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let filter = PostFilter {
        page_size: FEED_SIZE,
        ..PostFilter::default()
    };
    let page = state.posts.list(&filter).await?;

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "application/rss+xml; charset=utf-8"))
        .insert_header((header::CACHE_CONTROL, FEED_CACHE_CONTROL))
        .body(render_rss(&state.site, &page.items)))
}

/// GET /sitemap.xml
pub async fn sitemap(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let site = &state.site;
    let mut urls = String::new();
    urls.push_str(&sitemap_entry(&format!("{}/blog", site.url), None));

    for category in state.categories.list(true).await? {
        let loc = format!("{}/blog?category={}", site.url, category.slug);
        urls.push_str(&sitemap_entry(&loc, Some(&category.updated_at)));
    }

    let mut filter = PostFilter {
        page_size: SITEMAP_PAGE_SIZE,
        ..PostFilter::default()
    };
    loop {
        let page = state.posts.list(&filter).await?;
        for post in &page.items {
            urls.push_str(&sitemap_entry(&post_url(site, &post.slug), Some(&post.updated_at)));
        }
        if page.items.is_empty() || filter.page * filter.page_size >= page.total {
            break;
        }
        filter.page += 1;
    }

    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{urls}</urlset>\n"
    );

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "application/xml; charset=utf-8"))
        .insert_header((header::CACHE_CONTROL, FEED_CACHE_CONTROL))
        .body(xml))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn site() -> SiteConfig {
        SiteConfig {
            url: "https://blog.example".to_string(),
            title: "Notes & Things".to_string(),
            description: "Writing".to_string(),
        }
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<title>"), "&lt;title&gt;");
        assert_eq!(escape_xml("\"it's\""), "&quot;it&apos;s&quot;");
    }

    #[test]
    fn test_rfc822_format() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(rfc822(&dt), "Mon, 15 Jan 2024 12:00:00 +0000");
    }

    #[test]
    fn test_render_rss_escapes_and_links() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let post = Post {
            id: 1,
            category_id: 1,
            title: "Fish & Chips".to_string(),
            slug: "fish-and-chips".to_string(),
            description: None,
            keywords: None,
            thumbnail_url: None,
            content: None,
            is_published: true,
            created_at: now,
            updated_at: now,
        };

        let xml = render_rss(&site(), &[post]);
        assert!(xml.contains("<title>Notes &amp; Things</title>"));
        assert!(xml.contains("<title>Fish &amp; Chips</title>"));
        assert!(xml.contains("<link>https://blog.example/blog/fish-and-chips</link>"));
        assert!(xml.contains("<lastBuildDate>Fri, 01 Mar 2024 08:30:00 +0000</lastBuildDate>"));
    }

    #[test]
    fn test_render_rss_empty() {
        let xml = render_rss(&site(), &[]);
        assert!(xml.contains("<lastBuildDate></lastBuildDate>"));
        assert!(!xml.contains("<item>"));
    }
}

//! Tests for the theme engine

use super::*;
use chrono::{TimeZone, Utc};
use serde_json::json;

fn engine() -> ThemeEngine {
    ThemeEngine::new().expect("Embedded templates should compile")
}

fn article_json() -> serde_json::Value {
    json!({
        "id": 7,
        "title": "Hello <World>",
        "content": "Body text",
        "author": "alice",
        "created_at": Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
    })
}

fn pagination_json(current_page: i64, total_pages: i64) -> serde_json::Value {
    json!({
        "current_page": current_page,
        "total_pages": total_pages,
        "page_size": 10,
        "total_records": total_pages * 10,
    })
}

#[test]
fn test_every_view_has_a_template() {
    let engine = engine();
    for view in View::ALL {
        assert!(
            engine.tera.get_template_names().any(|n| n == view.template()),
            "missing template for {:?}",
            view
        );
    }
}

#[test]
fn test_missing_view_template_fails_startup() {
    let result = ThemeEngine::from_templates([("index.html", "<p>only one</p>")]);
    let err = result.err().expect("Should fail").to_string();
    assert!(err.contains("Template not found"));
}

#[test]
fn test_broken_template_fails_startup() {
    let result = ThemeEngine::from_templates([("index.html", "{% if %}")]);
    assert!(result.is_err());
}

#[test]
fn test_render_home() {
    let mut summary = article_json();
    summary["comment_count"] = json!(2);

    let mut ctx = TeraContext::new();
    ctx.insert("articles", &vec![summary]);
    ctx.insert("pagination", &pagination_json(1, 3));
    ctx.insert("has_previous", &false);
    ctx.insert("has_next", &true);

    let html = engine().render(View::Home, &ctx).expect("Home should render");

    assert!(html.contains("/articles/7"));
    assert!(html.contains("2 comments"));
    assert!(html.contains("2024-03-01 12:30"));
    assert!(html.contains("/?page=2"));
    assert!(!html.contains("Newer"));
    // autoescaped
    assert!(html.contains("Hello &lt;World&gt;"));
}

#[test]
fn test_render_home_shows_user_links() {
    let mut ctx = TeraContext::new();
    ctx.insert("articles", &Vec::<serde_json::Value>::new());
    ctx.insert("pagination", &pagination_json(1, 0));
    ctx.insert("has_previous", &false);
    ctx.insert("has_next", &false);
    ctx.insert("current_user", "alice");

    let html = engine().render(View::Home, &ctx).unwrap();

    assert!(html.contains("Signed in as alice"));
    assert!(html.contains("/logout"));
    assert!(html.contains("No articles yet."));
}

#[test]
fn test_render_articles() {
    let mut summary = article_json();
    summary["comment_count"] = json!(1);

    let mut ctx = TeraContext::new();
    ctx.insert("articles", &vec![summary]);
    ctx.insert("total_count", &11);
    ctx.insert("current_page", &2);
    ctx.insert("page_size", &10);
    ctx.insert("has_previous", &true);
    ctx.insert("has_next", &false);

    let html = engine().render(View::Articles, &ctx).unwrap();

    assert!(html.contains("11 articles in total"));
    assert!(html.contains("1 comment<"));
    assert!(html.contains("page=1"));
    assert!(!html.contains("page=3"));
}

#[test]
fn test_render_article_with_comments() {
    let mut article = article_json();
    article["comments"] = json!([
        {
            "id": 1,
            "article_id": 7,
            "content": "First!",
            "author": "bob",
            "created_at": Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap(),
        }
    ]);

    let mut ctx = TeraContext::new();
    ctx.insert("article", &article);

    let html = engine().render(View::Article, &ctx).unwrap();

    assert!(html.contains("Body text"));
    assert!(html.contains("First!"));
    assert!(html.contains("Comments (1)"));
    assert!(html.contains("/new-comment/7"));
    // edit controls hidden from anonymous readers
    assert!(!html.contains("/edit-article/7"));
}

#[test]
fn test_render_forms() {
    let engine = engine();

    let mut ctx = TeraContext::new();
    ctx.insert("current_user", "alice");
    let html = engine.render(View::NewArticle, &ctx).unwrap();
    assert!(html.contains("action=\"/new-article\""));
    assert!(html.contains("value=\"alice\""));

    ctx.insert("article", &article_json());
    let html = engine.render(View::EditArticle, &ctx).unwrap();
    assert!(html.contains("action=\"/edit-article/7\""));
    assert!(html.contains("Body text"));

    let empty = TeraContext::new();
    let html = engine.render(View::Register, &empty).unwrap();
    assert!(html.contains("action=\"/register\""));
    let html = engine.render(View::Login, &empty).unwrap();
    assert!(html.contains("action=\"/login\""));
}

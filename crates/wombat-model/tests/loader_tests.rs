//! Tests for opening and closing documents.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Site, model_with};
use wombat_dom::ns;
use wombat_model::{
    Document, DocumentKind, Event, EventKind, EventLog, ModelError, Response, View,
    scan_document_links,
};

const ICON: &str = "test://site/icon.svg";
const ICON_CSS: &str = "test://site/icon.css";

fn icon_site() -> Site {
    Site::new()
        .page(
            ICON,
            "image/svg+xml",
            r#"<?xml-stylesheet href="icon.css" type="text/css"?>
<svg xmlns="http://www.w3.org/2000/svg"><circle id="dot" r="4"/></svg>"#,
        )
        .page(ICON_CSS, "text/css", "circle { fill: red }")
}

fn logged_view(model: &wombat_model::Model) -> (View, EventLog) {
    let view = model.create_view();
    let log = EventLog::new();
    view.add_handler(log.clone());
    (view, log)
}

fn trace(log: &EventLog) -> Vec<(EventKind, Option<String>)> {
    log.events()
        .into_iter()
        .map(|event| (event.kind, event.target))
        .collect()
}

// ========== data: documents ==========

#[tokio::test]
async fn test_open_css_data_url() {
    let model = model_with(&Arc::new(Site::new()));
    let view = model.create_view();
    let document = model
        .open_document(&view, "data:text/css,a{color:red}")
        .await
        .unwrap()
        .unwrap();

    let css = document.as_css().unwrap();
    let tree = wombat_xml::parse_xml("<a/>").unwrap();
    let a = tree.document_element().unwrap();
    let matched = css
        .matcher(None)
        .match_element(&tree, a, None, &wombat_css::NoContext);
    assert_eq!(matched["color"].value.to_string(), "red");
    assert!(matched["color"].priority >= 2);
}

#[tokio::test]
async fn test_open_html_data_url() {
    let model = model_with(&Arc::new(Site::new()));
    let view = model.create_view();
    let document = model
        .open_document(
            &view,
            "data:text/html,<html><body><p class='x'>hi</p></body></html>",
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(document.kind(), DocumentKind::Html);
    let tree = document.tree().unwrap();
    let root = tree.as_element(tree.document_element().unwrap()).unwrap();
    assert!(root.name.is(Some(ns::XHTML), "html"));
    assert_eq!(scan_document_links(&document), vec!["chrome://html.css"]);
}

#[tokio::test]
async fn test_empty_data_url_is_binary() {
    let model = model_with(&Arc::new(Site::new()));
    let view = model.create_view();
    let document = model.open_document(&view, "data:,").await.unwrap().unwrap();
    match &*document {
        Document::Bytes(binary) => {
            assert!(binary.data.is_empty());
            assert_eq!(binary.mime, "application/octet-stream");
        }
        other => panic!("expected binary document, got {other:?}"),
    }
}

// ========== Events ==========

#[tokio::test]
async fn test_event_order() {
    let model = model_with(&Arc::new(icon_site()));
    let (view, log) = logged_view(&model);
    let _ = model.open_document(&view, ICON).await.unwrap().unwrap();

    let expected = [
        (EventKind::Opening, ICON),
        (EventKind::Download, ICON),
        (EventKind::BeforeLoad, ICON),
        (EventKind::Download, ICON_CSS),
        (EventKind::BeforeLoad, ICON_CSS),
        (EventKind::Load, ICON_CSS),
        (EventKind::Load, ICON),
        (EventKind::Open, ICON),
    ];
    let expected: Vec<(EventKind, Option<String>)> = expected
        .iter()
        .map(|(kind, url)| (*kind, Some((*url).to_owned())))
        .collect();
    assert_eq!(trace(&log), expected);
}

#[tokio::test]
async fn test_close_events_and_release() {
    let model = model_with(&Arc::new(icon_site()));
    let (view, log) = logged_view(&model);
    let _ = model.open_document(&view, ICON).await.unwrap().unwrap();
    assert_eq!(view.referenced_by(ICON_CSS), vec![ICON]);
    assert!(model.is_cached(ICON_CSS));

    log.clear();
    assert!(model.close_document(&view).await.unwrap());

    assert_eq!(
        log.kinds(),
        [
            EventKind::Closing,
            EventKind::BeforeUnload,
            EventKind::BeforeUnload,
            EventKind::Unload,
            EventKind::Unload,
            EventKind::Close,
        ]
    );
    assert!(view.references_empty());
    assert!(!model.is_cached(ICON));
    assert!(!model.is_cached(ICON_CSS));
    assert!(view.location().is_none());
    assert!(view.document().is_none());
}

#[tokio::test]
async fn test_prevent_opening() {
    let site = Arc::new(icon_site());
    let model = model_with(&site);
    let view = model.create_view();
    view.add_handler(|event: &Event| {
        if event.kind == EventKind::Opening {
            Response::Prevent
        } else {
            Response::Continue
        }
    });

    assert!(model.open_document(&view, ICON).await.unwrap().is_none());
    assert_eq!(site.hits(ICON), 0);
    assert!(view.location().is_none());
}

#[tokio::test]
async fn test_prevent_closing_keeps_document() {
    let model = model_with(&Arc::new(icon_site()));
    let view = model.create_view();
    let _ = model.open_document(&view, ICON).await.unwrap().unwrap();
    view.add_handler(|event: &Event| {
        if event.kind == EventKind::Closing {
            Response::Prevent
        } else {
            Response::Continue
        }
    });

    assert!(!model.close_document(&view).await.unwrap());
    assert!(view.document().is_some());
    assert!(model.is_cached(ICON_CSS));
}

#[tokio::test]
async fn test_prevent_download_of_link() {
    let site = Arc::new(icon_site());
    let model = model_with(&site);
    let view = model.create_view();
    view.add_handler(|event: &Event| {
        if event.kind == EventKind::Download && event.target.as_deref() == Some(ICON_CSS) {
            Response::Prevent
        } else {
            Response::Continue
        }
    });

    let document = model.open_document(&view, ICON).await.unwrap().unwrap();
    assert_eq!(document.kind(), DocumentKind::Svg);
    assert_eq!(site.hits(ICON_CSS), 0);
    assert!(matches!(
        model.get_document(ICON_CSS),
        Err(ModelError::DocumentNotFound(_))
    ));
}

#[tokio::test]
async fn test_prevent_beforeload_of_link_is_not_cached() {
    let site = Arc::new(icon_site());
    let model = model_with(&site);
    let view = model.create_view();
    view.add_handler(|event: &Event| {
        if event.kind == EventKind::BeforeLoad && event.target.as_deref() == Some(ICON_CSS) {
            assert!(
                event.document.is_some(),
                "beforeload carries the decoded document"
            );
            Response::Prevent
        } else {
            Response::Continue
        }
    });

    let document = model.open_document(&view, ICON).await.unwrap().unwrap();
    assert_eq!(document.kind(), DocumentKind::Svg);
    assert_eq!(site.hits(ICON_CSS), 1);
    assert!(model.is_cached(ICON_CSS));
    assert!(matches!(
        model.get_document(ICON_CSS),
        Err(ModelError::DocumentNotFound(_))
    ));
}

#[tokio::test]
async fn test_beforeload_substitutes_document() {
    let site = Arc::new(Site::new().page("test://site/a.txt", "text/plain", "original"));
    let model = model_with(&site);
    let view = model.create_view();
    view.add_handler(|event: &Event| {
        if event.kind == EventKind::BeforeLoad {
            Response::Substitute(Arc::new(Document::Text("replaced".to_owned())))
        } else {
            Response::Continue
        }
    });

    let document = model
        .open_document(&view, "test://site/a.txt")
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(&*document, Document::Text(text) if text == "replaced"));
}

#[tokio::test]
async fn test_redirect() {
    let old = "test://site/old.css";
    let new = "test://site/new.css";
    let site = Arc::new(Site::new().page(new, "text/css", "p { color: green }"));
    let model = model_with(&site);
    let (view, log) = logged_view(&model);
    view.add_handler(move |event: &Event| {
        if event.kind == EventKind::Download && event.target.as_deref() == Some(old) {
            Response::Redirect(new.to_owned())
        } else {
            Response::Continue
        }
    });

    let document = model.open_document(&view, old).await.unwrap().unwrap();
    assert_eq!(document.kind(), DocumentKind::Css);
    assert_eq!(site.hits(old), 0);
    assert_eq!(site.hits(new), 1);
    assert!(Arc::ptr_eq(&model.get_document(old).unwrap(), &document));

    let redirects = log.of_kind(EventKind::Redirect);
    assert_eq!(redirects.len(), 1);
    assert_eq!(redirects[0].target.as_deref(), Some(old));
    assert_eq!(redirects[0].detail.as_deref(), Some(new));

    assert!(model.close_document(&view).await.unwrap());
    assert!(!model.is_cached(new));
}

#[tokio::test]
async fn test_redirect_loop_gives_up() {
    let a = "test://site/a.css";
    let b = "test://site/b.css";
    let site = Arc::new(Site::new().page(a, "text/css", "p { color: red }"));
    let model = model_with(&site);
    let (view, log) = logged_view(&model);
    view.add_handler(move |event: &Event| match event.target.as_deref() {
        Some(target) if event.kind == EventKind::Download && target == a => {
            Response::Redirect(b.to_owned())
        }
        Some(target) if event.kind == EventKind::Download && target == b => {
            Response::Redirect(a.to_owned())
        }
        _ => Response::Continue,
    });

    let opened = tokio::time::timeout(Duration::from_secs(5), model.open_document(&view, a))
        .await
        .expect("redirect loop did not terminate")
        .unwrap();
    assert!(opened.is_none());
    assert_eq!(site.hits(a), 0);
    assert_eq!(log.of_kind(EventKind::Redirect).len(), 2);
    let warnings = log.of_kind(EventKind::Warning);
    assert!(
        warnings
            .iter()
            .any(|warning| warning.detail.as_deref() == Some("Too many redirects"))
    );
    assert!(view.document().is_none());
}

// ========== Failures ==========

#[tokio::test]
async fn test_download_error_gives_null_document() {
    let model = model_with(&Arc::new(Site::new()));
    let (view, log) = logged_view(&model);
    let document = model
        .open_document(&view, "test://site/missing.svg")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(document.kind(), DocumentKind::Null);
    assert_eq!(view.warning_count(), 1);
    let warnings = log.of_kind(EventKind::Warning);
    assert!(
        warnings[0]
            .detail
            .as_deref()
            .unwrap()
            .starts_with("Error downloading document")
    );
    assert_eq!(log.of_kind(EventKind::Error).len(), 1);
}

#[tokio::test]
async fn test_missing_file_gives_null_document() {
    let model = model_with(&Arc::new(Site::new()));
    let view = model.create_view();
    let document = model
        .open_document(&view, "file:///nonexistent/wombat/missing.css")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(document.kind(), DocumentKind::Null);
    assert_eq!(view.warning_count(), 1);
}

#[tokio::test]
async fn test_parse_error_aborts_open() {
    let url = "test://site/broken.svg";
    let site = Arc::new(Site::new().page(
        url,
        "image/svg+xml",
        r#"<svg xmlns="http://www.w3.org/2000/svg"><g></svg>"#,
    ));
    let model = model_with(&site);
    let (view, log) = logged_view(&model);

    assert!(model.open_document(&view, url).await.unwrap().is_none());
    assert_eq!(log.of_kind(EventKind::ParseError).len(), 1);
    assert!(log.of_kind(EventKind::Open).is_empty());
    assert!(view.location().is_none());
}

#[tokio::test]
async fn test_broken_link_does_not_fail_open() {
    let page = "test://site/page.svg";
    let site = Arc::new(Site::new().page(
        page,
        "image/svg+xml",
        r#"<?xml-stylesheet href="gone.css"?><svg xmlns="http://www.w3.org/2000/svg"/>"#,
    ));
    let model = model_with(&site);
    let view = model.create_view();

    let document = model.open_document(&view, page).await.unwrap().unwrap();
    assert_eq!(document.kind(), DocumentKind::Svg);
    let gone = model.get_document("test://site/gone.css").unwrap();
    assert_eq!(gone.kind(), DocumentKind::Null);
}

fn warning_details(log: &EventLog) -> Vec<String> {
    log.of_kind(EventKind::Warning)
        .into_iter()
        .filter_map(|warning| warning.detail)
        .collect()
}

#[tokio::test]
async fn test_unclosed_block_is_reported() {
    let url = "test://site/open.css";
    let site = Arc::new(Site::new().page(url, "text/css", "p { color: red"));
    let model = model_with(&site);
    let (view, log) = logged_view(&model);

    let document = model.open_document(&view, url).await.unwrap().unwrap();
    assert_eq!(document.kind(), DocumentKind::Css);
    let details = warning_details(&log);
    assert!(
        details
            .iter()
            .any(|detail| detail.starts_with("unclosed") && detail.ends_with("at end of stylesheet")),
        "{details:?}"
    );
    assert_eq!(log.of_kind(EventKind::Warning)[0].target.as_deref(), Some(url));
}

#[tokio::test]
async fn test_unsupported_selector_is_reported() {
    let url = "test://site/odd.css";
    let site = Arc::new(Site::new().page(url, "text/css", "p:frobnicate(1) { color: red }"));
    let model = model_with(&site);
    let (view, log) = logged_view(&model);

    let _ = model.open_document(&view, url).await.unwrap().unwrap();
    let details = warning_details(&log);
    assert!(
        details.iter().any(|detail| detail.contains(":frobnicate()")),
        "{details:?}"
    );
}

#[tokio::test]
async fn test_tag_soup_issues_are_reported() {
    let url = "test://site/soup.html";
    let site = Arc::new(Site::new().page(url, "text/html", "<div>a</span>b</div>"));
    let model = model_with(&site);
    let (view, log) = logged_view(&model);

    let document = model.open_document(&view, url).await.unwrap().unwrap();
    assert_eq!(document.kind(), DocumentKind::Html);
    let details = warning_details(&log);
    assert!(
        details
            .iter()
            .any(|detail| detail.contains("</span>") && detail.contains("(line 1)")),
        "{details:?}"
    );
}

// ========== View state ==========

#[tokio::test]
async fn test_already_open_and_not_open() {
    let model = model_with(&Arc::new(icon_site()));
    let view = model.create_view();
    assert!(matches!(
        model.close_document(&view).await,
        Err(ModelError::NotOpen)
    ));

    let _ = model.open_document(&view, ICON).await.unwrap().unwrap();
    assert!(matches!(
        model.open_document(&view, ICON).await,
        Err(ModelError::AlreadyOpen)
    ));
    assert_eq!(view.location().as_deref(), Some(ICON));
}

#[tokio::test]
async fn test_cancel_open() {
    let site = Arc::new(icon_site().delay(Duration::from_millis(500)));
    let model = model_with(&site);
    let (view, log) = logged_view(&model);

    let (result, ()) = tokio::join!(model.open_document(&view, ICON), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        view.cancel();
    });

    assert!(matches!(result, Err(ModelError::Cancelled)));
    assert_eq!(log.of_kind(EventKind::Cancelled).len(), 1);
    assert!(view.location().is_none());
    assert!(!model.is_cached(ICON));

    // The view can open again after a cancelled open.
    let document = model.open_document(&view, ICON).await.unwrap().unwrap();
    assert_eq!(document.kind(), DocumentKind::Svg);
}

#[tokio::test]
async fn test_fragments() {
    let model = model_with(&Arc::new(icon_site()));
    let view = model.create_view();
    let _ = model.open_document(&view, ICON).await.unwrap().unwrap();

    let (document, node) = model.get_fragment("test://site/icon.svg#dot").unwrap();
    let tree = document.tree().unwrap();
    assert_eq!(tree.as_element(node).unwrap().id(), Some("dot"));

    let (_, root) = model.get_fragment(ICON).unwrap();
    assert_eq!(Some(root), tree.document_element());

    assert!(matches!(
        model.get_fragment("test://site/icon.svg#nowhere"),
        Err(ModelError::FragmentNotFound(_))
    ));
    assert!(matches!(
        model.get_fragment("test://site/other.svg#dot"),
        Err(ModelError::DocumentNotFound(_))
    ));
}

// ========== Sharing between views ==========

#[tokio::test]
async fn test_concurrent_views_share_download() {
    let site = Arc::new(icon_site().delay(Duration::from_millis(50)));
    let model = model_with(&site);
    let first_view = model.create_view();
    let second_view = model.create_view();

    let (first, second) = tokio::join!(
        model.open_document(&first_view, ICON),
        model.open_document(&second_view, ICON)
    );
    let first = first.unwrap().unwrap();
    let second = second.unwrap().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(site.hits(ICON), 1);
    assert_eq!(site.hits(ICON_CSS), 1);
    assert_eq!(second_view.referenced_by(ICON_CSS), vec![ICON]);
}

#[tokio::test]
async fn test_shared_link_outlives_one_view() {
    let shared = "test://site/shared.css";
    let site = Arc::new(
        Site::new()
            .page(
                "test://site/one.svg",
                "image/svg+xml",
                r#"<?xml-stylesheet href="shared.css"?><svg xmlns="http://www.w3.org/2000/svg"/>"#,
            )
            .page(
                "test://site/two.svg",
                "image/svg+xml",
                r#"<?xml-stylesheet href="shared.css"?><svg xmlns="http://www.w3.org/2000/svg"/>"#,
            )
            .page(shared, "text/css", "svg { fill: blue }"),
    );
    let model = model_with(&site);
    let one = model.create_view();
    let two = model.create_view();
    let _ = model.open_document(&one, "test://site/one.svg").await.unwrap();
    let _ = model.open_document(&two, "test://site/two.svg").await.unwrap();
    assert_eq!(site.hits(shared), 1);

    assert!(model.close_document(&one).await.unwrap());
    assert!(model.is_cached(shared));
    assert!(!model.is_cached("test://site/one.svg"));

    assert!(model.close_document(&two).await.unwrap());
    assert!(!model.is_cached(shared));
}

#[tokio::test]
async fn test_import_cycle_terminates() {
    let site = Arc::new(
        Site::new()
            .page("test://site/a.css", "text/css", r#"@import "b.css"; a { color: red }"#)
            .page("test://site/b.css", "text/css", r#"@import "a.css"; b { color: blue }"#),
    );
    let model = model_with(&site);
    let view = model.create_view();
    let _ = model
        .open_document(&view, "test://site/a.css")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(site.hits("test://site/a.css"), 1);
    assert_eq!(site.hits("test://site/b.css"), 1);

    assert!(model.close_document(&view).await.unwrap());
    assert!(view.references_empty());
    assert!(!model.is_cached("test://site/b.css"));
}

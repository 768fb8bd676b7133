//! Media tools: images, video, audio, and presentations.
//!
//! The slow half of each tool (download, conversion) runs here on the async
//! runtime; only the final add-to-service step crosses the bridge.

use serde_json::json;

use {
    limelight_fetch::MediaKind,
    limelight_host::{ItemKind, ServiceItem},
    limelight_protocol::{ErrorShape, error_kinds},
};

use crate::{
    ToolCatalog, ToolContext, ToolResult, convert_error, fetch_error,
    spec::{ParamKind, ParamSpec, ToolSpec, optional_str, required_str},
};

pub(super) fn register(catalog: &mut ToolCatalog) {
    for (tool, kind, noun) in [
        ("add_image", ItemKind::Image, "image"),
        ("add_video", ItemKind::Video, "video"),
        ("add_audio", ItemKind::Audio, "audio"),
        ("add_presentation", ItemKind::Presentation, "presentation"),
    ] {
        let description: &'static str = match kind {
            ItemKind::Image => "Add an image to the service",
            ItemKind::Video => "Add a video to the service",
            ItemKind::Audio => "Add an audio track to the service",
            _ => "Add a presentation to the service, converting to PDF when needed",
        };
        catalog.register(
            ToolSpec::new(tool, description, vec![
                ParamSpec::required(
                    "path_or_url",
                    ParamKind::String,
                    "Local path or http(s) URL",
                ),
                ParamSpec::optional("title", ParamKind::String, "Item title"),
            ])
            .slow(),
            Box::new(move |ctx| {
                Box::pin(async move {
                    let reference = required_str(&ctx.arguments, "path_or_url")?.to_owned();
                    let title = optional_str(&ctx.arguments, "title").map(ToOwned::to_owned);
                    let result = add_media(&ctx, kind, &reference, title.as_deref()).await;
                    if let Err(ref e) = result {
                        tracing::warn!(tool = noun, error = %e, "media tool failed");
                    }
                    result
                })
            }),
        );
    }
}

fn expected_media_kind(kind: ItemKind) -> MediaKind {
    match kind {
        ItemKind::Image => MediaKind::Image,
        ItemKind::Video => MediaKind::Video,
        ItemKind::Audio => MediaKind::Audio,
        _ => MediaKind::Presentation,
    }
}

/// Shared flow for every media tool: fetch, bound, verify kind, then hand a
/// ready item to the host.
pub(crate) async fn add_media(
    ctx: &ToolContext,
    kind: ItemKind,
    reference: &str,
    title: Option<&str>,
) -> ToolResult {
    let config = &ctx.deps.config;

    // Size bound first: an oversized source must be rejected before any
    // conversion work, and for local files before anything at all.
    if !limelight_fetch::is_url(reference) {
        let size = std::fs::metadata(reference)
            .map_err(|_| {
                ErrorShape::new(
                    error_kinds::FETCH_FAILED,
                    format!("local file not found: {reference}"),
                )
            })?
            .len();
        if size > config.fetch.max_bytes {
            return Err(ErrorShape::new(
                error_kinds::SOURCE_TOO_LARGE,
                format!(
                    "{size} bytes exceeds the {} byte limit",
                    config.fetch.max_bytes
                ),
            ));
        }
    }

    let resource = limelight_fetch::fetch(reference, &config.fetch)
        .await
        .map_err(fetch_error)?;

    let expected = expected_media_kind(kind);
    if resource.kind() != expected {
        return Err(ErrorShape::new(
            error_kinds::UNSUPPORTED_FORMAT,
            format!(
                "expected {} content, but {reference} looks like {:?}",
                kind,
                resource.kind()
            ),
        ));
    }

    let title = match title {
        Some(t) => t.to_owned(),
        None if resource.is_downloaded() => format!("{} (downloaded)", resource.display_name()),
        None => resource.display_name(),
    };

    if kind == ItemKind::Presentation {
        return add_presentation(ctx, &resource, title).await;
    }

    // Downloads are moved out of the fetcher's temp dir so they survive for
    // the session; local files are referenced in place.
    let path = if resource.is_downloaded() {
        ctx.deps.adopt(resource.path())?
    } else {
        resource.path().to_path_buf()
    };

    let noun = kind.to_string();
    ctx.submit(move |state| {
        let index = state.add_item(ServiceItem::media(&title, kind, path));
        Ok(json!({
            "message": format!("{noun} '{title}' added to service"),
            "index": index,
        }))
    })
    .await
}

async fn add_presentation(
    ctx: &ToolContext,
    resource: &limelight_fetch::FetchedResource,
    title: String,
) -> ToolResult {
    let config = &ctx.deps.config;

    let is_pdf = resource
        .path()
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    let pdf_path = if is_pdf {
        if resource.is_downloaded() {
            ctx.deps.adopt(resource.path())?
        } else {
            resource.path().to_path_buf()
        }
    } else {
        limelight_convert::convert(resource.path(), ctx.deps.media_dir(), &config.convert)
            .await
            .map_err(convert_error)?
    };

    let pages = limelight_convert::pdf::page_count(&pdf_path)
        .map_err(convert_error)?
        .max(1);

    ctx.submit(move |state| {
        let index = state.add_item(ServiceItem::presentation(&title, pdf_path, pages));
        Ok(json!({
            "message": format!("presentation '{title}' added with {pages} slide(s)"),
            "index": index,
        }))
    })
    .await
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::testing, serde_json::Value};

    #[tokio::test]
    async fn add_image_from_local_file() {
        let (catalog, _handle) = testing::catalog();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sunrise.jpg");
        std::fs::write(&path, b"jpeg bytes").unwrap();

        let result = catalog
            .invoke(
                "add_image",
                json!({"path_or_url": path.to_str().unwrap()}),
                None,
            )
            .await
            .unwrap();
        assert_eq!(result["index"], 0);

        let items = catalog
            .invoke("get_service_items", Value::Null, None)
            .await
            .unwrap();
        assert_eq!(items[0]["kind"], "image");
        assert_eq!(items[0]["title"], "sunrise.jpg");
    }

    #[tokio::test]
    async fn oversized_local_file_is_rejected_up_front() {
        let (mut catalog, _handle) = testing::catalog();
        // Shrink the cap so the test file trips it.
        {
            let deps = std::sync::Arc::get_mut(&mut catalog.deps).unwrap();
            deps.config.fetch.max_bytes = 16;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.jpg");
        std::fs::write(&path, vec![0u8; 64]).unwrap();

        let err = catalog
            .invoke(
                "add_image",
                json!({"path_or_url": path.to_str().unwrap()}),
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, error_kinds::SOURCE_TOO_LARGE);
    }

    #[tokio::test]
    async fn mismatched_kind_is_unsupported() {
        let (catalog, _handle) = testing::catalog();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tune.mp3");
        std::fs::write(&path, b"id3").unwrap();

        let err = catalog
            .invoke(
                "add_image",
                json!({"path_or_url": path.to_str().unwrap()}),
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, error_kinds::UNSUPPORTED_FORMAT);
    }

    #[tokio::test]
    async fn add_pdf_presentation_counts_pages() {
        let (catalog, _handle) = testing::catalog();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pdf");
        limelight_convert::pdf::write_text_pdf(&path, &[
            vec!["one".into()],
            vec!["two".into()],
        ])
        .unwrap();

        let result = catalog
            .invoke(
                "add_presentation",
                json!({"path_or_url": path.to_str().unwrap(), "title": "Deck"}),
                None,
            )
            .await
            .unwrap();
        assert!(result["message"].as_str().unwrap().contains("2 slide(s)"));

        let items = catalog
            .invoke("get_service_items", Value::Null, None)
            .await
            .unwrap();
        assert_eq!(items[0]["slide_count"], 2);
    }

    #[tokio::test]
    async fn downloaded_image_is_kept_for_the_session() {
        let (catalog, _handle) = testing::catalog();
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/banner")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(b"png bytes")
            .create_async()
            .await;

        let url = format!("{}/banner", server.url());
        catalog
            .invoke("add_image", json!({"path_or_url": url}), None)
            .await
            .unwrap();

        let items = catalog
            .invoke("get_service_items", Value::Null, None)
            .await
            .unwrap();
        assert!(items[0]["title"].as_str().unwrap().contains("(downloaded)"));
    }
}

//! Service management tools.

use {serde_json::json, std::path::PathBuf};

use limelight_host::{ItemKind, ServiceItem};

use crate::{
    ToolCatalog, ToolResult,
    fetch_error, media,
    spec::{ParamKind, ParamSpec, ToolSpec, optional_str, required_str},
};

pub(super) fn register(catalog: &mut ToolCatalog) {
    catalog.register(
        ToolSpec::new("create_service", "Start a new empty service", vec![]),
        Box::new(|ctx| {
            Box::pin(async move {
                ctx.submit(|state| {
                    state.create_service();
                    Ok(json!({"message": "new service created"}))
                })
                .await
            })
        }),
    );

    catalog.register(
        ToolSpec::new("load_service", "Load a service file from a path or URL", vec![
            ParamSpec::required(
                "path_or_url",
                ParamKind::String,
                "Local path or http(s) URL of a service file",
            ),
        ])
        .slow(),
        Box::new(|ctx| {
            Box::pin(async move {
                let reference = required_str(&ctx.arguments, "path_or_url")?.to_owned();
                let resource = limelight_fetch::fetch(&reference, &ctx.deps.config.fetch)
                    .await
                    .map_err(fetch_error)?;
                let path = resource.path().to_path_buf();
                // Parsing happens inside the command; the temp download must
                // outlive the submit.
                let items = ctx
                    .submit(move |state| Ok(json!(state.load_service(&path)?)))
                    .await?;
                drop(resource);
                Ok(json!({
                    "message": format!("service loaded from {reference}"),
                    "items": items,
                }))
            })
        }),
    );

    catalog.register(
        ToolSpec::new("save_service", "Save the current service as JSON", vec![
            ParamSpec::optional(
                "path",
                ParamKind::String,
                "Target path; defaults to where the service was last saved",
            ),
        ]),
        Box::new(|ctx| {
            Box::pin(async move {
                let path = optional_str(&ctx.arguments, "path").map(PathBuf::from);
                ctx.submit(move |state| {
                    let saved = state.save_service(path.as_deref())?;
                    Ok(json!({"message": format!("service saved to {}", saved.display())}))
                })
                .await
            })
        }),
    );

    catalog.register(
        ToolSpec::new(
            "get_service_items",
            "List the items in the current service",
            vec![],
        ),
        Box::new(|ctx| {
            Box::pin(async move {
                ctx.submit(|state| Ok(serde_json::to_value(state.service_items())?))
                    .await
            })
        }),
    );

    catalog.register(
        ToolSpec::new("add_song", "Add a song to the service", vec![
            ParamSpec::required("title", ParamKind::String, "Song title"),
            ParamSpec::optional("author", ParamKind::String, "Credited author"),
            ParamSpec::optional(
                "lyrics",
                ParamKind::String,
                "Lyrics; blank lines separate verses",
            ),
        ]),
        Box::new(|ctx| {
            Box::pin(async move {
                let title = required_str(&ctx.arguments, "title")?.to_owned();
                let author = optional_str(&ctx.arguments, "author").map(ToOwned::to_owned);
                let lyrics = optional_str(&ctx.arguments, "lyrics").map(ToOwned::to_owned);
                ctx.submit(move |state| {
                    let mut item = ServiceItem::song_placeholder(&title, lyrics.as_deref());
                    if let Some(author) = author {
                        item = item.with_author(author);
                    }
                    let verses = item.slides.len();
                    let index = state.add_item(item);
                    Ok(json!({
                        "message": format!("song '{title}' added with {verses} verse(s)"),
                        "index": index,
                    }))
                })
                .await
            })
        }),
    );

    catalog.register(
        ToolSpec::new("add_custom_slide", "Add a custom text slide", vec![
            ParamSpec::required("title", ParamKind::String, "Slide title"),
            ParamSpec::required("content", ParamKind::String, "Slide body text"),
        ]),
        Box::new(|ctx| {
            Box::pin(async move {
                let title = required_str(&ctx.arguments, "title")?.to_owned();
                let content = required_str(&ctx.arguments, "content")?.to_owned();
                ctx.submit(move |state| {
                    let mut item = ServiceItem::new(&title, ItemKind::Custom);
                    item.slides
                        .push(limelight_host::Slide::text(&title, &content));
                    let index = state.add_item(item);
                    Ok(json!({
                        "message": format!("custom slide '{title}' added"),
                        "index": index,
                    }))
                })
                .await
            })
        }),
    );

    catalog.register(
        ToolSpec::new(
            "add_service_item",
            "Add a media item, routing by kind",
            vec![
                ParamSpec::required(
                    "kind",
                    ParamKind::String,
                    "One of: image, video, audio, presentation",
                ),
                ParamSpec::required(
                    "path_or_url",
                    ParamKind::String,
                    "Local path or http(s) URL",
                ),
                ParamSpec::optional("title", ParamKind::String, "Item title"),
            ],
        )
        .slow(),
        Box::new(|ctx| {
            Box::pin(async move {
                let kind = match required_str(&ctx.arguments, "kind")? {
                    "image" => ItemKind::Image,
                    "video" => ItemKind::Video,
                    "audio" => ItemKind::Audio,
                    "presentation" => ItemKind::Presentation,
                    other => {
                        return Err(limelight_protocol::ErrorShape::new(
                            limelight_protocol::error_kinds::INVALID_ARGUMENTS,
                            format!("unsupported item kind '{other}'"),
                        ));
                    },
                };
                add_routed(ctx, kind).await
            })
        }),
    );
}

async fn add_routed(ctx: crate::ToolContext, kind: ItemKind) -> ToolResult {
    let reference = required_str(&ctx.arguments, "path_or_url")?.to_owned();
    let title = optional_str(&ctx.arguments, "title").map(ToOwned::to_owned);
    media::add_media(&ctx, kind, &reference, title.as_deref()).await
}

//! Theme management tools.

use {
    serde_json::{Value, json},
    std::path::PathBuf,
};

use limelight_host::{Background, GradientDirection, Theme};

use crate::{
    ToolCatalog, ToolContext, fetch_error,
    spec::{
        ParamKind, ParamSpec, ToolSpec, optional_bool, optional_str, optional_u32, required_index,
        required_str,
    },
};

/// Parameters shared by `create_theme` and `update_theme`.
fn style_params() -> Vec<ParamSpec> {
    vec![
        ParamSpec::optional(
            "background_type",
            ParamKind::String,
            "One of: solid, gradient, image",
        ),
        ParamSpec::optional(
            "background_color",
            ParamKind::String,
            "Solid background color, e.g. #000000",
        )
        .with_default(json!("#000000")),
        ParamSpec::optional(
            "background_start_color",
            ParamKind::String,
            "Gradient start color",
        )
        .with_default(json!("#000000")),
        ParamSpec::optional(
            "background_end_color",
            ParamKind::String,
            "Gradient end color",
        )
        .with_default(json!("#000000")),
        ParamSpec::optional(
            "background_direction",
            ParamKind::String,
            "Gradient direction: vertical or horizontal",
        )
        .with_default(json!("vertical")),
        ParamSpec::optional(
            "background_image_path",
            ParamKind::String,
            "Background image path or URL",
        ),
        ParamSpec::optional("font_main_name", ParamKind::String, "Main font family"),
        ParamSpec::optional("font_main_size", ParamKind::Integer, "Main font size"),
        ParamSpec::optional("font_main_color", ParamKind::String, "Main font color"),
        ParamSpec::optional("font_main_bold", ParamKind::Boolean, "Bold main text"),
        ParamSpec::optional("font_main_italics", ParamKind::Boolean, "Italic main text"),
        ParamSpec::optional("font_main_outline", ParamKind::Boolean, "Outline main text"),
        ParamSpec::optional(
            "font_main_outline_color",
            ParamKind::String,
            "Outline color",
        ),
        ParamSpec::optional(
            "font_main_outline_size",
            ParamKind::Integer,
            "Outline width",
        ),
        ParamSpec::optional("font_main_shadow", ParamKind::Boolean, "Drop shadow"),
        ParamSpec::optional(
            "font_main_shadow_color",
            ParamKind::String,
            "Shadow color",
        ),
        ParamSpec::optional(
            "font_main_shadow_size",
            ParamKind::Integer,
            "Shadow offset",
        ),
        ParamSpec::optional("font_footer_name", ParamKind::String, "Footer font family"),
        ParamSpec::optional("font_footer_size", ParamKind::Integer, "Footer font size"),
        ParamSpec::optional("font_footer_color", ParamKind::String, "Footer font color"),
    ]
}

/// Apply style arguments to a theme. `image` is the already-resolved local
/// path for an image background. Pure so it can run inside a bridge command.
fn apply_style(
    theme: &mut Theme,
    args: &Value,
    image: Option<PathBuf>,
) -> Result<(), String> {
    match optional_str(args, "background_type") {
        Some("solid") => {
            theme.background = Background::Solid {
                color: optional_str(args, "background_color")
                    .unwrap_or("#000000")
                    .to_owned(),
            };
        },
        Some("gradient") => {
            let direction = match optional_str(args, "background_direction").unwrap_or("vertical") {
                "vertical" => GradientDirection::Vertical,
                "horizontal" => GradientDirection::Horizontal,
                other => return Err(format!("unknown gradient direction '{other}'")),
            };
            theme.background = Background::Gradient {
                start_color: optional_str(args, "background_start_color")
                    .unwrap_or("#000000")
                    .to_owned(),
                end_color: optional_str(args, "background_end_color")
                    .unwrap_or("#000000")
                    .to_owned(),
                direction,
            };
        },
        Some("image") => {
            let path = image.ok_or_else(|| {
                "background_type 'image' requires background_image_path".to_owned()
            })?;
            theme.background = Background::Image { path };
        },
        Some(other) => return Err(format!("unknown background type '{other}'")),
        None => {},
    }

    if let Some(v) = optional_str(args, "font_main_name") {
        theme.font_main_name = v.to_owned();
    }
    if let Some(v) = optional_u32(args, "font_main_size") {
        theme.font_main_size = v;
    }
    if let Some(v) = optional_str(args, "font_main_color") {
        theme.font_main_color = v.to_owned();
    }
    if let Some(v) = optional_bool(args, "font_main_bold") {
        theme.font_main_bold = v;
    }
    if let Some(v) = optional_bool(args, "font_main_italics") {
        theme.font_main_italics = v;
    }
    if let Some(v) = optional_bool(args, "font_main_outline") {
        theme.font_main_outline = v;
    }
    if let Some(v) = optional_str(args, "font_main_outline_color") {
        theme.font_main_outline_color = v.to_owned();
    }
    if let Some(v) = optional_u32(args, "font_main_outline_size") {
        theme.font_main_outline_size = v;
    }
    if let Some(v) = optional_bool(args, "font_main_shadow") {
        theme.font_main_shadow = v;
    }
    if let Some(v) = optional_str(args, "font_main_shadow_color") {
        theme.font_main_shadow_color = v.to_owned();
    }
    if let Some(v) = optional_u32(args, "font_main_shadow_size") {
        theme.font_main_shadow_size = v;
    }
    if let Some(v) = optional_str(args, "font_footer_name") {
        theme.font_footer_name = v.to_owned();
    }
    if let Some(v) = optional_u32(args, "font_footer_size") {
        theme.font_footer_size = v;
    }
    if let Some(v) = optional_str(args, "font_footer_color") {
        theme.font_footer_color = v.to_owned();
    }
    Ok(())
}

/// Resolve an image-background reference to a session-local path, if one was
/// given. Remote images are downloaded before the bridge command runs.
async fn resolve_background_image(ctx: &ToolContext) -> Result<Option<PathBuf>, limelight_protocol::ErrorShape> {
    let Some(reference) = optional_str(&ctx.arguments, "background_image_path") else {
        return Ok(None);
    };
    let resource = limelight_fetch::fetch(reference, &ctx.deps.config.fetch)
        .await
        .map_err(fetch_error)?;
    let path = if resource.is_downloaded() {
        ctx.deps.adopt(resource.path())?
    } else {
        resource.path().to_path_buf()
    };
    Ok(Some(path))
}

pub(super) fn register(catalog: &mut ToolCatalog) {
    catalog.register(
        ToolSpec::new("list_themes", "List all theme names", vec![]),
        Box::new(|ctx| {
            Box::pin(async move {
                ctx.submit(|state| Ok(json!(state.list_themes()))).await
            })
        }),
    );

    catalog.register(
        ToolSpec::new("set_service_theme", "Set the service-wide theme", vec![
            ParamSpec::required("theme_name", ParamKind::String, "Theme to apply"),
        ]),
        Box::new(|ctx| {
            Box::pin(async move {
                let name = required_str(&ctx.arguments, "theme_name")?.to_owned();
                ctx.submit(move |state| {
                    state.set_service_theme(&name)?;
                    Ok(json!({"message": format!("service theme set to '{name}'")}))
                })
                .await
            })
        }),
    );

    let mut create_params = vec![ParamSpec::required(
        "theme_name",
        ParamKind::String,
        "Name for the new theme",
    )];
    create_params.extend(style_params());
    catalog.register(
        ToolSpec::new("create_theme", "Create a new theme", create_params),
        Box::new(|ctx| {
            Box::pin(async move {
                let name = required_str(&ctx.arguments, "theme_name")?.to_owned();
                let image = resolve_background_image(&ctx).await?;
                let args = ctx.arguments.clone();
                ctx.submit(move |state| {
                    let mut theme = Theme::named(&name);
                    apply_style(&mut theme, &args, image)
                        .map_err(limelight_host::Error::message)?;
                    state.create_theme(theme)?;
                    Ok(json!({"message": format!("theme '{name}' created")}))
                })
                .await
            })
        }),
    );

    catalog.register(
        ToolSpec::new("get_theme_details", "Describe a theme", vec![
            ParamSpec::required("theme_name", ParamKind::String, "Theme to describe"),
        ]),
        Box::new(|ctx| {
            Box::pin(async move {
                let name = required_str(&ctx.arguments, "theme_name")?.to_owned();
                ctx.submit(move |state| Ok(serde_json::to_value(state.theme_details(&name)?)?))
                    .await
            })
        }),
    );

    let mut update_params = vec![ParamSpec::required(
        "theme_name",
        ParamKind::String,
        "Theme to update",
    )];
    update_params.extend(style_params());
    catalog.register(
        ToolSpec::new("update_theme", "Update properties of an existing theme", update_params),
        Box::new(|ctx| {
            Box::pin(async move {
                let name = required_str(&ctx.arguments, "theme_name")?.to_owned();
                let image = resolve_background_image(&ctx).await?;
                let args = ctx.arguments.clone();
                ctx.submit(move |state| {
                    let mut theme = state.theme_details(&name)?.clone();
                    apply_style(&mut theme, &args, image)
                        .map_err(limelight_host::Error::message)?;
                    state.update_theme(theme)?;
                    Ok(json!({"message": format!("theme '{name}' updated")}))
                })
                .await
            })
        }),
    );

    catalog.register(
        ToolSpec::new("delete_theme", "Delete a theme", vec![ParamSpec::required(
            "theme_name",
            ParamKind::String,
            "Theme to delete; the default and active service themes are refused",
        )]),
        Box::new(|ctx| {
            Box::pin(async move {
                let name = required_str(&ctx.arguments, "theme_name")?.to_owned();
                ctx.submit(move |state| {
                    state.delete_theme(&name)?;
                    Ok(json!({"message": format!("theme '{name}' deleted")}))
                })
                .await
            })
        }),
    );

    catalog.register(
        ToolSpec::new(
            "duplicate_theme",
            "Copy an existing theme under a new name",
            vec![
                ParamSpec::required("theme_name", ParamKind::String, "Source theme"),
                ParamSpec::required("new_theme_name", ParamKind::String, "Name for the copy"),
            ],
        ),
        Box::new(|ctx| {
            Box::pin(async move {
                let source = required_str(&ctx.arguments, "theme_name")?.to_owned();
                let copy = required_str(&ctx.arguments, "new_theme_name")?.to_owned();
                ctx.submit(move |state| {
                    state.duplicate_theme(&source, &copy)?;
                    Ok(json!({"message": format!("theme '{source}' duplicated as '{copy}'")}))
                })
                .await
            })
        }),
    );

    catalog.register(
        ToolSpec::new("set_item_theme", "Override the theme for one item", vec![
            ParamSpec::required("item_index", ParamKind::Integer, "Item to override"),
            ParamSpec::required("theme_name", ParamKind::String, "Theme to apply"),
        ]),
        Box::new(|ctx| {
            Box::pin(async move {
                let index = required_index(&ctx.arguments, "item_index")?;
                let name = required_str(&ctx.arguments, "theme_name")?.to_owned();
                ctx.submit(move |state| {
                    state.set_item_theme(index, &name)?;
                    Ok(json!({"message": format!("item {index} now uses theme '{name}'")}))
                })
                .await
            })
        }),
    );

    catalog.register(
        ToolSpec::new(
            "get_item_theme",
            "Report the theme an item renders with",
            vec![ParamSpec::required(
                "item_index",
                ParamKind::Integer,
                "Item to inspect",
            )],
        ),
        Box::new(|ctx| {
            Box::pin(async move {
                let index = required_index(&ctx.arguments, "item_index")?;
                ctx.submit(move |state| {
                    let (theme, is_override) = state.item_theme(index)?;
                    Ok(json!({"theme": theme, "is_override": is_override}))
                })
                .await
            })
        }),
    );

    catalog.register(
        ToolSpec::new(
            "clear_item_theme",
            "Remove an item's theme override",
            vec![ParamSpec::required(
                "item_index",
                ParamKind::Integer,
                "Item to reset",
            )],
        ),
        Box::new(|ctx| {
            Box::pin(async move {
                let index = required_index(&ctx.arguments, "item_index")?;
                ctx.submit(move |state| {
                    state.clear_item_theme(index)?;
                    Ok(json!({"message": format!("item {index} follows the service theme again")}))
                })
                .await
            })
        }),
    );
}

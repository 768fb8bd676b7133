//! Live output control tools.

use serde_json::json;

use crate::{
    ToolCatalog,
    spec::{ParamKind, ParamSpec, ToolSpec, required_index},
};

pub(super) fn register(catalog: &mut ToolCatalog) {
    catalog.register(
        ToolSpec::new("go_live", "Send a service item to the live output", vec![
            ParamSpec::required(
                "item_index",
                ParamKind::Integer,
                "Zero-based index into the service",
            ),
        ]),
        Box::new(|ctx| {
            Box::pin(async move {
                let index = required_index(&ctx.arguments, "item_index")?;
                ctx.submit(move |state| {
                    let pos = state.go_live(index)?;
                    Ok(json!({
                        "message": format!("item {index} is now live"),
                        "position": pos,
                    }))
                })
                .await
            })
        }),
    );

    catalog.register(
        ToolSpec::new("go_to_slide", "Jump to a slide within the live item", vec![
            ParamSpec::required(
                "index",
                ParamKind::Integer,
                "Zero-based slide index within the live item",
            ),
        ]),
        Box::new(|ctx| {
            Box::pin(async move {
                let index = required_index(&ctx.arguments, "index")?;
                ctx.submit(move |state| Ok(json!({"position": state.go_to_slide(index)?})))
                    .await
            })
        }),
    );

    catalog.register(
        ToolSpec::new(
            "next_slide",
            "Advance one slide, moving into the next item at the end",
            vec![],
        ),
        Box::new(|ctx| {
            Box::pin(async move {
                ctx.submit(|state| Ok(json!({"position": state.next_slide()?})))
                    .await
            })
        }),
    );

    catalog.register(
        ToolSpec::new(
            "previous_slide",
            "Step back one slide, moving into the previous item at the start",
            vec![],
        ),
        Box::new(|ctx| {
            Box::pin(async move {
                ctx.submit(|state| Ok(json!({"position": state.previous_slide()?})))
                    .await
            })
        }),
    );

    catalog.register(
        ToolSpec::new(
            "get_current_slide",
            "Describe the slide currently on the live output",
            vec![],
        ),
        Box::new(|ctx| {
            Box::pin(async move {
                ctx.submit(|state| Ok(serde_json::to_value(state.current_slide()?)?))
                    .await
            })
        }),
    );
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use {
        crate::testing,
        limelight_protocol::error_kinds,
        serde_json::{Value, json},
    };

    async fn seed(catalog: &crate::ToolCatalog) {
        catalog
            .invoke(
                "add_song",
                json!({"title": "Opener", "lyrics": "v1\n\nv2"}),
                None,
            )
            .await
            .unwrap();
        catalog
            .invoke(
                "add_custom_slide",
                json!({"title": "Notices", "content": "Welcome"}),
                None,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn navigation_round_trip() {
        let (catalog, _handle) = testing::catalog();
        seed(&catalog).await;

        catalog
            .invoke("go_live", json!({"item_index": 0}), None)
            .await
            .unwrap();
        let pos = catalog.invoke("next_slide", Value::Null, None).await.unwrap();
        assert_eq!(pos["position"]["slide"], 1);

        // Crosses into the custom slide item.
        let pos = catalog.invoke("next_slide", Value::Null, None).await.unwrap();
        assert_eq!(pos["position"]["item"], 1);

        let current = catalog
            .invoke("get_current_slide", Value::Null, None)
            .await
            .unwrap();
        assert_eq!(current["item_title"], "Notices");
        assert_eq!(current["text"], "Welcome");
    }

    #[tokio::test]
    async fn live_errors_map_to_command_failed() {
        let (catalog, _handle) = testing::catalog();
        let err = catalog
            .invoke("next_slide", Value::Null, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, error_kinds::COMMAND_FAILED);
        assert!(err.message.contains("nothing is live"));

        seed(&catalog).await;
        let err = catalog
            .invoke("go_live", json!({"item_index": 99}), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, error_kinds::COMMAND_FAILED);
    }
}

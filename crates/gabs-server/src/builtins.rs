//! Registers the seven `games.*` tools (§4.4 table) as closures over a
//! shared [`GameOrchestrator`].

use std::sync::Arc;

use serde_json::{json, Value};

use crate::orchestrator::{GameOrchestrator, OrchestratorError};
use crate::registries::Registries;
use crate::types::{ToolDescriptor, ToolResult};

pub fn register_builtin_tools(registries: &Arc<Registries>, orchestrator: Arc<dyn GameOrchestrator>) {
    register(registries, "games.list", "List every configured game id.", {
        let orchestrator = orchestrator.clone();
        move |_args| {
            let orchestrator = orchestrator.clone();
            Box::pin(async move {
                let games = orchestrator.list().await;
                if games.is_empty() {
                    return ToolResult::text("no games configured");
                }
                let lines: Vec<_> = games.into_iter().map(|g| g.id).collect();
                ToolResult::text(lines.join("\n"))
            })
        }
    });

    register(registries, "games.show", "Show a game's descriptor and validation state.", {
        let orchestrator = orchestrator.clone();
        move |args| {
            let orchestrator = orchestrator.clone();
            Box::pin(async move {
                let Some(game_id) = game_id_arg(&args) else {
                    return ToolResult::error("games.show requires a string `gameId`");
                };
                match orchestrator.show(&game_id).await {
                    Ok(detail) => {
                        let mut text = format!(
                            "{} ({} -> {})",
                            detail.id, detail.launch_mode, detail.target
                        );
                        if let Some(note) = detail.validation_note {
                            text.push_str(&format!("\nvalidation: {note}"));
                        }
                        ToolResult::text(text)
                    }
                    Err(err) => ToolResult::error(err.to_string()),
                }
            })
        }
    });

    register(registries, "games.status", "Report a status label for one or all games.", {
        let orchestrator = orchestrator.clone();
        move |args| {
            let orchestrator = orchestrator.clone();
            Box::pin(async move {
                let game_id = game_id_arg(&args);
                match orchestrator.status(game_id.as_deref()).await {
                    Ok(rows) => {
                        let lines: Vec<_> = rows.into_iter().map(|(id, status)| format!("{id}: {status}")).collect();
                        ToolResult::text(lines.join("\n"))
                    }
                    Err(err) => ToolResult::error(err.to_string()),
                }
            })
        }
    });

    register(registries, "games.start", "Start a configured game.", {
        let orchestrator = orchestrator.clone();
        move |args| {
            let orchestrator = orchestrator.clone();
            Box::pin(async move {
                let Some(game_id) = game_id_arg(&args) else {
                    return ToolResult::error("games.start requires a string `gameId`");
                };
                match orchestrator.start(&game_id).await {
                    Ok(()) => ToolResult::text(format!("{game_id} started")),
                    Err(err) => ToolResult::error(err.to_string()),
                }
            })
        }
    });

    register(registries, "games.stop", "Stop a running game gracefully.", {
        let orchestrator = orchestrator.clone();
        move |args| {
            let orchestrator = orchestrator.clone();
            Box::pin(async move {
                let Some(game_id) = game_id_arg(&args) else {
                    return ToolResult::error("games.stop requires a string `gameId`");
                };
                match orchestrator.stop(&game_id).await {
                    Ok(()) => ToolResult::text(format!("{game_id} stopped")),
                    Err(err) => ToolResult::error(annotate_stop_error(err)),
                }
            })
        }
    });

    register(registries, "games.kill", "Forcibly stop a running game, skipping the grace period.", {
        let orchestrator = orchestrator.clone();
        move |args| {
            let orchestrator = orchestrator.clone();
            Box::pin(async move {
                let Some(game_id) = game_id_arg(&args) else {
                    return ToolResult::error("games.kill requires a string `gameId`");
                };
                match orchestrator.kill(&game_id).await {
                    Ok(()) => ToolResult::text(format!("{game_id} killed")),
                    Err(err) => ToolResult::error(annotate_stop_error(err)),
                }
            })
        }
    });

    register(registries, "games.tools", "List currently-registered tool names for one or all games.", {
        let registries = registries.clone();
        move |args| {
            let registries = registries.clone();
            Box::pin(async move {
                let game_id = game_id_arg(&args);
                let names = registries.game_tool_names(game_id.as_deref());
                if names.is_empty() {
                    return ToolResult::text("no tools registered");
                }
                ToolResult::text(names.join("\n"))
            })
        }
    });
}

fn game_id_arg(args: &Value) -> Option<String> {
    args.get("gameId").and_then(Value::as_str).map(str::to_string)
}

fn annotate_stop_error(err: OrchestratorError) -> String {
    if matches!(err, OrchestratorError::LauncherStopUnsupported(_)) {
        format!("{err}; configure stopProcessName to allow gabs to track and stop this launcher's game")
    } else {
        err.to_string()
    }
}

/// The built-in tools aren't namespaced under a game id, so they're never
/// tracked in `gameTools` and survive `CleanupGameResources`.
fn register(
    registries: &Arc<Registries>,
    name: &str,
    description: &str,
    handler: impl Fn(Value) -> crate::types::BoxFuture<ToolResult> + Send + Sync + 'static,
) {
    registries.register_tool(
        None,
        ToolDescriptor {
            name: name.to_string(),
            description: description.to_string(),
            input_schema: json!({ "type": "object" }),
            meta: None,
        },
        Arc::new(handler),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::{GameDetail, GameStatus, GameSummary};
    use async_trait::async_trait;

    struct FakeOrchestrator;

    #[async_trait]
    impl GameOrchestrator for FakeOrchestrator {
        async fn list(&self) -> Vec<GameSummary> {
            vec![GameSummary { id: "rimworld".to_string() }]
        }

        async fn show(&self, game_id: &str) -> Result<GameDetail, OrchestratorError> {
            Ok(GameDetail {
                id: game_id.to_string(),
                launch_mode: "SteamAppId".to_string(),
                target: "294100".to_string(),
                args: vec![],
                working_dir: None,
                stop_process_name: Some("RimWorldWin64.exe".to_string()),
                validation_note: None,
            })
        }

        async fn status(&self, _game_id: Option<&str>) -> Result<Vec<(String, GameStatus)>, OrchestratorError> {
            Ok(vec![("rimworld".to_string(), GameStatus::Running)])
        }

        async fn start(&self, _game_id: &str) -> Result<(), OrchestratorError> {
            Ok(())
        }

        async fn stop(&self, game_id: &str) -> Result<(), OrchestratorError> {
            Err(OrchestratorError::LauncherStopUnsupported(game_id.to_string()))
        }

        async fn kill(&self, _game_id: &str) -> Result<(), OrchestratorError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn games_list_is_newline_joined() {
        let registries = Arc::new(Registries::new(None));
        register_builtin_tools(&registries, Arc::new(FakeOrchestrator));
        let handler = registries.tool_handler("games.list").unwrap();
        let result = handler(json!({})).await;
        assert!(!result.is_error);
    }

    #[tokio::test]
    async fn games_stop_with_launcher_guidance_is_an_is_error_result_not_a_jsonrpc_error() {
        let registries = Arc::new(Registries::new(None));
        register_builtin_tools(&registries, Arc::new(FakeOrchestrator));
        let handler = registries.tool_handler("games.stop").unwrap();
        let result = handler(json!({ "gameId": "rimworld" })).await;
        assert!(result.is_error);
    }

    #[tokio::test]
    async fn games_start_requires_a_game_id() {
        let registries = Arc::new(Registries::new(None));
        register_builtin_tools(&registries, Arc::new(FakeOrchestrator));
        let handler = registries.tool_handler("games.start").unwrap();
        let result = handler(json!({})).await;
        assert!(result.is_error);
    }
}

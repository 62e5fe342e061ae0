//! Demo: renders a dashboard from a fixture, edits the profile, and renders again.

use section_dashboard::lifecycle::{setup_tracing, DashboardSystem, Fixture, Services};
use section_dashboard::model::ProfileField;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

const DEFAULT_FIXTURE: &str = "demos/dashboard.json";

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_FIXTURE.to_string());
    let fixture = Fixture::from_path(&path).map_err(|e| e.to_string())?;
    let source = Arc::new(fixture.data_source().map_err(|e| e.to_string())?);
    info!(%path, user_id = %fixture.config.user_id, "Starting dashboard");

    let system = DashboardSystem::new(fixture.config.clone(), Services::in_memory(source));

    // Frames arrive as sections settle, fastest first.
    let mut frames = system.watch();
    while let Some(view) = frames.recv().await {
        let json = serde_json::to_string(&view).map_err(|e| e.to_string())?;
        println!("{json}");
    }

    if system.config().can_edit {
        async {
            let mut editor = system.open_editor().await.map_err(|e| e.to_string())?;
            editor.start_edit().map_err(|e| e.to_string())?;
            editor
                .set_field(ProfileField::Name, "Alice")
                .map_err(|e| e.to_string())?;
            editor.blur(ProfileField::Name).await.map_err(|e| e.to_string())?;
            editor
                .set_field(ProfileField::Bio, "Writes Rust every day.")
                .map_err(|e| e.to_string())?;
            editor.blur(ProfileField::Bio).await.map_err(|e| e.to_string())?;
            editor.save().await.map_err(|e| e.to_string())?;
            info!(name = %editor.original().name, "Profile saved");
            Ok::<_, String>(())
        }
        .instrument(info_span!("profile_edit"))
        .await?;

        let view = system.settle().await;
        let json = serde_json::to_string(&view).map_err(|e| e.to_string())?;
        println!("{json}");
    }

    system.shutdown().await.map_err(|e| e.to_string())
}

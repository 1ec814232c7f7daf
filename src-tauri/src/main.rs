#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gemini;

use gemini::GeminiClient;
use relief_core::audit::log::{ActivityJournal, JOURNAL_FILE_NAME};
use relief_core::config::AppConfig;
use relief_core::dashboard::session::{DashboardSession, DashboardSnapshot, LoadingSource};
use relief_core::error::CoreResult;
use relief_core::relief::extraction::ExtractionAdapter;
use relief_core::relief::model::FoodRequest;
use relief_core::relief::render::{render_request_markdown, render_view_csv};
use relief_core::relief::stats::ExtractionStats;
use relief_core::relief::view::{SortDirection, SortField};
use relief_core::storage::cache::RequestCache;
use relief_core::storage::store::FileStore;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tauri::{Manager, State};
use tracing::{info, warn};

type Session = DashboardSession<FileStore>;

struct AppState {
    session: Mutex<Session>,
    adapter: Arc<ExtractionAdapter<GeminiClient>>,
}

impl AppState {
    fn lock(&self) -> Result<MutexGuard<'_, Session>, String> {
        self.session
            .lock()
            .map_err(|_| "dashboard state is poisoned".to_string())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractionReply {
    stats: Option<ExtractionStats>,
    dashboard: DashboardSnapshot,
}

#[tauri::command]
fn get_dashboard(state: State<'_, AppState>) -> Result<DashboardSnapshot, String> {
    Ok(state.lock()?.snapshot())
}

#[tauri::command]
async fn extract_requests(
    state: State<'_, AppState>,
    text: String,
) -> Result<ExtractionReply, String> {
    if text.trim().is_empty() {
        return Ok(ExtractionReply {
            stats: None,
            dashboard: state.lock()?.snapshot(),
        });
    }
    state
        .lock()?
        .begin_extraction(LoadingSource::Manual, text.chars().count())
        .map_err(|e| e.to_string())?;
    let adapter = Arc::clone(&state.adapter);
    let result = adapter.extract(&text).await;
    finish(&state, LoadingSource::Manual, result)
}

#[tauri::command]
async fn fetch_web_requests(state: State<'_, AppState>) -> Result<ExtractionReply, String> {
    state
        .lock()?
        .begin_extraction(LoadingSource::Web, 0)
        .map_err(|e| e.to_string())?;
    let adapter = Arc::clone(&state.adapter);
    let result = adapter.search_and_extract().await;
    finish(&state, LoadingSource::Web, result)
}

// Failures are carried in the snapshot's `error`, so the UI gets a frame either way.
fn finish(
    state: &AppState,
    source: LoadingSource,
    result: CoreResult<Vec<FoodRequest>>,
) -> Result<ExtractionReply, String> {
    let mut session = state.lock()?;
    let stats = session.finish_extraction(source, result).ok();
    Ok(ExtractionReply {
        stats,
        dashboard: session.snapshot(),
    })
}

#[tauri::command]
fn set_location_filter(
    state: State<'_, AppState>,
    filter: String,
) -> Result<DashboardSnapshot, String> {
    let mut session = state.lock()?;
    session.set_location_filter(filter);
    Ok(session.snapshot())
}

#[tauri::command]
fn reset_filter(state: State<'_, AppState>) -> Result<DashboardSnapshot, String> {
    let mut session = state.lock()?;
    session.reset_filter();
    Ok(session.snapshot())
}

#[tauri::command]
fn set_sort(
    state: State<'_, AppState>,
    field: SortField,
    direction: SortDirection,
) -> Result<DashboardSnapshot, String> {
    let mut session = state.lock()?;
    session.set_sort(field, direction);
    Ok(session.snapshot())
}

#[tauri::command]
fn toggle_sort_direction(state: State<'_, AppState>) -> Result<DashboardSnapshot, String> {
    let mut session = state.lock()?;
    session.toggle_sort_direction();
    Ok(session.snapshot())
}

#[tauri::command]
fn select_request(state: State<'_, AppState>, id: String) -> Result<DashboardSnapshot, String> {
    let mut session = state.lock()?;
    session.select(&id).map_err(|e| e.to_string())?;
    Ok(session.snapshot())
}

#[tauri::command]
fn clear_selection(state: State<'_, AppState>) -> Result<DashboardSnapshot, String> {
    let mut session = state.lock()?;
    session.clear_selection();
    Ok(session.snapshot())
}

#[tauri::command]
fn dismiss_error(state: State<'_, AppState>) -> Result<DashboardSnapshot, String> {
    let mut session = state.lock()?;
    session.dismiss_error();
    Ok(session.snapshot())
}

#[tauri::command]
fn set_draft(state: State<'_, AppState>, text: String) -> Result<(), String> {
    state.lock()?.set_draft(text);
    Ok(())
}

#[tauri::command]
fn load_sample_text(state: State<'_, AppState>) -> Result<String, String> {
    Ok(state.lock()?.load_sample_draft().to_string())
}

#[tauri::command]
fn clear_all_data(
    state: State<'_, AppState>,
    confirmed: bool,
) -> Result<DashboardSnapshot, String> {
    let mut session = state.lock()?;
    session.clear_all(confirmed).map_err(|e| e.to_string())?;
    Ok(session.snapshot())
}

#[tauri::command]
fn export_view_csv(state: State<'_, AppState>) -> Result<String, String> {
    let session = state.lock()?;
    render_view_csv(&session.view()).map_err(|e| e.to_string())
}

#[tauri::command]
fn request_markdown(state: State<'_, AppState>, id: String) -> Result<String, String> {
    let session = state.lock()?;
    session
        .cache()
        .get(&id)
        .map(render_request_markdown)
        .ok_or_else(|| format!("unknown request id {}", id))
}

fn build_state(cfg: &AppConfig) -> Result<AppState, String> {
    let store = FileStore::open(&cfg.data_dir).map_err(|e| e.to_string())?;
    let mut session = DashboardSession::new(RequestCache::load(store));
    if cfg.journal_enabled {
        match ActivityJournal::open_or_create(cfg.data_dir.join(JOURNAL_FILE_NAME)) {
            Ok(journal) => session = session.with_journal(journal),
            Err(e) => warn!(error = %e, "activity journal unavailable, continuing without it"),
        }
    }
    if cfg.api_key.is_none() {
        warn!("no API key configured; extraction will fail until GEMINI_API_KEY is set");
    }
    let adapter = ExtractionAdapter::new(GeminiClient::from_config(cfg)?)
        .with_search_source(cfg.search_source.clone());
    Ok(AppState {
        session: Mutex::new(session),
        adapter: Arc::new(adapter),
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    tauri::Builder::default()
        .setup(|app| {
            let app_data = app.path().app_data_dir().ok();
            let cfg = AppConfig::resolve(app_data)?;
            info!(data_dir = %cfg.data_dir.display(), model = %cfg.model, "starting relief desk");
            app.manage(build_state(&cfg)?);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            get_dashboard,
            extract_requests,
            fetch_web_requests,
            set_location_filter,
            reset_filter,
            set_sort,
            toggle_sort_direction,
            select_request,
            clear_selection,
            dismiss_error,
            set_draft,
            load_sample_text,
            clear_all_data,
            export_view_csv,
            request_markdown
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

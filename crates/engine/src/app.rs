//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    clock::SystemClock,
    config::{EngineConfig, GeneratorBackend},
    offline::OfflineGenerator,
    ollama::OllamaGenerator,
    ports::{ClockPort, GenerationPort, SaveRepo},
    save_store::SaveStore,
};
use crate::stores::SessionStore;
use crate::use_cases;

/// Main application state.
///
/// Holds the session store and all use cases.
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub sessions: Arc<SessionStore>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub region: use_cases::RegionUseCases,
    pub movement: use_cases::MovementUseCases,
    pub time: use_cases::TimeUseCases,
    pub area: use_cases::AreaUseCases,
    pub discovery: use_cases::DiscoveryUseCases,
    pub save: use_cases::SaveUseCases,
    pub game_log: use_cases::GameLogUseCases,
    pub player: use_cases::PlayerUseCases,
}

impl App {
    /// Create the App from configuration: file-backed saves under
    /// `config.save_dir`, the configured generator and the system clock.
    pub fn new(config: &EngineConfig) -> Self {
        let repo: Arc<dyn SaveRepo> = Arc::new(SaveStore::new(config.save_dir.clone()));
        let generator: Arc<dyn GenerationPort> = match config.generator {
            GeneratorBackend::Ollama => Arc::new(OllamaGenerator::new(
                &config.ollama_base_url,
                &config.ollama_model,
            )),
            GeneratorBackend::Offline => Arc::new(OfflineGenerator),
        };
        tracing::info!(
            save_dir = %config.save_dir.display(),
            generator = ?config.generator,
            "Configured world engine"
        );
        Self::with_ports(repo, generator, Arc::new(SystemClock::new()))
    }

    /// Wire every use case around the given ports.
    pub fn with_ports(
        repo: Arc<dyn SaveRepo>,
        generator: Arc<dyn GenerationPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let sessions = Arc::new(SessionStore::new(repo, clock));

        let region = use_cases::RegionUseCases::new(Arc::new(
            use_cases::region::GenerateRegions::new(sessions.clone(), generator.clone()),
        ));

        let movement = use_cases::MovementUseCases::new(
            Arc::new(use_cases::movement::MoveToZone::new(sessions.clone())),
            Arc::new(use_cases::movement::MoveToSubZone::new(sessions.clone())),
        );

        let time = use_cases::TimeUseCases::new(Arc::new(use_cases::time::InitClock::new(
            sessions.clone(),
        )));

        let area = use_cases::AreaUseCases::new(Arc::new(use_cases::area::GetCurrentArea::new(
            sessions.clone(),
        )));

        let discovery = use_cases::DiscoveryUseCases::new(
            Arc::new(use_cases::discovery::DiscoverInteractions::new(
                sessions.clone(),
                generator,
            )),
            Arc::new(use_cases::discovery::ExecuteInteraction::new(
                sessions.clone(),
            )),
        );

        let save = use_cases::SaveUseCases::new(
            Arc::new(use_cases::save::GetSave::new(sessions.clone())),
            Arc::new(use_cases::save::PutSave::new(sessions.clone())),
            Arc::new(use_cases::save::ClearSave::new(sessions.clone())),
        );

        let game_log = use_cases::GameLogUseCases::new(
            Arc::new(use_cases::game_log::AddGameLog::new(sessions.clone())),
            Arc::new(use_cases::game_log::ListGameLogs::new(sessions.clone())),
            Arc::new(use_cases::game_log::GameLogSettingsOps::new(sessions.clone())),
        );

        let player = use_cases::PlayerUseCases::new(Arc::new(
            use_cases::player::PlayerProfile::new(sessions.clone()),
        ));

        Self {
            sessions,
            use_cases: UseCases {
                region,
                movement,
                time,
                area,
                discovery,
                save,
                game_log,
                player,
            },
        }
    }
}

//! Subcommand implementations and the state they share.

use std::future::Future;
use std::path::Path;

use anyhow::{anyhow, Result};
use comfy_table::Table;

use quizzki_client::{load_config_from, HttpApi, QuizzkiConfig};
use quizzki_core::error::FlowError;
use quizzki_core::session::{Role, Session, SessionStore};
use quizzki_core::view::ViewState;

pub mod exam;
pub mod init;
pub mod login;
pub mod student;
pub mod teacher;

/// Resolved configuration plus the session store it points at.
pub struct Context {
    pub config: QuizzkiConfig,
    pub store: SessionStore,
}

impl Context {
    /// Load the config file, then apply command-line overrides.
    pub fn load(
        config_path: Option<&Path>,
        url: Option<&str>,
        session_file: Option<&Path>,
    ) -> Result<Self> {
        let mut config = load_config_from(config_path)?;
        if let Some(url) = url {
            config.base_url = url.to_string();
        }
        if let Some(path) = session_file {
            config.session_file = Some(path.to_path_buf());
        }

        let store = SessionStore::new(
            config
                .session_file
                .clone()
                .unwrap_or_else(SessionStore::default_path),
        );
        tracing::debug!(base_url = %config.base_url, session = %store.path().display(), "context ready");
        Ok(Self { config, store })
    }

    pub fn api(&self) -> Result<HttpApi> {
        self.config.client()
    }

    /// The stored session for `role`; fails when nobody is signed in.
    pub fn session(&self, role: Role) -> Result<Session> {
        self.store.require(role)
    }
}

/// Run one listing through a [`ViewState`] and hand back its data.
pub async fn load_view<T, F>(fut: F) -> Result<T>
where
    F: Future<Output = Result<T, FlowError>>,
{
    let mut view = ViewState::Idle;
    view.load(fut).await;
    view.into_result().map_err(|message| anyhow!(message))
}

pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_header(header.to_vec());
    table
}

/// Print a table, or `empty` when it has no rows.
pub fn print_table(table: &Table, empty: &str) {
    if table.row_iter().next().is_none() {
        println!("{empty}");
    } else {
        println!("{table}");
    }
}

//! Table manager: creates, tracks, and looks up tables.

use std::collections::HashMap;

use cardroom_protocol::{GameId, PlayerId};

use crate::table::spawn_table;
use crate::{GameConfig, GameSession, PlayerSender, TableError, TableHandle};

/// Default mailbox size for table actors.
const DEFAULT_MAILBOX_SIZE: usize = 64;

/// Registry of running tables.
///
/// The manager only allocates ids and hands out [`TableHandle`]s.
/// Game operations go straight to the table actor, so callers that
/// share the manager behind a mutex should clone the handle and release
/// the lock before awaiting the table.
pub struct TableManager {
    tables: HashMap<GameId, TableHandle>,
    next_id: u64,
    /// Config applied to every table this manager creates.
    config: GameConfig,
}

impl TableManager {
    /// Creates an empty manager whose tables use `config`.
    pub fn new(config: GameConfig) -> Self {
        Self {
            tables: HashMap::new(),
            next_id: 1,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Spawns a new, empty table and returns its handle.
    pub fn create_table(&mut self, name: impl Into<String>) -> TableHandle {
        let game_id = GameId(self.next_id);
        self.next_id += 1;

        let session = GameSession::new(game_id, name, self.config.clone());
        let handle = spawn_table(session, DEFAULT_MAILBOX_SIZE);
        self.tables.insert(game_id, handle.clone());
        tracing::info!(%game_id, name = handle.name(), "table created");
        handle
    }

    /// Creates a table and seats its owner in one step.
    ///
    /// If seating fails the table is torn down again.
    pub async fn open_table(
        &mut self,
        owner: PlayerId,
        owner_name: String,
        game_name: Option<String>,
        sender: PlayerSender,
    ) -> Result<GameId, TableError> {
        let name = game_name.unwrap_or_else(|| format!("{owner_name}'s table"));
        let handle = self.create_table(name);
        let game_id = handle.game_id();

        if let Err(e) = handle.join(owner, owner_name, true, sender).await {
            let _ = self.destroy_table(game_id).await;
            return Err(e);
        }
        Ok(game_id)
    }

    /// Returns a handle to the given table.
    pub fn handle(&self, game_id: GameId) -> Result<TableHandle, TableError> {
        self.tables
            .get(&game_id)
            .cloned()
            .ok_or(TableError::NotFound(game_id))
    }

    /// Stops a table and forgets it.
    pub async fn destroy_table(&mut self, game_id: GameId) -> Result<(), TableError> {
        let handle = self
            .tables
            .remove(&game_id)
            .ok_or(TableError::NotFound(game_id))?;

        let _ = handle.shutdown().await;
        tracing::info!(%game_id, "table destroyed");
        Ok(())
    }

    /// Returns the number of tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Lists all table ids.
    pub fn game_ids(&self) -> Vec<GameId> {
        self.tables.keys().copied().collect()
    }
}

impl Default for TableManager {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

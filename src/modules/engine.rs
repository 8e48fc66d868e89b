use chrono::Utc;
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::modules::config::Settings;
use crate::modules::economy::{self, EconomyCommands, EconomyQueries, Reply};
use crate::modules::error::ConfigError;
use crate::modules::format::Formatter;
use crate::modules::gate;
use crate::modules::parser::{Command, parse_line};
use crate::modules::store::{EconomyStore, Ledger};

/// One chat message as handed over by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inbound {
    pub sender_id: String,
    pub sender_display_name: String,
    pub text: String,
    /// Decided by the transport; the engine never works this out itself.
    #[serde(default)]
    pub is_moderator_in_context: bool,
}

impl Inbound {
    pub fn new(
        sender_id: impl Into<String>,
        sender_display_name: impl Into<String>,
        text: impl Into<String>,
        is_moderator_in_context: bool,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            sender_display_name: sender_display_name.into(),
            text: text.into(),
            is_moderator_in_context,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outbound {
    pub recipient_id: String,
    pub text: String,
}

/// Parses, gates and executes commands against an [`EconomyStore`].
///
/// Each command runs load -> mutate -> save under the engine's mutex and the
/// store's own cycle lock, so neither threads nor other processes sharing
/// the store can overwrite each other's changes.
pub struct Engine<S> {
    store: S,
    settings: Settings,
    formatter: Formatter,
    cycle: Mutex<()>,
}

impl<S: EconomyStore> Engine<S> {
    pub fn new(store: S, settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let formatter = Formatter::new(settings.prefix.clone());
        Ok(Self {
            store,
            settings,
            formatter,
            cycle: Mutex::new(()),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle a message with the wall clock and thread RNG.
    pub fn handle(&self, msg: &Inbound) -> Option<String> {
        let now = Utc::now().timestamp();
        self.handle_at(msg, now, &mut rand::thread_rng())
    }

    /// Handle a message with an explicit clock reading and random source.
    pub fn handle_at<R: Rng + ?Sized>(
        &self,
        msg: &Inbound,
        now: i64,
        rng: &mut R,
    ) -> Option<String> {
        self.reply_at(msg, now, rng)
            .map(|reply| self.formatter.render(&reply))
    }

    pub fn outbound<R: Rng + ?Sized>(
        &self,
        msg: &Inbound,
        now: i64,
        rng: &mut R,
    ) -> Option<Outbound> {
        self.handle_at(msg, now, rng).map(|text| Outbound {
            recipient_id: msg.sender_id.clone(),
            text,
        })
    }

    /// Same as [`Engine::handle_at`] but returns the unrendered reply.
    pub fn reply_at<R: Rng + ?Sized>(
        &self,
        msg: &Inbound,
        now: i64,
        rng: &mut R,
    ) -> Option<Reply> {
        let line = parse_line(&msg.text, &self.settings.prefix)?;
        let command = Command::from_parsed(&line);
        debug!(sender = %msg.sender_id, command = %line.name, "dispatching");

        if gate::authorize(&command, msg.is_moderator_in_context).is_err() {
            debug!(sender = %msg.sender_id, command = %line.name, "permission denied");
            return Some(Reply::PermissionDenied);
        }

        Some(self.execute(msg, command, now, rng))
    }

    fn execute<R: Rng + ?Sized>(
        &self,
        msg: &Inbound,
        command: Command,
        now: i64,
        rng: &mut R,
    ) -> Reply {
        // Replies that never look at the ledger.
        match &command {
            Command::Rules => return Reply::Rules,
            Command::Help => return Reply::Help,
            Command::Gpt { query } => return economy::gpt(query),
            Command::YoutubeAudio { link } => return economy::youtube_audio(link.as_deref()),
            Command::Emotion { name, gif } => {
                return Reply::Emotion {
                    name: name.clone(),
                    gif: *gif,
                };
            }
            Command::SetGroupOpen { open } => return Reply::GroupToggled { open: *open },
            Command::Kick { target } => return moderation_ack("kick", target.as_deref()),
            Command::Vote { target } => return moderation_ack("votar", target.as_deref()),
            _ => {}
        }

        let _guard = self.cycle.lock();
        let _store_lock = match self.store.lock_cycle() {
            Ok(lock) => lock,
            Err(err) => {
                error!(sender = %msg.sender_id, error = %err, "failed to lock economy store");
                return Reply::StorageFailure;
            }
        };
        let mut ledger = self.load_ledger();
        let id = msg.sender_id.as_str();

        if command.requires_profile() && !ledger.contains(id) {
            return Reply::MustRegister;
        }

        let reply = match command {
            Command::Register => EconomyCommands::register(
                &mut ledger,
                id,
                &msg.sender_display_name,
                &self.settings,
                rng,
            ),
            Command::Profile => EconomyQueries::profile(&ledger, id),
            Command::Work => EconomyCommands::work(&mut ledger, id, now, &self.settings, rng),
            Command::Shop => EconomyQueries::shop(),
            Command::Buy { item } => {
                EconomyCommands::buy(&mut ledger, id, &item, &self.settings, rng)
            }
            Command::Promote { target } => EconomyCommands::promote(&mut ledger, target.as_deref()),
            Command::Unknown { raw } => Reply::Unknown { raw },
            _ => Reply::Unknown {
                raw: msg.text.clone(),
            },
        };

        if reply.changed_ledger() {
            if let Err(err) = self.store.save_all(&ledger) {
                error!(sender = %msg.sender_id, error = %err, "failed to save economy store");
                return Reply::StorageFailure;
            }
        }
        reply
    }

    /// Load the whole ledger; an unreadable store starts over empty.
    fn load_ledger(&self) -> Ledger {
        match self.store.load_all() {
            Ok(ledger) => ledger,
            Err(err) => {
                warn!(error = %err, "economy store unreadable; continuing with an empty ledger");
                Ledger::default()
            }
        }
    }
}

fn moderation_ack(action: &'static str, target: Option<&str>) -> Reply {
    match target {
        Some(target) => Reply::ModerationAck {
            action,
            target: target.to_string(),
        },
        None => Reply::MissingTarget { command: action },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::modules::catalog::Rank;
    use crate::modules::store::{CycleLock, MemoryStore};
    use crate::modules::user::UserRecord;

    const NOW: i64 = 1_700_000_000;

    fn engine() -> Engine<MemoryStore> {
        Engine::new(MemoryStore::new(), Settings::default()).unwrap()
    }

    fn say(engine: &Engine<MemoryStore>, text: &str) -> Option<Reply> {
        let msg = Inbound::new("U1", "Ana", text, false);
        engine.reply_at(&msg, NOW, &mut StdRng::seed_from_u64(9))
    }

    fn user(engine: &Engine<MemoryStore>, id: &str) -> Option<UserRecord> {
        engine.store().get(id).unwrap()
    }

    #[test]
    fn plain_chat_gets_no_reply() {
        assert_eq!(say(&engine(), "buenos días"), None);
    }

    #[test]
    fn economy_commands_need_registration() {
        let engine = engine();
        for text in ["#perfil", "#trabajar", "#tienda", "#comprar Kit de Curación", "#bailar"] {
            assert_eq!(say(&engine, text), Some(Reply::MustRegister), "{}", text);
        }
        assert!(engine.store().load_all().unwrap().is_empty());
    }

    #[test]
    fn utilities_work_before_registration() {
        let engine = engine();
        assert_eq!(say(&engine, "#reglas"), Some(Reply::Rules));
        assert_eq!(say(&engine, "#HELP"), Some(Reply::Help));
        assert!(matches!(say(&engine, "#risa"), Some(Reply::Emotion { .. })));
        assert_eq!(say(&engine, "#gpt"), Some(Reply::GptUsage));
    }

    #[test]
    fn unknown_command_after_registration() {
        let engine = engine();
        say(&engine, "#iniciar");
        assert_eq!(
            say(&engine, "#bailar  fuerte"),
            Some(Reply::Unknown {
                raw: "bailar  fuerte".into()
            })
        );
    }

    #[test]
    fn privileged_command_denied_without_flag() {
        let engine = engine();
        say(&engine, "#iniciar");
        engine
            .store()
            .upsert(UserRecord {
                balance: 20_000,
                ..user(&engine, "U1").unwrap()
            })
            .unwrap();
        let before = engine.store().load_all().unwrap();

        for text in ["#ascender U1", "#ascender nadie", "#kick U1", "#cerrar", "#abrir"] {
            assert_eq!(say(&engine, text), Some(Reply::PermissionDenied), "{}", text);
        }
        assert_eq!(engine.store().load_all().unwrap(), before);
    }

    #[test]
    fn unregistered_sender_cannot_promote() {
        let engine = engine();
        say(&engine, "#iniciar");
        let before = engine.store().load_all().unwrap();

        let msg = Inbound::new("U9", "Desconocido", "#ascender U1", false);
        assert_eq!(
            engine.reply_at(&msg, NOW, &mut StdRng::seed_from_u64(3)),
            Some(Reply::PermissionDenied)
        );
        assert_eq!(engine.store().load_all().unwrap(), before);
        assert!(user(&engine, "U9").is_none());
    }

    #[test]
    fn moderator_promotes_target() {
        let engine = engine();
        say(&engine, "#iniciar");
        let mut record = user(&engine, "U1").unwrap();
        record.balance = 60_000;
        engine.store().upsert(record).unwrap();

        let msg = Inbound::new("M1", "Mod", "#ascender U1", true);
        let reply = engine.reply_at(&msg, NOW, &mut StdRng::seed_from_u64(1));
        assert!(matches!(
            reply,
            Some(Reply::Promoted {
                rank: Rank::Supervisor,
                ..
            })
        ));
        assert_eq!(user(&engine, "U1").unwrap().rank, Rank::Supervisor);
        assert!(user(&engine, "M1").is_none());
    }

    #[test]
    fn moderator_simulated_actions() {
        let engine = engine();
        let kick = Inbound::new("M1", "Mod", "#kick U7", true);
        assert_eq!(
            engine.reply_at(&kick, NOW, &mut StdRng::seed_from_u64(1)),
            Some(Reply::ModerationAck {
                action: "kick",
                target: "U7".into()
            })
        );
        let close = Inbound::new("M1", "Mod", "#close", true);
        assert_eq!(
            engine.reply_at(&close, NOW, &mut StdRng::seed_from_u64(1)),
            Some(Reply::GroupToggled { open: false })
        );
    }

    #[test]
    fn corrupt_store_recovers_empty() {
        struct Broken;
        impl EconomyStore for Broken {
            fn load_all(&self) -> Result<Ledger, crate::modules::error::StoreError> {
                Err(crate::modules::error::StoreError::Corrupt {
                    path: "economy.json".into(),
                    source: serde_json::from_str::<Ledger>("{").unwrap_err(),
                })
            }
            fn save_all(&self, _: &Ledger) -> Result<(), crate::modules::error::StoreError> {
                Ok(())
            }
        }

        let engine = Engine::new(Broken, Settings::default()).unwrap();
        let msg = Inbound::new("U1", "Ana", "#iniciar", false);
        let reply = engine.reply_at(&msg, NOW, &mut StdRng::seed_from_u64(1));
        assert!(matches!(reply, Some(Reply::Registered { .. })));
    }

    #[test]
    fn failed_save_reports_storage_failure() {
        struct ReadOnly;
        impl EconomyStore for ReadOnly {
            fn load_all(&self) -> Result<Ledger, crate::modules::error::StoreError> {
                Ok(Ledger::default())
            }
            fn save_all(&self, _: &Ledger) -> Result<(), crate::modules::error::StoreError> {
                Err(crate::modules::error::StoreError::Io {
                    path: "economy.json".into(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "ro"),
                })
            }
        }

        let engine = Engine::new(ReadOnly, Settings::default()).unwrap();
        let msg = Inbound::new("U1", "Ana", "#iniciar", false);
        assert_eq!(
            engine.reply_at(&msg, NOW, &mut StdRng::seed_from_u64(1)),
            Some(Reply::StorageFailure)
        );
    }

    #[test]
    fn inverted_box_range_is_rejected_up_front() {
        let settings = Settings {
            mystery_box_min: 3_000,
            mystery_box_max: 300,
            ..Settings::default()
        };
        let err = Engine::new(MemoryStore::new(), settings).err().unwrap();
        assert!(matches!(err, ConfigError::Invalid(_)), "{}", err);
    }

    #[test]
    fn failed_lock_reports_storage_failure() {
        struct Unlockable;
        impl EconomyStore for Unlockable {
            fn lock_cycle(&self) -> Result<CycleLock, crate::modules::error::StoreError> {
                Err(crate::modules::error::StoreError::Io {
                    path: "economy.json.lock".into(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "ro"),
                })
            }
            fn load_all(&self) -> Result<Ledger, crate::modules::error::StoreError> {
                Ok(Ledger::default())
            }
            fn save_all(&self, _: &Ledger) -> Result<(), crate::modules::error::StoreError> {
                panic!("saved without holding the lock")
            }
        }

        let engine = Engine::new(Unlockable, Settings::default()).unwrap();
        let msg = Inbound::new("U1", "Ana", "#iniciar", false);
        assert_eq!(
            engine.reply_at(&msg, NOW, &mut StdRng::seed_from_u64(1)),
            Some(Reply::StorageFailure)
        );
        let rules = Inbound::new("U1", "Ana", "#reglas", false);
        assert_eq!(
            engine.reply_at(&rules, NOW, &mut StdRng::seed_from_u64(1)),
            Some(Reply::Rules)
        );
    }

    #[test]
    fn concurrent_purchases_do_not_lose_updates() {
        let engine = Arc::new(engine());
        say(&engine, "#iniciar");
        let mut record = user(&engine, "U1").unwrap();
        record.balance = 500 * 16;
        engine.store().upsert(record).unwrap();

        let handles: Vec<_> = (0..20)
            .map(|seed| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    let msg = Inbound::new("U1", "Ana", "#comprar kit de curación", false);
                    engine.reply_at(&msg, NOW, &mut StdRng::seed_from_u64(seed))
                })
            })
            .collect();

        let mut bought = 0;
        let mut refused = 0;
        for handle in handles {
            match handle.join().unwrap() {
                Some(Reply::Purchased { .. }) => bought += 1,
                Some(Reply::InsufficientFunds { .. }) => refused += 1,
                other => panic!("unexpected reply {:?}", other),
            }
        }
        assert_eq!((bought, refused), (16, 4));
        assert_eq!(user(&engine, "U1").unwrap().balance, 0);
    }

    #[test]
    fn inbound_uses_camel_case_json() {
        let msg: Inbound = serde_json::from_str(
            r##"{"senderId":"U1","senderDisplayName":"Ana","text":"#perfil","isModeratorInContext":true}"##,
        )
        .unwrap();
        assert_eq!(msg, Inbound::new("U1", "Ana", "#perfil", true));
    }
}

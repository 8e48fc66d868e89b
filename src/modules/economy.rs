use rand::Rng;
use tracing::{debug, info};

use crate::modules::catalog::{Coins, JOBS, RARITY_WEIGHTS, Rank, Rarity, ShopItem};
use crate::modules::config::Settings;
use crate::modules::sampler::{uniform_pick, weighted_pick};
use crate::modules::store::Ledger;
use crate::modules::user::{Pet, UserRecord};

/// Result of one command, before it is rendered to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Registered {
        name: String,
        job: String,
        wage: Coins,
    },
    AlreadyRegistered {
        name: String,
    },
    MustRegister,
    Profile(UserRecord),
    Worked {
        name: String,
        hours: u32,
        earnings: Coins,
        balance: Coins,
    },
    OnCooldown {
        remaining_secs: i64,
    },
    Shop(Vec<ShopItem>),
    UnknownItem {
        query: String,
    },
    InsufficientFunds {
        price: Coins,
    },
    Hatched {
        price: Coins,
        pet: Pet,
        balance: Coins,
    },
    BoxOpened {
        amount: Coins,
        balance: Coins,
    },
    Purchased {
        item: ShopItem,
        price: Coins,
    },
    Promoted {
        name: String,
        rank: Rank,
        balance: Coins,
    },
    PromotionShortfall {
        name: String,
        next: Rank,
        required: Coins,
        shortfall: Coins,
    },
    AlreadyMaxRank {
        name: String,
    },
    TargetNotFound {
        target: String,
    },
    MissingTarget {
        command: &'static str,
    },
    PermissionDenied,
    ModerationAck {
        action: &'static str,
        target: String,
    },
    GroupToggled {
        open: bool,
    },
    Rules,
    Help,
    GptAnswer {
        query: String,
    },
    GptUsage,
    YoutubeAudio {
        link: String,
    },
    YoutubeInvalid,
    Emotion {
        name: String,
        gif: &'static str,
    },
    Unknown {
        raw: String,
    },
    StorageFailure,
}

impl Reply {
    /// Whether producing this reply changed the ledger.
    pub fn changed_ledger(&self) -> bool {
        matches!(
            self,
            Reply::Registered { .. }
                | Reply::Worked { .. }
                | Reply::Hatched { .. }
                | Reply::BoxOpened { .. }
                | Reply::Purchased { .. }
                | Reply::Promoted { .. }
        )
    }
}

/// Ledger mutations. Every refusal leaves the ledger untouched.
pub struct EconomyCommands;

impl EconomyCommands {
    pub fn register<R: Rng + ?Sized>(
        ledger: &mut Ledger,
        id: &str,
        display_name: &str,
        settings: &Settings,
        rng: &mut R,
    ) -> Reply {
        if ledger.contains(id) {
            return Reply::AlreadyRegistered {
                name: display_name.to_string(),
            };
        }

        let (job, wage) = JOBS[rng.gen_range(0..JOBS.len())];
        let record = UserRecord::new(id, display_name, job, wage, settings.starting_balance);
        ledger.upsert(record);
        info!(user = id, job, wage, "registered economy profile");

        Reply::Registered {
            name: display_name.to_string(),
            job: job.to_string(),
            wage,
        }
    }

    pub fn work<R: Rng + ?Sized>(
        ledger: &mut Ledger,
        id: &str,
        now: i64,
        settings: &Settings,
        rng: &mut R,
    ) -> Reply {
        let Some(user) = ledger.get_mut(id) else {
            return Reply::MustRegister;
        };

        let cooldown = settings.work_cooldown_secs;
        let elapsed = now.saturating_sub(user.last_work_at).max(0);
        if elapsed < cooldown {
            return Reply::OnCooldown {
                remaining_secs: cooldown - elapsed,
            };
        }

        let hours: u32 = rng.gen_range(1..=3);
        let earnings = user.wage_per_hour.saturating_mul(Coins::from(hours));
        user.credit(earnings);
        user.last_work_at = now;
        debug!(user = id, hours, earnings, balance = user.balance, "shift paid");

        Reply::Worked {
            name: user.display_name.clone(),
            hours,
            earnings,
            balance: user.balance,
        }
    }

    pub fn buy<R: Rng + ?Sized>(
        ledger: &mut Ledger,
        id: &str,
        query: &str,
        settings: &Settings,
        rng: &mut R,
    ) -> Reply {
        let Some(user) = ledger.get_mut(id) else {
            return Reply::MustRegister;
        };
        let Some(item) = ShopItem::find(query) else {
            return Reply::UnknownItem {
                query: query.to_string(),
            };
        };

        let price = item.price();
        if user.debit(price).is_err() {
            return Reply::InsufficientFunds { price };
        }

        match item {
            ShopItem::PetEgg => {
                let rarity = weighted_pick(&RARITY_WEIGHTS, rng)
                    .copied()
                    .unwrap_or(Rarity::Comun);
                let name = uniform_pick(rarity.pet_pool(), rng)
                    .copied()
                    .unwrap_or_default();
                let pet = Pet {
                    name: name.to_string(),
                    rarity,
                    health: settings.pet_health,
                };
                user.pets.push(pet.clone());
                info!(user = id, pet = name, rarity = rarity.label(), "egg hatched");
                Reply::Hatched {
                    price,
                    pet,
                    balance: user.balance,
                }
            }
            ShopItem::MysteryBox => {
                let amount = rng.gen_range(settings.mystery_box_min..=settings.mystery_box_max);
                user.credit(amount);
                debug!(user = id, amount, "mystery box opened");
                Reply::BoxOpened {
                    amount,
                    balance: user.balance,
                }
            }
            other => Reply::Purchased { item: other, price },
        }
    }

    /// Move `target` up exactly one tier if their balance reaches it.
    pub fn promote(ledger: &mut Ledger, target: Option<&str>) -> Reply {
        let Some(target) = target else {
            return Reply::MissingTarget {
                command: "ascender",
            };
        };
        let Some(user) = ledger.get_mut(target) else {
            return Reply::TargetNotFound {
                target: target.to_string(),
            };
        };
        let Some(next) = user.rank.next() else {
            return Reply::AlreadyMaxRank {
                name: user.display_name.clone(),
            };
        };

        let required = next.threshold();
        if user.balance < required {
            return Reply::PromotionShortfall {
                name: user.display_name.clone(),
                next,
                required,
                shortfall: required - user.balance,
            };
        }

        user.rank = next;
        info!(user = target, rank = next.label(), "promoted");
        Reply::Promoted {
            name: user.display_name.clone(),
            rank: next,
            balance: user.balance,
        }
    }
}

/// Read-only views.
pub struct EconomyQueries;

impl EconomyQueries {
    pub fn profile(ledger: &Ledger, id: &str) -> Reply {
        match ledger.get(id) {
            Some(user) => Reply::Profile(user.clone()),
            None => Reply::MustRegister,
        }
    }

    pub fn shop() -> Reply {
        Reply::Shop(ShopItem::ALL.to_vec())
    }
}

/// Canned replies that never touch the ledger.
pub fn gpt(query: &str) -> Reply {
    if query.is_empty() {
        return Reply::GptUsage;
    }
    Reply::GptAnswer {
        query: query.to_string(),
    }
}

pub fn youtube_audio(link: Option<&str>) -> Reply {
    match link {
        Some(link) if link.contains("youtube.com") => Reply::YoutubeAudio {
            link: link.to_string(),
        },
        _ => Reply::YoutubeInvalid,
    }
}

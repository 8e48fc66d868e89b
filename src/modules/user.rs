use serde::{Deserialize, Serialize};

use crate::modules::catalog::{Coins, Rank, Rarity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub name: String,
    pub rarity: Rarity,
    pub health: u32,
}

/// Economy profile of one registered sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub display_name: String,
    pub balance: Coins,
    pub job: String,
    pub wage_per_hour: Coins,
    #[serde(default)]
    pub rank: Rank,
    /// Epoch seconds of the last paid shift; 0 if the user never worked.
    #[serde(default)]
    pub last_work_at: i64,
    #[serde(default)]
    pub pets: Vec<Pet>,
    #[serde(default)]
    pub warnings: u32,
}

impl UserRecord {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        job: impl Into<String>,
        wage_per_hour: Coins,
        balance: Coins,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            balance,
            job: job.into(),
            wage_per_hour,
            rank: Rank::lowest(),
            last_work_at: 0,
            pets: Vec::new(),
            warnings: 0,
        }
    }

    /// Take `amount` out of the balance, refusing instead of going negative.
    pub fn debit(&mut self, amount: Coins) -> Result<(), Coins> {
        if self.balance < amount {
            return Err(amount - self.balance);
        }
        self.balance -= amount;
        Ok(())
    }

    pub fn credit(&mut self, amount: Coins) {
        self.balance = self.balance.saturating_add(amount);
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type Coins = u64;

/// Jobs handed out at registration with their hourly wage.
pub const JOBS: [(&str, Coins); 15] = [
    ("Obrero", 600),
    ("Cajero", 550),
    ("Jardinero", 520),
    ("Reponedor", 530),
    ("Paseador de Perros", 650),
    ("Mesero", 580),
    ("Recepcionista", 700),
    ("Ayudante de Cocina", 620),
    ("Técnico de Soporte", 750),
    ("Barista", 570),
    ("Conductor", 680),
    ("Vendedor", 600),
    ("Limpiador", 510),
    ("Asistente", 630),
    ("Albañil", 610),
];

pub fn job_wage(name: &str) -> Option<Coins> {
    JOBS.iter().find(|(job, _)| *job == name).map(|(_, wage)| *wage)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Empleado,
    Supervisor,
    Gerente,
    Director,
    Jefe,
}

impl Rank {
    /// Tiers from lowest to highest.
    pub const ORDER: [Rank; 5] = [
        Rank::Empleado,
        Rank::Supervisor,
        Rank::Gerente,
        Rank::Director,
        Rank::Jefe,
    ];

    pub const fn lowest() -> Self {
        Rank::Empleado
    }

    pub const fn label(self) -> &'static str {
        match self {
            Rank::Empleado => "Empleado",
            Rank::Supervisor => "Supervisor",
            Rank::Gerente => "Gerente",
            Rank::Director => "Director",
            Rank::Jefe => "Jefe",
        }
    }

    /// Minimum balance needed to be promoted into this tier.
    pub const fn threshold(self) -> Coins {
        match self {
            Rank::Empleado => 0,
            Rank::Supervisor => 15_000,
            Rank::Gerente => 50_000,
            Rank::Director => 150_000,
            Rank::Jefe => 500_000,
        }
    }

    pub fn index(self) -> usize {
        Rank::ORDER
            .iter()
            .position(|r| *r == self)
            .unwrap_or_default()
    }

    /// The tier directly above, or `None` at the top.
    pub fn next(self) -> Option<Rank> {
        Rank::ORDER.get(self.index() + 1).copied()
    }
}

impl Default for Rank {
    fn default() -> Self {
        Rank::lowest()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Rank {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Rank::ORDER
            .iter()
            .copied()
            .find(|r| r.label().to_lowercase() == wanted)
            .ok_or(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    #[serde(rename = "Común")]
    Comun,
    Raro,
    #[serde(rename = "Épico")]
    Epico,
    Legendario,
    #[serde(rename = "Mítico")]
    Mitico,
    #[serde(rename = "Super Legendario")]
    SuperLegendario,
    Dios,
}

impl Rarity {
    pub const fn label(self) -> &'static str {
        match self {
            Rarity::Comun => "Común",
            Rarity::Raro => "Raro",
            Rarity::Epico => "Épico",
            Rarity::Legendario => "Legendario",
            Rarity::Mitico => "Mítico",
            Rarity::SuperLegendario => "Super Legendario",
            Rarity::Dios => "Dios",
        }
    }

    pub const fn pet_pool(self) -> &'static [&'static str] {
        match self {
            Rarity::Comun => &["Perro Callejero", "Gato Doméstico", "Hámster"],
            Rarity::Raro => &["Búho Mensajero", "Serpiente Real", "Loro Parlanchín"],
            Rarity::Epico => &["Dragón Bebé", "Lobo de Hielo", "Fénix Dorado"],
            Rarity::Legendario => &["Tigre de Bengala", "Kraken Joven", "Grifo"],
            Rarity::Mitico => &["Unicornio Espectral", "Golem de Piedra", "Basilisco"],
            Rarity::SuperLegendario => &["Leviathan Ancestral", "Cthulhu Dormido"],
            Rarity::Dios => &["Zeus Mini", "Hades Mascota"],
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Relative odds of each rarity when hatching an egg, in draw order.
pub const RARITY_WEIGHTS: [(Rarity, f64); 7] = [
    (Rarity::Comun, 50.0),
    (Rarity::Raro, 40.0),
    (Rarity::Epico, 25.0),
    (Rarity::Legendario, 10.0),
    (Rarity::Mitico, 5.0),
    (Rarity::SuperLegendario, 1.0),
    (Rarity::Dios, 0.5),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShopItem {
    MysteryBox,
    PetEgg,
    HealingKit,
}

impl ShopItem {
    /// Listing order of the shop.
    pub const ALL: [ShopItem; 3] = [ShopItem::MysteryBox, ShopItem::PetEgg, ShopItem::HealingKit];

    pub const fn label(self) -> &'static str {
        match self {
            ShopItem::MysteryBox => "Caja Misteriosa",
            ShopItem::PetEgg => "Huevo de Mascota",
            ShopItem::HealingKit => "Kit de Curación",
        }
    }

    pub const fn price(self) -> Coins {
        match self {
            ShopItem::MysteryBox => 1_500,
            ShopItem::PetEgg => 2_500,
            ShopItem::HealingKit => 500,
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn find(name: &str) -> Option<ShopItem> {
        let wanted = name.to_lowercase();
        ShopItem::ALL
            .iter()
            .copied()
            .find(|item| item.label().to_lowercase() == wanted)
    }
}

impl fmt::Display for ShopItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

pub const EMOTIONS: [(&str, &str); 12] = [
    ("tristeza", "triste.gif"),
    ("alegria", "feliz.gif"),
    ("enfado", "enojado.gif"),
    ("amor", "corazones.gif"),
    ("risa", "jaja.gif"),
    ("llorar", "llorando.gif"),
    ("dormir", "dormido.gif"),
    ("sorpresa", "wow.gif"),
    ("beso", "kiss.gif"),
    ("abrazo", "hug.gif"),
    ("baile", "dancing.gif"),
    ("decepcion", "meh.gif"),
];

pub fn emotion_gif(name: &str) -> Option<&'static str> {
    EMOTIONS
        .iter()
        .find(|(emotion, _)| *emotion == name)
        .map(|(_, gif)| *gif)
}

pub const RULES: [&str; 4] = [
    "No ignorar a nadie.",
    "No spam o flood.",
    "Nunca ignorar a un moderador.",
    "Hablar mínimo 3 veces por semana.",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_ordered_by_threshold() {
        for pair in Rank::ORDER.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].threshold() < pair[1].threshold());
        }
        assert_eq!(Rank::Jefe.next(), None);
        assert_eq!(Rank::Empleado.next(), Some(Rank::Supervisor));
    }

    #[test]
    fn rank_round_trips_through_label() {
        for rank in Rank::ORDER {
            assert_eq!(rank.label().parse::<Rank>(), Ok(rank));
        }
        assert!("Becario".parse::<Rank>().is_err());
    }

    #[test]
    fn shop_lookup_ignores_case() {
        assert_eq!(ShopItem::find("caja misteriosa"), Some(ShopItem::MysteryBox));
        assert_eq!(ShopItem::find("KIT DE CURACIÓN"), Some(ShopItem::HealingKit));
        assert_eq!(ShopItem::find("Huevo"), None);
    }

    #[test]
    fn every_rarity_has_pets() {
        for (rarity, weight) in RARITY_WEIGHTS {
            assert!(weight > 0.0);
            assert!(!rarity.pet_pool().is_empty());
        }
    }

    #[test]
    fn job_table_has_fifteen_entries() {
        assert_eq!(JOBS.len(), 15);
        assert_eq!(job_wage("Barista"), Some(570));
        assert_eq!(job_wage("Astronauta"), None);
    }

    #[test]
    fn rarity_serializes_with_accents() {
        let json = serde_json::to_string(&Rarity::SuperLegendario).unwrap();
        assert_eq!(json, "\"Super Legendario\"");
        let back: Rarity = serde_json::from_str("\"Común\"").unwrap();
        assert_eq!(back, Rarity::Comun);
    }
}

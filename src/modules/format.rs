use crate::modules::catalog::{Coins, RULES};
use crate::modules::economy::Reply;
use crate::modules::user::UserRecord;

/// Group digits in threes with commas: `1500` -> `1,500`.
pub fn thousands(amount: Coins) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn money(amount: Coins) -> String {
    format!("${}", thousands(amount))
}

/// Renders replies as chat text for a given command prefix.
#[derive(Debug, Clone)]
pub struct Formatter {
    prefix: String,
}

impl Formatter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn render(&self, reply: &Reply) -> String {
        let p = &self.prefix;
        match reply {
            Reply::Registered { name, job, wage } => format!(
                "🎉 ¡Bienvenido/a al sistema, **{}**! 🎉\n💼 **Trabajo inicial:** {} / **Salario base:** {}",
                name,
                job,
                money(*wage)
            ),
            Reply::AlreadyRegistered { name } => format!(
                "¡Hola de nuevo, {}! Ya tienes un perfil económico activo.",
                name
            ),
            Reply::MustRegister => format!("Debes iniciar la economía primero con {}iniciar.", p),
            Reply::Profile(user) => render_profile(user),
            Reply::Worked {
                name,
                hours,
                earnings,
                balance,
            } => format!(
                "✅ **¡{} ha completado su jornada de {}h!** Ganancia: **{}**. Saldo total: **{}**",
                name,
                hours,
                money(*earnings),
                money(*balance)
            ),
            Reply::OnCooldown { remaining_secs } => format!(
                "⏳ ¡Aún estás en jornada! Espera **{}m {}s** más.",
                remaining_secs / 60,
                remaining_secs % 60
            ),
            Reply::Shop(items) => {
                let mut out = String::from("🛍️ **TIENDA DEL BOT** 🛍️\n\n");
                for item in items {
                    out.push_str(&format!("🔹 **{}**: {}\n", item, money(item.price())));
                }
                out.push_str(&format!("\nUsa {}comprar [item] para adquirirlo.", p));
                out
            }
            Reply::UnknownItem { query } => {
                format!("❌ El artículo '{}' no existe en la tienda.", query)
            }
            Reply::InsufficientFunds { price } => format!(
                "❌ ¡No tienes suficiente dinero! Necesitas {}.",
                money(*price)
            ),
            Reply::Hatched {
                price,
                pet,
                balance,
            } => format!(
                "🎉 Has eclosionado un Huevo (costo: {}).\n🐾 **NUEVA MASCOTA:** {} ({})\nSaldo restante: {}",
                money(*price),
                pet.name,
                pet.rarity.label().to_uppercase(),
                money(*balance)
            ),
            Reply::BoxOpened { amount, balance } => format!(
                "📦 Abriste una Caja Misteriosa y ganaste {} en efectivo.\nSaldo restante: {}",
                money(*amount),
                money(*balance)
            ),
            Reply::Purchased { item, price } => format!(
                "Compraste {} por {}. ¡Gracias por tu compra!",
                item,
                money(*price)
            ),
            Reply::Promoted {
                name,
                rank,
                balance,
            } => format!(
                "✨ ¡Ascenso! {} ha sido ascendido a **{}** (Balance: {}).",
                name,
                rank,
                money(*balance)
            ),
            Reply::PromotionShortfall {
                name,
                next,
                required,
                shortfall,
            } => format!(
                "🛑 {} necesita **{}** para ascender a {} (le faltan {}).",
                name,
                money(*required),
                next,
                money(*shortfall)
            ),
            Reply::AlreadyMaxRank { name } => format!("🌟 {} ya está en el rango máximo.", name),
            Reply::TargetNotFound { target } => format!(
                "❌ El usuario con ID {} no ha iniciado la economía.",
                target
            ),
            Reply::MissingTarget { command } => format!("Uso: {}{} [ID].", p, command),
            Reply::PermissionDenied => "❌ Permiso denegado. Solo los administradores o moderadores del grupo pueden usar este comando.".to_string(),
            Reply::ModerationAck { action, target } => format!(
                "✅ **[MODERACIÓN SIMULADA]** El Bot ha ejecutado la acción **{}** sobre el usuario **{}**.",
                action.to_uppercase(),
                target
            ),
            Reply::GroupToggled { open } => format!(
                "🚨 **[CONTROL DE GRUPO SIMULADO]** El grupo ha sido **{}** para mensajes.",
                if *open { "ABIERTO" } else { "CERRADO" }
            ),
            Reply::Rules => {
                let mut out = String::from(
                    "📜 **REGLAS DE LA COMUNIDAD** 📜\n--------------------------------------",
                );
                for (i, rule) in RULES.iter().enumerate() {
                    out.push_str(&format!("\n{}. {}", i + 1, rule));
                }
                out
            }
            Reply::Help => render_help(p),
            Reply::GptAnswer { query } => format!(
                "🤖 **[GPT-Simulación]** Busqué sobre '{}' y la mejor respuesta es: Los resultados indican que...",
                query
            ),
            Reply::GptUsage => format!("Uso: {}gpt [pregunta].", p),
            Reply::YoutubeAudio { link } => format!(
                "🎧 **[Audio Simulación]** Iniciando la descarga y conversión del enlace: {}\nEl Bot enviaría el archivo de audio.",
                link
            ),
            Reply::YoutubeInvalid => {
                "❌ Por favor, proporciona un enlace válido de YouTube.".to_string()
            }
            Reply::Emotion { name, gif } => format!(
                "🖼️ **[GIF]** El bot está enviando un GIF de **{}** ({}).",
                name.to_uppercase(),
                gif
            ),
            Reply::Unknown { raw } => format!(
                "Comando **{}{}** no reconocido. Usa {}help.",
                p, raw, p
            ),
            Reply::StorageFailure => {
                "⚠️ No se pudo guardar el cambio. Inténtalo de nuevo más tarde.".to_string()
            }
        }
    }
}

fn render_profile(user: &UserRecord) -> String {
    let pets = if user.pets.is_empty() {
        "Ninguna".to_string()
    } else {
        user.pets
            .iter()
            .map(|pet| format!("{} ({})", pet.name, pet.rarity))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "👤 **PERFIL ECONÓMICO de {}**\n💰 **Balance:** {} | 🏅 **Rango:** {}\n💼 **Trabajo:** {} | 💵 **Salario/h:** {}\n🐾 **Mascotas:** {}\n⚠️ **Advertencias:** {}",
        user.display_name,
        money(user.balance),
        user.rank,
        user.job,
        money(user.wage_per_hour),
        pets,
        user.warnings
    )
}

fn render_help(p: &str) -> String {
    let mut out = String::from("📚 **LISTA DE COMANDOS DEL BOT** 📚\n\n");
    out.push_str(&format!(
        "🔸 **ECONOMÍA**\n  - {p}iniciar: Crea tu perfil.\n  - {p}perfil: Muestra tu saldo.\n  - {p}trabajar: Gana dinero (con cooldown).\n  - {p}tienda: Muestra ítems.\n  - {p}comprar [item]: Compra un ítem.\n\n"
    ));
    out.push_str(&format!(
        "🔸 **UTILIDADES**\n  - {p}gpt [texto]: Busca y responde (Simulado).\n  - {p}musica_de_youtube [link]: Audio (Simulado).\n  - {p}reglas: Muestra las reglas.\n  - {p}[emoción]: Envía un GIF (ej: {p}risa).\n\n"
    ));
    out.push_str(&format!(
        "🔸 **MODERACIÓN/ADMIN** (Solo Mods)\n  - {p}ascender [ID]: Sube de rango.\n  - {p}kick [ID]: Expulsa (Simulado).\n  - {p}close/open: Cierra/abre el grupo (Simulado)."
    ));
    out
}

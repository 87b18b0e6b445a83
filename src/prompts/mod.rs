//! Prompt assembly for the doctor assistant persona
//!
//! This module builds the synthesized intro instruction that opens every
//! session, plus the fixed greeting and farewell lines shared by the
//! terminal and web adapters.

/// Farewell printed when the user types an exit word
pub const FAREWELL: &str = "Allah şifa versin, görüşmek üzere!";

/// Builds the intro instruction for a new session
///
/// The intro establishes the assistant persona and embeds the patient's
/// name and age verbatim. It is stored as the first (user-role) message of
/// the session and replayed into the model context on every turn.
///
/// # Arguments
///
/// * `name` - Patient name, embedded as given
/// * `age` - Patient age in years
///
/// # Examples
///
/// ```
/// use hekim::prompts::intro_prompt;
///
/// let intro = intro_prompt("Ahmet", 25);
/// assert!(intro.contains("Ahmet"));
/// assert!(intro.contains("25"));
/// ```
pub fn intro_prompt(name: &str, age: u32) -> String {
    format!(
        "Sen her tıp ve diş hekimliği alanında bilgi sahibi, uzaktan teşhise yardımcı \
         bir doktor asistanısın. Hasta {}, {} yaşında. \
         Sağlık sorunları hakkında konuşmak istiyor. \
         Yaşına uygun dikkatli ve nazik tavsiyeler ver; ismiyle hitap et. \
         Hastayı bıktırmadan, kısa ve öz cevaplar ver. Doktor gibi cevap ver.",
        name, age
    )
}

/// Builds the greeting shown when a session starts
///
/// # Examples
///
/// ```
/// use hekim::prompts::welcome_message;
///
/// let welcome = welcome_message("Ahmet");
/// assert!(welcome.starts_with("Merhaba Ahmet"));
/// ```
pub fn welcome_message(name: &str) -> String {
    format!(
        "Merhaba {}, ben Doktor Asistanı. Size nasıl yardımcı olabilirim?",
        name
    )
}

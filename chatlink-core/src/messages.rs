//! Chat-facing texts sent by the issuer

use chrono::Duration;

use crate::record::VerificationCode;

/// Confirmation sent after a code was issued. Uses Telegram's legacy Markdown.
pub fn confirmation(code: &VerificationCode, ttl: Duration) -> String {
    format!(
        "✅ Tu código de verificación es: `{code}`\n\n\
         Ingrésalo en la aplicación para vincular este chat. \
         Es válido durante {}.",
        describe_ttl(ttl)
    )
}

/// Usage hint for a command sent without its activation code.
pub fn usage(command: &str) -> String {
    format!(
        "⚠️ Falta el código de activación.\n\nUso: {command} <código>\n\
         Copia el código que aparece en la aplicación y envíalo junto al comando."
    )
}

fn describe_ttl(ttl: Duration) -> String {
    let minutes = ttl.num_minutes();
    match minutes {
        0 => format!("{} segundos", ttl.num_seconds()),
        1 => "1 minuto".to_string(),
        n => format!("{n} minutos"),
    }
}

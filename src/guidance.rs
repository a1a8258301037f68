//! User-facing guidance text.
//!
//! The engine only ever deals in message keys. Turning a key into a
//! sentence for a given locale happens here, at the presentation boundary.

use crate::fault_classification::FaultCategory;
use crate::session_management::events::ProgressStatus;

pub fn fault_message_key(category: FaultCategory) -> &'static str {
    match category {
        FaultCategory::PermissionDenied => "scan.fault.permission_denied",
        FaultCategory::DeviceNotFound => "scan.fault.device_not_found",
        FaultCategory::DeviceBusy => "scan.fault.device_busy",
        FaultCategory::Unsupported => "scan.fault.unsupported",
        FaultCategory::InsecureContext => "scan.fault.insecure_context",
        FaultCategory::TransientCapture => "scan.fault.transient_capture",
        FaultCategory::TransientNetwork => "scan.fault.transient_network",
        FaultCategory::QuotaExceeded => "scan.fault.quota_exceeded",
        FaultCategory::MaxAttemptsReached => "scan.fault.max_attempts",
        FaultCategory::StreamTimeout => "scan.fault.stream_timeout",
    }
}

pub fn progress_message_key(status: ProgressStatus) -> &'static str {
    match status {
        ProgressStatus::Negotiating => "scan.progress.negotiating",
        ProgressStatus::Analyzing => "scan.progress.analyzing",
        ProgressStatus::Focused => "scan.progress.focused",
        ProgressStatus::Succeeded => "scan.progress.succeeded",
        ProgressStatus::Failed => "scan.progress.failed",
    }
}

/// (key, english, french)
const MESSAGES: &[(&str, &str, &str)] = &[
    (
        "scan.fault.permission_denied",
        "Camera access was denied. Allow camera access in your settings, then try again.",
        "L'accès à la caméra a été refusé. Autorisez la caméra dans vos réglages puis réessayez.",
    ),
    (
        "scan.fault.device_not_found",
        "No camera was found on this device.",
        "Aucune caméra n'a été détectée sur cet appareil.",
    ),
    (
        "scan.fault.device_busy",
        "The camera is in use by another application. Close it and try again.",
        "La caméra est utilisée par une autre application. Fermez-la puis réessayez.",
    ),
    (
        "scan.fault.unsupported",
        "This camera does not support scanning. Try importing a photo instead.",
        "Cette caméra ne permet pas le scan. Essayez d'importer une photo.",
    ),
    (
        "scan.fault.insecure_context",
        "The camera is only available over a secure connection (HTTPS).",
        "La caméra n'est disponible que sur une connexion sécurisée (HTTPS).",
    ),
    (
        "scan.fault.transient_capture",
        "The camera image could not be read.",
        "L'image de la caméra n'a pas pu être lue.",
    ),
    (
        "scan.fault.transient_network",
        "The analysis service could not be reached.",
        "Le service d'analyse est injoignable.",
    ),
    (
        "scan.fault.quota_exceeded",
        "Too many scans for now. Please try again later.",
        "Trop de scans pour le moment. Veuillez réessayer plus tard.",
    ),
    (
        "scan.fault.max_attempts",
        "The medication could not be identified. Improve the lighting or move closer to the packaging, then try again.",
        "Le médicament n'a pas pu être identifié. Améliorez l'éclairage ou rapprochez-vous de la boîte, puis réessayez.",
    ),
    (
        "scan.fault.stream_timeout",
        "The camera did not start in time. Try again.",
        "La caméra n'a pas démarré à temps. Réessayez.",
    ),
    (
        "scan.progress.negotiating",
        "Starting the camera…",
        "Démarrage de la caméra…",
    ),
    (
        "scan.progress.analyzing",
        "Analyzing…",
        "Analyse en cours…",
    ),
    (
        "scan.progress.focused",
        "Almost there, hold steady.",
        "Presque, ne bougez plus.",
    ),
    (
        "scan.progress.succeeded",
        "Medication identified.",
        "Médicament identifié.",
    ),
    (
        "scan.progress.failed",
        "Scan failed.",
        "Échec du scan.",
    ),
];

/// Resolves `key` for `locale` (`fr`, `fr-FR`, `en`, ...). Unknown locales
/// fall back to English, unknown keys to the key itself.
pub fn resolve<'a>(key: &'a str, locale: &str) -> &'a str {
    let french = locale
        .split(['-', '_'])
        .next()
        .map(|lang| lang.eq_ignore_ascii_case("fr"))
        .unwrap_or(false);
    MESSAGES
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, en, fr)| if french { *fr } else { *en })
        .unwrap_or(key)
}

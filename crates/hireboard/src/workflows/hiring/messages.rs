//! Display strings for the presentation boundary. The engine itself only deals in
//! [`FailureKind`] and typed outcomes.

use serde::{Deserialize, Serialize};

use super::service::FailureKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    En,
    Id,
}

impl Locale {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" | "english" => Some(Self::En),
            "id" | "id-id" | "indonesian" | "bahasa" => Some(Self::Id),
            _ => None,
        }
    }

    /// Pick a locale from an `Accept-Language` header, falling back to `default`.
    pub fn negotiate(header: Option<&str>, default: Locale) -> Locale {
        let Some(header) = header else {
            return default;
        };

        let primary = header
            .split(',')
            .next()
            .and_then(|tag| tag.split(';').next())
            .map(|tag| tag.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if primary.starts_with("id") {
            Locale::Id
        } else if primary.starts_with("en") {
            Locale::En
        } else {
            default
        }
    }
}

pub fn failure_message(kind: FailureKind, locale: Locale) -> &'static str {
    use FailureKind::*;

    match (locale, kind) {
        (Locale::En, NotAnEmployee) => "Only job seekers with a profile can apply to positions.",
        (Locale::Id, NotAnEmployee) => {
            "Hanya pencari kerja dengan profil yang dapat melamar posisi."
        }
        (Locale::En, PositionNotFound) => "The position could not be found.",
        (Locale::Id, PositionNotFound) => "Posisi tidak ditemukan.",
        (Locale::En, PositionClosed) => "This position is no longer accepting applications.",
        (Locale::Id, PositionClosed) => "Posisi ini sudah tidak menerima lamaran.",
        (Locale::En, PositionFull) => "This position has reached its capacity.",
        (Locale::Id, PositionFull) => "Kuota posisi ini sudah penuh.",
        (Locale::En, DuplicateApplication) => "You have already applied to this position.",
        (Locale::Id, DuplicateApplication) => "Anda sudah melamar posisi ini.",
        (Locale::En, ApplicationNotFound) => "The application could not be found.",
        (Locale::Id, ApplicationNotFound) => "Lamaran tidak ditemukan.",
        (Locale::En, EmployeeNotFound) => "The applicant profile could not be found.",
        (Locale::Id, EmployeeNotFound) => "Profil pelamar tidak ditemukan.",
        (Locale::En, Unauthorized) => "You are not allowed to perform this action.",
        (Locale::Id, Unauthorized) => "Anda tidak memiliki izin untuk melakukan tindakan ini.",
        (Locale::En, Unauthenticated) => "Please sign in to continue.",
        (Locale::Id, Unauthenticated) => "Silakan masuk terlebih dahulu.",
        (Locale::En, InvalidRequest) => {
            "The request could not be understood. Check its fields."
        }
        (Locale::Id, InvalidRequest) => {
            "Permintaan tidak dapat diproses. Periksa kembali isiannya."
        }
        (Locale::En, Internal) => "Something went wrong. Please try again later.",
        (Locale::Id, Internal) => "Terjadi kesalahan. Silakan coba lagi nanti.",
    }
}

pub fn applied_message(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Your application has been submitted.",
        Locale::Id => "Lamaran Anda berhasil dikirim.",
    }
}

pub fn transition_saved_message(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Application status updated and the applicant was notified.",
        Locale::Id => "Status lamaran diperbarui dan pelamar telah diberi tahu.",
    }
}

pub fn notification_failed_message(locale: Locale) -> &'static str {
    match locale {
        Locale::En => {
            "Application status updated, but the notification e-mail could not be delivered."
        }
        Locale::Id => "Status lamaran diperbarui, tetapi e-mail pemberitahuan gagal dikirim.",
    }
}

pub fn deleted_message(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Application deleted.",
        Locale::Id => "Lamaran berhasil dihapus.",
    }
}

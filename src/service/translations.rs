use serde::Serialize;

use crate::models::notificationmodel::{Language, NotificationKind};

/// Placeholder replaced by the caller-supplied parameter, usually a
/// vehicle registration number.
const PARAM: &str = "{reg}";

const FALLBACK_TITLE: &str = "Notification";
const FALLBACK_BODY: &str = "You have a new notification";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub title: String,
    pub body: String,
}

struct Entry {
    kind: NotificationKind,
    language: Language,
    title: &'static str,
    body: &'static str,
}

const fn entry(kind: NotificationKind, language: Language, title: &'static str, body: &'static str) -> Entry {
    Entry { kind, language, title, body }
}

use Language::{En, Hi, Mr};
use NotificationKind::{AlertAcknowledged, AlertHigh, AlertLow, Call, VehicleSearched};

static CATALOG: &[Entry] = &[
    entry(
        VehicleSearched,
        En,
        "Your vehicle was searched",
        "Someone searched your vehicle with registration number {reg}. They may try to contact you.",
    ),
    entry(
        VehicleSearched,
        Hi,
        "आपके वाहन को खोजा गया",
        "किसी ने आपके वाहन को पंजीकरण संख्या {reg} के साथ खोजा है। वे आपसे संपर्क करने का प्रयास कर सकते हैं।",
    ),
    entry(
        VehicleSearched,
        Mr,
        "तुमचे वाहन शोधले गेले",
        "कोणीतरी तुमचे वाहन नोंदणी क्रमांक {reg} सह शोधले आहे. ते तुमच्याशी संपर्क साधण्याचा प्रयत्न करू शकतात.",
    ),
    entry(
        AlertHigh,
        En,
        "High Priority Alert",
        "You have received a high priority alert regarding your vehicle.",
    ),
    entry(
        AlertHigh,
        Hi,
        "उच्च प्राथमिकता अलर्ट",
        "आपको अपने वाहन के संबंध में उच्च प्राथमिकता अलर्ट प्राप्त हुआ है।",
    ),
    entry(
        AlertHigh,
        Mr,
        "उच्च प्राधान्य इशारा",
        "तुम्हाला तुमच्या वाहनासंदर्भात उच्च प्राधान्य इशारा मिळाला आहे.",
    ),
    entry(
        AlertLow,
        En,
        "Low Priority Alert",
        "You have received a low priority alert regarding your vehicle.",
    ),
    entry(
        AlertLow,
        Hi,
        "कम प्राथमिकता अलर्ट",
        "आपको अपने वाहन के संबंध में कम प्राथमिकता अलर्ट प्राप्त हुआ है।",
    ),
    entry(
        AlertLow,
        Mr,
        "कमी प्राधान्य इशारा",
        "तुम्हाला तुमच्या वाहनासंदर्भात कमी प्राधान्य इशारा मिळाला आहे.",
    ),
    entry(
        AlertAcknowledged,
        En,
        "Your alert has been acknowledged",
        "Your alert regarding vehicle {reg} has been acknowledged by the owner.",
    ),
    entry(
        AlertAcknowledged,
        Hi,
        "आपके अलर्ट की पुष्टि हो गई है",
        "वाहन {reg} के संबंध में आपके अलर्ट की मालिक द्वारा पुष्टि की गई है।",
    ),
    entry(
        AlertAcknowledged,
        Mr,
        "तुमचा इशारा मान्य करण्यात आला",
        "वाहन {reg} संदर्भात तुमचा इशारा मालकाने मान्य केला आहे.",
    ),
    entry(
        Call,
        En,
        "Missed Call Alert",
        "You missed a call. Caller details are not available for privacy reasons.",
    ),
    entry(
        Call,
        Hi,
        "मिस्ड कॉल अलर्ट",
        "आपकी एक कॉल छूट गई। गोपनीयता कारणों से कॉलर विवरण उपलब्ध नहीं है।",
    ),
    entry(
        Call,
        Mr,
        "मिस्ड कॉल इशारा",
        "तुम्ही एक कॉल चुकवला. गोपनीयतेच्या कारणांसाठी कॉलर तपशील उपलब्ध नाहीत.",
    ),
];

fn lookup(kind: NotificationKind, language: Language) -> Option<&'static Entry> {
    CATALOG
        .iter()
        .find(|e| e.kind == kind && e.language == language)
}

/// Localized title and body for `kind`. Falls back to English when the
/// language has no entry.
pub fn resolve_kind(kind: NotificationKind, language: Language, param: Option<&str>) -> Translation {
    match lookup(kind, language).or_else(|| lookup(kind, Language::En)) {
        Some(entry) => Translation {
            title: entry.title.to_string(),
            body: entry.body.replace(PARAM, param.unwrap_or("")),
        },
        None => Translation {
            title: FALLBACK_TITLE.to_string(),
            body: FALLBACK_BODY.to_string(),
        },
    }
}

/// String-keyed lookup for callers holding raw type and language codes.
/// Unknown types resolve to a generic notification, unsupported languages
/// to English.
pub fn resolve(notification_type: &str, language: &str, param: Option<&str>) -> Translation {
    match notification_type.parse::<NotificationKind>() {
        Ok(kind) => resolve_kind(kind, Language::from_code_or_default(language), param),
        Err(_) => Translation {
            title: FALLBACK_TITLE.to_string(),
            body: FALLBACK_BODY.to_string(),
        },
    }
}

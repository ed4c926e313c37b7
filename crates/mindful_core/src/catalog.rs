//! crates/mindful_core/src/catalog.rs
//!
//! The static library: guided sessions, breathing exercises, articles, the
//! therapist directory and the daily tips. Every entry carries both languages
//! and is resolved to one locale on the way out.

use crate::locale::Locale;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

#[derive(Debug, Clone, Copy)]
struct Text {
    th: &'static str,
    en: &'static str,
}

impl Text {
    fn get(self, locale: Locale) -> &'static str {
        match locale {
            Locale::Th => self.th,
            Locale::En => self.en,
        }
    }

    fn matches(self, needle: &str) -> bool {
        [self.th, self.en]
            .iter()
            .any(|t| t.to_lowercase() == needle)
    }
}

const fn text(th: &'static str, en: &'static str) -> Text {
    Text { th, en }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Meditation,
    Breathing,
    Article,
}

struct ContentRecord {
    id: &'static str,
    kind: ContentKind,
    title: Text,
    duration_minutes: u32,
    theme: Text,
    premium: bool,
    rating: f32,
    description: Text,
}

/// One library entry in a single language.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    pub id: &'static str,
    pub kind: ContentKind,
    pub title: &'static str,
    pub duration_minutes: u32,
    pub theme: &'static str,
    pub premium: bool,
    pub rating: f32,
    pub description: &'static str,
}

const CONTENT: &[ContentRecord] = &[
    ContentRecord {
        id: "1",
        kind: ContentKind::Meditation,
        title: text("การนั่งสมาธิเพื่อความสงบ", "Mindful Peace Meditation"),
        duration_minutes: 5,
        theme: text("ความสงบ", "Peace"),
        premium: false,
        rating: 4.8,
        description: text(
            "การนั่งสมาธิที่ช่วยให้จิตใจสงบและผ่อนคลาย",
            "A gentle meditation to calm your mind and relax your body",
        ),
    },
    ContentRecord {
        id: "2",
        kind: ContentKind::Meditation,
        title: text("เทคนิคการหายใจลึก", "Deep Breathing Technique"),
        duration_minutes: 10,
        theme: text("การหายใจ", "Breathing"),
        premium: false,
        rating: 4.9,
        description: text(
            "แบบฝึกหายใจที่ช่วยลดความเครียดและความวิตกกังวล",
            "Breathing exercises to reduce stress and anxiety",
        ),
    },
    ContentRecord {
        id: "3",
        kind: ContentKind::Meditation,
        title: text("การนั่งสมาธิก่อนนอน", "Sleep Meditation"),
        duration_minutes: 15,
        theme: text("การนอน", "Sleep"),
        premium: true,
        rating: 4.7,
        description: text(
            "การนั่งสมาธิที่ช่วยให้หลับลึกและพักผ่อนได้ดี",
            "Guided meditation for better sleep and deep rest",
        ),
    },
    ContentRecord {
        id: "4",
        kind: ContentKind::Meditation,
        title: text("อานาปานสติ", "Anapanasati Meditation"),
        duration_minutes: 20,
        theme: text("พุทธศาสน์", "Buddhist"),
        premium: true,
        rating: 4.9,
        description: text(
            "การสังเกตลมหายใจตามแบบพุทธศาสตร์",
            "Traditional Buddhist breathing meditation practice",
        ),
    },
    ContentRecord {
        id: "5",
        kind: ContentKind::Breathing,
        title: text("หายใจ 4-7-8", "4-7-8 Breathing"),
        duration_minutes: 5,
        theme: text("เทคนิค", "Technique"),
        premium: false,
        rating: 4.6,
        description: text(
            "เทคนิคการหายใจที่ช่วยให้หลับเร็วขึ้น",
            "Breathing technique to help you fall asleep faster",
        ),
    },
    ContentRecord {
        id: "6",
        kind: ContentKind::Breathing,
        title: text("การหายใจแบบกล่อง", "Box Breathing"),
        duration_minutes: 8,
        theme: text("ความเข้มข้น", "Focus"),
        premium: false,
        rating: 4.5,
        description: text(
            "การหายใจที่ช่วยเพิ่มสมาธิและความมั่นคง",
            "Structured breathing for focus and stability",
        ),
    },
    ContentRecord {
        id: "7",
        kind: ContentKind::Article,
        title: text("ความสำคัญของสุขภาพจิต", "Importance of Mental Health"),
        duration_minutes: 3,
        theme: text("บทความ", "Article"),
        premium: false,
        rating: 4.4,
        description: text(
            "เข้าใจความสำคัญของการดูแลสุขภาพจิตในยุคปัจจุบัน",
            "Understanding the importance of mental health in modern times",
        ),
    },
];

impl ContentRecord {
    fn localize(&self, locale: Locale) -> ContentItem {
        ContentItem {
            id: self.id,
            kind: self.kind,
            title: self.title.get(locale),
            duration_minutes: self.duration_minutes,
            theme: self.theme.get(locale),
            premium: self.premium,
            rating: self.rating,
            description: self.description.get(locale),
        }
    }
}

/// Library entries of `kind` (all kinds when `None`) whose title, theme or
/// description contains `query`, case-insensitively. A blank query matches all.
pub fn search_content(
    locale: Locale,
    kind: Option<ContentKind>,
    query: Option<&str>,
) -> Vec<ContentItem> {
    let needle = normalized(query);
    CONTENT
        .iter()
        .filter(|c| kind.map_or(true, |k| c.kind == k))
        .map(|c| c.localize(locale))
        .filter(|c| {
            needle.as_deref().map_or(true, |n| {
                [c.title, c.theme, c.description]
                    .iter()
                    .any(|field| field.to_lowercase().contains(n))
            })
        })
        .collect()
}

struct TherapistRecord {
    id: &'static str,
    name: Text,
    specialties: [Text; 3],
    experience_years: u32,
    rating: f32,
    review_count: u32,
    price_per_session: u32,
    location: Text,
    languages: Text,
    premium_only: bool,
    next_available: Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Therapist {
    pub id: &'static str,
    pub name: &'static str,
    pub specialties: Vec<&'static str>,
    pub experience_years: u32,
    pub rating: f32,
    pub review_count: u32,
    /// Thai baht.
    pub price_per_session: u32,
    pub location: &'static str,
    pub languages: &'static str,
    pub premium_only: bool,
    pub next_available: &'static str,
}

const THERAPISTS: &[TherapistRecord] = &[
    TherapistRecord {
        id: "1",
        name: text("ดร. สมหญิง ใจดี", "Dr. Somying Jaidee"),
        specialties: [
            text("ความวิตกกังวล", "Anxiety"),
            text("ซึมเศร้า", "Depression"),
            text("ความเครียด", "Stress"),
        ],
        experience_years: 8,
        rating: 4.9,
        review_count: 127,
        price_per_session: 2500,
        location: text("กรุงเทพฯ", "Bangkok"),
        languages: text("ไทย, อังกฤษ", "Thai, English"),
        premium_only: false,
        next_available: text("พรุ่งนี้ 14:00", "Tomorrow 2:00 PM"),
    },
    TherapistRecord {
        id: "2",
        name: text("ดร. ปิยะ สุขใจ", "Dr. Piya Sukjai"),
        specialties: [
            text("ครอบครัว", "Family Therapy"),
            text("ความสัมพันธ์", "Relationships"),
            text("การปรับตัว", "Adjustment"),
        ],
        experience_years: 12,
        rating: 4.8,
        review_count: 95,
        price_per_session: 3000,
        location: text("เชียงใหม่", "Chiang Mai"),
        languages: text("ไทย", "Thai"),
        premium_only: true,
        next_available: text("จันทร์หน้า 10:00", "Next Monday 10:00 AM"),
    },
    TherapistRecord {
        id: "3",
        name: text("ดร. นิรันดร์ สงบจิต", "Dr. Niran Sangobgit"),
        specialties: [
            text("การนั่งสมาธิ", "Meditation"),
            text("มุมมองพุทธ", "Buddhist Psychology"),
            text("จิตบำบัด", "Psychotherapy"),
        ],
        experience_years: 15,
        rating: 4.9,
        review_count: 203,
        price_per_session: 3500,
        location: text("กรุงเทพฯ", "Bangkok"),
        languages: text("ไทย, อังกฤษ, บาลี", "Thai, English, Pali"),
        premium_only: true,
        next_available: text("พุธนี้ 16:30", "Wednesday 4:30 PM"),
    },
    TherapistRecord {
        id: "4",
        name: text("ดร. มาลี ช่วยเหลือ", "Dr. Malee Chuayluea"),
        specialties: [
            text("วัยรุ่น", "Adolescent"),
            text("การเรียน", "Academic Stress"),
            text("พฤติกรรม", "Behavioral"),
        ],
        experience_years: 6,
        rating: 4.7,
        review_count: 68,
        price_per_session: 2000,
        location: text("ภูเก็ต", "Phuket"),
        languages: text("ไทย, อังกฤษ", "Thai, English"),
        premium_only: false,
        next_available: text("ศุกร์นี้ 13:00", "Friday 1:00 PM"),
    },
];

impl TherapistRecord {
    fn localize(&self, locale: Locale) -> Therapist {
        Therapist {
            id: self.id,
            name: self.name.get(locale),
            specialties: self.specialties.iter().map(|s| s.get(locale)).collect(),
            experience_years: self.experience_years,
            rating: self.rating,
            review_count: self.review_count,
            price_per_session: self.price_per_session,
            location: self.location.get(locale),
            languages: self.languages.get(locale),
            premium_only: self.premium_only,
            next_available: self.next_available.get(locale),
        }
    }
}

/// Location and specialty compare whole names in either language, so
/// `Bangkok` also selects `กรุงเทพฯ` entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TherapistFilter {
    pub query: Option<String>,
    pub location: Option<String>,
    pub specialty: Option<String>,
}

pub fn search_therapists(locale: Locale, filter: &TherapistFilter) -> Vec<Therapist> {
    let needle = normalized(filter.query.as_deref());
    let location = normalized(filter.location.as_deref());
    let specialty = normalized(filter.specialty.as_deref());

    THERAPISTS
        .iter()
        .filter(|t| location.as_deref().map_or(true, |l| t.location.matches(l)))
        .filter(|t| {
            specialty
                .as_deref()
                .map_or(true, |s| t.specialties.iter().any(|sp| sp.matches(s)))
        })
        .map(|t| t.localize(locale))
        .filter(|t| {
            needle.as_deref().map_or(true, |n| {
                t.name.to_lowercase().contains(n)
                    || t.specialties.iter().any(|s| s.to_lowercase().contains(n))
            })
        })
        .collect()
}

const TIPS: &[Text] = &[
    text(
        "ลองหายใจลึกๆ 5 ครั้ง เมื่อรู้สึกเครียด",
        "Try taking 5 deep breaths when feeling stressed",
    ),
    text(
        "การเดินในธรรมชาติช่วยลดความกังวลได้",
        "Walking in nature helps reduce anxiety",
    ),
    text(
        "นั่งสมาธิแค่ 5 นาทีก็มีผลดีต่อจิตใจ",
        "Just 5 minutes of meditation benefits your mind",
    ),
    text(
        "การขอบคุณในสิ่งเล็กๆ ทำให้มีความสุข",
        "Gratitude for small things brings happiness",
    ),
    text(
        "พักผ่อนให้เพียงพอ สุขภาพจิตจึงจะดี",
        "Adequate rest is essential for mental health",
    ),
];

/// The same tip all day, the next one tomorrow.
pub fn daily_tip(locale: Locale, day: NaiveDate) -> &'static str {
    let index = day.num_days_from_ce().rem_euclid(TIPS.len() as i32) as usize;
    TIPS[index].get(locale)
}

fn normalized(raw: Option<&str>) -> Option<String> {
    raw.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_filters_by_kind_and_query() {
        let breathing = search_content(Locale::En, Some(ContentKind::Breathing), None);
        assert_eq!(
            breathing.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec!["5", "6"]
        );

        let sleep = search_content(Locale::En, None, Some("  SLEEP "));
        assert_eq!(sleep.iter().map(|c| c.id).collect::<Vec<_>>(), vec!["3", "5"]);

        let thai = search_content(Locale::Th, Some(ContentKind::Article), Some(""));
        assert_eq!(thai.len(), 1);
        assert_eq!(thai[0].title, "ความสำคัญของสุขภาพจิต");
    }

    #[test]
    fn therapist_location_matches_either_language() {
        let filter = TherapistFilter {
            location: Some("Bangkok".into()),
            ..Default::default()
        };
        let found = search_therapists(Locale::Th, &filter);
        assert_eq!(found.iter().map(|t| t.id).collect::<Vec<_>>(), vec!["1", "3"]);
        assert!(found.iter().all(|t| t.location == "กรุงเทพฯ"));
    }

    #[test]
    fn therapist_query_and_specialty() {
        let by_query = search_therapists(
            Locale::En,
            &TherapistFilter {
                query: Some("stress".into()),
                ..Default::default()
            },
        );
        assert_eq!(by_query.iter().map(|t| t.id).collect::<Vec<_>>(), vec!["1", "4"]);

        let by_specialty = search_therapists(
            Locale::En,
            &TherapistFilter {
                specialty: Some("meditation".into()),
                ..Default::default()
            },
        );
        assert_eq!(by_specialty.len(), 1);
        assert_eq!(by_specialty[0].name, "Dr. Niran Sangobgit");
    }

    #[test]
    fn tip_is_stable_within_a_day_and_rotates() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let next = day.succ_opt().unwrap();
        assert_eq!(daily_tip(Locale::En, day), daily_tip(Locale::En, day));
        assert_ne!(daily_tip(Locale::En, day), daily_tip(Locale::En, next));
        assert!(!daily_tip(Locale::Th, day).is_empty());
    }
}

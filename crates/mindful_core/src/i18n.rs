//! crates/mindful_core/src/i18n.rs
//!
//! Static translation tables. Lookup is a pure function: a missing key comes
//! back verbatim so a gap in a table shows up as the key, never as blank text.

use crate::locale::Locale;

type Table = &'static [(&'static str, &'static str)];

const TH: Table = &[
    // Navigation
    ("nav.home", "หน้าหลัก"),
    ("nav.chat", "แชท AI"),
    ("nav.content", "เนื้อหา"),
    ("nav.therapist", "นักบำบัด"),
    ("nav.profile", "โปรไฟล์"),
    ("nav.sign_in", "เข้าสู่ระบบ"),
    // Home
    ("home.welcome", "สวัสดี"),
    ("home.how_are_you", "วันนี้คุณเป็นอย่างไร?"),
    ("home.mood_check", "ตรวจสอบอารมณ์"),
    ("home.start_meditation", "เริ่มนั่งสมาธิ"),
    ("home.daily_tip", "เคล็ดลับประจำวัน"),
    ("home.streak", "สร้อยต่อเนื่อง"),
    ("home.days", "วัน"),
    // Chat
    ("chat.title", "แชทกับ AI ผู้ช่วย"),
    ("chat.placeholder", "บอกความรู้สึกของคุณ..."),
    ("chat.send", "ส่ง"),
    ("chat.save_mood", "บันทึกอารมณ์"),
    ("chat.busy", "กรุณารอคำตอบก่อนส่งข้อความใหม่"),
    // Content
    ("content.meditation", "นั่งสมาธิ"),
    ("content.breathing", "การหายใจ"),
    ("content.articles", "บทความ"),
    ("content.duration", "ระยะเวลา"),
    ("content.minutes", "นาที"),
    ("content.start", "เริ่ม"),
    // Therapist
    ("therapist.title", "นักบำบัดมืออาชีพ"),
    ("therapist.book", "จองเวลา"),
    ("therapist.rating", "คะแนน"),
    ("therapist.experience", "ประสบการณ์"),
    ("therapist.years", "ปี"),
    // Profile
    ("profile.settings", "การตั้งค่า"),
    ("profile.language", "ภาษา"),
    ("profile.notifications", "การแจ้งเตือน"),
    ("profile.privacy", "ความเป็นส่วนตัว"),
    ("profile.logout", "ออกจากระบบ"),
    ("profile.premium", "อัปเกรดเป็นพรีเมียม"),
    // Privacy
    ("privacy.title", "ความเป็นส่วนตัวและการยินยอม"),
    ("privacy.data_usage", "เราใช้ข้อมูลอารมณ์ของคุณเพื่อให้คำแนะนำที่เหมาะสมเท่านั้น"),
    ("privacy.secure", "ข้อมูลของคุณถูกเข้ารหัสและจัดเก็บอย่างปลอดภัย"),
    ("privacy.agree", "ยอมรับและดำเนินการต่อ"),
    // Auth
    ("auth.signed_in", "เข้าสู่ระบบสำเร็จ!"),
    ("auth.signed_up", "ลงทะเบียนสำเร็จ!"),
    ("auth.error.rate_limited", "พยายามหลายครั้งเกินไป กรุณาลองใหม่ภายหลัง"),
    ("auth.error.invalid_credentials", "อีเมลหรือรหัสผ่านไม่ถูกต้อง กรุณาตรวจสอบและลองอีกครั้ง"),
    ("auth.error.already_registered", "อีเมลนี้มีบัญชีอยู่แล้ว กรุณาเข้าสู่ระบบแทน"),
    ("auth.error.email_not_confirmed", "กรุณาตรวจสอบอีเมลและกดลิงก์ยืนยันก่อนเข้าสู่ระบบ"),
    ("auth.error.weak_password", "รหัสผ่านไม่ตรงตามข้อกำหนดด้านความปลอดภัย"),
    ("auth.error.invalid_email", "กรุณากรอกอีเมลที่ถูกต้อง"),
    ("auth.error.sign_in_failed", "เข้าสู่ระบบไม่สำเร็จ กรุณาลองอีกครั้ง"),
    ("auth.error.sign_up_failed", "ลงทะเบียนไม่สำเร็จ กรุณาลองอีกครั้ง"),
    ("auth.error.sign_out_failed", "ออกจากระบบไม่สำเร็จ กรุณาลองอีกครั้ง"),
    ("auth.error.required", "กรุณาเข้าสู่ระบบก่อน"),
    // Data
    ("data.error.access_denied", "คุณไม่มีสิทธิ์เข้าถึงข้อมูลนี้"),
    ("data.error.not_found", "ไม่พบข้อมูล"),
    ("data.error.invalid_input", "ข้อมูลไม่ถูกต้อง"),
    // Common
    ("common.loading", "กำลังโหลด..."),
    ("common.save", "บันทึก"),
    ("common.cancel", "ยกเลิก"),
    ("common.confirm", "ยืนยัน"),
    ("common.error", "เกิดข้อผิดพลาด"),
    ("common.success", "สำเร็จ"),
];

const EN: Table = &[
    // Navigation
    ("nav.home", "Home"),
    ("nav.chat", "AI Chat"),
    ("nav.content", "Content"),
    ("nav.therapist", "Therapist"),
    ("nav.profile", "Profile"),
    ("nav.sign_in", "Sign In"),
    // Home
    ("home.welcome", "Hello"),
    ("home.how_are_you", "How are you feeling today?"),
    ("home.mood_check", "Check Mood"),
    ("home.start_meditation", "Start Meditation"),
    ("home.daily_tip", "Daily Tip"),
    ("home.streak", "Streak"),
    ("home.days", "days"),
    // Chat
    ("chat.title", "Chat with AI Assistant"),
    ("chat.placeholder", "Tell me how you feel..."),
    ("chat.send", "Send"),
    ("chat.save_mood", "Save Mood"),
    ("chat.busy", "Please wait for the reply before sending another message"),
    // Content
    ("content.meditation", "Meditation"),
    ("content.breathing", "Breathing"),
    ("content.articles", "Articles"),
    ("content.duration", "Duration"),
    ("content.minutes", "minutes"),
    ("content.start", "Start"),
    // Therapist
    ("therapist.title", "Professional Therapists"),
    ("therapist.book", "Book Session"),
    ("therapist.rating", "Rating"),
    ("therapist.experience", "Experience"),
    ("therapist.years", "years"),
    // Profile
    ("profile.settings", "Settings"),
    ("profile.language", "Language"),
    ("profile.notifications", "Notifications"),
    ("profile.privacy", "Privacy"),
    ("profile.logout", "Logout"),
    ("profile.premium", "Upgrade to Premium"),
    // Privacy
    ("privacy.title", "Privacy & Consent"),
    ("privacy.data_usage", "We only use your mood data to give you suitable recommendations"),
    ("privacy.secure", "Your data is encrypted and stored securely"),
    ("privacy.agree", "Agree and continue"),
    // Auth
    ("auth.signed_in", "Successfully signed in!"),
    ("auth.signed_up", "Registration successful!"),
    ("auth.error.rate_limited", "Too many attempts. Please try again later."),
    (
        "auth.error.invalid_credentials",
        "Invalid email or password. Please check your credentials and try again.",
    ),
    (
        "auth.error.already_registered",
        "An account with this email already exists. Please sign in instead.",
    ),
    (
        "auth.error.email_not_confirmed",
        "Please check your email and click the confirmation link before signing in.",
    ),
    ("auth.error.weak_password", "Password does not meet security requirements."),
    ("auth.error.invalid_email", "Please enter a valid email address."),
    ("auth.error.sign_in_failed", "Sign in failed. Please try again."),
    ("auth.error.sign_up_failed", "Registration failed. Please try again."),
    ("auth.error.sign_out_failed", "Sign out failed. Please try again."),
    ("auth.error.required", "Please sign in first."),
    // Data
    ("data.error.access_denied", "You do not have access to this data."),
    ("data.error.not_found", "Not found."),
    ("data.error.invalid_input", "Invalid input."),
    // Common
    ("common.loading", "Loading..."),
    ("common.save", "Save"),
    ("common.cancel", "Cancel"),
    ("common.confirm", "Confirm"),
    ("common.error", "Error occurred"),
    ("common.success", "Success"),
];

/// The full table for a locale, in declaration order.
pub fn table(locale: Locale) -> &'static [(&'static str, &'static str)] {
    match locale {
        Locale::Th => TH,
        Locale::En => EN,
    }
}

/// Looks up `key`, falling back to the key itself.
pub fn translate<'a>(locale: Locale, key: &'a str) -> &'a str {
    table(locale)
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthError;
    use crate::data::DataError;
    use crate::navigation::AppRoute;
    use crate::validation::ValidationError;
    use std::collections::HashSet;

    #[test]
    fn unknown_key_is_returned_verbatim() {
        assert_eq!(translate(Locale::En, "no.such.key"), "no.such.key");
        assert_eq!(translate(Locale::Th, ""), "");
    }

    #[test]
    fn known_keys_resolve_per_locale() {
        assert_eq!(translate(Locale::En, "nav.home"), "Home");
        assert_eq!(translate(Locale::Th, "nav.home"), "หน้าหลัก");
    }

    #[test]
    fn both_tables_cover_the_same_keys_with_text() {
        let th: HashSet<_> = TH.iter().map(|(k, _)| *k).collect();
        let en: HashSet<_> = EN.iter().map(|(k, _)| *k).collect();
        assert_eq!(th, en);
        for locale in Locale::ALL {
            for (key, value) in table(locale) {
                assert!(!value.trim().is_empty(), "{locale}:{key} is blank");
            }
        }
    }

    #[test]
    fn every_key_the_app_renders_is_translated() {
        let auth_errors = [
            AuthError::RateLimited,
            AuthError::Invalid(ValidationError::InvalidEmail),
            AuthError::Invalid(ValidationError::WeakPassword("too short")),
            AuthError::Invalid(ValidationError::Empty { field: "email" }),
            AuthError::InvalidCredentials,
            AuthError::AlreadyRegistered,
            AuthError::EmailNotConfirmed,
            AuthError::SignInFailed,
            AuthError::SignUpFailed,
            AuthError::SignOutFailed,
            AuthError::Unauthenticated,
        ];
        let data_errors = [
            DataError::AuthenticationRequired,
            DataError::Invalid(ValidationError::UnsupportedLanguage("fr".into())),
            DataError::AccessDenied,
            DataError::NotFound,
            DataError::Failed,
        ];

        let mut keys: Vec<&str> = AppRoute::ALL.iter().map(|r| r.title_key()).collect();
        keys.extend(auth_errors.iter().map(AuthError::message_key));
        keys.extend(data_errors.iter().map(DataError::message_key));
        keys.extend(["chat.busy", "home.daily_tip"]);

        for locale in Locale::ALL {
            for key in &keys {
                assert_ne!(translate(locale, key), *key, "{locale}:{key} is untranslated");
            }
        }
    }
}

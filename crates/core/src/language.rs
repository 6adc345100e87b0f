//! Language detection and normalization to English.
//!
//! English input is normalized in process. Any other supported language is sent to the
//! [`LinguisticAdapter`] through the collaborator pool; if that call fails the normalizer fails
//! open and hands the input through unchanged with `degraded` set.

use crate::collaborators::LinguisticAdapter;
use crate::pool::CollaboratorPool;
use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, LazyLock};
use whatlang::{Detector, Lang, Script};

pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SupportedLanguage {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
}

const fn lang(
    code: &'static str,
    name: &'static str,
    native_name: &'static str,
) -> SupportedLanguage {
    SupportedLanguage {
        code,
        name,
        native_name,
    }
}

pub const SUPPORTED_LANGUAGES: &[SupportedLanguage] = &[
    lang("en", "English", "English"),
    lang("hi", "Hindi", "हिन्दी"),
    lang("es", "Spanish", "Español"),
    lang("fr", "French", "Français"),
    lang("de", "German", "Deutsch"),
    lang("pt", "Portuguese", "Português"),
    lang("zh-cn", "Chinese (Simplified)", "简体中文"),
    lang("ja", "Japanese", "日本語"),
    lang("ko", "Korean", "한국어"),
    lang("ar", "Arabic", "العربية"),
    lang("ru", "Russian", "Русский"),
    lang("ta", "Tamil", "தமிழ்"),
    lang("te", "Telugu", "తెలుగు"),
    lang("bn", "Bengali", "বাংলা"),
    lang("mr", "Marathi", "मराठी"),
    lang("gu", "Gujarati", "ગુજરાતી"),
    lang("kn", "Kannada", "ಕನ್ನಡ"),
    lang("ml", "Malayalam", "മലയാളം"),
    lang("pa", "Punjabi", "ਪੰਜਾਬੀ"),
    lang("ur", "Urdu", "اردو"),
];

pub fn supported_languages() -> &'static [SupportedLanguage] {
    SUPPORTED_LANGUAGES
}

fn lookup(code: &str) -> Option<&'static SupportedLanguage> {
    SUPPORTED_LANGUAGES.iter().find(|l| l.code == code)
}

/// English name for a language code, or `"Unknown"`.
pub fn language_name(code: &str) -> &'static str {
    lookup(code).map_or("Unknown", |l| l.name)
}

/// Maps a detector code onto a supported code.
///
/// Chinese variants collapse to `zh-cn`; unsupported codes become English.
pub fn canonical_language_code(code: &str) -> &'static str {
    let code = code.trim().to_ascii_lowercase().replace('_', "-");
    let code = match code.as_str() {
        "zh" | "zh-tw" | "zh-hans" | "zh-hant" => "zh-cn",
        other => other,
    };
    lookup(code).map_or(DEFAULT_LANGUAGE, |l| l.code)
}

/// Detects the language of free text.
pub trait LanguageDetector: Send + Sync {
    /// Returns an ISO 639-1 code (or `zh-cn`), or `None` if nothing could be determined.
    fn detect(&self, text: &str) -> Option<String>;
}

/// Languages the trigram detector may choose from, paired with their supported codes.
const DETECTABLE: &[(Lang, &str)] = &[
    (Lang::Eng, "en"),
    (Lang::Hin, "hi"),
    (Lang::Spa, "es"),
    (Lang::Fra, "fr"),
    (Lang::Deu, "de"),
    (Lang::Por, "pt"),
    (Lang::Cmn, "zh-cn"),
    (Lang::Jpn, "ja"),
    (Lang::Kor, "ko"),
    (Lang::Ara, "ar"),
    (Lang::Rus, "ru"),
    (Lang::Tam, "ta"),
    (Lang::Tel, "te"),
    (Lang::Ben, "bn"),
    (Lang::Mar, "mr"),
    (Lang::Guj, "gu"),
    (Lang::Kan, "kn"),
    (Lang::Mal, "ml"),
    (Lang::Pan, "pa"),
    (Lang::Urd, "ur"),
];

fn code_for(lang: Lang) -> Option<&'static str> {
    DETECTABLE
        .iter()
        .find(|(l, _)| *l == lang)
        .map(|(_, code)| *code)
}

/// Trigram language identification backed by `whatlang`, restricted to supported languages.
///
/// Latin-script guesses are only trusted when `whatlang` reports them reliable; short
/// Latin-script text is otherwise left undetected and the normalizer treats it as English.
/// Other scripts narrow the candidates to one or two languages, so the best guess is kept.
pub struct WhatlangDetector {
    detector: Detector,
}

impl WhatlangDetector {
    pub fn new() -> Self {
        let allowlist = DETECTABLE.iter().map(|(lang, _)| *lang).collect();
        Self {
            detector: Detector::with_allowlist(allowlist),
        }
    }
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let info = self.detector.detect(text)?;
        if info.script() == Script::Latin && !info.is_reliable() {
            tracing::debug!(
                guess = info.lang().code(),
                confidence = info.confidence(),
                "unreliable language guess"
            );
            return None;
        }
        code_for(info.lang()).map(str::to_string)
    }
}

static PLACEHOLDERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[A-Z]+_REDACTED\]").expect("valid regex"));

static FILLERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:um|uh|like|you\s+know|basically|literally)\b").expect("valid regex")
});

/// Lowercases, strips filler words and collapses whitespace.
pub fn normalize_english(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = FILLERS.replace_all(&lower, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Output of the normalization stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedText {
    pub language_code: &'static str,
    pub language_name: &'static str,
    pub text: String,
    /// True when translation was needed but failed and the input was passed through.
    pub degraded: bool,
}

pub struct LanguageNormalizer {
    detector: Arc<dyn LanguageDetector>,
    adapter: Arc<dyn LinguisticAdapter>,
    pool: CollaboratorPool,
}

impl LanguageNormalizer {
    pub fn new(
        detector: Arc<dyn LanguageDetector>,
        adapter: Arc<dyn LinguisticAdapter>,
        pool: CollaboratorPool,
    ) -> Self {
        Self {
            detector,
            adapter,
            pool,
        }
    }

    /// Detects and canonicalises the language of `text`, defaulting to English.
    ///
    /// Redaction placeholders are removed first so they do not sway detection.
    pub fn detect_language(&self, text: &str) -> &'static str {
        let sample = PLACEHOLDERS.replace_all(text, " ");
        self.detector
            .detect(&sample)
            .map_or(DEFAULT_LANGUAGE, |code| canonical_language_code(&code))
    }

    pub async fn normalize(&self, text: &str) -> NormalizedText {
        let language_code = self.detect_language(text);
        let language_name = language_name(language_code);

        if language_code == DEFAULT_LANGUAGE {
            return NormalizedText {
                language_code,
                language_name,
                text: normalize_english(text),
                degraded: false,
            };
        }

        let reply = self
            .pool
            .run(
                "linguistic_adapter",
                self.adapter.translate_to_english(text, language_name),
            )
            .await;

        match reply {
            Ok(english) if !english.trim().is_empty() => NormalizedText {
                language_code,
                language_name,
                text: english.trim().to_string(),
                degraded: false,
            },
            Ok(_) => {
                tracing::warn!(
                    language = language_code,
                    "linguistic adapter returned an empty reply; using input unchanged"
                );
                Self::passthrough(language_code, language_name, text)
            }
            Err(e) => {
                tracing::warn!(
                    language = language_code,
                    error = %e,
                    "linguistic adaptation failed; using input unchanged"
                );
                Self::passthrough(language_code, language_name, text)
            }
        }
    }

    fn passthrough(
        language_code: &'static str,
        language_name: &'static str,
        text: &str,
    ) -> NormalizedText {
        NormalizedText {
            language_code,
            language_name,
            text: text.to_string(),
            degraded: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CollaboratorError, CollaboratorResult};
    use async_trait::async_trait;
    use std::time::Duration;

    struct FixedAdapter(CollaboratorResult<String>);

    #[async_trait]
    impl LinguisticAdapter for FixedAdapter {
        async fn translate_to_english(&self, _t: &str, _l: &str) -> CollaboratorResult<String> {
            self.0.clone()
        }
    }

    struct SlowAdapter;

    #[async_trait]
    impl LinguisticAdapter for SlowAdapter {
        async fn translate_to_english(&self, _t: &str, _l: &str) -> CollaboratorResult<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".into())
        }
    }

    struct NoDetector;

    impl LanguageDetector for NoDetector {
        fn detect(&self, _text: &str) -> Option<String> {
            None
        }
    }

    fn normalizer(adapter: impl LinguisticAdapter + 'static) -> LanguageNormalizer {
        LanguageNormalizer::new(
            Arc::new(WhatlangDetector::new()),
            Arc::new(adapter),
            CollaboratorPool::new(2, Duration::from_millis(100)),
        )
    }

    fn detect(text: &str) -> Option<String> {
        WhatlangDetector::new().detect(text)
    }

    #[test]
    fn lists_twenty_languages() {
        assert_eq!(supported_languages().len(), 20);
        assert_eq!(language_name("ta"), "Tamil");
        assert_eq!(language_name("xx"), "Unknown");
    }

    #[test]
    fn every_supported_language_is_detectable() {
        for lang in supported_languages() {
            assert!(
                DETECTABLE.iter().any(|(_, code)| *code == lang.code),
                "{} has no detector mapping",
                lang.code
            );
        }
    }

    #[test]
    fn canonicalises_codes() {
        assert_eq!(canonical_language_code("zh-TW"), "zh-cn");
        assert_eq!(canonical_language_code("zh"), "zh-cn");
        assert_eq!(canonical_language_code("HI"), "hi");
        assert_eq!(canonical_language_code("sw"), "en");
    }

    #[test]
    fn detects_non_latin_scripts() {
        assert_eq!(detect("मेरे सिर में बहुत तेज़ दर्द हो रहा है").as_deref(), Some("hi"));
        assert_eq!(detect("у меня очень болит голова").as_deref(), Some("ru"));
        assert_eq!(detect("머리가 너무 아파요").as_deref(), Some("ko"));
        assert_eq!(detect("தலை மிகவும் வலிக்கிறது").as_deref(), Some("ta"));
        assert_eq!(detect("తల చాలా నొప్పిగా ఉంది").as_deref(), Some("te"));
        assert_eq!(detect("আমার মাথা খুব ব্যথা করছে").as_deref(), Some("bn"));
        assert_eq!(detect("ਮੇਰੇ ਸਿਰ ਵਿੱਚ ਦਰਦ ਹੈ").as_deref(), Some("pa"));
    }

    #[test]
    fn detects_latin_languages_from_full_sentences() {
        assert_eq!(
            detect("me duele mucho la cabeza desde ayer y no puedo dormir por la noche")
                .as_deref(),
            Some("es")
        );
        assert_eq!(
            detect("ich habe seit gestern starke Kopfschmerzen und mir ist die ganze Zeit schlecht")
                .as_deref(),
            Some("de")
        );
    }

    #[test]
    fn short_or_letterless_text_is_left_undetected() {
        assert_eq!(detect("12345 !!"), None);
        assert_eq!(detect("ok"), None);
    }

    #[test]
    fn placeholders_do_not_affect_detection() {
        let n = LanguageNormalizer::new(
            Arc::new(WhatlangDetector::new()),
            Arc::new(FixedAdapter(Ok("unused".into()))),
            CollaboratorPool::new(1, Duration::from_secs(1)),
        );
        assert_eq!(n.detect_language("[NAME_REDACTED] [PHONE_REDACTED]"), "en");
    }

    #[test]
    fn english_normalization_strips_fillers() {
        assert_eq!(
            normalize_english("Um I basically feel LIKE my   head is pounding"),
            "i feel my head is pounding"
        );
        assert_eq!(normalize_english("you know, uh, chills"), ", , chills");
        assert_eq!(normalize_english("unlikely"), "unlikely");
    }

    #[tokio::test]
    async fn english_skips_the_adapter() {
        let n = normalizer(FixedAdapter(Err(CollaboratorError::Transport("down".into()))));
        let out = n.normalize("My Heart Feels Funny").await;
        assert_eq!(out.language_code, "en");
        assert_eq!(out.text, "my heart feels funny");
        assert!(!out.degraded);
    }

    #[tokio::test]
    async fn non_english_uses_the_adapter() {
        let n = normalizer(FixedAdapter(Ok("  my head hurts a lot \n".into())));
        let out = n.normalize("मेरे सिर में बहुत तेज़ दर्द हो रहा है").await;
        assert_eq!(out.language_code, "hi");
        assert_eq!(out.language_name, "Hindi");
        assert_eq!(out.text, "my head hurts a lot");
        assert!(!out.degraded);
    }

    #[tokio::test]
    async fn adapter_error_fails_open() {
        let n = normalizer(FixedAdapter(Err(CollaboratorError::Transport("down".into()))));
        let text = "me duele mucho la cabeza desde ayer y no puedo dormir por la noche";
        let out = n.normalize(text).await;
        assert_eq!(out.language_code, "es");
        assert_eq!(out.text, text);
        assert!(out.degraded);
    }

    #[tokio::test]
    async fn empty_reply_fails_open() {
        let n = normalizer(FixedAdapter(Ok("   ".into())));
        let out = n.normalize("у меня очень болит голова").await;
        assert_eq!(out.text, "у меня очень болит голова");
        assert!(out.degraded);
    }

    #[tokio::test(start_paused = true)]
    async fn adapter_timeout_fails_open() {
        let n = normalizer(SlowAdapter);
        let out = n.normalize("머리가 너무 아파요").await;
        assert_eq!(out.text, "머리가 너무 아파요");
        assert!(out.degraded);
    }

    #[tokio::test]
    async fn missing_detection_defaults_to_english() {
        let n = LanguageNormalizer::new(
            Arc::new(NoDetector),
            Arc::new(FixedAdapter(Ok("unused".into()))),
            CollaboratorPool::new(1, Duration::from_secs(1)),
        );
        let out = n.normalize("Dolor De Cabeza").await;
        assert_eq!(out.language_code, "en");
        assert_eq!(out.text, "dolor de cabeza");
    }
}

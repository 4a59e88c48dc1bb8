//! Azure Translator client with an offline transliteration fallback.

use serde::Deserialize;

use crate::error::ShareError;

const AZURE_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com/translate";

pub struct Translator {
    http: reqwest::Client,
    key: String,
    region: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslationItem {
    translations: Vec<TranslationText>,
}

#[derive(Debug, Deserialize)]
struct TranslationText {
    text: String,
}

impl Translator {
    pub fn new(key: String, region: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            key,
            region,
        }
    }

    pub fn from_env() -> Option<Self> {
        let key = std::env::var("AZURE_TRANSLATOR_KEY").ok()?;
        let region = std::env::var("AZURE_TRANSLATOR_REGION").ok();
        Some(Self::new(key, region))
    }

    pub async fn translate(&self, text: &str, to: &str) -> Result<String, ShareError> {
        let mut req = self
            .http
            .post(AZURE_ENDPOINT)
            .query(&[("api-version", "3.0"), ("to", to)])
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .json(&serde_json::json!([{ "Text": text }]));
        if let Some(region) = &self.region {
            req = req.header("Ocp-Apim-Subscription-Region", region);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(ShareError::from_response("translator", resp).await);
        }

        let items: Vec<TranslationItem> = resp.json().await?;
        let translated = items
            .into_iter()
            .next()
            .and_then(|item| item.translations.into_iter().next())
            .map(|t| t.text)
            .unwrap_or_else(|| text.to_string());
        Ok(translated)
    }
}

/// Offline Cyrillic-to-Latin transliteration used when no translator is
/// configured or the API call fails. Unknown characters pass through.
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let lower = ch.to_lowercase().next().unwrap_or(ch);
        let mapped = match lower {
            'а' => "a",
            'б' => "b",
            'в' => "v",
            'г' => "g",
            'д' => "d",
            'е' => "e",
            'ё' => "yo",
            'ж' => "zh",
            'з' => "z",
            'и' => "i",
            'й' => "y",
            'к' => "k",
            'л' => "l",
            'м' => "m",
            'н' => "n",
            'о' => "o",
            'п' => "p",
            'р' => "r",
            'с' => "s",
            'т' => "t",
            'у' => "u",
            'ф' => "f",
            'х' => "kh",
            'ц' => "ts",
            'ч' => "ch",
            'ш' => "sh",
            'щ' => "shch",
            'ъ' => "",
            'ы' => "y",
            'ь' => "",
            'э' => "e",
            'ю' => "yu",
            'я' => "ya",
            'і' => "i",
            'ї' => "yi",
            'є' => "ye",
            'ґ' => "g",
            _ => {
                out.push(ch);
                continue;
            }
        };
        out.push_str(mapped);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transliterates_russian() {
        assert_eq!(transliterate("привет мир"), "privet mir");
    }

    #[test]
    fn passes_ascii_through() {
        assert_eq!(transliterate("hello world 42"), "hello world 42");
    }

    #[test]
    fn uppercase_cyrillic_lowered() {
        assert_eq!(transliterate("Москва"), "moskva");
    }

    #[test]
    fn hard_and_soft_signs_dropped() {
        assert_eq!(transliterate("объём"), "obyom");
    }
}

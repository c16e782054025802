//! Activity classification - turns one chat-log line into a `ParsedActivity`.
//!
//! `ActivityParser` owns every compiled pattern plus the item-name table and is
//! built once at startup. Classification never fails: when no matcher
//! recognizes the line, a cleaned and truncated rendering of the text is
//! returned with a keyword-based category guess and a lowered confidence.

use crate::{
    config::parser::ParserConfig,
    core::{
        dedupe::{self, Fingerprinted},
        extract::{Extraction, Extractors},
        fingerprint::{AUTHOR_LABEL, Fingerprinter},
        items::ItemNormalizer,
        text::{MarkupCleaner, strip_inline_markup, truncate_display},
    },
    errors::Result,
    models::{ActivityType, Category, Confidence, ParsedActivity, RawMessage},
};
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

/// Author used when nothing in the message names one.
pub const DEFAULT_AUTHOR: &str = "Sistema";
/// Bridge placeholder for an unknown poster.
const UNKNOWN_AUTHOR: &str = "Unknown";
/// Display text for a line with no content at all.
const EMPTY_DISPLAY: &str = "(mensagem vazia)";

const INVENTORY_HINTS: &[&str] = &[
    "item",
    "inserir",
    "remover",
    "adicionad",
    "removid",
    "baú",
    "inventário",
    "inventario",
    "estoque",
    "armazém",
];

const FINANCIAL_HINTS: &[&str] = &[
    "caixa",
    "depósito",
    "deposito",
    "depositad",
    "saque",
    "sacad",
    "valor",
    "dinheiro",
    "pagamento",
    "vendeu",
    "venda",
    "matadouro",
    "$",
];

/// The ingestion pipeline: fingerprinting, deduplication and classification.
#[derive(Debug, Clone)]
pub struct ActivityParser {
    extractors: Extractors,
    fingerprinter: Fingerprinter,
    normalizer: ItemNormalizer,
    cleaner: MarkupCleaner,
    author_label: Regex,
    leading_name: Regex,
    display_limit: usize,
}

impl ActivityParser {
    /// Compiles all patterns and loads the item table from `config`.
    pub fn new(config: &ParserConfig) -> Result<Self> {
        Ok(Self {
            extractors: Extractors::new()?,
            fingerprinter: Fingerprinter::new()?,
            normalizer: ItemNormalizer::new(&config.items),
            cleaner: MarkupCleaner::new()?,
            author_label: Regex::new(AUTHOR_LABEL)?,
            leading_name: Regex::new(
                r"(?i)^\s*([\p{L}][\p{L}\p{N}_.\- ]{0,40}?)\s+(?:vendeu|adicionou|removeu|depositou|sacou|guardou|retirou)\b",
            )?,
            display_limit: config.display_limit,
        })
    }

    /// Item-name normalizer used for inventory events.
    #[must_use]
    pub const fn normalizer(&self) -> &ItemNormalizer {
        &self.normalizer
    }

    /// Deduplication key of `message`.
    #[must_use]
    pub fn fingerprint(&self, message: &RawMessage) -> String {
        self.fingerprinter.fingerprint(message)
    }

    /// Drops repeated deliveries, keeping the first of each.
    #[must_use]
    pub fn dedupe<I>(&self, messages: I) -> Vec<RawMessage>
    where
        I: IntoIterator<Item = RawMessage>,
    {
        dedupe::dedupe(&self.fingerprinter, messages)
    }

    /// Like [`Self::dedupe`], also dropping anything whose key is in `known`.
    #[must_use]
    pub fn dedupe_against<I>(&self, messages: I, known: &HashSet<String>) -> Vec<Fingerprinted>
    where
        I: IntoIterator<Item = RawMessage>,
    {
        dedupe::dedupe_against(&self.fingerprinter, messages, known)
    }

    /// Classifies one message. Never fails.
    #[must_use]
    pub fn classify(&self, message: &RawMessage) -> ParsedActivity {
        let content = message.text();
        let plain = strip_inline_markup(&content);
        let author = self.extract_author(message, &plain);

        let Some(extraction) = self.extractors.extract(&plain) else {
            debug!(message_id = %message.id, "no matcher recognized message, using fallback");
            return self.fallback(message, content, author);
        };

        let mut activity = ParsedActivity {
            id: message.id.clone(),
            timestamp: message.timestamp,
            author,
            content,
            kind: None,
            category: Category::Sistema,
            item: None,
            quantity: None,
            amount: None,
            description: None,
            display_text: String::new(),
            parse_success: true,
            confidence: Confidence::High,
        };

        match extraction {
            Extraction::Inventory {
                direction,
                item,
                quantity,
            } => {
                let item = self.normalizer.normalize(&item);
                let (verb, target) = if direction == ActivityType::Adicionar {
                    ("adicionou", "ao")
                } else {
                    ("removeu", "do")
                };
                activity.kind = Some(direction);
                activity.category = Category::Inventario;
                activity.description = Some(format!("{quantity}x {item} {target} inventário"));
                activity.display_text = format!("{} {verb} {quantity}x {item}", activity.author);
                activity.item = Some(item);
                activity.quantity = Some(quantity);
            }
            Extraction::Cash {
                kind,
                amount,
                action,
            } => {
                let (verb, target, default_description) = if kind == ActivityType::Deposito {
                    ("depositou", "no", "Depósito no caixa da organização")
                } else {
                    ("sacou", "do", "Saque do caixa da organização")
                };
                let mut display =
                    format!("{} {verb} ${amount:.2} {target} caixa", activity.author);
                if let Some(action) = action.as_deref() {
                    display.push_str(" - ");
                    display.push_str(action);
                }
                activity.kind = Some(kind);
                activity.category = Category::Financeiro;
                activity.amount = Some(amount);
                activity.description =
                    Some(action.unwrap_or_else(|| default_description.to_string()));
                activity.display_text = display;
            }
            Extraction::Sale { animals, amount } => {
                let mut description = format!("Venda de {animals} animais no matadouro");
                let mut display = format!(
                    "{} vendeu {animals} animais no matadouro",
                    activity.author
                );
                if let Some(amount) = amount {
                    let price = format!(" por ${amount:.2}");
                    description.push_str(&price);
                    display.push_str(&price);
                }
                activity.kind = Some(ActivityType::Venda);
                activity.category = Category::Financeiro;
                activity.quantity = Some(animals);
                activity.amount = amount;
                activity.description = Some(description);
                activity.display_text = display;
            }
        }

        debug!(
            message_id = %activity.id,
            kind = ?activity.kind,
            author = %activity.author,
            "classified message"
        );
        activity
    }

    /// Who did it: `Autor:` label, then the message author (unless it is the
    /// bridge's `Unknown` placeholder), then a name leading a known verb, then
    /// [`DEFAULT_AUTHOR`].
    #[must_use]
    pub fn extract_author(&self, message: &RawMessage, plain: &str) -> String {
        if let Some(name) = self
            .author_label
            .captures(plain)
            .map(|caps| caps[1].trim().to_string())
            .filter(|name| !name.is_empty())
        {
            return name;
        }

        let poster = message.author.trim();
        if !poster.is_empty() && !poster.eq_ignore_ascii_case(UNKNOWN_AUTHOR) {
            return poster.to_string();
        }

        self.leading_name
            .captures(plain)
            .map(|caps| caps[1].trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string())
    }

    fn fallback(&self, message: &RawMessage, content: String, author: String) -> ParsedActivity {
        let cleaned = self.cleaner.clean(&content);

        let (category, confidence, display_text) = if cleaned.is_empty() {
            (Category::Sistema, Confidence::None, EMPTY_DISPLAY.to_string())
        } else {
            let (category, confidence) = guess_category(&cleaned);
            (
                category,
                confidence,
                truncate_display(&cleaned, self.display_limit),
            )
        };

        ParsedActivity {
            id: message.id.clone(),
            timestamp: message.timestamp,
            author,
            content,
            kind: None,
            category,
            item: None,
            quantity: None,
            amount: None,
            description: None,
            display_text,
            parse_success: false,
            confidence,
        }
    }
}

/// Keyword-based category for lines no matcher recognized.
fn guess_category(text: &str) -> (Category, Confidence) {
    let lowered = text.to_lowercase();
    let mentions = |hints: &[&str]| hints.iter().any(|hint| lowered.contains(hint));

    if mentions(INVENTORY_HINTS) {
        (Category::Inventario, Confidence::Medium)
    } else if mentions(FINANCIAL_HINTS) {
        (Category::Financeiro, Confidence::Medium)
    } else {
        (Category::Sistema, Confidence::Low)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{message, test_parser};

    #[test]
    fn test_classify_inventory_add() {
        let parser = test_parser();
        let activity = parser.classify(&message(
            "1",
            "bridge",
            "INSERIR ITEM\nAutor: Joao\nItem adicionado: Milho x 12",
        ));

        assert_eq!(activity.kind, Some(ActivityType::Adicionar));
        assert_eq!(activity.category, Category::Inventario);
        assert_eq!(activity.item.as_deref(), Some("Milho"));
        assert_eq!(activity.quantity, Some(12));
        assert_eq!(activity.confidence, Confidence::High);
        assert!(activity.parse_success);
        assert_eq!(activity.author, "Joao");
        assert_eq!(activity.display_text, "Joao adicionou 12x Milho");
    }

    #[test]
    fn test_classify_normalizes_item_name() {
        let parser = test_parser();
        let activity = parser.classify(&message(
            "1",
            "bridge",
            "INSERIR ITEM\nAutor: Ana\nItem adicionado: cow_female x 3",
        ));

        assert_eq!(activity.item.as_deref(), Some("Vaca"));
        assert_eq!(activity.quantity, Some(3));
        assert!(activity.display_text.contains("adicionou 3x Vaca"));
    }

    #[test]
    fn test_classify_inventory_removal() {
        let parser = test_parser();
        let activity = parser.classify(&message(
            "1",
            "Bruno",
            "REMOVER ITEM\nItem removido: golden_apple x 2",
        ));

        assert_eq!(activity.kind, Some(ActivityType::Remover));
        assert_eq!(activity.item.as_deref(), Some("Golden Apple"));
        assert_eq!(activity.display_text, "Bruno removeu 2x Golden Apple");
    }

    #[test]
    fn test_classify_deposit() {
        let parser = test_parser();
        let activity = parser.classify(&message(
            "1",
            "bridge",
            "**CAIXA ORGANIZAÇÃO - DEPÓSITO**\nAutor: Maria\nValor depositado: $1,234.50",
        ));

        assert_eq!(activity.kind, Some(ActivityType::Deposito));
        assert_eq!(activity.category, Category::Financeiro);
        assert_eq!(activity.amount, Some(1234.50));
        assert_eq!(activity.display_text, "Maria depositou $1234.50 no caixa");
        assert_eq!(
            activity.description.as_deref(),
            Some("Depósito no caixa da organização")
        );
    }

    #[test]
    fn test_classify_withdrawal_with_action() {
        let parser = test_parser();
        let activity = parser.classify(&message(
            "1",
            "bridge",
            "CAIXA ORGANIZAÇÃO - SAQUE\nAutor: Maria\nValor sacado: $50\nAção: compra de sementes",
        ));

        assert_eq!(activity.kind, Some(ActivityType::Saque));
        assert_eq!(activity.amount, Some(50.0));
        assert_eq!(activity.description.as_deref(), Some("compra de sementes"));
        assert_eq!(
            activity.display_text,
            "Maria sacou $50.00 do caixa - compra de sementes"
        );
    }

    #[test]
    fn test_classify_sale() {
        let parser = test_parser();
        let activity = parser.classify(&message(
            "1",
            "Unknown",
            "Pedro vendeu 7 animais no matadouro por $350",
        ));

        assert_eq!(activity.kind, Some(ActivityType::Venda));
        assert_eq!(activity.amount, Some(350.0));
        assert_eq!(activity.quantity, Some(7));
        assert!(activity.description.as_deref().unwrap().contains('7'));
        assert_eq!(activity.author, "Pedro");
        assert_eq!(
            activity.display_text,
            "Pedro vendeu 7 animais no matadouro por $350.00"
        );
    }

    #[test]
    fn test_fallback_guesses_inventory_category() {
        let parser = test_parser();
        let activity = parser.classify(&message("1", "bridge", "Baú da fazenda aberto"));

        assert!(!activity.parse_success);
        assert_eq!(activity.kind, None);
        assert_eq!(activity.category, Category::Inventario);
        assert_eq!(activity.confidence, Confidence::Medium);
        assert_eq!(activity.display_text, "Baú da fazenda aberto");
    }

    #[test]
    fn test_fallback_guesses_financial_category() {
        let parser = test_parser();
        let activity = parser.classify(&message("1", "bridge", "Pagamento pendente de $20"));
        assert_eq!(activity.category, Category::Financeiro);
        assert_eq!(activity.confidence, Confidence::Medium);
    }

    #[test]
    fn test_fallback_without_keywords_is_low_confidence() {
        let parser = test_parser();
        let activity = parser.classify(&message("1", "bridge", "```\nbom dia\n```"));
        assert_eq!(activity.category, Category::Sistema);
        assert_eq!(activity.confidence, Confidence::Low);
        assert_eq!(activity.display_text, "bom dia");
    }

    #[test]
    fn test_fallback_empty_content() {
        let parser = test_parser();
        let activity = parser.classify(&message("1", "", ""));
        assert!(!activity.parse_success);
        assert_eq!(activity.confidence, Confidence::None);
        assert_eq!(activity.display_text, EMPTY_DISPLAY);
        assert_eq!(activity.author, DEFAULT_AUTHOR);
    }

    #[test]
    fn test_fallback_truncates_long_text() {
        let parser = test_parser();
        let long = "palavra ".repeat(60);
        let activity = parser.classify(&message("1", "bridge", &long));
        assert!(activity.display_text.ends_with("..."));
        assert!(activity.display_text.chars().count() <= 153);
        assert_eq!(activity.content, long);
    }

    #[test]
    fn test_fallback_totality_on_odd_inputs() {
        let parser = test_parser();
        let inputs = [
            "",
            "   ",
            "\n\n\n",
            "```",
            "**",
            "Item adicionado: x",
            "Item adicionado: Milho x 99999999999999999999",
            "CAIXA ORGANIZAÇÃO\nValor depositado: $,",
            "vendeu 99999999999 animais no matadouro",
            "💰💰💰",
        ];
        for input in inputs {
            let activity = parser.classify(&message("1", "bridge", input));
            assert!(!activity.display_text.is_empty(), "input: {input:?}");
            if activity.parse_success {
                assert_eq!(activity.confidence, Confidence::High);
            } else {
                assert_ne!(activity.confidence, Confidence::High);
                assert!(activity.kind.is_none());
            }
        }
    }

    #[test]
    fn test_extract_author_order() {
        let parser = test_parser();

        let labelled = message("1", "bridge", "Autor: Joana | outra coisa");
        assert_eq!(parser.extract_author(&labelled, &labelled.content), "Joana");

        let poster = message("1", "Lucas", "texto");
        assert_eq!(parser.extract_author(&poster, &poster.content), "Lucas");

        let leading = message("1", "unknown", "Rafa adicionou feno");
        assert_eq!(parser.extract_author(&leading, &leading.content), "Rafa");

        let nothing = message("1", "Unknown", "sem autor");
        assert_eq!(parser.extract_author(&nothing, &nothing.content), DEFAULT_AUTHOR);
    }

    #[test]
    fn test_empty_author_label_falls_back_to_poster() {
        let parser = test_parser();
        let activity = parser.classify(&message(
            "1",
            "Lucas",
            "INSERIR ITEM\nAutor:\nItem adicionado: Milho x 12",
        ));
        assert_eq!(activity.author, "Lucas");
        assert_eq!(activity.display_text, "Lucas adicionou 12x Milho");
    }

    #[test]
    fn test_custom_display_limit() {
        let config = ParserConfig {
            display_limit: 10,
            ..ParserConfig::default()
        };
        let parser = ActivityParser::new(&config).unwrap();
        let activity = parser.classify(&message("1", "bridge", "uma mensagem bem comprida"));
        assert_eq!(activity.display_text, "uma mensag...");
    }
}

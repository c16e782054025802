//! Field extraction - one matcher per known log-line shape.
//!
//! Matchers are plain functions over markup-free text returning an optional
//! [`Extraction`]. They are tried in a fixed priority order (inventory,
//! financial, sale) and the first hit wins. A matcher that finds the shape but
//! cannot parse a number reports a miss; it never produces a placeholder value.

use crate::core::text::{parse_amount, parse_count};
use crate::models::ActivityType;
use regex::Regex;

/// Structured fields pulled out of one log line.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Item put into or taken out of the shared inventory
    Inventory {
        /// `Adicionar` or `Remover`
        direction: ActivityType,
        /// Item identifier exactly as logged
        item: String,
        /// Units moved
        quantity: u32,
    },
    /// Cash moved in or out of the organization safe
    Cash {
        /// `Deposito` or `Saque`
        kind: ActivityType,
        /// Amount moved
        amount: f64,
        /// Free-text `Ação:` field, when present
        action: Option<String>,
    },
    /// Animals sold at the slaughterhouse
    Sale {
        /// Animals sold
        animals: u32,
        /// First dollar amount in the line, when present
        amount: Option<f64>,
    },
}

type Matcher = fn(&Extractors, &str) -> Option<Extraction>;

/// Priority order of the matchers.
const MATCHERS: [Matcher; 3] = [
    Extractors::inventory,
    Extractors::financial,
    Extractors::sale,
];

// Words that make a bare `NAME x QTY` line count as an inventory movement.
const INVENTORY_KEYWORDS: &str =
    r"(?i)\b(?:inserir|remover|retirar|guardar|guardou|retirou|adicionou|removeu|insert|remove)\b";

/// Compiled patterns for every matcher.
#[derive(Debug, Clone)]
pub struct Extractors {
    item_name_first: Regex,
    item_qty_first: Regex,
    inventory_keyword: Regex,
    bare_item_line: Regex,
    cash_marker: Regex,
    cash_value: Regex,
    cash_action: Regex,
    sale: Regex,
    dollar_amount: Regex,
}

impl Extractors {
    /// Compiles all matcher patterns.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            item_name_first: Regex::new(
                r"(?im)item\s+(?:adicionad[oa]|removid[oa]|added|removed)\s*:\s*(.+?)\s*[x×]\s*(\d+)\b",
            )?,
            item_qty_first: Regex::new(
                r"(?im)item\s+(?:adicionad[oa]|removid[oa]|added|removed)\s*:\s*(\d+)\s*[x×]\s+(.+?)\s*$",
            )?,
            inventory_keyword: Regex::new(INVENTORY_KEYWORDS)?,
            bare_item_line: Regex::new(r"(?m)^\s*([\p{L}_][\p{L}\p{N}_ ]*?)\s+[xX×]\s*(\d+)\s*$")?,
            cash_marker: Regex::new(r"(?i)caixa\s+organiza[çc][ãa]o|dep[óo]sito|\bsaque\b")?,
            cash_value: Regex::new(
                r"(?i)valor\s+(depositado|sacado|retirado)\s*:\s*\$?\s*(\d[\d.,]*)",
            )?,
            cash_action: Regex::new(
                r"(?is)\ba[çc][ãa]o\s*:\s*(.*?)\s*(?:valor\s+\w+\s*:|autor\s*:|data\s*:|saldo\s*:|$)",
            )?,
            sale: Regex::new(r"(?is)vendeu\s+(\d+)\s+animais\b.*?matadouro")?,
            dollar_amount: Regex::new(r"\$\s*(\d[\d.,]*)")?,
        })
    }

    /// Runs the matchers in priority order and returns the first hit.
    #[must_use]
    pub fn extract(&self, text: &str) -> Option<Extraction> {
        MATCHERS.iter().find_map(|matcher| matcher(self, text))
    }

    /// Inventory movement: `Item adicionado: NAME x QTY`, `Item removido: QTYx NAME`,
    /// with or without an `INSERIR ITEM`/`REMOVER ITEM` header, or a bare
    /// `NAME x QTY` line next to an insert/remove keyword.
    #[must_use]
    pub fn inventory(&self, text: &str) -> Option<Extraction> {
        let (item, quantity) = self
            .item_name_first
            .captures(text)
            .and_then(|caps| item_and_count(&caps[1], &caps[2]))
            .or_else(|| {
                self.item_qty_first
                    .captures(text)
                    .and_then(|caps| item_and_count(&caps[2], &caps[1]))
            })
            .or_else(|| {
                if !self.inventory_keyword.is_match(text) {
                    return None;
                }
                self.bare_item_line
                    .captures(text)
                    .and_then(|caps| item_and_count(&caps[1], &caps[2]))
            })?;

        Some(Extraction::Inventory {
            direction: inventory_direction(text),
            item,
            quantity,
        })
    }

    /// Organization safe movement: a `CAIXA ORGANIZAÇÃO`/`DEPÓSITO`/`SAQUE` marker
    /// plus a `Valor depositado|sacado: $N` field.
    #[must_use]
    pub fn financial(&self, text: &str) -> Option<Extraction> {
        if !self.cash_marker.is_match(text) {
            return None;
        }

        let caps = self.cash_value.captures(text)?;
        let kind = if caps[1].eq_ignore_ascii_case("depositado") {
            ActivityType::Deposito
        } else {
            ActivityType::Saque
        };
        let amount = parse_amount(&caps[2])?;

        let action = self
            .cash_action
            .captures(text)
            .map(|caps| caps[1].trim().to_string())
            .filter(|action| !action.is_empty());

        Some(Extraction::Cash {
            kind,
            amount,
            action,
        })
    }

    /// Slaughterhouse sale: `vendeu N animais ... matadouro`, optionally with a
    /// dollar amount anywhere in the line.
    #[must_use]
    pub fn sale(&self, text: &str) -> Option<Extraction> {
        let caps = self.sale.captures(text)?;
        let animals = parse_count(&caps[1])?;
        let amount = self
            .dollar_amount
            .captures(text)
            .and_then(|caps| parse_amount(&caps[1]));

        Some(Extraction::Sale { animals, amount })
    }
}

fn item_and_count(item: &str, count: &str) -> Option<(String, u32)> {
    let item = item.trim().trim_end_matches([':', '-', ',']).trim();
    if item.is_empty() {
        return None;
    }
    Some((item.to_string(), parse_count(count)?))
}

/// `Adicionar` when the line talks about inserting or adding, `Remover` otherwise.
fn inventory_direction(text: &str) -> ActivityType {
    let lowered = text.to_lowercase();
    let added = ["inserir", "adicionad", "adicionou", "insert", "added"]
        .iter()
        .any(|word| lowered.contains(word));

    if added {
        ActivityType::Adicionar
    } else {
        ActivityType::Remover
    }
}

//! Free-text blocks to structured rows and back.
//!
//! The edit form holds instructions and ingredients as plain text, one
//! entry per line. Parsing splits on line breaks, trims, and drops blank
//! lines; it never fails, malformed input just degrades to a shorter
//! list. Rendering is the inverse and feeds the pre-filled edit form.
//!
//! Ingredient lines may carry a quantity after the first colon:
//!
//! ```text
//! Flour: 200 g
//! Egg
//! Milk: 1 cup
//! ```

use crate::models::{Ingredient, Instruction};

/// An instruction parsed out of a draft text block, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInstruction {
    /// Zero-based display order, dense in textual order.
    pub position: i64,
    pub text: String,
}

/// An ingredient parsed out of a draft text block, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedIngredient {
    pub name: String,
    pub quantity: Option<String>,
}

/// Split an instruction block into ordered steps.
///
/// One step per non-blank line, positions assigned `0..n-1` in textual
/// order. Empty input yields an empty vec, never an error.
pub fn parse_instructions(text: &str) -> Vec<ParsedInstruction> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| ParsedInstruction {
            position: i as i64,
            text: line.to_string(),
        })
        .collect()
}

/// Split an ingredient block into named entries.
///
/// Everything before the first `:` on a line is the name and the rest is
/// the quantity; a line without a colon is all name. Duplicate names keep
/// the first occurrence, so the per-recipe uniqueness invariant already
/// holds when the store sees the list.
pub fn parse_ingredients(text: &str) -> Vec<ParsedIngredient> {
    let mut out: Vec<ParsedIngredient> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (name, quantity) = match line.split_once(':') {
            Some((name, qty)) => (name.trim(), non_empty(qty)),
            None => (line, None),
        };
        if name.is_empty() {
            // A lone ": 200 g" names nothing; skip it.
            continue;
        }
        if out.iter().any(|i| i.name == name) {
            continue;
        }
        out.push(ParsedIngredient {
            name: name.to_string(),
            quantity,
        });
    }
    out
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Join instructions back into an editable block, one step per line, in
/// the order given (callers sort by position ascending).
pub fn render_instructions(steps: &[Instruction]) -> String {
    steps
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Join ingredients back into an editable block, one `name` or
/// `name: quantity` per line, in the order given (callers sort by name).
pub fn render_ingredients(items: &[Ingredient]) -> String {
    items
        .iter()
        .map(|i| match &i.quantity {
            Some(q) => format!("{}: {}", i.name, q),
            None => i.name.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

//! Label resolution: labeled IR lines → line-numbered BASIC.
//!
//! Two passes. The first assigns line numbers (starting at the step,
//! incrementing by it) and registers every `REM L<k>` definition. The
//! second rewrites whitespace-separated tokens that name a known label
//! into the decimal line number, keeping the `REM L<k>` definitions
//! verbatim so forward jumps land on the comment line itself.

use rustc_hash::FxHashMap;

/// The default line-number step.
pub const DEFAULT_STEP: u32 = 10;

/// Resolves label references and numbers the lines. Output lines are
/// `"<number> <text>\n"`.
pub fn resolve_labels(lines: &[String], step: u32) -> String {
    let step = if step == 0 { DEFAULT_STEP } else { step };

    // Pass 1: number every line, remember where each label lands.
    let mut label_map: FxHashMap<String, u32> = FxHashMap::default();
    let mut number = step;
    let mut numbered: Vec<(u32, &String)> = Vec::with_capacity(lines.len());
    for line in lines {
        let trimmed = line.trim();
        if trimmed.starts_with("REM L") {
            if let Some(label) = trimmed.split_whitespace().nth(1) {
                label_map.insert(label.to_string(), number);
            }
        }
        numbered.push((number, line));
        number += step;
    }

    // Pass 2: substitute label tokens everywhere but in definitions.
    let mut out = String::new();
    for (number, line) in numbered {
        let is_definition = line.trim().starts_with("REM L");
        let text = if is_definition {
            line.clone()
        } else {
            line.split_whitespace()
                .map(|token| match label_map.get(token) {
                    Some(target) => target.to_string(),
                    None => token.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" ")
        };
        out.push_str(&format!("{number} {text}\n"));
    }
    out
}

//! Plain-text export of a flow.

use crate::types::{GearCategory, PackingFlow};
use std::fmt::Write;

/// Render `flow` for a share sheet.
///
/// Items are grouped by category in [`GearCategory::ALL`] order, each marked
/// `✓` (checked) or `○`, followed by the truncated progress percentage:
///
/// ```text
/// 5K Run
///
/// Packing List:
///
/// Footwear:
/// ✓ Running Shoes
///
/// Clothing:
/// ○ Running Shorts
///
/// Progress: 50%
/// ```
#[must_use]
pub fn share_text(flow: &PackingFlow) -> String {
    let mut text = format!("{}\n\nPacking List:\n", flow.title);

    for category in GearCategory::ALL {
        let mut items = flow
            .items
            .iter()
            .filter(|item| item.category == category)
            .peekable();
        if items.peek().is_none() {
            continue;
        }

        let _ = write!(text, "\n{category}:\n");
        for item in items {
            let mark = if item.is_checked { '✓' } else { '○' };
            let _ = writeln!(text, "{mark} {}", item.name);
        }
    }

    let _ = write!(text, "\nProgress: {}%", flow.progress_percent());
    text
}

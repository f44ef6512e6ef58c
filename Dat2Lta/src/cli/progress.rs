//! CLI progress display utilities
//!
//! Step indicators with emojis, as printed by `convert`.

use std::time::Duration;

use console::{Emoji, style};
use indicatif::HumanDuration;

/// Magnifying glass - for reading/decoding
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Gear - for graph preparation
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");
/// Document - for rendering text output
pub static DOCUMENT: Emoji<'_, '_> = Emoji("📄 ", "");
/// Floppy disk - for writing/saving operations
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");
/// Sparkles - for completion
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

/// Emoji for the `step`-th (1-based) conversion step.
#[must_use]
pub fn step_emoji(step: usize) -> Emoji<'static, 'static> {
    match step {
        1 => LOOKING_GLASS,
        2 => GEAR,
        3 => DOCUMENT,
        _ => DISK,
    }
}

/// Print a step indicator: `[1/4] 🔍 Message...`
pub fn print_step(current: usize, total: usize, emoji: Emoji, msg: &str) {
    println!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    );
}

/// Print completion message: `✨ Done in 2s`
pub fn print_done(elapsed: Duration) {
    println!("{} Done in {}", SPARKLE, HumanDuration(elapsed));
}

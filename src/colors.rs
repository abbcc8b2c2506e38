use once_cell::sync::Lazy;
use std::collections::HashMap;

/// One entry of the color registry: what a `<name>` tag means and how it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorInfo {
    pub name: &'static str,
    /// Emoji rendered next to the colored content.
    pub sigil: &'static str,
    pub class: &'static str,
    pub description: &'static str,
}

/// Sigil used when a block names a color the registry does not know.
pub const UNKNOWN_SIGIL: &str = "⚪";
pub const UNKNOWN_CLASS: &str = "color-unknown";

/// Colors whose blocks are reported to the quote sink.
pub const QUOTE_COLORS: &[&str] = &["yellow", "quote", "blue"];

const COLORS: &[ColorInfo] = &[
    ColorInfo {
        name: "red",
        sigil: "💢",
        class: "color-red",
        description: "forceful, certain",
    },
    ColorInfo {
        name: "orange",
        sigil: "🌕",
        class: "color-orange",
        description: "counterpoint",
    },
    ColorInfo {
        name: "yellow",
        sigil: "💬",
        class: "color-yellow",
        description: "quotation",
    },
    ColorInfo {
        name: "quote",
        sigil: "💬",
        class: "color-quote",
        description: "quotation",
    },
    ColorInfo {
        name: "green",
        sigil: "⚙️",
        class: "color-green",
        description: "technical explanation",
    },
    ColorInfo {
        name: "teal",
        sigil: "🤖",
        class: "color-teal",
        description: "LLM output",
    },
    ColorInfo {
        name: "blue",
        sigil: "✨",
        class: "color-blue",
        description: "voice from beyond",
    },
    ColorInfo {
        name: "violet",
        sigil: "📣",
        class: "color-violet",
        description: "serious",
    },
    ColorInfo {
        name: "gray",
        sigil: "💭",
        class: "color-gray",
        description: "past narrative",
    },
    ColorInfo {
        name: "hazel",
        sigil: "🎭",
        class: "color-hazel",
        description: "storytelling",
    },
    ColorInfo {
        name: "mogue",
        sigil: "🌎",
        class: "color-mogue",
        description: "actions taken",
    },
    ColorInfo {
        name: "xantham",
        sigil: "🔥",
        class: "color-xantham",
        description: "sarcastic, overconfident",
    },
    ColorInfo {
        name: "music",
        sigil: "🎵",
        class: "color-music",
        description: "music note",
    },
];

static REGISTRY: Lazy<HashMap<&'static str, ColorInfo>> =
    Lazy::new(|| COLORS.iter().map(|info| (info.name, *info)).collect());

/// Looks up a color by its exact (lowercase) tag name.
pub fn lookup(name: &str) -> Option<&'static ColorInfo> {
    REGISTRY.get(name)
}

pub fn is_color(name: &str) -> bool {
    REGISTRY.contains_key(name)
}

pub fn is_quote_color(name: &str) -> bool {
    QUOTE_COLORS.contains(&name)
}

/// All registered colors, in registry order.
pub fn all() -> &'static [ColorInfo] {
    COLORS
}

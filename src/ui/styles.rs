use crate::domain::entities::session::Theme;
use crate::domain::entities::table::{SortDirection, Tone};

pub fn theme_variables(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => {
            "--bg: #f6f7f9; --surface: #ffffff; --surface-alt: #f2f2f2; --text: #1f2328; --muted: #6b7280; --border: #bbbbbb; --accent: #2563eb; --hover: #eef4ff;"
        }
        Theme::Dark => {
            "--bg: #16181d; --surface: #1f2229; --surface-alt: #2a2e37; --text: #e6e8eb; --muted: #9aa1ab; --border: #3b404b; --accent: #60a5fa; --hover: #28344a;"
        }
    }
}

pub fn root_container_style(theme: Theme) -> String {
    format!(
        "{} font-family: 'Noto Sans', sans-serif; background: var(--bg); color: var(--text); height: 100vh; display: flex; flex-direction: column; overflow: hidden;",
        theme_variables(theme)
    )
}

pub fn page_style() -> &'static str {
    "flex: 1; min-height: 0; display: flex; flex-direction: column; gap: 12px; padding: 12px; overflow: auto;"
}

pub fn table_container_style() -> &'static str {
    "flex: 1; min-height: 0; overflow: auto; border: 1px solid var(--border); border-radius: 8px; background: var(--surface);"
}

pub fn table_header_cell_style() -> &'static str {
    "position: sticky; top: 0; z-index: 2; border-bottom: 1px solid var(--border); padding: 8px; background: var(--surface-alt); text-align: left; white-space: nowrap;"
}

pub fn table_cell_style() -> &'static str {
    "border-bottom: 1px solid var(--border); padding: 6px 8px; vertical-align: top;"
}

pub fn button_style() -> &'static str {
    "border: 1px solid var(--border); background: var(--surface); color: var(--text); padding: 4px 10px; border-radius: 6px; cursor: pointer;"
}

pub fn primary_button_style() -> &'static str {
    "border: 1px solid var(--accent); background: var(--accent); color: #fff; padding: 4px 12px; border-radius: 6px; cursor: pointer;"
}

pub fn input_style() -> &'static str {
    "border: 1px solid var(--border); background: var(--surface); color: var(--text); padding: 4px 8px; border-radius: 6px; min-width: 0;"
}

pub fn overlay_style(z_index: u32) -> String {
    format!(
        "position: fixed; inset: 0; background: rgba(0,0,0,0.35); display: flex; align-items: center; justify-content: center; z-index: {z_index};"
    )
}

pub fn dialog_style() -> &'static str {
    "background: var(--surface); color: var(--text); padding: 16px; border: 1px solid var(--border); border-radius: 8px; min-width: 320px; max-width: min(720px, 92vw); max-height: 90vh; overflow: auto;"
}

pub fn dropdown_style() -> &'static str {
    "position: fixed; max-height: 240px; overflow-y: auto; background: var(--surface); color: var(--text); border: 1px solid var(--border); border-radius: 8px; box-shadow: 0 10px 24px rgba(0,0,0,0.15); z-index: 1300;"
}

pub fn tone_colors(tone: Tone) -> (&'static str, &'static str) {
    match tone {
        Tone::Neutral => ("#e5e7eb", "#374151"),
        Tone::Positive => ("#dcfce7", "#166534"),
        Tone::Negative => ("#fee2e2", "#991b1b"),
        Tone::Info => ("#dbeafe", "#1e40af"),
        Tone::Warning => ("#fef3c7", "#92400e"),
        Tone::Accent => ("#ede9fe", "#5b21b6"),
    }
}

pub fn badge_style(tone: Tone) -> String {
    let (background, color) = tone_colors(tone);
    format!(
        "display: inline-block; padding: 1px 8px; border-radius: 999px; font-size: 12px; background: {background}; color: {color};"
    )
}

pub fn sort_indicator(direction: Option<SortDirection>) -> &'static str {
    direction.map(SortDirection::indicator).unwrap_or("↕")
}

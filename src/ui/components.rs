//! ShadCN-style UI primitives rendered to HTML strings.
//!
//! # Components
//!
//! - [`card`]: Card container with optional header and footer
//! - [`badge`]: Status badge/tag
//! - [`button`]: Clickable button with variants
//! - [`progress_bar`]: Saturating progress bar
//! - [`skeleton`]: Loading placeholder
//! - [`empty_state`]: Message shown when a list has nothing in it

use crate::finance::ProgressStatus;
use crate::ui::html::escape;
use crate::ui::icons::Icon;

/// Badge visual variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BadgeVariant {
    /// Default badge style.
    #[default]
    Default,
    /// Success/positive badge.
    Success,
    /// Warning badge.
    Warning,
    /// Error/destructive badge.
    Error,
    /// Outline badge.
    Outline,
    /// Secondary badge.
    Secondary,
}

impl BadgeVariant {
    /// Get CSS classes for this variant.
    #[must_use]
    pub fn classes(self) -> &'static str {
        match self {
            Self::Default => "bg-primary text-white",
            Self::Success => "bg-success text-white",
            Self::Warning => "bg-warning text-black",
            Self::Error => "bg-danger text-white",
            Self::Outline => "border border-panelBorder bg-transparent text-textPrimary",
            Self::Secondary => "bg-panel text-textPrimary border border-panelBorder",
        }
    }
}

impl From<ProgressStatus> for BadgeVariant {
    fn from(status: ProgressStatus) -> Self {
        match status {
            ProgressStatus::OnTrack => Self::Success,
            ProgressStatus::NearLimit => Self::Warning,
            ProgressStatus::Over => Self::Error,
        }
    }
}

/// Button visual variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonVariant {
    /// Primary action button.
    #[default]
    Primary,
    /// Secondary action button.
    Secondary,
    /// Subtle ghost button.
    Ghost,
    /// Destructive action button.
    Destructive,
    /// Outline button.
    Outline,
}

impl ButtonVariant {
    /// Get CSS classes for this variant.
    #[must_use]
    pub fn classes(self) -> &'static str {
        match self {
            Self::Primary => "bg-primary text-white hover:bg-primaryMuted",
            Self::Secondary => {
                "bg-panel text-textPrimary border border-panelBorder hover:bg-panelBorder"
            }
            Self::Ghost => "bg-transparent text-textPrimary hover:bg-panel",
            Self::Destructive => "bg-danger text-white hover:bg-red-600",
            Self::Outline => {
                "bg-transparent border border-panelBorder text-textPrimary hover:bg-panel"
            }
        }
    }
}

/// Button size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonSize {
    /// Small button.
    Sm,
    /// Medium button (default).
    #[default]
    Md,
    /// Icon-only button.
    Icon,
}

impl ButtonSize {
    /// Get CSS classes for this size.
    #[must_use]
    pub fn classes(self) -> &'static str {
        match self {
            Self::Sm => "h-8 px-3 text-xs",
            Self::Md => "h-10 px-4 text-sm",
            Self::Icon => "h-10 w-10",
        }
    }
}

/// Card container. `header` and `footer` are pre-rendered HTML.
#[must_use]
pub fn card(title: &str, icon: Icon, header_extra: &str, body: &str, footer: &str) -> String {
    let footer = if footer.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="flex flex-wrap items-center gap-2 p-5 pt-0">{footer}</div>"#)
    };
    format!(
        r#"<section class="rounded-2xl border border-panelBorder bg-panel text-textPrimary shadow-sm">
<div class="flex items-center justify-between gap-2 p-5 pb-3">
<div class="flex items-center gap-2">{icon}<h3 class="font-semibold">{title}</h3></div>{header_extra}
</div>
<div class="p-5 pt-0 space-y-3">{body}</div>{footer}
</section>"#,
        icon = icon.svg("h-5 w-5 text-primary"),
        title = escape(title),
    )
}

/// Badge for status or labels. `text` is escaped.
#[must_use]
pub fn badge(text: &str, variant: BadgeVariant) -> String {
    format!(
        r#"<span class="inline-flex items-center rounded-full px-2.5 py-0.5 text-xs font-semibold transition-colors {}">{}</span>"#,
        variant.classes(),
        escape(text)
    )
}

/// Button. `attrs` is raw attribute text (already escaped by the caller).
#[must_use]
pub fn button(
    label: &str,
    variant: ButtonVariant,
    size: ButtonSize,
    attrs: &str,
    disabled: bool,
) -> String {
    let disabled_attr = if disabled {
        r#" disabled aria-disabled="true""#
    } else {
        ""
    };
    format!(
        r#"<button type="button" class="inline-flex items-center justify-center gap-2 rounded-xl font-medium transition-all active:scale-95 disabled:opacity-50 disabled:pointer-events-none {} {}" {attrs}{disabled_attr}>{}</button>"#,
        variant.classes(),
        size.classes(),
        escape(label)
    )
}

/// Form submit button.
#[must_use]
pub fn submit_button(label: &str, variant: ButtonVariant) -> String {
    format!(
        r#"<button type="submit" class="inline-flex items-center justify-center gap-2 rounded-xl font-medium transition-all active:scale-95 {} {}">{}</button>"#,
        variant.classes(),
        ButtonSize::Md.classes(),
        escape(label)
    )
}

/// Horizontal bar; width comes from an already-clamped percentage.
#[must_use]
pub fn progress_bar(width_percent: u8, status: ProgressStatus) -> String {
    let colour = match status {
        ProgressStatus::OnTrack => "bg-success",
        ProgressStatus::NearLimit => "bg-warning",
        ProgressStatus::Over => "bg-danger",
    };
    format!(
        r#"<div class="h-2 w-full rounded-full bg-surfaceVariant overflow-hidden" role="progressbar" aria-valuemin="0" aria-valuemax="100" aria-valuenow="{width_percent}"><div class="h-full rounded-full {colour}" style="width: {width_percent}%"></div></div>"#
    )
}

/// Pulsing placeholder lines.
#[must_use]
pub fn skeleton(lines: usize) -> String {
    let mut out = String::from(r#"<div class="animate-pulse space-y-3" aria-busy="true">"#);
    for i in 0..lines.max(1) {
        let width = match i % 3 {
            0 => "w-3/4",
            1 => "w-1/2",
            _ => "w-5/6",
        };
        out.push_str(&format!(r#"<div class="h-4 rounded bg-surfaceVariant {width}"></div>"#));
    }
    out.push_str("</div>");
    out
}

/// Muted message for empty lists.
#[must_use]
pub fn empty_state(message: &str) -> String {
    format!(
        r#"<p class="py-4 text-center text-sm text-textMuted">{}</p>"#,
        escape(message)
    )
}

/// Inline notice shown when a card fell back to defaults.
#[must_use]
pub fn stale_notice(retry_attrs: &str) -> String {
    format!(
        r#"<div class="flex items-center gap-2 text-xs text-textMuted">{}<span>Couldn't refresh this card.</span><button type="button" class="underline hover:text-textPrimary" {retry_attrs}>Try again</button></div>"#,
        Icon::AlertCircle.svg("h-3.5 w-3.5 text-warning")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_badge_variant() {
        assert_eq!(BadgeVariant::from(ProgressStatus::Over), BadgeVariant::Error);
        assert_eq!(BadgeVariant::from(ProgressStatus::NearLimit), BadgeVariant::Warning);
    }

    #[test]
    fn disabled_buttons_carry_the_attribute() {
        let html = button("Save", ButtonVariant::Primary, ButtonSize::Sm, "", true);
        assert!(html.contains(r#"aria-disabled="true""#));
        let html = button("Save", ButtonVariant::Primary, ButtonSize::Sm, "", false);
        assert!(!html.contains(r#"aria-disabled="true""#));
    }

    #[test]
    fn card_escapes_title() {
        let html = card("<Budget>", Icon::Wallet, "", "", "");
        assert!(html.contains("&lt;Budget&gt;"));
    }

    #[test]
    fn progress_bar_width() {
        assert!(progress_bar(100, ProgressStatus::Over).contains("width: 100%"));
    }
}

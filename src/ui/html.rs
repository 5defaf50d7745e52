//! HTML helpers and the page shell.

use std::fmt::Write as _;

use crate::ui::icons::Icon;

/// Escape text for use in element content and double-quoted attributes.
#[must_use]
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `hx-vals` attribute value for a JSON object.
#[must_use]
pub fn hx_vals(value: &serde_json::Value) -> String {
    escape(&value.to_string())
}

/// Top-level navigation entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Chat,
    Dashboard,
    Family,
    Subscription,
}

impl Nav {
    const ALL: [Self; 4] = [Self::Chat, Self::Dashboard, Self::Family, Self::Subscription];

    fn href(self) -> &'static str {
        match self {
            Self::Chat => "/",
            Self::Dashboard => "/dashboard",
            Self::Family => "/dashboard/family",
            Self::Subscription => "/dashboard/subscription",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Chat => "Chat",
            Self::Dashboard => "Spending",
            Self::Family => "Family",
            Self::Subscription => "Plan",
        }
    }
}

/// Generate the HTML shell for a page.
///
/// HTMX and Alpine come from pinned CDN builds. Styling is class names plus
/// `/static/app.css`.
#[must_use]
pub fn page_shell(title: &str, active: Nav, content: &str) -> String {
    let title = escape(title);
    let mut nav = String::new();
    for item in Nav::ALL {
        let state = if item == active {
            "text-textPrimary bg-surface"
        } else {
            "text-textSecondary hover:text-textPrimary hover:bg-surface"
        };
        let _ = write!(
            nav,
            r#"<a href="{}" class="px-3 py-2 rounded-xl text-sm transition-all {state}">{}</a>"#,
            item.href(),
            item.label()
        );
    }
    let logo = Icon::Sparkles.svg("h-5 w-5 md:h-6 md:w-6 text-primary");

    format!(
        r#"<!DOCTYPE html>
<html lang="en" class="dark">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Personal finance assistant">
    <title>{title} - Finance Assistant</title>
    <script src="https://unpkg.com/htmx.org@2.0.8/dist/htmx.min.js"></script>
    <script defer src="https://unpkg.com/alpinejs@3.14.9/dist/cdn.min.js"></script>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body class="min-h-screen bg-background text-textPrimary antialiased" hx-headers='{{"X-Requested-With": "htmx"}}'>
    <div id="app-shell" class="flex flex-col h-screen overflow-hidden">
        <header class="sticky top-0 z-50 w-full bg-surfaceContainer backdrop-blur shadow-sm shrink-0">
            <div class="container mx-auto flex h-14 md:h-16 items-center justify-between px-4 md:px-6 max-w-6xl">
                <a href="/" class="flex items-center gap-2 md:gap-3 font-semibold hover:opacity-80 transition-opacity">
                    {logo}
                    <span class="text-base md:text-lg">Finance Assistant</span>
                </a>
                <nav class="flex items-center gap-1" hx-boost="true">{nav}</nav>
            </div>
        </header>
        <main id="app" class="flex-1 overflow-y-auto container mx-auto px-4 md:px-6 py-4 md:py-8 max-w-6xl">
            {content}
        </main>
        <div id="sheet-root"></div>
    </div>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_and_quotes() {
        assert_eq!(
            escape(r#"<b a="x">Tom & 'Jerry'</b>"#),
            "&lt;b a=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn shell_marks_active_nav_and_escapes_title() {
        let page = page_shell("<Budgets>", Nav::Dashboard, "<p>x</p>");
        assert!(page.contains("&lt;Budgets&gt; - Finance Assistant"));
        assert!(page.contains(r#"href="/dashboard" class="px-3 py-2 rounded-xl text-sm transition-all text-textPrimary bg-surface""#));
        assert!(page.contains(r#"<div id="sheet-root"></div>"#));
    }
}

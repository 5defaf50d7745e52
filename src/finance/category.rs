//! Category → icon and accent colour.

use crate::ui::icons::Icon;

/// How a spending category is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStyle {
    pub icon: Icon,
    /// Tailwind classes for the icon chip.
    pub accent: &'static str,
}

/// Keyword table, checked in order; first match wins.
const RULES: &[(&[&str], Icon, &str)] = &[
    (&["grocer", "supermarket"], Icon::ShoppingCart, "bg-emerald-500/15 text-emerald-500"),
    (
        &["food", "dining", "restaurant", "cafe", "coffee"],
        Icon::Utensils,
        "bg-orange-500/15 text-orange-500",
    ),
    (
        &["transport", "fuel", "petrol", "taxi", "parking", "uber"],
        Icon::Car,
        "bg-sky-500/15 text-sky-500",
    ),
    (&["shopping", "retail", "clothing"], Icon::ShoppingBag, "bg-pink-500/15 text-pink-500"),
    (
        &["entertainment", "movie", "cinema", "gaming"],
        Icon::Film,
        "bg-purple-500/15 text-purple-500",
    ),
    (
        &["subscription", "streaming"],
        Icon::Repeat,
        "bg-indigo-500/15 text-indigo-500",
    ),
    (
        &["bill", "utilit", "electric", "water", "internet", "phone"],
        Icon::Zap,
        "bg-yellow-500/15 text-yellow-500",
    ),
    (
        &["health", "medical", "pharmacy", "fitness"],
        Icon::HeartPulse,
        "bg-red-500/15 text-red-500",
    ),
    (&["education", "school", "tuition"], Icon::GraduationCap, "bg-blue-500/15 text-blue-500"),
    (&["travel", "flight", "hotel"], Icon::Plane, "bg-cyan-500/15 text-cyan-500"),
    (&["rent", "housing", "home", "mortgage"], Icon::Home, "bg-amber-500/15 text-amber-500"),
    (&["income", "salary", "payroll"], Icon::TrendingUp, "bg-green-500/15 text-green-500"),
    (&["transfer"], Icon::ArrowLeftRight, "bg-slate-500/15 text-slate-400"),
    (&["saving", "invest"], Icon::PiggyBank, "bg-teal-500/15 text-teal-500"),
];

const FALLBACK: CategoryStyle = CategoryStyle {
    icon: Icon::CreditCard,
    accent: "bg-slate-500/15 text-slate-400",
};

impl CategoryStyle {
    /// Case-insensitive keyword match on the category name.
    #[must_use]
    pub fn for_category(name: &str) -> Self {
        let lower = name.to_lowercase();
        RULES
            .iter()
            .find(|(keywords, _, _)| keywords.iter().any(|k| lower.contains(k)))
            .map_or(FALLBACK, |&(_, icon, accent)| Self { icon, accent })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_keywords_case_insensitively() {
        assert_eq!(CategoryStyle::for_category("Dining Out").icon, Icon::Utensils);
        assert_eq!(CategoryStyle::for_category("GROCERIES").icon, Icon::ShoppingCart);
        assert_eq!(CategoryStyle::for_category("Utilities").icon, Icon::Zap);
    }

    #[test]
    fn groceries_win_over_food() {
        assert_eq!(CategoryStyle::for_category("Food & Groceries").icon, Icon::ShoppingCart);
    }

    #[test]
    fn unknown_categories_fall_back() {
        assert_eq!(CategoryStyle::for_category("Misc"), FALLBACK);
        assert_eq!(CategoryStyle::for_category(""), FALLBACK);
    }
}
